//! Capability availability endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use writekit_common::{Availability, CapabilityKind};

use crate::state::AppState;

/// Build the capabilities router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/capabilities", get(capabilities))
}

#[derive(Debug, Serialize)]
pub struct CapabilityEntry {
    pub capability: CapabilityKind,
    pub availability: Availability,
    pub supports_streaming: bool,
}

/// GET /v1/capabilities - readiness of every capability kind.
async fn capabilities(State(state): State<Arc<AppState>>) -> Json<Vec<CapabilityEntry>> {
    let mut entries = Vec::with_capacity(CapabilityKind::ALL.len());
    for kind in CapabilityKind::ALL {
        let availability = state.broker.check_availability(kind).await;
        entries.push(CapabilityEntry {
            capability: kind,
            availability,
            supports_streaming: kind.supports_streaming(),
        });
    }
    Json(entries)
}
