//! Response envelope for completed generations.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKind;

/// A completed one-shot generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: String,
    pub created: i64,
    pub capability: CapabilityKind,
    pub text: String,
}

impl GenerationResponse {
    pub fn new(capability: CapabilityKind, text: String) -> Self {
        Self {
            id: format!("gen-{}", uuid::Uuid::new_v4()),
            created: chrono::Utc::now().timestamp(),
            capability,
            text,
        }
    }
}
