//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved media-asset reference embedded in entity responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub image_id: Uuid,
    pub image_url: String,
}
