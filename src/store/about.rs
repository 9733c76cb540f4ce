//! The about/profile record: a single JSON document plus a fixed-name
//! profile image, overwritten on each upload.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Public URL of the profile image. A cache-busting query parameter added
/// by the client is the only defense against stale caches.
pub const PROFILE_IMAGE_URL: &str = "/assets/profile.jpg";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutRecord {
    pub name: String,
    pub profile_image: String,
    pub bio: String,
    pub gear: Vec<GearItem>,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GearItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SocialLinks {
    pub email: String,
    pub instagram: String,
    pub twitter: String,
}

pub struct AboutStore {
    record_path: PathBuf,
    profile_image_path: PathBuf,
}

impl AboutStore {
    pub fn new(record_path: PathBuf, profile_image_path: PathBuf) -> Self {
        Self {
            record_path,
            profile_image_path,
        }
    }

    /// Read the about record; a missing or unparsable file yields the
    /// empty-shaped default rather than an error.
    pub fn read(&self) -> AboutRecord {
        fs::read(&self.record_path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }

    /// Replace the about record wholesale.
    pub fn write(&self, record: &AboutRecord) -> ApiResult<()> {
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|err| ApiError::Internal(format!("encoding about record: {err}")))?;
        fs::write(&self.record_path, bytes)?;
        Ok(())
    }

    /// Overwrite the fixed-path profile image. No versioning.
    pub fn save_profile_image(&self, bytes: &[u8]) -> ApiResult<()> {
        fs::write(&self.profile_image_path, bytes)?;
        Ok(())
    }
}
