//! Filesystem-backed content repositories.
//!
//! The filesystem is the datastore: directories plus JSON sidecar files,
//! one layout convention per collection. Route handlers talk only to the
//! store API so a future swap to a real datastore does not ripple through
//! them.

pub mod about;
pub mod journals;
pub mod moments;

pub use about::{AboutRecord, AboutStore, GearItem, SocialLinks};
pub use journals::{JournalDetail, JournalInfo, JournalPatch, JournalStore, JournalSummary};
pub use moments::MomentStore;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;

use crate::sanitize::sanitize_segment;

/// Image file extensions served in listings, matched case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// All collections under one data directory.
pub struct ContentStore {
    pub moments: MomentStore,
    pub journals: JournalStore,
    pub about: AboutStore,
    images_dir: PathBuf,
    thumbnails_dir: PathBuf,
    journals_dir: PathBuf,
    assets_dir: PathBuf,
}

impl ContentStore {
    /// Open the store rooted at `data_dir`, creating the collection
    /// directories so listing reads never fail on a fresh tree.
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let images_dir = data_dir.join("images");
        let thumbnails_dir = data_dir.join("thumbnails");
        let journals_dir = data_dir.join("content").join("journals");
        let assets_dir = data_dir.join("assets");
        let meta_dir = data_dir.join("data");

        for dir in [
            &images_dir,
            &thumbnails_dir,
            &journals_dir,
            &assets_dir,
            &meta_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating content directory {}", dir.display()))?;
        }

        Ok(Self {
            moments: MomentStore::new(images_dir.clone(), thumbnails_dir.clone()),
            journals: JournalStore::new(journals_dir.clone()),
            about: AboutStore::new(meta_dir.join("about.json"), assets_dir.join("profile.jpg")),
            images_dir,
            thumbnails_dir,
            journals_dir,
            assets_dir,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails_dir
    }

    pub fn journals_dir(&self) -> &Path {
        &self.journals_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

/// On-disk name for an uploaded photo: upload epoch millis, a dash, and
/// the sanitized original name.
pub(crate) fn timestamped_name(original: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), sanitize_segment(original))
}

pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub(crate) fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
