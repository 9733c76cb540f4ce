//! The journal collection: one directory per travel story, holding an
//! `info.json` sidecar, a cover image, and a gallery of photos.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::metadata::{read_photo, Photo};
use crate::sanitize::sanitize_segment;

use super::{is_hidden, is_image_name, timestamped_name};

pub const INFO_FILE: &str = "info.json";
pub const DEFAULT_COVER: &str = "cover.jpg";

/// The `info.json` sidecar: the only structured journal metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalInfo {
    pub title: String,
    pub date: String,
    pub description: String,
    pub cover: String,
}

impl Default for JournalInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            description: String::new(),
            cover: DEFAULT_COVER.to_string(),
        }
    }
}

/// Partial update. Empty or absent fields keep their prior values, except
/// `description`, which overlays even when explicitly empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
}

/// Listing entry: sidecar fields plus the computed cover URL.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub cover: String,
}

/// Full journal record including the photo gallery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDetail {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub cover: String,
    pub photos: Vec<Photo>,
}

pub struct JournalStore {
    journals_dir: PathBuf,
}

impl JournalStore {
    pub fn new(journals_dir: PathBuf) -> Self {
        Self { journals_dir }
    }

    fn journal_dir(&self, id: &str) -> PathBuf {
        self.journals_dir.join(id)
    }

    /// Read and parse one journal's sidecar; `None` on any failure, so a
    /// corrupt journal degrades instead of breaking its callers.
    fn read_info(&self, id: &str) -> Option<JournalInfo> {
        let bytes = fs::read(self.journal_dir(id).join(INFO_FILE)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn write_info(&self, id: &str, info: &JournalInfo) -> ApiResult<()> {
        let bytes = serde_json::to_vec_pretty(info)
            .map_err(|err| ApiError::Internal(format!("encoding journal info: {err}")))?;
        fs::write(self.journal_dir(id).join(INFO_FILE), bytes)?;
        Ok(())
    }

    fn cover_url(id: &str, cover: &str) -> String {
        format!("/content/journals/{id}/{cover}")
    }

    fn summary(id: String, info: JournalInfo) -> JournalSummary {
        let cover = Self::cover_url(&id, &info.cover);
        JournalSummary {
            id,
            title: info.title,
            date: info.date,
            description: info.description,
            cover,
        }
    }

    /// Enumerate journals, newest date first. A subdirectory whose sidecar
    /// is missing or corrupt is silently skipped; partial success is
    /// acceptable.
    pub fn list(&self) -> ApiResult<Vec<JournalSummary>> {
        let entries = fs::read_dir(&self.journals_dir).map_err(|err| {
            ApiError::Internal(format!(
                "reading journals directory {}: {err}",
                self.journals_dir.display()
            ))
        })?;

        let mut journals = Vec::new();
        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&id) {
                continue;
            }
            let Some(info) = self.read_info(&id) else {
                tracing::warn!(journal = %id, "skipping journal with unreadable info.json");
                continue;
            };
            journals.push(Self::summary(id, info));
        }
        journals.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(journals)
    }

    /// One journal with its photo gallery; the cover file and dotfiles are
    /// excluded from the listing, which is sorted newest capture first.
    pub fn get(&self, id: &str) -> ApiResult<JournalDetail> {
        let id = sanitize_segment(id);
        let info = self
            .read_info(&id)
            .ok_or_else(|| ApiError::NotFound(format!("no journal named {id}")))?;

        let mut photos = Vec::new();
        if let Ok(entries) = fs::read_dir(self.journal_dir(&id)) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if is_hidden(&name) || !is_image_name(&name) || name == info.cover {
                    continue;
                }
                let url = format!("/content/journals/{id}/{name}");
                photos.push(read_photo(&entry.path(), &url));
            }
        }
        photos.sort_by(|a, b| b.date_taken.cmp(&a.date_taken));

        let cover = Self::cover_url(&id, &info.cover);
        Ok(JournalDetail {
            id,
            title: info.title,
            date: info.date,
            description: info.description,
            cover,
            photos,
        })
    }

    /// Create a journal directory with its sidecar. The id is sanitized
    /// first; an id that already exists is a validation error.
    pub fn create(&self, id: &str, info: JournalInfo) -> ApiResult<JournalSummary> {
        let id = sanitize_segment(id);
        if id.is_empty() {
            return Err(ApiError::Validation("journal id is required".to_string()));
        }
        let dir = self.journal_dir(&id);
        if dir.exists() {
            return Err(ApiError::Validation(format!("journal {id} already exists")));
        }
        fs::create_dir_all(&dir)?;
        self.write_info(&id, &info)?;
        Ok(Self::summary(id, info))
    }

    /// Merge-on-write update of the sidecar.
    pub fn update(&self, id: &str, patch: &JournalPatch) -> ApiResult<JournalSummary> {
        let id = sanitize_segment(id);
        let mut info = self
            .read_info(&id)
            .ok_or_else(|| ApiError::NotFound(format!("no journal named {id}")))?;

        if let Some(title) = patch.title.as_ref().filter(|t| !t.is_empty()) {
            info.title = title.clone();
        }
        if let Some(date) = patch.date.as_ref().filter(|d| !d.is_empty()) {
            info.date = date.clone();
        }
        // Description overlays even when explicitly empty.
        if let Some(description) = patch.description.as_ref() {
            info.description = description.clone();
        }
        if let Some(cover) = patch.cover.as_ref().filter(|c| !c.is_empty()) {
            info.cover = sanitize_segment(cover);
        }

        self.write_info(&id, &info)?;
        Ok(Self::summary(id, info))
    }

    /// Recursive removal of the journal directory.
    pub fn delete(&self, id: &str) -> ApiResult<String> {
        let id = sanitize_segment(id);
        let dir = self.journal_dir(&id);
        if !dir.is_dir() {
            return Err(ApiError::NotFound(format!("no journal named {id}")));
        }
        fs::remove_dir_all(&dir)?;
        Ok(id)
    }

    /// Store an uploaded photo inside an existing journal. Cover uploads
    /// land at the fixed cover filename; everything else gets a
    /// timestamped name.
    pub fn save_photo(
        &self,
        id: &str,
        original_name: &str,
        bytes: &[u8],
        as_cover: bool,
    ) -> ApiResult<String> {
        let id = sanitize_segment(id);
        if self.read_info(&id).is_none() {
            return Err(ApiError::NotFound(format!("no journal named {id}")));
        }
        let name = if as_cover {
            DEFAULT_COVER.to_string()
        } else {
            timestamped_name(original_name)
        };
        fs::write(self.journal_dir(&id).join(&name), bytes)?;
        Ok(name)
    }

    /// Delete one photo file from a journal by exact on-disk name.
    pub fn delete_photo(&self, id: &str, filename: &str) -> ApiResult<String> {
        let id = sanitize_segment(id);
        let name = sanitize_segment(filename);
        let path = self.journal_dir(&id).join(&name);
        if !path.is_file() {
            return Err(ApiError::NotFound(format!(
                "no photo named {name} in journal {id}"
            )));
        }
        fs::remove_file(&path)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(tmp: &tempfile::TempDir) -> JournalStore {
        let dir = tmp.path().join("journals");
        fs::create_dir_all(&dir).unwrap();
        JournalStore::new(dir)
    }

    fn trip_info(title: &str, date: &str) -> JournalInfo {
        JournalInfo {
            title: title.to_string(),
            date: date.to_string(),
            description: "a trip".to_string(),
            ..JournalInfo::default()
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);

        store.create("trip-1", trip_info("Trip", "2024-01-01")).unwrap();
        let detail = store.get("trip-1").unwrap();
        assert_eq!(detail.id, "trip-1");
        assert_eq!(detail.title, "Trip");
        assert_eq!(detail.date, "2024-01-01");
        assert_eq!(detail.cover, "/content/journals/trip-1/cover.jpg");
        assert!(detail.photos.is_empty());
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("dup", trip_info("A", "2024-01-01")).unwrap();
        assert!(matches!(
            store.create("dup", trip_info("B", "2024-02-01")),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn create_sanitizes_the_id() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        let summary = store
            .create("../sneaky trip", trip_info("Sneaky", "2024-01-01"))
            .unwrap();
        assert_eq!(summary.id, "._sneaky_trip");
        assert!(tmp.path().join("journals").join("._sneaky_trip").is_dir());
    }

    #[test]
    fn listing_sorts_descending_by_date_and_skips_corrupt_entries() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("old", trip_info("Old", "2023-05-01")).unwrap();
        store.create("new", trip_info("New", "2024-08-01")).unwrap();

        // One journal with a mangled sidecar must not break the listing.
        let corrupt = tmp.path().join("journals").join("corrupt");
        fs::create_dir_all(&corrupt).unwrap();
        fs::write(corrupt.join(INFO_FILE), b"{ not json").unwrap();

        let journals = store.list().unwrap();
        assert_eq!(journals.len(), 2);
        assert_eq!(journals[0].id, "new");
        assert_eq!(journals[1].id, "old");
    }

    #[test]
    fn get_unknown_journal_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(matches!(store.get("missing"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn partial_update_merges_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("trip", trip_info("Trip", "2024-01-01")).unwrap();

        // Empty description overlays; omitted title keeps its prior value.
        let patch = JournalPatch {
            description: Some(String::new()),
            ..JournalPatch::default()
        };
        let updated = store.update("trip", &patch).unwrap();
        assert_eq!(updated.title, "Trip");
        assert_eq!(updated.description, "");

        // Empty title does not overwrite.
        let patch = JournalPatch {
            title: Some(String::new()),
            date: Some("2024-02-02".to_string()),
            ..JournalPatch::default()
        };
        let updated = store.update("trip", &patch).unwrap();
        assert_eq!(updated.title, "Trip");
        assert_eq!(updated.date, "2024-02-02");
    }

    #[test]
    fn detail_excludes_the_cover_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("trip", trip_info("Trip", "2024-01-01")).unwrap();
        store.save_photo("trip", "cover.jpg", b"cover", true).unwrap();
        let name = store.save_photo("trip", "shot.jpg", b"shot", false).unwrap();

        let detail = store.get("trip").unwrap();
        let names: Vec<_> = detail.photos.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![name.as_str()]);
    }

    #[test]
    fn photo_upload_requires_an_existing_journal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(matches!(
            store.save_photo("ghost", "cover.jpg", b"x", true),
            Err(ApiError::NotFound(_))
        ));
        // No orphaned directory or cover file left behind.
        assert!(!tmp.path().join("journals").join("ghost").exists());
    }

    #[test]
    fn delete_removes_the_whole_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("trip", trip_info("Trip", "2024-01-01")).unwrap();
        store.save_photo("trip", "shot.jpg", b"shot", false).unwrap();

        store.delete("trip").unwrap();
        assert!(!tmp.path().join("journals").join("trip").exists());
        assert!(matches!(store.delete("trip"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn delete_photo_by_exact_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.create("trip", trip_info("Trip", "2024-01-01")).unwrap();
        let name = store.save_photo("trip", "shot.jpg", b"shot", false).unwrap();

        store.delete_photo("trip", &name).unwrap();
        assert!(matches!(
            store.delete_photo("trip", &name),
            Err(ApiError::NotFound(_))
        ));
    }
}
