//! The moments collection: a flat directory of casual photos not attached
//! to any journal, with derived thumbnails alongside.

use std::fs;
#[cfg(test)]
use std::path::Path;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};
use crate::metadata::{read_photo, Photo};
use crate::sanitize::sanitize_segment;

use super::{is_hidden, is_image_name, timestamped_name};

/// A freshly stored moments photo, ready for thumbnail dispatch.
#[derive(Debug)]
pub struct StoredMoment {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
    pub thumb_path: PathBuf,
}

pub struct MomentStore {
    images_dir: PathBuf,
    thumbnails_dir: PathBuf,
}

impl MomentStore {
    pub fn new(images_dir: PathBuf, thumbnails_dir: PathBuf) -> Self {
        Self {
            images_dir,
            thumbnails_dir,
        }
    }

    /// Enumerate moments photos, newest capture first.
    ///
    /// This is the one read path without graceful degradation: the images
    /// directory is expected to always exist, so a read failure is an
    /// internal error. Per-file metadata extraction still degrades.
    pub fn list(&self) -> ApiResult<Vec<Photo>> {
        let entries = fs::read_dir(&self.images_dir).map_err(|err| {
            ApiError::Internal(format!(
                "reading moments directory {}: {err}",
                self.images_dir.display()
            ))
        })?;

        let mut photos = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) || !is_image_name(&name) {
                continue;
            }
            let url = format!("/images/{name}");
            photos.push(read_photo(&entry.path(), &url));
        }
        photos.sort_by(|a, b| b.date_taken.cmp(&a.date_taken));
        Ok(photos)
    }

    /// Persist an uploaded photo under a timestamped, sanitized name.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> ApiResult<StoredMoment> {
        let name = timestamped_name(original_name);
        let path = self.images_dir.join(&name);
        fs::write(&path, bytes)?;
        Ok(StoredMoment {
            url: format!("/images/{name}"),
            path,
            thumb_path: self.thumbnails_dir.join(&name),
            name,
        })
    }

    /// Delete a photo by its on-disk generated name, plus its thumbnail
    /// best-effort.
    pub fn delete(&self, filename: &str) -> ApiResult<String> {
        let name = sanitize_segment(filename);
        let path = self.images_dir.join(&name);
        if !path.is_file() {
            return Err(ApiError::NotFound(format!("no photo named {name}")));
        }
        fs::remove_file(&path)?;
        let _ = fs::remove_file(self.thumbnails_dir.join(&name));
        Ok(name)
    }

    #[cfg(test)]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};
    use std::time::Duration;

    fn store(tmp: &tempfile::TempDir) -> MomentStore {
        let images = tmp.path().join("images");
        let thumbs = tmp.path().join("thumbnails");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&thumbs).unwrap();
        MomentStore::new(images, thumbs)
    }

    fn write_test_jpeg(path: &Path) {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let file = fs::File::create(path).unwrap();
        image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
            .write_image(img.as_raw(), 4, 4, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn listing_skips_dotfiles_and_non_images() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        write_test_jpeg(&store.images_dir().join("keep.jpg"));
        fs::write(store.images_dir().join(".hidden.jpg"), b"x").unwrap();
        fs::write(store.images_dir().join("notes.txt"), b"x").unwrap();

        let photos = store.list().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].name, "keep.jpg");
        assert_eq!(photos[0].url, "/images/keep.jpg");
    }

    #[test]
    fn listing_is_sorted_descending_by_date_taken() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        write_test_jpeg(&store.images_dir().join("older.jpg"));
        std::thread::sleep(Duration::from_millis(50));
        write_test_jpeg(&store.images_dir().join("newer.jpg"));

        let photos = store.list().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].name, "newer.jpg");
        for pair in photos.windows(2) {
            assert!(pair[0].date_taken >= pair[1].date_taken);
        }
    }

    #[test]
    fn listing_fails_hard_when_the_directory_is_gone() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = MomentStore::new(
            tmp.path().join("does-not-exist"),
            tmp.path().join("thumbnails"),
        );
        assert!(matches!(store.list(), Err(ApiError::Internal(_))));
    }

    #[test]
    fn save_then_delete_round_trips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);

        let stored = store.save("My Pic.jpg", b"fake bytes").unwrap();
        assert!(stored.path.is_file());
        assert!(stored.name.ends_with("-My_Pic.jpg"));

        let deleted = store.delete(&stored.name).unwrap();
        assert_eq!(deleted, stored.name);
        assert!(!stored.path.exists());
    }

    #[test]
    fn delete_missing_photo_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(matches!(
            store.delete("nope.jpg"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn delete_sanitizes_traversal_attempts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let outside = tmp.path().join("secret.txt");
        fs::write(&outside, b"keep me").unwrap();
        let store = store(&tmp);

        // Sanitized name cannot climb out of the images directory.
        assert!(store.delete("../secret.txt").is_err());
        assert!(outside.exists());
    }
}
