//! Image metadata extraction.
//!
//! [`read_photo`] turns an on-disk image into the [`Photo`] view the listing
//! endpoints serve. It must never fail the caller: corrupt images, missing
//! EXIF blocks, and unsupported formats all degrade to safe defaults so one
//! bad file cannot break a whole listing.

use std::fs;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{In, Tag, Value};
use serde::Serialize;

/// Derived view of a single photo file. Never persisted; synthesized on
/// every read by scanning a directory.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub name: String,
    pub url: String,
    pub date_taken: DateTime<Utc>,
    pub camera: String,
    pub lens: String,
    pub width: u32,
    pub height: u32,
}

/// EXIF date strings: colon-separated date, space, colon-separated time.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Build a [`Photo`] record for the file at `path`, to be served at `url`.
///
/// Dimensions come from the image header only; capture metadata from the
/// EXIF block when one parses. Any internal error yields a degraded record
/// (empty camera/lens, zero dimensions, best-available timestamp) instead
/// of propagating.
pub fn read_photo(path: &Path, url: &str) -> Photo {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (width, height) = image::image_dimensions(path).unwrap_or((0, 0));

    let exif = read_exif(path);
    let camera = exif.as_ref().map(camera_label).unwrap_or_default();
    let lens = exif
        .as_ref()
        .and_then(|e| ascii_field(e, Tag::LensModel))
        .unwrap_or_default();

    let fs_meta = fs::metadata(path).ok();
    let created = fs_meta
        .as_ref()
        .and_then(|m| m.created().ok())
        .map(DateTime::<Utc>::from);
    let modified = fs_meta
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Utc>::from);
    let exif_original = exif.as_ref().and_then(|e| exif_datetime(e, Tag::DateTimeOriginal));
    let exif_modify = exif.as_ref().and_then(|e| exif_datetime(e, Tag::DateTime));

    Photo {
        name,
        url: url.to_string(),
        date_taken: resolve_date_taken(exif_original, exif_modify, created, modified),
        camera,
        lens,
        width,
        height,
    }
}

/// Date-taken precedence: EXIF `DateTimeOriginal`, then EXIF image-modify
/// date, then filesystem creation time, then last-modified time, and only
/// on total failure the extraction wall-clock time.
pub fn resolve_date_taken(
    exif_original: Option<DateTime<Utc>>,
    exif_modify: Option<DateTime<Utc>>,
    fs_created: Option<DateTime<Utc>>,
    fs_modified: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    exif_original
        .or(exif_modify)
        .or(fs_created)
        .or(fs_modified)
        .unwrap_or_else(Utc::now)
}

/// Parse an EXIF block, treating any failure (no block, malformed binary)
/// as "no EXIF".
fn read_exif(path: &Path) -> Option<exif::Exif> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader).ok()
}

/// First ASCII value of an EXIF field, trimmed; `None` when absent or empty.
fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => values
            .first()
            .map(|v| String::from_utf8_lossy(v).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn exif_datetime(exif: &exif::Exif, tag: Tag) -> Option<DateTime<Utc>> {
    ascii_field(exif, tag).as_deref().and_then(parse_exif_datetime)
}

/// Parse `YYYY:MM:DD HH:MM:SS`; a non-matching string yields no date so the
/// precedence chain continues to the next source.
pub(crate) fn parse_exif_datetime(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// `"<Make> <Model>"` when Make is present, else empty string.
fn camera_label(exif: &exif::Exif) -> String {
    match ascii_field(exif, Tag::Make) {
        Some(make) => match ascii_field(exif, Tag::Model) {
            Some(model) => format!("{make} {model}"),
            None => make,
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn exif_datetime_parses_the_colon_format() {
        let parsed = parse_exif_datetime("2024:06:15 10:30:00").unwrap();
        assert_eq!(parsed, ts("2024-06-15 10:30:00"));
    }

    #[test]
    fn exif_datetime_rejects_other_formats() {
        assert!(parse_exif_datetime("2024-06-15 10:30:00").is_none());
        assert!(parse_exif_datetime("not a date").is_none());
        assert!(parse_exif_datetime("").is_none());
        assert!(parse_exif_datetime("2024:13:99 10:30:00").is_none());
    }

    #[test]
    fn date_precedence_prefers_exif_original() {
        let original = ts("2020-01-01 00:00:00");
        let modify = ts("2021-01-01 00:00:00");
        let created = ts("2022-01-01 00:00:00");
        let modified = ts("2023-01-01 00:00:00");

        assert_eq!(
            resolve_date_taken(Some(original), Some(modify), Some(created), Some(modified)),
            original
        );
        assert_eq!(
            resolve_date_taken(None, Some(modify), Some(created), Some(modified)),
            modify
        );
        assert_eq!(
            resolve_date_taken(None, None, Some(created), Some(modified)),
            created
        );
        assert_eq!(resolve_date_taken(None, None, None, Some(modified)), modified);
    }

    #[test]
    fn date_precedence_falls_back_to_now_on_total_failure() {
        let before = Utc::now();
        let resolved = resolve_date_taken(None, None, None, None);
        let after = Utc::now();
        assert!(resolved >= before && resolved <= after);
    }

    #[test]
    fn read_photo_without_exif_uses_filesystem_time() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        let before = Utc::now();
        create_test_jpeg(&path, 320, 240);
        let after = Utc::now();

        let photo = read_photo(&path, "/images/plain.jpg");
        assert_eq!(photo.name, "plain.jpg");
        assert_eq!(photo.url, "/images/plain.jpg");
        assert_eq!((photo.width, photo.height), (320, 240));
        assert_eq!(photo.camera, "");
        assert_eq!(photo.lens, "");
        // No EXIF, so the date comes from the file's own timestamps.
        assert!(photo.date_taken >= before - chrono::Duration::seconds(2));
        assert!(photo.date_taken <= after + chrono::Duration::seconds(2));
    }

    #[test]
    fn read_photo_degrades_on_corrupt_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("garbage.jpg");
        std::fs::write(&path, b"this is not an image at all").unwrap();

        let photo = read_photo(&path, "/images/garbage.jpg");
        assert_eq!((photo.width, photo.height), (0, 0));
        assert_eq!(photo.camera, "");
        assert_eq!(photo.lens, "");
    }

    #[test]
    fn read_photo_degrades_on_missing_file() {
        let before = Utc::now();
        let photo = read_photo(Path::new("/nonexistent/missing.jpg"), "/images/missing.jpg");
        assert_eq!((photo.width, photo.height), (0, 0));
        assert!(photo.date_taken >= before - chrono::Duration::seconds(2));
    }
}
