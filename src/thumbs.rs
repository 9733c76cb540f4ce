//! Background thumbnail generation.
//!
//! Thumbnailing is fire-and-forget relative to the upload request that
//! triggers it: jobs go onto an explicit queue drained by a dedicated
//! worker task, the request responds immediately, and failures are logged
//! rather than surfaced to the uploading client. Modeling the queue as a
//! value (instead of an unawaited call) keeps completion observable for
//! tests and shutdown.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use image::imageops::FilterType;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Thumbnails are square center-crops at this edge length.
pub const THUMB_SIZE: u32 = 400;

/// JPEG encode quality for thumbnails.
pub const THUMB_QUALITY: u8 = 80;

/// One pending thumbnail derivation.
#[derive(Debug)]
pub struct ThumbJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Handle for enqueueing thumbnail jobs onto the background worker.
///
/// Clones share one underlying sender, so a single [`Thumbnailer::close`]
/// shuts the queue for all of them.
#[derive(Clone)]
pub struct Thumbnailer {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<ThumbJob>>>>,
}

impl Thumbnailer {
    /// Spawn the worker task and return a handle to it.
    ///
    /// The worker drains jobs until the queue is closed (via [`close`] or
    /// by dropping every clone); awaiting the returned `JoinHandle` after
    /// that observes drain completion.
    ///
    /// [`close`]: Thumbnailer::close
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ThumbJob>();
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let dest = job.dest.clone();
                let result =
                    tokio::task::spawn_blocking(move || generate_thumbnail(&job.source, &job.dest))
                        .await;
                match result {
                    Ok(Ok(())) => {
                        tracing::debug!(dest = %dest.display(), "thumbnail written");
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(dest = %dest.display(), error = %err, "thumbnail generation failed");
                    }
                    Err(err) => {
                        tracing::warn!(dest = %dest.display(), error = %err, "thumbnail task panicked");
                    }
                }
            }
        });
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            worker,
        )
    }

    /// Queue a job. Never blocks and never reports failure to the caller.
    pub fn enqueue(&self, source: impl Into<PathBuf>, dest: impl Into<PathBuf>) {
        let job = ThumbJob {
            source: source.into(),
            dest: dest.into(),
        };
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let sent = guard.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            tracing::warn!("thumbnail queue is closed; dropping job");
        }
    }

    /// Close the queue: no further jobs are accepted, the worker finishes
    /// whatever is already queued and then exits. Awaiting the handle from
    /// [`Thumbnailer::spawn`] afterwards observes the drain.
    pub fn close(&self) {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Derive a fixed-size center-cropped JPEG from `source` at `dest`,
/// creating destination directories as needed.
pub fn generate_thumbnail(source: &Path, dest: &Path) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating thumbnail directory {}", parent.display()))?;
    }
    let img = image::ImageReader::open(source)
        .with_context(|| format!("opening {}", source.display()))?
        .decode()
        .with_context(|| format!("decoding {}", source.display()))?;
    // resize_to_fill scales the short edge to fit, then center-crops.
    let thumb = img
        .resize_to_fill(THUMB_SIZE, THUMB_SIZE, FilterType::Lanczos3)
        .to_rgb8();
    let file = std::fs::File::create(dest)
        .with_context(|| format!("creating {}", dest.display()))?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, THUMB_QUALITY);
    thumb
        .write_with_encoder(encoder)
        .context("encoding thumbnail jpeg")?;
    Ok(())
}
