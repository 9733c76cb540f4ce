use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

use super::collect_image_uploads;

/// `GET /api/photos`: the moments photo wall, newest capture first.
pub async fn list_photos(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let photos = state.store.moments.list()?;
    Ok(Json(photos))
}

/// `POST /api/photos`: multi-file upload into the moments collection.
///
/// Each stored file gets a thumbnail job queued on the background worker;
/// the response does not wait for (or report on) thumbnail generation.
pub async fn upload_photos(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let files = collect_image_uploads(&mut multipart, "photos", &state.config).await?;

    let mut uploaded = Vec::with_capacity(files.len());
    for file in &files {
        let stored = state.store.moments.save(&file.original_name, &file.data)?;
        state.thumbs.enqueue(&stored.path, &stored.thumb_path);
        uploaded.push(json!({ "name": stored.name, "url": stored.url }));
    }

    tracing::info!(count = uploaded.len(), "moments photos uploaded");
    Ok(Json(json!({ "uploaded": uploaded })))
}

/// `DELETE /api/photos/{filename}`: remove one moments photo and,
/// best-effort, its thumbnail.
pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let name = state.store.moments.delete(&filename)?;
    Ok(Json(json!({ "deleted": name })))
}
