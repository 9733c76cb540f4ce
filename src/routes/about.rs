use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::about::PROFILE_IMAGE_URL;
use crate::store::AboutRecord;

use super::collect_image_uploads;

/// `GET /api/about`: the about record, empty-shaped when none exists.
pub async fn get_about(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.about.read())
}

/// `PUT /api/about`: replace the about record wholesale.
pub async fn put_about(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AboutRecord>,
) -> ApiResult<impl IntoResponse> {
    state.store.about.write(&record)?;
    Ok(Json(record))
}

/// `POST /api/about/photo`: overwrite the fixed-path profile image.
///
/// The returned URL carries a cache-busting query parameter since the
/// on-disk name never changes.
pub async fn upload_profile_photo(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let files = collect_image_uploads(&mut multipart, "photo", &state.config).await?;
    let file = &files[0];
    state.store.about.save_profile_image(&file.data)?;

    tracing::info!(bytes = file.data.len(), "profile image replaced");
    Ok(Json(json!({
        "profileImage": format!(
            "{PROFILE_IMAGE_URL}?v={}",
            chrono::Utc::now().timestamp_millis()
        ),
    })))
}
