use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::{JournalInfo, JournalPatch};

use super::collect_image_uploads;

/// Body for `POST /api/journals`.
#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

/// Query for `POST /api/journals/{id}/photos`: `?cover=true` stores the
/// file at the fixed cover filename instead of a timestamped name.
#[derive(Debug, Deserialize)]
pub struct JournalPhotoQuery {
    #[serde(default)]
    pub cover: bool,
}

/// `GET /api/journals`: journal summaries, newest date first.
pub async fn list_journals(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let journals = state.store.journals.list()?;
    Ok(Json(journals))
}

/// `GET /api/journals/{id}`: one journal with its photo gallery.
pub async fn get_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let journal = state.store.journals.get(&id)?;
    Ok(Json(journal))
}

/// `POST /api/journals`: create directory plus sidecar, cover defaulted.
pub async fn create_journal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateJournalRequest>,
) -> ApiResult<impl IntoResponse> {
    let info = JournalInfo {
        title: request.title,
        date: request.date,
        description: request.description,
        ..JournalInfo::default()
    };
    let summary = state.store.journals.create(&request.id, info)?;
    tracing::info!(journal = %summary.id, "journal created");
    Ok(Json(summary))
}

/// `PUT /api/journals/{id}`: merge-on-write partial update.
pub async fn update_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<JournalPatch>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.store.journals.update(&id, &patch)?;
    Ok(Json(summary))
}

/// `DELETE /api/journals/{id}`: recursive directory removal.
pub async fn delete_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = state.store.journals.delete(&id)?;
    tracing::info!(journal = %id, "journal deleted");
    Ok(Json(json!({ "deleted": id })))
}

/// `POST /api/journals/{id}/photos`: upload into an existing journal.
///
/// In cover mode only the first file is stored (as the cover); journal
/// uploads never trigger thumbnailing.
pub async fn upload_journal_photos(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<JournalPhotoQuery>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let id = crate::sanitize::sanitize_segment(&id);
    let files = collect_image_uploads(&mut multipart, "photos", &state.config).await?;

    // Cover mode stores only the first file
    let files = if query.cover { &files[..1] } else { &files[..] };

    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let name = state
            .store
            .journals
            .save_photo(&id, &file.original_name, &file.data, query.cover)?;
        let url = format!("/content/journals/{id}/{name}");
        uploaded.push(json!({ "name": name, "url": url }));
    }

    tracing::info!(journal = %id, count = uploaded.len(), "journal photos uploaded");
    Ok(Json(json!({ "uploaded": uploaded })))
}

/// `DELETE /api/journals/{id}/photos/{filename}`: remove one photo file.
pub async fn delete_journal_photo(
    State(state): State<Arc<AppState>>,
    Path((id, filename)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let name = state.store.journals.delete_photo(&id, &filename)?;
    Ok(Json(json!({ "deleted": name })))
}
