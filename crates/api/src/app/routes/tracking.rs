use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use fittrack_core::{ExerciseId, HistoryId};
use fittrack_infra::StoreError;
use fittrack_training::NewHistoryEntry;

use crate::app::dto::{self, ApiJson, TrackingItem};
use crate::app::errors::ApiError;
use crate::app::AppServices;
use crate::context::CurrentUser;

/// Every tracking route requires a session; entries are always the caller's own.
pub fn router(services: Arc<AppServices>) -> Router {
    super::protected(
        Router::new().route("/", get(list_entries).post(create_entry).delete(delete_entry)),
        services,
    )
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let entries: Vec<TrackingItem> = services
        .store
        .list_history_for_user(current.user_id())
        .await?
        .into_iter()
        .map(TrackingItem::from)
        .collect();

    dto::data(entries, "Tracking entries")
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::CreateTrackingRequest>,
) -> Result<Json<Value>, ApiError> {
    let exercise_id = ExerciseId::new(dto::required(body.exercise_id, "exerciseID")?);
    let entry = NewHistoryEntry::new(
        current.user_id(),
        exercise_id,
        body.date_of_completion,
        body.duration,
        Utc::now(),
    )?;

    let record = match services.store.create_history(entry).await {
        Ok(record) => record,
        Err(StoreError::MissingReference(_)) => {
            return Err(ApiError::UnknownExercise(format!(
                "Exercise with id {exercise_id} does not exist"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    info!(history_id = %record.id, user_id = %record.user_id, "tracking entry created");
    Ok(dto::created(record.id.get(), "Tracking entry was created"))
}

/// Deletes only the caller's own entry; anything else reports "not deleted".
pub async fn delete_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::IdRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = HistoryId::new(dto::required(body.id, "id")?);

    if services.store.delete_history_owned(id, current.user_id()).await? {
        Ok(dto::message(format!("Tracking entry with id {id} was deleted")))
    } else {
        Ok(dto::message(format!("Tracking entry with id {id} was not deleted.")))
    }
}
