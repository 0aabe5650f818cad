use axum::extract::FromRequest;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use fittrack_core::{DomainError, HistoryId, ProgramId};
use fittrack_training::{Difficulty, HistoryWithExercise};

use crate::app::errors::ApiError;

/// `Json` whose rejections (bad syntax, wrong types, missing content type)
/// become 400 `validation_error` responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nick_name: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nick_name: Option<String>,
    pub age: Option<i32>,
    pub role: Option<String>,
}

/// Body of every delete endpoint.
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgramRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    #[serde(rename = "programID")]
    pub program_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExerciseRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub difficulty: Option<String>,
    /// Accepted only to reject it: the owning program is immutable.
    #[serde(rename = "programID")]
    pub program_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "programID")]
    pub program_id: Option<String>,
    pub search: Option<String>,
}

/// Any `userID` sent by the client is ignored; the owner is the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackingRequest {
    #[serde(rename = "exerciseID")]
    pub exercise_id: Option<i64>,
    pub date_of_completion: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingItem {
    pub id: HistoryId,
    pub date_of_completion: DateTime<Utc>,
    pub duration: i32,
    pub exercise: TrackedExercise,
}

#[derive(Debug, Serialize)]
pub struct TrackedExercise {
    pub name: String,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "programID")]
    pub program_id: ProgramId,
}

impl From<HistoryWithExercise> for TrackingItem {
    fn from(row: HistoryWithExercise) -> Self {
        Self {
            id: row.entry.id,
            date_of_completion: row.entry.date_of_completion,
            duration: row.entry.duration,
            exercise: TrackedExercise {
                name: row.exercise.name,
                difficulty: row.exercise.difficulty,
                program_id: row.exercise.program_id,
            },
        }
    }
}

// -------------------------
// Envelopes and helpers
// -------------------------

/// `{"data": ..., "message": ...}`
pub fn data(payload: impl Serialize, message: &str) -> Result<Json<Value>, ApiError> {
    let data = serde_json::to_value(payload).map_err(|e| ApiError::Internal(format!("serialize response: {e}")))?;
    Ok(Json(json!({ "data": data, "message": message })))
}

/// `{"message": ...}`
pub fn message(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": message.into() }))
}

/// `{"id": ..., "message": ...}`
pub fn created(id: i64, message: &str) -> Json<Value> {
    Json(json!({ "id": id, "message": message }))
}

pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

/// Required, non-blank string field.
pub fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    required(value.filter(|v| !v.trim().is_empty()), field)
}

pub fn parse_difficulty(raw: Option<&str>) -> Result<Option<Difficulty>, ApiError> {
    raw.map(|d| d.parse::<Difficulty>())
        .transpose()
        .map_err(|e: DomainError| ApiError::InvalidDifficulty(e.detail().to_string()))
}
