use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use fittrack_auth::{require_role, Role};
use fittrack_core::{ExerciseId, PageRequest, ProgramId};
use fittrack_infra::{ExerciseFilter, StoreError};
use fittrack_training::{ExercisePatch, NewExercise};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiError;
use crate::app::AppServices;
use crate::context::CurrentUser;

pub fn router(services: Arc<AppServices>) -> Router {
    let public = Router::new().route("/", get(list_exercises));

    let admin = Router::new().route(
        "/",
        post(create_exercise).patch(update_exercise).delete(delete_exercise),
    );

    public.merge(super::protected(admin, services))
}

fn parse_page(page: Option<&str>, limit: Option<&str>) -> Result<Option<PageRequest>, ApiError> {
    let number = |raw: &str, field: &str| {
        raw.trim()
            .parse::<u32>()
            .map_err(|_| ApiError::Validation(format!("{field} must be a positive integer")))
    };

    match (page, limit) {
        (None, None) => Ok(None),
        (Some(page), Some(limit)) => Ok(Some(PageRequest::new(number(page, "page")?, number(limit, "limit")?)?)),
        _ => Err(ApiError::Validation("page and limit must be given together".to_string())),
    }
}

fn filter_from_query(query: dto::ExerciseListQuery) -> Result<ExerciseFilter, ApiError> {
    Ok(ExerciseFilter {
        program_id: query.program_id.as_deref().map(str::parse::<ProgramId>).transpose()?,
        search: query.search.filter(|s| !s.trim().is_empty()),
        page: parse_page(query.page.as_deref(), query.limit.as_deref())?,
    })
}

/// Public listing; supports `programID`, `search`, and `page` + `limit`.
pub async fn list_exercises(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ExerciseListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let filter = filter_from_query(query)?;
    let exercises = services.store.list_exercises(&filter).await?;
    dto::data(exercises, "Exercises")
}

pub async fn create_exercise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::CreateExerciseRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let program_id = ProgramId::new(dto::required(body.program_id, "programID")?);
    let difficulty = dto::parse_difficulty(body.difficulty.as_deref())?;
    let new_exercise = NewExercise::new(&dto::required(body.name, "name")?, difficulty, program_id)?;

    let exercise = match services.store.create_exercise(new_exercise).await {
        Ok(exercise) => exercise,
        Err(StoreError::MissingReference(_)) => {
            return Err(ApiError::UnknownProgram(format!("Program with id {program_id} does not exist")));
        }
        Err(e) => return Err(e.into()),
    };

    info!(exercise_id = %exercise.id, program_id = %program_id, "exercise created");
    Ok(dto::created(exercise.id.get(), "Exercise was created"))
}

pub async fn update_exercise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::UpdateExerciseRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    if body.program_id.is_some() {
        return Err(ApiError::Validation("programID cannot be changed".to_string()));
    }

    let id = ExerciseId::new(dto::required(body.id, "id")?);
    let patch = ExercisePatch::new(body.name.as_deref(), dto::parse_difficulty(body.difficulty.as_deref())?)?;
    if patch.is_empty() {
        return Ok(dto::message("Nothing to update."));
    }

    services
        .store
        .update_exercise(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Exercise with id {id} not found")))?;

    Ok(dto::message(format!("Exercise with id {id} was updated")))
}

pub async fn delete_exercise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::IdRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let id = ExerciseId::new(dto::required(body.id, "id")?);
    if services.store.delete_exercise(id).await? {
        info!(exercise_id = %id, "exercise deleted");
        Ok(dto::message(format!("Exercise with id {id} was deleted")))
    } else {
        Ok(dto::message(format!(
            "Exercise with id {id} was not deleted. Please check if it exists."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_needs_both_parameters() {
        assert_eq!(parse_page(None, None).unwrap(), None);
        assert!(parse_page(Some("1"), None).is_err());
        assert!(parse_page(None, Some("10")).is_err());
        let page = parse_page(Some("2"), Some("10")).unwrap().unwrap();
        assert_eq!(page.offset(), 10);
    }

    #[test]
    fn pagination_bounds() {
        assert!(parse_page(Some("0"), Some("10")).is_err());
        assert!(parse_page(Some("1"), Some("0")).is_err());
        assert!(parse_page(Some("1"), Some("101")).is_err());
        assert!(parse_page(Some("-1"), Some("10")).is_err());
        assert!(parse_page(Some("x"), Some("10")).is_err());
    }

    #[test]
    fn program_filter_must_be_numeric() {
        let query = dto::ExerciseListQuery {
            page: None,
            limit: None,
            program_id: Some("abc".into()),
            search: None,
        };
        let err = filter_from_query(query).unwrap_err();
        assert_eq!(err.code(), "invalid_id");
    }
}
