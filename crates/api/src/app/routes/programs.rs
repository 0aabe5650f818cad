use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use fittrack_auth::{require_role, Role};
use fittrack_core::ProgramId;
use fittrack_training::{NewProgram, ProgramPatch};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiError;
use crate::app::AppServices;
use crate::context::CurrentUser;

pub fn router(services: Arc<AppServices>) -> Router {
    let public = Router::new().route("/", get(list_programs));

    let admin = Router::new().route(
        "/",
        axum::routing::post(create_program)
            .patch(update_program)
            .delete(delete_program),
    );

    public.merge(super::protected(admin, services))
}

pub async fn list_programs(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Value>, ApiError> {
    let programs = services.store.list_programs().await?;
    dto::data(programs, "Programs")
}

pub async fn create_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::CreateProgramRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let new_program = NewProgram::new(&dto::required(body.name, "name")?)?;
    let program = services.store.create_program(new_program).await?;

    info!(program_id = %program.id, "program created");
    Ok(dto::created(program.id.get(), "Program was created"))
}

pub async fn update_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::UpdateProgramRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let id = ProgramId::new(dto::required(body.id, "id")?);
    let patch = ProgramPatch::new(body.name.as_deref())?;
    if patch.is_empty() {
        return Ok(dto::message("Nothing to update."));
    }

    services
        .store
        .update_program(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Program with id {id} not found")))?;

    Ok(dto::message(format!("Program with id {id} was updated")))
}

/// Deletes the program together with all of its exercises.
pub async fn delete_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::IdRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let id = ProgramId::new(dto::required(body.id, "id")?);
    match services.store.delete_program(id).await? {
        Some(deletion) => {
            info!(program_id = %id, exercises_deleted = deletion.exercises_deleted, "program deleted");
            Ok(Json(json!({
                "message": format!("Program with id {id} was deleted"),
                "exercisesDeleted": deletion.exercises_deleted,
            })))
        }
        None => Ok(dto::message(format!(
            "Program with id {id} was not deleted. Please check if it exists."
        ))),
    }
}
