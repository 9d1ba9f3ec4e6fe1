use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::Router;
use residencia_database::models::{Diet, DietAssignment, DietAssignmentForm, DietAssignmentView, DietForm};
use residencia_database::repositories::{diets, residents};
use residencia_database::Pool;

use super::{allow, not_found, ActivePayload};
use crate::auth::PHARMACY;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(PHARMACY, post(create)))
        .route("/asignaciones", allow(PHARMACY, post(assign)))
        .route("/asignaciones/residente/:resident_id", get(assignments))
        .route("/asignaciones/:id", allow(PHARMACY, delete(unassign)))
        .route("/:id", get(show))
        .route("/:id", allow(PHARMACY, put(update).delete(remove)))
        .route("/:id/estado", allow(PHARMACY, put(set_active)))
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<Diet>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(diets::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<Diet> {
    let mut connection = pool.get().await?;
    let diet = diets::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("diet", id))?;
    Ok(ApiResponse::data(diet))
}

async fn create(State(pool): State<Pool>, AppJson(form): AppJson<DietForm>) -> Created<Diet> {
    validation::not_blank("name", &form.name)?;
    let mut connection = pool.get().await?;
    let diet = diets::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(diet, "diet created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<DietForm>,
) -> ApiResult<Diet> {
    validation::not_blank("name", &form.name)?;
    let mut connection = pool.get().await?;
    let diet = diets::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("diet", id))?;
    Ok(ApiResponse::with_message(diet, "diet updated"))
}

async fn set_active(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ActivePayload>,
) -> ApiResult<Diet> {
    let mut connection = pool.get().await?;
    let diet = diets::set_active(&mut connection, id, payload.active()?)
        .await?
        .ok_or_else(|| not_found("diet", id))?;
    Ok(ApiResponse::with_message(diet, "diet status updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !diets::delete(&mut connection, id).await? {
        return Err(not_found("diet", id));
    }
    Ok(ApiResponse::message("diet deleted"))
}

async fn assign(
    State(pool): State<Pool>,
    AppJson(form): AppJson<DietAssignmentForm>,
) -> Created<DietAssignment> {
    validation::ordered(
        "startDate",
        &form.start_date,
        "endDate",
        form.end_date.as_ref(),
    )?;
    let mut connection = pool.get().await?;
    let diet = diets::find(&mut connection, form.diet_id)
        .await?
        .ok_or_else(|| not_found("diet", form.diet_id))?;
    if !diet.active {
        return Err(AppError::Conflict(format!(
            "diet {} is inactive and cannot be assigned",
            diet.name
        )));
    }
    let assignment = diets::insert_assignment(&mut connection, &form).await?;
    Ok(ApiResponse::created(assignment, "diet assigned"))
}

async fn assignments(
    State(pool): State<Pool>,
    AppPath(resident_id): AppPath<i32>,
) -> ApiResult<Vec<DietAssignmentView>> {
    let mut connection = pool.get().await?;
    if !residents::exists(&mut connection, resident_id).await? {
        return Err(not_found("resident", resident_id));
    }
    Ok(ApiResponse::data(
        diets::assignments_for(&mut connection, resident_id, false).await?,
    ))
}

async fn unassign(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !diets::delete_assignment(&mut connection, id).await? {
        return Err(not_found("diet assignment", id));
    }
    Ok(ApiResponse::message("diet assignment deleted"))
}
