use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use residencia_database::models::{Staff, StaffForm};
use residencia_database::repositories::staff;
use residencia_database::Pool;

use super::{allow, not_found, ActivePayload};
use crate::auth::ADMIN;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(ADMIN, post(create)))
        .route("/:id", get(show))
        .route("/:id", allow(ADMIN, put(update).delete(remove)))
        .route("/:id/estado", allow(ADMIN, put(set_active)))
}

fn validate(form: &StaffForm) -> Result<(), AppError> {
    validation::not_blank("nationalId", &form.national_id)?;
    validation::not_blank("name", &form.name)?;
    validation::not_blank("surname", &form.surname)?;
    validation::not_blank("category", &form.category)?;
    if let Some(email) = form.email.as_deref().filter(|email| !email.is_empty()) {
        validation::email("email", email)?;
    }
    Ok(())
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<Staff>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(staff::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<Staff> {
    let mut connection = pool.get().await?;
    let member = staff::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("staff member", id))?;
    Ok(ApiResponse::data(member))
}

async fn create(State(pool): State<Pool>, AppJson(form): AppJson<StaffForm>) -> Created<Staff> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let member = staff::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(member, "staff member created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<StaffForm>,
) -> ApiResult<Staff> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let member = staff::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("staff member", id))?;
    Ok(ApiResponse::with_message(member, "staff member updated"))
}

async fn set_active(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ActivePayload>,
) -> ApiResult<Staff> {
    let mut connection = pool.get().await?;
    let member = staff::set_active(&mut connection, id, payload.active()?)
        .await?
        .ok_or_else(|| not_found("staff member", id))?;
    Ok(ApiResponse::with_message(member, "staff status updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !staff::delete(&mut connection, id).await? {
        return Err(not_found("staff member", id));
    }
    Ok(ApiResponse::message("staff member deleted"))
}
