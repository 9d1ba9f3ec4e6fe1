use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use residencia_database::models::{Treatment, TreatmentForm, TreatmentView};
use residencia_database::repositories::{residents, treatments};
use residencia_database::Pool;

use super::{allow, not_found, ActivePayload};
use crate::auth::ADMIN_OR_DOCTOR;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(ADMIN_OR_DOCTOR, post(create)))
        .route("/residente/:resident_id", get(for_resident))
        .route("/:id", get(show))
        .route("/:id", allow(ADMIN_OR_DOCTOR, put(update).delete(remove)))
        .route("/:id/estado", allow(ADMIN_OR_DOCTOR, put(set_active)))
}

fn validate(form: &TreatmentForm) -> Result<(), AppError> {
    validation::not_blank("dose", &form.dose)?;
    validation::not_blank("frequency", &form.frequency)?;
    validation::not_blank("route", &form.route)?;
    validation::ordered(
        "startDate",
        &form.start_date,
        "endDate",
        form.end_date.as_ref(),
    )
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<TreatmentView>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(treatments::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<TreatmentView> {
    let mut connection = pool.get().await?;
    let treatment = treatments::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("treatment", id))?;
    Ok(ApiResponse::data(treatment))
}

async fn for_resident(
    State(pool): State<Pool>,
    AppPath(resident_id): AppPath<i32>,
) -> ApiResult<Vec<TreatmentView>> {
    let mut connection = pool.get().await?;
    if !residents::exists(&mut connection, resident_id).await? {
        return Err(not_found("resident", resident_id));
    }
    Ok(ApiResponse::data(
        treatments::for_resident(&mut connection, resident_id, false).await?,
    ))
}

async fn create(
    State(pool): State<Pool>,
    AppJson(form): AppJson<TreatmentForm>,
) -> Created<Treatment> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let treatment = treatments::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(treatment, "treatment created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<TreatmentForm>,
) -> ApiResult<Treatment> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let treatment = treatments::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("treatment", id))?;
    Ok(ApiResponse::with_message(treatment, "treatment updated"))
}

async fn set_active(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ActivePayload>,
) -> ApiResult<Treatment> {
    let mut connection = pool.get().await?;
    let treatment = treatments::set_active(&mut connection, id, payload.active()?)
        .await?
        .ok_or_else(|| not_found("treatment", id))?;
    Ok(ApiResponse::with_message(treatment, "treatment status updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !treatments::delete(&mut connection, id).await? {
        return Err(not_found("treatment", id));
    }
    Ok(ApiResponse::message("treatment deleted"))
}
