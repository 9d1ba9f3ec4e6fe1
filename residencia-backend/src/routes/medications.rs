use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use residencia_database::models::{Medication, MedicationForm};
use residencia_database::repositories::medications;
use residencia_database::Pool;

use super::{allow, not_found};
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
        .route("/:id", get(show))
        .route("/:id", allow(PHARMACY, put(update).delete(remove)))
}

fn validate(form: &MedicationForm) -> Result<(), AppError> {
    validation::not_blank("name", &form.name)?;
    validation::non_negative("stock", form.stock)?;
    validation::non_negative("minimumStock", form.minimum_stock)
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<Medication>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(medications::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<Medication> {
    let mut connection = pool.get().await?;
    let medication = medications::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("medication", id))?;
    Ok(ApiResponse::data(medication))
}

async fn create(
    State(pool): State<Pool>,
    AppJson(form): AppJson<MedicationForm>,
) -> Created<Medication> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let medication = medications::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(medication, "medication created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<MedicationForm>,
) -> ApiResult<Medication> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let medication = medications::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("medication", id))?;
    Ok(ApiResponse::with_message(medication, "medication updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !medications::delete(&mut connection, id).await? {
        return Err(not_found("medication", id));
    }
    Ok(ApiResponse::message("medication deleted"))
}
