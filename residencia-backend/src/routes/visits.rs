use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use residencia_database::models::{Visit, VisitForm, VisitView};
use residencia_database::repositories::visits;
use residencia_database::Pool;

use super::{allow, not_found};
use crate::auth::FRONT_DESK;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(FRONT_DESK, post(create)))
        .route("/:id", get(show))
        .route("/:id", allow(FRONT_DESK, put(update).delete(remove)))
}

fn validate(form: &VisitForm) -> Result<(), AppError> {
    validation::not_blank("visitorName", &form.visitor_name)?;
    validation::ordered("enteredAt", &form.entered_at, "leftAt", form.left_at.as_ref())
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<VisitView>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(visits::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<VisitView> {
    let mut connection = pool.get().await?;
    let visit = visits::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("visit", id))?;
    Ok(ApiResponse::data(visit))
}

async fn create(State(pool): State<Pool>, AppJson(form): AppJson<VisitForm>) -> Created<Visit> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let visit = visits::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(visit, "visit registered"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<VisitForm>,
) -> ApiResult<Visit> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let visit = visits::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("visit", id))?;
    Ok(ApiResponse::with_message(visit, "visit updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !visits::delete(&mut connection, id).await? {
        return Err(not_found("visit", id));
    }
    Ok(ApiResponse::message("visit deleted"))
}
