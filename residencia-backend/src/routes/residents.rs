use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::Router;
use residencia_database::models::{Resident, ResidentDetails, ResidentView};
use residencia_database::repositories::residents;
use residencia_database::Pool;

use super::{allow, not_found, ActivePayload};
use crate::auth::{CurrentUser, ADMIN, ADMIN_OR_DOCTOR};
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::services::residents::{self as service, ResidentPayload, RoomChangeOutcome, RoomChangePayload};
use crate::services::policy;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(ADMIN_OR_DOCTOR, post(create)))
        .route("/:id", get(show))
        .route("/:id", allow(ADMIN_OR_DOCTOR, put(update)))
        .route("/:id", allow(ADMIN, delete(remove)))
        .route("/:id/detalles-completos", get(details))
        .route("/:id/cambiar-habitacion", allow(ADMIN, put(change_room)))
        .route("/:id/estado", allow(ADMIN, put(set_active)))
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<ResidentView>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(residents::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<ResidentView> {
    let mut connection = pool.get().await?;
    let resident = residents::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("resident", id))?;
    Ok(ApiResponse::data(resident))
}

async fn details(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<ResidentDetails> {
    let mut connection = pool.get().await?;
    let details = residents::details(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("resident", id))?;
    Ok(ApiResponse::data(details))
}

async fn create(
    State(pool): State<Pool>,
    AppJson(payload): AppJson<ResidentPayload>,
) -> Created<Resident> {
    let resident = service::admit(&pool, &payload).await?;
    Ok(ApiResponse::created(resident, "resident created"))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ResidentPayload>,
) -> ApiResult<ResidentView> {
    let resident = service::update(
        &state.pool,
        id,
        &payload,
        user.staff_id,
        policy(&state.config),
    )
    .await?;
    Ok(ApiResponse::with_message(resident, "resident updated"))
}

async fn change_room(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<RoomChangePayload>,
) -> ApiResult<RoomChangeOutcome> {
    let outcome = service::change_room(
        &state.pool,
        id,
        payload,
        user.staff_id,
        policy(&state.config),
    )
    .await?;
    Ok(ApiResponse::with_message(outcome, "room changed"))
}

async fn set_active(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ActivePayload>,
) -> ApiResult<ResidentView> {
    let active = payload.active()?;
    let resident = service::set_active(&pool, id, active).await?;
    let message = if active {
        "resident activated"
    } else {
        "resident deactivated"
    };
    Ok(ApiResponse::with_message(resident, message))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    service::remove(&pool, id).await?;
    Ok(ApiResponse::message("resident deactivated"))
}
