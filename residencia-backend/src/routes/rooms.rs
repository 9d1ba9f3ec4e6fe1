use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use residencia_database::models::{Resident, RoomChangeView};
use residencia_database::repositories::rooms;
use residencia_database::Pool;
use residencia_occupancy::Room;

use super::{allow, not_found};
use crate::auth::ADMIN;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::services::rooms::{self as service, RoomPayload};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(ADMIN, post(create)))
        .route("/disponibles", get(available))
        .route("/:id", get(show))
        .route("/:id", allow(ADMIN, put(update).delete(remove)))
        .route("/:id/residentes", get(residents))
        .route("/:id/historial-cambios", get(history))
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<Room>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(rooms::list(&mut connection).await?))
}

async fn available(State(pool): State<Pool>) -> ApiResult<Vec<Room>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(rooms::list_available(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<Room> {
    let mut connection = pool.get().await?;
    let room = rooms::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("room", id))?;
    Ok(ApiResponse::data(room))
}

async fn residents(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<Vec<Resident>> {
    let mut connection = pool.get().await?;
    if rooms::find(&mut connection, id).await?.is_none() {
        return Err(not_found("room", id));
    }
    Ok(ApiResponse::data(rooms::residents(&mut connection, id).await?))
}

async fn history(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Vec<RoomChangeView>> {
    let mut connection = pool.get().await?;
    if rooms::find(&mut connection, id).await?.is_none() {
        return Err(not_found("room", id));
    }
    Ok(ApiResponse::data(rooms::history(&mut connection, id).await?))
}

async fn create(State(pool): State<Pool>, AppJson(payload): AppJson<RoomPayload>) -> Created<Room> {
    let room = service::create(&pool, &payload).await?;
    Ok(ApiResponse::created(room, "room created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<RoomPayload>,
) -> ApiResult<Room> {
    let room = service::update(&pool, id, &payload).await?;
    Ok(ApiResponse::with_message(room, "room updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    service::remove(&pool, id).await?;
    Ok(ApiResponse::message("room deleted"))
}
