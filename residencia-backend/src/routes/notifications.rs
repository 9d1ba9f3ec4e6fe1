use axum::extract::State;
use axum::routing::post;
use axum::Router;
use serde::Serialize;

use super::allow;
use crate::auth::ADMIN;
use crate::notifications;
use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    emails_sent: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verificar-stock", allow(ADMIN, post(check_stock)))
        .route("/resumen-medicamentos", allow(ADMIN, post(daily_summary)))
}

async fn check_stock(State(state): State<AppState>) -> ApiResult<Delivery> {
    let emails_sent = notifications::check_stock_and_notify(
        &state.pool,
        state.mailer.as_ref(),
        &state.config.notifications,
    )
    .await?;
    Ok(ApiResponse::with_message(
        Delivery { emails_sent },
        format!("stock check finished, {emails_sent} email(s) sent"),
    ))
}

async fn daily_summary(State(state): State<AppState>) -> ApiResult<Delivery> {
    let emails_sent = notifications::send_daily_medication_summary(
        &state.pool,
        state.mailer.as_ref(),
        &state.config.notifications,
    )
    .await?;
    Ok(ApiResponse::with_message(
        Delivery { emails_sent },
        format!("medication summary sent to {emails_sent} resident(s)"),
    ))
}
