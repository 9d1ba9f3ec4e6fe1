pub mod activities;
pub mod auth;
pub mod diets;
pub mod incidents;
pub mod medications;
pub mod notifications;
pub mod residents;
pub mod rooms;
pub mod staff;
pub mod treatments;
pub mod visits;

use axum::middleware::from_fn_with_state;
use axum::routing::MethodRouter;
use serde::Deserialize;

use crate::auth::{require_role, Role};
use crate::error::AppError;
use crate::AppState;

/// Body of the `/:id/estado` endpoints.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ActivePayload {
    #[serde(rename = "Activo")]
    pub active: Option<bool>,
}

impl ActivePayload {
    pub fn active(self) -> Result<bool, AppError> {
        self.active
            .ok_or_else(|| AppError::Validation("Activo is required".to_owned()))
    }
}

/// Restricts `route` to callers with one of `roles`.
pub fn allow(roles: &'static [Role], route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(roles, require_role))
}

pub(crate) fn not_found(entity: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{entity} {id} not found"))
}
