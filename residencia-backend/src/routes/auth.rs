use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use residencia_database::models::NewUser;
use residencia_database::repositories::{staff, users};
use residencia_database::Pool;
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::info;

use super::allow;
use crate::auth::{hash_password, verify_password, CurrentUser, Role, TokenKeys, ADMIN};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

/// Routes reachable without a token.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Merged into the protected router rather than nested, so `/auth` can be shared with
/// [`public_router`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", allow(ADMIN, post(register)))
        .route("/auth/me", get(me))
        .route("/auth/change-password", post(change_password))
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    error: bool,
    message: &'static str,
    token: String,
    usuario: CurrentUser,
}

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
    username: Option<String>,
    password: Option<String>,
    rol: Option<String>,
    #[serde(rename = "personalId")]
    staff_id: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    current_password: Option<String>,
    new_password: Option<String>,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid username or password".to_owned())
}

async fn check_password(password: String, hash: String) -> Result<bool, AppError> {
    spawn_blocking(move || verify_password(&password, &hash)).await?
}

async fn new_hash(password: String) -> Result<String, AppError> {
    spawn_blocking(move || hash_password(&password)).await?
}

async fn login(
    State(pool): State<Pool>,
    State(keys): State<TokenKeys>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = validation::required("username", payload.username.as_deref())?;
    let password = validation::required("password", payload.password.as_deref())?;
    let mut connection = pool.get().await?;
    let account = users::find_active_by_username(&mut connection, username)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !check_password(password.to_owned(), account.user.password_hash.clone()).await? {
        return Err(invalid_credentials());
    }
    let role = account.user.role.parse::<Role>()?;
    users::touch_last_login(&mut connection, account.user.id).await?;
    let user = CurrentUser {
        id: account.user.id,
        username: account.user.username,
        role,
        staff_id: account.user.staff_id,
        full_name: account.staff_name,
    };
    let token = keys.issue(user.clone())?;
    info!(user = user.username, role = %user.role, "login");
    Ok(Json(LoginResponse {
        error: false,
        message: "login successful",
        token,
        usuario: user,
    }))
}

async fn register(
    State(pool): State<Pool>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Created<CurrentUser> {
    let username = validation::required("username", payload.username.as_deref())?;
    let password = validation::required("password", payload.password.as_deref())?;
    let role = validation::required("rol", payload.rol.as_deref())?.parse::<Role>()?;
    let mut connection = pool.get().await?;
    if users::username_taken(&mut connection, username).await? {
        return Err(AppError::Conflict(format!("username {username} is already taken")));
    }
    if let Some(staff_id) = payload.staff_id {
        if !staff::exists(&mut connection, staff_id).await? {
            return Err(AppError::Validation(format!(
                "staff member {staff_id} does not exist"
            )));
        }
    }
    let password_hash = new_hash(password.to_owned()).await?;
    let user = users::insert(
        &mut connection,
        NewUser {
            username,
            password_hash: &password_hash,
            role: role.as_str(),
            staff_id: payload.staff_id,
        },
    )
    .await?;
    info!(user = user.username, %role, "user registered");
    Ok(ApiResponse::created(
        CurrentUser {
            id: user.id,
            username: user.username,
            role,
            staff_id: user.staff_id,
            full_name: None,
        },
        "user registered",
    ))
}

async fn me(user: CurrentUser) -> ApiResult<CurrentUser> {
    Ok(ApiResponse::data(user))
}

async fn change_password(
    State(pool): State<Pool>,
    user: CurrentUser,
    AppJson(payload): AppJson<ChangePasswordPayload>,
) -> ApiResult<()> {
    let current = validation::required("currentPassword", payload.current_password.as_deref())?;
    let new = validation::required("newPassword", payload.new_password.as_deref())?;
    let mut connection = pool.get().await?;
    let stored = users::find(&mut connection, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user.id)))?;
    if !check_password(current.to_owned(), stored.password_hash).await? {
        return Err(AppError::Unauthorized("current password is incorrect".to_owned()));
    }
    let password_hash = new_hash(new.to_owned()).await?;
    users::set_password_hash(&mut connection, stored.id, &password_hash).await?;
    info!(user = user.username, "password changed");
    Ok(ApiResponse::message("password changed"))
}
