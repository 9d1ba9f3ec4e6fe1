use axum::extract::State;
use axum::routing::get;
use axum::Router;
use residencia_database::models::{Incident, IncidentForm, IncidentView};
use residencia_database::repositories::incidents;
use residencia_database::Pool;

use super::not_found;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

const SEVERITIES: &[&str] = &["Leve", "Moderada", "Grave", "Muy Grave"];
const STATUSES: &[&str] = &["Pendiente", "En Proceso", "Resuelta"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

fn validate(form: &IncidentForm) -> Result<(), AppError> {
    validation::not_blank("description", &form.description)?;
    validation::not_blank("kind", &form.kind)?;
    validation::one_of("severity", &form.severity, SEVERITIES)?;
    validation::one_of("status", &form.status, STATUSES)
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<IncidentView>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(incidents::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<IncidentView> {
    let mut connection = pool.get().await?;
    let incident = incidents::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("incident", id))?;
    Ok(ApiResponse::data(incident))
}

/// Without an explicit reporter the incident is attributed to the caller's staff record.
async fn create(
    State(pool): State<Pool>,
    user: CurrentUser,
    AppJson(mut form): AppJson<IncidentForm>,
) -> Created<Incident> {
    validate(&form)?;
    form.reported_by = form.reported_by.or(user.staff_id);
    let mut connection = pool.get().await?;
    let incident = incidents::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(incident, "incident registered"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<IncidentForm>,
) -> ApiResult<Incident> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let incident = incidents::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("incident", id))?;
    Ok(ApiResponse::with_message(incident, "incident updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !incidents::delete(&mut connection, id).await? {
        return Err(not_found("incident", id));
    }
    Ok(ApiResponse::message("incident deleted"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn form(severity: &str, status: &str) -> IncidentForm {
        IncidentForm {
            occurred_at: Utc::now(),
            description: "Caída en el pasillo".to_owned(),
            kind: "Caída".to_owned(),
            severity: severity.to_owned(),
            status: status.to_owned(),
            notes: None,
            resident_id: Some(1),
            reported_by: None,
        }
    }

    #[test]
    fn severity_and_status_are_closed_sets() {
        assert!(validate(&form("Muy Grave", "En Proceso")).is_ok());
        assert!(validate(&form("Critica", "Pendiente")).is_err());
        assert!(validate(&form("Leve", "Cerrada")).is_err());
    }
}
