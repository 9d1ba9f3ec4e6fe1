use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::Router;
use diesel_async::scoped_futures::ScopedFutureExt;
use residencia_database::models::{Activity, ActivityForm, ActivityView, Participant, ParticipantView};
use residencia_database::repositories::{activities, residents};
use residencia_database::{transaction, Pool};
use tracing::info;

use super::{allow, not_found};
use crate::auth::CARE_STAFF;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::validation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", allow(CARE_STAFF, post(create)))
        .route("/:id", get(show))
        .route("/:id", allow(CARE_STAFF, put(update).delete(remove)))
        .route("/:id/participantes", get(participants))
        .route("/:id/participantes", allow(CARE_STAFF, post(add_participant)))
        .route(
            "/:id/participantes/:resident_id",
            allow(CARE_STAFF, delete(remove_participant)),
        )
}

fn validate(form: &ActivityForm) -> Result<(), AppError> {
    validation::not_blank("name", &form.name)?;
    validation::ordered("startsAt", &form.starts_at, "endsAt", form.ends_at.as_ref())?;
    match form.max_participants {
        Some(max) if max <= 0 => Err(AppError::Validation(
            "maxParticipants must be positive".to_owned(),
        )),
        _ => Ok(()),
    }
}

fn validate_rating(rating: Option<i32>) -> Result<(), AppError> {
    match rating {
        Some(rating) if !(1..=5).contains(&rating) => Err(AppError::Validation(
            "rating must be between 1 and 5".to_owned(),
        )),
        _ => Ok(()),
    }
}

async fn list(State(pool): State<Pool>) -> ApiResult<Vec<ActivityView>> {
    let mut connection = pool.get().await?;
    Ok(ApiResponse::data(activities::list(&mut connection).await?))
}

async fn show(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<ActivityView> {
    let mut connection = pool.get().await?;
    let activity = activities::find(&mut connection, id)
        .await?
        .ok_or_else(|| not_found("activity", id))?;
    Ok(ApiResponse::data(activity))
}

async fn create(
    State(pool): State<Pool>,
    AppJson(form): AppJson<ActivityForm>,
) -> Created<Activity> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let activity = activities::insert(&mut connection, &form).await?;
    Ok(ApiResponse::created(activity, "activity created"))
}

async fn update(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(form): AppJson<ActivityForm>,
) -> ApiResult<Activity> {
    validate(&form)?;
    let mut connection = pool.get().await?;
    let activity = activities::update(&mut connection, id, &form)
        .await?
        .ok_or_else(|| not_found("activity", id))?;
    Ok(ApiResponse::with_message(activity, "activity updated"))
}

async fn remove(State(pool): State<Pool>, AppPath(id): AppPath<i32>) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !activities::delete(&mut connection, id).await? {
        return Err(not_found("activity", id));
    }
    Ok(ApiResponse::message("activity deleted"))
}

async fn participants(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Vec<ParticipantView>> {
    let mut connection = pool.get().await?;
    if activities::find(&mut connection, id).await?.is_none() {
        return Err(not_found("activity", id));
    }
    Ok(ApiResponse::data(activities::participants(&mut connection, id).await?))
}

/// Signs a resident up. The activity row stays locked until the insert commits so
/// concurrent sign-ups cannot exceed the limit.
async fn add_participant(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    AppJson(mut participant): AppJson<Participant>,
) -> Created<Participant> {
    validate_rating(participant.rating)?;
    participant.activity_id = id;
    let participant = transaction(&pool, |connection| {
        async move {
            let activity = activities::lock(connection, id)
                .await?
                .ok_or_else(|| not_found("activity", id))?;
            if !residents::exists(connection, participant.resident_id).await? {
                return Err(not_found("resident", participant.resident_id));
            }
            if activities::is_participant(connection, id, participant.resident_id).await? {
                return Err(AppError::Conflict(format!(
                    "resident {} already takes part in activity {id}",
                    participant.resident_id
                )));
            }
            if let Some(max) = activity.max_participants {
                if activities::participant_count(connection, id).await? >= i64::from(max) {
                    return Err(AppError::Conflict(format!(
                        "activity {id} is full ({max} participants)"
                    )));
                }
            }
            let participant = activities::add_participant(connection, &participant).await?;
            info!(activity_id = id, resident_id = participant.resident_id, "participant added");
            Ok(participant)
        }
        .scope_boxed()
    })
    .await?;
    Ok(ApiResponse::created(participant, "participant added"))
}

async fn remove_participant(
    State(pool): State<Pool>,
    AppPath((id, resident_id)): AppPath<(i32, i32)>,
) -> ApiResult<()> {
    let mut connection = pool.get().await?;
    if !activities::remove_participant(&mut connection, id, resident_id).await? {
        return Err(AppError::NotFound(format!(
            "resident {resident_id} does not take part in activity {id}"
        )));
    }
    Ok(ApiResponse::message("participant removed"))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn form() -> ActivityForm {
        let starts_at = Utc::now();
        ActivityForm {
            name: "Taller de memoria".to_owned(),
            description: None,
            kind: Some("Cognitiva".to_owned()),
            starts_at,
            ends_at: Some(starts_at + Duration::hours(1)),
            location: Some("Sala común".to_owned()),
            staff_id: None,
            max_participants: Some(12),
            notes: None,
        }
    }

    #[test]
    fn activity_forms() {
        assert!(validate(&form()).is_ok());
        let ends_first = ActivityForm {
            ends_at: Some(form().starts_at - Duration::minutes(5)),
            ..form()
        };
        assert!(validate(&ends_first).is_err());
        let no_seats = ActivityForm {
            max_participants: Some(0),
            ..form()
        };
        assert!(validate(&no_seats).is_err());
    }

    #[test]
    fn ratings_are_one_to_five() {
        assert!(validate_rating(None).is_ok());
        assert!(validate_rating(Some(5)).is_ok());
        assert!(validate_rating(Some(0)).is_err());
        assert!(validate_rating(Some(6)).is_err());
    }
}
