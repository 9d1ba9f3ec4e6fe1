use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{
    full_name, Activity, ActivityForm, ActivityView, Participant, ParticipantView, Participation,
};
use crate::schema::{activities, activity_participants, residents, staff};

type ViewRow = (Activity, Option<String>, Option<String>);

fn to_view((activity, name, surname): ViewRow) -> ActivityView {
    ActivityView {
        activity,
        staff_name: name.zip(surname).map(|(name, surname)| full_name(&name, &surname)),
    }
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<ActivityView>, DieselError> {
    let rows: Vec<ViewRow> = activities::table
        .left_join(staff::table.on(staff::id.nullable().eq(activities::staff_id)))
        .order(activities::starts_at.desc())
        .select((
            Activity::as_select(),
            staff::name.nullable(),
            staff::surname.nullable(),
        ))
        .load(connection)
        .await?;
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
) -> Result<Option<ActivityView>, DieselError> {
    let row: Option<ViewRow> = activities::table
        .left_join(staff::table.on(staff::id.nullable().eq(activities::staff_id)))
        .filter(activities::id.eq(activity_id))
        .select((
            Activity::as_select(),
            staff::name.nullable(),
            staff::surname.nullable(),
        ))
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(to_view))
}

/// Loads the activity row and locks it, so participant counts stay stable until commit.
pub async fn lock(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
) -> Result<Option<Activity>, DieselError> {
    activities::table
        .find(activity_id)
        .select(Activity::as_select())
        .for_update()
        .first(connection)
        .await
        .optional()
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    form: &ActivityForm,
) -> Result<Activity, DieselError> {
    diesel::insert_into(activities::table)
        .values(form)
        .returning(Activity::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
    form: &ActivityForm,
) -> Result<Option<Activity>, DieselError> {
    diesel::update(activities::table.find(activity_id))
        .set(form)
        .returning(Activity::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(activities::table.find(activity_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

pub async fn participants(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
) -> Result<Vec<ParticipantView>, DieselError> {
    let rows: Vec<(Participant, String, String)> = activity_participants::table
        .inner_join(residents::table.on(residents::id.eq(activity_participants::resident_id)))
        .filter(activity_participants::activity_id.eq(activity_id))
        .order((residents::surname.asc(), residents::name.asc()))
        .select((Participant::as_select(), residents::name, residents::surname))
        .load(connection)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(participant, name, surname)| ParticipantView {
            participant,
            resident_name: full_name(&name, &surname),
        })
        .collect())
}

pub async fn participant_count(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
) -> Result<i64, DieselError> {
    activity_participants::table
        .filter(activity_participants::activity_id.eq(activity_id))
        .count()
        .get_result(connection)
        .await
}

pub async fn is_participant(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
    resident_id: i32,
) -> Result<bool, DieselError> {
    let count: i64 = activity_participants::table
        .find((activity_id, resident_id))
        .count()
        .get_result(connection)
        .await?;
    Ok(count > 0)
}

pub async fn add_participant(
    connection: &mut AsyncPgConnection,
    participant: &Participant,
) -> Result<Participant, DieselError> {
    diesel::insert_into(activity_participants::table)
        .values(participant)
        .returning(Participant::as_returning())
        .get_result(connection)
        .await
}

pub async fn remove_participant(
    connection: &mut AsyncPgConnection,
    activity_id: i32,
    resident_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(activity_participants::table.find((activity_id, resident_id)))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

/// Activities the resident is signed up for, newest first.
pub async fn participation_of(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
) -> Result<Vec<Participation>, DieselError> {
    let rows: Vec<(i32, String, chrono::DateTime<chrono::Utc>, bool, Option<i32>)> =
        activity_participants::table
            .inner_join(activities::table.on(activities::id.eq(activity_participants::activity_id)))
            .filter(activity_participants::resident_id.eq(resident_id))
            .order(activities::starts_at.desc())
            .select((
                activities::id,
                activities::name,
                activities::starts_at,
                activity_participants::attended,
                activity_participants::rating,
            ))
            .load(connection)
            .await?;
    Ok(rows
        .into_iter()
        .map(
            |(activity_id, activity_name, starts_at, attended, rating)| Participation {
                activity_id,
                activity_name,
                starts_at,
                attended,
                rating,
            },
        )
        .collect())
}
