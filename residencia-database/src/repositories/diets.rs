use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{full_name, Diet, DietAssignment, DietAssignmentForm, DietAssignmentView, DietForm};
use crate::schema::{diet_assignments, diets, staff};

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<Diet>, DieselError> {
    diets::table
        .order(diets::name.asc())
        .select(Diet::as_select())
        .load(connection)
        .await
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    diet_id: i32,
) -> Result<Option<Diet>, DieselError> {
    diets::table
        .find(diet_id)
        .select(Diet::as_select())
        .first(connection)
        .await
        .optional()
}

pub async fn insert(connection: &mut AsyncPgConnection, form: &DietForm) -> Result<Diet, DieselError> {
    diesel::insert_into(diets::table)
        .values(form)
        .returning(Diet::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    diet_id: i32,
    form: &DietForm,
) -> Result<Option<Diet>, DieselError> {
    diesel::update(diets::table.find(diet_id))
        .set(form)
        .returning(Diet::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn set_active(
    connection: &mut AsyncPgConnection,
    diet_id: i32,
    active: bool,
) -> Result<Option<Diet>, DieselError> {
    diesel::update(diets::table.find(diet_id))
        .set(diets::active.eq(active))
        .returning(Diet::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(connection: &mut AsyncPgConnection, diet_id: i32) -> Result<bool, DieselError> {
    let deleted = diesel::delete(diets::table.find(diet_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

pub async fn assignments_for(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
    active_only: bool,
) -> Result<Vec<DietAssignmentView>, DieselError> {
    let query = diet_assignments::table
        .inner_join(diets::table.on(diets::id.eq(diet_assignments::diet_id)))
        .left_join(staff::table.on(staff::id.nullable().eq(diet_assignments::staff_id)))
        .filter(diet_assignments::resident_id.eq(resident_id))
        .order(diet_assignments::start_date.desc())
        .select((
            DietAssignment::as_select(),
            diets::name,
            staff::name.nullable(),
            staff::surname.nullable(),
        ));
    let rows: Vec<(DietAssignment, String, Option<String>, Option<String>)> = if active_only {
        query
            .filter(diet_assignments::active.eq(true))
            .load(connection)
            .await?
    } else {
        query.load(connection).await?
    };
    Ok(rows
        .into_iter()
        .map(|(assignment, diet_name, name, surname)| DietAssignmentView {
            assignment,
            diet_name,
            staff_name: name.zip(surname).map(|(name, surname)| full_name(&name, &surname)),
        })
        .collect())
}

pub async fn insert_assignment(
    connection: &mut AsyncPgConnection,
    form: &DietAssignmentForm,
) -> Result<DietAssignment, DieselError> {
    diesel::insert_into(diet_assignments::table)
        .values(form)
        .returning(DietAssignment::as_returning())
        .get_result(connection)
        .await
}

pub async fn delete_assignment(
    connection: &mut AsyncPgConnection,
    assignment_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(diet_assignments::table.find(assignment_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}
