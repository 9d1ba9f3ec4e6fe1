use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{NewUser, User};
use crate::schema::{staff, users};

/// An active login together with the name of the linked staff member.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub staff_name: Option<String>,
}

pub async fn find_active_by_username(
    connection: &mut AsyncPgConnection,
    username: &str,
) -> Result<Option<Account>, DieselError> {
    let row: Option<(User, Option<String>, Option<String>)> = users::table
        .left_join(staff::table.on(staff::id.nullable().eq(users::staff_id)))
        .filter(users::username.eq(username))
        .filter(users::active.eq(true))
        .select((
            User::as_select(),
            staff::name.nullable(),
            staff::surname.nullable(),
        ))
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(|(user, name, surname)| Account {
        user,
        staff_name: name
            .zip(surname)
            .map(|(name, surname)| crate::models::full_name(&name, &surname)),
    }))
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Option<User>, DieselError> {
    users::table
        .find(user_id)
        .filter(users::active.eq(true))
        .select(User::as_select())
        .first(connection)
        .await
        .optional()
}

pub async fn username_taken(
    connection: &mut AsyncPgConnection,
    username: &str,
) -> Result<bool, DieselError> {
    let count: i64 = users::table
        .filter(users::username.eq(username))
        .count()
        .get_result(connection)
        .await?;
    Ok(count > 0)
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    user: NewUser<'_>,
) -> Result<User, DieselError> {
    diesel::insert_into(users::table)
        .values(user)
        .returning(User::as_returning())
        .get_result(connection)
        .await
}

pub async fn touch_last_login(
    connection: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<(), DieselError> {
    diesel::update(users::table.find(user_id))
        .set(users::last_login.eq(Utc::now()))
        .execute(connection)
        .await?;
    Ok(())
}

pub async fn set_password_hash(
    connection: &mut AsyncPgConnection,
    user_id: i32,
    password_hash: &str,
) -> Result<(), DieselError> {
    diesel::update(users::table.find(user_id))
        .set(users::password_hash.eq(password_hash))
        .execute(connection)
        .await?;
    Ok(())
}
