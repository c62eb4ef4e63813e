//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness of usernames and emails is enforced by the `users_username_key`
//! and `users_email_key` constraints; a violation on insert is reported as
//! the matching `*Taken` error so concurrent registrations cannot both win.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, PasswordHash, PersonName, PhoneNumber, User, UserAccount, UserId,
    UserValidationError, Username,
};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(USERNAME_CONSTRAINT) => UserPersistenceError::username_taken(),
                Some(EMAIL_CONSTRAINT) => UserPersistenceError::email_taken(),
                _ => UserPersistenceError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Rebuild a domain user from a stored row.
///
/// Rows are written through the domain constructors, so a failure here means
/// the table was edited out of band.
fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let id = row.id;
    let invalid = move |err: UserValidationError| {
        warn!(user_id = %id, error = %err, "stored user row failed validation");
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };

    let user = User::builder(
        UserId::from_uuid(id),
        Username::new(&row.username).map_err(invalid)?,
        EmailAddress::new(&row.email).map_err(invalid)?,
    )
    .name(PersonName::new(&row.name).map_err(invalid)?)
    .surname(PersonName::new(&row.surname).map_err(invalid)?)
    .phone(PhoneNumber::new(&row.phone).map_err(invalid)?)
    .created_at(row.created_at)
    .build()
    .map_err(invalid)?;

    Ok(UserAccount {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_str(),
            name: user.name().as_ref(),
            surname: user.surname().as_ref(),
            phone: user.phone().as_ref(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_account).transpose()?.map(|account| account.user))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(users::table.filter(users::email.eq(email.as_ref()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    struct ConstraintInfo(Option<&'static str>);

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("users")
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.0
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(ConstraintInfo(constraint)))
    }

    fn row() -> UserRow {
        UserRow {
            id: Uuid::nil(),
            username: "agustin".to_owned(),
            email: "agustineduran@gmail.com".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            name: "Agustín".to_owned(),
            surname: "Durán".to_owned(),
            phone: "2964547877".to_owned(),
            created_at: Utc
                .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    #[case::username(Some(USERNAME_CONSTRAINT), UserPersistenceError::username_taken())]
    #[case::email(Some(EMAIL_CONSTRAINT), UserPersistenceError::email_taken())]
    #[case::other(
        Some("users_pkey"),
        UserPersistenceError::query("unique constraint violated")
    )]
    #[case::unnamed(None, UserPersistenceError::query("unique constraint violated"))]
    fn unique_violations_map_by_constraint(
        #[case] constraint: Option<&'static str>,
        #[case] expected: UserPersistenceError,
    ) {
        let error = database_error(DatabaseErrorKind::UniqueViolation, constraint);
        assert_eq!(map_diesel_error(error), expected);
    }

    #[rstest]
    fn closed_connection_is_a_connection_error() {
        let error = database_error(DatabaseErrorKind::ClosedConnection, None);
        assert_eq!(
            map_diesel_error(error),
            UserPersistenceError::connection("database connection error")
        );
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        assert_eq!(
            map_diesel_error(DieselError::NotFound),
            UserPersistenceError::query("record not found")
        );
        assert_eq!(
            map_diesel_error(DieselError::RollbackTransaction),
            UserPersistenceError::query("database error")
        );
    }

    #[rstest]
    fn pool_errors_are_connection_errors() {
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            UserPersistenceError::connection("timed out")
        );
    }

    #[rstest]
    fn rows_convert_to_accounts() {
        let account = row_to_account(row()).expect("valid row");

        assert_eq!(account.user.id(), &UserId::from_uuid(Uuid::nil()));
        assert_eq!(account.user.username().as_ref(), "agustin");
        assert_eq!(account.user.surname().as_ref(), "Durán");
        assert!(account.password_hash.as_str().starts_with("$argon2id$"));
    }

    #[rstest]
    fn corrupt_rows_are_query_errors() {
        let mut corrupt = row();
        corrupt.email = "not-an-email".to_owned();

        let error = row_to_account(corrupt).expect_err("invalid row");

        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
