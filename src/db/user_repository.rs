// src/db/user_repository.rs
// DOCUMENTATION: User database operations
// PURPOSE: Accounts, confirmation codes and admin user management

use crate::errors::YamdbError;
use crate::models::{CreateUserRequest, PageRequest, UpdateUserRequest, User, UserRow};
use sqlx::PgPool;

const USER_COLUMNS: &str = r#"
    id, username, email, first_name, last_name, bio, role,
    is_staff, confirmation_code, date_joined
"#;

fn into_user(row: UserRow) -> Result<User, YamdbError> {
    let id = row.id;
    User::try_from(row).map_err(|e| {
        log::error!("User {} has an invalid role: {}", id, e);
        YamdbError::InternalError(e)
    })
}

pub struct UserRepository;

impl UserRepository {
    /// Retrieve user by primary key
    /// DOCUMENTATION: Used by the bearer token extractor on every request
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, YamdbError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch user failed", e))?;

        row.map(into_user).transpose()
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, YamdbError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch user failed", e))?;

        row.map(into_user).transpose()
    }

    /// Retrieve user by username, 404 when absent
    pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<User, YamdbError> {
        Self::find_by_username(pool, username).await?.ok_or_else(|| {
            log::warn!("User not found: {}", username);
            YamdbError::NotFound(format!("User '{}'", username))
        })
    }

    pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, YamdbError> {
        let (taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await
                .map_err(|e| YamdbError::from_db("Email lookup failed", e))?;

        Ok(taken)
    }

    /// Create a self-registered user holding a confirmation code
    pub async fn create_with_code(
        pool: &PgPool,
        username: &str,
        email: &str,
        code: &str,
    ) -> Result<User, YamdbError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, confirmation_code)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(email)
            .bind(code)
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db("Create user failed", e))?;

        log::info!("Registered user: {}", username);
        into_user(row)
    }

    pub async fn set_confirmation_code(
        pool: &PgPool,
        id: i64,
        code: &str,
    ) -> Result<(), YamdbError> {
        sqlx::query("UPDATE users SET confirmation_code = $1 WHERE id = $2")
            .bind(code)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Update confirmation code failed", e))?;

        Ok(())
    }

    /// Create a user on behalf of an administrator
    pub async fn create(pool: &PgPool, req: &CreateUserRequest) -> Result<User, YamdbError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, bio, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&req.username)
            .bind(&req.email)
            .bind(&req.first_name)
            .bind(&req.last_name)
            .bind(req.bio.is_some())
            .bind(req.bio.as_deref())
            .bind(req.role.as_str())
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db("Create user failed", e))?;

        log::info!("Created user: {}", req.username);
        into_user(row)
    }

    /// Partial update - only provided fields are modified
    /// The caller decides whether `role` may change
    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: &UpdateUserRequest,
    ) -> Result<User, YamdbError> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                bio = CASE WHEN $5 THEN $6 ELSE bio END,
                role = COALESCE($7, role)
            WHERE id = $8
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&req.username)
            .bind(&req.email)
            .bind(&req.first_name)
            .bind(&req.last_name)
            .bind(&req.bio)
            .bind(req.role.map(|r| r.as_str()))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Update user failed", e))?
            .ok_or_else(|| YamdbError::NotFound(format!("User {}", id)))?;

        log::info!("Updated user: {}", id);
        into_user(row)
    }

    pub async fn delete_by_username(pool: &PgPool, username: &str) -> Result<(), YamdbError> {
        let rows = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Delete user failed", e))?
            .rows_affected();

        if rows == 0 {
            return Err(YamdbError::NotFound(format!("User '{}'", username)));
        }

        log::info!("Deleted user: {}", username);
        Ok(())
    }

    /// List users ordered by username, optionally filtered by a username substring
    /// Returns tuple: (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), YamdbError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR username ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await
        .map_err(|e| YamdbError::from_db("Count users failed", e))?;

        let sql = format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1)
            ORDER BY username
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        );

        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| YamdbError::from_db("List users failed", e))?;

        let users = rows
            .into_iter()
            .map(into_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total))
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
