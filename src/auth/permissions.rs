// src/auth/permissions.rs
// DOCUMENTATION: Access rules for every endpoint
// PURPOSE: Request-level and object-level checks by HTTP method, role and authorship

use crate::errors::YamdbError;
use crate::models::User;
use actix_web::http::Method;

/// Access policy attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Anyone, authenticated or not
    AllowAny,
    /// Any authenticated user
    IsAuthenticated,
    /// Administrators (role admin) and staff accounts
    IsAdmin,
    /// Reads for everyone, writes for role admin
    IsAdminOrReadOnly,
    /// Reads for everyone, writes for authenticated users; changing an
    /// existing object needs its author, a moderator, an admin or staff
    IsAuthorOrStaffOrReadOnly,
}

/// GET, HEAD and OPTIONS never modify state
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl Permission {
    pub fn has_permission(&self, method: &Method, user: Option<&User>) -> bool {
        match self {
            Permission::AllowAny => true,
            Permission::IsAuthenticated => user.is_some(),
            Permission::IsAdmin => user.map_or(false, |u| u.is_admin() || u.is_staff),
            Permission::IsAdminOrReadOnly => {
                is_safe_method(method) || user.map_or(false, User::is_admin)
            }
            Permission::IsAuthorOrStaffOrReadOnly => is_safe_method(method) || user.is_some(),
        }
    }

    pub fn has_object_permission(
        &self,
        method: &Method,
        user: Option<&User>,
        author_id: i64,
    ) -> bool {
        match self {
            Permission::IsAuthorOrStaffOrReadOnly => {
                is_safe_method(method)
                    || user.map_or(false, |u| {
                        u.id == author_id || u.is_admin() || u.is_moderator() || u.is_staff
                    })
            }
            other => other.has_permission(method, user),
        }
    }

    /// Request-level check: 401 for anonymous callers, 403 for everyone else
    pub fn check(&self, method: &Method, user: Option<&User>) -> Result<(), YamdbError> {
        if self.has_permission(method, user) {
            return Ok(());
        }
        Err(denied(user))
    }

    /// Object-level check, applied after the object has been loaded
    pub fn check_object(
        &self,
        method: &Method,
        user: Option<&User>,
        author_id: i64,
    ) -> Result<(), YamdbError> {
        self.check(method, user)?;
        if self.has_object_permission(method, user, author_id) {
            return Ok(());
        }
        Err(denied(user))
    }
}

fn denied(user: Option<&User>) -> YamdbError {
    match user {
        None => YamdbError::Unauthorized("Authentication credentials were not provided".into()),
        Some(u) => {
            log::warn!("Permission denied for user {}", u.username);
            YamdbError::Forbidden
        }
    }
}
