use crate::auth::auth::AuthUser;
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Filter by role name ("admin" or "user")
    #[schema(example = "user")]
    pub role: Option<String>,
}

/// Listing shape; the password never leaves this module.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct UserRow {
    pub id: u64,
    pub username: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
    pub is_active: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserRow>,
}

fn role_from_query(value: &str) -> Option<Role> {
    match value {
        "admin" => Some(Role::Admin),
        "user" | "employee" => Some(Role::Employee),
        _ => None,
    }
}

/// List user accounts, optionally filtered by role
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "User list", body = UserListResponse),
        (status = 400, description = "Unknown role filter"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let role = match query.role.as_deref() {
        Some(value) => match role_from_query(value) {
            Some(role) => Some(role),
            None => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Unknown role filter"
                })));
            }
        },
        None => None,
    };

    let (sql, role_id) = match role {
        Some(role) => (
            "SELECT id, username, role_id, employee_id, is_active
             FROM users WHERE role_id = ? ORDER BY username",
            Some(role as u8),
        ),
        None => (
            "SELECT id, username, role_id, employee_id, is_active
             FROM users ORDER BY username",
            None,
        ),
    };

    let mut q = sqlx::query_as::<_, UserRow>(sql);
    if let Some(role_id) = role_id {
        q = q.bind(role_id);
    }

    let users = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse { users }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_filter_accepts_dashboard_names() {
        assert_eq!(role_from_query("admin"), Some(Role::Admin));
        assert_eq!(role_from_query("user"), Some(Role::Employee));
        assert_eq!(role_from_query("employee"), Some(Role::Employee));
        assert_eq!(role_from_query("root"), None);
    }
}
