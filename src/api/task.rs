use crate::auth::auth::AuthUser;
use crate::model::task::TaskStatus;
use actix_web::{HttpResponse, Responder, web};
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[schema(example = 12)]
    pub user_id: u64,
    #[schema(example = "Prepare onboarding docs")]
    pub title: String,
    #[schema(example = "Template in the shared drive")]
    #[serde(default)]
    pub description: String,
    /// Opaque URL; image hosting is external
    #[schema(example = "https://i.ibb.co/abc/brief.png", nullable = true)]
    pub admin_image_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTask {
    #[schema(example = "https://i.ibb.co/xyz/proof.png", nullable = true)]
    pub proof_image_url: Option<String>,
    #[schema(example = "Done, docs shared with HR")]
    #[serde(default)]
    pub note: String,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TaskRow {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub title: String,
    pub description: Option<String>,
    pub admin_image_url: Option<String>,
    pub proof_image_url: Option<String>,
    pub completion_note: Option<String>,
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TaskFilter {
    /// Filter by status (Pending, Completed)
    #[schema(example = "Pending")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskRow>,
}

const TASK_COLUMNS: &str = r#"
    t.id, t.user_id,
    COALESCE(CONCAT(e.first_name, ' ', e.last_name), u.username) AS name,
    COALESCE(e.email, '') AS email,
    t.title, t.description, t.admin_image_url, t.proof_image_url,
    t.completion_note, t.status, t.created_at, t.completed_at
"#;

/// Assign a task to a user
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task assigned"),
        (status = 400, description = "Missing title or unknown user"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn create_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTask>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Task title is required"
        })));
    }

    let description = payload.description.trim();

    let result = sqlx::query(
        r#"
        INSERT INTO tasks (user_id, title, description, admin_image_url)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(title)
    .bind(if description.is_empty() { None } else { Some(description) })
    .bind(&payload.admin_image_url)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(serde_json::json!({
            "message": "Task assigned successfully"
        }))),
        Err(e) => {
            // FK failure: the target user does not exist
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Unknown user"
                    })));
                }
            }
            tracing::error!(error = %e, "Failed to create task");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Admin task listing, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "Task list", body = TaskListResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn list_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TaskFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let status = match query.status.as_deref() {
        Some(raw) => match TaskStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Unknown task status"
                })));
            }
        },
        None => None,
    };

    let (sql, status) = match status {
        Some(status) => (
            format!(
                "SELECT {TASK_COLUMNS}
                 FROM tasks t
                 JOIN users u ON u.id = t.user_id
                 LEFT JOIN employees e ON e.id = u.employee_id
                 WHERE t.status = ?
                 ORDER BY t.created_at DESC"
            ),
            Some(status),
        ),
        None => (
            format!(
                "SELECT {TASK_COLUMNS}
                 FROM tasks t
                 JOIN users u ON u.id = t.user_id
                 LEFT JOIN employees e ON e.id = u.employee_id
                 ORDER BY t.created_at DESC"
            ),
            None,
        ),
    };

    let mut q = sqlx::query_as::<_, TaskRow>(&sql);
    if let Some(status) = status {
        q = q.bind(status.to_string());
    }

    let tasks = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch tasks");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(TaskListResponse { tasks }))
}

/// The caller's own tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks/me",
    responses(
        (status = 200, description = "Own task list", body = TaskListResponse),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn my_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sql = format!(
        "SELECT {TASK_COLUMNS}
         FROM tasks t
         JOIN users u ON u.id = t.user_id
         LEFT JOIN employees e ON e.id = u.employee_id
         WHERE t.user_id = ?
         ORDER BY t.created_at DESC"
    );

    let tasks = sqlx::query_as::<_, TaskRow>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch own tasks");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TaskListResponse { tasks }))
}

/// Mark an assigned task completed, with optional proof
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}/complete",
    params(("task_id" = u64, Path, description = "Task ID")),
    request_body = CompleteTask,
    responses(
        (status = 200, description = "Task completed"),
        (status = 400, description = "Task not found, not yours, or already completed"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn complete_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CompleteTask>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();
    let note = payload.note.trim();

    // Pending-only transition, scoped to the caller's own tasks.
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET status = ?,
            proof_image_url = ?,
            completion_note = ?,
            completed_at = NOW()
        WHERE id = ?
        AND user_id = ?
        AND status = ?
        "#,
    )
    .bind(TaskStatus::Completed.to_string())
    .bind(&payload.proof_image_url)
    .bind(if note.is_empty() { None } else { Some(note) })
    .bind(task_id)
    .bind(auth.user_id)
    .bind(TaskStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, task_id, "Complete task failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Task not found, not yours, or already completed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Task completed"
    })))
}
