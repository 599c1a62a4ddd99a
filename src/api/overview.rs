use crate::auth::auth::AuthUser;
use crate::utils::overview_counts;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct OverviewResponse {
    pub total_employees: i64,
    pub total_departments: i64,
    pub attendance_today: i64,
    pub pending_leave_requests: i64,
    pub pending_tasks: i64,
}

fn internal(context: &str) -> impl Fn(sqlx::Error) -> actix_web::Error + '_ {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

/// Admin dashboard summary counters
#[utoipa::path(
    get,
    path = "/api/v1/overview",
    responses(
        (status = 200, description = "Overview counters", body = OverviewResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Overview"
)]
pub async fn get_overview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let total_employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal("Failed to count employees"))?;

    let total_departments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal("Failed to count departments"))?;

    let today = Local::now().date_naive();
    let attendance_today =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = ?")
            .bind(today)
            .fetch_one(pool.get_ref())
            .await
            .map_err(internal("Failed to count today's attendance"))?;

    // Pending counters come from the background poller, not live queries.
    let pending = overview_counts::current().await;

    Ok(HttpResponse::Ok().json(OverviewResponse {
        total_employees,
        total_departments,
        attendance_today,
        pending_leave_requests: pending.pending_leave_requests,
        pending_tasks: pending.pending_tasks,
    }))
}
