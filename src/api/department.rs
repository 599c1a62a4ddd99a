use crate::{auth::auth::AuthUser, model::department::Department};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Product and platform teams", nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created"),
        (status = 409, description = "Name already exists"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "Name is required" })));
    }

    let result = sqlx::query("INSERT INTO departments (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(&payload.description)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({ "message": "Department created" }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict()
                        .json(json!({ "message": "Department already exists" })));
                }
            }
            tracing::error!(error = %e, "Failed to create department");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name, description FROM departments ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to list departments");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Update department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let department_id = path.into_inner();

    let current = sqlx::query_as::<_, Department>(
        "SELECT id, name, description FROM departments WHERE id = ?",
    )
    .bind(department_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, department_id, "Failed to fetch department");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(current) = current else {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Department not found" })));
    };

    let name = payload.name.clone().unwrap_or(current.name);
    let description = payload.description.clone().or(current.description);

    sqlx::query("UPDATE departments SET name = ?, description = ? WHERE id = ?")
        .bind(&name)
        .bind(&description)
        .bind(department_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, department_id, "Failed to update department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Department updated" })))
}

/// Delete department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 400, description = "Department still has employees"),
        (status = 404, description = "Department not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let department_id = path.into_inner();

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(
                    HttpResponse::NotFound().json(json!({ "message": "Department not found" }))
                );
            }
            Ok(HttpResponse::Ok().json(json!({ "message": "Department deleted" })))
        }
        Err(e) => {
            // FK restriction: employees still reference this department
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest()
                        .json(json!({ "message": "Department still has employees" })));
                }
            }
            tracing::error!(error = %e, department_id, "Failed to delete department");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
