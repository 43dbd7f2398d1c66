use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MongoDB,
    models::{JobRequest, JobResponse},
    services::{auth_service::Claims, job_service},
    utils::cache::ListingCache,
};

#[utoipa::path(
    post,
    path = "/user/createjob",
    tag = "Jobs",
    request_body = JobRequest,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "All fields are required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    claims: web::ReqData<Claims>,
    request: web::Json<JobRequest>,
) -> HttpResponse {
    log::info!("📝 POST /user/createjob - by {}", claims.email);

    match job_service::create(&db, &cache, &claims, &request).await {
        Ok(job) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Job created successfully",
            "job": job
        })),
        Err(e) => {
            log::warn!("❌ Job not created: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/getalljobs",
    tag = "Jobs",
    responses((status = 200, description = "Newest jobs first", body = Vec<JobResponse>))
)]
pub async fn get_all_jobs(db: web::Data<MongoDB>, cache: web::Data<ListingCache>) -> HttpResponse {
    log::info!("📋 GET /user/getalljobs");

    match job_service::list(&db, &cache).await {
        Ok(jobs) => HttpResponse::Ok().json(jobs),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/user/getjob/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job", body = JobResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    match job_service::get(&db, &path).await {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/user/updatejob/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job id")),
    request_body = JobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 403, description = "Not the poster"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_job(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    request: web::Json<JobRequest>,
) -> HttpResponse {
    log::info!("✏️ PUT /user/updatejob/{} - by {}", path, claims.email);

    match job_service::update(&db, &cache, &claims, &path, &request).await {
        Ok(job) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Job updated successfully",
            "job": job
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/user/deletejob/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 403, description = "Not the poster"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_job(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /user/deletejob/{} - by {}", path, claims.email);

    match job_service::delete(&db, &cache, &claims, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Job deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
