use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MongoDB,
    models::{UserProfile, UserStatus, UserType},
    services::user_service::{self, UserIdRequest},
    utils::cache::ListingCache,
};

async fn users_for_admin(db: &MongoDB, user_type: UserType) -> HttpResponse {
    match user_service::list_for_admin(db, user_type).await {
        Ok(users) => {
            log::info!("✅ Returning {} {} users to admin", users.len(), user_type);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "users": users
            }))
        }
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/admin/getEducationUsers",
    tag = "Admin",
    responses(
        (status = 200, description = "Every education user with payment state", body = Vec<UserProfile>),
        (status = 404, description = "No education users found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_education_users(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🛡️ GET /admin/getEducationUsers");
    users_for_admin(&db, UserType::Education).await
}

#[utoipa::path(
    get,
    path = "/admin/getHealthcareUsers",
    tag = "Admin",
    responses(
        (status = 200, description = "Every healthcare user with payment state", body = Vec<UserProfile>),
        (status = 404, description = "No healthcare users found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_healthcare_users(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🛡️ GET /admin/getHealthcareUsers");
    users_for_admin(&db, UserType::Healthcare).await
}

async fn change_status(
    db: &MongoDB,
    cache: &ListingCache,
    user_type: UserType,
    request: &UserIdRequest,
    status: UserStatus,
) -> HttpResponse {
    let verb = if status.is_blocked() { "blocked" } else { "unblocked" };
    log::info!("🛡️ Setting {} user {:?} to {}", user_type, request.user_id, status.as_str());

    match user_service::set_status(db, cache, user_type, request, status).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": format!("User {} successfully", verb),
            "user": user
        })),
        Err(e) => {
            log::warn!("❌ Status change failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/blockEducationUser",
    tag = "Admin",
    request_body = UserIdRequest,
    responses((status = 200, description = "User blocked"), (status = 404, description = "User not found")),
    security(("bearer_auth" = []))
)]
pub async fn block_education_user(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<UserIdRequest>,
) -> HttpResponse {
    change_status(&db, &cache, UserType::Education, &request, UserStatus::Blocked).await
}

#[utoipa::path(
    post,
    path = "/admin/unblockEducationUser",
    tag = "Admin",
    request_body = UserIdRequest,
    responses((status = 200, description = "User unblocked"), (status = 404, description = "User not found")),
    security(("bearer_auth" = []))
)]
pub async fn unblock_education_user(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<UserIdRequest>,
) -> HttpResponse {
    change_status(&db, &cache, UserType::Education, &request, UserStatus::Unblock).await
}

#[utoipa::path(
    post,
    path = "/admin/blockHealthcareUser",
    tag = "Admin",
    request_body = UserIdRequest,
    responses((status = 200, description = "User blocked"), (status = 404, description = "User not found")),
    security(("bearer_auth" = []))
)]
pub async fn block_healthcare_user(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<UserIdRequest>,
) -> HttpResponse {
    change_status(&db, &cache, UserType::Healthcare, &request, UserStatus::Blocked).await
}

#[utoipa::path(
    post,
    path = "/admin/unblockHealthcareUser",
    tag = "Admin",
    request_body = UserIdRequest,
    responses((status = 200, description = "User unblocked"), (status = 404, description = "User not found")),
    security(("bearer_auth" = []))
)]
pub async fn unblock_healthcare_user(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<UserIdRequest>,
) -> HttpResponse {
    change_status(&db, &cache, UserType::Healthcare, &request, UserStatus::Unblock).await
}

#[utoipa::path(
    delete,
    path = "/admin/deleteUser/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "User deleted"), (status = 404, description = "User not found")),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /admin/deleteUser/{}", path);

    match user_service::delete_user(&db, &cache, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
