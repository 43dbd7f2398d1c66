use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::{
    config::AppConfig,
    database::MongoDB,
    models::{UserProfile, UserType},
    services::{
        auth_service::{self, Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        user_service::{self, UpdateProfileRequest},
    },
    utils::{cache::ListingCache, image::request_base_url},
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched case-insensitively against name, category and address
    pub query: Option<String>,
}

#[utoipa::path(
    post,
    path = "/user/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing fields, bad category or duplicate email")
    )
)]
pub async fn register(db: web::Data<MongoDB>, request: web::Json<RegisterRequest>) -> HttpResponse {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /user/register - email: {}", email);

    match auth_service::register(&db, &request).await {
        Ok(user) => {
            log::info!("✅ Registration successful: {}", email);
            HttpResponse::Created().json(RegisterResponse {
                success: true,
                message: "User registered successfully".to_string(),
                user,
            })
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid email/phone or password"),
        (status = 403, description = "Account is blocked")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let identifier = request.email_or_phone.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /user/login - {}", identifier);

    match auth_service::login(&db, &config.jwt, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", identifier);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", identifier, e);
            e.error_response()
        }
    }
}

async fn visible_users(
    req: &HttpRequest,
    db: &MongoDB,
    cache: &ListingCache,
    config: &AppConfig,
    user_type: UserType,
) -> HttpResponse {
    match user_service::list_visible(db, cache, user_type).await {
        Ok(mut users) => {
            let base = request_base_url(req, config.public_base_url.as_deref());
            user_service::resolve_images(&mut users, &base);
            log::info!("✅ Returning {} {} users", users.len(), user_type);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "users": users
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to list {} users: {}", user_type, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/getAllUsers",
    tag = "Users",
    responses((status = 200, description = "Visible education providers", body = Vec<UserProfile>))
)]
pub async fn get_education_users(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    log::info!("📋 GET /user/getAllUsers");
    visible_users(&req, &db, &cache, &config, UserType::Education).await
}

#[utoipa::path(
    get,
    path = "/user/getHealthcareUsers",
    tag = "Users",
    responses((status = 200, description = "Visible healthcare providers", body = Vec<UserProfile>))
)]
pub async fn get_healthcare_users(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    log::info!("📋 GET /user/getHealthcareUsers");
    visible_users(&req, &db, &cache, &config, UserType::Healthcare).await
}

async fn search(
    req: &HttpRequest,
    db: &MongoDB,
    config: &AppConfig,
    user_type: UserType,
    query: &SearchQuery,
) -> HttpResponse {
    match user_service::search(db, user_type, query.query.as_deref()).await {
        Ok(mut results) => {
            let base = request_base_url(req, config.public_base_url.as_deref());
            user_service::resolve_images(&mut results, &base);
            HttpResponse::Ok().json(results)
        }
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/user/searchEducation",
    tag = "Users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching education providers", body = Vec<UserProfile>),
        (status = 400, description = "Query missing"),
        (status = 404, description = "No education results found")
    )
)]
pub async fn search_education(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    log::info!("🔍 GET /user/searchEducation - query: {:?}", query.query);
    search(&req, &db, &config, UserType::Education, &query).await
}

#[utoipa::path(
    get,
    path = "/user/searchHealthcare",
    tag = "Users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching healthcare providers", body = Vec<UserProfile>),
        (status = 400, description = "Query missing"),
        (status = 404, description = "No healthcare results found")
    )
)]
pub async fn search_healthcare(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    log::info!("🔍 GET /user/searchHealthcare - query: {:?}", query.query);
    search(&req, &db, &config, UserType::Healthcare, &query).await
}

#[utoipa::path(
    patch,
    path = "/user/updateProfile",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid category or teachers format"),
        (status = 403, description = "Editing another account without admin role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    claims: web::ReqData<Claims>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    log::info!("✏️ PATCH /user/updateProfile - by {}", claims.email);

    match user_service::update_profile(&db, &cache, &claims, &request).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Profile updated successfully",
            "user": user
        })),
        Err(e) => {
            log::warn!("❌ Profile update failed for {}: {}", claims.email, e);
            e.error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::AuthMiddleware;
    use actix_web::{http::StatusCode, test, App};
    use std::time::Duration;

    #[actix_web::test]
    async fn register_validates_before_touching_the_database() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .route("/user/register", web::post().to(register)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/user/register")
            .set_json(serde_json::json!({
                "name": "Care Clinic", "email": "desk@care.in", "password": "pw",
                "phone": "9000000000", "userType": "healthcare", "category": "Play School"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid category for the selected userType");
    }

    #[actix_web::test]
    async fn cached_listing_has_resolved_images() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.set(
            crate::utils::cache::KEY_EDUCATION_USERS,
            serde_json::json!([{
                "_id": "65f1c2a9e4b0a1b2c3d4e5f6", "name": "Sunrise", "email": "s@s.in",
                "phone": "9000000000", "userType": "education", "category": "Day School",
                "role": "user", "status": "active", "image": "/uploads/1.png", "address": null,
                "description": null, "contactInfo": null, "amenity": null, "establishment": null,
                "additionalInfo": null, "teachers": []
            }]),
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .route("/user/getAllUsers", web::get().to(get_education_users)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/user/getAllUsers")
            .insert_header(("host", "api.local:8002"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["users"][0]["image"], "http://api.local:8002/uploads/1.png");
    }

    #[actix_web::test]
    async fn blank_search_query_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .route("/user/searchEducation", web::get().to(search_education)),
        )
        .await;

        let req = test::TestRequest::get().uri("/user/searchEducation?query=%20").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn update_profile_requires_a_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .app_data(web::Data::new(ListingCache::new(Duration::from_secs(60))))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .service(
                    web::resource("/user/updateProfile")
                        .wrap(AuthMiddleware::user())
                        .route(web::patch().to(update_profile)),
                ),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/user/updateProfile")
            .set_json(serde_json::json!({ "name": "New name" }))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
