use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse, ResponseError};

use crate::{
    config::AppConfig,
    database::MongoDB,
    models::UserProfile,
    services::{
        auth_service::{self, Claims, VerifyTokenResponse},
        password_reset_service::{self, ResetPasswordRequest, SendLinkRequest},
        Mailer,
    },
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/auth/sendpasswordlink",
    tag = "Auth",
    request_body = SendLinkRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 400, description = "Email missing"),
        (status = 404, description = "User not found")
    )
)]
pub async fn send_password_link(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
    request: web::Json<SendLinkRequest>,
) -> HttpResponse {
    log::info!("🔑 POST /auth/sendpasswordlink - email: {:?}", request.email);

    match password_reset_service::send_password_link(&db, &config, mailer.get_ref(), &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password reset link sent successfully"
        })),
        Err(e) => {
            log::warn!("❌ Reset link not sent: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/forgotpassword/{id}/{token}",
    tag = "Auth",
    params(
        ("id" = String, Path, description = "User id"),
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    responses(
        (status = 200, description = "Token verified"),
        (status = 401, description = "Token expired, a new link was sent"),
        (status = 404, description = "User not found or token expired")
    )
)]
pub async fn forgot_password(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (id, token) = path.into_inner();
    log::info!("🔑 GET /auth/forgotpassword/{}", id);

    match password_reset_service::verify_reset_link(&db, &config, mailer.get_ref(), &id, &token).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Token verified successfully"
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/resetpassword/{id}/{token}",
    tag = "Auth",
    params(
        ("id" = String, Path, description = "User id"),
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "New password missing"),
        (status = 404, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    db: web::Data<MongoDB>,
    path: web::Path<(String, String)>,
    request: web::Json<ResetPasswordRequest>,
) -> HttpResponse {
    let (id, token) = path.into_inner();
    log::info!("🔑 POST /auth/resetpassword/{}", id);

    match password_reset_service::reset_password(&db, &id, &token, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password reset successful!"
        })),
        Err(e) => {
            log::warn!("❌ Password reset failed for {}: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_token(req: HttpRequest, config: web::Data<AppConfig>) -> HttpResponse {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(auth_service::bearer_token);

    let Some(token) = token else {
        return AppError::Unauthorized("Missing authorization token".to_string()).error_response();
    };

    match auth_service::verify_token(&config.jwt, token) {
        Ok(claims) => HttpResponse::Ok().json(VerifyTokenResponse {
            success: true,
            valid: true,
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            exp: claims.exp,
        }),
        Err(e) => {
            log::warn!("❌ Token verification failed: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string()).error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(db: web::Data<MongoDB>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/me - {}", claims.email);

    match auth_service::get_current_user(&db, &claims.sub).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user
        })),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserRole};
    use crate::services::LogMailer;
    use actix_web::{http::StatusCode, test, App};
    use mongodb::bson::{doc, oid::ObjectId};
    use std::sync::Arc;

    #[actix_web::test]
    async fn verify_reports_claims_for_a_good_token() {
        let config = AppConfig::for_tests();
        let mut user: User = mongodb::bson::from_document(doc! {
            "name": "Admin", "email": "admin@edu2medu.com", "userType": "education",
        })
        .unwrap();
        user.id = Some(ObjectId::new());
        user.role = UserRole::Admin;
        let token = auth_service::generate_jwt(&config.jwt, &user).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .route("/auth/verify", web::get().to(verify_token)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/auth/verify")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["role"], "admin");
        assert_eq!(body["userId"], user.id_hex());
    }

    #[actix_web::test]
    async fn verify_without_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppConfig::for_tests()))
                .route("/auth/verify", web::get().to(verify_token)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/auth/verify").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn blank_email_gets_envelope_error() {
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .app_data(web::Data::from(mailer))
                .route("/auth/sendpasswordlink", web::post().to(send_password_link)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/sendpasswordlink")
            .set_json(serde_json::json!({ "email": "" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Please enter your email");
    }
}
