pub mod admin;
pub mod auth;
pub mod categories;
pub mod contacts;
pub mod health;
pub mod jobs;
pub mod metrics;
pub mod news;
pub mod payments;
pub mod swagger;
pub mod users;

use actix_web::{web, HttpResponse};

use crate::middleware::AuthMiddleware;

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "message": "Route not found" }))
}

/// Every application route. Shared by the server and the routing tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        // ==================== USER ====================
        .service(
            web::scope("/user")
                .route("/register", web::post().to(users::register))
                .route("/login", web::post().to(users::login))
                .route("/getAllUsers", web::get().to(users::get_education_users))
                .route("/getHealthcareUsers", web::get().to(users::get_healthcare_users))
                .route("/getallcategories", web::get().to(categories::get_all_categories))
                .route("/searchEducation", web::get().to(users::search_education))
                .route("/searchHealthcare", web::get().to(users::search_healthcare))
                .route("/requestcall", web::post().to(contacts::request_call))
                .route("/getalljobs", web::get().to(jobs::get_all_jobs))
                .route("/getjob/{id}", web::get().to(jobs::get_job))
                // Protected endpoints requiring JWT authentication
                .service(
                    web::resource("/updateProfile")
                        .wrap(AuthMiddleware::user())
                        .route(web::patch().to(users::update_profile)),
                )
                .service(
                    web::resource("/createjob")
                        .wrap(AuthMiddleware::user())
                        .route(web::post().to(jobs::create_job)),
                )
                .service(
                    web::resource("/updatejob/{id}")
                        .wrap(AuthMiddleware::user())
                        .route(web::put().to(jobs::update_job)),
                )
                .service(
                    web::resource("/deletejob/{id}")
                        .wrap(AuthMiddleware::user())
                        .route(web::delete().to(jobs::delete_job)),
                )
                .service(
                    web::resource("/storePayment")
                        .wrap(AuthMiddleware::user())
                        .route(web::post().to(payments::store_payment)),
                )
                .service(
                    web::resource("/getPayment/{email}")
                        .wrap(AuthMiddleware::user())
                        .route(web::get().to(payments::get_payment)),
                ),
        )
        // ==================== AUTH ====================
        .service(
            web::scope("/auth")
                .route("/sendpasswordlink", web::post().to(auth::send_password_link))
                .route("/forgotpassword/{id}/{token}", web::get().to(auth::forgot_password))
                .route("/resetpassword/{id}/{token}", web::post().to(auth::reset_password))
                .route("/verify", web::get().to(auth::verify_token))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware::user())
                        .route(web::get().to(auth::get_me)),
                ),
        )
        // ==================== ADMIN ====================
        // Public news feed; must be registered before the guarded /admin scope
        .route("/admin/getallNews", web::get().to(news::get_all_news))
        .service(
            web::scope("/admin")
                .wrap(AuthMiddleware::admin())
                .route("/getEducationUsers", web::get().to(admin::get_education_users))
                .route("/getHealthcareUsers", web::get().to(admin::get_healthcare_users))
                .route("/blockEducationUser", web::post().to(admin::block_education_user))
                .route("/unblockEducationUser", web::post().to(admin::unblock_education_user))
                .route("/blockHealthcareUser", web::post().to(admin::block_healthcare_user))
                .route("/unblockHealthcareUser", web::post().to(admin::unblock_healthcare_user))
                .route("/deleteUser/{id}", web::delete().to(admin::delete_user))
                .route("/getContacts", web::get().to(contacts::get_contacts))
                .route("/deleteContact/{id}", web::delete().to(contacts::delete_contact))
                .route("/addCategory", web::post().to(categories::add_category))
                .route("/deleteCategory/{id}", web::delete().to(categories::delete_category))
                .route("/addNews", web::post().to(news::add_news))
                .route("/deleteNews/{id}", web::delete().to(news::delete_news))
                .route("/getAllPayments", web::get().to(payments::get_all_payments)),
        )
        .default_service(web::to(not_found));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, database::MongoDB, utils::cache::ListingCache};
    use actix_web::{http::StatusCode, test, App};
    use std::time::Duration;

    macro_rules! app {
        () => {{
            let cache = ListingCache::new(Duration::from_secs(60));
            cache.set(crate::utils::cache::KEY_NEWS, serde_json::json!([]));
            test::init_service(
                App::new()
                    .app_data(web::Data::new(MongoDB::unconnected().await))
                    .app_data(web::Data::new(cache))
                    .app_data(web::Data::new(AppConfig::for_tests()))
                    .configure(routes),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn unknown_route_gets_json_404() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Route not found");
    }

    #[actix_web::test]
    async fn news_feed_is_public() {
        let app = app!();
        let body: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/admin/getallNews").to_request()).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["news"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn admin_routes_require_a_token() {
        let app = app!();
        let req = test::TestRequest::get().uri("/admin/getContacts").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn protected_user_routes_require_a_token() {
        let app = app!();
        let req = test::TestRequest::post().uri("/user/storePayment").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
