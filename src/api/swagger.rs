use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Edu2Medu Directory API",
        version = "1.0.0",
        description = "Directory of schools, tutors, clinics, hospitals and pharmacies.\n\n**Authentication:** endpoints marked with a lock need a JWT Bearer token from `/user/login`. Admin endpoints need an admin account.",
        contact(
            name = "Edu2Medu",
            email = "support@edu2medu.com"
        )
    ),
    paths(
        // Users
        crate::api::users::register,
        crate::api::users::login,
        crate::api::users::get_education_users,
        crate::api::users::get_healthcare_users,
        crate::api::users::search_education,
        crate::api::users::search_healthcare,
        crate::api::users::update_profile,
        crate::api::categories::get_all_categories,
        crate::api::contacts::request_call,

        // Jobs
        crate::api::jobs::create_job,
        crate::api::jobs::get_all_jobs,
        crate::api::jobs::get_job,
        crate::api::jobs::update_job,
        crate::api::jobs::delete_job,

        // Payments
        crate::api::payments::store_payment,
        crate::api::payments::get_payment,

        // Auth
        crate::api::auth::send_password_link,
        crate::api::auth::forgot_password,
        crate::api::auth::reset_password,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Admin
        crate::api::admin::get_education_users,
        crate::api::admin::get_healthcare_users,
        crate::api::admin::block_education_user,
        crate::api::admin::unblock_education_user,
        crate::api::admin::block_healthcare_user,
        crate::api::admin::unblock_healthcare_user,
        crate::api::admin::delete_user,
        crate::api::contacts::get_contacts,
        crate::api::contacts::delete_contact,
        crate::api::categories::add_category,
        crate::api::categories::delete_category,
        crate::api::news::add_news,
        crate::api::news::get_all_news,
        crate::api::news::delete_news,
        crate::api::payments::get_all_payments,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::VerifyTokenResponse,
            crate::services::password_reset_service::SendLinkRequest,
            crate::services::password_reset_service::ResetPasswordRequest,
            crate::services::user_service::UpdateProfileRequest,
            crate::services::user_service::UserIdRequest,
            crate::services::payment_service::StorePaymentRequest,
            crate::services::payment_service::PaymentSummary,
            crate::services::payment_service::PaymentPage,
            crate::models::UserProfile,
            crate::models::PaymentDetailsView,
            crate::models::Teacher,
            crate::models::CategoryResponse,
            crate::models::CreateCategoryRequest,
            crate::models::JobRequest,
            crate::models::JobResponse,
            crate::models::RequestCallRequest,
            crate::models::ContactResponse,
            crate::models::CreateNewsRequest,
            crate::models::NewsResponse,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Users", description = "Registration, login, provider listings, search and profile editing."),
        (name = "Categories", description = "Category catalog per userType."),
        (name = "Jobs", description = "Job board. Posting, editing and deleting need a token."),
        (name = "Contacts", description = "Call-back requests from the public contact form."),
        (name = "Payments", description = "Manually verified yearly subscription payments."),
        (name = "Auth", description = "Password reset links and token checks."),
        (name = "News", description = "Public news feed."),
        (name = "Admin", description = "Moderation and content management. Admin role required."),
        (name = "Health", description = "Health check and Prometheus metrics."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /user/login"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/user/register"));
        assert!(paths.contains_key("/admin/getAllPayments"));
        assert!(paths.contains_key("/auth/forgotpassword/{id}/{token}"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
