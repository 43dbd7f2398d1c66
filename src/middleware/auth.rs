use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::AppConfig;
use crate::services::auth_service::{self, Claims};
use crate::utils::error::AppError;

/// Requires a valid bearer JWT and stores its `Claims` in request extensions.
/// `AuthMiddleware::admin()` additionally requires the admin role.
#[derive(Clone, Copy)]
pub struct AuthMiddleware {
    admin_only: bool,
}

impl AuthMiddleware {
    pub fn user() -> Self {
        Self { admin_only: false }
    }

    pub fn admin() -> Self {
        Self { admin_only: true }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            admin_only: self.admin_only,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    admin_only: bool,
}

/// Claims for the request, or the error to answer with
fn authenticate(req: &ServiceRequest, admin_only: bool) -> Result<Claims, AppError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Internal("AppConfig is not registered".to_string()))?;

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(auth_service::bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = auth_service::verify_token(&config.jwt, token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if admin_only && !claims.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(claims)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req, self.admin_only) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => {
                log::warn!("⚠️ {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserRole};
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use mongodb::bson::{doc, oid::ObjectId};

    fn token_for(role: UserRole) -> String {
        let mut user: User = mongodb::bson::from_document(doc! {
            "name": "Green Valley School", "email": "admin@greenvalley.in", "userType": "education",
        })
        .unwrap();
        user.id = Some(ObjectId::new());
        user.role = role;
        auth_service::generate_jwt(&AppConfig::for_tests().jwt, &user).unwrap()
    }

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.email.clone())
    }

    macro_rules! app {
        ($guard:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppConfig::for_tests()))
                    .service(web::scope("/p").wrap($guard).route("/me", web::get().to(whoami))),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = app!(AuthMiddleware::user());
        let req = test::TestRequest::get().uri("/p/me").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_token_reaches_handler_with_claims() {
        let app = app!(AuthMiddleware::user());
        let req = test::TestRequest::get()
            .uri("/p/me")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for(UserRole::User))))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "admin@greenvalley.in");
    }

    #[actix_web::test]
    async fn admin_scope_rejects_regular_users() {
        let app = app!(AuthMiddleware::admin());
        let req = test::TestRequest::get()
            .uri("/p/me")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for(UserRole::User))))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/p/me")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for(UserRole::Admin))))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
