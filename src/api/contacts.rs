use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MongoDB,
    models::{ContactResponse, RequestCallRequest},
    services::contact_service,
};

#[utoipa::path(
    post,
    path = "/user/requestcall",
    tag = "Contacts",
    request_body = RequestCallRequest,
    responses(
        (status = 201, description = "Call-back request stored"),
        (status = 400, description = "Missing fields or phone is not 10 digits")
    )
)]
pub async fn request_call(db: web::Data<MongoDB>, request: web::Json<RequestCallRequest>) -> HttpResponse {
    log::info!("📞 POST /user/requestcall");

    match contact_service::request_call(&db, &request).await {
        Ok(()) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Thank you for reaching out! Our team will get back to you soon."
        })),
        Err(e) => {
            log::warn!("❌ Call-back request rejected: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/getContacts",
    tag = "Admin",
    responses((status = 200, description = "Call-back requests, newest first", body = Vec<ContactResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn get_contacts(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📋 GET /admin/getContacts");

    match contact_service::list(&db).await {
        Ok(contacts) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "contacts": contacts
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/deleteContact/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact deleted"),
        (status = 404, description = "Contact not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_contact(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    log::info!("🗑️ DELETE /admin/deleteContact/{}", path);

    match contact_service::delete(&db, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Contact deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn nine_digit_phone_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MongoDB::unconnected().await))
                .route("/user/requestcall", web::post().to(request_call)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/user/requestcall")
            .set_json(serde_json::json!({ "name": "Riya", "phone": "987654321" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Phone number must be exactly 10 digits");
    }
}
