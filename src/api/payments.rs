use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MongoDB,
    models::UserProfile,
    services::{
        auth_service::Claims,
        payment_service::{self, PaginationQuery, PaymentPage, PaymentSummary, StorePaymentRequest},
    },
};

#[utoipa::path(
    post,
    path = "/user/storePayment",
    tag = "Payments",
    request_body = StorePaymentRequest,
    responses(
        (status = 200, description = "Payment stored", body = UserProfile),
        (status = 400, description = "UTR number missing"),
        (status = 403, description = "Storing for another account without admin role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn store_payment(
    db: web::Data<MongoDB>,
    claims: web::ReqData<Claims>,
    request: web::Json<StorePaymentRequest>,
) -> HttpResponse {
    log::info!("💳 POST /user/storePayment - by {}", claims.email);

    match payment_service::store(&db, &claims, &request).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Payment details stored successfully",
            "user": user
        })),
        Err(e) => {
            log::warn!("❌ Payment not stored: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/getPayment/{email}",
    tag = "Payments",
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 200, description = "Payment state", body = PaymentSummary),
        (status = 404, description = "User or payment details not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_payment(
    db: web::Data<MongoDB>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("💳 GET /user/getPayment/{}", path);

    match payment_service::get_by_email(&db, &claims, &path).await {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": summary
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/admin/getAllPayments",
    tag = "Admin",
    params(PaginationQuery),
    responses((status = 200, description = "Paginated payment overview", body = PaymentPage)),
    security(("bearer_auth" = []))
)]
pub async fn get_all_payments(db: web::Data<MongoDB>, query: web::Query<PaginationQuery>) -> HttpResponse {
    log::info!("💳 GET /admin/getAllPayments - page {:?}, limit {:?}", query.page, query.limit);

    match payment_service::list(&db, &query).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => e.error_response(),
    }
}
