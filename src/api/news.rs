use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MongoDB,
    models::{CreateNewsRequest, NewsResponse},
    services::news_service,
    utils::cache::ListingCache,
};

#[utoipa::path(
    post,
    path = "/admin/addNews",
    tag = "Admin",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "News added", body = NewsResponse),
        (status = 400, description = "Missing fields")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_news(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<CreateNewsRequest>,
) -> HttpResponse {
    log::info!("📰 POST /admin/addNews - title: {:?}", request.title);

    match news_service::add(&db, &cache, &request).await {
        Ok(news) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "News added successfully",
            "news": news
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/admin/getallNews",
    tag = "News",
    responses((status = 200, description = "All news, newest first", body = Vec<NewsResponse>))
)]
pub async fn get_all_news(db: web::Data<MongoDB>, cache: web::Data<ListingCache>) -> HttpResponse {
    log::info!("📰 GET /admin/getallNews");

    match news_service::list(&db, &cache).await {
        Ok(news) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "news": news
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/deleteNews/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "News id")),
    responses(
        (status = 200, description = "News deleted"),
        (status = 404, description = "News not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_news(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /admin/deleteNews/{}", path);

    match news_service::delete(&db, &cache, &path).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "News deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
