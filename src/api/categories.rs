use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    models::{CategoryResponse, CreateCategoryRequest},
    services::category_service,
    utils::cache::ListingCache,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// `education` or `healthcare`; omit for every category
    pub user_type: Option<String>,
}

#[utoipa::path(
    get,
    path = "/user/getallcategories",
    tag = "Categories",
    params(CategoryQuery),
    responses((status = 200, description = "Newest categories first", body = Vec<CategoryResponse>))
)]
pub async fn get_all_categories(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    query: web::Query<CategoryQuery>,
) -> HttpResponse {
    log::info!("📋 GET /user/getallcategories - userType: {:?}", query.user_type);

    match category_service::list(&db, &cache, query.user_type.as_deref()).await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/admin/addCategory",
    tag = "Admin",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category added", body = CategoryResponse),
        (status = 400, description = "Missing fields or unknown userType")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_category(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    request: web::Json<CreateCategoryRequest>,
) -> HttpResponse {
    log::info!("➕ POST /admin/addCategory - name: {:?}", request.name);

    match category_service::add(&db, &cache, &request).await {
        Ok(category) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Category added successfully",
            "category": category
        })),
        Err(e) => {
            log::warn!("❌ Category not added: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/deleteCategory/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    db: web::Data<MongoDB>,
    cache: web::Data<ListingCache>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /admin/deleteCategory/{}", id);

    match category_service::delete(&db, &cache, &id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Category deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
