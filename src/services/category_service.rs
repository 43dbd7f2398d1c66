use crate::{
    database::{MongoDB, CATEGORIES},
    models::{Category, CategoryResponse, CreateCategoryRequest, UserType},
    utils::{
        cache::{categories_key, ListingCache, KEY_CATEGORIES_PREFIX},
        error::AppError,
        validation::{non_blank, parse_object_id},
    },
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::options::FindOptions;
use serde_json::Value;

const CATEGORY_LIMIT: i64 = 50;

async fn load_categories(db: MongoDB, user_type: Option<String>) -> Result<Value, AppError> {
    let mut filter = Document::new();
    if let Some(user_type) = &user_type {
        filter.insert("userType", user_type.as_str());
    }

    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .limit(CATEGORY_LIMIT)
        .build();

    let categories: Vec<Category> = db
        .collection::<Category>(CATEGORIES)
        .find(filter)
        .with_options(options)
        .await?
        .try_collect()
        .await?;

    let categories: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(serde_json::to_value(categories)?)
}

/// Newest categories first, optionally for one userType
pub async fn list(
    db: &MongoDB,
    cache: &ListingCache,
    user_type: Option<&str>,
) -> Result<Vec<CategoryResponse>, AppError> {
    let user_type = non_blank(user_type);
    let key = categories_key(user_type.as_deref());
    let value = cache.get_or_load(&key, load_categories(db.clone(), user_type)).await?;
    Ok(serde_json::from_value(value)?)
}

pub fn validate(request: &CreateCategoryRequest) -> Result<Category, AppError> {
    let missing = || AppError::InvalidRequest("All fields are required".to_string());

    let name = non_blank(request.name.as_deref()).ok_or_else(missing)?;
    let ctitle = non_blank(request.ctitle.as_deref()).ok_or_else(missing)?;
    let category_type = non_blank(request.category_type.as_deref()).ok_or_else(missing)?;
    let user_type: UserType = non_blank(request.user_type.as_deref())
        .ok_or_else(missing)?
        .parse()
        .map_err(|_| AppError::InvalidRequest("Invalid userType".to_string()))?;

    let now = BsonDateTime::now();
    Ok(Category {
        id: None,
        name,
        ctitle,
        category_type,
        user_type: user_type.as_str().to_string(),
        image: non_blank(request.image.as_deref()),
        created_at: Some(now),
        updated_at: Some(now),
    })
}

pub async fn add(
    db: &MongoDB,
    cache: &ListingCache,
    request: &CreateCategoryRequest,
) -> Result<CategoryResponse, AppError> {
    let mut category = validate(request)?;

    let result = db.collection::<Category>(CATEGORIES).insert_one(&category).await?;
    category.id = result.inserted_id.as_object_id();

    cache.clear_prefix(KEY_CATEGORIES_PREFIX);
    log::info!("✅ Category added: {} ({})", category.name, category.user_type);

    Ok(CategoryResponse::from(category))
}

pub async fn delete(db: &MongoDB, cache: &ListingCache, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id, "category")?;

    let result = db
        .collection::<Category>(CATEGORIES)
        .delete_one(doc! { "_id": object_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    cache.clear_prefix(KEY_CATEGORIES_PREFIX);
    log::info!("🗑️ Category deleted: {}", id);
    Ok(())
}
