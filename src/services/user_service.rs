use crate::{
    database::{MongoDB, USERS},
    models::{Teacher, User, UserProfile, UserRole, UserStatus, UserType},
    services::auth_service::Claims,
    utils::{
        cache::{ListingCache, KEY_EDUCATION_USERS, KEY_HEALTHCARE_USERS},
        error::AppError,
        image::resolve_image_url,
        validation::{contains_pattern, non_blank, parse_object_id},
    },
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde::Deserialize;
use serde_json::Value;

const LISTING_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Account to edit; only admins may name someone other than themselves
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
    pub amenity: Option<String>,
    pub establishment: Option<String>,
    pub additional_info: Option<String>,
    /// Array of `{name, qualification}` or the same array JSON-encoded as a string
    #[schema(value_type = Object)]
    pub teachers: Option<Value>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: Option<String>,
}

pub fn users_cache_key(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Education => KEY_EDUCATION_USERS,
        UserType::Healthcare => KEY_HEALTHCARE_USERS,
    }
}

fn visible_filter(user_type: UserType) -> Document {
    doc! {
        "userType": user_type.as_str(),
        "status": { "$in": UserStatus::visible().to_vec() },
        "role": { "$ne": UserRole::Admin.as_str() },
    }
}

fn public_projection() -> Document {
    doc! { "password": 0, "verifytoken": 0, "verifytokenExpires": 0, "paymentDetails": 0 }
}

async fn find_users(db: &MongoDB, filter: Document, options: FindOptions) -> Result<Vec<User>, AppError> {
    let cursor = db
        .collection::<User>(USERS)
        .find(filter)
        .with_options(options)
        .await?;
    Ok(cursor.try_collect().await?)
}

/// Rewrites each stored image reference into a loadable URL
pub fn resolve_images(profiles: &mut [UserProfile], base_url: &str) {
    for profile in profiles.iter_mut() {
        profile.image = Some(resolve_image_url(base_url, profile.image.as_deref()));
    }
}

// ==================== PUBLIC LISTINGS ====================

async fn load_visible(db: MongoDB, user_type: UserType) -> Result<Value, AppError> {
    let options = FindOptions::builder()
        .projection(public_projection())
        .sort(doc! { "createdAt": -1 })
        .limit(LISTING_LIMIT)
        .build();

    let profiles: Vec<UserProfile> = find_users(&db, visible_filter(user_type), options)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    log::info!("📋 Loaded {} visible {} users from database", profiles.len(), user_type);
    Ok(serde_json::to_value(profiles)?)
}

/// Visible providers of one type, served through the listing cache
pub async fn list_visible(
    db: &MongoDB,
    cache: &ListingCache,
    user_type: UserType,
) -> Result<Vec<UserProfile>, AppError> {
    let value = cache
        .get_or_load(users_cache_key(user_type), load_visible(db.clone(), user_type))
        .await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn search(db: &MongoDB, user_type: UserType, query: Option<&str>) -> Result<Vec<UserProfile>, AppError> {
    let query = non_blank(query)
        .ok_or_else(|| AppError::InvalidRequest("Search query is required".to_string()))?;
    let pattern = contains_pattern(&query);

    let mut filter = visible_filter(user_type);
    filter.insert(
        "$or",
        vec![
            doc! { "name": { "$regex": &pattern, "$options": "i" } },
            doc! { "category": { "$regex": &pattern, "$options": "i" } },
            doc! { "address": { "$regex": &pattern, "$options": "i" } },
        ],
    );

    let options = FindOptions::builder()
        .projection(public_projection())
        .limit(LISTING_LIMIT)
        .build();

    let results: Vec<UserProfile> = find_users(db, filter, options)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    log::info!("🔍 Search {} '{}' → {} results", user_type, query, results.len());

    if results.is_empty() {
        return Err(AppError::NotFound(format!("No {} results found", user_type)));
    }
    Ok(results)
}

// ==================== ADMIN ====================

/// Every user of a type regardless of status, with payment state
pub async fn list_for_admin(db: &MongoDB, user_type: UserType) -> Result<Vec<UserProfile>, AppError> {
    let options = FindOptions::builder()
        .projection(doc! { "password": 0, "verifytoken": 0, "verifytokenExpires": 0 })
        .sort(doc! { "createdAt": -1 })
        .build();

    let filter = doc! {
        "userType": user_type.as_str(),
        "role": { "$ne": UserRole::Admin.as_str() },
    };

    let now = BsonDateTime::now().timestamp_millis();
    let users: Vec<UserProfile> = find_users(db, filter, options)
        .await?
        .into_iter()
        .map(|user| UserProfile::with_payment(user, now))
        .collect();

    if users.is_empty() {
        return Err(AppError::NotFound(format!("No {} users found", user_type)));
    }
    Ok(users)
}

pub async fn set_status(
    db: &MongoDB,
    cache: &ListingCache,
    user_type: UserType,
    request: &UserIdRequest,
    status: UserStatus,
) -> Result<UserProfile, AppError> {
    let user_id = non_blank(request.user_id.as_deref())
        .ok_or_else(|| AppError::InvalidRequest("userId is required".to_string()))?;
    let object_id = parse_object_id(&user_id, "user")?;

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let user = db
        .collection::<User>(USERS)
        .find_one_and_update(
            doc! { "_id": object_id, "userType": user_type.as_str() },
            doc! { "$set": { "status": status.as_str(), "updatedAt": BsonDateTime::now() } },
        )
        .with_options(options)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    cache.clear(Some(users_cache_key(user_type)));
    log::info!("🔒 {} user {} is now {}", user_type, user.email, status.as_str());

    Ok(UserProfile::from(user))
}

pub async fn delete_user(db: &MongoDB, cache: &ListingCache, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id, "user")?;

    let user = db
        .collection::<User>(USERS)
        .find_one_and_delete(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    cache.clear(Some(users_cache_key(user.user_type)));
    log::info!("🗑️ Deleted user {} ({})", user.email, user.user_type);
    Ok(())
}

// ==================== PROFILE ====================

pub fn parse_teachers(value: &Value) -> Result<Vec<Teacher>, AppError> {
    let invalid = || AppError::InvalidRequest("Invalid teachers format".to_string());
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value.clone()).map_err(|_| invalid()),
        Value::String(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Value::String(raw) => serde_json::from_str(raw).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// `$set` and `$unset` documents for a profile edit. Blank optional fields
/// are unset; blank name or phone are ignored since both are required.
pub fn profile_changes(
    request: &UpdateProfileRequest,
    user_type: UserType,
) -> Result<(Document, Document), AppError> {
    let mut set = Document::new();
    let mut unset = Document::new();

    for (field, value) in [("name", &request.name), ("phone", &request.phone)] {
        if let Some(value) = non_blank(value.as_deref()) {
            set.insert(field, value);
        }
    }

    let optional = [
        ("address", &request.address),
        ("description", &request.description),
        ("contactInfo", &request.contact_info),
        ("amenity", &request.amenity),
        ("establishment", &request.establishment),
        ("additionalInfo", &request.additional_info),
        ("image", &request.image),
    ];
    for (field, value) in optional {
        match value.as_deref().map(str::trim) {
            Some("") => {
                unset.insert(field, "");
            }
            Some(value) => {
                set.insert(field, value);
            }
            None => {}
        }
    }

    match request.category.as_deref().map(str::trim) {
        Some("") => {
            unset.insert("category", "");
        }
        Some(category) if user_type.allows_category(category) => {
            set.insert("category", category);
        }
        Some(_) => {
            return Err(AppError::InvalidRequest(
                "Invalid category for the selected userType".to_string(),
            ))
        }
        None => {}
    }

    if let Some(teachers) = &request.teachers {
        let teachers = parse_teachers(teachers)?;
        set.insert("teachers", mongodb::bson::to_bson(&teachers)?);
    }

    Ok((set, unset))
}

pub async fn update_profile(
    db: &MongoDB,
    cache: &ListingCache,
    claims: &Claims,
    request: &UpdateProfileRequest,
) -> Result<UserProfile, AppError> {
    let target_email = match non_blank(request.email.as_deref()) {
        Some(email) if email != claims.email && !claims.is_admin() => {
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ))
        }
        Some(email) => email,
        None => claims.email.clone(),
    };

    let collection = db.collection::<User>(USERS);
    let user = collection
        .find_one(doc! { "email": &target_email })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let (mut set, unset) = profile_changes(request, user.user_type)?;
    let now = BsonDateTime::now();

    if set.is_empty() && unset.is_empty() {
        log::info!("ℹ️ Profile update for {} had no changes", target_email);
        return Ok(UserProfile::with_payment(user, now.timestamp_millis()));
    }

    set.insert("updatedAt", Bson::DateTime(now));
    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let updated = collection
        .find_one_and_update(doc! { "_id": user.id }, update)
        .with_options(options)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    cache.clear(Some(users_cache_key(updated.user_type)));
    log::info!("✅ Profile updated: {}", updated.email);

    Ok(UserProfile::with_payment(updated, now.timestamp_millis()))
}
