use crate::{
    config::JwtConfig,
    database::{MongoDB, USERS},
    models::{User, UserProfile, UserRole, UserStatus, UserType},
    utils::{error::AppError, validation::non_blank},
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const BCRYPT_COST: u32 = 10;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user _id (hex)
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "userType")]
    pub user_type: UserType,
    pub role: UserRole,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address or phone number
    pub email_or_phone: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub success: bool,
    pub valid: bool,
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
}

pub fn validation_for(jwt: &JwtConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[jwt.audience.as_str()]);
    validation.set_issuer(&[jwt.issuer.as_str()]);
    validation
}

// Generate JWT token
pub fn generate_jwt(jwt: &JwtConfig, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id_hex(),
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        user_type: user.user_type,
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(jwt.ttl_hours)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: jwt.audience.clone(),
        iss: jwt.issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(jwt: &JwtConfig, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation_for(jwt),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// `Authorization: Bearer <token>` → `<token>`
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Validated registration input
#[derive(Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_type: UserType,
    pub category: String,
}

pub fn validate_registration(request: &RegisterRequest) -> Result<NewUser, AppError> {
    let missing = || AppError::InvalidRequest("Please provide all required fields".to_string());

    let name = non_blank(request.name.as_deref()).ok_or_else(missing)?;
    let email = non_blank(request.email.as_deref()).ok_or_else(missing)?;
    let phone = non_blank(request.phone.as_deref()).ok_or_else(missing)?;
    let user_type = non_blank(request.user_type.as_deref()).ok_or_else(missing)?;
    let password = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(missing)?
        .to_string();

    let user_type: UserType = user_type
        .parse()
        .map_err(|_| AppError::InvalidRequest("Invalid userType".to_string()))?;

    let category = non_blank(request.category.as_deref())
        .filter(|c| user_type.allows_category(c))
        .ok_or_else(|| {
            AppError::InvalidRequest("Invalid category for the selected userType".to_string())
        })?;

    Ok(NewUser { name, email, password, phone, user_type, category })
}

// User registration
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<UserProfile, AppError> {
    let new_user = validate_registration(request)?;
    let collection = db.collection::<User>(USERS);

    if collection
        .find_one(doc! { "email": &new_user.email })
        .await?
        .is_some()
    {
        return Err(AppError::InvalidRequest(
            "User with this email already exists".to_string(),
        ));
    }

    let hashed_password = hash_password(&new_user.password).await?;
    let now = BsonDateTime::now();

    let mut user = User {
        id: None,
        name: new_user.name,
        email: new_user.email,
        password: hashed_password,
        phone: new_user.phone,
        user_type: new_user.user_type,
        category: Some(new_user.category),
        role: UserRole::User,
        status: UserStatus::Active,
        image: None,
        address: None,
        description: None,
        contact_info: None,
        amenity: None,
        establishment: None,
        additional_info: None,
        teachers: Vec::new(),
        payment_details: None,
        verifytoken: None,
        verifytoken_expires: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = collection.insert_one(&user).await?;
    user.id = result.inserted_id.as_object_id();

    log::info!("✅ User registered successfully: {} ({})", user.email, user.user_type);

    Ok(UserProfile::from(user))
}

// User login
pub async fn login(
    db: &MongoDB,
    jwt: &JwtConfig,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let invalid = || AppError::InvalidRequest("Invalid email/phone or password".to_string());

    let identifier = non_blank(request.email_or_phone.as_deref()).ok_or_else(|| {
        AppError::InvalidRequest("Please provide email/phone and password".to_string())
    })?;
    let password = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            AppError::InvalidRequest("Please provide email/phone and password".to_string())
        })?;

    let mut filter = doc! {
        "$or": [
            { "email": &identifier },
            { "phone": &identifier }
        ]
    };
    if let Some(user_type) = request.user_type {
        filter.insert("userType", user_type.as_str());
    }

    let user = db
        .collection::<User>(USERS)
        .find_one(filter)
        .await?
        .ok_or_else(invalid)?;

    // Only "blocked" refuses login; "active" and "unblock" both pass
    if user.status.is_blocked() {
        return Err(AppError::Forbidden(
            "Your account is blocked. Please contact support.".to_string(),
        ));
    }

    if user.password.is_empty() || !verify_password(password, &user.password).await? {
        return Err(invalid());
    }

    let token = generate_jwt(jwt, &user)?;

    Ok(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserProfile::from(user),
    })
}

// Get current user
pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<UserProfile, AppError> {
    let object_id = crate::utils::validation::parse_object_id(user_id, "user")?;

    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserProfile::with_payment(user, BsonDateTime::now().timestamp_millis()))
}
