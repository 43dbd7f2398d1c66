// ==================== PASSWORD RESET ====================
// Reset tokens are short-lived JWTs stored on the user document
// (verifytoken + verifytokenExpires); a link is valid only while both match.

use crate::{
    config::{AppConfig, JwtConfig},
    database::{MongoDB, USERS},
    models::User,
    services::{auth_service, mailer::Mailer},
    utils::{error::AppError, validation::{non_blank, parse_object_id}},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    purpose: String,
    iat: usize,
    exp: usize,
    jti: String,
    aud: String,
    iss: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendLinkRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: Option<String>,
}

fn issue_reset_token(jwt: &JwtConfig, user_id: &ObjectId) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = ResetClaims {
        sub: user_id.to_hex(),
        purpose: RESET_PURPOSE.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(jwt.reset_ttl_minutes)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: jwt.audience.clone(),
        iss: jwt.issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate reset token: {}", e)))
}

fn reset_token_is_valid(jwt: &JwtConfig, token: &str, user_id: &ObjectId) -> bool {
    decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &auth_service::validation_for(jwt),
    )
    .map(|data| data.claims.purpose == RESET_PURPOSE && data.claims.sub == user_id.to_hex())
    .unwrap_or(false)
}

pub fn reset_link(frontend_url: &str, user_id: &ObjectId, token: &str) -> String {
    format!(
        "{}/forgotpassword/{}/{}",
        frontend_url.trim_end_matches('/'),
        user_id.to_hex(),
        urlencoding::encode(token)
    )
}

/// Stores a fresh token on the user and mails the link
async fn issue_and_send(
    db: &MongoDB,
    config: &AppConfig,
    mailer: &dyn Mailer,
    user: &User,
) -> Result<(), AppError> {
    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal("User document has no _id".to_string()))?;

    let token = issue_reset_token(&config.jwt, &user_id)?;
    let expires = BsonDateTime::from_millis(
        BsonDateTime::now().timestamp_millis() + config.jwt.reset_ttl_minutes * 60 * 1000,
    );

    db.collection::<User>(USERS)
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": {
                "verifytoken": &token,
                "verifytokenExpires": expires,
                "updatedAt": BsonDateTime::now(),
            } },
        )
        .await?;

    log::info!("🔑 Reset token stored for user {}", user_id);

    mailer
        .send_password_reset(&user.email, &reset_link(&config.frontend_url, &user_id, &token))
        .await
}

/// User whose stored reset token matches and has not expired
async fn find_by_reset_token(
    db: &MongoDB,
    user_id: &ObjectId,
    token: &str,
) -> Result<Option<User>, AppError> {
    Ok(db
        .collection::<User>(USERS)
        .find_one(doc! {
            "_id": *user_id,
            "verifytoken": token,
            "verifytokenExpires": { "$gt": BsonDateTime::now() },
        })
        .await?)
}

pub async fn send_password_link(
    db: &MongoDB,
    config: &AppConfig,
    mailer: &dyn Mailer,
    request: &SendLinkRequest,
) -> Result<(), AppError> {
    let email = non_blank(request.email.as_deref())
        .ok_or_else(|| AppError::InvalidRequest("Please enter your email".to_string()))?;

    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    issue_and_send(db, config, mailer, &user).await
}

/// Checks a reset link. An expired JWT behind a still-stored token gets
/// a replacement link mailed out and the caller sees 401.
pub async fn verify_reset_link(
    db: &MongoDB,
    config: &AppConfig,
    mailer: &dyn Mailer,
    id: &str,
    token: &str,
) -> Result<(), AppError> {
    let user_id = parse_object_id(id, "user")?;

    let user = find_by_reset_token(db, &user_id, token)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found or token expired".to_string()))?;

    if !reset_token_is_valid(&config.jwt, token, &user_id) {
        log::warn!("⚠️ Reset token failed verification for {}, issuing a new one", user_id);
        issue_and_send(db, config, mailer, &user).await?;
        return Err(AppError::Unauthorized(
            "Token expired. A new link has been sent to your email.".to_string(),
        ));
    }

    Ok(())
}

pub async fn reset_password(
    db: &MongoDB,
    id: &str,
    token: &str,
    request: &ResetPasswordRequest,
) -> Result<(), AppError> {
    let new_password = request
        .new_password
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("New password is required".to_string()))?;

    let user_id = parse_object_id(id, "user")?;

    find_by_reset_token(db, &user_id, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or expired token".to_string()))?;

    let hashed = auth_service::hash_password(new_password).await?;

    db.collection::<User>(USERS)
        .update_one(
            doc! { "_id": user_id },
            doc! {
                "$set": { "password": hashed, "updatedAt": BsonDateTime::now() },
                "$unset": { "verifytoken": "", "verifytokenExpires": "" },
            },
        )
        .await?;

    log::info!("✅ Password reset for user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::testing::RecordingMailer;

    fn jwt() -> JwtConfig {
        AppConfig::for_tests().jwt
    }

    #[test]
    fn reset_token_is_bound_to_its_user() {
        let owner = ObjectId::new();
        let token = issue_reset_token(&jwt(), &owner).unwrap();

        assert!(reset_token_is_valid(&jwt(), &token, &owner));
        assert!(!reset_token_is_valid(&jwt(), &token, &ObjectId::new()));
    }

    #[test]
    fn expired_reset_token_fails_verification() {
        let mut config = jwt();
        config.reset_ttl_minutes = -120;
        let owner = ObjectId::new();
        let token = issue_reset_token(&config, &owner).unwrap();
        assert!(!reset_token_is_valid(&config, &token, &owner));
    }

    #[test]
    fn session_token_cannot_reset_passwords() {
        let owner = ObjectId::new();
        let mut user: User = mongodb::bson::from_document(doc! {
            "name": "A", "email": "a@b.in", "userType": "education",
        })
        .unwrap();
        user.id = Some(owner);
        let session = auth_service::generate_jwt(&jwt(), &user).unwrap();
        assert!(!reset_token_is_valid(&jwt(), &session, &owner));
    }

    #[test]
    fn link_points_at_frontend_route() {
        let id = ObjectId::parse_str("65f1c2a9e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(
            reset_link("https://edu2medu.com/", &id, "a.b.c"),
            "https://edu2medu.com/forgotpassword/65f1c2a9e4b0a1b2c3d4e5f6/a.b.c"
        );
    }

    #[tokio::test]
    async fn blank_email_is_rejected_before_lookup() {
        let db = MongoDB::unconnected().await;
        let mailer = RecordingMailer::default();
        let result = send_password_link(
            &db,
            &AppConfig::for_tests(),
            &mailer,
            &SendLinkRequest { email: Some("  ".into()) },
        )
        .await;

        assert_eq!(result, Err(AppError::InvalidRequest("Please enter your email".into())));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_requires_new_password() {
        let db = MongoDB::unconnected().await;
        let result = reset_password(
            &db,
            "65f1c2a9e4b0a1b2c3d4e5f6",
            "token",
            &ResetPasswordRequest { new_password: None },
        )
        .await;
        assert_eq!(result, Err(AppError::InvalidRequest("New password is required".into())));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn reset_clears_the_stored_token() {
        let db = MongoDB::for_tests().await;
        let config = AppConfig::for_tests();
        let mailer = RecordingMailer::default();
        let users = db.collection::<User>(USERS);

        let email = format!("reset-{}@edu2medu.test", Uuid::new_v4());
        let mut user: User = mongodb::bson::from_document(doc! {
            "name": "Sunrise Clinic", "email": &email, "userType": "healthcare",
        })
        .unwrap();
        user.password = auth_service::hash_password("old-password").await.unwrap();
        let user_id = users.insert_one(&user).await.unwrap().inserted_id.as_object_id().unwrap();

        send_password_link(&db, &config, &mailer, &SendLinkRequest { email: Some(email.clone()) })
            .await
            .unwrap();
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);

        let token = users
            .find_one(doc! { "_id": user_id })
            .await
            .unwrap()
            .and_then(|u| u.verifytoken)
            .unwrap();
        let id = user_id.to_hex();
        verify_reset_link(&db, &config, &mailer, &id, &token).await.unwrap();

        reset_password(&db, &id, &token, &ResetPasswordRequest { new_password: Some("new-password".into()) })
            .await
            .unwrap();

        let stored = users.find_one(doc! { "_id": user_id }).await.unwrap().unwrap();
        assert!(stored.verifytoken.is_none());
        assert!(stored.verifytoken_expires.is_none());
        assert!(auth_service::verify_password("new-password", &stored.password).await.unwrap());

        // The link is single use
        assert!(matches!(
            reset_password(&db, &id, &token, &ResetPasswordRequest { new_password: Some("again".into()) }).await,
            Err(AppError::NotFound(_))
        ));

        users.delete_one(doc! { "_id": user_id }).await.unwrap();
    }
}
