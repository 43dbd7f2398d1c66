use crate::database::{MongoDB, USERS};
use crate::models::{User, UserRole, UserStatus, UserType};
use crate::services::auth_service;
use mongodb::bson::{doc, DateTime as BsonDateTime};

/// Admin account built from ADMIN_EMAIL / ADMIN_PASSWORD, with the password already hashed
pub fn admin_user(email: &str, hashed_password: String) -> User {
    let now = BsonDateTime::now();
    User {
        id: None,
        name: "Admin".to_string(),
        email: email.to_string(),
        password: hashed_password,
        phone: String::new(),
        user_type: UserType::Education,
        category: None,
        role: UserRole::Admin,
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
    }
}

/// Creates the admin account when configured and not present yet.
pub async fn seed_admin(db: &MongoDB, email: Option<&str>, password: Option<&str>) {
    let (Some(email), Some(password)) = (email, password) else {
        log::info!("👤 Admin seed: ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping");
        return;
    };

    let collection = db.collection::<User>(USERS);

    match collection.count_documents(doc! { "email": email }).await {
        Ok(0) => {}
        Ok(_) => {
            log::info!("👤 Admin seed: {} already exists, skipping", email);
            return;
        }
        Err(e) => {
            log::error!("   ❌ Admin seed lookup failed: {}", e);
            return;
        }
    }

    let hashed = match auth_service::hash_password(password).await {
        Ok(hashed) => hashed,
        Err(e) => {
            log::error!("   ❌ Admin seed could not hash password: {}", e);
            return;
        }
    };

    match collection.insert_one(admin_user(email, hashed)).await {
        Ok(_) => log::info!("   ✅ Admin account created: {}", email),
        Err(e) => log::error!("   ❌ Failed to seed admin account: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_account_is_an_active_admin() {
        let admin = admin_user("admin@edu2medu.com", "$2b$10$hash".into());
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.status, UserStatus::Active);
        assert_eq!(admin.category, None);
        assert!(admin.id.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn seeding_twice_creates_one_admin() {
        let db = MongoDB::for_tests().await;
        let email = format!("seed-{}@edu2medu.test", uuid::Uuid::new_v4());

        seed_admin(&db, Some(&email), Some("pw")).await;
        seed_admin(&db, Some(&email), Some("pw")).await;

        let users = db.collection::<User>(USERS);
        assert_eq!(users.count_documents(doc! { "email": &email }).await.unwrap(), 1);
        users.delete_many(doc! { "email": &email }).await.unwrap();
    }
}
