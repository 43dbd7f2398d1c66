use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const EDUCATION_CATEGORIES: &[&str] = &[
    "Day School",
    "Boarding School",
    "Play School",
    "Private Tutor",
    "Coaching Centre",
];

pub const HEALTHCARE_CATEGORIES: &[&str] = &["Hospital", "Private Clinic", "Medical Stores"];

/// Subscription length a single payment buys
pub const SUBSCRIPTION_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Education,
    Healthcare,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Education => "education",
            UserType::Healthcare => "healthcare",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            UserType::Education => EDUCATION_CATEGORIES,
            UserType::Healthcare => HEALTHCARE_CATEGORIES,
        }
    }

    pub fn allows_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "education" => Ok(UserType::Education),
            "healthcare" => Ok(UserType::Healthcare),
            other => Err(format!("Invalid userType: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Blocked,
    Unblock,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
            UserStatus::Unblock => "unblock",
        }
    }

    /// Statuses that may log in and show up in public listings
    pub fn visible() -> [&'static str; 2] {
        [UserStatus::Active.as_str(), UserStatus::Unblock.as_str()]
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, UserStatus::Blocked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Teacher {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qualification: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

/// Manually verified bank transfer, embedded in the user document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub utr_number: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_date: Option<BsonDateTime>,
}

/// Document in the "users" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifytoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifytoken_expires: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsView {
    pub utr_number: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<String>,
}

impl From<&PaymentDetails> for PaymentDetailsView {
    fn from(details: &PaymentDetails) -> Self {
        PaymentDetailsView {
            utr_number: details.utr_number.clone(),
            payment_status: details.payment_status,
            payment_date: details.payment_date.and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}

/// User as returned by the API (no password or reset token)
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_type: UserType,
    pub category: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub image: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
    pub amenity: Option<String>,
    pub establishment: Option<String>,
    pub additional_info: Option<String>,
    pub teachers: Vec<Teacher>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_details: Option<PaymentDetailsView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub remaining_days: Option<i64>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let id = user.id_hex();
        UserProfile {
            id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            user_type: user.user_type,
            category: user.category,
            role: user.role,
            status: user.status,
            image: user.image,
            address: user.address,
            description: user.description,
            contact_info: user.contact_info,
            amenity: user.amenity,
            establishment: user.establishment,
            additional_info: user.additional_info,
            teachers: user.teachers,
            payment_details: None,
            remaining_days: None,
        }
    }
}

impl UserProfile {
    /// Profile plus payment state, for the account owner and admins
    pub fn with_payment(user: User, now_millis: i64) -> Self {
        let payment = user.payment_details.clone();
        let mut profile = UserProfile::from(user);
        if let Some(details) = payment {
            profile.remaining_days = details
                .payment_date
                .map(|date| remaining_days(date.timestamp_millis(), now_millis));
            profile.payment_details = Some(PaymentDetailsView::from(&details));
        }
        profile
    }
}

/// Days left on a yearly subscription paid at `paid_at_millis`, never negative
pub fn remaining_days(paid_at_millis: i64, now_millis: i64) -> i64 {
    const ONE_DAY_MILLIS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
    let elapsed_days = ((now_millis - paid_at_millis).abs() as f64 / ONE_DAY_MILLIS).round() as i64;
    (SUBSCRIPTION_DAYS - elapsed_days).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60 * 1000;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            name: "Sunrise Public School".into(),
            email: "office@sunrise.edu".into(),
            password: "$2b$10$hash".into(),
            phone: "9876543210".into(),
            user_type: UserType::Education,
            category: Some("Day School".into()),
            role: UserRole::User,
            status: UserStatus::Active,
            image: Some("/uploads/1712.png".into()),
            address: Some("Sector 14, Gurugram".into()),
            description: None,
            contact_info: None,
            amenity: None,
            establishment: Some("1998".into()),
            additional_info: None,
            teachers: vec![Teacher { name: "A. Rao".into(), qualification: "M.Sc".into() }],
            payment_details: None,
            verifytoken: Some("reset".into()),
            verifytoken_expires: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn categories_depend_on_user_type() {
        assert!(UserType::Education.allows_category("Play School"));
        assert!(!UserType::Education.allows_category("Hospital"));
        assert!(UserType::Healthcare.allows_category("Medical Stores"));
        assert!(!UserType::Healthcare.allows_category("medical stores"));
    }

    #[test]
    fn user_type_parses_wire_names_only() {
        assert_eq!("education".parse::<UserType>(), Ok(UserType::Education));
        assert_eq!(" healthcare ".parse::<UserType>(), Ok(UserType::Healthcare));
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn stored_document_uses_camel_case_names() {
        let doc = mongodb::bson::to_document(&sample_user()).unwrap();
        assert_eq!(doc.get_str("userType").unwrap(), "education");
        assert_eq!(doc.get_str("status").unwrap(), "active");
        assert!(doc.contains_key("verifytoken"));
        assert!(!doc.contains_key("contactInfo"));
    }

    #[test]
    fn legacy_documents_get_defaults() {
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "City Clinic",
            "email": "desk@cityclinic.in",
            "password": "$2b$10$hash",
            "phone": "9000000000",
            "userType": "healthcare",
            "status": "unblock",
        };
        let user: User = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, UserStatus::Unblock);
        assert!(user.teachers.is_empty());
    }

    #[test]
    fn profile_never_exposes_secrets() {
        let json = serde_json::to_value(UserProfile::from(sample_user())).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("verifytoken").is_none());
        assert!(json.get("paymentDetails").is_none());
        assert_eq!(json["userType"], "education");
        assert_eq!(json["_id"].as_str().unwrap().len(), 24);
    }

    #[test]
    fn remaining_days_counts_down_from_a_year() {
        let now = 400 * DAY;
        assert_eq!(remaining_days(now, now), 365);
        assert_eq!(remaining_days(now - 30 * DAY, now), 335);
        assert_eq!(remaining_days(now - 365 * DAY, now), 0);
        assert_eq!(remaining_days(now - 390 * DAY, now), 0);
    }

    #[test]
    fn payment_view_includes_remaining_days() {
        let now = BsonDateTime::now();
        let mut user = sample_user();
        user.payment_details = Some(PaymentDetails {
            utr_number: Some("UTR123456".into()),
            payment_status: PaymentStatus::Paid,
            payment_date: Some(BsonDateTime::from_millis(now.timestamp_millis() - 10 * DAY)),
        });

        let profile = UserProfile::with_payment(user, now.timestamp_millis());
        assert_eq!(profile.remaining_days, Some(355));
        let details = profile.payment_details.unwrap();
        assert_eq!(details.payment_status, PaymentStatus::Paid);
        assert_eq!(details.utr_number.as_deref(), Some("UTR123456"));
    }
}
