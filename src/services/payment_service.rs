// ==================== PAYMENTS ====================
// Payment state lives on the user document as `paymentDetails`.
// A payment buys SUBSCRIPTION_DAYS; the expiry sweep flips it back to unpaid.

use crate::{
    database::{MongoDB, USERS},
    models::{PaymentDetailsView, PaymentStatus, User, UserProfile, SUBSCRIPTION_DAYS},
    services::auth_service::Claims,
    utils::{error::AppError, validation::non_blank},
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Keeps `(page - 1) * limit` within the i64 range the server accepts for `skip`
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorePaymentRequest {
    pub utr_number: Option<String>,
    /// Admins may record a payment for another account
    pub email: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub name: String,
    pub email: String,
    pub payment_details: PaymentDetailsView,
    pub remaining_days: i64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    /// Page within 1..=MAX_PAGE and limit within 1..=MAX_PAGE_SIZE
    pub fn normalized(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PaymentPage {
    pub success: bool,
    pub data: Vec<UserProfile>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

/// Whose account a request targets: the caller's own unless an admin names another
fn target_email(claims: &Claims, requested: Option<&str>) -> Result<String, AppError> {
    match non_blank(requested) {
        Some(email) if email != claims.email && !claims.is_admin() => Err(AppError::Forbidden(
            "You can only manage your own payment details".to_string(),
        )),
        Some(email) => Ok(email),
        None => Ok(claims.email.clone()),
    }
}

pub async fn store(
    db: &MongoDB,
    claims: &Claims,
    request: &StorePaymentRequest,
) -> Result<UserProfile, AppError> {
    let utr_number = non_blank(request.utr_number.as_deref())
        .ok_or_else(|| AppError::InvalidRequest("UTR number is required".to_string()))?;
    let email = target_email(claims, request.email.as_deref())?;

    let now = BsonDateTime::now();
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let user = db
        .collection::<User>(USERS)
        .find_one_and_update(
            doc! { "email": &email },
            doc! { "$set": {
                "paymentDetails": {
                    "utrNumber": &utr_number,
                    "paymentStatus": PaymentStatus::Paid.as_str(),
                    "paymentDate": now,
                },
                "updatedAt": now,
            } },
        )
        .with_options(options)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("💳 Payment stored for {} (UTR {})", email, utr_number);
    Ok(UserProfile::with_payment(user, now.timestamp_millis()))
}

pub async fn get_by_email(db: &MongoDB, claims: &Claims, email: &str) -> Result<PaymentSummary, AppError> {
    let email = target_email(claims, Some(email))?;

    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    summarize(user, BsonDateTime::now().timestamp_millis())
}

pub fn summarize(user: User, now_millis: i64) -> Result<PaymentSummary, AppError> {
    let details = user
        .payment_details
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Payment details not found for this user".to_string()))?;

    let remaining_days = details
        .payment_date
        .map(|date| crate::models::remaining_days(date.timestamp_millis(), now_millis))
        .unwrap_or(0);

    Ok(PaymentSummary {
        payment_details: PaymentDetailsView::from(details),
        remaining_days,
        name: user.name,
        email: user.email,
    })
}

pub async fn list(db: &MongoDB, query: &PaginationQuery) -> Result<PaymentPage, AppError> {
    let (page, limit) = query.normalized();
    let filter = doc! { "paymentDetails": { "$exists": true, "$ne": null } };
    let collection = db.collection::<User>(USERS);

    let total = collection.count_documents(filter.clone()).await?;

    let options = FindOptions::builder()
        .projection(doc! { "password": 0, "verifytoken": 0, "verifytokenExpires": 0 })
        .sort(doc! { "paymentDetails.paymentDate": -1 })
        .skip((page - 1) * limit)
        .limit(limit as i64)
        .build();

    let now = BsonDateTime::now().timestamp_millis();
    let data: Vec<UserProfile> = collection
        .find(filter)
        .with_options(options)
        .await?
        .try_collect::<Vec<User>>()
        .await?
        .into_iter()
        .map(|user| UserProfile::with_payment(user, now))
        .collect();

    Ok(PaymentPage { success: true, data, page, limit, total })
}

/// Flips paid subscriptions older than a year back to unpaid
pub async fn expire_stale_payments(db: &MongoDB) -> Result<u64, AppError> {
    let cutoff = BsonDateTime::from_millis(
        BsonDateTime::now().timestamp_millis() - SUBSCRIPTION_DAYS * 24 * 60 * 60 * 1000,
    );

    let result = db
        .collection::<User>(USERS)
        .update_many(
            doc! {
                "paymentDetails.paymentStatus": PaymentStatus::Paid.as_str(),
                "paymentDetails.paymentDate": { "$lt": cutoff },
            },
            doc! { "$set": {
                "paymentDetails.paymentStatus": PaymentStatus::Unpaid.as_str(),
                "updatedAt": BsonDateTime::now(),
            } },
        )
        .await?;

    Ok(result.modified_count)
}
