use crate::utils::error::AppError;
use lazy_static::lazy_static;
use mongodb::bson::oid::ObjectId;
use regex::Regex;

lazy_static! {
    static ref PHONE_10_DIGITS: Regex = Regex::new(r"^\d{10}$").expect("valid phone regex");
}

/// Trimmed, non-empty value or `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn is_ten_digit_phone(phone: &str) -> bool {
    PHONE_10_DIGITS.is_match(phone)
}

pub fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id.trim()).map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID", what)))
}

/// Case-insensitive "contains" pattern with the user's input escaped
pub fn contains_pattern(query: &str) -> String {
    regex::escape(query.trim())
}
