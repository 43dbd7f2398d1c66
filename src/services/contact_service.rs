use crate::{
    database::{MongoDB, CONTACTS},
    models::{Contact, ContactResponse, RequestCallRequest},
    utils::{
        error::AppError,
        validation::{is_ten_digit_phone, non_blank, parse_object_id},
    },
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::FindOptions;

pub fn validate(request: &RequestCallRequest) -> Result<Contact, AppError> {
    let missing = || AppError::InvalidRequest("All fields are required".to_string());
    let name = non_blank(request.name.as_deref()).ok_or_else(missing)?;
    let phone = non_blank(request.phone.as_deref()).ok_or_else(missing)?;

    if !is_ten_digit_phone(&phone) {
        return Err(AppError::InvalidRequest(
            "Phone number must be exactly 10 digits".to_string(),
        ));
    }

    Ok(Contact {
        id: None,
        name,
        phone,
        created_at: Some(BsonDateTime::now()),
    })
}

pub async fn request_call(db: &MongoDB, request: &RequestCallRequest) -> Result<(), AppError> {
    let contact = validate(request)?;
    db.collection::<Contact>(CONTACTS).insert_one(&contact).await?;
    log::info!("📞 Call-back requested by {}", contact.name);
    Ok(())
}

pub async fn list(db: &MongoDB) -> Result<Vec<ContactResponse>, AppError> {
    let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();

    let contacts: Vec<Contact> = db
        .collection::<Contact>(CONTACTS)
        .find(doc! {})
        .with_options(options)
        .await?
        .try_collect()
        .await?;

    Ok(contacts.into_iter().map(ContactResponse::from).collect())
}

pub async fn delete(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id, "contact")?;
    let result = db
        .collection::<Contact>(CONTACTS)
        .delete_one(doc! { "_id": object_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Contact not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, phone: &str) -> RequestCallRequest {
        RequestCallRequest {
            name: Some(name.into()),
            phone: Some(phone.into()),
        }
    }

    #[test]
    fn phone_is_trimmed_then_checked() {
        let contact = validate(&request("Riya", " 9876543210 ")).unwrap();
        assert_eq!(contact.phone, "9876543210");
    }

    #[test]
    fn short_phone_is_rejected() {
        assert_eq!(
            validate(&request("Riya", "98765")).unwrap_err(),
            AppError::InvalidRequest("Phone number must be exactly 10 digits".into())
        );
    }

    #[test]
    fn name_is_required() {
        assert_eq!(
            validate(&request("", "9876543210")).unwrap_err(),
            AppError::InvalidRequest("All fields are required".into())
        );
    }
}
