use crate::{
    database::{MongoDB, JOBS},
    models::{Job, JobRequest, JobResponse},
    services::auth_service::Claims,
    utils::{
        cache::{ListingCache, KEY_JOBS},
        error::AppError,
        validation::{non_blank, parse_object_id},
    },
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde_json::Value;

const JOB_LIMIT: i64 = 100;

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

pub fn validate_new(request: &JobRequest, posted_by: &str) -> Result<Job, AppError> {
    let fields = request.fields();
    if fields.iter().any(|(_, value)| non_blank(*value).is_none()) {
        return Err(AppError::InvalidRequest("All fields are required".to_string()));
    }

    let value = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
    let now = BsonDateTime::now();

    Ok(Job {
        id: None,
        job_title: value(&request.job_title),
        company_name: value(&request.company_name),
        location: value(&request.location),
        job_type: value(&request.job_type),
        salary: value(&request.salary),
        job_description: value(&request.job_description),
        job_requirements: value(&request.job_requirements),
        application_deadline: value(&request.application_deadline),
        how_to_apply: value(&request.how_to_apply),
        posted_by: Some(posted_by.to_string()),
        created_at: Some(now),
        updated_at: Some(now),
    })
}

/// Only the fields present and non-blank in the request
pub fn update_set(request: &JobRequest) -> Document {
    let mut set = Document::new();
    for (field, value) in request.fields() {
        if let Some(value) = non_blank(value) {
            set.insert(field, value);
        }
    }
    set
}

pub async fn create(
    db: &MongoDB,
    cache: &ListingCache,
    claims: &Claims,
    request: &JobRequest,
) -> Result<JobResponse, AppError> {
    let mut job = validate_new(request, &claims.email)?;

    let result = db.collection::<Job>(JOBS).insert_one(&job).await?;
    job.id = result.inserted_id.as_object_id();

    cache.clear(Some(KEY_JOBS));
    log::info!("✅ Job created: {} by {}", job.job_title, claims.email);

    Ok(JobResponse::from(job))
}

async fn load_jobs(db: MongoDB) -> Result<Value, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .limit(JOB_LIMIT)
        .build();

    let jobs: Vec<Job> = db
        .collection::<Job>(JOBS)
        .find(doc! {})
        .with_options(options)
        .await?
        .try_collect()
        .await?;

    let jobs: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
    Ok(serde_json::to_value(jobs)?)
}

pub async fn list(db: &MongoDB, cache: &ListingCache) -> Result<Vec<JobResponse>, AppError> {
    let value = cache.get_or_load(KEY_JOBS, load_jobs(db.clone())).await?;
    Ok(serde_json::from_value(value)?)
}

async fn find(db: &MongoDB, object_id: ObjectId) -> Result<Job, AppError> {
    db.collection::<Job>(JOBS)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or_else(job_not_found)
}

pub async fn get(db: &MongoDB, id: &str) -> Result<JobResponse, AppError> {
    let object_id = parse_object_id(id, "job")?;
    find(db, object_id).await.map(JobResponse::from)
}

/// Poster or admin; jobs without a recorded poster are admin-only
fn ensure_can_modify(job: &Job, claims: &Claims) -> Result<(), AppError> {
    if claims.is_admin() || job.posted_by.as_deref() == Some(claims.email.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You can only modify jobs you posted".to_string()))
    }
}

pub async fn update(
    db: &MongoDB,
    cache: &ListingCache,
    claims: &Claims,
    id: &str,
    request: &JobRequest,
) -> Result<JobResponse, AppError> {
    let object_id = parse_object_id(id, "job")?;
    let existing = find(db, object_id).await?;
    ensure_can_modify(&existing, claims)?;

    let mut set = update_set(request);
    if set.is_empty() {
        return Ok(JobResponse::from(existing));
    }
    set.insert("updatedAt", BsonDateTime::now());

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let job = db
        .collection::<Job>(JOBS)
        .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
        .with_options(options)
        .await?
        .ok_or_else(job_not_found)?;

    cache.clear(Some(KEY_JOBS));
    log::info!("✅ Job updated: {}", id);

    Ok(JobResponse::from(job))
}

pub async fn delete(db: &MongoDB, cache: &ListingCache, claims: &Claims, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id, "job")?;
    let existing = find(db, object_id).await?;
    ensure_can_modify(&existing, claims)?;

    let result = db
        .collection::<Job>(JOBS)
        .delete_one(doc! { "_id": object_id })
        .await?;
    if result.deleted_count == 0 {
        return Err(job_not_found());
    }

    cache.clear(Some(KEY_JOBS));
    log::info!("🗑️ Job deleted: {} by {}", id, claims.email);
    Ok(())
}
