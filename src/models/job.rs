use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Job opening (collection "jobs")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub job_type: String,
    pub salary: String,
    pub job_description: String,
    pub job_requirements: String,
    pub application_deadline: String,
    pub how_to_apply: String,
    /// Email of the account that posted it; absent on legacy documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// Body for create and update. Every field is optional on the wire so
/// missing values get the API's own message instead of a serde error.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub job_description: Option<String>,
    pub job_requirements: Option<String>,
    pub application_deadline: Option<String>,
    pub how_to_apply: Option<String>,
}

impl JobRequest {
    /// (stored field name, value) pairs in declaration order
    pub fn fields(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("jobTitle", self.job_title.as_deref()),
            ("companyName", self.company_name.as_deref()),
            ("location", self.location.as_deref()),
            ("jobType", self.job_type.as_deref()),
            ("salary", self.salary.as_deref()),
            ("jobDescription", self.job_description.as_deref()),
            ("jobRequirements", self.job_requirements.as_deref()),
            ("applicationDeadline", self.application_deadline.as_deref()),
            ("howToApply", self.how_to_apply.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub job_type: String,
    pub salary: String,
    pub job_description: String,
    pub job_requirements: String,
    pub application_deadline: String,
    pub how_to_apply: String,
    pub created_at: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        JobResponse {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            job_title: job.job_title,
            company_name: job.company_name,
            location: job.location,
            job_type: job.job_type,
            salary: job.salary,
            job_description: job.job_description,
            job_requirements: job.job_requirements,
            application_deadline: job.application_deadline,
            how_to_apply: job.how_to_apply,
            created_at: job.created_at.and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}
