use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,       // teaser shown in the list
    pub more_content: String,  // full article body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub more_content: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub more_content: String,
    pub image: Option<String>,
    pub created_at: Option<String>,
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        NewsResponse {
            id: news.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: news.title,
            content: news.content,
            more_content: news.more_content,
            image: news.image,
            created_at: news.created_at.and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}
