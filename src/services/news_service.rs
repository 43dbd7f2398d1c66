use crate::{
    database::{MongoDB, NEWS},
    models::{CreateNewsRequest, News, NewsResponse},
    utils::{
        cache::{ListingCache, KEY_NEWS},
        error::AppError,
        validation::{non_blank, parse_object_id},
    },
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::FindOptions;
use serde_json::Value;

pub fn validate(request: &CreateNewsRequest) -> Result<News, AppError> {
    let missing = || AppError::InvalidRequest("Title, content and moreContent are required".to_string());

    Ok(News {
        id: None,
        title: non_blank(request.title.as_deref()).ok_or_else(missing)?,
        content: non_blank(request.content.as_deref()).ok_or_else(missing)?,
        more_content: non_blank(request.more_content.as_deref()).ok_or_else(missing)?,
        image: non_blank(request.image.as_deref()),
        created_at: Some(BsonDateTime::now()),
    })
}

pub async fn add(db: &MongoDB, cache: &ListingCache, request: &CreateNewsRequest) -> Result<NewsResponse, AppError> {
    let mut news = validate(request)?;
    let result = db.collection::<News>(NEWS).insert_one(&news).await?;
    news.id = result.inserted_id.as_object_id();

    cache.clear(Some(KEY_NEWS));
    log::info!("📰 News added: {}", news.title);
    Ok(NewsResponse::from(news))
}

async fn load_news(db: MongoDB) -> Result<Value, AppError> {
    let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
    let news: Vec<News> = db
        .collection::<News>(NEWS)
        .find(doc! {})
        .with_options(options)
        .await?
        .try_collect()
        .await?;

    let news: Vec<NewsResponse> = news.into_iter().map(NewsResponse::from).collect();
    Ok(serde_json::to_value(news)?)
}

pub async fn list(db: &MongoDB, cache: &ListingCache) -> Result<Vec<NewsResponse>, AppError> {
    let value = cache.get_or_load(KEY_NEWS, load_news(db.clone())).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn delete(db: &MongoDB, cache: &ListingCache, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id, "news")?;
    let result = db
        .collection::<News>(NEWS)
        .delete_one(doc! { "_id": object_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("News not found".to_string()));
    }

    cache.clear(Some(KEY_NEWS));
    Ok(())
}
