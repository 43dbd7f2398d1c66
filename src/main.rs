mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{dev::Service, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::{LogMailer, Mailer};
use crate::utils::ListingCache;

const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting Edu2Medu Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url).await.map_err(|e| {
        log::error!("❌ Failed to connect to MongoDB: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    log::info!("✅ MongoDB connected successfully ({})", db.database().name());

    // 🌱 Seed the admin account
    seeds::admin_seed::seed_admin(&db, config.admin_email.as_deref(), config.admin_password.as_deref()).await;

    // 📅 Background jobs
    jobs::payment_expiry::start_payment_expiry_scheduler(db.clone());

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("🗂️ Listing cache TTL: {}s", config.cache_ttl.as_secs());

    let db_data = web::Data::new(db);
    let cache_data = web::Data::new(ListingCache::new(config.cache_ttl));
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
    let mailer_data = web::Data::from(mailer);
    let config_data = web::Data::new(config);

    // Start HTTP server
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);
        for origin in &config_data.allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(cache_data.clone())
            .app_data(mailer_data.clone())
            .app_data(config_data.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_LIMIT_BYTES)
                    .error_handler(utils::error::json_error_handler),
            )
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async move {
                    let res = fut.await;
                    match &res {
                        Ok(response) => api::metrics::record(response.status()),
                        Err(e) => api::metrics::record(e.as_response_error().status_code()),
                    }
                    res
                }
            })
            .wrap(middleware::SecurityHeaders)
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
