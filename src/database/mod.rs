use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const CATEGORIES: &str = "categories";
pub const JOBS: &str = "jobs";
pub const CONTACTS: &str = "contacts";
pub const NEWS: &str = "news";

const DEFAULT_DB_NAME: &str = "edu2medu";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("edu2medu-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&database_name_from_uri(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the listing and login queries rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::{doc, Document};
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // Unique email fails on legacy duplicates; the service still runs without it
        match self.collection::<Document>(USERS).create_index(unique_email).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  Could not create users(email) unique index: {}", e),
        }

        let plain_indexes: [(&str, Document); 6] = [
            (USERS, doc! { "userType": 1, "status": 1 }),
            (USERS, doc! { "phone": 1 }),
            (CATEGORIES, doc! { "userType": 1 }),
            (JOBS, doc! { "createdAt": -1 }),
            (CONTACTS, doc! { "createdAt": -1 }),
            (NEWS, doc! { "createdAt": -1 }),
        ];

        for (collection, keys) in plain_indexes {
            let label = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let index = IndexModel::builder().keys(keys).build();
            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}", label),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Round trip to the server, used by /health
    pub async fn ping(&self) -> bool {
        self.db
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await
            .is_ok()
    }
}

/// Database name from the URI path, e.g. `mongodb+srv://host/edu2medu?retryWrites=true`
pub fn database_name_from_uri(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
        .to_string()
}

#[cfg(test)]
impl MongoDB {
    /// Client that never contacts the server until a query runs
    pub async fn unconnected() -> Self {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/edu2medu_test?serverSelectionTimeoutMS=200")
            .await
            .expect("static test URI parses");
        Self { db: client.database("edu2medu_test") }
    }

    /// Live test database from DATABASE_URL, for `#[ignore]` tests
    pub async fn for_tests() -> Self {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/edu2medu_test".into());
        MongoDB::new(&uri).await.expect("MongoDB must be running for ignored tests")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_comes_from_uri_path() {
        assert_eq!(
            database_name_from_uri("mongodb+srv://u:p@cluster0.mongodb.net/edu2medu_prod?retryWrites=true"),
            "edu2medu_prod"
        );
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/school"), "school");
    }

    #[test]
    fn database_name_defaults_when_missing() {
        assert_eq!(database_name_from_uri("mongodb://localhost:27017"), "edu2medu");
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/?w=majority"), "edu2medu");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn connects_and_creates_indexes() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").unwrap_or_else(|_| "mongodb://localhost:27017/edu2medu_test".into());
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await);
    }
}
