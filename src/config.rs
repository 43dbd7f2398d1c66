use std::env;
use std::time::Duration;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://edu2medu-frontend.vercel.app",
    "https://edu2medu-backend.onrender.com",
    "https://www.edu2medu.com",
    "https://edu2medu.com",
];

/// JWT settings shared by login, the auth middleware and password reset
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
    pub reset_ttl_minutes: i64,
}

/// Runtime configuration, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub frontend_url: String,
    pub public_base_url: Option<String>,
    pub jwt: JwtConfig,
    pub cache_ttl: Duration,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = first_var(&["PORT", "APP_PORT"])
            .map(|p| p.parse::<u16>().map_err(|e| format!("Invalid PORT '{}': {}", p, e)))
            .transpose()?
            .unwrap_or(8002);

        let database_url = first_var(&["DATABASE_URL", "MONGO_URI"])
            .ok_or("DATABASE_URL (or MONGO_URI) must be set")?;

        let jwt_secret = first_var(&["JWT_SECRET", "SECRET_KEY"])
            .ok_or("JWT_SECRET (or SECRET_KEY) must be set")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            host,
            port,
            database_url,
            allowed_origins,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "https://edu2medu.com".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "edu2medu".to_string()),
                audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "edu2medu-api".to_string()),
                ttl_hours: parse_or("JWT_TTL_HOURS", 24)?,
                reset_ttl_minutes: parse_or("RESET_TOKEN_TTL_MINUTES", 60)?,
            },
            cache_ttl: Duration::from_secs(parse_or("CACHE_TTL_SECS", 300)?),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

fn parse_or<T>(name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Invalid {} '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8002,
            database_url: "mongodb://localhost:27017/edu2medu_test".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            frontend_url: "http://localhost:5173".to_string(),
            public_base_url: None,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                issuer: "edu2medu".to_string(),
                audience: "edu2medu-api".to_string(),
                ttl_hours: 24,
                reset_ttl_minutes: 60,
            },
            cache_ttl: Duration::from_secs(300),
            admin_email: None,
            admin_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        let origins = parse_origins(" https://edu2medu.com/ ,,http://localhost:5173 ");
        assert_eq!(origins, vec!["https://edu2medu.com", "http://localhost:5173"]);
    }

    #[test]
    fn default_origins_cover_production_and_local_dev() {
        assert!(DEFAULT_ALLOWED_ORIGINS.contains(&"https://edu2medu.com"));
        assert!(DEFAULT_ALLOWED_ORIGINS.contains(&"http://localhost:5173"));
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u64 = parse_or("EDU2MEDU_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
