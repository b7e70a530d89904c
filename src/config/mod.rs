use std::env;

/// Vite dev server origin, matching `.env.example`.
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_access_token_expiry_secs: i64,
    pub jwt_refresh_token_expiry_secs: i64,
    pub frontend_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub extraction_timeout_secs: u64,
    pub max_image_bytes: usize,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. `DATABASE_URL`, `JWT_SECRET` and
    /// `GEMINI_API_KEY` are required; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or(env::VarError::NotPresent);
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: or("DATABASE_MAX_CONNECTIONS", "10").parse().unwrap_or(10),
            host: or("BACKEND_HOST", "0.0.0.0"),
            port: or("BACKEND_PORT", "3000").parse().unwrap_or(3000),
            jwt_secret: required("JWT_SECRET")?,
            jwt_access_token_expiry_secs: or("JWT_ACCESS_TOKEN_EXPIRY_SECS", "900")
                .parse()
                .unwrap_or(900),
            jwt_refresh_token_expiry_secs: or("JWT_REFRESH_TOKEN_EXPIRY_SECS", "604800")
                .parse()
                .unwrap_or(604800),
            frontend_url: or("FRONTEND_URL", DEFAULT_FRONTEND_URL),
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: or("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_base_url: or("GEMINI_BASE_URL", "https://generativelanguage.googleapis.com"),
            extraction_timeout_secs: or("EXTRACTION_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            max_image_bytes: or("MAX_IMAGE_BYTES", "4194304")
                .parse()
                .unwrap_or(4 * 1024 * 1024),
            tls_cert_path: lookup("TLS_CERT_PATH"),
            tls_key_path: lookup("TLS_KEY_PATH"),
        })
    }

    /// Certificate and key paths, when both are configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}
