use crate::Result;
use crate::errors::Error;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

// TOML configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Runtime environment record for the browser application.
/// Both fields are always present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    #[serde(default = "default_api_base_path")]
    pub api_base_path: String,
    #[serde(default = "default_react_app_mode")]
    pub react_app_mode: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_v1_str")]
    pub v1_str: String,
}

#[derive(Debug, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,
    #[serde(default = "default_cors_origin_suffixes")]
    pub origin_suffixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_first_superuser")]
    pub first_superuser: String,
    #[serde(default = "default_first_superuser_password")]
    pub first_superuser_password: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: u32,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: String,
}

// Default values
fn default_api_base_path() -> String {
    "http://localhost:8001".to_string()
}
fn default_react_app_mode() -> String {
    "dev".to_string()
}
fn default_api_v1_str() -> String {
    "/api/v1".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8001".to_string(),
    ]
}
fn default_cors_origin_suffixes() -> Vec<String> {
    vec![".netlify.app".to_string(), ".herokuapp.com".to_string()]
}
fn default_database_url() -> String {
    "sqlite://example.db".to_string()
}
fn default_first_superuser() -> String {
    "admin@recipeapi.com".to_string()
}
fn default_first_superuser_password() -> String {
    "supersecret".to_string()
}
fn default_access_token_expire_minutes() -> u32 {
    60 * 24 * 8
}
fn default_jwt_secret() -> String {
    "TEST_SECRET_DO_NOT_USE_IN_PROD".to_string()
}
fn default_algorithm() -> String {
    "HS256".to_string()
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            api_base_path: default_api_base_path(),
            react_app_mode: default_react_app_mode(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            v1_str: default_api_v1_str(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
            origin_suffixes: default_cors_origin_suffixes(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            first_superuser: default_first_superuser(),
            first_superuser_password: default_first_superuser_password(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
            jwt_secret: default_jwt_secret(),
            algorithm: default_algorithm(),
        }
    }
}

static CONFIG: Lazy<Config> = Lazy::new(|| {
    load_config().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config files: {}. Using defaults.",
            e
        );
        Config::default()
    })
});

static CONFIG_STORE: Lazy<Arc<Mutex<HashMap<String, String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

pub fn get(name: &str) -> Result<String> {
    // Priority 1: CONFIG_STORE (runtime overrides)
    if let Some(value) = get_from_store(name) {
        if value.is_empty() {
            return Err(Error::EmptyConfigValue(name.to_string()));
        }
        return Ok(value);
    }

    // Priority 2: Environment variables (an empty value counts as unset)
    if let Ok(val) = std::env::var(name)
        && !val.is_empty()
    {
        return Ok(val);
    }

    // Priority 3: TOML config
    let settings = config();
    let toml_value = match name {
        "REACT_APP_API_BASE_PATH" => Some(settings.frontend.api_base_path.clone()),
        "REACT_APP_MODE" => Some(settings.frontend.react_app_mode.clone()),
        "API_V1_STR" => Some(settings.api.v1_str.clone()),
        "BACKEND_CORS_ORIGINS" => Some(settings.cors.origins.join(",")),
        "BACKEND_CORS_ORIGIN_SUFFIXES" => Some(settings.cors.origin_suffixes.join(",")),
        "SQLALCHEMY_DATABASE_URI" => Some(settings.database.url.clone()),
        "FIRST_SUPERUSER" => Some(settings.auth.first_superuser.clone()),
        "FIRST_SUPERUSER_PW" => Some(settings.auth.first_superuser_password.clone()),
        "ACCESS_TOKEN_EXPIRE_MINUTES" => {
            Some(settings.auth.access_token_expire_minutes.to_string())
        }
        "JWT_SECRET" => Some(settings.auth.jwt_secret.clone()),
        "ALGORITHM" => Some(settings.auth.algorithm.clone()),
        "LOG_FORMAT" => {
            if !settings.logging.format.is_empty() {
                Some(settings.logging.format.clone())
            } else {
                None
            }
        }
        _ => None,
    };

    if let Some(value) = toml_value
        && !value.is_empty()
    {
        return Ok(value);
    }

    Err(Error::UnknownConfigKey(name.to_string()))
}

#[allow(dead_code)] // This function is not used in the code, but it is needed for tests
pub fn set(name: &str, value: &str) {
    if let Ok(mut store) = CONFIG_STORE.lock() {
        store.insert(name.to_string(), value.to_string());
    }
}

fn get_from_store(name: &str) -> Option<String> {
    if let Ok(store) = CONFIG_STORE.lock() {
        store.get(name).cloned()
    } else {
        None
    }
}

/// Resolve the frontend record. A variable that is unset or empty in
/// every source falls back to the literal default.
pub fn frontend() -> FrontendConfig {
    FrontendConfig {
        api_base_path: get("REACT_APP_API_BASE_PATH").unwrap_or_else(|_| default_api_base_path()),
        react_app_mode: get("REACT_APP_MODE").unwrap_or_else(|_| default_react_app_mode()),
    }
}

pub fn api_v1_str() -> String {
    get("API_V1_STR").unwrap_or_else(|_| default_api_v1_str())
}

/// BACKEND_CORS_ORIGINS is a comma-separated list of origins,
/// e.g. "http://localhost:3000,http://localhost:8001".
pub fn cors_origins() -> Vec<String> {
    get("BACKEND_CORS_ORIGINS")
        .map(|value| split_list(&value))
        .unwrap_or_else(|_| default_cors_origins())
}

pub fn cors_origin_suffixes() -> Vec<String> {
    get("BACKEND_CORS_ORIGIN_SUFFIXES")
        .map(|value| split_list(&value))
        .unwrap_or_else(|_| default_cors_origin_suffixes())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Load configuration from TOML files with priority:
/// 1. config/config.local.toml (git-ignored, for local overrides)
/// 2. config/config.toml (git-managed template)
/// 3. Default values
fn load_config() -> Result<Config> {
    let mut config = Config::default();

    // Load base config from config.toml
    let base_path = "config/config.toml";
    if Path::new(base_path).exists() {
        let content = fs::read_to_string(base_path)?;
        config = toml::from_str(&content)?;
    }

    // Override with local config if exists
    let local_path = "config/config.local.toml";
    if Path::new(local_path).exists() {
        let content = fs::read_to_string(local_path)?;
        let local_config: Config = toml::from_str(&content)?;
        merge_config(&mut config, local_config);
    }

    Ok(config)
}

/// Merge local config into base config (local values override base values)
fn merge_config(base: &mut Config, local: Config) {
    // Frontend
    if local.frontend.api_base_path != default_api_base_path() {
        base.frontend.api_base_path = local.frontend.api_base_path;
    }
    if local.frontend.react_app_mode != default_react_app_mode() {
        base.frontend.react_app_mode = local.frontend.react_app_mode;
    }

    // Api
    if local.api.v1_str != default_api_v1_str() {
        base.api.v1_str = local.api.v1_str;
    }

    // Cors
    if local.cors.origins != default_cors_origins() {
        base.cors.origins = local.cors.origins;
    }
    if local.cors.origin_suffixes != default_cors_origin_suffixes() {
        base.cors.origin_suffixes = local.cors.origin_suffixes;
    }

    // Database
    if local.database.url != default_database_url() {
        base.database.url = local.database.url;
    }

    // Auth
    if local.auth.first_superuser != default_first_superuser() {
        base.auth.first_superuser = local.auth.first_superuser;
    }
    if local.auth.first_superuser_password != default_first_superuser_password() {
        base.auth.first_superuser_password = local.auth.first_superuser_password;
    }
    if local.auth.access_token_expire_minutes != default_access_token_expire_minutes() {
        base.auth.access_token_expire_minutes = local.auth.access_token_expire_minutes;
    }
    if local.auth.jwt_secret != default_jwt_secret() {
        base.auth.jwt_secret = local.auth.jwt_secret;
    }
    if local.auth.algorithm != default_algorithm() {
        base.auth.algorithm = local.auth.algorithm;
    }

    // Logging
    if !local.logging.format.is_empty() {
        base.logging.format = local.logging.format;
    }
}

/// Get TOML-based configuration
pub fn config() -> &'static Config {
    &CONFIG
}
