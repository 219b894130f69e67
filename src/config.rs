//! Configuration module

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::models::Module;

/// How the platform presents provider credentials to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Basic base64(access_key:secret_key)`
    Basic,
    /// `Bearer <jwt>` signed with the relay secret
    Bearer,
}

impl FromStr for AuthScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(AuthScheme::Basic),
            "bearer" => Ok(AuthScheme::Bearer),
            other => Err(anyhow!("unknown auth scheme '{}'", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Emit JSON log lines instead of the human format
    pub log_json: bool,

    /// Search endpoint; `{module}` is replaced with the module code
    pub search_url: String,

    /// Endpoint used to validate credentials
    pub auth_url: String,

    /// Outbound request timeout
    pub timeout_seconds: u64,

    /// Observable types the relay accepts, lower-case
    pub observable_types: Vec<String>,

    /// Provider sub-modules
    pub modules: Vec<Module>,

    /// Inbound credential scheme
    pub auth_scheme: AuthScheme,

    /// Secret for bearer credential tokens
    pub jwt_secret: Option<String>,

    /// Link returned by the refer endpoint
    pub refer_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            log_json: false,
            search_url: "https://api.stealthmole.com/v2/{module}/search".to_string(),
            auth_url: "https://api.stealthmole.com/v2/user/quotas".to_string(),
            timeout_seconds: 30,
            observable_types: ["email", "domain", "ip", "url"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            modules: Module::defaults(),
            auth_scheme: AuthScheme::Basic,
            jwt_secret: None,
            refer_url: "https://platform.stealthmole.com/".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let modules = match env::var("RELAY_MODULES_FILE") {
            Ok(path) => load_modules(&path)?,
            Err(_) => defaults.modules,
        };

        let auth_scheme = match env::var("RELAY_AUTH_SCHEME") {
            Ok(scheme) => scheme.parse()?,
            Err(_) => defaults.auth_scheme,
        };

        let jwt_secret = env::var("RELAY_JWT_SECRET").ok().filter(|s| !s.is_empty());
        if auth_scheme == AuthScheme::Bearer && jwt_secret.is_none() {
            return Err(anyhow!("RELAY_JWT_SECRET is required when RELAY_AUTH_SCHEME=bearer"));
        }

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),

            search_url: env::var("PROVIDER_SEARCH_URL")
                .unwrap_or(defaults.search_url),

            auth_url: env::var("PROVIDER_AUTH_URL")
                .unwrap_or(defaults.auth_url),

            timeout_seconds: env::var("PROVIDER_TIMEOUT_SECONDS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.timeout_seconds),

            observable_types: env::var("RELAY_OBSERVABLE_TYPES")
                .map(|types| parse_list(&types))
                .unwrap_or(defaults.observable_types),

            modules,
            auth_scheme,
            jwt_secret,

            refer_url: env::var("REFER_URL")
                .unwrap_or(defaults.refer_url),
        })
    }

    /// Crate version reported by `/version`
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Modules able to answer for an observable type, in configuration order
    pub fn modules_for<'a>(&'a self, observable_type: &'a str) -> impl Iterator<Item = &'a Module> + 'a {
        self.modules.iter().filter(move |m| m.supports(observable_type))
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn load_modules(path: &str) -> anyhow::Result<Vec<Module>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading modules file {}", path))?;
    parse_modules(&raw).with_context(|| format!("parsing modules file {}", path))
}

fn parse_modules(raw: &str) -> anyhow::Result<Vec<Module>> {
    let mut modules: Vec<Module> = serde_json::from_str(raw)?;
    if modules.is_empty() {
        return Err(anyhow!("at least one module must be configured"));
    }
    for module in &mut modules {
        module.code = module.code.to_lowercase();
        module.observable_types = module
            .observable_types
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
    }
    Ok(modules)
}
