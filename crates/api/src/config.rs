use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::{
    AuthConfig, DEFAULT_JWKS_CACHE_MAX_AGE_SECS, DEFAULT_JWKS_REQUESTS_PER_MINUTE,
};

/// Default production client origin.
pub const DEFAULT_PRODUCTION_ORIGIN: &str = "https://dt-catalyst.herokuapp.com";

/// Default development client origin (the front-end dev server).
pub const DEFAULT_DEVELOPMENT_ORIGIN: &str = "http://localhost:3000";

/// Deployment mode; selects which client origin CORS admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the identity-provider settings have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Production or development mode.
    pub environment: AppEnvironment,
    /// The single client origin CORS admits, chosen by `environment`.
    ///
    /// This is the browser app's origin, not the API's own address, so in
    /// development it differs from `port`.
    pub cors_origin: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Identity-provider settings.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                                   | Default                              |
    /// |-------------------------------------------|--------------------------------------|
    /// | `HOST`                                    | `0.0.0.0`                            |
    /// | `PORT`                                    | `5000`                               |
    /// | `APP_ENV` / `NODE_ENV`                    | `development`                        |
    /// | `CORS_ORIGIN_PRODUCTION`                  | `https://dt-catalyst.herokuapp.com`  |
    /// | `CORS_ORIGIN_DEVELOPMENT`                 | `http://localhost:3000`              |
    /// | `REQUEST_TIMEOUT_SECS`                    | `30`                                 |
    /// | `AUTH0_DOMAIN`                            | **required**                         |
    /// | `API_AUDIENCE` / `API_AUDIENCE_ATTRIBUTE` | **required**                         |
    /// | `JWKS_REQUESTS_PER_MINUTE`                | `5`                                  |
    /// | `JWKS_CACHE_MAX_AGE_SECS`                 | `600`                                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", get("PORT"), 5000u16)?;

        let environment = get("APP_ENV")
            .or_else(|| get("NODE_ENV"))
            .map(|v| AppEnvironment::parse(&v))
            .unwrap_or(AppEnvironment::Development);

        let cors_origin = match environment {
            AppEnvironment::Production => {
                get("CORS_ORIGIN_PRODUCTION").unwrap_or_else(|| DEFAULT_PRODUCTION_ORIGIN.into())
            }
            AppEnvironment::Development => get("CORS_ORIGIN_DEVELOPMENT")
                .unwrap_or_else(|| DEFAULT_DEVELOPMENT_ORIGIN.into()),
        };

        let request_timeout_secs =
            parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30u64)?;

        let domain = get("AUTH0_DOMAIN").ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        let audience = get("API_AUDIENCE")
            .or_else(|| get("API_AUDIENCE_ATTRIBUTE"))
            .ok_or(ConfigError::Missing("API_AUDIENCE"))?;
        let jwks_requests_per_minute = parse_or(
            "JWKS_REQUESTS_PER_MINUTE",
            get("JWKS_REQUESTS_PER_MINUTE"),
            DEFAULT_JWKS_REQUESTS_PER_MINUTE,
        )?;
        let jwks_cache_max_age_secs = parse_or(
            "JWKS_CACHE_MAX_AGE_SECS",
            get("JWKS_CACHE_MAX_AGE_SECS"),
            DEFAULT_JWKS_CACHE_MAX_AGE_SECS,
        )?;

        Ok(Self {
            host,
            port,
            environment,
            cors_origin,
            request_timeout_secs,
            auth: AuthConfig {
                domain: domain.trim_end_matches('/').to_string(),
                audience,
                jwks_requests_per_minute,
                jwks_cache_max_age: Duration::from_secs(jwks_cache_max_age_secs),
            },
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    const AUTH: [(&str, &str); 2] = [
        ("AUTH0_DOMAIN", "tenant.auth0.com"),
        ("API_AUDIENCE", "https://api.example"),
    ];

    #[test]
    fn defaults_apply_in_development() {
        let config = load(&AUTH).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.cors_origin, DEFAULT_DEVELOPMENT_ORIGIN);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.auth.jwks_requests_per_minute, 5);
        assert_eq!(config.auth.jwks_cache_max_age, Duration::from_secs(600));
    }

    #[test]
    fn production_mode_selects_production_origin() {
        let mut vars = AUTH.to_vec();
        vars.push(("NODE_ENV", "production"));
        let config = load(&vars).unwrap();
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.cors_origin, DEFAULT_PRODUCTION_ORIGIN);
    }

    #[test]
    fn app_env_takes_precedence_over_node_env() {
        let mut vars = AUTH.to_vec();
        vars.push(("APP_ENV", "development"));
        vars.push(("NODE_ENV", "production"));
        assert_eq!(load(&vars).unwrap().environment, AppEnvironment::Development);
    }

    #[test]
    fn origin_overrides_are_honoured() {
        let mut vars = AUTH.to_vec();
        vars.push(("CORS_ORIGIN_DEVELOPMENT", "http://localhost:5173"));
        assert_eq!(load(&vars).unwrap().cors_origin, "http://localhost:5173");
    }

    #[test]
    fn legacy_audience_variable_is_accepted() {
        let config = load(&[
            ("AUTH0_DOMAIN", "tenant.auth0.com/"),
            ("API_AUDIENCE_ATTRIBUTE", "https://legacy"),
        ])
        .unwrap();
        assert_eq!(config.auth.audience, "https://legacy");
        assert_eq!(config.auth.domain, "tenant.auth0.com");
    }

    #[test]
    fn missing_domain_is_an_error() {
        let err = load(&[("API_AUDIENCE", "x")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing("AUTH0_DOMAIN"));
    }

    #[test]
    fn missing_audience_is_an_error() {
        let err = load(&[("AUTH0_DOMAIN", "x")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing("API_AUDIENCE"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut vars = AUTH.to_vec();
        vars.push(("PORT", "not-a-port"));
        let err = load(&vars).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { key: "PORT", .. });
    }
}
