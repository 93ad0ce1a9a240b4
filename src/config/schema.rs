//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Well-known service-account token mount.
pub const DEFAULT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Environment variable that overrides the mounted token.
pub const DEFAULT_TOKEN_ENV: &str = "TOKEN";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment profile; selects the default port and rule set.
    pub profile: Profile,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Base URLs of the three backends.
    pub targets: TargetConfig,

    /// External base URL. When set, its host replaces the inbound Host header.
    pub base_url: Option<String>,

    /// Explicit rule set. `None` uses the profile's rules.
    pub routes: Option<Vec<RouteConfig>>,

    /// Bearer token sources.
    pub credentials: CredentialConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl GatewayConfig {
    /// Configured bind address, or the profile's default port on all interfaces.
    pub fn bind_address(&self) -> String {
        self.listener
            .bind_address
            .clone()
            .unwrap_or_else(|| format!("0.0.0.0:{}", self.profile.default_port()))
    }

    /// Rules in registration order.
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        match &self.routes {
            Some(routes) => routes.clone(),
            None => self.profile.default_routes(),
        }
    }
}

/// Deployment variants of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Three-backend table on port 8080.
    Basic,
    /// Three-backend table plus `/metrics` on port 9090.
    #[default]
    Metrics,
}

impl Profile {
    pub fn default_port(self) -> u16 {
        match self {
            Profile::Basic => 8080,
            Profile::Metrics => 9090,
        }
    }

    pub fn default_routes(self) -> Vec<RouteConfig> {
        let mut routes = vec![
            RouteConfig::new("/", Backend::Web),
            RouteConfig::new("/api", Backend::Api),
            RouteConfig::new("/api/", Backend::Api),
            RouteConfig::new("/api/v1/me", Backend::Auth),
            RouteConfig::new("/api/v1/login", Backend::Auth),
            RouteConfig::new("/api/v1/csrftoken/", Backend::Auth),
        ];
        if self == Profile::Metrics {
            routes.push(RouteConfig::new("/metrics", Backend::Api));
        }
        routes
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Profile::Basic),
            "metrics" => Ok(Profile::Metrics),
            other => Err(format!("unknown profile '{}'", other)),
        }
    }
}

/// The fixed set of upstream services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Web,
    Api,
    Auth,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Web => "web",
            Backend::Api => "api",
            Backend::Auth => "auth",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9090").
    pub bind_address: Option<String>,
}

/// Backend base URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub web: String,
    pub api: String,
    pub auth: String,
}

impl TargetConfig {
    pub fn get(&self, backend: Backend) -> &str {
        match backend {
            Backend::Web => &self.web,
            Backend::Api => &self.api,
            Backend::Auth => &self.auth,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            web: "http://127.0.0.1:8081/".to_string(),
            api: "http://127.0.0.1:8082/".to_string(),
            auth: "http://127.0.0.1:8083/".to_string(),
        }
    }
}

/// A single path rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact path (`/api`), subtree (`/api/`, `/api/*`) or catch-all (`/`).
    pub pattern: String,

    /// Backend to forward to.
    pub backend: Backend,
}

impl RouteConfig {
    pub fn new(pattern: impl Into<String>, backend: Backend) -> Self {
        Self {
            pattern: pattern.into(),
            backend,
        }
    }
}

/// Where the outbound bearer token comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Mounted token file, read on every request.
    pub token_path: PathBuf,

    /// Environment variable that overrides the file when non-empty.
    pub token_env: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream to produce response headers, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.profile, Profile::Metrics);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert!(config
            .effective_routes()
            .contains(&RouteConfig::new("/metrics", Backend::Api)));

        let basic = GatewayConfig {
            profile: Profile::Basic,
            ..Default::default()
        };
        assert_eq!(basic.bind_address(), "0.0.0.0:8080");
        assert!(basic
            .effective_routes()
            .iter()
            .all(|r| r.pattern != "/metrics"));
    }

    #[test]
    fn test_explicit_routes_replace_profile() {
        let config = GatewayConfig {
            routes: Some(vec![RouteConfig::new("/only", Backend::Auth)]),
            ..Default::default()
        };
        assert_eq!(config.effective_routes().len(), 1);
    }

    #[test]
    fn test_deserialize_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            profile = "basic"
            base_url = "http://gateway.example/"

            [targets]
            api = "http://api.internal:8000/"

            [[routes]]
            pattern = "/"
            backend = "web"

            [[routes]]
            pattern = "/api/*"
            backend = "api"
            "#,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Basic);
        assert_eq!(config.targets.api, "http://api.internal:8000/");
        assert_eq!(config.targets.web, "http://127.0.0.1:8081/");
        assert_eq!(config.effective_routes()[1].backend, Backend::Api);
        assert_eq!(config.timeouts.upstream_secs, 30);
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("Basic".parse::<Profile>().unwrap(), Profile::Basic);
        assert_eq!(" metrics ".parse::<Profile>().unwrap(), Profile::Metrics);
        assert!("edge".parse::<Profile>().is_err());
    }
}
