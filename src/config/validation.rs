//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check backend and base URLs
//! - Compile route patterns and detect duplicates
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{Backend, GatewayConfig};
use crate::routing::{PatternError, RouteTable};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid URL ({reason})")]
    InvalidUrl {
        field: String,
        value: String,
        reason: String,
    },
    #[error("{field}: scheme '{scheme}' is not supported, use http")]
    UnsupportedScheme { field: String, scheme: String },
    #[error("{field}: URL has no host")]
    MissingHost { field: String },
    #[error("routes: {0}")]
    Route(#[from] PatternError),
    #[error("routes: no rules configured")]
    NoRoutes,
    #[error("listener.bind_address: '{0}' is not host:port")]
    BindAddress(String),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("credentials.token_env must not be empty")]
    EmptyTokenEnv,
}

/// Validate every section and collect all problems.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for backend in [Backend::Web, Backend::Api, Backend::Auth] {
        let field = format!("targets.{}", backend);
        if let Err(e) = parse_target(&field, config.targets.get(backend)) {
            errors.push(e);
        }
    }

    if let Some(base_url) = &config.base_url {
        if let Err(e) = parse_base_url(base_url) {
            errors.push(e);
        }
    }

    let routes = config.effective_routes();
    if routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    let mut table = RouteTable::new();
    for route in &routes {
        if let Err(e) = table.register(&route.pattern, route.backend) {
            errors.push(e.into());
        }
    }

    let bind_address = config.bind_address();
    let valid_bind = bind_address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !valid_bind {
        errors.push(ValidationError::BindAddress(bind_address));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }

    if config.credentials.token_env.trim().is_empty() {
        errors.push(ValidationError::EmptyTokenEnv);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a backend base URL. Only plain http upstreams are supported.
pub fn parse_target(field: &str, value: &str) -> Result<Url, ValidationError> {
    let url = parse_url(field, value)?;
    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            field: field.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    Ok(url)
}

/// Parse the external base URL and return the host[:port] used for Host rewriting.
pub fn parse_base_url(value: &str) -> Result<String, ValidationError> {
    let url = parse_url("base_url", value)?;
    Ok(url[url::Position::BeforeHost..url::Position::AfterPort].to_string())
}

fn parse_url(field: &str, value: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(value).map_err(|e| ValidationError::InvalidUrl {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            field: field.to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.targets.web = "not a url".into();
        config.targets.auth = "https://auth.internal/".into();
        config.base_url = Some("http://".into());
        config.timeouts.upstream_secs = 0;
        config.routes = Some(vec![
            RouteConfig::new("/", Backend::Web),
            RouteConfig::new("/*", Backend::Api),
        ]);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{:?}", errors);
        assert!(matches!(errors[0], ValidationError::InvalidUrl { .. }));
        assert!(matches!(errors[1], ValidationError::UnsupportedScheme { .. }));
        assert!(errors.contains(&ValidationError::Route(PatternError::Duplicate("/".into()))));
        assert!(errors.contains(&ValidationError::ZeroTimeout("upstream_secs")));
    }

    #[test]
    fn test_empty_route_list() {
        let config = GatewayConfig {
            routes: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoRoutes]));
    }

    #[test]
    fn test_bind_address() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = Some("localhost:9090".into());
        assert!(validate_config(&config).is_ok());

        config.listener.bind_address = Some("9090".into());
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::BindAddress("9090".into())])
        );
    }

    #[test]
    fn test_base_url_host() {
        assert_eq!(parse_base_url("http://gateway.example/").unwrap(), "gateway.example");
        assert_eq!(parse_base_url("http://localhost:9090/").unwrap(), "localhost:9090");
        assert_eq!(parse_base_url("https://gateway.example:443/x").unwrap(), "gateway.example");
        assert!(parse_base_url("gateway.example").is_err());
    }
}
