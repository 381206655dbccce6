//! Authentication for the Somara API
//!
//! Users sign in with a hosted auth provider; this module only verifies the
//! HS256 access tokens it issues and exposes the caller to handlers as
//! [`UserInfo`].

use std::env;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::spotify::REFRESH_TOKEN_HEADER;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod token;

pub use token::SecurityError;

/// Default audience of the provider's user tokens
pub const DEFAULT_AUDIENCE: &str = "authenticated";
/// User id assigned to requests when verification is bypassed
pub const BYPASS_USER_ID: &str = "dev-user";

/// How bearer tokens are verified
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub audience: String,
    pub issuer: Option<String>,
    /// Skip verification entirely. Only honoured in debug builds.
    pub bypass: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("AUTH_JWT_SECRET").ok().filter(|s| !s.is_empty());
        if jwt_secret.is_none() {
            warn!("AUTH_JWT_SECRET not set - authenticated routes will reject every request");
        }

        let bypass = cfg!(debug_assertions) && env::var("BYPASS_AUTH").is_ok();
        if bypass {
            warn!("BYPASS_AUTH is set - bearer tokens are not verified");
        }

        Self {
            jwt_secret,
            audience: env::var("AUTH_JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_AUDIENCE.to_string()),
            issuer: env::var("AUTH_JWT_ISSUER").ok().filter(|s| !s.is_empty()),
            bypass,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.jwt_secret.is_none() && !self.bypass {
            errors.push("AUTH_JWT_SECRET is not configured".to_string());
        }
        if let Some(issuer) = &self.issuer {
            if let Err(e) = url::Url::parse(issuer) {
                errors.push(format!("AUTH_JWT_ISSUER is not a valid URL: {}", e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Claims of an auth provider access token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserInfo {
    pub user_id: String,
    pub email: Option<String>,
    /// `jwt` or `bypass`
    pub auth_source: String,
}

impl From<&Claims> for UserInfo {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            auth_source: "jwt".to_string(),
        }
    }
}

/// Token from an `Authorization: Bearer` header, if there is one
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}

/// Authentication middleware for the `/api/v1` routes
pub async fn auth_middleware(
    State(config): State<Arc<AuthConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();

    if config.bypass && cfg!(debug_assertions) {
        debug!("Auth bypass enabled in development mode");
        req.extensions_mut().insert(UserInfo {
            user_id: BYPASS_USER_ID.to_string(),
            email: None,
            auth_source: "bypass".to_string(),
        });
        return next.run(req).await;
    }

    let start_time = std::time::Instant::now();
    let failure = |details: String| {
        AuthEvent::new(AuthEventType::TokenValidation, None, false)
            .with_details(details)
            .with_resource(request_path.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt")
    };

    let Some(token) = bearer_token(req.headers()) else {
        log_auth_event(failure("Missing or malformed Authorization header".to_string()));
        return unauthorized("Missing bearer token");
    };

    match token::validate_token(token, &config) {
        Ok(claims) => {
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                    .with_resource(request_path.clone())
                    .with_duration(start_time.elapsed().as_millis() as u64)
                    .with_auth_method("jwt"),
            );

            req.extensions_mut().insert(UserInfo::from(&claims));
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(SecurityError::TokenExpired) => {
            log_auth_event(failure("JWT token has expired".to_string()));
            unauthorized("Token has expired")
        }
        Err(e) => {
            log_auth_event(failure(e.to_string()));
            unauthorized("Invalid token")
        }
    }
}

/// Add CORS and the security response headers to the application
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use axum::http::{HeaderName, HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REFRESH_TOKEN_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=(), interest-cohort=()"),
        ));

    app.layer(cors).layer(security_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn test_config_validation() {
        let config = AuthConfig {
            jwt_secret: None,
            audience: DEFAULT_AUDIENCE.to_string(),
            issuer: Some("not a url".to_string()),
            bypass: false,
        };
        assert_eq!(config.validate().unwrap_err().len(), 2);

        let bypassed = AuthConfig {
            bypass: true,
            issuer: None,
            ..config
        };
        assert!(bypassed.validate().is_ok());
    }
}
