use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Kinds of authentication events worth an audit line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Bearer token checked by the middleware
    TokenValidation,
    /// Authorization code exchanged with Spotify
    SpotifyTokenExchange,
    /// Spotify access token refreshed
    SpotifyTokenRefresh,
    /// Spotify account linked to a profile
    SpotifyConnect,
    SpotifyDisconnect,
    /// Spotify redirected back with an error
    SpotifyAuthorizationDenied,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::SpotifyTokenExchange => write!(f, "SPOTIFY_TOKEN_EXCHANGE"),
            AuthEventType::SpotifyTokenRefresh => write!(f, "SPOTIFY_TOKEN_REFRESH"),
            AuthEventType::SpotifyConnect => write!(f, "SPOTIFY_CONNECT"),
            AuthEventType::SpotifyDisconnect => write!(f, "SPOTIFY_DISCONNECT"),
            AuthEventType::SpotifyAuthorizationDenied => write!(f, "SPOTIFY_AUTHORIZATION_DENIED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID (if known)
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path being accessed
    pub resource: Option<String>,
    /// Time taken in milliseconds
    pub duration_ms: Option<u64>,
    /// `jwt`, `bypass` or `spotify`
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }

    /// Single `AUTH-LOG` line for this event
    pub fn log_line(&self) -> String {
        let mut line = format!(
            "AUTH-LOG [{}] [{}] [{}] [{}]",
            self.event_type,
            self.user_id.as_deref().unwrap_or("anonymous"),
            if self.success { "SUCCESS" } else { "FAILURE" },
            self.timestamp.to_rfc3339(),
        );
        if let Some(method) = &self.auth_method {
            line.push_str(&format!(" [{}]", method));
        }
        if let Some(resource) = &self.resource {
            line.push_str(&format!(" {}", resource));
        }
        if let Some(duration) = self.duration_ms {
            line.push_str(&format!(" ({}ms)", duration));
        }
        if let Some(details) = &self.details {
            line.push_str(&format!(" {}", details));
        }
        line
    }
}

/// Log an authentication event; failures go out at warn level
pub fn log_auth_event(event: AuthEvent) {
    if event.success {
        info!("{}", event.log_line());
    } else {
        warn!("{}", event.log_line());
    }
}

pub fn log_spotify_exchange(success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::SpotifyTokenExchange, None, success).with_auth_method("spotify");
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

pub fn log_spotify_refresh(success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::SpotifyTokenRefresh, None, success).with_auth_method("spotify");
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

/// Log a profile linking or unlinking its Spotify account
pub fn log_spotify_link(user_id: &str, connected: bool) {
    let event_type = if connected {
        AuthEventType::SpotifyConnect
    } else {
        AuthEventType::SpotifyDisconnect
    };
    log_auth_event(AuthEvent::new(event_type, Some(user_id), true).with_auth_method("spotify"));
}

pub fn log_authorization_denied(reason: &str) {
    let event = AuthEvent::new(AuthEventType::SpotifyAuthorizationDenied, None, false)
        .with_details(reason)
        .with_auth_method("spotify");
    log_auth_event(event);
}
