use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Tokens are refreshed this long before they actually expire
pub const REFRESH_MARGIN_MS: i64 = 5 * 60 * 1000;
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Answer of the refresh grant. The refresh token is always present: the old
/// one is echoed back when Spotify does not rotate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: String,
}

/// A stored Spotify access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Milliseconds since the Unix epoch
    pub expires_at: i64,
}

impl SpotifyToken {
    pub fn new(access_token: String, expires_in: u64, refresh_token: Option<String>, issued_at_ms: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: issued_at_ms + (expires_in as i64) * 1000,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Expired, or expiring within [`REFRESH_MARGIN_MS`]
    pub fn needs_refresh(&self, now_ms: i64) -> bool {
        now_ms + REFRESH_MARGIN_MS >= self.expires_at
    }

    /// Take over a refreshed token
    pub fn apply_refresh(&mut self, refreshed: RefreshedToken, now_ms: i64) {
        *self = Self::new(
            refreshed.access_token,
            refreshed.expires_in,
            Some(refreshed.refresh_token),
            now_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_margin() {
        let token = SpotifyToken::new("a".to_string(), 3600, None, 0);
        assert_eq!(token.expires_at, 3_600_000);
        assert!(!token.needs_refresh(0));
        assert!(!token.needs_refresh(3_600_000 - REFRESH_MARGIN_MS - 1));
        assert!(token.needs_refresh(3_600_000 - REFRESH_MARGIN_MS));
        assert!(!token.is_expired(3_599_999));
        assert!(token.is_expired(3_600_000));
    }

    #[test]
    fn test_apply_refresh_moves_expiry() {
        let mut token = SpotifyToken::new("old".to_string(), 60, Some("r1".to_string()), 0);
        token.apply_refresh(
            RefreshedToken {
                access_token: "new".to_string(),
                expires_in: 3600,
                refresh_token: "r2".to_string(),
            },
            1_000,
        );
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("r2"));
        assert_eq!(token.expires_at, 3_601_000);
    }
}
