use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenUrl};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::{SpotifyConfig, SpotifyError};

/// Scopes requested from the user: playlist reading, profile and Web Playback
pub const SCOPES: [&str; 7] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-read-private",
    "user-read-email",
    "streaming",
    "user-read-playback-state",
    "user-modify-playback-state",
];

/// Everything a client needs to start the authorization-code flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub url: String,
    /// Keep this until the code comes back; it is sent with the exchange
    pub code_verifier: String,
    pub state: String,
    pub redirect_uri: String,
}

/// 32 random bytes, base64url without padding
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge for a verifier
pub fn code_challenge(verifier: &str) -> PkceCodeChallenge {
    PkceCodeChallenge::from_code_verifier_sha256(&PkceCodeVerifier::new(verifier.to_string()))
}

/// Spotify refuses `localhost` redirects, so swap in the loopback address
pub fn normalize_redirect_uri(redirect_uri: Option<&str>, public_origin: &str) -> String {
    let uri = match redirect_uri.filter(|uri| !uri.is_empty()) {
        Some(uri) => uri.to_string(),
        None => format!("{}/api/spotify/callback", public_origin.trim_end_matches('/')),
    };
    uri.replacen("localhost", "127.0.0.1", 1)
}

/// Build the authorize URL with a fresh verifier and CSRF state
pub fn authorize_url(config: &SpotifyConfig, redirect_uri: Option<&str>) -> Result<AuthorizeRequest, SpotifyError> {
    let redirect_uri = match redirect_uri {
        Some(uri) => normalize_redirect_uri(Some(uri), &config.public_origin),
        None => config.default_redirect_uri(),
    };
    let base = config.accounts_url.trim_end_matches('/');

    let auth_url = AuthUrl::new(format!("{}/authorize", base)).map_err(|e| SpotifyError::AuthUrl(e.to_string()))?;
    let token_url = TokenUrl::new(format!("{}/api/token", base)).map_err(|e| SpotifyError::AuthUrl(e.to_string()))?;
    let redirect = RedirectUrl::new(redirect_uri.clone()).map_err(|e| SpotifyError::AuthUrl(e.to_string()))?;

    let client = BasicClient::new(ClientId::new(config.client_id.clone()), None, auth_url, Some(token_url))
        .set_redirect_uri(redirect);

    let verifier = generate_code_verifier();
    let (url, state) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(SCOPES.iter().map(|scope| Scope::new(scope.to_string())))
        .set_pkce_challenge(code_challenge(&verifier))
        .url();

    debug!("Generated Spotify authorization URL for redirect {}", redirect_uri);
    Ok(AuthorizeRequest {
        url: url.to_string(),
        code_verifier: verifier,
        state: state.secret().clone(),
        redirect_uri,
    })
}

/// Where the browser goes after Spotify redirects back to us
pub fn callback_redirect(code: Option<&str>, error: Option<&str>) -> String {
    if let Some(error) = error {
        return format!("/?error={}", urlencoding::encode(error));
    }
    match code.filter(|c| !c.is_empty()) {
        Some(code) => format!("/?spotify_code={}", urlencoding::encode(code)),
        None => "/?error=no_code".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_verifier_is_unpadded_base64url() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn test_challenge_matches_rfc_example() {
        // RFC 7636 appendix B
        let challenge = code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge.as_str(), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
        assert_eq!(challenge.method().as_str(), "S256");
    }

    #[test]
    fn test_redirect_normalization() {
        assert_eq!(
            normalize_redirect_uri(Some("http://localhost:3000/api/spotify/callback"), "ignored"),
            "http://127.0.0.1:3000/api/spotify/callback"
        );
        assert_eq!(
            normalize_redirect_uri(None, "https://somara.app/"),
            "https://somara.app/api/spotify/callback"
        );
    }

    #[test]
    fn test_authorize_url_carries_pkce_parameters() {
        let config = SpotifyConfig::with_base_url("client-1", "https://accounts.example.com");
        let request = authorize_url(&config, Some("http://localhost:3000/api/spotify/callback")).unwrap();

        let url = url::Url::parse(&request.url).unwrap();
        assert_eq!(url.path(), "/authorize");
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["code_challenge"], code_challenge(&request.code_verifier).as_str());
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:3000/api/spotify/callback");
        assert_eq!(params["scope"], SCOPES.join(" "));
        assert_eq!(params["state"], request.state);
    }

    #[test]
    fn test_callback_redirects() {
        assert_eq!(callback_redirect(Some("abc"), None), "/?spotify_code=abc");
        assert_eq!(callback_redirect(None, Some("access denied")), "/?error=access%20denied");
        assert_eq!(callback_redirect(None, None), "/?error=no_code");
    }
}
