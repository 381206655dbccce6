use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::entities::track::SpotifyPlaylist;
use super::auth::{authorize_url, normalize_redirect_uri, AuthorizeRequest};
use super::links::{extract_spotify_id, spotify_link_kind, SpotifyLinkKind};
use super::mapping::{
    AudioFeaturesPage, OEmbed, Page, PlaylistSummary, PlaylistTracks, RawAudioFeatures, RawPlaylist,
    RawPlaylistItem, RawUser, SpotifyUser,
};
use super::token::{RefreshedToken, DEFAULT_EXPIRES_IN};
use super::{SpotifyConfig, SpotifyError};

/// The audio-features endpoint takes at most this many ids
pub const FEATURES_BATCH_SIZE: usize = 100;
pub const PAGE_LIMIT: usize = 50;

/// Access token for one request chain, refreshed at most once on a 401
struct TokenState {
    access: String,
    refresh: Option<String>,
    refreshed: bool,
    renewed: bool,
}

impl TokenState {
    fn new(access: &str, refresh: Option<&str>) -> Self {
        Self {
            access: access.to_string(),
            refresh: refresh.map(str::to_string),
            refreshed: false,
            renewed: false,
        }
    }

    fn can_refresh(&self) -> bool {
        !self.refreshed && self.refresh.is_some()
    }
}

enum FeatureBatch {
    Loaded(Vec<RawAudioFeatures>),
    Failed(StatusCode, String),
    /// Transport failure or a body that is not an audio features page
    Unreadable(String),
}

fn require_token(token: Option<&str>) -> Result<&str, SpotifyError> {
    token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SpotifyError::Unauthorized("Missing access token".to_string()))
}

/// Turn a non-success response into an upstream error, logging the body
async fn upstream_error(response: Response, message: &str) -> SpotifyError {
    let status = response.status().as_u16();
    let details = response.text().await.unwrap_or_default();
    error!("{} ({}): {}", message, status, details);
    SpotifyError::Upstream {
        status,
        message: message.to_string(),
        details,
    }
}

/// Client for the Spotify accounts service and Web API
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    config: Arc<SpotifyConfig>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self, SpotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Somara/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    fn accounts(&self, path: &str) -> String {
        format!("{}{}", self.config.accounts_url.trim_end_matches('/'), path)
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Start the PKCE flow
    pub fn authorize(&self, redirect_uri: Option<&str>) -> Result<AuthorizeRequest, SpotifyError> {
        authorize_url(&self.config, redirect_uri)
    }

    /// Exchange an authorization code. Spotify's token JSON is passed through.
    pub async fn exchange_code(
        &self,
        code: Option<&str>,
        code_verifier: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<serde_json::Value, SpotifyError> {
        let (Some(code), Some(verifier)) = (
            code.filter(|c| !c.is_empty()),
            code_verifier.filter(|v| !v.is_empty()),
        ) else {
            return Err(SpotifyError::MissingParameter("Missing code or code_verifier".to_string()));
        };

        let redirect_uri = match redirect_uri {
            Some(uri) => normalize_redirect_uri(Some(uri), &self.config.public_origin),
            None => self.config.default_redirect_uri(),
        };

        let response = self
            .http
            .post(self.accounts("/api/token"))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, "Failed to exchange token").await);
        }

        info!("Exchanged Spotify authorization code");
        Ok(response.json().await?)
    }

    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<RefreshedToken, SpotifyError> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SpotifyError::MissingParameter("Missing refresh_token".to_string()))?;

        let response = self
            .http
            .post(self.accounts("/api/token"))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, "Failed to refresh token").await);
        }

        #[derive(serde::Deserialize)]
        struct TokenAnswer {
            access_token: String,
            expires_in: Option<u64>,
            refresh_token: Option<String>,
        }

        let answer: TokenAnswer = response.json().await?;
        debug!("Refreshed Spotify access token");
        Ok(RefreshedToken {
            access_token: answer.access_token,
            expires_in: answer.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            refresh_token: answer.refresh_token.unwrap_or_else(|| refresh_token.to_string()),
        })
    }

    /// Refresh the chain's token once. Returns whether a new token is in place.
    async fn try_refresh(&self, state: &mut TokenState) -> bool {
        if !state.can_refresh() {
            return false;
        }
        state.refreshed = true;
        match self.refresh(state.refresh.as_deref()).await {
            Ok(token) => {
                info!("Spotify token expired mid-request, continuing with a refreshed one");
                state.access = token.access_token;
                state.refresh = Some(token.refresh_token);
                state.renewed = true;
                true
            }
            Err(e) => {
                warn!("Could not refresh Spotify token: {}", e);
                false
            }
        }
    }

    /// GET with the chain's token, retrying once with a refreshed token on 401
    async fn get(&self, url: &str, state: &mut TokenState) -> Result<Response, SpotifyError> {
        let response = self.http.get(url).bearer_auth(&state.access).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED && self.try_refresh(state).await {
            return Ok(self.http.get(url).bearer_auth(&state.access).send().await?);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, SpotifyError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized("Invalid or expired token".to_string()));
        }
        if !status.is_success() {
            return Err(upstream_error(response, "Spotify request failed").await);
        }
        Ok(response.json().await?)
    }

    /// Profile of the token's owner
    pub async fn current_user(&self, access_token: Option<&str>) -> Result<SpotifyUser, SpotifyError> {
        let token = require_token(access_token)?;
        let raw: RawUser = self
            .get_json(&self.api("/v1/me"), token)
            .await
            .map_err(|e| match e {
                SpotifyError::Upstream { status, details, .. } => SpotifyError::Upstream {
                    status,
                    message: "Failed to fetch user profile".to_string(),
                    details,
                },
                other => other,
            })?;
        Ok(raw.into())
    }

    /// Every playlist in the listener's library
    pub async fn user_playlists(&self, access_token: Option<&str>) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        let token = require_token(access_token)?;
        let mut next = Some(self.api(&format!("/v1/me/playlists?limit={}", PAGE_LIMIT)));
        let mut playlists = Vec::new();

        while let Some(url) = next {
            let page: Page<RawPlaylist> = self.get_json(&url, token).await.map_err(|e| match e {
                SpotifyError::Upstream { status, details, .. } => SpotifyError::Upstream {
                    status,
                    message: "Failed to fetch playlists".to_string(),
                    details,
                },
                other => other,
            })?;
            playlists.extend(page.items.into_iter().map(PlaylistSummary::from));
            next = page.next;
        }

        debug!("Fetched {} playlists", playlists.len());
        Ok(playlists)
    }

    /// A playlist with all of its tracks and their audio features
    pub async fn playlist_with_tracks(
        &self,
        playlist_id: &str,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<PlaylistTracks, SpotifyError> {
        let token = match access_token.filter(|t| !t.is_empty()) {
            Some(token) if !playlist_id.is_empty() => token,
            _ => {
                return Err(SpotifyError::MissingParameter(
                    "Missing playlist ID or access token".to_string(),
                ))
            }
        };
        let mut state = TokenState::new(token, refresh_token);

        let response = self
            .get(&self.api(&format!("/v1/playlists/{}", playlist_id)), &mut state)
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error(response, "Failed to fetch playlist").await);
        }
        let playlist: RawPlaylist = response.json().await?;

        let tracks = self.playlist_items(playlist_id, &mut state).await?;
        let ids = PlaylistTracks::track_ids(&tracks);
        let audio_features = self.audio_features(&ids, &mut state).await;

        info!(
            "Loaded playlist {} with {} tracks and {} audio features",
            playlist_id,
            tracks.len(),
            audio_features.len()
        );

        Ok(PlaylistTracks {
            playlist,
            tracks,
            audio_features,
            refreshed_access_token: state.renewed.then(|| state.access.clone()),
        })
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        state: &mut TokenState,
    ) -> Result<Vec<RawPlaylistItem>, SpotifyError> {
        let mut next = Some(self.api(&format!("/v1/playlists/{}/tracks?limit={}", playlist_id, PAGE_LIMIT)));
        let mut items = Vec::new();

        while let Some(url) = next {
            let response = self.get(&url, state).await?;
            if !response.status().is_success() {
                warn!(
                    "Stopped reading tracks of playlist {} at status {}",
                    playlist_id,
                    response.status()
                );
                break;
            }
            let page: Page<RawPlaylistItem> = response.json().await?;
            items.extend(page.items);
            next = page.next;
        }
        Ok(items)
    }

    async fn feature_batch(&self, ids: &[String], token: &str) -> FeatureBatch {
        let url = self.api(&format!("/v1/audio-features?ids={}", ids.join(",")));
        let response = match self.http.get(&url).bearer_auth(token).send().await {
            Ok(response) => response,
            Err(e) => return FeatureBatch::Unreadable(e.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return FeatureBatch::Failed(status, body);
        }
        match response.json::<AudioFeaturesPage>().await {
            Ok(page) => FeatureBatch::Loaded(page.audio_features.into_iter().flatten().collect()),
            Err(e) => FeatureBatch::Unreadable(e.to_string()),
        }
    }

    /// Audio features keyed by track id. Batches that fail are skipped.
    async fn audio_features(
        &self,
        ids: &[String],
        state: &mut TokenState,
    ) -> std::collections::HashMap<String, RawAudioFeatures> {
        let mut features = std::collections::HashMap::new();
        if ids.is_empty() {
            return features;
        }

        let batches: Vec<&[String]> = ids.chunks(FEATURES_BATCH_SIZE).collect();
        let token = state.access.clone();
        let outcomes = join_all(batches.iter().map(|batch| self.feature_batch(batch, &token))).await;

        let mut expired = Vec::new();
        for (batch, outcome) in batches.iter().zip(outcomes) {
            match outcome {
                FeatureBatch::Loaded(loaded) => {
                    features.extend(loaded.into_iter().map(|f| (f.id.clone(), f)));
                }
                FeatureBatch::Failed(StatusCode::UNAUTHORIZED, _) => expired.push(*batch),
                FeatureBatch::Failed(StatusCode::FORBIDDEN, body) => {
                    warn!(
                        "Audio features are not available to this Spotify application, continuing without them: {}",
                        body
                    );
                }
                FeatureBatch::Failed(status, body) => {
                    warn!("Failed to fetch audio features ({}): {}", status, body);
                }
                FeatureBatch::Unreadable(reason) => {
                    warn!("Skipping unreadable audio features batch: {}", reason);
                }
            }
        }

        if !expired.is_empty() && self.try_refresh(state).await {
            for batch in expired {
                match self.feature_batch(batch, &state.access).await {
                    FeatureBatch::Loaded(loaded) => {
                        features.extend(loaded.into_iter().map(|f| (f.id.clone(), f)));
                    }
                    FeatureBatch::Failed(status, body) => {
                        warn!("Audio features retry failed ({}): {}", status, body);
                    }
                    FeatureBatch::Unreadable(reason) => {
                        warn!("Audio features retry failed: {}", reason);
                    }
                }
            }
        }

        features
    }

    /// Resolve a pasted Spotify link into a playlist to attach to a class.
    ///
    /// Playlists are read through the Web API when a token is available;
    /// everything else gets oEmbed details, or a bare placeholder when that
    /// fails too.
    pub async fn playlist_info(
        &self,
        url: &str,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<SpotifyPlaylist, SpotifyError> {
        let (Some(id), Some(kind)) = (extract_spotify_id(url), spotify_link_kind(url)) else {
            return Err(SpotifyError::InvalidLink(url.to_string()));
        };

        if kind == SpotifyLinkKind::Playlist && access_token.is_some() {
            match self.playlist_with_tracks(&id, access_token, refresh_token).await {
                Ok(details) => return Ok(details.to_spotify_playlist(&id, url)),
                Err(e) => warn!("Falling back to oEmbed for playlist {}: {}", id, e),
            }
        }

        let placeholder = |name: String, image_url: Option<String>| SpotifyPlaylist {
            id: id.clone(),
            name,
            image_url,
            url: url.to_string(),
            tracks: Some(Vec::new()),
            total_duration: Some(0),
        };

        let oembed = self
            .http
            .get(&self.config.oembed_url)
            .query(&[("url", url)])
            .send()
            .await;
        match oembed {
            Ok(response) if response.status().is_success() => match response.json::<OEmbed>().await {
                Ok(data) => {
                    return Ok(placeholder(
                        data.title.unwrap_or_else(|| "Untitled Playlist".to_string()),
                        data.thumbnail_url,
                    ))
                }
                Err(e) => warn!("Unreadable oEmbed answer for {}: {}", url, e),
            },
            Ok(response) => warn!("oEmbed lookup for {} failed with {}", url, response.status()),
            Err(e) => warn!("oEmbed lookup for {} failed: {}", url, e),
        }

        Ok(placeholder("Playlist".to_string(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SpotifyClient {
        SpotifyClient::new(SpotifyConfig::with_base_url("client-1", &server.uri())).unwrap()
    }

    fn track_item(id: &str, ms: u64) -> serde_json::Value {
        json!({"track": {"id": id, "name": id, "artists": [{"name": "Artist"}], "duration_ms": ms}})
    }

    mod tokens {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_exchange_requires_code_and_verifier() {
            let server = MockServer::start().await;
            let result = client(&server).exchange_code(Some("code"), None, None).await;
            assert!(matches!(result, Err(SpotifyError::MissingParameter(msg)) if msg == "Missing code or code_verifier"));
        }

        #[tokio::test]
        async fn test_exchange_posts_pkce_form() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/token"))
                .and(body_string_contains("grant_type=authorization_code"))
                .and(body_string_contains("code_verifier=verifier-1"))
                .and(body_string_contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2Fapi%2Fspotify%2Fcallback"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": "at", "token_type": "Bearer", "expires_in": 3600, "refresh_token": "rt"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let token = client(&server)
                .exchange_code(Some("code-1"), Some("verifier-1"), Some("http://localhost:3000/api/spotify/callback"))
                .await
                .unwrap();
            assert_eq!(token["access_token"], "at");
        }

        #[tokio::test]
        async fn test_exchange_failure_keeps_upstream_status() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/token"))
                .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
                .mount(&server)
                .await;

            match client(&server).exchange_code(Some("c"), Some("v"), None).await {
                Err(SpotifyError::Upstream { status, message, details }) => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "Failed to exchange token");
                    assert_eq!(details, "invalid_grant");
                }
                other => panic!("expected upstream error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_refresh_keeps_old_refresh_token() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/token"))
                .and(body_string_contains("grant_type=refresh_token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
                .mount(&server)
                .await;

            let refreshed = client(&server).refresh(Some("rt-1")).await.unwrap();
            assert_eq!(
                refreshed,
                RefreshedToken {
                    access_token: "fresh".to_string(),
                    expires_in: 3600,
                    refresh_token: "rt-1".to_string(),
                }
            );

            assert!(matches!(
                client(&server).refresh(None).await,
                Err(SpotifyError::MissingParameter(_))
            ));
        }
    }

    mod library {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_current_user_maps_profile() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/me"))
                .and(header("authorization", "Bearer at"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "u1", "display_name": "Listener", "followers": {"total": 7}, "product": "premium"
                })))
                .mount(&server)
                .await;

            let user = client(&server).current_user(Some("at")).await.unwrap();
            assert_eq!(user.display_name.as_deref(), Some("Listener"));
            assert_eq!(user.followers, 7);
        }

        #[tokio::test]
        async fn test_current_user_rejects_missing_and_expired_tokens() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/me"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;

            let client = client(&server);
            assert!(matches!(client.current_user(None).await, Err(SpotifyError::Unauthorized(msg)) if msg == "Missing access token"));
            assert!(matches!(client.current_user(Some("old")).await, Err(SpotifyError::Unauthorized(msg)) if msg == "Invalid or expired token"));
        }

        #[tokio::test]
        async fn test_user_playlists_follow_next_links() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/me/playlists"))
                .and(query_param("offset", "50"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": [{"id": "p2", "name": "Second", "tracks": {"total": 3}}],
                    "next": null
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/v1/me/playlists"))
                .and(query_param("limit", "50"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": [{"id": "p1", "name": "First", "owner": {"id": "me", "display_name": "Me"}}],
                    "next": format!("{}/v1/me/playlists?limit=50&offset=50", server.uri())
                })))
                .mount(&server)
                .await;

            let playlists = client(&server).user_playlists(Some("at")).await.unwrap();
            let ids: Vec<_> = playlists.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec!["p1", "p2"]);
            assert_eq!(playlists[0].owner.as_deref(), Some("Me"));
            assert_eq!(playlists[1].track_count, 3);
        }
    }

    mod playlists {
        use super::*;
        use pretty_assertions::assert_eq;

        async fn mount_playlist(server: &MockServer, token: &str) {
            Mock::given(method("GET"))
                .and(path("/v1/playlists/pl1"))
                .and(header("authorization", format!("Bearer {}", token).as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "pl1", "name": "Breath"})))
                .mount(server)
                .await;
            Mock::given(method("GET"))
                .and(path("/v1/playlists/pl1/tracks"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": [track_item("t1", 200_000), {"track": null}, track_item("t2", 100_000)],
                    "next": null
                })))
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn test_playlist_with_tracks_attaches_features() {
            let server = MockServer::start().await;
            mount_playlist(&server, "at").await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .and(query_param("ids", "t1,t2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "audio_features": [{"id": "t1", "tempo": 64.4, "energy": 0.333}, null]
                })))
                .mount(&server)
                .await;

            let details = client(&server).playlist_with_tracks("pl1", Some("at"), None).await.unwrap();
            assert_eq!(details.tracks.len(), 3);
            assert_eq!(details.audio_features.len(), 1);
            assert_eq!(details.refreshed_access_token, None);

            let tracks = details.spotify_tracks();
            assert_eq!(tracks[0].features.bpm, Some(64));
            assert_eq!(tracks[0].features.energy, Some(0.33));
            assert_eq!(tracks[1].features.bpm, None);
        }

        #[tokio::test]
        async fn test_forbidden_features_are_skipped() {
            let server = MockServer::start().await;
            mount_playlist(&server, "at").await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
                .mount(&server)
                .await;

            let details = client(&server).playlist_with_tracks("pl1", Some("at"), None).await.unwrap();
            assert!(details.audio_features.is_empty());
            assert_eq!(details.spotify_tracks().len(), 2);
        }

        #[tokio::test]
        async fn test_unreadable_features_batch_keeps_playlist() {
            let server = MockServer::start().await;
            mount_playlist(&server, "at").await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway hiccup</html>"))
                .mount(&server)
                .await;

            let details = client(&server).playlist_with_tracks("pl1", Some("at"), None).await.unwrap();
            assert!(details.audio_features.is_empty());
            assert_eq!(details.spotify_tracks().len(), 2);
        }

        #[tokio::test]
        async fn test_expired_token_is_refreshed_once() {
            let server = MockServer::start().await;
            mount_playlist(&server, "at").await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .and(header("authorization", "Bearer at"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .and(header("authorization", "Bearer fresh"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "audio_features": [{"id": "t2", "tempo": 90.0}]
                })))
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path("/api/token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
                .expect(1)
                .mount(&server)
                .await;

            let details = client(&server)
                .playlist_with_tracks("pl1", Some("at"), Some("rt"))
                .await
                .unwrap();
            assert_eq!(details.refreshed_access_token.as_deref(), Some("fresh"));
            assert_eq!(details.audio_features["t2"].tempo, Some(90.0));
        }

        #[tokio::test]
        async fn test_missing_playlist_reports_upstream_status() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/playlists/gone"))
                .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
                .mount(&server)
                .await;

            let result = client(&server).playlist_with_tracks("gone", Some("at"), None).await;
            assert!(matches!(result, Err(SpotifyError::Upstream { status: 404, .. })));
        }

        #[tokio::test]
        async fn test_playlist_info_uses_api_with_token() {
            let server = MockServer::start().await;
            mount_playlist(&server, "at").await;
            Mock::given(method("GET"))
                .and(path("/v1/audio-features"))
                .respond_with(ResponseTemplate::new(403))
                .mount(&server)
                .await;

            let url = "https://open.spotify.com/playlist/pl1?si=x";
            let playlist = client(&server).playlist_info(url, Some("at"), None).await.unwrap();
            assert_eq!(playlist.name, "Breath");
            assert_eq!(playlist.url, url);
            assert_eq!(playlist.total_duration, Some(300));
        }

        #[tokio::test]
        async fn test_playlist_info_falls_back_to_oembed_then_placeholder() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/oembed"))
                .and(query_param("url", "https://open.spotify.com/album/al1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "title": "Album Title", "thumbnail_url": "https://img/al1"
                })))
                .mount(&server)
                .await;

            let client = client(&server);
            let album = client
                .playlist_info("https://open.spotify.com/album/al1", None, None)
                .await
                .unwrap();
            assert_eq!(album.name, "Album Title");
            assert_eq!(album.image_url.as_deref(), Some("https://img/al1"));

            let track = client
                .playlist_info("https://open.spotify.com/track/tr1", None, None)
                .await
                .unwrap();
            assert_eq!(track.id, "tr1");
            assert_eq!(track.name, "Playlist");

            assert!(matches!(
                client.playlist_info("https://example.com/x", None, None).await,
                Err(SpotifyError::InvalidLink(_))
            ));
        }
    }
}
