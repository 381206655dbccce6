use serde::{Deserialize, Serialize};

/// What an `open.spotify.com` link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotifyLinkKind {
    Playlist,
    Album,
    Track,
}

impl SpotifyLinkKind {
    const ALL: [SpotifyLinkKind; 3] = [SpotifyLinkKind::Playlist, SpotifyLinkKind::Album, SpotifyLinkKind::Track];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpotifyLinkKind::Playlist => "playlist",
            SpotifyLinkKind::Album => "album",
            SpotifyLinkKind::Track => "track",
        }
    }
}

/// ID following `<kind>/` in a link, playlists first
pub fn extract_spotify_id(url: &str) -> Option<String> {
    SpotifyLinkKind::ALL.iter().find_map(|kind| {
        let marker = format!("{}/", kind.as_str());
        let start = url.find(&marker)? + marker.len();
        let id: String = url[start..].chars().take_while(char::is_ascii_alphanumeric).collect();
        (!id.is_empty()).then_some(id)
    })
}

pub fn spotify_link_kind(url: &str) -> Option<SpotifyLinkKind> {
    SpotifyLinkKind::ALL
        .iter()
        .copied()
        .find(|kind| url.contains(&format!("/{}/", kind.as_str())))
}

/// Embeddable player URL, or `None` for links we cannot parse
pub fn embed_url(url: &str) -> Option<String> {
    let id = extract_spotify_id(url)?;
    let kind = spotify_link_kind(url)?;
    Some(format!(
        "https://open.spotify.com/embed/{}/{}?utm_source=generator&theme=0",
        kind.as_str(),
        id
    ))
}
