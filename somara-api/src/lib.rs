// Somara API: HTTP surface for breathwork classes and the Spotify proxy.

pub mod api;
pub mod entities;
pub mod openapi;
