//! Health checks for the database and the Spotify configuration

use std::collections::HashMap;

use async_trait::async_trait;
use somara_data::database;

use crate::spotify::SpotifyConfig;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Worst status across components
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };
        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    async fn get_system_health(&self) -> SystemHealth;

    /// Ok(true) when healthy, Ok(false) when degraded, Err when unavailable
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check if the database is available and functioning properly.
///
/// Returns `Ok(false)` when no pool was initialised and the repositories
/// run on their in-memory fallback.
pub async fn check_database_status() -> Result<bool, String> {
    match database::get_connection_info() {
        Some(info) if info.contains("healthy") => Ok(true),
        Some(info) => Err(info),
        None => Ok(false),
    }
}

fn database_component(status: Result<bool, String>) -> HealthComponent {
    match status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("No database pool; data is kept in memory".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    }
}

fn spotify_component(config: &SpotifyConfig) -> HealthComponent {
    match config.validate() {
        Ok(()) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
        Err(errors) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(errors.join("; ")),
        },
    }
}

/// Health service over the global database pool and the Spotify settings
#[derive(Debug, Clone)]
pub struct HealthService {
    spotify: SpotifyConfig,
}

impl HealthService {
    pub fn new(spotify: SpotifyConfig) -> Self {
        Self { spotify }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            database_component(check_database_status().await),
        );
        components.insert("spotify".to_string(), spotify_component(&self.spotify));
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status().await
    }
}
