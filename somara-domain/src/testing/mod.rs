// Testing utilities for the domain layer and the API handler tests
// This module is only available when the "mock" feature is enabled

pub use somara_data::repository::tests::{MockClassRepository, MockProfileRepository};

use std::collections::HashMap;

use async_trait::async_trait;

use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::{ClassService, ProfileService};

/// Class service over an empty in-process repository
pub fn create_mock_class_service() -> ClassService<MockClassRepository> {
    ClassService::new(MockClassRepository::new())
}

/// Class service whose repository fails every call
pub fn create_failing_class_service() -> ClassService<MockClassRepository> {
    ClassService::new(MockClassRepository::failing())
}

pub fn create_mock_profile_service() -> ProfileService<MockProfileRepository> {
    ProfileService::new(MockProfileRepository::new())
}

/// Mock health service with configurable component states
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// All components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("No database pool; data is kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

pub fn create_mock_health_service() -> MockHealthService {
    MockHealthService::new()
}
