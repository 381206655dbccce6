// Repository module structure
pub mod errors;
mod class;
mod profile;
mod in_memory;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use class::{ClassRepository, ClassRepositoryTrait};
pub use profile::{ProfileRepository, ProfileRepositoryTrait};

// Re-export test doubles for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::class::tests::MockClassRepository;
    pub use super::profile::tests::MockProfileRepository;
}
