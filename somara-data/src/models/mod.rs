// Storage records as they are persisted
pub mod class;
pub mod profile;
