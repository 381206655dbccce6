pub mod classes;
pub mod health;
pub mod phases;
pub mod playback;
pub mod profiles;
pub mod rhythms;
pub mod spotify;
pub mod tracks;

#[cfg(test)]
mod tests;

pub use health::health_check;
