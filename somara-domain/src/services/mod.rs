// Domain services
// Pure editing logic for class documents plus the services that persist them.

pub mod classes;
pub mod phases;
pub mod playback;
pub mod profiles;
pub mod timeline;

use validator::ValidationErrors;

pub use classes::{
    create_class_service_with_pool, create_default_class_service, ClassService, ClassServiceError,
    ClassServiceTrait,
};
pub use playback::{PlaybackSession, PlaybackStatus, PlayerCommand};
pub use profiles::{
    create_default_profile_service, create_profile_service_with_pool, ProfileService,
    ProfileServiceError, ProfileServiceTrait,
};
pub use timeline::{PhaseSpan, ResizeEdge, TimelineError, TrackChanges};

/// Flatten validator errors into `field: message; field: message`
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}
