//! Conversions between domain entities and storage records

use chrono::{DateTime, Utc};

use somara_data::models::class::ClassDocumentRecord;
use somara_data::models::profile::ProfileRecord;

use super::class::BreathworkClass;
use super::profile::Profile;

/// Serialize a class into its stored document form
pub fn class_to_record(user_id: &str, class: &BreathworkClass) -> Result<ClassDocumentRecord, serde_json::Error> {
    Ok(ClassDocumentRecord {
        id: class.id.clone(),
        user_id: user_id.to_string(),
        document: serde_json::to_string(class)?,
        created_at: class.created_at,
        updated_at: class.updated_at,
    })
}

/// Parse a stored document back into a class.
///
/// The row's timestamps win over whatever the document carries.
pub fn record_to_class(record: &ClassDocumentRecord) -> Result<BreathworkClass, serde_json::Error> {
    let mut class: BreathworkClass = serde_json::from_str(&record.document)?;
    class.id = record.id.clone();
    class.created_at = record.created_at;
    class.updated_at = record.updated_at;
    Ok(class)
}

/// Parse an RFC 3339 timestamp, falling back to the Unix epoch
fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

pub fn record_to_profile(record: ProfileRecord) -> Profile {
    Profile {
        id: record.id,
        user_id: record.user_id,
        display_name: record.display_name,
        avatar_url: record.avatar_url,
        spotify_user_id: record.spotify_user_id,
        spotify_connected: record.spotify_connected,
        spotify_connected_at: record.spotify_connected_at.as_deref().map(parse_timestamp),
        created_at: parse_timestamp(&record.created_at),
        updated_at: parse_timestamp(&record.updated_at),
    }
}

pub fn profile_to_record(profile: &Profile) -> ProfileRecord {
    ProfileRecord {
        id: profile.id.clone(),
        user_id: profile.user_id.clone(),
        display_name: profile.display_name.clone(),
        avatar_url: profile.avatar_url.clone(),
        spotify_user_id: profile.spotify_user_id.clone(),
        spotify_connected: profile.spotify_connected,
        spotify_connected_at: profile.spotify_connected_at.map(|dt| dt.to_rfc3339()),
        created_at: profile.created_at.to_rfc3339(),
        updated_at: profile.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_timestamps_override_document() {
        let mut class = BreathworkClass::new("c1");
        class.theme = Some("Morning".to_string());
        class.created_at = 5;
        class.updated_at = 6;

        let mut record = class_to_record("user-1", &class).unwrap();
        record.updated_at = 99;

        let loaded = record_to_class(&record).unwrap();
        assert_eq!(loaded.theme.as_deref(), Some("Morning"));
        assert_eq!(loaded.created_at, 5);
        assert_eq!(loaded.updated_at, 99);
    }

    #[test]
    fn test_profile_record_conversion() {
        let record = ProfileRecord {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            display_name: Some("Ana".to_string()),
            avatar_url: None,
            spotify_user_id: Some("sp".to_string()),
            spotify_connected: true,
            spotify_connected_at: Some("2025-03-01T10:00:00+00:00".to_string()),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-03-01T10:00:00+00:00".to_string(),
        };

        let profile = record_to_profile(record.clone());
        assert!(profile.spotify_connected);
        assert_eq!(profile_to_record(&profile), record);
    }
}
