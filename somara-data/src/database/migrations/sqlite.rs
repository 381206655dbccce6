use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_classes_table(conn)?;
    create_classes_index(conn)?;
    create_profiles_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Class documents are stored whole, one JSON blob per class
fn create_classes_table(conn: &Connection) -> Result<(), String> {
    info!("Creating breathwork_classes table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS breathwork_classes (
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            document TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (user_id, id)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_classes_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on breathwork_classes.updated_at");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_breathwork_classes_user_updated
        ON breathwork_classes (user_id, updated_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn create_profiles_table(conn: &Connection) -> Result<(), String> {
    info!("Creating profiles table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            display_name TEXT,
            avatar_url TEXT,
            spotify_user_id TEXT,
            spotify_connected INTEGER NOT NULL DEFAULT 0,
            spotify_connected_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('breathwork_classes', 'profiles')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
