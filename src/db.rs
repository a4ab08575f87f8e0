use crate::models::{AuthUser, Session, Settings, UserProfile};
use rusqlite::{Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tauri::{AppHandle, Manager};

/// Local persistence for the whitelisted stores: session, user profile,
/// settings. Cart, menu cache, and orders are deliberately not written here;
/// they are rebuilt each app session.
pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(app_handle: &AppHandle) -> Result<Self> {
        let app_dir = app_handle
            .path()
            .app_data_dir()
            .expect("Failed to get app data dir");

        std::fs::create_dir_all(&app_dir).expect("Failed to create app data directory");

        let db_path: PathBuf = app_dir.join("delice.db");
        Self::open_at(&db_path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "
            -- Auth session, singleton row
            CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                email TEXT NOT NULL
            );

            -- User profile, singleton row
            CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                email TEXT NOT NULL,
                name TEXT
            );

            -- Cached restaurant settings, singleton row
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                restaurant_name TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                weekday_hours TEXT NOT NULL DEFAULT '',
                weekend_hours TEXT NOT NULL DEFAULT ''
            );
            ",
        )?;

        Ok(())
    }

    pub fn save_session(&self, session: &Session) -> std::result::Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT OR REPLACE INTO session (id, access_token, refresh_token, email) VALUES (1, ?1, ?2, ?3)",
            rusqlite::params![
                session.access_token,
                session.refresh_token,
                session.user.email
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn load_session(&self) -> std::result::Result<Option<Session>, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.query_row(
            "SELECT access_token, refresh_token, email FROM session WHERE id = 1",
            [],
            |row| {
                Ok(Session {
                    access_token: row.get(0)?,
                    refresh_token: row.get(1)?,
                    user: AuthUser { email: row.get(2)? },
                })
            },
        )
        .optional()
        .map_err(|e| e.to_string())
    }

    pub fn clear_session(&self) -> std::result::Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM session", [])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM profile", [])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> std::result::Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT OR REPLACE INTO profile (id, email, name) VALUES (1, ?1, ?2)",
            rusqlite::params![profile.email, profile.name],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn load_profile(&self) -> std::result::Result<Option<UserProfile>, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.query_row("SELECT email, name FROM profile WHERE id = 1", [], |row| {
            Ok(UserProfile {
                email: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()
        .map_err(|e| e.to_string())
    }

    pub fn save_settings(&self, settings: &Settings) -> std::result::Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT OR REPLACE INTO settings
             (id, restaurant_name, phone, email, address, weekday_hours, weekend_hours)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                settings.restaurant_name,
                settings.phone,
                settings.email,
                settings.address,
                settings.weekday_hours,
                settings.weekend_hours
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn load_settings(&self) -> std::result::Result<Option<Settings>, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.query_row(
            "SELECT restaurant_name, phone, email, address, weekday_hours, weekend_hours
             FROM settings WHERE id = 1",
            [],
            |row| {
                Ok(Settings {
                    restaurant_name: row.get(0)?,
                    phone: row.get(1)?,
                    email: row.get(2)?,
                    address: row.get(3)?,
                    weekday_hours: row.get(4)?,
                    weekend_hours: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| e.to_string())
    }
}

pub trait DatabaseExt {
    fn db(&self) -> &Database;
}

impl DatabaseExt for AppHandle {
    fn db(&self) -> &Database {
        self.state::<Database>().inner()
    }
}
