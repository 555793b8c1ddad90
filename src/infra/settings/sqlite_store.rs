// SQLite-backed settings store for per-guild configuration.
//
// Tables:
// - mod_config: Moderation behavior flags
// - log_config: Cosmetic logging options
// - log_channels: Per-category log channel routing
// - reports: User-report intake settings
//
// Every write is an INSERT .. ON CONFLICT DO UPDATE of the full row, keyed
// by guild id (plus category for log_channels).

use crate::core::settings::{
    LogCategory, LogChannels, LogConfig, ModConfig, ReportsConfig, SettingsError, SettingsStore,
};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

impl SqliteSettingsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mod_config (
                guild_id INTEGER PRIMARY KEY,
                dm_users_on_action BOOLEAN NOT NULL DEFAULT 1,
                use_ephemeral_responses BOOLEAN NOT NULL DEFAULT 0,
                clean_up_commands BOOLEAN NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS log_config (
                guild_id INTEGER PRIMARY KEY,
                color_logs BOOLEAN NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS log_channels (
                guild_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                channel_id INTEGER,
                PRIMARY KEY (guild_id, category)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                guild_id INTEGER PRIMARY KEY,
                is_enabled BOOLEAN NOT NULL DEFAULT 0,
                channel_id INTEGER,
                pinged_role_ids TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get_mod_config(&self, guild_id: u64) -> Result<Option<ModConfig>, SettingsError> {
        let row = sqlx::query("SELECT * FROM mod_config WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;

        Ok(row.map(|row| ModConfig {
            guild_id,
            dm_users_on_action: row.get("dm_users_on_action"),
            use_ephemeral_responses: row.get("use_ephemeral_responses"),
            clean_up_commands: row.get("clean_up_commands"),
        }))
    }

    async fn save_mod_config(&self, config: ModConfig) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO mod_config (guild_id, dm_users_on_action, use_ephemeral_responses, clean_up_commands)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                dm_users_on_action = excluded.dm_users_on_action,
                use_ephemeral_responses = excluded.use_ephemeral_responses,
                clean_up_commands = excluded.clean_up_commands
            "#,
        )
        .bind(config.guild_id as i64)
        .bind(config.dm_users_on_action)
        .bind(config.use_ephemeral_responses)
        .bind(config.clean_up_commands)
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_log_config(&self, guild_id: u64) -> Result<Option<LogConfig>, SettingsError> {
        let row = sqlx::query("SELECT * FROM log_config WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;

        Ok(row.map(|row| LogConfig {
            guild_id,
            color_logs: row.get("color_logs"),
        }))
    }

    async fn save_log_config(&self, config: LogConfig) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO log_config (guild_id, color_logs)
            VALUES (?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                color_logs = excluded.color_logs
            "#,
        )
        .bind(config.guild_id as i64)
        .bind(config.color_logs)
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_log_channels(&self, guild_id: u64) -> Result<LogChannels, SettingsError> {
        let rows = sqlx::query("SELECT category, channel_id FROM log_channels WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;

        let mut channels = LogChannels::new();
        for row in rows {
            let key: String = row.get("category");
            // Rows written by an older category set are skipped, not errors.
            if let Some(category) = LogCategory::from_key(&key) {
                let channel_id = row.get::<Option<i64>, _>("channel_id").map(|id| id as u64);
                channels.insert(category, channel_id);
            }
        }
        Ok(channels)
    }

    async fn set_log_channel(
        &self,
        guild_id: u64,
        category: LogCategory,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO log_channels (guild_id, category, channel_id)
            VALUES (?, ?, ?)
            ON CONFLICT(guild_id, category) DO UPDATE SET
                channel_id = excluded.channel_id
            "#,
        )
        .bind(guild_id as i64)
        .bind(category.key())
        .bind(channel_id.map(|id| id as i64))
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_reports(&self, guild_id: u64) -> Result<Option<ReportsConfig>, SettingsError> {
        let row = sqlx::query("SELECT * FROM reports WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_roles: String = row.get("pinged_role_ids");
        let pinged_role_ids: Vec<u64> = serde_json::from_str(&raw_roles)
            .map_err(|e| SettingsError::Storage(format!("bad pinged_role_ids json: {e}")))?;

        Ok(Some(ReportsConfig {
            guild_id,
            is_enabled: row.get("is_enabled"),
            channel_id: row.get::<Option<i64>, _>("channel_id").map(|id| id as u64),
            pinged_role_ids,
        }))
    }

    async fn save_reports(&self, config: ReportsConfig) -> Result<(), SettingsError> {
        let roles_json = serde_json::to_string(&config.pinged_role_ids)
            .map_err(|e| SettingsError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO reports (guild_id, is_enabled, channel_id, pinged_role_ids)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                is_enabled = excluded.is_enabled,
                channel_id = excluded.channel_id,
                pinged_role_ids = excluded.pinged_role_ids
            "#,
        )
        .bind(config.guild_id as i64)
        .bind(config.is_enabled)
        .bind(config.channel_id.map(|id| id as i64))
        .bind(roles_json)
        .execute(&self.pool)
        .await
        .map_err(|e| SettingsError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    async fn open_store() -> SqliteSettingsStore {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_owned();
        drop(tmp);

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        let store = SqliteSettingsStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn mod_config_upsert_round_trip() {
        let store = open_store().await;
        assert!(store.get_mod_config(1).await.unwrap().is_none());

        let mut config = ModConfig::defaults(1);
        config.clean_up_commands = true;
        store.save_mod_config(config.clone()).await.unwrap();
        assert_eq!(store.get_mod_config(1).await.unwrap(), Some(config.clone()));

        // Second save hits the conflict arm and overwrites.
        config.dm_users_on_action = false;
        store.save_mod_config(config.clone()).await.unwrap();
        assert_eq!(store.get_mod_config(1).await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn log_channels_upsert_and_clear() {
        let store = open_store().await;

        store
            .set_log_channel(1, LogCategory::MemberJoin, Some(100))
            .await
            .unwrap();
        store
            .set_log_channel(1, LogCategory::MessageEdit, Some(200))
            .await
            .unwrap();
        store
            .set_log_channel(2, LogCategory::MemberJoin, Some(300))
            .await
            .unwrap();

        let channels = store.get_log_channels(1).await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[&LogCategory::MemberJoin], Some(100));

        // Disabling sets the channel back to NULL but keeps the row.
        store
            .set_log_channel(1, LogCategory::MemberJoin, None)
            .await
            .unwrap();
        let channels = store.get_log_channels(1).await.unwrap();
        assert_eq!(channels[&LogCategory::MemberJoin], None);

        // Other guilds are untouched.
        let other = store.get_log_channels(2).await.unwrap();
        assert_eq!(other[&LogCategory::MemberJoin], Some(300));
    }

    #[tokio::test]
    async fn reports_round_trip_preserves_role_list() {
        let store = open_store().await;

        let config = ReportsConfig {
            guild_id: 1,
            is_enabled: true,
            channel_id: Some(42),
            pinged_role_ids: vec![10, 20, 30],
        };
        store.save_reports(config.clone()).await.unwrap();
        assert_eq!(store.get_reports(1).await.unwrap(), Some(config.clone()));

        let emptied = ReportsConfig {
            pinged_role_ids: Vec::new(),
            ..config
        };
        store.save_reports(emptied.clone()).await.unwrap();
        assert_eq!(store.get_reports(1).await.unwrap(), Some(emptied));
    }

    #[tokio::test]
    async fn log_config_defaults_to_missing_until_saved() {
        let store = open_store().await;
        assert!(store.get_log_config(1).await.unwrap().is_none());

        store
            .save_log_config(LogConfig {
                guild_id: 1,
                color_logs: false,
            })
            .await
            .unwrap();
        assert_eq!(
            store.get_log_config(1).await.unwrap(),
            Some(LogConfig {
                guild_id: 1,
                color_logs: false
            })
        );
    }
}
