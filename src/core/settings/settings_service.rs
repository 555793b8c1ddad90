// Settings service - core business logic for guild configuration.
//
// Reads go through a per-table, per-guild cache; every write is an upsert
// through the storage port followed by a cache invalidation scoped to the
// affected (table, guild) pair, so the next read within a session observes
// the new row.
//
// NO Discord dependencies here - just pure domain logic.

use super::settings_models::{LogCategory, LogConfig, ModConfig, ModToggle, ReportsConfig};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("storage error: {0}")]
    Storage(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Per-category channel routing for one guild. A `None` channel means the
/// category is not logged.
pub type LogChannels = BTreeMap<LogCategory, Option<u64>>;

/// Trait for persisting per-guild configuration rows.
///
/// Implementations upsert whole rows keyed by guild id; a `None` return
/// from a getter means the guild has never saved that table.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_mod_config(&self, guild_id: u64) -> Result<Option<ModConfig>, SettingsError>;
    async fn save_mod_config(&self, config: ModConfig) -> Result<(), SettingsError>;

    async fn get_log_config(&self, guild_id: u64) -> Result<Option<LogConfig>, SettingsError>;
    async fn save_log_config(&self, config: LogConfig) -> Result<(), SettingsError>;

    async fn get_log_channels(&self, guild_id: u64) -> Result<LogChannels, SettingsError>;
    async fn set_log_channel(
        &self,
        guild_id: u64,
        category: LogCategory,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError>;

    async fn get_reports(&self, guild_id: u64) -> Result<Option<ReportsConfig>, SettingsError>;
    async fn save_reports(&self, config: ReportsConfig) -> Result<(), SettingsError>;
}

// ============================================================================
// SERVICE
// ============================================================================

/// Which configuration table a cached row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTable {
    ModConfig,
    LogConfig,
    LogChannels,
    Reports,
}

pub struct SettingsService<S: SettingsStore> {
    store: S,
    // Guild ID -> cached row, one map per table so invalidation stays scoped.
    mod_cache: DashMap<u64, ModConfig>,
    log_cache: DashMap<u64, LogConfig>,
    log_channel_cache: DashMap<u64, LogChannels>,
    reports_cache: DashMap<u64, ReportsConfig>,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            mod_cache: DashMap::new(),
            log_cache: DashMap::new(),
            log_channel_cache: DashMap::new(),
            reports_cache: DashMap::new(),
        }
    }

    /// Drop the cached row for one (table, guild) pair. The next read for
    /// that pair goes back to the store.
    pub fn invalidate(&self, table: ConfigTable, guild_id: u64) {
        match table {
            ConfigTable::ModConfig => {
                self.mod_cache.remove(&guild_id);
            }
            ConfigTable::LogConfig => {
                self.log_cache.remove(&guild_id);
            }
            ConfigTable::LogChannels => {
                self.log_channel_cache.remove(&guild_id);
            }
            ConfigTable::Reports => {
                self.reports_cache.remove(&guild_id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Moderation flags
    // ------------------------------------------------------------------

    pub async fn mod_config(&self, guild_id: u64) -> Result<ModConfig, SettingsError> {
        if let Some(config) = self.mod_cache.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = self
            .store
            .get_mod_config(guild_id)
            .await?
            .unwrap_or_else(|| ModConfig::defaults(guild_id));
        self.mod_cache.insert(guild_id, config.clone());
        Ok(config)
    }

    /// Flip one moderation flag and persist the row.
    pub async fn toggle_mod_flag(
        &self,
        guild_id: u64,
        toggle: ModToggle,
    ) -> Result<ModConfig, SettingsError> {
        let mut config = self.mod_config(guild_id).await?;
        config.toggle(toggle);
        self.store.save_mod_config(config.clone()).await?;
        self.invalidate(ConfigTable::ModConfig, guild_id);
        Ok(config)
    }

    // ------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------

    pub async fn log_config(&self, guild_id: u64) -> Result<LogConfig, SettingsError> {
        if let Some(config) = self.log_cache.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = self
            .store
            .get_log_config(guild_id)
            .await?
            .unwrap_or_else(|| LogConfig::defaults(guild_id));
        self.log_cache.insert(guild_id, config.clone());
        Ok(config)
    }

    pub async fn set_color_logs(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<LogConfig, SettingsError> {
        let mut config = self.log_config(guild_id).await?;
        config.color_logs = enabled;
        self.store.save_log_config(config.clone()).await?;
        self.invalidate(ConfigTable::LogConfig, guild_id);
        Ok(config)
    }

    /// Channel routing for every category. Categories without a stored row
    /// come back as `None`, so callers can render the full list.
    pub async fn log_channels(&self, guild_id: u64) -> Result<LogChannels, SettingsError> {
        if let Some(channels) = self.log_channel_cache.get(&guild_id) {
            return Ok(channels.clone());
        }

        let mut channels = self.store.get_log_channels(guild_id).await?;
        for category in LogCategory::ALL {
            channels.entry(category).or_insert(None);
        }
        self.log_channel_cache.insert(guild_id, channels.clone());
        Ok(channels)
    }

    pub async fn set_log_channel(
        &self,
        guild_id: u64,
        category: LogCategory,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError> {
        self.store
            .set_log_channel(guild_id, category, channel_id)
            .await?;
        self.invalidate(ConfigTable::LogChannels, guild_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub async fn reports(&self, guild_id: u64) -> Result<ReportsConfig, SettingsError> {
        if let Some(config) = self.reports_cache.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = self
            .store
            .get_reports(guild_id)
            .await?
            .unwrap_or_else(|| ReportsConfig::defaults(guild_id));
        self.reports_cache.insert(guild_id, config.clone());
        Ok(config)
    }

    pub async fn set_reports_enabled(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<ReportsConfig, SettingsError> {
        let mut config = self.reports(guild_id).await?;
        config.is_enabled = enabled;
        self.save_reports(config).await
    }

    pub async fn set_report_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<ReportsConfig, SettingsError> {
        let mut config = self.reports(guild_id).await?;
        config.channel_id = Some(channel_id);
        self.save_reports(config).await
    }

    pub async fn add_report_role(
        &self,
        guild_id: u64,
        role_id: u64,
    ) -> Result<ReportsConfig, SettingsError> {
        let mut config = self.reports(guild_id).await?;
        if !config.pinged_role_ids.contains(&role_id) {
            config.pinged_role_ids.push(role_id);
        }
        self.save_reports(config).await
    }

    /// Remove a pinged role. Returns `None` without writing when the role
    /// was not on the list.
    pub async fn remove_report_role(
        &self,
        guild_id: u64,
        role_id: u64,
    ) -> Result<Option<ReportsConfig>, SettingsError> {
        let mut config = self.reports(guild_id).await?;
        if !config.pinged_role_ids.contains(&role_id) {
            return Ok(None);
        }

        config.pinged_role_ids.retain(|id| *id != role_id);
        self.save_reports(config).await.map(Some)
    }

    async fn save_reports(&self, config: ReportsConfig) -> Result<ReportsConfig, SettingsError> {
        self.store.save_reports(config.clone()).await?;
        self.invalidate(ConfigTable::Reports, config.guild_id);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store for testing.
    #[derive(Default)]
    struct MockSettingsStore {
        mod_configs: DashMap<u64, ModConfig>,
        log_configs: DashMap<u64, LogConfig>,
        log_channels: DashMap<(u64, LogCategory), Option<u64>>,
        reports: DashMap<u64, ReportsConfig>,
        saves: AtomicUsize,
    }

    impl MockSettingsStore {
        fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn get_mod_config(&self, guild_id: u64) -> Result<Option<ModConfig>, SettingsError> {
            Ok(self.mod_configs.get(&guild_id).map(|c| c.clone()))
        }

        async fn save_mod_config(&self, config: ModConfig) -> Result<(), SettingsError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.mod_configs.insert(config.guild_id, config);
            Ok(())
        }

        async fn get_log_config(&self, guild_id: u64) -> Result<Option<LogConfig>, SettingsError> {
            Ok(self.log_configs.get(&guild_id).map(|c| c.clone()))
        }

        async fn save_log_config(&self, config: LogConfig) -> Result<(), SettingsError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.log_configs.insert(config.guild_id, config);
            Ok(())
        }

        async fn get_log_channels(&self, guild_id: u64) -> Result<LogChannels, SettingsError> {
            Ok(self
                .log_channels
                .iter()
                .filter(|entry| entry.key().0 == guild_id)
                .map(|entry| (entry.key().1, *entry.value()))
                .collect())
        }

        async fn set_log_channel(
            &self,
            guild_id: u64,
            category: LogCategory,
            channel_id: Option<u64>,
        ) -> Result<(), SettingsError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.log_channels.insert((guild_id, category), channel_id);
            Ok(())
        }

        async fn get_reports(&self, guild_id: u64) -> Result<Option<ReportsConfig>, SettingsError> {
            Ok(self.reports.get(&guild_id).map(|c| c.clone()))
        }

        async fn save_reports(&self, config: ReportsConfig) -> Result<(), SettingsError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.reports.insert(config.guild_id, config);
            Ok(())
        }
    }

    fn service() -> SettingsService<MockSettingsStore> {
        SettingsService::new(MockSettingsStore::default())
    }

    #[tokio::test]
    async fn missing_rows_come_back_as_defaults() {
        let service = service();

        assert_eq!(service.mod_config(1).await.unwrap(), ModConfig::defaults(1));
        assert_eq!(service.reports(1).await.unwrap(), ReportsConfig::defaults(1));

        let channels = service.log_channels(1).await.unwrap();
        assert_eq!(channels.len(), LogCategory::ALL.len());
        assert!(channels.values().all(|channel| channel.is_none()));
    }

    #[tokio::test]
    async fn toggle_writes_once_and_next_read_reflects_it() {
        let service = service();

        let updated = service
            .toggle_mod_flag(1, ModToggle::UseEphemeralResponses)
            .await
            .unwrap();
        assert!(updated.use_ephemeral_responses);
        assert_eq!(service.store.save_count(), 1);

        // Read-after-write within the same session.
        let reread = service.mod_config(1).await.unwrap();
        assert!(reread.use_ephemeral_responses);
        assert_eq!(service.store.save_count(), 1);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_table_and_guild() {
        let service = service();

        // Prime both caches.
        service.mod_config(1).await.unwrap();
        service.log_config(1).await.unwrap();

        // Change both rows behind the cache's back.
        let mut external_mod = ModConfig::defaults(1);
        external_mod.clean_up_commands = true;
        service.store.mod_configs.insert(1, external_mod);
        service
            .store
            .log_configs
            .insert(1, LogConfig { guild_id: 1, color_logs: false });

        service.invalidate(ConfigTable::ModConfig, 1);

        // The invalidated table re-reads the store, the untouched one is
        // still served from cache.
        assert!(service.mod_config(1).await.unwrap().clean_up_commands);
        assert!(service.log_config(1).await.unwrap().color_logs);
    }

    #[tokio::test]
    async fn set_log_channel_is_visible_on_next_read() {
        let service = service();
        service.log_channels(1).await.unwrap();

        service
            .set_log_channel(1, LogCategory::MessageDelete, Some(42))
            .await
            .unwrap();

        let channels = service.log_channels(1).await.unwrap();
        assert_eq!(channels[&LogCategory::MessageDelete], Some(42));
        assert_eq!(channels[&LogCategory::MessageEdit], None);
    }

    #[tokio::test]
    async fn report_roles_add_is_idempotent() {
        let service = service();

        service.add_report_role(1, 7).await.unwrap();
        let config = service.add_report_role(1, 7).await.unwrap();
        assert_eq!(config.pinged_role_ids, vec![7]);
    }

    #[tokio::test]
    async fn removing_an_unpinged_role_does_not_write() {
        let service = service();
        service.add_report_role(1, 7).await.unwrap();
        let saves_before = service.store.save_count();

        let outcome = service.remove_report_role(1, 99).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(service.store.save_count(), saves_before);

        let removed = service.remove_report_role(1, 7).await.unwrap().unwrap();
        assert!(removed.pinged_role_ids.is_empty());
    }

    #[tokio::test]
    async fn enabling_reports_keeps_channel_and_roles() {
        let service = service();
        service.set_report_channel(1, 555).await.unwrap();
        service.add_report_role(1, 7).await.unwrap();

        let config = service.set_reports_enabled(1, true).await.unwrap();
        assert!(config.is_enabled);
        assert_eq!(config.channel_id, Some(555));
        assert_eq!(config.pinged_role_ids, vec![7]);
    }
}
