// Discord layer - commands, menu session, and error reporting.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod error_handler;
pub mod helpers;

use crate::core::settings::SettingsService;
use crate::infra::settings::SqliteSettingsStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state available to every command.
pub struct Data {
    pub settings: Arc<SettingsService<SqliteSettingsStore>>,
    /// Operator channel receiving unhandled-error traces, if configured.
    pub error_log_channel: Option<serenity::ChannelId>,
}
