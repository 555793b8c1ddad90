// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (database)
// - `discord/` = Discord-specific adapters (commands, error reporting)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and the error handler

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::settings::SettingsService;
use crate::discord::{error_handler, Data};
use crate::infra::settings::SqliteSettingsStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory for SQLite files");
    let settings_db_path = format!("{}/settings.db", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", settings_db_path))
        .await
        .expect("Failed to connect to settings DB");
    let store = SqliteSettingsStore::new(pool);
    store
        .migrate()
        .await
        .expect("Failed to migrate settings DB");
    let settings_service = Arc::new(SettingsService::new(store));

    // Operator channel for unhandled-error traces. Optional: without it,
    // unhandled errors are only logged locally.
    let error_log_channel = std::env::var("ERROR_LOG_CHANNEL_ID")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|id| *id != 0)
        .map(serenity::ChannelId::new);
    if error_log_channel.is_none() {
        tracing::warn!("ERROR_LOG_CHANNEL_ID not set, unhandled errors stay in the local log");
    }

    // Create the data structure that will be shared across all commands
    let data = Data {
        settings: Arc::clone(&settings_service),
        error_log_channel,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read typed menu input
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::settings::settings()],
            // Route every framework error through the reporter
            on_error: |error| Box::pin(error_handler::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take up to an hour to propagate)
                // For faster development, use register_in_guild instead.
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered, bot is ready");
                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
