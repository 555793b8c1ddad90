// Interactive settings menu.
//
// One `/settings` invocation drives one `MenuSession`: each screen renders
// an embed plus controls onto a single message, suspends until the invoking
// user clicks exactly once (or the collector times out), persists any
// resulting change, and hands the next state to the central transition
// table in `core::navigation`.

use crate::core::navigation::{transition, Menu, NavAction, NavContext, NavOutcome};
use crate::core::settings::{LogCategory, ModToggle};
use crate::discord::helpers;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

const MENU_TIMEOUT: Duration = Duration::from_secs(120);
const MENU_COLOR: serenity::Color = serenity::Color::BLURPLE;
const ERROR_COLOR: u32 = 0xFF0000;
/// Discord caps string selects at 25 options.
const SELECT_OPTION_LIMIT: usize = 25;
const DISABLE_VALUE: &str = "disable";

/// Adjust different settings of the bot via an interactive menu.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    required_bot_permissions = "SEND_MESSAGES | READ_MESSAGE_HISTORY"
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("settings must be invoked in a guild")?;

    let session = MenuSession {
        ctx,
        nav: NavContext::new(ctx.author().id.get(), guild_id.get()),
        message: None,
    };
    session.run().await
}

/// What a single user interaction asked a menu to do next.
enum StepOutcome {
    /// Hand the action to the transition table.
    Nav(NavAction),
    /// Re-render the same menu with freshly loaded state.
    Redraw,
}

/// Result of a channel/role ask flow.
enum AskOutcome<T> {
    Chosen(T),
    /// Free-text input did not resolve; the caller renders an error panel.
    NotFound,
    Timeout,
}

/// The single user input an ask flow can receive.
enum AskInput {
    Select(String),
    Text(serenity::Message),
    Timeout,
}

struct MenuSession<'a> {
    ctx: Context<'a>,
    nav: NavContext,
    message: Option<serenity::Message>,
}

impl MenuSession<'_> {
    async fn run(mut self) -> Result<(), Error> {
        let mut current = Menu::Main;
        loop {
            let outcome = match current {
                Menu::Main => self.main_step().await?,
                Menu::Moderation => self.moderation_step().await?,
                Menu::AutoModeration => self.automod_step().await?,
                Menu::Logging => self.logging_step().await?,
                Menu::Reports => self.reports_step().await?,
            };

            match outcome {
                StepOutcome::Redraw => {}
                StepOutcome::Nav(action) => {
                    match transition(current, action, self.nav.parent) {
                        NavOutcome::Continue(next) => current = next,
                        NavOutcome::Close => {
                            self.close().await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Render onto the session message, sending it on first use.
    async fn show(
        &mut self,
        embed: serenity::CreateEmbed,
        components: Vec<serenity::CreateActionRow>,
    ) -> Result<(), Error> {
        match &mut self.message {
            Some(message) => {
                let builder = serenity::EditMessage::new()
                    .embed(embed)
                    .components(components);
                helpers::maybe_edit(self.ctx, message, builder).await;
            }
            None => {
                let reply = self
                    .ctx
                    .send(
                        poise::CreateReply::default()
                            .embed(embed)
                            .components(components),
                    )
                    .await?;
                self.message = Some(reply.into_message().await?);
            }
        }
        Ok(())
    }

    /// Suspend until the invoking user clicks one control on the session
    /// message, or the menu times out.
    async fn await_component(&self) -> Option<serenity::ComponentInteraction> {
        let message_id = self.message.as_ref().map(|message| message.id)?;

        let interaction = serenity::ComponentInteractionCollector::new(self.ctx)
            .author_id(serenity::UserId::new(self.nav.user_id))
            .channel_id(self.ctx.channel_id())
            .timeout(MENU_TIMEOUT)
            .filter(move |mci| mci.message.id == message_id)
            .await?;

        // Acknowledge immediately so the upcoming edit doesn't race the
        // interaction token.
        if let Err(e) = interaction.defer(&self.ctx.http()).await {
            tracing::warn!("Failed to defer menu interaction: {e}");
        }
        Some(interaction)
    }

    async fn close(&mut self) {
        if let Some(message) = &self.message {
            helpers::maybe_delete(self.ctx, message).await;
        }
    }

    // ------------------------------------------------------------------
    // Screens
    // ------------------------------------------------------------------

    async fn main_step(&mut self) -> Result<StepOutcome, Error> {
        self.nav.parent = None;

        let embed = serenity::CreateEmbed::new()
            .title("Bot Configuration")
            .description(
                "**Welcome to settings!**\n\nHere you can configure various aspects of the bot, \
                 such as moderation settings, logging options, and user reports. Click one of \
                 the buttons below to get started!",
            )
            .color(MENU_COLOR);

        let components = vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new("nav:moderation")
                .label("Moderation")
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new("nav:automod")
                .label("Auto-Moderation")
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new("nav:logging")
                .label("Logging")
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new("nav:reports")
                .label("Reports")
                .style(serenity::ButtonStyle::Secondary),
            quit_button(),
        ])];

        self.show(embed, components).await?;

        let Some(interaction) = self.await_component().await else {
            return Ok(StepOutcome::Nav(NavAction::Timeout));
        };
        match parse_nav_custom_id(&interaction.data.custom_id) {
            Some(action) => Ok(StepOutcome::Nav(action)),
            None => Ok(StepOutcome::Redraw),
        }
    }

    async fn moderation_step(&mut self) -> Result<StepOutcome, Error> {
        self.nav.parent = Some(Menu::Main);
        let config = self.ctx.data().settings.mod_config(self.nav.guild_id).await?;

        let mut embed = serenity::CreateEmbed::new()
            .title("Moderation Settings")
            .description(
                "Below you can see the current moderation settings. To change any of them, \
                 press the corresponding button!",
            )
            .color(MENU_COLOR);
        let mut buttons = vec![back_button()];
        for toggle in ModToggle::ALL {
            let state = if config.get(toggle) { "Enabled" } else { "Disabled" };
            embed = embed.field(toggle.label(), state, true);
            buttons.push(
                serenity::CreateButton::new(format!("mod:{}", toggle.key()))
                    .label(toggle.label())
                    .style(serenity::ButtonStyle::Secondary),
            );
        }

        self.show(embed, vec![serenity::CreateActionRow::Buttons(buttons)])
            .await?;

        let Some(interaction) = self.await_component().await else {
            return Ok(StepOutcome::Nav(NavAction::Timeout));
        };
        let custom_id = interaction.data.custom_id.as_str();

        if let Some(action) = parse_nav_custom_id(custom_id) {
            return Ok(StepOutcome::Nav(action));
        }
        if let Some(toggle) = parse_mod_toggle_custom_id(custom_id) {
            self.ctx
                .data()
                .settings
                .toggle_mod_flag(self.nav.guild_id, toggle)
                .await?;
        }
        Ok(StepOutcome::Redraw)
    }

    async fn automod_step(&mut self) -> Result<StepOutcome, Error> {
        self.nav.parent = Some(Menu::Main);

        let embed = serenity::CreateEmbed::new()
            .title("Auto-Moderation Settings")
            .description("Auto-moderation configuration is not available yet. Check back later!")
            .color(MENU_COLOR);
        let components = vec![serenity::CreateActionRow::Buttons(vec![back_button()])];
        self.show(embed, components).await?;

        let Some(interaction) = self.await_component().await else {
            return Ok(StepOutcome::Nav(NavAction::Timeout));
        };
        match parse_nav_custom_id(&interaction.data.custom_id) {
            Some(action) => Ok(StepOutcome::Nav(action)),
            None => Ok(StepOutcome::Redraw),
        }
    }

    async fn logging_step(&mut self) -> Result<StepOutcome, Error> {
        self.nav.parent = Some(Menu::Main);
        let settings = &self.ctx.data().settings;
        let channels = settings.log_channels(self.nav.guild_id).await?;
        let color_logs = settings.log_config(self.nav.guild_id).await?.color_logs;

        let mut embed = serenity::CreateEmbed::new()
            .title("Logging Settings")
            .description(
                "Below you can see a list of logging events and the channels their logs are \
                 sent to. To change where an event should be logged, select it from the \
                 dropdown below.",
            )
            .color(MENU_COLOR);

        if bot_lacks_audit_log(&self.ctx) {
            embed = embed.field(
                "⚠️ Warning!",
                "The bot currently has no permission to view the audit logs! This will \
                 severely limit logging capabilities. Please consider enabling `View Audit \
                 Log` for the bot in your server's settings!",
                false,
            );
        }

        let mut options = Vec::new();
        for (category, channel_id) in &channels {
            let value = channel_id
                .map(|id| format!("<#{id}>"))
                .unwrap_or_else(|| "*Not set*".to_string());
            embed = embed.field(category.label(), value, true);
            options.push(serenity::CreateSelectMenuOption::new(
                category.label(),
                category.key(),
            ));
        }

        let components = vec![
            serenity::CreateActionRow::SelectMenu(
                serenity::CreateSelectMenu::new(
                    "log:category",
                    serenity::CreateSelectMenuKind::String { options },
                )
                .placeholder("Select a logging category..."),
            ),
            serenity::CreateActionRow::Buttons(vec![
                back_button(),
                boolean_button("log:color", "Color logs", color_logs, false),
            ]),
        ];

        self.show(embed, components).await?;

        let Some(interaction) = self.await_component().await else {
            return Ok(StepOutcome::Nav(NavAction::Timeout));
        };
        let custom_id = interaction.data.custom_id.clone();

        if let Some(action) = parse_nav_custom_id(&custom_id) {
            return Ok(StepOutcome::Nav(action));
        }
        if custom_id == "log:color" {
            settings
                .set_color_logs(self.nav.guild_id, !color_logs)
                .await?;
            return Ok(StepOutcome::Redraw);
        }

        let selected = select_value(&interaction);
        let Some(category) = selected.as_deref().and_then(LogCategory::from_key) else {
            return Ok(StepOutcome::Redraw);
        };

        let description = format!(
            "Please select a channel where the following event should be logged: `{}`",
            category.label()
        );
        match self.ask_channel("Logging Settings", description, true).await? {
            AskOutcome::Chosen(channel_id) => {
                self.ctx
                    .data()
                    .settings
                    .set_log_channel(self.nav.guild_id, category, channel_id)
                    .await?;
                Ok(StepOutcome::Redraw)
            }
            AskOutcome::NotFound => self.channel_not_found_panel(Menu::Logging).await,
            AskOutcome::Timeout => Ok(StepOutcome::Nav(NavAction::Timeout)),
        }
    }

    async fn reports_step(&mut self) -> Result<StepOutcome, Error> {
        self.nav.parent = Some(Menu::Main);
        let config = self.ctx.data().settings.reports(self.nav.guild_id).await?;

        let all_roles = guild_roles(&self.ctx);
        let pinged: Vec<(u64, String)> = all_roles
            .iter()
            .filter(|(id, _)| config.pinged_role_ids.contains(id))
            .cloned()
            .collect();
        let unadded: Vec<(u64, String)> = all_roles
            .iter()
            .filter(|(id, _)| !config.pinged_role_ids.contains(id))
            .cloned()
            .collect();

        let channel = config
            .channel_id
            .filter(|id| channel_exists(&self.ctx, *id));
        let enabled_shown = config.is_enabled && channel.is_some();

        let pinged_display = if pinged.is_empty() {
            "*None set*".to_string()
        } else {
            pinged
                .iter()
                .map(|(id, _)| format!("<@&{id}>"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let embed = serenity::CreateEmbed::new()
            .title("Reports Settings")
            .description(
                "Below you can see all settings for configuring the reporting of other users \
                 or messages. This allows other users to flag suspicious content for review.",
            )
            .color(MENU_COLOR)
            .field(
                "Channel",
                channel
                    .map(|id| format!("<#{id}>"))
                    .unwrap_or_else(|| "*Not set*".to_string()),
                true,
            )
            .field("Pinged Roles", pinged_display, true);

        let components = vec![serenity::CreateActionRow::Buttons(vec![
            back_button(),
            boolean_button("report:enabled", "Enabled", enabled_shown, channel.is_none()),
            serenity::CreateButton::new("report:set_channel")
                .label("Set Channel")
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new("report:add_role")
                .label("Add Role")
                .style(serenity::ButtonStyle::Secondary)
                .disabled(unadded.is_empty()),
            serenity::CreateButton::new("report:remove_role")
                .label("Remove Role")
                .style(serenity::ButtonStyle::Secondary)
                .disabled(pinged.is_empty()),
        ])];

        self.show(embed, components).await?;

        let Some(interaction) = self.await_component().await else {
            return Ok(StepOutcome::Nav(NavAction::Timeout));
        };
        let custom_id = interaction.data.custom_id.clone();

        if let Some(action) = parse_nav_custom_id(&custom_id) {
            return Ok(StepOutcome::Nav(action));
        }

        match custom_id.as_str() {
            "report:enabled" => {
                self.ctx
                    .data()
                    .settings
                    .set_reports_enabled(self.nav.guild_id, !enabled_shown)
                    .await?;
                Ok(StepOutcome::Redraw)
            }
            "report:set_channel" => {
                let description = "Please select a channel where reports will be sent.".to_string();
                match self.ask_channel("Reports Settings", description, false).await? {
                    AskOutcome::Chosen(Some(channel_id)) => {
                        self.ctx
                            .data()
                            .settings
                            .set_report_channel(self.nav.guild_id, channel_id)
                            .await?;
                        Ok(StepOutcome::Redraw)
                    }
                    AskOutcome::Chosen(None) | AskOutcome::NotFound => {
                        self.channel_not_found_panel(Menu::Reports).await
                    }
                    AskOutcome::Timeout => Ok(StepOutcome::Nav(NavAction::Timeout)),
                }
            }
            "report:add_role" => {
                let description = "Select a role to add to the list of roles that will be \
                                   mentioned when a new report is made."
                    .to_string();
                match self.ask_role("Reports Settings", description, &unadded).await? {
                    AskOutcome::Chosen(role_id) => {
                        self.ctx
                            .data()
                            .settings
                            .add_report_role(self.nav.guild_id, role_id)
                            .await?;
                        Ok(StepOutcome::Redraw)
                    }
                    AskOutcome::NotFound => {
                        self.error_panel(
                            "❌ Role not found.",
                            "Unable to locate role. Please type a role mention or ID.",
                            Menu::Reports,
                        )
                        .await
                    }
                    AskOutcome::Timeout => Ok(StepOutcome::Nav(NavAction::Timeout)),
                }
            }
            "report:remove_role" => {
                let description = "Remove a role from the list of roles that is mentioned \
                                   when a new report is made."
                    .to_string();
                match self.ask_role("Reports Settings", description, &pinged).await? {
                    AskOutcome::Chosen(role_id) => {
                        let removed = self
                            .ctx
                            .data()
                            .settings
                            .remove_report_role(self.nav.guild_id, role_id)
                            .await?;
                        if removed.is_some() {
                            Ok(StepOutcome::Redraw)
                        } else {
                            self.error_panel(
                                "❌ Role not found.",
                                "Unable to locate role, or it is not a pinged role.",
                                Menu::Reports,
                            )
                            .await
                        }
                    }
                    AskOutcome::NotFound => {
                        self.error_panel(
                            "❌ Role not found.",
                            "Unable to locate role, or it is not a pinged role.",
                            Menu::Reports,
                        )
                        .await
                    }
                    AskOutcome::Timeout => Ok(StepOutcome::Nav(NavAction::Timeout)),
                }
            }
            _ => Ok(StepOutcome::Redraw),
        }
    }

    // ------------------------------------------------------------------
    // Ask flows and the error panel
    // ------------------------------------------------------------------

    /// Offer a channel via select menu while also accepting a typed channel
    /// mention or ID. Returns `Chosen(None)` for the Disable option.
    async fn ask_channel(
        &mut self,
        title: &str,
        description: String,
        include_disable: bool,
    ) -> Result<AskOutcome<Option<u64>>, Error> {
        let mut options = Vec::new();
        if include_disable {
            options.push(
                serenity::CreateSelectMenuOption::new("Disable", DISABLE_VALUE)
                    .description("Stop logging this event."),
            );
        }
        for (id, name) in guild_text_channels(&self.ctx)
            .into_iter()
            .take(SELECT_OPTION_LIMIT - options.len())
        {
            options.push(serenity::CreateSelectMenuOption::new(
                format!("#{name}"),
                id.to_string(),
            ));
        }

        let embed = serenity::CreateEmbed::new()
            .title(title.to_string())
            .description(description)
            .color(MENU_COLOR);
        let components = vec![serenity::CreateActionRow::SelectMenu(
            serenity::CreateSelectMenu::new(
                "ask:select",
                serenity::CreateSelectMenuKind::String { options },
            )
            .placeholder("Select a channel..."),
        )];
        self.show(embed, components).await?;

        match self.await_selection_or_text().await {
            AskInput::Select(value) if value == DISABLE_VALUE => Ok(AskOutcome::Chosen(None)),
            AskInput::Select(value) => match value.parse::<u64>() {
                Ok(id) => Ok(AskOutcome::Chosen(Some(id))),
                Err(_) => Ok(AskOutcome::NotFound),
            },
            AskInput::Text(message) => {
                helpers::maybe_delete(self.ctx, &message).await;
                match helpers::parse_channel_id(&message.content)
                    .filter(|id| channel_exists(&self.ctx, *id))
                {
                    Some(id) => Ok(AskOutcome::Chosen(Some(id))),
                    None => Ok(AskOutcome::NotFound),
                }
            }
            AskInput::Timeout => Ok(AskOutcome::Timeout),
        }
    }

    /// Offer the given roles via select menu while also accepting a typed
    /// role mention or ID (which may resolve to any role in the guild).
    async fn ask_role(
        &mut self,
        title: &str,
        description: String,
        roles: &[(u64, String)],
    ) -> Result<AskOutcome<u64>, Error> {
        let options: Vec<_> = roles
            .iter()
            .take(SELECT_OPTION_LIMIT)
            .map(|(id, name)| serenity::CreateSelectMenuOption::new(name.clone(), id.to_string()))
            .collect();

        let embed = serenity::CreateEmbed::new()
            .title(title.to_string())
            .description(description)
            .color(MENU_COLOR);
        let components = vec![serenity::CreateActionRow::SelectMenu(
            serenity::CreateSelectMenu::new(
                "ask:select",
                serenity::CreateSelectMenuKind::String { options },
            )
            .placeholder("Select a role..."),
        )];
        self.show(embed, components).await?;

        match self.await_selection_or_text().await {
            AskInput::Select(value) => match value.parse::<u64>() {
                Ok(id) => Ok(AskOutcome::Chosen(id)),
                Err(_) => Ok(AskOutcome::NotFound),
            },
            AskInput::Text(message) => {
                helpers::maybe_delete(self.ctx, &message).await;
                match helpers::parse_role_id(&message.content)
                    .filter(|id| role_exists(&self.ctx, *id))
                {
                    Some(id) => Ok(AskOutcome::Chosen(id)),
                    None => Ok(AskOutcome::NotFound),
                }
            }
            AskInput::Timeout => Ok(AskOutcome::Timeout),
        }
    }

    /// Wait for either a select interaction on the session message or a
    /// typed message from the invoker, whichever comes first.
    async fn await_selection_or_text(&self) -> AskInput {
        let Some(message_id) = self.message.as_ref().map(|message| message.id) else {
            return AskInput::Timeout;
        };
        let author_id = serenity::UserId::new(self.nav.user_id);
        let channel_id = self.ctx.channel_id();

        let component = serenity::ComponentInteractionCollector::new(self.ctx)
            .author_id(author_id)
            .channel_id(channel_id)
            .timeout(MENU_TIMEOUT)
            .filter(move |mci| mci.message.id == message_id);
        let typed = serenity::MessageCollector::new(self.ctx)
            .author_id(author_id)
            .channel_id(channel_id)
            .timeout(MENU_TIMEOUT);

        tokio::select! {
            interaction = async { component.await } => {
                let Some(interaction) = interaction else {
                    return AskInput::Timeout;
                };
                if let Err(e) = interaction.defer(&self.ctx.http()).await {
                    tracing::warn!("Failed to defer ask interaction: {e}");
                }
                match select_value(&interaction) {
                    Some(value) => AskInput::Select(value),
                    None => AskInput::Timeout,
                }
            }
            message = async { typed.await } => {
                match message {
                    Some(message) => AskInput::Text(message),
                    None => AskInput::Timeout,
                }
            }
        }
    }

    async fn channel_not_found_panel(&mut self, return_to: Menu) -> Result<StepOutcome, Error> {
        self.error_panel(
            "❌ Channel not found.",
            "Unable to locate channel. Please type a channel mention or ID.",
            return_to,
        )
        .await
    }

    /// Render an error embed with a single Back control wired to
    /// `return_to`, and wait for it.
    async fn error_panel(
        &mut self,
        title: &str,
        description: &str,
        return_to: Menu,
    ) -> Result<StepOutcome, Error> {
        self.nav.parent = Some(return_to);

        let embed = serenity::CreateEmbed::new()
            .title(title.to_string())
            .description(description.to_string())
            .color(ERROR_COLOR);
        let components = vec![serenity::CreateActionRow::Buttons(vec![back_button()])];
        self.show(embed, components).await?;

        match self.await_component().await {
            Some(_) => Ok(StepOutcome::Nav(NavAction::Back)),
            None => Ok(StepOutcome::Nav(NavAction::Timeout)),
        }
    }
}

// ----------------------------------------------------------------------
// Controls and custom id parsing
// ----------------------------------------------------------------------

fn back_button() -> serenity::CreateButton {
    serenity::CreateButton::new("back")
        .label("Back")
        .style(serenity::ButtonStyle::Primary)
        .emoji('⬅')
}

fn quit_button() -> serenity::CreateButton {
    serenity::CreateButton::new("quit")
        .label("Quit")
        .style(serenity::ButtonStyle::Danger)
}

/// Toggle button whose look tracks the stored boolean.
fn boolean_button(
    custom_id: &str,
    label: &str,
    state: bool,
    disabled: bool,
) -> serenity::CreateButton {
    let (style, emoji) = if state {
        (serenity::ButtonStyle::Success, '✔')
    } else {
        (serenity::ButtonStyle::Danger, '✖')
    };
    serenity::CreateButton::new(custom_id)
        .label(label)
        .style(style)
        .emoji(emoji)
        .disabled(disabled)
}

/// Navigation custom ids shared by every screen.
fn parse_nav_custom_id(custom_id: &str) -> Option<NavAction> {
    match custom_id {
        "nav:moderation" => Some(NavAction::Open(Menu::Moderation)),
        "nav:automod" => Some(NavAction::Open(Menu::AutoModeration)),
        "nav:logging" => Some(NavAction::Open(Menu::Logging)),
        "nav:reports" => Some(NavAction::Open(Menu::Reports)),
        "back" => Some(NavAction::Back),
        "quit" => Some(NavAction::Quit),
        _ => None,
    }
}

fn parse_mod_toggle_custom_id(custom_id: &str) -> Option<ModToggle> {
    custom_id
        .strip_prefix("mod:")
        .and_then(ModToggle::from_key)
}

fn select_value(interaction: &serenity::ComponentInteraction) -> Option<String> {
    match &interaction.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

// ----------------------------------------------------------------------
// Guild cache lookups (owned snapshots, guards never cross an await)
// ----------------------------------------------------------------------

fn guild_text_channels(ctx: &Context<'_>) -> Vec<(u64, String)> {
    let Some(guild) = ctx.guild() else {
        return Vec::new();
    };

    let mut channels: Vec<(u16, u64, String)> = guild
        .channels
        .values()
        .filter(|channel| channel.kind == serenity::ChannelType::Text)
        .map(|channel| (channel.position, channel.id.get(), channel.name.clone()))
        .collect();
    channels.sort();
    channels.into_iter().map(|(_, id, name)| (id, name)).collect()
}

/// Guild roles without @everyone, highest first.
fn guild_roles(ctx: &Context<'_>) -> Vec<(u64, String)> {
    let Some(guild) = ctx.guild() else {
        return Vec::new();
    };

    let everyone = guild.id.get();
    let mut roles: Vec<(u16, u64, String)> = guild
        .roles
        .values()
        .filter(|role| role.id.get() != everyone)
        .map(|role| (role.position, role.id.get(), role.name.clone()))
        .collect();
    roles.sort();
    roles.reverse();
    roles.into_iter().map(|(_, id, name)| (id, name)).collect()
}

fn channel_exists(ctx: &Context<'_>, channel_id: u64) -> bool {
    let Some(guild) = ctx.guild() else {
        return false;
    };
    guild
        .channels
        .get(&serenity::ChannelId::new(channel_id))
        .map(|channel| channel.kind == serenity::ChannelType::Text)
        .unwrap_or(false)
}

fn role_exists(ctx: &Context<'_>, role_id: u64) -> bool {
    let Some(guild) = ctx.guild() else {
        return false;
    };
    guild.roles.contains_key(&serenity::RoleId::new(role_id))
}

fn bot_lacks_audit_log(ctx: &Context<'_>) -> bool {
    let bot_id = ctx.serenity_context().cache.current_user().id;
    let Some(guild) = ctx.guild() else {
        return false;
    };
    let Some(me) = guild.members.get(&bot_id) else {
        return false;
    };
    !guild
        .member_permissions(me)
        .contains(serenity::Permissions::VIEW_AUDIT_LOG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_custom_ids_map_to_their_menus() {
        assert_eq!(
            parse_nav_custom_id("nav:moderation"),
            Some(NavAction::Open(Menu::Moderation))
        );
        assert_eq!(
            parse_nav_custom_id("nav:logging"),
            Some(NavAction::Open(Menu::Logging))
        );
        assert_eq!(parse_nav_custom_id("back"), Some(NavAction::Back));
        assert_eq!(parse_nav_custom_id("quit"), Some(NavAction::Quit));
        assert_eq!(parse_nav_custom_id("mod:clean_up_commands"), None);
    }

    #[test]
    fn mod_toggle_custom_ids_round_trip() {
        for toggle in ModToggle::ALL {
            let custom_id = format!("mod:{}", toggle.key());
            assert_eq!(parse_mod_toggle_custom_id(&custom_id), Some(toggle));
        }
        assert_eq!(parse_mod_toggle_custom_id("mod:unknown"), None);
        assert_eq!(parse_mod_toggle_custom_id("log:color"), None);
    }
}
