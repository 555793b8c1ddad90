// Command and listener error reporting.
//
// Known error categories get a tailored ephemeral embed and are never
// forwarded anywhere. Anything unmatched is logged with its full chain and
// forwarded best-effort to the operator log channel, then acknowledged to
// the user with a generic apology.

use crate::discord::helpers::{self, RoleHierarchyError};
use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;

const ERROR_COLOR: u32 = 0xFF0000;
/// Discord message length ceiling for one trace page.
const TRACE_PAGE_CHARS: usize = 2000;

/// Cause classification for errors raised inside a command body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    Timeout,
    DiscordServerError,
    Forbidden,
    RoleHierarchy,
    Unhandled,
}

pub fn classify_command_error(error: &Error) -> CommandErrorKind {
    if error.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
        return CommandErrorKind::Timeout;
    }
    if error.downcast_ref::<RoleHierarchyError>().is_some() {
        return CommandErrorKind::RoleHierarchy;
    }
    if let Some(serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))) =
        error.downcast_ref::<serenity::Error>()
    {
        if response.status_code.is_server_error() {
            return CommandErrorKind::DiscordServerError;
        }
        if response.status_code.as_u16() == 403 {
            return CommandErrorKind::Forbidden;
        }
    }
    CommandErrorKind::Unhandled
}

/// Only the unhandled category ever reaches the operator log channel.
pub fn forwarded_to_operators(kind: CommandErrorKind) -> bool {
    matches!(kind, CommandErrorKind::Unhandled)
}

/// Title and description shown for the recognized command error categories.
/// `None` means the error falls through to the unhandled path.
pub fn known_error_message(kind: CommandErrorKind, error: &Error) -> Option<(&'static str, String)> {
    match kind {
        CommandErrorKind::Timeout => {
            Some(("❌ Action timed out", "This command timed out.".to_string()))
        }
        CommandErrorKind::DiscordServerError => Some((
            "❌ Discord Server Error",
            "This action has failed due to an issue with Discord's servers. Please try again in a few moments."
                .to_string(),
        )),
        CommandErrorKind::Forbidden => Some((
            "❌ Forbidden",
            format!("This action has failed due to a lack of permissions.\n**Error:** {error}"),
        )),
        CommandErrorKind::RoleHierarchy => Some((
            "❌ Role Hierarchy Error",
            "This action failed due to trying to modify a user with a role higher than the bot's highest role."
                .to_string(),
        )),
        CommandErrorKind::Unhandled => None,
    }
}

/// Render an error and its `source()` chain, one cause per line.
pub fn render_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    rendered
}

/// Split a trace into code-fenced pages that each fit in one Discord
/// message. Oversized single lines are hard-split.
pub fn paginate_trace(header: &str, trace: &str, max_chars: usize) -> Vec<String> {
    let fence_overhead = "```\n\n```".chars().count();
    let budget = max_chars.saturating_sub(fence_overhead).max(1);

    let mut wrapped: Vec<String> = Vec::new();
    for line in std::iter::once(header).chain(trace.lines()) {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= budget {
            wrapped.push(line.to_string());
        } else {
            for chunk in chars.chunks(budget) {
                wrapped.push(chunk.iter().collect());
            }
        }
    }

    let mut pages: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    for line in wrapped {
        let line_chars = line.chars().count();
        if current_chars > 0 && current_chars + 1 + line_chars > budget {
            pages.push(current);
            current = String::new();
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(&line);
        current_chars += line_chars;
    }
    if !current.is_empty() {
        pages.push(current);
    }

    pages
        .into_iter()
        .map(|page| format!("```\n{page}\n```"))
        .collect()
}

/// Send a paginated trace to the operator log channel. Fire-and-forget: a
/// missing channel skips the send entirely, a failed send is logged and
/// swallowed.
pub async fn forward_trace(
    http: &serenity::Http,
    channel: Option<serenity::ChannelId>,
    header: &str,
    trace: &str,
) {
    let Some(channel) = channel else {
        return;
    };

    for page in paginate_trace(header, trace, TRACE_PAGE_CHARS) {
        if let Err(e) = channel
            .send_message(http, serenity::CreateMessage::new().content(page))
            .await
        {
            tracing::error!("Failed sending trace to error log channel: {e}");
        }
    }
}

fn error_embed(title: &str, description: String) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ERROR_COLOR)
}

async fn respond_ephemeral(ctx: Context<'_>, embed: serenity::CreateEmbed) {
    if let Err(e) = ctx
        .send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await
    {
        tracing::warn!("Failed to send error response: {e}");
    }
}

async fn handle_command_error(ctx: Context<'_>, error: Error) {
    let kind = classify_command_error(&error);

    if !forwarded_to_operators(kind) {
        if let Some((title, description)) = known_error_message(kind, &error) {
            respond_ephemeral(ctx, error_embed(title, description)).await;
        }
        return;
    }

    let command = ctx.command().qualified_name.clone();
    let trace = render_error_chain(error.as_ref());
    tracing::error!("Ignoring exception in command {command}: {trace}");

    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| "unknown guild".to_string());
    let guild_id = ctx.guild_id().map(|id| id.get()).unwrap_or_default();
    let header = format!(
        "Error in '{}' ({}) during command '{}' executed by user '{}' ({})",
        guild_name,
        guild_id,
        command,
        ctx.author().name,
        ctx.author().id
    );
    forward_trace(ctx.http(), ctx.data().error_log_channel, &header, &trace).await;

    let embed = error_embed(
        "❌ Unhandled exception",
        format!(
            "An error happened that should not have happened. Please contact the operators with a screenshot of this message!\n**Error:** ```{error}```"
        ),
    )
    .footer(serenity::CreateEmbedFooter::new(format!("Guild: {guild_id}")));
    respond_ephemeral(ctx, embed).await;
}

/// Framework-wide error hook, installed in `FrameworkOptions::on_error`.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let perms = missing_permissions
                .map(helpers::format_permissions)
                .unwrap_or_else(|| "the required".to_string());
            let embed = error_embed(
                "❌ Missing Permissions",
                format!("You require `{perms}` permissions to execute this command."),
            );
            respond_ephemeral(ctx, embed).await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let embed = error_embed(
                "❌ Bot Missing Permissions",
                format!(
                    "The bot requires `{}` permissions to execute this command.",
                    helpers::format_permissions(missing_permissions)
                ),
            );
            respond_ephemeral(ctx, embed).await;
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let embed = error_embed(
                "🕘 Cooldown Pending",
                format!(
                    "Please retry in: `{}`",
                    helpers::format_duration(remaining_cooldown)
                ),
            );
            respond_ephemeral(ctx, embed).await;
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            handle_command_error(ctx, error).await;
        }
        poise::FrameworkError::EventHandler {
            error, ctx, event, ..
        } => {
            let dyn_error: &dyn std::error::Error = error.as_ref();
            let trace = render_error_chain(dyn_error);
            let header = format!(
                "Ignoring exception in listener for {}:",
                event.snake_case_name()
            );
            tracing::error!("{header} {trace}");

            // Listener errors carry no command context, so the operator
            // channel is read from the environment at the point of use.
            let channel = std::env::var("ERROR_LOG_CHANNEL_ID")
                .ok()
                .and_then(|raw| raw.parse::<u64>().ok())
                .filter(|id| *id != 0)
                .map(serenity::ChannelId::new);
            forward_trace(&ctx.http, channel, &header, &trace).await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error as ThisError;

    #[derive(Debug, ThisError)]
    #[error("query failed")]
    struct QueryFailed(#[source] Underlying);

    #[derive(Debug, ThisError)]
    #[error("connection reset")]
    struct Underlying;

    fn boxed<E: std::error::Error + Send + Sync + 'static>(error: E) -> Error {
        Box::new(error)
    }

    #[tokio::test]
    async fn elapsed_classifies_as_timeout() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(0),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert_eq!(
            classify_command_error(&boxed(elapsed)),
            CommandErrorKind::Timeout
        );
    }

    #[test]
    fn role_hierarchy_and_unknown_errors_classify() {
        assert_eq!(
            classify_command_error(&boxed(RoleHierarchyError)),
            CommandErrorKind::RoleHierarchy
        );

        let unknown: Error = "database exploded".into();
        assert_eq!(classify_command_error(&unknown), CommandErrorKind::Unhandled);
    }

    #[test]
    fn only_the_unhandled_category_reaches_operators() {
        for kind in [
            CommandErrorKind::Timeout,
            CommandErrorKind::DiscordServerError,
            CommandErrorKind::Forbidden,
            CommandErrorKind::RoleHierarchy,
        ] {
            assert!(!forwarded_to_operators(kind));
        }
        assert!(forwarded_to_operators(CommandErrorKind::Unhandled));
    }

    #[test]
    fn every_known_category_has_its_own_message() {
        let probe: Error = "probe".into();
        let titles: Vec<&str> = [
            CommandErrorKind::Timeout,
            CommandErrorKind::DiscordServerError,
            CommandErrorKind::Forbidden,
            CommandErrorKind::RoleHierarchy,
        ]
        .into_iter()
        .map(|kind| known_error_message(kind, &probe).unwrap().0)
        .collect();

        let mut deduped = titles.clone();
        deduped.dedup();
        assert_eq!(titles, deduped);
        assert!(known_error_message(CommandErrorKind::Unhandled, &probe).is_none());
    }

    #[test]
    fn error_chain_renders_every_cause() {
        let rendered = render_error_chain(&QueryFailed(Underlying));
        assert_eq!(rendered, "query failed\nCaused by: connection reset");
    }

    #[test]
    fn trace_pages_stay_within_the_limit() {
        let trace: String = (0..200)
            .map(|i| format!("frame {i}: something went wrong somewhere deep\n"))
            .collect();
        let pages = paginate_trace("header line", &trace, 500);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.chars().count() <= 500);
            assert!(page.starts_with("```\n"));
            assert!(page.ends_with("\n```"));
        }
        assert!(pages[0].contains("header line"));
        let joined = pages.join("");
        assert!(joined.contains("frame 0:"));
        assert!(joined.contains("frame 199:"));
    }

    #[test]
    fn oversized_single_lines_are_hard_split() {
        let line = "x".repeat(5000);
        let pages = paginate_trace("h", &line, 2000);
        assert!(pages.len() >= 3);
        for page in pages {
            assert!(page.chars().count() <= 2000);
        }
    }
}
