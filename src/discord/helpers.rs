// Assorted formatting and permission helpers shared by commands and the
// error reporter.

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use regex::Regex;
use thiserror::Error;

const LINK_PATTERN: &str =
    r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()!@:%_+.~#?&/=]*";
const INVITE_PATTERN: &str = r"(?:https?://)?discord(?:app)?\.(?:com/invite|gg)/[a-zA-Z0-9]+/?";
const MESSAGE_LINK_PATTERN: &str =
    r"https?://(?:www\.)?(?:canary\.|ptb\.)?discord(?:app)?\.com/channels/(@me|\d+)/(\d+)/(\d+)";

/// Raised when a moderation action would touch a member whose top role is
/// not below the bot's. The command error reporter knows this type.
#[derive(Debug, Error)]
#[error("cannot act on a member with a role above the bot's highest role")]
pub struct RoleHierarchyError;

/// Styles accepted by Discord's timestamp markup.
/// See: https://discord.com/developers/docs/reference#message-formatting-timestamp-styles
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    ShortTime,
    LongTime,
    ShortDate,
    LongDate,
    ShortDateTime,
    LongDateTime,
    Relative,
}

impl TimestampStyle {
    fn as_char(self) -> char {
        match self {
            TimestampStyle::ShortTime => 't',
            TimestampStyle::LongTime => 'T',
            TimestampStyle::ShortDate => 'd',
            TimestampStyle::LongDate => 'D',
            TimestampStyle::ShortDateTime => 'f',
            TimestampStyle::LongDateTime => 'F',
            TimestampStyle::Relative => 'R',
        }
    }
}

/// Convert a datetime into Discord timestamp markup.
#[allow(dead_code)]
pub fn format_dt(time: DateTime<Utc>, style: Option<TimestampStyle>) -> String {
    match style {
        Some(style) => format!("<t:{}:{}>", time.timestamp(), style.as_char()),
        None => format!("<t:{}>", time.timestamp()),
    }
}

/// Render a duration as `H:MM:SS`, the way cooldown waits are shown.
pub fn format_duration(duration: std::time::Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Format a reason string for a moderation action audit entry.
#[allow(dead_code)]
pub fn format_reason(
    reason: Option<&str>,
    moderator: Option<&serenity::Member>,
    max_length: usize,
) -> String {
    let mut reason = reason.unwrap_or("No reason provided.").to_string();

    if let Some(moderator) = moderator {
        reason = format!("{} ({}): {}", moderator.user.name, moderator.user.id, reason);
    }

    if reason.chars().count() > max_length {
        reason = reason
            .chars()
            .take(max_length.saturating_sub(3))
            .collect();
        reason.push_str("...");
    }

    reason
}

/// Human-readable permission list for error messages.
pub fn format_permissions(permissions: serenity::Permissions) -> String {
    permissions.get_permission_names().join(", ")
}

/// Check whether `permissions` covers everything in `should_include`.
/// Administrators pass unconditionally.
#[allow(dead_code)]
pub fn includes_permissions(
    permissions: serenity::Permissions,
    should_include: serenity::Permissions,
) -> bool {
    if permissions.contains(serenity::Permissions::ADMINISTRATOR) {
        return true;
    }
    permissions.contains(should_include)
}

/// True if `me`'s top role sits strictly above `member`'s.
#[allow(dead_code)]
pub fn is_above(guild: &serenity::Guild, me: &serenity::Member, member: &serenity::Member) -> bool {
    match (guild.member_highest_role(me), guild.member_highest_role(member)) {
        (Some(mine), Some(theirs)) => mine.position > theirs.position,
        (Some(_), None) => true,
        _ => false,
    }
}

/// True if `me` may act on `member`: has `permission`, the target is not the
/// guild owner, and the role hierarchy allows it.
#[allow(dead_code)]
pub fn can_target(
    guild: &serenity::Guild,
    me: &serenity::Member,
    member: &serenity::Member,
    permission: serenity::Permissions,
) -> bool {
    if !includes_permissions(guild.member_permissions(me), permission) {
        return false;
    }
    if member.user.id == guild.owner_id {
        return false;
    }
    is_above(guild, me, member)
}

/// Hierarchy gate for moderation actions. The returned error is the one the
/// command error reporter renders with a tailored message.
#[allow(dead_code)]
pub fn ensure_can_target(
    guild: &serenity::Guild,
    me: &serenity::Member,
    member: &serenity::Member,
) -> Result<(), RoleHierarchyError> {
    if member.user.id == guild.owner_id || !is_above(guild, me, member) {
        return Err(RoleHierarchyError);
    }
    Ok(())
}

/// Parse `<#123>`, `123`, or `#123`-style input into a channel id.
pub fn parse_channel_id(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let raw = trimmed
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed)
        .trim_start_matches('#');
    raw.parse().ok()
}

/// Parse `<@&123>` or `123`-style input into a role id.
pub fn parse_role_id(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let raw = trimmed
        .strip_prefix("<@&")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed);
    raw.parse().ok()
}

/// Returns true if the provided string is a URL.
#[allow(dead_code)]
pub fn is_url(input: &str) -> bool {
    let re = Regex::new(&format!("^{LINK_PATTERN}$")).expect("valid link regex");
    re.is_match(input)
}

/// Returns true if the provided string is a Discord invite link.
#[allow(dead_code)]
pub fn is_invite(input: &str) -> bool {
    let re = Regex::new(&format!("^{INVITE_PATTERN}$")).expect("valid invite regex");
    re.is_match(input)
}

/// The guild/channel/message triple addressed by a message link.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLocation {
    /// `None` for DM links (`/channels/@me/...`).
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
}

/// Parse a copied message link into its ids. Returns `None` for anything
/// that is not a full message link.
#[allow(dead_code)]
pub fn parse_message_link(input: &str) -> Option<MessageLocation> {
    let re = Regex::new(&format!("^{MESSAGE_LINK_PATTERN}$")).expect("valid message link regex");
    let captures = re.captures(input.trim())?;

    let guild_id = match &captures[1] {
        "@me" => None,
        raw => Some(raw.parse().ok()?),
    };

    Some(MessageLocation {
        guild_id,
        channel_id: captures[2].parse().ok()?,
        message_id: captures[3].parse().ok()?,
    })
}

/// Edit a message, ignoring not-found/forbidden/transport failures.
pub async fn maybe_edit(
    cache_http: impl serenity::CacheHttp,
    message: &mut serenity::Message,
    builder: serenity::EditMessage,
) {
    if let Err(e) = message.edit(cache_http, builder).await {
        tracing::debug!("Ignoring failed message edit: {e}");
    }
}

/// Delete a message, ignoring not-found/forbidden/transport failures.
pub async fn maybe_delete(cache_http: impl serenity::CacheHttp, message: &serenity::Message) {
    if let Err(e) = message.delete(cache_http).await {
        tracing::debug!("Ignoring failed message delete: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_dt_with_and_without_style() {
        let time = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        assert_eq!(format_dt(time, None), "<t:1600000000>");
        assert_eq!(
            format_dt(time, Some(TimestampStyle::Relative)),
            "<t:1600000000:R>"
        );
    }

    #[test]
    fn format_duration_renders_hours_minutes_seconds() {
        assert_eq!(format_duration(std::time::Duration::from_secs(5)), "0:00:05");
        assert_eq!(format_duration(std::time::Duration::from_secs(3_725)), "1:02:05");
    }

    #[test]
    fn format_reason_defaults_and_truncates() {
        assert_eq!(format_reason(None, None, 512), "No reason provided.");

        let long = "x".repeat(600);
        let formatted = format_reason(Some(&long), None, 512);
        assert_eq!(formatted.len(), 512);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn includes_permissions_requires_superset_unless_admin() {
        let held = serenity::Permissions::SEND_MESSAGES | serenity::Permissions::KICK_MEMBERS;
        assert!(includes_permissions(held, serenity::Permissions::KICK_MEMBERS));
        assert!(!includes_permissions(held, serenity::Permissions::BAN_MEMBERS));
        assert!(includes_permissions(
            serenity::Permissions::ADMINISTRATOR,
            serenity::Permissions::BAN_MEMBERS
        ));
    }

    #[test]
    fn channel_and_role_ids_parse_from_mentions_and_raw_input() {
        assert_eq!(parse_channel_id("<#123456>"), Some(123456));
        assert_eq!(parse_channel_id("  123456 "), Some(123456));
        assert_eq!(parse_channel_id("#123456"), Some(123456));
        assert_eq!(parse_channel_id("general"), None);

        assert_eq!(parse_role_id("<@&987>"), Some(987));
        assert_eq!(parse_role_id("987"), Some(987));
        assert_eq!(parse_role_id("<@987>"), None);
    }

    #[test]
    fn url_and_invite_recognition() {
        assert!(is_url("https://example.com/some/path"));
        assert!(!is_url("just words"));

        assert!(is_invite("https://discord.gg/abc123"));
        assert!(is_invite("discord.com/invite/abc123"));
        assert!(!is_invite("https://example.com/invite/abc123"));
    }

    #[test]
    fn message_links_parse_into_id_triples() {
        let location =
            parse_message_link("https://discord.com/channels/111/222/333").unwrap();
        assert_eq!(
            location,
            MessageLocation {
                guild_id: Some(111),
                channel_id: 222,
                message_id: 333
            }
        );

        let dm = parse_message_link("https://discord.com/channels/@me/222/333").unwrap();
        assert_eq!(dm.guild_id, None);

        assert!(parse_message_link("https://discord.com/channels/111/222").is_none());
    }
}
