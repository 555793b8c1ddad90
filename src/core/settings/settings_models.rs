/// Per-guild moderation command behavior flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModConfig {
    pub guild_id: u64,
    pub dm_users_on_action: bool,
    pub use_ephemeral_responses: bool,
    pub clean_up_commands: bool,
}

impl ModConfig {
    /// Row used when a guild has never saved moderation settings.
    pub fn defaults(guild_id: u64) -> Self {
        Self {
            guild_id,
            dm_users_on_action: true,
            use_ephemeral_responses: false,
            clean_up_commands: false,
        }
    }

    pub fn get(&self, toggle: ModToggle) -> bool {
        match toggle {
            ModToggle::DmUsersOnAction => self.dm_users_on_action,
            ModToggle::UseEphemeralResponses => self.use_ephemeral_responses,
            ModToggle::CleanUpCommands => self.clean_up_commands,
        }
    }

    pub fn toggle(&mut self, toggle: ModToggle) {
        match toggle {
            ModToggle::DmUsersOnAction => self.dm_users_on_action = !self.dm_users_on_action,
            ModToggle::UseEphemeralResponses => {
                self.use_ephemeral_responses = !self.use_ephemeral_responses
            }
            ModToggle::CleanUpCommands => self.clean_up_commands = !self.clean_up_commands,
        }
    }
}

/// One toggleable moderation flag.
///
/// `key` is the stable identifier used for storage columns and component
/// custom ids; `label` is what the user sees. The two are deliberately
/// decoupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModToggle {
    DmUsersOnAction,
    UseEphemeralResponses,
    CleanUpCommands,
}

impl ModToggle {
    pub const ALL: [ModToggle; 3] = [
        ModToggle::DmUsersOnAction,
        ModToggle::UseEphemeralResponses,
        ModToggle::CleanUpCommands,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ModToggle::DmUsersOnAction => "dm_users_on_action",
            ModToggle::UseEphemeralResponses => "use_ephemeral_responses",
            ModToggle::CleanUpCommands => "clean_up_commands",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModToggle::DmUsersOnAction => "DM users on moderation action",
            ModToggle::UseEphemeralResponses => "Ephemeral responses",
            ModToggle::CleanUpCommands => "Clean up mod commands",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toggle| toggle.key() == key)
    }
}

/// Per-guild cosmetic logging configuration. The per-category channel
/// routing lives in its own table, see [`LogCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub guild_id: u64,
    pub color_logs: bool,
}

impl LogConfig {
    pub fn defaults(guild_id: u64) -> Self {
        Self {
            guild_id,
            color_logs: true,
        }
    }
}

/// Log event categories a guild can route to a channel.
///
/// Ordering matters: menus render categories in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogCategory {
    ModActions,
    MessageDelete,
    MessageEdit,
    MemberJoin,
    MemberLeave,
    RoleChanges,
    ChannelChanges,
}

impl LogCategory {
    pub const ALL: [LogCategory; 7] = [
        LogCategory::ModActions,
        LogCategory::MessageDelete,
        LogCategory::MessageEdit,
        LogCategory::MemberJoin,
        LogCategory::MemberLeave,
        LogCategory::RoleChanges,
        LogCategory::ChannelChanges,
    ];

    /// Stable storage key, also used as the select option value.
    pub fn key(self) -> &'static str {
        match self {
            LogCategory::ModActions => "mod_actions",
            LogCategory::MessageDelete => "message_delete",
            LogCategory::MessageEdit => "message_edit",
            LogCategory::MemberJoin => "member_join",
            LogCategory::MemberLeave => "member_leave",
            LogCategory::RoleChanges => "role_changes",
            LogCategory::ChannelChanges => "channel_changes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogCategory::ModActions => "Moderation Actions",
            LogCategory::MessageDelete => "Message Deletion",
            LogCategory::MessageEdit => "Message Edits",
            LogCategory::MemberJoin => "Member Joins",
            LogCategory::MemberLeave => "Member Leaves",
            LogCategory::RoleChanges => "Role Changes",
            LogCategory::ChannelChanges => "Channel Changes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }
}

/// Per-guild user-report intake settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportsConfig {
    pub guild_id: u64,
    pub is_enabled: bool,
    pub channel_id: Option<u64>,
    pub pinged_role_ids: Vec<u64>,
}

impl ReportsConfig {
    pub fn defaults(guild_id: u64) -> Self {
        Self {
            guild_id,
            is_enabled: false,
            channel_id: None,
            pinged_role_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod_toggle_keys_round_trip() {
        for toggle in ModToggle::ALL {
            assert_eq!(ModToggle::from_key(toggle.key()), Some(toggle));
        }
        assert_eq!(ModToggle::from_key("no_such_flag"), None);
    }

    #[test]
    fn log_category_keys_round_trip() {
        for category in LogCategory::ALL {
            assert_eq!(LogCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(LogCategory::from_key(""), None);
    }

    #[test]
    fn toggling_flips_only_the_requested_flag() {
        let mut config = ModConfig::defaults(1);
        config.toggle(ModToggle::CleanUpCommands);

        assert!(config.clean_up_commands);
        assert_eq!(config.dm_users_on_action, ModConfig::defaults(1).dm_users_on_action);
        assert_eq!(
            config.use_ephemeral_responses,
            ModConfig::defaults(1).use_ephemeral_responses
        );
    }
}
