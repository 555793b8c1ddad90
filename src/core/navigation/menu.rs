// Menu navigation state machine for the interactive settings session.
//
// Every legal transition is declared here in one table instead of being
// scattered across the individual menu handlers, so the set of reachable
// screens is auditable in one place.
//
// NO Discord dependencies here - just pure domain logic.

/// A named settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    Main,
    Moderation,
    AutoModeration,
    Logging,
    Reports,
}

impl Menu {
    /// Menus reachable via [`NavAction::Open`] from this one.
    pub fn children(self) -> &'static [Menu] {
        match self {
            Menu::Main => &[
                Menu::Moderation,
                Menu::AutoModeration,
                Menu::Logging,
                Menu::Reports,
            ],
            // Nested menus never open siblings, they only go Back.
            _ => &[],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Menu::Main => "Main",
            Menu::Moderation => "Moderation",
            Menu::AutoModeration => "Auto-Moderation",
            Menu::Logging => "Logging",
            Menu::Reports => "Reports",
        }
    }
}

/// A navigation request produced by a menu handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Open(Menu),
    Back,
    Quit,
    Timeout,
}

/// Result of applying a [`NavAction`] to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Keep the session alive and show this menu next.
    Continue(Menu),
    /// Tear the session down.
    Close,
}

/// Ephemeral per-invocation navigation state.
///
/// `parent` is a single-level pointer: it records the one menu a Back
/// control returns to, and is overwritten at each nested menu's entry.
/// There is no multi-level history stack.
#[derive(Debug, Clone, Copy)]
pub struct NavContext {
    pub user_id: u64,
    pub guild_id: u64,
    pub parent: Option<Menu>,
}

impl NavContext {
    pub fn new(user_id: u64, guild_id: u64) -> Self {
        Self {
            user_id,
            guild_id,
            parent: None,
        }
    }
}

/// Apply `action` to the current menu, consulting the transition table.
///
/// An `Open` targeting a menu that is not a declared child of `current`
/// redraws the current menu rather than failing silently. `Back` without a
/// recorded parent closes the session; Quit and Timeout always close.
pub fn transition(current: Menu, action: NavAction, parent: Option<Menu>) -> NavOutcome {
    match action {
        NavAction::Open(target) if current.children().contains(&target) => {
            NavOutcome::Continue(target)
        }
        NavAction::Open(_) => NavOutcome::Continue(current),
        NavAction::Back => match parent {
            Some(menu) => NavOutcome::Continue(menu),
            None => NavOutcome::Close,
        },
        NavAction::Quit | NavAction::Timeout => NavOutcome::Close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_opens_every_nested_menu() {
        for target in Menu::Main.children() {
            assert_eq!(
                transition(Menu::Main, NavAction::Open(*target), None),
                NavOutcome::Continue(*target)
            );
        }
    }

    #[test]
    fn nested_menus_cannot_open_siblings() {
        // Requesting a sibling from a nested menu redraws the current menu.
        assert_eq!(
            transition(Menu::Logging, NavAction::Open(Menu::Reports), Some(Menu::Main)),
            NavOutcome::Continue(Menu::Logging)
        );
    }

    #[test]
    fn back_returns_to_recorded_parent_exactly() {
        for nested in [Menu::Moderation, Menu::AutoModeration, Menu::Logging, Menu::Reports] {
            assert_eq!(
                transition(nested, NavAction::Back, Some(Menu::Main)),
                NavOutcome::Continue(Menu::Main)
            );
        }

        // The error panel repoints the parent; Back must follow it, not Main.
        assert_eq!(
            transition(Menu::Logging, NavAction::Back, Some(Menu::Reports)),
            NavOutcome::Continue(Menu::Reports)
        );
    }

    #[test]
    fn back_without_parent_closes() {
        assert_eq!(transition(Menu::Main, NavAction::Back, None), NavOutcome::Close);
    }

    #[test]
    fn quit_and_timeout_always_close() {
        for menu in [Menu::Main, Menu::Moderation, Menu::Logging, Menu::Reports] {
            assert_eq!(transition(menu, NavAction::Quit, Some(Menu::Main)), NavOutcome::Close);
            assert_eq!(
                transition(menu, NavAction::Timeout, Some(Menu::Main)),
                NavOutcome::Close
            );
        }
    }
}
