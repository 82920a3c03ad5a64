//! Per-chat action menu.

use crate::api::models::{ChatAction, ChatStatus};

/// Gap kept between the menu and the window edge when it has to be pulled
/// back on screen.
const EDGE_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLabels {
    pub archive: &'static str,
    pub mark_read: &'static str,
    pub favourite: &'static str,
}

impl MenuLabels {
    pub fn for_status(status: &ChatStatus) -> Self {
        Self {
            archive: if status.is_archived { "Unarchive chat" } else { "Archive chat" },
            mark_read: if status.has_unread { "Mark as read" } else { "Mark as unread" },
            favourite: if status.is_favourite { "Remove from favourites" } else { "Add to favourites" },
        }
    }

    pub fn get(&self, action: ChatAction) -> &'static str {
        match action {
            ChatAction::Archive => self.archive,
            ChatAction::MarkRead => self.mark_read,
            ChatAction::Favourite => self.favourite,
        }
    }
}

impl Default for MenuLabels {
    fn default() -> Self {
        Self::for_status(&ChatStatus::default())
    }
}

/// What the chat list has to do after a toggle succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Move the chat locally, then refresh both rolls.
    ReloadActiveAndArchived { phone: String, archived: bool },
    SetUnread { phone: String, count: u32 },
    ReloadFavourites,
}

/// Keep a menu of `menu` size, opened at `click`, inside `window`.
pub fn clamp_position(click: (f64, f64), menu: (f64, f64), window: (f64, f64)) -> (f64, f64) {
    let (mut x, mut y) = click;
    if click.0 + menu.0 > window.0 {
        x = window.0 - menu.0 - EDGE_MARGIN;
    }
    if click.1 + menu.1 > window.1 {
        y = window.1 - menu.1 - EDGE_MARGIN;
    }
    (x, y)
}

#[derive(Debug, Default)]
pub struct ContextMenu {
    target: Option<String>,
    labels: MenuLabels,
    visible: bool,
    position: (f64, f64),
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the menu for `phone`. Without a status (the lookup failed) the
    /// previous labels stay.
    pub fn open(
        &mut self,
        phone: &str,
        status: Option<&ChatStatus>,
        click: (f64, f64),
        menu: (f64, f64),
        window: (f64, f64),
    ) -> (f64, f64) {
        self.target = Some(phone.to_string());
        if let Some(status) = status {
            self.labels = MenuLabels::for_status(status);
        }
        self.position = clamp_position(click, menu, window);
        self.visible = true;
        self.position
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn labels(&self) -> MenuLabels {
        self.labels
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Record a toggle result: relabel, hide, and say what to refresh.
    pub fn apply(&mut self, phone: &str, action: ChatAction, result: &ChatStatus) -> FollowUp {
        self.labels = MenuLabels::for_status(result);
        self.hide();
        match action {
            ChatAction::Archive => {
                FollowUp::ReloadActiveAndArchived { phone: phone.to_string(), archived: result.is_archived }
            }
            ChatAction::MarkRead => FollowUp::SetUnread { phone: phone.to_string(), count: result.badge_count() },
            ChatAction::Favourite => FollowUp::ReloadFavourites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_status() {
        let labels = MenuLabels::for_status(&ChatStatus {
            is_archived: true,
            has_unread: false,
            is_favourite: true,
            unread_count: None,
        });
        assert_eq!(labels.archive, "Unarchive chat");
        assert_eq!(labels.mark_read, "Mark as unread");
        assert_eq!(labels.get(ChatAction::Favourite), "Remove from favourites");
        assert_eq!(MenuLabels::default().archive, "Archive chat");
    }

    #[test]
    fn menu_is_pulled_back_on_screen() {
        assert_eq!(clamp_position((100.0, 100.0), (50.0, 80.0), (800.0, 600.0)), (100.0, 100.0));
        assert_eq!(clamp_position((780.0, 590.0), (50.0, 80.0), (800.0, 600.0)), (740.0, 510.0));
    }

    #[test]
    fn failed_status_keeps_old_labels() {
        let mut menu = ContextMenu::new();
        let fav = ChatStatus { is_favourite: true, ..Default::default() };
        menu.open("+1", Some(&fav), (0.0, 0.0), (10.0, 10.0), (100.0, 100.0));
        menu.open("+2", None, (0.0, 0.0), (10.0, 10.0), (100.0, 100.0));
        assert_eq!(menu.target(), Some("+2"));
        assert_eq!(menu.labels().favourite, "Remove from favourites");
        assert!(menu.is_visible());
    }

    #[test]
    fn apply_maps_actions_to_follow_ups() {
        let mut menu = ContextMenu::new();
        menu.open("+1", None, (0.0, 0.0), (10.0, 10.0), (100.0, 100.0));
        let status = ChatStatus { is_archived: true, ..Default::default() };
        assert_eq!(
            menu.apply("+1", ChatAction::Archive, &status),
            FollowUp::ReloadActiveAndArchived { phone: "+1".into(), archived: true }
        );
        assert!(!menu.is_visible());
        assert_eq!(menu.labels().archive, "Unarchive chat");

        let unread = ChatStatus { has_unread: true, ..Default::default() };
        assert_eq!(
            menu.apply("+1", ChatAction::MarkRead, &unread),
            FollowUp::SetUnread { phone: "+1".into(), count: 1 }
        );
        assert_eq!(menu.apply("+1", ChatAction::Favourite, &unread), FollowUp::ReloadFavourites);
    }
}
