//! Chat list rolls: the fetched lists and the filters over them.

use std::collections::HashSet;

use crate::api::models::ChatSummary;

/// The lists fetched from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Active,
    Favourites,
    Archived,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Active, Source::Favourites, Source::Archived];

    /// Key used by the roll cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Active => "active",
            Source::Favourites => "favourites",
            Source::Archived => "archived",
        }
    }
}

/// What a roll container can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RollKind {
    #[default]
    All,
    Unread,
    Favourites,
    Groups,
    Archive,
}

impl RollKind {
    /// Filters reachable from the filter buttons above the chat list.
    pub const FILTERS: [RollKind; 4] = [RollKind::All, RollKind::Unread, RollKind::Favourites, RollKind::Groups];

    pub fn label(&self) -> &'static str {
        match self {
            RollKind::All => "All",
            RollKind::Unread => "Unread",
            RollKind::Favourites => "Favourites",
            RollKind::Groups => "Groups",
            RollKind::Archive => "Archived",
        }
    }

    fn source(&self) -> Option<Source> {
        match self {
            RollKind::All | RollKind::Unread => Some(Source::Active),
            RollKind::Favourites => Some(Source::Favourites),
            RollKind::Archive => Some(Source::Archived),
            RollKind::Groups => None,
        }
    }

    fn empty_text(&self) -> Option<&'static str> {
        match self {
            RollKind::All => Some("no chats yet"),
            RollKind::Unread => Some("No unread chats"),
            RollKind::Favourites => Some("No favourite chats"),
            RollKind::Archive => Some("No archived chats"),
            RollKind::Groups => None,
        }
    }

    fn failed_text(&self) -> &'static str {
        match self {
            RollKind::Favourites => "Error loading favourites",
            RollKind::Archive => "Error loading archived chats.",
            _ => "Failed to load chats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// A roll ready to render: entries in server order, or a placeholder line.
#[derive(Debug, PartialEq, Eq)]
pub struct RollView<'a> {
    pub entries: Vec<&'a ChatSummary>,
    pub placeholder: Option<&'static str>,
    pub failed: bool,
}

#[derive(Debug, Default)]
struct List {
    chats: Vec<ChatSummary>,
    state: LoadState,
}

#[derive(Debug, Default)]
pub struct ChatRolls {
    filter: RollKind,
    active: List,
    favourites: List,
    archived: List,
    hidden: HashSet<String>,
}

impl ChatRolls {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, source: Source) -> &List {
        match source {
            Source::Active => &self.active,
            Source::Favourites => &self.favourites,
            Source::Archived => &self.archived,
        }
    }

    fn list_mut(&mut self, source: Source) -> &mut List {
        match source {
            Source::Active => &mut self.active,
            Source::Favourites => &mut self.favourites,
            Source::Archived => &mut self.archived,
        }
    }

    pub fn filter(&self) -> RollKind {
        self.filter
    }

    /// Switch the visible filter. The archive roll has its own view and is
    /// not a filter.
    pub fn select(&mut self, filter: RollKind) {
        if filter != RollKind::Archive {
            self.filter = filter;
        }
    }

    pub fn state(&self, source: Source) -> LoadState {
        self.list(source).state
    }

    pub fn set_loading(&mut self, source: Source) {
        let list = self.list_mut(source);
        list.chats.clear();
        list.state = LoadState::Loading;
    }

    pub fn set_loaded(&mut self, source: Source, chats: Vec<ChatSummary>) {
        let list = self.list_mut(source);
        list.chats = chats;
        list.state = LoadState::Loaded;
    }

    /// Refetch without blanking or repainting from the cache; the current
    /// rows stay up until the reply lands.
    pub fn set_refreshing(&mut self, source: Source) {
        self.list_mut(source).state = LoadState::Loading;
    }

    /// Cached rows shown while the real fetch is in flight.
    pub fn set_cached(&mut self, source: Source, chats: Vec<ChatSummary>) {
        let list = self.list_mut(source);
        if list.state == LoadState::Loading && list.chats.is_empty() {
            list.chats = chats;
        }
    }

    pub fn set_failed(&mut self, source: Source) {
        let list = self.list_mut(source);
        list.chats.clear();
        list.state = LoadState::Failed;
    }

    pub fn chats(&self, source: Source) -> &[ChatSummary] {
        &self.list(source).chats
    }

    pub fn visible(&self) -> RollView<'_> {
        self.view(self.filter)
    }

    pub fn view(&self, kind: RollKind) -> RollView<'_> {
        let Some(source) = kind.source() else {
            return RollView { entries: Vec::new(), placeholder: None, failed: false };
        };
        let list = self.list(source);
        match list.state {
            LoadState::Failed => {
                return RollView { entries: Vec::new(), placeholder: Some(kind.failed_text()), failed: true };
            }
            LoadState::Loading if list.chats.is_empty() => {
                return RollView { entries: Vec::new(), placeholder: None, failed: false };
            }
            _ => {}
        }
        let entries: Vec<&ChatSummary> = list
            .chats
            .iter()
            .filter(|c| !self.hidden.contains(&c.phone))
            .filter(|c| kind != RollKind::Unread || c.unread_count > 0)
            .collect();
        let placeholder = if entries.is_empty() { kind.empty_text() } else { None };
        RollView { entries, placeholder, failed: false }
    }

    /// Update the unread badge of `phone` in every roll that lists it.
    pub fn set_unread(&mut self, phone: &str, count: u32) {
        for source in Source::ALL {
            for chat in self.list_mut(source).chats.iter_mut().filter(|c| c.phone == phone) {
                chat.unread_count = count;
                chat.has_unread = count > 0;
            }
        }
    }

    /// Hide a chat while an archive toggle is in flight.
    pub fn hide(&mut self, phone: &str) {
        self.hidden.insert(phone.to_string());
    }

    pub fn unhide(&mut self, phone: &str) {
        self.hidden.remove(phone);
    }

    pub fn is_hidden(&self, phone: &str) -> bool {
        self.hidden.contains(phone)
    }

    /// Move `phone` between the active and archived rolls after a
    /// successful archive toggle, and show it again.
    pub fn move_archived(&mut self, phone: &str, archived: bool) {
        let (from, to) = if archived {
            (Source::Active, Source::Archived)
        } else {
            (Source::Archived, Source::Active)
        };
        let moved: Vec<ChatSummary> = {
            let list = &mut self.list_mut(from).chats;
            let (moved, kept) = std::mem::take(list).into_iter().partition(|c| c.phone == phone);
            *list = kept;
            moved
        };
        let target = &mut self.list_mut(to).chats;
        if let Some(chat) = moved.into_iter().next() {
            if !target.iter().any(|c| c.phone == phone) {
                target.insert(0, chat);
            }
        }
        self.unhide(phone);
    }

    pub fn find(&self, phone: &str) -> Option<&ChatSummary> {
        Source::ALL
            .iter()
            .find_map(|s| self.list(*s).chats.iter().find(|c| c.phone == phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: i64, phone: &str, unread: u32) -> ChatSummary {
        ChatSummary {
            id,
            phone: phone.into(),
            name: format!("chat {id}"),
            avatar: String::new(),
            message: "hi".into(),
            time: "10:00".into(),
            unread_count: unread,
            has_unread: unread > 0,
        }
    }

    fn phones(view: &RollView<'_>) -> Vec<String> {
        view.entries.iter().map(|c| c.phone.clone()).collect()
    }

    #[test]
    fn all_roll_keeps_server_order() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(2, "+2", 0), chat(1, "+1", 3), chat(3, "+3", 0)]);
        assert_eq!(phones(&rolls.visible()), vec!["+2", "+1", "+3"]);
        assert_eq!(rolls.visible().placeholder, None);
    }

    #[test]
    fn unread_roll_is_derived_from_active() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0), chat(2, "+2", 5)]);
        rolls.select(RollKind::Unread);
        assert_eq!(phones(&rolls.visible()), vec!["+2"]);

        rolls.set_unread("+2", 0);
        let view = rolls.visible();
        assert!(view.entries.is_empty());
        assert_eq!(view.placeholder, Some("No unread chats"));
    }

    #[test]
    fn groups_roll_is_blank() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0)]);
        rolls.select(RollKind::Groups);
        assert_eq!(rolls.visible(), RollView { entries: vec![], placeholder: None, failed: false });
    }

    #[test]
    fn placeholders_for_empty_and_failed() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![]);
        rolls.set_loaded(Source::Favourites, vec![]);
        rolls.set_failed(Source::Archived);
        assert_eq!(rolls.view(RollKind::All).placeholder, Some("no chats yet"));
        assert_eq!(rolls.view(RollKind::Favourites).placeholder, Some("No favourite chats"));
        let archive = rolls.view(RollKind::Archive);
        assert!(archive.failed);
        assert_eq!(archive.placeholder, Some("Error loading archived chats."));
    }

    #[test]
    fn archive_is_not_a_filter() {
        let mut rolls = ChatRolls::new();
        rolls.select(RollKind::Favourites);
        rolls.select(RollKind::Archive);
        assert_eq!(rolls.filter(), RollKind::Favourites);
    }

    #[test]
    fn badge_update_reaches_every_roll() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0)]);
        rolls.set_loaded(Source::Favourites, vec![chat(1, "+1", 0)]);
        rolls.set_unread("+1", 2);
        assert_eq!(rolls.chats(Source::Active)[0].unread_count, 2);
        assert!(rolls.chats(Source::Favourites)[0].has_unread);
    }

    #[test]
    fn hidden_chats_drop_out_until_unhidden() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0), chat(2, "+2", 0)]);
        rolls.hide("+1");
        assert!(rolls.is_hidden("+1"));
        assert_eq!(phones(&rolls.visible()), vec!["+2"]);
        rolls.unhide("+1");
        assert!(!rolls.is_hidden("+1"));
        assert_eq!(phones(&rolls.visible()), vec!["+1", "+2"]);
    }

    #[test]
    fn archived_chat_moves_rolls_and_survives_refresh() {
        let mut rolls = ChatRolls::new();
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0), chat(2, "+2", 0)]);
        rolls.set_loaded(Source::Archived, vec![chat(3, "+3", 0)]);
        rolls.hide("+1");

        rolls.move_archived("+1", true);
        assert!(!rolls.is_hidden("+1"));
        assert_eq!(phones(&rolls.visible()), vec!["+2"]);
        assert_eq!(phones(&rolls.view(RollKind::Archive)), vec!["+1", "+3"]);

        rolls.set_refreshing(Source::Active);
        rolls.set_refreshing(Source::Archived);
        assert_eq!(rolls.state(Source::Active), LoadState::Loading);
        assert_eq!(phones(&rolls.visible()), vec!["+2"]);

        rolls.move_archived("+1", false);
        assert_eq!(phones(&rolls.visible()), vec!["+1", "+2"]);
        assert_eq!(phones(&rolls.view(RollKind::Archive)), vec!["+3"]);
    }

    #[test]
    fn cache_only_fills_an_empty_loading_list() {
        let mut rolls = ChatRolls::new();
        rolls.set_cached(Source::Active, vec![chat(9, "+9", 0)]);
        assert_eq!(phones(&rolls.visible()), vec!["+9"]);
        rolls.set_loaded(Source::Active, vec![chat(1, "+1", 0)]);
        rolls.set_cached(Source::Active, vec![chat(9, "+9", 0)]);
        assert_eq!(phones(&rolls.visible()), vec!["+1"]);
    }
}
