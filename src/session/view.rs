//! Which panels are visible.

/// Navigation rail buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum NavState {
    #[default]
    Chats,
    Settings,
    Profile,
}

impl NavState {
    pub const ALL: [NavState; 3] = [NavState::Chats, NavState::Settings, NavState::Profile];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavState::Chats => "chats",
            NavState::Settings => "settings",
            NavState::Profile => "profile",
        }
    }
}

/// Page of the left (list) panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPane {
    Chats,
    Archive,
    Settings,
    Profile,
}

impl ListPane {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListPane::Chats => "chats",
            ListPane::Archive => "archive",
            ListPane::Settings => "settings",
            ListPane::Profile => "profile",
        }
    }
}

/// Page of the right (content) panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPane {
    /// Shown in the chats state until the first chat is opened.
    Start,
    Main,
    Settings,
    Profile,
}

impl ContentPane {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentPane::Start => "start",
            ContentPane::Main => "main",
            ContentPane::Settings => "settings",
            ContentPane::Profile => "profile",
        }
    }
}

/// In the narrow layout only one of the two panels is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrowPane {
    #[default]
    List,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub nav: NavState,
    pub list: ListPane,
    pub content: ContentPane,
    /// Settings and profile dim the content panel.
    pub temp_state: bool,
    pub focus_search: bool,
    /// `None` in the wide layout, where both panels show.
    pub narrow: Option<NarrowPane>,
}

#[derive(Debug, Default)]
pub struct ViewSwitcher {
    nav: NavState,
    chat_view_activated: bool,
    archive_open: bool,
    narrow: bool,
    narrow_pane: NarrowPane,
}

impl ViewSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nav(&self) -> NavState {
        self.nav
    }

    pub fn chat_view_activated(&self) -> bool {
        self.chat_view_activated
    }

    pub fn select(&mut self, nav: NavState) -> ViewLayout {
        self.nav = nav;
        self.archive_open = false;
        let mut layout = self.layout();
        layout.focus_search = nav == NavState::Settings;
        layout
    }

    pub fn layout(&self) -> ViewLayout {
        let list = match self.nav {
            NavState::Chats if self.archive_open => ListPane::Archive,
            NavState::Chats => ListPane::Chats,
            NavState::Settings => ListPane::Settings,
            NavState::Profile => ListPane::Profile,
        };
        let content = match self.nav {
            NavState::Chats if self.chat_view_activated => ContentPane::Main,
            NavState::Chats => ContentPane::Start,
            NavState::Settings => ContentPane::Settings,
            NavState::Profile => ContentPane::Profile,
        };
        ViewLayout {
            nav: self.nav,
            list,
            content,
            temp_state: matches!(self.nav, NavState::Settings | NavState::Profile),
            focus_search: false,
            narrow: self.narrow.then_some(self.narrow_pane),
        }
    }

    /// Leave the start screen for good. Returns false when already done.
    pub fn show_main_content(&mut self) -> bool {
        if self.chat_view_activated {
            return false;
        }
        self.chat_view_activated = true;
        true
    }

    pub fn open_archive(&mut self) -> ViewLayout {
        self.nav = NavState::Chats;
        self.archive_open = true;
        self.layout()
    }

    pub fn close_archive(&mut self) -> ViewLayout {
        self.archive_open = false;
        self.layout()
    }

    pub fn set_narrow(&mut self, narrow: bool) -> ViewLayout {
        if narrow != self.narrow {
            self.narrow = narrow;
            self.narrow_pane = NarrowPane::List;
        }
        self.layout()
    }

    /// A chat was opened; in the narrow layout the chat replaces the list.
    pub fn enter_chat(&mut self) -> ViewLayout {
        self.show_main_content();
        self.nav = NavState::Chats;
        if self.narrow {
            self.narrow_pane = NarrowPane::Content;
        }
        self.layout()
    }

    pub fn back_to_list(&mut self) -> ViewLayout {
        self.narrow_pane = NarrowPane::List;
        self.layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chats_shows_start_screen_until_a_chat_opens() {
        let mut view = ViewSwitcher::new();
        let layout = view.select(NavState::Chats);
        assert_eq!(layout.list, ListPane::Chats);
        assert_eq!(layout.content, ContentPane::Start);
        assert!(!layout.temp_state);

        assert!(!view.chat_view_activated());
        assert!(view.show_main_content());
        assert!(view.chat_view_activated());
        assert!(!view.show_main_content());
        assert_eq!(view.select(NavState::Chats).content, ContentPane::Main);
    }

    #[test]
    fn settings_and_profile_use_temp_state() {
        let mut view = ViewSwitcher::new();
        let settings = view.select(NavState::Settings);
        assert_eq!(settings.list, ListPane::Settings);
        assert_eq!(settings.content, ContentPane::Settings);
        assert!(settings.temp_state && settings.focus_search);

        let profile = view.select(NavState::Profile);
        assert_eq!(profile.content, ContentPane::Profile);
        assert!(profile.temp_state && !profile.focus_search);
    }

    #[test]
    fn archive_swaps_the_list_and_nav_closes_it() {
        let mut view = ViewSwitcher::new();
        assert_eq!(view.open_archive().list, ListPane::Archive);
        assert_eq!(view.close_archive().list, ListPane::Chats);
        view.open_archive();
        assert_eq!(view.select(NavState::Chats).list, ListPane::Chats);
    }

    #[test]
    fn narrow_layout_swaps_panels() {
        let mut view = ViewSwitcher::new();
        assert_eq!(view.layout().narrow, None);
        assert_eq!(view.set_narrow(true).narrow, Some(NarrowPane::List));
        let layout = view.enter_chat();
        assert_eq!(layout.narrow, Some(NarrowPane::Content));
        assert_eq!(layout.content, ContentPane::Main);
        assert_eq!(view.back_to_list().narrow, Some(NarrowPane::List));
        assert_eq!(view.set_narrow(false).narrow, None);
    }
}
