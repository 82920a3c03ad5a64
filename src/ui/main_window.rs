use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::api::events::IncomingFrame;
use crate::api::models::{ChatAction, ChatSummary, ProfileField};
use crate::api::socket::{self, PushChannel};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::session::context_menu::FollowUp;
use crate::session::rolls::{RollKind, Source};
use crate::session::view::{NarrowPane, NavState, ViewLayout};
use crate::session::{ProfileEditor, UiSession};
use crate::storage::Storage;
use crate::ui::chat_view::ChatView;
use crate::ui::profile::ProfilePanel;
use crate::ui::settings::SettingsPanel;
use crate::ui::sidebar::{ArchivePanel, RollList, Sidebar};
use crate::utils::run_async_to_main;

const OPEN_CHAT_FAILED: &str = "Network error starting chat";

/// The signed-in window. Owns the session and routes widget events and
/// server replies through it.
pub struct MainWindow {
    app: Application,
    window: adw::ApplicationWindow,
    overlay: adw::ToastOverlay,
    nav_buttons: Vec<(NavState, gtk::ToggleButton)>,
    left: gtk::Stack,
    right: gtk::Stack,
    separator: gtk::Separator,
    sidebar: Rc<Sidebar>,
    archive: ArchivePanel,
    chat: Rc<ChatView>,
    profile: Rc<ProfilePanel>,
    settings: Rc<SettingsPanel>,
    session: RefCell<UiSession>,
    client: ApiClient,
    full_phone: String,
    storage: RefCell<Option<Storage>>,
}

pub fn show_main_window(app: &Application, client: ApiClient, current_user: &str, full_phone: &str) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Messenger")
        .default_width(1100)
        .default_height(700)
        .build();
    let overlay = adw::ToastOverlay::new();

    // Navigation rail
    let rail = gtk::Box::new(gtk::Orientation::Vertical, 6);
    rail.set_margin_top(8);
    rail.set_margin_start(4);
    rail.set_margin_end(4);
    let mut nav_buttons: Vec<(NavState, gtk::ToggleButton)> = Vec::new();
    for nav in NavState::ALL {
        let icon = match nav {
            NavState::Chats => "user-available-symbolic",
            NavState::Settings => "emblem-system-symbolic",
            NavState::Profile => "avatar-default-symbolic",
        };
        let button = gtk::ToggleButton::new();
        button.set_icon_name(icon);
        button.set_tooltip_text(Some(nav.as_str()));
        button.add_css_class("flat");
        if let Some((_, first)) = nav_buttons.first() {
            button.set_group(Some(first));
        }
        rail.append(&button);
        nav_buttons.push((nav, button));
    }

    let sidebar = Sidebar::new();
    let archive = ArchivePanel::new();
    let settings = SettingsPanel::new(full_phone, client.base_url().as_str());
    let profile = ProfilePanel::new(full_phone);
    let chat = ChatView::new();

    let left = gtk::Stack::new();
    left.set_width_request(340);
    left.set_transition_type(gtk::StackTransitionType::Crossfade);
    left.add_named(&sidebar.widget(), Some("view-chats"));
    left.add_named(&archive.widget(), Some("view-archive"));
    left.add_named(&settings.widget(), Some("view-settings"));
    left.add_named(&profile.widget(), Some("view-profile"));

    let start = adw::StatusPage::builder()
        .icon_name("mail-unread-symbolic")
        .title("Messenger")
        .description("Pick a chat to start messaging.")
        .build();
    let settings_page = adw::StatusPage::builder()
        .icon_name("emblem-system-symbolic")
        .title("Settings")
        .build();
    let profile_page = adw::StatusPage::builder()
        .icon_name("avatar-default-symbolic")
        .title("Profile")
        .description("Click your name or about line to edit it.")
        .build();
    let right = gtk::Stack::new();
    right.set_hexpand(true);
    right.add_named(&start, Some("content-start"));
    right.add_named(&chat.widget(), Some("content-main"));
    right.add_named(&settings_page, Some("content-settings"));
    right.add_named(&profile_page, Some("content-profile"));

    let separator = gtk::Separator::new(gtk::Orientation::Vertical);
    let body = gtk::Box::new(gtk::Orientation::Horizontal, 0);
    body.append(&rail);
    body.append(&gtk::Separator::new(gtk::Orientation::Vertical));
    body.append(&left);
    body.append(&separator);
    body.append(&right);
    overlay.set_child(Some(&body));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some("Messenger"))));
    let new_chat_btn = gtk::Button::from_icon_name("list-add-symbolic");
    new_chat_btn.set_tooltip_text(Some("New Chat"));
    header.pack_start(&new_chat_btn);
    let refresh_btn = gtk::Button::from_icon_name("view-refresh-symbolic");
    refresh_btn.set_tooltip_text(Some("Reload chats"));
    header.pack_end(&refresh_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let storage = match Storage::open_default() {
        Ok(storage) => Some(storage),
        Err(e) => {
            warn!("chat cache unavailable: {e}");
            None
        }
    };

    let this = Rc::new(MainWindow {
        app: app.clone(),
        window: window.clone(),
        overlay,
        nav_buttons,
        left,
        right,
        separator,
        sidebar,
        archive,
        chat,
        profile,
        settings,
        session: RefCell::new(UiSession::new(current_user)),
        client,
        full_phone: full_phone.to_string(),
        storage: RefCell::new(storage),
    });
    this.wire();

    {
        let weak = Rc::downgrade(&this);
        new_chat_btn.connect_clicked(move |_| {
            if let Some(this) = weak.upgrade() {
                this.new_chat_dialog();
            }
        });
    }
    {
        let weak = Rc::downgrade(&this);
        refresh_btn.connect_clicked(move |_| {
            if let Some(this) = weak.upgrade() {
                this.load_all();
            }
        });
    }

    // Handlers only hold weak references; the window keeps the controller
    // alive until it closes.
    {
        let keep_alive = RefCell::new(Some(this.clone()));
        window.connect_close_request(move |_| {
            if let Some(this) = keep_alive.take() {
                if let Some(channel) = this.session.borrow_mut().take_channel() {
                    channel.close();
                }
            }
            glib::Propagation::Proceed
        });
    }

    let layout = this.session.borrow_mut().view.select(NavState::Chats);
    this.apply_layout(&layout);
    this.load_all();
    this.load_own_profile();
    window.present();
}

impl MainWindow {
    fn wire(self: &Rc<Self>) {
        for (nav, button) in &self.nav_buttons {
            let weak = Rc::downgrade(self);
            let nav = *nav;
            button.connect_toggled(move |button| {
                if !button.is_active() {
                    return;
                }
                if let Some(this) = weak.upgrade() {
                    let layout = this.session.borrow_mut().view.select(nav);
                    this.apply_layout(&layout);
                }
            });
        }

        {
            let weak = Rc::downgrade(self);
            self.window.connect_default_width_notify(move |window| {
                if let Some(this) = weak.upgrade() {
                    let narrow = crate::utils::is_narrow(window.default_width());
                    let layout = this.session.borrow_mut().view.set_narrow(narrow);
                    this.apply_layout(&layout);
                }
            });
        }

        // Chat list
        {
            let weak = Rc::downgrade(self);
            self.sidebar.connect_filter(move |kind| {
                if let Some(this) = weak.upgrade() {
                    this.session.borrow_mut().rolls.select(kind);
                    this.render_rolls();
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.sidebar.connect_open(move |phone| {
                if let Some(this) = weak.upgrade() {
                    this.open_chat(phone);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.sidebar.connect_search(move |text| {
                if let Some(this) = weak.upgrade() {
                    this.search(&text);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.sidebar.connect_archive(move || {
                if let Some(this) = weak.upgrade() {
                    let layout = this.session.borrow_mut().view.open_archive();
                    this.apply_layout(&layout);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.archive.connect_back(move || {
                if let Some(this) = weak.upgrade() {
                    let layout = this.session.borrow_mut().view.close_archive();
                    this.apply_layout(&layout);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.archive.roll().connect_open(move |phone| {
                if let Some(this) = weak.upgrade() {
                    this.open_chat(phone);
                }
            });
        }
        for roll in [self.sidebar.roll().clone(), self.archive.roll().clone()] {
            let weak = Rc::downgrade(self);
            let target = Rc::downgrade(&roll);
            roll.connect_menu(move |phone, x, y| {
                if let (Some(this), Some(roll)) = (weak.upgrade(), target.upgrade()) {
                    this.open_menu(roll, phone, (x, y));
                }
            });
            let weak = Rc::downgrade(self);
            roll.connect_action(move |action| {
                if let Some(this) = weak.upgrade() {
                    this.run_menu_action(action);
                }
            });
            let weak = Rc::downgrade(self);
            roll.connect_menu_closed(move || {
                if let Some(this) = weak.upgrade() {
                    this.session.borrow_mut().menu.hide();
                }
            });
        }

        // Chat pane
        {
            let weak = Rc::downgrade(self);
            self.chat.connect_send(move |text| {
                if let Some(this) = weak.upgrade() {
                    this.send(&text);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.chat.connect_visible(move |id, fraction| {
                if let Some(this) = weak.upgrade() {
                    this.on_visible(id, fraction);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.chat.connect_back(move || {
                if let Some(this) = weak.upgrade() {
                    let layout = this.session.borrow_mut().view.back_to_list();
                    this.apply_layout(&layout);
                }
            });
        }

        // Profile and settings
        {
            let weak = Rc::downgrade(self);
            self.profile.connect_toggle(move |field| {
                if let Some(this) = weak.upgrade() {
                    this.toggle_profile_field(field);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.profile.connect_picture(move |path| {
                if let Some(this) = weak.upgrade() {
                    this.upload_picture(path);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.settings.connect_logout(move || {
                if let Some(this) = weak.upgrade() {
                    this.logout();
                }
            });
        }
    }

    fn toast(&self, text: &str) {
        crate::ui::toast(&self.overlay, text);
    }

    /// Show what `layout` says. Must not be called while the session is
    /// borrowed: toggling the nav buttons re-enters through their handlers.
    fn apply_layout(&self, layout: &ViewLayout) {
        self.left.set_visible_child_name(&format!("view-{}", layout.list.as_str()));
        self.right.set_visible_child_name(&format!("content-{}", layout.content.as_str()));
        if layout.temp_state {
            self.right.add_css_class("tempstate");
        } else {
            self.right.remove_css_class("tempstate");
        }
        for (nav, button) in &self.nav_buttons {
            if *nav == layout.nav && !button.is_active() {
                button.set_active(true);
            }
        }
        let (show_left, show_right) = match layout.narrow {
            None => (true, true),
            Some(NarrowPane::List) => (true, false),
            Some(NarrowPane::Content) => (false, true),
        };
        self.left.set_visible(show_left);
        self.separator.set_visible(show_left && show_right);
        self.right.set_visible(show_right);
        self.left.set_hexpand(!show_right);
        self.chat.set_back_visible(layout.narrow.is_some());
        if layout.focus_search {
            self.settings.focus_search();
        }
    }

    fn render_rolls(&self) {
        let session = self.session.borrow();
        let selected = session.current_phone();
        self.sidebar.set_roll(&session.rolls.visible(), selected);
        self.archive.roll().set_view(&session.rolls.view(RollKind::Archive), selected);
    }

    fn load_all(self: &Rc<Self>) {
        for source in Source::ALL {
            self.load_roll(source);
        }
    }

    /// Fetch one roll, showing the cached copy while the request runs.
    fn load_roll(self: &Rc<Self>, source: Source) {
        let cached = match self.storage.borrow().as_ref().map(|s| s.roll(source)) {
            Some(Ok(chats)) => chats,
            Some(Err(e)) => {
                warn!("reading cached {} roll: {e}", source.as_str());
                Vec::new()
            }
            None => Vec::new(),
        };
        {
            let mut session = self.session.borrow_mut();
            session.rolls.set_loading(source);
            session.rolls.set_cached(source, cached);
        }
        self.render_rolls();
        self.fetch_roll(source);
    }

    /// Refetch a roll the user just changed; the rows on screen stay until
    /// the reply replaces them.
    fn refresh_roll(self: &Rc<Self>, source: Source) {
        self.session.borrow_mut().rolls.set_refreshing(source);
        self.fetch_roll(source);
    }

    fn fetch_roll(self: &Rc<Self>, source: Source) {
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        run_async_to_main(
            async move {
                match source {
                    Source::Active => client.active_chats().await,
                    Source::Favourites => client.favourite_chats().await,
                    Source::Archived => client.archived_chats().await,
                }
            },
            move |res: ApiResult<Vec<ChatSummary>>| {
                let Some(this) = weak.upgrade() else { return };
                match res {
                    Ok(chats) => {
                        debug!("{} roll: {} chats", source.as_str(), chats.len());
                        if let Some(storage) = this.storage.borrow_mut().as_mut() {
                            if let Err(e) = storage.replace_roll(source, &chats) {
                                warn!("caching {} roll: {e}", source.as_str());
                            }
                        }
                        this.session.borrow_mut().rolls.set_loaded(source, chats);
                    }
                    Err(e) => {
                        warn!("loading {} roll failed: {e}", source.as_str());
                        this.session.borrow_mut().rolls.set_failed(source);
                    }
                }
                this.render_rolls();
            },
        );
    }

    fn load_own_profile(self: &Rc<Self>) {
        let client = self.client.clone();
        let phone = self.full_phone.clone();
        let weak = Rc::downgrade(self);
        run_async_to_main(async move { client.own_profile(&phone).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            match res {
                Ok(Some(me)) => {
                    let name = me.name.as_deref().unwrap_or_default();
                    let about = me.about.as_deref().unwrap_or_default();
                    let mut session = this.session.borrow_mut();
                    session.profile = ProfileEditor::new(name, about);
                    this.profile.sync(&session.profile);
                }
                Ok(None) => debug!("server did not echo our profile"),
                Err(e) => warn!("loading own profile failed: {e}"),
            }
        });
    }

    fn open_chat(self: &Rc<Self>, phone: String) {
        info!("opening chat with {phone}");
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request_phone = phone.clone();
        run_async_to_main(async move { client.get_or_create_chat(&request_phone).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            let opened = match res {
                Ok(opened) => opened,
                Err(e) => {
                    warn!("get_or_create_chat({phone}) failed: {e}");
                    let text = match e {
                        ApiError::Server(msg) => msg,
                        _ => OPEN_CHAT_FAILED.to_string(),
                    };
                    this.toast(&text);
                    return;
                }
            };
            let (chat, layout) = {
                let mut session = this.session.borrow_mut();
                if let Some(previous) = session.open_chat(&opened, &phone) {
                    previous.close();
                }
                (session.chat().cloned(), session.view.layout())
            };
            // Rendering can fire visibility checks, which borrow the session.
            if let Some(chat) = chat {
                this.chat.show_chat(&chat);
            }
            this.apply_layout(&layout);
            this.render_rolls();
            this.connect_channel(opened.chat_id);
            this.refresh_badge(phone);
        });
    }

    fn connect_channel(self: &Rc<Self>, chat_id: i64) {
        let url = match socket::ws_url(self.client.base_url(), chat_id) {
            Ok(url) => url,
            Err(e) => {
                warn!("no push channel URL: {e}");
                return;
            }
        };
        let cookie = self.client.cookie_header();
        let weak = Rc::downgrade(self);
        run_async_to_main(PushChannel::connect(url, cookie, chat_id), move |res| {
            let Some(this) = weak.upgrade() else { return };
            let (channel, mut frames) = match res {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("push channel for chat {chat_id} failed: {e}");
                    this.toast(&e.to_string());
                    return;
                }
            };
            if let Err(stale) = this.session.borrow_mut().attach_channel(channel) {
                stale.close();
                return;
            }
            let weak = Rc::downgrade(&this);
            glib::MainContext::default().spawn_local(async move {
                while let Some(frame) = frames.recv().await {
                    let Some(this) = weak.upgrade() else { break };
                    this.on_frame(chat_id, &frame);
                }
                debug!("push channel for chat {chat_id} ended");
            });
        });
    }

    fn on_frame(&self, chat_id: i64, frame: &IncomingFrame) {
        let bubble = self.session.borrow_mut().push_frame(chat_id, frame).cloned();
        if let Some(bubble) = bubble {
            self.chat.append_bubble(&bubble);
        }
    }

    fn send(&self, text: &str) {
        match self.session.borrow().send(text) {
            Ok(true) => self.chat.clear_entry(),
            Ok(false) => {}
            Err(e) => self.toast(&e.to_string()),
        }
    }

    fn on_visible(self: &Rc<Self>, message_id: i64, fraction: f64) {
        let Some((id, phone)) = self.session.borrow_mut().observe_read(message_id, fraction) else {
            return;
        };
        self.chat.unwatch(id);
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        run_async_to_main(async move { client.mark_message_read(id).await }, move |res| {
            match res {
                Ok(()) => {
                    if let Some(this) = weak.upgrade() {
                        this.refresh_badge(phone);
                    }
                }
                Err(e) => warn!("marking message {id} read failed: {e}"),
            }
        });
    }

    /// Re-read one chat's unread count and patch its badge.
    fn refresh_badge(self: &Rc<Self>, phone: String) {
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request_phone = phone.clone();
        run_async_to_main(async move { client.chat_status(&request_phone).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            match res {
                Ok(status) => {
                    this.session.borrow_mut().rolls.set_unread(&phone, status.badge_count());
                    this.render_rolls();
                }
                Err(e) => warn!("chat status for {phone} failed: {e}"),
            }
        });
    }

    fn open_menu(self: &Rc<Self>, roll: Rc<RollList>, phone: String, click: (f64, f64)) {
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request_phone = phone.clone();
        run_async_to_main(async move { client.chat_status(&request_phone).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            let status = match res {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!("chat status for {phone} failed: {e}");
                    None
                }
            };
            let (labels, position) = {
                let mut session = this.session.borrow_mut();
                let position = session.menu.open(&phone, status.as_ref(), click, roll.menu().size(), roll.area());
                (session.menu.labels(), position)
            };
            roll.menu().show_at(labels, position);
        });
    }

    fn run_menu_action(self: &Rc<Self>, action: ChatAction) {
        let Some(phone) = self.session.borrow().menu.target().map(str::to_string) else {
            return;
        };
        if action == ChatAction::Archive {
            self.session.borrow_mut().rolls.hide(&phone);
            self.render_rolls();
        }
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request_phone = phone.clone();
        run_async_to_main(async move { client.toggle_chat(&request_phone, action).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            match res {
                Ok(status) => {
                    let follow_up = this.session.borrow_mut().menu.apply(&phone, action, &status);
                    match follow_up {
                        FollowUp::ReloadActiveAndArchived { phone, archived } => {
                            this.session.borrow_mut().rolls.move_archived(&phone, archived);
                            this.render_rolls();
                            this.refresh_roll(Source::Active);
                            this.refresh_roll(Source::Archived);
                        }
                        FollowUp::SetUnread { phone, count } => {
                            this.session.borrow_mut().rolls.set_unread(&phone, count);
                            this.render_rolls();
                        }
                        FollowUp::ReloadFavourites => this.refresh_roll(Source::Favourites),
                    }
                }
                Err(e) => {
                    warn!("{} on {phone} failed: {e}", action.as_str());
                    {
                        let mut session = this.session.borrow_mut();
                        session.menu.hide();
                        session.rolls.unhide(&phone);
                    }
                    this.render_rolls();
                    this.toast(&format!("Failed to {} chat.", action.as_str()));
                }
            }
        });
    }

    fn search(self: &Rc<Self>, text: &str) {
        let query = self.session.borrow_mut().search.set_query(text);
        self.sidebar.set_search_state(self.session.borrow().search.state());
        let Some(query) = query else { return };
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request = query.clone();
        run_async_to_main(async move { client.search(&request).await }, move |res| {
            let Some(this) = weak.upgrade() else { return };
            let changed = match res {
                Ok(results) => this.session.borrow_mut().search.apply(&query, &results),
                Err(e) => {
                    warn!("search {query:?} failed: {e}");
                    this.session.borrow_mut().search.fail(&query)
                }
            };
            if changed {
                this.sidebar.set_search_state(this.session.borrow().search.state());
            }
        });
    }

    fn toggle_profile_field(self: &Rc<Self>, field: ProfileField) {
        let update = {
            let mut session = self.session.borrow_mut();
            if session.profile.is_editing(field) {
                session.profile.set_input(field, &self.profile.input_text(field));
            }
            let update = session.profile.toggle_edit(field);
            self.profile.sync(&session.profile);
            update
        };
        let Some(update) = update else { return };
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        let request = update.clone();
        run_async_to_main(
            async move { client.update_profile_field(request.field, &request.value).await },
            move |res| {
                if let Err(e) = res {
                    warn!("updating {} failed: {e}", update.field.as_str());
                    if let Some(this) = weak.upgrade() {
                        this.toast(&update.failure_text());
                    }
                }
            },
        );
    }

    fn upload_picture(self: &Rc<Self>, path: PathBuf) {
        let Some(file_name) = self.session.borrow_mut().profile.choose_picture(&path) else {
            return;
        };
        self.profile.set_picture(&path);
        let client = self.client.clone();
        let weak = Rc::downgrade(self);
        run_async_to_main(
            async move {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| format!("Could not read {}: {e}", path.display()))?;
                client.upload_profile_picture(&file_name, bytes).await.map_err(|e| match e {
                    ApiError::Network(_) => "Network error while uploading profile picture".to_string(),
                    _ => "Failed to update profile picture".to_string(),
                })
            },
            move |res: Result<(), String>| {
                if let Err(text) = res {
                    warn!("profile picture upload: {text}");
                    if let Some(this) = weak.upgrade() {
                        this.toast(&text);
                    }
                }
            },
        );
    }

    fn new_chat_dialog(self: &Rc<Self>) {
        let dialog = gtk::Dialog::builder()
            .title("Start New Chat")
            .transient_for(&self.window)
            .modal(true)
            .build();
        let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
        content.set_margin_top(12);
        content.set_margin_bottom(12);
        content.set_margin_start(12);
        content.set_margin_end(12);
        let info = gtk::Label::new(Some("Phone number, with country code:"));
        info.set_halign(gtk::Align::Start);
        content.append(&info);
        let entry = gtk::Entry::new();
        entry.set_placeholder_text(Some("+14155552671"));
        entry.set_input_purpose(gtk::InputPurpose::Phone);
        entry.set_activates_default(true);
        content.append(&entry);
        dialog.set_child(Some(&content));
        let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
        let ok_btn = dialog.add_button("Start", gtk::ResponseType::Ok);
        ok_btn.add_css_class("suggested-action");
        dialog.set_default_response(gtk::ResponseType::Ok);

        let weak = Rc::downgrade(self);
        dialog.connect_response(move |dlg, resp| {
            if resp == gtk::ResponseType::Ok {
                let phone = entry.text().trim().to_string();
                if let Some(this) = weak.upgrade() {
                    if crate::session::login::is_valid_phone(&phone) {
                        this.open_chat(phone);
                    } else {
                        this.toast(&crate::session::login::LoginError::InvalidPhone.to_string());
                        return;
                    }
                }
            }
            dlg.close();
        });
        dialog.present();
    }

    fn logout(self: &Rc<Self>) {
        if let Some(channel) = self.session.borrow_mut().take_channel() {
            channel.close();
        }
        let client = self.client.clone();
        let app = self.app.clone();
        let window = self.window.clone();
        let logout_client = client.clone();
        run_async_to_main(async move { logout_client.logout().await }, move |res| {
            if let Err(e) = res {
                warn!("logout request failed: {e}");
            }
            info!("signed out");
            let state = crate::app::AppState::load();
            crate::ui::login::show_login_window(&app, client, &state);
            window.close();
        });
    }
}
