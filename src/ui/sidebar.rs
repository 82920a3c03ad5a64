use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::models::{ChatAction, ChatSummary};
use crate::session::context_menu::MenuLabels;
use crate::session::rolls::{RollKind, RollView};
use crate::session::search::{SEARCH_FAILED, SearchEntry, SearchState};

type PhoneHandler = RefCell<Option<Rc<dyn Fn(String)>>>;
type MenuHandler = RefCell<Option<Rc<dyn Fn(String, f64, f64)>>>;
type ActionHandler = RefCell<Option<Rc<dyn Fn(ChatAction)>>>;
type FilterHandler = RefCell<Option<Rc<dyn Fn(RollKind)>>>;
type ClickHandler = RefCell<Option<Rc<dyn Fn()>>>;

fn chat_row(phone: &str, name: &str, time: &str, preview: &str, unread: u32) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    // The phone rides on the row so activation and right-click can find it.
    row.set_widget_name(phone);

    let content = gtk::Box::new(gtk::Orientation::Horizontal, 10);
    content.set_margin_top(6);
    content.set_margin_bottom(6);
    content.set_margin_start(8);
    content.set_margin_end(8);
    content.append(&adw::Avatar::new(40, Some(name), true));

    let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text.set_hexpand(true);
    let top = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let name_label = gtk::Label::new(Some(name));
    name_label.add_css_class("heading");
    name_label.set_halign(gtk::Align::Start);
    name_label.set_hexpand(true);
    name_label.set_ellipsize(gtk::pango::EllipsizeMode::End);
    let time_label = gtk::Label::new(Some(time));
    time_label.add_css_class("dim-label");
    time_label.add_css_class("caption");
    top.append(&name_label);
    top.append(&time_label);

    let bottom = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let preview_label = gtk::Label::new(Some(preview));
    preview_label.add_css_class("dim-label");
    preview_label.set_halign(gtk::Align::Start);
    preview_label.set_hexpand(true);
    preview_label.set_ellipsize(gtk::pango::EllipsizeMode::End);
    bottom.append(&preview_label);
    if unread > 0 {
        let badge = gtk::Label::new(Some(&unread.to_string()));
        badge.add_css_class("unread-badge");
        bottom.append(&badge);
    }
    text.append(&top);
    text.append(&bottom);
    content.append(&text);
    row.set_child(Some(&content));
    row
}

fn summary_row(chat: &ChatSummary) -> gtk::ListBoxRow {
    chat_row(&chat.phone, &chat.name, &chat.time, &chat.message, chat.unread_count)
}

fn search_row(entry: &SearchEntry) -> gtk::ListBoxRow {
    let row = chat_row(
        entry.phone.as_deref().unwrap_or_default(),
        &entry.name,
        &entry.time,
        &entry.preview,
        entry.unread_count,
    );
    row.set_activatable(entry.phone.is_some());
    row
}

/// Archive / mark-read / favourite popover of a roll.
pub struct ChatMenu {
    popover: gtk::Popover,
    buttons: Vec<(ChatAction, gtk::Button)>,
    on_action: ActionHandler,
}

impl ChatMenu {
    fn new(parent: &impl IsA<gtk::Widget>) -> Rc<Self> {
        let popover = gtk::Popover::new();
        popover.set_has_arrow(false);
        popover.set_position(gtk::PositionType::Bottom);
        let column = gtk::Box::new(gtk::Orientation::Vertical, 0);
        let labels = MenuLabels::default();
        let buttons: Vec<(ChatAction, gtk::Button)> = [ChatAction::Archive, ChatAction::MarkRead, ChatAction::Favourite]
            .into_iter()
            .map(|action| {
                let button = gtk::Button::with_label(labels.get(action));
                button.add_css_class("flat");
                column.append(&button);
                (action, button)
            })
            .collect();
        popover.set_child(Some(&column));
        popover.set_parent(parent);

        let this = Rc::new(Self { popover, buttons, on_action: RefCell::new(None) });
        for (action, button) in &this.buttons {
            let weak = Rc::downgrade(&this);
            let action = *action;
            button.connect_clicked(move |_| {
                let Some(this) = weak.upgrade() else { return };
                this.popover.popdown();
                let handler = this.on_action.borrow().clone();
                if let Some(handler) = handler {
                    handler(action);
                }
            });
        }
        this
    }

    pub fn size(&self) -> (f64, f64) {
        let (_, natural) = self.popover.preferred_size();
        (natural.width() as f64, natural.height() as f64)
    }

    pub fn show_at(&self, labels: MenuLabels, position: (f64, f64)) {
        for (action, button) in &self.buttons {
            button.set_label(labels.get(*action));
        }
        let rect = gtk::gdk::Rectangle::new(position.0 as i32, position.1 as i32, 1, 1);
        self.popover.set_pointing_to(Some(&rect));
        self.popover.popup();
    }

    pub fn hide(&self) {
        self.popover.popdown();
    }
}

/// One rendered roll with its placeholder line and context menu.
pub struct RollList {
    root: gtk::ScrolledWindow,
    list: gtk::ListBox,
    placeholder: gtk::Label,
    menu: Rc<ChatMenu>,
    on_open: PhoneHandler,
    on_menu: MenuHandler,
}

impl RollList {
    pub fn new() -> Rc<Self> {
        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        list.set_selection_mode(gtk::SelectionMode::Single);
        let placeholder = gtk::Label::new(None);
        placeholder.add_css_class("dim-label");
        placeholder.set_margin_top(24);
        list.set_placeholder(Some(&placeholder));
        let root = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&list)
            .build();
        let menu = ChatMenu::new(&list);

        let this = Rc::new(Self {
            root,
            list,
            placeholder,
            menu,
            on_open: RefCell::new(None),
            on_menu: RefCell::new(None),
        });

        {
            let weak = Rc::downgrade(&this);
            this.list.connect_row_activated(move |_, row| {
                let phone = row.widget_name().to_string();
                let handler = weak.upgrade().and_then(|this| this.on_open.borrow().clone());
                if let (false, Some(handler)) = (phone.is_empty(), handler) {
                    handler(phone);
                }
            });
        }
        {
            let gesture = gtk::GestureClick::new();
            gesture.set_button(3);
            let weak = Rc::downgrade(&this);
            gesture.connect_pressed(move |_, _, x, y| {
                let Some(this) = weak.upgrade() else { return };
                let Some(row) = this.list.row_at_y(y as i32) else { return };
                let phone = row.widget_name().to_string();
                let handler = this.on_menu.borrow().clone();
                if let (false, Some(handler)) = (phone.is_empty(), handler) {
                    handler(phone, x, y);
                }
            });
            this.list.add_controller(gesture);
        }
        this
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn menu(&self) -> &ChatMenu {
        &self.menu
    }

    /// Size of the area the menu must stay inside.
    pub fn area(&self) -> (f64, f64) {
        (self.list.width() as f64, self.list.height() as f64)
    }

    pub fn connect_open(&self, f: impl Fn(String) + 'static) {
        self.on_open.replace(Some(Rc::new(f)));
    }

    /// Right-click on a row: phone and pointer position in list coordinates.
    pub fn connect_menu(&self, f: impl Fn(String, f64, f64) + 'static) {
        self.on_menu.replace(Some(Rc::new(f)));
    }

    pub fn connect_action(&self, f: impl Fn(ChatAction) + 'static) {
        self.menu.on_action.replace(Some(Rc::new(f)));
    }

    /// The menu went away, by a pick or a click elsewhere.
    pub fn connect_menu_closed(&self, f: impl Fn() + 'static) {
        self.menu.popover.connect_closed(move |_| f());
    }

    pub fn set_view(&self, view: &RollView<'_>, selected: Option<&str>) {
        crate::ui::clear_list(&self.list);
        self.placeholder.set_label(view.placeholder.unwrap_or_default());
        if view.failed {
            self.placeholder.add_css_class("error-text");
        } else {
            self.placeholder.remove_css_class("error-text");
        }
        for chat in &view.entries {
            let row = summary_row(chat);
            self.list.append(&row);
            if selected == Some(chat.phone.as_str()) {
                self.list.select_row(Some(&row));
            }
        }
    }
}

/// Left pane of the Chats view: search, filter buttons and the filtered roll.
pub struct Sidebar {
    root: gtk::Box,
    search: gtk::SearchEntry,
    filters: Vec<(RollKind, gtk::ToggleButton)>,
    stack: gtk::Stack,
    roll: Rc<RollList>,
    results: gtk::Box,
    archive_btn: gtk::Button,
    on_open: PhoneHandler,
    on_filter: FilterHandler,
    on_search: PhoneHandler,
    on_archive: ClickHandler,
}

impl Sidebar {
    pub fn new() -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Chats"));
        title.add_css_class("title-3");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let search = gtk::SearchEntry::new();
        search.set_placeholder_text(Some("Search chats, people and messages"));
        root.append(&search);

        let filter_row = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        filter_row.add_css_class("linked");
        let mut filters: Vec<(RollKind, gtk::ToggleButton)> = Vec::new();
        for kind in RollKind::FILTERS {
            let button = gtk::ToggleButton::with_label(kind.label());
            if let Some((_, first)) = filters.first() {
                button.set_group(Some(first));
            }
            button.set_active(kind == RollKind::All);
            filter_row.append(&button);
            filters.push((kind, button));
        }
        root.append(&filter_row);

        let archive_btn = gtk::Button::new();
        archive_btn.add_css_class("flat");
        let archive_content = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        archive_content.append(&gtk::Image::from_icon_name("folder-symbolic"));
        archive_content.append(&gtk::Label::new(Some(RollKind::Archive.label())));
        archive_btn.set_child(Some(&archive_content));
        root.append(&archive_btn);

        let roll = RollList::new();
        let results = gtk::Box::new(gtk::Orientation::Vertical, 4);
        let results_scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&results)
            .build();
        let stack = gtk::Stack::new();
        stack.set_vexpand(true);
        stack.add_named(&roll.widget(), Some("roll"));
        stack.add_named(&results_scroller, Some("search"));
        root.append(&stack);

        let this = Rc::new(Self {
            root,
            search,
            filters,
            stack,
            roll,
            results,
            archive_btn,
            on_open: RefCell::new(None),
            on_filter: RefCell::new(None),
            on_search: RefCell::new(None),
            on_archive: RefCell::new(None),
        });
        this.wire();
        this
    }

    fn wire(self: &Rc<Self>) {
        for (kind, button) in &self.filters {
            let weak = Rc::downgrade(self);
            let kind = *kind;
            button.connect_toggled(move |button| {
                if !button.is_active() {
                    return;
                }
                let handler = weak.upgrade().and_then(|this| this.on_filter.borrow().clone());
                if let Some(handler) = handler {
                    handler(kind);
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.search.connect_search_changed(move |entry| {
                let handler = weak.upgrade().and_then(|this| this.on_search.borrow().clone());
                if let Some(handler) = handler {
                    handler(entry.text().to_string());
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.archive_btn.connect_clicked(move |_| {
                let handler = weak.upgrade().and_then(|this| this.on_archive.borrow().clone());
                if let Some(handler) = handler {
                    handler();
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.roll.connect_open(move |phone| {
                if let Some(this) = weak.upgrade() {
                    this.open(phone);
                }
            });
        }
    }

    fn open(&self, phone: String) {
        let handler = self.on_open.borrow().clone();
        if let Some(handler) = handler {
            handler(phone);
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn roll(&self) -> &Rc<RollList> {
        &self.roll
    }

    pub fn connect_open(&self, f: impl Fn(String) + 'static) {
        self.on_open.replace(Some(Rc::new(f)));
    }

    pub fn connect_filter(&self, f: impl Fn(RollKind) + 'static) {
        self.on_filter.replace(Some(Rc::new(f)));
    }

    pub fn connect_search(&self, f: impl Fn(String) + 'static) {
        self.on_search.replace(Some(Rc::new(f)));
    }

    pub fn connect_archive(&self, f: impl Fn() + 'static) {
        self.on_archive.replace(Some(Rc::new(f)));
    }

    pub fn set_roll(&self, view: &RollView<'_>, selected: Option<&str>) {
        self.roll.set_view(view, selected);
    }

    pub fn set_search_state(self: &Rc<Self>, state: &SearchState) {
        crate::ui::clear_box(&self.results);
        match state {
            SearchState::Hidden => {
                self.stack.set_visible_child_name("roll");
                return;
            }
            SearchState::Loading => {
                let spinner = gtk::Spinner::new();
                spinner.set_spinning(true);
                spinner.set_margin_top(24);
                self.results.append(&spinner);
            }
            SearchState::Failed => {
                let label = gtk::Label::new(Some(SEARCH_FAILED));
                label.add_css_class("error-text");
                label.set_margin_top(24);
                self.results.append(&label);
            }
            SearchState::Results(sections) => {
                for section in sections {
                    let heading = gtk::Label::new(Some(section.label));
                    heading.add_css_class("roll-label");
                    heading.set_halign(gtk::Align::Start);
                    self.results.append(&heading);
                    if let Some(text) = section.placeholder() {
                        let empty = gtk::Label::new(Some(text));
                        empty.add_css_class("dim-label");
                        empty.set_halign(gtk::Align::Start);
                        empty.set_margin_start(8);
                        self.results.append(&empty);
                        continue;
                    }
                    let list = gtk::ListBox::new();
                    list.add_css_class("navigation-sidebar");
                    for entry in &section.entries {
                        list.append(&search_row(entry));
                    }
                    let weak = Rc::downgrade(self);
                    list.connect_row_activated(move |_, row| {
                        let phone = row.widget_name().to_string();
                        if let (false, Some(this)) = (phone.is_empty(), weak.upgrade()) {
                            this.open(phone);
                        }
                    });
                    self.results.append(&list);
                }
            }
        }
        self.stack.set_visible_child_name("search");
    }
}

/// The archived roll, opened from the Chats view.
pub struct ArchivePanel {
    root: gtk::Box,
    back_btn: gtk::Button,
    roll: Rc<RollList>,
}

impl ArchivePanel {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let back_btn = gtk::Button::from_icon_name("go-previous-symbolic");
        back_btn.add_css_class("flat");
        let title = gtk::Label::new(Some(RollKind::Archive.label()));
        title.add_css_class("title-3");
        header.append(&back_btn);
        header.append(&title);
        root.append(&header);
        let roll = RollList::new();
        root.append(&roll.widget());
        Self { root, back_btn, roll }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn roll(&self) -> &Rc<RollList> {
        &self.roll
    }

    pub fn connect_back(&self, f: impl Fn() + 'static) {
        self.back_btn.connect_clicked(move |_| f());
    }
}
