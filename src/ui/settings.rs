use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

/// Left pane of the Settings view: a filterable list of settings rows and
/// the logout button.
pub struct SettingsPanel {
    root: gtk::Box,
    search: gtk::SearchEntry,
    logout_btn: gtk::Button,
}

fn setting_row(title: &str, value: &str) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    row.set_activatable(false);
    // Lower-cased title and value, matched by the search entry.
    row.set_widget_name(&format!("{title} {value}").to_lowercase());
    let content = gtk::Box::new(gtk::Orientation::Vertical, 2);
    content.set_margin_top(8);
    content.set_margin_bottom(8);
    content.set_margin_start(8);
    content.set_margin_end(8);
    let title = gtk::Label::new(Some(title));
    title.add_css_class("heading");
    title.set_halign(gtk::Align::Start);
    let value = gtk::Label::new(Some(value));
    value.add_css_class("dim-label");
    value.set_halign(gtk::Align::Start);
    value.set_selectable(true);
    value.set_ellipsize(gtk::pango::EllipsizeMode::Middle);
    content.append(&title);
    content.append(&value);
    row.set_child(Some(&content));
    row
}

impl SettingsPanel {
    pub fn new(full_phone: &str, server: &str) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Settings"));
        title.add_css_class("title-3");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let search = gtk::SearchEntry::new();
        search.set_placeholder_text(Some("Search settings"));
        root.append(&search);

        let list = gtk::ListBox::new();
        list.add_css_class("boxed-list");
        list.set_selection_mode(gtk::SelectionMode::None);
        list.append(&setting_row("Account", full_phone));
        list.append(&setting_row("Server", server));
        list.append(&setting_row("Version", env!("CARGO_PKG_VERSION")));
        root.append(&list);

        let spacer = gtk::Box::new(gtk::Orientation::Vertical, 0);
        spacer.set_vexpand(true);
        root.append(&spacer);

        let logout_btn = gtk::Button::with_label("Log out");
        logout_btn.add_css_class("destructive-action");
        root.append(&logout_btn);

        {
            let search = search.clone();
            list.set_filter_func(move |row| {
                let needle = search.text().trim().to_lowercase();
                needle.is_empty() || row.widget_name().contains(needle.as_str())
            });
        }
        {
            let list = list.clone();
            search.connect_search_changed(move |_| list.invalidate_filter());
        }

        Rc::new(Self { root, search, logout_btn })
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn focus_search(&self) {
        self.search.grab_focus();
    }

    pub fn connect_logout(&self, f: impl Fn() + 'static) {
        self.logout_btn.connect_clicked(move |_| f());
    }
}
