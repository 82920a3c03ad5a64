pub mod chat_view;
pub mod login;
pub mod main_window;
pub mod profile;
pub mod settings;
pub mod sidebar;

use adw::prelude::*;
use gtk4 as gtk;

const CSS: &str = r#"
.chat-bubble { padding: 6px 10px; border-radius: 12px; margin: 1px 12px; }
.chat-bubble.sent { background-color: alpha(@accent_bg_color, 0.25); }
.chat-bubble.received { background-color: alpha(@view_fg_color, 0.08); }
.chat-bubble.first { margin-top: 10px; }
.chat-times { font-size: smaller; opacity: 0.7; }
.ticks.read { color: #53bdeb; }
.unread-badge {
    background-color: @accent_bg_color;
    color: @accent_fg_color;
    border-radius: 999px;
    padding: 0 7px;
    font-size: smaller;
    font-weight: bold;
}
.tempstate { opacity: 0.55; }
.error-text { color: @error_color; }
.roll-label { font-weight: bold; opacity: 0.7; margin: 8px 8px 2px 8px; }
"#;

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    if let Some(display) = gtk::gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

pub(crate) fn toast(overlay: &adw::ToastOverlay, text: &str) {
    overlay.add_toast(adw::Toast::new(text));
}

pub(crate) fn clear_list(list: &gtk::ListBox) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
}

pub(crate) fn clear_box(container: &gtk::Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

/// Window shown when the app cannot start at all.
pub fn show_fatal(app: &adw::Application, message: &str) {
    let page = adw::StatusPage::builder()
        .icon_name("dialog-error-symbolic")
        .title("Messenger cannot start")
        .description(message)
        .build();
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    container.append(&adw::HeaderBar::new());
    container.append(&page);
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Messenger")
        .default_width(420)
        .default_height(300)
        .content(&container)
        .build();
    window.present();
}
