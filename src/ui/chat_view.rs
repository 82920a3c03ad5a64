use adw::prelude::*;
use gtk4 as gtk;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::session::ActiveChat;
use crate::session::bubbles::{Bubble, Ticks};
use crate::session::read_tracker::visible_fraction;

type TextHandler = RefCell<Option<Rc<dyn Fn(String)>>>;
type VisibleHandler = RefCell<Option<Rc<dyn Fn(i64, f64)>>>;
type ClickHandler = RefCell<Option<Rc<dyn Fn()>>>;

/// The chat pane: peer header, bubble timeline, composer and the peer's
/// profile drawer.
pub struct ChatView {
    root: gtk::Box,
    back_btn: gtk::Button,
    header_avatar: adw::Avatar,
    header_name: gtk::Button,
    drawer: gtk::Revealer,
    drawer_avatar: adw::Avatar,
    drawer_name: gtk::Label,
    drawer_phone: gtk::Label,
    drawer_about: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    send_btn: gtk::Button,
    pin_bottom: Cell<bool>,
    watched: RefCell<Vec<(i64, gtk::Widget)>>,
    on_send: TextHandler,
    on_visible: VisibleHandler,
    on_back: ClickHandler,
}

impl ChatView {
    pub fn new() -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 0);

        // Header
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 12);
        header.set_margin_top(8);
        header.set_margin_bottom(8);
        header.set_margin_start(12);
        header.set_margin_end(12);
        let back_btn = gtk::Button::from_icon_name("go-previous-symbolic");
        back_btn.add_css_class("flat");
        back_btn.set_visible(false);
        let header_avatar = adw::Avatar::new(40, None, true);
        let header_name = gtk::Button::with_label("");
        header_name.add_css_class("flat");
        header.append(&back_btn);
        header.append(&header_avatar);
        header.append(&header_name);
        root.append(&header);
        root.append(&gtk::Separator::new(gtk::Orientation::Horizontal));

        let body = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        body.set_vexpand(true);

        let column = gtk::Box::new(gtk::Orientation::Vertical, 6);
        column.set_hexpand(true);
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 2);
        messages_box.set_margin_bottom(8);
        scroller.set_child(Some(&messages_box));
        column.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        input_row.set_margin_start(8);
        input_row.set_margin_end(8);
        input_row.set_margin_bottom(8);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type a message"));
        let send_btn = gtk::Button::from_icon_name("audio-input-microphone-symbolic");
        send_btn.set_sensitive(false);
        input_row.append(&entry);
        input_row.append(&send_btn);
        column.append(&input_row);
        body.append(&column);

        // Peer profile drawer
        let drawer = gtk::Revealer::builder()
            .transition_type(gtk::RevealerTransitionType::SlideLeft)
            .reveal_child(false)
            .build();
        let drawer_box = gtk::Box::new(gtk::Orientation::Vertical, 12);
        drawer_box.set_width_request(260);
        drawer_box.set_margin_top(12);
        drawer_box.set_margin_start(12);
        drawer_box.set_margin_end(12);
        let drawer_close = gtk::Button::from_icon_name("window-close-symbolic");
        drawer_close.add_css_class("flat");
        drawer_close.set_halign(gtk::Align::End);
        let drawer_avatar = adw::Avatar::new(120, None, true);
        let drawer_name = gtk::Label::new(None);
        drawer_name.add_css_class("title-2");
        let drawer_phone = gtk::Label::new(None);
        drawer_phone.add_css_class("dim-label");
        drawer_phone.set_selectable(true);
        let about_title = gtk::Label::new(Some("About"));
        about_title.add_css_class("dim-label");
        about_title.set_halign(gtk::Align::Start);
        about_title.set_margin_top(12);
        let drawer_about = gtk::Label::new(None);
        drawer_about.set_halign(gtk::Align::Start);
        drawer_about.set_wrap(true);
        drawer_about.set_xalign(0.0);
        drawer_box.append(&drawer_close);
        drawer_box.append(&drawer_avatar);
        drawer_box.append(&drawer_name);
        drawer_box.append(&drawer_phone);
        drawer_box.append(&about_title);
        drawer_box.append(&drawer_about);
        drawer.set_child(Some(&drawer_box));
        body.append(&drawer);
        root.append(&body);

        let this = Rc::new(Self {
            root,
            back_btn,
            header_avatar,
            header_name,
            drawer,
            drawer_avatar,
            drawer_name,
            drawer_phone,
            drawer_about,
            scroller,
            messages_box,
            entry,
            send_btn,
            pin_bottom: Cell::new(false),
            watched: RefCell::new(Vec::new()),
            on_send: RefCell::new(None),
            on_visible: RefCell::new(None),
            on_back: RefCell::new(None),
        });
        this.wire();
        this
    }

    fn wire(self: &Rc<Self>) {
        {
            let send_btn = self.send_btn.clone();
            self.entry.connect_changed(move |entry| {
                let has_text = !entry.text().trim().is_empty();
                send_btn.set_sensitive(has_text);
                send_btn.set_icon_name(if has_text { "mail-send-symbolic" } else { "audio-input-microphone-symbolic" });
                if has_text {
                    send_btn.add_css_class("suggested-action");
                } else {
                    send_btn.remove_css_class("suggested-action");
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.send_btn.connect_clicked(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.submit();
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.entry.connect_activate(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.submit();
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            self.back_btn.connect_clicked(move |_| {
                let handler = weak.upgrade().and_then(|this| this.on_back.borrow().clone());
                if let Some(handler) = handler {
                    handler();
                }
            });
        }
        {
            let drawer = self.drawer.clone();
            self.header_name.connect_clicked(move |_| {
                drawer.set_reveal_child(!drawer.reveals_child());
            });
        }
        if let Some(close) = self
            .drawer
            .child()
            .and_then(|c| c.first_child())
            .and_then(|c| c.downcast::<gtk::Button>().ok())
        {
            let drawer = self.drawer.clone();
            close.connect_clicked(move |_| drawer.set_reveal_child(false));
        }

        let adj = self.scroller.vadjustment();
        {
            let weak = Rc::downgrade(self);
            adj.connect_changed(move |adj| {
                if let Some(this) = weak.upgrade() {
                    if this.pin_bottom.replace(false) {
                        adj.set_value(adj.upper() - adj.page_size());
                    }
                    this.check_visibility();
                }
            });
        }
        {
            let weak = Rc::downgrade(self);
            adj.connect_value_changed(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.check_visibility();
                }
            });
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_send(&self, f: impl Fn(String) + 'static) {
        self.on_send.replace(Some(Rc::new(f)));
    }

    /// Called with a received message id and the share of its bubble that
    /// is on screen.
    pub fn connect_visible(&self, f: impl Fn(i64, f64) + 'static) {
        self.on_visible.replace(Some(Rc::new(f)));
    }

    pub fn connect_back(&self, f: impl Fn() + 'static) {
        self.on_back.replace(Some(Rc::new(f)));
    }

    pub fn set_back_visible(&self, visible: bool) {
        self.back_btn.set_visible(visible);
    }

    pub fn clear_entry(&self) {
        self.entry.set_text("");
    }

    fn submit(&self) {
        let text = self.entry.text().to_string();
        if text.trim().is_empty() {
            return;
        }
        let handler = self.on_send.borrow().clone();
        if let Some(handler) = handler {
            handler(text);
        }
    }

    /// Render a freshly opened chat.
    pub fn show_chat(&self, chat: &ActiveChat) {
        let peer = &chat.peer;
        self.header_avatar.set_text(Some(&peer.username));
        self.header_name.set_label(&peer.username);
        self.drawer_avatar.set_text(Some(&peer.username));
        self.drawer_name.set_label(&peer.username);
        self.drawer_phone.set_label(peer.display_phone());
        self.drawer_about.set_label(peer.about_line());
        self.drawer.set_reveal_child(false);

        self.watched.borrow_mut().clear();
        crate::ui::clear_box(&self.messages_box);
        for bubble in &chat.bubbles {
            self.push_widget(bubble);
        }
        self.pin_bottom.set(true);
        self.entry.grab_focus();
    }

    pub fn append_bubble(&self, bubble: &Bubble) {
        self.push_widget(bubble);
        self.pin_bottom.set(true);
    }

    /// Stop checking a message that has been reported read.
    pub fn unwatch(&self, message_id: i64) {
        self.watched.borrow_mut().retain(|(id, _)| *id != message_id);
    }

    fn push_widget(&self, bubble: &Bubble) {
        let widget = bubble_widget(bubble);
        self.messages_box.append(&widget);
        if let (false, Some(id)) = (bubble.is_sent(), bubble.message_id) {
            self.watched.borrow_mut().push((id, widget));
        }
    }

    fn check_visibility(&self) {
        let handler = self.on_visible.borrow().clone();
        let Some(handler) = handler else { return };
        let adj = self.scroller.vadjustment();
        let (top, height) = (adj.value(), adj.page_size());
        let watched = self.watched.borrow().clone();
        for (id, widget) in watched {
            if let Some(bounds) = widget.compute_bounds(&self.messages_box) {
                handler(id, visible_fraction(bounds.y() as f64, bounds.height() as f64, top, height));
            }
        }
    }
}

fn bubble_widget(bubble: &Bubble) -> gtk::Widget {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 2);
    root.add_css_class("chat-bubble");
    root.add_css_class(if bubble.is_sent() { "sent" } else { "received" });
    if bubble.first_in_group {
        root.add_css_class("first");
    }
    root.set_halign(if bubble.is_sent() { gtk::Align::End } else { gtk::Align::Start });

    let text = gtk::Label::new(Some(&bubble.text));
    text.set_wrap(true);
    text.set_xalign(0.0);
    text.set_selectable(true);
    text.set_max_width_chars(60);
    root.append(&text);

    let meta = gtk::Box::new(gtk::Orientation::Horizontal, 4);
    meta.add_css_class("chat-times");
    meta.set_halign(gtk::Align::End);
    meta.append(&gtk::Label::new(Some(&bubble.time)));
    if let Some(ticks) = bubble.ticks {
        let mark = gtk::Label::new(Some(if ticks == Ticks::Sent { "✓" } else { "✓✓" }));
        mark.add_css_class("ticks");
        if ticks == Ticks::Read {
            mark.add_css_class("read");
        }
        meta.append(&mark);
    }
    root.append(&meta);
    root.upcast()
}
