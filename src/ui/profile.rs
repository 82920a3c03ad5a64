use adw::prelude::*;
use gtk4 as gtk;
use log::warn;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::api::models::ProfileField;
use crate::session::ProfileEditor;

struct FieldRow {
    field: ProfileField,
    display: gtk::Label,
    input: gtk::Entry,
    button: gtk::Button,
}

/// Own profile: avatar, name and about with inline editing.
pub struct ProfilePanel {
    root: gtk::Box,
    avatar: adw::Avatar,
    picture_btn: gtk::Button,
    rows: Vec<FieldRow>,
    chooser: RefCell<Option<gtk::FileChooserNative>>,
    on_toggle: RefCell<Option<Rc<dyn Fn(ProfileField)>>>,
    on_picture: RefCell<Option<Rc<dyn Fn(PathBuf)>>>,
}

impl ProfilePanel {
    pub fn new(full_phone: &str) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_margin_top(16);
        root.set_margin_bottom(16);
        root.set_margin_start(16);
        root.set_margin_end(16);

        let title = gtk::Label::new(Some("Profile"));
        title.add_css_class("title-3");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let avatar = adw::Avatar::new(120, None, true);
        let picture_btn = gtk::Button::new();
        picture_btn.add_css_class("flat");
        picture_btn.set_halign(gtk::Align::Center);
        picture_btn.set_tooltip_text(Some("Change profile picture"));
        picture_btn.set_child(Some(&avatar));
        root.append(&picture_btn);

        let phone = gtk::Label::new(Some(full_phone));
        phone.add_css_class("dim-label");
        phone.set_selectable(true);
        root.append(&phone);

        let mut rows = Vec::new();
        for (field, caption) in [(ProfileField::Name, "Your name"), (ProfileField::About, "About")] {
            let heading = gtk::Label::new(Some(caption));
            heading.add_css_class("caption-heading");
            heading.set_halign(gtk::Align::Start);
            root.append(&heading);

            let line = gtk::Box::new(gtk::Orientation::Horizontal, 6);
            let display = gtk::Label::new(None);
            display.set_hexpand(true);
            display.set_halign(gtk::Align::Start);
            display.set_wrap(true);
            let input = gtk::Entry::new();
            input.set_hexpand(true);
            input.set_visible(false);
            let button = gtk::Button::from_icon_name("document-edit-symbolic");
            button.add_css_class("flat");
            line.append(&display);
            line.append(&input);
            line.append(&button);
            root.append(&line);
            rows.push(FieldRow { field, display, input, button });
        }

        let this = Rc::new(Self {
            root,
            avatar,
            picture_btn,
            rows,
            chooser: RefCell::new(None),
            on_toggle: RefCell::new(None),
            on_picture: RefCell::new(None),
        });

        for row in &this.rows {
            let field = row.field;
            let weak = Rc::downgrade(&this);
            let fire: Rc<dyn Fn()> = Rc::new(move || {
                let handler = weak.upgrade().and_then(|this| this.on_toggle.borrow().clone());
                if let Some(handler) = handler {
                    handler(field);
                }
            });
            let on_click = fire.clone();
            row.button.connect_clicked(move |_| on_click());
            row.input.connect_activate(move |_| fire());
        }
        {
            let weak = Rc::downgrade(&this);
            this.picture_btn.connect_clicked(move |button| {
                if let Some(this) = weak.upgrade() {
                    this.choose_picture(button);
                }
            });
        }
        this
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_toggle(&self, f: impl Fn(ProfileField) + 'static) {
        self.on_toggle.replace(Some(Rc::new(f)));
    }

    pub fn connect_picture(&self, f: impl Fn(PathBuf) + 'static) {
        self.on_picture.replace(Some(Rc::new(f)));
    }

    pub fn input_text(&self, field: ProfileField) -> String {
        self.rows
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.input.text().to_string())
            .unwrap_or_default()
    }

    /// Show each field in view or edit mode as the editor says.
    pub fn sync(&self, editor: &ProfileEditor) {
        for row in &self.rows {
            let editing = editor.is_editing(row.field);
            row.display.set_label(editor.display(row.field));
            row.display.set_visible(!editing);
            row.input.set_text(editor.input(row.field));
            row.input.set_visible(editing);
            row.button.set_icon_name(if editing { "object-select-symbolic" } else { "document-edit-symbolic" });
            if editing {
                row.input.grab_focus();
            }
        }
        self.avatar.set_text(Some(editor.display(ProfileField::Name)));
    }

    pub fn set_picture(&self, path: &Path) {
        match gtk::gdk::Texture::from_file(&gtk::gio::File::for_path(path)) {
            Ok(texture) => self.avatar.set_custom_image(Some(&texture)),
            Err(e) => warn!("cannot preview {}: {e}", path.display()),
        }
    }

    fn choose_picture(self: &Rc<Self>, anchor: &gtk::Button) {
        let parent = anchor.root().and_then(|r| r.downcast::<gtk::Window>().ok());
        let chooser = gtk::FileChooserNative::new(
            Some("Choose a profile picture"),
            parent.as_ref(),
            gtk::FileChooserAction::Open,
            Some("Select"),
            Some("Cancel"),
        );
        let filter = gtk::FileFilter::new();
        filter.set_name(Some("Images"));
        filter.add_mime_type("image/*");
        chooser.add_filter(&filter);

        let weak = Rc::downgrade(self);
        chooser.connect_response(move |dialog, response| {
            let Some(this) = weak.upgrade() else { return };
            if response == gtk::ResponseType::Accept {
                if let Some(path) = dialog.file().and_then(|f| f.path()) {
                    let handler = this.on_picture.borrow().clone();
                    if let Some(handler) = handler {
                        handler(path);
                    }
                }
            }
            this.chooser.replace(None);
        });
        chooser.show();
        self.chooser.replace(Some(chooser));
    }
}
