use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::ApiClient;
use crate::app::AppState;
use crate::session::login::{self, LoginForm, LoginStep};

struct LoginWidgets {
    window: adw::ApplicationWindow,
    overlay: adw::ToastOverlay,
    server_entry: gtk::Entry,
    code_entry: gtk::Entry,
    number_entry: gtk::Entry,
    pass_entry: gtk::PasswordEntry,
    confirm_entry: gtk::PasswordEntry,
    status: gtk::Label,
    button: gtk::Button,
}

impl LoginWidgets {
    fn sync(&self, form: &LoginForm) {
        let step = form.step();
        self.pass_entry.set_visible(step != LoginStep::Phone);
        self.confirm_entry.set_visible(step == LoginStep::Register);
        self.button.set_label(form.button_label());
        match step {
            LoginStep::Phone => {
                self.pass_entry.set_text("");
                self.confirm_entry.set_text("");
            }
            LoginStep::Password => {
                self.pass_entry.set_placeholder_text(Some("Password"));
                self.pass_entry.grab_focus();
            }
            LoginStep::Register => {
                self.pass_entry.set_placeholder_text(Some("Choose a password"));
                self.pass_entry.grab_focus();
            }
        }
    }

    fn set_status(&self, text: &str, error: bool) {
        self.status.set_label(text);
        if error {
            self.status.add_css_class("error-text");
        } else {
            self.status.remove_css_class("error-text");
        }
    }

    fn set_busy(&self, busy: bool) {
        self.button.set_sensitive(!busy);
    }

    fn toast(&self, text: &str) {
        crate::ui::toast(&self.overlay, text);
    }
}

pub fn show_login_window(app: &Application, client: ApiClient, state: &AppState) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Messenger Login")
        .default_width(420)
        .default_height(360)
        .resizable(false)
        .build();

    let overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Sign in with your phone"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    // Phone
    let code_entry = gtk::Entry::new();
    code_entry.set_text(&state.country_code);
    code_entry.set_width_chars(5);
    code_entry.set_max_width_chars(5);
    let number_entry = gtk::Entry::new();
    number_entry.set_placeholder_text(Some("Phone number"));
    number_entry.set_hexpand(true);
    number_entry.set_input_purpose(gtk::InputPurpose::Phone);
    if let Some(last) = &state.last_phone {
        number_entry.set_text(last);
    }
    let phone_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    phone_row.append(&code_entry);
    phone_row.append(&number_entry);

    // Passwords, revealed by the second step
    let pass_entry = gtk::PasswordEntry::new();
    pass_entry.set_show_peek_icon(true);
    pass_entry.set_hexpand(true);
    pass_entry.set_visible(false);
    let confirm_entry = gtk::PasswordEntry::new();
    confirm_entry.set_placeholder_text(Some("Confirm password"));
    confirm_entry.set_show_peek_icon(true);
    confirm_entry.set_visible(false);

    let form_box = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form_box.append(&phone_row);
    form_box.append(&pass_entry);
    form_box.append(&confirm_entry);
    root.append(&form_box);

    // Server URL, tucked away
    let server_entry = gtk::Entry::new();
    server_entry.set_text(&state.base_url);
    server_entry.set_placeholder_text(Some("Server URL (e.g. https://chat.example.com)"));
    let expander = gtk::Expander::new(Some("Server"));
    expander.set_child(Some(&server_entry));
    root.append(&expander);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    status.set_wrap(true);
    root.append(&status);

    let button = gtk::Button::with_label("Next");
    button.add_css_class("suggested-action");
    button.set_halign(gtk::Align::End);
    root.append(&button);

    overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some("Messenger"))));
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let widgets = Rc::new(LoginWidgets {
        window: window.clone(),
        overlay,
        server_entry,
        code_entry,
        number_entry,
        pass_entry,
        confirm_entry,
        status,
        button,
    });
    let form = Rc::new(RefCell::new(LoginForm::new(&state.country_code)));
    let client = Rc::new(RefCell::new(client));

    bootstrap(&client.borrow(), &widgets);

    let on_submit: Rc<dyn Fn()> = {
        let app = app.clone();
        let widgets = widgets.clone();
        let form = form.clone();
        let client = client.clone();
        Rc::new(move || submit(&app, &widgets, &form, &client))
    };
    {
        let on_submit = on_submit.clone();
        widgets.button.connect_clicked(move |_| on_submit());
    }
    for entry in [&widgets.number_entry, &widgets.code_entry] {
        let on_submit = on_submit.clone();
        entry.connect_activate(move |_| on_submit());
    }
    for entry in [&widgets.pass_entry, &widgets.confirm_entry] {
        let on_submit = on_submit.clone();
        entry.connect_activate(move |_| on_submit());
    }
    // A different server means starting over from the phone step.
    {
        let widgets_for_server = widgets.clone();
        let form = form.clone();
        let client = client.clone();
        widgets.server_entry.connect_activate(move |entry| {
            let url = crate::utils::normalize_url(&entry.text());
            if url == client.borrow().base_url().as_str().trim_end_matches('/') {
                return;
            }
            match ApiClient::new(&url) {
                Ok(fresh) => {
                    info!("switching server to {url}");
                    bootstrap(&fresh, &widgets_for_server);
                    client.replace(fresh);
                    form.borrow_mut().reset();
                    widgets_for_server.sync(&form.borrow());
                }
                Err(e) => widgets_for_server.set_status(&format!("Invalid server URL: {e}"), true),
            }
        });
    }

    widgets.window.present();
}

/// Fetch the login page once so the server hands out its CSRF cookie.
fn bootstrap(client: &ApiClient, widgets: &Rc<LoginWidgets>) {
    let client = client.clone();
    let widgets = widgets.clone();
    crate::utils::run_async_to_main(async move { client.bootstrap_csrf().await }, move |res| {
        if let Err(e) = res {
            warn!("could not reach server: {e}");
            widgets.set_status("Server unreachable. Check the server URL.", true);
        }
    });
}

fn submit(app: &Application, widgets: &Rc<LoginWidgets>, form: &Rc<RefCell<LoginForm>>, client: &Rc<RefCell<ApiClient>>) {
    {
        let mut form = form.borrow_mut();
        form.set_country_code(&widgets.code_entry.text());
        form.set_number(&widgets.number_entry.text());
    }
    let step = form.borrow().step();
    match step {
        LoginStep::Phone => check_phone(widgets, form, client),
        LoginStep::Password => sign_in(app, widgets, form, client),
        LoginStep::Register => register(widgets, form, client),
    }
}

fn check_phone(widgets: &Rc<LoginWidgets>, form: &Rc<RefCell<LoginForm>>, client: &Rc<RefCell<ApiClient>>) {
    let full_phone = match form.borrow().submit_phone() {
        Ok(full) => full,
        Err(e) => {
            widgets.set_status(&e.to_string(), true);
            return;
        }
    };
    widgets.set_status("Checking…", false);
    widgets.set_busy(true);
    let api = client.borrow().clone();
    let widgets = widgets.clone();
    let form = form.clone();
    crate::utils::run_async_to_main(async move { api.check_phone(&full_phone).await }, move |res| {
        widgets.set_busy(false);
        match res {
            Ok(exists) => {
                widgets.set_status(if exists { "Welcome back." } else { "New number, create an account." }, false);
                form.borrow_mut().on_phone_checked(exists);
                widgets.sync(&form.borrow());
            }
            Err(e) => {
                warn!("check-phone failed: {e}");
                widgets.set_status("", false);
                widgets.toast(&format!("Error: {e}"));
            }
        }
    });
}

fn sign_in(app: &Application, widgets: &Rc<LoginWidgets>, form: &Rc<RefCell<LoginForm>>, client: &Rc<RefCell<ApiClient>>) {
    let creds = match form.borrow().prepare_login(&widgets.pass_entry.text()) {
        Ok(creds) => creds,
        Err(e) => {
            widgets.toast(&e.to_string());
            return;
        }
    };
    widgets.set_status("Signing in…", false);
    widgets.set_busy(true);
    let api = client.borrow().clone();
    let app = app.clone();
    let widgets = widgets.clone();
    let form = form.clone();
    let number = widgets.number_entry.text().trim().to_string();
    let country_code = widgets.code_entry.text().trim().to_string();
    let full_phone = creds.full_phone.clone();
    let login_api = api.clone();
    crate::utils::run_async_to_main(
        async move { login_api.login(&creds.full_phone, &creds.password).await },
        move |res| {
            widgets.set_busy(false);
            match res {
                Ok(()) => {
                    info!("signed in as {full_phone}");
                    let mut state = AppState::load();
                    state.base_url = api.base_url().as_str().trim_end_matches('/').to_string();
                    state.last_phone = Some(number);
                    state.country_code = country_code;
                    if let Err(e) = state.save() {
                        warn!("failed to save settings: {e}");
                    }
                    crate::ui::main_window::show_main_window(&app, api, &login::username_for(&full_phone), &full_phone);
                    widgets.window.close();
                }
                Err(e) => {
                    warn!("login failed: {e}");
                    widgets.set_status("", false);
                    widgets.pass_entry.set_text("");
                    widgets.toast(&form.borrow().failure_text());
                }
            }
        },
    );
}

fn register(widgets: &Rc<LoginWidgets>, form: &Rc<RefCell<LoginForm>>, client: &Rc<RefCell<ApiClient>>) {
    let creds = match form
        .borrow()
        .prepare_register(&widgets.pass_entry.text(), &widgets.confirm_entry.text())
    {
        Ok(creds) => creds,
        Err(e) => {
            widgets.toast(&e.to_string());
            return;
        }
    };
    widgets.set_busy(true);
    let api = client.borrow().clone();
    let widgets = widgets.clone();
    let form = form.clone();
    crate::utils::run_async_to_main(
        async move { api.register(&creds.full_phone, &creds.password).await },
        move |res| {
            widgets.set_busy(false);
            match res {
                Ok(()) => {
                    widgets.toast(login::REGISTERED);
                    widgets.set_status(login::REGISTERED, false);
                    form.borrow_mut().on_registered();
                    widgets.sync(&form.borrow());
                }
                Err(e) => {
                    warn!("registration failed: {e}");
                    widgets.toast(&form.borrow().failure_text());
                }
            }
        },
    );
}
