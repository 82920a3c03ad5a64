use adw::Application;
use adw::prelude::*;

fn main() -> glib::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("messenger_gtk=info")).init();

    let app = Application::builder()
        .application_id("com.example.MessengerGtk")
        .build();
    app.connect_activate(|app| {
        messenger_gtk::ui::load_css();
        messenger_gtk::app::build_ui(app);
    });
    app.run()
}
