use directories::BaseDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_COUNTRY_CODE: &str = "+1";
/// Overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "MESSENGER_BASE_URL";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppState {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Phone number (without country code) of the last successful login.
    #[serde(default)]
    pub last_phone: Option<String>,
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            last_phone: None,
            country_code: default_country_code(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("messenger-gtk.toml"))
    }

    pub fn load() -> Self {
        let mut state = Self::load_from(Self::toml_path().as_deref());
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                info!("using {BASE_URL_ENV}={url}");
                state.base_url = url.trim().to_string();
            }
        }
        state
    }

    /// Read the TOML config at `path`; defaults when it is missing or
    /// unreadable.
    pub fn load_from(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            if let Ok(text) = fs::read_to_string(path) {
                match toml::from_str::<AppState>(&text) {
                    Ok(state) => return state,
                    Err(e) => warn!("ignoring unreadable config {}: {e}", path.display()),
                }
            }
        }

        Self::new()
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::toml_path() {
            Some(path) => self.save_to(&path),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir")),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, toml)
    }
}

#[cfg(feature = "gui")]
pub fn build_ui(app: &adw::Application) {
    let state = AppState::load();
    match crate::api::ApiClient::new(&state.base_url) {
        Ok(client) => crate::ui::login::show_login_window(app, client, &state),
        Err(e) => {
            log::error!("invalid server URL {:?}: {e}", state.base_url);
            crate::ui::show_fatal(app, &format!("Invalid server URL {}: {e}", state.base_url));
        }
    }
}
