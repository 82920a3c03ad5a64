//! GTK client for the Messenger chat server.
//!
//! [`session`] holds the window state independent of any toolkit, [`api`]
//! talks to the server over HTTP and the per-chat push channel, and `ui`
//! (behind the `gui` feature) renders the session with GTK4 / libadwaita.

pub mod api;
pub mod app;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(feature = "gui")]
pub mod ui;
