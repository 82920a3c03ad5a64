pub mod client;
pub mod error;
pub mod events;
pub mod models;
pub mod socket;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use socket::PushChannel;
