//! EPP desk - register and audit personal protective equipment deliveries

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod notice;
pub mod signature;
pub mod suggest;
pub mod views;

pub use api::EppClient;
pub use config::Settings;
pub use error::{AppError, Result};
pub use notice::{Notice, NoticeLevel};
