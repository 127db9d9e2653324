//! Headless view-models for the two screens

pub mod registration;
pub mod search;

pub use registration::{RegistrationForm, RegistrationView};
pub use search::SearchView;
