//! Core of weekcal.
//!
//! - `config`: the `~/.config/weekcal/.env` credentials file
//! - `credentials`: the shared [`CredentialStore`] and token refresh
//! - `google`: Google Calendar client and OAuth helpers
//! - `layout`: the week grid the terminal UI navigates
//! - `form`: event form fields and validation

pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod form;
pub mod google;
pub mod layout;
pub mod retry;
pub mod window;

pub use config::Config;
pub use credentials::{CredentialStore, Credentials};
pub use error::{ApiError, AuthError, ConfigError, Error, ValidationError};
pub use event::{Event, EventTime};
pub use google::{CalendarClient, Endpoints};
pub use layout::{Cell, Grid, Position, layout};
pub use retry::with_refresh;
pub use window::ListWindow;
