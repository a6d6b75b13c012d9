#![warn(missing_docs)]
//! # Sentry-Twilio
//! Notification plugins for Sentry that send SMS messages or place voice calls through Twilio.
//!
//! Two plugins are provided, registered under the slugs `twilio_sms` and `twilio_call`.
//! Each validates its per-project settings when they are saved, and on every event the host
//! passes on, sends one message or call per configured recipient.
//!
//! ## Example
//! The host owns option storage and decides which events to notify about. Settings go through
//! [`Plugin::save_options`][crate::plugins::Plugin::save_options] and events through
//! [`PluginRegistry::notify`][crate::plugins::PluginRegistry::notify].
//!
//! ```
//! use sentry_twilio::notifications::{Event, Group, Level, Project};
//! use sentry_twilio::plugins::PluginRegistry;
//! use sentry_twilio::{Error, MemoryOptionStore};
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let registry = PluginRegistry::with_rest_client()?;
//!     let project = Project::new("acme", "Acme");
//!     let mut store = MemoryOptionStore::new();
//!
//!     let input = HashMap::from([
//!         ("account_sid".to_string(), "AC0123456789abcdef0123456789abcdef".to_string()),
//!         ("auth_token".to_string(), "0123456789abcdef0123456789abcdef".to_string()),
//!         ("sms_from".to_string(), "3305093095".to_string()),
//!         ("sms_to".to_string(), "305-555-0101, 305-555-0102".to_string()),
//!     ]);
//!     registry.get("twilio_sms")?.save_options(&project, &input, &mut store)?;
//!
//!     let event = Event::new(Level::Error, "NullPointerException\nat line 5");
//!     for outcome in registry.notify(&Group::new(project), &event, &store).await {
//!         println!("{}: {:?}", outcome.slug(), outcome.result());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod configuration;
mod error;
pub mod forms;
pub mod notifications;
pub mod phone;
pub mod plugins;
pub mod twilio;

#[cfg(feature = "parse-cfg")]
pub use self::configuration::options_file::{LoadedOptions, OptionsFileParser, PluginOptionsConfig};
pub use self::configuration::{MemoryOptionStore, OptionStore};
pub use self::error::Error;

/// Logging target value used for the library.
pub const LIB_LOG_TARGET: &str = "sentry_twilio";
