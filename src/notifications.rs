//! Representation of the events a host asks plugins to notify about, and the messages built from them.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::form_urlencoded;

/// Maximum length of an SMS body in characters.
pub const SMS_MAX_LENGTH: usize = 160;

/// Severity of an [`Event`].
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Debug
    Debug,
    /// Info
    Info,
    /// Warning
    Warning,
    /// Error
    #[default]
    Error,
    /// Fatal
    Fatal,
}

/// A project that owns plugin settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct Project {
    slug: String,
    name: String,
}

/// A deduplicated error occurrence within a [`Project`].
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Group {
    project: Project,
}

/// A single instance of a [`Group`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct Event {
    #[serde(default)]
    level: Level,
    message: String,
}

impl Level {
    /// Return the display name of this level, as the host shows it.
    pub fn display_name(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" | "critical" => Ok(Level::Fatal),
            other => Err(format!("unknown level {other}")),
        }
    }
}

impl Project {
    /// Create a new `Project`.
    pub fn new<S: AsRef<str>>(slug: S, name: S) -> Self {
        Self { slug: slug.as_ref().into(), name: name.as_ref().into() }
    }

    /// Return the slug that keys this project's options.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Return the display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Group {
    /// Create a new `Group` for a project.
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    /// Return the owning [`Project`].
    pub fn project(&self) -> &Project {
        &self.project
    }
}

impl Event {
    /// Create a new `Event`.
    pub fn new<S: AsRef<str>>(level: Level, message: S) -> Self {
        Self { level, message: message.as_ref().into() }
    }

    /// Return the event [`Level`].
    pub fn level(&self) -> Level {
        self.level
    }

    /// Return the full, possibly multi-line, error text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the first line of the error text.
    pub fn error_line(&self) -> &str {
        self.message.split(['\n', '\r']).next().unwrap_or_default()
    }
}

/// Build the text of an SMS notification, truncated to [`SMS_MAX_LENGTH`] characters.
pub fn sms_body(project: &Project, event: &Event) -> String {
    let body = format!(
        "Sentry [{}] {}: {}",
        project.name(),
        event.level().display_name().to_uppercase(),
        event.error_line()
    );
    truncate_chars(body, SMS_MAX_LENGTH)
}

/// Build the message spoken on a voice call.
///
/// The project name is not part of the spoken message.
pub fn call_message(event: &Event) -> String {
    format!("Sentry {}: {}", event.level().display_name().to_uppercase(), event.error_line())
}

/// Append `message` to a TwiML response URL as a form encoded `message` parameter.
pub fn call_url(twiml_url: &str, message: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new()).append_pair("message", message).finish();
    format!("{twiml_url}&{query}")
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((index, _)) = text.char_indices().nth(max) {
        text.truncate(index);
    }
    text
}
