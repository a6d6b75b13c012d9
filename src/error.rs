use crate::forms::FormErrors;
use thiserror::Error;

/// Errors returned by sentry-twilio library.
#[derive(Error, Debug)]
pub enum Error {
    /// Submitted plugin settings failed validation, one or more messages per field.
    #[error("Invalid Plugin Configuration: {0}")]
    InvalidConfiguration(FormErrors),

    /// A [`Plugin`][`crate::plugins::Plugin`] was asked to act on a project it has no complete settings for.
    #[error("Plugin {plugin} is not configured for project {project}")]
    NotConfigured {
        /// Plugin slug.
        plugin: String,
        /// Project slug.
        project: String,
    },

    /// No plugin is registered under the requested slug.
    #[error("No plugin registered with slug {0}")]
    UnknownPlugin(String),

    /// The Twilio API rejected a request.
    #[error("Twilio API Error: status {status}, code {}: {message}", code.map_or("none".to_string(), |c| c.to_string()))]
    TwilioApi {
        /// HTTP status returned by the API.
        status: u16,
        /// Twilio error code, when the response carried one.
        code: Option<i64>,
        /// Human readable message from the API.
        message: String,
    },

    // ### Converting from other error types ###
    /// Pass-thru [`std::io::Error`].
    #[error("std::io Error: {0}")]
    IOError(#[from] std::io::Error),

    /// Pass-thru `serde_json::Error`.
    #[error("Serde_json Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[cfg(feature = "parse-cfg")]
    /// Pass-thru `toml::de::Error`.
    #[error("Serde Toml Error: {0}")]
    SerdeTomlError(#[from] toml::de::Error),

    /// Pass-thru `url::ParseError`.
    #[error("Url Parse Error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[cfg(feature = "rest-client")]
    /// Pass-thru `reqwest::Error`.
    #[error("Reqwest Error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}
