//! The Twilio REST calls the plugins depend on.
//!
//! Plugins only talk to the [`TwilioApi`] trait, so hosts can provide their own client.
//! The `rest-client` feature enables [`rest::RestClient`], an implementation over HTTPS.

#[cfg(feature = "rest-client")]
pub mod rest;

use crate::Error;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Credentials of a Twilio account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    sid: String,
    auth_token: String,
}

/// Request to send an SMS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    to: String,
    from: String,
    body: String,
}

/// Request to place a voice call driven by a TwiML response URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCall {
    to: String,
    from: String,
    url: String,
}

/// Message or call resource returned by the API after a create request.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Resource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Account resource returned when checking credentials.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountResource {
    sid: String,
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Client for the subset of the Twilio API used by the plugins.
#[async_trait]
pub trait TwilioApi: Send + Sync + Debug {
    /// Send one SMS message.
    async fn create_message(&self, account: &Account, message: &NewMessage) -> Result<Resource, Error>;

    /// Place one voice call.
    async fn create_call(&self, account: &Account, call: &NewCall) -> Result<Resource, Error>;

    /// Fetch the account the credentials belong to.
    async fn fetch_account(&self, account: &Account) -> Result<AccountResource, Error>;
}

impl Account {
    /// Create a new `Account`.
    pub fn new<S: AsRef<str>>(sid: S, auth_token: S) -> Self {
        Self { sid: sid.as_ref().into(), auth_token: auth_token.as_ref().into() }
    }

    /// Return the account SID.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Return the auth token.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}

impl Debug for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("sid", &self.sid).field("auth_token", &"********").finish()
    }
}

impl NewMessage {
    /// Create a new `NewMessage`.
    pub fn new<S: AsRef<str>>(to: S, from: S, body: S) -> Self {
        Self { to: to.as_ref().into(), from: from.as_ref().into(), body: body.as_ref().into() }
    }

    /// Return the recipient number.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Return the sender number.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Return the message text.
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl NewCall {
    /// Create a new `NewCall`.
    pub fn new<S: AsRef<str>>(to: S, from: S, url: S) -> Self {
        Self { to: to.as_ref().into(), from: from.as_ref().into(), url: url.as_ref().into() }
    }

    /// Return the number being called.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Return the caller number.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Return the TwiML response URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Resource {
    /// Create a new `Resource`.
    pub fn new<S: AsRef<str>>(sid: S, status: Option<S>) -> Self {
        Self { sid: sid.as_ref().into(), status: status.map(|s| s.as_ref().into()) }
    }

    /// Return the resource SID.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Return the delivery status reported by the API.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl AccountResource {
    /// Return the account SID.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Return the account's friendly name.
    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    /// Return the account status, e.g. `active` or `suspended`.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}
