#![allow(dead_code)]

use async_trait::async_trait;
use sentry_twilio::Error;
use sentry_twilio::twilio::{Account, AccountResource, NewCall, NewMessage, Resource, TwilioApi};
use std::sync::Mutex;

pub const ACCOUNT_SID: &str = "AC0123456789abcdef0123456789abcdef";
pub const AUTH_TOKEN: &str = "0123456789abcdef0123456789abcdef";

/// Records every request and fails for one chosen recipient.
#[derive(Debug, Default)]
pub struct RecordingApi {
    messages: Mutex<Vec<NewMessage>>,
    calls: Mutex<Vec<NewCall>>,
    accounts: Mutex<Vec<String>>,
    fail_for: Option<String>,
}

impl RecordingApi {
    pub fn failing_for(phone: &str) -> Self {
        Self { fail_for: Some(phone.to_string()), ..Default::default() }
    }

    pub fn messages(&self) -> Vec<NewMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<NewCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn accounts(&self) -> Vec<String> {
        self.accounts.lock().unwrap().clone()
    }

    fn check(&self, to: &str) -> Result<(), Error> {
        match self.fail_for.as_deref() == Some(to) {
            true => Err(Error::TwilioApi {
                status: 400,
                code: Some(21211),
                message: format!("The 'To' number {to} is not a valid phone number."),
            }),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl TwilioApi for RecordingApi {
    async fn create_message(&self, _account: &Account, message: &NewMessage) -> Result<Resource, Error> {
        self.check(message.to())?;
        let mut messages = self.messages.lock().unwrap();
        messages.push(message.clone());
        Ok(Resource::new(format!("SM{}", messages.len()), Some("queued".to_string())))
    }

    async fn create_call(&self, _account: &Account, call: &NewCall) -> Result<Resource, Error> {
        self.check(call.to())?;
        let mut calls = self.calls.lock().unwrap();
        calls.push(call.clone());
        Ok(Resource::new(format!("CA{}", calls.len()), Some("queued".to_string())))
    }

    async fn fetch_account(&self, account: &Account) -> Result<AccountResource, Error> {
        self.accounts.lock().unwrap().push(account.sid().to_string());
        Ok(serde_json::from_str(&format!(r#"{{"sid": "{}", "status": "active"}}"#, account.sid()))?)
    }
}
