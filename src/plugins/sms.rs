//! Twilio SMS [`Plugin`] implementation
//!
//! # Configuration Example
//! ```toml
//! [[project.plugin]]
//! type = "twilio_sms"
//! account_sid = "AC0123456789abcdef0123456789abcdef"
//! auth_token = "0123456789abcdef0123456789abcdef"
//! sms_from = "3305093095"
//! sms_to = ["33-050-9893095", "+33-050-5555555555"]
//! ```

use crate::configuration::OptionStore;
use crate::forms::{
    CleanedOptions, ConfigForm, FormCleaner, FormErrors, FormField, FormInput, Widget, account_sid_field,
    auth_token_field, clean_account_sid, clean_auth_token, clean_recipients,
};
use crate::notifications::{Event, Group, sms_body};
use crate::phone::{clean_from, mask_phone_number, split_recipients};
use crate::plugins::{Plugin, PluginMetadata, RESOURCE_LINKS};
use crate::twilio::{NewMessage, Resource, TwilioApi};
use crate::{Error, LIB_LOG_TARGET};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

const METADATA: PluginMetadata = PluginMetadata {
    slug: "twilio_sms",
    title: "Twilio (SMS)",
    conf_key: "twilio_sms",
    description: "A plugin for Sentry which sends SMS notifications via Twilio",
    author: "Matt Robenolt",
    author_url: "https://github.com/mattrobenolt",
    version: env!("CARGO_PKG_VERSION"),
    resource_links: RESOURCE_LINKS,
};

const REQUIRED_OPTIONS: &[&str] = &["account_sid", "auth_token", "sms_from", "sms_to"];

/// Sends an SMS with the event's first error line to every configured recipient.
#[derive(Debug, Clone)]
pub struct TwilioSmsPlugin {
    api: Arc<dyn TwilioApi>,
}

impl TwilioSmsPlugin {
    /// Create a new `TwilioSmsPlugin` sending through `api`.
    pub fn new(api: Arc<dyn TwilioApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Plugin for TwilioSmsPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &METADATA
    }

    fn config_form(&self) -> ConfigForm {
        ConfigForm::new(vec![
            account_sid_field(),
            auth_token_field(),
            FormField::new("sms_from", "SMS From #", Widget::TextInput)
                .with_help_text("Digits only")
                .with_placeholder("e.g. 3305093095"),
            FormField::new("sms_to", "SMS To #s", Widget::Textarea)
                .with_help_text("Recipient(s) phone numbers separated by commas or lines")
                .with_placeholder("e.g. 33-050-9893095, +33-050-5555555555"),
        ])
    }

    fn validate_config(&self, input: &FormInput) -> Result<CleanedOptions, FormErrors> {
        let mut cleaner = FormCleaner::new(&self.config_form(), input);
        cleaner
            .clean("account_sid", clean_account_sid)
            .clean("auth_token", clean_auth_token)
            .clean("sms_from", clean_from)
            .clean("sms_to", clean_recipients);
        cleaner.finish()
    }

    fn required_options(&self) -> &'static [&'static str] {
        REQUIRED_OPTIONS
    }

    fn api(&self) -> &dyn TwilioApi {
        self.api.as_ref()
    }

    async fn notify_users(
        &self,
        group: &Group,
        event: &Event,
        store: &dyn OptionStore,
    ) -> Result<Vec<Resource>, Error> {
        let project = group.project();
        let body = sms_body(project, event);

        let account = self.account(project, store)?;
        let sms_from = self.require_option("sms_from", project, store)?;
        let sms_to = self.require_option("sms_to", project, store)?;
        let recipients = split_recipients(&sms_to);

        info!(target: LIB_LOG_TARGET, "Sending SMS for project {} to {} recipient(s)", project.slug(), recipients.len());
        let mut sent = Vec::with_capacity(recipients.len());
        for phone in recipients {
            let message = NewMessage::new(phone, sms_from.as_str(), body.as_str());
            let resource = self.api.create_message(&account, &message).await?;
            debug!(target: LIB_LOG_TARGET, "SMS {} queued for {}", resource.sid(), mask_phone_number(phone));
            sent.push(resource);
        }
        Ok(sent)
    }
}

#[cfg(feature = "parse-cfg")]
mod options_file {
    use crate::configuration::options_file::{PluginOptionsConfig, Recipients};
    use crate::forms::FormInput;
    use serde::Deserialize;

    /// Data structure to represent the SMS plugin section of an options file.
    #[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
    pub(crate) struct SmsOptionsFile {
        account_sid: String,
        auth_token: String,
        sms_from: String,
        sms_to: Recipients,
    }

    #[typetag::deserialize(name = "twilio_sms")]
    impl PluginOptionsConfig for SmsOptionsFile {
        fn slug(&self) -> &'static str {
            super::METADATA.slug
        }

        fn form_input(&self) -> FormInput {
            FormInput::from([
                ("account_sid".to_string(), self.account_sid.clone()),
                ("auth_token".to_string(), self.auth_token.clone()),
                ("sms_from".to_string(), self.sms_from.clone()),
                ("sms_to".to_string(), self.sms_to.joined()),
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MemoryOptionStore;
    use crate::forms::REQUIRED_MESSAGE;
    use crate::notifications::Project;
    use crate::twilio::{Account, AccountResource, NewCall};

    #[derive(Debug)]
    struct UnusedApi;

    #[async_trait]
    impl TwilioApi for UnusedApi {
        async fn create_message(&self, _: &Account, _: &NewMessage) -> Result<Resource, Error> {
            unreachable!()
        }
        async fn create_call(&self, _: &Account, _: &NewCall) -> Result<Resource, Error> {
            unreachable!()
        }
        async fn fetch_account(&self, _: &Account) -> Result<AccountResource, Error> {
            unreachable!()
        }
    }

    fn plugin() -> TwilioSmsPlugin {
        TwilioSmsPlugin::new(Arc::new(UnusedApi))
    }

    fn input(sms_from: &str, sms_to: &str) -> FormInput {
        FormInput::from([
            ("account_sid".to_string(), "AC0123456789abcdef0123456789abcdef".to_string()),
            ("auth_token".to_string(), "0123456789abcdef0123456789abcdef".to_string()),
            ("sms_from".to_string(), sms_from.to_string()),
            ("sms_to".to_string(), sms_to.to_string()),
        ])
    }

    #[test]
    fn validate_normalizes_numbers() {
        let cleaned = plugin().validate_config(&input("3305093095", "305-555-0101, 305-555-0102")).unwrap();

        assert_eq!(cleaned["sms_from"], "+13305093095");
        assert_eq!(cleaned["sms_to"], "305-555-0101,305-555-0102");
        assert_eq!(cleaned["account_sid"], "AC0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn validate_reports_each_invalid_field() {
        let errors = plugin().validate_config(&input("call-me", "305-555-0101 nope")).unwrap_err();

        assert_eq!(errors.get("sms_from"), Some(&["call-me is not a valid phone number.".to_string()][..]));
        assert_eq!(errors.get("sms_to"), Some(&["nope is not a valid phone number.".to_string()][..]));
        assert!(errors.get("account_sid").is_none());
    }

    #[test]
    fn validate_rejects_separator_only_recipients() {
        let errors = plugin().validate_config(&input("3305093095", " , ,")).unwrap_err();
        assert_eq!(errors.get("sms_to"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn is_configured_requires_every_option() {
        let plugin = plugin();
        let project = Project::new("acme", "Acme");
        let mut store = MemoryOptionStore::new();
        assert!(!plugin.is_configured(&project, &store));

        plugin.save_options(&project, &input("3305093095", "305-555-0101"), &mut store).unwrap();
        assert!(plugin.is_configured(&project, &store));

        store.set(&project, "twilio_sms:sms_to", String::new());
        assert!(!plugin.is_configured(&project, &store));
    }

    #[test]
    fn invalid_save_writes_nothing() {
        let plugin = plugin();
        let project = Project::new("acme", "Acme");
        let mut store = MemoryOptionStore::new();

        let result = plugin.save_options(&project, &input("bad", "305-555-0101"), &mut store);

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn form_lists_fields_in_order() {
        let form = plugin().config_form();
        let names: Vec<&str> = form.fields().iter().map(|field| field.name()).collect();

        assert_eq!(names, vec!["account_sid", "auth_token", "sms_from", "sms_to"]);
        assert_eq!(form.field("sms_to").map(|field| field.widget()), Some(Widget::Textarea));
        assert!(plugin().get_send_to());
    }
}
