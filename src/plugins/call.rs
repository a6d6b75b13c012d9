//! Twilio voice call [`Plugin`] implementation
//!
//! # Configuration Example
//! ```toml
//! [[project.plugin]]
//! type = "twilio_call"
//! account_sid = "AC0123456789abcdef0123456789abcdef"
//! auth_token = "0123456789abcdef0123456789abcdef"
//! call_from = "3305093095"
//! call_to = "33-050-9893095, +33-050-5555555555"
//! twiml_url = "http://twimlets.com/message?"
//! ```

use crate::configuration::OptionStore;
use crate::forms::{
    CleanedOptions, ConfigForm, FormCleaner, FormErrors, FormField, FormInput, Widget, account_sid_field,
    auth_token_field, clean_account_sid, clean_auth_token, clean_recipients, clean_twiml_url,
};
use crate::notifications::{Event, Group, call_message, call_url};
use crate::phone::{clean_from, mask_phone_number, split_recipients};
use crate::plugins::{Plugin, PluginMetadata, RESOURCE_LINKS};
use crate::twilio::{NewCall, Resource, TwilioApi};
use crate::{Error, LIB_LOG_TARGET};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

const METADATA: PluginMetadata = PluginMetadata {
    slug: "twilio_call",
    title: "Twilio (Call)",
    conf_key: "twilio_call",
    description: "A plugin for Sentry which calls phones via Twilio",
    author: "Matt Robenolt",
    author_url: "https://github.com/mattrobenolt",
    version: env!("CARGO_PKG_VERSION"),
    resource_links: RESOURCE_LINKS,
};

const REQUIRED_OPTIONS: &[&str] = &["account_sid", "auth_token", "call_from", "call_to", "twiml_url"];

/// Calls every configured recipient and has Twilio read the event's first error line.
#[derive(Debug, Clone)]
pub struct TwilioCallPlugin {
    api: Arc<dyn TwilioApi>,
}

impl TwilioCallPlugin {
    /// Create a new `TwilioCallPlugin` calling through `api`.
    pub fn new(api: Arc<dyn TwilioApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Plugin for TwilioCallPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &METADATA
    }

    fn config_form(&self) -> ConfigForm {
        ConfigForm::new(vec![
            account_sid_field(),
            auth_token_field(),
            FormField::new("call_from", "Call From #", Widget::TextInput)
                .with_help_text("Digits only")
                .with_placeholder("e.g. 3305093095"),
            FormField::new("call_to", "Call To #s", Widget::Textarea)
                .with_help_text("Recipient(s) phone numbers separated by commas or lines")
                .with_placeholder("e.g. 33-050-9893095, +33-050-5555555555"),
            FormField::new("twiml_url", "Twiml response URL.", Widget::Textarea)
                .with_help_text("Twiml response URL.  Message parameter will be appended to this url.")
                .with_placeholder("http://twimlets.com/message?"),
        ])
    }

    fn validate_config(&self, input: &FormInput) -> Result<CleanedOptions, FormErrors> {
        let mut cleaner = FormCleaner::new(&self.config_form(), input);
        cleaner
            .clean("account_sid", clean_account_sid)
            .clean("auth_token", clean_auth_token)
            .clean("call_from", clean_from)
            .clean("call_to", clean_recipients)
            .clean("twiml_url", clean_twiml_url);
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

        let account = self.account(project, store)?;
        let call_from = self.require_option("call_from", project, store)?;
        let call_to = self.require_option("call_to", project, store)?;
        let twiml_url = self.require_option("twiml_url", project, store)?;
        let url = call_url(&twiml_url, &call_message(event));
        let recipients = split_recipients(&call_to);

        info!(target: LIB_LOG_TARGET, "Placing calls for project {} to {} recipient(s)", project.slug(), recipients.len());
        let mut placed = Vec::with_capacity(recipients.len());
        for phone in recipients {
            let call = NewCall::new(phone, call_from.as_str(), url.as_str());
            let resource = self.api.create_call(&account, &call).await?;
            debug!(target: LIB_LOG_TARGET, "Call {} placed to {}", resource.sid(), mask_phone_number(phone));
            placed.push(resource);
        }
        Ok(placed)
    }
}

#[cfg(feature = "parse-cfg")]
mod options_file {
    use crate::configuration::options_file::{PluginOptionsConfig, Recipients};
    use crate::forms::FormInput;
    use serde::Deserialize;

    /// Data structure to represent the call plugin section of an options file.
    #[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
    pub(crate) struct CallOptionsFile {
        account_sid: String,
        auth_token: String,
        call_from: String,
        call_to: Recipients,
        twiml_url: String,
    }

    #[typetag::deserialize(name = "twilio_call")]
    impl PluginOptionsConfig for CallOptionsFile {
        fn slug(&self) -> &'static str {
            super::METADATA.slug
        }

        fn form_input(&self) -> FormInput {
            FormInput::from([
                ("account_sid".to_string(), self.account_sid.clone()),
                ("auth_token".to_string(), self.auth_token.clone()),
                ("call_from".to_string(), self.call_from.clone()),
                ("call_to".to_string(), self.call_to.joined()),
                ("twiml_url".to_string(), self.twiml_url.clone()),
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MemoryOptionStore;
    use crate::notifications::Project;
    use crate::twilio::{Account, AccountResource, NewMessage};

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

    fn plugin() -> TwilioCallPlugin {
        TwilioCallPlugin::new(Arc::new(UnusedApi))
    }

    fn input(twiml_url: &str) -> FormInput {
        FormInput::from([
            ("account_sid".to_string(), "AC0123456789abcdef0123456789abcdef".to_string()),
            ("auth_token".to_string(), "0123456789abcdef0123456789abcdef".to_string()),
            ("call_from".to_string(), "305-555-0100".to_string()),
            ("call_to".to_string(), "+33-050-5555555555\n305-555-0101".to_string()),
            ("twiml_url".to_string(), twiml_url.to_string()),
        ])
    }

    #[test]
    fn validate_normalizes_numbers_and_keeps_url() {
        let cleaned = plugin().validate_config(&input("  http://twimlets.com/message?  ")).unwrap();

        assert_eq!(cleaned["call_from"], "+1305-555-0100");
        assert_eq!(cleaned["call_to"], "+33-050-5555555555,305-555-0101");
        assert_eq!(cleaned["twiml_url"], "http://twimlets.com/message?");
    }

    #[test]
    fn validate_rejects_url_without_query() {
        let errors = plugin().validate_config(&input("http://twimlets.com/message")).unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["twiml_url"]);
    }

    #[test]
    fn missing_twiml_url_is_required() {
        let mut form_input = input("http://twimlets.com/message?");
        form_input.remove("twiml_url");
        let errors = plugin().validate_config(&form_input).unwrap_err();

        assert_eq!(errors.get("twiml_url"), Some(&[crate::forms::REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn is_configured_needs_twiml_url() {
        let plugin = plugin();
        let project = Project::new("acme", "Acme");
        let mut store = MemoryOptionStore::new();
        plugin.save_options(&project, &input("http://twimlets.com/message?"), &mut store).unwrap();
        assert!(plugin.is_configured(&project, &store));

        store.set(&project, "twilio_call:twiml_url", String::new());
        assert!(!plugin.is_configured(&project, &store));
    }
}
