//! Notification plugins and the registry the host looks them up in.

use crate::configuration::OptionStore;
use crate::forms::{CleanedOptions, ConfigForm, FormErrors, FormInput};
use crate::notifications::{Event, Group, Project};
use crate::twilio::{Account, AccountResource, Resource, TwilioApi};
use crate::{Error, LIB_LOG_TARGET};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod call;
pub mod sms;

pub use call::TwilioCallPlugin;
pub use sms::TwilioSmsPlugin;

const RESOURCE_LINKS: &[(&str, &str)] = &[
    ("Documentation", "https://github.com/mattrobenolt/sentry-twilio/blob/master/README.md"),
    ("Bug Tracker", "https://github.com/mattrobenolt/sentry-twilio/issues"),
    ("Source", "https://github.com/mattrobenolt/sentry-twilio"),
    ("Twilio", "http://www.twilio.com/"),
];

/// Static description of a [`Plugin`] shown by the host.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PluginMetadata {
    /// Unique identifier, used to look the plugin up in a [`PluginRegistry`].
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Prefix for option keys in the [`OptionStore`].
    pub conf_key: &'static str,
    /// One line description.
    pub description: &'static str,
    /// Plugin author.
    pub author: &'static str,
    /// Author homepage.
    pub author_url: &'static str,
    /// Plugin version.
    pub version: &'static str,
    /// `(title, url)` pairs of related resources.
    pub resource_links: &'static [(&'static str, &'static str)],
}

/// A notification channel the host can configure per project and invoke for events.
#[async_trait]
pub trait Plugin: DynClone + Send + Sync + Debug {
    /// Return the static description of this plugin.
    fn metadata(&self) -> &PluginMetadata;

    /// Return the settings form for the host to render.
    fn config_form(&self) -> ConfigForm;

    /// Validate and normalize submitted settings.
    fn validate_config(&self, input: &FormInput) -> Result<CleanedOptions, FormErrors>;

    /// Option keys that must be present and non-empty for [`Plugin::notify_users`] to work.
    fn required_options(&self) -> &'static [&'static str];

    /// Return the API client used for dispatch.
    fn api(&self) -> &dyn TwilioApi;

    /// Send notifications for `event` and return the resources the API created, one per recipient.
    ///
    /// Recipients are handled in order and the first failure stops delivery to the rest.
    async fn notify_users(
        &self,
        group: &Group,
        event: &Event,
        store: &dyn OptionStore,
    ) -> Result<Vec<Resource>, Error>;

    /// Return the slug of this plugin.
    fn slug(&self) -> &'static str {
        self.metadata().slug
    }

    /// Delivery does not depend on per-user notification permissions.
    fn get_send_to(&self) -> bool {
        true
    }

    /// Read an option of this plugin for `project`.
    fn get_option(&self, key: &str, project: &Project, store: &dyn OptionStore) -> Option<String> {
        store.get(project, &option_key(self.metadata().conf_key, key))
    }

    /// Return `true` when every [`Plugin::required_options`] value is present and non-empty.
    fn is_configured(&self, project: &Project, store: &dyn OptionStore) -> bool {
        self.required_options()
            .iter()
            .all(|key| self.get_option(key, project, store).is_some_and(|value| !value.is_empty()))
    }

    /// Validate `input` and write the cleaned options for `project`.
    ///
    /// Nothing is written when any field is invalid.
    fn save_options(&self, project: &Project, input: &FormInput, store: &mut dyn OptionStore) -> Result<(), Error> {
        let cleaned = self.validate_config(input).map_err(Error::InvalidConfiguration)?;
        for (key, value) in cleaned {
            store.set(project, &option_key(self.metadata().conf_key, key), value);
        }
        info!(target: LIB_LOG_TARGET, "Saved {} options for project {}", self.slug(), project.slug());
        Ok(())
    }

    /// Read a required option, failing with [`Error::NotConfigured`] when it is missing or empty.
    fn require_option(&self, key: &str, project: &Project, store: &dyn OptionStore) -> Result<String, Error> {
        match self.get_option(key, project, store) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::NotConfigured { plugin: self.slug().to_string(), project: project.slug().to_string() }),
        }
    }

    /// Return the Twilio credentials stored for `project`.
    fn account(&self, project: &Project, store: &dyn OptionStore) -> Result<Account, Error> {
        let sid = self.require_option("account_sid", project, store)?;
        let auth_token = self.require_option("auth_token", project, store)?;
        Ok(Account::new(sid, auth_token))
    }

    /// Check the stored credentials against the API.
    async fn test_configuration(&self, project: &Project, store: &dyn OptionStore) -> Result<AccountResource, Error> {
        let account = self.account(project, store)?;
        let resource = self.api().fetch_account(&account).await?;
        debug!(target: LIB_LOG_TARGET, "Credentials for {} accepted, account status {:?}", project.slug(), resource.status());
        Ok(resource)
    }
}

dyn_clone::clone_trait_object!(Plugin);

/// Key under which a plugin option is stored.
pub fn option_key(conf_key: &str, key: &str) -> String {
    format!("{conf_key}:{key}")
}

/// Result of running one plugin for an event through [`PluginRegistry::notify`].
#[derive(Debug)]
pub struct PluginOutcome {
    slug: &'static str,
    result: Result<Vec<Resource>, Error>,
}

impl PluginOutcome {
    /// Return the slug of the plugin that ran.
    pub fn slug(&self) -> &'static str {
        self.slug
    }

    /// Return what the plugin's dispatch produced.
    pub fn result(&self) -> &Result<Vec<Resource>, Error> {
        &self.result
    }

    /// Consume the outcome and return the dispatch result.
    pub fn into_result(self) -> Result<Vec<Resource>, Error> {
        self.result
    }
}

/// Set of [`Plugin`]s looked up by slug.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create a new empty `PluginRegistry`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `PluginRegistry` holding the SMS and call plugins, both using `api`.
    pub fn with_api(api: Arc<dyn TwilioApi>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TwilioSmsPlugin::new(api.clone())));
        registry.register(Box::new(TwilioCallPlugin::new(api)));
        registry
    }

    #[cfg(feature = "rest-client")]
    /// Create a `PluginRegistry` holding both plugins backed by [`RestClient`][`crate::twilio::rest::RestClient`].
    pub fn with_rest_client() -> Result<Self, Error> {
        let api = crate::twilio::rest::RestClient::new()?;
        Ok(Self::with_api(Arc::new(api)))
    }

    /// Add a plugin, returning any plugin previously registered under the same slug.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Option<Box<dyn Plugin>> {
        match self.plugins.iter().position(|existing| existing.slug() == plugin.slug()) {
            Some(index) => Some(std::mem::replace(&mut self.plugins[index], plugin)),
            None => {
                self.plugins.push(plugin);
                None
            }
        }
    }

    /// Look up a plugin by slug.
    pub fn get(&self, slug: &str) -> Result<&dyn Plugin, Error> {
        self.plugins
            .iter()
            .find(|plugin| plugin.slug() == slug)
            .map(|plugin| &**plugin)
            .ok_or_else(|| Error::UnknownPlugin(slug.to_string()))
    }

    /// Return all registered plugins in registration order.
    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    /// Run every plugin configured for the event's project.
    ///
    /// A failing plugin is logged and reported in its [`PluginOutcome`] without stopping the others.
    pub async fn notify(&self, group: &Group, event: &Event, store: &dyn OptionStore) -> Vec<PluginOutcome> {
        let project = group.project();
        let mut outcomes = Vec::new();

        for plugin in &self.plugins {
            if !plugin.is_configured(project, store) {
                debug!(target: LIB_LOG_TARGET, "Skipping {} for project {}: not configured", plugin.slug(), project.slug());
                continue;
            }

            let result = plugin.notify_users(group, event, store).await;
            if let Err(error) = &result {
                warn!(target: LIB_LOG_TARGET, "Plugin {} failed for project {}: {}", plugin.slug(), project.slug(), error);
            }
            outcomes.push(PluginOutcome { slug: plugin.slug(), result });
        }
        outcomes
    }
}
