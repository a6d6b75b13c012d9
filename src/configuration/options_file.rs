//! Plugin options loaded from TOML, validated the same way as options saved through the host's forms.
//!
//! # Example
//! ```toml
//! [[project]]
//! slug = "acme"
//! name = "Acme"
//!
//! [[project.plugin]]
//! type = "twilio_sms"
//! account_sid = "AC0123456789abcdef0123456789abcdef"
//! auth_token = "0123456789abcdef0123456789abcdef"
//! sms_from = "3305093095"
//! sms_to = "305-555-0101, 305-555-0102"
//! ```

use crate::configuration::MemoryOptionStore;
use crate::forms::FormInput;
use crate::notifications::Project;
use crate::plugins::PluginRegistry;
use crate::{Error, LIB_LOG_TARGET};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// A plugin section of an options file that can be turned into form input for its plugin.
#[typetag::deserialize(tag = "type")]
pub trait PluginOptionsConfig {
    /// Slug of the plugin this section configures.
    fn slug(&self) -> &'static str;

    /// Convert this section into the input the plugin's form would receive.
    fn form_input(&self) -> FormInput;
}

/// Recipient numbers given either as one string or as a list.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub(crate) enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub(crate) fn joined(&self) -> String {
        match self {
            Recipients::One(phones) => phones.clone(),
            Recipients::Many(phones) => phones.join(","),
        }
    }
}

/// Options file parsed from TOML that handles any [`PluginOptionsConfig`].
#[derive(Deserialize)]
pub struct OptionsFileParser {
    #[serde(default)]
    project: Vec<ProjectOptionsFile>,
}

/// Serde compatible representation of one project's plugin options.
#[derive(Deserialize)]
struct ProjectOptionsFile {
    slug: String,
    name: String,
    #[serde(default)]
    plugin: Vec<Box<dyn PluginOptionsConfig>>,
}

/// Projects and validated options read from an options file.
#[derive(Debug, Clone)]
pub struct LoadedOptions {
    projects: Vec<Project>,
    store: MemoryOptionStore,
}

impl OptionsFileParser {
    /// Parse the provided TOML and save every plugin section through its plugin in `registry`.
    pub fn from(string: &str, registry: &PluginRegistry) -> Result<LoadedOptions, Error> {
        let parsed: OptionsFileParser = toml::from_str(string)?;
        parsed.load(registry)
    }

    /// Read the TOML file at `path` and load it like [`OptionsFileParser::from`].
    pub fn from_file<P: AsRef<Path>>(path: P, registry: &PluginRegistry) -> Result<LoadedOptions, Error> {
        debug!(target: LIB_LOG_TARGET, "Reading options file {}", path.as_ref().display());
        Self::from(std::fs::read_to_string(path)?.as_str(), registry)
    }

    fn load(self, registry: &PluginRegistry) -> Result<LoadedOptions, Error> {
        let mut store = MemoryOptionStore::new();
        let mut projects = Vec::with_capacity(self.project.len());

        for project_file in self.project {
            let project = Project::new(project_file.slug, project_file.name);
            for section in &project_file.plugin {
                let plugin = registry.get(section.slug())?;
                if let Err(error) = plugin.save_options(&project, &section.form_input(), &mut store) {
                    warn!(target: LIB_LOG_TARGET, "Invalid {} options for project {}", section.slug(), project.slug());
                    return Err(error);
                }
            }
            debug!(target: LIB_LOG_TARGET, "Loaded {} plugin section(s) for project {}", project_file.plugin.len(), project.slug());
            projects.push(project);
        }

        Ok(LoadedOptions { projects, store })
    }
}

impl LoadedOptions {
    /// Return all projects in file order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Look up a project by slug.
    pub fn project(&self, slug: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.slug() == slug)
    }

    /// Return the store holding the validated options.
    pub fn store(&self) -> &MemoryOptionStore {
        &self.store
    }

    /// Consume and return the store holding the validated options.
    pub fn into_store(self) -> MemoryOptionStore {
        self.store
    }
}
