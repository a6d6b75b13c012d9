//! Configuration forms rendered by the host and the field-level errors they report.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

/// Message reported for a required field left blank.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

static ACCOUNT_SID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AC[0-9a-fA-F]{32}$").expect("Failed to compile account sid regex"));
static AUTH_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{32}$").expect("Failed to compile auth token regex"));

/// Raw values submitted through a configuration form, keyed by field name.
pub type FormInput = HashMap<String, String>;

/// Normalized option values ready to be stored, keyed by field name.
pub type CleanedOptions = BTreeMap<&'static str, String>;

/// How the host should render a [`FormField`].
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    /// Single line text input.
    TextInput,
    /// Single line input whose value is masked but rendered back on edit.
    PasswordInput,
    /// Multi line text input.
    Textarea,
}

/// Description of a single configuration field.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct FormField {
    name: &'static str,
    label: &'static str,
    widget: Widget,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_text: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<&'static str>,
}

/// Ordered set of [`FormField`]s making up a plugin's settings form.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct ConfigForm {
    fields: Vec<FormField>,
}

/// Validation messages keyed by field name.
#[derive(Debug, Default, Serialize, PartialEq, Eq, Clone)]
pub struct FormErrors {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<String>>,
}

impl FormField {
    /// Create a required `FormField`.
    pub fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self { name, label, widget, required: true, help_text: None, placeholder: None }
    }

    /// Set the help text shown under the field.
    pub fn with_help_text(mut self, help_text: &'static str) -> Self {
        self.help_text = Some(help_text);
        self
    }

    /// Set the placeholder shown in an empty field.
    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Return the field name used as the option key.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Return the display label.
    pub fn label(&self) -> &str {
        self.label
    }

    /// Return the [`Widget`] used to render this field.
    pub fn widget(&self) -> Widget {
        self.widget
    }

    /// Return `true` when the field must not be blank.
    pub fn required(&self) -> bool {
        self.required
    }
}

impl ConfigForm {
    /// Create a new `ConfigForm` from fields in display order.
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    /// Return all fields in display order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Serialize the form description to JSON for the host UI.
    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Return the trimmed values of every field in this form.
    ///
    /// Required fields that are missing or blank are recorded in `errors` and left out of the result.
    pub(crate) fn required_values(&self, input: &FormInput, errors: &mut FormErrors) -> HashMap<&'static str, String> {
        let mut values = HashMap::new();
        for field in &self.fields {
            let value = input.get(field.name).map(|v| v.trim()).unwrap_or_default();
            if value.is_empty() && field.required {
                errors.add(field.name, REQUIRED_MESSAGE);
            } else {
                values.insert(field.name, value.to_string());
            }
        }
        values
    }
}

impl FormErrors {
    /// Record a message against a field.
    pub fn add<S: Into<String>>(&mut self, field: &str, message: S) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Return messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Return `true` when no field has errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return the names of all fields with errors.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Runs per-field cleaners over submitted input, collecting every field's errors.
pub(crate) struct FormCleaner {
    values: HashMap<&'static str, String>,
    cleaned: CleanedOptions,
    errors: FormErrors,
}

impl FormCleaner {
    pub fn new(form: &ConfigForm, input: &FormInput) -> Self {
        let mut errors = FormErrors::default();
        let values = form.required_values(input, &mut errors);
        Self { values, cleaned: CleanedOptions::new(), errors }
    }

    /// Clean one field. Fields that already failed the required check are skipped.
    pub fn clean<F, E>(&mut self, field: &'static str, clean: F) -> &mut Self
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: Display,
    {
        if let Some(value) = self.values.get(field) {
            match clean(value.as_str()) {
                Ok(value) => {
                    self.cleaned.insert(field, value);
                }
                Err(e) => self.errors.add(field, e.to_string()),
            }
        }
        self
    }

    pub fn finish(self) -> Result<CleanedOptions, FormErrors> {
        match self.errors.is_empty() {
            true => Ok(self.cleaned),
            false => Err(self.errors),
        }
    }
}

pub(crate) fn account_sid_field() -> FormField {
    FormField::new("account_sid", "Account SID", Widget::TextInput)
}

pub(crate) fn auth_token_field() -> FormField {
    FormField::new("auth_token", "Auth Token", Widget::PasswordInput)
}

pub(crate) fn clean_account_sid(value: &str) -> Result<String, String> {
    match ACCOUNT_SID_REGEX.is_match(value) {
        true => Ok(value.to_string()),
        false => Err(format!("{value} is not a valid Account SID.")),
    }
}

pub(crate) fn clean_auth_token(value: &str) -> Result<String, String> {
    match AUTH_TOKEN_REGEX.is_match(value) {
        true => Ok(value.to_string()),
        false => Err("Auth Token must be 32 hexadecimal characters.".to_string()),
    }
}

/// Validate a recipient list, which must name at least one number.
pub(crate) fn clean_recipients(value: &str) -> Result<String, String> {
    let phones = crate::phone::clean_to(value).map_err(|e| e.to_string())?;
    match phones.is_empty() {
        true => Err(REQUIRED_MESSAGE.to_string()),
        false => Ok(phones),
    }
}

/// Validate a TwiML response URL that dispatch will append `&message=...` to.
pub(crate) fn clean_twiml_url(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|_| format!("{value} is not a valid URL."))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("{value} must use http or https."));
    }
    if url.query().is_none() {
        return Err(format!("{value} must contain a query string, e.g. http://twimlets.com/message?"));
    }
    Ok(value.to_string())
}
