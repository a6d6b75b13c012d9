//! Phone number validation and normalization for plugin settings.
//!
//! Accepted numbers look like `3305093095`, `33-050-9893095`, `+33-050-5555555555`
//! or `+1(305)5550101`: an optional country code, optionally followed by an area code
//! in parentheses or between hyphens, then the local number.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Country code added to sender numbers that were saved without one.
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+[1-9][0-9]*(\([0-9]*\)|-[0-9]*-)?)?0?[1-9][0-9\- ]*$").expect("Failed to compile phone regex")
});

/// A value that does not match the accepted phone number pattern.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("{0} is not a valid phone number.")]
pub struct InvalidPhoneNumber(pub String);

/// Check `phone` against the accepted phone number pattern.
pub fn is_valid_phone_number(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// Validate a sender number and prefix it with [`DEFAULT_COUNTRY_CODE`] when it has no country code.
///
/// Running this on its own output returns the same value.
pub fn clean_from(value: &str) -> Result<String, InvalidPhoneNumber> {
    if !is_valid_phone_number(value) {
        return Err(InvalidPhoneNumber(value.to_string()));
    }

    match value.starts_with('+') {
        true => Ok(value.to_string()),
        false => Ok(format!("{DEFAULT_COUNTRY_CODE}{value}")),
    }
}

/// Validate a list of recipient numbers separated by commas or whitespace.
///
/// Duplicates are dropped, keeping the first occurrence, and the result is joined with commas.
/// The first invalid entry fails the whole list.
pub fn clean_to(value: &str) -> Result<String, InvalidPhoneNumber> {
    let mut seen = HashSet::new();
    let mut phones = Vec::new();

    for phone in value.split(|c: char| c == ',' || c.is_whitespace()).filter(|token| !token.is_empty()) {
        if !is_valid_phone_number(phone) {
            return Err(InvalidPhoneNumber(phone.to_string()));
        }
        if seen.insert(phone) {
            phones.push(phone);
        }
    }

    Ok(phones.join(","))
}

/// Split a stored recipient option back into individual numbers.
pub fn split_recipients(stored: &str) -> Vec<&str> {
    stored.split(',').map(str::trim).filter(|phone| !phone.is_empty()).collect()
}

/// Mask all but the last four characters of a phone number for logging.
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    match chars[0] == '+' {
        true => format!("+{}{}", "*".repeat(chars.len() - 5), visible),
        false => format!("{}{}", "*".repeat(chars.len() - 4), visible),
    }
}
