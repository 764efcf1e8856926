//! String utility functions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::utilities::errors::CrewError;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());

/// Interpolate placeholders (e.g., `{key}`) in a string while leaving JSON untouched.
///
/// Only placeholders matching `{variable_name}` are replaced, where
/// `variable_name` starts with a letter/underscore and contains only
/// alphanumerics, underscores and hyphens. Braces around anything else
/// (such as `{"phrase": "..."}`) are kept as-is.
///
/// # Errors
/// Returns [`CrewError::MissingInput`] for the first placeholder with no value.
pub fn interpolate_only(input: &str, inputs: &HashMap<String, String>) -> Result<String, CrewError> {
    if !input.contains('{') {
        return Ok(input.to_string());
    }

    if let Some(missing) = VARIABLE_PATTERN
        .captures_iter(input)
        .map(|cap| cap[1].to_string())
        .find(|var| !inputs.contains_key(var))
    {
        return Err(CrewError::MissingInput { variable: missing });
    }

    let result = VARIABLE_PATTERN.replace_all(input, |caps: &Captures| {
        inputs.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(result.into_owned())
}
