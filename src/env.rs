//! Required environment variable checks.

use std::collections::HashMap;

use thiserror::Error;

/// One or more required variables are unset or empty.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Missing env vars: {}", .keys.join(", "))]
pub struct MissingEnvVars {
    /// Missing keys in the order they were required.
    pub keys: Vec<String>,
}

/// Check that every key in `required` has a non-empty value in `env`.
///
/// # Errors
///
/// Returns [`MissingEnvVars`] listing every absent or empty key.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use errorframe::env::validate_env;
///
/// let env = HashMap::from([("PORT".to_owned(), "8080".to_owned())]);
/// assert!(validate_env(&env, &["PORT"]).is_ok());
///
/// let error = validate_env(&env, &["PORT", "AMQP_URL", "REDIS_URL"]).unwrap_err();
/// assert_eq!(error.to_string(), "Missing env vars: AMQP_URL, REDIS_URL");
/// ```
pub fn validate_env(env: &HashMap<String, String>, required: &[&str]) -> Result<(), MissingEnvVars> {
    let keys: Vec<String> = required
        .iter()
        .filter(|key| env.get(**key).is_none_or(String::is_empty))
        .map(|key| (*key).to_owned())
        .collect();
    if keys.is_empty() {
        Ok(())
    } else {
        Err(MissingEnvVars { keys })
    }
}

/// [`validate_env`] against the process environment.
///
/// Variables whose name or value is not valid Unicode are ignored.
///
/// # Errors
///
/// Returns [`MissingEnvVars`] listing every absent or empty key.
pub fn validate_process_env(required: &[&str]) -> Result<(), MissingEnvVars> {
    let env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    validate_env(&env, required)
}
