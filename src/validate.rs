use url::Url;

use crate::error::ValidationError;

pub fn valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Absolute URL: a scheme plus a non-empty host.
pub fn valid_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Checks both pre-conditions and returns the trimmed pair to store.
pub fn validate_entry(name: &str, url: &str) -> Result<(String, String), ValidationError> {
    if !valid_name(name) {
        return Err(ValidationError::BlankName);
    }
    if !valid_url(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok((name.trim().to_string(), url.trim().to_string()))
}
