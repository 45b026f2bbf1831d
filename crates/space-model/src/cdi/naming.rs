use crate::{ModelError, ModelResult};

/// Fully-qualified CDI device name: `vendor/class=name`.
pub fn qualified_name(vendor: &str, class: &str, name: &str) -> String {
    format!("{vendor}/{class}={name}")
}

/// Base name of the spec files owned by `vendor/class`.
pub fn spec_name(vendor: &str, class: &str) -> String {
    format!("{vendor}-{class}")
}

/// Name of a transient spec, derived only from its vendor, class and id.
///
/// Deterministic, so teardown recomputes the same name without extra state.
/// `/` cannot appear in a file name: it is escaped as `%2F` (and `%` as `%25`),
/// so distinct ids always give distinct names.
pub fn transient_spec_name(vendor: &str, class: &str, transient_id: &str) -> String {
    let escaped = transient_id.replace('%', "%25").replace('/', "%2F");
    format!("{}_{}", spec_name(vendor, class), escaped)
}

/// Validate a CDI device name.
///
/// Allowed: ASCII letters, digits, `-`, `_`, `.` and `:`; first and last
/// characters must be alphanumeric.
pub fn validate_device_name(name: &str) -> ModelResult<()> {
    let invalid = |reason| ModelError::InvalidDeviceName {
        name: name.to_string(),
        reason,
    };

    let (Some(first), Some(last)) = (name.chars().next(), name.chars().last()) else {
        return Err(invalid("name is empty"));
    };
    if !first.is_ascii_alphanumeric() {
        return Err(invalid("must start with a letter or digit"));
    }
    if !last.is_ascii_alphanumeric() {
        return Err(invalid("must end with a letter or digit"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        return Err(invalid("contains characters outside [A-Za-z0-9-_.:]"));
    }
    Ok(())
}

const CLAIM_NAME_MAX_LEN: usize = 253;

/// Validate a claim name as a DNS-1123 subdomain.
///
/// The name becomes an env prefix and the container path `/etc/<name>`, so
/// empty names and `.`/`..` components are rejected along with everything
/// outside `[a-z0-9-.]`.
pub fn validate_claim_name(name: &str) -> ModelResult<()> {
    let invalid = |reason| ModelError::InvalidClaimName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > CLAIM_NAME_MAX_LEN {
        return Err(invalid("longer than 253 characters"));
    }
    for label in name.split('.') {
        let (Some(first), Some(last)) = (label.chars().next(), label.chars().last()) else {
            return Err(invalid("contains an empty dot-separated label"));
        };
        if !is_lower_alnum(first) || !is_lower_alnum(last) {
            return Err(invalid("labels must start and end with [a-z0-9]"));
        }
        if !label.chars().all(|c| is_lower_alnum(c) || c == '-') {
            return Err(invalid("contains characters outside [a-z0-9-.]"));
        }
    }
    Ok(())
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Environment variable prefix for a claim: uppercased, `-` and `.` replaced by `_`.
pub fn env_prefix(claim_name: &str) -> String {
    claim_name.to_uppercase().replace(['-', '.'], "_")
}
