//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of proof files attachable to one application
const MAX_PROOF_REFS: usize = 10;

/// Validate an account username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 || username.len() > 32 {
        return Err("username must be between 3 and 32 characters".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("username may only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate an account email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() || email.len() > 254 {
        return Err("email must be between 1 and 254 characters".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

/// Validate the stored-file references attached to a submission
///
/// References are opaque to this service; only their shape is checked, never
/// their content.
pub fn validate_proof_refs(proof_refs: &[String]) -> Result<(), String> {
    if proof_refs.len() > MAX_PROOF_REFS {
        return Err(format!(
            "at most {} proof files may be attached",
            MAX_PROOF_REFS
        ));
    }

    for proof_ref in proof_refs {
        let trimmed = proof_ref.trim();
        if trimmed.is_empty() {
            return Err("proof file references must not be blank".to_string());
        }
        if trimmed.len() > 512 {
            return Err("proof file references must be at most 512 characters".to_string());
        }
    }

    Ok(())
}
