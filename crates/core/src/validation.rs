//! Input normalisation and helpers for `validator`-derived request types.

use validator::ValidationErrors;

/// Canonical form used for storing and looking up emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Flatten field errors into one deterministic, human-readable message.
///
/// Fields are sorted by name; each error contributes `field: message`, falling
/// back to the validator code when no message was declared.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
