/// Default country-code placeholder the phone field starts with
pub const DEFAULT_PHONE_PLACEHOLDER: &str = "+92";

/// Strip everything but ASCII digits.
///
/// Country-code prefixes are not canonicalised: "+92300..." and "0300..." stay different.
#[inline]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// True when the phone field holds nothing beyond the placeholder
#[inline]
pub fn is_placeholder_phone(phone: &str, placeholder: &str) -> bool {
    let phone = phone.trim();
    phone.is_empty() || phone == placeholder
}

/// Input with a blank name and a placeholder-only phone never starts a cycle
#[inline]
pub fn is_trivial_input(name: &str, phone: &str, placeholder: &str) -> bool {
    name.trim().is_empty() && is_placeholder_phone(phone, placeholder)
}

/// Keep an edited phone value anchored to the placeholder prefix.
///
/// A value that no longer starts with the placeholder resets to the bare placeholder.
pub fn enforce_phone_prefix(value: &str, placeholder: &str) -> String {
    if value.starts_with(placeholder) {
        value.to_string()
    } else {
        placeholder.to_string()
    }
}
