use serde::Serialize;

use crate::core::normalize::{digits_only, is_placeholder_phone};
use crate::models::{CandidateList, CandidateMatch};

/// Outcome of the duplicate check run just before creation
#[derive(Debug, Clone, PartialEq)]
pub enum GuardVerdict {
    Clear,
    Blocked(CandidateMatch),
}

impl GuardVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardVerdict::Blocked(_))
    }

    pub fn exact_match(&self) -> Option<&CandidateMatch> {
        match self {
            GuardVerdict::Blocked(candidate) => Some(candidate),
            GuardVerdict::Clear => None,
        }
    }
}

/// Reasons a submission is rejected before any duplicate check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationFailure {
    MissingName,
    MissingPhone,
    InvalidCreditLimit,
    InvalidInitialCredit,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::MissingName => write!(f, "Please provide customer name"),
            ValidationFailure::MissingPhone => write!(f, "Please provide customer phone number"),
            ValidationFailure::InvalidCreditLimit => write!(f, "Credit limit must be a non-negative number"),
            ValidationFailure::InvalidInitialCredit => write!(f, "Initial credit must be a non-negative number"),
        }
    }
}

/// Required-field checks on the raw form input
pub fn validate_submission(name: &str, phone: &str, placeholder: &str) -> Result<(), ValidationFailure> {
    if name.trim().is_empty() {
        return Err(ValidationFailure::MissingName);
    }
    if is_placeholder_phone(phone, placeholder) {
        return Err(ValidationFailure::MissingPhone);
    }
    Ok(())
}

/// Block creation when a current candidate has exactly the submitted phone digits.
///
/// Only the list already published is consulted. Containment is not enough,
/// and candidates without a phone never match.
pub fn check_before_create(submitted_phone: &str, candidates: &CandidateList) -> GuardVerdict {
    let submitted = digits_only(submitted_phone);
    if submitted.is_empty() {
        return GuardVerdict::Clear;
    }

    candidates
        .iter()
        .find(|c| c.phone_digits().as_deref() == Some(submitted.as_str()))
        .map_or(GuardVerdict::Clear, |c| GuardVerdict::Blocked(c.clone()))
}
