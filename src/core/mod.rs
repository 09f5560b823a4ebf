// Core matching rule exports
pub mod guard;
pub mod merger;
pub mod normalize;
pub mod relevance;

pub use guard::{check_before_create, validate_submission, GuardVerdict, ValidationFailure};
pub use merger::merge;
pub use normalize::{digits_only, enforce_phone_prefix, is_trivial_input, DEFAULT_PHONE_PLACEHOLDER};
pub use relevance::{filter, RelevanceFilter};
