// Session engine exports
pub mod debounce;
pub mod dispatcher;
pub mod events;
pub mod session;

pub use debounce::{Debouncer, DebounceHandle, DEFAULT_QUIET_PERIOD};
pub use dispatcher::{CycleDraft, LookupKind, QueryDispatcher, DEFAULT_SEARCH_LIMIT};
pub use events::{Notifier, SessionEvent};
pub use session::{MatchSession, SessionConfig, SessionError, SessionSnapshot, SubmitOutcome};
