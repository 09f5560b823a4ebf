use tokio::sync::mpsc;

use crate::core::ValidationFailure;
use crate::models::{CandidateList, CandidateMatch, NewCustomer};

/// Outward notifications from a match session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new filtered list was published, possibly empty
    CandidatesChanged(CandidateList),
    /// A current cycle started or finished
    SearchingChanged(bool),
    /// Submission rejected before the duplicate check
    ValidationFailed(ValidationFailure),
    /// An existing customer has exactly the submitted phone
    Blocked(CandidateMatch),
    /// Guard passed; the payload goes to the external create operation
    Submitted(NewCustomer),
    /// The user picked an existing customer instead of creating one
    ExistingSelected(CandidateMatch),
}

/// Receives session events, typically the UI or a toast presenter
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, event: SessionEvent);
}

impl Notifier for mpsc::UnboundedSender<SessionEvent> {
    fn notify(&self, event: SessionEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Session event dropped, listener gone");
        }
    }
}
