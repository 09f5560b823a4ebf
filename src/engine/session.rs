use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::core::{
    check_before_create, enforce_phone_prefix, is_trivial_input, validate_submission, GuardVerdict,
    ValidationFailure, DEFAULT_PHONE_PLACEHOLDER,
};
use crate::engine::debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
use crate::engine::dispatcher::{CycleDraft, QueryDispatcher, DEFAULT_SEARCH_LIMIT};
use crate::engine::events::{Notifier, SessionEvent};
use crate::models::{
    CandidateList, CandidateMatch, FormDefaults, NewCustomer, SessionOutcome, SessionState, MAX_CANDIDATES,
};
use crate::services::DirectorySearch;

/// Errors returned to callers of a [`MatchSession`]
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
}

/// Tunables for one form session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub quiet_period: Duration,
    pub phone_placeholder: String,
    pub enforce_phone_prefix: bool,
    pub max_candidates: usize,
    pub search_limit: usize,
    pub form: FormDefaults,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            phone_placeholder: DEFAULT_PHONE_PLACEHOLDER.to_string(),
            enforce_phone_prefix: true,
            max_candidates: MAX_CANDIDATES,
            search_limit: DEFAULT_SEARCH_LIMIT,
            form: FormDefaults::default(),
        }
    }
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Guard passed, payload handed to the create operation
    Created(NewCustomer),
    /// An existing customer has exactly this phone number
    Blocked(CandidateMatch),
    Invalid(ValidationFailure),
}

/// Point-in-time view of a session for readers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub name: String,
    pub phone: String,
    pub candidates: CandidateList,
    pub searching: bool,
}

#[derive(Debug)]
enum Command {
    InputChanged { name: String, phone: String },
    QuietPeriodElapsed { generation: u64 },
    CycleSettled(CycleDraft),
    Submit {
        initial_credit: Option<String>,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    SelectExisting(CandidateMatch),
    Dispose,
}

/// Duplicate matching for one "new customer" form
///
/// All state lives in a single actor task; this handle only sends events to
/// it. Dropping the handle disposes the session: the pending timer is
/// cancelled and lookups still in flight are discarded when they settle.
pub struct MatchSession {
    id: Uuid,
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl MatchSession {
    /// Start a session on the current tokio runtime
    pub fn spawn(directory: Arc<dyn DirectorySearch>, notifier: Arc<dyn Notifier>, config: SessionConfig) -> Self {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let initial = SessionSnapshot {
            state: SessionState::Idle,
            name: String::new(),
            phone: config.phone_placeholder.clone(),
            candidates: CandidateList::empty(),
            searching: false,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

        let actor = SessionActor {
            dispatcher: QueryDispatcher::new(directory, config.search_limit, config.max_candidates),
            debouncer: Debouncer::new(config.quiet_period),
            notifier,
            commands: tx.downgrade(),
            snapshot: snapshot_tx,
            name: initial.name,
            phone: initial.phone,
            state: SessionState::Idle,
            candidates: CandidateList::empty(),
            searching: false,
            config,
        };

        let span = tracing::info_span!("match_session", session_id = %id);
        let task = tokio::spawn(actor.run(rx).instrument(span));

        Self {
            id,
            commands: tx,
            snapshot: snapshot_rx,
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The name or phone field changed
    pub fn input_changed(&self, name: impl Into<String>, phone: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::InputChanged {
            name: name.into(),
            phone: phone.into(),
        })
    }

    /// Validate, run the duplicate guard and, when clear, finish the session.
    ///
    /// `initial_credit` is the raw text of the optional initial-credit field.
    pub async fn submit(&self, initial_credit: Option<String>) -> Result<SubmitOutcome, SessionError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Submit { initial_credit, reply })?;
        outcome.await.map_err(|_| SessionError::Closed)
    }

    /// Use an existing customer instead of creating one. Ends the session.
    pub fn select_existing(&self, candidate: CandidateMatch) -> Result<(), SessionError> {
        self.send(Command::SelectExisting(candidate))
    }

    /// Currently published candidates
    pub fn candidates(&self) -> CandidateList {
        self.snapshot.borrow().candidates.clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch every snapshot the session publishes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Wait for the session task to end and return its final state
    pub async fn join(&mut self) -> SessionState {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(session_id = %self.id, "Session task ended abnormally: {}", e);
            }
        }
        self.state()
    }

    /// Dispose the session and wait until it has shut down
    pub async fn dispose(mut self) -> SessionState {
        let _ = self.commands.send(Command::Dispose);
        self.join().await
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }
}

impl Drop for MatchSession {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Dispose);
    }
}

struct SessionActor {
    config: SessionConfig,
    dispatcher: QueryDispatcher,
    debouncer: Debouncer,
    notifier: Arc<dyn Notifier>,
    commands: mpsc::WeakUnboundedSender<Command>,
    snapshot: watch::Sender<SessionSnapshot>,
    name: String,
    phone: String,
    state: SessionState,
    candidates: CandidateList,
    searching: bool,
}

impl SessionActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Session started");

        while let Some(command) = commands.recv().await {
            match command {
                Command::InputChanged { name, phone } => self.on_input(name, phone),
                Command::QuietPeriodElapsed { generation } => self.on_quiet_period(generation),
                Command::CycleSettled(draft) => self.on_cycle_settled(draft),
                Command::Submit { initial_credit, reply } => {
                    let outcome = self.on_submit(initial_credit);
                    let _ = reply.send(outcome);
                }
                Command::SelectExisting(candidate) => self.on_select_existing(candidate),
                Command::Dispose => break,
            }

            if self.state.is_terminal() {
                break;
            }
        }

        if !self.state.is_terminal() {
            self.debouncer.cancel();
            self.transition(SessionState::Terminal(SessionOutcome::Disposed));
        }

        tracing::debug!(state = ?self.state, "Session finished");
    }

    fn on_input(&mut self, name: String, phone: String) {
        self.phone = if self.config.enforce_phone_prefix {
            enforce_phone_prefix(&phone, &self.config.phone_placeholder)
        } else {
            phone
        };
        self.name = name;

        if is_trivial_input(&self.name, &self.phone, &self.config.phone_placeholder) {
            self.debouncer.cancel();
            self.dispatcher.supersede();
            self.set_searching(false);
            self.publish(CandidateList::empty());
            self.transition(SessionState::Idle);
            return;
        }

        let commands = self.commands.clone();
        self.debouncer.schedule(move |generation| {
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::QuietPeriodElapsed { generation });
            }
        });
        self.transition(SessionState::Debouncing);
    }

    fn on_quiet_period(&mut self, generation: u64) {
        if !self.debouncer.claim(generation) {
            tracing::trace!(generation, "Ignoring superseded timer");
            return;
        }

        let query = self.dispatcher.issue(&self.name, &self.phone);
        let sequence = query.sequence;
        tracing::debug!(sequence, name = %query.name_fragment, phone = %query.phone_fragment, "Dispatching matching cycle");

        let lookups = self.dispatcher.dispatch(query);
        let commands = self.commands.clone();
        tokio::spawn(
            async move {
                let draft = lookups.await;
                if let Some(commands) = commands.upgrade() {
                    let _ = commands.send(Command::CycleSettled(draft));
                }
            }
            .in_current_span(),
        );

        self.set_searching(true);
        self.transition(SessionState::Searching { sequence });
    }

    fn on_cycle_settled(&mut self, draft: CycleDraft) {
        let Some(list) = self.dispatcher.settle(draft) else {
            return;
        };

        self.set_searching(false);
        self.publish(list);
        if let SessionState::Searching { .. } = self.state {
            self.transition(SessionState::ResultsReady);
        }
    }

    fn on_submit(&mut self, initial_credit: Option<String>) -> SubmitOutcome {
        if let Err(reason) = validate_submission(&self.name, &self.phone, &self.config.phone_placeholder) {
            return self.reject(reason);
        }

        let initial_credit = if self.config.form.show_initial_credit {
            match parse_initial_credit(initial_credit.as_deref()) {
                Ok(amount) => amount,
                Err(reason) => return self.reject(reason),
            }
        } else {
            None
        };

        match check_before_create(&self.phone, &self.candidates) {
            GuardVerdict::Blocked(conflict) => {
                tracing::info!(
                    customer_id = conflict.id,
                    "A customer with this phone number already exists: {}",
                    conflict.name
                );
                self.notifier.notify(SessionEvent::Blocked(conflict.clone()));
                self.transition(SessionState::Blocked {
                    conflict: conflict.clone(),
                });
                SubmitOutcome::Blocked(conflict)
            }
            GuardVerdict::Clear => {
                let payload = NewCustomer::from_form(&self.name, &self.phone, &self.config.form, initial_credit);
                if let Err(errors) = payload.validate() {
                    return self.reject(failure_from(&errors));
                }

                self.stop_matching();
                tracing::info!("Customer {} passed the duplicate check", payload.name);
                self.notifier.notify(SessionEvent::Submitted(payload.clone()));
                self.transition(SessionState::Terminal(SessionOutcome::Created));
                SubmitOutcome::Created(payload)
            }
        }
    }

    fn on_select_existing(&mut self, candidate: CandidateMatch) {
        self.stop_matching();
        tracing::info!(customer_id = candidate.id, "{} has been selected", candidate.name);
        let id = candidate.id;
        self.notifier.notify(SessionEvent::ExistingSelected(candidate));
        self.transition(SessionState::Terminal(SessionOutcome::SelectedExisting { id }));
    }

    fn reject(&mut self, reason: ValidationFailure) -> SubmitOutcome {
        tracing::debug!(?reason, "Submission rejected");
        self.notifier.notify(SessionEvent::ValidationFailed(reason));
        SubmitOutcome::Invalid(reason)
    }

    fn stop_matching(&mut self) {
        self.debouncer.cancel();
        self.dispatcher.supersede();
        self.set_searching(false);
    }

    fn set_searching(&mut self, searching: bool) {
        if self.searching != searching {
            self.searching = searching;
            self.notifier.notify(SessionEvent::SearchingChanged(searching));
        }
    }

    fn publish(&mut self, list: CandidateList) {
        self.candidates = list.clone();
        self.notifier.notify(SessionEvent::CandidatesChanged(list));
        self.refresh_snapshot();
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "Session transition");
        }
        self.state = next;
        self.refresh_snapshot();
    }

    fn refresh_snapshot(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            state: self.state.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            candidates: self.candidates.clone(),
            searching: self.searching,
        });
    }
}

fn parse_initial_credit(raw: Option<&str>) -> Result<Option<f64>, ValidationFailure> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or(ValidationFailure::InvalidInitialCredit),
    }
}

fn failure_from(errors: &ValidationErrors) -> ValidationFailure {
    let fields = errors.field_errors();
    // keys follow the serde names when a field is renamed
    let has = |rust: &str, wire: &str| fields.contains_key(rust) || fields.contains_key(wire);
    if has("name", "name") {
        ValidationFailure::MissingName
    } else if has("phone", "phone") {
        ValidationFailure::MissingPhone
    } else if has("initial_credit", "initialCredit") {
        ValidationFailure::InvalidInitialCredit
    } else {
        ValidationFailure::InvalidCreditLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial_credit() {
        assert_eq!(parse_initial_credit(None), Ok(None));
        assert_eq!(parse_initial_credit(Some("  ")), Ok(None));
        assert_eq!(parse_initial_credit(Some(" 1500.50 ")), Ok(Some(1500.5)));
        assert_eq!(parse_initial_credit(Some("abc")), Err(ValidationFailure::InvalidInitialCredit));
        assert_eq!(parse_initial_credit(Some("NaN")), Err(ValidationFailure::InvalidInitialCredit));
    }

    #[test]
    fn test_failure_from_validator_errors() {
        let payload = NewCustomer {
            name: "Ali".to_string(),
            phone: "+923001234567".to_string(),
            city: "Mianwali".to_string(),
            customer_type: "Permanent".to_string(),
            credit_limit: -5.0,
            initial_credit: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(failure_from(&errors), ValidationFailure::InvalidCreditLimit);

        let payload = NewCustomer {
            credit_limit: 10.0,
            initial_credit: Some(-1.0),
            ..payload
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(failure_from(&errors), ValidationFailure::InvalidInitialCredit);
    }
}
