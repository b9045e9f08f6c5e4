use crate::debugf;
use crate::error::{ErrorKind, Result};
use std::fmt;

/// States of the issue path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueState {
    Building,
    Signed,
    Encrypted,
    Enveloped,
    Failed(ErrorKind),
}

/// States of the verify path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyState {
    Received,
    Disassembled,
    Unwrapped,
    Decrypted,
    Decoded,
    Verified,
    Rejected,
    Failed(ErrorKind),
}

/// Common behavior of the issue and verify state enums
pub trait ProtocolState: Copy + Eq + fmt::Display {
    /// Terminal failure state carrying the originating error kind
    fn failed(kind: ErrorKind) -> Self;

    /// True for states the machine never leaves
    fn is_terminal(&self) -> bool;
}

impl ProtocolState for IssueState {
    fn failed(kind: ErrorKind) -> Self {
        IssueState::Failed(kind)
    }

    fn is_terminal(&self) -> bool {
        matches!(self, IssueState::Enveloped | IssueState::Failed(_))
    }
}

impl ProtocolState for VerifyState {
    fn failed(kind: ErrorKind) -> Self {
        VerifyState::Failed(kind)
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            VerifyState::Verified | VerifyState::Rejected | VerifyState::Failed(_)
        )
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Building => f.write_str("building"),
            IssueState::Signed => f.write_str("signed"),
            IssueState::Encrypted => f.write_str("encrypted"),
            IssueState::Enveloped => f.write_str("enveloped"),
            IssueState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

impl fmt::Display for VerifyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyState::Received => f.write_str("received"),
            VerifyState::Disassembled => f.write_str("disassembled"),
            VerifyState::Unwrapped => f.write_str("unwrapped"),
            VerifyState::Decrypted => f.write_str("decrypted"),
            VerifyState::Decoded => f.write_str("decoded"),
            VerifyState::Verified => f.write_str("verified"),
            VerifyState::Rejected => f.write_str("rejected"),
            VerifyState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Ordered record of the states one operation visits
#[derive(Debug)]
pub(crate) struct Trail<S> {
    operation: &'static str,
    states: Vec<S>,
    current: S,
}

impl<S: ProtocolState> Trail<S> {
    pub(crate) fn start(operation: &'static str, initial: S) -> Self {
        debugf!("{}: {}", operation, initial);
        Trail {
            operation,
            states: vec![initial],
            current: initial,
        }
    }

    pub(crate) fn current(&self) -> S {
        self.current
    }

    pub(crate) fn advance(&mut self, next: S) {
        debugf!("{}: {} -> {}", self.operation, self.current, next);
        debug_assert!(!self.current.is_terminal(), "left terminal state {}", self.current);
        self.states.push(next);
        self.current = next;
    }

    /// Runs one component call, moving to `next` on success or to the failed state
    /// carrying the error's kind
    pub(crate) fn step<T>(&mut self, next: S, call: impl FnOnce() -> Result<T>) -> Result<T> {
        match call() {
            Ok(value) => {
                self.advance(next);
                Ok(value)
            }
            Err(e) => {
                self.advance(S::failed(e.kind()));
                Err(e)
            }
        }
    }

    pub(crate) fn into_states(self) -> Vec<S> {
        self.states
    }
}
