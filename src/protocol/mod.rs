//! Issue and verify orchestration
//!
//! Both paths are explicit state machines. Each transition is exactly one component
//! call; a failing call moves the machine to `Failed` with the kind of the error it
//! returned, and that error is handed back unchanged.
//!
//! ```text
//! issue:   Building -> Signed -> Encrypted -> Enveloped
//! verify:  Received -> Disassembled -> Unwrapped -> Decrypted -> Decoded -> Verified | Rejected
//! ```

pub mod issuer;
pub mod state;
pub mod verifier;

pub use issuer::{Issued, Issuer, IssuerBuilder};
pub use state::{IssueState, ProtocolState, VerifyState};
pub use verifier::Verifier;
