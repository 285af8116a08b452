//! The disposal state machine gating point awards on classification and
//! proof-of-disposal.

pub mod attempt;
pub mod disposal;
pub mod stage;

pub use attempt::{CompletionReceipt, CompletionWarning, DisposalAttempt};
pub use disposal::DisposalWorkflow;
pub use stage::Stage;
