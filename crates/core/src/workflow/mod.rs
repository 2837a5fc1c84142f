pub mod engine;
pub mod rules;

pub use engine::{TransitionOutcome, WorkflowEngine};
pub use rules::{next_status, Actor, ClaimAction, TransitionError};
