pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod paging;
pub mod session;
pub mod stats;
pub mod validation;
pub mod workflow;

pub use audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use domain::claim::{Claim, ClaimId, ClaimStatus, TrailEntry};
pub use domain::project::{Project, ProjectId, ProjectMember, ProjectRole, ProjectStatus};
pub use domain::user::{RoleCode, User, UserId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use paging::{Page, PageInfo, PageRequest};
pub use validation::{NewClaim, ValidationError};
pub use workflow::engine::{TransitionOutcome, WorkflowEngine};
pub use workflow::rules::{next_status, Actor, ClaimAction, TransitionError};
