//! Endpoint bindings for the claim backend, grouped by resource family.
//! Every call goes through `HttpGateway`'s request helpers, so envelope
//! unwrapping and error classification live in one place.

mod claims;
mod lookups;
mod projects;
mod users;

pub use projects::ProjectDraft;
pub use users::NewUser;
