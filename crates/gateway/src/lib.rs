pub mod api;
pub mod browse;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod memory;
pub mod traits;

pub use browse::{ClaimBrowser, RefreshOutcome, SEARCH_DEBOUNCE};
pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use lifecycle::{BatchFailure, BatchOutcome, ClaimLifecycle, LifecycleError};
pub use memory::InMemoryGateway;
pub use traits::{ClaimFilter, ClaimsGateway, SearchScope};
