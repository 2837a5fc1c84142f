pub mod claim;
pub mod lookup;
pub mod project;
pub mod user;
