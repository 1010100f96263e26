//! Services backed by the GitHub REST API.

mod rate_limit;
mod search;
mod users;

pub use rate_limit::*;
pub use search::*;
pub use users::*;
