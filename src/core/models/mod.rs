pub mod credential;
pub mod rate_limits;
pub mod snapshot;
pub mod usage;
