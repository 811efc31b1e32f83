pub mod agent;
pub mod retry;
pub mod tooling;
