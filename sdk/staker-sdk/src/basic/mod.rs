pub mod allocation;
pub mod engine;
pub mod partition;
pub mod progress;
pub mod retry;
pub mod transaction;
