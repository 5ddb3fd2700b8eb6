pub mod catalog;
pub mod clock;
pub mod engine;
pub mod log;
pub mod poller;
pub mod registry;
pub mod snapshot;
