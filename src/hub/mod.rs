pub mod engine;
pub mod payload;
pub mod registry;

pub use engine::BroadcastHub;
