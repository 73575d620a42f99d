//! The `session` module defines the representation of one connected client
//! stream: its identity, its bounded outbound queue, and its liveness state.

pub mod stream_session;
pub use stream_session::{SessionState, StreamSession};
