//! # ssecast
//!
//! `ssecast` is an in-memory server-sent-events broadcast hub for a browser
//! chat client. Every connected client holds one long-lived SSE stream;
//! submitted messages and join/leave events are fanned out to all of them
//! in real time.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `hub`: the broadcast orchestrator, its client registry, and the wire payload types.
//! - `session`: one connected client stream with its bounded outbound queue.
//! - `transport`: SSE wire framing and the HTTP server exposing the endpoints.
//! - `config`: loading and merging server configuration.
//! - `utils`: shared utilities such as the error taxonomy and logging setup.

pub mod config;
pub mod hub;
pub mod session;
pub mod transport;
pub mod utils;
