//! The `transport` module is responsible for network communication with
//! clients: the SSE wire framing and the HTTP server exposing the
//! connect/broadcast endpoints.

pub mod encoder;
pub mod http;
