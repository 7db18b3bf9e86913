//! Transport capability and its reqwest-backed implementation.
mod client;
mod transport;


pub use client::{
    ClientSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REDIRECT_LIMIT, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, ReqwestTransport,
};
pub use transport::{Transport, TransportRequest, TransportResponse};
