//! Extension contracts for handing cached tokens to downstream HTTP clients.

pub mod request_signer;

pub use request_signer::*;
