//! Top-level facade crate for meterkit.
//!
//! Re-exports the metrics engine and the web demo so users can depend on a
//! single crate. The `tour` binary walks through the engine's API.

pub mod core {
    pub use meterkit_core::*;
}

pub mod web {
    pub use meterkit_web::*;
}

pub mod tour;
