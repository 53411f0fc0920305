//! ## Crate layout
//! - `config`: TOML configuration for link generation and session policy.
//! - `core`: runtime records, codecs, streaming, and observability.
//! - `error`: public error type with a stable kind + origin taxonomy.
//! - `session`: session facade routing operations through core policy.
//!
//! The `prelude` module re-exports the domain vocabulary used by callers.

pub use dynlink_core as core;

pub mod config;
pub mod error;
pub mod session;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// re-exports
pub use config::{Config, ConfigError};
pub use error::{Error, ErrorKind, ErrorOrigin};
pub use session::Session;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::Config,
        core::{
            prelude::*,
            store::{RecordStore, StoreError},
            stream::{Accept, Format, MediaType, Payload},
        },
        error::Error,
        session::Session,
    };
}
