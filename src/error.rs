//! Error taxonomy for the client surface.
//!
//! Every operation either returns a fully-populated result or one of these
//! typed failures; nothing is swallowed except the idempotent
//! "module already loaded" condition, which is treated as success.

use crate::engine::{ResolveError, TransportError};

/// Errors surfaced by [`crate::client::SnmpClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SnmpError {
    /// Host name could not be resolved at construction.
    #[error("could not reach host {0}")]
    Connection(String),

    /// Every candidate credential timed out during the handshake.
    #[error("no credential produced a response from {0}")]
    NoLiveCredential(String),

    /// A symbolic name did not resolve to a node in any loaded module.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    /// A path navigation token matched neither a MIB symbol nor an index.
    #[error("no such attribute '{0}'")]
    AttributeNotFound(String),

    /// A scalar get or subtree walk failed at the agent.
    #[error("SNMP get of {oid} on {host} failed: {source}")]
    Get {
        oid: String,
        host: String,
        source: TransportError,
    },

    /// A scalar set failed at the agent.
    #[error("SNMP set of {oid} on {host} failed: {source}")]
    Set {
        oid: String,
        host: String,
        source: TransportError,
    },

    /// A MIB module failed to load (for a reason other than being loaded).
    #[error("failed to load MIB module '{name}': {source}")]
    ModuleLoad { name: String, source: ResolveError },

    /// The table join could not observe a consistent snapshot.
    #[error("tables still inconsistent after {attempts} attempts")]
    InconsistentTable { attempts: u32 },
}
