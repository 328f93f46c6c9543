//! Collaborator contract for the surrounding SNMP/MIB engine.
//!
//! This crate owns no wire encoding, MIB compilation, or UDP transport.
//! It consumes those concerns through two traits: [`MibResolver`] for local
//! symbol/OID translation and [`SnmpTransport`] for agent round-trips.

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::config::SnmpVersion;
use crate::oid::Oid;
use crate::value::Value;

/// Failure reported by the MIB resolution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("symbol {module}::{symbol} is not known")]
    UnknownSymbol { module: String, symbol: String },

    #[error("no symbolic location for OID {0}")]
    UnknownOid(String),

    /// The module is already loaded. Idempotent condition, callers treat
    /// this as success.
    #[error("module '{0}' already loaded")]
    AlreadyLoaded(String),

    #[error("module '{name}' failed to load: {reason}")]
    ModuleLoad { name: String, reason: String },
}

/// Failure reported by the transport collaborator.
///
/// `Timeout` is distinguished from other failures because the construction
/// handshake keeps probing credentials on timeout but treats any other
/// response, even an error indication, as proof of a live agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("host name did not resolve: {0}")]
    UnresolvableHost(String),

    #[error("agent returned an error indication: {0}")]
    Agent(String),
}

/// The symbolic location of an OID: module, symbol, and any trailing
/// numeric index arcs past the named node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    pub module: String,
    pub symbol: String,
    pub suffix: Vec<u32>,
}

/// The agent identity one request is sent under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityTarget {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub version: SnmpVersion,
    /// Security name attached to requests, purely informational for v1/v2c.
    pub security_name: String,
}

/// Local MIB database operations. Resolution is a local lookup, so this
/// trait is synchronous.
#[cfg_attr(test, automock)]
pub trait MibResolver: Send + Sync {
    /// Resolve a module/symbol pair to its structural OID prefix.
    fn resolve_symbol(&self, module: &str, symbol: &str) -> Result<Oid, ResolveError>;

    /// Inverse lookup: the symbolic location of a numeric OID.
    fn node_location(&self, oid: &Oid) -> Result<NodeLocation, ResolveError>;

    /// Load a MIB module by name. Re-loading an already-loaded module
    /// reports [`ResolveError::AlreadyLoaded`].
    fn load_module(&self, name: &str) -> Result<(), ResolveError>;

    /// Add a directory to the MIB file search path.
    fn add_search_path(&self, path: &Path) -> Result<(), ResolveError>;
}

/// Agent round-trips. Packet-level retries and timeouts live behind this
/// trait, not in this crate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    /// Read one scalar node.
    async fn get_scalar(
        &self,
        target: &CommunityTarget,
        oid: &Oid,
    ) -> Result<Value, TransportError>;

    /// Write one scalar node, returning the value the agent reports back.
    async fn set_scalar(
        &self,
        target: &CommunityTarget,
        oid: &Oid,
        value: Value,
    ) -> Result<Value, TransportError>;

    /// Bulk-walk the subtree rooted at `oid`, preserving agent order.
    /// Entries past the subtree boundary may be included; callers filter.
    async fn bulk_walk(
        &self,
        target: &CommunityTarget,
        oid: &Oid,
        max_repetitions: u32,
    ) -> Result<Vec<(Oid, Value)>, TransportError>;
}
