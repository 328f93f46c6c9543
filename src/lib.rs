//! Ergonomic access to SNMP-managed data.
//!
//! Translates between symbolic (`MODULE::symbol.index`) and numeric OIDs,
//! performs scalar get/set, retrieves full sub-tables, and joins multiple
//! parallel SNMP tables into row-aligned records keyed by a common index.
//! Wire encoding, MIB compilation, and transport are consumed through the
//! collaborator traits in [`engine`].

pub mod client;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod oid;
pub mod path;
pub mod table;
pub mod value;

pub use client::SnmpClient;
pub use codec::OidSpec;
pub use config::{ClientConfig, ClientSettings, Credential, SnmpVersion};
pub use engine::{CommunityTarget, MibResolver, NodeLocation, SnmpTransport};
pub use error::SnmpError;
pub use oid::Oid;
pub use path::{PathHandle, PathNode};
pub use table::{RowKey, TableRows};
pub use value::Value;
