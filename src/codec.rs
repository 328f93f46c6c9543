//! Translation between symbolic names and numeric OIDs.
//!
//! Symbolic names have the form `MODULE::symbol[.index...]`. The module and
//! symbol resolve through the [`MibResolver`] collaborator to a structural
//! prefix; trailing dotted tokens must be numeric indices and are appended
//! verbatim.

use crate::engine::{MibResolver, NodeLocation};
use crate::error::SnmpError;
use crate::oid::Oid;

/// An OID given either numerically or as a symbolic name. Everything on the
/// public client surface that takes an OID takes one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidSpec {
    Numeric(Oid),
    Symbolic(String),
}

impl OidSpec {
    /// Resolve to a numeric OID, consulting the MIB resolver for symbolic
    /// names. Numeric specs pass through untouched.
    pub fn resolve(&self, resolver: &dyn MibResolver) -> Result<Oid, SnmpError> {
        match self {
            OidSpec::Numeric(oid) => Ok(oid.clone()),
            OidSpec::Symbolic(name) => resolve_name(resolver, name),
        }
    }
}

impl From<Oid> for OidSpec {
    fn from(oid: Oid) -> Self {
        OidSpec::Numeric(oid)
    }
}

impl From<&Oid> for OidSpec {
    fn from(oid: &Oid) -> Self {
        OidSpec::Numeric(oid.clone())
    }
}

impl From<Vec<u32>> for OidSpec {
    fn from(arcs: Vec<u32>) -> Self {
        OidSpec::Numeric(Oid::new(arcs))
    }
}

impl<const N: usize> From<[u32; N]> for OidSpec {
    fn from(arcs: [u32; N]) -> Self {
        OidSpec::Numeric(Oid::from(arcs))
    }
}

impl From<&str> for OidSpec {
    /// Dotted-decimal strings become numeric specs; anything else is
    /// treated as a symbolic name and resolved lazily.
    fn from(s: &str) -> Self {
        match Oid::from_dotted(s) {
            Ok(oid) if !oid.is_empty() => OidSpec::Numeric(oid),
            _ => OidSpec::Symbolic(s.to_string()),
        }
    }
}

impl From<String> for OidSpec {
    fn from(s: String) -> Self {
        OidSpec::from(s.as_str())
    }
}

/// Resolve `MODULE::symbol[.index...]` to a numeric OID.
pub fn resolve_name(resolver: &dyn MibResolver, name: &str) -> Result<Oid, SnmpError> {
    let mut pieces = name.split('.');
    let head = pieces.next().unwrap_or_default();
    let (module, symbol) = head
        .split_once("::")
        .ok_or_else(|| SnmpError::UnknownSymbol(name.to_string()))?;

    let indices = pieces
        .map(|tok| tok.parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|_| SnmpError::UnknownSymbol(name.to_string()))?;

    let prefix = resolver
        .resolve_symbol(module, symbol)
        .map_err(|_| SnmpError::UnknownSymbol(name.to_string()))?;
    Ok(prefix.concat(&indices))
}

/// Render a numeric OID back to `MODULE::symbol[.index...]` form.
pub fn symbolic_name(resolver: &dyn MibResolver, oid: &Oid) -> Result<String, SnmpError> {
    let location = node_info(resolver, oid)?;
    let mut name = format!("{}::{}", location.module, location.symbol);
    if !location.suffix.is_empty() {
        name.push('.');
        name.push_str(&Oid::new(location.suffix).to_dotted());
    }
    Ok(name)
}

/// Raw symbolic location of an OID, straight from the resolver.
pub fn node_info(resolver: &dyn MibResolver, oid: &Oid) -> Result<NodeLocation, SnmpError> {
    resolver
        .node_location(oid)
        .map_err(|_| SnmpError::UnknownSymbol(oid.to_dotted()))
}
