//! Numeric OID representation.
//!
//! An OID is an ordered sequence of non-negative integer arcs identifying a
//! node in the SNMP management tree. At this layer OIDs are purely
//! structural: no symbolic components, no normalization, no wildcards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error parsing a dotted-decimal OID string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid OID component '{0}'")]
pub struct ParseOidError(pub String);

/// A fully numeric object identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from a vector of arcs.
    pub fn new(arcs: Vec<u32>) -> Self {
        Self { arcs }
    }

    /// Parse dotted-decimal notation (e.g. "1.3.6.1.2.1"). A leading dot
    /// is tolerated since agents and tools render both forms.
    pub fn from_dotted(s: &str) -> Result<Self, ParseOidError> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let arcs = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| ParseOidError(part.to_string()))
            })
            .collect::<Result<Vec<u32>, _>>()?;
        Ok(Self::new(arcs))
    }

    /// Render as dotted-decimal. Pure formatting, never fails.
    pub fn to_dotted(&self) -> String {
        self.arcs
            .iter()
            .map(|arc| arc.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The arcs as a slice.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The last arc, if any.
    pub fn last_arc(&self) -> Option<u32> {
        self.arcs.last().copied()
    }

    /// Whether `self` is a structural prefix of `other` (including equality).
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.arcs.starts_with(&self.arcs)
    }

    /// The arcs of `self` past `base`, or `None` if `base` is not a proper
    /// structural prefix of `self`.
    pub fn suffix_of(&self, base: &Self) -> Option<&[u32]> {
        if base.is_prefix_of(self) && self.len() > base.len() {
            Some(&self.arcs[base.len()..])
        } else {
            None
        }
    }

    /// New OID with one arc appended.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = Vec::with_capacity(self.arcs.len() + 1);
        arcs.extend_from_slice(&self.arcs);
        arcs.push(arc);
        Self::new(arcs)
    }

    /// New OID with a run of arcs appended.
    pub fn concat(&self, tail: &[u32]) -> Self {
        let mut arcs = Vec::with_capacity(self.arcs.len() + tail.len());
        arcs.extend_from_slice(&self.arcs);
        arcs.extend_from_slice(tail);
        Self::new(arcs)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dotted(s)
    }
}

impl From<Vec<u32>> for Oid {
    fn from(arcs: Vec<u32>) -> Self {
        Self::new(arcs)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::new(arcs.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs.to_vec())
    }
}
