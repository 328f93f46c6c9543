//! Typed SNMP values.
//!
//! The transport collaborator decodes wire-level variable bindings into this
//! enum; everything above it (scalar ops, table joins) is type-agnostic and
//! just moves values around.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::oid::Oid;

/// A decoded SNMP value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    Counter32(u32),
    Gauge32(u32),
    Counter64(u64),
    TimeTicks(u32),
    OctetString(Vec<u8>),
    ObjectId(Oid),
    IpAddress([u8; 4]),
    Null,
}

impl Value {
    /// The value as text, if it is a printable octet string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) if s.chars().all(|c| !c.is_control()) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// The value as a signed integer, if it carries one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(i64::from(*v)),
            Value::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Render into a JSON value for reporting pipelines. Numbers stay
    /// numbers; octet strings become text when printable, hex otherwise.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(v) => serde_json::json!(v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => serde_json::json!(v),
            Value::Counter64(v) => serde_json::json!(v),
            Value::OctetString(_) | Value::ObjectId(_) | Value::IpAddress(_) => {
                serde_json::Value::String(self.to_string())
            }
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::OctetString(bytes) => match self.as_str() {
                Some(s) => write!(f, "{}", s),
                // Non-textual payloads (MAC addresses etc.) render as hex
                None => write!(f, "0x{}", hex::encode(bytes)),
            },
            Value::ObjectId(oid) => write!(f, "{}", oid),
            Value::IpAddress(octets) => write!(
                f,
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            ),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(s.into_bytes())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectId(oid)
    }
}
