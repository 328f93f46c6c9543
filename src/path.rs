//! Lazy path navigation.
//!
//! Callers spell out `IF-MIB -> ifDescr -> 1` style paths one token at a
//! time without the symbols existing as statically known fields. Extension
//! is pure structural appension; nothing is validated against the agent
//! until a terminal (`value`/`table`) runs, so path-building stays
//! side-effect-free and cheap.

use std::collections::{BTreeMap, HashMap};

use crate::client::SnmpClient;
use crate::codec::OidSpec;
use crate::error::SnmpError;
use crate::oid::Oid;
use crate::table::{RowKey, TableRows};
use crate::value::Value;

/// Where a path currently points: a selected module awaiting a symbol, or
/// a concrete OID awaiting further index arcs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    PendingModule(String),
    Resolved(Oid),
}

/// One step of a lazily-built path. Holds a client reference and a
/// [`PathNode`], never network resources.
#[derive(Debug, Clone)]
pub struct PathHandle<'a> {
    client: &'a SnmpClient,
    node: PathNode,
}

impl<'a> PathHandle<'a> {
    pub(crate) fn new(client: &'a SnmpClient, node: PathNode) -> Self {
        Self { client, node }
    }

    pub fn node(&self) -> &PathNode {
        &self.node
    }

    /// The concrete OID, once a symbol has been resolved.
    pub fn oid(&self) -> Option<&Oid> {
        match &self.node {
            PathNode::Resolved(oid) => Some(oid),
            PathNode::PendingModule(_) => None,
        }
    }

    /// Extend the path by one token.
    ///
    /// On a pending module the token names a symbol in that module; on a
    /// resolved OID it must parse as a non-negative index arc. Either way a
    /// token that fits neither is [`SnmpError::AttributeNotFound`], a
    /// capability lookup failure rather than a crash.
    pub fn descend(&self, token: &str) -> Result<PathHandle<'a>, SnmpError> {
        match &self.node {
            PathNode::PendingModule(module) => {
                let oid = self
                    .client
                    .resolver()
                    .resolve_symbol(module, token)
                    .map_err(|_| SnmpError::AttributeNotFound(token.to_string()))?;
                Ok(PathHandle::new(self.client, PathNode::Resolved(oid)))
            }
            PathNode::Resolved(oid) => {
                let arc: u32 = token
                    .parse()
                    .map_err(|_| SnmpError::AttributeNotFound(token.to_string()))?;
                Ok(PathHandle::new(
                    self.client,
                    PathNode::Resolved(oid.child(arc)),
                ))
            }
        }
    }

    /// Append a numeric index arc. Shorthand for `descend` with a number.
    pub fn index(&self, arc: u32) -> Result<PathHandle<'a>, SnmpError> {
        match &self.node {
            PathNode::Resolved(oid) => Ok(PathHandle::new(
                self.client,
                PathNode::Resolved(oid.child(arc)),
            )),
            PathNode::PendingModule(_) => Err(SnmpError::AttributeNotFound(arc.to_string())),
        }
    }

    /// Terminal: scalar get of the node this path points at.
    pub async fn value(&self) -> Result<Value, SnmpError> {
        let oid = self.expect_resolved("value")?;
        self.client.get(oid).await
    }

    /// Terminal: fetch the sub-table rooted at this path.
    pub async fn table(&self) -> Result<Vec<(Oid, Value)>, SnmpError> {
        let oid = self.expect_resolved("table")?;
        self.client.get_table(oid).await
    }

    /// Join tables named relative to this module, positionally keyed.
    /// Only available on a pending-module handle.
    pub async fn match_tables(
        &self,
        index_table: Option<&str>,
        tables: &[&str],
    ) -> Result<TableRows, SnmpError> {
        let module = self.expect_module("match_tables")?;
        let index = index_table.map(|name| OidSpec::Symbolic(format!("{}::{}", module, name)));
        let specs: Vec<OidSpec> = tables
            .iter()
            .map(|name| OidSpec::Symbolic(format!("{}::{}", module, name)))
            .collect();
        self.client.match_tables(index, &specs).await
    }

    /// Like [`PathHandle::match_tables`] without an index table, but with
    /// each row's values keyed by the requesting table name.
    pub async fn match_named(
        &self,
        tables: &[&str],
    ) -> Result<BTreeMap<RowKey, HashMap<String, Value>>, SnmpError> {
        let rows = self.match_tables(None, tables).await?;
        Ok(rows.into_named(tables))
    }

    fn expect_resolved(&self, terminal: &str) -> Result<&Oid, SnmpError> {
        self.oid()
            .ok_or_else(|| SnmpError::AttributeNotFound(terminal.to_string()))
    }

    fn expect_module(&self, operation: &str) -> Result<&str, SnmpError> {
        match &self.node {
            PathNode::PendingModule(module) => Ok(module),
            PathNode::Resolved(_) => Err(SnmpError::AttributeNotFound(operation.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{ClientConfig, SnmpVersion};
    use crate::engine::{
        CommunityTarget, MockMibResolver, MockSnmpTransport, ResolveError, SnmpTransport,
    };

    fn if_mib_resolver() -> MockMibResolver {
        let mut resolver = MockMibResolver::new();
        resolver.expect_load_module().returning(|_| Ok(()));
        resolver
            .expect_resolve_symbol()
            .returning(|module, symbol| match (module, symbol) {
                ("IF-MIB", "ifDescr") => Ok(Oid::from([1, 3, 6, 1, 2, 1, 2, 2, 1, 2])),
                _ => Err(ResolveError::UnknownSymbol {
                    module: module.to_string(),
                    symbol: symbol.to_string(),
                }),
            });
        resolver
    }

    fn client_with(resolver: MockMibResolver, transport: impl SnmpTransport + 'static) -> SnmpClient {
        SnmpClient::with_parts(
            Arc::new(resolver),
            Arc::new(transport),
            "agent.test",
            CommunityTarget {
                host: "agent.test".to_string(),
                port: 161,
                community: "public".to_string(),
                version: SnmpVersion::V2c,
                security_name: "snmptables".to_string(),
            },
            ClientConfig::default(),
        )
    }

    #[test]
    fn test_module_entry_translates_underscores() {
        let mut resolver = MockMibResolver::new();
        resolver
            .expect_load_module()
            .withf(|name| name == "IF-MIB")
            .returning(|_| Ok(()));
        let client = client_with_resolver_only(resolver);

        let handle = client.module("IF_MIB").unwrap();
        assert_eq!(
            handle.node(),
            &PathNode::PendingModule("IF-MIB".to_string())
        );
    }

    fn client_with_resolver_only(resolver: MockMibResolver) -> SnmpClient {
        client_with(resolver, MockSnmpTransport::new())
    }

    #[test]
    fn test_module_entry_unknown_module() {
        let mut resolver = MockMibResolver::new();
        resolver.expect_load_module().returning(|name| {
            Err(ResolveError::ModuleLoad {
                name: name.to_string(),
                reason: "no such file".to_string(),
            })
        });
        let client = client_with_resolver_only(resolver);

        let err = client.module("BOGUS_MIB").unwrap_err();
        assert!(matches!(err, SnmpError::AttributeNotFound(name) if name == "BOGUS_MIB"));
    }

    #[test]
    fn test_module_entry_already_loaded_is_fine() {
        let mut resolver = MockMibResolver::new();
        resolver
            .expect_load_module()
            .returning(|name| Err(ResolveError::AlreadyLoaded(name.to_string())));
        let client = client_with_resolver_only(resolver);

        assert!(client.module("IF_MIB").is_ok());
    }

    #[test]
    fn test_descend_symbol_then_index() {
        let client = client_with_resolver_only(if_mib_resolver());

        let handle = client
            .module("IF_MIB")
            .unwrap()
            .descend("ifDescr")
            .unwrap()
            .descend("3")
            .unwrap();
        assert_eq!(
            handle.oid().unwrap(),
            &Oid::from([1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 3])
        );
    }

    #[test]
    fn test_descend_unknown_symbol() {
        let client = client_with_resolver_only(if_mib_resolver());

        let err = client
            .module("IF_MIB")
            .unwrap()
            .descend("ifBogus")
            .unwrap_err();
        assert!(matches!(err, SnmpError::AttributeNotFound(name) if name == "ifBogus"));
    }

    #[test]
    fn test_descend_non_numeric_index() {
        let client = client_with_resolver_only(if_mib_resolver());

        let resolved = client.module("IF_MIB").unwrap().descend("ifDescr").unwrap();
        let err = resolved.descend("up").unwrap_err();
        assert!(matches!(err, SnmpError::AttributeNotFound(name) if name == "up"));
    }

    #[test]
    fn test_index_shorthand() {
        let client = client_with_resolver_only(MockMibResolver::new());

        let handle = client.path([1, 3, 6, 1]).index(5).unwrap();
        assert_eq!(handle.oid().unwrap(), &Oid::from([1, 3, 6, 1, 5]));
    }

    #[test]
    fn test_navigation_is_lazy() {
        // No transport expectations: building paths must not touch the agent
        let client = client_with_resolver_only(if_mib_resolver());
        let _ = client
            .module("IF_MIB")
            .unwrap()
            .descend("ifDescr")
            .unwrap()
            .descend("1")
            .unwrap();
    }

    #[tokio::test]
    async fn test_value_terminal() {
        let mut transport = MockSnmpTransport::new();
        transport
            .expect_get_scalar()
            .withf(|_, oid| oid.arcs() == &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1])
            .returning(|_, _| Ok(Value::from("eth0")));
        let client = client_with(if_mib_resolver(), transport);

        let value = client
            .module("IF_MIB")
            .unwrap()
            .descend("ifDescr")
            .unwrap()
            .descend("1")
            .unwrap()
            .value()
            .await
            .unwrap();
        assert_eq!(value.as_str(), Some("eth0"));
    }

    #[tokio::test]
    async fn test_table_terminal() {
        let mut transport = MockSnmpTransport::new();
        transport.expect_bulk_walk().returning(|_, base, _| {
            Ok(vec![
                (base.child(1), Value::from("eth0")),
                (base.child(2), Value::from("eth1")),
            ])
        });
        let client = client_with(if_mib_resolver(), transport);

        let entries = client
            .module("IF_MIB")
            .unwrap()
            .descend("ifDescr")
            .unwrap()
            .table()
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_value_on_pending_module_fails() {
        let client = client_with_resolver_only(if_mib_resolver());

        let err = client.module("IF_MIB").unwrap().value().await.unwrap_err();
        assert!(matches!(err, SnmpError::AttributeNotFound(name) if name == "value"));
    }

    #[tokio::test]
    async fn test_match_tables_requires_module() {
        let client = client_with_resolver_only(MockMibResolver::new());

        let err = client
            .path([1, 3, 6])
            .match_tables(None, &["ifDescr"])
            .await
            .unwrap_err();
        assert!(matches!(err, SnmpError::AttributeNotFound(_)));
    }
}
