//! Client facade: owns the agent identity and orchestrates the OID codec,
//! table fetcher, and join engine.
//!
//! Construction probes each candidate credential against the well-known
//! `sysName.0` scalar until one answers without timing out; the first
//! success is retained as the active identity for every later operation.
//! Operations are sequential round-trips; one client issues no overlapping
//! requests.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::codec::{self, OidSpec};
use crate::config::{ClientConfig, Credential};
use crate::engine::{
    CommunityTarget, MibResolver, NodeLocation, ResolveError, SnmpTransport, TransportError,
};
use crate::error::SnmpError;
use crate::oid::Oid;
use crate::path::{PathHandle, PathNode};
use crate::table::{filter_subtree, join_snapshot, FetchedTable, TableRows};
use crate::value::Value;

/// Modules preloaded at construction: the handshake scalar's module plus
/// the common interface/address/host tables.
const WELL_KNOWN_MODULES: &[&str] = &["SNMPv2-MIB", "IF-MIB", "IP-MIB", "HOST-RESOURCES-MIB"];

/// Scalar used to probe candidate credentials.
const PROBE_SCALAR: &str = "SNMPv2-MIB::sysName.0";

pub struct SnmpClient {
    resolver: Arc<dyn MibResolver>,
    transport: Arc<dyn SnmpTransport>,
    host: String,
    target: CommunityTarget,
    config: ClientConfig,
}

impl std::fmt::Debug for SnmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpClient")
            .field("host", &self.host)
            .field("target", &self.target)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SnmpClient {
    /// Connect to `host`, trying `credentials` in order until one produces
    /// a non-timeout response to `sysName.0`.
    ///
    /// Fails with [`SnmpError::Connection`] when the host name does not
    /// resolve and [`SnmpError::NoLiveCredential`] when every credential
    /// times out. A non-timeout error indication still proves a live agent
    /// and selects that credential, matching how communities behave in the
    /// field: a wrong community times out, a right one may still complain
    /// about the probe OID.
    pub async fn connect(
        resolver: Arc<dyn MibResolver>,
        transport: Arc<dyn SnmpTransport>,
        host: &str,
        credentials: &[Credential],
        config: ClientConfig,
    ) -> Result<Self, SnmpError> {
        for module in WELL_KNOWN_MODULES {
            load_module_idempotent(resolver.as_ref(), module)?;
        }
        let probe_oid = codec::resolve_name(resolver.as_ref(), PROBE_SCALAR)?;

        for credential in credentials {
            let target = CommunityTarget {
                host: host.to_string(),
                port: credential.port.unwrap_or(config.default_port),
                community: credential.community.clone(),
                version: credential.version,
                security_name: credential.name.clone(),
            };

            match transport.get_scalar(&target, &probe_oid).await {
                Ok(sys_name) => {
                    info!(
                        host = %host,
                        port = target.port,
                        community = %target.community,
                        sys_name = %sys_name,
                        "agent responded, credential selected"
                    );
                    return Ok(Self {
                        resolver: Arc::clone(&resolver),
                        transport: Arc::clone(&transport),
                        host: host.to_string(),
                        target,
                        config,
                    });
                }
                Err(TransportError::Timeout) => {
                    debug!(
                        host = %host,
                        port = target.port,
                        community = %target.community,
                        "credential timed out, trying next"
                    );
                }
                Err(TransportError::UnresolvableHost(reason)) => {
                    warn!(host = %host, reason = %reason, "host name did not resolve");
                    return Err(SnmpError::Connection(host.to_string()));
                }
                Err(TransportError::Agent(reason)) => {
                    warn!(
                        host = %host,
                        community = %target.community,
                        reason = %reason,
                        "agent answered with an error indication, credential selected anyway"
                    );
                    return Ok(Self {
                        resolver: Arc::clone(&resolver),
                        transport: Arc::clone(&transport),
                        host: host.to_string(),
                        target,
                        config,
                    });
                }
            }
        }

        Err(SnmpError::NoLiveCredential(host.to_string()))
    }

    /// Get one scalar node.
    pub async fn get(&self, oid: impl Into<OidSpec>) -> Result<Value, SnmpError> {
        let oid = oid.into().resolve(self.resolver.as_ref())?;
        debug!(host = %self.host, oid = %oid, "get");
        self.transport
            .get_scalar(&self.target, &oid)
            .await
            .map_err(|source| SnmpError::Get {
                oid: oid.to_dotted(),
                host: self.host.clone(),
                source,
            })
    }

    /// Set one scalar node, returning the value the agent reports back.
    pub async fn set(
        &self,
        oid: impl Into<OidSpec>,
        value: impl Into<Value>,
    ) -> Result<Value, SnmpError> {
        let oid = oid.into().resolve(self.resolver.as_ref())?;
        debug!(host = %self.host, oid = %oid, "set");
        self.transport
            .set_scalar(&self.target, &oid, value.into())
            .await
            .map_err(|source| SnmpError::Set {
                oid: oid.to_dotted(),
                host: self.host.clone(),
                source,
            })
    }

    /// Retrieve a complete sub-table as (OID, value) pairs in agent order,
    /// filtered to entries under the requested subtree.
    pub async fn get_table(&self, oid: impl Into<OidSpec>) -> Result<Vec<(Oid, Value)>, SnmpError> {
        let base = oid.into().resolve(self.resolver.as_ref())?;
        self.fetch_subtree(&base).await
    }

    /// Join parallel tables into row-aligned records.
    ///
    /// With `index_table`, rows are keyed by the index column's values and
    /// every data table contributes one value per row. Without it, rows are
    /// keyed by the OID suffix past each column's base, the first data
    /// table seeds the keys, and a completeness check rejects snapshots
    /// where any row is missing a column.
    ///
    /// An inconsistent snapshot (the agent was observed mid-update) is
    /// re-fetched from scratch up to `retry_limit` times before failing
    /// with [`SnmpError::InconsistentTable`].
    pub async fn match_tables<S>(
        &self,
        index_table: Option<OidSpec>,
        data_tables: &[S],
    ) -> Result<TableRows, SnmpError>
    where
        S: Clone + Into<OidSpec>,
    {
        let data_specs: Vec<OidSpec> = data_tables.iter().cloned().map(Into::into).collect();
        if index_table.is_none() && data_specs.is_empty() {
            return Ok(TableRows::default());
        }

        for attempt in 1..=self.config.retry_limit {
            let index = match &index_table {
                Some(spec) => Some(self.fetch_table(spec).await?),
                None => None,
            };
            let mut columns = Vec::with_capacity(data_specs.len());
            for spec in &data_specs {
                columns.push(self.fetch_table(spec).await?);
            }

            match join_snapshot(index.as_ref(), &columns) {
                Ok(rows) => {
                    debug!(host = %self.host, rows = rows.len(), attempt, "tables joined");
                    return Ok(rows);
                }
                Err(reason) => {
                    warn!(
                        host = %self.host,
                        attempt,
                        limit = self.config.retry_limit,
                        reason = %reason,
                        "inconsistent table snapshot, re-fetching"
                    );
                }
            }
        }

        Err(SnmpError::InconsistentTable {
            attempts: self.config.retry_limit,
        })
    }

    /// Entry point for path navigation: select a MIB module by name.
    /// Underscores translate to the dashes MIB names actually use, and the
    /// module is loaded on first use. An unknown module is a capability
    /// lookup failure, [`SnmpError::AttributeNotFound`].
    pub fn module(&self, name: &str) -> Result<PathHandle<'_>, SnmpError> {
        let module = name.replace('_', "-");
        match self.resolver.load_module(&module) {
            Ok(()) | Err(ResolveError::AlreadyLoaded(_)) => {}
            Err(_) => return Err(SnmpError::AttributeNotFound(name.to_string())),
        }
        Ok(PathHandle::new(self, PathNode::PendingModule(module)))
    }

    /// Path handle rooted at a concrete OID.
    pub fn path(&self, oid: impl Into<Oid>) -> PathHandle<'_> {
        PathHandle::new(self, PathNode::Resolved(oid.into()))
    }

    /// Load MIB modules by name. Re-loading an already-loaded module is
    /// success.
    pub fn load_mibs(&self, modules: &[&str]) -> Result<(), SnmpError> {
        for module in modules {
            load_module_idempotent(self.resolver.as_ref(), module)?;
        }
        Ok(())
    }

    /// Add a directory to the MIB file search path.
    pub fn add_mib_path(&self, path: &Path) -> Result<(), SnmpError> {
        self.resolver
            .add_search_path(path)
            .map_err(|source| SnmpError::ModuleLoad {
                name: path.display().to_string(),
                source,
            })
    }

    /// Symbolic `MODULE::symbol[.index]` rendering of an OID.
    pub fn node_name(&self, oid: impl Into<OidSpec>) -> Result<String, SnmpError> {
        let oid = oid.into().resolve(self.resolver.as_ref())?;
        codec::symbolic_name(self.resolver.as_ref(), &oid)
    }

    /// Raw symbolic location of an OID.
    pub fn node_info(&self, oid: impl Into<OidSpec>) -> Result<NodeLocation, SnmpError> {
        let oid = oid.into().resolve(self.resolver.as_ref())?;
        codec::node_info(self.resolver.as_ref(), &oid)
    }

    /// Numeric OID for a symbolic name or dotted string.
    pub fn node_id(&self, oid: impl Into<OidSpec>) -> Result<Oid, SnmpError> {
        oid.into().resolve(self.resolver.as_ref())
    }

    /// The host this client was constructed for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The identity selected by the construction handshake.
    pub fn target(&self) -> &CommunityTarget {
        &self.target
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &dyn MibResolver {
        self.resolver.as_ref()
    }

    async fn fetch_subtree(&self, base: &Oid) -> Result<Vec<(Oid, Value)>, SnmpError> {
        let entries = self
            .transport
            .bulk_walk(&self.target, base, self.config.max_repetitions)
            .await
            .map_err(|source| SnmpError::Get {
                oid: base.to_dotted(),
                host: self.host.clone(),
                source,
            })?;
        let kept = filter_subtree(base, entries);
        debug!(host = %self.host, base = %base, entries = kept.len(), "subtree fetched");
        Ok(kept)
    }

    async fn fetch_table(&self, spec: &OidSpec) -> Result<FetchedTable, SnmpError> {
        let base = spec.resolve(self.resolver.as_ref())?;
        let entries = self.fetch_subtree(&base).await?;
        Ok(FetchedTable { base, entries })
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        resolver: Arc<dyn MibResolver>,
        transport: Arc<dyn SnmpTransport>,
        host: &str,
        target: CommunityTarget,
        config: ClientConfig,
    ) -> Self {
        Self {
            resolver,
            transport,
            host: host.to_string(),
            target,
            config,
        }
    }
}

fn load_module_idempotent(resolver: &dyn MibResolver, name: &str) -> Result<(), SnmpError> {
    match resolver.load_module(name) {
        Ok(()) | Err(ResolveError::AlreadyLoaded(_)) => Ok(()),
        Err(source) => Err(SnmpError::ModuleLoad {
            name: name.to_string(),
            source,
        }),
    }
}
