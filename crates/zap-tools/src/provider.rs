// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cached tool discovery over a shared client handle.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;
use zap_client::ZapClient;
use zap_core::{Stability, Tool, ToolId, Welcome, ZapError};

use crate::adapter::RemoteTool;

/// Catalog filters; absent fields are wildcards and filters AND together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    /// Exact match on the tool's namespace.
    pub namespace: Option<String>,
    /// `starts_with` match on the tool's name.
    pub prefix: Option<String>,
    /// Keep only tools with `stability == stable`.
    pub certified_only: bool,
}

impl ToolFilter {
    /// Wildcard filter.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to a namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Restrict to a name prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Restrict to certified (stable) tools.
    #[must_use]
    pub fn certified_only(mut self, value: bool) -> Self {
        self.certified_only = value;
        self
    }

    fn matches(&self, tool: &Tool) -> bool {
        if let Some(ns) = &self.namespace
            && tool.id.namespace != *ns
        {
            return false;
        }
        if let Some(prefix) = &self.prefix
            && !tool.id.name.starts_with(prefix.as_str())
        {
            return false;
        }
        if self.certified_only && tool.stability != Stability::Stable {
            return false;
        }
        true
    }
}

type CatalogSnapshot = Arc<BTreeMap<String, Tool>>;

/// Discovers gateway tools and hands out identity-stable adapters.
///
/// The catalog memo is populated on [`connect`](ToolProvider::connect),
/// swapped wholesale on [`refresh`](ToolProvider::refresh) (concurrent
/// readers see the pre- or post-refresh snapshot, never a mix), and cleared
/// only on [`disconnect`](ToolProvider::disconnect).
pub struct ToolProvider {
    client: Arc<ZapClient>,
    catalog: RwLock<CatalogSnapshot>,
    adapters: Mutex<BTreeMap<String, Arc<RemoteTool>>>,
}

impl ToolProvider {
    /// Provider over an existing (possibly not yet connected) client.
    #[must_use]
    pub fn new(client: Arc<ZapClient>) -> Self {
        Self {
            client,
            catalog: RwLock::new(Arc::new(BTreeMap::new())),
            adapters: Mutex::new(BTreeMap::new()),
        }
    }

    /// Provider over a fresh client for `uri`.
    ///
    /// # Errors
    ///
    /// `invalidParams` for URIs outside the three ZAP schemes.
    pub fn from_uri(uri: &str) -> Result<Self, ZapError> {
        Ok(Self::new(Arc::new(ZapClient::from_uri(uri)?)))
    }

    /// The shared client handle.
    #[must_use]
    pub fn client(&self) -> &Arc<ZapClient> {
        &self.client
    }

    /// Connect the client and run the initial discovery.
    ///
    /// # Errors
    ///
    /// Connection and discovery failures surface unchanged.
    pub async fn connect(&self) -> Result<Welcome, ZapError> {
        let welcome = self.client.connect().await?;
        self.refresh().await?;
        Ok(welcome)
    }

    /// Re-fetch the catalog and swap the snapshot atomically.
    ///
    /// Existing adapter instances stay valid; the identity map is reset so
    /// stale descriptors are not handed out again.
    ///
    /// # Errors
    ///
    /// Surfaces `catalog.listTools` failures unchanged.
    pub async fn refresh(&self) -> Result<(), ZapError> {
        let tools = self.client.list_tools(false).await?;
        debug!(target: "zap.tools", "catalog refresh: {} tools", tools.len());
        let snapshot: BTreeMap<String, Tool> = tools
            .into_iter()
            .map(|tool| (tool.full_name(), tool))
            .collect();
        *self.catalog.write().expect("catalog lock poisoned") = Arc::new(snapshot);
        self.adapters.lock().expect("adapter lock poisoned").clear();
        Ok(())
    }

    /// Close the client and clear every cache.
    pub async fn disconnect(&self) {
        self.client.close().await;
        *self.catalog.write().expect("catalog lock poisoned") = Arc::new(BTreeMap::new());
        self.adapters.lock().expect("adapter lock poisoned").clear();
    }

    fn snapshot(&self) -> CatalogSnapshot {
        Arc::clone(&self.catalog.read().expect("catalog lock poisoned"))
    }

    fn adapter_for(&self, tool: &Tool) -> Arc<RemoteTool> {
        let mut adapters = self.adapters.lock().expect("adapter lock poisoned");
        Arc::clone(
            adapters
                .entry(tool.full_name())
                .or_insert_with(|| Arc::new(RemoteTool::new(Arc::clone(&self.client), tool.clone()))),
        )
    }

    /// Adapters for every catalog entry matching `filter`.
    ///
    /// Repeated calls return the same adapter instance per tool id.
    ///
    /// # Errors
    ///
    /// Surfaces discovery failures when the catalog has to be (re)fetched.
    pub async fn get_tools(&self, filter: &ToolFilter) -> Result<Vec<Arc<RemoteTool>>, ZapError> {
        if self.snapshot().is_empty() {
            self.refresh().await?;
        }
        let snapshot = self.snapshot();
        Ok(snapshot
            .values()
            .filter(|tool| filter.matches(tool))
            .map(|tool| self.adapter_for(tool))
            .collect())
    }

    /// Adapter for one tool, fetching it from the gateway on a cache miss.
    ///
    /// # Errors
    ///
    /// `invalidParams` for unparsable names; gateway failures unchanged.
    pub async fn get_tool(&self, name: &str) -> Result<Arc<RemoteTool>, ZapError> {
        let key = ToolId::parse(name)?.to_string();
        let cached = self.snapshot().get(&key).cloned();
        let tool = match cached {
            Some(tool) => tool,
            None => {
                let tool = self.client.get_tool(name).await?;
                let mut next: BTreeMap<String, Tool> = (*self.snapshot()).clone();
                next.insert(tool.full_name(), tool.clone());
                *self.catalog.write().expect("catalog lock poisoned") = Arc::new(next);
                tool
            }
        };
        Ok(self.adapter_for(&tool))
    }
}

impl std::fmt::Debug for ToolProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolProvider")
            .field("endpoint", self.client.endpoint())
            .field("cached_tools", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

/// One-shot discovery: connect to `uri`, filter, and return the provider
/// together with its adapters (the provider keeps the connection alive).
///
/// # Errors
///
/// Connection and discovery failures surface unchanged.
pub async fn discover_tools(
    uri: &str,
    filter: &ToolFilter,
) -> Result<(ToolProvider, Vec<Arc<RemoteTool>>), ZapError> {
    let provider = ToolProvider::from_uri(uri)?;
    provider.connect().await?;
    let tools = provider.get_tools(filter).await?;
    Ok((provider, tools))
}
