// SPDX-License-Identifier: MIT OR Apache-2.0
//! Aggregation of tool providers into one flat, collision-free namespace.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;
use zap_core::ZapError;

use crate::adapter::AgentTool;
use crate::provider::{ToolFilter, ToolProvider};

/// Drop tools whose exposed name is already taken.
///
/// Distinct tool ids can collide after the `.` → `_` substitution; the
/// first registration wins and the duplicate is logged, never overwritten.
#[must_use]
pub fn dedup_by_name(tools: Vec<Arc<dyn AgentTool>>) -> Vec<Arc<dyn AgentTool>> {
    let mut seen: BTreeMap<String, ()> = BTreeMap::new();
    let mut kept = Vec::with_capacity(tools.len());
    for tool in tools {
        match seen.entry(tool.name().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(());
                kept.push(tool);
            }
            Entry::Occupied(_) => {
                warn!(
                    target: "zap.tools",
                    "duplicate tool name {:?}; keeping the first registration",
                    tool.name()
                );
            }
        }
    }
    kept
}

/// Named collection of [`ToolProvider`]s, usually one per gateway.
#[derive(Default)]
pub struct ToolRegistry {
    providers: Mutex<BTreeMap<String, Arc<ToolProvider>>>,
}

impl ToolRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `provider` and register it under `name`.
    ///
    /// Registering over an existing name disconnects the old provider
    /// first.
    ///
    /// # Errors
    ///
    /// Connection failures surface unchanged; the provider is not
    /// registered in that case.
    pub async fn register(&self, name: &str, provider: Arc<ToolProvider>) -> Result<(), ZapError> {
        provider.connect().await?;
        let previous = self
            .providers
            .lock()
            .await
            .insert(name.to_string(), provider);
        if let Some(previous) = previous {
            warn!(target: "zap.tools", "replacing provider {name:?}");
            previous.disconnect().await;
        }
        Ok(())
    }

    /// Disconnect and remove the provider registered under `name`.
    pub async fn unregister(&self, name: &str) {
        let removed = self.providers.lock().await.remove(name);
        if let Some(provider) = removed {
            provider.disconnect().await;
        }
    }

    /// Disconnect every provider and clear the registry.
    pub async fn close(&self) {
        let drained: Vec<_> = {
            let mut providers = self.providers.lock().await;
            std::mem::take(&mut *providers).into_values().collect()
        };
        for provider in drained {
            provider.disconnect().await;
        }
    }

    /// All tools from all providers, first-wins on name collisions.
    ///
    /// # Errors
    ///
    /// Surfaces the first provider discovery failure.
    pub async fn all_tools(&self) -> Result<Vec<Arc<dyn AgentTool>>, ZapError> {
        let providers: Vec<_> = self.providers.lock().await.values().cloned().collect();
        let mut tools: Vec<Arc<dyn AgentTool>> = Vec::new();
        for provider in providers {
            for adapter in provider.get_tools(&ToolFilter::any()).await? {
                tools.push(adapter);
            }
        }
        Ok(dedup_by_name(tools))
    }

    /// Find one tool by (possibly namespaced) name across all providers.
    ///
    /// # Errors
    ///
    /// `invalidParams` for unparsable names, `notFound` when no provider
    /// can produce the tool.
    pub async fn get_tool(&self, name: &str) -> Result<Arc<dyn AgentTool>, ZapError> {
        zap_core::ToolId::parse(name)?;
        let providers: Vec<_> = self.providers.lock().await.values().cloned().collect();
        for provider in providers {
            if let Ok(adapter) = provider.get_tool(name).await {
                return Ok(adapter);
            }
        }
        Err(ZapError::not_found(format!("tool not found: {name}")))
    }
}
