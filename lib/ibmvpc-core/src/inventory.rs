//! In-memory inventory of cloud resources

use crate::resolver::ResourceLookupClient;
use crate::resource::{CloudResource, ResourceKind};
use crate::{ResolveError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Inventory holds known cloud resources, keyed by kind and id.
///
/// Clones share the same resources, so a test or an offline admission check
/// can keep a handle while a resolver owns another.
#[derive(Clone, Default)]
pub struct Inventory {
    resources: Arc<RwLock<HashMap<(ResourceKind, String), CloudResource>>>,
    lookups: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub async fn insert(&self, resource: CloudResource) {
        let key = (resource.kind, resource.id.clone());
        debug!(kind = %resource.kind, id = %resource.id, "Added resource to inventory");
        self.resources.write().await.insert(key, resource);
    }

    /// Remove a resource, returning it if it was present
    pub async fn remove(&self, kind: ResourceKind, id: &str) -> Option<CloudResource> {
        let removed = self
            .resources
            .write()
            .await
            .remove(&(kind, id.to_string()));
        if removed.is_some() {
            debug!(%kind, id, "Removed resource from inventory");
        }
        removed
    }

    /// All resources of one kind
    pub async fn list(&self, kind: ResourceKind) -> Vec<CloudResource> {
        let resources = self.resources.read().await;
        resources
            .values()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Make every lookup fail as a backend outage would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn begin_lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(ResolveError::Backend("inventory unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceLookupClient for Inventory {
    async fn get_by_id(
        &self,
        kind: ResourceKind,
        region: &str,
        id: &str,
    ) -> Result<Option<CloudResource>> {
        self.begin_lookup()?;
        let resources = self.resources.read().await;
        Ok(resources
            .get(&(kind, id.to_string()))
            .filter(|r| r.region == region)
            .cloned())
    }

    async fn list_by_name(
        &self,
        kind: ResourceKind,
        region: &str,
        name: &str,
    ) -> Result<Vec<CloudResource>> {
        self.begin_lookup()?;
        let resources = self.resources.read().await;
        let mut matches: Vec<_> = resources
            .values()
            .filter(|r| r.kind == kind && r.region == region && r.name == name)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}
