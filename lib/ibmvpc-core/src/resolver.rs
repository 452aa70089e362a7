//! Reference resolution against the cloud, cached for one reconcile pass

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use ibmvpc_api::v1beta2::{ResourceLookup, Subnet, VPCNetworkSpec, VPCResourceReference};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ResolveError, Result};
use crate::resource::{CloudResource, ResourceKind};

/// Read access to cloud resources, implemented by a cloud client adapter
#[async_trait]
pub trait ResourceLookupClient: Send + Sync {
    /// The resource with this id, if it exists in the region
    async fn get_by_id(
        &self,
        kind: ResourceKind,
        region: &str,
        id: &str,
    ) -> Result<Option<CloudResource>>;

    /// Every resource with this name in the region
    async fn list_by_name(
        &self,
        kind: ResourceKind,
        region: &str,
        name: &str,
    ) -> Result<Vec<CloudResource>>;
}

/// Resolves references for one reconcile pass.
///
/// Lookups without a region use the cluster region. Successful results are
/// cached for the lifetime of the resolver; create a new one per pass.
pub struct ReferenceResolver<C> {
    client: C,
    default_region: String,
    cache: RwLock<HashMap<(ResourceKind, ResourceLookup), CloudResource>>,
}

/// Existing cloud resources a network spec points at, aligned with the
/// declared lists. `None` marks an entry with nothing to look up or one that
/// does not exist yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedNetwork {
    pub vpc: Option<CloudResource>,
    pub control_plane_subnets: Vec<Option<CloudResource>>,
    pub compute_subnets: Vec<Option<CloudResource>>,
    pub security_group_vpcs: Vec<Option<CloudResource>>,
}

impl<C: ResourceLookupClient> ReferenceResolver<C> {
    pub fn new(client: C, default_region: impl Into<String>) -> Self {
        Self {
            client,
            default_region: default_region.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve a reference to exactly one existing resource.
    ///
    /// Fails with `Invalid` when both or neither of id and name are set,
    /// `NotFound` when nothing matches and `AmbiguousReference` when a name
    /// matches more than one resource.
    pub async fn resolve(
        &self,
        kind: ResourceKind,
        reference: &VPCResourceReference,
    ) -> Result<CloudResource> {
        let lookup = reference.lookup()?;
        self.resolve_lookup(kind, lookup).await
    }

    /// Like `resolve`, but a missing resource is `Ok(None)`
    pub async fn find(
        &self,
        kind: ResourceKind,
        reference: &VPCResourceReference,
    ) -> Result<Option<CloudResource>> {
        match self.resolve(kind, reference).await {
            Ok(resource) => Ok(Some(resource)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn resolve_lookup(
        &self,
        kind: ResourceKind,
        lookup: ResourceLookup,
    ) -> Result<CloudResource> {
        let lookup = lookup.scoped_to(&self.default_region);
        let key = (kind, lookup);

        if let Some(resource) = self.cache.read().await.get(&key) {
            debug!(%kind, lookup = %key.1, "Resolved from cache");
            return Ok(resource.clone());
        }

        let (kind, lookup) = &key;
        let region = lookup.region_or(&self.default_region);
        let resource = match lookup {
            ResourceLookup::ById { id, .. } => self
                .client
                .get_by_id(*kind, region, id)
                .await?
                .ok_or_else(|| ResolveError::NotFound {
                    kind: *kind,
                    lookup: lookup.to_string(),
                })?,
            ResourceLookup::ByName { name, .. } => {
                let mut matches = self.client.list_by_name(*kind, region, name).await?;
                match matches.len() {
                    0 => {
                        return Err(ResolveError::NotFound {
                            kind: *kind,
                            lookup: lookup.to_string(),
                        })
                    }
                    1 => matches.remove(0),
                    count => {
                        return Err(ResolveError::AmbiguousReference {
                            kind: *kind,
                            name: name.clone(),
                            region: region.to_string(),
                            count,
                        })
                    }
                }
            }
        };

        debug!(%kind, %lookup, id = %resource.id, "Resolved reference");
        self.cache.write().await.insert(key, resource.clone());
        Ok(resource)
    }

    async fn find_subnets(&self, subnets: &[Subnet]) -> Result<Vec<Option<CloudResource>>> {
        try_join_all(subnets.iter().map(|subnet| async move {
            match subnet.reference() {
                Some(reference) => self.find(ResourceKind::Subnet, &reference).await,
                None => Ok(None),
            }
        }))
        .await
    }

    /// Look up every existing resource a network spec refers to, sharing
    /// this pass's cache. Only failures other than absence are errors.
    pub async fn resolve_network(&self, spec: &VPCNetworkSpec) -> Result<ResolvedNetwork> {
        let vpc = async {
            match &spec.vpc {
                Some(reference) => self.find(ResourceKind::Vpc, reference).await,
                None => Ok(None),
            }
        };
        let security_group_vpcs = try_join_all(spec.security_groups.iter().map(|sg| async move {
            match &sg.vpc {
                Some(reference) => self.find(ResourceKind::Vpc, reference).await,
                None => Ok(None),
            }
        }));

        let (vpc, control_plane_subnets, compute_subnets, security_group_vpcs) = futures::try_join!(
            vpc,
            self.find_subnets(&spec.control_plane_subnets_spec),
            self.find_subnets(&spec.compute_subnets_spec),
            security_group_vpcs,
        )?;

        let resolved = ResolvedNetwork {
            vpc,
            control_plane_subnets,
            compute_subnets,
            security_group_vpcs,
        };
        info!(
            vpc = resolved.vpc.as_ref().map(|v| v.id.as_str()),
            existing_subnets = resolved.existing_subnets().count(),
            "Resolved network references"
        );
        Ok(resolved)
    }

    /// Number of cached results in this pass
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl ResolvedNetwork {
    pub fn existing_subnets(&self) -> impl Iterator<Item = &CloudResource> {
        self.control_plane_subnets
            .iter()
            .chain(self.compute_subnets.iter())
            .flatten()
    }
}
