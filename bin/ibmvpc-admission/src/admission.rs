//! Accept or reject IBMVPCCluster manifests before they reach the API server

use anyhow::{Context, Result};
use ibmvpc_api::{decode_cluster, IBMVPCCluster};
use ibmvpc_core::{CloudResource, Inventory, ReferenceResolver, ResolvedNetwork};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Split a manifest file into its documents, skipping empty ones
pub fn parse_manifests(text: &str) -> Result<Vec<serde_json::Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = serde_json::Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Decode a document of any served version and run the admission checks
pub fn admit(document: serde_json::Value, strict_status: bool) -> Result<IBMVPCCluster> {
    let cluster = decode_cluster(document)?;
    cluster.validate(strict_status)?;
    Ok(cluster)
}

pub async fn load_inventory(path: &Path) -> Result<Inventory> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let resources: Vec<CloudResource> = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing inventory {}", path.display()))?;

    let inventory = Inventory::new();
    for resource in resources {
        inventory.insert(resource).await;
    }
    info!("Loaded {} resources from {}", inventory.len().await, path.display());
    Ok(inventory)
}

/// Resolve the network references of an admitted cluster.
///
/// Resources that do not exist yet are fine; ambiguous names are not.
pub async fn check_references(
    cluster: &IBMVPCCluster,
    inventory: &Inventory,
) -> Result<Option<ResolvedNetwork>> {
    let Some(network) = &cluster.spec.network_spec else {
        return Ok(None);
    };
    let resolver = ReferenceResolver::new(inventory.clone(), cluster.spec.default_region());
    let resolved = resolver.resolve_network(network).await?;
    if resolved.vpc.is_none() && network.vpc.is_some() {
        debug!("VPC does not exist yet and will be created");
    }
    Ok(Some(resolved))
}

/// Summary of one validation run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub accepted: usize,
    pub rejected: usize,
}

pub async fn validate_file(
    path: &Path,
    strict_status: bool,
    inventory: Option<&Inventory>,
    report: &mut Report,
) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    for (i, document) in parse_manifests(&text)?.into_iter().enumerate() {
        let outcome = match admit(document, strict_status) {
            Ok(cluster) => match inventory {
                Some(inventory) => check_references(&cluster, inventory)
                    .await
                    .map(|_| cluster),
                None => Ok(cluster),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(cluster) => {
                report.accepted += 1;
                info!(
                    file = %path.display(),
                    document = i,
                    name = cluster.metadata.name.as_deref().unwrap_or_default(),
                    "Accepted IBMVPCCluster"
                );
            }
            Err(e) => {
                report.rejected += 1;
                warn!(file = %path.display(), document = i, "Rejected: {e:#}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibmvpc_api::ValidationError;
    use ibmvpc_core::ResourceKind;

    const MANIFESTS: &str = r#"
apiVersion: infrastructure.cluster.x-k8s.io/v1beta2
kind: IBMVPCCluster
metadata:
  name: capi
spec:
  region: us-south
  resourceGroup: capi-rg
  networkSpec:
    vpc:
      name: capi-vpc
    controlPlaneSubentsSpec:
      - name: capi-cp-1
---
---
apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
kind: IBMVPCCluster
metadata:
  name: legacy
spec:
  region: eu-de
  resourceGroup: legacy-rg
"#;

    #[test]
    fn multi_document_files_skip_empty_documents() {
        let documents = parse_manifests(MANIFESTS).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["metadata"]["name"], "legacy");
    }

    #[test]
    fn admits_both_versions() {
        for document in parse_manifests(MANIFESTS).unwrap() {
            assert!(admit(document, true).is_ok());
        }
    }

    #[test]
    fn rejection_keeps_validation_error() {
        let mut document = parse_manifests(MANIFESTS).unwrap().remove(0);
        document["spec"]["resourceGroup"] = serde_json::Value::String(String::new());
        let err = admit(document, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Empty {
                field: "spec.resourceGroup".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn references_resolve_against_inventory() {
        let cluster = admit(parse_manifests(MANIFESTS).unwrap().remove(0), false).unwrap();
        let inventory = Inventory::new();
        inventory
            .insert(CloudResource::new(ResourceKind::Vpc, "r006-vpc", "capi-vpc", "us-south"))
            .await;

        let resolved = check_references(&cluster, &inventory).await.unwrap().unwrap();
        assert_eq!(resolved.vpc.map(|v| v.id), Some("r006-vpc".to_string()));
        assert_eq!(resolved.control_plane_subnets, vec![None]);

        inventory
            .insert(CloudResource::new(ResourceKind::Vpc, "r006-dup", "capi-vpc", "us-south"))
            .await;
        assert!(check_references(&cluster, &inventory).await.is_err());
    }
}
