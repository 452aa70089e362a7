//! Reading persisted IBMVPCCluster documents of every served version

use serde_json::Value;

use crate::error::ConversionError;
use crate::{v1beta1, v1beta2, API_GROUP};

const KIND: &str = "IBMVPCCluster";

/// Decode a cluster document of any served version into the storage version
pub fn decode_cluster(document: Value) -> Result<v1beta2::IBMVPCCluster, ConversionError> {
    let api_version = document
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or(ConversionError::MissingApiVersion)?
        .to_string();

    let kind = document.get("kind").and_then(Value::as_str).unwrap_or_default();
    if kind != KIND {
        return Err(ConversionError::UnsupportedKind(kind.to_string()));
    }

    let version = match api_version.split_once('/') {
        Some((group, version)) if group == API_GROUP => version,
        _ => return Err(ConversionError::UnsupportedVersion(api_version.clone())),
    };

    match version {
        v1beta2::API_VERSION => {
            serde_json::from_value(document).map_err(|source| ConversionError::Malformed {
                version: api_version.clone(),
                source,
            })
        }
        v1beta1::API_VERSION => serde_json::from_value::<v1beta1::IBMVPCCluster>(document)
            .map(Into::into)
            .map_err(|source| ConversionError::Malformed {
                version: api_version.clone(),
                source,
            }),
        _ => Err(ConversionError::UnsupportedVersion(api_version.clone())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<v1beta1::IBMVPCClusterSpec> for v1beta2::IBMVPCClusterSpec {
    fn from(old: v1beta1::IBMVPCClusterSpec) -> Self {
        let vpc = non_empty(old.vpc).map(v1beta2::VPCResourceReference::by_name);
        let control_plane_subnets_spec = non_empty(old.zone)
            .map(|zone| {
                vec![v1beta2::Subnet {
                    zone: Some(zone),
                    ..Default::default()
                }]
            })
            .unwrap_or_default();

        let network_spec = (vpc.is_some() || !control_plane_subnets_spec.is_empty()).then(|| {
            v1beta2::VPCNetworkSpec {
                vpc,
                control_plane_subnets_spec,
                ..Default::default()
            }
        });

        Self {
            region: old.region,
            resource_group: old.resource_group,
            control_plane_endpoint: old.control_plane_endpoint,
            control_plane_load_balancer: old.control_plane_load_balancer.into_iter().collect(),
            network_spec,
            ..Default::default()
        }
    }
}

impl From<v1beta1::IBMVPCClusterStatus> for v1beta2::IBMVPCClusterStatus {
    fn from(old: v1beta1::IBMVPCClusterStatus) -> Self {
        Self {
            vpc: old.vpc,
            ready: old.ready,
            subnet: old.subnet,
            vpc_endpoint: old.vpc_endpoint,
            control_plane_load_balancer_state: old.control_plane_load_balancer_state,
            conditions: old.conditions,
            ..Default::default()
        }
    }
}

impl From<v1beta1::IBMVPCCluster> for v1beta2::IBMVPCCluster {
    fn from(old: v1beta1::IBMVPCCluster) -> Self {
        Self {
            metadata: old.metadata,
            spec: old.spec.into(),
            status: old.status.map(Into::into),
        }
    }
}
