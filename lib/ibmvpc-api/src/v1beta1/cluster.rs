use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::v1beta2::{
    APIEndpoint, Condition, Subnet, VPCEndpoint, VPCLoadBalancerSpec, VPCLoadBalancerState, VPC,
};

/// IBMVPCCluster as first served: one zone, one VPC by name and a single
/// optional control plane load balancer
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "IBMVPCCluster",
    plural = "ibmvpcclusters",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "IBMVPCClusterStatus",
    category = "cluster-api",
    printcolumn = r#"{"name":"Cluster","type":"string","description":"Cluster to which this IBMVPCCluster belongs","jsonPath":".metadata.labels.cluster\\.x-k8s\\.io/cluster-name"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","description":"Cluster infrastructure is ready for IBM VPC instances","jsonPath":".status.ready"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterSpec {
    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub resource_group: String,

    /// Name of the VPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    #[serde(default)]
    pub control_plane_endpoint: APIEndpoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer: Option<VPCLoadBalancerSpec>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterStatus {
    #[serde(default)]
    pub vpc: VPC,

    #[serde(default)]
    pub ready: bool,

    #[serde(default)]
    pub subnet: Subnet,

    #[serde(default)]
    pub vpc_endpoint: VPCEndpoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer_state: Option<VPCLoadBalancerState>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}
