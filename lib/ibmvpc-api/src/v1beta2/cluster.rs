use std::collections::{BTreeMap, HashSet};

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::condition::{validate_conditions, Condition, Conditions};
use super::load_balancer::{VPCLoadBalancerSpec, VPCLoadBalancerStatus};
use super::network::{Subnet, VPCEndpoint, VPCNetworkSpec, VPC};
use super::services::{CISInstance, CosInstance, DNSServicesInstance};
use super::state::VPCLoadBalancerState;
use crate::error::{Result, ValidationError};
use crate::validation::{child, index, require_non_empty, require_range};

/// Finalizer that lets the controller clean up cloud resources before an
/// IBMVPCCluster is removed from the API server
pub const CLUSTER_FINALIZER: &str = "ibmvpccluster.infrastructure.cluster.x-k8s.io";

/// Label linking infrastructure objects to their owning Cluster API cluster
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

/// IBMVPCCluster is the infrastructure of a Cluster API cluster on IBM Cloud VPC
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
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
    /// IBM Cloud Internet Services instance for DNS records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cis_instance: Option<CISInstance>,

    /// Endpoint used to communicate with the control plane
    #[serde(default)]
    pub control_plane_endpoint: APIEndpoint,

    /// Load balancers fronting the control plane
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_load_balancer: Vec<VPCLoadBalancerSpec>,

    /// Object storage holding bootstrap data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_instance: Option<CosInstance>,

    /// IBM Cloud DNS Services instance for DNS records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_services_instance: Option<DNSServicesInstance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_spec: Option<VPCNetworkSpec>,

    /// IBM Cloud VPC region
    #[serde(default)]
    pub region: String,

    /// Resource group the cluster resources are created in
    #[serde(default)]
    pub resource_group: String,
}

/// Address and port of an API server
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct APIEndpoint {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: i32,
}

impl APIEndpoint {
    pub fn is_zero(&self) -> bool {
        self.host.is_empty() && self.port == 0
    }
}

impl IBMVPCClusterSpec {
    /// Admission checks for a declared cluster, returning the first violation
    pub fn validate(&self) -> Result<()> {
        self.validate_at("spec")
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_non_empty(&child(field, "region"), &self.region)?;
        require_non_empty(&child(field, "resourceGroup"), &self.resource_group)?;

        if self.control_plane_endpoint.port != 0 {
            let port_field = child(&child(field, "controlPlaneEndpoint"), "port");
            require_range(
                &port_field,
                self.control_plane_endpoint.port.into(),
                1,
                u16::MAX.into(),
            )?;
        }

        if let Some(cis) = &self.cis_instance {
            cis.validate_at(&child(field, "cisInstance"))?;
        }
        if let Some(cos) = &self.cos_instance {
            cos.validate_at(&child(field, "cosInstance"))?;
        }
        if let Some(dns) = &self.dns_services_instance {
            dns.validate_at(&child(field, "dnsServicesInstance"))?;
        }
        if let Some(network) = &self.network_spec {
            network.validate_at(&child(field, "networkSpec"), &self.resource_group)?;
        }

        let lb_field = child(field, "controlPlaneLoadBalancer");
        let mut names = HashSet::new();
        for (i, lb) in self.control_plane_load_balancer.iter().enumerate() {
            let item = index(&lb_field, i);
            lb.validate_at(&item)?;
            if let Some(name) = &lb.name {
                if !names.insert(name.as_str()) {
                    return Err(ValidationError::DuplicateEntry {
                        field: child(&item, "name"),
                        value: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Region a reference without its own region is looked up in
    pub fn default_region(&self) -> &str {
        &self.region
    }
}

/// Observed state of an IBMVPCCluster, written only by the reconciler
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterStatus {
    #[serde(default)]
    pub vpc: VPC,

    /// Whether the infrastructure is ready
    #[serde(default)]
    pub ready: bool,

    #[serde(default)]
    pub subnet: Subnet,

    #[serde(default)]
    pub vpc_endpoint: VPCEndpoint,

    /// State of the control plane load balancer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer_state: Option<VPCLoadBalancerState>,

    /// Observed load balancers keyed by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub load_balancers: BTreeMap<String, VPCLoadBalancerStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl IBMVPCClusterStatus {
    pub fn validate(&self) -> Result<()> {
        self.validate_at("status")
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        self.subnet.validate_at(&child(field, "subnet"))?;
        let lb_field = child(field, "loadBalancers");
        for (name, lb) in &self.load_balancers {
            require_non_empty(&lb_field, name)?;
            if let Some(id) = &lb.id {
                require_non_empty(&child(&child(&lb_field, name), "id"), id)?;
            }
        }
        validate_conditions(&child(field, "conditions"), &self.conditions)
    }

    /// Every observed load balancer is active
    pub fn load_balancers_ready(&self) -> bool {
        self.load_balancers.values().all(VPCLoadBalancerStatus::is_ready)
    }
}

impl Conditions for IBMVPCClusterStatus {
    fn get_conditions(&self) -> Vec<Condition> {
        self.conditions.clone()
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.conditions = conditions;
    }
}

impl Conditions for IBMVPCCluster {
    fn get_conditions(&self) -> Vec<Condition> {
        self.status
            .as_ref()
            .map(Conditions::get_conditions)
            .unwrap_or_default()
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.status
            .get_or_insert_with(IBMVPCClusterStatus::default)
            .set_conditions(conditions);
    }
}

impl IBMVPCCluster {
    /// Name of the owning Cluster API cluster
    pub fn cluster_name(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()?
            .get(CLUSTER_NAME_LABEL)
            .map(String::as_str)
    }

    pub fn has_finalizer(&self) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|name| name == CLUSTER_FINALIZER))
    }

    /// Returns false if the finalizer was already present
    pub fn add_finalizer(&mut self) -> bool {
        if self.has_finalizer() {
            return false;
        }
        self.metadata
            .finalizers
            .get_or_insert_with(Vec::new)
            .push(CLUSTER_FINALIZER.to_string());
        true
    }

    /// Returns false if the finalizer was not present
    pub fn remove_finalizer(&mut self) -> bool {
        let Some(finalizers) = self.metadata.finalizers.as_mut() else {
            return false;
        };
        let before = finalizers.len();
        finalizers.retain(|name| name != CLUSTER_FINALIZER);
        before != finalizers.len()
    }

    /// Admission checks for the desired state, and the observed state when asked
    pub fn validate(&self, include_status: bool) -> Result<()> {
        self.spec.validate()?;
        if include_status {
            if let Some(status) = &self.status {
                status.validate()?;
            }
        }
        Ok(())
    }
}
