use ipnetwork::Ipv4Network;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reference::VPCResourceReference;
use super::security_group::SecurityGroup;
use crate::error::{Result, ValidationError};
use crate::validation::{child, index, optional_non_empty};

/// Desired state of the network resources for the cluster
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VPCNetworkSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compute_subnets_spec: Vec<Subnet>,

    // The persisted key is misspelled and has to stay that way
    #[serde(rename = "controlPlaneSubentsSpec", default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_subnets_spec: Vec<Subnet>,

    /// Resource group for network resources, defaults to the cluster's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<SecurityGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VPCResourceReference>,
}

impl VPCNetworkSpec {
    /// Control plane subnets followed by compute subnets
    pub fn subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.control_plane_subnets_spec
            .iter()
            .chain(self.compute_subnets_spec.iter())
    }

    pub fn security_group(&self, name: &str) -> Option<&SecurityGroup> {
        self.security_groups.iter().find(|sg| sg.name == name)
    }

    pub fn resource_group_or<'a>(&'a self, cluster_resource_group: &'a str) -> &'a str {
        self.resource_group
            .as_deref()
            .unwrap_or(cluster_resource_group)
    }

    pub fn validate_at(&self, field: &str, cluster_resource_group: &str) -> Result<()> {
        optional_non_empty(&child(field, "resourceGroup"), self.resource_group.as_deref())?;

        if let Some(vpc) = &self.vpc {
            vpc.validate_at(&child(field, "vpc"))?;
        }

        for (name, subnets) in [
            ("controlPlaneSubentsSpec", &self.control_plane_subnets_spec),
            ("computeSubnetsSpec", &self.compute_subnets_spec),
        ] {
            let subnets_field = child(field, name);
            for (i, subnet) in subnets.iter().enumerate() {
                subnet.validate_at(&index(&subnets_field, i))?;
            }
        }

        let groups_field = child(field, "securityGroups");
        let default_group = self.resource_group_or(cluster_resource_group);
        let mut seen = std::collections::HashSet::new();
        for (i, sg) in self.security_groups.iter().enumerate() {
            let sg_field = index(&groups_field, i);
            sg.validate_at(&sg_field)?;
            if !seen.insert(sg.key(default_group)) {
                return Err(ValidationError::DuplicateEntry {
                    field: child(&sg_field, "Name"),
                    value: sg.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A VPC subnet, either declared or discovered
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Subnet {
    #[serde(rename = "cidr", default, skip_serializing_if = "Option::is_none")]
    pub ipv4_cidr_block: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl Subnet {
    /// Reference to an existing subnet, if the entry names one
    pub fn reference(&self) -> Option<VPCResourceReference> {
        if self.id.is_none() && self.name.is_none() {
            return None;
        }
        Some(VPCResourceReference {
            id: self.id.clone(),
            name: self.name.clone(),
            region: None,
        })
    }

    pub fn cidr(&self) -> Option<Result<Ipv4Network>> {
        self.cidr_at("cidr")
    }

    fn cidr_at(&self, field: &str) -> Option<Result<Ipv4Network>> {
        self.ipv4_cidr_block.as_deref().map(|raw| {
            raw.parse::<Ipv4Network>()
                .map_err(|e| ValidationError::InvalidFormat {
                    field: field.to_string(),
                    message: format!("{raw:?} is not an IPv4 CIDR block: {e}"),
                })
        })
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        optional_non_empty(&child(field, "id"), self.id.as_deref())?;
        optional_non_empty(&child(field, "name"), self.name.as_deref())?;
        optional_non_empty(&child(field, "zone"), self.zone.as_deref())?;
        if let Some(cidr) = self.cidr_at(&child(field, "cidr")) {
            cidr?;
        }
        Ok(())
    }
}

/// Identity of the VPC the cluster runs in
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VPC {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,
}

impl VPC {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

/// Address the control plane is reachable at inside the VPC
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VPCEndpoint {
    #[serde(default)]
    pub address: Option<String>,

    /// Deprecated: has no function and is going to be removed
    #[serde(rename = "floatingIPID", default, skip_serializing_if = "Option::is_none")]
    pub fip_id: Option<String>,

    #[serde(rename = "loadBalancerIPID", default, skip_serializing_if = "Option::is_none")]
    pub lb_id: Option<String>,
}
