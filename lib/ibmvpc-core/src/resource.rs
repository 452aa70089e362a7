use serde::{Deserialize, Serialize};

/// Kinds of cloud resource a cluster refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Vpc,
    Subnet,
    SecurityGroup,
    LoadBalancer,
    CisInstance,
    DnsServicesInstance,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::SecurityGroup => "security group",
            Self::LoadBalancer => "load balancer",
            Self::CisInstance => "cis instance",
            Self::DnsServicesInstance => "dns services instance",
        };
        f.write_str(name)
    }
}

/// A resource as it exists in the cloud
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResource {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
    pub region: String,
}

impl CloudResource {
    pub fn new(
        kind: ResourceKind,
        id: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            region: region.into(),
        }
    }
}
