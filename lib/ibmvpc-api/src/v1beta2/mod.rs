//! Storage version of the IBM VPC cluster infrastructure API

pub mod cluster;
pub mod condition;
pub mod load_balancer;
pub mod network;
pub mod reference;
pub mod security_group;
pub mod services;
pub mod state;

pub use cluster::{
    APIEndpoint, IBMVPCCluster, IBMVPCClusterSpec, IBMVPCClusterStatus, CLUSTER_FINALIZER,
    CLUSTER_NAME_LABEL,
};
pub use condition::{
    validate_conditions, Condition, ConditionSeverity, ConditionStatus, Conditions,
    READY_CONDITION,
};
pub use load_balancer::{
    AdditionalListenerSpec, ListenerSet, VPCLoadBalancerSpec, VPCLoadBalancerStatus,
};
pub use network::{Subnet, VPCEndpoint, VPCNetworkSpec, VPC};
pub use reference::{ResourceLookup, VPCResourceReference};
pub use security_group::{
    PortRange, Remote, SecurityGroup, SecurityGroupRule, SecurityGroupRuleAction,
    SecurityGroupRuleDirection, SecurityGroupRuleProtocol, SecurityGroupRuleRemote,
    SecurityGroupRuleRemoteSpec, SecurityGroupRuleRemoteType,
};
pub use services::{CISInstance, CosInstance, DNSServicesInstance};
pub use state::{DeletePolicy, PowerVSImageState, PowerVSInstanceState, VPCLoadBalancerState};

/// API version of the storage version
pub const API_VERSION: &str = "v1beta2";
