//! IBM Cloud VPC cluster infrastructure API types and CRDs
//!
//! This library defines the `IBMVPCCluster` custom resource of the Cluster API
//! provider for IBM Cloud:
//! - v1beta2: the storage version with multi-zone networking, security groups,
//!   several control plane load balancers and service instances
//! - v1beta1: the earlier single-zone version, no longer served and converted
//!   on read
//!
//! Declared values are checked with the `validate` methods before they are
//! accepted; every failure names the offending field path.

mod string_enum;

pub mod conversion;
pub mod error;
pub mod v1beta1;
pub mod v1beta2;
mod validation;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::crd::{merge_crds, MergeError};
use kube::CustomResourceExt;

pub use conversion::decode_cluster;
pub use error::{ConversionError, ValidationError};
pub use string_enum::StringEnum;
pub use v1beta2::{Conditions, IBMVPCCluster, IBMVPCClusterSpec, IBMVPCClusterStatus};

/// API group for Cluster API infrastructure resources
pub const API_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// The IBMVPCCluster CRD listing every version, with v1beta2 stored and served.
///
/// v1beta1 is kept in the schema but not served: the API server would only
/// rewrite `apiVersion` between the two, so v1beta1 manifests must go through
/// [`decode_cluster`] (or a conversion webhook built on it) instead.
pub fn crd() -> Result<CustomResourceDefinition, MergeError> {
    let mut crd = merge_crds(
        vec![v1beta1::IBMVPCCluster::crd(), v1beta2::IBMVPCCluster::crd()],
        v1beta2::API_VERSION,
    )?;
    for version in &mut crd.spec.versions {
        version.served = version.name == v1beta2::API_VERSION;
    }
    Ok(crd)
}
