//! Previous served version, read and converted to the storage version

pub mod cluster;

pub use cluster::{IBMVPCCluster, IBMVPCClusterSpec, IBMVPCClusterStatus};

pub const API_VERSION: &str = "v1beta1";
