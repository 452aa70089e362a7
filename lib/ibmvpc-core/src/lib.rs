//! Resolution of IBM Cloud VPC resource references
//!
//! This library provides:
//! - The lookup seam a cloud client adapter implements
//! - A reference resolver that caches results for one reconcile pass
//! - An in-memory inventory of cloud resources implementing the seam

pub mod error;
pub mod inventory;
pub mod resolver;
pub mod resource;

pub use error::{ResolveError, Result};
pub use inventory::Inventory;
pub use resolver::{ReferenceResolver, ResolvedNetwork, ResourceLookupClient};
pub use resource::{CloudResource, ResourceKind};
