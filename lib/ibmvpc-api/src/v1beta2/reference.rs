use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::validation::{child, optional_non_empty};

/// VPCResourceReference is a reference to a specific VPC resource by ID or Name.
///
/// Only one of ID or Name may be specified. The pair is checked where the
/// reference is used, through [`VPCResourceReference::lookup`], not when the
/// object is stored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct VPCResourceReference {
    /// ID of resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1))]
    pub id: Option<String>,

    /// Name of resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1))]
    pub name: Option<String>,

    /// IBM Cloud VPC region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl VPCResourceReference {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Scope the reference to a region other than the cluster's
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Turn the reference into an unambiguous lookup.
    ///
    /// Fails when both or neither of id and name are set.
    pub fn lookup(&self) -> Result<ResourceLookup> {
        self.lookup_at("reference")
    }

    pub fn lookup_at(&self, field: &str) -> Result<ResourceLookup> {
        self.validate_at(field)?;
        let region = self.region.clone();
        match (&self.id, &self.name) {
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousSelector {
                field: field.to_string(),
            }),
            (None, None) => Err(ValidationError::MissingSelector {
                field: field.to_string(),
            }),
            (Some(id), None) => Ok(ResourceLookup::ById {
                id: id.clone(),
                region,
            }),
            (None, Some(name)) => Ok(ResourceLookup::ByName {
                name: name.clone(),
                region,
            }),
        }
    }

    /// Admission check: id, name and region may be absent but not empty
    pub fn validate_at(&self, field: &str) -> Result<()> {
        optional_non_empty(&child(field, "id"), self.id.as_deref())?;
        optional_non_empty(&child(field, "name"), self.name.as_deref())?;
        optional_non_empty(&child(field, "region"), self.region.as_deref())
    }
}

/// A resource reference with exactly one selector
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceLookup {
    ById { id: String, region: Option<String> },
    ByName { name: String, region: Option<String> },
}

impl ResourceLookup {
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::ById { region, .. } | Self::ByName { region, .. } => region.as_deref(),
        }
    }

    /// Region the lookup is scoped to, falling back to the cluster region
    pub fn region_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.region().unwrap_or(default)
    }

    /// Pin an unscoped lookup to the given region
    pub fn scoped_to(self, default_region: &str) -> Self {
        match self {
            Self::ById { id, region } => Self::ById {
                id,
                region: region.or_else(|| Some(default_region.to_string())),
            },
            Self::ByName { name, region } => Self::ByName {
                name,
                region: region.or_else(|| Some(default_region.to_string())),
            },
        }
    }
}

impl std::fmt::Display for ResourceLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ById { id, .. } => write!(f, "id {id:?}")?,
            Self::ByName { name, .. } => write!(f, "name {name:?}")?,
        }
        if let Some(region) = self.region() {
            write!(f, " in region {region}")?;
        }
        Ok(())
    }
}

impl From<ResourceLookup> for VPCResourceReference {
    fn from(lookup: ResourceLookup) -> Self {
        match lookup {
            ResourceLookup::ById { id, region } => Self {
                id: Some(id),
                name: None,
                region,
            },
            ResourceLookup::ByName { name, region } => Self {
                id: None,
                name: Some(name),
                region,
            },
        }
    }
}
