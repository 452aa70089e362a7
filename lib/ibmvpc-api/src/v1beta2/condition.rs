use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::validation::{child, index, require_non_empty};

/// Condition type summarising the overall readiness of an object
pub const READY_CONDITION: &str = "Ready";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// How bad a `False` condition is
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionSeverity {
    Error,
    Warning,
    Info,
}

/// Observation of one aspect of the current state of a Cluster API object
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,

    pub status: ConditionStatus,

    /// Only meaningful when status is False
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ConditionSeverity>,

    pub last_transition_time: DateTime<Utc>,

    /// CamelCase reason for the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(type_: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            type_: type_.into(),
            status,
            severity: None,
            last_transition_time: Utc::now(),
            reason: None,
            message: None,
        }
    }

    pub fn true_(type_: impl Into<String>) -> Self {
        Self::new(type_, ConditionStatus::True)
    }

    pub fn false_(
        type_: impl Into<String>,
        reason: impl Into<String>,
        severity: ConditionSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Some(severity),
            reason: Some(reason.into()),
            message: Some(message.into()),
            ..Self::new(type_, ConditionStatus::False)
        }
    }

    pub fn unknown(type_: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(type_, ConditionStatus::Unknown)
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.last_transition_time = time;
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Objects carrying a Cluster API condition list.
///
/// `set_conditions` replaces the whole list; `get_conditions` returns exactly
/// what was last set, in the same order.
pub trait Conditions {
    fn get_conditions(&self) -> Vec<Condition>;

    fn set_conditions(&mut self, conditions: Vec<Condition>);

    fn condition(&self, type_: &str) -> Option<Condition> {
        self.get_conditions().into_iter().find(|c| c.type_ == type_)
    }

    fn is_ready(&self) -> bool {
        self.condition(READY_CONDITION).is_some_and(|c| c.is_true())
    }
}

/// Condition types must be non-empty and unique within one list
pub fn validate_conditions(field: &str, conditions: &[Condition]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for (i, condition) in conditions.iter().enumerate() {
        let type_field = child(&index(field, i), "type");
        require_non_empty(&type_field, &condition.type_)?;
        if !seen.insert(condition.type_.as_str()) {
            return Err(ValidationError::DuplicateEntry {
                field: type_field,
                value: condition.type_.clone(),
            });
        }
    }
    Ok(())
}
