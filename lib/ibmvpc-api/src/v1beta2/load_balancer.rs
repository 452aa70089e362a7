use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::state::VPCLoadBalancerState;
use crate::error::{Result, ValidationError};
use crate::validation::{
    child, index, require_non_empty, require_pattern, require_range,
    LOAD_BALANCER_NAME_PATTERN, LOAD_BALANCER_NAME_REGEX,
};

const MAX_NAME_LENGTH: usize = 63;

/// Desired state of a VPC load balancer
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerSpec {
    /// Name of the VPC load balancer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(max = 63), regex(pattern = r"^([a-z]|[a-z][-a-z0-9]*[a-z0-9])$"))]
    pub name: Option<String>,

    /// Whether the load balancer is public or private
    #[serde(default = "default_public")]
    pub public: bool,

    /// Additional listeners for the control plane load balancer, keyed by port
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_listeners: Vec<AdditionalListenerSpec>,
}

fn default_public() -> bool {
    true
}

impl Default for VPCLoadBalancerSpec {
    fn default() -> Self {
        Self {
            name: None,
            public: default_public(),
            additional_listeners: Vec::new(),
        }
    }
}

/// An additional listener on a VPC load balancer
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AdditionalListenerSpec {
    /// Port of the listener. Absent decodes as 0 and fails validation.
    #[serde(default)]
    #[schemars(range(min = 1, max = 65535))]
    pub port: i64,
}

impl AdditionalListenerSpec {
    pub fn new(port: u16) -> Self {
        Self { port: port.into() }
    }
}

impl VPCLoadBalancerSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn with_listener(mut self, port: u16) -> Self {
        self.additional_listeners.push(AdditionalListenerSpec::new(port));
        self
    }

    /// Group the additional listeners by port, rejecting duplicates
    pub fn listener_set(&self) -> Result<ListenerSet> {
        ListenerSet::build_at("additionalListeners", &self.additional_listeners)
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        if let Some(name) = &self.name {
            let name_field = child(field, "name");
            require_non_empty(&name_field, name)?;
            require_pattern(
                &name_field,
                name,
                &LOAD_BALANCER_NAME_PATTERN,
                LOAD_BALANCER_NAME_REGEX,
                MAX_NAME_LENGTH,
            )?;
        }
        ListenerSet::build_at(&child(field, "additionalListeners"), &self.additional_listeners)?;
        Ok(())
    }
}

/// Additional listeners of one load balancer, keyed by port
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerSet {
    listeners: BTreeMap<u16, AdditionalListenerSpec>,
}

impl ListenerSet {
    /// Build the set from declared listeners.
    ///
    /// Fails on the first port outside 1-65535 or the first port declared
    /// twice. The cloud API may accept or silently drop duplicates, so this
    /// must run before anything is submitted.
    pub fn build(listeners: &[AdditionalListenerSpec]) -> Result<Self> {
        Self::build_at("additionalListeners", listeners)
    }

    fn build_at(field: &str, listeners: &[AdditionalListenerSpec]) -> Result<Self> {
        let mut set = BTreeMap::new();
        for (i, listener) in listeners.iter().enumerate() {
            let port_field = child(&index(field, i), "port");
            let port = require_range(&port_field, listener.port, 1, u16::MAX.into())?;
            let port = u16::try_from(port).map_err(|_| ValidationError::OutOfRange {
                field: port_field.clone(),
                value: port,
                min: 1,
                max: u16::MAX.into(),
            })?;
            if set.insert(port, *listener).is_some() {
                return Err(ValidationError::DuplicatePort {
                    field: port_field,
                    port: listener.port,
                });
            }
        }
        Ok(Self { listeners: set })
    }

    /// Ports in ascending order
    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.listeners.keys().copied()
    }

    pub fn get(&self, port: u16) -> Option<&AdditionalListenerSpec> {
        self.listeners.get(&port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.listeners.contains_key(&port)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Observed state of a VPC load balancer, written only by the reconciler
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerStatus {
    /// ID of the load balancer, set once it is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<VPCLoadBalancerState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Whether the controller created the load balancer, as opposed to
    /// adopting an existing one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_created: Option<bool>,
}

impl VPCLoadBalancerStatus {
    pub fn is_controller_created(&self) -> bool {
        self.controller_created.unwrap_or(false)
    }

    pub fn is_ready(&self) -> bool {
        self.state.as_ref().is_some_and(VPCLoadBalancerState::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod listener_set {
        use super::*;

        #[test]
        fn distinct_ports_build() {
            let spec = VPCLoadBalancerSpec::named("capi-lb")
                .with_listener(443)
                .with_listener(80);
            let set = spec.listener_set().unwrap();
            assert_eq!(set.len(), 2);
            assert_eq!(set.ports().collect::<Vec<_>>(), vec![80, 443]);
            assert!(set.contains(443));
            assert_eq!(set.get(80), Some(&AdditionalListenerSpec::new(80)));
        }

        #[test]
        fn duplicate_port_is_named() {
            let listeners = [AdditionalListenerSpec::new(80), AdditionalListenerSpec::new(80)];
            assert_eq!(
                ListenerSet::build(&listeners),
                Err(ValidationError::DuplicatePort {
                    field: "additionalListeners[1].port".to_string(),
                    port: 80,
                })
            );
        }

        #[test]
        fn out_of_range_port_is_rejected() {
            let listeners = [AdditionalListenerSpec { port: 0 }];
            assert!(matches!(
                ListenerSet::build(&listeners),
                Err(ValidationError::OutOfRange { value: 0, .. })
            ));

            let listeners = [AdditionalListenerSpec { port: 65536 }];
            assert!(matches!(
                ListenerSet::build(&listeners),
                Err(ValidationError::OutOfRange { value: 65536, .. })
            ));
        }

        #[test]
        fn empty_listener_list_builds_empty_set() {
            let set = ListenerSet::build(&[]).unwrap();
            assert!(set.is_empty());
        }
    }

    mod spec {
        use super::*;

        #[test]
        fn name_pattern() {
            assert!(VPCLoadBalancerSpec::named("my-lb1").validate_at("lb").is_ok());

            let err = VPCLoadBalancerSpec::named("My_LB")
                .validate_at("lb")
                .unwrap_err();
            assert_eq!(err.field(), "lb.name");
            assert!(matches!(err, ValidationError::InvalidFormat { .. }));

            assert!(VPCLoadBalancerSpec::named("a".repeat(64))
                .validate_at("lb")
                .is_err());
            assert!(VPCLoadBalancerSpec::named("").validate_at("lb").is_err());
        }

        #[test]
        fn public_defaults_to_true() {
            let spec: VPCLoadBalancerSpec = serde_json::from_str("{}").unwrap();
            assert!(spec.public);
            assert_eq!(spec, VPCLoadBalancerSpec::default());
        }

        #[test]
        fn private_survives_roundtrip() {
            let spec = VPCLoadBalancerSpec::named("capi-lb").private();
            let json = serde_json::to_string(&spec).unwrap();
            assert_eq!(json, r#"{"name":"capi-lb","public":false}"#);
            let parsed: VPCLoadBalancerSpec = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, spec);
        }

        #[test]
        fn duplicate_listener_reported_with_path() {
            let spec = VPCLoadBalancerSpec::named("capi-lb")
                .with_listener(6443)
                .with_listener(6443);
            assert_eq!(
                spec.validate_at("spec.controlPlaneLoadBalancer[0]"),
                Err(ValidationError::DuplicatePort {
                    field: "spec.controlPlaneLoadBalancer[0].additionalListeners[1].port"
                        .to_string(),
                    port: 6443,
                })
            );
        }
    }

    mod status {
        use super::*;

        #[test]
        fn controller_created_defaults_to_false() {
            let status: VPCLoadBalancerStatus =
                serde_json::from_str(r#"{"id":"r006-lb","state":"active"}"#).unwrap();
            assert!(!status.is_controller_created());
            assert!(status.is_ready());
        }

        #[test]
        fn pending_load_balancer_is_not_ready() {
            let status = VPCLoadBalancerStatus {
                state: Some(VPCLoadBalancerState::CreatePending),
                controller_created: Some(true),
                ..Default::default()
            };
            assert!(!status.is_ready());
            assert!(status.is_controller_created());
        }
    }
}
