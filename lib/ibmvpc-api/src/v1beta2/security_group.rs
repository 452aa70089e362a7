//! Security groups and their directional rules

use std::net::IpAddr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reference::VPCResourceReference;
use crate::error::{Result, ValidationError};
use crate::string_enum::string_enum;
use crate::validation::{
    child, index, optional_non_empty, require_known, require_non_empty, require_range,
    require_unique, unsupported,
};

const MIN_PORT: i64 = 1;
const MAX_PORT: i64 = 65535;
const MAX_ICMP_VALUE: i64 = 255;

string_enum! {
    /// Whether matching traffic is allowed or denied
    pub enum SecurityGroupRuleAction {
        Allow => "allow",
        Deny => "deny",
    }
}

string_enum! {
    /// Direction of the traffic a rule applies to
    pub enum SecurityGroupRuleDirection {
        Inbound => "inbound",
        Outbound => "outbound",
    }
}

string_enum! {
    /// Protocol matched by a rule
    pub enum SecurityGroupRuleProtocol {
        All => "all",
        Icmp => "icmp",
        Tcp => "tcp",
        Udp => "udp",
    }
}

string_enum! {
    /// Kind of remote a rule matches against
    pub enum SecurityGroupRuleRemoteType {
        Any => "any",
        Cidr => "cidr",
        Ip => "ip",
        Sg => "sg",
    }
}

/// Inclusive TCP/UDP port range. Zero means unset on the wire.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub maximum_port: i64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub minimum_port: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl PortRange {
    pub fn new(minimum_port: i64, maximum_port: i64) -> Self {
        Self {
            maximum_port,
            minimum_port,
        }
    }

    pub fn single(port: i64) -> Self {
        Self::new(port, port)
    }

    pub fn contains(&self, port: i64) -> bool {
        self.minimum_port <= port && port <= self.maximum_port
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        let minimum_field = child(field, "minimumPort");
        let maximum_field = child(field, "maximumPort");
        let minimum = require_range(&minimum_field, self.minimum_port, MIN_PORT, MAX_PORT)?;
        let maximum = require_range(&maximum_field, self.maximum_port, MIN_PORT, MAX_PORT)?;
        if minimum > maximum {
            return Err(ValidationError::InvertedPortRange {
                field: field.to_string(),
                minimum,
                maximum,
            });
        }
        Ok(())
    }
}

/// A source or destination selector as stored.
///
/// Which fields may be populated depends on `remoteType`; use
/// [`SecurityGroupRuleRemote::remote`] to get the checked form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRuleRemote {
    /// Name of the subnet whose CIDR is the remote (type cidr)
    #[serde(rename = "cidrsubnetname", default, skip_serializing_if = "Option::is_none")]
    pub cidr_subnet_name: Option<String>,

    /// IP address of the remote (type ip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub remote_type: SecurityGroupRuleRemoteType,

    /// Name of the security group that is the remote (type sg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_name: Option<String>,
}

/// A remote with exactly the fields its type needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Remote {
    Any,
    Cidr { subnet_name: String },
    Ip { address: IpAddr },
    SecurityGroup { name: String },
}

impl From<Remote> for SecurityGroupRuleRemote {
    fn from(remote: Remote) -> Self {
        match remote {
            Remote::Any => Self {
                remote_type: SecurityGroupRuleRemoteType::Any,
                ..Default::default()
            },
            Remote::Cidr { subnet_name } => Self {
                remote_type: SecurityGroupRuleRemoteType::Cidr,
                cidr_subnet_name: Some(subnet_name),
                ..Default::default()
            },
            Remote::Ip { address } => Self {
                remote_type: SecurityGroupRuleRemoteType::Ip,
                address: Some(address.to_string()),
                ..Default::default()
            },
            Remote::SecurityGroup { name } => Self {
                remote_type: SecurityGroupRuleRemoteType::Sg,
                security_group_name: Some(name),
                ..Default::default()
            },
        }
    }
}

fn populated(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SecurityGroupRuleRemote {
    /// The checked form of this remote
    pub fn remote(&self) -> Result<Remote> {
        self.remote_at("remote")
    }

    pub fn remote_at(&self, field: &str) -> Result<Remote> {
        let remote_type = self.remote_type.as_str();
        let cidr = populated(&self.cidr_subnet_name);
        let address = populated(&self.address);
        let security_group = populated(&self.security_group_name);

        let forbid = |present: Option<&str>, name: &'static str| match present {
            Some(_) => Err(ValidationError::UnexpectedRemoteField {
                field: child(field, name),
                remote_type: remote_type.to_string(),
                forbidden: name,
            }),
            None => Ok(()),
        };
        let require = |present: Option<&str>, name: &'static str| {
            present
                .map(str::to_string)
                .ok_or_else(|| ValidationError::MissingRemoteField {
                    field: child(field, name),
                    remote_type: remote_type.to_string(),
                    required: name,
                })
        };

        match &self.remote_type {
            SecurityGroupRuleRemoteType::Any => {
                forbid(cidr, "cidrsubnetname")?;
                forbid(address, "address")?;
                forbid(security_group, "securityGroupName")?;
                Ok(Remote::Any)
            }
            SecurityGroupRuleRemoteType::Cidr => {
                forbid(address, "address")?;
                forbid(security_group, "securityGroupName")?;
                let subnet_name = require(cidr, "cidrsubnetname")?;
                Ok(Remote::Cidr { subnet_name })
            }
            SecurityGroupRuleRemoteType::Ip => {
                forbid(cidr, "cidrsubnetname")?;
                forbid(security_group, "securityGroupName")?;
                let raw = require(address, "address")?;
                let address = raw
                    .parse::<IpAddr>()
                    .map_err(|e| ValidationError::InvalidFormat {
                        field: child(field, "address"),
                        message: format!("{raw:?} is not an IP address: {e}"),
                    })?;
                Ok(Remote::Ip { address })
            }
            SecurityGroupRuleRemoteType::Sg => {
                forbid(cidr, "cidrsubnetname")?;
                forbid(address, "address")?;
                let name = require(security_group, "securityGroupName")?;
                Ok(Remote::SecurityGroup { name })
            }
            SecurityGroupRuleRemoteType::Unknown(_) => {
                Err(unsupported(&child(field, "remoteType"), &self.remote_type))
            }
        }
    }
}

/// Protocol, port/ICMP constraints and remotes on one side of a rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRuleRemoteSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<String>,

    /// Absent means all ports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<PortRange>,

    #[serde(default)]
    pub protocol: SecurityGroupRuleProtocol,

    #[serde(default)]
    pub remotes: Vec<SecurityGroupRuleRemote>,
}

fn parse_icmp(field: &str, value: &Option<String>) -> Result<Option<u8>> {
    let Some(raw) = populated(value) else {
        return Ok(None);
    };
    let parsed = raw.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        message: format!("{raw:?} is not an integer"),
    })?;
    let value = require_range(field, parsed, 0, MAX_ICMP_VALUE)?;
    Ok(u8::try_from(value).ok())
}

impl SecurityGroupRuleRemoteSpec {
    pub fn new(protocol: SecurityGroupRuleProtocol, remotes: Vec<Remote>) -> Self {
        Self {
            protocol,
            remotes: remotes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_port_range(mut self, range: PortRange) -> Self {
        self.port_range = Some(range);
        self
    }

    pub fn with_icmp(mut self, icmp_type: u8, icmp_code: Option<u8>) -> Self {
        self.icmp_type = Some(icmp_type.to_string());
        self.icmp_code = icmp_code.map(|code| code.to_string());
        self
    }

    /// Parsed ICMP type and code
    pub fn icmp(&self) -> Result<(Option<u8>, Option<u8>)> {
        Ok((
            parse_icmp("icmpType", &self.icmp_type)?,
            parse_icmp("icmpCode", &self.icmp_code)?,
        ))
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_known(&child(field, "protocol"), &self.protocol)?;

        let has_icmp = populated(&self.icmp_type).is_some() || populated(&self.icmp_code).is_some();
        match &self.protocol {
            SecurityGroupRuleProtocol::Icmp => {
                if self.port_range.is_some() {
                    return Err(ValidationError::PortRangeNotAllowed {
                        field: child(field, "portRange"),
                        protocol: self.protocol.to_string(),
                    });
                }
                let icmp_type = parse_icmp(&child(field, "icmpType"), &self.icmp_type)?;
                let icmp_code = parse_icmp(&child(field, "icmpCode"), &self.icmp_code)?;
                if icmp_code.is_some() && icmp_type.is_none() {
                    return Err(ValidationError::IcmpCodeWithoutType {
                        field: child(field, "icmpCode"),
                    });
                }
            }
            SecurityGroupRuleProtocol::Tcp | SecurityGroupRuleProtocol::Udp => {
                if has_icmp {
                    return Err(ValidationError::IcmpFieldsWithoutIcmp {
                        field: field.to_string(),
                        protocol: self.protocol.to_string(),
                    });
                }
                if let Some(range) = &self.port_range {
                    range.validate_at(&child(field, "portRange"))?;
                }
            }
            SecurityGroupRuleProtocol::All | SecurityGroupRuleProtocol::Unknown(_) => {
                if has_icmp {
                    return Err(ValidationError::IcmpFieldsWithoutIcmp {
                        field: field.to_string(),
                        protocol: self.protocol.to_string(),
                    });
                }
                if self.port_range.is_some() {
                    return Err(ValidationError::PortRangeNotAllowed {
                        field: child(field, "portRange"),
                        protocol: self.protocol.to_string(),
                    });
                }
            }
        }

        let remotes_field = child(field, "remotes");
        if self.remotes.is_empty() {
            return Err(ValidationError::EmptyRemotes {
                field: remotes_field,
            });
        }
        for (i, remote) in self.remotes.iter().enumerate() {
            remote.remote_at(&index(&remotes_field, i))?;
        }
        Ok(())
    }
}

/// One allow/deny rule of a security group.
///
/// Inbound rules constrain the `Source`, outbound rules the `Destination`.
/// The other side may be present and is validated when it is.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SecurityGroupRule {
    #[serde(rename = "Action", default)]
    pub action: SecurityGroupRuleAction,

    #[serde(rename = "Destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<SecurityGroupRuleRemoteSpec>,

    #[serde(rename = "Direction", default)]
    pub direction: SecurityGroupRuleDirection,

    /// ID of the owning security group, set once it exists in the cloud
    #[serde(rename = "SecurityGroupID", default, skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,

    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SecurityGroupRuleRemoteSpec>,
}

impl SecurityGroupRule {
    pub fn inbound(action: SecurityGroupRuleAction, source: SecurityGroupRuleRemoteSpec) -> Self {
        Self {
            action,
            direction: SecurityGroupRuleDirection::Inbound,
            source: Some(source),
            ..Default::default()
        }
    }

    pub fn outbound(
        action: SecurityGroupRuleAction,
        destination: SecurityGroupRuleRemoteSpec,
    ) -> Self {
        Self {
            action,
            direction: SecurityGroupRuleDirection::Outbound,
            destination: Some(destination),
            ..Default::default()
        }
    }

    /// The remote spec the rule's direction constrains
    pub fn effective_remote(&self) -> Option<&SecurityGroupRuleRemoteSpec> {
        match self.direction {
            SecurityGroupRuleDirection::Inbound => self.source.as_ref(),
            SecurityGroupRuleDirection::Outbound => self.destination.as_ref(),
            SecurityGroupRuleDirection::Unknown(_) => None,
        }
    }

    /// Check the rule, returning the first violated constraint.
    ///
    /// Order: direction, action, presence of the constrained side, then
    /// each present remote spec (protocol, ICMP, ports, remotes).
    pub fn validate(&self) -> Result<()> {
        self.validate_at("rule")
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_known(&child(field, "Direction"), &self.direction)?;
        require_known(&child(field, "Action"), &self.action)?;

        let (required, side) = match self.direction {
            SecurityGroupRuleDirection::Inbound => ("Source", &self.source),
            _ => ("Destination", &self.destination),
        };
        if side.is_none() {
            return Err(ValidationError::MissingRemoteSpec {
                field: child(field, required),
                direction: self.direction.to_string(),
                required,
            });
        }

        if let Some(source) = &self.source {
            source.validate_at(&child(field, "Source"))?;
        }
        if let Some(destination) = &self.destination {
            destination.validate_at(&child(field, "Destination"))?;
        }
        Ok(())
    }
}

/// A named policy object holding an ordered list of rules.
///
/// Identified by its name within a resource group; it has no id until
/// created. Rule order does not change evaluation but is kept for diffing
/// against the live object.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SecurityGroup {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "ResourceGroup", default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    #[serde(rename = "Rules", default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SecurityGroupRule>,

    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "VPC", default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VPCResourceReference>,
}

impl SecurityGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: SecurityGroupRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// `(resource group, name)`, the identity of the group before it has an id
    pub fn key<'a>(&'a self, default_resource_group: &'a str) -> (&'a str, &'a str) {
        let resource_group = self
            .resource_group
            .as_deref()
            .unwrap_or(default_resource_group);
        (resource_group, self.name.as_str())
    }

    pub fn inbound_rules(&self) -> impl Iterator<Item = &SecurityGroupRule> {
        self.rules
            .iter()
            .filter(|r| r.direction == SecurityGroupRuleDirection::Inbound)
    }

    pub fn outbound_rules(&self) -> impl Iterator<Item = &SecurityGroupRule> {
        self.rules
            .iter()
            .filter(|r| r.direction == SecurityGroupRuleDirection::Outbound)
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_non_empty(&child(field, "Name"), &self.name)?;
        optional_non_empty(&child(field, "ResourceGroup"), self.resource_group.as_deref())?;

        let tags_field = child(field, "Tags");
        for (i, tag) in self.tags.iter().enumerate() {
            require_non_empty(&index(&tags_field, i), tag)?;
        }
        require_unique(|i| index(&tags_field, i), self.tags.iter().map(String::as_str))?;

        if let Some(vpc) = &self.vpc {
            vpc.validate_at(&child(field, "VPC"))?;
        }

        let rules_field = child(field, "Rules");
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate_at(&index(&rules_field, i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp_from_anywhere() -> SecurityGroupRuleRemoteSpec {
        SecurityGroupRuleRemoteSpec::new(SecurityGroupRuleProtocol::Tcp, vec![Remote::Any])
    }

    mod rule_validation {
        use super::*;

        #[test]
        fn inbound_tcp_rule_is_valid() {
            let rule = SecurityGroupRule::inbound(
                SecurityGroupRuleAction::Allow,
                tcp_from_anywhere().with_port_range(PortRange::single(6443)),
            );
            assert_eq!(rule.validate(), Ok(()));
        }

        #[test]
        fn unknown_direction_is_reported_first() {
            let rule = SecurityGroupRule {
                direction: SecurityGroupRuleDirection::from("sideways"),
                action: SecurityGroupRuleAction::from("maybe"),
                ..Default::default()
            };
            let err = rule.validate().unwrap_err();
            assert_eq!(err.field(), "rule.Direction");
            assert!(matches!(err, ValidationError::UnsupportedValue { .. }));
        }

        #[test]
        fn unknown_action_is_rejected() {
            let mut rule =
                SecurityGroupRule::outbound(SecurityGroupRuleAction::Allow, tcp_from_anywhere());
            rule.action = SecurityGroupRuleAction::from("reject");
            assert_eq!(
                rule.validate(),
                Err(ValidationError::UnsupportedValue {
                    field: "rule.Action".to_string(),
                    value: "reject".to_string(),
                    expected: "allow, deny".to_string(),
                })
            );
        }

        #[test]
        fn unknown_protocol_is_rejected() {
            let spec = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::from("sctp"),
                vec![Remote::Any],
            );
            let rule = SecurityGroupRule::inbound(SecurityGroupRuleAction::Allow, spec);
            let err = rule.validate().unwrap_err();
            assert_eq!(err.field(), "rule.Source.protocol");
        }

        #[test]
        fn inbound_rule_needs_a_source() {
            let rule = SecurityGroupRule {
                direction: SecurityGroupRuleDirection::Inbound,
                action: SecurityGroupRuleAction::Allow,
                destination: Some(tcp_from_anywhere()),
                ..Default::default()
            };
            assert_eq!(
                rule.validate(),
                Err(ValidationError::MissingRemoteSpec {
                    field: "rule.Source".to_string(),
                    direction: "inbound".to_string(),
                    required: "Source",
                })
            );
        }

        #[test]
        fn icmp_rejects_any_port_range() {
            let spec = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::Icmp,
                vec![Remote::Any],
            )
            .with_port_range(PortRange::new(1, 65535));
            let rule = SecurityGroupRule::inbound(SecurityGroupRuleAction::Allow, spec);
            assert!(matches!(
                rule.validate(),
                Err(ValidationError::PortRangeNotAllowed { .. })
            ));
        }

        #[test]
        fn icmp_type_and_code_ranges() {
            let valid = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::Icmp,
                vec![Remote::Any],
            )
            .with_icmp(8, Some(0));
            assert_eq!(valid.validate_at("spec"), Ok(()));
            assert_eq!(valid.icmp(), Ok((Some(8), Some(0))));

            let mut too_big = valid.clone();
            too_big.icmp_type = Some("256".to_string());
            assert_eq!(
                too_big.validate_at("spec"),
                Err(ValidationError::OutOfRange {
                    field: "spec.icmpType".to_string(),
                    value: 256,
                    min: 0,
                    max: 255,
                })
            );

            let mut not_a_number = valid.clone();
            not_a_number.icmp_code = Some("echo".to_string());
            assert!(matches!(
                not_a_number.validate_at("spec"),
                Err(ValidationError::InvalidFormat { .. })
            ));

            let mut padded = valid.clone();
            padded.icmp_type = Some(" 8 ".to_string());
            assert_eq!(
                padded.validate_at("spec").unwrap_err().field(),
                "spec.icmpType"
            );
            assert!(matches!(
                padded.icmp(),
                Err(ValidationError::InvalidFormat { .. })
            ));
        }

        #[test]
        fn icmp_code_requires_type() {
            let mut spec = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::Icmp,
                vec![Remote::Any],
            );
            spec.icmp_code = Some("0".to_string());
            assert_eq!(
                spec.validate_at("spec"),
                Err(ValidationError::IcmpCodeWithoutType {
                    field: "spec.icmpCode".to_string(),
                })
            );
        }

        #[test]
        fn icmp_fields_need_icmp_protocol() {
            let spec = tcp_from_anywhere().with_icmp(8, None);
            assert!(matches!(
                spec.validate_at("spec"),
                Err(ValidationError::IcmpFieldsWithoutIcmp { .. })
            ));
        }

        #[test]
        fn tcp_port_range_bounds() {
            let inverted = tcp_from_anywhere().with_port_range(PortRange::new(443, 80));
            assert_eq!(
                inverted.validate_at("spec"),
                Err(ValidationError::InvertedPortRange {
                    field: "spec.portRange".to_string(),
                    minimum: 443,
                    maximum: 80,
                })
            );

            let zero = tcp_from_anywhere().with_port_range(PortRange::new(0, 80));
            assert_eq!(
                zero.validate_at("spec").unwrap_err().field(),
                "spec.portRange.minimumPort"
            );

            let too_high = tcp_from_anywhere().with_port_range(PortRange::new(1, 70000));
            assert_eq!(
                too_high.validate_at("spec").unwrap_err().field(),
                "spec.portRange.maximumPort"
            );
        }

        #[test]
        fn absent_port_range_means_all_ports() {
            let udp = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::Udp,
                vec![Remote::Any],
            );
            assert_eq!(udp.validate_at("spec"), Ok(()));
        }

        #[test]
        fn protocol_all_takes_no_ports() {
            let spec = SecurityGroupRuleRemoteSpec::new(
                SecurityGroupRuleProtocol::All,
                vec![Remote::Any],
            )
            .with_port_range(PortRange::single(22));
            assert!(matches!(
                spec.validate_at("spec"),
                Err(ValidationError::PortRangeNotAllowed { .. })
            ));
        }

        #[test]
        fn empty_remotes_are_rejected() {
            let spec = SecurityGroupRuleRemoteSpec::new(SecurityGroupRuleProtocol::Tcp, vec![]);
            assert_eq!(
                spec.validate_at("spec"),
                Err(ValidationError::EmptyRemotes {
                    field: "spec.remotes".to_string(),
                })
            );
        }

        #[test]
        fn validation_does_not_mutate() {
            let rule = SecurityGroupRule::inbound(
                SecurityGroupRuleAction::Deny,
                SecurityGroupRuleRemoteSpec::new(SecurityGroupRuleProtocol::Tcp, vec![]),
            );
            let before = rule.clone();
            let _ = rule.validate();
            assert_eq!(rule, before);
        }
    }

    mod remotes {
        use super::*;

        #[test]
        fn sg_remote_without_name_is_malformed() {
            let remote = SecurityGroupRuleRemote {
                remote_type: SecurityGroupRuleRemoteType::Sg,
                security_group_name: Some(String::new()),
                ..Default::default()
            };
            assert_eq!(
                remote.remote(),
                Err(ValidationError::MissingRemoteField {
                    field: "remote.securityGroupName".to_string(),
                    remote_type: "sg".to_string(),
                    required: "securityGroupName",
                })
            );

            let rule = SecurityGroupRule::inbound(
                SecurityGroupRuleAction::Allow,
                SecurityGroupRuleRemoteSpec {
                    protocol: SecurityGroupRuleProtocol::Tcp,
                    remotes: vec![remote],
                    ..Default::default()
                },
            );
            assert_eq!(
                rule.validate().unwrap_err().field(),
                "rule.Source.remotes[0].securityGroupName"
            );
        }

        #[test]
        fn sg_remote_rejects_cidr_subnet() {
            let remote = SecurityGroupRuleRemote {
                remote_type: SecurityGroupRuleRemoteType::Sg,
                security_group_name: Some("capi-control-plane".to_string()),
                cidr_subnet_name: Some("capi-subnet".to_string()),
                ..Default::default()
            };
            assert!(matches!(
                remote.remote(),
                Err(ValidationError::UnexpectedRemoteField {
                    forbidden: "cidrsubnetname",
                    ..
                })
            ));
        }

        #[test]
        fn typed_remotes() {
            let cidr = SecurityGroupRuleRemote::from(Remote::Cidr {
                subnet_name: "capi-cp-subnet".to_string(),
            });
            assert_eq!(
                cidr.remote(),
                Ok(Remote::Cidr {
                    subnet_name: "capi-cp-subnet".to_string(),
                })
            );

            let ip = SecurityGroupRuleRemote {
                remote_type: SecurityGroupRuleRemoteType::Ip,
                address: Some("10.240.0.4".to_string()),
                ..Default::default()
            };
            assert_eq!(
                ip.remote(),
                Ok(Remote::Ip {
                    address: "10.240.0.4".parse().unwrap(),
                })
            );

            let any = SecurityGroupRuleRemote::from(Remote::Any);
            assert_eq!(any.remote(), Ok(Remote::Any));
        }

        #[test]
        fn ip_remote_needs_an_address() {
            let ip = SecurityGroupRuleRemote {
                remote_type: SecurityGroupRuleRemoteType::Ip,
                address: Some("10.240.0.0/24".to_string()),
                ..Default::default()
            };
            assert!(matches!(
                ip.remote(),
                Err(ValidationError::InvalidFormat { .. })
            ));
        }

        #[test]
        fn missing_remote_type_is_rejected() {
            let remote: SecurityGroupRuleRemote =
                serde_json::from_str(r#"{"securityGroupName":"capi-sg"}"#).unwrap();
            assert_eq!(
                remote.remote(),
                Err(ValidationError::UnsupportedValue {
                    field: "remote.remoteType".to_string(),
                    value: String::new(),
                    expected: "any, cidr, ip, sg".to_string(),
                })
            );
        }
    }

    mod security_group {
        use super::*;

        #[test]
        fn key_defaults_resource_group() {
            let mut sg = SecurityGroup::new("capi-cp-sg");
            assert_eq!(sg.key("capi-rg"), ("capi-rg", "capi-cp-sg"));
            sg.resource_group = Some("network-rg".to_string());
            assert_eq!(sg.key("capi-rg"), ("network-rg", "capi-cp-sg"));
        }

        #[test]
        fn rules_split_by_direction_in_order() {
            let sg = SecurityGroup::new("capi-cp-sg")
                .with_rule(SecurityGroupRule::inbound(
                    SecurityGroupRuleAction::Allow,
                    tcp_from_anywhere().with_port_range(PortRange::single(6443)),
                ))
                .with_rule(SecurityGroupRule::outbound(
                    SecurityGroupRuleAction::Allow,
                    SecurityGroupRuleRemoteSpec::new(
                        SecurityGroupRuleProtocol::All,
                        vec![Remote::Any],
                    ),
                ))
                .with_rule(SecurityGroupRule::inbound(
                    SecurityGroupRuleAction::Allow,
                    tcp_from_anywhere().with_port_range(PortRange::single(22)),
                ));

            assert_eq!(sg.validate_at("sg"), Ok(()));
            let ports: Vec<_> = sg
                .inbound_rules()
                .filter_map(|r| r.effective_remote()?.port_range)
                .map(|r| r.minimum_port)
                .collect();
            assert_eq!(ports, vec![6443, 22]);
            assert_eq!(sg.outbound_rules().count(), 1);
        }

        #[test]
        fn duplicate_tags_are_rejected() {
            let mut sg = SecurityGroup::new("capi-cp-sg");
            sg.tags = vec!["capi".to_string(), "capi".to_string()];
            assert_eq!(
                sg.validate_at("sg"),
                Err(ValidationError::DuplicateEntry {
                    field: "sg.Tags[1]".to_string(),
                    value: "capi".to_string(),
                })
            );
        }

        #[test]
        fn nested_rule_errors_carry_full_path() {
            let sg = SecurityGroup::new("capi-cp-sg").with_rule(SecurityGroupRule::outbound(
                SecurityGroupRuleAction::Allow,
                SecurityGroupRuleRemoteSpec::new(SecurityGroupRuleProtocol::Tcp, vec![]),
            ));
            assert_eq!(
                sg.validate_at("spec.networkSpec.securityGroups[0]")
                    .unwrap_err()
                    .field(),
                "spec.networkSpec.securityGroups[0].Rules[0].Destination.remotes"
            );
        }

        #[test]
        fn wire_names_follow_go_fields() {
            let sg = SecurityGroup::new("capi-cp-sg").with_rule(SecurityGroupRule::inbound(
                SecurityGroupRuleAction::Allow,
                tcp_from_anywhere(),
            ));
            let json = serde_json::to_value(&sg).unwrap();
            assert_eq!(json["Name"], "capi-cp-sg");
            assert_eq!(json["Rules"][0]["Direction"], "inbound");
            assert_eq!(json["Rules"][0]["Source"]["protocol"], "tcp");
            assert_eq!(json["Rules"][0]["Source"]["remotes"][0]["remoteType"], "any");
            assert!(json.get("Tags").is_none());
            assert!(json["Rules"][0].get("Destination").is_none());
        }
    }
}
