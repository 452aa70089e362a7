//! IBM Cloud service instances the cluster binds to: CIS, DNS Services and COS

use chrono::TimeDelta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reference::VPCResourceReference;
use crate::error::{Result, ValidationError};
use crate::validation::{
    child, optional_non_empty, require_non_empty, require_pattern, COS_INSTANCE_NAME_PATTERN,
    COS_INSTANCE_NAME_REGEX,
};

/// IBM Cloud Internet Services instance used to create DNS records for the cluster
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CISInstance {
    #[serde(default)]
    pub domain: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CISInstance {
    pub fn reference(&self) -> VPCResourceReference {
        VPCResourceReference {
            id: self.id.clone(),
            name: self.name.clone(),
            region: None,
        }
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_non_empty(&child(field, "domain"), &self.domain)?;
        self.reference().validate_at(field)
    }
}

/// IBM Cloud DNS Services instance used to create DNS records for the cluster
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DNSServicesInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub zone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_label: Option<String>,
}

impl DNSServicesInstance {
    pub fn reference(&self) -> VPCResourceReference {
        VPCResourceReference {
            id: self.id.clone(),
            name: self.name.clone(),
            region: None,
        }
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        require_non_empty(&child(field, "zone"), &self.zone)?;
        optional_non_empty(&child(field, "zoneLabel"), self.zone_label.as_deref())?;
        self.reference().validate_at(field)
    }
}

/// IBM Cloud Object Storage instance holding bootstrap data
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CosInstance {
    /// How long presigned URLs for bootstrap objects stay valid, in Go
    /// duration notation ("1h30m"). When set, instance profiles are not used.
    #[serde(rename = "presignedURLDuration", default, skip_serializing_if = "Option::is_none")]
    pub presigned_url_duration: Option<String>,

    /// Name of the COS instance to be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 3, max = 63), regex(pattern = r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_region: Option<String>,
}

impl CosInstance {
    /// Parsed presigned URL lifetime
    pub fn presigned_url_duration(&self) -> Result<Option<TimeDelta>> {
        self.presigned_url_duration_at("presignedURLDuration")
    }

    fn presigned_url_duration_at(&self, field: &str) -> Result<Option<TimeDelta>> {
        let Some(raw) = self.presigned_url_duration.as_deref() else {
            return Ok(None);
        };
        parse_duration(raw)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: field.to_string(),
                message: format!("{raw:?} is not a duration such as \"1h30m\" or \"1.5s\""),
            })
    }

    pub fn validate_at(&self, field: &str) -> Result<()> {
        if let Some(name) = &self.name {
            require_pattern(
                &child(field, "name"),
                name,
                &COS_INSTANCE_NAME_PATTERN,
                COS_INSTANCE_NAME_REGEX,
                63,
            )?;
        }
        optional_non_empty(&child(field, "bucketName"), self.bucket_name.as_deref())?;
        optional_non_empty(&child(field, "bucketRegion"), self.bucket_region.as_deref())?;
        self.presigned_url_duration_at(&child(field, "presignedURLDuration"))?;
        Ok(())
    }
}

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Parses Go duration notation: an optional sign, then decimal amounts each
/// followed by a unit of ns, us (or µs), ms, s, m or h ("1h30m", "1m30.5s",
/// "-250ms"). A bare "0" is zero. Results beyond the range of a signed 64-bit
/// nanosecond count are rejected.
fn parse_duration(raw: &str) -> Option<TimeDelta> {
    let (negative, mut rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if rest == "0" {
        return Some(TimeDelta::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let whole_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let whole = &rest[..whole_len];
        rest = &rest[whole_len..];

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            fraction = &after_dot[..len];
            rest = &after_dot[len..];
        }
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "ns" => 1,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SECOND,
            "m" => 60 * NANOS_PER_SECOND,
            "h" => 3_600 * NANOS_PER_SECOND,
            _ => return None,
        };
        rest = &rest[unit_len..];

        if !whole.is_empty() {
            let whole: u128 = whole.parse().ok()?;
            total = total.checked_add(whole.checked_mul(unit)?)?;
        }
        // Digits past the 18th are below nanosecond precision even for hours
        let fraction = &fraction[..fraction.len().min(18)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().ok()?;
            let scale = 10u128.pow(fraction.len() as u32);
            total = total.checked_add(digits * unit / scale)?;
        }
    }

    let nanos = i64::try_from(total).ok()?;
    Some(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_parsing() {
        assert_eq!(parse_duration("1h30m"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("45s"), Some(TimeDelta::seconds(45)));
        assert_eq!(parse_duration("250ms"), Some(TimeDelta::milliseconds(250)));
        assert_eq!(parse_duration("0"), Some(TimeDelta::zero()));
        assert_eq!(parse_duration("1h0m0s"), Some(TimeDelta::hours(1)));
        assert_eq!(parse_duration("1.5h"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("1m30.5s"), Some(TimeDelta::milliseconds(90_500)));
        assert_eq!(parse_duration(".5s"), Some(TimeDelta::milliseconds(500)));
        assert_eq!(parse_duration("1.s"), Some(TimeDelta::seconds(1)));
        assert_eq!(parse_duration("1us"), Some(TimeDelta::microseconds(1)));
        assert_eq!(parse_duration("2\u{b5}s"), Some(TimeDelta::microseconds(2)));
        assert_eq!(parse_duration("3\u{3bc}s"), Some(TimeDelta::microseconds(3)));
        assert_eq!(parse_duration("10ns"), Some(TimeDelta::nanoseconds(10)));
        assert_eq!(parse_duration("-1m"), Some(TimeDelta::minutes(-1)));
        assert_eq!(parse_duration("+2h"), Some(TimeDelta::hours(2)));
        assert_eq!(
            parse_duration("2562047h47m16.854775807s"),
            Some(TimeDelta::nanoseconds(i64::MAX))
        );

        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration(".s"), None);
        assert_eq!(parse_duration("1."), None);
        assert_eq!(parse_duration("10d"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration(" 1s"), None);
        assert_eq!(parse_duration("2562048h"), None);
    }

    #[test]
    fn cos_instance_validation() {
        let cos = CosInstance {
            name: Some("capi-bootstrap".to_string()),
            presigned_url_duration: Some("2h".to_string()),
            bucket_name: Some("capi-bootstrap-data".to_string()),
            bucket_region: Some("us-south".to_string()),
        };
        assert_eq!(cos.validate_at("cos"), Ok(()));
        assert_eq!(cos.presigned_url_duration(), Ok(Some(TimeDelta::hours(2))));

        let bad_name = CosInstance {
            name: Some("CAPI".to_string()),
            ..cos.clone()
        };
        assert_eq!(bad_name.validate_at("cos").unwrap_err().field(), "cos.name");

        let bad_duration = CosInstance {
            presigned_url_duration: Some("forever".to_string()),
            ..cos
        };
        assert_eq!(
            bad_duration.validate_at("cos").unwrap_err().field(),
            "cos.presignedURLDuration"
        );
    }

    #[test]
    fn cis_instance_needs_domain() {
        let cis = CISInstance {
            name: Some("capi-cis".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cis.validate_at("cis"),
            Err(ValidationError::Empty {
                field: "cis.domain".to_string(),
            })
        );
    }

    #[test]
    fn dns_instance_reference() {
        let dns: DNSServicesInstance =
            serde_json::from_str(r#"{"id":"a1b2","zone":"capi.example.com"}"#).unwrap();
        assert_eq!(dns.reference(), VPCResourceReference::by_id("a1b2"));
        assert_eq!(dns.validate_at("dns"), Ok(()));
        assert!(dns.reference().lookup().is_ok());
    }
}
