use thiserror::Error;

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// A declared value that violates a constraint of the schema.
///
/// Every variant names the offending field path (for example
/// `spec.networkSpec.securityGroups[0].Rules[1].Source.remotes[0]`) so an
/// author can correct the manifest without guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: exactly one of id or name must be set, both were set")]
    AmbiguousSelector { field: String },

    #[error("{field}: exactly one of id or name must be set, neither was set")]
    MissingSelector { field: String },

    #[error("{field}: must not be empty")]
    Empty { field: String },

    #[error("{field}: unsupported value {value:?}, expected one of: {expected}")]
    UnsupportedValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("{field}: {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field}: minimumPort {minimum} is greater than maximumPort {maximum}")]
    InvertedPortRange {
        field: String,
        minimum: i64,
        maximum: i64,
    },

    #[error("{field}: port range is not allowed when protocol is {protocol}")]
    PortRangeNotAllowed { field: String, protocol: String },

    #[error("{field}: icmp type and code are only allowed when protocol is icmp, got {protocol}")]
    IcmpFieldsWithoutIcmp { field: String, protocol: String },

    #[error("{field}: icmp code requires an icmp type")]
    IcmpCodeWithoutType { field: String },

    #[error("{field}: at least one remote is required")]
    EmptyRemotes { field: String },

    #[error("{field}: remote type {remote_type} requires {required}")]
    MissingRemoteField {
        field: String,
        remote_type: String,
        required: &'static str,
    },

    #[error("{field}: remote type {remote_type} does not allow {forbidden}")]
    UnexpectedRemoteField {
        field: String,
        remote_type: String,
        forbidden: &'static str,
    },

    #[error("{field}: {direction} rule requires a {required} remote spec")]
    MissingRemoteSpec {
        field: String,
        direction: String,
        required: &'static str,
    },

    #[error("{field}: duplicate listener port {port}")]
    DuplicatePort { field: String, port: i64 },

    #[error("{field}: duplicate entry {value:?}")]
    DuplicateEntry { field: String, value: String },

    #[error("{field}: {message}")]
    InvalidFormat { field: String, message: String },
}

impl ValidationError {
    /// Path of the field that failed validation
    pub fn field(&self) -> &str {
        match self {
            Self::AmbiguousSelector { field }
            | Self::MissingSelector { field }
            | Self::Empty { field }
            | Self::UnsupportedValue { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvertedPortRange { field, .. }
            | Self::PortRangeNotAllowed { field, .. }
            | Self::IcmpFieldsWithoutIcmp { field, .. }
            | Self::IcmpCodeWithoutType { field }
            | Self::EmptyRemotes { field }
            | Self::MissingRemoteField { field, .. }
            | Self::UnexpectedRemoteField { field, .. }
            | Self::MissingRemoteSpec { field, .. }
            | Self::DuplicatePort { field, .. }
            | Self::DuplicateEntry { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

/// Failure to read a persisted IBMVPCCluster document of any served version
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("document has no apiVersion")]
    MissingApiVersion,

    #[error("unsupported kind {0:?}, expected IBMVPCCluster")]
    UnsupportedKind(String),

    #[error("unsupported apiVersion {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed {version} document: {source}")]
    Malformed {
        version: String,
        #[source]
        source: serde_json::Error,
    },
}
