//! Closed string vocabularies that tolerate values from newer providers

/// A string-valued enumeration with a catch-all for unrecognised values
pub trait StringEnum {
    /// Every value this version of the API recognises, in declaration order
    const KNOWN: &'static [&'static str];

    /// The wire representation
    fn as_str(&self) -> &str;

    /// False for values kept verbatim because they were not recognised
    fn is_known(&self) -> bool;
}

/// Declares a string enumeration with an `Unknown(String)` fallback.
///
/// The generated type serializes as a plain string, decodes any string
/// without failing and keeps unrecognised values verbatim so they survive a
/// round trip. The zero value (an absent field) is `Unknown("")`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this version of the API does not recognise
            Unknown(String),
        }

        impl $crate::string_enum::StringEnum for $name {
            const KNOWN: &'static [&'static str] = &[$($value),+];

            fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl $name {
            /// The wire representation
            pub fn as_str(&self) -> &str {
                $crate::string_enum::StringEnum::as_str(self)
            }

            /// False for values kept verbatim because they were not recognised
            pub fn is_known(&self) -> bool {
                $crate::string_enum::StringEnum::is_known(self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Unknown(String::new())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $( $value => Self::$variant, )+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unknown(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl schemars::JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_string()
            }

            fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
                <String as schemars::JsonSchema>::json_schema(gen)
            }
        }
    };
}

pub(crate) use string_enum;
