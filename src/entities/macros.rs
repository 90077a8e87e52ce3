//! Macros for reducing boilerplate when defining entity fields

/// Declare a closed set of text values stored as a plain string
///
/// Generates the enum together with `as_str`, `ALL`, `Display`, `Default`,
/// `FromStr` and string-based serde impls. Parsing is exact and
/// case-sensitive; unknown values produce
/// [`ValidationError::InvalidEnum`](crate::core::error::ValidationError::InvalidEnum)
/// instead of being coerced.
///
/// # Example
///
/// ```rust,ignore
/// string_enum!(
///     /// Urgency of a request
///     Priority,
///     "priority",
///     default = Low,
///     [Low, High, Urgent]
/// );
///
/// assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
/// assert!("high".parse::<Priority>().is_err());
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $type:ident,
        $field:expr,
        default = $default:ident,
        [ $( $variant:ident ),+ $(,)? ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $type {
            $( $variant ),+
        }

        impl $type {
            /// Every accepted value, in declaration order
            pub const ALL: &'static [$type] = &[ $( $type::$variant ),+ ];

            /// Wire name of the field this value belongs to
            pub const FIELD: &'static str = $field;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $type::$variant => stringify!($variant) ),+
                }
            }

            /// Accepted values as owned strings (used in error details)
            pub fn allowed() -> Vec<String> {
                Self::ALL.iter().map(|v| v.as_str().to_string()).collect()
            }
        }

        impl Default for $type {
            fn default() -> Self {
                $type::$default
            }
        }

        impl ::std::fmt::Display for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = $crate::core::error::ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( stringify!($variant) => Ok($type::$variant), )+
                    other => Err($crate::core::error::ValidationError::InvalidEnum {
                        field: $field.to_string(),
                        value: other.to_string(),
                        allowed: Self::allowed(),
                    }),
                }
            }
        }

        impl ::serde::Serialize for $type {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $type {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}
