//! Macro for implementing Display and FromStr for vendor enums
//!
//! The vendor API spells its enumerations in a handful of styles
//! (`HOUR`, `1MIN`, `low`). This macro maps each variant to its wire string
//! once and derives both conversions from that table. Parsing ignores ASCII
//! case; formatting always emits the wire string verbatim.
//!
//! # Example
//!
//! ```rust
//! use emporia_domain::impl_vendor_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     One,
//!     Two,
//! }
//!
//! impl_vendor_enum_conversions!(Phase {
//!     One => "PHASE_1",
//!     Two => "PHASE_2",
//! });
//!
//! assert_eq!(Phase::One.to_string(), "PHASE_1");
//! assert_eq!("phase_2".parse::<Phase>().unwrap(), Phase::Two);
//! ```

/// Implements Display and FromStr traits for vendor enums
///
/// This macro generates:
/// - Display trait: writes the wire string of the variant
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_vendor_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation used by the vendor API
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
