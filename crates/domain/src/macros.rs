//! Macro for implementing Display and FromStr for status enums
//!
//! Keeps the string representation of workflow statuses in one place: Display
//! renders the canonical lowercase name and FromStr parses it back
//! case-insensitively.

/// Implements Display and FromStr traits for status enums
///
/// # Example
///
/// ```rust
/// use praxis_domain::impl_domain_status_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum ReviewStage {
///     Intake,
///     Assessment,
/// }
///
/// impl_domain_status_conversions!(ReviewStage {
///     Intake => "intake",
///     Assessment => "assessment",
/// });
/// ```
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
