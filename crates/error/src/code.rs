use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following FERRY-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Remote connectivity errors
/// - **2000-2999**: Generation, rewrite and schema mapping errors
/// - **3000-3999**: Configuration errors
/// - **5000-5999**: Internal errors
///
/// Codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Connectivity (1000-1999) ===
    /// FERRY-1001: Remote connection could not be established
    ConnectionFailed = 1001,
    /// FERRY-1002: Named connection could not be resolved
    ConnectionNotFound = 1002,
    /// FERRY-1003: Reading remote metadata failed
    MetadataReadFailed = 1003,
    /// FERRY-1004: Describe probe (prepare) failed
    DescribeFailed = 1004,

    // === Generation / rewrite (2000-2999) ===
    /// FERRY-2001: Function called with the wrong number of arguments
    FunctionArity = 2001,
    /// FERRY-2002: Dialect aliases a function that has a dedicated node
    NonSimpleFunctionAlias = 2002,
    /// FERRY-2003: Literal cannot be represented in SQL text
    InvalidLiteral = 2003,
    /// FERRY-2004: Structurally invalid node
    InvalidNode = 2004,
    /// FERRY-2005: Expression tree nested too deeply
    MaxRecursion = 2005,
    /// FERRY-2006: Result column type has no canonical counterpart
    UnsupportedResultType = 2006,
    /// FERRY-2007: Remote schema has more tables than allowed
    TableCountExceeded = 2007,
    /// FERRY-2008: Describe probe returned no columns
    EmptyResultShape = 2008,

    // === Configuration (3000-3999) ===
    /// FERRY-3001: Required property missing
    MissingProperty = 3001,
    /// FERRY-3002: Property value malformed
    InvalidPropertyValue = 3002,
    /// FERRY-3003: Property not supported by the dialect
    UnsupportedProperty = 3003,
    /// FERRY-3004: Legacy property value no longer accepted
    LegacyPropertyValue = 3004,
    /// FERRY-3005: Unknown capability in EXCLUDED_CAPABILITIES
    UnknownCapability = 3005,
    /// FERRY-3006: No dialect registered under the requested name
    UnknownDialect = 3006,
    /// FERRY-3007: Invalid YAML document
    InvalidYaml = 3007,

    // === Internal (5000-5999) ===
    /// FERRY-5002: Serialization/deserialization failed
    SerializationFailed = 5002,
    /// FERRY-5003: Unexpected internal state
    InternalPanic = 5003,

    /// FERRY-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "FERRY-2002")
    pub fn as_str(&self) -> String {
        format!("FERRY-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connectivity,
            2000..=2999 => ErrorCategory::Query,
            3000..=3999 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("FERRY-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::ConnectionFailed),
            1002 => Ok(Self::ConnectionNotFound),
            1003 => Ok(Self::MetadataReadFailed),
            1004 => Ok(Self::DescribeFailed),
            2001 => Ok(Self::FunctionArity),
            2002 => Ok(Self::NonSimpleFunctionAlias),
            2003 => Ok(Self::InvalidLiteral),
            2004 => Ok(Self::InvalidNode),
            2005 => Ok(Self::MaxRecursion),
            2006 => Ok(Self::UnsupportedResultType),
            2007 => Ok(Self::TableCountExceeded),
            2008 => Ok(Self::EmptyResultShape),
            3001 => Ok(Self::MissingProperty),
            3002 => Ok(Self::InvalidPropertyValue),
            3003 => Ok(Self::UnsupportedProperty),
            3004 => Ok(Self::LegacyPropertyValue),
            3005 => Ok(Self::UnknownCapability),
            3006 => Ok(Self::UnknownDialect),
            3007 => Ok(Self::InvalidYaml),
            5002 => Ok(Self::SerializationFailed),
            5003 => Ok(Self::InternalPanic),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category, used for CLI exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Connectivity,
    Query,
    Config,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_formatting() {
        assert_eq!(ErrorCode::ConnectionFailed.as_str(), "FERRY-1001");
        assert_eq!(ErrorCode::FunctionArity.as_str(), "FERRY-2001");
        assert_eq!(ErrorCode::Unknown.as_str(), "FERRY-9999");
    }

    #[test]
    fn test_error_code_parsing() {
        assert_eq!(
            ErrorCode::try_from("FERRY-3004".to_string()).unwrap(),
            ErrorCode::LegacyPropertyValue
        );
        assert_eq!(
            ErrorCode::try_from("FERRY-9999".to_string()).unwrap(),
            ErrorCode::Unknown
        );
    }

    #[test]
    fn test_error_code_parsing_errors() {
        assert!(ErrorCode::try_from("INVALID".to_string()).is_err());
        assert!(ErrorCode::try_from("FERRY-0000".to_string()).is_err());
        assert!(ErrorCode::try_from("FERRY-ABC".to_string()).is_err());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ErrorCode::DescribeFailed.category(),
            ErrorCategory::Connectivity
        );
        assert_eq!(ErrorCode::TableCountExceeded.category(), ErrorCategory::Query);
        assert_eq!(ErrorCode::UnknownCapability.category(), ErrorCategory::Config);
        assert_eq!(ErrorCode::InternalPanic.category(), ErrorCategory::Internal);
        assert_eq!(ErrorCode::Unknown.category(), ErrorCategory::Internal);
    }
}
