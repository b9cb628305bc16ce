//! Remote type descriptor → canonical type mapping.
//!
//! Mapping is total: codes without a rule become `DataType::Unsupported`,
//! which callers drop and log.

use crate::types::{
    Charset, DataType, JdbcType, RemoteTypeDescriptor, MAX_CHAR_SIZE, MAX_DECIMAL_PRECISION,
    MAX_VARCHAR_SIZE,
};
use once_cell::sync::Lazy;
use regex::Regex;

const TIME_AS_VARCHAR_SIZE: u32 = 100;
const DEFAULT_TIMESTAMP_PRECISION: u32 = 3;
const MAX_TIMESTAMP_PRECISION: u32 = 9;

/// First host version storing timestamps with nanosecond precision.
const NANOSECOND_TIMESTAMPS_SINCE: (u32, u32) = (7, 1);

static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)").unwrap());

pub trait TypeMapper: Send + Sync {
    fn map(&self, descriptor: &RemoteTypeDescriptor) -> DataType;
}

/// Inputs to the mapping that come from the request rather than the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingContext {
    /// Version string of the host database, e.g. "7.1.2".
    pub host_version: Option<String>,
}

impl MappingContext {
    pub fn with_host_version(version: impl Into<String>) -> Self {
        Self {
            host_version: Some(version.into()),
        }
    }

    pub fn supports_nanosecond_timestamps(&self) -> bool {
        parse_major_minor(self.host_version.as_deref()) >= NANOSECOND_TIMESTAMPS_SINCE
    }
}

/// `major.minor` prefix of a version string; anything unparsable is 0.0.
pub fn parse_major_minor(version: Option<&str>) -> (u32, u32) {
    version
        .and_then(|v| VERSION_RE.captures(v.trim()))
        .and_then(|caps| {
            let major = caps.get(1)?.as_str().parse().ok()?;
            let minor = caps.get(2)?.as_str().parse().ok()?;
            Some((major, minor))
        })
        .unwrap_or((0, 0))
}

/// The mapping every dialect starts from.
#[derive(Debug, Clone, Default)]
pub struct BaseTypeMapper {
    nanosecond_timestamps: bool,
}

impl BaseTypeMapper {
    pub fn new(context: &MappingContext) -> Self {
        Self {
            nanosecond_timestamps: context.supports_nanosecond_timestamps(),
        }
    }
}

impl TypeMapper for BaseTypeMapper {
    fn map(&self, d: &RemoteTypeDescriptor) -> DataType {
        let size = d.precision_or_size;
        let mapped = match d.type_code {
            JdbcType::TinyInt | JdbcType::SmallInt => DataType::decimal(or_default(size, 9), 0),
            JdbcType::Integer => bounded_decimal(or_default(size, 18), 0),
            JdbcType::BigInt => bounded_decimal(or_default(size, 36), 0),
            JdbcType::Decimal => bounded_decimal(size, d.scale.max(0) as u32),
            JdbcType::Real | JdbcType::Float | JdbcType::Double => DataType::Double,
            JdbcType::VarChar
            | JdbcType::NVarChar
            | JdbcType::LongVarChar
            | JdbcType::LongNVarChar => {
                let size = if size == 0 || size > MAX_VARCHAR_SIZE {
                    MAX_VARCHAR_SIZE
                } else {
                    size
                };
                DataType::varchar(size, charset_of(d))
            }
            JdbcType::Char | JdbcType::NChar => {
                if size <= MAX_CHAR_SIZE {
                    DataType::char(size, charset_of(d))
                } else if size <= MAX_VARCHAR_SIZE {
                    DataType::varchar(size, charset_of(d))
                } else {
                    DataType::fallback_varchar()
                }
            }
            JdbcType::Date => DataType::Date,
            JdbcType::Timestamp => {
                if self.nanosecond_timestamps {
                    DataType::timestamp((d.scale.max(0) as u32).min(MAX_TIMESTAMP_PRECISION))
                } else {
                    DataType::timestamp(DEFAULT_TIMESTAMP_PRECISION)
                }
            }
            JdbcType::Bit | JdbcType::Boolean => DataType::Boolean,
            JdbcType::Time | JdbcType::TimeWithTimezone | JdbcType::TimestampWithTimezone => {
                DataType::varchar(TIME_AS_VARCHAR_SIZE, Charset::Utf8)
            }
            JdbcType::Numeric => DataType::fallback_varchar(),
            JdbcType::Other(_) => DataType::Unsupported,
        };

        if !mapped.is_supported() {
            tracing::debug!(
                type_code = d.type_code.code(),
                type_name = %d.type_name,
                "Remote type has no canonical mapping"
            );
        }
        mapped
    }
}

fn or_default(size: u32, default: u32) -> u32 {
    if size == 0 {
        default
    } else {
        size
    }
}

fn bounded_decimal(precision: u32, scale: u32) -> DataType {
    if precision <= MAX_DECIMAL_PRECISION {
        DataType::decimal(precision, scale)
    } else {
        DataType::fallback_varchar()
    }
}

fn charset_of(d: &RemoteTypeDescriptor) -> Charset {
    if d.octet_length == d.precision_or_size {
        Charset::Ascii
    } else {
        Charset::Utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(d: RemoteTypeDescriptor) -> DataType {
        BaseTypeMapper::new(&MappingContext::with_host_version("7.1.0")).map(&d)
    }

    #[test]
    fn test_integer_thresholds() {
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Integer, 0, 0)), DataType::decimal(18, 0));
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Integer, 10, 0)), DataType::decimal(10, 0));
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Integer, 100_000, 0)),
            DataType::fallback_varchar()
        );
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::BigInt, 0, 0)), DataType::decimal(36, 0));
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::BigInt, 37, 0)),
            DataType::fallback_varchar()
        );
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::SmallInt, 0, 0)), DataType::decimal(9, 0));
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::TinyInt, 3, 0)), DataType::decimal(3, 0));
    }

    #[test]
    fn test_decimal_and_numeric() {
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Decimal, 36, 4)), DataType::decimal(36, 4));
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Decimal, 37, 4)),
            DataType::fallback_varchar()
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Numeric, 10, 2)),
            DataType::fallback_varchar()
        );
    }

    #[test]
    fn test_character_types() {
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::VarChar, 0, 0).with_octet_length(4)),
            DataType::varchar(MAX_VARCHAR_SIZE, Charset::Utf8)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::NVarChar, 50, 0).with_octet_length(200)),
            DataType::varchar(50, Charset::Utf8)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::VarChar, 50, 0).with_octet_length(50)),
            DataType::varchar(50, Charset::Ascii)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Char, 2000, 0).with_octet_length(2000)),
            DataType::char(2000, Charset::Ascii)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Char, 2001, 0)),
            DataType::varchar(2001, Charset::Utf8)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::NChar, 2_000_001, 0)),
            DataType::fallback_varchar()
        );
    }

    #[test]
    fn test_timestamp_precision_depends_on_host_version() {
        let ts = RemoteTypeDescriptor::new(JdbcType::Timestamp, 29, 12);
        assert_eq!(map(ts.clone()), DataType::timestamp(9));

        let old = BaseTypeMapper::new(&MappingContext::with_host_version("7.0.18"));
        assert_eq!(old.map(&ts), DataType::timestamp(3));

        let unknown = BaseTypeMapper::new(&MappingContext::default());
        assert_eq!(unknown.map(&ts), DataType::timestamp(3));
    }

    #[test]
    fn test_misc_types() {
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Bit, 1, 0)), DataType::Boolean);
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Real, 0, 0)), DataType::Double);
        assert_eq!(map(RemoteTypeDescriptor::new(JdbcType::Date, 0, 0)), DataType::Date);
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::TimestampWithTimezone, 0, 0)),
            DataType::varchar(100, Charset::Utf8)
        );
        assert_eq!(
            map(RemoteTypeDescriptor::new(JdbcType::Other(2003), 0, 0)),
            DataType::Unsupported
        );
    }

    #[test]
    fn test_parse_major_minor() {
        assert_eq!(parse_major_minor(Some("7.1.2")), (7, 1));
        assert_eq!(parse_major_minor(Some("8.0")), (8, 0));
        assert_eq!(parse_major_minor(Some("seven")), (0, 0));
        assert_eq!(parse_major_minor(Some("7")), (0, 0));
        assert_eq!(parse_major_minor(None), (0, 0));
    }
}
