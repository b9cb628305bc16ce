//! Canonical logical types and remote column type descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_DECIMAL_PRECISION: u32 = 36;
pub const MAX_CHAR_SIZE: u32 = 2000;
pub const MAX_VARCHAR_SIZE: u32 = 2_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Charset {
    #[serde(rename = "UTF8")]
    Utf8,
    #[serde(rename = "ASCII")]
    Ascii,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF8",
            Charset::Ascii => "ASCII",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    YearToMonth,
    DayToSecond,
}

/// The host's logical type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Decimal {
        precision: u32,
        scale: u32,
    },
    Double,
    VarChar {
        size: u32,
        charset: Charset,
    },
    Char {
        size: u32,
        charset: Charset,
    },
    Date,
    Timestamp {
        fractional_precision: u32,
    },
    Interval {
        kind: IntervalKind,
        precision: u32,
        fraction: u32,
    },
    Unsupported,
}

impl DataType {
    pub fn decimal(precision: u32, scale: u32) -> Self {
        DataType::Decimal { precision, scale }
    }

    pub fn varchar(size: u32, charset: Charset) -> Self {
        DataType::VarChar { size, charset }
    }

    pub fn char(size: u32, charset: Charset) -> Self {
        DataType::Char { size, charset }
    }

    pub fn timestamp(fractional_precision: u32) -> Self {
        DataType::Timestamp {
            fractional_precision,
        }
    }

    pub fn interval_year_to_month(precision: u32) -> Self {
        DataType::Interval {
            kind: IntervalKind::YearToMonth,
            precision,
            fraction: 0,
        }
    }

    pub fn interval_day_to_second(precision: u32, fraction: u32) -> Self {
        DataType::Interval {
            kind: IntervalKind::DayToSecond,
            precision,
            fraction,
        }
    }

    /// Widest text type; the landing spot for values that cannot be
    /// represented exactly.
    pub fn fallback_varchar() -> Self {
        DataType::varchar(MAX_VARCHAR_SIZE, Charset::Utf8)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DataType::Unsupported)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => f.write_str("BOOLEAN"),
            DataType::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            DataType::Double => f.write_str("DOUBLE"),
            DataType::VarChar { size, charset } => write!(f, "VARCHAR({}) {}", size, charset.as_str()),
            DataType::Char { size, charset } => write!(f, "CHAR({}) {}", size, charset.as_str()),
            DataType::Date => f.write_str("DATE"),
            DataType::Timestamp {
                fractional_precision,
            } => write!(f, "TIMESTAMP({})", fractional_precision),
            DataType::Interval {
                kind: IntervalKind::YearToMonth,
                precision,
                ..
            } => write!(f, "INTERVAL YEAR ({}) TO MONTH", precision),
            DataType::Interval {
                kind: IntervalKind::DayToSecond,
                precision,
                fraction,
            } => write!(f, "INTERVAL DAY ({}) TO SECOND ({})", precision, fraction),
            DataType::Unsupported => f.write_str("UNSUPPORTED"),
        }
    }
}

/// Remote type codes as reported by the remote driver (JDBC numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    LongNVarChar,
    Date,
    Time,
    Timestamp,
    TimeWithTimezone,
    TimestampWithTimezone,
    Boolean,
    /// Any code without a dedicated variant, including the vendor
    /// specific `OTHER` (1111).
    Other(i32),
}

impl JdbcType {
    pub const OTHER_CODE: i32 = 1111;

    pub fn from_code(code: i32) -> Self {
        match code {
            -7 => JdbcType::Bit,
            -6 => JdbcType::TinyInt,
            5 => JdbcType::SmallInt,
            4 => JdbcType::Integer,
            -5 => JdbcType::BigInt,
            6 => JdbcType::Float,
            7 => JdbcType::Real,
            8 => JdbcType::Double,
            2 => JdbcType::Numeric,
            3 => JdbcType::Decimal,
            1 => JdbcType::Char,
            12 => JdbcType::VarChar,
            -1 => JdbcType::LongVarChar,
            -15 => JdbcType::NChar,
            -9 => JdbcType::NVarChar,
            -16 => JdbcType::LongNVarChar,
            91 => JdbcType::Date,
            92 => JdbcType::Time,
            93 => JdbcType::Timestamp,
            2013 => JdbcType::TimeWithTimezone,
            2014 => JdbcType::TimestampWithTimezone,
            16 => JdbcType::Boolean,
            other => JdbcType::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            JdbcType::Bit => -7,
            JdbcType::TinyInt => -6,
            JdbcType::SmallInt => 5,
            JdbcType::Integer => 4,
            JdbcType::BigInt => -5,
            JdbcType::Float => 6,
            JdbcType::Real => 7,
            JdbcType::Double => 8,
            JdbcType::Numeric => 2,
            JdbcType::Decimal => 3,
            JdbcType::Char => 1,
            JdbcType::VarChar => 12,
            JdbcType::LongVarChar => -1,
            JdbcType::NChar => -15,
            JdbcType::NVarChar => -9,
            JdbcType::LongNVarChar => -16,
            JdbcType::Date => 91,
            JdbcType::Time => 92,
            JdbcType::Timestamp => 93,
            JdbcType::TimeWithTimezone => 2013,
            JdbcType::TimestampWithTimezone => 2014,
            JdbcType::Boolean => 16,
            JdbcType::Other(code) => *code,
        }
    }

    pub fn is_vendor_specific(&self) -> bool {
        matches!(self, JdbcType::Other(Self::OTHER_CODE))
    }
}

/// Type information of one remote column or result column. Input only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTypeDescriptor {
    pub type_code: JdbcType,
    pub scale: i32,
    pub precision_or_size: u32,
    pub octet_length: u32,
    pub type_name: String,
}

impl RemoteTypeDescriptor {
    pub fn new(type_code: JdbcType, precision_or_size: u32, scale: i32) -> Self {
        Self {
            type_code,
            scale,
            precision_or_size,
            octet_length: 0,
            type_name: String::new(),
        }
    }

    pub fn with_octet_length(mut self, octet_length: u32) -> Self {
        self.octet_length = octet_length;
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }
}
