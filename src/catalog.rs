//! Attribute data types and their structural parameters.
//!
//! The catalog is a pure lookup layer: which parameters a type carries,
//! what the defaults are, and how a typed attribute reads as a human
//! string. An unknown type cannot occur; the enumeration is closed.

use serde::{Deserialize, Serialize};

use crate::schema::Attribute;

/// Length assumed for a `string` attribute when none is set.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Precision assumed for a `numeric` attribute when none is set.
pub const DEFAULT_NUMERIC_PRECISION: u32 = 10;

/// Largest precision a `numeric` attribute may carry.
pub const MAX_NUMERIC_PRECISION: u32 = 38;

/// Scale assumed for a `numeric` attribute when none is set.
pub const DEFAULT_NUMERIC_SCALE: u32 = 0;

/// The closed set of attribute data types the editor offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    SmallInt,
    Integer,
    LargeInt,
    Float,
    Double,
    Numeric,
    String,
    Text,
    Uuid,
    Date,
    Time,
    DateTime,
    Timestamp,
    Json,
    Geometry,
    Geography,
}

impl AttributeType {
    /// Every supported type, in the order the editor lists them.
    pub const ALL: [AttributeType; 17] = [
        AttributeType::Boolean,
        AttributeType::SmallInt,
        AttributeType::Integer,
        AttributeType::LargeInt,
        AttributeType::Float,
        AttributeType::Double,
        AttributeType::Numeric,
        AttributeType::String,
        AttributeType::Text,
        AttributeType::Uuid,
        AttributeType::Date,
        AttributeType::Time,
        AttributeType::DateTime,
        AttributeType::Timestamp,
        AttributeType::Json,
        AttributeType::Geometry,
        AttributeType::Geography,
    ];

    /// The lowercase keyword the model and serialized form use.
    pub fn keyword(self) -> &'static str {
        match self {
            AttributeType::Boolean => "boolean",
            AttributeType::SmallInt => "smallint",
            AttributeType::Integer => "integer",
            AttributeType::LargeInt => "largeint",
            AttributeType::Float => "float",
            AttributeType::Double => "double",
            AttributeType::Numeric => "numeric",
            AttributeType::String => "string",
            AttributeType::Text => "text",
            AttributeType::Uuid => "uuid",
            AttributeType::Date => "date",
            AttributeType::Time => "time",
            AttributeType::DateTime => "datetime",
            AttributeType::Timestamp => "timestamp",
            AttributeType::Json => "json",
            AttributeType::Geometry => "geometry",
            AttributeType::Geography => "geography",
        }
    }

    /// Parse a keyword back into a type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let lower = keyword.to_lowercase();
        Self::ALL.into_iter().find(|ty| ty.keyword() == lower)
    }

    /// Types on which auto-increment is meaningful.
    pub fn is_numeric_family(self) -> bool {
        matches!(
            self,
            AttributeType::SmallInt
                | AttributeType::Integer
                | AttributeType::LargeInt
                | AttributeType::Float
                | AttributeType::Double
                | AttributeType::Numeric
        )
    }

    /// Types on which the "default to now" marker is meaningful.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            AttributeType::Date
                | AttributeType::Time
                | AttributeType::DateTime
                | AttributeType::Timestamp
        )
    }

    pub fn is_textual(self) -> bool {
        matches!(self, AttributeType::String | AttributeType::Text)
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Structural parameter an attribute type may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeParam {
    Length,
    Precision,
    Scale,
    IsCurrent,
}

/// Which structural fields apply to a given type. The editor uses this
/// to decide which inputs to show; generators use it to know which
/// stored values are meaningful.
pub fn parameters_for(ty: AttributeType) -> &'static [TypeParam] {
    match ty {
        AttributeType::String => &[TypeParam::Length],
        AttributeType::Numeric => &[TypeParam::Precision, TypeParam::Scale],
        AttributeType::Date
        | AttributeType::Time
        | AttributeType::DateTime
        | AttributeType::Timestamp => &[TypeParam::IsCurrent],
        _ => &[],
    }
}

/// Human-readable type string for an attribute, e.g. `numeric(10,2)` or
/// `string(255)`.
pub fn describe(attribute: &Attribute) -> String {
    match attribute.data_type {
        AttributeType::String => format!("string({})", attribute.effective_length()),
        AttributeType::Numeric => format!(
            "numeric({},{})",
            attribute.effective_precision(),
            attribute.effective_scale()
        ),
        other => other.keyword().to_string(),
    }
}
