// used for calendar dates
use chrono::NaiveDate;
// used for ratios of arbitrary precision
use bigdecimal::BigDecimal;
// used to hand plans over as JSON
use serde::{Serialize, Serializer};

// used when parsing a string into a decimal
use std::str::FromStr;
// used to print out readable forms of a data type
use std::fmt;
// used to indicate that enum constants need to be hashable
use std::hash::Hash;
use std::ops;

/// A typed value a parser may produce from one token.
pub trait DataType: fmt::Debug + Clone + PartialEq + Send + Sync + Into<Value> {
    // static stuff which needs to be implemented downstream
    const DATA_TYPE: &'static str;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
}

// capabilities, checked by the field generators at compile time
/// Can be tested for equality.
pub trait Equable: DataType {}
/// Can be ordered, which allows ranges and comparisons.
pub trait Comparable: DataType {}
/// Can be matched fuzzily when the token is a bare word.
pub trait Matchable: DataType {}

/// A closed set of constants a field may take, e.g. the type of an illust.
pub trait FieldEnum: Copy + Eq + Hash + fmt::Debug + Serialize + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    fn name(self) -> &'static str;
    fn all() -> &'static [Self];
}

/// Declares an enum implementing [`FieldEnum`], each constant with its canonical name.
#[macro_export]
macro_rules! field_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident : $type_name:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $(#[serde(rename = $text)] $variant),+
        }
        impl $crate::datatype::FieldEnum for $name {
            const TYPE_NAME: &'static str = $type_name;
            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }
        }
    };
}

// ------------- Value -------------
/// Any typed value, as it ends up inside a filter of the plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Number(i64),
    Ratio(Decimal),
    /// a wildcard pattern over the digits of a number
    Pattern(String),
    Date(NaiveDate),
    Size(i64),
    Enum(EnumValue),
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) | Value::Pattern(s) => write!(f, "{}", s),
            Value::Number(n) | Value::Size(n) => write!(f, "{}", n),
            Value::Ratio(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::Enum(e) => write!(f, "{}", e.name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EnumValue {
    pub type_name: &'static str,
    pub name: &'static str,
}

#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug)]
pub struct Decimal (BigDecimal);

impl Decimal {
    pub fn from_str(s: &str) -> Option<Decimal> {
        match BigDecimal::from_str(s) {
            Ok(decimal) => Some(Decimal (decimal)),
            _ => None
        }
    }
    /// `None` when dividing by zero.
    pub fn checked_div(&self, divisor: &Decimal) -> Option<Decimal> {
        if divisor.0 == BigDecimal::from(0i64) {
            None
        }
        else {
            Some(Decimal (&self.0 / &divisor.0))
        }
    }
}
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}
impl ops::Deref for Decimal {
    type Target = BigDecimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ------------- Data Types --------------
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterStringValue(pub String);
impl DataType for FilterStringValue {
    const DATA_TYPE: &'static str = "String";
}
impl Equable for FilterStringValue {}
impl Matchable for FilterStringValue {}
impl From<FilterStringValue> for Value {
    fn from(v: FilterStringValue) -> Value {
        Value::String(v.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterNumberValue(pub i64);
impl DataType for FilterNumberValue {
    const DATA_TYPE: &'static str = "Number";
}
impl Equable for FilterNumberValue {}
impl Comparable for FilterNumberValue {}
impl From<FilterNumberValue> for Value {
    fn from(v: FilterNumberValue) -> Value {
        Value::Number(v.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterRatioValue(pub Decimal);
impl DataType for FilterRatioValue {
    const DATA_TYPE: &'static str = "Ratio";
}
impl Equable for FilterRatioValue {}
impl Comparable for FilterRatioValue {}
impl From<FilterRatioValue> for Value {
    fn from(v: FilterRatioValue) -> Value {
        Value::Ratio(v.0)
    }
}

/// Either a plain number or a pattern such as `1*2`, which can only be matched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterPatternNumberValue {
    Number(i64),
    Pattern(String),
}
impl FilterPatternNumberValue {
    pub fn is_pattern(&self) -> bool {
        matches!(self, FilterPatternNumberValue::Pattern(_))
    }
}
impl DataType for FilterPatternNumberValue {
    const DATA_TYPE: &'static str = "PatternNumber";
}
impl Equable for FilterPatternNumberValue {}
impl Comparable for FilterPatternNumberValue {}
impl Matchable for FilterPatternNumberValue {}
impl From<FilterPatternNumberValue> for Value {
    fn from(v: FilterPatternNumberValue) -> Value {
        match v {
            FilterPatternNumberValue::Number(n) => Value::Number(n),
            FilterPatternNumberValue::Pattern(p) => Value::Pattern(p),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterDateValue(pub NaiveDate);
impl DataType for FilterDateValue {
    const DATA_TYPE: &'static str = "Date";
}
impl Equable for FilterDateValue {}
impl Comparable for FilterDateValue {}
impl From<FilterDateValue> for Value {
    fn from(v: FilterDateValue) -> Value {
        Value::Date(v.0)
    }
}

/// Bytes for file sizes, milliseconds for durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterSizeValue(pub i64);
impl DataType for FilterSizeValue {
    const DATA_TYPE: &'static str = "Size";
}
impl Equable for FilterSizeValue {}
impl Comparable for FilterSizeValue {}
impl From<FilterSizeValue> for Value {
    fn from(v: FilterSizeValue) -> Value {
        Value::Size(v.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterEnumValue<E: FieldEnum>(pub E);
impl<E: FieldEnum> DataType for FilterEnumValue<E> {
    const DATA_TYPE: &'static str = "Enum";
}
impl<E: FieldEnum> Equable for FilterEnumValue<E> {}
impl<E: FieldEnum> From<FilterEnumValue<E>> for Value {
    fn from(v: FilterEnumValue<E>) -> Value {
        Value::Enum(EnumValue { type_name: E::TYPE_NAME, name: v.0.name() })
    }
}

/// Marker for fields that carry no value at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterNothingValue;
impl FilterNothingValue {
    pub const DATA_TYPE: &'static str = "Nothing";
}
