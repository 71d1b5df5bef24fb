//! Parsers turning a single [`Str`] token into a typed value.
//!
//! Simple parsers implement [`StrTypeParser`] and always yield one value.
//! Complex parsers implement [`StrComplexParser`] and may widen a token into a
//! half-open range, e.g. the date `2020` covers the whole year.

// used for dates, which know the current year when it is omitted
use chrono::{Datelike, Local, Months, NaiveDate};
// so the regular expressions are only compiled once
use lazy_static::lazy_static;
use regex::Regex;

use std::collections::HashMap;

use crate::ast::Str;
use crate::datatype::{
    DataType, Decimal, FieldEnum, FilterDateValue, FilterEnumValue, FilterNumberValue, FilterPatternNumberValue,
    FilterRatioValue, FilterSizeValue, FilterStringValue,
};
use crate::error::{CastType, SemanticError};
use crate::OtherHasher;

lazy_static! {
    static ref QUANTITY: Regex = Regex::new(r"^([0-9]+)([a-zA-Z]+)$").unwrap();
    static ref PATTERN_NUMBER: Regex = Regex::new(r"^[0-9?*]+$").unwrap();
    static ref PATTERN_NUMBER_RANGE: Regex = Regex::new(r"^([0-9]+)(\?+)$").unwrap();
}

pub trait StrTypeParser: Send + Sync {
    type Value: DataType;
    fn parse(&self, s: &Str) -> Result<Self::Value, SemanticError>;
    /// Alias groups offered to autocompletion. Only enums have them.
    fn enums(&self) -> Option<Vec<Vec<String>>> {
        None
    }
}

/// A token resolved to either one value or a half-open `[begin, end)` range.
#[derive(Clone, Debug, PartialEq)]
pub enum Complex<V> {
    Value(V),
    Range(V, V),
}

pub trait StrComplexParser: Send + Sync {
    type Value: DataType;
    fn parse(&self, s: &Str) -> Result<Complex<Self::Value>, SemanticError>;
}

fn cast_error(s: &Str, cast: CastType) -> SemanticError {
    SemanticError::TypeCastError { value: s.value.clone(), cast, span: s.span }
}

// ------------- Simple parsers -------------
pub struct StringParser;
impl StrTypeParser for StringParser {
    type Value = FilterStringValue;
    fn parse(&self, s: &Str) -> Result<FilterStringValue, SemanticError> {
        Ok(FilterStringValue(s.value.clone()))
    }
}

pub struct NumberParser;
impl StrTypeParser for NumberParser {
    type Value = FilterNumberValue;
    fn parse(&self, s: &Str) -> Result<FilterNumberValue, SemanticError> {
        s.value.parse::<i64>()
            .map(FilterNumberValue)
            .map_err(|_| cast_error(s, CastType::Number))
    }
}

/// `1920x1080`, `1920X1080` or `1920*1080`, yielding the product.
pub struct TimesNumberParser;
impl StrTypeParser for TimesNumberParser {
    type Value = FilterNumberValue;
    fn parse(&self, s: &Str) -> Result<FilterNumberValue, SemanticError> {
        let number = match s.value.split_once(['x', 'X', '*']) {
            Some((a, b)) => {
                let a = a.trim().parse::<i64>().map_err(|_| cast_error(s, CastType::Number))?;
                let b = b.trim().parse::<i64>().map_err(|_| cast_error(s, CastType::Number))?;
                a.checked_mul(b).ok_or_else(|| cast_error(s, CastType::Number))?
            }
            None => s.value.parse::<i64>().map_err(|_| cast_error(s, CastType::Number))?,
        };
        Ok(FilterNumberValue(number))
    }
}

/// `16:9` or `16/9`, or a plain decimal.
pub struct RatioParser;
impl StrTypeParser for RatioParser {
    type Value = FilterRatioValue;
    fn parse(&self, s: &Str) -> Result<FilterRatioValue, SemanticError> {
        let ratio = match s.value.split_once([':', '/']) {
            Some((a, b)) => {
                let a = Decimal::from_str(a.trim()).ok_or_else(|| cast_error(s, CastType::Ratio))?;
                let b = Decimal::from_str(b.trim()).ok_or_else(|| cast_error(s, CastType::Ratio))?;
                a.checked_div(&b).ok_or_else(|| cast_error(s, CastType::Ratio))?
            }
            None => Decimal::from_str(s.value.trim()).ok_or_else(|| cast_error(s, CastType::Ratio))?,
        };
        Ok(FilterRatioValue(ratio))
    }
}

/// Multiplies the digits of `<digits><unit>` with the factor of the unit.
fn parse_quantity(s: &Str, cast: CastType, unit_factor: fn(&str) -> Option<i64>) -> Result<i64, SemanticError> {
    let captures = QUANTITY.captures(&s.value).ok_or_else(|| cast_error(s, cast))?;
    let digits = captures[1].parse::<i64>().map_err(|_| cast_error(s, cast))?;
    let factor = unit_factor(&captures[2].to_lowercase()).ok_or_else(|| cast_error(s, cast))?;
    digits.checked_mul(factor).ok_or_else(|| cast_error(s, cast))
}

/// File sizes in bytes, with decimal (`kb`) and binary (`kib`) units.
pub struct SizeParser;
impl SizeParser {
    fn unit(unit: &str) -> Option<i64> {
        match unit {
            "b" => Some(1),
            "k" | "kb" => Some(1_000),
            "m" | "mb" => Some(1_000_000),
            "g" | "gb" => Some(1_000_000_000),
            "t" | "tb" => Some(1_000_000_000_000),
            "kib" => Some(1 << 10),
            "mib" => Some(1 << 20),
            "gib" => Some(1 << 30),
            "tib" => Some(1 << 40),
            _ => None,
        }
    }
}
impl StrTypeParser for SizeParser {
    type Value = FilterSizeValue;
    fn parse(&self, s: &Str) -> Result<FilterSizeValue, SemanticError> {
        parse_quantity(s, CastType::Size, SizeParser::unit).map(FilterSizeValue)
    }
}

/// Durations in milliseconds.
pub struct DurationParser;
impl DurationParser {
    fn unit(unit: &str) -> Option<i64> {
        match unit {
            "s" | "sec" | "second" | "seconds" => Some(1_000),
            "m" | "min" | "minute" | "minutes" => Some(60_000),
            "h" | "hour" | "hours" => Some(3_600_000),
            _ => None,
        }
    }
}
impl StrTypeParser for DurationParser {
    type Value = FilterSizeValue;
    fn parse(&self, s: &Str) -> Result<FilterSizeValue, SemanticError> {
        parse_quantity(s, CastType::Duration, DurationParser::unit).map(FilterSizeValue)
    }
}

// ------------- Enums -------------
/// Case-insensitive alias table of one enum field, built once.
pub struct EnumParser<E: FieldEnum> {
    table: HashMap<String, E, OtherHasher>,
    groups: Vec<Vec<String>>,
}
impl<E: FieldEnum> EnumParser<E> {
    pub fn builder() -> EnumParserBuilder<E> {
        EnumParserBuilder { groups: Vec::new() }
    }
    /// Every constant known by its canonical name only.
    pub fn names() -> Self {
        E::all().iter().fold(Self::builder(), |b, e| b.item(*e, &[])).build()
    }
    pub fn expected(&self) -> Vec<String> {
        self.groups.iter().flatten().cloned().collect()
    }
}
impl<E: FieldEnum> StrTypeParser for EnumParser<E> {
    type Value = FilterEnumValue<E>;
    fn parse(&self, s: &Str) -> Result<FilterEnumValue<E>, SemanticError> {
        match self.table.get(&s.value.to_lowercase()) {
            Some(e) => Ok(FilterEnumValue(*e)),
            None => Err(SemanticError::EnumTypeCastError {
                value: s.value.clone(),
                type_name: E::TYPE_NAME,
                expected: self.expected(),
                span: s.span,
            }),
        }
    }
    fn enums(&self) -> Option<Vec<Vec<String>>> {
        Some(self.groups.clone())
    }
}

pub struct EnumParserBuilder<E: FieldEnum> {
    groups: Vec<(E, Vec<String>)>,
}
impl<E: FieldEnum> EnumParserBuilder<E> {
    /// The canonical name of the constant is always its first alias.
    pub fn item(mut self, value: E, aliases: &[&str]) -> Self {
        let mut group = vec![value.name().to_lowercase()];
        for alias in aliases {
            let alias = alias.to_lowercase();
            if !group.contains(&alias) {
                group.push(alias);
            }
        }
        self.groups.push((value, group));
        self
    }
    pub fn build(self) -> EnumParser<E> {
        let mut table = HashMap::default();
        let mut groups = Vec::with_capacity(self.groups.len());
        for (value, aliases) in self.groups {
            for alias in &aliases {
                if table.insert(alias.clone(), value).is_some() {
                    tracing::warn!(alias = %alias, type_name = E::TYPE_NAME, "enum alias declared twice");
                }
            }
            groups.push(aliases);
        }
        EnumParser { table, groups }
    }
}

// ------------- Complex parsers -------------
/// Dates where the magnitude of a part decides its meaning: `2020` is a year,
/// `2020-03` a month of it, `03-15` a day of the current year and `3` a month
/// of the current year.
pub struct DateParser;
impl DateParser {
    fn current_year() -> i32 {
        Local::now().year()
    }
    fn month_range(s: &Str, year: i32, month: i32) -> Result<Complex<FilterDateValue>, SemanticError> {
        let month = u32::try_from(month).map_err(|_| cast_error(s, CastType::Date))?;
        let begin = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| cast_error(s, CastType::Date))?;
        let end = begin.checked_add_months(Months::new(1)).ok_or_else(|| cast_error(s, CastType::Date))?;
        Ok(Complex::Range(FilterDateValue(begin), FilterDateValue(end)))
    }
    fn exact(s: &Str, year: i32, month: i32, day: i32) -> Result<Complex<FilterDateValue>, SemanticError> {
        let month = u32::try_from(month).map_err(|_| cast_error(s, CastType::Date))?;
        let day = u32::try_from(day).map_err(|_| cast_error(s, CastType::Date))?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| cast_error(s, CastType::Date))?;
        Ok(Complex::Value(FilterDateValue(date)))
    }
}
impl StrComplexParser for DateParser {
    type Value = FilterDateValue;
    fn parse(&self, s: &Str) -> Result<Complex<FilterDateValue>, SemanticError> {
        let parts = s.value
            .splitn(3, |c| matches!(c, '-' | '/' | '.'))
            .map(|part| part.parse::<i32>())
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|_| cast_error(s, CastType::Date))?;
        match parts.as_slice() {
            [year, month, day] => DateParser::exact(s, *year, *month, *day),
            [first, month] if *first >= 1000 => DateParser::month_range(s, *first, *month),
            [month, day] => DateParser::exact(s, DateParser::current_year(), *month, *day),
            [year] if *year >= 1000 => {
                let begin = NaiveDate::from_ymd_opt(*year, 1, 1).ok_or_else(|| cast_error(s, CastType::Date))?;
                let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(|| cast_error(s, CastType::Date))?;
                Ok(Complex::Range(FilterDateValue(begin), FilterDateValue(end)))
            }
            [month] => DateParser::month_range(s, DateParser::current_year(), *month),
            _ => Err(cast_error(s, CastType::Date)),
        }
    }
}

/// Numbers that may contain the wildcards `*` and `?`. Only trailing `?` form a
/// range (`12??` is `[1200, 1300)`), everything else stays an opaque pattern.
pub struct PatternNumberParser;
impl StrComplexParser for PatternNumberParser {
    type Value = FilterPatternNumberValue;
    fn parse(&self, s: &Str) -> Result<Complex<FilterPatternNumberValue>, SemanticError> {
        let value = &s.value;
        if PATTERN_NUMBER.is_match(value) && value.contains(['*', '?']) {
            if let Some(captures) = PATTERN_NUMBER_RANGE.captures(value) {
                let prefix = captures[1].parse::<i64>().map_err(|_| cast_error(s, CastType::Number))?;
                let scale = u32::try_from(captures[2].len()).ok()
                    .and_then(|k| 10i64.checked_pow(k))
                    .ok_or_else(|| cast_error(s, CastType::Number))?;
                let begin = prefix.checked_mul(scale).ok_or_else(|| cast_error(s, CastType::Number))?;
                let end = prefix.checked_add(1)
                    .and_then(|p| p.checked_mul(scale))
                    .ok_or_else(|| cast_error(s, CastType::Number))?;
                Ok(Complex::Range(FilterPatternNumberValue::Number(begin), FilterPatternNumberValue::Number(end)))
            }
            else {
                Ok(Complex::Value(FilterPatternNumberValue::Pattern(value.clone())))
            }
        }
        else {
            value.parse::<i64>()
                .map(|n| Complex::Value(FilterPatternNumberValue::Number(n)))
                .map_err(|_| cast_error(s, CastType::Number))
        }
    }
}
