use serde::{Serialize, Serializer};
use thiserror::Error;

use std::fmt;

use crate::ast::{Prefix, Relation, Span, ValueType};

/// Errors outside of semantic analysis: settings, input files, dialect lookup.
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Input error: {0}")]
    Input(String),
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, CompilerError>;

// Helper conversions
impl From<config::ConfigError> for CompilerError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
impl From<serde_json::Error> for CompilerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Input(e.to_string())
    }
}
impl From<std::io::Error> for CompilerError {
    fn from(e: std::io::Error) -> Self {
        Self::Input(e.to_string())
    }
}

/// The literal kinds a leaf token can fail to convert into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CastType {
    Number,
    Ratio,
    Size,
    Duration,
    Date,
}
impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CastType::Number => write!(f, "NUMBER"),
            CastType::Ratio => write!(f, "RATIO"),
            CastType::Size => write!(f, "SIZE"),
            CastType::Duration => write!(f, "DURATION"),
            CastType::Date => write!(f, "DATE"),
        }
    }
}

/// Syntax structures a dialect may decline to handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Structure {
    Element,
    ElementWithSource,
    Annotation,
    Bracket,
}
impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Structure::Element => write!(f, "ELEMENT"),
            Structure::ElementWithSource => write!(f, "ELEMENT_WITH_SOURCE"),
            Structure::Annotation => write!(f, "ANNOTATION"),
            Structure::Bracket => write!(f, "BRACKET"),
        }
    }
}

/// Everything semantic analysis can object to. Each variant carries the span
/// of the offending text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Filter '{key}' requires a value.")]
    FilterValueRequired { key: String, span: Span },
    #[error("Filter '{key}' does not take a value.")]
    FilterValueNotRequired { key: String, span: Span },
    #[error("Filter '{key}' does not accept a {value_type} value.")]
    UnsupportedFilterValueType { key: String, value_type: ValueType, span: Span },
    #[error("Filter '{key}' does not accept a {value_type} value with relation '{relation}'.")]
    UnsupportedFilterValueTypeOfRelation { key: String, value_type: ValueType, relation: Relation, span: Span },
    #[error("Filter '{key}' does not support relation '{relation}'.")]
    UnsupportedFilterRelationSymbol { key: String, relation: Relation, span: Span },
    #[error("Prefix '{prefix}' does not fit the shape of this meta tag.")]
    InvalidMetaTagForThisPrefix { prefix: Prefix, span: Span },
    #[error("Element '{item}' cannot have a prefix.")]
    ElementPrefixNotRequired { item: &'static str, span: Span },
    #[error("Element '{item}' does not take a value.")]
    ElementValueNotRequired { item: &'static str, span: Span },
    #[error("Element '{item}' does not accept a {value_type} value.")]
    UnsupportedElementValueType { item: &'static str, value_type: ValueType, span: Span },
    #[error("Element '{item}' does not accept a {value_type} value with relation '{relation}'.")]
    UnsupportedElementValueTypeOfRelation { item: &'static str, value_type: ValueType, relation: Relation, span: Span },
    #[error("Element '{item}' does not support relation '{relation}'.")]
    UnsupportedElementRelationSymbol { item: &'static str, relation: Relation, span: Span },
    #[error("Sort requires a value.")]
    SortValueRequired { span: Span },
    #[error("Sort value must be a sort list.")]
    SortValueMustBeSortList { span: Span },
    #[error("Invalid sort item '{value}', expected one of: {}.", .expected.join(", "))]
    InvalidSortItem { value: String, expected: Vec<String>, span: Span },
    #[error("Sort must stand alone, without negation, source flag or alternatives.")]
    SortIsIndependent { span: Span },
    #[error("Sort item '{value}' is already ordered.")]
    DuplicatedSortItem { value: String, span: Span },
    #[error("Value cannot be an address.")]
    ValueCannotBeAddress { span: Span },
    #[error("Value cannot be a pattern in a comparison.")]
    ValueCannotBePatternInComparison { span: Span },
    #[error("Cannot convert '{value}' into {cast}.")]
    TypeCastError { value: String, cast: CastType, span: Span },
    #[error("Cannot convert '{value}' into {type_name}, expected one of: {}.", .expected.join(", "))]
    EnumTypeCastError { value: String, type_name: &'static str, expected: Vec<String>, span: Span },
    #[error("This dialect does not support {structure}.")]
    UnsupportedSemanticStructure { structure: Structure, span: Span },
    #[error("Filters and elements cannot be mixed in one item.")]
    IdentifiesAndElementsCannotBeMixed { span: Span },
    #[error("Filter '{identify}' cannot have a source flag.")]
    ThisIdentifyCannotHaveSourceFlag { identify: String, span: Span },
    #[error("Filter '{identify}' requires a source flag.")]
    ThisIdentifyMustHaveSourceFlag { identify: String, span: Span },
    #[error("Annotation cannot have a source flag.")]
    AnnotationCannotHaveSourceFlag { span: Span },
    #[error("Element '{item}' requires a value after '{relation}'.")]
    ElementValueRequired { item: &'static str, relation: Relation, span: Span },
}

impl SemanticError {
    /// Stable numeric code, shared with clients.
    pub fn code(&self) -> u16 {
        match self {
            SemanticError::FilterValueRequired { .. } => 3001,
            SemanticError::FilterValueNotRequired { .. } => 3002,
            SemanticError::UnsupportedFilterValueType { .. } => 3003,
            SemanticError::UnsupportedFilterValueTypeOfRelation { .. } => 3004,
            SemanticError::UnsupportedFilterRelationSymbol { .. } => 3005,
            SemanticError::InvalidMetaTagForThisPrefix { .. } => 3006,
            SemanticError::ElementPrefixNotRequired { .. } => 3007,
            SemanticError::ElementValueNotRequired { .. } => 3008,
            SemanticError::UnsupportedElementValueType { .. } => 3009,
            SemanticError::UnsupportedElementValueTypeOfRelation { .. } => 3010,
            SemanticError::UnsupportedElementRelationSymbol { .. } => 3011,
            SemanticError::SortValueRequired { .. } => 3012,
            SemanticError::SortValueMustBeSortList { .. } => 3013,
            SemanticError::InvalidSortItem { .. } => 3014,
            SemanticError::SortIsIndependent { .. } => 3015,
            SemanticError::DuplicatedSortItem { .. } => 3016,
            SemanticError::ValueCannotBeAddress { .. } => 3017,
            SemanticError::ValueCannotBePatternInComparison { .. } => 3018,
            SemanticError::TypeCastError { .. } => 3019,
            SemanticError::EnumTypeCastError { .. } => 3020,
            SemanticError::UnsupportedSemanticStructure { .. } => 3021,
            SemanticError::IdentifiesAndElementsCannotBeMixed { .. } => 3022,
            SemanticError::ThisIdentifyCannotHaveSourceFlag { .. } => 3023,
            SemanticError::ThisIdentifyMustHaveSourceFlag { .. } => 3024,
            SemanticError::AnnotationCannotHaveSourceFlag { .. } => 3025,
            SemanticError::ElementValueRequired { .. } => 3026,
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            SemanticError::FilterValueRequired { .. } => "FilterValueRequired",
            SemanticError::FilterValueNotRequired { .. } => "FilterValueNotRequired",
            SemanticError::UnsupportedFilterValueType { .. } => "UnsupportedFilterValueType",
            SemanticError::UnsupportedFilterValueTypeOfRelation { .. } => "UnsupportedFilterValueTypeOfRelation",
            SemanticError::UnsupportedFilterRelationSymbol { .. } => "UnsupportedFilterRelationSymbol",
            SemanticError::InvalidMetaTagForThisPrefix { .. } => "InvalidMetaTagForThisPrefix",
            SemanticError::ElementPrefixNotRequired { .. } => "ElementPrefixNotRequired",
            SemanticError::ElementValueNotRequired { .. } => "ElementValueNotRequired",
            SemanticError::UnsupportedElementValueType { .. } => "UnsupportedElementValueType",
            SemanticError::UnsupportedElementValueTypeOfRelation { .. } => "UnsupportedElementValueTypeOfRelation",
            SemanticError::UnsupportedElementRelationSymbol { .. } => "UnsupportedElementRelationSymbol",
            SemanticError::SortValueRequired { .. } => "SortValueRequired",
            SemanticError::SortValueMustBeSortList { .. } => "SortValueMustBeSortList",
            SemanticError::InvalidSortItem { .. } => "InvalidSortItem",
            SemanticError::SortIsIndependent { .. } => "SortIsIndependent",
            SemanticError::DuplicatedSortItem { .. } => "DuplicatedSortItem",
            SemanticError::ValueCannotBeAddress { .. } => "ValueCannotBeAddress",
            SemanticError::ValueCannotBePatternInComparison { .. } => "ValueCannotBePatternInComparison",
            SemanticError::TypeCastError { .. } => "TypeCastError",
            SemanticError::EnumTypeCastError { .. } => "EnumTypeCastError",
            SemanticError::UnsupportedSemanticStructure { .. } => "UnsupportedSemanticStructure",
            SemanticError::IdentifiesAndElementsCannotBeMixed { .. } => "IdentifiesAndElementsCannotBeMixed",
            SemanticError::ThisIdentifyCannotHaveSourceFlag { .. } => "ThisIdentifyCannotHaveSourceFlag",
            SemanticError::ThisIdentifyMustHaveSourceFlag { .. } => "ThisIdentifyMustHaveSourceFlag",
            SemanticError::AnnotationCannotHaveSourceFlag { .. } => "AnnotationCannotHaveSourceFlag",
            SemanticError::ElementValueRequired { .. } => "ElementValueRequired",
        }
    }
    pub fn span(&self) -> Span {
        match self {
            SemanticError::FilterValueRequired { span, .. }
            | SemanticError::FilterValueNotRequired { span, .. }
            | SemanticError::UnsupportedFilterValueType { span, .. }
            | SemanticError::UnsupportedFilterValueTypeOfRelation { span, .. }
            | SemanticError::UnsupportedFilterRelationSymbol { span, .. }
            | SemanticError::InvalidMetaTagForThisPrefix { span, .. }
            | SemanticError::ElementPrefixNotRequired { span, .. }
            | SemanticError::ElementValueNotRequired { span, .. }
            | SemanticError::UnsupportedElementValueType { span, .. }
            | SemanticError::UnsupportedElementValueTypeOfRelation { span, .. }
            | SemanticError::UnsupportedElementRelationSymbol { span, .. }
            | SemanticError::SortValueRequired { span }
            | SemanticError::SortValueMustBeSortList { span }
            | SemanticError::InvalidSortItem { span, .. }
            | SemanticError::SortIsIndependent { span }
            | SemanticError::DuplicatedSortItem { span, .. }
            | SemanticError::ValueCannotBeAddress { span }
            | SemanticError::ValueCannotBePatternInComparison { span }
            | SemanticError::TypeCastError { span, .. }
            | SemanticError::EnumTypeCastError { span, .. }
            | SemanticError::UnsupportedSemanticStructure { span, .. }
            | SemanticError::IdentifiesAndElementsCannotBeMixed { span }
            | SemanticError::ThisIdentifyCannotHaveSourceFlag { span, .. }
            | SemanticError::ThisIdentifyMustHaveSourceFlag { span, .. }
            | SemanticError::AnnotationCannotHaveSourceFlag { span }
            | SemanticError::ElementValueRequired { span, .. } => *span,
        }
    }
    /// Only duplicated sort items are reported without failing the query.
    pub fn is_warning(&self) -> bool {
        matches!(self, SemanticError::DuplicatedSortItem { .. })
    }
}

/// The client facing view of a [`SemanticError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: u16,
    pub kind: &'static str,
    pub message: String,
    pub begin: usize,
    pub end: usize,
}
impl From<&SemanticError> for Diagnostic {
    fn from(e: &SemanticError) -> Self {
        let span = e.span();
        Diagnostic {
            code: e.code(),
            kind: e.kind(),
            message: e.to_string(),
            begin: span.begin,
            end: span.end,
        }
    }
}
impl Serialize for SemanticError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Diagnostic::from(self).serialize(serializer)
    }
}
