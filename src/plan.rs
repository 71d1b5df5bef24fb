//! The query plan: filters, join elements and orders produced by one compile.
//!
//! Every node remembers the span of the clause it was compiled from. Nodes are
//! plain data; the storage translator downstream decides what they mean.

use serde::Serialize;

use crate::ast::{Span, Str};
use crate::datatype::{FieldEnum, Value};

// ------------- Filters -------------
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    /// the field equals any of the values
    Equal { values: Vec<Value> },
    /// the field matches any of the patterns, `exact` anchors them to the whole text
    Match { values: Vec<Value>, exact: bool },
    Range { begin: Option<Value>, end: Option<Value>, include_begin: bool, include_end: bool },
    /// the keyword alone
    Flag,
    /// the set held by the field intersects the values
    Composition { values: Vec<Value> },
    IsNull,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Filter {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: FilterKind,
    pub span: Span,
}
impl Filter {
    pub fn equal(field: &'static str, values: Vec<Value>, span: Span) -> Self {
        Filter { field, kind: FilterKind::Equal { values }, span }
    }
    pub fn matching(field: &'static str, values: Vec<Value>, exact: bool, span: Span) -> Self {
        Filter { field, kind: FilterKind::Match { values, exact }, span }
    }
    pub fn range(field: &'static str, begin: Option<Value>, end: Option<Value>, include_begin: bool, include_end: bool, span: Span) -> Self {
        Filter { field, kind: FilterKind::Range { begin, end, include_begin, include_end }, span }
    }
    pub fn flag(field: &'static str, span: Span) -> Self {
        Filter { field, kind: FilterKind::Flag, span }
    }
    pub fn composition(field: &'static str, values: Vec<Value>, span: Span) -> Self {
        Filter { field, kind: FilterKind::Composition { values }, span }
    }
    pub fn is_null(field: &'static str, span: Span) -> Self {
        Filter { field, kind: FilterKind::IsNull, span }
    }
}

/// Alternatives of one query item; `exclude` negates the whole group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnionFilters {
    pub filters: Vec<Filter>,
    pub exclude: bool,
}

// ------------- Elements -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MetaString {
    pub value: String,
    /// backtick quoted, so never matched fuzzily
    pub precise: bool,
}
impl From<&Str> for MetaString {
    fn from(s: &Str) -> Self {
        MetaString { value: s.value.clone(), precise: s.is_precise() }
    }
}

pub type MetaAddress = Vec<MetaString>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetaType {
    Author,
    Topic,
    Tag,
}

/// An address of exactly one segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SingleMetaValue(pub MetaString);

/// An address of any length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimpleMetaValue(pub MetaAddress);
impl From<SingleMetaValue> for SimpleMetaValue {
    fn from(single: SingleMetaValue) -> Self {
        SimpleMetaValue(vec![single.0])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetaValue {
    Single { value: SingleMetaValue },
    Simple { value: SimpleMetaValue },
    SequentialOfCollection { tag: MetaAddress, values: Vec<MetaString> },
    SequentialOfRange { tag: MetaAddress, begin: Option<MetaString>, end: Option<MetaString>, include_begin: bool, include_end: bool },
    SequentialItemToOther { tag: MetaAddress, other: MetaString },
    SequentialItemToDirection { tag: MetaAddress, desc: bool },
}
impl MetaValue {
    pub fn as_single(&self) -> Option<&SingleMetaValue> {
        match self {
            MetaValue::Single { value } => Some(value),
            _ => None,
        }
    }
    /// Single values widen into one-segment addresses.
    pub fn as_simple(&self) -> Option<SimpleMetaValue> {
        match self {
            MetaValue::Single { value } => Some(value.clone().into()),
            MetaValue::Simple { value } => Some(value.clone()),
            _ => None,
        }
    }
}

/// A tag-like element narrowed to the items it holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetaTagElement<M> {
    pub items: Vec<M>,
    pub meta_type: Option<MetaType>,
    pub exclude: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TagElement {
    /// every item is a single segment
    Author(MetaTagElement<SingleMetaValue>),
    /// every item is a plain address
    Topic(MetaTagElement<SimpleMetaValue>),
    Tag(MetaTagElement<MetaValue>),
}
impl TagElement {
    pub fn meta_type(&self) -> Option<MetaType> {
        match self {
            TagElement::Author(e) => e.meta_type,
            TagElement::Topic(e) => e.meta_type,
            TagElement::Tag(e) => e.meta_type,
        }
    }
    pub fn exclude(&self) -> bool {
        match self {
            TagElement::Author(e) => e.exclude,
            TagElement::Topic(e) => e.exclude,
            TagElement::Tag(e) => e.exclude,
        }
    }
    pub fn span(&self) -> Span {
        match self {
            TagElement::Author(e) => e.span,
            TagElement::Topic(e) => e.span,
            TagElement::Tag(e) => e.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceTagElement {
    pub items: Vec<SimpleMetaValue>,
    pub exclude: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationElement {
    pub items: Vec<MetaString>,
    pub meta_type: Option<MetaType>,
    pub exclude: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NameElementForMeta {
    pub items: Vec<MetaString>,
    pub exclude: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationElementForMeta {
    pub items: Vec<MetaString>,
    pub exclude: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinElement {
    Tag(TagElement),
    SourceTag(SourceTagElement),
    Annotation(AnnotationElement),
    Name(NameElementForMeta),
    MetaAnnotation(AnnotationElementForMeta),
}
impl JoinElement {
    pub fn span(&self) -> Span {
        match self {
            JoinElement::Tag(e) => e.span(),
            JoinElement::SourceTag(e) => e.span,
            JoinElement::Annotation(e) => e.span,
            JoinElement::Name(e) => e.span,
            JoinElement::MetaAnnotation(e) => e.span,
        }
    }
}

// ------------- Orders -------------
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order<O: FieldEnum> {
    pub key: O,
    pub desc: bool,
    pub span: Span,
}

// ------------- Plan -------------
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan<O: FieldEnum> {
    pub filters: Vec<UnionFilters>,
    pub join_elements: Vec<JoinElement>,
    pub order_conditions: Vec<Order<O>>,
}
impl<O: FieldEnum> QueryPlan<O> {
    pub fn new() -> Self {
        QueryPlan { filters: Vec::new(), join_elements: Vec::new(), order_conditions: Vec::new() }
    }
    pub fn flat_filters(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter().flat_map(|group| group.filters.iter())
    }
    /// Every span a node of this plan was compiled from.
    pub fn spans(&self) -> Vec<Span> {
        self.flat_filters().map(|f| f.span)
            .chain(self.join_elements.iter().map(JoinElement::span))
            .chain(self.order_conditions.iter().map(|o| o.span))
            .collect()
    }
}
impl<O: FieldEnum> Default for QueryPlan<O> {
    fn default() -> Self {
        Self::new()
    }
}
