//! Autocomplete suggestions for the token under a cursor.
//!
//! A forecast names what is being typed and the `[begin, end)` span the client
//! should replace once a suggestion is picked.

use serde::Serialize;

use crate::ast::{Span, Str};
use crate::plan::{MetaString, MetaType};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastMetaTagElement {
    /// the address up to and including the token under the cursor
    pub address: Vec<MetaString>,
    pub meta_type: Option<MetaType>,
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastSourceTagElement {
    pub address: Vec<MetaString>,
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastAnnotationElement {
    pub value: MetaString,
    pub meta_type: Option<MetaType>,
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastSort {
    pub value: String,
    /// alias groups of every sort key of the dialect
    pub candidates: Vec<Vec<String>>,
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastFilter {
    pub value: String,
    pub field: &'static str,
    pub candidates: Vec<Vec<String>>,
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Forecast {
    MetaTag(ForecastMetaTagElement),
    SourceTag(ForecastSourceTagElement),
    Annotation(ForecastAnnotationElement),
    Sort(ForecastSort),
    Filter(ForecastFilter),
}
impl Forecast {
    pub fn span(&self) -> Span {
        let (begin, end) = match self {
            Forecast::MetaTag(f) => (f.begin, f.end),
            Forecast::SourceTag(f) => (f.begin, f.end),
            Forecast::Annotation(f) => (f.begin, f.end),
            Forecast::Sort(f) => (f.begin, f.end),
            Forecast::Filter(f) => (f.begin, f.end),
        };
        Span::new(begin, end)
    }
}

/// The address made of `prefix` and the tokens before and at `leaf`.
pub(crate) fn address_until(prefix: &[Str], leaf: &[Str]) -> Vec<MetaString> {
    prefix.iter().chain(leaf.iter()).map(MetaString::from).collect()
}
