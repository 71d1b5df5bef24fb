//! Field generators: one per keyword a dialect understands.
//!
//! A generator looks at the family and predicative following its keyword and
//! turns them into filters. It decides which relations and predicate shapes
//! are legal for its kind of field, and leaves the token conversion to its
//! parser. An empty collection yields no filter at all.

use crate::ast::{Col, Predicative, Relation, Sfp, Span, Str, StrList};
use crate::datatype::{
    Comparable, DataType, Equable, FieldEnum, FilterNothingValue, FilterPatternNumberValue, Matchable, Value,
};
use crate::error::SemanticError;
use crate::forecast::{Forecast, ForecastFilter};
use crate::parser::{
    Complex, DateParser, DurationParser, EnumParser, NumberParser, PatternNumberParser, RatioParser, SizeParser,
    StrComplexParser, StrTypeParser, StringParser, TimesNumberParser,
};
use crate::plan::Filter;

pub trait GeneratedByIdentify: Send + Sync {
    /// Name of the field in the plan.
    fn key(&self) -> &'static str;
    /// Keywords selecting this field, `^` marking the source-data variants.
    fn alias(&self) -> &[&'static str];
    fn value_type(&self) -> &'static str;
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError>;
    fn forecast(&self, _sfp: &Sfp, _cursor: usize) -> Option<Forecast> {
        None
    }
}

const IS: &[Relation] = &[Relation::Is];
const IS_OR_COMPARISON: &[Relation] = &[
    Relation::Is,
    Relation::Greater,
    Relation::GreaterEqual,
    Relation::Less,
    Relation::LessEqual,
];

// ------------- Shared checks -------------
/// Rejects relations the field does not know, then demands a predicative.
fn required<'a>(key: &str, sfp: &'a Sfp, relations: &[Relation]) -> Result<(Relation, &'a Predicative), SemanticError> {
    if let Some(family) = &sfp.family {
        if !relations.contains(&family.relation) {
            return Err(SemanticError::UnsupportedFilterRelationSymbol {
                key: key.to_string(),
                relation: family.relation,
                span: family.span,
            });
        }
    }
    match (&sfp.family, &sfp.predicative) {
        (Some(family), Some(predicative)) => Ok((family.relation, predicative)),
        (family, _) => {
            let end = family.map(|f| f.span.end).unwrap_or(sfp.subject.span.end);
            Err(SemanticError::FilterValueRequired {
                key: key.to_string(),
                span: Span::new(sfp.subject.span.begin, end),
            })
        }
    }
}

fn scalar(list: &StrList) -> Result<&Str, SemanticError> {
    list.single().ok_or(SemanticError::ValueCannotBeAddress { span: list.span })
}

fn unsupported_value(key: &str, predicative: &Predicative) -> SemanticError {
    SemanticError::UnsupportedFilterValueType {
        key: key.to_string(),
        value_type: predicative.value_type(),
        span: predicative.span(),
    }
}

fn unsupported_value_of_relation(key: &str, relation: Relation, predicative: &Predicative) -> SemanticError {
    SemanticError::UnsupportedFilterValueTypeOfRelation {
        key: key.to_string(),
        value_type: predicative.value_type(),
        relation,
        span: predicative.span(),
    }
}

/// `None` for an empty collection, which is discarded rather than filtered on.
fn parse_col<P: StrTypeParser>(parser: &P, col: &Col) -> Result<Option<Vec<Value>>, SemanticError> {
    if col.items.is_empty() {
        return Ok(None);
    }
    col.items.iter()
        .map(|s| parser.parse(s).map(Into::into))
        .collect::<Result<Vec<Value>, _>>()
        .map(Some)
}

/// An open range on the side the comparison points to.
fn compare(key: &'static str, relation: Relation, value: Value, span: Span) -> Filter {
    match relation {
        Relation::Greater => Filter::range(key, Some(value), None, false, false, span),
        Relation::GreaterEqual => Filter::range(key, Some(value), None, true, false, span),
        Relation::Less => Filter::range(key, None, Some(value), false, false, span),
        _ => Filter::range(key, None, Some(value), false, true, span),
    }
}

/// Compares against a half-open `[begin, end)` range by picking the edge that
/// keeps the meaning of the operator, e.g. `> 2020` starts at 2021.
fn compare_range(key: &'static str, relation: Relation, begin: Value, end: Value, span: Span) -> Filter {
    match relation {
        Relation::Greater => Filter::range(key, Some(end), None, true, false, span),
        Relation::GreaterEqual => Filter::range(key, Some(begin), None, true, false, span),
        Relation::Less => Filter::range(key, None, Some(begin), false, false, span),
        _ => Filter::range(key, None, Some(end), false, false, span),
    }
}

fn forecast_enum(key: &'static str, enums: impl FnOnce() -> Option<Vec<Vec<String>>>, sfp: &Sfp, cursor: usize) -> Option<Forecast> {
    let leaf = match sfp.predicative.as_ref()? {
        Predicative::StrList(list) => list.single().filter(|s| s.span.contains(cursor)),
        Predicative::Col(col) => col.items.iter().find(|s| s.span.contains(cursor)),
        _ => None,
    }?;
    let candidates = enums()?;
    Some(Forecast::Filter(ForecastFilter {
        value: leaf.value.clone(),
        field: key,
        candidates,
        begin: leaf.span.begin,
        end: leaf.span.end,
    }))
}

// ------------- Flag -------------
pub struct FlagField {
    key: &'static str,
    alias: Vec<&'static str>,
}
impl GeneratedByIdentify for FlagField {
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        FilterNothingValue::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        if sfp.family.is_some() || sfp.predicative.is_some() {
            let end = sfp.predicative.as_ref().map(|p| p.span().end)
                .or(sfp.family.map(|f| f.span.end))
                .unwrap_or(sfp.subject.span.end);
            return Err(SemanticError::FilterValueNotRequired {
                key: self.key.to_string(),
                span: Span::new(sfp.subject.span.begin, end),
            });
        }
        Ok(vec![Filter::flag(self.key, sfp.span)])
    }
}

// ------------- Equable -------------
pub struct EquableField<P> {
    key: &'static str,
    alias: Vec<&'static str>,
    parser: P,
}
impl<P> GeneratedByIdentify for EquableField<P>
where
    P: StrTypeParser,
    P::Value: Equable,
{
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        <P::Value as DataType>::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        let (_, predicative) = required(self.key, sfp, IS)?;
        match predicative {
            Predicative::StrList(list) => {
                let value = self.parser.parse(scalar(list)?)?;
                Ok(vec![Filter::equal(self.key, vec![value.into()], sfp.span)])
            }
            Predicative::Col(col) => Ok(parse_col(&self.parser, col)?
                .map(|values| Filter::equal(self.key, values, sfp.span))
                .into_iter()
                .collect()),
            other => Err(unsupported_value(self.key, other)),
        }
    }
    fn forecast(&self, sfp: &Sfp, cursor: usize) -> Option<Forecast> {
        forecast_enum(self.key, || self.parser.enums(), sfp, cursor)
    }
}

// ------------- Comparable -------------
pub struct ComparableField<P> {
    key: &'static str,
    alias: Vec<&'static str>,
    nullable: bool,
    parser: P,
}
impl<P> ComparableField<P> {
    /// The keyword alone then asks for fields without a value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
impl<P> GeneratedByIdentify for ComparableField<P>
where
    P: StrTypeParser,
    P::Value: Equable + Comparable,
{
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        <P::Value as DataType>::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        if self.nullable && sfp.family.is_none() && sfp.predicative.is_none() {
            return Ok(vec![Filter::is_null(self.key, sfp.span)]);
        }
        let (relation, predicative) = required(self.key, sfp, IS_OR_COMPARISON)?;
        match predicative {
            Predicative::SortList(_) => Err(unsupported_value(self.key, predicative)),
            Predicative::StrList(list) => {
                let value: Value = self.parser.parse(scalar(list)?)?.into();
                Ok(vec![match relation {
                    Relation::Is => Filter::equal(self.key, vec![value], sfp.span),
                    _ => compare(self.key, relation, value, sfp.span),
                }])
            }
            Predicative::Col(col) if relation == Relation::Is => Ok(parse_col(&self.parser, col)?
                .map(|values| Filter::equal(self.key, values, sfp.span))
                .into_iter()
                .collect()),
            Predicative::Range(range) if relation == Relation::Is => {
                let begin = self.parser.parse(&range.from)?;
                let end = self.parser.parse(&range.to)?;
                Ok(vec![Filter::range(self.key, Some(begin.into()), Some(end.into()), range.include_from, range.include_to, sfp.span)])
            }
            other => Err(unsupported_value_of_relation(self.key, relation, other)),
        }
    }
}

// ------------- Matchable -------------
pub struct MatchableField<P> {
    key: &'static str,
    alias: Vec<&'static str>,
    exact: bool,
    parser: P,
}
impl<P> MatchableField<P>
where
    P: StrTypeParser,
    P::Value: Matchable,
{
    fn parse_all(&self, items: &[&Str]) -> Result<Vec<Value>, SemanticError> {
        items.iter().map(|s| self.parser.parse(s).map(Into::into)).collect()
    }
}
impl<P> GeneratedByIdentify for MatchableField<P>
where
    P: StrTypeParser,
    P::Value: Matchable,
{
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        <P::Value as DataType>::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        let (_, predicative) = required(self.key, sfp, IS)?;
        match predicative {
            Predicative::StrList(list) => {
                let s = scalar(list)?;
                let value: Value = self.parser.parse(s)?.into();
                Ok(vec![if s.is_precise() {
                    Filter::equal(self.key, vec![value], sfp.span)
                }
                else {
                    Filter::matching(self.key, vec![value], self.exact, sfp.span)
                }])
            }
            Predicative::Col(col) => {
                let (precise, pattern): (Vec<&Str>, Vec<&Str>) = col.items.iter().partition(|s| s.is_precise());
                let mut filters = Vec::new();
                if !precise.is_empty() {
                    filters.push(Filter::equal(self.key, self.parse_all(&precise)?, sfp.span));
                }
                if !pattern.is_empty() {
                    filters.push(Filter::matching(self.key, self.parse_all(&pattern)?, self.exact, sfp.span));
                }
                Ok(filters)
            }
            other => Err(unsupported_value(self.key, other)),
        }
    }
}

// ------------- Complex comparable -------------
pub struct ComplexComparableField<P> {
    key: &'static str,
    alias: Vec<&'static str>,
    parser: P,
}
impl<P> GeneratedByIdentify for ComplexComparableField<P>
where
    P: StrComplexParser,
    P::Value: Equable + Comparable,
{
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        <P::Value as DataType>::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        let key = self.key;
        let (relation, predicative) = required(key, sfp, IS_OR_COMPARISON)?;
        match predicative {
            Predicative::SortList(_) => Err(unsupported_value(key, predicative)),
            Predicative::StrList(list) => {
                let filter = match (relation, self.parser.parse(scalar(list)?)?) {
                    (Relation::Is, Complex::Value(v)) => Filter::equal(key, vec![v.into()], sfp.span),
                    (Relation::Is, Complex::Range(b, e)) => Filter::range(key, Some(b.into()), Some(e.into()), true, false, sfp.span),
                    (_, Complex::Value(v)) => compare(key, relation, v.into(), sfp.span),
                    (_, Complex::Range(b, e)) => compare_range(key, relation, b.into(), e.into(), sfp.span),
                };
                Ok(vec![filter])
            }
            Predicative::Col(col) if relation == Relation::Is => {
                let mut values = Vec::new();
                let mut filters = Vec::new();
                for s in &col.items {
                    match self.parser.parse(s)? {
                        Complex::Value(v) => values.push(v.into()),
                        Complex::Range(b, e) => filters.push(Filter::range(key, Some(b.into()), Some(e.into()), true, false, sfp.span)),
                    }
                }
                if !values.is_empty() {
                    filters.insert(0, Filter::equal(key, values, sfp.span));
                }
                Ok(filters)
            }
            Predicative::Range(range) if relation == Relation::Is => {
                // a widened bound contributes the edge that keeps the range's own inclusiveness
                let (begin, include_begin) = match self.parser.parse(&range.from)? {
                    Complex::Value(v) => (v, range.include_from),
                    Complex::Range(b, _) if range.include_from => (b, true),
                    Complex::Range(_, e) => (e, true),
                };
                let (end, include_end) = match self.parser.parse(&range.to)? {
                    Complex::Value(v) => (v, range.include_to),
                    Complex::Range(_, e) if range.include_to => (e, false),
                    Complex::Range(b, _) => (b, false),
                };
                Ok(vec![Filter::range(key, Some(begin.into()), Some(end.into()), include_begin, include_end, sfp.span)])
            }
            other => Err(unsupported_value_of_relation(key, relation, other)),
        }
    }
}

// ------------- Number pattern -------------
pub struct NumberPatternField {
    key: &'static str,
    alias: Vec<&'static str>,
}
impl NumberPatternField {
    /// A plain number usable as a bound.
    fn bound(&self, s: &Str) -> Result<Value, SemanticError> {
        match PatternNumberParser.parse(s)? {
            Complex::Value(v) if !v.is_pattern() => Ok(v.into()),
            _ => Err(SemanticError::ValueCannotBePatternInComparison { span: s.span }),
        }
    }
}
impl GeneratedByIdentify for NumberPatternField {
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        FilterPatternNumberValue::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        let key = self.key;
        let (relation, predicative) = required(key, sfp, IS_OR_COMPARISON)?;
        match predicative {
            Predicative::SortList(_) => Err(unsupported_value(key, predicative)),
            Predicative::StrList(list) if relation == Relation::Is => {
                let filter = match PatternNumberParser.parse(scalar(list)?)? {
                    Complex::Value(v) if v.is_pattern() => Filter::matching(key, vec![v.into()], true, sfp.span),
                    Complex::Value(v) => Filter::equal(key, vec![v.into()], sfp.span),
                    Complex::Range(b, e) => Filter::range(key, Some(b.into()), Some(e.into()), true, false, sfp.span),
                };
                Ok(vec![filter])
            }
            Predicative::StrList(list) => {
                let value = self.bound(scalar(list)?)?;
                Ok(vec![compare(key, relation, value, sfp.span)])
            }
            Predicative::Col(col) if relation == Relation::Is => {
                let mut equal = Vec::new();
                let mut matching = Vec::new();
                let mut ranges = Vec::new();
                for s in &col.items {
                    match PatternNumberParser.parse(s)? {
                        Complex::Value(v) if v.is_pattern() => matching.push(v.into()),
                        Complex::Value(v) => equal.push(v.into()),
                        Complex::Range(b, e) => ranges.push(Filter::range(key, Some(b.into()), Some(e.into()), true, false, sfp.span)),
                    }
                }
                let mut filters = Vec::new();
                if !equal.is_empty() {
                    filters.push(Filter::equal(key, equal, sfp.span));
                }
                if !matching.is_empty() {
                    filters.push(Filter::matching(key, matching, true, sfp.span));
                }
                filters.append(&mut ranges);
                Ok(filters)
            }
            Predicative::Range(range) if relation == Relation::Is => {
                let begin = self.bound(&range.from)?;
                let end = self.bound(&range.to)?;
                Ok(vec![Filter::range(key, Some(begin), Some(end), range.include_from, range.include_to, sfp.span)])
            }
            other => Err(unsupported_value_of_relation(key, relation, other)),
        }
    }
}

// ------------- Composition -------------
pub struct CompositionField<P> {
    key: &'static str,
    alias: Vec<&'static str>,
    allow_flag_mode: bool,
    parser: P,
}
impl<P> GeneratedByIdentify for CompositionField<P>
where
    P: StrTypeParser,
    P::Value: Equable,
{
    fn key(&self) -> &'static str {
        self.key
    }
    fn alias(&self) -> &[&'static str] {
        &self.alias
    }
    fn value_type(&self) -> &'static str {
        <P::Value as DataType>::DATA_TYPE
    }
    fn generate(&self, sfp: &Sfp) -> Result<Vec<Filter>, SemanticError> {
        if self.allow_flag_mode && sfp.family.is_none() && sfp.predicative.is_none() {
            return Ok(vec![Filter::composition(self.key, Vec::new(), sfp.span)]);
        }
        let (_, predicative) = required(self.key, sfp, IS)?;
        match predicative {
            Predicative::StrList(list) => {
                let value = self.parser.parse(scalar(list)?)?;
                Ok(vec![Filter::composition(self.key, vec![value.into()], sfp.span)])
            }
            Predicative::Col(col) => Ok(parse_col(&self.parser, col)?
                .map(|values| Filter::composition(self.key, values, sfp.span))
                .into_iter()
                .collect()),
            other => Err(unsupported_value(self.key, other)),
        }
    }
    fn forecast(&self, sfp: &Sfp, cursor: usize) -> Option<Forecast> {
        forecast_enum(self.key, || self.parser.enums(), sfp, cursor)
    }
}

// ------------- Declarations -------------
pub fn flag_field(key: &'static str, alias: &[&'static str]) -> FlagField {
    FlagField { key, alias: alias.to_vec() }
}
pub fn string_field(key: &'static str, alias: &[&'static str]) -> EquableField<StringParser> {
    EquableField { key, alias: alias.to_vec(), parser: StringParser }
}
/// Bare words match fuzzily, `exact` anchors the pattern to the whole text.
pub fn pattern_string_field(key: &'static str, alias: &[&'static str], exact: bool) -> MatchableField<StringParser> {
    MatchableField { key, alias: alias.to_vec(), exact, parser: StringParser }
}
pub fn number_field(key: &'static str, alias: &[&'static str]) -> ComparableField<NumberParser> {
    ComparableField { key, alias: alias.to_vec(), nullable: false, parser: NumberParser }
}
pub fn times_number_field(key: &'static str, alias: &[&'static str]) -> ComparableField<TimesNumberParser> {
    ComparableField { key, alias: alias.to_vec(), nullable: false, parser: TimesNumberParser }
}
pub fn ratio_field(key: &'static str, alias: &[&'static str]) -> ComparableField<RatioParser> {
    ComparableField { key, alias: alias.to_vec(), nullable: false, parser: RatioParser }
}
pub fn size_field(key: &'static str, alias: &[&'static str]) -> ComparableField<SizeParser> {
    ComparableField { key, alias: alias.to_vec(), nullable: false, parser: SizeParser }
}
pub fn duration_field(key: &'static str, alias: &[&'static str]) -> ComparableField<DurationParser> {
    ComparableField { key, alias: alias.to_vec(), nullable: false, parser: DurationParser }
}
pub fn date_field(key: &'static str, alias: &[&'static str]) -> ComplexComparableField<DateParser> {
    ComplexComparableField { key, alias: alias.to_vec(), parser: DateParser }
}
pub fn pattern_number_field(key: &'static str, alias: &[&'static str]) -> NumberPatternField {
    NumberPatternField { key, alias: alias.to_vec() }
}
pub fn enum_field<E: FieldEnum>(key: &'static str, alias: &[&'static str], parser: EnumParser<E>) -> EquableField<EnumParser<E>> {
    EquableField { key, alias: alias.to_vec(), parser }
}
pub fn composition_field<E: FieldEnum>(key: &'static str, alias: &[&'static str], allow_flag_mode: bool, parser: EnumParser<E>) -> CompositionField<EnumParser<E>> {
    CompositionField { key, alias: alias.to_vec(), allow_flag_mode, parser }
}
