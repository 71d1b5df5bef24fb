//! Element generators: words that are not keywords of the dialect.
//!
//! Tag-like words become meta tags, `^` flagged words source tags, and
//! bracketed words annotations. Dialects of meta resources (authors, topics,
//! tags) read plain words as names instead.

use crate::ast::{Annotation, Element, Predicative, Prefix, Relation, Sfp, Span, Str, StrList};
use crate::error::SemanticError;
use crate::forecast::{
    address_until, Forecast, ForecastAnnotationElement, ForecastMetaTagElement, ForecastSourceTagElement,
};
use crate::plan::{
    AnnotationElement, AnnotationElementForMeta, JoinElement, MetaAddress, MetaString, MetaTagElement, MetaType,
    MetaValue, NameElementForMeta, SimpleMetaValue, SingleMetaValue, SourceTagElement, TagElement,
};

pub trait GeneratedByElement: Send + Sync {
    fn item_name(&self) -> &'static str;
    fn generate(&self, element: &Element, minus: bool) -> Result<JoinElement, SemanticError>;
    fn forecast(&self, _element: &Element, _cursor: usize) -> Option<Forecast> {
        None
    }
}

pub trait GeneratedByAnnotation: Send + Sync {
    fn item_name(&self) -> &'static str;
    fn generate(&self, annotation: &Annotation, minus: bool) -> Result<JoinElement, SemanticError>;
    fn forecast(&self, _annotation: &Annotation, _cursor: usize) -> Option<Forecast> {
        None
    }
}

pub fn meta_type_of(prefix: Prefix) -> MetaType {
    match prefix {
        Prefix::At => MetaType::Author,
        Prefix::Hash => MetaType::Topic,
        Prefix::Dollar => MetaType::Tag,
    }
}

/// A binary relation left without its value, spanning subject to relation.
fn value_required(item: &'static str, sfp: &Sfp, relation: Relation, family: Span) -> SemanticError {
    SemanticError::ElementValueRequired {
        item,
        relation,
        span: sfp.subject.span.to(family),
    }
}

// ------------- Meta tag -------------
pub struct MetaTagElementField;
impl MetaTagElementField {
    const ITEM_NAME: &'static str = "meta-tag";

    fn map_sfp(sfp: &Sfp) -> Result<MetaValue, SemanticError> {
        let mut tag: MetaAddress = sfp.subject.items.iter().map(MetaString::from).collect();
        match (&sfp.family, &sfp.predicative) {
            (None, _) if tag.len() == 1 => Ok(MetaValue::Single { value: SingleMetaValue(tag.remove(0)) }),
            (None, _) => Ok(MetaValue::Simple { value: SimpleMetaValue(tag) }),
            (Some(family), None) => match family.relation {
                Relation::Next => Ok(MetaValue::SequentialItemToDirection { tag, desc: false }),
                Relation::Previous => Ok(MetaValue::SequentialItemToDirection { tag, desc: true }),
                relation => Err(value_required(Self::ITEM_NAME, sfp, relation, family.span)),
            },
            (Some(family), Some(predicative)) => match family.relation {
                Relation::Is => Self::map_is(tag, predicative),
                Relation::To => Self::map_to(tag, predicative),
                relation if relation.is_comparison() => Self::map_compare(tag, relation, predicative),
                relation => Err(SemanticError::UnsupportedElementRelationSymbol {
                    item: Self::ITEM_NAME,
                    relation,
                    span: family.span,
                }),
            },
        }
    }

    fn map_is(tag: MetaAddress, predicative: &Predicative) -> Result<MetaValue, SemanticError> {
        match predicative {
            Predicative::StrList(list) => Ok(MetaValue::SequentialOfCollection { tag, values: vec![Self::scalar(list)?] }),
            Predicative::Col(col) => Ok(MetaValue::SequentialOfCollection {
                tag,
                values: col.items.iter().map(MetaString::from).collect(),
            }),
            Predicative::Range(range) => Ok(MetaValue::SequentialOfRange {
                tag,
                begin: Some(MetaString::from(&range.from)),
                end: Some(MetaString::from(&range.to)),
                include_begin: range.include_from,
                include_end: range.include_to,
            }),
            Predicative::SortList(list) => Err(SemanticError::UnsupportedElementValueType {
                item: Self::ITEM_NAME,
                value_type: predicative.value_type(),
                span: list.span,
            }),
        }
    }

    fn map_compare(tag: MetaAddress, relation: Relation, predicative: &Predicative) -> Result<MetaValue, SemanticError> {
        let list = Self::only_str_list(relation, predicative)?;
        let value = Some(Self::scalar(list)?);
        Ok(match relation {
            Relation::Greater => MetaValue::SequentialOfRange { tag, begin: value, end: None, include_begin: false, include_end: false },
            Relation::GreaterEqual => MetaValue::SequentialOfRange { tag, begin: value, end: None, include_begin: true, include_end: false },
            Relation::Less => MetaValue::SequentialOfRange { tag, begin: None, end: value, include_begin: false, include_end: false },
            _ => MetaValue::SequentialOfRange { tag, begin: None, end: value, include_begin: false, include_end: true },
        })
    }

    fn map_to(tag: MetaAddress, predicative: &Predicative) -> Result<MetaValue, SemanticError> {
        let list = Self::only_str_list(Relation::To, predicative)?;
        Ok(MetaValue::SequentialItemToOther { tag, other: Self::scalar(list)? })
    }

    fn only_str_list(relation: Relation, predicative: &Predicative) -> Result<&StrList, SemanticError> {
        match predicative {
            Predicative::StrList(list) => Ok(list),
            Predicative::SortList(_) => Err(SemanticError::UnsupportedElementValueType {
                item: Self::ITEM_NAME,
                value_type: predicative.value_type(),
                span: predicative.span(),
            }),
            _ => Err(SemanticError::UnsupportedElementValueTypeOfRelation {
                item: Self::ITEM_NAME,
                value_type: predicative.value_type(),
                relation,
                span: predicative.span(),
            }),
        }
    }

    /// An address never appears as a predicative.
    fn scalar(list: &StrList) -> Result<MetaString, SemanticError> {
        list.single()
            .map(MetaString::from)
            .ok_or(SemanticError::ValueCannotBeAddress { span: list.span })
    }

    /// Narrows the values to the most specific shape they all share.
    fn promote(values: Vec<MetaValue>, meta_type: Option<MetaType>, exclude: bool, span: Span) -> TagElement {
        if let Some(items) = values.iter().map(|v| v.as_single().cloned()).collect::<Option<Vec<_>>>() {
            TagElement::Author(MetaTagElement { items, meta_type, exclude, span })
        }
        else if let Some(items) = values.iter().map(MetaValue::as_simple).collect::<Option<Vec<_>>>() {
            TagElement::Topic(MetaTagElement { items, meta_type, exclude, span })
        }
        else {
            TagElement::Tag(MetaTagElement { items: values, meta_type, exclude, span })
        }
    }
}
impl GeneratedByElement for MetaTagElementField {
    fn item_name(&self) -> &'static str {
        Self::ITEM_NAME
    }
    fn generate(&self, element: &Element, minus: bool) -> Result<JoinElement, SemanticError> {
        let values = element.items.iter().map(Self::map_sfp).collect::<Result<Vec<_>, _>>()?;
        let meta_type = element.prefix.map(|p| meta_type_of(p.value));
        let tag = Self::promote(values, meta_type, minus, element.span);
        if let Some(prefix) = element.prefix {
            let suitable = match meta_type_of(prefix.value) {
                MetaType::Author => matches!(tag, TagElement::Author(_)),
                MetaType::Topic => matches!(tag, TagElement::Author(_) | TagElement::Topic(_)),
                MetaType::Tag => true,
            };
            if !suitable {
                return Err(SemanticError::InvalidMetaTagForThisPrefix { prefix: prefix.value, span: element.span });
            }
        }
        Ok(JoinElement::Tag(tag))
    }
    fn forecast(&self, element: &Element, cursor: usize) -> Option<Forecast> {
        let sfp = element.items.iter().find(|sfp| sfp.span.contains(cursor))?;
        let subject = &sfp.subject.items;
        let (address, leaf) = match sfp.subject.segment_at(cursor) {
            Some(i) => (address_until(&subject[..=i], &[]), &subject[i]),
            None => {
                let leaf = sfp.predicative.as_ref()?.leaf_at(cursor)?;
                (address_until(subject, std::slice::from_ref(leaf)), leaf)
            }
        };
        Some(Forecast::MetaTag(ForecastMetaTagElement {
            address,
            meta_type: element.prefix.map(|p| meta_type_of(p.value)),
            begin: leaf.span.begin,
            end: leaf.span.end,
        }))
    }
}

// ------------- Source tag -------------
pub struct SourceTagElementField;
impl SourceTagElementField {
    const ITEM_NAME: &'static str = "source-tag";

    /// Subject and a `:` predicative joined into one address.
    fn map_sfp(sfp: &Sfp) -> Result<SimpleMetaValue, SemanticError> {
        let subject = sfp.subject.items.iter().map(MetaString::from);
        match (&sfp.family, &sfp.predicative) {
            (None, _) => Ok(SimpleMetaValue(subject.collect())),
            (Some(family), Some(predicative)) if family.relation == Relation::Is => match predicative {
                Predicative::StrList(list) => Ok(SimpleMetaValue(subject.chain(list.items.iter().map(MetaString::from)).collect())),
                other => Err(SemanticError::UnsupportedElementValueType {
                    item: Self::ITEM_NAME,
                    value_type: other.value_type(),
                    span: other.span(),
                }),
            },
            (Some(family), None) if !family.relation.is_unary() => {
                Err(value_required(Self::ITEM_NAME, sfp, family.relation, family.span))
            }
            (Some(family), _) => Err(SemanticError::UnsupportedElementRelationSymbol {
                item: Self::ITEM_NAME,
                relation: family.relation,
                span: family.span,
            }),
        }
    }
}
impl GeneratedByElement for SourceTagElementField {
    fn item_name(&self) -> &'static str {
        Self::ITEM_NAME
    }
    fn generate(&self, element: &Element, minus: bool) -> Result<JoinElement, SemanticError> {
        if element.prefix.is_some() {
            return Err(SemanticError::ElementPrefixNotRequired { item: Self::ITEM_NAME, span: element.span });
        }
        let items = element.items.iter().map(Self::map_sfp).collect::<Result<Vec<_>, _>>()?;
        Ok(JoinElement::SourceTag(SourceTagElement { items, exclude: minus, span: element.span }))
    }
    fn forecast(&self, element: &Element, cursor: usize) -> Option<Forecast> {
        let sfp = element.items.iter().find(|sfp| sfp.span.contains(cursor))?;
        let subject = &sfp.subject.items;
        let (address, leaf) = match sfp.subject.segment_at(cursor) {
            Some(i) => (address_until(&subject[..=i], &[]), &subject[i]),
            None => match (&sfp.family, &sfp.predicative) {
                (Some(family), Some(Predicative::StrList(list))) if family.relation == Relation::Is => {
                    let j = list.segment_at(cursor)?;
                    (address_until(subject, &list.items[..=j]), &list.items[j])
                }
                _ => return None,
            },
        };
        Some(Forecast::SourceTag(ForecastSourceTagElement {
            address,
            begin: leaf.span.begin,
            end: leaf.span.end,
        }))
    }
}

// ------------- Name -------------
pub struct NameFilterElementField;
impl NameFilterElementField {
    const ITEM_NAME: &'static str = "name";

    fn map_sfp(sfp: &Sfp) -> Result<MetaString, SemanticError> {
        if sfp.family.is_some() || sfp.predicative.is_some() {
            return Err(SemanticError::ElementValueNotRequired { item: Self::ITEM_NAME, span: sfp.span });
        }
        sfp.subject.single()
            .map(MetaString::from)
            .ok_or(SemanticError::ValueCannotBeAddress { span: sfp.subject.span })
    }
}
impl GeneratedByElement for NameFilterElementField {
    fn item_name(&self) -> &'static str {
        Self::ITEM_NAME
    }
    fn generate(&self, element: &Element, minus: bool) -> Result<JoinElement, SemanticError> {
        if element.prefix.is_some() {
            return Err(SemanticError::ElementPrefixNotRequired { item: Self::ITEM_NAME, span: element.span });
        }
        let items = element.items.iter().map(Self::map_sfp).collect::<Result<Vec<_>, _>>()?;
        Ok(JoinElement::Name(NameElementForMeta { items, exclude: minus, span: element.span }))
    }
}

// ------------- Annotations -------------
fn forecast_annotation(annotation: &Annotation, meta_type: Option<MetaType>, cursor: usize) -> Option<Forecast> {
    let leaf: &Str = annotation.items.iter().find(|s| s.span.contains(cursor))?;
    Some(Forecast::Annotation(ForecastAnnotationElement {
        value: MetaString::from(leaf),
        meta_type,
        begin: leaf.span.begin,
        end: leaf.span.end,
    }))
}

/// Annotations of illusts and books, optionally narrowed by a prefix.
pub struct AnnotationElementField;
impl GeneratedByAnnotation for AnnotationElementField {
    fn item_name(&self) -> &'static str {
        "annotation"
    }
    fn generate(&self, annotation: &Annotation, minus: bool) -> Result<JoinElement, SemanticError> {
        Ok(JoinElement::Annotation(AnnotationElement {
            items: annotation.items.iter().map(MetaString::from).collect(),
            meta_type: annotation.prefix.map(|p| meta_type_of(p.value)),
            exclude: minus,
            span: annotation.span,
        }))
    }
    fn forecast(&self, annotation: &Annotation, cursor: usize) -> Option<Forecast> {
        forecast_annotation(annotation, annotation.prefix.map(|p| meta_type_of(p.value)), cursor)
    }
}

/// Annotations of authors, topics and tags, which have no type to narrow.
pub struct MetaAnnotationElementField;
impl GeneratedByAnnotation for MetaAnnotationElementField {
    fn item_name(&self) -> &'static str {
        "annotation"
    }
    fn generate(&self, annotation: &Annotation, minus: bool) -> Result<JoinElement, SemanticError> {
        if annotation.prefix.is_some() {
            return Err(SemanticError::ElementPrefixNotRequired { item: self.item_name(), span: annotation.span });
        }
        Ok(JoinElement::MetaAnnotation(AnnotationElementForMeta {
            items: annotation.items.iter().map(MetaString::from).collect(),
            exclude: minus,
            span: annotation.span,
        }))
    }
    fn forecast(&self, annotation: &Annotation, cursor: usize) -> Option<Forecast> {
        forecast_annotation(annotation, None, cursor)
    }
}
