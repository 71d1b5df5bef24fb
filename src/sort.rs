//! Sort lists: `order:-score,+id,^site` becomes a sequence of orders.
//!
//! Each dialect lists its sort keys with their aliases. Aliases starting with
//! `^` name the source-data variant of a key and are reached by `^` inside the
//! list. A bare token is a one item list.

use std::collections::HashMap;

use crate::ast::{Predicative, Relation, Sfp, SortItem, Span, Str};
use crate::datatype::FieldEnum;
use crate::error::SemanticError;
use crate::forecast::{Forecast, ForecastSort};
use crate::plan::Order;
use crate::OtherHasher;

/// The table key of an alias, `^` marking the source-data variant.
pub fn alias_key(name: &str, source: bool) -> String {
    if source {
        format!("^{}", name.to_lowercase())
    }
    else {
        name.to_lowercase()
    }
}

/// The sort keys of one dialect and the aliases they are known by.
pub struct SortDefinition<O: FieldEnum> {
    table: HashMap<String, O, OtherHasher>,
    groups: Vec<Vec<String>>,
}
impl<O: FieldEnum> SortDefinition<O> {
    pub fn builder() -> SortDefinitionBuilder<O> {
        SortDefinitionBuilder { groups: Vec::new() }
    }
    pub fn expected(&self) -> Vec<String> {
        self.groups.iter().flatten().cloned().collect()
    }
    pub fn resolve(&self, item: &SortItem) -> Result<O, SemanticError> {
        let key = alias_key(&item.value.value, item.source);
        self.table.get(&key).copied().ok_or_else(|| SemanticError::InvalidSortItem {
            value: key,
            expected: self.expected(),
            span: item.value.span,
        })
    }

    /// Orders in the written sequence. Items left without a direction take
    /// `default_desc`.
    pub fn generate(&self, sfp: &Sfp, default_desc: bool) -> Result<Vec<Order<O>>, SemanticError> {
        let (family, predicative) = match (&sfp.family, &sfp.predicative) {
            (Some(family), Some(predicative)) => (family, predicative),
            (family, _) => {
                let end = family.map(|f| f.span.end).unwrap_or(sfp.subject.span.end);
                return Err(SemanticError::SortValueRequired { span: Span::new(sfp.subject.span.begin, end) });
            }
        };
        if family.relation != Relation::Is {
            return Err(SemanticError::SortValueMustBeSortList { span: family.span });
        }
        let items = sort_items(predicative).ok_or(SemanticError::SortValueMustBeSortList { span: predicative.span() })?;
        items.iter()
            .map(|item| {
                let key = self.resolve(item)?;
                let desc = match item.direction {
                    d if d > 0 => false,
                    d if d < 0 => true,
                    _ => default_desc,
                };
                Ok(Order { key, desc, span: item.span })
            })
            .collect()
    }

    pub fn forecast(&self, sfp: &Sfp, cursor: usize) -> Option<Forecast> {
        let items = sort_items(sfp.predicative.as_ref()?)?;
        let item = items.iter().find(|item| item.span.contains(cursor))?;
        Some(Forecast::Sort(ForecastSort {
            value: item.value.value.clone(),
            candidates: self.groups.clone(),
            begin: item.value.span.begin,
            end: item.value.span.end,
        }))
    }
}

/// A lone restricted token reads as a one item sort list.
fn sort_items(predicative: &Predicative) -> Option<Vec<SortItem>> {
    match predicative {
        Predicative::SortList(list) => Some(list.items.clone()),
        Predicative::StrList(list) => list.single().map(|value: &Str| {
            vec![SortItem { value: value.clone(), source: false, direction: 0, span: value.span }]
        }),
        _ => None,
    }
}

pub struct SortDefinitionBuilder<O: FieldEnum> {
    groups: Vec<(O, Vec<String>)>,
}
impl<O: FieldEnum> SortDefinitionBuilder<O> {
    /// Aliases starting with `^` are reached only through a source flag.
    pub fn item(mut self, value: O, aliases: &[&str]) -> Self {
        let mut group: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let alias = alias.to_lowercase();
            if !group.contains(&alias) {
                group.push(alias);
            }
        }
        if group.is_empty() {
            group.push(value.name().to_lowercase());
        }
        self.groups.push((value, group));
        self
    }
    pub fn build(self) -> SortDefinition<O> {
        let mut table = HashMap::default();
        let mut groups = Vec::with_capacity(self.groups.len());
        for (value, aliases) in self.groups {
            for alias in &aliases {
                if table.insert(alias.clone(), value).is_some() {
                    tracing::warn!(alias = %alias, type_name = O::TYPE_NAME, "sort alias declared twice");
                }
            }
            groups.push(aliases);
        }
        SortDefinition { table, groups }
    }
}
