//! The semantic engine: walks the items of a query, hands each to the
//! generator its dialect selects and gathers the results into a plan.
//!
//! Every item is analysed even when an earlier one failed, so a single run
//! reports all diagnostics of the query. A plan is only handed out when no
//! errors were found.

use serde::Serialize;
use tracing::{debug, trace};

use crate::ast::{Annotation, Element, SemanticRoot, SequenceBody, SequenceItem, Sfp};
use crate::datatype::FieldEnum;
use crate::dialect::{Dialect, Identify};
use crate::element::{GeneratedByAnnotation, GeneratedByElement};
use crate::error::{SemanticError, Structure};
use crate::field::GeneratedByIdentify;
use crate::forecast::Forecast;
use crate::plan::{QueryPlan, UnionFilters};
use crate::settings::CompilerSettings;
use crate::sort::SortDefinition;

/// The outcome of one compile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis<O: FieldEnum> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<QueryPlan<O>>,
    pub warnings: Vec<SemanticError>,
    pub errors: Vec<SemanticError>,
}
impl<O: FieldEnum> Analysis<O> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
    pub fn plan(&self) -> Option<&QueryPlan<O>> {
        self.plan.as_ref()
    }
    pub fn into_result(self) -> Result<QueryPlan<O>, Vec<SemanticError>> {
        match self.plan {
            Some(plan) if self.errors.is_empty() => Ok(plan),
            _ => Err(self.errors),
        }
    }
}

/// The generator an item is handed to.
enum Route<'d, 'a, O: FieldEnum> {
    Order(&'d SortDefinition<O>, &'a Sfp),
    Identifies(Vec<(&'d dyn GeneratedByIdentify, &'a Sfp)>),
    Element(&'d dyn GeneratedByElement, &'a Element),
    Annotation(&'d dyn GeneratedByAnnotation, &'a Annotation),
}

pub struct Engine<'d, O: FieldEnum> {
    dialect: &'d Dialect<O>,
    default_desc: bool,
    warnings_as_errors: bool,
}
impl<'d, O: FieldEnum> Engine<'d, O> {
    pub fn new(dialect: &'d Dialect<O>) -> Self {
        Self {
            dialect,
            default_desc: false,
            warnings_as_errors: false,
        }
    }
    pub fn with_settings(dialect: &'d Dialect<O>, settings: &CompilerSettings) -> Self {
        Self {
            dialect,
            default_desc: settings.default_descending(dialect.name()).unwrap_or(false),
            warnings_as_errors: settings.warnings_as_errors,
        }
    }

    fn route<'a>(&self, item: &'a SequenceItem) -> Result<Route<'d, 'a, O>, SemanticError> {
        let dialect = self.dialect;
        match &item.body {
            SequenceBody::Bracket(bracket) => Err(SemanticError::UnsupportedSemanticStructure {
                structure: Structure::Bracket,
                span: bracket.span,
            }),
            SequenceBody::Annotation(annotation) => {
                if item.source {
                    return Err(SemanticError::AnnotationCannotHaveSourceFlag { span: item.span });
                }
                match dialect.annotation() {
                    Some(generator) => Ok(Route::Annotation(generator, annotation)),
                    None => Err(SemanticError::UnsupportedSemanticStructure {
                        structure: Structure::Annotation,
                        span: annotation.span,
                    }),
                }
            }
            SequenceBody::Element(element) => {
                let mut identifies = Vec::with_capacity(element.items.len());
                for sfp in &element.items {
                    let identify = match (&element.prefix, sfp.subject.single()) {
                        (None, Some(keyword)) => dialect.identify(keyword, item.source)?,
                        _ => None,
                    };
                    identifies.push(identify);
                }
                if identifies.iter().all(Option::is_none) {
                    let (generator, structure) = if item.source {
                        (dialect.source_element(), Structure::ElementWithSource)
                    }
                    else {
                        (dialect.element(), Structure::Element)
                    };
                    return generator
                        .map(|g| Route::Element(g, element))
                        .ok_or(SemanticError::UnsupportedSemanticStructure { structure, span: element.span });
                }
                if identifies.iter().any(Option::is_none) {
                    return Err(SemanticError::IdentifiesAndElementsCannotBeMixed { span: element.span });
                }
                let mut fields = Vec::with_capacity(identifies.len());
                for (identify, sfp) in identifies.into_iter().flatten().zip(&element.items) {
                    match identify {
                        Identify::Order(sort) => {
                            if element.items.len() > 1 || item.minus || item.source {
                                return Err(SemanticError::SortIsIndependent { span: item.span });
                            }
                            return Ok(Route::Order(sort, sfp));
                        }
                        Identify::Field(field) => fields.push((field, sfp)),
                    }
                }
                Ok(Route::Identifies(fields))
            }
        }
    }

    pub fn compile(&self, root: &SemanticRoot) -> Analysis<O> {
        debug!(dialect = self.dialect.name(), items = root.items.len(), "compiling query");
        let mut plan = QueryPlan::new();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for item in &root.items {
            let route = match self.route(item) {
                Ok(route) => route,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            match route {
                Route::Order(sort, sfp) => match sort.generate(sfp, self.default_desc) {
                    Ok(orders) => {
                        for order in orders {
                            if plan.order_conditions.iter().any(|o| o.key == order.key) {
                                warnings.push(SemanticError::DuplicatedSortItem {
                                    value: order.key.name().to_string(),
                                    span: order.span,
                                });
                            }
                            else {
                                plan.order_conditions.push(order);
                            }
                        }
                    }
                    Err(e) => errors.push(e),
                },
                Route::Identifies(fields) => {
                    let mut filters = Vec::new();
                    let mut failed = false;
                    for (field, sfp) in fields {
                        trace!(field = field.key(), "generating filter");
                        match field.generate(sfp) {
                            Ok(mut generated) => filters.append(&mut generated),
                            Err(e) => {
                                errors.push(e);
                                failed = true;
                            }
                        }
                    }
                    if !failed && !filters.is_empty() {
                        plan.filters.push(UnionFilters { filters, exclude: item.minus });
                    }
                }
                Route::Element(generator, element) => {
                    trace!(element = generator.item_name(), "generating element");
                    match generator.generate(element, item.minus) {
                        Ok(join) => plan.join_elements.push(join),
                        Err(e) => errors.push(e),
                    }
                }
                Route::Annotation(generator, annotation) => match generator.generate(annotation, item.minus) {
                    Ok(join) => plan.join_elements.push(join),
                    Err(e) => errors.push(e),
                },
            }
        }
        if self.warnings_as_errors {
            errors.append(&mut warnings);
        }
        debug!(
            filters = plan.filters.len(),
            elements = plan.join_elements.len(),
            orders = plan.order_conditions.len(),
            warnings = warnings.len(),
            errors = errors.len(),
            "compile complete"
        );
        Analysis {
            plan: if errors.is_empty() { Some(plan) } else { None },
            warnings,
            errors,
        }
    }

    /// Suggestions for the token under `cursor`. An item that cannot be
    /// routed suggests nothing.
    pub fn forecast(&self, root: &SemanticRoot, cursor: usize) -> Option<Forecast> {
        let item = root.items.iter().find(|item| item.span.contains(cursor))?;
        let forecast = match self.route(item).ok()? {
            Route::Order(sort, sfp) => sort.forecast(sfp, cursor),
            Route::Identifies(fields) => fields.into_iter()
                .find(|(_, sfp)| sfp.span.contains(cursor))
                .and_then(|(field, sfp)| field.forecast(sfp, cursor)),
            Route::Element(generator, element) => generator.forecast(element, cursor),
            Route::Annotation(generator, annotation) => generator.forecast(annotation, cursor),
        };
        trace!(cursor, found = forecast.is_some(), "forecast");
        forecast
    }
}
