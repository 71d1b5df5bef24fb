mod common;

use std::collections::HashMap;

use common::{compile, error, parse, plan, token};
use hedge_compiler::ast::Span;
use hedge_compiler::dialect::{IllustOrder, SourceOrder, AUTHOR, ILLUST, SOURCE_DATA, MetaOrder};
use hedge_compiler::{CompilerSettings, Engine, SemanticError};

fn orders(text: &str) -> Vec<(IllustOrder, bool)> {
    plan(&ILLUST, text).order_conditions.into_iter().map(|o| (o.key, o.desc)).collect()
}

#[test]
fn directions() {
    assert_eq!(orders("order:score"), vec![(IllustOrder::Score, false)]);
    assert_eq!(
        orders("order:-score,+id,ct"),
        vec![(IllustOrder::Score, true), (IllustOrder::Id, false), (IllustOrder::CreateTime, false)]
    );
    assert_eq!(orders("sort:-S"), vec![(IllustOrder::Score, true)]);
}

#[test]
fn source_variants() {
    assert_eq!(orders("order:^id,-^site"), vec![(IllustOrder::SourceId, false), (IllustOrder::SourceSite, true)]);
    assert_eq!(orders("order:source-id"), vec![(IllustOrder::SourceId, false)]);
    let keys: Vec<SourceOrder> = plan(&SOURCE_DATA, "order:^id,update")
        .order_conditions
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(keys, vec![SourceOrder::SourceId, SourceOrder::UpdateTime]);
}

#[test]
fn order_spans() {
    let text = "favorite order:-score,id";
    let plan = common::plan(&ILLUST, text);
    assert_eq!(plan.order_conditions[0].span, token(text, "-score"));
    assert_eq!(plan.order_conditions[1].span, Span::new(22, 24));
}

#[test]
fn unknown_items() {
    let text = "order:-bogus";
    match error(&ILLUST, text) {
        SemanticError::InvalidSortItem { value, expected, span } => {
            assert_eq!(value, "bogus");
            assert!(expected.contains(&"score".to_string()));
            assert!(expected.contains(&"^id".to_string()));
            assert_eq!(span, token(text, "bogus"));
        }
        other => panic!("unexpected {:?}", other),
    }
    match error(&ILLUST, "order:^score") {
        SemanticError::InvalidSortItem { value, .. } => assert_eq!(value, "^score"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn value_shapes() {
    match error(&ILLUST, "order") {
        SemanticError::SortValueRequired { span } => assert_eq!(span, Span::new(0, 5)),
        other => panic!("unexpected {:?}", other),
    }
    let text = "order>score";
    match error(&ILLUST, text) {
        SemanticError::SortValueMustBeSortList { span } => assert_eq!(span, token(text, ">")),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(error(&ILLUST, "order:{score}"), SemanticError::SortValueMustBeSortList { .. }));
    assert!(matches!(error(&ILLUST, "order:a.b"), SemanticError::SortValueMustBeSortList { .. }));
}

#[test]
fn sort_stands_alone() {
    for text in ["-order:score", "^order:score", "order:score|favorite", "favorite|order:score"] {
        assert!(
            matches!(error(&ILLUST, text), SemanticError::SortIsIndependent { .. }),
            "'{}' should be rejected",
            text
        );
    }
}

#[test]
fn duplicates_warn() {
    let analysis = compile(&ILLUST, "order:score order:-s,id");
    assert!(analysis.errors.is_empty());
    assert_eq!(analysis.warnings.len(), 1);
    assert_eq!(analysis.warnings[0].code(), 3016);
    let orders: Vec<_> = analysis.plan.expect("plan").order_conditions.into_iter().map(|o| (o.key, o.desc)).collect();
    assert_eq!(orders, vec![(IllustOrder::Score, false), (IllustOrder::Id, false)]);

    let settings = CompilerSettings { warnings_as_errors: true, ..CompilerSettings::default() };
    let analysis = Engine::with_settings(&ILLUST, &settings).compile(&parse("order:score,score"));
    assert!(analysis.plan.is_none());
    assert_eq!(analysis.errors.len(), 1);
    assert!(analysis.warnings.is_empty());
}

#[test]
fn default_direction_from_settings() {
    let settings = CompilerSettings {
        default_descending: HashMap::from([("author".to_string(), true)]),
        ..CompilerSettings::default()
    };
    let analysis = Engine::with_settings(&AUTHOR, &settings).compile(&parse("order:name,+count"));
    let orders: Vec<_> = analysis.plan.expect("plan").order_conditions.into_iter().map(|o| (o.key, o.desc)).collect();
    assert_eq!(orders, vec![(MetaOrder::Name, true), (MetaOrder::Count, false)]);

    let analysis = Engine::with_settings(&ILLUST, &settings).compile(&parse("order:id"));
    assert_eq!(analysis.plan.expect("plan").order_conditions[0].desc, false);
}
