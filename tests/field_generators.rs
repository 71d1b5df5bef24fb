mod common;

use chrono::NaiveDate;

use common::{compile, error, errors, plan, token};
use hedge_compiler::ast::{Relation, Span, ValueType};
use hedge_compiler::datatype::{EnumValue, Value};
use hedge_compiler::dialect::ILLUST;
use hedge_compiler::plan::{Filter, FilterKind};
use hedge_compiler::SemanticError;

/// Filters of a query made of one item.
fn filters(text: &str) -> Vec<Filter> {
    let groups = plan(&ILLUST, text).filters;
    assert_eq!(groups.len(), 1, "one filter group for '{}'", text);
    groups.into_iter().next().map(|group| group.filters).unwrap_or_default()
}

fn kinds(text: &str) -> Vec<FilterKind> {
    filters(text).into_iter().map(|f| f.kind).collect()
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

fn range(begin: Option<Value>, end: Option<Value>, include_begin: bool, include_end: bool) -> FilterKind {
    FilterKind::Range { begin, end, include_begin, include_end }
}

#[test]
fn flag_alone() {
    let found = filters("favorite");
    assert_eq!(found, vec![Filter::flag("favorite", Span::new(0, 8))]);
    assert_eq!(kinds("f"), vec![FilterKind::Flag]);
}

#[test]
fn flag_rejects_value() {
    match error(&ILLUST, "favorite:yes") {
        SemanticError::FilterValueNotRequired { key, span } => {
            assert_eq!(key, "favorite");
            assert_eq!(span, Span::new(0, 12));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn equable_string() {
    assert_eq!(kinds("ext:jpg"), vec![FilterKind::Equal { values: vec![Value::String("jpg".into())] }]);
    assert_eq!(
        kinds("extension:{jpg, png}"),
        vec![FilterKind::Equal { values: vec![Value::String("jpg".into()), Value::String("png".into())] }]
    );
    match error(&ILLUST, "extension") {
        SemanticError::FilterValueRequired { key, span } => {
            assert_eq!(key, "extension");
            assert_eq!(span, Span::new(0, 9));
        }
        other => panic!("unexpected {:?}", other),
    }
    let text = "ext:[a, b]";
    match error(&ILLUST, text) {
        SemanticError::UnsupportedFilterValueType { value_type, span, .. } => {
            assert_eq!(value_type, ValueType::Range);
            assert_eq!(span, token(text, "[a, b]"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(error(&ILLUST, "ext:a.b"), SemanticError::ValueCannotBeAddress { .. }));
}

#[test]
fn relation_checked_before_value() {
    let text = "ext>";
    match error(&ILLUST, text) {
        SemanticError::UnsupportedFilterRelationSymbol { relation, span, .. } => {
            assert_eq!(relation, Relation::Greater);
            assert_eq!(span, token(text, ">"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_collection_yields_nothing() {
    assert!(plan(&ILLUST, "score:{}").filters.is_empty());
    assert_eq!(plan(&ILLUST, "ext:{} & favorite").filters.len(), 1);
}

#[test]
fn comparable_number() {
    assert_eq!(kinds("score:5"), vec![FilterKind::Equal { values: vec![Value::Number(5)] }]);
    assert_eq!(kinds("score>5"), vec![range(Some(Value::Number(5)), None, false, false)]);
    assert_eq!(kinds("s>=5"), vec![range(Some(Value::Number(5)), None, true, false)]);
    assert_eq!(kinds("s<5"), vec![range(None, Some(Value::Number(5)), false, false)]);
    assert_eq!(kinds("s<=5"), vec![range(None, Some(Value::Number(5)), false, true)]);
    assert_eq!(kinds("score:[1, 5)"), vec![range(Some(Value::Number(1)), Some(Value::Number(5)), true, false)]);
    assert_eq!(kinds("score:{1, 2}"), vec![FilterKind::Equal { values: vec![Value::Number(1), Value::Number(2)] }]);
}

#[test]
fn comparable_rejects_shapes() {
    match error(&ILLUST, "score>{1, 2}") {
        SemanticError::UnsupportedFilterValueTypeOfRelation { value_type, relation, .. } => {
            assert_eq!(value_type, ValueType::Collection);
            assert_eq!(relation, Relation::Greater);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        error(&ILLUST, "score~5"),
        SemanticError::UnsupportedFilterRelationSymbol { relation: Relation::To, .. }
    ));
    assert!(matches!(
        error(&ILLUST, "score:-id"),
        SemanticError::UnsupportedFilterValueType { value_type: ValueType::SortList, .. }
    ));
    assert!(matches!(error(&ILLUST, "score:high"), SemanticError::TypeCastError { .. }));
}

#[test]
fn nullable_score() {
    assert_eq!(filters("score"), vec![Filter::is_null("score", Span::new(0, 5))]);
}

#[test]
fn quantities() {
    assert_eq!(kinds("size>1mb"), vec![range(Some(Value::Size(1_000_000)), None, false, false)]);
    assert_eq!(kinds("res:1920x1080"), vec![FilterKind::Equal { values: vec![Value::Number(2_073_600)] }]);
    assert_eq!(kinds("duration<90s"), vec![range(None, Some(Value::Size(90_000)), false, false)]);
    assert_eq!(filters("ratio>=16/9").len(), 1);
}

#[test]
fn matchable_description() {
    assert_eq!(
        kinds("desc:sunset"),
        vec![FilterKind::Match { values: vec![Value::String("sunset".into())], exact: false }]
    );
    assert_eq!(kinds("desc:`sunset`"), vec![FilterKind::Equal { values: vec![Value::String("sunset".into())] }]);
    assert_eq!(
        kinds("desc:{`a`, b, c}"),
        vec![
            FilterKind::Equal { values: vec![Value::String("a".into())] },
            FilterKind::Match { values: vec![Value::String("b".into()), Value::String("c".into())], exact: false },
        ]
    );
    assert!(matches!(error(&ILLUST, "desc>a"), SemanticError::UnsupportedFilterRelationSymbol { .. }));
}

#[test]
fn number_patterns() {
    assert_eq!(kinds("id:7"), vec![FilterKind::Equal { values: vec![Value::Number(7)] }]);
    assert_eq!(kinds("id:12??"), vec![range(Some(Value::Number(1200)), Some(Value::Number(1300)), true, false)]);
    assert_eq!(kinds("id:1*2"), vec![FilterKind::Match { values: vec![Value::Pattern("1*2".into())], exact: true }]);
    assert_eq!(
        kinds("id:{1, 2, 3*, 4?}"),
        vec![
            FilterKind::Equal { values: vec![Value::Number(1), Value::Number(2)] },
            FilterKind::Match { values: vec![Value::Pattern("3*".into())], exact: true },
            range(Some(Value::Number(40)), Some(Value::Number(50)), true, false),
        ]
    );
    assert_eq!(kinds("id>100"), vec![range(Some(Value::Number(100)), None, false, false)]);
    let text = "id>1*";
    match error(&ILLUST, text) {
        SemanticError::ValueCannotBePatternInComparison { span } => assert_eq!(span, token(text, "1*")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn dates_compare_by_edges() {
    assert_eq!(kinds("pt:2020-03-15"), vec![FilterKind::Equal { values: vec![date(2020, 3, 15)] }]);
    assert_eq!(kinds("pt:2020"), vec![range(Some(date(2020, 1, 1)), Some(date(2021, 1, 1)), true, false)]);
    assert_eq!(kinds("pt>2020"), vec![range(Some(date(2021, 1, 1)), None, true, false)]);
    assert_eq!(kinds("pt>=2020"), vec![range(Some(date(2020, 1, 1)), None, true, false)]);
    assert_eq!(kinds("pt<2020-03"), vec![range(None, Some(date(2020, 3, 1)), false, false)]);
    assert_eq!(kinds("pt<=2020-03"), vec![range(None, Some(date(2020, 4, 1)), false, false)]);
    assert_eq!(kinds("pt:[2020, 2021]"), vec![range(Some(date(2020, 1, 1)), Some(date(2022, 1, 1)), true, false)]);
    assert_eq!(
        kinds("pt:{2020-01-02, 2021-05}"),
        vec![
            FilterKind::Equal { values: vec![date(2020, 1, 2)] },
            range(Some(date(2021, 5, 1)), Some(date(2021, 6, 1)), true, false),
        ]
    );
    assert!(matches!(error(&ILLUST, "create:someday"), SemanticError::TypeCastError { .. }));
}

#[test]
fn enums_and_compositions() {
    let image = Value::Enum(EnumValue { type_name: "ILLUST_TYPE", name: "image" });
    assert_eq!(kinds("type:img"), vec![FilterKind::Equal { values: vec![image] }]);
    assert!(matches!(error(&ILLUST, "type:gif"), SemanticError::EnumTypeCastError { .. }));

    assert_eq!(kinds("tagme"), vec![FilterKind::Composition { values: vec![] }]);
    assert_eq!(
        kinds("tagme:{tag, author}"),
        vec![FilterKind::Composition {
            values: vec![
                Value::Enum(EnumValue { type_name: "TAGME", name: "tag" }),
                Value::Enum(EnumValue { type_name: "TAGME", name: "author" }),
            ]
        }]
    );
    assert!(matches!(error(&ILLUST, "tagme:[tag, author]"), SemanticError::UnsupportedFilterValueType { .. }));
}

#[test]
fn source_flagged_keywords() {
    assert_eq!(filters("^page:3")[0].field, "source_page");
    assert_eq!(filters("^id:3")[0].field, "source_id");
    assert_eq!(filters("source-id:3")[0].field, "source_id");
    assert_eq!(filters("id:3")[0].field, "id");
    assert_eq!(filters("^pn:cover")[0].field, "source_page_name");
    match error(&ILLUST, "page:3") {
        SemanticError::ThisIdentifyMustHaveSourceFlag { identify, span } => {
            assert_eq!(identify, "page");
            assert_eq!(span, Span::new(0, 4));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(error(&ILLUST, "^score:3"), SemanticError::ThisIdentifyCannotHaveSourceFlag { .. }));
}

#[test]
fn alternatives_share_a_group() {
    let groups = plan(&ILLUST, "score:5|favorite -ext:gif").filters;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].filters.len(), 2);
    assert!(!groups[0].exclude);
    assert!(groups[1].exclude);
}

#[test]
fn errors_accumulate() {
    let analysis = compile(&ILLUST, "score:x extension favorite");
    assert!(analysis.plan.is_none());
    assert_eq!(analysis.errors.len(), 2);
    assert_eq!(analysis.errors[0].code(), 3019);
    assert_eq!(analysis.errors[1].code(), 3001);
    assert_eq!(errors(&ILLUST, "score:x|ext").len(), 2);
}
