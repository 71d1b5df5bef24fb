use chrono::{Datelike, Local, NaiveDate};

use hedge_compiler::ast::{Span, Str, StrType};
use hedge_compiler::datatype::{Decimal, FilterDateValue, FilterPatternNumberValue};
use hedge_compiler::dialect::{IllustType, SourceStatus};
use hedge_compiler::error::CastType;
use hedge_compiler::parser::*;
use hedge_compiler::SemanticError;

fn token(value: &str) -> Str {
    Str::new(value, StrType::Restricted, Span::new(0, value.len()))
}

fn date(y: i32, m: u32, d: u32) -> FilterDateValue {
    FilterDateValue(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

#[test]
fn numbers_and_products() {
    assert_eq!(NumberParser.parse(&token("42")).expect("number").0, 42);
    assert_eq!(TimesNumberParser.parse(&token("1920x1080")).expect("product").0, 1920 * 1080);
    assert_eq!(TimesNumberParser.parse(&token("3X4")).expect("product").0, 12);
    assert_eq!(TimesNumberParser.parse(&token("7")).expect("plain").0, 7);
    match NumberParser.parse(&token("4k")) {
        Err(SemanticError::TypeCastError { cast, span, .. }) => {
            assert_eq!(cast, CastType::Number);
            assert_eq!(span, Span::new(0, 2));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn ratios() {
    let half = Decimal::from_str("1.5").expect("decimal");
    assert_eq!(RatioParser.parse(&token("3/2")).expect("ratio").0, half);
    assert_eq!(RatioParser.parse(&token("1.5")).expect("decimal").0, half);
    assert!(matches!(
        RatioParser.parse(&token("3/0")),
        Err(SemanticError::TypeCastError { cast: CastType::Ratio, .. })
    ));
}

#[test]
fn sizes_and_durations() {
    assert_eq!(SizeParser.parse(&token("2KB")).expect("size").0, 2_000);
    assert_eq!(SizeParser.parse(&token("2kib")).expect("size").0, 2_048);
    assert_eq!(SizeParser.parse(&token("1m")).expect("size").0, 1_000_000);
    assert!(SizeParser.parse(&token("12")).is_err());
    assert_eq!(DurationParser.parse(&token("90s")).expect("duration").0, 90_000);
    assert_eq!(DurationParser.parse(&token("2min")).expect("duration").0, 120_000);
    assert!(matches!(
        DurationParser.parse(&token("3days")),
        Err(SemanticError::TypeCastError { cast: CastType::Duration, .. })
    ));
}

#[test]
fn dates_widen_by_precision() {
    let year = Local::now().year();
    assert_eq!(DateParser.parse(&token("2020-03-15")).expect("day"), Complex::Value(date(2020, 3, 15)));
    assert_eq!(DateParser.parse(&token("2020/3")).expect("month"), Complex::Range(date(2020, 3, 1), date(2020, 4, 1)));
    assert_eq!(DateParser.parse(&token("2020-12")).expect("december"), Complex::Range(date(2020, 12, 1), date(2021, 1, 1)));
    assert_eq!(DateParser.parse(&token("2020")).expect("year"), Complex::Range(date(2020, 1, 1), date(2021, 1, 1)));
    assert_eq!(DateParser.parse(&token("3-15")).expect("this year"), Complex::Value(date(year, 3, 15)));
    assert_eq!(DateParser.parse(&token("6")).expect("month of this year"), Complex::Range(date(year, 6, 1), date(year, 7, 1)));
    for invalid in ["2020-02-30", "2020-13", "yesterday", "13"] {
        assert!(
            matches!(DateParser.parse(&token(invalid)), Err(SemanticError::TypeCastError { cast: CastType::Date, .. })),
            "{} should not be a date",
            invalid
        );
    }
}

#[test]
fn number_patterns() {
    assert_eq!(
        PatternNumberParser.parse(&token("12??")).expect("range"),
        Complex::Range(FilterPatternNumberValue::Number(1200), FilterPatternNumberValue::Number(1300))
    );
    assert_eq!(
        PatternNumberParser.parse(&token("1*2")).expect("pattern"),
        Complex::Value(FilterPatternNumberValue::Pattern("1*2".to_string()))
    );
    assert_eq!(
        PatternNumberParser.parse(&token("?3")).expect("pattern"),
        Complex::Value(FilterPatternNumberValue::Pattern("?3".to_string()))
    );
    assert_eq!(
        PatternNumberParser.parse(&token("15")).expect("number"),
        Complex::Value(FilterPatternNumberValue::Number(15))
    );
    assert!(PatternNumberParser.parse(&token("1a")).is_err());
}

#[test]
fn only_ascii_digits_count() {
    for arabic in ["\u{0661}*", "\u{0661}\u{0662}??", "\u{0661}"] {
        assert!(
            matches!(
                PatternNumberParser.parse(&token(arabic)),
                Err(SemanticError::TypeCastError { cast: CastType::Number, .. })
            ),
            "{} should not be a number pattern",
            arabic
        );
    }
    assert!(SizeParser.parse(&token("\u{0662}KB")).is_err());
    assert!(DurationParser.parse(&token("\u{0669}0s")).is_err());
}

#[test]
fn enum_aliases_ignore_case() {
    let parser = EnumParser::builder()
        .item(IllustType::Image, &["img", "picture"])
        .item(IllustType::Video, &["vid"])
        .build();
    assert_eq!(parser.parse(&token("IMG")).expect("alias").0, IllustType::Image);
    assert_eq!(parser.parse(&token("Video")).expect("name").0, IllustType::Video);
    assert_eq!(
        parser.enums(),
        Some(vec![
            vec!["image".to_string(), "img".to_string(), "picture".to_string()],
            vec!["video".to_string(), "vid".to_string()],
        ])
    );
    match parser.parse(&token("gif")) {
        Err(SemanticError::EnumTypeCastError { value, type_name, expected, .. }) => {
            assert_eq!(value, "gif");
            assert_eq!(type_name, "ILLUST_TYPE");
            assert_eq!(expected, vec!["image", "img", "picture", "video", "vid"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn enum_names_only() {
    let parser = EnumParser::<SourceStatus>::names();
    assert_eq!(parser.parse(&token("not-edited")).expect("name").0, SourceStatus::NotEdited);
    assert!(parser.parse(&token("new")).is_err());
}
