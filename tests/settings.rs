use std::fs;
use std::path::PathBuf;

use hedge_compiler::{CompilerError, CompilerSettings};

fn setup(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hedge-compiler-{}-{}.toml", name, std::process::id()));
    fs::write(&path, content).expect("write settings");
    path
}

#[test]
fn defaults() {
    let settings = CompilerSettings::default();
    assert!(!settings.warnings_as_errors);
    assert_eq!(settings.log_filter, "info");
    assert_eq!(settings.default_descending("illust"), None);
}

#[test]
fn file_overrides() {
    let path = setup(
        "overrides",
        "warnings_as_errors = true\nlog_filter = \"hedge_compiler=debug\"\n\n[default_descending]\nillust = true\n",
    );
    let settings = CompilerSettings::load(Some(path.as_path())).expect("settings");
    fs::remove_file(&path).ok();
    assert!(settings.warnings_as_errors);
    assert_eq!(settings.log_filter, "hedge_compiler=debug");
    assert_eq!(settings.default_descending("illust"), Some(true));
    assert_eq!(settings.default_descending("book"), None);
}

#[test]
fn partial_file_keeps_defaults() {
    let path = setup("partial", "warnings_as_errors = true\n");
    let settings = CompilerSettings::load(Some(path.as_path())).expect("settings");
    fs::remove_file(&path).ok();
    assert!(settings.warnings_as_errors);
    assert_eq!(settings.log_filter, "info");
    assert!(settings.default_descending.is_empty());
}

#[test]
fn missing_explicit_file() {
    let path = std::env::temp_dir().join("hedge-compiler-does-not-exist.toml");
    match CompilerSettings::load(Some(path.as_path())) {
        Err(CompilerError::Config(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}
