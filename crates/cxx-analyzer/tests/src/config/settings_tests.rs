use serde_json::json;

use super::*;

#[test]
fn parses_namespaced_payload() {
    let payload = json!({
        "cxx-analyzer": {
            "dialect": {
                "language": "c",
                "gnuExtensions": false,
                "strictRecovery": true
            },
            "preprocessor": {
                "includePaths": ["/tmp/include", "  "],
                "defines": ["DEBUG=1", " NDEBUG "]
            },
            "limits": {
                "maxIncludeDepth": 16
            },
            "logging": {
                "level": "debug"
            }
        }
    });

    let settings = AnalyzerSettings::from_payload(Some(&payload));
    assert_eq!(settings.dialect.language, Language::C);
    assert!(!settings.dialect.gnu_extensions);
    assert!(settings.dialect.strict_recovery);
    assert_eq!(settings.preprocessor.include_paths, vec!["/tmp/include"]);
    assert_eq!(settings.preprocessor.defines, vec!["DEBUG=1", "NDEBUG"]);
    assert_eq!(settings.limits.max_include_depth, 16);
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn preset_is_applied_before_individual_switches() {
    let payload = json!({
        "dialect": {
            "preset": "c",
            "gnuExtensions": true
        }
    });

    let settings = AnalyzerSettings::from_payload(Some(&payload));
    assert_eq!(settings.dialect, DialectConfig::gnu_c());
}

#[test]
fn clamps_numeric_values() {
    let payload = json!({
        "limits": { "maxExpandedTokens": 1, "maxRecoveries": 0 },
        "threadPool": { "workerThreads": 1000 }
    });

    let settings = AnalyzerSettings::from_payload(Some(&payload));
    assert_eq!(settings.limits.max_expanded_tokens, MIN_EXPANDED_TOKENS);
    assert_eq!(settings.limits.max_recoveries, MIN_RECOVERIES);
    assert_eq!(settings.thread_pool.worker_threads, MAX_WORKER_THREADS);
}

#[test]
fn preserves_existing_values_when_payload_is_partial() {
    let base = AnalyzerSettings {
        preprocessor: PreprocessorSettings {
            include_paths: vec!["/opt/include".to_string()],
            ..PreprocessorSettings::default()
        },
        ..AnalyzerSettings::default()
    };
    let payload = json!({
        "dialect": {
            "digraphsTrigraphs": true
        }
    });

    let merged = base.merged_with_payload(&payload);
    assert_eq!(merged.preprocessor.include_paths, vec!["/opt/include"]);
    assert!(merged.dialect.digraphs_trigraphs);
}

#[test]
fn unknown_keys_are_ignored() {
    let payload = json!({
        "formatting": { "enable": false },
        "dialect": { "c99": false, "futureSwitch": 3 }
    });

    let settings = AnalyzerSettings::from_payload(Some(&payload));
    assert!(!settings.dialect.c99);
}

#[test]
fn toml_document_merges_like_json() {
    let content = r#"
[dialect]
preset = "gnu-c"

[preprocessor]
defines = ["VERSION=3"]

[threadPool]
workerThreads = 2
"#;

    let settings = AnalyzerSettings::default().merged_with_toml(content).unwrap();
    assert_eq!(settings.dialect.language, Language::C);
    assert!(settings.dialect.gnu_extensions);
    assert_eq!(settings.preprocessor.defines, vec!["VERSION=3"]);
    assert_eq!(settings.thread_pool.resolved_worker_threads(), 2);
}

#[test]
fn malformed_toml_is_an_error() {
    let err = AnalyzerSettings::default().merged_with_toml("[dialect\nlanguage = ").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn config_file_is_found_in_parent_directory() {
    let root = std::env::temp_dir().join(format!("cxx-analyzer-config-{}", std::process::id()));
    let nested = root.join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(root.join(CONFIG_FILENAME), "[limits]\nmaxIncludeDepth = 7\n").unwrap();

    let found = find_config_file(&nested).unwrap();
    assert_eq!(found, root.join(CONFIG_FILENAME));

    let settings = AnalyzerSettings::discover(&nested).unwrap();
    assert_eq!(settings.limits.max_include_depth, 7);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn markdown_lists_every_section() {
    let markdown = generate_configuration_markdown();
    for title in ["## Dialect", "## Preprocessor", "## Limits", "## Logging", "## Thread Pool"] {
        assert!(markdown.contains(title), "missing {title}");
    }
    assert!(generate_schema_properties().get("cxx-analyzer.dialect.gnuExtensions").is_some());
}
