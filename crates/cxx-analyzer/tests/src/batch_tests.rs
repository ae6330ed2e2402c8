use super::*;
use crate::config::DialectConfig;
use crate::diagnostics::ErrorKind;

fn unique_temp_dir(name: &str) -> PathBuf {
    let nonce = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).expect("valid clock").as_nanos();
    let dir = std::env::temp_dir().join(format!("cxx-analyzer-batch-{name}-{}-{nonce}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

fn parser_with_threads(threads: usize) -> BatchParser {
    let mut settings = AnalyzerSettings::default();
    settings.thread_pool.worker_threads = threads;
    BatchParser::new(settings)
}

#[test]
fn units_parse_concurrently_and_keep_their_order() {
    let batch = parser_with_threads(4);
    let sources: Vec<(PathBuf, String)> =
        (0..8).map(|i| (PathBuf::from(format!("unit{i}.c")), format!("int f{i}(void);\n#define LOCAL {i}\n"))).collect();
    let outcomes = batch.parse_sources(&sources);

    let paths: Vec<&PathBuf> = outcomes.iter().map(|outcome| &outcome.path).collect();
    let expected: Vec<&PathBuf> = sources.iter().map(|(path, _)| path).collect();
    assert_eq!(paths, expected);
    assert!(outcomes.iter().all(BatchOutcome::is_ok));
    assert_eq!(batch.len(), 8);

    // Each unit has its own macro table.
    let third = batch.get(Path::new("unit3.c")).unwrap();
    assert!(!third.has_errors());
    let local = third.macros().get("LOCAL").unwrap();
    assert_eq!(local.replacement[0].text.as_ref(), "3");
}

#[test]
fn strict_failures_are_reported_and_not_stored() {
    let mut settings = AnalyzerSettings::default();
    settings.dialect = DialectConfig::cpp().strict();
    let batch = BatchParser::new(settings);
    let outcomes = batch.parse_sources(&[
        (PathBuf::from("good.cpp"), "int a;".to_string()),
        (PathBuf::from("bad.cpp"), "int x = ;".to_string()),
    ]);
    assert!(outcomes[0].is_ok());
    match &outcomes[1].result {
        Err(BatchError::Parse {
            failure,
            ..
        }) => assert_eq!(failure.kind(), ErrorKind::Syntax),
        other => panic!("expected a parse failure, got {other:?}"),
    }
    assert_eq!(batch.paths(), vec![PathBuf::from("good.cpp")]);
}

#[test]
fn files_are_read_and_includes_resolved_next_to_them() {
    let dir = unique_temp_dir("files");
    std::fs::write(dir.join("shared.h"), "int from_header;\n").expect("write header");
    std::fs::write(dir.join("main.c"), "#include \"shared.h\"\nint local;\n").expect("write source");

    let batch = parser_with_threads(2);
    let outcomes = batch.parse_files(&[dir.join("main.c"), dir.join("missing.c")]);
    let parse = outcomes[0].result.as_ref().unwrap();
    assert!(!parse.has_errors());
    assert_eq!(parse.sources().len(), 2);
    assert!(matches!(outcomes[1].result, Err(BatchError::Io { .. })));

    assert!(batch.remove(&dir.join("main.c")).is_some());
    assert!(batch.is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn command_line_definitions_reach_every_unit() {
    let mut settings = AnalyzerSettings::default();
    settings.preprocessor.defines = vec!["N=3".to_string(), "GONE".to_string()];
    settings.preprocessor.undefines = vec!["GONE".to_string()];
    let batch = BatchParser::new(settings);
    let parse = batch.parse_source(Path::new("sized.c"), "int a[N];\n#ifdef GONE\nint gone;\n#endif\n").unwrap();
    assert!(!parse.has_errors());
    assert!(parse.macros().contains("N"));
    assert!(!parse.macros().contains("GONE"));
    assert_eq!(parse.tree().unwrap().declarations().count(), 1);
}

#[test]
fn source_files_skip_hidden_and_build_directories() {
    let dir = unique_temp_dir("walk");
    for file in ["main.c", "sub/widget.hpp", ".hidden/secret.c", "build/generated.c", "notes.txt"] {
        let path = dir.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).expect("create dir");
        std::fs::write(&path, "").expect("write file");
    }
    assert_eq!(source_files(&dir), vec![dir.join("main.c"), dir.join("sub/widget.hpp")]);
    assert_eq!(source_files(&dir.join("main.c")), vec![dir.join("main.c")]);
    std::fs::remove_dir_all(&dir).ok();
}
