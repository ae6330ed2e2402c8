use std::hint::black_box;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use cxx_analyzer::config::{AnalyzerSettings, DialectConfig};
use cxx_analyzer::pp::preprocess;
use cxx_analyzer::{BatchParser, parse_text};

const UNITS: usize = 16;

fn macro_chain(depth: usize) -> String {
    let mut text = String::from("#define e0 a\n");
    for n in 1..=depth {
        let body = vec![format!("e{}", n - 1); 10].join(" ");
        text.push_str(&format!("#define e{n} {body}\n"));
    }
    text.push_str(&format!("e{depth}\n"));
    text
}

fn translation_unit(index: usize) -> String {
    format!(
        r#"
#define FIELD(type, name) type name;
#define SQUARE(x) ((x) * (x))
namespace unit{index} {{
    struct Record {{ FIELD(int, id) FIELD(double, weight) FIELD(char*, label) }};
    template<class T> T clamp(T value, T low, T high) {{
        return value < low ? low : (high < value ? high : value);
    }}
    int score(const Record& record) {{
        int total = 0;
        for (int i = 0; i < record.id; ++i) {{
            total += SQUARE(i);
        }}
        return clamp(total, 0, 1000);
    }}
}}
"#
    )
}

fn bench_macro_expansion(c: &mut Criterion) {
    let dialect = DialectConfig::default();
    let chain4 = macro_chain(4);
    let chain5 = macro_chain(5);

    c.bench_function("macro_expansion/chain_10k_tokens", |b| {
        b.iter(|| black_box(preprocess(black_box(&chain4), &dialect).tokens.len()))
    });

    let mut group = c.benchmark_group("macro_expansion/chain_100k_tokens");
    group.sample_size(10);
    group.bench_function("preprocess", |b| {
        b.iter(|| black_box(preprocess(black_box(&chain5), &dialect).tokens.len()))
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let dialect = DialectConfig::cpp();
    let unit = translation_unit(0);
    c.bench_function("parse/single_unit", |b| {
        b.iter(|| black_box(parse_text(black_box(&unit), &dialect).map(|parse| parse.has_errors())))
    });

    let sources: Vec<(PathBuf, String)> =
        (0..UNITS).map(|index| (PathBuf::from(format!("unit{index}.cpp")), translation_unit(index))).collect();

    let mut sequential = AnalyzerSettings::default();
    sequential.thread_pool.worker_threads = 1;
    let sequential = BatchParser::new(sequential);
    c.bench_function("parse/batch_sequential", |b| b.iter(|| black_box(sequential.parse_sources(&sources).len())));

    let parallel = BatchParser::new(AnalyzerSettings::default());
    c.bench_function("parse/batch_parallel", |b| b.iter(|| black_box(parallel.parse_sources(&sources).len())));
}

criterion_group!(benches, bench_macro_expansion, bench_parse);
criterion_main!(benches);
