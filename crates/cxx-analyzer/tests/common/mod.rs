#![allow(dead_code)]

use std::path::PathBuf;

/// Removes the `$0` caret marker and returns the text with its byte offset.
pub fn caret(marked: &str) -> (String, usize) {
    let offset = marked.find("$0").expect("marked text has a $0 caret");
    (marked.replacen("$0", "", 1), offset)
}

/// Byte span of the `nth` occurrence of `needle`.
pub fn span_of_nth(
    source: &str,
    needle: &str,
    nth: usize,
) -> (usize, usize) {
    assert!(!needle.is_empty(), "needle must not be empty");
    let start = source
        .match_indices(needle)
        .nth(nth)
        .map(|(start, _)| start)
        .unwrap_or_else(|| panic!("occurrence {nth} of {needle:?} not found"));
    (start, start + needle.len())
}

pub fn span_of(
    source: &str,
    needle: &str,
) -> (usize, usize) {
    span_of_nth(source, needle, 0)
}

/// `e0` expands to `a` and every `eN` to ten copies of `e(N-1)`; invoking
/// `e{depth}` yields `10^depth` tokens.
pub fn macro_chain(depth: usize) -> String {
    let mut text = String::from("#define e0 a\n");
    for n in 1..=depth {
        let body = vec![format!("e{}", n - 1); 10].join(" ");
        text.push_str(&format!("#define e{n} {body}\n"));
    }
    text.push_str(&format!("e{depth}\n"));
    text
}

pub fn unique_temp_dir(name: &str) -> PathBuf {
    let nonce = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).expect("valid clock").as_nanos();
    let dir = std::env::temp_dir().join(format!("cxx-analyzer-{name}-{}-{nonce}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}
