use super::*;

#[test]
fn cpp_keywords_are_not_keywords_in_c() {
    let c = DialectConfig::c();
    let cpp = DialectConfig::cpp();
    assert_eq!(keyword_kind("class", &cpp), Some(SyntaxKind::KwClass));
    assert_eq!(keyword_kind("class", &c), None);
    assert_eq!(keyword_kind("template", &c), None);
    assert_eq!(keyword_kind("int", &c), Some(SyntaxKind::KwInt));
}

#[test]
fn gnu_spellings_follow_the_extension_switch() {
    assert_eq!(keyword_kind("__attribute__", &DialectConfig::gnu_c()), Some(SyntaxKind::KwAttribute));
    assert_eq!(keyword_kind("__attribute__", &DialectConfig::c()), None);
    assert_eq!(keyword_kind("__inline__", &DialectConfig::gnu_cpp()), Some(SyntaxKind::KwInline));
    assert_eq!(keyword_kind("typeof", &DialectConfig::cpp()), None);
}

#[test]
fn c99_spellings_follow_the_c99_switch() {
    let c89 = DialectConfig {
        c99: false,
        ..DialectConfig::c()
    };
    assert_eq!(keyword_kind("_Complex", &DialectConfig::c()), Some(SyntaxKind::KwComplex));
    assert_eq!(keyword_kind("_Complex", &c89), None);
    assert_eq!(keyword_kind("restrict", &DialectConfig::cpp()), None);
    assert_eq!(keyword_kind("inline", &c89), None);
}

#[test]
fn keyword_listing_is_sorted() {
    let words = keywords(&DialectConfig::c());
    assert!(words.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(words.contains(&"while"));
    assert!(!words.contains(&"namespace"));
}

#[test]
fn precedence_orders_multiplicative_above_additive() {
    let star = binary_precedence(SyntaxKind::Star).unwrap();
    let plus = binary_precedence(SyntaxKind::Plus).unwrap();
    let less = binary_precedence(SyntaxKind::Less).unwrap();
    assert!(star > plus && plus > less);
    assert!(binary_precedence(SyntaxKind::Equal).is_none());
}
