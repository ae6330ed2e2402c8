use super::*;
use crate::pp::token::lex_file;
use crate::pp::trigraph::OffsetMap;
use crate::vfs::FileId;

fn eval(text: &str) -> Result<bool, String> {
    let tokens = lex_file(FileId::MAIN, text, &OffsetMap::default());
    evaluate(&tokens, false)
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(eval("1 + 2 * 3 == 7"), Ok(true));
    assert_eq!(eval("(1 + 2) * 3 == 7"), Ok(false));
    assert_eq!(eval("10 / 3 == 3 && 10 % 3 == 1"), Ok(true));
    assert_eq!(eval("1 << 4 == 16"), Ok(true));
    assert_eq!(eval("-1 < 0"), Ok(true));
}

#[test]
fn unsigned_arithmetic_follows_usual_conversions() {
    assert_eq!(eval("-1 < 0u"), Ok(false));
    assert_eq!(eval("0xffffffffffffffff > 0"), Ok(true));
}

#[test]
fn ternary_and_logical_operators() {
    assert_eq!(eval("0 ? 1 : 2"), Ok(true));
    assert_eq!(eval("1 ? 0 : 2"), Ok(false));
    assert_eq!(eval("!0 && (1 || 0)"), Ok(true));
    assert_eq!(eval("~0 == -1"), Ok(true));
}

#[test]
fn character_literals() {
    assert_eq!(eval("'a' == 97"), Ok(true));
    assert_eq!(eval("'\\n' == 10"), Ok(true));
    assert_eq!(eval("'\\x41' == 65"), Ok(true));
    assert_eq!(eval("'\\377' < 0"), Ok(true));
}

#[test]
fn literal_suffixes_and_radixes() {
    assert_eq!(eval("10UL == 10"), Ok(true));
    assert_eq!(eval("010 == 8"), Ok(true));
    assert_eq!(eval("0x10 == 16"), Ok(true));
}

#[test]
fn identifiers_evaluate_to_zero() {
    assert_eq!(eval("UNDEFINED"), Ok(false));
    assert_eq!(eval("UNDEFINED + 1"), Ok(true));
}

#[test]
fn true_is_one_only_in_cpp() {
    let tokens = lex_file(FileId::MAIN, "true", &OffsetMap::default());
    assert_eq!(evaluate(&tokens, true), Ok(true));
    assert_eq!(evaluate(&tokens, false), Ok(false));
}

#[test]
fn division_by_zero_is_an_error_only_when_evaluated() {
    assert!(eval("1 / 0").is_err());
    assert_eq!(eval("0 && 1 / 0"), Ok(false));
    assert_eq!(eval("1 || 1 % 0"), Ok(true));
    assert_eq!(eval("1 ? 2 : 1 / 0"), Ok(true));
}

#[test]
fn malformed_expressions_are_errors() {
    assert!(eval("").is_err());
    assert!(eval("1 +").is_err());
    assert!(eval("(1").is_err());
    assert!(eval("1 2").is_err());
    assert!(eval("1.5").is_err());
}
