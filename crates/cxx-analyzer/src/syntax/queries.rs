use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::DialectConfig;
use crate::syntax::kind::SyntaxKind;

/// Which dialects recognise a keyword spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Always,
    Cpp,
    C,
    /// C with the C99 switch, or any GNU dialect.
    C99OrGnu,
    /// C99 C or C++.
    C99OrCpp,
    /// C++ or any GNU dialect.
    CppOrGnu,
    Gnu,
}

impl Availability {
    fn enabled(
        self,
        dialect: &DialectConfig,
    ) -> bool {
        match self {
            Availability::Always => true,
            Availability::Cpp => dialect.is_cpp(),
            Availability::C => dialect.is_c(),
            Availability::C99OrGnu => (dialect.is_c() && dialect.c99) || dialect.gnu_extensions,
            Availability::C99OrCpp => dialect.is_cpp() || dialect.c99,
            Availability::CppOrGnu => dialect.is_cpp() || dialect.gnu_extensions,
            Availability::Gnu => dialect.gnu_extensions,
        }
    }
}

/// Immutable keyword table shared by every parse.
static KEYWORDS: Lazy<HashMap<&'static str, (SyntaxKind, Availability)>> = Lazy::new(|| {
    use Availability::*;
    use SyntaxKind::*;

    let entries: &[(&str, SyntaxKind, Availability)] = &[
        ("auto", KwAuto, Always),
        ("break", KwBreak, Always),
        ("case", KwCase, Always),
        ("char", KwChar, Always),
        ("const", KwConst, Always),
        ("continue", KwContinue, Always),
        ("default", KwDefault, Always),
        ("do", KwDo, Always),
        ("double", KwDouble, Always),
        ("else", KwElse, Always),
        ("enum", KwEnum, Always),
        ("extern", KwExtern, Always),
        ("float", KwFloat, Always),
        ("for", KwFor, Always),
        ("goto", KwGoto, Always),
        ("if", KwIf, Always),
        ("inline", KwInline, C99OrCpp),
        ("int", KwInt, Always),
        ("long", KwLong, Always),
        ("register", KwRegister, Always),
        ("return", KwReturn, Always),
        ("short", KwShort, Always),
        ("signed", KwSigned, Always),
        ("sizeof", KwSizeof, Always),
        ("static", KwStatic, Always),
        ("struct", KwStruct, Always),
        ("switch", KwSwitch, Always),
        ("typedef", KwTypedef, Always),
        ("union", KwUnion, Always),
        ("unsigned", KwUnsigned, Always),
        ("void", KwVoid, Always),
        ("volatile", KwVolatile, Always),
        ("while", KwWhile, Always),
        // C99 / C11
        ("restrict", KwRestrict, C99OrGnu),
        ("_Bool", KwBool, C),
        ("_Complex", KwComplex, C99OrGnu),
        ("_Imaginary", KwImaginary, C99OrGnu),
        ("_Static_assert", KwStaticAssert, C),
        ("_Noreturn", KwNoreturn, C),
        ("_Alignof", KwAlignof, C),
        ("_Thread_local", KwThreadLocal, C),
        // C++
        ("alignas", KwAlignas, Cpp),
        ("alignof", KwAlignof, Cpp),
        ("asm", KwAsm, CppOrGnu),
        ("bool", KwBool, Cpp),
        ("catch", KwCatch, Cpp),
        ("char16_t", KwChar16, Cpp),
        ("char32_t", KwChar32, Cpp),
        ("class", KwClass, Cpp),
        ("const_cast", KwConstCast, Cpp),
        ("constexpr", KwConstexpr, Cpp),
        ("decltype", KwDecltype, Cpp),
        ("delete", KwDelete, Cpp),
        ("dynamic_cast", KwDynamicCast, Cpp),
        ("explicit", KwExplicit, Cpp),
        ("export", KwExport, Cpp),
        ("false", KwFalse, Cpp),
        ("friend", KwFriend, Cpp),
        ("mutable", KwMutable, Cpp),
        ("namespace", KwNamespace, Cpp),
        ("new", KwNew, Cpp),
        ("noexcept", KwNoexcept, Cpp),
        ("nullptr", KwNullptr, Cpp),
        ("operator", KwOperator, Cpp),
        ("private", KwPrivate, Cpp),
        ("protected", KwProtected, Cpp),
        ("public", KwPublic, Cpp),
        ("reinterpret_cast", KwReinterpretCast, Cpp),
        ("static_assert", KwStaticAssert, Cpp),
        ("static_cast", KwStaticCast, Cpp),
        ("template", KwTemplate, Cpp),
        ("this", KwThis, Cpp),
        ("thread_local", KwThreadLocal, Cpp),
        ("throw", KwThrow, Cpp),
        ("true", KwTrue, Cpp),
        ("try", KwTry, Cpp),
        ("typeid", KwTypeid, Cpp),
        ("typename", KwTypename, Cpp),
        ("using", KwUsing, Cpp),
        ("virtual", KwVirtual, Cpp),
        ("wchar_t", KwWchar, Cpp),
        // GNU spellings
        ("__attribute__", KwAttribute, Gnu),
        ("__attribute", KwAttribute, Gnu),
        ("typeof", KwTypeof, Gnu),
        ("__typeof__", KwTypeof, Gnu),
        ("__typeof", KwTypeof, Gnu),
        ("__extension__", KwExtension, Gnu),
        ("__label__", KwLabel, Gnu),
        ("__asm__", KwAsm, Gnu),
        ("__asm", KwAsm, Gnu),
        ("__inline__", KwInline, Gnu),
        ("__inline", KwInline, Gnu),
        ("__const__", KwConst, Gnu),
        ("__const", KwConst, Gnu),
        ("__volatile__", KwVolatile, Gnu),
        ("__volatile", KwVolatile, Gnu),
        ("__restrict__", KwRestrict, Gnu),
        ("__restrict", KwRestrict, Gnu),
        ("__signed__", KwSigned, Gnu),
        ("__signed", KwSigned, Gnu),
        ("__alignof__", KwAlignof, Gnu),
        ("__alignof", KwAlignof, Gnu),
        ("__complex__", KwComplex, Gnu),
        ("__thread", KwThreadLocal, Gnu),
    ];

    entries.iter().map(|&(text, kind, availability)| (text, (kind, availability))).collect()
});

/// Keyword kind of an identifier spelling under `dialect`.
pub fn keyword_kind(
    text: &str,
    dialect: &DialectConfig,
) -> Option<SyntaxKind> {
    let &(kind, availability) = KEYWORDS.get(text)?;
    availability.enabled(dialect).then_some(kind)
}

/// Every spelling that is a keyword under `dialect`.
pub fn keywords(dialect: &DialectConfig) -> Vec<&'static str> {
    let mut words: Vec<_> =
        KEYWORDS.iter().filter(|(_, (_, availability))| availability.enabled(dialect)).map(|(text, _)| *text).collect();
    words.sort_unstable();
    words
}

/// Keywords that name (part of) a fundamental type.
pub fn is_builtin_type_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::KwVoid
            | SyntaxKind::KwBool
            | SyntaxKind::KwChar
            | SyntaxKind::KwChar16
            | SyntaxKind::KwChar32
            | SyntaxKind::KwWchar
            | SyntaxKind::KwShort
            | SyntaxKind::KwInt
            | SyntaxKind::KwLong
            | SyntaxKind::KwFloat
            | SyntaxKind::KwDouble
            | SyntaxKind::KwSigned
            | SyntaxKind::KwUnsigned
            | SyntaxKind::KwComplex
            | SyntaxKind::KwImaginary
            | SyntaxKind::KwAuto
    )
}

pub fn is_cv_qualifier(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::KwConst | SyntaxKind::KwVolatile | SyntaxKind::KwRestrict)
}

pub fn is_storage_class(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::KwStatic
            | SyntaxKind::KwExtern
            | SyntaxKind::KwRegister
            | SyntaxKind::KwMutable
            | SyntaxKind::KwThreadLocal
            | SyntaxKind::KwTypedef
    )
}

pub fn is_function_specifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::KwInline
            | SyntaxKind::KwVirtual
            | SyntaxKind::KwExplicit
            | SyntaxKind::KwFriend
            | SyntaxKind::KwConstexpr
            | SyntaxKind::KwNoreturn
    )
}

/// Keywords that can only begin a declaration specifier sequence.
pub fn starts_decl_specifier(kind: SyntaxKind) -> bool {
    is_builtin_type_keyword(kind)
        || is_cv_qualifier(kind)
        || is_storage_class(kind)
        || is_function_specifier(kind)
        || matches!(
            kind,
            SyntaxKind::KwStruct
                | SyntaxKind::KwClass
                | SyntaxKind::KwUnion
                | SyntaxKind::KwEnum
                | SyntaxKind::KwTypename
                | SyntaxKind::KwTypeof
                | SyntaxKind::KwDecltype
                | SyntaxKind::KwAttribute
                | SyntaxKind::KwAlignas
                | SyntaxKind::KwExtension
        )
}

pub fn is_assignment_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Equal
            | SyntaxKind::PlusEqual
            | SyntaxKind::MinusEqual
            | SyntaxKind::StarEqual
            | SyntaxKind::SlashEqual
            | SyntaxKind::PercentEqual
            | SyntaxKind::CaretEqual
            | SyntaxKind::AmpEqual
            | SyntaxKind::PipeEqual
            | SyntaxKind::LeftShiftEqual
            | SyntaxKind::RightShiftEqual
    )
}

/// Binding power of binary operators, loosest first. Assignment and the
/// conditional operator are handled separately by the expression grammar.
pub fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
    let precedence = match kind {
        SyntaxKind::OrOr => 1,
        SyntaxKind::AndAnd => 2,
        SyntaxKind::Pipe => 3,
        SyntaxKind::Caret => 4,
        SyntaxKind::Amp => 5,
        SyntaxKind::EqualEqual | SyntaxKind::NotEqual => 6,
        SyntaxKind::Less
        | SyntaxKind::Greater
        | SyntaxKind::LessEqual
        | SyntaxKind::GreaterEqual
        | SyntaxKind::Min
        | SyntaxKind::Max => 7,
        SyntaxKind::LeftShift | SyntaxKind::RightShift => 8,
        SyntaxKind::Plus | SyntaxKind::Minus => 9,
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => 10,
        SyntaxKind::DotStar | SyntaxKind::ArrowStar => 11,
        _ => return None,
    };
    Some(precedence)
}

/// Tokens that may form the operator in `operator <op>`.
pub fn is_overloadable_operator(kind: SyntaxKind) -> bool {
    binary_precedence(kind).is_some()
        || is_assignment_operator(kind)
        || matches!(
            kind,
            SyntaxKind::Tilde
                | SyntaxKind::Exclaim
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
                | SyntaxKind::Comma
                | SyntaxKind::Arrow
                | SyntaxKind::KwNew
                | SyntaxKind::KwDelete
        )
}

#[cfg(test)]
#[path = "../../tests/src/syntax/queries_tests.rs"]
mod tests;
