//! Declaration specifiers and the type specifiers nested in them.

use std::sync::Arc;

use crate::parser::core::{PResult, Parser};
use crate::parser::grammar::declarator::{self, DeclaratorContext};
use crate::parser::grammar::{decl, expr, names};
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecContext {
    Declaration,
    Member,
    Parameter,
    /// Only type specifiers and cv-qualifiers: casts, `sizeof`, template arguments.
    TypeId,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Specifiers {
    pub(crate) any: bool,
    pub(crate) has_type: bool,
    pub(crate) typedef: bool,
    pub(crate) friend: bool,
}

pub(crate) fn decl_specifiers(
    p: &mut Parser<'_>,
    ctx: SpecContext,
    in_template: bool,
) -> PResult<Specifiers> {
    let m = p.start();
    let mut specs = Specifiers::default();
    loop {
        let kind = p.current();
        if queries::is_storage_class(kind) || queries::is_function_specifier(kind) {
            if ctx == SpecContext::TypeId {
                break;
            }
            specs.typedef |= kind == SyntaxKind::KwTypedef;
            specs.friend |= kind == SyntaxKind::KwFriend;
            p.bump();
            specs.any = true;
            continue;
        }
        if queries::is_cv_qualifier(kind) || queries::is_builtin_type_keyword(kind) {
            specs.has_type |= queries::is_builtin_type_keyword(kind);
            p.bump();
            specs.any = true;
            continue;
        }
        match kind {
            SyntaxKind::KwStruct | SyntaxKind::KwClass | SyntaxKind::KwUnion if !specs.has_type => {
                class_specifier(p, in_template)?;
            },
            SyntaxKind::KwEnum if !specs.has_type => enum_specifier(p)?,
            SyntaxKind::KwTypename if !specs.has_type => {
                let m = p.start();
                p.bump();
                names::name(p)?;
                m.complete(p, SyntaxKind::NamedTypeSpecifier);
            },
            SyntaxKind::KwTypeof if !specs.has_type => typeof_specifier(p, SyntaxKind::TypeofSpecifier)?,
            SyntaxKind::KwDecltype if !specs.has_type => typeof_specifier(p, SyntaxKind::DecltypeSpecifier)?,
            SyntaxKind::KwAttribute | SyntaxKind::KwAlignas => {
                attribute_specifier(p)?;
                specs.any = true;
                continue;
            },
            SyntaxKind::LBracket if p.is_cpp() && p.nth(1) == SyntaxKind::LBracket => {
                attribute_specifier(p)?;
                specs.any = true;
                continue;
            },
            SyntaxKind::KwExtension => {
                p.bump();
                specs.any = true;
                continue;
            },
            SyntaxKind::Ident | SyntaxKind::DoubleColon if !specs.has_type => {
                if constructor_ahead(p, ctx) || !named_type_ahead(p, ctx) {
                    break;
                }
                let m = p.start();
                names::name(p)?;
                m.complete(p, SyntaxKind::NamedTypeSpecifier);
            },
            _ => break,
        }
        specs.has_type = true;
        specs.any = true;
    }
    if specs.any {
        m.complete(p, SyntaxKind::DeclSpecifierSeq);
    } else {
        m.abandon(p);
    }
    Ok(specs)
}

/// The name at the cursor declares a constructor rather than naming a type.
fn constructor_ahead(
    p: &mut Parser<'_>,
    ctx: SpecContext,
) -> bool {
    if !p.is_cpp() || ctx == SpecContext::TypeId || ctx == SpecContext::Parameter {
        return false;
    }
    if ctx == SpecContext::Member
        && let Some(class) = p.classes.last()
        && p.current_text() == &**class
    {
        return match p.nth(1) {
            SyntaxKind::LParen => true,
            SyntaxKind::Less => names::peek_name(p).is_some_and(|info| info.follow == SyntaxKind::LParen),
            _ => false,
        };
    }
    names::peek_name(p).is_some_and(|info| info.constructor_like && info.follow == SyntaxKind::LParen)
}

/// The name at the cursor should be read as a type specifier.
fn named_type_ahead(
    p: &mut Parser<'_>,
    ctx: SpecContext,
) -> bool {
    let Some(info) = names::peek_name(p) else {
        return false;
    };
    match info.class {
        Some(class) => class.is_type(),
        None if info.completion || info.special => false,
        None => {
            let declarator_follows = matches!(
                info.follow,
                SyntaxKind::Ident
                    | SyntaxKind::Star
                    | SyntaxKind::Amp
                    | SyntaxKind::AndAnd
                    | SyntaxKind::KwConst
                    | SyntaxKind::KwVolatile
                    | SyntaxKind::KwRestrict
                    | SyntaxKind::KwAttribute
            ) || (info.follow == SyntaxKind::Ellipsis && p.is_cpp())
                || (info.follow == SyntaxKind::LParen
                    && matches!(info.follow2, SyntaxKind::Star | SyntaxKind::Amp | SyntaxKind::Caret));
            let abstract_follows = match ctx {
                SpecContext::Parameter => matches!(info.follow, SyntaxKind::RParen | SyntaxKind::Comma | SyntaxKind::LBracket),
                SpecContext::TypeId => matches!(
                    info.follow,
                    SyntaxKind::RParen | SyntaxKind::Comma | SyntaxKind::Greater | SyntaxKind::LBracket
                ),
                _ => false,
            };
            declarator_follows || abstract_follows
        },
    }
}

/// `type-specifier-seq abstract-declarator?`
pub(crate) fn type_id(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    let specs = decl_specifiers(p, SpecContext::TypeId, false)?;
    if !specs.has_type {
        return Err(p.error(format!("expected a type, found {}", p.describe_current())));
    }
    declarator::declarator(p, DeclaratorContext::abstract_only())?;
    m.complete(p, SyntaxKind::TypeId);
    Ok(())
}

/// The type in a conversion function name: specifiers and pointer operators only.
pub(crate) fn conversion_type(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    let specs = decl_specifiers(p, SpecContext::TypeId, false)?;
    if !specs.has_type {
        return Err(p.error(format!("expected a conversion type, found {}", p.describe_current())));
    }
    declarator::pointer_operators(p)?;
    m.complete(p, SyntaxKind::TypeId);
    Ok(())
}

/// `struct`, `class` or `union`: a definition when a body or base clause follows, otherwise elaborated.
fn class_specifier(
    p: &mut Parser<'_>,
    in_template: bool,
) -> PResult {
    let m = p.start();
    p.bump();
    attributes(p)?;
    let name = if names::at_name_start(p) && !p.at(SyntaxKind::Tilde) && !p.at(SyntaxKind::KwOperator) {
        Some(names::name(p)?.1)
    } else {
        None
    };
    if p.is_cpp() && p.at_contextual("final") {
        p.bump();
    }
    let base_follows = p.is_cpp() && p.at(SyntaxKind::Colon);
    if !p.at(SyntaxKind::LBrace) && !base_follows {
        if name.is_none() {
            return Err(p.error(format!("expected a class name or body, found {}", p.describe_current())));
        }
        if let Some(name) = &name
            && name.is_simple()
            && p.is_cpp()
            && p.oracle.classify(false, &name.components).is_none_or(|class| !class.is_type())
        {
            let class = if in_template { NameClass::TypeTemplate } else { NameClass::Type };
            p.oracle.declare(name.components[0], class);
        }
        m.complete(p, SyntaxKind::ElaboratedTypeSpecifier);
        return Ok(());
    }

    if base_follows {
        base_clause(p)?;
    }

    let simple = name.as_ref().filter(|name| name.is_simple()).and_then(|name| name.last());
    let body_scope = if p.is_cpp() {
        match (simple, &name) {
            (Some(simple), _) => {
                let class = if in_template { NameClass::TypeTemplate } else { NameClass::Type };
                let entry = p.oracle.declare(simple, class);
                let scope = p.oracle.push_scope();
                p.oracle.set_body(entry, scope);
                scope
            },
            (None, Some(name)) => {
                let outer = p.oracle.body_of(name.global, &name.components);
                let scope = p.oracle.push_scope();
                if let Some(outer) = outer {
                    p.oracle.set_extra(scope, outer);
                }
                scope
            },
            (None, None) => p.oracle.push_scope(),
        }
    } else {
        p.oracle.push_scope()
    };
    tracing::trace!(scope = body_scope, name = ?name.as_ref().and_then(|name| name.last()), "class body");

    let class_name: Arc<str> = Arc::from(name.as_ref().and_then(|name| name.last()).unwrap_or(""));
    p.classes.push(class_name);
    let saved = p.flags;
    p.flags = Default::default();
    let body = class_body(p);
    p.flags = saved;
    p.classes.pop();
    p.oracle.pop_scope();
    body?;
    m.complete(p, SyntaxKind::ClassSpecifier);
    Ok(())
}

fn class_body(p: &mut Parser<'_>) -> PResult {
    p.expect(SyntaxKind::LBrace)?;
    while !p.at(SyntaxKind::RBrace) && !p.at_eof() && !p.stopped() {
        decl::member_declaration_with_recovery(p)?;
    }
    p.expect(SyntaxKind::RBrace)
}

fn base_clause(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    loop {
        let base = p.start();
        while matches!(
            p.current(),
            SyntaxKind::KwVirtual | SyntaxKind::KwPublic | SyntaxKind::KwProtected | SyntaxKind::KwPrivate
        ) {
            p.bump();
        }
        names::name(p)?;
        p.eat(SyntaxKind::Ellipsis);
        base.complete(p, SyntaxKind::BaseSpecifier);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    m.complete(p, SyntaxKind::BaseClause);
    Ok(())
}

fn enum_specifier(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    let scoped = p.is_cpp() && (p.eat(SyntaxKind::KwClass) || p.eat(SyntaxKind::KwStruct));
    attributes(p)?;
    let name = if p.at_name() || p.at(SyntaxKind::DoubleColon) {
        Some(names::name(p)?.1)
    } else {
        None
    };
    if p.is_cpp() && p.at(SyntaxKind::Colon) {
        p.bump();
        let base = p.start();
        let specs = decl_specifiers(p, SpecContext::TypeId, false)?;
        if !specs.has_type {
            return Err(p.error("expected an underlying type"));
        }
        base.complete(p, SyntaxKind::TypeId);
    }
    if !p.at(SyntaxKind::LBrace) {
        if name.is_none() {
            return Err(p.error(format!("expected an enumeration name or body, found {}", p.describe_current())));
        }
        m.complete(p, SyntaxKind::ElaboratedTypeSpecifier);
        return Ok(());
    }

    let entry = match name.as_ref().filter(|name| name.is_simple()).and_then(|name| name.last()) {
        Some(simple) if p.is_cpp() => Some(p.oracle.declare(simple, NameClass::Type)),
        _ => None,
    };
    let scope = scoped.then(|| p.oracle.push_scope());
    if let (Some(entry), Some(scope)) = (entry, scope) {
        p.oracle.set_body(entry, scope);
    }

    p.bump();
    while !p.at(SyntaxKind::RBrace) && !p.at_eof() {
        let enumerator = p.start();
        if !p.at(SyntaxKind::Ident) {
            return Err(p.error(format!("expected an enumerator, found {}", p.describe_current())));
        }
        let text = p.current_text();
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
        attributes(p)?;
        if p.at(SyntaxKind::Equal) {
            let init = p.start();
            p.bump();
            expr::conditional_expression(p)?;
            init.complete(p, SyntaxKind::EqualsInitializer);
        }
        enumerator.complete(p, SyntaxKind::Enumerator);
        p.oracle.declare(text, NameClass::Value);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    if scope.is_some() {
        p.oracle.pop_scope();
    }
    p.expect(SyntaxKind::RBrace)?;
    m.complete(p, SyntaxKind::EnumSpecifier);
    Ok(())
}

/// `typeof(expr-or-type)` and `decltype(expr)`.
fn typeof_specifier(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
) -> PResult {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::LParen)?;
    let saved = p.flags;
    p.flags.no_greater = false;
    let as_type = kind == SyntaxKind::TypeofSpecifier
        && p.speculate(|p| {
            type_id(p)?;
            if p.at(SyntaxKind::RParen) { Ok(()) } else { Err(p.error("not a type")) }
        })
        .is_ok();
    if !as_type {
        expr::expression(p)?;
    }
    p.flags = saved;
    p.expect(SyntaxKind::RParen)?;
    m.complete(p, kind);
    Ok(())
}

/// Any run of attribute specifiers.
pub(crate) fn attributes(p: &mut Parser<'_>) -> PResult {
    while p.at(SyntaxKind::KwAttribute)
        || p.at(SyntaxKind::KwAlignas)
        || (p.is_cpp() && p.at(SyntaxKind::LBracket) && p.nth(1) == SyntaxKind::LBracket)
    {
        attribute_specifier(p)?;
    }
    Ok(())
}

/// `__attribute__((...))`, `alignas(...)` or `[[...]]`; the contents are kept as tokens.
pub(crate) fn attribute_specifier(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    let (open, close) = if p.at(SyntaxKind::LBracket) {
        (SyntaxKind::LBracket, SyntaxKind::RBracket)
    } else {
        p.bump();
        (SyntaxKind::LParen, SyntaxKind::RParen)
    };
    if !p.at(open) {
        return Err(p.error(format!("expected {} after attribute", crate::parser::core::describe(open))));
    }
    let mut depth = 0usize;
    loop {
        match p.current() {
            SyntaxKind::Eof => return Err(p.error("unterminated attribute")),
            kind if kind == open => depth += 1,
            kind if kind == close => depth -= 1,
            _ => {},
        }
        p.bump();
        if depth == 0 {
            break;
        }
    }
    m.complete(p, SyntaxKind::AttributeSpecifier);
    Ok(())
}
