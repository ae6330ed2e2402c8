//! Declarations at namespace, class and block scope.

use crate::parser::core::{PResult, Parser};
use crate::parser::grammar::declarator::{self, DeclaratorContext, DeclaratorInfo, Init};
use crate::parser::grammar::specifiers::{self, SpecContext, Specifiers};
use crate::parser::grammar::{expr, names, recovering, stmt, templates};
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclContext {
    Namespace,
    Class,
    Block,
}

pub(crate) fn declaration_with_recovery(p: &mut Parser<'_>) -> PResult {
    recovering(p, SyntaxKind::ProblemDeclaration, |p| declaration(p, DeclContext::Namespace))
}

pub(crate) fn member_declaration_with_recovery(p: &mut Parser<'_>) -> PResult {
    recovering(p, SyntaxKind::ProblemDeclaration, |p| declaration(p, DeclContext::Class))
}

/// Declarations until `}` or the end of input.
pub(crate) fn declaration_seq(p: &mut Parser<'_>) -> PResult {
    while !p.at(SyntaxKind::RBrace) && !p.at_eof() && !p.stopped() {
        declaration_with_recovery(p)?;
    }
    Ok(())
}

pub(crate) fn declaration(
    p: &mut Parser<'_>,
    ctx: DeclContext,
) -> PResult {
    p.nested(|p| match p.current() {
        SyntaxKind::Semicolon if ctx != DeclContext::Block => {
            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::EmptyDeclaration);
            Ok(())
        },
        SyntaxKind::KwNamespace => namespace_definition(p),
        SyntaxKind::KwInline if p.nth(1) == SyntaxKind::KwNamespace => namespace_definition(p),
        SyntaxKind::KwUsing => using_declaration(p),
        SyntaxKind::KwTemplate => templates::template_declaration(p, ctx),
        SyntaxKind::KwExport if p.nth(1) == SyntaxKind::KwTemplate => templates::template_declaration(p, ctx),
        SyntaxKind::KwExtern if p.is_cpp() && p.nth(1) == SyntaxKind::KwTemplate => {
            templates::explicit_instantiation(p, ctx)
        },
        SyntaxKind::KwExtern if p.is_cpp() && p.nth(1) == SyntaxKind::String => linkage_specification(p),
        SyntaxKind::KwStaticAssert => static_assert_declaration(p),
        SyntaxKind::KwAsm if ctx != DeclContext::Class => asm_declaration(p),
        SyntaxKind::KwPublic | SyntaxKind::KwProtected | SyntaxKind::KwPrivate if ctx == DeclContext::Class => {
            let m = p.start();
            p.bump();
            p.expect(SyntaxKind::Colon)?;
            m.complete(p, SyntaxKind::VisibilityLabel);
            Ok(())
        },
        _ => simple_declaration(p, ctx),
    })
}

/// Specifiers followed by declarators, or a function definition.
pub(crate) fn simple_declaration(
    p: &mut Parser<'_>,
    ctx: DeclContext,
) -> PResult {
    let in_template = std::mem::take(&mut p.flags.in_template);
    let m = p.start();
    let spec_ctx = if ctx == DeclContext::Class { SpecContext::Member } else { SpecContext::Declaration };
    let specs = specifiers::decl_specifiers(p, spec_ctx, in_template)?;
    if specs.any && p.eat(SyntaxKind::Semicolon) {
        m.complete(p, SyntaxKind::SimpleDeclaration);
        return Ok(());
    }

    let declarator_ctx = if ctx == DeclContext::Class {
        DeclaratorContext::member()
    } else {
        DeclaratorContext::named(Init::Full)
    };
    let first = declarator::declarator(p, declarator_ctx)?;
    if !specs.any && !first.function && !p.past_completion() {
        return Err(p.error("expected declaration specifiers"));
    }
    declare(p, &specs, &first, in_template);

    if first.function && function_body_ahead(p, &first) {
        if ctx == DeclContext::Block && !(p.gnu() && !p.is_cpp()) {
            return Err(p.error("a function definition is not allowed here"));
        }
        function_body(p, &first)?;
        m.complete(p, SyntaxKind::FunctionDefinition);
        return Ok(());
    }

    while p.eat(SyntaxKind::Comma) {
        let next = declarator::declarator(p, declarator_ctx)?;
        declare(p, &specs, &next, in_template);
    }
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::SimpleDeclaration);
    Ok(())
}

fn declare(
    p: &mut Parser<'_>,
    specs: &Specifiers,
    info: &DeclaratorInfo<'_>,
    in_template: bool,
) {
    if specs.friend {
        return;
    }
    let Some(name) = info.simple_name() else {
        return;
    };
    // A constructor keeps the class name a type inside its own body.
    if info.function && !specs.typedef && p.classes.last().is_some_and(|class| &**class == name) {
        return;
    }
    let class = if specs.typedef {
        NameClass::Type
    } else if info.function && in_template {
        NameClass::FunctionTemplate
    } else {
        NameClass::Value
    };
    p.oracle.declare(name, class);
}

fn function_body_ahead(
    p: &Parser<'_>,
    info: &DeclaratorInfo<'_>,
) -> bool {
    match p.current() {
        SyntaxKind::LBrace => true,
        SyntaxKind::Colon | SyntaxKind::KwTry => p.is_cpp(),
        kind => info.knr && (queries::starts_decl_specifier(kind) || kind == SyntaxKind::Ident),
    }
}

/// K&R parameter declarations, constructor initializers and the body.
fn function_body(
    p: &mut Parser<'_>,
    info: &DeclaratorInfo<'_>,
) -> PResult {
    if let Some(scope) = info.params_scope {
        if let Some(name) = &info.name
            && name.components.len() > 1
            && let Some(class) = p.oracle.body_of(name.global, &name.components[..name.components.len() - 1])
        {
            p.oracle.set_extra(scope, class);
        }
        p.oracle.enter(scope);
    }
    let saved = p.flags;
    p.flags = Default::default();
    let result = function_body_contents(p, info);
    p.flags = saved;
    if info.params_scope.is_some() {
        p.oracle.pop_scope();
    }
    result
}

fn function_body_contents(
    p: &mut Parser<'_>,
    info: &DeclaratorInfo<'_>,
) -> PResult {
    if info.knr {
        while !p.at(SyntaxKind::LBrace) && !p.at_eof() {
            simple_declaration(p, DeclContext::Block)?;
        }
    }
    if p.is_cpp() && p.at(SyntaxKind::KwTry) {
        let m = p.start();
        p.bump();
        if p.at(SyntaxKind::Colon) {
            ctor_initializer_list(p)?;
        }
        stmt::compound_statement(p)?;
        stmt::catch_handlers(p)?;
        m.complete(p, SyntaxKind::TryBlock);
        return Ok(());
    }
    if p.is_cpp() && p.at(SyntaxKind::Colon) {
        ctor_initializer_list(p)?;
    }
    stmt::compound_statement(p)
}

/// `: base(args), member{args}`
fn ctor_initializer_list(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    loop {
        let initializer = p.start();
        names::name(p)?;
        if p.at(SyntaxKind::LParen) {
            p.bump();
            let saved = p.flags;
            p.flags.no_greater = false;
            let arguments = declarator::initializer_clauses(p, SyntaxKind::RParen);
            p.flags = saved;
            arguments?;
            p.expect(SyntaxKind::RParen)?;
        } else if p.at(SyntaxKind::LBrace) {
            declarator::initializer_list(p)?;
        } else {
            return Err(p.error(format!("expected '(' or '{{' after member name, found {}", p.describe_current())));
        }
        p.eat(SyntaxKind::Ellipsis);
        initializer.complete(p, SyntaxKind::MemberInitializer);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    m.complete(p, SyntaxKind::CtorInitializerList);
    Ok(())
}

fn namespace_definition(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.eat(SyntaxKind::KwInline);
    p.bump();

    if p.at(SyntaxKind::Ident) && p.nth(1) == SyntaxKind::Equal {
        let alias = p.current_text();
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
        p.bump();
        let (_, target) = names::name(p)?;
        p.expect(SyntaxKind::Semicolon)?;
        if !p.oracle.alias(alias, target.global, &target.components) {
            let id = p.oracle.declare(alias, NameClass::Namespace);
            tracing::trace!(entry = id, alias, "alias of an unknown namespace");
        }
        m.complete(p, SyntaxKind::NamespaceAlias);
        return Ok(());
    }

    specifiers::attributes(p)?;
    let mut path = Vec::new();
    while p.at(SyntaxKind::Ident) {
        path.push(p.current_text());
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
        if !(p.at(SyntaxKind::DoubleColon) && p.nth(1) == SyntaxKind::Ident) {
            break;
        }
        p.bump();
    }
    specifiers::attributes(p)?;
    p.expect(SyntaxKind::LBrace)?;

    for name in &path {
        match p.oracle.local(name, NameClass::Namespace) {
            Some((_, Some(body))) => p.oracle.enter(body),
            _ => {
                let entry = p.oracle.declare(name, NameClass::Namespace);
                let scope = p.oracle.push_scope();
                p.oracle.set_body(entry, scope);
            },
        }
    }
    let saved = p.flags;
    p.flags = Default::default();
    let body = declaration_seq(p);
    p.flags = saved;
    for _ in &path {
        p.oracle.pop_scope();
    }
    body?;
    p.expect(SyntaxKind::RBrace)?;
    m.complete(p, SyntaxKind::NamespaceDefinition);
    Ok(())
}

fn using_declaration(p: &mut Parser<'_>) -> PResult {
    let in_template = std::mem::take(&mut p.flags.in_template);
    let m = p.start();
    p.bump();

    if p.eat(SyntaxKind::KwNamespace) {
        let (_, target) = names::name(p)?;
        specifiers::attributes(p)?;
        p.expect(SyntaxKind::Semicolon)?;
        if let Some(body) = p.oracle.body_of(target.global, &target.components) {
            p.oracle.import_scope(body);
        }
        m.complete(p, SyntaxKind::UsingDirective);
        return Ok(());
    }

    if p.at(SyntaxKind::Ident) && matches!(p.nth(1), SyntaxKind::Equal | SyntaxKind::KwAttribute | SyntaxKind::LBracket) {
        let alias = p.current_text();
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
        specifiers::attributes(p)?;
        p.expect(SyntaxKind::Equal)?;
        specifiers::type_id(p)?;
        p.expect(SyntaxKind::Semicolon)?;
        let class = if in_template { NameClass::TypeTemplate } else { NameClass::Type };
        p.oracle.declare(alias, class);
        m.complete(p, SyntaxKind::AliasDeclaration);
        return Ok(());
    }

    p.eat(SyntaxKind::KwTypename);
    let (_, target) = names::name(p)?;
    p.expect(SyntaxKind::Semicolon)?;
    if let Some(last) = target.last()
        && target.components.len() > 1
    {
        p.oracle.alias(last, target.global, &target.components);
    }
    m.complete(p, SyntaxKind::UsingDeclaration);
    Ok(())
}

/// `extern "C" { ... }` or `extern "C" declaration`
fn linkage_specification(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    p.bump();
    if p.eat(SyntaxKind::LBrace) {
        declaration_seq(p)?;
        p.expect(SyntaxKind::RBrace)?;
    } else {
        declaration(p, DeclContext::Namespace)?;
    }
    m.complete(p, SyntaxKind::LinkageSpecification);
    Ok(())
}

fn static_assert_declaration(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::LParen)?;
    let saved = p.flags;
    p.flags.no_greater = false;
    let condition = expr::assignment_expression(p);
    p.flags = saved;
    condition?;
    if p.eat(SyntaxKind::Comma) {
        p.expect(SyntaxKind::String)?;
        while p.eat(SyntaxKind::String) {}
    }
    p.expect(SyntaxKind::RParen)?;
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::StaticAssertDeclaration);
    Ok(())
}

/// `asm volatile ( ... );`, operands kept as tokens.
pub(crate) fn asm_declaration(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    while queries::is_cv_qualifier(p.current()) || matches!(p.current(), SyntaxKind::KwGoto | SyntaxKind::KwInline) {
        p.bump();
    }
    p.expect(SyntaxKind::LParen)?;
    let mut depth = 1usize;
    while depth > 0 {
        match p.current() {
            SyntaxKind::Eof => return Err(p.error("unterminated asm operands")),
            SyntaxKind::LParen => depth += 1,
            SyntaxKind::RParen => depth -= 1,
            _ => {},
        }
        p.bump();
    }
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::AsmDeclaration);
    Ok(())
}
