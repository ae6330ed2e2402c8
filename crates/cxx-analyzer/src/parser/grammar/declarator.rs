//! Declarators: pointer operators, the declared name, function and array
//! suffixes, bit-fields and initializers.

use crate::parser::core::{PResult, Parser};
use crate::parser::grammar::names::{self, ParsedName};
use crate::parser::grammar::specifiers::{self, SpecContext};
use crate::parser::grammar::expr;
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Named,
    Abstract,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Init {
    None,
    /// `= value` only: default arguments.
    Equals,
    /// `= value`, `(args)` and `{args}`.
    Full,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DeclaratorContext {
    pub(crate) mode: Mode,
    pub(crate) init: Init,
    pub(crate) bit_field: bool,
    /// Class members: `(` always opens a parameter list.
    pub(crate) member: bool,
    /// `new` types take no parameter lists.
    pub(crate) new_type: bool,
}

impl DeclaratorContext {
    pub(crate) fn named(init: Init) -> Self {
        Self {
            mode: Mode::Named,
            init,
            bit_field: false,
            member: false,
            new_type: false,
        }
    }

    pub(crate) fn member() -> Self {
        Self {
            mode: Mode::Either,
            init: Init::Full,
            bit_field: true,
            member: true,
            new_type: false,
        }
    }

    pub(crate) fn parameter() -> Self {
        Self {
            mode: Mode::Either,
            ..Self::named(Init::Equals)
        }
    }

    pub(crate) fn abstract_only() -> Self {
        Self {
            mode: Mode::Abstract,
            ..Self::named(Init::None)
        }
    }

    pub(crate) fn new_type() -> Self {
        Self {
            new_type: true,
            ..Self::abstract_only()
        }
    }

    fn inner(self) -> Self {
        Self {
            init: Init::None,
            bit_field: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DeclaratorInfo<'i> {
    pub(crate) name: Option<ParsedName<'i>>,
    /// The declarator declares a function (not a pointer to one).
    pub(crate) function: bool,
    pub(crate) pointer: bool,
    /// Prototype scope holding the parameters of a function declarator.
    pub(crate) params_scope: Option<usize>,
    /// Parameters are a K&R identifier list.
    pub(crate) knr: bool,
}

impl<'i> DeclaratorInfo<'i> {
    pub(crate) fn simple_name(&self) -> Option<&'i str> {
        self.name.as_ref().filter(|name| name.is_simple()).and_then(ParsedName::last)
    }
}

pub(crate) fn declarator<'i>(
    p: &mut Parser<'i>,
    ctx: DeclaratorContext,
) -> PResult<DeclaratorInfo<'i>> {
    p.nested(|p| {
        let start = p.position();
        let m = p.start();
        let pointer = pointer_operators(p)?;
        let mut info = DeclaratorInfo::default();
        let mut nested = false;

        if p.at(SyntaxKind::LParen) && !ctx.new_type && nested_declarator_ahead(p, ctx.mode) {
            p.bump();
            info = declarator(p, ctx.inner())?;
            p.expect(SyntaxKind::RParen)?;
            nested = true;
        } else if ctx.mode != Mode::Abstract && declarator_id_start(p) {
            info.name = Some(names::name(p)?.1);
        } else if ctx.mode == Mode::Named && !p.past_completion() {
            return Err(p.error(format!("expected a declarator, found {}", p.describe_current())));
        }

        let mut first_suffix = true;
        loop {
            match p.current() {
                SyntaxKind::LParen if !ctx.new_type => {
                    if ctx.init == Init::Full
                        && !ctx.member
                        && p.is_cpp()
                        && info.name.is_some()
                        && !nested
                        && first_suffix
                        && !parameters_ahead(p)
                    {
                        break;
                    }
                    let (scope, knr) = parameter_list(p)?;
                    let direct = if nested { !info.pointer && !info.function } else { true };
                    if first_suffix && direct {
                        info.function = true;
                        info.params_scope = Some(scope);
                        info.knr = knr;
                    }
                    function_suffix(p)?;
                },
                SyntaxKind::LBracket if !(p.is_cpp() && p.nth(1) == SyntaxKind::LBracket) => array_modifier(p)?,
                _ => break,
            }
            first_suffix = false;
        }
        // `int *f()` still declares a function; only a nested `(*f)()` does not.
        info.pointer |= pointer;

        if p.at(SyntaxKind::KwAsm) {
            asm_label(p)?;
        }
        specifiers::attributes(p)?;
        if ctx.bit_field && p.at(SyntaxKind::Colon) {
            let m = p.start();
            p.bump();
            expr::conditional_expression(p)?;
            m.complete(p, SyntaxKind::BitField);
        }
        if ctx.init != Init::None {
            initializer(p, ctx, &info)?;
        }

        if p.position() == start {
            m.abandon(p);
        } else {
            m.complete(p, SyntaxKind::Declarator);
        }
        Ok(info)
    })
}

fn declarator_id_start(p: &Parser<'_>) -> bool {
    p.at_name() || (p.is_cpp() && matches!(p.current(), SyntaxKind::DoubleColon | SyntaxKind::Tilde | SyntaxKind::KwOperator))
}

/// `*`, `&`, `&&` and `A::*`, each with trailing qualifiers. Returns whether any was present.
pub(crate) fn pointer_operators(p: &mut Parser<'_>) -> PResult<bool> {
    let mut any = false;
    loop {
        match p.current() {
            SyntaxKind::Star => {
                let m = p.start();
                p.bump();
                qualifiers(p)?;
                m.complete(p, SyntaxKind::PointerOp);
            },
            SyntaxKind::Amp | SyntaxKind::AndAnd if p.is_cpp() => {
                let m = p.start();
                p.bump();
                specifiers::attributes(p)?;
                m.complete(p, SyntaxKind::ReferenceOp);
            },
            SyntaxKind::Ident | SyntaxKind::DoubleColon if p.is_cpp() && pointer_to_member_ahead(p) => {
                let m = p.start();
                p.eat(SyntaxKind::DoubleColon);
                let mut qualifier = ParsedName::default();
                loop {
                    let component = names::name_component(p, &qualifier)?;
                    qualifier.components.push(component.text);
                    p.expect(SyntaxKind::DoubleColon)?;
                    if p.at(SyntaxKind::Star) {
                        break;
                    }
                }
                p.bump();
                qualifiers(p)?;
                m.complete(p, SyntaxKind::PointerToMemberOp);
            },
            _ => return Ok(any),
        }
        any = true;
    }
}

fn qualifiers(p: &mut Parser<'_>) -> PResult {
    loop {
        if queries::is_cv_qualifier(p.current()) {
            p.bump();
        } else if p.at(SyntaxKind::KwAttribute) {
            specifiers::attribute_specifier(p)?;
        } else {
            return Ok(());
        }
    }
}

/// `A::*`, `::A::B<int>::*`
fn pointer_to_member_ahead(p: &mut Parser<'_>) -> bool {
    p.lookahead(|p| {
        p.eat(SyntaxKind::DoubleColon);
        let mut qualifier = ParsedName::default();
        loop {
            if !p.at(SyntaxKind::Ident) {
                return false;
            }
            let Ok(component) = names::name_component(p, &qualifier) else {
                return false;
            };
            qualifier.components.push(component.text);
            if !p.eat(SyntaxKind::DoubleColon) {
                return false;
            }
            if p.at(SyntaxKind::Star) {
                return true;
            }
        }
    })
}

/// `(` at the cursor opens a parenthesized declarator rather than a parameter list.
fn nested_declarator_ahead(
    p: &mut Parser<'_>,
    mode: Mode,
) -> bool {
    match p.nth(1) {
        SyntaxKind::Star | SyntaxKind::Caret | SyntaxKind::KwAttribute => true,
        SyntaxKind::Amp | SyntaxKind::AndAnd => p.is_cpp(),
        SyntaxKind::LParen => mode == Mode::Named,
        SyntaxKind::Ident | SyntaxKind::DoubleColon => p.lookahead(|p| {
            p.bump();
            if p.is_cpp() && pointer_to_member_ahead(p) {
                return true;
            }
            match mode {
                Mode::Abstract => false,
                Mode::Named => true,
                Mode::Either => !names::peek_name(p).and_then(|info| info.class).is_some_and(NameClass::is_type),
            }
        }),
        SyntaxKind::Tilde | SyntaxKind::KwOperator => mode != Mode::Abstract && p.is_cpp(),
        _ => false,
    }
}

/// `(` at the cursor starts parameters, not a constructor-style initializer.
fn parameters_ahead(p: &mut Parser<'_>) -> bool {
    match p.nth(1) {
        SyntaxKind::RParen | SyntaxKind::Ellipsis => true,
        kind if queries::starts_decl_specifier(kind) => true,
        SyntaxKind::LBracket => p.nth(2) == SyntaxKind::LBracket,
        SyntaxKind::Ident | SyntaxKind::DoubleColon => p.lookahead(|p| {
            p.bump();
            let Some(info) = names::peek_name(p) else {
                return false;
            };
            match info.class {
                Some(class) => class.is_type(),
                None => {
                    info.follow == SyntaxKind::Ident
                        || (matches!(info.follow, SyntaxKind::Star | SyntaxKind::Amp | SyntaxKind::AndAnd)
                            && matches!(info.follow2, SyntaxKind::RParen | SyntaxKind::Comma | SyntaxKind::Ident))
                },
            }
        }),
        _ => false,
    }
}

/// `( parameters )`. Returns the prototype scope and whether it was a K&R identifier list.
pub(crate) fn parameter_list(p: &mut Parser<'_>) -> PResult<(usize, bool)> {
    let m = p.start();
    p.expect(SyntaxKind::LParen)?;
    let scope = p.oracle.push_scope();
    let saved = p.flags;
    p.flags.no_greater = false;
    p.flags.in_template = false;
    let result = parameters(p);
    p.flags = saved;
    p.oracle.pop_scope();
    let knr = result?;
    p.expect(SyntaxKind::RParen)?;
    m.complete(p, SyntaxKind::ParameterList);
    Ok((scope, knr))
}

fn parameters(p: &mut Parser<'_>) -> PResult<bool> {
    if !p.is_cpp() && p.at(SyntaxKind::Ident) && identifier_list_ahead(p) {
        loop {
            let text = p.current_text();
            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::Name);
            p.oracle.declare_parameter(text, NameClass::Value);
            if !p.eat(SyntaxKind::Comma) {
                return Ok(true);
            }
        }
    }
    if p.at(SyntaxKind::RParen) {
        return Ok(false);
    }
    loop {
        if p.eat(SyntaxKind::Ellipsis) {
            break;
        }
        parameter_declaration(p)?;
        if p.eat(SyntaxKind::Comma) {
            continue;
        }
        p.eat(SyntaxKind::Ellipsis);
        break;
    }
    Ok(false)
}

fn identifier_list_ahead(p: &mut Parser<'_>) -> bool {
    p.lookahead(|p| {
        loop {
            if !p.at(SyntaxKind::Ident) || p.oracle.classify(false, &[p.current_text()]).is_some_and(NameClass::is_type) {
                return false;
            }
            p.bump();
            if !p.eat(SyntaxKind::Comma) {
                return p.at(SyntaxKind::RParen);
            }
        }
    })
}

pub(crate) fn parameter_declaration(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    let specs = specifiers::decl_specifiers(p, SpecContext::Parameter, false)?;
    if !specs.any {
        return Err(p.error(format!("expected a parameter declaration, found {}", p.describe_current())));
    }
    let info = declarator(p, DeclaratorContext::parameter())?;
    if let Some(name) = info.simple_name() {
        p.oracle.declare_parameter(name, NameClass::Value);
    }
    m.complete(p, SyntaxKind::ParameterDeclaration);
    Ok(())
}

/// Everything that may follow a function's parameter list inside its declarator.
fn function_suffix(p: &mut Parser<'_>) -> PResult {
    loop {
        match p.current() {
            kind if queries::is_cv_qualifier(kind) => p.bump(),
            SyntaxKind::Amp | SyntaxKind::AndAnd if p.is_cpp() => p.bump(),
            SyntaxKind::KwThrow => {
                let m = p.start();
                p.bump();
                p.expect(SyntaxKind::LParen)?;
                if !p.at(SyntaxKind::RParen) {
                    loop {
                        if !p.eat(SyntaxKind::Ellipsis) {
                            specifiers::type_id(p)?;
                        }
                        if !p.eat(SyntaxKind::Comma) {
                            break;
                        }
                    }
                }
                p.expect(SyntaxKind::RParen)?;
                m.complete(p, SyntaxKind::ExceptionSpecification);
            },
            SyntaxKind::KwNoexcept => {
                let m = p.start();
                p.bump();
                if p.eat(SyntaxKind::LParen) {
                    expr::expression(p)?;
                    p.expect(SyntaxKind::RParen)?;
                }
                m.complete(p, SyntaxKind::ExceptionSpecification);
            },
            SyntaxKind::Arrow if p.is_cpp() => {
                let m = p.start();
                p.bump();
                specifiers::type_id(p)?;
                m.complete(p, SyntaxKind::TrailingReturn);
            },
            SyntaxKind::Ident if p.is_cpp() && (p.at_contextual("override") || p.at_contextual("final")) => p.bump(),
            SyntaxKind::KwAttribute => specifiers::attribute_specifier(p)?,
            _ => return Ok(()),
        }
    }
}

fn array_modifier(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    p.eat(SyntaxKind::KwStatic);
    while queries::is_cv_qualifier(p.current()) {
        p.bump();
    }
    p.eat(SyntaxKind::KwStatic);
    if p.at(SyntaxKind::Star) && p.nth(1) == SyntaxKind::RBracket {
        p.bump();
    } else if !p.at(SyntaxKind::RBracket) {
        let saved = p.flags;
        p.flags.no_greater = false;
        let size = expr::assignment_expression(p);
        p.flags = saved;
        size?;
    }
    p.expect(SyntaxKind::RBracket)?;
    m.complete(p, SyntaxKind::ArrayModifier);
    Ok(())
}

/// GNU `asm("label")` after a declarator.
fn asm_label(p: &mut Parser<'_>) -> PResult {
    p.bump();
    p.expect(SyntaxKind::LParen)?;
    while p.eat(SyntaxKind::String) {}
    p.expect(SyntaxKind::RParen)
}

fn initializer(
    p: &mut Parser<'_>,
    ctx: DeclaratorContext,
    info: &DeclaratorInfo<'_>,
) -> PResult {
    let full = ctx.init == Init::Full && p.is_cpp() && !info.function;
    match p.current() {
        SyntaxKind::Equal => {
            let m = p.start();
            p.bump();
            if p.is_cpp() && info.function && matches!(p.current(), SyntaxKind::KwDefault | SyntaxKind::KwDelete) {
                p.bump();
            } else {
                initializer_clause(p)?;
            }
            m.complete(p, SyntaxKind::EqualsInitializer);
        },
        SyntaxKind::LParen if full => {
            let m = p.start();
            p.bump();
            let saved = p.flags;
            p.flags.no_greater = false;
            let arguments = initializer_clauses(p, SyntaxKind::RParen);
            p.flags = saved;
            arguments?;
            p.expect(SyntaxKind::RParen)?;
            m.complete(p, SyntaxKind::ConstructorInitializer);
        },
        SyntaxKind::LBrace if full => initializer_list(p)?,
        _ => {},
    }
    Ok(())
}

/// An expression or a braced list.
pub(crate) fn initializer_clause(p: &mut Parser<'_>) -> PResult {
    if p.at(SyntaxKind::LBrace) {
        initializer_list(p)
    } else {
        expr::assignment_expression(p).map(drop)
    }
}

/// Comma separated clauses up to (not including) `close`.
pub(crate) fn initializer_clauses(
    p: &mut Parser<'_>,
    close: SyntaxKind,
) -> PResult {
    if p.at(close) {
        return Ok(());
    }
    loop {
        initializer_clause(p)?;
        p.eat(SyntaxKind::Ellipsis);
        if !p.eat(SyntaxKind::Comma) {
            return Ok(());
        }
    }
}

/// `{ clause, .field = clause, [index] = clause, }`
pub(crate) fn initializer_list(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.expect(SyntaxKind::LBrace)?;
    let saved = p.flags;
    p.flags.no_greater = false;
    let result = initializer_list_items(p);
    p.flags = saved;
    result?;
    p.expect(SyntaxKind::RBrace)?;
    m.complete(p, SyntaxKind::InitializerList);
    Ok(())
}

fn initializer_list_items(p: &mut Parser<'_>) -> PResult {
    let designators = p.dialect.c99 || p.gnu();
    while !p.at(SyntaxKind::RBrace) && !p.at_eof() {
        let at_designator = matches!(p.current(), SyntaxKind::Dot | SyntaxKind::LBracket);
        if at_designator && !(p.is_cpp() && p.at(SyntaxKind::LBracket) && !p.gnu()) {
            if !designators {
                return Err(p.error("designated initializers are not enabled"));
            }
            designated_initializer(p)?;
        } else if p.gnu() && p.at(SyntaxKind::Ident) && p.nth(1) == SyntaxKind::Colon {
            let m = p.start();
            let designator = p.start();
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
            designator.complete(p, SyntaxKind::Designator);
            p.bump();
            initializer_clause(p)?;
            m.complete(p, SyntaxKind::DesignatedInitializer);
        } else {
            initializer_clause(p)?;
            p.eat(SyntaxKind::Ellipsis);
        }
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    Ok(())
}

fn designated_initializer(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    while matches!(p.current(), SyntaxKind::Dot | SyntaxKind::LBracket) {
        let designator = p.start();
        if p.eat(SyntaxKind::Dot) {
            if !p.at_name() {
                return Err(p.error(format!("expected a field name, found {}", p.describe_current())));
            }
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
        } else {
            p.bump();
            expr::conditional_expression(p)?;
            if p.gnu() && p.eat(SyntaxKind::Ellipsis) {
                expr::conditional_expression(p)?;
            }
            p.expect(SyntaxKind::RBracket)?;
        }
        designator.complete(p, SyntaxKind::Designator);
    }
    if !p.eat(SyntaxKind::Equal) && !(p.gnu() && p.at(SyntaxKind::LBrace)) {
        return Err(p.error(format!("expected '=' after designator, found {}", p.describe_current())));
    }
    initializer_clause(p)?;
    m.complete(p, SyntaxKind::DesignatedInitializer);
    Ok(())
}
