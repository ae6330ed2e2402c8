//! Statements, including the declaration-or-expression decision.

use crate::diagnostics::ErrorKind;
use crate::parser::core::{PResult, ParseError, Parser};
use crate::parser::grammar::declarator::{self, DeclaratorContext, Init};
use crate::parser::grammar::decl::{self, DeclContext};
use crate::parser::grammar::specifiers::{self, SpecContext};
use crate::parser::grammar::{expr, names, recovering};
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

pub(crate) fn compound_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.expect(SyntaxKind::LBrace)?;
    p.oracle.push_scope();
    let mut result = Ok(());
    while !p.at(SyntaxKind::RBrace) && !p.at_eof() && !p.stopped() {
        result = statement_with_recovery(p);
        if result.is_err() {
            break;
        }
    }
    p.oracle.pop_scope();
    result?;
    p.expect(SyntaxKind::RBrace)?;
    m.complete(p, SyntaxKind::CompoundStatement);
    Ok(())
}

pub(crate) fn statement_with_recovery(p: &mut Parser<'_>) -> PResult {
    recovering(p, SyntaxKind::ProblemStatement, statement)
}

pub(crate) fn statement(p: &mut Parser<'_>) -> PResult {
    p.nested(|p| match p.current() {
        SyntaxKind::LBrace => compound_statement(p),
        SyntaxKind::KwIf => if_statement(p),
        SyntaxKind::KwSwitch => condition_statement(p, SyntaxKind::SwitchStatement),
        SyntaxKind::KwWhile => condition_statement(p, SyntaxKind::WhileStatement),
        SyntaxKind::KwDo => do_statement(p),
        SyntaxKind::KwFor => for_statement(p),
        SyntaxKind::KwBreak => keyword_statement(p, SyntaxKind::BreakStatement),
        SyntaxKind::KwContinue => keyword_statement(p, SyntaxKind::ContinueStatement),
        SyntaxKind::KwReturn => return_statement(p),
        SyntaxKind::KwGoto => goto_statement(p),
        SyntaxKind::KwCase => case_statement(p),
        SyntaxKind::KwDefault => {
            let m = p.start();
            p.bump();
            p.expect(SyntaxKind::Colon)?;
            m.complete(p, SyntaxKind::DefaultStatement);
            Ok(())
        },
        SyntaxKind::KwTry if p.is_cpp() => {
            let m = p.start();
            p.bump();
            compound_statement(p)?;
            catch_handlers(p)?;
            m.complete(p, SyntaxKind::TryBlock);
            Ok(())
        },
        SyntaxKind::Semicolon => {
            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::NullStatement);
            Ok(())
        },
        SyntaxKind::Ident if p.nth(1) == SyntaxKind::Colon => label_statement(p),
        SyntaxKind::KwLabel => local_label_declaration(p),
        SyntaxKind::KwAsm => declaration_statement(p),
        SyntaxKind::KwUsing
        | SyntaxKind::KwNamespace
        | SyntaxKind::KwStaticAssert
        | SyntaxKind::KwTypedef
        | SyntaxKind::KwTemplate => declaration_statement(p),
        _ => declaration_or_expression_statement(p),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preference {
    Declaration,
    Expression,
    DeclarationFirst,
    ExpressionFirst,
}

/// Decides how to read a statement that could be a declaration or an expression.
fn preference(p: &mut Parser<'_>) -> Preference {
    let kind = p.current();
    if queries::is_builtin_type_keyword(kind) {
        return if p.is_cpp() && matches!(p.nth(1), SyntaxKind::LParen | SyntaxKind::LBrace) {
            Preference::DeclarationFirst
        } else {
            Preference::Declaration
        };
    }
    if queries::starts_decl_specifier(kind) {
        return match kind {
            SyntaxKind::KwTypename | SyntaxKind::KwExtension | SyntaxKind::KwDecltype => Preference::DeclarationFirst,
            _ => Preference::Declaration,
        };
    }
    if p.is_cpp() && p.at(SyntaxKind::LBracket) && p.nth(1) == SyntaxKind::LBracket {
        return Preference::DeclarationFirst;
    }
    if !matches!(kind, SyntaxKind::Ident | SyntaxKind::CompletionName | SyntaxKind::DoubleColon) {
        return Preference::Expression;
    }
    let Some(info) = names::peek_name(p) else {
        return Preference::Expression;
    };
    if info.completion || info.special {
        return Preference::ExpressionFirst;
    }
    match info.class {
        Some(NameClass::Type | NameClass::TypeTemplate) => Preference::DeclarationFirst,
        Some(_) => Preference::ExpressionFirst,
        None => {
            let declarator_follows = matches!(
                info.follow,
                SyntaxKind::Ident
                    | SyntaxKind::Star
                    | SyntaxKind::Amp
                    | SyntaxKind::AndAnd
                    | SyntaxKind::KwConst
                    | SyntaxKind::KwVolatile
            );
            if declarator_follows { Preference::DeclarationFirst } else { Preference::ExpressionFirst }
        },
    }
}

fn declaration_or_expression_statement(p: &mut Parser<'_>) -> PResult {
    match preference(p) {
        Preference::Declaration => declaration_statement(p),
        Preference::Expression => expression_statement(p),
        Preference::DeclarationFirst => either(p, declaration_statement, expression_statement),
        Preference::ExpressionFirst => either(p, expression_statement, declaration_statement),
    }
}

/// Tries `first`, then `second`; when both fail the statement is ambiguous.
fn either(
    p: &mut Parser<'_>,
    first: fn(&mut Parser<'_>) -> PResult,
    second: fn(&mut Parser<'_>) -> PResult,
) -> PResult {
    let Err(first_error) = p.speculate(first) else {
        return Ok(());
    };
    let Err(second_error) = p.speculate(second) else {
        return Ok(());
    };
    let further = if second_error.pos > first_error.pos { second_error } else { first_error };
    Err(ParseError {
        kind: ErrorKind::AmbiguityExhausted,
        message: format!("no interpretation as declaration or expression: {}", further.message),
        pos: further.pos,
    })
}

fn declaration_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    decl::declaration(p, DeclContext::Block)?;
    m.complete(p, SyntaxKind::DeclarationStatement);
    Ok(())
}

fn expression_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    expr::expression(p)?;
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::ExpressionStatement);
    Ok(())
}

fn keyword_statement(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
) -> PResult {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, kind);
    Ok(())
}

fn if_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    if p.is_cpp() {
        p.eat(SyntaxKind::KwConstexpr);
    }
    p.expect(SyntaxKind::LParen)?;
    p.oracle.push_scope();
    let result = if_rest(p);
    p.oracle.pop_scope();
    result?;
    m.complete(p, SyntaxKind::IfStatement);
    Ok(())
}

fn if_rest(p: &mut Parser<'_>) -> PResult {
    condition(p)?;
    p.expect(SyntaxKind::RParen)?;
    statement(p)?;
    if p.eat(SyntaxKind::KwElse) {
        statement(p)?;
    }
    Ok(())
}

/// `switch` and `while`: keyword, parenthesized condition, body.
fn condition_statement(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
) -> PResult {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::LParen)?;
    p.oracle.push_scope();
    let result = condition(p).and_then(|()| p.expect(SyntaxKind::RParen)).and_then(|()| statement(p));
    p.oracle.pop_scope();
    result?;
    m.complete(p, kind);
    Ok(())
}

/// An expression, or in C++ a declaration with an initializer.
fn condition(p: &mut Parser<'_>) -> PResult {
    if p.is_cpp() && matches!(preference(p), Preference::Declaration | Preference::DeclarationFirst) {
        let declared = p.speculate(|p| {
            let m = p.start();
            let specs = specifiers::decl_specifiers(p, SpecContext::Declaration, false)?;
            if !specs.has_type {
                return Err(p.error("expected a type"));
            }
            let info = declarator::declarator(p, DeclaratorContext::named(Init::Full))?;
            if let Some(name) = info.simple_name() {
                p.oracle.declare(name, NameClass::Value);
            }
            m.complete(p, SyntaxKind::SimpleDeclaration);
            Ok(())
        });
        if declared.is_ok() {
            return Ok(());
        }
    }
    let saved = p.flags;
    p.flags.no_greater = false;
    let result = expr::expression(p);
    p.flags = saved;
    result.map(drop)
}

fn do_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    statement(p)?;
    p.expect(SyntaxKind::KwWhile)?;
    p.expect(SyntaxKind::LParen)?;
    expr::expression(p)?;
    p.expect(SyntaxKind::RParen)?;
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::DoStatement);
    Ok(())
}

fn for_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    p.expect(SyntaxKind::LParen)?;
    p.oracle.push_scope();
    let result = for_rest(p);
    p.oracle.pop_scope();
    let kind = result?;
    m.complete(p, kind);
    Ok(())
}

fn for_rest(p: &mut Parser<'_>) -> PResult<SyntaxKind> {
    if p.is_cpp() {
        let range = p.speculate(|p| {
            let m = p.start();
            let specs = specifiers::decl_specifiers(p, SpecContext::Declaration, false)?;
            if !specs.has_type {
                return Err(p.error("expected a type"));
            }
            let info = declarator::declarator(p, DeclaratorContext::named(Init::None))?;
            if !p.at(SyntaxKind::Colon) {
                return Err(p.error("not a range-based for"));
            }
            if let Some(name) = info.simple_name() {
                p.oracle.declare(name, NameClass::Value);
            }
            m.complete(p, SyntaxKind::SimpleDeclaration);
            p.bump();
            Ok(())
        });
        if range.is_ok() {
            declarator::initializer_clause(p)?;
            p.expect(SyntaxKind::RParen)?;
            statement(p)?;
            return Ok(SyntaxKind::RangeForStatement);
        }
    }

    if !p.eat(SyntaxKind::Semicolon) {
        declaration_or_expression_statement(p)?;
    }
    if !p.at(SyntaxKind::Semicolon) {
        condition(p)?;
    }
    p.expect(SyntaxKind::Semicolon)?;
    if !p.at(SyntaxKind::RParen) {
        expr::expression(p)?;
    }
    p.expect(SyntaxKind::RParen)?;
    statement(p)?;
    Ok(SyntaxKind::ForStatement)
}

fn return_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    if !p.at(SyntaxKind::Semicolon) {
        if p.is_cpp() && p.at(SyntaxKind::LBrace) {
            declarator::initializer_list(p)?;
        } else {
            expr::expression(p)?;
        }
    }
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::ReturnStatement);
    Ok(())
}

fn goto_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    if p.gnu() && p.at(SyntaxKind::Star) {
        expr::expression(p)?;
    } else if p.at_name() {
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
    } else {
        return Err(p.error(format!("expected a label, found {}", p.describe_current())));
    }
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::GotoStatement);
    Ok(())
}

/// `case value:`, or the GNU range `case low ... high:`
fn case_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    expr::conditional_expression(p)?;
    if p.gnu() && p.eat(SyntaxKind::Ellipsis) {
        expr::conditional_expression(p)?;
    }
    p.expect(SyntaxKind::Colon)?;
    m.complete(p, SyntaxKind::CaseStatement);
    Ok(())
}

fn label_statement(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    let name = p.start();
    p.bump();
    name.complete(p, SyntaxKind::Name);
    p.bump();
    specifiers::attributes(p)?;
    // A label may end a block as a GNU extension.
    if !(p.gnu() && p.at(SyntaxKind::RBrace)) {
        statement(p)?;
    }
    m.complete(p, SyntaxKind::LabelStatement);
    Ok(())
}

/// GNU `__label__ a, b;`
fn local_label_declaration(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.bump();
    loop {
        if !p.at(SyntaxKind::Ident) {
            return Err(p.error(format!("expected a label name, found {}", p.describe_current())));
        }
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::Name);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::Semicolon)?;
    m.complete(p, SyntaxKind::DeclarationStatement);
    Ok(())
}

/// `catch (declaration) { ... }` handlers following a try block; at least one.
pub(crate) fn catch_handlers(p: &mut Parser<'_>) -> PResult {
    if !p.at(SyntaxKind::KwCatch) {
        return p.expect(SyntaxKind::KwCatch);
    }
    while p.at(SyntaxKind::KwCatch) {
        let m = p.start();
        p.bump();
        p.expect(SyntaxKind::LParen)?;
        p.oracle.push_scope();
        let result = catch_rest(p);
        p.oracle.pop_scope();
        result?;
        m.complete(p, SyntaxKind::CatchHandler);
    }
    Ok(())
}

fn catch_rest(p: &mut Parser<'_>) -> PResult {
    if !p.eat(SyntaxKind::Ellipsis) {
        declarator::parameter_declaration(p)?;
    }
    p.expect(SyntaxKind::RParen)?;
    compound_statement(p)
}
