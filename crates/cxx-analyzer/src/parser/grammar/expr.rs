//! Expressions, by descending precedence.

use crate::parser::core::{CompletedMarker, PResult, Parser};
use crate::parser::grammar::declarator::{self, DeclaratorContext};
use crate::parser::grammar::specifiers::{self, SpecContext};
use crate::parser::grammar::{names, stmt};
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

/// GNU builtins whose arguments may be type-ids.
const TYPE_ARGUMENT_BUILTINS: &[&str] = &["__builtin_va_arg", "__builtin_offsetof", "__builtin_types_compatible_p"];

pub(crate) fn expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let mut lhs = assignment_expression(p)?;
    while p.at(SyntaxKind::Comma) {
        let m = lhs.precede(p);
        p.bump();
        assignment_expression(p)?;
        lhs = m.complete(p, SyntaxKind::BinaryExpression);
    }
    Ok(lhs)
}

pub(crate) fn assignment_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    p.nested(|p| {
        if p.is_cpp() && p.at(SyntaxKind::KwThrow) {
            let m = p.start();
            p.bump();
            if can_start_expression(p) {
                assignment_expression(p)?;
            }
            return Ok(m.complete(p, SyntaxKind::UnaryExpression));
        }
        let lhs = conditional_expression(p)?;
        let operator = if queries::is_assignment_operator(p.current()) {
            Some((p.current(), 1))
        } else if !p.flags.no_greater && p.at_split_shift() == Some(SyntaxKind::RightShiftEqual) {
            Some((SyntaxKind::RightShiftEqual, 2))
        } else {
            None
        };
        let Some((kind, n_raw)) = operator else {
            return Ok(lhs);
        };
        let m = lhs.precede(p);
        p.bump_as(kind, n_raw);
        if p.is_cpp() && p.at(SyntaxKind::LBrace) {
            declarator::initializer_list(p)?;
        } else {
            assignment_expression(p)?;
        }
        Ok(m.complete(p, SyntaxKind::BinaryExpression))
    })
}

pub(crate) fn conditional_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let condition = binary_expression(p, 1)?;
    if !p.at(SyntaxKind::Question) {
        return Ok(condition);
    }
    let m = condition.precede(p);
    p.bump();
    // GNU `a ?: b` omits the middle operand.
    if !(p.gnu() && p.at(SyntaxKind::Colon)) {
        let saved = p.flags;
        p.flags.no_greater = false;
        let middle = expression(p);
        p.flags = saved;
        middle?;
    }
    p.expect(SyntaxKind::Colon)?;
    assignment_expression(p)?;
    Ok(m.complete(p, SyntaxKind::ConditionalExpression))
}

fn binary_operator(p: &Parser<'_>) -> Option<(SyntaxKind, u8)> {
    if let Some(shift) = p.at_split_shift() {
        return (shift == SyntaxKind::RightShift && !p.flags.no_greater).then_some((shift, 2));
    }
    let kind = p.current();
    match kind {
        SyntaxKind::Greater | SyntaxKind::GreaterEqual if p.flags.no_greater => None,
        SyntaxKind::Min | SyntaxKind::Max if !p.gnu() => None,
        SyntaxKind::DotStar | SyntaxKind::ArrowStar if !p.is_cpp() => None,
        _ => queries::binary_precedence(kind).map(|_| (kind, 1)),
    }
}

/// Precedence climbing over the binary operators binding at least `min`.
fn binary_expression(
    p: &mut Parser<'_>,
    min: u8,
) -> PResult<CompletedMarker> {
    let mut lhs = cast_expression(p)?;
    while let Some((kind, n_raw)) = binary_operator(p) {
        let precedence = queries::binary_precedence(kind).unwrap_or(0);
        if precedence < min {
            break;
        }
        let m = lhs.precede(p);
        p.bump_as(kind, n_raw);
        p.nested(|p| binary_expression(p, precedence + 1))?;
        let node = if matches!(kind, SyntaxKind::DotStar | SyntaxKind::ArrowStar) {
            SyntaxKind::PointerToMemberExpression
        } else {
            SyntaxKind::BinaryExpression
        };
        lhs = m.complete(p, node);
    }
    Ok(lhs)
}

pub(crate) fn cast_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    if p.at(SyntaxKind::LParen) && cast_ahead(p) {
        let cast = p.speculate(|p| {
            let m = p.start();
            p.bump();
            specifiers::type_id(p)?;
            p.expect(SyntaxKind::RParen)?;
            if p.at(SyntaxKind::LBrace) {
                if !(p.dialect.c99 || p.gnu() || p.is_cpp()) {
                    return Err(p.error("compound literals are not enabled"));
                }
                declarator::initializer_list(p)?;
                let literal = m.complete(p, SyntaxKind::CompoundLiteral);
                return postfix_tail(p, literal);
            }
            if !can_start_expression(p) {
                return Err(p.error(format!("expected an expression after cast, found {}", p.describe_current())));
            }
            p.nested(cast_expression)?;
            Ok(m.complete(p, SyntaxKind::CastExpression))
        });
        if let Ok(cast) = cast {
            return Ok(cast);
        }
    }
    unary_expression(p)
}

/// `(` followed by something that can only start a type.
fn cast_ahead(p: &mut Parser<'_>) -> bool {
    let next = p.nth(1);
    if queries::starts_decl_specifier(next) {
        return true;
    }
    if !matches!(next, SyntaxKind::Ident | SyntaxKind::DoubleColon) {
        return false;
    }
    p.lookahead(|p| {
        p.bump();
        names::peek_name(p).and_then(|info| info.class).is_some_and(|class| class.is_type())
    })
}

fn unary_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    match p.current() {
        SyntaxKind::PlusPlus
        | SyntaxKind::MinusMinus
        | SyntaxKind::Star
        | SyntaxKind::Amp
        | SyntaxKind::Plus
        | SyntaxKind::Minus
        | SyntaxKind::Exclaim
        | SyntaxKind::Tilde
        | SyntaxKind::KwExtension => {
            let m = p.start();
            p.bump();
            p.nested(cast_expression)?;
            Ok(m.complete(p, SyntaxKind::UnaryExpression))
        },
        SyntaxKind::AndAnd if p.gnu() => {
            let m = p.start();
            p.bump();
            if !p.at(SyntaxKind::Ident) {
                return Err(p.error("expected a label name after '&&'"));
            }
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
            Ok(m.complete(p, SyntaxKind::UnaryExpression))
        },
        SyntaxKind::KwSizeof | SyntaxKind::KwAlignof => size_expression(p),
        SyntaxKind::KwNoexcept if p.is_cpp() => {
            let m = p.start();
            p.bump();
            p.expect(SyntaxKind::LParen)?;
            parenthesized_contents(p)?;
            p.expect(SyntaxKind::RParen)?;
            Ok(m.complete(p, SyntaxKind::UnaryExpression))
        },
        SyntaxKind::KwNew if p.is_cpp() => new_expression(p),
        SyntaxKind::KwDelete if p.is_cpp() => delete_expression(p),
        SyntaxKind::DoubleColon if p.is_cpp() && p.nth(1) == SyntaxKind::KwNew => new_expression(p),
        SyntaxKind::DoubleColon if p.is_cpp() && p.nth(1) == SyntaxKind::KwDelete => delete_expression(p),
        _ => postfix_expression(p),
    }
}

/// `sizeof expr`, `sizeof(type)`, `sizeof...(pack)`, `alignof(type)`
fn size_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let m = p.start();
    p.bump();
    if p.is_cpp() && p.eat(SyntaxKind::Ellipsis) {
        p.expect(SyntaxKind::LParen)?;
        names::name(p)?;
        p.expect(SyntaxKind::RParen)?;
        return Ok(m.complete(p, SyntaxKind::UnaryExpression));
    }
    if p.at(SyntaxKind::LParen) {
        let as_type = p.speculate(|p| {
            p.bump();
            let saved = p.flags;
            p.flags.no_greater = false;
            let ty = specifiers::type_id(p);
            p.flags = saved;
            ty?;
            p.expect(SyntaxKind::RParen)?;
            if p.at(SyntaxKind::LBrace) {
                return Err(p.error("compound literal operand"));
            }
            Ok(())
        });
        if as_type.is_ok() {
            return Ok(m.complete(p, SyntaxKind::TypeIdExpression));
        }
    }
    p.nested(unary_expression)?;
    Ok(m.complete(p, SyntaxKind::UnaryExpression))
}

fn new_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let m = p.start();
    p.eat(SyntaxKind::DoubleColon);
    p.bump();
    if p.at(SyntaxKind::LParen) {
        // Placement arguments, unless the parentheses hold the type itself.
        let _ = p.speculate(|p| {
            argument_list(p, false)?;
            if p.at(SyntaxKind::LParen) || specifier_or_name(p) {
                Ok(())
            } else {
                Err(p.error("not a placement"))
            }
        });
    }
    if p.at(SyntaxKind::LParen) {
        p.bump();
        specifiers::type_id(p)?;
        p.expect(SyntaxKind::RParen)?;
    } else {
        let ty = p.start();
        let specs = specifiers::decl_specifiers(p, SpecContext::TypeId, false)?;
        if !specs.has_type {
            return Err(p.error(format!("expected a type after 'new', found {}", p.describe_current())));
        }
        declarator::declarator(p, DeclaratorContext::new_type())?;
        ty.complete(p, SyntaxKind::TypeId);
    }
    if p.at(SyntaxKind::LParen) {
        argument_list(p, false)?;
    } else if p.at(SyntaxKind::LBrace) {
        declarator::initializer_list(p)?;
    }
    Ok(m.complete(p, SyntaxKind::NewExpression))
}

fn specifier_or_name(p: &Parser<'_>) -> bool {
    queries::starts_decl_specifier(p.current()) || p.at(SyntaxKind::Ident) || p.at(SyntaxKind::DoubleColon)
}

fn delete_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let m = p.start();
    p.eat(SyntaxKind::DoubleColon);
    p.bump();
    if p.at(SyntaxKind::LBracket) && p.nth(1) == SyntaxKind::RBracket {
        p.bump();
        p.bump();
    }
    p.nested(cast_expression)?;
    Ok(m.complete(p, SyntaxKind::DeleteExpression))
}

fn postfix_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let primary = primary_expression(p)?;
    postfix_tail(p, primary)
}

fn postfix_tail(
    p: &mut Parser<'_>,
    mut lhs: CompletedMarker,
) -> PResult<CompletedMarker> {
    loop {
        lhs = match p.current() {
            SyntaxKind::LBracket if !(p.is_cpp() && p.nth(1) == SyntaxKind::LBracket) => {
                let m = lhs.precede(p);
                p.bump();
                let saved = p.flags;
                p.flags.no_greater = false;
                let index = if p.is_cpp() && p.at(SyntaxKind::LBrace) {
                    declarator::initializer_list(p)
                } else {
                    expression(p).map(drop)
                };
                p.flags = saved;
                index?;
                p.expect(SyntaxKind::RBracket)?;
                m.complete(p, SyntaxKind::ArraySubscriptExpression)
            },
            SyntaxKind::LParen => {
                let m = lhs.precede(p);
                argument_list(p, false)?;
                m.complete(p, SyntaxKind::FunctionCallExpression)
            },
            SyntaxKind::Dot | SyntaxKind::Arrow => {
                let m = lhs.precede(p);
                p.bump();
                if p.is_cpp() {
                    p.eat(SyntaxKind::KwTemplate);
                }
                if !p.past_completion() {
                    names::name(p)?;
                }
                m.complete(p, SyntaxKind::FieldReference)
            },
            SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => {
                let m = lhs.precede(p);
                p.bump();
                m.complete(p, SyntaxKind::PostfixExpression)
            },
            _ => return Ok(lhs),
        };
    }
}

/// `( arguments )`; with `types`, each argument may be a type-id.
fn argument_list(
    p: &mut Parser<'_>,
    types: bool,
) -> PResult {
    let m = p.start();
    p.expect(SyntaxKind::LParen)?;
    let saved = p.flags;
    p.flags.no_greater = false;
    let result = arguments(p, types);
    p.flags = saved;
    result?;
    p.expect(SyntaxKind::RParen)?;
    m.complete(p, SyntaxKind::ArgumentList);
    Ok(())
}

fn arguments(
    p: &mut Parser<'_>,
    types: bool,
) -> PResult {
    if p.at(SyntaxKind::RParen) {
        return Ok(());
    }
    loop {
        let as_type = types
            && p
                .speculate(|p| {
                    specifiers::type_id(p)?;
                    if matches!(p.current(), SyntaxKind::Comma | SyntaxKind::RParen) {
                        Ok(())
                    } else {
                        Err(p.error("not a type argument"))
                    }
                })
                .is_ok();
        if !as_type {
            declarator::initializer_clause(p)?;
        }
        p.eat(SyntaxKind::Ellipsis);
        if !p.eat(SyntaxKind::Comma) {
            return Ok(());
        }
    }
}

/// Contents of parentheses, with `>` comparing again.
fn parenthesized_contents(p: &mut Parser<'_>) -> PResult {
    let saved = p.flags;
    p.flags.no_greater = false;
    let result = expression(p);
    p.flags = saved;
    result.map(drop)
}

fn primary_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    match p.current() {
        SyntaxKind::Integer
        | SyntaxKind::Float
        | SyntaxKind::Char
        | SyntaxKind::KwTrue
        | SyntaxKind::KwFalse
        | SyntaxKind::KwNullptr
        | SyntaxKind::KwThis => {
            let m = p.start();
            p.bump();
            Ok(m.complete(p, SyntaxKind::LiteralExpression))
        },
        SyntaxKind::String => {
            let m = p.start();
            while p.eat(SyntaxKind::String) {}
            Ok(m.complete(p, SyntaxKind::LiteralExpression))
        },
        SyntaxKind::LParen if p.gnu() && p.nth(1) == SyntaxKind::LBrace => {
            let m = p.start();
            p.bump();
            let saved = p.flags;
            p.flags = Default::default();
            let body = stmt::compound_statement(p);
            p.flags = saved;
            body?;
            p.expect(SyntaxKind::RParen)?;
            Ok(m.complete(p, SyntaxKind::StatementExpression))
        },
        SyntaxKind::LParen => {
            let m = p.start();
            p.bump();
            parenthesized_contents(p)?;
            p.expect(SyntaxKind::RParen)?;
            Ok(m.complete(p, SyntaxKind::ParenthesizedExpression))
        },
        SyntaxKind::LBracket if p.is_cpp() => lambda_expression(p),
        SyntaxKind::KwStaticCast
        | SyntaxKind::KwDynamicCast
        | SyntaxKind::KwConstCast
        | SyntaxKind::KwReinterpretCast => {
            let m = p.start();
            p.bump();
            p.expect(SyntaxKind::Less)?;
            let saved = p.flags;
            p.flags.no_greater = true;
            let ty = specifiers::type_id(p);
            p.flags = saved;
            ty?;
            p.expect(SyntaxKind::Greater)?;
            p.expect(SyntaxKind::LParen)?;
            parenthesized_contents(p)?;
            p.expect(SyntaxKind::RParen)?;
            Ok(m.complete(p, SyntaxKind::NamedCastExpression))
        },
        SyntaxKind::KwTypeid => {
            let m = p.start();
            p.bump();
            p.expect(SyntaxKind::LParen)?;
            let as_type = p
                .speculate(|p| {
                    specifiers::type_id(p)?;
                    if p.at(SyntaxKind::RParen) { Ok(()) } else { Err(p.error("not a type")) }
                })
                .is_ok();
            if !as_type {
                parenthesized_contents(p)?;
            }
            p.expect(SyntaxKind::RParen)?;
            Ok(m.complete(p, SyntaxKind::TypeIdExpression))
        },
        kind if p.is_cpp() && (queries::is_builtin_type_keyword(kind) || kind == SyntaxKind::KwTypename) => {
            let m = p.start();
            let specs = p.start();
            if p.eat(SyntaxKind::KwTypename) {
                let named = p.start();
                names::name(p)?;
                named.complete(p, SyntaxKind::NamedTypeSpecifier);
            } else {
                while queries::is_builtin_type_keyword(p.current()) {
                    p.bump();
                }
            }
            specs.complete(p, SyntaxKind::DeclSpecifierSeq);
            type_constructor_arguments(p)?;
            Ok(m.complete(p, SyntaxKind::SimpleTypeConstructorExpression))
        },
        SyntaxKind::Ident
            if p.gnu() && p.nth(1) == SyntaxKind::LParen && TYPE_ARGUMENT_BUILTINS.contains(&p.current_text()) =>
        {
            let m = p.start();
            let callee = p.start();
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
            callee.complete(p, SyntaxKind::IdExpression);
            argument_list(p, true)?;
            Ok(m.complete(p, SyntaxKind::FunctionCallExpression))
        },
        SyntaxKind::Ident | SyntaxKind::CompletionName | SyntaxKind::DoubleColon | SyntaxKind::KwOperator => {
            id_expression(p)
        },
        SyntaxKind::Tilde if p.is_cpp() && p.nth(1) == SyntaxKind::Ident && p.nth(2) == SyntaxKind::LParen => {
            id_expression(p)
        },
        _ => Err(p.error(format!("expected an expression, found {}", p.describe_current()))),
    }
}

/// A name, or `T(args)` / `T{args}` when the name is a type.
fn id_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let m = p.start();
    let (name, parsed) = names::name(p)?;
    let is_type = p.is_cpp()
        && matches!(p.current(), SyntaxKind::LParen | SyntaxKind::LBrace)
        && names::classify(p, &parsed).is_some_and(|class| class.is_type());
    if !is_type {
        return Ok(m.complete(p, SyntaxKind::IdExpression));
    }
    let named = name.precede(p);
    let named = named.complete(p, SyntaxKind::NamedTypeSpecifier);
    named.precede(p).complete(p, SyntaxKind::DeclSpecifierSeq);
    type_constructor_arguments(p)?;
    Ok(m.complete(p, SyntaxKind::SimpleTypeConstructorExpression))
}

fn type_constructor_arguments(p: &mut Parser<'_>) -> PResult {
    if p.at(SyntaxKind::LBrace) {
        declarator::initializer_list(p)
    } else {
        argument_list(p, false)
    }
}

/// `[captures](params) mutable -> ret { body }`
fn lambda_expression(p: &mut Parser<'_>) -> PResult<CompletedMarker> {
    let m = p.start();
    let capture = p.start();
    p.bump();
    let mut depth = 1usize;
    while depth > 0 {
        match p.current() {
            SyntaxKind::Eof => return Err(p.error("unterminated lambda capture")),
            SyntaxKind::LBracket => depth += 1,
            SyntaxKind::RBracket => depth -= 1,
            _ => {},
        }
        p.bump();
    }
    capture.complete(p, SyntaxKind::LambdaCapture);

    let scope = if p.at(SyntaxKind::LParen) {
        let (scope, _) = declarator::parameter_list(p)?;
        loop {
            if p.at(SyntaxKind::KwMutable) || p.at(SyntaxKind::KwConstexpr) {
                p.bump();
            } else if p.at(SyntaxKind::KwNoexcept) || p.at(SyntaxKind::KwThrow) {
                let spec = p.start();
                p.bump();
                if p.at(SyntaxKind::LParen) {
                    p.bump();
                    let mut depth = 1usize;
                    while depth > 0 && !p.at_eof() {
                        match p.current() {
                            SyntaxKind::LParen => depth += 1,
                            SyntaxKind::RParen => depth -= 1,
                            _ => {},
                        }
                        p.bump();
                    }
                }
                spec.complete(p, SyntaxKind::ExceptionSpecification);
            } else if p.at(SyntaxKind::KwAttribute) {
                specifiers::attribute_specifier(p)?;
            } else {
                break;
            }
        }
        if p.at(SyntaxKind::Arrow) {
            let ret = p.start();
            p.bump();
            specifiers::type_id(p)?;
            ret.complete(p, SyntaxKind::TrailingReturn);
        }
        Some(scope)
    } else {
        None
    };

    if let Some(scope) = scope {
        p.oracle.enter(scope);
    }
    let saved = p.flags;
    p.flags = Default::default();
    let body = stmt::compound_statement(p);
    p.flags = saved;
    if scope.is_some() {
        p.oracle.pop_scope();
    }
    body?;
    Ok(m.complete(p, SyntaxKind::LambdaExpression))
}

/// Whether an expression can begin at the cursor.
pub(crate) fn can_start_expression(p: &Parser<'_>) -> bool {
    match p.current() {
        SyntaxKind::Integer
        | SyntaxKind::Float
        | SyntaxKind::Char
        | SyntaxKind::String
        | SyntaxKind::Ident
        | SyntaxKind::CompletionName
        | SyntaxKind::LParen
        | SyntaxKind::PlusPlus
        | SyntaxKind::MinusMinus
        | SyntaxKind::Star
        | SyntaxKind::Amp
        | SyntaxKind::Plus
        | SyntaxKind::Minus
        | SyntaxKind::Exclaim
        | SyntaxKind::Tilde
        | SyntaxKind::KwSizeof
        | SyntaxKind::KwAlignof
        | SyntaxKind::KwExtension => true,
        SyntaxKind::AndAnd => p.gnu(),
        SyntaxKind::DoubleColon
        | SyntaxKind::LBracket
        | SyntaxKind::KwThis
        | SyntaxKind::KwTrue
        | SyntaxKind::KwFalse
        | SyntaxKind::KwNullptr
        | SyntaxKind::KwNew
        | SyntaxKind::KwDelete
        | SyntaxKind::KwThrow
        | SyntaxKind::KwTypeid
        | SyntaxKind::KwNoexcept
        | SyntaxKind::KwOperator
        | SyntaxKind::KwTypename
        | SyntaxKind::KwStaticCast
        | SyntaxKind::KwDynamicCast
        | SyntaxKind::KwConstCast
        | SyntaxKind::KwReinterpretCast => p.is_cpp(),
        kind => p.is_cpp() && queries::is_builtin_type_keyword(kind),
    }
}
