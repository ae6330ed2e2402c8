//! Names: identifiers, qualified names, template-ids, operator, conversion
//! and destructor names.

use crate::parser::core::{CompletedMarker, PResult, Parser};
use crate::parser::grammar::{expr, specifiers};
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialName {
    Destructor,
    Operator,
    Conversion,
}

/// What the parser learned about a name it consumed.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedName<'i> {
    pub(crate) global: bool,
    pub(crate) components: Vec<&'i str>,
    /// The last component carries template arguments.
    pub(crate) template_args: bool,
    pub(crate) special: Option<SpecialName>,
    /// One of the components is the completion token.
    pub(crate) completion: bool,
}

impl<'i> ParsedName<'i> {
    pub(crate) fn is_simple(&self) -> bool {
        !self.global && self.components.len() == 1 && self.special.is_none() && !self.template_args
    }

    pub(crate) fn last(&self) -> Option<&'i str> {
        self.components.last().copied()
    }
}

/// Lookahead summary of the name at the cursor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NameInfo {
    pub(crate) class: Option<NameClass>,
    pub(crate) follow: SyntaxKind,
    pub(crate) follow2: SyntaxKind,
    pub(crate) completion: bool,
    pub(crate) special: bool,
    /// `A::A` or `A<T>::A`: names a constructor when followed by `(`.
    pub(crate) constructor_like: bool,
}

pub(crate) fn classify(
    p: &Parser<'_>,
    name: &ParsedName<'_>,
) -> Option<NameClass> {
    if name.special.is_some() || name.completion {
        return None;
    }
    p.oracle.classify(name.global, &name.components)
}

/// Parses the name at the cursor without consuming it.
pub(crate) fn peek_name(p: &mut Parser<'_>) -> Option<NameInfo> {
    p.lookahead(|p| {
        let (_, parsed) = name(p).ok()?;
        let constructor_like = parsed.components.len() >= 2
            && parsed.special.is_none()
            && parsed.components[parsed.components.len() - 1] == parsed.components[parsed.components.len() - 2];
        Some(NameInfo {
            class: classify(p, &parsed),
            follow: p.current(),
            follow2: p.nth(1),
            completion: parsed.completion,
            special: parsed.special.is_some(),
            constructor_like,
        })
    })
}

pub(crate) fn at_name_start(p: &Parser<'_>) -> bool {
    p.at_name() || p.at(SyntaxKind::DoubleColon) || (p.is_cpp() && (p.at(SyntaxKind::Tilde) || p.at(SyntaxKind::KwOperator)))
}

/// A possibly qualified id: `x`, `::x`, `A::B<int>::c`, `A::~A`, `operator+`.
pub(crate) fn name<'i>(p: &mut Parser<'i>) -> PResult<(CompletedMarker, ParsedName<'i>)> {
    let m = p.start();
    let mut parsed = ParsedName::default();
    if p.is_cpp() && p.at(SyntaxKind::DoubleColon) {
        p.bump();
        parsed.global = true;
    }

    let mut last = None;
    let mut count = 0;
    loop {
        if p.is_cpp() && p.at(SyntaxKind::Tilde) {
            last = Some(destructor_name(p, &mut parsed)?);
            count += 1;
            break;
        }
        if p.is_cpp() && p.at(SyntaxKind::KwOperator) {
            last = Some(operator_name(p, &mut parsed)?);
            count += 1;
            break;
        }
        if count > 0 && p.at(SyntaxKind::KwTemplate) {
            p.bump();
        }
        if !p.at_name() {
            if p.past_completion() && count > 0 {
                break;
            }
            return Err(p.error(format!("expected a name, found {}", p.describe_current())));
        }
        let component = name_component(p, &parsed)?;
        parsed.components.push(component.text);
        parsed.template_args = component.template_args;
        parsed.completion |= component.completion;
        last = Some(component.marker);
        count += 1;

        let continues = p.is_cpp()
            && p.at(SyntaxKind::DoubleColon)
            && !component.completion
            && (p.nth(1).is_name_token() || matches!(p.nth(1), SyntaxKind::Tilde | SyntaxKind::KwOperator | SyntaxKind::KwTemplate));
        if !continues {
            break;
        }
        p.bump();
    }

    match last {
        Some(marker) if count == 1 && !parsed.global => {
            m.abandon(p);
            Ok((marker, parsed))
        },
        _ => Ok((m.complete(p, SyntaxKind::QualifiedName), parsed)),
    }
}

pub(crate) struct Component<'i> {
    pub(crate) marker: CompletedMarker,
    pub(crate) text: &'i str,
    pub(crate) template_args: bool,
    pub(crate) completion: bool,
}

/// One identifier, with template arguments when `<` opens a list here.
pub(crate) fn name_component<'i>(
    p: &mut Parser<'i>,
    qualifier: &ParsedName<'i>,
) -> PResult<Component<'i>> {
    let text = p.current_text();
    let completion = p.at(SyntaxKind::CompletionName);
    let m = p.start();
    p.bump();
    let marker = m.complete(p, SyntaxKind::Name);

    if !p.is_cpp() || completion || !p.at(SyntaxKind::Less) {
        return Ok(Component {
            marker,
            text,
            template_args: false,
            completion,
        });
    }

    let mut components = qualifier.components.clone();
    components.push(text);
    let class = p.oracle.classify(qualifier.global, &components);
    let known_template = class.is_some_and(NameClass::is_template);
    let worth_trying = match class {
        Some(class) => class.is_template(),
        // Unknown names: accept the argument list only if what follows could follow a template-id.
        None => true,
    };
    if !worth_trying {
        return Ok(Component {
            marker,
            text,
            template_args: false,
            completion,
        });
    }

    let result = p.speculate(|p| {
        let m = marker.precede(p);
        template_argument_list(p)?;
        if !known_template && !can_follow_template_id(p) {
            return Err(p.error("not a template argument list"));
        }
        Ok(m.complete(p, SyntaxKind::TemplateId))
    });
    match result {
        Ok(marker) => Ok(Component {
            marker,
            text,
            template_args: true,
            completion,
        }),
        Err(_) => Ok(Component {
            marker,
            text,
            template_args: false,
            completion,
        }),
    }
}

fn can_follow_template_id(p: &Parser<'_>) -> bool {
    matches!(
        p.current(),
        SyntaxKind::LParen
            | SyntaxKind::RParen
            | SyntaxKind::DoubleColon
            | SyntaxKind::Comma
            | SyntaxKind::Semicolon
            | SyntaxKind::LBrace
            | SyntaxKind::RBrace
            | SyntaxKind::RBracket
            | SyntaxKind::Greater
            | SyntaxKind::Equal
            | SyntaxKind::Dot
            | SyntaxKind::Arrow
            | SyntaxKind::Ellipsis
            | SyntaxKind::Amp
            | SyntaxKind::AndAnd
            | SyntaxKind::Star
            | SyntaxKind::Ident
            | SyntaxKind::Eof
    )
}

/// `< arg, ... >`
pub(crate) fn template_argument_list(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.expect(SyntaxKind::Less)?;
    let saved = p.flags;
    p.flags.no_greater = true;
    if !p.at(SyntaxKind::Greater) {
        loop {
            template_argument(p)?;
            p.eat(SyntaxKind::Ellipsis);
            if !p.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }
    p.flags = saved;
    p.expect(SyntaxKind::Greater)?;
    m.complete(p, SyntaxKind::TemplateArgumentList);
    Ok(())
}

fn template_argument(p: &mut Parser<'_>) -> PResult {
    let as_type = p.speculate(|p| {
        specifiers::type_id(p)?;
        if matches!(p.current(), SyntaxKind::Comma | SyntaxKind::Greater | SyntaxKind::Ellipsis) {
            Ok(())
        } else {
            Err(p.error("not a type argument"))
        }
    });
    if as_type.is_ok() {
        return Ok(());
    }
    expr::assignment_expression(p)?;
    Ok(())
}

fn destructor_name<'i>(
    p: &mut Parser<'i>,
    parsed: &mut ParsedName<'i>,
) -> PResult<CompletedMarker> {
    let m = p.start();
    p.bump();
    if !p.at_name() {
        return Err(p.error("expected a class name after '~'"));
    }
    let component = name_component(p, parsed)?;
    parsed.components.push(component.text);
    parsed.completion |= component.completion;
    parsed.special = Some(SpecialName::Destructor);
    Ok(m.complete(p, SyntaxKind::DestructorName))
}

/// `operator +`, `operator()`, `operator new[]`, or a conversion `operator T*`.
fn operator_name<'i>(
    p: &mut Parser<'i>,
    parsed: &mut ParsedName<'i>,
) -> PResult<CompletedMarker> {
    let m = p.start();
    p.bump();
    let kind = p.current();
    match kind {
        SyntaxKind::LParen if p.nth(1) == SyntaxKind::RParen => {
            p.bump();
            p.bump();
        },
        SyntaxKind::LBracket if p.nth(1) == SyntaxKind::RBracket => {
            p.bump();
            p.bump();
        },
        SyntaxKind::KwNew | SyntaxKind::KwDelete => {
            p.bump();
            if p.at(SyntaxKind::LBracket) && p.nth(1) == SyntaxKind::RBracket {
                p.bump();
                p.bump();
            }
        },
        SyntaxKind::Greater if p.at_split_shift().is_some() => {
            let shift = p.at_split_shift().unwrap_or(SyntaxKind::RightShift);
            p.bump_as(shift, 2);
        },
        kind if queries::is_overloadable_operator(kind) => p.bump(),
        _ => {
            specifiers::conversion_type(p)?;
            parsed.special = Some(SpecialName::Conversion);
            parsed.components.push("operator");
            return Ok(m.complete(p, SyntaxKind::ConversionName));
        },
    }
    parsed.special = Some(SpecialName::Operator);
    parsed.components.push("operator");
    Ok(m.complete(p, SyntaxKind::OperatorName))
}
