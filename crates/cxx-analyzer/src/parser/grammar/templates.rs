//! Template declarations and their parameter lists.

use crate::parser::core::{PResult, Parser};
use crate::parser::grammar::decl::{self, DeclContext};
use crate::parser::grammar::{declarator, names, specifiers};
use crate::parser::oracle::NameClass;
use crate::syntax::kind::SyntaxKind;

/// `template <params> declaration`, or an explicit instantiation without `<`.
pub(crate) fn template_declaration(
    p: &mut Parser<'_>,
    ctx: DeclContext,
) -> PResult {
    let m = p.start();
    p.eat(SyntaxKind::KwExport);
    p.bump();
    if !p.at(SyntaxKind::Less) {
        decl::declaration(p, ctx)?;
        m.complete(p, SyntaxKind::ExplicitInstantiation);
        return Ok(());
    }

    p.oracle.push_template_scope();
    let saved = p.flags;
    let result = template_contents(p, ctx);
    p.flags = saved;
    p.oracle.pop_scope();
    result?;
    m.complete(p, SyntaxKind::TemplateDeclaration);
    Ok(())
}

fn template_contents(
    p: &mut Parser<'_>,
    ctx: DeclContext,
) -> PResult {
    template_parameter_list(p)?;
    p.flags.in_template = true;
    decl::declaration(p, ctx)
}

/// `extern template declaration`
pub(crate) fn explicit_instantiation(
    p: &mut Parser<'_>,
    ctx: DeclContext,
) -> PResult {
    let m = p.start();
    p.bump();
    p.bump();
    decl::declaration(p, ctx)?;
    m.complete(p, SyntaxKind::ExplicitInstantiation);
    Ok(())
}

pub(crate) fn template_parameter_list(p: &mut Parser<'_>) -> PResult {
    let m = p.start();
    p.expect(SyntaxKind::Less)?;
    let saved = p.flags;
    p.flags.no_greater = true;
    p.flags.in_template = false;
    let result = template_parameters(p);
    p.flags = saved;
    result?;
    p.expect(SyntaxKind::Greater)?;
    m.complete(p, SyntaxKind::TemplateParameterList);
    Ok(())
}

fn template_parameters(p: &mut Parser<'_>) -> PResult {
    if p.at(SyntaxKind::Greater) {
        return Ok(());
    }
    loop {
        template_parameter(p)?;
        if !p.eat(SyntaxKind::Comma) {
            return Ok(());
        }
    }
}

fn template_parameter(p: &mut Parser<'_>) -> PResult {
    let type_parameter = matches!(p.current(), SyntaxKind::KwClass | SyntaxKind::KwTypename)
        && matches!(
            p.nth(1),
            SyntaxKind::Ident | SyntaxKind::Comma | SyntaxKind::Greater | SyntaxKind::Equal | SyntaxKind::Ellipsis
        )
        && p.nth(2) != SyntaxKind::DoubleColon;
    if type_parameter {
        let m = p.start();
        p.bump();
        p.eat(SyntaxKind::Ellipsis);
        if p.at(SyntaxKind::Ident) {
            let text = p.current_text();
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
            p.oracle.declare_parameter(text, NameClass::Type);
        }
        if p.eat(SyntaxKind::Equal) {
            specifiers::type_id(p)?;
        }
        m.complete(p, SyntaxKind::TypeTemplateParameter);
        return Ok(());
    }

    if p.at(SyntaxKind::KwTemplate) {
        let m = p.start();
        p.bump();
        p.oracle.push_template_scope();
        let parameters = template_parameter_list(p);
        p.oracle.pop_scope();
        parameters?;
        if !p.eat(SyntaxKind::KwClass) && !p.eat(SyntaxKind::KwTypename) {
            return Err(p.error(format!("expected 'class', found {}", p.describe_current())));
        }
        p.eat(SyntaxKind::Ellipsis);
        if p.at(SyntaxKind::Ident) {
            let text = p.current_text();
            let name = p.start();
            p.bump();
            name.complete(p, SyntaxKind::Name);
            p.oracle.declare_parameter(text, NameClass::TypeTemplate);
        }
        if p.eat(SyntaxKind::Equal) {
            names::name(p)?;
        }
        m.complete(p, SyntaxKind::TemplateTemplateParameter);
        return Ok(());
    }

    declarator::parameter_declaration(p)
}
