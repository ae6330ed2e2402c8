//! Binding of references: finds the lookup a name needs from where it
//! appears in the tree, then runs it.

use crate::semantics::Semantics;
use crate::semantics::binding::{BindingId, BindingKind, ProblemKind};
use crate::semantics::lookup::{Filter, dedup};
use crate::semantics::overload::Argument;
use crate::semantics::scope::{ScopeId, ScopeKind};
use crate::semantics::types::Type;
use crate::syntax::ast::{
    AstNode, Declaration, Declarator, Expression, FieldReference, FunctionCallExpression, FunctionDefinition,
    NameRef,
};
use crate::syntax::cst::{SyntaxNode, SyntaxNodePtr};
use crate::syntax::helpers;
use crate::syntax::kind::SyntaxKind;

impl Semantics {
    /// The binding a name node denotes, computed once and memoized.
    pub(crate) fn resolve_name(
        &self,
        node: &SyntaxNode,
    ) -> BindingId {
        let ptr = SyntaxNodePtr::new(node);
        if let Some(&id) = self.declared.get(&ptr) {
            return id;
        }
        if let Some(id) = self.resolved.borrow().get(&ptr).copied() {
            return id;
        }
        if !self.resolving.borrow_mut().insert(ptr) {
            return self.problem(ProblemKind::NotFound, &helpers::compact_text(node), Vec::new());
        }
        let id = self.compute_reference(node);
        self.resolving.borrow_mut().remove(&ptr);
        self.resolved.borrow_mut().insert(ptr, id);
        id
    }

    /// The binding of whatever name `node` is or sits in.
    pub fn binding_at(
        &self,
        node: &SyntaxNode,
    ) -> Option<BindingId> {
        if let Some(id) = self.declared_binding(node) {
            return Some(id);
        }
        let name = node.ancestors().find(|ancestor| NameRef::can_cast(ancestor.kind()))?;
        Some(self.resolve_name(&name))
    }

    fn compute_reference(
        &self,
        node: &SyntaxNode,
    ) -> BindingId {
        let parent = node.parent();
        match parent.as_ref().map(SyntaxNode::kind) {
            Some(SyntaxKind::QualifiedName | SyntaxKind::PointerToMemberOp) => {
                if let Some(parent) = parent {
                    return self.resolve_component(node, &parent);
                }
            },
            Some(SyntaxKind::TemplateId) if node.kind() == SyntaxKind::Name => {
                if let Some(parent) = parent {
                    let specialization = self.resolve_name(&parent);
                    return self
                        .with_binding(specialization, |binding| {
                            binding.specialization.as_ref().map(|specialization| specialization.template)
                        })
                        .unwrap_or(specialization);
                }
            },
            Some(SyntaxKind::DestructorName) => {
                let scope = self.scope_of(node);
                let identifier = helpers::compact_text(node);
                let found = self.lookup_unqualified(&identifier, scope, node.text_range().start(), Filter::Types);
                return self.choose(&identifier, found, None);
            },
            _ => {},
        }
        self.resolve_reference(node)
    }

    /// A component of `A::B::c` or of the class path in `A::B::*`.
    fn resolve_component(
        &self,
        node: &SyntaxNode,
        container: &SyntaxNode,
    ) -> BindingId {
        let components: Vec<SyntaxNode> =
            container.children().filter(|child| NameRef::can_cast(child.kind())).collect();
        let index = components.iter().position(|component| component == node).unwrap_or(0);
        let qualified = container.kind() == SyntaxKind::QualifiedName;
        if qualified && index + 1 == components.len() {
            return self.resolve_name(container);
        }
        let Some(name) = NameRef::cast(node.clone()) else {
            return self.problem(ProblemKind::NotFound, &helpers::compact_text(node), Vec::new());
        };
        let identifier = name.identifier();
        let global = container
            .first_child_or_token()
            .is_some_and(|element| element.kind() == SyntaxKind::DoubleColon);
        let found = if index == 0 {
            if global {
                self.lookup_in(ScopeId::GLOBAL, &identifier, None, Filter::Qualifiers)
            } else {
                let scope = self.scope_of(node);
                self.lookup_unqualified(&identifier, scope, node.text_range().start(), Filter::Qualifiers)
            }
        } else {
            let previous = self.resolve_name(&components[index - 1]);
            if self.kind(previous).is_problem() {
                Vec::new()
            } else {
                self.lookup_qualified(previous, &identifier, Filter::Qualifiers)
            }
        };
        let id = self.choose(&identifier, found, None);
        self.specialize_reference(&name, id)
    }

    /// A whole name in its syntactic context.
    fn resolve_reference(
        &self,
        node: &SyntaxNode,
    ) -> BindingId {
        let Some(name) = NameRef::cast(node.clone()) else {
            return self.problem(ProblemKind::NotFound, &helpers::compact_text(node), Vec::new());
        };
        let identifier = name.identifier();
        let parent = node.parent();
        let context = parent.as_ref().map_or(SyntaxKind::TranslationUnit, SyntaxNode::kind);
        match (context, parent) {
            (SyntaxKind::FieldReference, Some(parent)) => return self.resolve_member_access(&name, &parent),
            (SyntaxKind::MemberInitializer, Some(parent)) => return self.resolve_member_initializer(&name, &parent),
            (SyntaxKind::Designator, Some(parent)) => return self.resolve_designator(&name, &parent),
            (SyntaxKind::GotoStatement, _) => return self.resolve_label(&name),
            (SyntaxKind::UnaryExpression, Some(parent))
                if helpers::child_token(&parent, SyntaxKind::AndAnd).is_some() && !name.is_qualified() =>
            {
                return self.resolve_label(&name);
            },
            _ => {},
        }
        let filter = match context {
            SyntaxKind::NamedTypeSpecifier | SyntaxKind::BaseSpecifier => Filter::Types,
            SyntaxKind::ElaboratedTypeSpecifier | SyntaxKind::ClassSpecifier | SyntaxKind::EnumSpecifier => {
                Filter::Tags
            },
            SyntaxKind::UsingDirective | SyntaxKind::NamespaceAlias | SyntaxKind::NamespaceDefinition => {
                Filter::Namespaces
            },
            _ => Filter::Ordinary,
        };
        let scope = self.scope_of(node);
        let found = self.lookup_name(&name, scope, node, filter);
        let call = self.call_arguments(node);
        let id = self.choose(&identifier, found, call.as_deref());
        self.specialize_reference(&name, id)
    }

    fn lookup_name(
        &self,
        name: &NameRef,
        scope: ScopeId,
        node: &SyntaxNode,
        filter: Filter,
    ) -> Vec<BindingId> {
        let identifier = name.identifier();
        if !name.is_qualified() {
            return self.lookup_unqualified(&identifier, scope, node.text_range().start(), filter);
        }
        match name.qualifier().last() {
            Some(last) => {
                let qualifier = self.resolve_name(last.syntax());
                if self.kind(qualifier).is_problem() {
                    return Vec::new();
                }
                self.lookup_qualified(qualifier, &identifier, filter)
            },
            None => self.lookup_in(ScopeId::GLOBAL, &identifier, None, filter),
        }
    }

    /// `object.member` and `pointer->member`.
    fn resolve_member_access(
        &self,
        name: &NameRef,
        field: &SyntaxNode,
    ) -> BindingId {
        let identifier = name.identifier();
        let Some(field) = FieldReference::cast(field.clone()) else {
            return self.problem(ProblemKind::NotFound, &identifier, Vec::new());
        };
        let Some(class) = self.accessed_class(&field) else {
            return self.problem(ProblemKind::NotFound, &identifier, Vec::new());
        };
        let found = match name.qualifier().last() {
            Some(last) => {
                let qualifier = self.resolve_name(last.syntax());
                self.lookup_qualified(qualifier, &identifier, Filter::Ordinary)
            },
            None => self.lookup_member(class, &identifier),
        };
        let call = self.call_arguments(field.syntax());
        let id = self.choose(&identifier, found, call.as_deref());
        self.specialize_reference(name, id)
    }

    /// The class whose members follow `.` or `->`.
    pub(crate) fn accessed_class(
        &self,
        field: &FieldReference,
    ) -> Option<BindingId> {
        let object = self.type_of_expression(&field.object()?);
        let accessed = if field.is_arrow() { object.value().pointee()?.value().clone() } else { object.value().clone() };
        accessed.class_binding()
    }

    pub(crate) fn lookup_member(
        &self,
        class: BindingId,
        name: &str,
    ) -> Vec<BindingId> {
        self.class_members(class, name, Filter::Ordinary, &mut Default::default())
    }

    /// A member or base class named in a constructor's initializer list.
    fn resolve_member_initializer(
        &self,
        name: &NameRef,
        initializer: &SyntaxNode,
    ) -> BindingId {
        let identifier = name.identifier();
        let class = initializer
            .ancestors()
            .find_map(FunctionDefinition::cast)
            .and_then(|definition| definition.declarator())
            .and_then(|declarator| declarator.declared_name())
            .and_then(|declared| self.declared_binding(declared.syntax()))
            .and_then(|function| self.with_binding(function, |binding| binding.owner))
            .filter(|&owner| matches!(self.kind(owner), BindingKind::Class(_)));
        if let Some(class) = class {
            let members = self.lookup_member(class, &identifier);
            if !members.is_empty() {
                return self.choose(&identifier, members, None);
            }
        }
        let scope = self.scope_of(initializer);
        let found = self.lookup_name(name, scope, initializer, Filter::Types);
        let id = self.choose(&identifier, found, None);
        self.specialize_reference(name, id)
    }

    /// `.field` in a designated initializer.
    fn resolve_designator(
        &self,
        name: &NameRef,
        designator: &SyntaxNode,
    ) -> BindingId {
        let identifier = name.identifier();
        let previous = designator
            .prev_sibling()
            .filter(|sibling| sibling.kind() == SyntaxKind::Designator);
        let ty = match previous {
            Some(previous) => match previous.children().find(|child| NameRef::can_cast(child.kind())) {
                Some(previous_name) => self.type_of(self.resolve_name(&previous_name)),
                None => self.element_type(&self.designated_type(designator)),
            },
            None => designator.parent().map_or(Type::Unknown, |designated| self.designated_type(&designated)),
        };
        match ty.value().class_binding() {
            Some(class) => {
                let found = self.lookup_member(class, &identifier);
                self.choose(&identifier, found, None)
            },
            None => self.problem(ProblemKind::NotFound, &identifier, Vec::new()),
        }
    }

    /// The type initialized by the braced list that contains `node`.
    fn designated_type(
        &self,
        node: &SyntaxNode,
    ) -> Type {
        let Some(list) = node.ancestors().find(|ancestor| ancestor.kind() == SyntaxKind::InitializerList) else {
            return Type::Unknown;
        };
        let Some(parent) = list.parent() else {
            return Type::Unknown;
        };
        match parent.kind() {
            SyntaxKind::EqualsInitializer | SyntaxKind::Declarator => {
                let declarator = if parent.kind() == SyntaxKind::Declarator { Some(parent) } else { parent.parent() };
                declarator
                    .and_then(Declarator::cast)
                    .and_then(|declarator| declarator.declared_name())
                    .and_then(|declared| self.declared_binding(declared.syntax()))
                    .map_or(Type::Unknown, |id| self.type_of(id))
            },
            SyntaxKind::CompoundLiteral => Expression::cast(parent).map_or(Type::Unknown, |literal| self.type_of_expression(&literal)),
            SyntaxKind::DesignatedInitializer => {
                let last = parent
                    .children()
                    .filter(|child| child.kind() == SyntaxKind::Designator)
                    .last()
                    .and_then(|designator| designator.children().find(|child| NameRef::can_cast(child.kind())));
                match last {
                    Some(last) => self.type_of(self.resolve_name(&last)),
                    None => Type::Unknown,
                }
            },
            SyntaxKind::InitializerList => self.element_type(&self.designated_type(&parent)),
            _ => Type::Unknown,
        }
    }

    fn element_type(
        &self,
        ty: &Type,
    ) -> Type {
        match ty.value() {
            Type::Array { element, .. } => (**element).clone(),
            other => other.clone(),
        }
    }

    fn resolve_label(
        &self,
        name: &NameRef,
    ) -> BindingId {
        let identifier = name.identifier();
        let scope = self.scope_of(name.syntax());
        self.lookup_label(&identifier, scope)
            .unwrap_or_else(|| self.problem(ProblemKind::NotFound, &identifier, Vec::new()))
    }

    /// Argument types when the name is the callee of a call.
    pub(crate) fn call_arguments(
        &self,
        node: &SyntaxNode,
    ) -> Option<Vec<Argument>> {
        let callee = if node.kind() == SyntaxKind::FieldReference {
            node.clone()
        } else {
            node.parent().filter(|parent| parent.kind() == SyntaxKind::IdExpression)?
        };
        let call = callee.parent().and_then(FunctionCallExpression::cast)?;
        if call.callee()?.syntax() != &callee {
            return None;
        }
        Some(self.arguments_of(&call))
    }

    pub(crate) fn arguments_of(
        &self,
        call: &FunctionCallExpression,
    ) -> Vec<Argument> {
        call.arguments()
            .map(|argument| Argument {
                ty: self.type_of_expression(&argument),
                null_pointer: is_null_constant(&argument),
            })
            .collect()
    }

    /// Picks one binding out of a lookup result.
    pub(crate) fn choose(
        &self,
        identifier: &str,
        mut found: Vec<BindingId>,
        call: Option<&[Argument]>,
    ) -> BindingId {
        dedup(&mut found);
        let functions = found.iter().all(|&id| self.kind(id).is_function());
        match found.as_slice() {
            [] => self.problem(ProblemKind::NotFound, identifier, Vec::new()),
            [only] if !functions || call.is_none() || self.dialect.is_c() => *only,
            [first, ..] if functions => match call {
                Some(arguments) if self.dialect.is_cpp() => self.select_overload(identifier, &found, arguments),
                _ => *first,
            },
            _ => {
                // A class and a typedef naming the same class are one entity.
                let types: Vec<Type> = found.iter().map(|&id| self.named_type(id)).collect();
                if types.iter().all(|ty| ty.is_known() && ty == &types[0]) {
                    return found[0];
                }
                self.problem(ProblemKind::Ambiguous, identifier, found)
            },
        }
    }

    /// Replaces a class or alias template named with arguments by its
    /// specialization.
    pub(crate) fn specialize_reference(
        &self,
        name: &NameRef,
        id: BindingId,
    ) -> BindingId {
        let Some(arguments) = name.template_arguments() else {
            return id;
        };
        let (kind, template) = self.with_binding(id, |binding| (binding.kind, binding.is_template()));
        if template && matches!(kind, BindingKind::Class(_) | BindingKind::Typedef) {
            self.specialize(id, &arguments)
        } else {
            id
        }
    }

    /// The innermost scope `node` is in. A class or enum header belongs to
    /// the enclosing scope; only the members are inside.
    pub fn scope_of(
        &self,
        node: &SyntaxNode,
    ) -> ScopeId {
        let mut child = node.clone();
        for ancestor in node.ancestors().skip(1) {
            if let Some(scope) = self.scopes.scope_of_node(&SyntaxNodePtr::new(&ancestor)) {
                let inside = match ancestor.kind() {
                    SyntaxKind::ClassSpecifier => Declaration::can_cast(child.kind()),
                    SyntaxKind::EnumSpecifier => child.kind() == SyntaxKind::Enumerator,
                    _ => true,
                };
                if inside {
                    return scope;
                }
                let data = self.scopes.get(scope);
                return match data.kind {
                    ScopeKind::Class | ScopeKind::Enumeration => data.parent.unwrap_or(ScopeId::GLOBAL),
                    _ => scope,
                };
            }
            child = ancestor;
        }
        ScopeId::GLOBAL
    }
}

/// `0`, `nullptr`, `NULL` after expansion, and `(void *)0`.
fn is_null_constant(expression: &Expression) -> bool {
    match expression {
        Expression::LiteralExpression(literal) => literal.token().is_some_and(|token| {
            token.kind() == SyntaxKind::KwNullptr || (token.kind() == SyntaxKind::Integer && is_zero(token.text()))
        }),
        Expression::ParenthesizedExpression(inner) => inner.inner().is_some_and(|inner| is_null_constant(&inner)),
        Expression::CastExpression(cast) => cast.operand().is_some_and(|operand| is_null_constant(&operand)),
        _ => false,
    }
}

fn is_zero(text: &str) -> bool {
    let digits = text.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
    !digits.is_empty() && digits.trim_start_matches("0x").trim_start_matches("0X").chars().all(|c| c == '0')
}
