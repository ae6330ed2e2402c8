//! Template specialization, argument deduction and substitution, and the
//! base classes of (possibly specialized) classes.

use std::collections::HashMap;

use crate::semantics::Semantics;
use crate::semantics::binding::{Binding, BindingId, BindingKind, ProblemKind, Specialization, TemplateArgument};
use crate::semantics::overload::Argument;
use crate::semantics::scope::EntryTarget;
use crate::semantics::types::{FunctionType, Type};
use crate::syntax::ast::{AstNode, ClassSpecifier, Expression, TemplateArgumentList, TypeId, TypeTemplateParameter};
use crate::syntax::cst::{SyntaxNode, SyntaxNodePtr};
use crate::syntax::helpers;

/// Template parameter bindings to the arguments standing in for them.
pub(crate) type ArgumentMap = HashMap<BindingId, TemplateArgument>;

impl Semantics {
    /// The specialization of a class or alias template for the written
    /// arguments.
    pub(crate) fn specialize(
        &self,
        template: BindingId,
        arguments: &TemplateArgumentList,
    ) -> BindingId {
        let arguments = self.argument_values(arguments);
        self.specialize_with(template, arguments)
    }

    /// Explicit specializations are matched first; otherwise a new binding
    /// shares the template's members. Results are memoized per argument list.
    pub(crate) fn specialize_with(
        &self,
        template: BindingId,
        mut arguments: Vec<TemplateArgument>,
    ) -> BindingId {
        let depth = self.instantiation_depth.get();
        if depth >= self.limits.max_instantiation_depth {
            let name = self.name(template);
            tracing::debug!(%name, depth, "instantiation depth exceeded");
            return self.problem(ProblemKind::InstantiationDepth, &name, vec![template]);
        }
        self.instantiation_depth.set(depth + 1);
        self.fill_defaults(template, &mut arguments);
        let id = self.find_specialization(template, arguments);
        self.instantiation_depth.set(depth);
        id
    }

    fn find_specialization(
        &self,
        template: BindingId,
        arguments: Vec<TemplateArgument>,
    ) -> BindingId {
        let key = (template, arguments);
        if let Some(&id) = self.specializations.borrow().get(&key) {
            return id;
        }
        let (template, arguments) = key;
        let explicit = self.explicit_specializations.get(&template).cloned().unwrap_or_default();
        for candidate in explicit {
            if self.explicit_arguments(candidate.binding, candidate.arguments) == arguments {
                self.bindings.borrow_mut().get_mut(candidate.binding).specialization = Some(Specialization {
                    template,
                    arguments: arguments.clone(),
                    explicit: true,
                });
                self.specializations.borrow_mut().insert((template, arguments), candidate.binding);
                return candidate.binding;
            }
        }
        let mut binding = self.with_binding(template, |primary| {
            let mut binding = Binding::new(primary.name.clone(), primary.kind, primary.scope);
            binding.declarations = primary.declarations.clone();
            binding.definition = primary.definition;
            binding.owner = primary.owner;
            binding
        });
        binding.specialization = Some(Specialization {
            template,
            arguments: arguments.clone(),
            explicit: false,
        });
        let id = self.add_binding(binding);
        self.specialization_levels.borrow_mut().insert(id, self.instantiation_depth.get());
        tracing::trace!(template = %self.name(template), "specialized");
        self.specializations.borrow_mut().insert((template, arguments), id);
        id
    }

    /// Arguments an explicit specialization was declared for, computed on
    /// first use.
    fn explicit_arguments(
        &self,
        specialization: BindingId,
        arguments: SyntaxNodePtr,
    ) -> Vec<TemplateArgument> {
        if let Some(known) = self.explicit_arguments.borrow().get(&specialization) {
            return known.clone();
        }
        let values = arguments
            .try_to_node(&self.root)
            .and_then(TemplateArgumentList::cast)
            .map(|list| self.argument_values(&list))
            .unwrap_or_default();
        self.explicit_arguments.borrow_mut().insert(specialization, values.clone());
        values
    }

    /// Appends default arguments for trailing parameters left unspecified.
    fn fill_defaults(
        &self,
        template: BindingId,
        arguments: &mut Vec<TemplateArgument>,
    ) {
        let parameters = self.template_parameters(template);
        if arguments.len() >= parameters.len() {
            return;
        }
        for &parameter in &parameters[arguments.len()..] {
            let default = self
                .declaration_node(parameter)
                .and_then(|name| name.parent())
                .and_then(TypeTemplateParameter::cast)
                .and_then(|parameter| parameter.default_type());
            let Some(default) = default else {
                return;
            };
            let map = self.argument_map(template, arguments);
            let ty = self.substitute(&self.type_id_type(&default), &map);
            arguments.push(TemplateArgument::Type(ty));
        }
    }

    /// Parameter bindings of a template, in declaration order.
    pub(crate) fn template_parameters(
        &self,
        template: BindingId,
    ) -> Vec<BindingId> {
        let Some(scope) = self.with_binding(template, |binding| binding.template_parameters) else {
            return Vec::new();
        };
        self.scopes
            .get(scope)
            .entries()
            .iter()
            .filter_map(|entry| match entry.target {
                EntryTarget::Binding(id) => Some(id),
                EntryTarget::Using(_) => None,
            })
            .filter(|&id| matches!(self.kind(id), BindingKind::TemplateParameter(_)))
            .collect()
    }

    pub(crate) fn argument_map(
        &self,
        template: BindingId,
        arguments: &[TemplateArgument],
    ) -> ArgumentMap {
        self.template_parameters(template).into_iter().zip(arguments.iter().cloned()).collect()
    }

    /// Types for type-ids, and for expressions that merely name a type;
    /// the spelling of anything else.
    fn argument_values(
        &self,
        list: &TemplateArgumentList,
    ) -> Vec<TemplateArgument> {
        list.arguments().map(|argument| self.argument_value(&argument)).collect()
    }

    fn argument_value(
        &self,
        argument: &SyntaxNode,
    ) -> TemplateArgument {
        if let Some(type_id) = TypeId::cast(argument.clone()) {
            return TemplateArgument::Type(self.type_id_type(&type_id));
        }
        if let Some(Expression::IdExpression(id)) = Expression::cast(argument.clone())
            && let Some(name) = id.name()
        {
            let binding = self.resolve(&name);
            if self.kind(binding).is_type() {
                return TemplateArgument::Type(self.named_type(binding));
            }
        }
        TemplateArgument::Value(helpers::compact_text(argument))
    }

    /// Replaces template parameters by their arguments. Specializations
    /// whose arguments mention a parameter are specialized again.
    pub(crate) fn substitute(
        &self,
        ty: &Type,
        map: &ArgumentMap,
    ) -> Type {
        if map.is_empty() {
            return ty.clone();
        }
        ty.map(&mut |node| match node {
            Type::TemplateParameter(named) => match map.get(&named.binding) {
                Some(TemplateArgument::Type(argument)) => Some(argument.clone()),
                _ => None,
            },
            Type::Class(named) => {
                let specialization = self.with_binding(named.binding, |binding| binding.specialization.clone())?;
                let dependent = specialization.arguments.iter().any(|argument| match argument {
                    TemplateArgument::Type(ty) => ty.is_dependent(),
                    TemplateArgument::Value(_) => false,
                });
                if !dependent {
                    return None;
                }
                let arguments = specialization
                    .arguments
                    .iter()
                    .map(|argument| match argument {
                        TemplateArgument::Type(ty) => TemplateArgument::Type(self.substitute(ty, map)),
                        value => value.clone(),
                    })
                    .collect();
                let id = self.specialize_with(specialization.template, arguments);
                Some(self.named_type(id))
            },
            _ => None,
        })
    }

    /// The function type a call would use: the declared type, or for a
    /// function template the type after deducing its parameters from the
    /// arguments.
    pub(crate) fn instantiate_call(
        &self,
        function: BindingId,
        arguments: &[Argument],
    ) -> Option<FunctionType> {
        let declared = self.type_of(function).as_function()?.clone();
        if !self.with_binding(function, Binding::is_template) {
            return Some(declared);
        }
        let mut map = ArgumentMap::new();
        for (parameter, argument) in declared.params.iter().zip(arguments) {
            let argument = if parameter.is_reference() { argument.ty.non_reference().clone() } else { argument.ty.decay() };
            deduce(parameter, &argument, &mut map);
        }
        match self.substitute(&Type::Function(declared), &map) {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Direct base classes; bases of a specialization come from the
    /// template with its arguments substituted.
    pub(crate) fn bases(
        &self,
        class: BindingId,
    ) -> Vec<BindingId> {
        if let Some(bases) = self.bases.borrow().get(&class) {
            return bases.clone();
        }
        self.bases.borrow_mut().insert(class, Vec::new());
        // Bases of a specialization are instantiated one level deeper, so a
        // template deriving from itself with new arguments stops at the limit.
        let level = self.specialization_levels.borrow().get(&class).copied().unwrap_or(0);
        let saved = self.instantiation_depth.replace(level);
        let bases = self.compute_bases(class);
        self.instantiation_depth.set(saved);
        self.bases.borrow_mut().insert(class, bases.clone());
        bases
    }

    fn compute_bases(
        &self,
        class: BindingId,
    ) -> Vec<BindingId> {
        let Some(body) = self.class_body(class) else {
            return Vec::new();
        };
        let Some(specifier) = self
            .scopes
            .get(body)
            .node
            .and_then(|node| node.try_to_node(&self.root))
            .and_then(ClassSpecifier::cast)
        else {
            return Vec::new();
        };
        let map = match self.with_binding(class, |binding| binding.specialization.clone()) {
            Some(specialization) if !specialization.explicit => {
                self.argument_map(specialization.template, &specialization.arguments)
            },
            _ => ArgumentMap::new(),
        };
        specifier
            .bases()
            .filter_map(|base| base.name())
            .filter_map(|name| {
                let ty = self.named_type(self.resolve(&name));
                self.substitute(&ty, &map).class_binding()
            })
            .collect()
    }
}

/// Matches a parameter type against an argument type, recording what each
/// template parameter must be.
fn deduce(
    parameter: &Type,
    argument: &Type,
    map: &mut ArgumentMap,
) {
    match (parameter, argument) {
        (Type::TemplateParameter(named), _) => {
            map.entry(named.binding).or_insert_with(|| TemplateArgument::Type(argument.clone()));
        },
        (Type::Qualified(_, inner), _) => deduce(inner, argument.unqualified(), map),
        (Type::Reference { target, .. }, _) => deduce(target, argument, map),
        (Type::Pointer(inner), Type::Pointer(target)) => deduce(inner, target, map),
        (Type::Pointer(inner), Type::Array { element, .. }) => deduce(inner, element, map),
        (Type::Array { element, .. }, Type::Array { element: target, .. }) => deduce(element, target, map),
        (Type::PointerToMember { class, member }, Type::PointerToMember { class: target, member: value }) => {
            deduce(class, target, map);
            deduce(member, value, map);
        },
        (Type::Function(function), Type::Function(target)) => {
            deduce(&function.ret, &target.ret, map);
            for (parameter, argument) in function.params.iter().zip(&target.params) {
                deduce(parameter, argument, map);
            }
        },
        _ => {},
    }
}

#[cfg(test)]
#[path = "../../tests/src/semantics/templates_tests.rs"]
mod tests;
