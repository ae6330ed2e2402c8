//! Overload resolution by ranking implicit conversion sequences.

use crate::semantics::Semantics;
use crate::semantics::binding::{BindingId, ProblemKind};
use crate::semantics::types::{BuiltinType, FunctionType, Type};

/// An argument of a call: its type, and whether it is a null pointer constant.
#[derive(Debug, Clone)]
pub(crate) struct Argument {
    pub(crate) ty: Type,
    pub(crate) null_pointer: bool,
}

/// How well an argument matches a parameter; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Rank {
    Exact,
    Promotion,
    Conversion,
    Ellipsis,
}

struct Viable {
    binding: BindingId,
    ranks: Vec<Rank>,
    template: bool,
}

impl Viable {
    /// At least as good for every argument and better for one, or equally
    /// good and not a template where the other is.
    fn beats(
        &self,
        other: &Viable,
    ) -> bool {
        let no_worse = self.ranks.iter().zip(&other.ranks).all(|(mine, theirs)| mine <= theirs);
        let better = self.ranks.iter().zip(&other.ranks).any(|(mine, theirs)| mine < theirs);
        no_worse && (better || (!self.template && other.template))
    }
}

impl Semantics {
    pub(crate) fn select_overload(
        &self,
        name: &str,
        candidates: &[BindingId],
        arguments: &[Argument],
    ) -> BindingId {
        let mut viable = Vec::new();
        for &candidate in candidates {
            let template = self.with_binding(candidate, |binding| binding.is_template());
            let ranks = match self.instantiate_call(candidate, arguments) {
                Some(function) => self.viability(&function, arguments),
                // Without a known type the candidate can neither win nor lose.
                None => Some(vec![Rank::Conversion; arguments.len()]),
            };
            if let Some(ranks) = ranks {
                viable.push(Viable {
                    binding: candidate,
                    ranks,
                    template,
                });
            }
        }
        match viable.as_slice() {
            [] => self.problem(ProblemKind::NoViableOverload, name, candidates.to_vec()),
            [only] => only.binding,
            _ => {
                let best: Vec<&Viable> = viable
                    .iter()
                    .enumerate()
                    .filter(|&(index, candidate)| {
                        viable.iter().enumerate().all(|(other, rival)| other == index || candidate.beats(rival))
                    })
                    .map(|(_, candidate)| candidate)
                    .collect();
                match best.as_slice() {
                    [winner] => winner.binding,
                    _ => {
                        let tied = viable.iter().map(|candidate| candidate.binding).collect();
                        self.problem(ProblemKind::Ambiguous, name, tied)
                    },
                }
            },
        }
    }

    /// Ranks for each argument, or `None` when the function cannot be called.
    fn viability(
        &self,
        function: &FunctionType,
        arguments: &[Argument],
    ) -> Option<Vec<Rank>> {
        if arguments.len() < function.required || (arguments.len() > function.params.len() && !function.variadic) {
            return None;
        }
        arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| match function.params.get(index) {
                Some(parameter) => self.conversion_rank(argument, parameter),
                None => Some(Rank::Ellipsis),
            })
            .collect()
    }

    pub(crate) fn conversion_rank(
        &self,
        argument: &Argument,
        parameter: &Type,
    ) -> Option<Rank> {
        let to = parameter.value();
        let from = argument.ty.value();
        if !is_modelled(from) || !is_modelled(to) {
            return Some(Rank::Conversion);
        }
        if from == to {
            return Some(Rank::Exact);
        }
        match (from, to) {
            (Type::Array { element, .. }, Type::Pointer(target)) => {
                qualification_compatible(element, target).then_some(Rank::Exact)
            },
            (Type::Function(_), Type::Pointer(target)) => (target.value() == from).then_some(Rank::Exact),
            (Type::Builtin(BuiltinType::NullPtr), Type::Pointer(_) | Type::PointerToMember { .. }) => {
                Some(Rank::Conversion)
            },
            (Type::Builtin(from), Type::Builtin(to)) if from.is_arithmetic() && to.is_arithmetic() => {
                Some(if from.promoted() == *to { Rank::Promotion } else { Rank::Conversion })
            },
            (Type::Enum(_), Type::Builtin(to)) if to.is_arithmetic() => {
                Some(if *to == BuiltinType::Int { Rank::Promotion } else { Rank::Conversion })
            },
            (Type::Builtin(from), Type::Pointer(_)) if from.is_integral() && argument.null_pointer => {
                Some(Rank::Conversion)
            },
            (Type::Pointer(source), Type::Pointer(target)) => {
                if qualification_compatible(source, target) {
                    Some(Rank::Exact)
                } else if target.is_void() {
                    Some(Rank::Conversion)
                } else {
                    match (source.class_binding(), target.class_binding()) {
                        (Some(derived), Some(base)) if self.is_derived_from(derived, base) => Some(Rank::Conversion),
                        _ => None,
                    }
                }
            },
            (Type::Pointer(_) | Type::Enum(_) | Type::PointerToMember { .. }, Type::Builtin(BuiltinType::Bool)) => {
                Some(Rank::Conversion)
            },
            (Type::Class(derived), Type::Class(base)) => {
                if self.is_derived_from(derived.binding, base.binding) || self.has_constructors(base.binding) {
                    Some(Rank::Conversion)
                } else {
                    None
                }
            },
            (_, Type::Class(target)) => self.has_constructors(target.binding).then_some(Rank::Conversion),
            (Type::Class(source), _) => self.has_conversion_functions(source.binding).then_some(Rank::Conversion),
            _ => None,
        }
    }

    fn has_constructors(
        &self,
        class: BindingId,
    ) -> bool {
        self.class_body(class)
            .is_some_and(|body| !self.scopes.get(body).constructors().is_empty())
    }

    /// `operator int()` and friends.
    fn has_conversion_functions(
        &self,
        class: BindingId,
    ) -> bool {
        self.class_body(class).is_some_and(|body| {
            self.scopes.get(body).entries().iter().any(|entry| {
                entry
                    .name
                    .strip_prefix("operator")
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|next| next == ' ' || next.is_alphabetic() || next == '_')
            })
        })
    }
}

/// Unknown and dependent types convert to anything.
fn is_modelled(ty: &Type) -> bool {
    !matches!(ty, Type::Unknown | Type::Dependent | Type::TemplateParameter(_))
}

/// `T*` to `const T*`: the same type with at least the same qualifiers.
fn qualification_compatible(
    source: &Type,
    target: &Type,
) -> bool {
    source.unqualified() == target.unqualified() && target.qualifiers().contains(source.qualifiers())
}

#[cfg(test)]
#[path = "../../tests/src/semantics/overload_tests.rs"]
mod tests;
