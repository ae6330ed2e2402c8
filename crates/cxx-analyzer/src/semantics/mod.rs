//! Binding resolution over a parsed translation unit.
//!
//! Declarations are collected eagerly in a single walk over the tree.
//! References, types and template specializations are computed when first
//! asked for and memoized, so a caller that only needs one name pays for
//! little more than the collection walk.

mod builtins;
mod collect;
mod lookup;
mod overload;
mod resolve;
mod templates;
mod typing;

pub mod binding;
pub mod scope;
pub mod types;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

pub use binding::{
    Binding, BindingId, BindingKind, BindingTable, ClassKey, ProblemKind, Specialization, TemplateArgument,
    TemplateParameterKind,
};
pub use scope::{EntryTarget, Scope, ScopeEntry, ScopeId, ScopeKind, ScopeTree};
pub use types::{BuiltinType, FunctionType, Named, Qualifiers, Type};

use crate::config::{DialectConfig, ParseLimits};
use crate::parser::Parse;
use crate::semantics::collect::ExplicitSpecialization;
use crate::syntax::ast::{AstNode, NameRef};
use crate::syntax::cst::{SyntaxNode, SyntaxNodePtr};

/// Semantic model of one translation unit.
///
/// Holds interior caches, so it is neither `Send` nor `Sync`; build one per
/// thread from the [`Parse`].
pub struct Semantics {
    root: SyntaxNode,
    dialect: DialectConfig,
    limits: ParseLimits,
    scopes: ScopeTree,
    bindings: RefCell<BindingTable>,
    declared: HashMap<SyntaxNodePtr, BindingId>,
    explicit_specializations: HashMap<BindingId, Vec<ExplicitSpecialization>>,
    resolved: RefCell<HashMap<SyntaxNodePtr, BindingId>>,
    resolving: RefCell<HashSet<SyntaxNodePtr>>,
    binding_types: RefCell<HashMap<BindingId, Type>>,
    typing: RefCell<HashSet<BindingId>>,
    expression_types: RefCell<HashMap<SyntaxNodePtr, Type>>,
    using_targets: RefCell<HashMap<SyntaxNodePtr, Vec<BindingId>>>,
    bases: RefCell<HashMap<BindingId, Vec<BindingId>>>,
    specializations: RefCell<HashMap<(BindingId, Vec<TemplateArgument>), BindingId>>,
    explicit_arguments: RefCell<HashMap<BindingId, Vec<TemplateArgument>>>,
    specialization_levels: RefCell<HashMap<BindingId, usize>>,
    instantiation_depth: Cell<usize>,
}

impl Semantics {
    pub fn new(parse: &Parse) -> Self {
        Self::with_limits(parse, &ParseLimits::default())
    }

    pub fn with_limits(
        parse: &Parse,
        limits: &ParseLimits,
    ) -> Self {
        Self::from_root(parse.syntax(), *parse.dialect(), *limits)
    }

    pub fn from_root(
        root: SyntaxNode,
        dialect: DialectConfig,
        limits: ParseLimits,
    ) -> Self {
        let collected = collect::collect(&root, &dialect);
        let binding_types = collected.builtin_types.into_iter().collect();
        Self {
            root,
            dialect,
            limits,
            scopes: collected.scopes,
            bindings: RefCell::new(collected.bindings),
            declared: collected.declared,
            explicit_specializations: collected.explicit_specializations,
            resolved: RefCell::default(),
            resolving: RefCell::default(),
            binding_types: RefCell::new(binding_types),
            typing: RefCell::default(),
            expression_types: RefCell::default(),
            using_targets: RefCell::default(),
            bases: RefCell::default(),
            specializations: RefCell::default(),
            explicit_arguments: RefCell::default(),
            specialization_levels: RefCell::default(),
            instantiation_depth: Cell::new(0),
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// A snapshot of the binding.
    pub fn binding(
        &self,
        id: BindingId,
    ) -> Binding {
        self.bindings.borrow().get(id).clone()
    }

    pub fn kind(
        &self,
        id: BindingId,
    ) -> BindingKind {
        self.with_binding(id, |binding| binding.kind)
    }

    pub fn name(
        &self,
        id: BindingId,
    ) -> String {
        self.with_binding(id, |binding| binding.name.clone())
    }

    pub(crate) fn with_binding<R>(
        &self,
        id: BindingId,
        f: impl FnOnce(&Binding) -> R,
    ) -> R {
        f(self.bindings.borrow().get(id))
    }

    /// `N::S::f`, with template arguments for specializations.
    pub fn qualified_name(
        &self,
        id: BindingId,
    ) -> String {
        let (name, owner, specialization) = self.with_binding(id, |binding| {
            (binding.name.clone(), binding.owner, binding.specialization.clone())
        });
        let base = match specialization {
            Some(specialization) => {
                let arguments: Vec<String> = specialization.arguments.iter().map(ToString::to_string).collect();
                format!("{name}<{}>", arguments.join(", "))
            },
            None => name,
        };
        let qualifier = owner.filter(|&owner| {
            let (kind, anonymous) = self.with_binding(owner, |binding| (binding.kind, binding.is_anonymous()));
            !anonymous && matches!(kind, BindingKind::Namespace | BindingKind::Class(_) | BindingKind::Enumeration)
        });
        match qualifier {
            Some(owner) => format!("{}::{base}", self.qualified_name(owner)),
            None => base,
        }
    }

    /// The binding declared by a name node, or by a class or enum specifier.
    pub fn declared_binding(
        &self,
        node: &SyntaxNode,
    ) -> Option<BindingId> {
        self.declared.get(&SyntaxNodePtr::new(node)).copied()
    }

    /// The node of the first declaration of `id`.
    pub fn declaration_node(
        &self,
        id: BindingId,
    ) -> Option<SyntaxNode> {
        let declaration = self.with_binding(id, Binding::first_declaration)?;
        declaration.try_to_node(&self.root)
    }

    pub fn resolve(
        &self,
        name: &NameRef,
    ) -> BindingId {
        self.resolve_name(name.syntax())
    }

    /// Binds every name in the tree and returns the table with all
    /// references recorded.
    pub fn resolve_all(&self) -> BindingTable {
        let mut references = Vec::new();
        for node in self.root.descendants() {
            if NameRef::can_cast(node.kind()) && !self.declared.contains_key(&SyntaxNodePtr::new(&node)) {
                references.push((SyntaxNodePtr::new(&node), self.resolve_name(&node)));
            }
        }
        let mut table = self.bindings.borrow().clone();
        let problems = references.iter().filter(|&&(_, id)| table.get(id).is_problem()).count();
        for (name, id) in references {
            table.record_reference(name, id);
        }
        tracing::debug!(bindings = table.len(), problems, "resolved all names");
        table
    }

    /// Problems are fresh bindings so each keeps its own candidates.
    pub(crate) fn problem(
        &self,
        kind: ProblemKind,
        name: &str,
        candidates: Vec<BindingId>,
    ) -> BindingId {
        tracing::trace!(name, problem = kind.as_str(), "problem binding");
        let mut binding = Binding::new(name, BindingKind::Problem(kind), None);
        binding.candidates = candidates;
        self.bindings.borrow_mut().push(binding)
    }

    /// Binding of a new specialization, sharing the template's declarations.
    pub(crate) fn add_binding(
        &self,
        binding: Binding,
    ) -> BindingId {
        self.bindings.borrow_mut().push(binding)
    }
}

#[cfg(test)]
#[path = "../../tests/src/semantics/semantics_tests.rs"]
mod tests;
