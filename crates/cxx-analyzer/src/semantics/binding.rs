//! Bindings: the entities names resolve to.

use std::collections::HashMap;

use crate::semantics::scope::ScopeId;
use crate::semantics::types::Type;
use crate::syntax::cst::SyntaxNodePtr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(u32);

impl BindingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        BindingId(index as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKey {
    Struct,
    Class,
    Union,
}

impl ClassKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKey::Struct => "struct",
            ClassKey::Class => "class",
            ClassKey::Union => "union",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateParameterKind {
    Type,
    Template,
    Value,
}

/// Why a name could not be bound to a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    NotFound,
    Ambiguous,
    NoViableOverload,
    ConflictingDeclaration,
    InstantiationDepth,
}

impl ProblemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::NotFound => "name not found",
            ProblemKind::Ambiguous => "ambiguous name",
            ProblemKind::NoViableOverload => "no viable overload",
            ProblemKind::ConflictingDeclaration => "conflicting declaration",
            ProblemKind::InstantiationDepth => "template instantiation too deep",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Variable,
    Field,
    Parameter,
    Function,
    Constructor,
    Destructor,
    Enumerator,
    Typedef,
    Class(ClassKey),
    Enumeration,
    Namespace,
    NamespaceAlias,
    TemplateParameter(TemplateParameterKind),
    Label,
    Problem(ProblemKind),
}

impl BindingKind {
    /// Names a type when used in a type specifier.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            BindingKind::Typedef
                | BindingKind::Class(_)
                | BindingKind::Enumeration
                | BindingKind::TemplateParameter(TemplateParameterKind::Type | TemplateParameterKind::Template)
        )
    }

    pub fn is_function(self) -> bool {
        matches!(self, BindingKind::Function | BindingKind::Constructor | BindingKind::Destructor)
    }

    /// May appear before `::`.
    pub fn is_scope(self) -> bool {
        self.is_type() || matches!(self, BindingKind::Namespace | BindingKind::NamespaceAlias)
    }

    pub fn is_problem(self) -> bool {
        matches!(self, BindingKind::Problem(_))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BindingKind::Variable => "variable",
            BindingKind::Field => "field",
            BindingKind::Parameter => "parameter",
            BindingKind::Function => "function",
            BindingKind::Constructor => "constructor",
            BindingKind::Destructor => "destructor",
            BindingKind::Enumerator => "enumerator",
            BindingKind::Typedef => "typedef",
            BindingKind::Class(key) => key.as_str(),
            BindingKind::Enumeration => "enum",
            BindingKind::Namespace => "namespace",
            BindingKind::NamespaceAlias => "namespace alias",
            BindingKind::TemplateParameter(_) => "template parameter",
            BindingKind::Label => "label",
            BindingKind::Problem(_) => "problem",
        }
    }
}

/// A template argument: a type, or the spelling of a constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateArgument {
    Type(Type),
    Value(String),
}

impl std::fmt::Display for TemplateArgument {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            TemplateArgument::Type(ty) => write!(f, "{ty}"),
            TemplateArgument::Value(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialization {
    pub template: BindingId,
    pub arguments: Vec<TemplateArgument>,
    /// Declared with `template<>` rather than produced on demand.
    pub explicit: bool,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Declaring scope; `None` for problems.
    pub scope: Option<ScopeId>,
    /// Name nodes of every declaration, first one first.
    pub declarations: Vec<SyntaxNodePtr>,
    /// Name node of the defining declaration.
    pub definition: Option<SyntaxNodePtr>,
    /// Scope of the members: namespace, class or scoped enumeration body,
    /// or the function scope of a function definition.
    pub body: Option<ScopeId>,
    pub template_parameters: Option<ScopeId>,
    /// Enclosing class, enumeration or namespace.
    pub owner: Option<BindingId>,
    pub specialization: Option<Specialization>,
    /// What an ambiguous or overloaded lookup found.
    pub candidates: Vec<BindingId>,
    /// Predeclared by the dialect rather than written in the source.
    pub builtin: bool,
}

impl Binding {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: BindingKind,
        scope: Option<ScopeId>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            scope,
            declarations: Vec::new(),
            definition: None,
            body: None,
            template_parameters: None,
            owner: None,
            specialization: None,
            candidates: Vec::new(),
            builtin: false,
        }
    }

    pub fn is_problem(&self) -> bool {
        self.kind.is_problem()
    }

    pub fn problem(&self) -> Option<ProblemKind> {
        match self.kind {
            BindingKind::Problem(problem) => Some(problem),
            _ => None,
        }
    }

    pub fn is_template(&self) -> bool {
        self.template_parameters.is_some()
    }

    pub fn first_declaration(&self) -> Option<SyntaxNodePtr> {
        self.declarations.first().copied()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// Every binding of a translation unit and the references bound so far.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    references: HashMap<SyntaxNodePtr, BindingId>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        binding: Binding,
    ) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(binding);
        id
    }

    pub fn get(
        &self,
        id: BindingId,
    ) -> &Binding {
        &self.bindings[id.index()]
    }

    pub(crate) fn get_mut(
        &mut self,
        id: BindingId,
    ) -> &mut Binding {
        &mut self.bindings[id.index()]
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter().enumerate().map(|(index, binding)| (BindingId(index as u32), binding))
    }

    /// Bindings with the given simple name.
    pub fn named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (BindingId, &'a Binding)> + 'a {
        self.iter().filter(move |(_, binding)| binding.name == name)
    }

    pub(crate) fn record_reference(
        &mut self,
        name: SyntaxNodePtr,
        binding: BindingId,
    ) {
        self.references.insert(name, binding);
    }

    /// The binding a name node resolved to.
    pub fn reference(
        &self,
        name: &SyntaxNodePtr,
    ) -> Option<BindingId> {
        self.references.get(name).copied()
    }

    pub fn references(&self) -> impl Iterator<Item = (&SyntaxNodePtr, BindingId)> {
        self.references.iter().map(|(name, &binding)| (name, binding))
    }

    /// Name nodes bound to `binding`, declarations excluded.
    pub fn references_to(
        &self,
        binding: BindingId,
    ) -> Vec<SyntaxNodePtr> {
        let mut found: Vec<SyntaxNodePtr> = self
            .references
            .iter()
            .filter(|&(_, &target)| target == binding)
            .map(|(name, _)| *name)
            .collect();
        found.sort_by_key(|name| name.text_range().start());
        found
    }
}
