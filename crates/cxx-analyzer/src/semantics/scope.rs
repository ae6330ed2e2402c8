//! Lexical scopes, stored in an arena and linked to their parents by index.

use std::collections::HashMap;

use rowan::TextSize;

use crate::semantics::binding::BindingId;
use crate::syntax::cst::SyntaxNodePtr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    /// Body of a scoped enumeration.
    Enumeration,
    /// Parameters and outermost block of a function or lambda.
    Function,
    Block,
    TemplateParameters,
}

impl ScopeKind {
    /// Names declared here are visible before their point of declaration.
    pub fn sees_whole_body(self) -> bool {
        matches!(self, ScopeKind::Class | ScopeKind::TemplateParameters)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Namespace => "namespace",
            ScopeKind::Class => "class",
            ScopeKind::Enumeration => "enumeration",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
            ScopeKind::TemplateParameters => "template parameters",
        }
    }
}

/// What a scope entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTarget {
    Binding(BindingId),
    /// A using-declaration, resolved when first looked up.
    Using(SyntaxNodePtr),
}

/// One name declared in a scope.
#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub name: String,
    pub target: EntryTarget,
    /// End of the declaring name in the tree; earlier references do not see the entry.
    pub position: TextSize,
    /// Lives in the tag name space of `struct`, `union` and `enum` names.
    pub tag: bool,
}

/// A `using namespace` directive, or the implicit one of an anonymous or
/// inline namespace.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UsingDirective {
    pub(crate) target: ScopeId,
    pub(crate) position: TextSize,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that introduced the scope; `None` for the global scope.
    pub node: Option<SyntaxNodePtr>,
    /// The namespace, class, enumeration or function this scope belongs to.
    pub owner: Option<BindingId>,
    entries: Vec<ScopeEntry>,
    by_name: HashMap<String, Vec<usize>>,
    pub(crate) directives: Vec<UsingDirective>,
    /// Bodies of anonymous unions whose members are members of this scope.
    pub(crate) transparent: Vec<ScopeId>,
    /// Constructors never take part in name lookup.
    pub(crate) constructors: Vec<BindingId>,
    pub(crate) labels: HashMap<String, BindingId>,
}

impl Scope {
    fn new(
        kind: ScopeKind,
        parent: Option<ScopeId>,
        node: Option<SyntaxNodePtr>,
    ) -> Self {
        Self {
            kind,
            parent,
            node,
            owner: None,
            entries: Vec::new(),
            by_name: HashMap::new(),
            directives: Vec::new(),
            transparent: Vec::new(),
            constructors: Vec::new(),
            labels: HashMap::new(),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn lookup(
        &self,
        name: &str,
    ) -> impl Iterator<Item = &ScopeEntry> {
        self.by_name
            .get(name)
            .into_iter()
            .flat_map(|indices| indices.iter().map(|&index| &self.entries[index]))
    }

    pub fn constructors(&self) -> &[BindingId] {
        &self.constructors
    }

    pub(crate) fn add_entry(
        &mut self,
        entry: ScopeEntry,
    ) {
        self.by_name.entry(entry.name.clone()).or_default().push(self.entries.len());
        self.entries.push(entry);
    }
}

/// All scopes of a translation unit; the global scope is always present.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    by_node: HashMap<SyntaxNodePtr, ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None, None)],
            by_node: HashMap::new(),
        }
    }

    pub(crate) fn add(
        &mut self,
        kind: ScopeKind,
        parent: ScopeId,
        node: Option<SyntaxNodePtr>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, Some(parent), node));
        if let Some(node) = node {
            self.by_node.insert(node, id);
        }
        id
    }

    /// Records that `node` reopens an existing scope, as a second
    /// `namespace N { }` block does.
    pub(crate) fn alias_node(
        &mut self,
        node: SyntaxNodePtr,
        scope: ScopeId,
    ) {
        self.by_node.insert(node, scope);
    }

    pub fn get(
        &self,
        id: ScopeId,
    ) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn get_mut(
        &mut self,
        id: ScopeId,
    ) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// The scope introduced by `node`, if any.
    pub fn scope_of_node(
        &self,
        node: &SyntaxNodePtr,
    ) -> Option<ScopeId> {
        self.by_node.get(node).copied()
    }

    /// `id` and its parents, innermost first.
    pub fn ancestors(
        &self,
        id: ScopeId,
    ) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), |&scope| self.get(scope).parent)
    }

    /// The nearest enclosing scope that may hold declarations of entities;
    /// template parameter scopes are skipped.
    pub fn declaring_scope(
        &self,
        id: ScopeId,
    ) -> ScopeId {
        self.ancestors(id)
            .find(|&scope| self.get(scope).kind != ScopeKind::TemplateParameters)
            .unwrap_or(ScopeId::GLOBAL)
    }

    /// The enclosing function scope, for labels and `this`.
    pub fn function_scope(
        &self,
        id: ScopeId,
    ) -> Option<ScopeId> {
        self.ancestors(id).find(|&scope| self.get(scope).kind == ScopeKind::Function)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(index, scope)| (ScopeId(index as u32), scope))
    }
}
