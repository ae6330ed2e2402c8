//! Name lookup: unqualified lookup through enclosing scopes, qualified
//! lookup into namespaces, classes and enumerations, and member lookup
//! through base classes.

use std::collections::HashSet;

use rowan::TextSize;

use crate::semantics::Semantics;
use crate::semantics::binding::{BindingId, BindingKind};
use crate::semantics::scope::{EntryTarget, ScopeId, ScopeKind};
use crate::semantics::types::Type;
use crate::syntax::ast::{AstNode, UsingDeclaration};
use crate::syntax::cst::SyntaxNodePtr;

/// Which declarations a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Filter {
    Ordinary,
    /// After `struct`, `union`, `enum` or in a type specifier.
    Types,
    Tags,
    /// Before `::`.
    Qualifiers,
    Namespaces,
}

impl Semantics {
    fn accepts(
        &self,
        filter: Filter,
        kind: BindingKind,
        tag: bool,
    ) -> bool {
        let hidden_tag = tag && self.dialect.is_c();
        match filter {
            Filter::Ordinary => !hidden_tag,
            Filter::Types => !hidden_tag && kind.is_type(),
            Filter::Tags => tag || matches!(kind, BindingKind::Class(_) | BindingKind::Enumeration),
            Filter::Qualifiers => kind.is_scope(),
            Filter::Namespaces => matches!(kind, BindingKind::Namespace | BindingKind::NamespaceAlias),
        }
    }

    /// Entries of a single scope named `name`. A `position` hides entries
    /// declared after it, except in scopes that see their whole body.
    pub(crate) fn scope_lookup(
        &self,
        scope: ScopeId,
        name: &str,
        position: Option<TextSize>,
        filter: Filter,
    ) -> Vec<BindingId> {
        let data = self.scopes.get(scope);
        let limit = position.filter(|_| !data.kind.sees_whole_body());
        let mut plain = Vec::new();
        let mut tags = Vec::new();
        for entry in data.lookup(name) {
            if limit.is_some_and(|limit| entry.position > limit) {
                continue;
            }
            match entry.target {
                EntryTarget::Binding(id) => {
                    if self.accepts(filter, self.kind(id), entry.tag) {
                        if entry.tag { tags.push(id) } else { plain.push(id) }
                    }
                },
                EntryTarget::Using(using) => {
                    for id in self.using_targets(using) {
                        let kind = self.kind(id);
                        let tag = matches!(kind, BindingKind::Class(_) | BindingKind::Enumeration);
                        if self.accepts(filter, kind, tag) {
                            plain.push(id);
                        }
                    }
                },
            }
        }
        for &inner in &data.transparent {
            plain.extend(self.scope_lookup(inner, name, None, filter));
        }
        // An ordinary name hides a tag declared in the same scope.
        let mut found = if filter == Filter::Tags || plain.is_empty() {
            tags.extend(plain);
            tags
        } else {
            plain
        };
        dedup(&mut found);
        found
    }

    /// Lookup from `scope` outwards; the innermost scope with a match wins.
    pub(crate) fn lookup_unqualified(
        &self,
        name: &str,
        scope: ScopeId,
        position: TextSize,
        filter: Filter,
    ) -> Vec<BindingId> {
        for current in self.scopes.ancestors(scope) {
            let found = self.lookup_in(current, name, Some(position), filter);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// One step of unqualified lookup: the scope itself, the members a
    /// class inherits, and namespaces nominated by using-directives.
    pub(crate) fn lookup_in(
        &self,
        scope: ScopeId,
        name: &str,
        position: Option<TextSize>,
        filter: Filter,
    ) -> Vec<BindingId> {
        let data = self.scopes.get(scope);
        let mut found = self.scope_lookup(scope, name, position, filter);
        if found.is_empty()
            && data.kind == ScopeKind::Class
            && let Some(owner) = data.owner
        {
            found = self.class_members(owner, name, filter, &mut HashSet::new());
        }
        let mut visited = HashSet::new();
        for directive in &data.directives {
            if position.is_some_and(|position| directive.position > position) {
                continue;
            }
            self.directive_lookup(directive.target, name, filter, &mut visited, &mut found);
        }
        dedup(&mut found);
        found
    }

    fn directive_lookup(
        &self,
        namespace: ScopeId,
        name: &str,
        filter: Filter,
        visited: &mut HashSet<ScopeId>,
        found: &mut Vec<BindingId>,
    ) {
        if !visited.insert(namespace) {
            return;
        }
        found.extend(self.scope_lookup(namespace, name, None, filter));
        for directive in &self.scopes.get(namespace).directives {
            self.directive_lookup(directive.target, name, filter, visited, found);
        }
    }

    /// Members of a class named `name`, searching base classes when the
    /// class itself declares none.
    pub(crate) fn class_members(
        &self,
        class: BindingId,
        name: &str,
        filter: Filter,
        visited: &mut HashSet<BindingId>,
    ) -> Vec<BindingId> {
        if !visited.insert(class) {
            return Vec::new();
        }
        if let Some(body) = self.class_body(class) {
            let own = self.scope_lookup(body, name, None, filter);
            if !own.is_empty() {
                return own;
            }
        }
        let injected = self.with_binding(class, |binding| binding.name == name);
        if injected && self.accepts(filter, self.kind(class), true) {
            return vec![class];
        }
        let mut found = Vec::new();
        for base in self.bases(class) {
            found.extend(self.class_members(base, name, filter, visited));
        }
        dedup(&mut found);
        found
    }

    /// Lookup of `name` after `qualifier::`.
    pub(crate) fn lookup_qualified(
        &self,
        qualifier: BindingId,
        name: &str,
        filter: Filter,
    ) -> Vec<BindingId> {
        let (kind, body, scope) = self.with_binding(qualifier, |binding| (binding.kind, binding.body, binding.scope));
        match kind {
            BindingKind::Namespace | BindingKind::NamespaceAlias => {
                let Some(body) = body else {
                    return Vec::new();
                };
                let mut found = self.scope_lookup(body, name, None, filter);
                if found.is_empty() {
                    let mut visited = HashSet::from([body]);
                    for directive in &self.scopes.get(body).directives {
                        self.directive_lookup(directive.target, name, filter, &mut visited, &mut found);
                    }
                }
                dedup(&mut found);
                found
            },
            BindingKind::Class(_) => self.class_members(qualifier, name, filter, &mut HashSet::new()),
            BindingKind::Enumeration => match (body, scope) {
                (Some(body), _) => self.scope_lookup(body, name, None, filter),
                (None, Some(scope)) => self
                    .scope_lookup(scope, name, None, filter)
                    .into_iter()
                    .filter(|&id| self.with_binding(id, |binding| binding.owner == Some(qualifier)))
                    .collect(),
                (None, None) => Vec::new(),
            },
            BindingKind::Typedef | BindingKind::TemplateParameter(_) => {
                match self.named_type(qualifier).value() {
                    Type::Class(named) | Type::Enum(named) if named.binding != qualifier => {
                        self.lookup_qualified(named.binding, name, filter)
                    },
                    _ => Vec::new(),
                }
            },
            _ => Vec::new(),
        }
    }

    /// The label `name` of the function enclosing `scope`.
    pub(crate) fn lookup_label(
        &self,
        name: &str,
        scope: ScopeId,
    ) -> Option<BindingId> {
        let function = self.scopes.function_scope(scope)?;
        self.scopes.get(function).labels.get(name).copied()
    }

    /// Members of a class, including specializations that share their
    /// template's body.
    pub(crate) fn class_body(
        &self,
        class: BindingId,
    ) -> Option<ScopeId> {
        let (body, template) = self.with_binding(class, |binding| {
            (binding.body, binding.specialization.as_ref().map(|specialization| specialization.template))
        });
        body.or_else(|| template.and_then(|template| self.with_binding(template, |binding| binding.body)))
    }

    /// What a using-declaration brings into its scope.
    pub(crate) fn using_targets(
        &self,
        using: SyntaxNodePtr,
    ) -> Vec<BindingId> {
        if let Some(targets) = self.using_targets.borrow().get(&using) {
            return targets.clone();
        }
        self.using_targets.borrow_mut().insert(using, Vec::new());
        let targets = self.compute_using_targets(using);
        self.using_targets.borrow_mut().insert(using, targets.clone());
        targets
    }

    fn compute_using_targets(
        &self,
        using: SyntaxNodePtr,
    ) -> Vec<BindingId> {
        let Some(node) = using.try_to_node(&self.root) else {
            return Vec::new();
        };
        let Some(target) = UsingDeclaration::cast(node.clone()).and_then(|using| using.target()) else {
            return Vec::new();
        };
        let identifier = target.identifier();
        match target.qualifier().last() {
            Some(qualifier) => {
                let qualifier = self.resolve_name(qualifier.syntax());
                if self.kind(qualifier).is_problem() {
                    return Vec::new();
                }
                self.lookup_qualified(qualifier, &identifier, Filter::Ordinary)
            },
            None if target.is_global() => self.lookup_in(ScopeId::GLOBAL, &identifier, None, Filter::Ordinary),
            None => {
                let scope = self.scope_of(&node);
                let position = node.text_range().start();
                self.scopes
                    .get(scope)
                    .parent
                    .map(|parent| self.lookup_unqualified(&identifier, parent, position, Filter::Ordinary))
                    .unwrap_or_default()
            },
        }
    }

    /// Everything visible by unqualified lookup at `position` in `scope`;
    /// inner declarations hide outer ones with the same name.
    pub fn visible_bindings(
        &self,
        scope: ScopeId,
        position: TextSize,
    ) -> Vec<BindingId> {
        let mut hidden: HashSet<String> = HashSet::new();
        let mut visible = Vec::new();
        for current in self.scopes.ancestors(scope) {
            let mut level = Vec::new();
            self.scope_bindings(current, Some(position), &mut level, &mut HashSet::new());
            if self.scopes.get(current).kind == ScopeKind::Class
                && let Some(owner) = self.scopes.get(current).owner
            {
                level.extend(self.member_bindings(owner));
            }
            let mut names = HashSet::new();
            for id in level {
                let name = self.name(id);
                if hidden.contains(&name) || visible.contains(&id) {
                    continue;
                }
                names.insert(name);
                visible.push(id);
            }
            hidden.extend(names);
        }
        visible
    }

    /// Bindings declared in `scope`, through transparent members and
    /// using-directives.
    fn scope_bindings(
        &self,
        scope: ScopeId,
        position: Option<TextSize>,
        out: &mut Vec<BindingId>,
        visited: &mut HashSet<ScopeId>,
    ) {
        if !visited.insert(scope) {
            return;
        }
        let data = self.scopes.get(scope);
        let limit = position.filter(|_| !data.kind.sees_whole_body());
        for entry in data.entries() {
            if limit.is_some_and(|limit| entry.position > limit) {
                continue;
            }
            match entry.target {
                EntryTarget::Binding(id) => out.push(id),
                EntryTarget::Using(using) => out.extend(self.using_targets(using)),
            }
        }
        for &inner in &data.transparent {
            self.scope_bindings(inner, None, out, visited);
        }
        for directive in &data.directives {
            if position.is_some_and(|position| directive.position > position) {
                continue;
            }
            self.scope_bindings(directive.target, None, out, visited);
        }
    }

    /// Members of a class and, unless hidden, of its bases.
    pub fn member_bindings(
        &self,
        class: BindingId,
    ) -> Vec<BindingId> {
        let mut members = Vec::new();
        let mut names = HashSet::new();
        self.collect_members(class, &mut members, &mut names, &mut HashSet::new());
        members
    }

    fn collect_members(
        &self,
        class: BindingId,
        members: &mut Vec<BindingId>,
        names: &mut HashSet<String>,
        visited: &mut HashSet<BindingId>,
    ) {
        if !visited.insert(class) {
            return;
        }
        let mut own = Vec::new();
        if let Some(body) = self.class_body(class) {
            self.scope_bindings(body, None, &mut own, &mut HashSet::new());
        }
        let mut declared_here = HashSet::new();
        for id in own {
            let name = self.name(id);
            if names.contains(&name) && !self.kind(id).is_function() {
                continue;
            }
            declared_here.insert(name);
            if !members.contains(&id) {
                members.push(id);
            }
        }
        names.extend(declared_here);
        for base in self.bases(class) {
            self.collect_members(base, members, names, visited);
        }
    }

    /// Bindings reachable as `qualifier::name`.
    pub fn qualified_members(
        &self,
        qualifier: BindingId,
    ) -> Vec<BindingId> {
        let (kind, body, scope) = self.with_binding(qualifier, |binding| (binding.kind, binding.body, binding.scope));
        let mut found = Vec::new();
        match kind {
            BindingKind::Namespace | BindingKind::NamespaceAlias => {
                if let Some(body) = body {
                    self.scope_bindings(body, None, &mut found, &mut HashSet::new());
                }
            },
            BindingKind::Class(_) => found = self.member_bindings(qualifier),
            BindingKind::Enumeration => match (body, scope) {
                (Some(body), _) => self.scope_bindings(body, None, &mut found, &mut HashSet::new()),
                (None, Some(scope)) => {
                    let mut all = Vec::new();
                    self.scope_bindings(scope, None, &mut all, &mut HashSet::new());
                    found = all
                        .into_iter()
                        .filter(|&id| self.with_binding(id, |binding| binding.owner == Some(qualifier)))
                        .collect();
                },
                (None, None) => {},
            },
            BindingKind::Typedef | BindingKind::TemplateParameter(_) => {
                if let Type::Class(named) | Type::Enum(named) = self.named_type(qualifier).value()
                    && named.binding != qualifier
                {
                    found = self.qualified_members(named.binding);
                }
            },
            _ => {},
        }
        found
    }

    /// Whether `derived` inherits from `base`, directly or not.
    pub(crate) fn is_derived_from(
        &self,
        derived: BindingId,
        base: BindingId,
    ) -> bool {
        let mut pending = self.bases(derived);
        let mut visited = HashSet::new();
        while let Some(next) = pending.pop() {
            if next == base {
                return true;
            }
            if visited.insert(next) {
                pending.extend(self.bases(next));
            }
        }
        false
    }
}

/// Lookup results may reach one binding along several paths.
pub(crate) fn dedup(ids: &mut Vec<BindingId>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

