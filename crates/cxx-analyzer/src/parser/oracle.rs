//! What the parser knows about names while it is still parsing.
//!
//! C and C++ cannot be parsed without knowing which identifiers name types
//! and templates. The oracle records declarations as they are parsed, in a
//! scope chain mirroring the source, and is rolled back together with the
//! parser when a speculative attempt fails.

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NameClass {
    Type,
    TypeTemplate,
    FunctionTemplate,
    Value,
    Namespace,
}

impl NameClass {
    pub(crate) fn is_type(self) -> bool {
        matches!(self, NameClass::Type | NameClass::TypeTemplate)
    }

    pub(crate) fn is_template(self) -> bool {
        matches!(self, NameClass::TypeTemplate | NameClass::FunctionTemplate)
    }
}

#[derive(Debug, Clone)]
struct ScopeInfo {
    parent: Option<usize>,
    /// Class scope searched after this one, for out-of-line member definitions.
    extra: Option<usize>,
    /// Template parameter scopes do not receive the declarations they govern.
    template: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    name: Arc<str>,
    class: NameClass,
    scope: usize,
    body: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OracleMark {
    scopes: usize,
    entries: usize,
    stack: usize,
    current: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Oracle {
    scopes: Vec<ScopeInfo>,
    entries: Vec<Entry>,
    index: HashMap<Arc<str>, Vec<usize>>,
    stack: Vec<usize>,
    current: usize,
}

pub(crate) const GLOBAL_SCOPE: usize = 0;

impl Oracle {
    pub(crate) fn new() -> Self {
        Self {
            scopes: vec![ScopeInfo {
                parent: None,
                extra: None,
                template: false,
            }],
            entries: Vec::new(),
            index: HashMap::new(),
            stack: Vec::new(),
            current: GLOBAL_SCOPE,
        }
    }

    pub(crate) fn mark(&self) -> OracleMark {
        OracleMark {
            scopes: self.scopes.len(),
            entries: self.entries.len(),
            stack: self.stack.len(),
            current: self.current,
        }
    }

    pub(crate) fn rollback(
        &mut self,
        mark: OracleMark,
    ) {
        while self.entries.len() > mark.entries {
            if let Some(entry) = self.entries.pop()
                && let Some(slots) = self.index.get_mut(&entry.name)
            {
                slots.pop();
            }
        }
        self.scopes.truncate(mark.scopes);
        self.stack.truncate(mark.stack);
        self.current = mark.current;
    }

    /// Opens a new scope nested in the current one.
    pub(crate) fn push_scope(&mut self) -> usize {
        self.push_scope_kind(false)
    }

    pub(crate) fn push_template_scope(&mut self) -> usize {
        self.push_scope_kind(true)
    }

    fn push_scope_kind(
        &mut self,
        template: bool,
    ) -> usize {
        let id = self.scopes.len();
        self.scopes.push(ScopeInfo {
            parent: Some(self.current),
            extra: None,
            template,
        });
        self.stack.push(self.current);
        self.current = id;
        id
    }

    /// Re-enters a scope opened earlier (a reopened namespace, a function's parameters).
    pub(crate) fn enter(
        &mut self,
        scope: usize,
    ) {
        self.stack.push(self.current);
        self.current = scope;
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }
    }

    pub(crate) fn set_extra(
        &mut self,
        scope: usize,
        extra: usize,
    ) {
        if let Some(info) = self.scopes.get_mut(scope) {
            info.extra = Some(extra);
        }
    }

    /// Declares `name` in the current scope, skipping template parameter
    /// scopes unless `class` is itself a template parameter.
    pub(crate) fn declare(
        &mut self,
        name: &str,
        class: NameClass,
    ) -> usize {
        let mut scope = self.current;
        while self.scopes[scope].template
            && let Some(parent) = self.scopes[scope].parent
        {
            scope = parent;
        }
        self.declare_in(scope, name, class)
    }

    pub(crate) fn declare_parameter(
        &mut self,
        name: &str,
        class: NameClass,
    ) -> usize {
        self.declare_in(self.current, name, class)
    }

    fn declare_in(
        &mut self,
        scope: usize,
        name: &str,
        class: NameClass,
    ) -> usize {
        let name: Arc<str> = Arc::from(name);
        let id = self.entries.len();
        self.entries.push(Entry {
            name: Arc::clone(&name),
            class,
            scope,
            body: None,
        });
        self.index.entry(name).or_default().push(id);
        id
    }

    pub(crate) fn set_body(
        &mut self,
        entry: usize,
        body: usize,
    ) {
        if let Some(entry) = self.entries.get_mut(entry) {
            entry.body = Some(body);
        }
    }

    /// Declares `name` in the current scope as another name for the entity a
    /// possibly qualified name designates (`using A::x;`, `namespace B = A;`).
    pub(crate) fn alias(
        &mut self,
        name: &str,
        global: bool,
        components: &[&str],
    ) -> bool {
        let Some((class, body)) = self.resolve(global, components).map(|entry| (entry.class, entry.body)) else {
            return false;
        };
        let id = self.declare(name, class);
        if let Some(body) = body {
            self.set_body(id, body);
        }
        true
    }

    /// Makes every name declared in `scope` visible in the current scope (`using namespace`).
    pub(crate) fn import_scope(
        &mut self,
        scope: usize,
    ) {
        let imported: Vec<(Arc<str>, NameClass, Option<usize>)> = self
            .entries
            .iter()
            .filter(|entry| entry.scope == scope)
            .map(|entry| (Arc::clone(&entry.name), entry.class, entry.body))
            .collect();
        for (name, class, body) in imported {
            let id = self.declare(&name, class);
            if let Some(body) = body {
                self.set_body(id, body);
            }
        }
    }

    fn find_in(
        &self,
        scope: usize,
        name: &str,
    ) -> Option<&Entry> {
        let slots = self.index.get(name)?;
        slots.iter().rev().map(|&id| &self.entries[id]).find(|entry| entry.scope == scope)
    }

    fn lookup(
        &self,
        name: &str,
    ) -> Option<&Entry> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(entry) = self.find_in(id, name) {
                return Some(entry);
            }
            if let Some(extra) = self.scopes[id].extra
                && let Some(entry) = self.lookup_from(extra, name)
            {
                return Some(entry);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    fn lookup_from(
        &self,
        start: usize,
        name: &str,
    ) -> Option<&Entry> {
        let mut scope = Some(start);
        while let Some(id) = scope {
            if let Some(entry) = self.find_in(id, name) {
                return Some(entry);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    /// Finds an existing entry of `class` declared directly in the current scope.
    pub(crate) fn local(
        &self,
        name: &str,
        class: NameClass,
    ) -> Option<(usize, Option<usize>)> {
        let slots = self.index.get(name)?;
        slots
            .iter()
            .rev()
            .find(|&&id| self.entries[id].scope == self.current && self.entries[id].class == class)
            .map(|&id| (id, self.entries[id].body))
    }

    /// Classifies a possibly qualified name. `None` means the name is unknown.
    pub(crate) fn classify(
        &self,
        global: bool,
        components: &[&str],
    ) -> Option<NameClass> {
        self.resolve(global, components).map(|entry| entry.class)
    }

    /// Scope of the class or namespace a qualified name designates.
    pub(crate) fn body_of(
        &self,
        global: bool,
        components: &[&str],
    ) -> Option<usize> {
        self.resolve(global, components).and_then(|entry| entry.body)
    }

    fn resolve(
        &self,
        global: bool,
        components: &[&str],
    ) -> Option<&Entry> {
        let (first, rest) = components.split_first()?;
        let mut entry = if global {
            self.find_in(GLOBAL_SCOPE, first)?
        } else {
            self.lookup(first)?
        };
        for component in rest {
            let body = entry.body?;
            entry = self.find_in(body, component)?;
        }
        Some(entry)
    }
}
