//! Declaration collection: one top-down walk that builds the scope tree and
//! declares every binding. References are resolved lazily afterwards.

use std::collections::HashMap;

use rowan::{TextRange, TextSize};

use crate::config::DialectConfig;
use crate::semantics::binding::{Binding, BindingId, BindingKind, BindingTable, ClassKey, ProblemKind, TemplateParameterKind};
use crate::semantics::builtins;
use crate::semantics::scope::{EntryTarget, ScopeEntry, ScopeId, ScopeKind, ScopeTree, UsingDirective};
use crate::semantics::types::Type;
use crate::syntax::ast::{
    AliasDeclaration, AstNode, ClassSpecifier, Declaration, DeclSpecifierSeq, Declarator, ElaboratedTypeSpecifier,
    EnumSpecifier, FunctionDefinition, LambdaExpression, NameRef, NamespaceAlias, NamespaceDefinition,
    ParameterDeclaration, ParameterList, SimpleDeclaration, Statement, TemplateDeclaration, TemplateParameter,
    TranslationUnit, TryBlock, TypeSpecifier, UsingDeclaration,
};
use crate::syntax::cst::{SyntaxNode, SyntaxNodePtr};
use crate::syntax::helpers;
use crate::syntax::kind::SyntaxKind;

/// A `template<>` class specialization, matched against requested
/// arguments when the template is used.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExplicitSpecialization {
    pub(crate) arguments: SyntaxNodePtr,
    pub(crate) binding: BindingId,
}

pub(crate) struct Collected {
    pub(crate) scopes: ScopeTree,
    pub(crate) bindings: BindingTable,
    /// Declaring name nodes, and class and enum specifiers, to their bindings.
    pub(crate) declared: HashMap<SyntaxNodePtr, BindingId>,
    pub(crate) explicit_specializations: HashMap<BindingId, Vec<ExplicitSpecialization>>,
    pub(crate) builtin_types: Vec<(BindingId, Type)>,
}

pub(crate) fn collect(
    root: &SyntaxNode,
    dialect: &DialectConfig,
) -> Collected {
    let mut collector = Collector {
        dialect,
        scopes: ScopeTree::new(),
        bindings: BindingTable::new(),
        declared: HashMap::new(),
        signatures: HashMap::new(),
        explicit_specializations: HashMap::new(),
    };
    let builtin_types = if dialect.gnu_extensions {
        builtins::declare(&mut collector.scopes, &mut collector.bindings, dialect)
    } else {
        Vec::new()
    };
    if let Some(unit) = TranslationUnit::cast(root.clone()) {
        for declaration in unit.declarations() {
            collector.declaration(&declaration, ScopeId::GLOBAL);
        }
    }
    tracing::debug!(
        scopes = collector.scopes.len(),
        bindings = collector.bindings.len(),
        "collected declarations"
    );
    Collected {
        scopes: collector.scopes,
        bindings: collector.bindings,
        declared: collector.declared,
        explicit_specializations: collector.explicit_specializations,
        builtin_types,
    }
}

/// The template parameter scope a declaration is nested in.
#[derive(Debug, Clone, Copy)]
struct Template {
    scope: ScopeId,
    /// `template<>`: an explicit specialization.
    explicit: bool,
}

/// What a new declaration is, as far as redeclaration matching cares.
struct Declared<'a> {
    name: &'a SyntaxNode,
    identifier: String,
    kind: BindingKind,
    tag: bool,
    defining: bool,
    signature: Option<String>,
}

struct Collector<'a> {
    dialect: &'a DialectConfig,
    scopes: ScopeTree,
    bindings: BindingTable,
    declared: HashMap<SyntaxNodePtr, BindingId>,
    signatures: HashMap<BindingId, String>,
    explicit_specializations: HashMap<BindingId, Vec<ExplicitSpecialization>>,
}

impl Collector<'_> {
    fn declaration(
        &mut self,
        declaration: &Declaration,
        scope: ScopeId,
    ) {
        match declaration {
            Declaration::SimpleDeclaration(decl) => self.simple_declaration(decl, scope, None),
            Declaration::FunctionDefinition(definition) => self.function_definition(definition, scope, None),
            Declaration::NamespaceDefinition(namespace) => self.namespace(namespace, scope),
            Declaration::NamespaceAlias(alias) => self.namespace_alias(alias, scope),
            Declaration::UsingDirective(directive) => {
                let Some(target) = directive.target() else {
                    return;
                };
                let declaring = self.scopes.declaring_scope(scope);
                if let Some(namespace) = self.name_scope(&target, scope) {
                    self.scopes.get_mut(declaring).directives.push(UsingDirective {
                        target: namespace,
                        position: directive.syntax().text_range().end(),
                    });
                }
            },
            Declaration::UsingDeclaration(using) => self.using_declaration(using, scope),
            Declaration::AliasDeclaration(alias) => self.alias_declaration(alias, scope, None),
            Declaration::TemplateDeclaration(template) => self.template(template, scope),
            Declaration::LinkageSpecification(linkage) => {
                for inner in linkage.declarations() {
                    self.declaration(&inner, scope);
                }
            },
            Declaration::StaticAssertDeclaration(assertion) => self.expressions(assertion.syntax(), scope),
            Declaration::ExplicitInstantiation(_)
            | Declaration::AsmDeclaration(_)
            | Declaration::EmptyDeclaration(_)
            | Declaration::VisibilityLabel(_)
            | Declaration::ProblemDeclaration(_) => {},
        }
    }

    fn template(
        &mut self,
        template: &TemplateDeclaration,
        scope: ScopeId,
    ) {
        let parameters = self.scopes.add(ScopeKind::TemplateParameters, scope, Some(ptr(template.syntax())));
        let mut explicit = true;
        if let Some(list) = template.parameters() {
            for parameter in list.parameters() {
                explicit = false;
                self.template_parameter(&parameter, parameters);
            }
        }
        let context = Some(Template { scope: parameters, explicit });
        match template.declaration() {
            Some(Declaration::TemplateDeclaration(nested)) => self.template(&nested, parameters),
            Some(Declaration::SimpleDeclaration(decl)) => self.simple_declaration(&decl, parameters, context),
            Some(Declaration::FunctionDefinition(definition)) => {
                self.function_definition(&definition, parameters, context)
            },
            Some(Declaration::AliasDeclaration(alias)) => self.alias_declaration(&alias, parameters, context),
            Some(other) => self.declaration(&other, parameters),
            None => {},
        }
    }

    fn template_parameter(
        &mut self,
        parameter: &TemplateParameter,
        scope: ScopeId,
    ) {
        let (name, kind) = match parameter {
            TemplateParameter::TypeTemplateParameter(parameter) => {
                (parameter.name().map(|name| name.syntax().clone()), TemplateParameterKind::Type)
            },
            TemplateParameter::TemplateTemplateParameter(parameter) => {
                (parameter.name().map(|name| name.syntax().clone()), TemplateParameterKind::Template)
            },
            TemplateParameter::ParameterDeclaration(parameter) => (
                parameter
                    .declarator()
                    .and_then(|declarator| declarator.declared_name())
                    .map(|name| name.syntax().clone()),
                TemplateParameterKind::Value,
            ),
        };
        if let Some(name) = name {
            let identifier = helpers::compact_text(&name);
            self.declare(
                scope,
                Declared {
                    name: &name,
                    identifier,
                    kind: BindingKind::TemplateParameter(kind),
                    tag: false,
                    defining: true,
                    signature: None,
                },
            );
        }
    }

    fn simple_declaration(
        &mut self,
        decl: &SimpleDeclaration,
        scope: ScopeId,
        template: Option<Template>,
    ) {
        let specifiers = decl.specifiers();
        let declarators: Vec<Declarator> = decl.declarators().collect();
        if let Some(specifiers) = &specifiers {
            let class_template = if declarators.is_empty() { template } else { None };
            self.type_specifier(specifiers, scope, class_template, !declarators.is_empty());
        }
        let declarator_template = if declarators.is_empty() { None } else { template };
        for declarator in &declarators {
            self.declarator(declarator, specifiers.as_ref(), scope, declarator_template, false);
        }
    }

    fn type_specifier(
        &mut self,
        specifiers: &DeclSpecifierSeq,
        scope: ScopeId,
        template: Option<Template>,
        has_declarators: bool,
    ) {
        match specifiers.type_specifier() {
            Some(TypeSpecifier::ClassSpecifier(class)) => {
                self.class_specifier(&class, scope, template, has_declarators);
            },
            Some(TypeSpecifier::EnumSpecifier(enumeration)) => {
                self.enum_specifier(&enumeration, scope);
            },
            Some(TypeSpecifier::ElaboratedTypeSpecifier(elaborated)) => {
                let forward = !has_declarators && !specifiers.is_friend();
                self.elaborated_type(&elaborated, scope, forward, template);
            },
            _ => {},
        }
    }

    /// Declares the entity a declarator names. `body` marks the declarator
    /// of a function definition.
    fn declarator(
        &mut self,
        declarator: &Declarator,
        specifiers: Option<&DeclSpecifierSeq>,
        scope: ScopeId,
        template: Option<Template>,
        body: bool,
    ) -> Option<BindingId> {
        if let Some(initializer) = declarator.initializer() {
            self.expressions(initializer.syntax(), scope);
        }
        let name = declarator.declared_name()?;
        if specifiers.is_some_and(DeclSpecifierSeq::is_friend) {
            return None;
        }
        let has = |kind| specifiers.is_some_and(|specifiers| specifiers.has_keyword(kind));
        let target = if name.is_qualified() {
            match self.name_scope_prefix(&name, scope) {
                Some(target) => target,
                None => return Some(self.unresolved_declaration(&name, ProblemKind::NotFound)),
            }
        } else {
            self.scopes.declaring_scope(scope)
        };
        let identifier = name.identifier();
        let is_function = declarator.is_function();
        let kind = if has(SyntaxKind::KwTypedef) {
            BindingKind::Typedef
        } else if is_function {
            if identifier.starts_with('~') {
                BindingKind::Destructor
            } else if self.is_constructor_name(&identifier, target) {
                BindingKind::Constructor
            } else {
                BindingKind::Function
            }
        } else if self.scopes.get(target).kind == ScopeKind::Class && !has(SyntaxKind::KwStatic) {
            BindingKind::Field
        } else {
            BindingKind::Variable
        };
        let defining = if is_function { body } else { !has(SyntaxKind::KwExtern) };
        let signature = (is_function && self.dialect.is_cpp()).then(|| self.signature(declarator, template));
        let declared = Declared {
            name: name.syntax(),
            identifier,
            kind,
            tag: false,
            defining,
            signature,
        };
        let id = if kind == BindingKind::Constructor {
            self.declare_constructor(target, declared)
        } else {
            self.declare(target, declared)
        };
        if let Some(template) = template
            && !template.explicit
            && is_function
        {
            self.bindings.get_mut(id).template_parameters = Some(template.scope);
            self.scopes.get_mut(template.scope).owner = Some(id);
        }
        Some(id)
    }

    fn function_definition(
        &mut self,
        definition: &FunctionDefinition,
        scope: ScopeId,
        template: Option<Template>,
    ) {
        let specifiers = definition.specifiers();
        if let Some(specifiers) = &specifiers {
            self.type_specifier(specifiers, scope, None, true);
        }
        let declarator = definition.declarator();
        let id = declarator
            .as_ref()
            .and_then(|declarator| self.declarator(declarator, specifiers.as_ref(), scope, template, true));
        let parent = declarator
            .as_ref()
            .and_then(Declarator::declared_name)
            .filter(NameRef::is_qualified)
            .and_then(|name| self.name_scope_prefix(&name, scope))
            .unwrap_or(scope);
        let function = self.scopes.add(ScopeKind::Function, parent, Some(ptr(definition.syntax())));
        if let Some(id) = id
            && self.bindings.get(id).kind.is_function()
        {
            self.scopes.get_mut(function).owner = Some(id);
            self.bindings.get_mut(id).body = Some(function);
        }
        if let Some(parameters) = declarator.as_ref().and_then(Declarator::function_parameters) {
            self.parameters(&parameters, function);
        }
        for decl in definition.syntax().children().filter_map(SimpleDeclaration::cast) {
            for declarator in decl.declarators() {
                if let Some(name) = declarator.declared_name() {
                    let identifier = name.identifier();
                    self.declare(
                        function,
                        Declared {
                            name: name.syntax(),
                            identifier,
                            kind: BindingKind::Parameter,
                            tag: false,
                            defining: true,
                            signature: None,
                        },
                    );
                }
            }
        }
        for initializer in definition.member_initializers() {
            self.expressions(&initializer, function);
        }
        if let Some(body) = definition.body() {
            self.children(body.syntax(), function);
        }
        if let Some(block) = definition.syntax().children().find_map(TryBlock::cast) {
            for handler in block.handlers() {
                self.statement(handler.syntax(), function);
            }
        }
    }

    fn parameters(
        &mut self,
        parameters: &ParameterList,
        scope: ScopeId,
    ) {
        for parameter in parameters.parameters() {
            self.parameter(&parameter, scope);
        }
        for name in parameters.identifiers() {
            let identifier = name.text();
            self.declare(
                scope,
                Declared {
                    name: name.syntax(),
                    identifier,
                    kind: BindingKind::Parameter,
                    tag: false,
                    defining: true,
                    signature: None,
                },
            );
        }
    }

    fn parameter(
        &mut self,
        parameter: &ParameterDeclaration,
        scope: ScopeId,
    ) {
        let Some(declarator) = parameter.declarator() else {
            return;
        };
        if let Some(initializer) = declarator.initializer() {
            self.expressions(initializer.syntax(), scope);
        }
        if let Some(name) = declarator.declared_name() {
            let identifier = name.identifier();
            self.declare(
                scope,
                Declared {
                    name: name.syntax(),
                    identifier,
                    kind: BindingKind::Parameter,
                    tag: false,
                    defining: true,
                    signature: None,
                },
            );
        }
    }

    fn class_specifier(
        &mut self,
        class: &ClassSpecifier,
        scope: ScopeId,
        template: Option<Template>,
        has_declarators: bool,
    ) -> BindingId {
        let declaring = self.scopes.declaring_scope(scope);
        let key = match class.key() {
            Some(SyntaxKind::KwClass) => ClassKey::Class,
            Some(SyntaxKind::KwUnion) => ClassKey::Union,
            _ => ClassKey::Struct,
        };
        let kind = BindingKind::Class(key);
        let name = class.name();
        let mut parent = scope;
        let id = match &name {
            None => {
                let id = self.bindings.push(Binding::new("", kind, Some(declaring)));
                self.bindings.get_mut(id).owner = self.scopes.get(declaring).owner;
                id
            },
            Some(name) if name.template_arguments().is_some() => self.class_specialization(name, scope, kind, template),
            Some(name) => {
                let target = if name.is_qualified() {
                    match self.name_scope_prefix(name, scope) {
                        Some(target) => {
                            parent = target;
                            target
                        },
                        None => declaring,
                    }
                } else {
                    declaring
                };
                let identifier = name.identifier();
                self.declare(
                    target,
                    Declared {
                        name: name.syntax(),
                        identifier,
                        kind,
                        tag: true,
                        defining: true,
                        signature: None,
                    },
                )
            },
        };
        self.declared.insert(ptr(class.syntax()), id);

        let body = self.scopes.add(ScopeKind::Class, parent, Some(ptr(class.syntax())));
        self.scopes.get_mut(body).owner = Some(id);
        self.bindings.get_mut(id).body = Some(body);
        let specialization = name.as_ref().is_some_and(|name| name.template_arguments().is_some());
        if let Some(template) = template
            && !template.explicit
            && !specialization
        {
            self.bindings.get_mut(id).template_parameters = Some(template.scope);
            self.scopes.get_mut(template.scope).owner = Some(id);
        }
        for member in class.members() {
            self.declaration(&member, body);
        }
        if name.is_none() && !has_declarators {
            self.scopes.get_mut(declaring).transparent.push(body);
        }
        id
    }

    /// `template<> struct V<int> { ... }`, or a partial specialization.
    fn class_specialization(
        &mut self,
        name: &NameRef,
        scope: ScopeId,
        kind: BindingKind,
        template: Option<Template>,
    ) -> BindingId {
        let declaring = self.scopes.declaring_scope(scope);
        let identifier = name.identifier();
        let primary = self.find_tag(declaring, &identifier);
        let id = self.bindings.push(Binding::new(identifier, kind, Some(declaring)));
        self.bindings.get_mut(id).owner = self.scopes.get(declaring).owner;
        self.bindings.get_mut(id).declarations.push(ptr(name.syntax()));
        self.record_declared(name.syntax(), id);
        let Some(primary) = primary else {
            return id;
        };
        let explicit = template.is_none_or(|template| template.explicit);
        if explicit && let Some(arguments) = name.template_arguments() {
            self.explicit_specializations.entry(primary).or_default().push(ExplicitSpecialization {
                arguments: ptr(arguments.syntax()),
                binding: id,
            });
        }
        id
    }

    fn enum_specifier(
        &mut self,
        enumeration: &EnumSpecifier,
        scope: ScopeId,
    ) -> BindingId {
        let declaring = self.scopes.declaring_scope(scope);
        let id = match enumeration.name() {
            Some(name) => {
                let identifier = name.identifier();
                self.declare(
                    declaring,
                    Declared {
                        name: name.syntax(),
                        identifier,
                        kind: BindingKind::Enumeration,
                        tag: true,
                        defining: true,
                        signature: None,
                    },
                )
            },
            None => {
                let id = self.bindings.push(Binding::new("", BindingKind::Enumeration, Some(declaring)));
                self.bindings.get_mut(id).owner = self.scopes.get(declaring).owner;
                id
            },
        };
        self.declared.insert(ptr(enumeration.syntax()), id);
        let target = if enumeration.is_scoped() {
            let body = self.scopes.add(ScopeKind::Enumeration, declaring, Some(ptr(enumeration.syntax())));
            self.scopes.get_mut(body).owner = Some(id);
            self.bindings.get_mut(id).body = Some(body);
            body
        } else {
            declaring
        };
        for enumerator in enumeration.enumerators() {
            self.expressions(enumerator.syntax(), target);
            let Some(name) = enumerator.name() else {
                continue;
            };
            let identifier = name.text();
            let enumerator = self.declare(
                target,
                Declared {
                    name: name.syntax(),
                    identifier,
                    kind: BindingKind::Enumerator,
                    tag: false,
                    defining: true,
                    signature: None,
                },
            );
            self.bindings.get_mut(enumerator).owner = Some(id);
        }
        id
    }

    /// `struct A;` declares `A` in the current scope; `struct A *p;`
    /// declares it in the nearest enclosing namespace or block scope
    /// unless it is already visible.
    fn elaborated_type(
        &mut self,
        elaborated: &ElaboratedTypeSpecifier,
        scope: ScopeId,
        forward: bool,
        template: Option<Template>,
    ) {
        let Some(name) = elaborated.name() else {
            return;
        };
        if name.is_qualified() || name.template_arguments().is_some() {
            return;
        }
        let kind = match elaborated.tag() {
            Some(SyntaxKind::KwEnum) => BindingKind::Enumeration,
            Some(SyntaxKind::KwUnion) => BindingKind::Class(ClassKey::Union),
            Some(SyntaxKind::KwClass) => BindingKind::Class(ClassKey::Class),
            _ => BindingKind::Class(ClassKey::Struct),
        };
        let identifier = name.identifier();
        let declaring = self.scopes.declaring_scope(scope);
        let target = if forward {
            declaring
        } else {
            if self.find_tag(declaring, &identifier).is_some() {
                return;
            }
            self.scopes
                .ancestors(declaring)
                .find(|&scope| {
                    !matches!(self.scopes.get(scope).kind, ScopeKind::Class | ScopeKind::TemplateParameters)
                })
                .unwrap_or(ScopeId::GLOBAL)
        };
        let id = self.declare(
            target,
            Declared {
                name: name.syntax(),
                identifier,
                kind,
                tag: true,
                defining: false,
                signature: None,
            },
        );
        if let Some(template) = template
            && !template.explicit
        {
            self.bindings.get_mut(id).template_parameters = Some(template.scope);
            self.scopes.get_mut(template.scope).owner = Some(id);
        }
    }

    fn namespace(
        &mut self,
        namespace: &NamespaceDefinition,
        scope: ScopeId,
    ) {
        let path = namespace.path();
        let mut current = self.scopes.declaring_scope(scope);
        if path.is_empty() {
            let id = self.bindings.push(Binding::new("", BindingKind::Namespace, Some(current)));
            let body = self.scopes.add(ScopeKind::Namespace, current, Some(ptr(namespace.syntax())));
            self.scopes.get_mut(body).owner = Some(id);
            self.bindings.get_mut(id).body = Some(body);
            self.scopes.get_mut(current).directives.push(UsingDirective {
                target: body,
                position: namespace.syntax().text_range().start(),
            });
            current = body;
        }
        for (index, name) in path.iter().enumerate() {
            let identifier = name.text();
            let id = self.declare(
                current,
                Declared {
                    name: name.syntax(),
                    identifier,
                    kind: BindingKind::Namespace,
                    tag: false,
                    defining: true,
                    signature: None,
                },
            );
            let body = match self.bindings.get(id).body {
                Some(body) => body,
                None => {
                    let body = self.scopes.add(ScopeKind::Namespace, current, None);
                    self.scopes.get_mut(body).owner = Some(id);
                    self.bindings.get_mut(id).body = Some(body);
                    body
                },
            };
            if index + 1 == path.len() {
                self.scopes.alias_node(ptr(namespace.syntax()), body);
                if namespace.is_inline() {
                    self.scopes.get_mut(current).directives.push(UsingDirective {
                        target: body,
                        position: TextSize::from(0),
                    });
                }
            }
            current = body;
        }
        for declaration in namespace.declarations() {
            self.declaration(&declaration, current);
        }
    }

    fn namespace_alias(
        &mut self,
        alias: &NamespaceAlias,
        scope: ScopeId,
    ) {
        let Some(name) = alias.alias() else {
            return;
        };
        let identifier = name.text();
        let declaring = self.scopes.declaring_scope(scope);
        let id = self.declare(
            declaring,
            Declared {
                name: name.syntax(),
                identifier,
                kind: BindingKind::NamespaceAlias,
                tag: false,
                defining: true,
                signature: None,
            },
        );
        if let Some(target) = alias.target()
            && let Some(body) = self.name_scope(&target, scope)
        {
            self.bindings.get_mut(id).body = Some(body);
        }
    }

    fn using_declaration(
        &mut self,
        using: &UsingDeclaration,
        scope: ScopeId,
    ) {
        let Some(target) = using.target() else {
            return;
        };
        let declaring = self.scopes.declaring_scope(scope);
        self.scopes.get_mut(declaring).add_entry(ScopeEntry {
            name: target.identifier(),
            target: EntryTarget::Using(ptr(using.syntax())),
            position: using.syntax().text_range().end(),
            tag: false,
        });
    }

    fn alias_declaration(
        &mut self,
        alias: &AliasDeclaration,
        scope: ScopeId,
        template: Option<Template>,
    ) {
        let Some(name) = alias.name() else {
            return;
        };
        let identifier = name.text();
        let declaring = self.scopes.declaring_scope(scope);
        let id = self.declare(
            declaring,
            Declared {
                name: name.syntax(),
                identifier,
                kind: BindingKind::Typedef,
                tag: false,
                defining: true,
                signature: None,
            },
        );
        if let Some(template) = template
            && !template.explicit
        {
            self.bindings.get_mut(id).template_parameters = Some(template.scope);
            self.scopes.get_mut(template.scope).owner = Some(id);
        }
    }

    /// Walks the children of a statement or block, declaring into `scope`.
    fn children(
        &mut self,
        node: &SyntaxNode,
        scope: ScopeId,
    ) {
        for child in node.children() {
            let kind = child.kind();
            if let Some(declaration) = Declaration::cast(child.clone()) {
                self.declaration(&declaration, scope);
            } else if let Some(parameter) = ParameterDeclaration::cast(child.clone()) {
                self.parameter(&parameter, scope);
            } else if Statement::can_cast(kind) || kind == SyntaxKind::CatchHandler {
                self.statement(&child, scope);
            } else {
                self.expressions(&child, scope);
            }
        }
    }

    fn statement(
        &mut self,
        node: &SyntaxNode,
        scope: ScopeId,
    ) {
        match node.kind() {
            SyntaxKind::CompoundStatement
            | SyntaxKind::IfStatement
            | SyntaxKind::SwitchStatement
            | SyntaxKind::WhileStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::RangeForStatement
            | SyntaxKind::CatchHandler => {
                let block = self.scopes.add(ScopeKind::Block, scope, Some(ptr(node)));
                self.children(node, block);
            },
            SyntaxKind::LabelStatement => {
                if let Some(name) = node.children().find(|child| child.kind() == SyntaxKind::Name) {
                    self.declare_label(&name, scope);
                }
                self.children(node, scope);
            },
            _ => self.children(node, scope),
        }
    }

    fn declare_label(
        &mut self,
        name: &SyntaxNode,
        scope: ScopeId,
    ) {
        let Some(function) = self.scopes.function_scope(scope) else {
            return;
        };
        let identifier = helpers::compact_text(name);
        let id = match self.scopes.get(function).labels.get(&identifier) {
            Some(&id) => id,
            None => {
                let id = self.bindings.push(Binding::new(identifier.clone(), BindingKind::Label, Some(function)));
                self.scopes.get_mut(function).labels.insert(identifier, id);
                id
            },
        };
        let binding = self.bindings.get_mut(id);
        binding.declarations.push(ptr(name));
        binding.definition.get_or_insert(ptr(name));
        self.declared.insert(ptr(name), id);
    }

    /// Finds the scopes expressions introduce: lambdas and statement expressions.
    fn expressions(
        &mut self,
        node: &SyntaxNode,
        scope: ScopeId,
    ) {
        match node.kind() {
            SyntaxKind::LambdaExpression => {
                let Some(lambda) = LambdaExpression::cast(node.clone()) else {
                    return;
                };
                let function = self.scopes.add(ScopeKind::Function, scope, Some(ptr(node)));
                if let Some(parameters) = lambda.parameters() {
                    self.parameters(&parameters, function);
                }
                if let Some(body) = lambda.body() {
                    self.children(body.syntax(), function);
                }
            },
            SyntaxKind::StatementExpression => {
                for child in node.children() {
                    self.statement(&child, scope);
                }
            },
            _ => {
                for child in node.children() {
                    self.expressions(&child, scope);
                }
            },
        }
    }

    /// Adds a declaration to `scope`, merging it with a compatible earlier
    /// declaration of the same name.
    fn declare(
        &mut self,
        scope: ScopeId,
        declared: Declared<'_>,
    ) -> BindingId {
        let existing: Vec<BindingId> = self
            .scopes
            .get(scope)
            .lookup(&declared.identifier)
            .filter(|entry| entry.tag == declared.tag)
            .filter_map(|entry| match entry.target {
                EntryTarget::Binding(id) => Some(id),
                EntryTarget::Using(_) => None,
            })
            .collect();
        for &id in &existing {
            if self.redeclares(id, &declared) {
                self.merge(id, &declared);
                return id;
            }
        }
        let overloads = declared.kind.is_function()
            && existing.iter().all(|&id| self.bindings.get(id).kind.is_function());
        if !existing.is_empty() && !overloads {
            tracing::debug!(name = %declared.identifier, "conflicting declaration");
            return self.conflict(scope, &declared, existing);
        }
        let id = self.new_binding(scope, &declared);
        self.scopes.get_mut(scope).add_entry(ScopeEntry {
            name: declared.identifier,
            target: EntryTarget::Binding(id),
            position: declared.name.text_range().end(),
            tag: declared.tag,
        });
        id
    }

    fn declare_constructor(
        &mut self,
        class: ScopeId,
        declared: Declared<'_>,
    ) -> BindingId {
        let existing = self.scopes.get(class).constructors.clone();
        for id in existing {
            if self.redeclares(id, &declared) {
                self.merge(id, &declared);
                return id;
            }
        }
        let id = self.new_binding(class, &declared);
        self.scopes.get_mut(class).constructors.push(id);
        id
    }

    fn new_binding(
        &mut self,
        scope: ScopeId,
        declared: &Declared<'_>,
    ) -> BindingId {
        let mut binding = Binding::new(declared.identifier.clone(), declared.kind, Some(scope));
        binding.owner = self.scopes.get(scope).owner;
        binding.declarations.push(ptr(declared.name));
        if declared.defining {
            binding.definition = Some(ptr(declared.name));
        }
        let id = self.bindings.push(binding);
        if let Some(signature) = &declared.signature {
            self.signatures.insert(id, signature.clone());
        }
        self.record_declared(declared.name, id);
        id
    }

    fn redeclares(
        &self,
        id: BindingId,
        declared: &Declared<'_>,
    ) -> bool {
        let existing = self.bindings.get(id).kind;
        match (existing, declared.kind) {
            (old, new) if old.is_function() && new.is_function() => {
                self.dialect.is_c() || self.signatures.get(&id) == declared.signature.as_ref()
            },
            (BindingKind::Class(_), BindingKind::Class(_)) => true,
            (BindingKind::Enumeration, BindingKind::Enumeration)
            | (BindingKind::Namespace, BindingKind::Namespace)
            | (BindingKind::Variable, BindingKind::Variable)
            | (BindingKind::Field, BindingKind::Field)
            | (BindingKind::Typedef, BindingKind::Typedef)
            | (BindingKind::Parameter, BindingKind::Parameter) => true,
            _ => false,
        }
    }

    fn merge(
        &mut self,
        id: BindingId,
        declared: &Declared<'_>,
    ) {
        let binding = self.bindings.get_mut(id);
        binding.declarations.push(ptr(declared.name));
        if declared.defining && binding.definition.is_none() {
            binding.definition = Some(ptr(declared.name));
        }
        self.record_declared(declared.name, id);
    }

    fn conflict(
        &mut self,
        scope: ScopeId,
        declared: &Declared<'_>,
        existing: Vec<BindingId>,
    ) -> BindingId {
        let mut problem = Binding::new(
            declared.identifier.clone(),
            BindingKind::Problem(ProblemKind::ConflictingDeclaration),
            Some(scope),
        );
        problem.declarations.push(ptr(declared.name));
        problem.candidates = existing;
        let id = self.bindings.push(problem);
        self.record_declared(declared.name, id);
        id
    }

    fn unresolved_declaration(
        &mut self,
        name: &NameRef,
        problem: ProblemKind,
    ) -> BindingId {
        let mut binding = Binding::new(name.identifier(), BindingKind::Problem(problem), None);
        binding.declarations.push(ptr(name.syntax()));
        let id = self.bindings.push(binding);
        self.record_declared(name.syntax(), id);
        id
    }

    /// Maps a declaring name to its binding, together with the final
    /// component of a qualified name and the template name of a template-id.
    fn record_declared(
        &mut self,
        name: &SyntaxNode,
        id: BindingId,
    ) {
        self.declared.insert(ptr(name), id);
        match name.kind() {
            SyntaxKind::QualifiedName => {
                if let Some(last) = name.children().filter(|child| NameRef::can_cast(child.kind())).last() {
                    self.record_declared(&last, id);
                }
            },
            SyntaxKind::TemplateId => {
                if let Some(template_name) = name.children().find(|child| child.kind() == SyntaxKind::Name) {
                    self.declared.insert(ptr(&template_name), id);
                }
            },
            _ => {},
        }
    }

    fn is_constructor_name(
        &self,
        identifier: &str,
        scope: ScopeId,
    ) -> bool {
        let scope = self.scopes.get(scope);
        scope.kind == ScopeKind::Class
            && scope.owner.is_some_and(|owner| {
                let owner = self.bindings.get(owner);
                !owner.is_anonymous() && owner.name == identifier
            })
    }

    /// Key of a function's parameter types, for telling overloads apart.
    fn signature(
        &self,
        declarator: &Declarator,
        template: Option<Template>,
    ) -> String {
        let mut key = String::new();
        if let Some(parameters) = declarator.function_parameters() {
            let mut parts: Vec<String> = parameters.parameters().map(|parameter| parameter_key(&parameter)).collect();
            if parts.len() == 1 && parts[0] == "void" {
                parts.clear();
            }
            if parameters.is_variadic() {
                parts.push("...".to_string());
            }
            key = parts.join(",");
        }
        for qualifier in declarator.function_qualifiers() {
            key.push_str(&format!(" {qualifier:?}"));
        }
        if let Some(template) = template
            && !template.explicit
        {
            key.push_str(&format!(" template/{}", self.scopes.get(template.scope).entries().len()));
        }
        key
    }

    /// Body scope of the entity named by all components of `name`.
    fn name_scope(
        &self,
        name: &NameRef,
        from: ScopeId,
    ) -> Option<ScopeId> {
        let mut components = name.qualifier();
        components.push(name.last_component());
        self.path_scope(&components, name.is_global(), from)
    }

    /// Body scope of the qualifier of `name`: `A::B` in `A::B::f`.
    fn name_scope_prefix(
        &self,
        name: &NameRef,
        from: ScopeId,
    ) -> Option<ScopeId> {
        self.path_scope(&name.qualifier(), name.is_global(), from)
    }

    fn path_scope(
        &self,
        components: &[NameRef],
        global: bool,
        from: ScopeId,
    ) -> Option<ScopeId> {
        let mut current = global.then_some(ScopeId::GLOBAL);
        for component in components {
            let identifier = component.identifier();
            let found = match current {
                Some(scope) => self.member_body(scope, &identifier),
                None => self.scopes.ancestors(from).find_map(|scope| self.member_body(scope, &identifier)),
            };
            current = Some(found?);
        }
        current
    }

    fn member_body(
        &self,
        scope: ScopeId,
        identifier: &str,
    ) -> Option<ScopeId> {
        let direct = self.scopes.get(scope).lookup(identifier).find_map(|entry| match entry.target {
            EntryTarget::Binding(id) => self.bindings.get(id).body,
            EntryTarget::Using(_) => None,
        });
        direct.or_else(|| {
            self.scopes
                .get(scope)
                .directives
                .iter()
                .find_map(|directive| self.member_body(directive.target, identifier))
        })
    }

    fn find_tag(
        &self,
        scope: ScopeId,
        identifier: &str,
    ) -> Option<BindingId> {
        self.scopes.ancestors(scope).find_map(|scope| {
            self.scopes.get(scope).lookup(identifier).find_map(|entry| match entry.target {
                EntryTarget::Binding(id) if entry.tag => Some(id),
                _ => None,
            })
        })
    }
}

fn ptr(node: &SyntaxNode) -> SyntaxNodePtr {
    SyntaxNodePtr::new(node)
}

fn parameter_key(parameter: &ParameterDeclaration) -> String {
    let mut skipped: Vec<TextRange> = Vec::new();
    if let Some(declarator) = parameter.declarator() {
        for level in declarator.levels() {
            if let Some(name) = level.name() {
                skipped.push(name.syntax().text_range());
            }
            if let Some(initializer) = level.initializer() {
                skipped.push(initializer.syntax().text_range());
            }
        }
    }
    helpers::significant_tokens(parameter.syntax())
        .filter(|token| !skipped.iter().any(|range| range.contains_range(token.text_range())))
        .map(|token| token.text().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "../../tests/src/semantics/collect_tests.rs"]
mod tests;
