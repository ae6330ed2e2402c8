//! Types of declared entities and of expressions.

use crate::semantics::Semantics;
use crate::semantics::binding::{BindingId, BindingKind, TemplateParameterKind};
use crate::semantics::lookup::Filter;
use crate::semantics::overload::Argument;
use crate::semantics::types::{BuiltinType, FunctionType, Named, Qualifiers, Type};
use crate::syntax::ast::{
    AliasDeclaration, AstNode, BinaryExpression, DeclSpecifierSeq, Declarator, Expression, FieldReference,
    FunctionCallExpression, FunctionDefinition, Initializer, NameRef, ParameterDeclaration, ParameterList, PtrOperator, SimpleDeclaration,
    Statement, TypeId, TypeSpecifier, UnaryExpression,
};
use crate::syntax::cst::{SyntaxNode, SyntaxNodePtr};
use crate::syntax::helpers;
use crate::syntax::kind::SyntaxKind;

impl Semantics {
    /// The declared type of a binding: the object type of a variable, the
    /// function type of a function, the denoted type of a type name.
    pub fn type_of(
        &self,
        id: BindingId,
    ) -> Type {
        if let Some(ty) = self.binding_types.borrow().get(&id).cloned() {
            return ty;
        }
        if !self.typing.borrow_mut().insert(id) {
            return Type::Unknown;
        }
        let ty = self.compute_binding_type(id);
        self.typing.borrow_mut().remove(&id);
        self.binding_types.borrow_mut().insert(id, ty.clone());
        ty
    }

    fn compute_binding_type(
        &self,
        id: BindingId,
    ) -> Type {
        let (kind, owner, declaration) =
            self.with_binding(id, |binding| (binding.kind, binding.owner, binding.first_declaration()));
        match kind {
            BindingKind::Class(_) => Type::Class(self.named(id)),
            BindingKind::Enumeration => Type::Enum(self.named(id)),
            BindingKind::TemplateParameter(TemplateParameterKind::Type | TemplateParameterKind::Template) => {
                Type::TemplateParameter(self.named(id))
            },
            BindingKind::Enumerator => match owner {
                Some(owner) if self.kind(owner) == BindingKind::Enumeration => Type::Enum(self.named(owner)),
                _ => Type::INT,
            },
            BindingKind::Namespace | BindingKind::NamespaceAlias | BindingKind::Label | BindingKind::Problem(_) => {
                Type::Unknown
            },
            _ => {
                let ty = declaration
                    .and_then(|name| name.try_to_node(&self.root))
                    .map_or(Type::Unknown, |name| self.declared_type(&name));
                if kind == BindingKind::Typedef
                    && let Some(specialization) = self.with_binding(id, |binding| binding.specialization.clone())
                {
                    let map = self.argument_map(specialization.template, &specialization.arguments);
                    return self.substitute(&ty, &map);
                }
                ty
            },
        }
    }

    fn named(
        &self,
        id: BindingId,
    ) -> Named {
        let name = self.qualified_name(id);
        Named {
            binding: id,
            name: if name.is_empty() { "<anonymous>".to_string() } else { name },
        }
    }

    /// The type a type name denotes; `Unknown` for anything else.
    pub(crate) fn named_type(
        &self,
        id: BindingId,
    ) -> Type {
        if self.kind(id).is_type() { self.type_of(id) } else { Type::Unknown }
    }

    /// Type of the entity declared by the name node `name`.
    pub(crate) fn declared_type(
        &self,
        name: &SyntaxNode,
    ) -> Type {
        let parent = name.parent();
        if let Some(alias) = parent.clone().and_then(AliasDeclaration::cast) {
            return alias.type_id().map_or(Type::Unknown, |type_id| self.type_id_type(&type_id));
        }
        if parent.is_some_and(|parent| parent.kind() == SyntaxKind::ParameterList) {
            return self.identifier_parameter_type(name);
        }
        let Some(declarator) = name.ancestors().find_map(Declarator::cast) else {
            return Type::Unknown;
        };
        let outermost = declarator
            .syntax()
            .ancestors()
            .map_while(Declarator::cast)
            .last()
            .unwrap_or(declarator);
        let specifiers = outermost.syntax().parent().and_then(|owner| specifiers_of(&owner));
        let (mut base, auto) = self.specifier_type(specifiers.as_ref());
        if auto {
            base = self.deduced_type(&outermost);
        }
        self.declarator_type(base, &outermost)
    }

    /// `auto` takes the initializer's type, without the pointer levels the
    /// declarator adds back.
    fn deduced_type(
        &self,
        declarator: &Declarator,
    ) -> Type {
        let initializer = match declarator.initializer() {
            Some(Initializer::EqualsInitializer(initializer)) => initializer.syntax().children().find_map(Expression::cast),
            Some(Initializer::ConstructorInitializer(initializer)) => {
                initializer.syntax().children().find_map(Expression::cast)
            },
            _ => None,
        };
        let Some(initializer) = initializer else {
            return Type::Unknown;
        };
        let mut deduced = self.type_of_expression(&initializer).decay();
        for operator in declarator.pointer_operators() {
            if let PtrOperator::PointerOp(_) = operator {
                deduced = deduced.pointee().cloned().unwrap_or(Type::Unknown);
            }
        }
        deduced
    }

    /// A K&R parameter named in the identifier list; typed by the
    /// declarations between the parameter list and the body, or `int`.
    fn identifier_parameter_type(
        &self,
        name: &SyntaxNode,
    ) -> Type {
        let identifier = helpers::compact_text(name);
        let Some(definition) = name.ancestors().find_map(FunctionDefinition::cast) else {
            return Type::INT;
        };
        let declared = definition
            .syntax()
            .children()
            .filter_map(SimpleDeclaration::cast)
            .flat_map(|declaration| declaration.declarators().collect::<Vec<_>>())
            .filter_map(|declarator| declarator.declared_name())
            .find(|declared| declared.identifier() == identifier);
        match declared {
            Some(declared) => self.declared_type(declared.syntax()),
            None => Type::INT,
        }
    }

    /// The type named by a specifier sequence, and whether it was `auto`.
    pub(crate) fn specifier_type(
        &self,
        specifiers: Option<&DeclSpecifierSeq>,
    ) -> (Type, bool) {
        let implicit = if self.dialect.is_c() { Type::INT } else { Type::Unknown };
        let Some(specifiers) = specifiers else {
            return (implicit, false);
        };
        let keywords: Vec<SyntaxKind> = specifiers.keywords().collect();
        let qualifiers = Qualifiers {
            is_const: keywords.contains(&SyntaxKind::KwConst),
            is_volatile: keywords.contains(&SyntaxKind::KwVolatile),
        };
        let mut auto = false;
        let base = match specifiers.type_specifier() {
            Some(TypeSpecifier::NamedTypeSpecifier(named)) => {
                named.name().map_or(Type::Unknown, |name| self.type_named_by(&name))
            },
            Some(TypeSpecifier::ElaboratedTypeSpecifier(elaborated)) => {
                elaborated.name().map_or(Type::Unknown, |name| self.type_named_by(&name))
            },
            Some(TypeSpecifier::ClassSpecifier(class)) => self
                .declared_binding(class.syntax())
                .map_or(Type::Unknown, |id| self.type_of(id)),
            Some(TypeSpecifier::EnumSpecifier(enumeration)) => self
                .declared_binding(enumeration.syntax())
                .map_or(Type::Unknown, |id| self.type_of(id)),
            Some(TypeSpecifier::TypeofSpecifier(typeof_specifier)) => self.operand_type(typeof_specifier.syntax()),
            Some(TypeSpecifier::DecltypeSpecifier(decltype)) => self.operand_type(decltype.syntax()),
            None => match builtin_type(&keywords) {
                Some(builtin) => Type::Builtin(builtin),
                None if keywords.contains(&SyntaxKind::KwAuto) && self.dialect.is_cpp() => {
                    auto = true;
                    Type::Unknown
                },
                None => implicit,
            },
        };
        (base.qualified(qualifiers), auto)
    }

    /// `typeof(...)` and `decltype(...)`: a type-id or an expression.
    fn operand_type(
        &self,
        node: &SyntaxNode,
    ) -> Type {
        if let Some(type_id) = node.children().find_map(TypeId::cast) {
            return self.type_id_type(&type_id);
        }
        node.children()
            .find_map(Expression::cast)
            .map_or(Type::Unknown, |expression| self.type_of_expression(&expression))
    }

    fn type_named_by(
        &self,
        name: &NameRef,
    ) -> Type {
        self.named_type(self.resolve(name))
    }

    /// Applies pointer operators, then suffixes from the name outwards,
    /// then the parenthesized inner declarator.
    pub(crate) fn declarator_type(
        &self,
        base: Type,
        declarator: &Declarator,
    ) -> Type {
        let mut ty = base;
        for operator in declarator.pointer_operators() {
            ty = self.apply_pointer_operator(ty, &operator);
        }
        let suffixes: Vec<SyntaxNode> = declarator.suffixes().collect();
        for suffix in suffixes.iter().rev() {
            ty = match ParameterList::cast(suffix.clone()) {
                Some(parameters) => self.function_type(ty, &parameters, declarator),
                None => Type::Array {
                    element: Box::new(ty),
                    size: array_size(suffix),
                },
            };
        }
        match declarator.nested() {
            Some(nested) => self.declarator_type(ty, &nested),
            None => ty,
        }
    }

    fn apply_pointer_operator(
        &self,
        ty: Type,
        operator: &PtrOperator,
    ) -> Type {
        match operator {
            PtrOperator::PointerOp(pointer) => {
                let keywords: Vec<SyntaxKind> = pointer.qualifiers().collect();
                ty.pointer_to().qualified(Qualifiers {
                    is_const: keywords.contains(&SyntaxKind::KwConst),
                    is_volatile: keywords.contains(&SyntaxKind::KwVolatile),
                })
            },
            // References to references collapse.
            PtrOperator::ReferenceOp(_) if ty.is_reference() => ty,
            PtrOperator::ReferenceOp(reference) => Type::Reference {
                rvalue: reference.is_rvalue(),
                target: Box::new(ty),
            },
            PtrOperator::PointerToMemberOp(member) => {
                let class = member
                    .class_path()
                    .last()
                    .map_or(Type::Unknown, |last| self.named_type(self.resolve_name(last.syntax())));
                Type::PointerToMember {
                    class: Box::new(class),
                    member: Box::new(ty),
                }
            },
        }
    }

    fn function_type(
        &self,
        ret: Type,
        parameters: &ParameterList,
        declarator: &Declarator,
    ) -> Type {
        let ret = match declarator.trailing_return() {
            Some(trailing) => self.type_id_type(&trailing),
            None => ret,
        };
        let mut params = Vec::new();
        let mut required = 0;
        let mut defaulted = false;
        let mut spelled_void = false;
        let declarations: Vec<ParameterDeclaration> = parameters.parameters().collect();
        for parameter in &declarations {
            let (base, _) = self.specifier_type(parameter.specifiers().as_ref());
            let ty = match parameter.declarator() {
                Some(declarator) => self.declarator_type(base, &declarator),
                None => base,
            };
            spelled_void = declarations.len() == 1 && parameter.declarator().is_none() && ty == Type::VOID;
            params.push(adjust_parameter(ty));
            if parameter.has_default() {
                defaulted = true;
            } else if !defaulted {
                required += 1;
            }
        }
        for name in parameters.identifiers() {
            let ty = self.declared_binding(name.syntax()).map_or(Type::INT, |id| self.type_of(id));
            params.push(adjust_parameter(ty));
            required += 1;
        }
        if spelled_void {
            params.clear();
            required = 0;
        }
        // `f()` in C says nothing about the parameters.
        let unprototyped = self.dialect.is_c() && params.is_empty() && !spelled_void;
        Type::Function(FunctionType {
            ret: Box::new(ret),
            params,
            variadic: parameters.is_variadic() || unprototyped,
            required,
        })
    }

    pub(crate) fn type_id_type(
        &self,
        type_id: &TypeId,
    ) -> Type {
        let (base, _) = self.specifier_type(type_id.specifiers().as_ref());
        match type_id.declarator() {
            Some(declarator) => self.declarator_type(base, &declarator),
            None => base,
        }
    }

    /// The type of `id` where the name `node` is or sits in refers to it. A
    /// member named after `.` or `->` on a specialization has the template's
    /// parameters replaced by the specialization's arguments.
    pub fn type_at(
        &self,
        id: BindingId,
        node: &SyntaxNode,
    ) -> Type {
        let ty = self.type_of(id);
        let Some(name) = node.ancestors().find(|ancestor| NameRef::can_cast(ancestor.kind())) else {
            return ty;
        };
        let field = name
            .parent()
            .and_then(FieldReference::cast)
            .filter(|field| field.member().is_some_and(|member| member.syntax() == &name));
        match field {
            Some(field) => self.through_specialization(ty, self.accessed_class(&field)),
            None => ty,
        }
    }

    /// The type of an expression; `Unknown` where it cannot be determined.
    pub fn type_of_expression(
        &self,
        expression: &Expression,
    ) -> Type {
        let ptr = SyntaxNodePtr::new(expression.syntax());
        if let Some(ty) = self.expression_types.borrow().get(&ptr).cloned() {
            return ty;
        }
        let ty = self.compute_expression_type(expression);
        self.expression_types.borrow_mut().insert(ptr, ty.clone());
        ty
    }

    fn compute_expression_type(
        &self,
        expression: &Expression,
    ) -> Type {
        match expression {
            Expression::LiteralExpression(literal) => match literal.token() {
                Some(token) => self.literal_type(token.kind(), token.text(), literal.syntax()),
                None => Type::Unknown,
            },
            Expression::IdExpression(id) => match id.name() {
                Some(name) => self.value_type(self.resolve(&name)),
                None => Type::Unknown,
            },
            Expression::ParenthesizedExpression(parenthesized) => self.optional_type(parenthesized.inner()),
            Expression::BinaryExpression(binary) => self.binary_type(binary),
            Expression::ConditionalExpression(conditional) => {
                let branches: Vec<Type> = conditional
                    .branches()
                    .skip(1)
                    .map(|branch| self.type_of_expression(&branch))
                    .collect();
                branches.iter().find(|ty| ty.is_known()).cloned().unwrap_or(Type::Unknown)
            },
            Expression::UnaryExpression(unary) => self.unary_type(unary),
            Expression::PostfixExpression(postfix) => {
                self.optional_type(postfix.syntax().children().find_map(Expression::cast))
            },
            Expression::CastExpression(cast) => cast.type_id().map_or(Type::Unknown, |type_id| self.type_id_type(&type_id)),
            Expression::NamedCastExpression(cast) => {
                cast.type_id().map_or(Type::Unknown, |type_id| self.type_id_type(&type_id))
            },
            Expression::CompoundLiteral(literal) => {
                literal.type_id().map_or(Type::Unknown, |type_id| self.type_id_type(&type_id))
            },
            Expression::FunctionCallExpression(call) => self.call_type(call),
            Expression::ArraySubscriptExpression(subscript) => {
                let operands: Vec<Type> = subscript
                    .syntax()
                    .children()
                    .filter_map(Expression::cast)
                    .map(|operand| self.type_of_expression(&operand))
                    .collect();
                operands
                    .iter()
                    .find_map(|operand| operand.pointee().cloned())
                    .unwrap_or(Type::Unknown)
            },
            Expression::FieldReference(field) => match field.member() {
                Some(member) => {
                    let id = self.resolve(&member);
                    let ty = self.value_type(id);
                    self.through_specialization(ty, self.accessed_class(field))
                },
                None => Type::Unknown,
            },
            Expression::PointerToMemberExpression(access) => match self.optional_type(access.member()).value() {
                Type::PointerToMember { member, .. } => (**member).clone(),
                _ => Type::Unknown,
            },
            Expression::TypeIdExpression(expression) => {
                let sizeof = helpers::significant_tokens(expression.syntax())
                    .next()
                    .is_some_and(|token| matches!(token.kind(), SyntaxKind::KwSizeof | SyntaxKind::KwAlignof));
                if sizeof { Type::Builtin(BuiltinType::UnsignedLong) } else { Type::Unknown }
            },
            Expression::NewExpression(new) => match new.type_id() {
                Some(type_id) => match self.type_id_type(&type_id) {
                    Type::Array { element, .. } => element.pointer_to(),
                    ty => ty.pointer_to(),
                },
                None => Type::Unknown,
            },
            Expression::DeleteExpression(_) => Type::VOID,
            Expression::LambdaExpression(_) => Type::Unknown,
            Expression::StatementExpression(statement) => {
                let last = statement.body().and_then(|body| body.statements().last());
                match last {
                    Some(Statement::ExpressionStatement(last)) => self.optional_type(last.expression()),
                    _ => Type::VOID,
                }
            },
            Expression::SimpleTypeConstructorExpression(constructor) => {
                self.specifier_type(constructor.specifiers().as_ref()).0
            },
        }
    }

    fn optional_type(
        &self,
        expression: Option<Expression>,
    ) -> Type {
        expression.map_or(Type::Unknown, |expression| self.type_of_expression(&expression))
    }

    /// The type of a name used as an expression.
    fn value_type(
        &self,
        id: BindingId,
    ) -> Type {
        match self.kind(id) {
            BindingKind::Variable
            | BindingKind::Field
            | BindingKind::Parameter
            | BindingKind::Enumerator
            | BindingKind::Function
            | BindingKind::TemplateParameter(_) => self.type_of(id),
            BindingKind::Class(_) | BindingKind::Typedef => self.named_type(id),
            _ => Type::Unknown,
        }
    }

    /// Replaces the template parameters of a member type when the member
    /// was reached through a specialization.
    fn through_specialization(
        &self,
        ty: Type,
        class: Option<BindingId>,
    ) -> Type {
        let Some(specialization) = class.and_then(|class| self.with_binding(class, |binding| binding.specialization.clone()))
        else {
            return ty;
        };
        if specialization.explicit {
            return ty;
        }
        let map = self.argument_map(specialization.template, &specialization.arguments);
        self.substitute(&ty, &map)
    }

    fn literal_type(
        &self,
        kind: SyntaxKind,
        text: &str,
        node: &SyntaxNode,
    ) -> Type {
        let truth = if self.dialect.is_cpp() { BuiltinType::Bool } else { BuiltinType::Int };
        match kind {
            SyntaxKind::Integer => Type::Builtin(integer_literal_type(text)),
            SyntaxKind::Float => {
                Type::Builtin(match text.chars().last().map(|c| c.to_ascii_lowercase()) {
                    Some('f') => BuiltinType::Float,
                    Some('l') => BuiltinType::LongDouble,
                    _ => BuiltinType::Double,
                })
            },
            SyntaxKind::Char if self.dialect.is_cpp() => Type::Builtin(match text.chars().next() {
                Some('L') => BuiltinType::WChar,
                Some('u') => BuiltinType::Char16,
                Some('U') => BuiltinType::Char32,
                _ => BuiltinType::Char,
            }),
            SyntaxKind::Char => Type::INT,
            SyntaxKind::String => {
                let element = Type::Builtin(match text.chars().next() {
                    Some('L') => BuiltinType::WChar,
                    _ => BuiltinType::Char,
                });
                let element = if self.dialect.is_cpp() { element.qualified(Qualifiers::CONST) } else { element };
                Type::Array {
                    element: Box::new(element),
                    size: None,
                }
            },
            SyntaxKind::KwTrue | SyntaxKind::KwFalse => Type::Builtin(truth),
            SyntaxKind::KwNullptr => Type::Builtin(BuiltinType::NullPtr),
            SyntaxKind::KwThis => self.this_type(node),
            _ => Type::Unknown,
        }
    }

    /// `this` inside a member function: a pointer to the class, const in a
    /// const member function.
    fn this_type(
        &self,
        node: &SyntaxNode,
    ) -> Type {
        for definition in node.ancestors().filter_map(FunctionDefinition::cast) {
            let Some(declarator) = definition.declarator() else {
                continue;
            };
            let Some(function) = declarator
                .declared_name()
                .and_then(|name| self.declared_binding(name.syntax()))
            else {
                continue;
            };
            let Some(class) = self
                .with_binding(function, |binding| binding.owner)
                .filter(|&owner| matches!(self.kind(owner), BindingKind::Class(_)))
            else {
                continue;
            };
            let qualifiers = Qualifiers {
                is_const: declarator.function_qualifiers().contains(&SyntaxKind::KwConst),
                is_volatile: declarator.function_qualifiers().contains(&SyntaxKind::KwVolatile),
            };
            return self.type_of(class).qualified(qualifiers).pointer_to();
        }
        Type::Unknown
    }

    fn unary_type(
        &self,
        unary: &UnaryExpression,
    ) -> Type {
        let operand = unary.operand();
        match unary.operator() {
            Some(SyntaxKind::Amp) => match operand {
                Some(operand) => self.address_type(&operand),
                None => Type::Unknown,
            },
            Some(SyntaxKind::Star) => self.optional_type(operand).decay().pointee().cloned().unwrap_or(Type::Unknown),
            Some(SyntaxKind::Exclaim) => Type::Builtin(if self.dialect.is_cpp() { BuiltinType::Bool } else { BuiltinType::Int }),
            Some(SyntaxKind::Plus | SyntaxKind::Minus | SyntaxKind::Tilde) => match self.optional_type(operand).value() {
                Type::Builtin(builtin) if builtin.is_arithmetic() => Type::Builtin(builtin.promoted()),
                Type::Enum(_) => Type::INT,
                other => other.clone(),
            },
            Some(SyntaxKind::KwSizeof | SyntaxKind::KwAlignof) => Type::Builtin(BuiltinType::UnsignedLong),
            Some(SyntaxKind::KwNoexcept) => Type::Builtin(BuiltinType::Bool),
            // GNU `&&label`.
            Some(SyntaxKind::AndAnd) => Type::VOID.pointer_to(),
            Some(SyntaxKind::KwThrow) => Type::VOID,
            _ => self.optional_type(operand),
        }
    }

    /// `&x` is a pointer; `&A::m` names a non-static member and is a
    /// pointer to member.
    fn address_type(
        &self,
        operand: &Expression,
    ) -> Type {
        if let Expression::IdExpression(id) = operand
            && let Some(name) = id.name()
            && name.is_qualified()
        {
            let member = self.resolve(&name);
            let (kind, owner) = self.with_binding(member, |binding| (binding.kind, binding.owner));
            if let Some(owner) = owner
                && matches!(self.kind(owner), BindingKind::Class(_))
                && matches!(kind, BindingKind::Field | BindingKind::Function)
                && !self.is_static_member(member)
            {
                return Type::PointerToMember {
                    class: Box::new(self.type_of(owner)),
                    member: Box::new(self.type_of(member)),
                };
            }
        }
        self.type_of_expression(operand).non_reference().clone().pointer_to()
    }

    fn is_static_member(
        &self,
        member: BindingId,
    ) -> bool {
        let Some(name) = self.declaration_node(member) else {
            return false;
        };
        let declarator = name.ancestors().find_map(Declarator::cast);
        let owner = declarator
            .and_then(|declarator| declarator.syntax().ancestors().find(|node| node.kind() != SyntaxKind::Declarator));
        owner
            .and_then(|owner| specifiers_of(&owner))
            .is_some_and(|specifiers| specifiers.has_keyword(SyntaxKind::KwStatic))
    }

    fn binary_type(
        &self,
        binary: &BinaryExpression,
    ) -> Type {
        let Some(operator) = binary.operator() else {
            return Type::Unknown;
        };
        let lhs = self.optional_type(binary.lhs());
        let rhs = self.optional_type(binary.rhs());
        if let Some(ty) = self.overloaded_operator(binary, operator.text(), &lhs, &rhs) {
            return ty;
        }
        let truth = Type::Builtin(if self.dialect.is_cpp() { BuiltinType::Bool } else { BuiltinType::Int });
        match operator.kind() {
            SyntaxKind::Comma => rhs,
            SyntaxKind::Equal
            | SyntaxKind::PlusEqual
            | SyntaxKind::MinusEqual
            | SyntaxKind::StarEqual
            | SyntaxKind::SlashEqual
            | SyntaxKind::PercentEqual
            | SyntaxKind::CaretEqual
            | SyntaxKind::AmpEqual
            | SyntaxKind::PipeEqual
            | SyntaxKind::LeftShiftEqual
            | SyntaxKind::RightShiftEqual => lhs,
            SyntaxKind::EqualEqual
            | SyntaxKind::NotEqual
            | SyntaxKind::Less
            | SyntaxKind::Greater
            | SyntaxKind::LessEqual
            | SyntaxKind::GreaterEqual
            | SyntaxKind::AndAnd
            | SyntaxKind::OrOr => truth,
            SyntaxKind::Plus | SyntaxKind::Minus => {
                let (left, right) = (lhs.decay(), rhs.decay());
                match (left.is_pointer(), right.is_pointer()) {
                    (true, true) => Type::Builtin(BuiltinType::Long),
                    (true, false) => left,
                    (false, true) => right,
                    (false, false) => usual_arithmetic(&lhs, &rhs),
                }
            },
            SyntaxKind::LeftShift | SyntaxKind::RightShift => match lhs.value() {
                Type::Builtin(builtin) => Type::Builtin(builtin.promoted()),
                _ => Type::INT,
            },
            _ => usual_arithmetic(&lhs, &rhs),
        }
    }

    /// The result of `operator@` when either operand has class type.
    fn overloaded_operator(
        &self,
        binary: &BinaryExpression,
        spelling: &str,
        lhs: &Type,
        rhs: &Type,
    ) -> Option<Type> {
        if self.dialect.is_c() || (lhs.class_binding().is_none() && rhs.class_binding().is_none()) {
            return None;
        }
        let name = format!("operator{spelling}");
        let right = Argument {
            ty: rhs.clone(),
            null_pointer: false,
        };
        if let Some(class) = lhs.class_binding() {
            let members = self.lookup_member(class, &name);
            if !members.is_empty() {
                let chosen = self.choose(&name, members, Some(std::slice::from_ref(&right)));
                return self.type_of(chosen).as_function().map(|function| (*function.ret).clone());
            }
        }
        let scope = self.scope_of(binary.syntax());
        let free = self.lookup_unqualified(&name, scope, binary.syntax().text_range().start(), Filter::Ordinary);
        if free.is_empty() {
            return None;
        }
        let left = Argument {
            ty: lhs.clone(),
            null_pointer: false,
        };
        let chosen = self.choose(&name, free, Some(&[left, right]));
        self.type_of(chosen).as_function().map(|function| (*function.ret).clone())
    }

    fn call_type(
        &self,
        call: &FunctionCallExpression,
    ) -> Type {
        let Some(callee) = call.callee() else {
            return Type::Unknown;
        };
        let (function, class) = match &callee {
            Expression::IdExpression(id) => match id.name() {
                Some(name) => (self.resolve(&name), None),
                None => return Type::Unknown,
            },
            Expression::FieldReference(field) => match field.member() {
                Some(member) => (self.resolve(&member), self.accessed_class(field)),
                None => return Type::Unknown,
            },
            other => {
                return self
                    .type_of_expression(other)
                    .as_function()
                    .map_or(Type::Unknown, |function| (*function.ret).clone());
            },
        };
        match self.kind(function) {
            BindingKind::Class(_) | BindingKind::Typedef => self.named_type(function),
            BindingKind::Function => {
                let arguments = self.arguments_of(call);
                let ty = match self.instantiate_call(function, &arguments) {
                    Some(function) => (*function.ret).clone(),
                    None => Type::Unknown,
                };
                self.through_specialization(ty, class)
            },
            _ => {
                let ty = self.through_specialization(self.value_type(function), class);
                ty.as_function().map_or(Type::Unknown, |function| (*function.ret).clone())
            },
        }
    }
}

/// The specifier sequence of the declaration that owns a declarator.
fn specifiers_of(owner: &SyntaxNode) -> Option<DeclSpecifierSeq> {
    match owner.kind() {
        SyntaxKind::SimpleDeclaration
        | SyntaxKind::FunctionDefinition
        | SyntaxKind::ParameterDeclaration
        | SyntaxKind::TypeId => owner.children().find_map(DeclSpecifierSeq::cast),
        _ => None,
    }
}

/// The builtin type spelled by a keyword combination.
fn builtin_type(keywords: &[SyntaxKind]) -> Option<BuiltinType> {
    let has = |kind| keywords.contains(&kind);
    let longs = keywords.iter().filter(|&&kind| kind == SyntaxKind::KwLong).count();
    let unsigned = has(SyntaxKind::KwUnsigned);
    let builtin = if has(SyntaxKind::KwVoid) {
        BuiltinType::Void
    } else if has(SyntaxKind::KwBool) {
        BuiltinType::Bool
    } else if has(SyntaxKind::KwWchar) {
        BuiltinType::WChar
    } else if has(SyntaxKind::KwChar16) {
        BuiltinType::Char16
    } else if has(SyntaxKind::KwChar32) {
        BuiltinType::Char32
    } else if has(SyntaxKind::KwChar) {
        if unsigned {
            BuiltinType::UnsignedChar
        } else if has(SyntaxKind::KwSigned) {
            BuiltinType::SignedChar
        } else {
            BuiltinType::Char
        }
    } else if has(SyntaxKind::KwFloat) {
        BuiltinType::Float
    } else if has(SyntaxKind::KwDouble) {
        if longs > 0 { BuiltinType::LongDouble } else { BuiltinType::Double }
    } else if has(SyntaxKind::KwShort) {
        if unsigned { BuiltinType::UnsignedShort } else { BuiltinType::Short }
    } else if longs >= 2 {
        if unsigned { BuiltinType::UnsignedLongLong } else { BuiltinType::LongLong }
    } else if longs == 1 {
        if unsigned { BuiltinType::UnsignedLong } else { BuiltinType::Long }
    } else if unsigned {
        BuiltinType::UnsignedInt
    } else if has(SyntaxKind::KwInt) || has(SyntaxKind::KwSigned) || has(SyntaxKind::KwComplex) {
        if has(SyntaxKind::KwComplex) { BuiltinType::Double } else { BuiltinType::Int }
    } else {
        return None;
    };
    Some(builtin)
}

/// Array and function parameters are adjusted to pointers; top-level
/// qualifiers do not take part in the function type.
fn adjust_parameter(ty: Type) -> Type {
    match ty.unqualified() {
        Type::Array { element, .. } => Type::Pointer(element.clone()),
        function @ Type::Function(_) => function.clone().pointer_to(),
        unqualified => unqualified.clone(),
    }
}

fn array_size(modifier: &SyntaxNode) -> Option<u64> {
    let token = helpers::significant_tokens(modifier).find(|token| token.kind() == SyntaxKind::Integer)?;
    let significant = helpers::significant_tokens(modifier)
        .filter(|token| !matches!(token.kind(), SyntaxKind::LBracket | SyntaxKind::RBracket))
        .count();
    if significant != 1 {
        return None;
    }
    parse_integer(token.text())
}

fn parse_integer(text: &str) -> Option<u64> {
    let digits = text.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse().ok()
    }
}

/// `int` unless a suffix or the value asks for more.
fn integer_literal_type(text: &str) -> BuiltinType {
    let suffix: String = text
        .chars()
        .rev()
        .take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let unsigned = suffix.contains('u');
    let longs = suffix.matches('l').count();
    let value = parse_integer(text).unwrap_or(0);
    match (unsigned, longs) {
        (false, 0) if value <= i32::MAX as u64 => BuiltinType::Int,
        (true, 0) if value <= u32::MAX as u64 => BuiltinType::UnsignedInt,
        (false, 0 | 1) => BuiltinType::Long,
        (true, 0 | 1) => BuiltinType::UnsignedLong,
        (false, _) => BuiltinType::LongLong,
        (true, _) => BuiltinType::UnsignedLongLong,
    }
}

/// Promotes both operands and converts to the higher-ranked one.
fn usual_arithmetic(
    lhs: &Type,
    rhs: &Type,
) -> Type {
    let arithmetic = |ty: &Type| match ty.value() {
        Type::Builtin(builtin) if builtin.is_arithmetic() => Some(builtin.promoted()),
        Type::Enum(_) => Some(BuiltinType::Int),
        _ => None,
    };
    match (arithmetic(lhs), arithmetic(rhs)) {
        (Some(left), Some(right)) => Type::Builtin(if left.rank() > right.rank() {
            left
        } else if right.rank() > left.rank() || right.is_unsigned() {
            right
        } else {
            left
        }),
        _ => Type::Unknown,
    }
}

#[cfg(test)]
#[path = "../../tests/src/semantics/typing_tests.rs"]
mod tests;
