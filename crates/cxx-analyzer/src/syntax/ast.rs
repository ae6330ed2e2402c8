//! Typed views over the untyped syntax tree.
//!
//! Every wrapper is a cheap handle around a [`SyntaxNode`] of one kind; the
//! enums group related kinds into sum types that callers match on.

use crate::syntax::cst::{SyntaxNode, SyntaxToken};
use crate::syntax::helpers;
use crate::syntax::kind::SyntaxKind;

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name {
                syntax: SyntaxNode,
            }

            impl AstNode for $name {
                fn can_cast(kind: SyntaxKind) -> bool {
                    kind == SyntaxKind::$name
                }

                fn cast(syntax: SyntaxNode) -> Option<Self> {
                    Self::can_cast(syntax.kind()).then_some(Self { syntax })
                }

                fn syntax(&self) -> &SyntaxNode {
                    &self.syntax
                }
            }
        )*
    };
}

macro_rules! ast_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant($variant),)*
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$variant)|*)
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                match syntax.kind() {
                    $(SyntaxKind::$variant => Some($name::$variant($variant { syntax })),)*
                    _ => None,
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $($name::$variant(node) => node.syntax(),)*
                }
            }
        }
    };
}

ast_node!(
    TranslationUnit,
    SimpleDeclaration,
    FunctionDefinition,
    NamespaceDefinition,
    NamespaceAlias,
    UsingDirective,
    UsingDeclaration,
    AliasDeclaration,
    TemplateDeclaration,
    ExplicitInstantiation,
    LinkageSpecification,
    StaticAssertDeclaration,
    AsmDeclaration,
    EmptyDeclaration,
    VisibilityLabel,
    ProblemDeclaration,
    DeclSpecifierSeq,
    NamedTypeSpecifier,
    ElaboratedTypeSpecifier,
    ClassSpecifier,
    BaseClause,
    BaseSpecifier,
    EnumSpecifier,
    Enumerator,
    TypeofSpecifier,
    DecltypeSpecifier,
    Declarator,
    PointerOp,
    ReferenceOp,
    PointerToMemberOp,
    ParameterList,
    ParameterDeclaration,
    ArrayModifier,
    EqualsInitializer,
    ConstructorInitializer,
    InitializerList,
    TemplateParameterList,
    TypeTemplateParameter,
    TemplateTemplateParameter,
    TypeId,
    Name,
    QualifiedName,
    TemplateId,
    TemplateArgumentList,
    OperatorName,
    ConversionName,
    DestructorName,
    CompoundStatement,
    ExpressionStatement,
    DeclarationStatement,
    IfStatement,
    SwitchStatement,
    CaseStatement,
    DefaultStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    RangeForStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    GotoStatement,
    LabelStatement,
    NullStatement,
    TryBlock,
    CatchHandler,
    ProblemStatement,
    LiteralExpression,
    IdExpression,
    ParenthesizedExpression,
    BinaryExpression,
    ConditionalExpression,
    UnaryExpression,
    PostfixExpression,
    CastExpression,
    FunctionCallExpression,
    ArgumentList,
    ArraySubscriptExpression,
    FieldReference,
    PointerToMemberExpression,
    TypeIdExpression,
    NewExpression,
    DeleteExpression,
    LambdaExpression,
    StatementExpression,
    CompoundLiteral,
    SimpleTypeConstructorExpression,
    NamedCastExpression,
);

ast_enum!(
    /// Anything that may appear where a declaration is expected.
    Declaration {
        SimpleDeclaration,
        FunctionDefinition,
        NamespaceDefinition,
        NamespaceAlias,
        UsingDirective,
        UsingDeclaration,
        AliasDeclaration,
        TemplateDeclaration,
        ExplicitInstantiation,
        LinkageSpecification,
        StaticAssertDeclaration,
        AsmDeclaration,
        EmptyDeclaration,
        VisibilityLabel,
        ProblemDeclaration,
    }
);

ast_enum!(
    Statement {
        CompoundStatement,
        ExpressionStatement,
        DeclarationStatement,
        IfStatement,
        SwitchStatement,
        CaseStatement,
        DefaultStatement,
        WhileStatement,
        DoStatement,
        ForStatement,
        RangeForStatement,
        BreakStatement,
        ContinueStatement,
        ReturnStatement,
        GotoStatement,
        LabelStatement,
        NullStatement,
        TryBlock,
        ProblemStatement,
    }
);

ast_enum!(
    Expression {
        LiteralExpression,
        IdExpression,
        ParenthesizedExpression,
        BinaryExpression,
        ConditionalExpression,
        UnaryExpression,
        PostfixExpression,
        CastExpression,
        FunctionCallExpression,
        ArraySubscriptExpression,
        FieldReference,
        PointerToMemberExpression,
        TypeIdExpression,
        NewExpression,
        DeleteExpression,
        LambdaExpression,
        StatementExpression,
        CompoundLiteral,
        SimpleTypeConstructorExpression,
        NamedCastExpression,
    }
);

ast_enum!(
    /// The type specifier inside a specifier sequence.
    TypeSpecifier {
        NamedTypeSpecifier,
        ElaboratedTypeSpecifier,
        ClassSpecifier,
        EnumSpecifier,
        TypeofSpecifier,
        DecltypeSpecifier,
    }
);

ast_enum!(
    /// A possibly qualified name as written.
    NameRef {
        Name,
        QualifiedName,
        TemplateId,
        OperatorName,
        ConversionName,
        DestructorName,
    }
);

ast_enum!(
    PtrOperator {
        PointerOp,
        ReferenceOp,
        PointerToMemberOp,
    }
);

ast_enum!(
    Initializer {
        EqualsInitializer,
        ConstructorInitializer,
        InitializerList,
    }
);

ast_enum!(
    TemplateParameter {
        TypeTemplateParameter,
        TemplateTemplateParameter,
        ParameterDeclaration,
    }
);

fn child<N: AstNode>(syntax: &SyntaxNode) -> Option<N> {
    syntax.children().find_map(N::cast)
}

fn children<N: AstNode>(syntax: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    syntax.children().filter_map(N::cast)
}

fn has_token(
    syntax: &SyntaxNode,
    kind: SyntaxKind,
) -> bool {
    helpers::child_token(syntax, kind).is_some()
}

impl TranslationUnit {
    pub fn declarations(&self) -> impl Iterator<Item = Declaration> + use<> {
        children(&self.syntax)
    }
}

impl SimpleDeclaration {
    pub fn specifiers(&self) -> Option<DeclSpecifierSeq> {
        child(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = Declarator> + use<> {
        children(&self.syntax)
    }
}

impl FunctionDefinition {
    pub fn specifiers(&self) -> Option<DeclSpecifierSeq> {
        child(&self.syntax)
    }

    pub fn declarator(&self) -> Option<Declarator> {
        child(&self.syntax)
    }

    /// The body, also when wrapped in a function try-block.
    pub fn body(&self) -> Option<CompoundStatement> {
        child(&self.syntax).or_else(|| child::<TryBlock>(&self.syntax).and_then(|block| block.body()))
    }

    pub fn member_initializers(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        let owner = child::<TryBlock>(&self.syntax).map_or_else(|| self.syntax.clone(), |block| block.syntax().clone());
        owner
            .children()
            .filter(|node| node.kind() == SyntaxKind::CtorInitializerList)
            .flat_map(|list| list.children())
            .filter(|node| node.kind() == SyntaxKind::MemberInitializer)
    }
}

impl NamespaceDefinition {
    /// Names of `namespace A::B`, outermost first; empty when anonymous.
    pub fn path(&self) -> Vec<Name> {
        children(&self.syntax).collect()
    }

    pub fn is_inline(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::KwInline)
    }

    pub fn declarations(&self) -> impl Iterator<Item = Declaration> + use<> {
        children(&self.syntax)
    }
}

impl NamespaceAlias {
    pub fn alias(&self) -> Option<Name> {
        child(&self.syntax)
    }

    pub fn target(&self) -> Option<NameRef> {
        children::<NameRef>(&self.syntax).nth(1)
    }
}

impl UsingDirective {
    pub fn target(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl UsingDeclaration {
    pub fn target(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl AliasDeclaration {
    pub fn name(&self) -> Option<Name> {
        child(&self.syntax)
    }

    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl TemplateDeclaration {
    pub fn parameters(&self) -> Option<TemplateParameterList> {
        child(&self.syntax)
    }

    pub fn declaration(&self) -> Option<Declaration> {
        child(&self.syntax)
    }
}

impl ExplicitInstantiation {
    pub fn declaration(&self) -> Option<Declaration> {
        child(&self.syntax)
    }
}

impl LinkageSpecification {
    pub fn declarations(&self) -> impl Iterator<Item = Declaration> + use<> {
        children(&self.syntax)
    }
}

impl TemplateParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = TemplateParameter> + use<> {
        children(&self.syntax)
    }
}

impl TypeTemplateParameter {
    pub fn name(&self) -> Option<Name> {
        child(&self.syntax)
    }

    pub fn default_type(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl TemplateTemplateParameter {
    pub fn name(&self) -> Option<Name> {
        child(&self.syntax)
    }
}

impl DeclSpecifierSeq {
    pub fn type_specifier(&self) -> Option<TypeSpecifier> {
        child(&self.syntax)
    }

    pub fn keywords(&self) -> impl Iterator<Item = SyntaxKind> + use<> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .filter(|kind| kind.is_keyword())
    }

    pub fn has_keyword(
        &self,
        kind: SyntaxKind,
    ) -> bool {
        self.keywords().any(|keyword| keyword == kind)
    }

    pub fn is_typedef(&self) -> bool {
        self.has_keyword(SyntaxKind::KwTypedef)
    }

    pub fn is_friend(&self) -> bool {
        self.has_keyword(SyntaxKind::KwFriend)
    }
}

impl NamedTypeSpecifier {
    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl ElaboratedTypeSpecifier {
    /// `struct`, `class`, `union` or `enum`.
    pub fn tag(&self) -> Option<SyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .find(|kind| matches!(kind, SyntaxKind::KwStruct | SyntaxKind::KwClass | SyntaxKind::KwUnion | SyntaxKind::KwEnum))
    }

    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl ClassSpecifier {
    pub fn key(&self) -> Option<SyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .find(|kind| matches!(kind, SyntaxKind::KwStruct | SyntaxKind::KwClass | SyntaxKind::KwUnion))
    }

    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }

    pub fn bases(&self) -> impl Iterator<Item = BaseSpecifier> + use<> {
        child::<BaseClause>(&self.syntax)
            .into_iter()
            .flat_map(|clause| children::<BaseSpecifier>(clause.syntax()))
    }

    pub fn members(&self) -> impl Iterator<Item = Declaration> + use<> {
        children(&self.syntax)
    }
}

impl BaseSpecifier {
    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }

    pub fn is_virtual(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::KwVirtual)
    }
}

impl EnumSpecifier {
    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }

    /// `enum class` or `enum struct`.
    pub fn is_scoped(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::KwClass) || has_token(&self.syntax, SyntaxKind::KwStruct)
    }

    pub fn enumerators(&self) -> impl Iterator<Item = Enumerator> + use<> {
        children(&self.syntax)
    }
}

impl Enumerator {
    pub fn name(&self) -> Option<Name> {
        child(&self.syntax)
    }
}

impl Declarator {
    pub fn pointer_operators(&self) -> impl Iterator<Item = PtrOperator> + use<> {
        children(&self.syntax)
    }

    /// The parenthesized declarator in `(*f)(int)`.
    pub fn nested(&self) -> Option<Declarator> {
        child(&self.syntax)
    }

    /// The name written directly in this declarator.
    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }

    /// The declared name, looking through parenthesized declarators.
    pub fn declared_name(&self) -> Option<NameRef> {
        match self.nested() {
            Some(nested) => nested.declared_name(),
            None => self.name(),
        }
    }

    pub fn parameter_lists(&self) -> impl Iterator<Item = ParameterList> + use<> {
        children(&self.syntax)
    }

    pub fn array_modifiers(&self) -> impl Iterator<Item = ArrayModifier> + use<> {
        children(&self.syntax)
    }

    /// Suffixes in source order: parameter lists and array bounds.
    pub fn suffixes(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax
            .children()
            .filter(|node| matches!(node.kind(), SyntaxKind::ParameterList | SyntaxKind::ArrayModifier))
    }

    pub fn initializer(&self) -> Option<Initializer> {
        child(&self.syntax)
    }

    pub fn trailing_return(&self) -> Option<TypeId> {
        self.syntax
            .children()
            .find(|node| node.kind() == SyntaxKind::TrailingReturn)
            .and_then(|node| child(&node))
    }

    pub fn is_bit_field(&self) -> bool {
        self.syntax.children().any(|node| node.kind() == SyntaxKind::BitField)
    }

    /// Declarators from this one inward through parentheses.
    pub fn levels(&self) -> Vec<Declarator> {
        let mut levels = vec![self.clone()];
        while let Some(inner) = levels.last().and_then(Declarator::nested) {
            levels.push(inner);
        }
        levels
    }

    /// The level whose derivation applies first to the name: the innermost
    /// one carrying suffixes or pointer operators.
    fn outermost_derivation(&self) -> Option<Declarator> {
        self.levels()
            .into_iter()
            .rev()
            .find(|level| level.suffixes().next().is_some() || level.pointer_operators().next().is_some())
    }

    /// Declares a function rather than a pointer to one or an object.
    pub fn is_function(&self) -> bool {
        self.function_parameters().is_some()
    }

    /// Parameters of the declared function.
    pub fn function_parameters(&self) -> Option<ParameterList> {
        let level = self.outermost_derivation()?;
        match level.suffixes().next() {
            Some(suffix) => ParameterList::cast(suffix),
            None => None,
        }
    }

    /// Cv-qualifiers and ref-qualifiers following the parameter list.
    pub fn function_qualifiers(&self) -> Vec<SyntaxKind> {
        self.syntax
            .children_with_tokens()
            .skip_while(|element| element.kind() != SyntaxKind::ParameterList)
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .filter(|kind| {
                matches!(kind, SyntaxKind::KwConst | SyntaxKind::KwVolatile | SyntaxKind::Amp | SyntaxKind::AndAnd)
            })
            .collect()
    }
}

impl PointerOp {
    pub fn qualifiers(&self) -> impl Iterator<Item = SyntaxKind> + use<> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .filter(|kind| matches!(kind, SyntaxKind::KwConst | SyntaxKind::KwVolatile | SyntaxKind::KwRestrict))
    }
}

impl ReferenceOp {
    pub fn is_rvalue(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::AndAnd)
    }
}

impl PointerToMemberOp {
    /// The class components of `A::B::*`, outermost first.
    pub fn class_path(&self) -> Vec<NameRef> {
        children(&self.syntax).collect()
    }

    pub fn is_global(&self) -> bool {
        self.syntax
            .first_child_or_token()
            .is_some_and(|element| element.kind() == SyntaxKind::DoubleColon)
    }

    /// `A::B` as written, without the trailing `::*`.
    pub fn class_text(&self) -> String {
        let parts: Vec<String> = self.class_path().iter().map(|name| helpers::compact_text(name.syntax())).collect();
        let prefix = if self.is_global() { "::" } else { "" };
        format!("{prefix}{}", parts.join("::"))
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = ParameterDeclaration> + use<> {
        children(&self.syntax)
    }

    /// K&R identifier list names.
    pub fn identifiers(&self) -> impl Iterator<Item = Name> + use<> {
        children(&self.syntax)
    }

    pub fn is_variadic(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::Ellipsis)
    }
}

impl ParameterDeclaration {
    pub fn specifiers(&self) -> Option<DeclSpecifierSeq> {
        child(&self.syntax)
    }

    pub fn declarator(&self) -> Option<Declarator> {
        child(&self.syntax)
    }

    pub fn has_default(&self) -> bool {
        self.declarator().is_some_and(|declarator| declarator.initializer().is_some())
    }
}

impl TypeId {
    pub fn specifiers(&self) -> Option<DeclSpecifierSeq> {
        child(&self.syntax)
    }

    pub fn declarator(&self) -> Option<Declarator> {
        child(&self.syntax)
    }
}

impl Name {
    pub fn token(&self) -> Option<SyntaxToken> {
        helpers::name_token(&self.syntax)
    }

    pub fn text(&self) -> String {
        self.token().map(|token| token.text().to_string()).unwrap_or_default()
    }

    pub fn is_completion(&self) -> bool {
        self.token().is_some_and(|token| token.kind() == SyntaxKind::CompletionName)
    }
}

impl TemplateId {
    pub fn template_name(&self) -> Option<Name> {
        child(&self.syntax)
    }

    pub fn arguments(&self) -> Option<TemplateArgumentList> {
        child(&self.syntax)
    }
}

impl TemplateArgumentList {
    /// Type-ids and expressions, in order.
    pub fn arguments(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.children()
    }
}

impl QualifiedName {
    pub fn is_global(&self) -> bool {
        self.syntax
            .first_child_or_token()
            .is_some_and(|element| element.kind() == SyntaxKind::DoubleColon)
    }

    pub fn components(&self) -> impl Iterator<Item = NameRef> + use<> {
        children(&self.syntax)
    }
}

impl DestructorName {
    pub fn class_name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl ConversionName {
    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl NameRef {
    /// The final unqualified identifier, with `~` for destructors and the
    /// spelled operator for operator functions.
    pub fn identifier(&self) -> String {
        match self {
            NameRef::Name(name) => name.text(),
            NameRef::TemplateId(id) => id.template_name().map(|name| name.text()).unwrap_or_default(),
            NameRef::QualifiedName(name) => name.components().last().map(|last| last.identifier()).unwrap_or_default(),
            NameRef::DestructorName(name) => {
                format!("~{}", name.class_name().map(|class| class.identifier()).unwrap_or_default())
            },
            NameRef::OperatorName(_) | NameRef::ConversionName(_) => helpers::compact_text(self.syntax()),
        }
    }

    /// Qualifier components before the final one, as identifiers.
    pub fn qualifier(&self) -> Vec<NameRef> {
        match self {
            NameRef::QualifiedName(name) => {
                let mut components: Vec<NameRef> = name.components().collect();
                components.pop();
                components
            },
            _ => Vec::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, NameRef::QualifiedName(name) if name.is_global())
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, NameRef::QualifiedName(_))
    }

    /// The innermost component node: a `Name`, `TemplateId` or special name.
    pub fn last_component(&self) -> NameRef {
        match self {
            NameRef::QualifiedName(name) => name.components().last().unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }

    /// Template arguments of the last component.
    pub fn template_arguments(&self) -> Option<TemplateArgumentList> {
        match self.last_component() {
            NameRef::TemplateId(id) => id.arguments(),
            _ => None,
        }
    }

    pub fn is_completion(&self) -> bool {
        helpers::significant_tokens(self.syntax()).any(|token| token.kind() == SyntaxKind::CompletionName)
    }

    pub fn text(&self) -> String {
        helpers::compact_text(self.syntax())
    }
}

impl CompoundStatement {
    pub fn statements(&self) -> impl Iterator<Item = Statement> + use<> {
        children(&self.syntax)
    }
}

impl DeclarationStatement {
    pub fn declaration(&self) -> Option<Declaration> {
        child(&self.syntax)
    }
}

impl ExpressionStatement {
    pub fn expression(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl ReturnStatement {
    pub fn expression(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl TryBlock {
    pub fn body(&self) -> Option<CompoundStatement> {
        child(&self.syntax)
    }

    pub fn handlers(&self) -> impl Iterator<Item = CatchHandler> + use<> {
        children(&self.syntax)
    }
}

impl CatchHandler {
    pub fn parameter(&self) -> Option<ParameterDeclaration> {
        child(&self.syntax)
    }

    pub fn body(&self) -> Option<CompoundStatement> {
        child(&self.syntax)
    }
}

impl IdExpression {
    pub fn name(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl ParenthesizedExpression {
    pub fn inner(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl BinaryExpression {
    pub fn lhs(&self) -> Option<Expression> {
        child(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Expression> {
        children(&self.syntax).nth(1)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| !token.kind().is_trivia())
    }
}

impl UnaryExpression {
    pub fn operator(&self) -> Option<SyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .find(|kind| !kind.is_trivia())
    }

    pub fn operand(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl ConditionalExpression {
    pub fn branches(&self) -> impl Iterator<Item = Expression> + use<> {
        children(&self.syntax)
    }
}

impl CastExpression {
    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }

    pub fn operand(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl NamedCastExpression {
    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl CompoundLiteral {
    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl FunctionCallExpression {
    pub fn callee(&self) -> Option<Expression> {
        child(&self.syntax)
    }

    pub fn arguments(&self) -> impl Iterator<Item = Expression> + use<> {
        child::<ArgumentList>(&self.syntax)
            .into_iter()
            .flat_map(|list| children::<Expression>(list.syntax()))
    }
}

impl ArraySubscriptExpression {
    pub fn base(&self) -> Option<Expression> {
        child(&self.syntax)
    }
}

impl FieldReference {
    pub fn object(&self) -> Option<Expression> {
        child(&self.syntax)
    }

    pub fn is_arrow(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::Arrow)
    }

    pub fn member(&self) -> Option<NameRef> {
        child(&self.syntax)
    }
}

impl PointerToMemberExpression {
    pub fn object(&self) -> Option<Expression> {
        child(&self.syntax)
    }

    /// `->*` rather than `.*`.
    pub fn is_arrow(&self) -> bool {
        has_token(&self.syntax, SyntaxKind::ArrowStar)
    }

    pub fn member(&self) -> Option<Expression> {
        children(&self.syntax).nth(1)
    }
}

impl NewExpression {
    pub fn type_id(&self) -> Option<TypeId> {
        child(&self.syntax)
    }
}

impl SimpleTypeConstructorExpression {
    pub fn specifiers(&self) -> Option<DeclSpecifierSeq> {
        child(&self.syntax)
    }
}

impl StatementExpression {
    pub fn body(&self) -> Option<CompoundStatement> {
        child(&self.syntax)
    }
}

impl LambdaExpression {
    pub fn parameters(&self) -> Option<ParameterList> {
        child(&self.syntax)
    }

    pub fn body(&self) -> Option<CompoundStatement> {
        child(&self.syntax)
    }
}

impl LiteralExpression {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| !token.kind().is_trivia())
    }
}

impl Declaration {
    /// Unwraps `template<...>` and `extern template` to the declaration inside.
    pub fn innermost(&self) -> Declaration {
        match self {
            Declaration::TemplateDeclaration(template) => {
                template.declaration().map_or_else(|| self.clone(), |inner| inner.innermost())
            },
            Declaration::ExplicitInstantiation(instantiation) => {
                instantiation.declaration().map_or_else(|| self.clone(), |inner| inner.innermost())
            },
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/ast_tests.rs"]
mod tests;
