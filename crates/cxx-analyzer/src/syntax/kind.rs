use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    Error = 0,
    Whitespace,
    Newline,
    Comment,

    // Identifiers & Literals
    Ident,
    /// Identifier prefix ending at a completion caret, possibly empty.
    CompletionName,
    Integer,
    Float,
    String,
    Char,

    // Preprocessor / punctuation
    Hash,
    HashHash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    Dot,
    Ellipsis,
    Arrow,
    ArrowStar,
    DotStar,
    DoubleColon,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusPlus,
    MinusMinus,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    CaretEqual,
    AmpEqual,
    PipeEqual,
    EqualEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    AndAnd,
    OrOr,
    LeftShift,
    RightShift,
    LeftShiftEqual,
    RightShiftEqual,
    /// GNU `<?`
    Min,
    /// GNU `>?`
    Max,
    /// End of input; never part of a tree.
    Eof,

    // Keywords shared by C and C++
    KwAuto,
    KwBreak,
    KwCase,
    KwChar,
    KwConst,
    KwContinue,
    KwDefault,
    KwDo,
    KwDouble,
    KwElse,
    KwEnum,
    KwExtern,
    KwFloat,
    KwFor,
    KwGoto,
    KwIf,
    KwInline,
    KwInt,
    KwLong,
    KwRegister,
    KwReturn,
    KwShort,
    KwSigned,
    KwSizeof,
    KwStatic,
    KwStruct,
    KwSwitch,
    KwTypedef,
    KwUnion,
    KwUnsigned,
    KwVoid,
    KwVolatile,
    KwWhile,

    // C99 / C11
    KwRestrict,
    KwBool,
    KwComplex,
    KwImaginary,
    KwStaticAssert,
    KwNoreturn,
    KwAlignof,
    KwThreadLocal,

    // C++
    KwAlignas,
    KwAsm,
    KwCatch,
    KwChar16,
    KwChar32,
    KwClass,
    KwConstCast,
    KwConstexpr,
    KwDecltype,
    KwDelete,
    KwDynamicCast,
    KwExplicit,
    KwExport,
    KwFalse,
    KwFriend,
    KwMutable,
    KwNamespace,
    KwNew,
    KwNoexcept,
    KwNullptr,
    KwOperator,
    KwPrivate,
    KwProtected,
    KwPublic,
    KwReinterpretCast,
    KwStaticCast,
    KwTemplate,
    KwThis,
    KwThrow,
    KwTrue,
    KwTry,
    KwTypeid,
    KwTypename,
    KwUsing,
    KwVirtual,
    KwWchar,

    // GNU
    KwAttribute,
    KwTypeof,
    KwExtension,
    KwLabel,

    // Composite Nodes (Parser output)
    TranslationUnit,

    // declarations
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

    // specifiers
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
    AttributeSpecifier,

    // declarators
    Declarator,
    PointerOp,
    ReferenceOp,
    PointerToMemberOp,
    ParameterList,
    ParameterDeclaration,
    ArrayModifier,
    BitField,
    EqualsInitializer,
    ConstructorInitializer,
    InitializerList,
    DesignatedInitializer,
    Designator,
    CtorInitializerList,
    MemberInitializer,
    ExceptionSpecification,
    TrailingReturn,

    // names
    Name,
    QualifiedName,
    TemplateId,
    TemplateArgumentList,
    OperatorName,
    ConversionName,
    DestructorName,

    // templates
    TemplateParameterList,
    TypeTemplateParameter,
    TemplateTemplateParameter,
    TypeId,

    // statements
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

    // expressions
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
    LambdaCapture,
    StatementExpression,
    CompoundLiteral,
    SimpleTypeConstructorExpression,
    NamedCastExpression,
}

impl SyntaxKind {
    pub const LAST: SyntaxKind = SyntaxKind::NamedCastExpression;

    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::Newline | SyntaxKind::Comment)
    }

    pub fn is_keyword(self) -> bool {
        (SyntaxKind::KwAuto as u16..=SyntaxKind::KwLabel as u16).contains(&(self as u16))
    }

    pub fn is_node(self) -> bool {
        self as u16 >= SyntaxKind::TranslationUnit as u16
    }

    pub fn is_problem(self) -> bool {
        matches!(self, SyntaxKind::ProblemDeclaration | SyntaxKind::ProblemStatement)
    }

    /// Identifier-like tokens that may name an entity.
    pub fn is_name_token(self) -> bool {
        matches!(self, SyntaxKind::Ident | SyntaxKind::CompletionName)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(error = ())] // Use unit type for error
pub enum TokenKind {
    #[regex(r"([ \t\x0b\x0c\r]|\\\r?\n)+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedComment,

    // Preprocessor tokens
    #[token("##")]
    HashHash,
    #[token("#")]
    Hash,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,
    #[token("->*")]
    ArrowStar,
    #[token("->")]
    Arrow,
    #[token(".*")]
    DotStar,
    #[token(".")]
    Dot,
    #[token("::")]
    DoubleColon,
    #[token("?")]
    Question,

    // Operators (multi-char first)
    #[token(">>=")]
    RightShiftEqual,
    #[token("<<=")]
    LeftShiftEqual,
    #[token("<?")]
    Min,
    #[token(">?")]
    Max,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("!")]
    Exclaim,
    #[token("=")]
    Equal,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Literals
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
    #[regex(r#"(u8|u|U|L)?'([^'\\\n]|\\[\s\S])+'"#)]
    Char,
    #[regex(r#"(u8|u|U|L)?'([^'\\\n]|\\[\s\S])*"#)]
    UnterminatedChar,
    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\[\s\S])*""#)]
    String,
    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\[\s\S])*"#)]
    UnterminatedString,
    #[regex(r#"(u8|u|U|L)?R""#, lex_raw_string)]
    RawString,
    /// A preprocessing number; classified as integer or float by [`classify_number`].
    #[regex(r"\.?[0-9]([0-9a-zA-Z_.]|[eEpP][+-]|'[0-9a-zA-Z_])*")]
    Number,
}

/// Consumes the body of `R"delim( ... )delim"` after the opening quote.
fn lex_raw_string(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    let rest = lex.remainder();
    let Some(open) = rest.find('(') else {
        return false;
    };
    let delimiter = &rest[..open];
    if delimiter.len() > 16 || delimiter.contains(|c: char| c.is_whitespace() || c == ')' || c == '\\') {
        return false;
    }
    let terminator = format!("){delimiter}\"");
    match rest[open + 1..].find(&terminator) {
        Some(end) => {
            lex.bump(open + 1 + end + terminator.len());
            true
        },
        None => {
            lex.bump(rest.len());
            false
        },
    }
}

/// Integer or floating literal, by the usual C rules on a preprocessing number.
pub fn classify_number(text: &str) -> SyntaxKind {
    let lower = text.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    let is_float = if is_hex {
        lower.contains('.') || lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    };
    if is_float {
        SyntaxKind::Float
    } else {
        SyntaxKind::Integer
    }
}

impl TokenKind {
    /// Lexical error message for malformed tokens.
    pub fn error_message(self) -> Option<&'static str> {
        match self {
            TokenKind::UnterminatedComment => Some("unterminated comment"),
            TokenKind::UnterminatedChar => Some("unterminated character literal"),
            TokenKind::UnterminatedString => Some("unterminated string literal"),
            _ => None,
        }
    }

    pub fn to_syntax(
        self,
        text: &str,
    ) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::Whitespace,
            TokenKind::Newline => SyntaxKind::Newline,
            TokenKind::Comment => SyntaxKind::Comment,
            TokenKind::UnterminatedComment | TokenKind::UnterminatedChar | TokenKind::UnterminatedString => {
                SyntaxKind::Error
            },
            TokenKind::Hash => SyntaxKind::Hash,
            TokenKind::HashHash => SyntaxKind::HashHash,
            TokenKind::LParen => SyntaxKind::LParen,
            TokenKind::RParen => SyntaxKind::RParen,
            TokenKind::LBrace => SyntaxKind::LBrace,
            TokenKind::RBrace => SyntaxKind::RBrace,
            TokenKind::LBracket => SyntaxKind::LBracket,
            TokenKind::RBracket => SyntaxKind::RBracket,
            TokenKind::Semicolon => SyntaxKind::Semicolon,
            TokenKind::Colon => SyntaxKind::Colon,
            TokenKind::Comma => SyntaxKind::Comma,
            TokenKind::Ellipsis => SyntaxKind::Ellipsis,
            TokenKind::ArrowStar => SyntaxKind::ArrowStar,
            TokenKind::Arrow => SyntaxKind::Arrow,
            TokenKind::DotStar => SyntaxKind::DotStar,
            TokenKind::Dot => SyntaxKind::Dot,
            TokenKind::DoubleColon => SyntaxKind::DoubleColon,
            TokenKind::Question => SyntaxKind::Question,
            TokenKind::RightShiftEqual => SyntaxKind::RightShiftEqual,
            TokenKind::LeftShiftEqual => SyntaxKind::LeftShiftEqual,
            TokenKind::Min => SyntaxKind::Min,
            TokenKind::Max => SyntaxKind::Max,
            TokenKind::PlusPlus => SyntaxKind::PlusPlus,
            TokenKind::MinusMinus => SyntaxKind::MinusMinus,
            TokenKind::PlusEqual => SyntaxKind::PlusEqual,
            TokenKind::MinusEqual => SyntaxKind::MinusEqual,
            TokenKind::StarEqual => SyntaxKind::StarEqual,
            TokenKind::SlashEqual => SyntaxKind::SlashEqual,
            TokenKind::PercentEqual => SyntaxKind::PercentEqual,
            TokenKind::AmpEqual => SyntaxKind::AmpEqual,
            TokenKind::PipeEqual => SyntaxKind::PipeEqual,
            TokenKind::CaretEqual => SyntaxKind::CaretEqual,
            TokenKind::EqualEqual => SyntaxKind::EqualEqual,
            TokenKind::NotEqual => SyntaxKind::NotEqual,
            TokenKind::LessEqual => SyntaxKind::LessEqual,
            TokenKind::GreaterEqual => SyntaxKind::GreaterEqual,
            TokenKind::AndAnd => SyntaxKind::AndAnd,
            TokenKind::OrOr => SyntaxKind::OrOr,
            TokenKind::LeftShift => SyntaxKind::LeftShift,
            TokenKind::RightShift => SyntaxKind::RightShift,
            TokenKind::Plus => SyntaxKind::Plus,
            TokenKind::Minus => SyntaxKind::Minus,
            TokenKind::Star => SyntaxKind::Star,
            TokenKind::Slash => SyntaxKind::Slash,
            TokenKind::Percent => SyntaxKind::Percent,
            TokenKind::Caret => SyntaxKind::Caret,
            TokenKind::Amp => SyntaxKind::Amp,
            TokenKind::Pipe => SyntaxKind::Pipe,
            TokenKind::Tilde => SyntaxKind::Tilde,
            TokenKind::Exclaim => SyntaxKind::Exclaim,
            TokenKind::Equal => SyntaxKind::Equal,
            TokenKind::Less => SyntaxKind::Less,
            TokenKind::Greater => SyntaxKind::Greater,
            TokenKind::Ident => SyntaxKind::Ident,
            TokenKind::Char => SyntaxKind::Char,
            TokenKind::String | TokenKind::RawString => SyntaxKind::String,
            TokenKind::Number => classify_number(text),
        }
    }
}
