//! Types of declarations and expressions.

use std::fmt;

use crate::semantics::binding::BindingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    WChar,
    Char16,
    Char32,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    NullPtr,
}

impl BuiltinType {
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinType::Void => "void",
            BuiltinType::Bool => "bool",
            BuiltinType::Char => "char",
            BuiltinType::SignedChar => "signed char",
            BuiltinType::UnsignedChar => "unsigned char",
            BuiltinType::WChar => "wchar_t",
            BuiltinType::Char16 => "char16_t",
            BuiltinType::Char32 => "char32_t",
            BuiltinType::Short => "short",
            BuiltinType::UnsignedShort => "unsigned short",
            BuiltinType::Int => "int",
            BuiltinType::UnsignedInt => "unsigned int",
            BuiltinType::Long => "long",
            BuiltinType::UnsignedLong => "unsigned long",
            BuiltinType::LongLong => "long long",
            BuiltinType::UnsignedLongLong => "unsigned long long",
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::LongDouble => "long double",
            BuiltinType::NullPtr => "std::nullptr_t",
        }
    }

    pub fn is_integral(self) -> bool {
        !matches!(
            self,
            BuiltinType::Void | BuiltinType::Float | BuiltinType::Double | BuiltinType::LongDouble | BuiltinType::NullPtr
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, BuiltinType::Float | BuiltinType::Double | BuiltinType::LongDouble)
    }

    pub fn is_arithmetic(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BuiltinType::Bool
                | BuiltinType::UnsignedChar
                | BuiltinType::Char16
                | BuiltinType::Char32
                | BuiltinType::UnsignedShort
                | BuiltinType::UnsignedInt
                | BuiltinType::UnsignedLong
                | BuiltinType::UnsignedLongLong
        )
    }

    /// Conversion rank; floating types rank above every integer type.
    pub fn rank(self) -> u8 {
        match self {
            BuiltinType::Void | BuiltinType::NullPtr => 0,
            BuiltinType::Bool => 1,
            BuiltinType::Char | BuiltinType::SignedChar | BuiltinType::UnsignedChar => 2,
            BuiltinType::Short | BuiltinType::UnsignedShort | BuiltinType::WChar | BuiltinType::Char16 => 3,
            BuiltinType::Int | BuiltinType::UnsignedInt | BuiltinType::Char32 => 4,
            BuiltinType::Long | BuiltinType::UnsignedLong => 5,
            BuiltinType::LongLong | BuiltinType::UnsignedLongLong => 6,
            BuiltinType::Float => 7,
            BuiltinType::Double => 8,
            BuiltinType::LongDouble => 9,
        }
    }

    /// The type an operand of this type is promoted to.
    pub fn promoted(self) -> BuiltinType {
        match self {
            kind if kind.is_integral() && kind.rank() < BuiltinType::Int.rank() => BuiltinType::Int,
            BuiltinType::Float => BuiltinType::Double,
            kind => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl Qualifiers {
    pub const CONST: Qualifiers = Qualifiers { is_const: true, is_volatile: false };

    pub fn is_empty(self) -> bool {
        !self.is_const && !self.is_volatile
    }

    pub fn union(
        self,
        other: Qualifiers,
    ) -> Qualifiers {
        Qualifiers {
            is_const: self.is_const || other.is_const,
            is_volatile: self.is_volatile || other.is_volatile,
        }
    }

    /// Every qualifier of `other` is also present here.
    pub fn contains(
        self,
        other: Qualifiers,
    ) -> bool {
        (self.is_const || !other.is_const) && (self.is_volatile || !other.is_volatile)
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match (self.is_const, self.is_volatile) {
            (true, true) => f.write_str("const volatile"),
            (true, false) => f.write_str("const"),
            (false, true) => f.write_str("volatile"),
            (false, false) => Ok(()),
        }
    }
}

/// A class, enumeration or template parameter, by binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named {
    pub binding: BindingId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub ret: Box<Type>,
    pub params: Vec<Type>,
    pub variadic: bool,
    /// Parameters without default arguments.
    pub required: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Builtin(BuiltinType),
    Class(Named),
    Enum(Named),
    TemplateParameter(Named),
    Qualified(Qualifiers, Box<Type>),
    Pointer(Box<Type>),
    Reference { rvalue: bool, target: Box<Type> },
    PointerToMember { class: Box<Type>, member: Box<Type> },
    Array { element: Box<Type>, size: Option<u64> },
    Function(FunctionType),
    /// Depends on template parameters in a way that is not modelled.
    Dependent,
    Unknown,
}

impl Type {
    pub const INT: Type = Type::Builtin(BuiltinType::Int);
    pub const VOID: Type = Type::Builtin(BuiltinType::Void);

    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    pub fn qualified(
        self,
        qualifiers: Qualifiers,
    ) -> Type {
        if qualifiers.is_empty() {
            return self;
        }
        match self {
            Type::Qualified(existing, inner) => Type::Qualified(existing.union(qualifiers), inner),
            other => Type::Qualified(qualifiers, Box::new(other)),
        }
    }

    pub fn qualifiers(&self) -> Qualifiers {
        match self {
            Type::Qualified(qualifiers, _) => *qualifiers,
            _ => Qualifiers::default(),
        }
    }

    /// Without top-level cv-qualifiers.
    pub fn unqualified(&self) -> &Type {
        match self {
            Type::Qualified(_, inner) => inner.unqualified(),
            other => other,
        }
    }

    pub fn non_reference(&self) -> &Type {
        match self {
            Type::Reference { target, .. } => target,
            other => other,
        }
    }

    /// The object type an expression of this type designates.
    pub fn value(&self) -> &Type {
        self.non_reference().unqualified()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.value(), Type::Pointer(_))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Type::Unknown)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.value(), Type::Builtin(BuiltinType::Void))
    }

    /// Pointed-to type of a pointer, or element type of an array.
    pub fn pointee(&self) -> Option<&Type> {
        match self.value() {
            Type::Pointer(target) => Some(target),
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Array-to-pointer and function-to-pointer conversion of an rvalue.
    pub fn decay(&self) -> Type {
        match self.value() {
            Type::Array { element, .. } => Type::Pointer(element.clone()),
            function @ Type::Function(_) => function.clone().pointer_to(),
            other => other.clone(),
        }
    }

    pub fn class_binding(&self) -> Option<BindingId> {
        match self.value() {
            Type::Class(named) => Some(named.binding),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.value() {
            Type::Function(function) => Some(function),
            Type::Pointer(target) => match target.value() {
                Type::Function(function) => Some(function),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_dependent(&self) -> bool {
        match self {
            Type::TemplateParameter(_) | Type::Dependent => true,
            Type::Builtin(_) | Type::Class(_) | Type::Enum(_) | Type::Unknown => false,
            Type::Qualified(_, inner) | Type::Pointer(inner) => inner.is_dependent(),
            Type::Reference { target, .. } => target.is_dependent(),
            Type::PointerToMember { class, member } => class.is_dependent() || member.is_dependent(),
            Type::Array { element, .. } => element.is_dependent(),
            Type::Function(function) => function.ret.is_dependent() || function.params.iter().any(Type::is_dependent),
        }
    }

    /// Rebuilds the type bottom-up, replacing every node for which
    /// `replace` returns a type.
    pub fn map(
        &self,
        replace: &mut impl FnMut(&Type) -> Option<Type>,
    ) -> Type {
        if let Some(replacement) = replace(self) {
            return replacement;
        }
        match self {
            Type::Qualified(qualifiers, inner) => inner.map(replace).qualified(*qualifiers),
            Type::Pointer(inner) => inner.map(replace).pointer_to(),
            Type::Reference { rvalue, target } => Type::Reference {
                rvalue: *rvalue,
                target: Box::new(target.map(replace)),
            },
            Type::PointerToMember { class, member } => Type::PointerToMember {
                class: Box::new(class.map(replace)),
                member: Box::new(member.map(replace)),
            },
            Type::Array { element, size } => Type::Array {
                element: Box::new(element.map(replace)),
                size: *size,
            },
            Type::Function(function) => Type::Function(FunctionType {
                ret: Box::new(function.ret.map(replace)),
                params: function.params.iter().map(|param| param.map(replace)).collect(),
                variadic: function.variadic,
                required: function.required,
            }),
            other => other.clone(),
        }
    }

    /// C declarator syntax, with `inner` standing where the name would be.
    fn render(
        &self,
        inner: &str,
    ) -> String {
        match self {
            Type::Builtin(builtin) => with_inner(builtin.as_str(), inner),
            Type::Class(named) | Type::Enum(named) | Type::TemplateParameter(named) => with_inner(&named.name, inner),
            Type::Dependent => with_inner("<dependent>", inner),
            Type::Unknown => with_inner("<unknown>", inner),
            Type::Qualified(qualifiers, target) => match target.as_ref() {
                Type::Pointer(_) | Type::PointerToMember { .. } => target.render_indirection(*qualifiers, inner),
                other => format!("{qualifiers} {}", other.render(inner)),
            },
            Type::Pointer(_) | Type::Reference { .. } | Type::PointerToMember { .. } => {
                self.render_indirection(Qualifiers::default(), inner)
            },
            Type::Array { element, size } => {
                let bound = size.map(|size| size.to_string()).unwrap_or_default();
                element.render(&format!("{inner}[{bound}]"))
            },
            Type::Function(function) => {
                let mut params: Vec<String> = function.params.iter().map(ToString::to_string).collect();
                if function.variadic {
                    params.push("...".to_string());
                }
                function.ret.render(&format!("{inner}({})", params.join(", ")))
            },
        }
    }

    fn render_indirection(
        &self,
        qualifiers: Qualifiers,
        inner: &str,
    ) -> String {
        let (operator, target) = match self {
            Type::Pointer(target) => ("*".to_string(), target),
            Type::Reference { rvalue, target } => (if *rvalue { "&&" } else { "&" }.to_string(), target),
            Type::PointerToMember { class, member } => (format!("{class}::*"), member),
            other => return other.render(inner),
        };
        let mut declarator = operator;
        if !qualifiers.is_empty() {
            declarator.push(' ');
            declarator.push_str(&qualifiers.to_string());
            if !inner.is_empty() {
                declarator.push(' ');
            }
        }
        declarator.push_str(inner);
        if matches!(target.unqualified(), Type::Array { .. } | Type::Function(_)) {
            declarator = format!("({declarator})");
        }
        target.render(&declarator)
    }
}

fn with_inner(
    base: &str,
    inner: &str,
) -> String {
    if inner.is_empty() { base.to_string() } else { format!("{base} {inner}") }
}

impl fmt::Display for Type {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

#[cfg(test)]
#[path = "../../tests/src/semantics/types_tests.rs"]
mod tests;
