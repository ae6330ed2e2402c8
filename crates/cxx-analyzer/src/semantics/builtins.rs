//! Names the GNU dialects predeclare in the global scope.

use rowan::TextSize;

use crate::config::DialectConfig;
use crate::semantics::binding::{Binding, BindingId, BindingKind, BindingTable};
use crate::semantics::scope::{EntryTarget, ScopeEntry, ScopeId, ScopeTree};
use crate::semantics::types::{BuiltinType, FunctionType, Qualifiers, Type};

#[derive(Debug, Clone, Copy)]
enum Shape {
    Void,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Double,
    VoidPointer,
    ConstVoidPointer,
    ConstCharPointer,
    VaList,
}

impl Shape {
    fn to_type(self) -> Type {
        match self {
            Shape::Void => Type::VOID,
            Shape::Int => Type::INT,
            Shape::UnsignedInt => Type::Builtin(BuiltinType::UnsignedInt),
            Shape::Long => Type::Builtin(BuiltinType::Long),
            Shape::UnsignedLong => Type::Builtin(BuiltinType::UnsignedLong),
            Shape::Double => Type::Builtin(BuiltinType::Double),
            Shape::VoidPointer => Type::VOID.pointer_to(),
            Shape::ConstVoidPointer => Type::VOID.qualified(Qualifiers::CONST).pointer_to(),
            Shape::ConstCharPointer => Type::Builtin(BuiltinType::Char).qualified(Qualifiers::CONST).pointer_to(),
            Shape::VaList => va_list(),
        }
    }
}

struct BuiltinFunction {
    name: &'static str,
    ret: Shape,
    params: &'static [Shape],
    variadic: bool,
}

const fn function(
    name: &'static str,
    ret: Shape,
    params: &'static [Shape],
    variadic: bool,
) -> BuiltinFunction {
    BuiltinFunction { name, ret, params, variadic }
}

const FUNCTIONS: &[BuiltinFunction] = &[
    function("__builtin_va_start", Shape::Void, &[Shape::VaList], true),
    function("__builtin_va_end", Shape::Void, &[Shape::VaList], false),
    function("__builtin_va_copy", Shape::Void, &[Shape::VaList, Shape::VaList], false),
    function("__builtin_expect", Shape::Long, &[Shape::Long, Shape::Long], false),
    function("__builtin_constant_p", Shape::Int, &[], true),
    function("__builtin_abort", Shape::Void, &[], false),
    function("__builtin_trap", Shape::Void, &[], false),
    function("__builtin_unreachable", Shape::Void, &[], false),
    function(
        "__builtin_memcpy",
        Shape::VoidPointer,
        &[Shape::VoidPointer, Shape::ConstVoidPointer, Shape::UnsignedLong],
        false,
    ),
    function(
        "__builtin_memset",
        Shape::VoidPointer,
        &[Shape::VoidPointer, Shape::Int, Shape::UnsignedLong],
        false,
    ),
    function("__builtin_strlen", Shape::UnsignedLong, &[Shape::ConstCharPointer], false),
    function("__builtin_clz", Shape::Int, &[Shape::UnsignedInt], false),
    function("__builtin_ctz", Shape::Int, &[Shape::UnsignedInt], false),
    function("__builtin_popcount", Shape::Int, &[Shape::UnsignedInt], false),
    function("__builtin_huge_val", Shape::Double, &[], false),
    function("__builtin_nan", Shape::Double, &[Shape::ConstCharPointer], false),
    function("__builtin_offsetof", Shape::UnsignedLong, &[], true),
    function("__builtin_types_compatible_p", Shape::Int, &[], true),
    function("__builtin_va_arg", Shape::Void, &[], true),
];

/// `__builtin_va_list` is modelled as `char *`.
fn va_list() -> Type {
    Type::Builtin(BuiltinType::Char).pointer_to()
}

/// Declares the builtins and returns their types.
pub(crate) fn declare(
    scopes: &mut ScopeTree,
    bindings: &mut BindingTable,
    dialect: &DialectConfig,
) -> Vec<(BindingId, Type)> {
    let mut declared = Vec::with_capacity(FUNCTIONS.len() + 1);
    let mut add = |name: &str, kind: BindingKind, ty: Type| {
        let mut binding = Binding::new(name, kind, Some(ScopeId::GLOBAL));
        binding.builtin = true;
        let id = bindings.push(binding);
        scopes.get_mut(ScopeId::GLOBAL).add_entry(ScopeEntry {
            name: name.to_string(),
            target: EntryTarget::Binding(id),
            position: TextSize::from(0),
            tag: false,
        });
        declared.push((id, ty));
    };
    add("__builtin_va_list", BindingKind::Typedef, va_list());
    for builtin in FUNCTIONS {
        let params: Vec<Type> = builtin.params.iter().map(|shape| shape.to_type()).collect();
        let ty = Type::Function(FunctionType {
            ret: Box::new(builtin.ret.to_type()),
            required: params.len(),
            params,
            variadic: builtin.variadic,
        });
        add(builtin.name, BindingKind::Function, ty);
    }
    tracing::trace!(count = declared.len(), cpp = dialect.is_cpp(), "declared builtins");
    declared
}
