use super::*;

fn class(name: &str) -> Type {
    Type::Class(Named {
        binding: BindingId::from_index(0),
        name: name.to_string(),
    })
}

fn function(
    ret: Type,
    params: Vec<Type>,
) -> Type {
    let required = params.len();
    Type::Function(FunctionType {
        ret: Box::new(ret),
        params,
        variadic: false,
        required,
    })
}

#[test]
fn declarator_syntax_is_rendered_inside_out() {
    assert_eq!(Type::INT.pointer_to().to_string(), "int *");
    assert_eq!(
        Type::PointerToMember {
            class: Box::new(class("A")),
            member: Box::new(Type::INT),
        }
        .to_string(),
        "int A::*"
    );
    assert_eq!(function(Type::INT, vec![Type::INT]).pointer_to().to_string(), "int (*)(int)");
    assert_eq!(
        Type::Array {
            element: Box::new(Type::INT.pointer_to()),
            size: Some(3),
        }
        .to_string(),
        "int *[3]"
    );
    assert_eq!(
        Type::Array {
            element: Box::new(Type::INT),
            size: None,
        }
        .pointer_to()
        .to_string(),
        "int (*)[]"
    );
}

#[test]
fn qualifiers_attach_to_the_right_level() {
    let const_char = Type::Builtin(BuiltinType::Char).qualified(Qualifiers::CONST);
    assert_eq!(const_char.clone().pointer_to().to_string(), "const char *");
    assert_eq!(Type::INT.pointer_to().qualified(Qualifiers::CONST).to_string(), "int * const");
    let reference = Type::Reference {
        rvalue: false,
        target: Box::new(class("S").qualified(Qualifiers::CONST)),
    };
    assert_eq!(reference.to_string(), "const S &");
    assert_eq!(reference.value(), &class("S"));
}

#[test]
fn decay_and_pointee() {
    let array = Type::Array {
        element: Box::new(Type::INT),
        size: Some(4),
    };
    assert_eq!(array.decay(), Type::INT.pointer_to());
    assert_eq!(array.pointee(), Some(&Type::INT));
    let f = function(Type::VOID, Vec::new());
    assert!(f.decay().as_function().is_some());
    assert_eq!(f.decay().to_string(), "void (*)()");
}

#[test]
fn promotions_follow_rank() {
    assert_eq!(BuiltinType::Char.promoted(), BuiltinType::Int);
    assert_eq!(BuiltinType::Bool.promoted(), BuiltinType::Int);
    assert_eq!(BuiltinType::Float.promoted(), BuiltinType::Double);
    assert_eq!(BuiltinType::Long.promoted(), BuiltinType::Long);
    assert!(BuiltinType::Double.rank() > BuiltinType::UnsignedLongLong.rank());
}

#[test]
fn map_replaces_template_parameters() {
    let parameter = Type::TemplateParameter(Named {
        binding: BindingId::from_index(7),
        name: "T".to_string(),
    });
    let ty = function(parameter.clone().pointer_to(), vec![parameter]);
    assert!(ty.is_dependent());
    let substituted = ty.map(&mut |node| match node {
        Type::TemplateParameter(_) => Some(Type::Builtin(BuiltinType::Double)),
        _ => None,
    });
    assert!(!substituted.is_dependent());
    assert_eq!(substituted.to_string(), "double *(double)");
}
