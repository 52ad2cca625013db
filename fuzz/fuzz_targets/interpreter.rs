#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Builtins, pre-bound names and free-form atoms
#[derive(Arbitrary, Debug)]
enum WispAtom {
    Add,
    Sub,
    Mul,
    Less,
    Eq,
    True,
    False,

    Identifier(String),
    Integer(i64),
}

impl fmt::Display for WispAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            WispAtom::Add => "+",
            WispAtom::Sub => "-",
            WispAtom::Mul => "*",
            WispAtom::Less => "<",
            WispAtom::Eq => "=",
            WispAtom::True => "true",
            WispAtom::False => "false",
            WispAtom::Identifier(identifier) => identifier,
            WispAtom::Integer(value) => return write!(f, "{}", value),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum WispForm {
    Quote(Vec<WispForm>),
    If(Vec<WispForm>),
    Define(Vec<WispForm>),
    Set(Vec<WispForm>),
    Lambda(Vec<WispForm>),
    Call(Vec<WispForm>),

    Atom(WispAtom),
}

fn stringify_operands(forms: &[WispForm]) -> String {
    forms.iter().map(WispForm::to_string).join(" ")
}

impl fmt::Display for WispForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(atom) => atom.fmt(f),
            Self::Quote(operands) => write!(f, "(quote {})", stringify_operands(operands)),
            Self::If(operands) => write!(f, "(if {})", stringify_operands(operands)),
            Self::Define(operands) => write!(f, "(define {})", stringify_operands(operands)),
            Self::Set(operands) => write!(f, "(set! {})", stringify_operands(operands)),
            Self::Lambda(operands) => write!(f, "(lambda {})", stringify_operands(operands)),
            Self::Call(operands) => write!(f, "({})", stringify_operands(operands)),
        }
    }
}

fuzz_target!(|forms: Vec<WispForm>| {
    let mut context = wisp::EvaluationContext::new();

    for form in forms {
        let _ = context.evaluate_str(&form.to_string());
    }
});
