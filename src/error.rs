use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WispError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("arity mismatch: expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("evaluation error: {0}")]
    Eval(String),
}
