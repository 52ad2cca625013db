use std::rc::Rc;

use crate::builtin::builtin_frame;
use crate::environment::Frame;
use crate::error::WispError;
use crate::interpreter::evaluate;
use crate::parser::{read, tokenize};
use crate::value::Value;

/// A self-contained interpreter session: one global frame, created up
/// front and mutated only by evaluating `define` and `set!`.
///
/// The environment is threaded explicitly rather than held in process
/// state, so independent contexts can run side by side.
pub struct EvaluationContext {
    global: Rc<Frame>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self {
            global: builtin_frame(),
        }
    }

    /// Evaluate every top-level form in `input` against the session's
    /// global frame, returning the result of the last one.
    pub fn evaluate_str(&mut self, input: &str) -> Result<Value, WispError> {
        let tokens = tokenize(input)?;

        let (expression, mut rest) = read(&tokens)?;
        let mut result = evaluate(&expression, &self.global)?;

        while !rest.is_empty() {
            let (expression, leftover) = read(rest)?;
            result = evaluate(&expression, &self.global)?;
            rest = leftover;
        }

        Ok(result)
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}
