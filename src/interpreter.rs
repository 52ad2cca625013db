use std::rc::Rc;

use crate::environment::Frame;
use crate::error::WispError;
use crate::value::{Closure, Value};

pub(crate) type EvaluationResult = Result<Value, WispError>;

// The five reserved form names, as a closed enum. Recognition happens
// once, and the dispatch match below is exhaustive; a misspelled form
// name is an ordinary application and fails as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Quote,
    If,
    Define,
    SetBang,
    Lambda,
}

impl SpecialForm {
    fn recognize(name: &str) -> Option<Self> {
        match name {
            "quote" => Some(Self::Quote),
            "if" => Some(Self::If),
            "define" => Some(Self::Define),
            "set!" => Some(Self::SetBang),
            "lambda" => Some(Self::Lambda),
            _ => None,
        }
    }
}

pub(crate) fn evaluate(expression: &Value, environment: &Rc<Frame>) -> EvaluationResult {
    match expression {
        Value::Symbol(name) => environment.lookup(name),
        // Self-evaluating; procedure values only reach here as
        // already-computed data, never from the reader
        Value::Integer(_) | Value::Boolean(_) | Value::Primitive(_) | Value::Closure(_) => {
            Ok(expression.clone())
        }
        Value::List(elements) => evaluate_combination(elements, environment),
    }
}

fn evaluate_combination(elements: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    if elements.is_empty() {
        return Err(WispError::Eval("empty application".to_string()));
    }

    if let Value::Symbol(name) = &elements[0] {
        if let Some(form) = SpecialForm::recognize(name) {
            let operands = &elements[1..];
            return match form {
                SpecialForm::Quote => evaluate_quote(operands),
                SpecialForm::If => evaluate_if(operands, environment),
                SpecialForm::Define => evaluate_define(operands, environment),
                SpecialForm::SetBang => evaluate_set_bang(operands, environment),
                SpecialForm::Lambda => evaluate_lambda(operands, environment),
            };
        }
    }

    evaluate_application(elements, environment)
}

fn evaluate_quote(operands: &[Value]) -> EvaluationResult {
    // (quote exp) returns its operand as data, unevaluated

    if operands.len() != 1 {
        return Err(WispError::Eval("quote takes exactly one operand".to_string()));
    }

    Ok(operands[0].clone())
}

fn evaluate_if(operands: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    // (if test conseq alt). Only the boolean false value selects the
    // alternate; every other test result, boolean or not, selects the
    // consequent. The untaken branch is never evaluated.

    if operands.len() != 3 {
        return Err(WispError::Eval(
            "if takes a test, a consequent and an alternate".to_string(),
        ));
    }

    match evaluate(&operands[0], environment)? {
        Value::Boolean(false) => evaluate(&operands[2], environment),
        _ => evaluate(&operands[1], environment),
    }
}

fn evaluate_define(operands: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    // (define var exp) evaluates exp and binds var in the current
    // frame, shadowing any outer binding of the same name

    if operands.len() != 2 {
        return Err(WispError::Eval(
            "define takes a name and an expression".to_string(),
        ));
    }

    let name = match &operands[0] {
        Value::Symbol(name) => name,
        _ => return Err(WispError::Eval("define needs a symbol".to_string())),
    };

    let value = evaluate(&operands[1], environment)?;
    Ok(environment.define(name, value))
}

fn evaluate_set_bang(operands: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    // (set! var exp) overwrites the binding wherever in the chain it
    // lives, so every closure sharing that frame observes the change;
    // a name never defined is an error

    if operands.len() != 2 {
        return Err(WispError::Eval(
            "set! takes a name and an expression".to_string(),
        ));
    }

    let name = match &operands[0] {
        Value::Symbol(name) => name,
        _ => return Err(WispError::Eval("set! needs a symbol".to_string())),
    };

    let value = evaluate(&operands[1], environment)?;
    environment.assign(name, value)
}

fn evaluate_lambda(operands: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    // (lambda (var...) body) captures the current frame by shared
    // reference, not by copy

    if operands.len() != 2 {
        return Err(WispError::Eval(
            "lambda takes a parameter list and a body".to_string(),
        ));
    }

    let parameters = match &operands[0] {
        Value::List(parameters) => symbol_names(parameters)?,
        _ => return Err(WispError::Eval("lambda parameters must be a list".to_string())),
    };

    Ok(Value::Closure(Rc::new(Closure {
        parameters,
        body: operands[1].clone(),
        environment: Rc::clone(environment),
    })))
}

fn symbol_names(list: &[Value]) -> Result<Vec<String>, WispError> {
    list.iter()
        .map(|element| match element {
            Value::Symbol(name) => Ok(name.clone()),
            _ => Err(WispError::Eval(
                "parameter list must contain only symbols".to_string(),
            )),
        })
        .collect()
}

fn evaluate_application(elements: &[Value], environment: &Rc<Frame>) -> EvaluationResult {
    // The head evaluates to the callable, then every operand evaluates
    // eagerly, left to right, before the call is made

    let callable = evaluate(&elements[0], environment)?;
    let arguments = evaluate_arguments(&elements[1..], environment)?;

    match callable {
        Value::Primitive(primitive) => (primitive.func)(&arguments),
        Value::Closure(closure) => closure.invoke(arguments),
        other => Err(WispError::Type(format!("not callable: {}", other))),
    }
}

fn evaluate_arguments(
    elements: &[Value],
    environment: &Rc<Frame>,
) -> Result<Vec<Value>, WispError> {
    elements
        .iter()
        .map(|element| evaluate(element, environment))
        .collect()
}

impl Closure {
    /// Bind the formal parameters positionally to `arguments` in a
    /// fresh frame chained to the captured environment, then evaluate
    /// the body there.
    pub(crate) fn invoke(&self, arguments: Vec<Value>) -> EvaluationResult {
        if arguments.len() != self.parameters.len() {
            return Err(WispError::Arity {
                expected: self.parameters.len(),
                got: arguments.len(),
            });
        }

        let frame = Frame::nested(Rc::clone(&self.environment));
        for (parameter, argument) in self.parameters.iter().zip(arguments) {
            frame.define(parameter, argument);
        }

        evaluate(&self.body, &frame)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use crate::builtin::builtin_frame;
    use crate::context::EvaluationContext;
    use crate::parser::parse;
    use crate::test_utils::{all_testcases, compare, error_name, load_test_pair, TestExpectation};

    use super::*;

    fn assert_session(testcase: usize, entries: &[(String, TestExpectation)]) -> anyhow::Result<()> {
        let mut context = EvaluationContext::new();

        for (lineno, (source, expected)) in entries.iter().enumerate() {
            let result = context.evaluate_str(source);

            match (&result, &expected.0) {
                (Ok(value), Ok(output)) => assert!(
                    compare(value, output),
                    "testcase({}, {}): got {:?}, expected {:?}",
                    testcase,
                    lineno,
                    result,
                    expected.0
                ),
                (Err(error), Err(name)) => assert_eq!(
                    error_name(error),
                    name,
                    "testcase({}, {}): got {:?}, expected {}",
                    testcase,
                    lineno,
                    result,
                    name
                ),
                _ => bail!(
                    "testcase({}, {}): got {:?}, expected {:?}",
                    testcase,
                    lineno,
                    result,
                    expected.0
                ),
            }
        }

        Ok(())
    }

    #[test]
    fn evaluate_testcases() -> anyhow::Result<()> {
        for testcase in all_testcases() {
            let entries = load_test_pair(testcase)?;
            assert_session(testcase, &entries)?;
        }

        Ok(())
    }

    fn eval_in(environment: &Rc<Frame>, source: &str) -> EvaluationResult {
        evaluate(&parse(source).unwrap(), environment)
    }

    #[test]
    fn literals_self_evaluate() {
        let global = builtin_frame();
        assert_eq!(eval_in(&global, "7").unwrap(), Value::Integer(7));
        assert_eq!(eval_in(&global, "true").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn if_treats_only_bound_false_as_falsy() {
        let global = builtin_frame();
        assert_eq!(eval_in(&global, "(if true 1 2)").unwrap(), Value::Integer(1));
        assert_eq!(eval_in(&global, "(if false 1 2)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&global, "(if 0 1 2)").unwrap(), Value::Integer(1));
        assert_eq!(
            eval_in(&global, "(if (quote ()) 1 2)").unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            eval_in(&global, "(if (quote x) 1 2)").unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn untaken_branch_is_never_evaluated() {
        let global = builtin_frame();
        // nosuch is unbound; the test only passes if the alternate
        // stays untouched
        assert_eq!(
            eval_in(&global, "(if true 1 nosuch)").unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            eval_in(&global, "(if false nosuch 2)").unwrap(),
            Value::Integer(2)
        );
    }

    #[test]
    fn rebinding_false_flips_the_branch() {
        let global = builtin_frame();
        assert_eq!(eval_in(&global, "(if false 1 2)").unwrap(), Value::Integer(2));
        eval_in(&global, "(define false 7)").unwrap();
        assert_eq!(eval_in(&global, "(if false 1 2)").unwrap(), Value::Integer(1));
    }

    #[test]
    fn quote_returns_operand_unevaluated() {
        let global = builtin_frame();
        assert_eq!(
            eval_in(&global, "(quote nosuch)").unwrap(),
            Value::Symbol("nosuch".to_string())
        );
        assert_eq!(
            eval_in(&global, "(quote (+ 1 2))").unwrap(),
            Value::List(vec![
                Value::Symbol("+".to_string()),
                Value::Integer(1),
                Value::Integer(2),
            ])
        );
    }

    #[test]
    fn define_returns_the_bound_value() {
        let global = builtin_frame();
        assert_eq!(eval_in(&global, "(define a 10)").unwrap(), Value::Integer(10));
        assert_eq!(eval_in(&global, "a").unwrap(), Value::Integer(10));
    }

    #[test]
    fn closure_observes_mutation_of_shared_frame() {
        let global = builtin_frame();
        eval_in(&global, "(define n 1)").unwrap();
        eval_in(&global, "(define get (lambda () n))").unwrap();
        assert_eq!(eval_in(&global, "(get)").unwrap(), Value::Integer(1));

        eval_in(&global, "(set! n 5)").unwrap();
        assert_eq!(eval_in(&global, "(get)").unwrap(), Value::Integer(5));
    }

    #[test]
    fn closure_mutates_enclosing_frame() {
        let global = builtin_frame();
        eval_in(&global, "(define counter 0)").unwrap();
        eval_in(&global, "(define bump (lambda () (set! counter (+ counter 1))))").unwrap();

        assert_eq!(eval_in(&global, "(bump)").unwrap(), Value::Integer(1));
        assert_eq!(eval_in(&global, "(bump)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&global, "counter").unwrap(), Value::Integer(2));
    }

    #[test]
    fn capture_is_per_creation_frame() {
        let global = builtin_frame();
        eval_in(&global, "(define make-adder (lambda (n) (lambda (x) (+ x n))))").unwrap();
        eval_in(&global, "(define add3 (make-adder 3))").unwrap();
        assert_eq!(eval_in(&global, "(add3 4)").unwrap(), Value::Integer(7));

        // A later global n does not reach into the captured call frame
        eval_in(&global, "(define n 100)").unwrap();
        assert_eq!(eval_in(&global, "(add3 4)").unwrap(), Value::Integer(7));
    }

    #[test]
    fn partial_side_effects_persist_after_failure() {
        let global = builtin_frame();
        let result = eval_in(&global, "(+ (define a 1) nosuch)");
        assert!(matches!(result, Err(WispError::UnboundVariable(_))));

        // The define ran before the failing operand; it is not rolled back
        assert_eq!(eval_in(&global, "a").unwrap(), Value::Integer(1));
    }

    #[test]
    fn malformed_forms_are_eval_errors() {
        let global = builtin_frame();
        assert!(matches!(eval_in(&global, "()"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(quote)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(quote 1 2)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(if true 1)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(define 3 4)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(set! 3 4)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(lambda x x)"), Err(WispError::Eval(_))));
        assert!(matches!(eval_in(&global, "(lambda (x 1) x)"), Err(WispError::Eval(_))));
    }

    #[test]
    fn application_errors() {
        let global = builtin_frame();
        eval_in(&global, "(define x2 (lambda (a) (+ a a)))").unwrap();

        assert_eq!(eval_in(&global, "(x2 100)").unwrap(), Value::Integer(200));
        assert_eq!(
            eval_in(&global, "(x2 1 2)"),
            Err(WispError::Arity { expected: 1, got: 2 })
        );
        assert_eq!(
            eval_in(&global, "(x2)"),
            Err(WispError::Arity { expected: 1, got: 0 })
        );
        assert!(matches!(eval_in(&global, "(1 2)"), Err(WispError::Type(_))));
        assert!(matches!(eval_in(&global, "(true)"), Err(WispError::Type(_))));
    }

    #[test]
    fn set_bang_on_unbound_name_fails() {
        let global = builtin_frame();
        assert_eq!(
            eval_in(&global, "(set! z 1)"),
            Err(WispError::UnboundVariable("z".to_string()))
        );
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let global = builtin_frame();
        eval_in(&global, "(define a 1)").unwrap();
        // The left operand redefines a before the right operand reads it
        assert_eq!(
            eval_in(&global, "(+ (define a 10) a)").unwrap(),
            Value::Integer(20)
        );
    }
}
