use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::bail;
use itertools::Itertools;
use serde::de::{Error, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::WispError;
use crate::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestOutput {
    Boolean(bool),
    Integer(i64),
    Text(String),
    List(Vec<TestOutput>),
}

/// One fixture line's expected result: a value, or the name of an
/// error class.
#[derive(Debug, Clone)]
pub struct TestExpectation(pub Result<TestOutput, String>);

pub fn error_name(error: &WispError) -> &'static str {
    match error {
        WispError::Syntax(_) => "SyntaxError",
        WispError::UnboundVariable(_) => "UnboundVariableError",
        WispError::Type(_) => "TypeError",
        WispError::Arity { .. } => "ArityError",
        WispError::Eval(_) => "EvalError",
    }
}

/// Compare a produced value against a fixture expectation. Text
/// matches a symbol by name; the "<procedure>" text matches any
/// primitive or closure, whose printed form is implementation-defined.
pub fn compare(value: &Value, expected: &TestOutput) -> bool {
    match (value, expected) {
        (Value::Boolean(a), TestOutput::Boolean(b)) => a == b,
        (Value::Integer(a), TestOutput::Integer(b)) => a == b,
        (Value::Symbol(a), TestOutput::Text(b)) => a == b,
        (Value::Primitive(_) | Value::Closure(_), TestOutput::Text(b)) => b == "<procedure>",
        (Value::List(a), TestOutput::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| compare(a, b))
        }
        _ => false,
    }
}

struct TestExpectationVisitor;

impl<'de> Deserialize<'de> for TestExpectation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(TestExpectationVisitor)
    }
}

impl<'de> Visitor<'de> for TestExpectationVisitor {
    type Value = TestExpectation;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "a map with the boolean key 'ok', then 'output' on success or 'type' on failure"
        )
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        if map.next_key::<String>()? != Some("ok".to_owned()) {
            return Err(A::Error::custom("first key should be 'ok'"));
        }
        let ok: bool = map.next_value()?;

        let result = if ok {
            if map.next_key::<String>()?.as_deref() != Some("output") {
                return Err(A::Error::custom("second key should be 'output'"));
            }
            TestExpectation(Ok(map.next_value()?))
        } else {
            if map.next_key::<String>()?.as_deref() != Some("type") {
                return Err(A::Error::custom("second key should be 'type'"));
            }
            let name: String = map.next_value()?;
            match name.as_str() {
                "SyntaxError" | "UnboundVariableError" | "TypeError" | "ArityError"
                | "EvalError" => {}
                other => {
                    return Err(A::Error::custom(format!("unrecognized error name: {}", other)))
                }
            }
            TestExpectation(Err(name))
        };

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("only two keys should be present"));
        }

        Ok(result)
    }
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines().collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TestExpectation>> {
    let source = std::fs::read(path)?;
    Ok(serde_json::from_slice(&source)?)
}

pub fn load_test_pair(testcase: usize) -> anyhow::Result<Vec<(String, TestExpectation)>> {
    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.wisp", testcase)))?;
    let output =
        load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() {
        bail!("input and output of testcase {} do not match", testcase);
    }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> impl Iterator<Item = usize> {
    1..=8
}
