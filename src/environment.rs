use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::WispError;
use crate::value::Value;

// One level of the scope chain. A frame is shared between every closure
// created while it was current and every call frame linking out to it,
// so frames live behind Rc; bindings mutate in place, the chain itself
// never changes after creation.
pub(crate) struct Frame {
    bindings: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Frame>>,
}

impl Frame {
    pub(crate) fn root(bindings: HashMap<String, Value>) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(bindings),
            outer: None,
        })
    }

    pub(crate) fn nested(outer: Rc<Frame>) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Search this frame, then the chain of outer frames.
    pub(crate) fn lookup(&self, name: &str) -> Result<Value, WispError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        match self.outer.as_ref() {
            Some(outer) => outer.lookup(name),
            None => Err(WispError::UnboundVariable(name.to_string())),
        }
    }

    /// Insert or overwrite `name` in this frame only, shadowing any
    /// outer binding of the same name.
    pub(crate) fn define(&self, name: &str, value: Value) -> Value {
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        value
    }

    /// Overwrite the innermost existing binding of `name`, wherever in
    /// the chain it lives. Unlike `define`, never creates a binding.
    pub(crate) fn assign(&self, name: &str, value: Value) -> Result<Value, WispError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings
                .borrow_mut()
                .insert(name.to_string(), value.clone());
            return Ok(value);
        }
        match self.outer.as_ref() {
            Some(outer) => outer.assign(name, value),
            None => Err(WispError::UnboundVariable(name.to_string())),
        }
    }
}
