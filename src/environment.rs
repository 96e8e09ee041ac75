//! Scope environment shared by the checkers and the interpreter.
//!
//! A scope is a flat mapping from symbol names to whatever the current
//! traversal computes per binding (a static type, a security type, or a
//! runtime value). Entering a `let` clones the environment and leaving it
//! restores the original, so shadowing never leaks into the enclosing
//! scope; function bodies start from an empty environment instead of a
//! clone because functions do not close over their definition site.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Environment<T: Clone> {
    bindings: HashMap<String, T>,
}

impl<T: Clone> Environment<T> {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    pub fn put(&mut self, name: &str, value: T) {
        self.bindings.insert(String::from(name), value);
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.bindings.get(name)
    }
}

impl<T: Clone> Default for Environment<T> {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;

    #[test]
    fn test_put_then_get() {
        let mut env: Environment<i32> = Environment::new();
        env.put("x", 1);

        assert_eq!(env.get("x"), Some(&1));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_clone_does_not_leak_into_original() {
        let mut outer: Environment<i32> = Environment::new();
        outer.put("x", 1);

        let mut inner = outer.clone();
        inner.put("x", 2);
        inner.put("y", 3);

        assert_eq!(outer.get("x"), Some(&1));
        assert_eq!(outer.get("y"), None);
        assert_eq!(inner.get("x"), Some(&2));
    }
}
