// Stack of named input contexts

use std::ops::{Deref, DerefMut};

/// Context name of bindings that are active regardless of the stack
pub const GLOBAL_CONTEXT: &str = "";

/// Ordered stack of active context names
///
/// The top of the stack is the active context. An empty stack means only
/// global bindings are eligible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    stack: Vec<String>,
}

impl ContextStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a context, making it the active one
    pub fn push(&mut self, name: impl Into<String>) {
        self.stack.push(name.into());
    }

    /// Remove and return the top context, or an empty string if there is none
    pub fn pop(&mut self) -> String {
        self.stack.pop().unwrap_or_default()
    }

    /// Active context, `GLOBAL_CONTEXT` when the stack is empty
    pub fn active(&self) -> &str {
        self.stack.last().map_or(GLOBAL_CONTEXT, String::as_str)
    }

    /// Check if a binding scoped to `context_name` may fire right now
    pub fn admits(&self, context_name: &str) -> bool {
        context_name == GLOBAL_CONTEXT || context_name == self.active()
    }

    /// Number of pushed contexts
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check if no context is pushed
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Iterate from the bottom of the stack to the top
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(String::as_str)
    }
}

/// Anything that owns a context stack
pub trait ContextOwner {
    /// Make `name` the active context
    fn enter_context(&mut self, name: String);

    /// Remove the active context
    fn leave_context(&mut self) -> String;
}

impl ContextOwner for ContextStack {
    fn enter_context(&mut self, name: String) {
        self.push(name);
    }

    fn leave_context(&mut self) -> String {
        self.pop()
    }
}

/// Guard that pops the context it pushed when dropped
pub struct ContextScope<'a, T: ContextOwner> {
    owner: &'a mut T,
}

impl<'a, T: ContextOwner> ContextScope<'a, T> {
    /// Push `name` onto the owner's stack for the lifetime of the guard
    pub fn new(owner: &'a mut T, name: impl Into<String>) -> Self {
        owner.enter_context(name.into());
        Self { owner }
    }
}

impl<T: ContextOwner> Deref for ContextScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.owner
    }
}

impl<T: ContextOwner> DerefMut for ContextScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.owner
    }
}

impl<T: ContextOwner> Drop for ContextScope<'_, T> {
    fn drop(&mut self) {
        self.owner.leave_context();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = ContextStack::new();
        assert_eq!(stack.pop(), "");

        stack.push("DUMMY_CONTEXT_A");
        stack.push("DUMMY_CONTEXT_B");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), "DUMMY_CONTEXT_B");
        assert_eq!(stack.pop(), "DUMMY_CONTEXT_A");
        assert_eq!(stack.pop(), "");
        assert_eq!(stack.pop(), "");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_active_context() {
        let mut stack = ContextStack::new();
        assert_eq!(stack.active(), GLOBAL_CONTEXT);

        stack.push("Menu");
        assert_eq!(stack.active(), "Menu");
        stack.push("Chat");
        assert_eq!(stack.active(), "Chat");
    }

    #[test]
    fn test_admits_top_only() {
        let mut stack = ContextStack::new();
        assert!(stack.admits(GLOBAL_CONTEXT));
        assert!(!stack.admits("CTX"));

        stack.push("CTX");
        assert!(stack.admits("CTX"));

        stack.push("OTHER");
        assert!(!stack.admits("CTX"));
        assert!(stack.admits(GLOBAL_CONTEXT));
    }

    #[test]
    fn test_iter_bottom_to_top() {
        let mut stack = ContextStack::new();
        stack.push("a");
        stack.push("b");
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let mut stack = ContextStack::new();
        stack.push("Game");
        {
            let scope = ContextScope::new(&mut stack, "Menu");
            assert_eq!(scope.active(), "Menu");
            assert_eq!(scope.depth(), 2);
        }
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.active(), "Game");
    }

    #[derive(Default)]
    struct Recording {
        stack: ContextStack,
        calls: Vec<String>,
    }

    impl ContextOwner for Recording {
        fn enter_context(&mut self, name: String) {
            self.calls.push(format!("enter {name}"));
            self.stack.push(name);
        }

        fn leave_context(&mut self) -> String {
            let name = self.stack.pop();
            self.calls.push(format!("leave {name}"));
            name
        }
    }

    #[test]
    fn test_scope_goes_through_owner() {
        let mut owner = Recording::default();
        {
            let scope = ContextScope::new(&mut owner, "Menu");
            assert_eq!(scope.stack.active(), "Menu");
        }
        assert_eq!(owner.calls, vec!["enter Menu", "leave Menu"]);
        assert!(owner.stack.is_empty());
    }
}
