use std::collections::HashSet;

/// One lexical scope frame.
#[derive(Debug)]
struct Scope {
    /// Index of the nearest enclosing function/top-level frame, where `var`
    /// bindings hoist to. Every frame we push is a function scope, so this
    /// is currently its own index; the indirection mirrors how `var` and
    /// `let` declarations take different paths.
    hoist_target: usize,
    names: HashSet<String>,
}

/// Stack of scope frames threaded through one transform call.
///
/// Frames are pushed on entering a function or arrow body and popped on
/// leaving. Plain blocks are not tracked: a `let` inside `{ ... }` binds to
/// the enclosing function scope, which is close enough to decide freeness
/// for tag-sized programs.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// A fresh stack containing the top-level scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                hoist_target: 0,
                names: HashSet::new(),
            }],
        }
    }

    /// Enter a function or arrow body.
    pub fn push_function(&mut self) {
        let index = self.scopes.len();
        self.scopes.push(Scope {
            hoist_target: index,
            names: HashSet::new(),
        });
    }

    /// Leave a function or arrow body. The top-level frame is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Record a binding. `hoisted` sends the name to the nearest function/
    /// top-level frame (`var`); otherwise it lands in the innermost frame
    /// (`let`/`const`, parameters, function names).
    pub fn bind(&mut self, name: &str, hoisted: bool) {
        let index = if hoisted {
            self.scopes.last().map(|s| s.hoist_target).unwrap_or(0)
        } else {
            self.scopes.len() - 1
        };
        self.scopes[index].names.insert(name.to_string());
    }

    /// True when any enclosing frame binds `name`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.names.contains(name))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
