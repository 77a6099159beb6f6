use std::collections::HashSet;

/// Names the transformer must never rewrite, independent of configuration.
const RESERVED: &[&str] = &["globalThis", "self", "global", "this", "undefined", "null"];

/// Host globals assumed present in the template runtime. The embedding
/// application can replace this list wholesale; hard-coding one runtime's
/// live global object would tie compiled templates to that runtime.
const DEFAULT_HOST_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "BigInt",
    "Boolean",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "Function",
    "Infinity",
    "Intl",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "SyntaxError",
    "TextDecoder",
    "TextEncoder",
    "TypeError",
    "URIError",
    "URL",
    "URLSearchParams",
    "WeakMap",
    "WeakSet",
    "atob",
    "btoa",
    "console",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "eval",
    "fetch",
    "isFinite",
    "isNaN",
    "name",
    "parseFloat",
    "parseInt",
    "performance",
    "process",
    "queueMicrotask",
    "setInterval",
    "setTimeout",
    "clearInterval",
    "clearTimeout",
    "structuredClone",
];

/// Host globals that templates are allowed to shadow with state fields.
/// `name` in particular is a legacy window global that templates want for
/// themselves far more often than they want the host's.
const DEFAULT_ALLOWED: &[&str] = &["name"];

/// Decides which identifiers are exempt from state rewriting.
#[derive(Debug, Clone)]
pub struct GlobalsPolicy {
    state_param: String,
    host_globals: HashSet<String>,
    allowed: HashSet<String>,
}

impl GlobalsPolicy {
    /// Default policy for the given state parameter name.
    pub fn new(state_param: impl Into<String>) -> Self {
        Self {
            state_param: state_param.into(),
            host_globals: DEFAULT_HOST_GLOBALS.iter().map(|s| s.to_string()).collect(),
            allowed: DEFAULT_ALLOWED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the host-globals list with the embedding application's own.
    pub fn with_host_globals<I, S>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.host_globals = globals.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allow-list of host globals that state fields may shadow.
    pub fn with_allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn state_param(&self) -> &str {
        &self.state_param
    }

    /// True when `name` must be left alone even though it is unbound:
    /// the state parameter itself, a reserved word, a host global not on
    /// the allow-list, or a `__`-prefixed internal.
    pub fn is_excluded(&self, name: &str) -> bool {
        name == self.state_param
            || RESERVED.contains(&name)
            || name.starts_with("__")
            || (self.host_globals.contains(name) && !self.allowed.contains(name))
    }
}

impl Default for GlobalsPolicy {
    fn default() -> Self {
        Self::new("state")
    }
}
