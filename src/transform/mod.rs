//! Identifier transformer.
//!
//! Parses one tag's code with tree-sitter's JavaScript grammar, walks the
//! tree tracking lexical scopes, and rewrites every free identifier into a
//! member read on the template's state parameter. The rewrites are spliced
//! back into the source text, so untouched code keeps its formatting.

mod globals;
mod scope;

pub use globals::GlobalsPolicy;

use tree_sitter::{Node, Parser};

use crate::error::TransformError;
use scope::ScopeStack;

/// Rewrite free identifiers in `code` into reads on `state_param`.
///
/// Blank code is returned unchanged. Syntax errors in the code are fatal;
/// a parse that yields no program statements at all signals an upstream
/// tokenizer bug and is reported as an internal error.
///
/// Single-pass and not idempotent: re-running the transformer over its own
/// output with a different state parameter may rewrite the references it
/// introduced.
pub fn transform_template_code(code: &str, state_param: &str) -> Result<String, TransformError> {
    transform_template_code_with(code, &GlobalsPolicy::new(state_param))
}

/// Like [`transform_template_code`], with an application-supplied policy
/// for host globals.
pub fn transform_template_code_with(
    code: &str,
    policy: &GlobalsPolicy,
) -> Result<String, TransformError> {
    if code.trim().is_empty() {
        return Ok(code.to_string());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .expect("Error loading JavaScript grammar");
    let tree = parser
        .parse(code, None)
        .ok_or_else(|| TransformError::Internal("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if root.kind() != "program" {
        return Err(TransformError::Internal(format!(
            "expected a program, got {}",
            root.kind()
        )));
    }
    if root.has_error() {
        let node = find_syntax_error(root).unwrap_or(root);
        return Err(syntax_error(code, node));
    }
    let mut cursor = root.walk();
    let statements = root
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .count();
    drop(cursor);
    if statements == 0 {
        return Err(TransformError::Internal(
            "tag code has no statements".to_string(),
        ));
    }

    let mut rewriter = Rewriter {
        src: code,
        policy,
        scopes: ScopeStack::new(),
        edits: Vec::new(),
    };
    rewriter.walk(root);
    Ok(apply_edits(code, rewriter.edits))
}

/// A text replacement over a byte range of the source.
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

fn apply_edits(src: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.start);
    let mut out = String::with_capacity(src.len() + edits.len() * 8);
    let mut last = 0;
    for edit in &edits {
        out.push_str(&src[last..edit.start]);
        out.push_str(&edit.replacement);
        last = edit.end;
    }
    out.push_str(&src[last..]);
    out
}

struct Rewriter<'a> {
    src: &'a str,
    policy: &'a GlobalsPolicy,
    scopes: ScopeStack,
    edits: Vec<Edit>,
}

impl Rewriter<'_> {
    fn walk(&mut self, node: Node<'_>) {
        match node.kind() {
            // Declarations bind before their subtree is visited, so the
            // declared names are already in scope for their initializers.
            "variable_declaration" | "lexical_declaration" => {
                let hoisted = node.kind() == "variable_declaration";
                let mut cursor = node.walk();
                let declarators: Vec<Node<'_>> = node
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() == "variable_declarator")
                    .collect();
                drop(cursor);
                for declarator in declarators {
                    if let Some(name) = declarator.child_by_field_name("name") {
                        self.bind_pattern(name, hoisted);
                    }
                }
                self.walk_children(node);
            }

            // `for (const item of items)` declares without a nested
            // variable_declaration node.
            "for_in_statement" => {
                if let Some(kind) = node.child_by_field_name("kind") {
                    let hoisted = kind.kind() == "var";
                    if let Some(left) = node.child_by_field_name("left") {
                        self.bind_pattern(left, hoisted);
                    }
                }
                self.walk_children(node);
            }

            // A named function binds its name in the enclosing scope; its
            // parameters live in the new scope.
            "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "generator_function" => {
                if let Some(name) = node.child_by_field_name("name") {
                    if let Ok(text) = name.utf8_text(self.src.as_bytes()) {
                        self.scopes.bind(text, false);
                    }
                }
                self.scopes.push_function();
                self.bind_params(node);
                self.walk_children(node);
                self.scopes.pop();
            }

            "arrow_function" | "method_definition" => {
                self.scopes.push_function();
                self.bind_params(node);
                self.walk_children(node);
                self.scopes.pop();
            }

            // `{x}` becomes `{x: state.x}` so the key half stays a key.
            // Member properties and non-shorthand keys are distinct node
            // kinds (`property_identifier`) and never reach these arms;
            // computed access and computed keys use plain identifiers and
            // are rewritten.
            "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
                if let Ok(name) = node.utf8_text(self.src.as_bytes()) {
                    if self.is_free(name) {
                        self.edits.push(Edit {
                            start: node.start_byte(),
                            end: node.end_byte(),
                            replacement: format!(
                                "{}: {}.{}",
                                name,
                                self.policy.state_param(),
                                name
                            ),
                        });
                    }
                }
            }

            "identifier" => {
                if let Ok(name) = node.utf8_text(self.src.as_bytes()) {
                    if self.is_free(name) {
                        self.edits.push(Edit {
                            start: node.start_byte(),
                            end: node.end_byte(),
                            replacement: format!("{}.{}", self.policy.state_param(), name),
                        });
                    }
                }
            }

            // Everything else passes through untouched.
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        drop(cursor);
        for child in children {
            self.walk(child);
        }
    }

    fn is_free(&self, name: &str) -> bool {
        !self.scopes.is_bound(name) && !self.policy.is_excluded(name)
    }

    fn bind_params(&mut self, node: Node<'_>) {
        // Single-identifier arrow parameter, no parentheses.
        if let Some(param) = node.child_by_field_name("parameter") {
            self.bind_pattern(param, false);
        }
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            let children: Vec<Node<'_>> = params.named_children(&mut cursor).collect();
            drop(cursor);
            for child in children {
                self.bind_pattern(child, false);
            }
        }
    }

    /// Bind every name a declaration pattern introduces: identifiers, array
    /// and object destructuring, rest elements, defaults. Default values
    /// and member targets bind nothing themselves; the main walk still
    /// transforms them as ordinary expressions.
    fn bind_pattern(&mut self, node: Node<'_>, hoisted: bool) {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                if let Ok(name) = node.utf8_text(self.src.as_bytes()) {
                    self.scopes.bind(name, hoisted);
                }
            }
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                let mut cursor = node.walk();
                let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                drop(cursor);
                for child in children {
                    self.bind_pattern(child, hoisted);
                }
            }
            "pair_pattern" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.bind_pattern(value, hoisted);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_pattern(left, hoisted);
                }
            }
            _ => {}
        }
    }
}

/// First concrete error or missing node under `node`, depth-first.
fn find_syntax_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    drop(cursor);
    children.into_iter().find_map(find_syntax_error)
}

fn syntax_error(code: &str, node: Node<'_>) -> TransformError {
    let start = node.start_byte().min(code.len());
    let mut end = node.end_byte().min(start + 24).min(code.len());
    while end < code.len() && !code.is_char_boundary(end) {
        end += 1;
    }
    TransformError::Syntax {
        offset: start,
        snippet: code.get(start..end).unwrap_or("").to_string(),
    }
}
