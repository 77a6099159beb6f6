use brace_compiler::{transform_template_code, transform_template_code_with, GlobalsPolicy, TransformError};

fn transform(code: &str) -> String {
    transform_template_code(code, "state").expect("transform should succeed")
}

#[test]
fn test_local_binding_is_not_rewritten() {
    assert_eq!(
        transform("let x = 1; y = x + z"),
        "let x = 1; state.y = x + state.z"
    );
}

#[test]
fn test_shadowed_state_parameter() {
    let code = "function f(state){ return state + 1 }";
    assert_eq!(transform(code), code);
}

#[test]
fn test_member_chain_rewrites_object_only() {
    assert_eq!(transform("a.b.c"), "state.a.b.c");
}

#[test]
fn test_blank_code_unchanged() {
    assert_eq!(transform(""), "");
    assert_eq!(transform("   \n "), "   \n ");
}

#[test]
fn test_computed_member_is_rewritten() {
    assert_eq!(transform("a[b]"), "state.a[state.b]");
}

#[test]
fn test_optional_chain_property_untouched() {
    assert_eq!(transform("foo?.bar"), "state.foo?.bar");
}

#[test]
fn test_object_key_untouched_value_rewritten() {
    assert_eq!(transform("fn({key: value})"), "state.fn({key: state.value})");
}

#[test]
fn test_computed_key_is_rewritten() {
    assert_eq!(transform("fn({[k]: v})"), "state.fn({[state.k]: state.v})");
}

#[test]
fn test_shorthand_property_expands() {
    assert_eq!(transform("render({x})"), "state.render({x: state.x})");
}

#[test]
fn test_bound_shorthand_property_stays() {
    assert_eq!(
        transform("let x = 1; render({x})"),
        "let x = 1; state.render({x})"
    );
}

#[test]
fn test_arrow_parameter_shadows() {
    assert_eq!(
        transform("items.map(item => item.label)"),
        "state.items.map(item => item.label)"
    );
}

#[test]
fn test_arrow_default_value_is_rewritten() {
    assert_eq!(transform("(a, b = c) => a + b"), "(a, b = state.c) => a + b");
}

#[test]
fn test_nested_arrows_share_outer_bindings() {
    assert_eq!(transform("x => y => x + y + z"), "x => y => x + y + state.z");
}

#[test]
fn test_destructuring_binds_all_names() {
    assert_eq!(
        transform("let {a, b: [c], ...rest} = obj; use(a, c, rest)"),
        "let {a, b: [c], ...rest} = state.obj; state.use(a, c, rest)"
    );
}

#[test]
fn test_var_hoists_within_function_only() {
    assert_eq!(
        transform("function f(){ var v = 1; return v } f() + v"),
        "function f(){ var v = 1; return v } f() + state.v"
    );
}

#[test]
fn test_named_function_expression() {
    let code = "const go = function helper(n){ return helper(n) }; go(1)";
    assert_eq!(transform(code), code);
}

#[test]
fn test_for_of_declaration_binds() {
    assert_eq!(
        transform("for (const item of items) { total += item.price }"),
        "for (const item of state.items) { state.total += item.price }"
    );
}

#[test]
fn test_template_literal_interpolation() {
    assert_eq!(transform("`Hello ${user}!`"), "`Hello ${state.user}!`");
}

#[test]
fn test_host_globals_untouched() {
    assert_eq!(
        transform("console.log(Math.max(a, 2))"),
        "console.log(Math.max(state.a, 2))"
    );
}

#[test]
fn test_name_is_allow_listed() {
    assert_eq!(transform("name + user"), "state.name + state.user");
}

#[test]
fn test_dunder_prefix_untouched() {
    assert_eq!(transform("__internal + x"), "__internal + state.x");
}

#[test]
fn test_reserved_words_untouched() {
    assert_eq!(
        transform("this.x + undefined + globalThis.y"),
        "this.x + undefined + globalThis.y"
    );
}

#[test]
fn test_custom_state_param() {
    assert_eq!(
        transform_template_code("a + b", "ctx").expect("transform"),
        "ctx.a + ctx.b"
    );
}

#[test]
fn test_injected_host_globals_policy() {
    let policy = GlobalsPolicy::new("state").with_host_globals(["site"]);
    assert_eq!(
        transform_template_code_with("site.url + x", &policy).expect("transform"),
        "site.url + state.x"
    );
}

#[test]
fn test_single_pass_is_not_idempotent() {
    let once = transform_template_code("a.b", "state").expect("transform");
    assert_eq!(once, "state.a.b");
    // A second pass with a different parameter rewrites the reference the
    // first pass introduced.
    let twice = transform_template_code(&once, "ctx").expect("transform");
    assert_eq!(twice, "ctx.state.a.b");
}

#[test]
fn test_syntax_error_is_fatal() {
    let err = transform_template_code("f(", "state").expect_err("should fail");
    assert!(matches!(err, TransformError::Syntax { .. }));
}

#[test]
fn test_comment_only_code_is_internal_error() {
    let err = transform_template_code("// nothing here", "state").expect_err("should fail");
    assert!(matches!(err, TransformError::Internal(_)));
}

#[test]
fn test_deterministic() {
    let code = "let x = a; fn({y}, z => z + x)";
    assert_eq!(transform(code), transform(code));
}
