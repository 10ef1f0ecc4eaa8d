//! Unit tests for code generation.
//!
//! Compares emitted module text for small programs and checks the data
//! segment bookkeeping of `WasmContext`.

use pretty_assertions::assert_eq;

use super::{
    compiler::generate,
    context::{escape_bytes, WasmContext},
};
use crate::{
    errors::errors::CodegenError,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{modules::BuiltinModules, type_checker::analyze},
};

const PREAMBLE: &str = "(module
  (import \"io\" \"print_i\" (func $io_print_i (param i64)))
  (import \"io\" \"print_s\" (func $io_print_s (param i32 i32)))
  (import \"io\" \"print_b\" (func $io_print_b (param i32)))
  (memory (export \"memory\") 1)
";

fn compile(source: &str) -> Result<String, CodegenError> {
    let root = parse(tokenize(source.to_string()).unwrap()).unwrap();
    let ast = analyze(root, &mut BuiltinModules::new()).unwrap();
    generate(&ast)
}

fn module(body: &str) -> String {
    format!("{}{})\n", PREAMBLE, body)
}

#[test]
fn test_empty_module() {
    assert_eq!(compile("import io;").unwrap(), module(""));
}

#[test]
fn test_print_string_pools_data() {
    let wat = compile("import io; func main() { io.print(\"hi\"); }").unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $main
    i32.const 0
    i32.const 2
    call $io_print_s
  )
  (export \"main\" (func $main))
  (data (i32.const 0) \"hi\")
"
        )
    );
}

#[test]
fn test_print_selects_host_call_by_type() {
    let wat = compile("import io; func main() { io.print(42); io.print(true); io.print(1 < 2); }")
        .unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $main
    i64.const 42
    call $io_print_i
    i32.const 1
    call $io_print_b
    i64.const 1
    i64.const 2
    i64.lt_s
    call $io_print_b
  )
  (export \"main\" (func $main))
"
        )
    );
}

#[test]
fn test_strings_are_not_deduplicated() {
    let wat = compile("import io; func main() { io.print(\"ab\"); io.print(\"ab\"); }").unwrap();

    assert!(wat.contains("    i32.const 0\n    i32.const 2\n"));
    assert!(wat.contains("    i32.const 2\n    i32.const 2\n"));
    assert!(wat.contains("(data (i32.const 0) \"abab\")"));
}

#[test]
fn test_function_signature_and_return() {
    let wat = compile("func add(a: Integer64, b: Integer64): Integer64 { return a + b; }").unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $add (param $a i64) (param $b i64) (result i64)
    local.get $a
    local.get $b
    i64.add
    return
  )
"
        )
    );
}

#[test]
fn test_non_integer_signatures() {
    let wat = compile("func pick(s: String, b: Boolean): String { return s; }").unwrap();

    assert!(wat.contains(
        "(func $pick (param $s i32) (param $s.len i32) (param $b i32) (result i32 i32)"
    ));
    assert!(wat.contains("    local.get $s\n    local.get $s.len\n    return\n"));
}

#[test]
fn test_locals_include_nested_lets() {
    let wat = compile("func main() { let x = 1; if (x == 1) { let y = 2; } }").unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $main
    (local $x i64)
    (local $y i64)
    i64.const 1
    local.set $x
    local.get $x
    i64.const 1
    i64.eq
    (if
      (then
        i64.const 2
        local.set $y
      )
    )
  )
  (export \"main\" (func $main))
"
        )
    );
}

#[test]
fn test_if_else() {
    let wat = compile(
        "import io; func main() { let b = true; if (b) { io.print(1); } else { io.print(2); } }",
    )
    .unwrap();

    assert!(wat.contains(
        "    (if
      (then
        i64.const 1
        call $io_print_i
      )
      (else
        i64.const 2
        call $io_print_i
      )
    )
"
    ));
}

#[test]
fn test_while_loop() {
    let wat = compile("func count(): Integer64 { let i = 0; while i < 10 { i = i + 1; } return i; }")
        .unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $count (result i64)
    (local $i i64)
    i64.const 0
    local.set $i
    (block
      (loop
        local.get $i
        i64.const 10
        i64.lt_s
        i32.eqz
        br_if 1
        local.get $i
        i64.const 1
        i64.add
        local.set $i
        br 0
      )
    )
    local.get $i
    return
  )
"
        )
    );
}

#[test]
fn test_string_locals_use_two_slots() {
    let wat = compile("import io; func main() { let s = \"hey\"; s = \"yo\"; io.print(s); }").unwrap();

    assert!(wat.contains("    (local $s i32)\n    (local $s.len i32)\n"));
    assert!(wat.contains(
        "    i32.const 0
    i32.const 3
    local.set $s.len
    local.set $s
    i32.const 3
    i32.const 2
    local.set $s.len
    local.set $s
    local.get $s
    local.get $s.len
    call $io_print_s
"
    ));
}

#[test]
fn test_module_level_globals() {
    let wat = compile("let g = 5; let on: Boolean; func bump(): Integer64 { g = g + 1; return g; }")
        .unwrap();

    assert_eq!(
        wat,
        module(
            "  (global $g (mut i64) (i64.const 5))
  (global $on (mut i32) (i32.const 0))
  (func $bump (result i64)
    global.get $g
    i64.const 1
    i64.add
    global.set $g
    global.get $g
    return
  )
"
        )
    );
}

#[test]
fn test_calls_and_discarded_results() {
    let wat = compile("func one(): Integer64 { return 1; } func main() { one(); }").unwrap();

    assert!(wat.contains("  (func $main\n    call $one\n    drop\n  )\n"));
}

#[test]
fn test_operators() {
    let wat = compile(
        "func f(a: Integer64, b: Integer64): Boolean {
             let c = -a * b / 2 - 1;
             return not(and(a >= b, or(a != b, true == false)));
         }",
    )
    .unwrap();

    let expected = [
        "i64.const 0", "local.get $a", "i64.sub", "local.get $b", "i64.mul", "i64.const 2",
        "i64.div_s", "i64.const 1", "i64.sub", "local.set $c", "local.get $a", "local.get $b",
        "i64.ge_s", "local.get $a", "local.get $b", "i64.ne", "i32.const 1", "i32.const 0",
        "i32.eq", "i32.or", "i32.and", "i32.eqz", "return",
    ];
    let emitted: Vec<&str> = wat
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.starts_with("(local $c"))
        .skip(1)
        .take(expected.len())
        .collect();

    assert_eq!(emitted, expected);
}

#[test]
fn test_global_read_before_local_of_same_name() {
    let wat = compile(
        "import io;
         let x: Integer64 = 1;
         func main(): Null { io.print(x); let x: Integer64 = 2; io.print(x); }",
    )
    .unwrap();

    assert_eq!(
        wat,
        module(
            "  (global $x (mut i64) (i64.const 1))
  (func $main
    (local $x i64)
    global.get $x
    call $io_print_i
    i64.const 2
    local.set $x
    local.get $x
    call $io_print_i
  )
  (export \"main\" (func $main))
"
        )
    );
}

#[test]
fn test_class_declarations_emit_nothing() {
    let wat = compile(
        "class Point { let x: Integer64 = 0; }
         func main(): Null { class Local { } }",
    )
    .unwrap();

    assert_eq!(
        wat,
        module(
            "  (func $main
  )
  (export \"main\" (func $main))
"
        )
    );
}

#[test]
fn test_class_uses_are_unsupported() {
    let class = "class Point { let x: Integer64 = 0; func get(): Integer64 { return 1; } }";

    let error = compile(&format!("{} func main() {{ let p: Point; p.get(); }}", class)).unwrap_err();
    assert!(matches!(error, CodegenError::Unsupported { .. }));
    assert!(error.to_string().starts_with("method call is not supported"));

    let error = compile(&format!("{} func main() {{ let p: Point; let a = p.x; }}", class)).unwrap_err();
    assert!(matches!(error, CodegenError::Unsupported { .. }));
    assert!(error.to_string().starts_with("member access is not supported"));
}

#[test]
fn test_module_level_string_is_unsupported() {
    let error = compile("let s = \"text\";").unwrap_err();

    assert!(matches!(error, CodegenError::Unsupported { .. }));
}

#[test]
fn test_context_offsets_grow() {
    let mut context = WasmContext::new();

    assert_eq!(context.add_to_memory("abc"), (0, 3));
    assert_eq!(context.add_u32_to_memory(0x0102_0304), (3, 4));
    assert_eq!(context.add_to_memory("abc"), (7, 3));
    assert_eq!(&context.memory()[3..7], &[0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn test_context_lines_are_indented() {
    let mut context = WasmContext::new();
    context.push_line("(func $f");
    context.indent();
    context.push_line("nop");
    context.dedent();
    context.push_line(")");

    assert_eq!(context.body(), "  (func $f\n    nop\n  )\n");
    assert!(!context.render().contains("(data"));
}

#[test]
fn test_escape_bytes() {
    assert_eq!(escape_bytes(b"plain text"), "plain text");
    assert_eq!(escape_bytes(b"a\"b\\c\n\0"), "a\\22b\\5cc\\0a\\00");
    assert_eq!(escape_bytes("é".as_bytes()), "\\c3\\a9");
}
