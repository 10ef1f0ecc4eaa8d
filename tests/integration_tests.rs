//! Integration tests for end-to-end compilation.
//!
//! These tests drive the complete pipeline through the public API: source
//! text through tokenization, parsing, analysis and module text generation.

use pretty_assertions::assert_eq;
use sprig::{
    analyze, compile_source,
    driver::{pretty_print, CompileError},
    errors::errors::ErrorKind,
    generate,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::modules::BuiltinModules,
    Driver, Emit,
};

const PROGRAM: &str = r#"import io;

func add(a: Integer64, b: Integer64): Integer64 {
    return a + b;
}

func main(): Null {
    let total = add(1, 2);
    if (total == 3) {
        io.print("three");
    } else if (total > 3) {
        io.print(total);
    }
    while (total < 10) {
        total = total + 1;
    }
    io.print(and(true, false));
}
"#;

const PROGRAM_WAT: &str = r#"(module
  (import "io" "print_i" (func $io_print_i (param i64)))
  (import "io" "print_s" (func $io_print_s (param i32 i32)))
  (import "io" "print_b" (func $io_print_b (param i32)))
  (memory (export "memory") 1)
  (func $add (param $a i64) (param $b i64) (result i64)
    local.get $a
    local.get $b
    i64.add
    return
  )
  (func $main
    (local $total i64)
    i64.const 1
    i64.const 2
    call $add
    local.set $total
    local.get $total
    i64.const 3
    i64.eq
    (if
      (then
        i32.const 0
        i32.const 5
        call $io_print_s
      )
      (else
        local.get $total
        i64.const 3
        i64.gt_s
        (if
          (then
            local.get $total
            call $io_print_i
          )
        )
      )
    )
    (block
      (loop
        local.get $total
        i64.const 10
        i64.lt_s
        i32.eqz
        br_if 1
        local.get $total
        i64.const 1
        i64.add
        local.set $total
        br 0
      )
    )
    i32.const 1
    i32.const 0
    i32.and
    call $io_print_b
  )
  (export "main" (func $main))
  (data (i32.const 0) "three")
)
"#;

fn semantic_error(source: &str) -> ErrorKind {
    match compile_source(source) {
        Err(CompileError::Semantic(error)) => error.kind(),
        other => panic!("expected a semantic error, got {:?}", other),
    }
}

#[test]
fn test_compile_program() {
    assert_eq!(compile_source(PROGRAM).unwrap(), PROGRAM_WAT);
}

#[test]
fn test_output_is_deterministic() {
    assert_eq!(compile_source(PROGRAM).unwrap(), compile_source(PROGRAM).unwrap());
}

#[test]
fn test_analyze_then_generate() {
    let root = parse(tokenize(PROGRAM.to_string()).unwrap()).unwrap();
    let annotated = analyze(root, &mut BuiltinModules::new()).unwrap();

    assert_eq!(generate(&annotated).unwrap(), PROGRAM_WAT);
}

#[test]
fn test_print_round_trip() {
    let wat = compile_source(
        "import io;
         func main() {
             io.print(42);
             io.print(\"hi\");
             io.print(true);
             io.print(\"hi\");
         }",
    )
    .unwrap();

    assert!(wat.contains("    i64.const 42\n    call $io_print_i\n"));
    assert!(wat.contains("    i32.const 0\n    i32.const 2\n    call $io_print_s\n"));
    assert!(wat.contains("    i32.const 1\n    call $io_print_b\n"));
    assert!(wat.contains("    i32.const 2\n    i32.const 2\n    call $io_print_s\n"));
    assert!(wat.contains("  (data (i32.const 0) \"hihi\")\n"));
}

#[test]
fn test_scope_shadowing() {
    let source = "let x: Integer64 = 1; func main() { let x: Integer64 = 2; }";

    assert!(compile_source(source).is_ok());
}

#[test]
fn test_same_level_duplicate() {
    assert_eq!(
        semantic_error("func main() { let x = 1; let x = 2; }"),
        ErrorKind::DuplicateSymbolError
    );
}

#[test]
fn test_type_mismatch_message() {
    let Err(CompileError::Semantic(error)) = compile_source("let x: Integer64 = \"s\";") else {
        panic!("expected a semantic error");
    };

    assert_eq!(error.kind(), ErrorKind::TypeError);
    assert!(error.get_message().contains("Integer64"));
    assert!(error.get_message().contains("String"));
    assert_eq!(
        error.to_string(),
        "Error at 1:1: Initializer type 'String' does not match explicit type 'Integer64'"
    );
}

#[test]
fn test_return_requirement() {
    assert_eq!(
        semantic_error("func f(): Integer64 { let a = 1; }"),
        ErrorKind::MissingReturnError
    );
    assert!(compile_source("func f(): Null { let a = 1; }").is_ok());
}

#[test]
fn test_arity_and_argument_types() {
    let add = "func add(a: Integer64, b: Integer64): Integer64 { return a + b; }";

    assert_eq!(
        semantic_error(&format!("{} func main() {{ add(1); }}", add)),
        ErrorKind::ArityError
    );

    let Err(CompileError::Semantic(error)) =
        compile_source(&format!("{} func main() {{ add(\"x\", 2); }}", add))
    else {
        panic!("expected a semantic error");
    };
    assert_eq!(error.kind(), ErrorKind::TypeError);
    assert!(error.get_message().starts_with("Argument 1 "));
}

#[test]
fn test_class_member_resolution() {
    let source = "class Point {
                      let x: Integer64 = 0;
                      func get(): Integer64 { return this.x; }
                  }
                  func main() { let p: Point; let a = p.x; let b = p.x; }";
    let root = parse(tokenize(source.to_string()).unwrap()).unwrap();
    let annotated = analyze(root, &mut BuiltinModules::new()).unwrap();

    let point = annotated.class(0).unwrap();
    assert_eq!(
        point.member("get", &annotated.symbols),
        point.member("get", &annotated.symbols)
    );
}

#[test]
fn test_import_twice() {
    let mut driver = Driver::new();

    driver
        .compile("import io; import io; func main() { io.print(1); }")
        .unwrap();
    driver.compile("import io; func main() { }").unwrap();

    assert_eq!(driver.modules().compilations(), 1);
}

#[test]
fn test_error_kinds() {
    assert_eq!(semantic_error("let a = b;"), ErrorKind::NameError);
    assert_eq!(semantic_error("import net;"), ErrorKind::ModuleNotFoundError);
    assert_eq!(semantic_error("class lower { }"), ErrorKind::NamingError);
    assert_eq!(semantic_error("let a: Null;"), ErrorKind::InvalidTypeError);
    assert_eq!(semantic_error("return 1;"), ErrorKind::InvalidScopeError);
    assert_eq!(
        semantic_error("import io; func f() { io = 1; }"),
        ErrorKind::ImportOverrideError
    );
}

#[test]
fn test_exit_codes() {
    assert_eq!(compile_source("").unwrap_err().exit_code(), 1);
    assert_eq!(compile_source("let a = @;").unwrap_err().exit_code(), 1);
    assert_eq!(compile_source("let a = b;").unwrap_err().exit_code(), 1);
    assert_eq!(
        compile_source("class Point { func get(): Integer64 { return 1; } } func main() { let p: Point; p.get(); }")
            .unwrap_err()
            .exit_code(),
        2
    );
}

#[test]
fn test_unused_class_compiles() {
    let wat = compile_source("class Point { let x: Integer64 = 0; } func main(): Null { }").unwrap();

    assert!(wat.contains("  (func $main\n  )\n"));
    assert!(!wat.contains("Point"));
}

#[test]
fn test_global_is_read_until_shadowed() {
    let wat = compile_source(
        "import io;
         let x: Integer64 = 1;
         func main(): Null { io.print(x); let x: Integer64 = 2; io.print(x); }",
    )
    .unwrap();

    let reads: Vec<&str> = wat
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(" $x") && line.contains(".get"))
        .collect();
    assert_eq!(reads, ["global.get $x", "local.get $x"]);
}

#[test]
fn test_emit_ast() {
    let text = Driver::new()
        .emit("let x = 1;", Emit::Ast)
        .unwrap();

    assert_eq!(text, "Module(\n  [\n    Let(\n      n=x,\n      i=Int(\n        1\n      )\n    )\n  ]\n)\n");
    assert_eq!(pretty_print("Return()"), "Return()");
}
