//! AArch64 Code Generation Tests
//!
//! Tests cover:
//! - Frame layout (slot offsets, stack size)
//! - Assembly text for each instruction kind
//! - The full source-to-assembly pipeline and its errors

use sbcc_engine::compiler::codegen::{generate, FrameLayout};
use sbcc_engine::compiler::ir::IrModule;
use sbcc_engine::compiler::lower::lower_program;
use sbcc_engine::parser::Parser;
use sbcc_engine::{compile_file, compile_source, CompileError, CompileOptions, Error, OptLevel};

fn lower(source: &str) -> IrModule {
    let program = Parser::new(source).expect("lexer error").parse().expect("parse error");
    lower_program(&program).expect("lowering error")
}

fn asm(source: &str) -> String {
    compile_source(source, &CompileOptions::default()).expect("compile error").assembly
}

fn asm_optimized(source: &str) -> String {
    compile_source(source, &CompileOptions::new(OptLevel::Basic))
        .expect("compile error")
        .assembly
}

/// Instruction lines of one function body, without the tab
fn body<'a>(text: &'a str, function: &str) -> Vec<&'a str> {
    let header = format!("{}:", function);
    text.lines()
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| !(line.ends_with(':') && !line.starts_with(".L")))
        .filter_map(|line| line.strip_prefix('\t'))
        .collect()
}

// =============================================================================
// FRAME LAYOUT
// =============================================================================

mod frame_layout {
    use super::*;

    #[test]
    fn test_stack_size_covers_every_slot() {
        for locals in 0..6 {
            for params in 0..=8 {
                let decls: String = (0..locals).map(|i| format!("int v{}; ", i)).collect();
                let param_list: Vec<String> = (0..params).map(|i| format!("int p{}", i)).collect();
                let source = format!("int f({}) {{ {}return 0; }}", param_list.join(", "), decls);

                let module = lower(&source);
                let func = &module.functions[0];
                let frame = FrameLayout::compute(func).unwrap();

                let slots = locals + params;
                assert_eq!(frame.slot_count(), slots, "{}", source);
                assert_eq!(frame.stack_size() % 16, 0);
                assert!(frame.stack_size() >= 8 * slots);
                assert!(frame.stack_size() < 8 * slots + 16);

                let mut offsets: Vec<usize> = frame
                    .slots()
                    .iter()
                    .map(|local| frame.offset(local).unwrap())
                    .collect();
                assert!(offsets.iter().all(|&o| o < frame.stack_size()));
                offsets.sort_unstable();
                offsets.dedup();
                assert_eq!(offsets.len(), slots);
            }
        }
    }

    #[test]
    fn test_params_follow_locals() {
        let module = lower("int f(int a, int b) { int c = a; return c + b; }");
        let frame = FrameLayout::compute(&module.functions[0]).unwrap();
        let names: Vec<String> = frame.slots().iter().map(|l| l.to_string()).collect();
        assert_eq!(names, vec!["c", "%tmp.0", "a", "b"]);
    }

    #[test]
    fn test_prologue_matches_frame() {
        let text = asm("int f(int a) { int b = 1; return a + b; }");
        let lines = body(&text, "f");
        assert_eq!(
            &lines[..4],
            &[
                "stp x29, x30, [sp, #-16]!",
                "mov x29, sp",
                "sub sp, sp, #32",
                "str x0, [sp, #16]"
            ]
        );
        assert_eq!(&lines[lines.len() - 3..], &["add sp, sp, #32", "ldp x29, x30, [sp], #16", "ret"]);
    }
}

// =============================================================================
// INSTRUCTION SELECTION
// =============================================================================

mod instructions {
    use super::*;

    #[test]
    fn test_arithmetic_mnemonics() {
        let cases = [
            ("a + b", "add"),
            ("a - b", "sub"),
            ("a * b", "mul"),
            ("a / b", "udiv"),
            ("a << b", "lsl"),
            ("a >> b", "asr"),
            ("a & b", "and"),
            ("a | b", "orr"),
            ("a ^ b", "eor"),
        ];
        for (expr, mnemonic) in cases {
            let text = asm(&format!("long f(long a, long b) {{ return {}; }}", expr));
            assert!(
                text.contains(&format!("\t{} x11, x9, x10\n", mnemonic)),
                "{}: {}",
                expr,
                text
            );
        }

        let text = asm("unsigned long f(unsigned long a, long b) { return a >> b; }");
        assert!(text.contains("\tlsr x11, x9, x10\n"), "{}", text);
    }

    #[test]
    fn test_comparison_conditions() {
        for (op, cond) in [("<", "lt"), (">", "gt"), ("<=", "le"), (">=", "ge"), ("==", "eq"), ("!=", "ne")] {
            let text = asm(&format!("int f(int a, int b) {{ return a {} b; }}", op));
            assert!(text.contains(&format!("\tcsetm x11, {}\n", cond)), "{}", text);
        }
    }

    #[test]
    fn test_pointer_load_and_store() {
        let text = asm("int f(int *p) { *p = 3; return *p; }");
        assert!(text.contains("\tmov x9, #3\n\tldr x10, [sp, #8]\n\tstr x9, [x10]\n"), "{}", text);
        assert!(text.contains("\tldr x9, [sp, #8]\n\tldr x10, [x9]\n"), "{}", text);
    }

    #[test]
    fn test_global_store() {
        let text = asm("int g; int f() { g = 4; return 0; }");
        assert!(text.contains("\tmov x9, #4\n\tldr x10, =g\n\tstr x9, [x10]\n"), "{}", text);
    }

    #[test]
    fn test_call_arguments_in_order() {
        let text = asm("int h(int a, int b, int c); int f() { return h(1, 2, 3); }");
        assert!(
            text.contains("\tmov x0, #1\n\tmov x1, #2\n\tmov x2, #3\n\tbl h\n\tstr x0, [sp, #0]\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_loop_branches() {
        let text = asm("int f(int x) { while (x) x = x - 1; return x; }");
        assert!(text.contains("\tb .Lf.while.test.1\n.Lf.while.test.1:\n"), "{}", text);
        assert!(text.contains("\tb.eq .Lf.while.cont.3\n\tb .Lf.while.body.2\n"), "{}", text);
    }

    #[test]
    fn test_functions_are_global() {
        let text = asm("int a() { return 1; } int main() { return a(); }");
        assert!(text.contains(".text\n.globl a\n.globl main\na:\n"), "{}", text);
        assert!(text.contains("\nmain:\n"), "{}", text);
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn test_optimized_constant_return() {
        let text = asm_optimized("int main() { return 2 + 3 * 4; }");
        let lines = body(&text, "main");
        assert!(lines.contains(&"mov x9, #14"), "{}", text);
        assert!(!lines.iter().any(|l| l.starts_with("mul")), "{}", text);
    }

    #[test]
    fn test_strength_reduced_assembly() {
        let text = asm_optimized("long f(long x) { return x * 8; }");
        assert!(text.contains("\tmov x10, #3\n\tlsl x11, x9, x10\n"), "{}", text);
    }

    #[test]
    fn test_folded_modulo_compiles() {
        let text = asm_optimized("int f() { return 10 % 4; }");
        assert!(text.contains("\tmov x9, #2\n"), "{}", text);
    }

    #[test]
    fn test_modulo_fails_codegen() {
        let err = compile_source("int f(int a) { return a % 3; }", &CompileOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Compile(CompileError::UnsupportedOpcode { ref opcode }) if opcode == "MOD"
        ));
        assert_eq!(err.to_string(), "Unsupported opcode: MOD has no AArch64 mnemonic");
    }

    #[test]
    fn test_check_errors_stop_the_pipeline() {
        let err = compile_source("int f() { return y; }", &CompileOptions::default()).unwrap_err();
        let Error::Check(errors) = &err else {
            panic!("expected check errors, got {:?}", err);
        };
        assert_eq!(errors.len(), 1);
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics[0].0.map(|s| s.line), Some(1));
    }

    #[test]
    fn test_lex_and_parse_errors() {
        assert!(matches!(
            compile_source("int f() { return 1 @ 2; }", &CompileOptions::default()),
            Err(Error::Lex(_))
        ));
        assert!(matches!(
            compile_source("int f( { return 1; }", &CompileOptions::default()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_emit_ir_is_optional() {
        let options = CompileOptions::new(OptLevel::Basic).with_emit_ir(true);
        let output = compile_source("int f() { return 1 + 1; }", &options).unwrap();
        assert_eq!(
            output.ir.as_deref(),
            Some("function f() {\nentry:\n\t%tmp.0 = MV #2\n\tRET %tmp.0\n}\n\n")
        );
        assert!(compile_source("int f() { return 1; }", &CompileOptions::default())
            .unwrap()
            .ir
            .is_none());
    }

    #[test]
    fn test_compile_file_reads_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        let source = "int main() { return 7; }";
        std::fs::write(&path, source).unwrap();

        let output = compile_file(&path, &CompileOptions::default()).unwrap();
        assert_eq!(output.assembly, asm(source));

        let missing = compile_file(dir.path().join("missing.c"), &CompileOptions::default());
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_codegen_of_lowered_module_matches_pipeline() {
        let source = "int f(int x) { if (x) return 1; return 2; }";
        assert_eq!(generate(&lower(source)).unwrap(), asm(source));
    }
}
