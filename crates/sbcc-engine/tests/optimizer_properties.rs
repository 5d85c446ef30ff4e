//! Optimizer Tests
//!
//! Strength reduction and constant folding checked against direct 64-bit
//! computation, plus the fixed-point behaviour of the pass sequence.

use sbcc_engine::compiler::ir::{
    ArithOp, BasicBlock, BasicBlockId, IrInstr, IrModule, Local, Operand, PrettyPrint,
};
use sbcc_engine::compiler::lower::lower_program;
use sbcc_engine::compiler::optimize::ConstantFolder;
use sbcc_engine::compiler::Optimizer;
use sbcc_engine::parser::Parser;

fn lower(source: &str) -> IrModule {
    let program = Parser::new(source).expect("lexer error").parse().expect("parse error");
    lower_program(&program).expect("lowering error")
}

fn optimize(source: &str) -> IrModule {
    let mut module = lower(source);
    Optimizer::basic().optimize(&mut module);
    module
}

/// First instruction of the only function
fn first_instr(module: &IrModule) -> &IrInstr {
    &module.functions[0].blocks[0].instructions[0]
}

// =============================================================================
// STRENGTH REDUCTION
// =============================================================================

mod strength_reduction {
    use super::*;

    #[test]
    fn test_multiply_by_every_power_of_two() {
        for k in 0..64u32 {
            let factor = 1u64 << k;
            let module = optimize(&format!("long f(long a) {{ return a * {}; }}", factor));
            assert_eq!(
                *first_instr(&module),
                IrInstr::Arithmetic {
                    dest: Local::Temp(0),
                    op: ArithOp::Sll,
                    src1: Operand::var("a"),
                    src2: Operand::Literal(i64::from(k)),
                },
                "a * {}",
                factor
            );
        }
    }

    #[test]
    fn test_divide_by_every_power_of_two() {
        for k in 0..64u32 {
            let divisor = 1u64 << k;
            let module = optimize(&format!("long f(long a) {{ return a / {}; }}", divisor));
            assert_eq!(
                first_instr(&module).to_string(),
                format!("%tmp.0= ASR a , #{}", k),
                "a / {}",
                divisor
            );
        }
    }

    #[test]
    fn test_non_powers_are_left_alone() {
        let module = optimize("long f(long a) { return a * 3; }");
        assert_eq!(first_instr(&module).to_string(), "%tmp.0= MUL a , #3");

        let module = optimize("long f(long x) { return x / 6; }");
        assert_eq!(first_instr(&module).to_string(), "%tmp.0= DIV x , #6");
    }

    #[test]
    fn test_power_of_two_division_scenario() {
        let module = optimize("long f(long x) { return x / 8; }");
        assert_eq!(first_instr(&module).to_string(), "%tmp.0= ASR x , #3");
    }

    #[test]
    fn test_literal_on_the_left_is_swapped() {
        let module = optimize("long f(long a) { return 16 * a; }");
        assert_eq!(first_instr(&module).to_string(), "%tmp.0= SLL a , #4");
    }
}

// =============================================================================
// CONSTANT FOLDING
// =============================================================================

mod constant_folding {
    use super::*;

    /// Reference result with AArch64 64-bit semantics
    fn reference(op: ArithOp, x: i64, y: i64) -> i64 {
        let (ux, uy) = (x as u64, y as u64);
        match op {
            ArithOp::Add => x.wrapping_add(y),
            ArithOp::Sub => x.wrapping_sub(y),
            ArithOp::Mul => x.wrapping_mul(y),
            ArithOp::Div => (ux / uy) as i64,
            ArithOp::Mod => (ux % uy) as i64,
            ArithOp::And => x & y,
            ArithOp::Orr => x | y,
            ArithOp::Xor => x ^ y,
            ArithOp::Sll => ux.wrapping_shl(y as u32) as i64,
            ArithOp::Slr => ux.wrapping_shr(y as u32) as i64,
            ArithOp::Asr => x.wrapping_shr(y as u32),
        }
    }

    fn fold(op: ArithOp, x: i64, y: i64) -> IrInstr {
        let mut block = BasicBlock::with_label(BasicBlockId(0), "entry");
        block.add_instr(IrInstr::Arithmetic {
            dest: Local::Temp(0),
            op,
            src1: Operand::Literal(x),
            src2: Operand::Literal(y),
        });
        ConstantFolder::new().fold_block(&mut block);
        block.instructions.remove(0)
    }

    #[test]
    fn test_binary_ops_match_reference() {
        let values = [0, 1, 2, 7, -1, -8, 1 << 40, i64::MAX, i64::MIN];
        let ops = [
            ArithOp::Add,
            ArithOp::Sub,
            ArithOp::Mul,
            ArithOp::Div,
            ArithOp::Mod,
            ArithOp::And,
            ArithOp::Orr,
            ArithOp::Xor,
        ];
        for op in ops {
            for x in values {
                for y in values {
                    if matches!(op, ArithOp::Div | ArithOp::Mod) && y == 0 {
                        continue;
                    }
                    assert_eq!(
                        fold(op, x, y),
                        IrInstr::Move {
                            dest: Local::Temp(0),
                            value: Operand::Literal(reference(op, x, y)),
                        },
                        "{} {} {}",
                        x,
                        op,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_shifts_match_reference() {
        let values = [1, -1, 0x00ff, -0x7000, i64::MIN];
        for op in [ArithOp::Sll, ArithOp::Slr, ArithOp::Asr] {
            for x in values {
                for y in 0..64 {
                    assert_eq!(
                        fold(op, x, y),
                        IrInstr::Move {
                            dest: Local::Temp(0),
                            value: Operand::Literal(reference(op, x, y)),
                        },
                        "{} {} {}",
                        x,
                        op,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_asr_keeps_sign_slr_does_not() {
        assert_eq!(fold(ArithOp::Asr, -8, 1).to_string(), "%tmp.0 = MV #-4");
        assert_eq!(
            fold(ArithOp::Slr, -8, 1).to_string(),
            format!("%tmp.0 = MV #{}", (u64::MAX - 7) >> 1)
        );
    }

    #[test]
    fn test_undefined_results_are_not_folded() {
        for (op, y) in [
            (ArithOp::Div, 0),
            (ArithOp::Mod, 0),
            (ArithOp::Sll, 64),
            (ArithOp::Asr, -1),
        ] {
            assert!(matches!(fold(op, 5, y), IrInstr::Arithmetic { .. }));
        }
    }

    #[test]
    fn test_straight_line_scenario() {
        let module = optimize("int f(){ return 2+3*4; }");
        assert_eq!(
            module.functions[0].pretty_print(),
            "function f() {\nentry:\n\t%tmp.1 = MV #14\n\tRET %tmp.1\n}\n"
        );
    }

    #[test]
    fn test_unary_and_shift_chain_folds() {
        let module = optimize("long f(){ return (~0 << 4) >> 2; }");
        let text = module.functions[0].pretty_print();
        assert!(text.contains(" = MV #-4\n"), "{}", text);
        assert_eq!(module.functions[0].instruction_count(), 2);
    }
}

// =============================================================================
// FIXED POINT
// =============================================================================

mod fixed_point {
    use super::*;

    const PROGRAMS: [&str; 4] = [
        "int f(int x) { return x * 4 + 2 * 8 - 6 / 2; }",
        "int f(int x) { int y = 3 * 3; while (x) { x = x / 16; y = y + 1 * 2; } return y; }",
        "int g; int f(int x) { if (x * 2) g = 1 << 3; else g = 10 % 4; return g; }",
        "int f(int n) { int s = 0; for (int i = 0; i < n * 32; i++) s = s + i * 1; return s; }",
    ];

    #[test]
    fn test_second_run_changes_nothing() {
        for source in PROGRAMS {
            let mut module = optimize(source);
            let once = module.pretty_print();
            let stats = Optimizer::basic().optimize(&mut module);
            assert!(!stats.changed(), "{}", source);
            assert_eq!(module.pretty_print(), once, "{}", source);
        }
    }

    #[test]
    fn test_optimized_functions_stay_valid() {
        for source in PROGRAMS {
            for func in &optimize(source).functions {
                assert!(func.validate().is_ok(), "{}", source);
            }
        }
    }

    #[test]
    fn test_none_level_is_identity() {
        for source in PROGRAMS {
            let mut module = lower(source);
            let before = module.pretty_print();
            Optimizer::none().optimize(&mut module);
            assert_eq!(module.pretty_print(), before);
        }
    }
}
