//! VM execution throughput benchmarks.
//!
//! Run with: `cargo bench --package pb-vm`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pb_codegen::lower_program;
use pb_parse::Parser;
use pb_vm::{TestIo, Vm};

const LOOP_PROGRAM: &str = "LET B BE 0\n\
top:\n\
 LET B BE B + 1\n\
 IF B < 1000 THEN GOTO top\n\
END\n";

fn bench_run_loop_program(c: &mut Criterion) {
    let ast = Parser::parse_program(LOOP_PROGRAM).unwrap();
    let out = lower_program(&ast).unwrap();
    c.bench_function("run_loop_program", |b| {
        b.iter(|| {
            let mut vm = Vm::new(TestIo::default());
            vm.load(black_box(out.code.clone()), out.strings.clone());
            vm.run().unwrap();
        })
    });
}

criterion_group!(benches, bench_run_loop_program);
criterion_main!(benches);
