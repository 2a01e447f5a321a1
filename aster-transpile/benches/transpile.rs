use aster_parser::parser::Parser;
use aster_transpile::transpile::transpile_to_string;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn many_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile-many-functions");

    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "fn f{}(a: i32, b: *i32): i32 {{\n    let mut x: i32 = a + *b\n    while x < 10 : x = x + 1 {{ next }}\n    return match x {{ 1 => 2, else => x as i32 }}\n}}\n",
            i
        ));
    }
    let source = source.as_str().into();
    let program = Parser::new(&source).parse_program();
    assert!(source.has_no_errors());

    group.throughput(Throughput::Elements(200));
    group.bench_function("transpile-many-functions", |b| {
        b.iter(|| transpile_to_string(&program))
    });
}

criterion_group!(benches, many_functions);
criterion_main!(benches);
