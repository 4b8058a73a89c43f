use bytecraft::{Format, Value};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_format(group_count: usize) -> Format {
    let mut format = String::from("B");

    for _ in 0..group_count {
        format.push_str("bhl(1 3 4)d");
    }

    Format::parse(&format).unwrap()
}

fn gen_values(group_count: usize) -> Vec<Value> {
    let mut values = Vec::with_capacity(group_count * 7);

    // Deterministic but non-trivial pattern
    for i in 0..group_count as i64 {
        values.extend([
            Value::Int(i * 31 % 256),
            Value::Int(i * 257 % 65536),
            Value::Int(i * 65599),
            Value::Int(i % 2),
            Value::Int(i % 8),
            Value::Int(i % 16),
            Value::Float(i as f64 * 0.5),
        ]);
    }

    values
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_repeated_100", |b| {
        b.iter(|| Format::parse("L100b100h100(4 4)[tag]").unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    for &group_count in &[1usize, 10, 50, 100] {
        let format = gen_format(group_count);
        let values = gen_values(group_count);
        let packet = format.pack(&values, None).unwrap();

        c.bench_function(&format!("pack_{}_groups", group_count), |b| {
            b.iter(|| {
                let _ = format.pack(&values, None).unwrap();
            })
        });

        c.bench_function(&format!("unpack_{}_groups", group_count), |b| {
            b.iter(|| {
                let _ = format.unpack(&packet, 0, None).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_parse, bench_codec);
criterion_main!(benches);
