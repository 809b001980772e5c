//! Benchmarks for the SID filter hot path
//!
//! Run with: cargo bench --bench filter

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use sid_filter::{ChipModel, ControlPointTable, CutoffTable, Filter};

fn playing_filter(model: ChipModel) -> Filter {
    let mut filter = Filter::new(model);
    filter.write_register(0x15, 0x03); // FC low bits
    filter.write_register(0x16, 0x60); // FC high bits
    filter.write_register(0x17, 0x87); // Resonance 8, voices 1-3 filtered
    filter.write_register(0x18, 0x1f); // Lowpass, volume 15
    filter
}

fn bench_clock_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock");

    let mut filter = playing_filter(ChipModel::Mos6581);

    for iterations in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            iterations,
            |b, &iterations| {
                b.iter(|| {
                    for i in 0..iterations {
                        let v = ((i & 0xff) - 0x80) << 12;
                        filter.clock(v, v >> 1, 0, 0);
                        black_box(filter.output());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_clock_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock_delta");

    let mut filter = playing_filter(ChipModel::Mos8580);

    // Cycles per output sample at 44.1 kHz and 22.05 kHz, plus a full frame.
    for delta in [22u32, 45, 19656].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(delta), delta, |b, &delta| {
            b.iter(|| {
                filter.clock_delta(black_box(delta), 0x40000, 0x20000, 0, 0);
                black_box(filter.output());
            });
        });
    }

    group.finish();
}

fn bench_register_updates(c: &mut Criterion) {
    let mut filter = Filter::new(ChipModel::Mos6581);

    c.bench_function("write_register", |b| {
        b.iter(|| {
            filter.write_register(black_box(0x15), black_box(0x07));
            filter.write_register(black_box(0x16), black_box(0x7f));
            filter.write_register(black_box(0x17), black_box(0xf1));
            filter.write_register(black_box(0x18), black_box(0x1f));
        });
    });
}

fn bench_table_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("cutoff_table");

    for model in [ChipModel::Mos6581, ChipModel::Mos8580] {
        let curve: ControlPointTable = model.control_points();
        group.bench_with_input(
            BenchmarkId::from_parameter(model),
            &curve,
            |b, curve| {
                b.iter(|| black_box(CutoffTable::from_points(curve)));
            },
        );
    }

    let mut filter = Filter::new(ChipModel::Mos6581);
    group.bench_function("set_chip_model", |b| {
        b.iter(|| {
            filter.set_chip_model(black_box(ChipModel::Mos8580));
            filter.set_chip_model(black_box(ChipModel::Mos6581));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_clock_iterations,
    bench_clock_delta,
    bench_register_updates,
    bench_table_rebuild
);
criterion_main!(benches);
