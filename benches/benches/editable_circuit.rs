// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use latchwork_editable::{CircuitConfig, EditableCircuit};
use latchwork_layout::LogicItemDefinition;
use latchwork_vocabulary::{InsertionMode, LogicItemType, OrderedLine, Point};

/// A row of gates with a bus of wires feeding them.
fn build_row(circuit: &mut EditableCircuit, gates: i16) {
    for i in 0..gates {
        let x = i * 6;
        circuit
            .add_logicitem(
                LogicItemDefinition::default_for(LogicItemType::AndElement),
                Point::new(x + 2, 0),
                InsertionMode::InsertOrDiscard,
            )
            .unwrap();
        circuit
            .add_wire_segment(
                OrderedLine::new(Point::new(x, 0), Point::new(x + 2, 0)),
                InsertionMode::InsertOrDiscard,
            )
            .unwrap();
    }
}

fn bench_insertions(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.bench_function("gate_row_64", |b| {
        b.iter_batched(
            || EditableCircuit::new(CircuitConfig::default()),
            |mut circuit| {
                build_row(&mut circuit, 64);
                circuit
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("wire_grid_32", |b| {
        b.iter_batched(
            || EditableCircuit::new(CircuitConfig::default()),
            |mut circuit| {
                // Crossing wires exercise the split/merge pipeline.
                for i in 0..32_i16 {
                    circuit
                        .add_wire_segment(
                            OrderedLine::new(Point::new(0, i * 2), Point::new(64, i * 2)),
                            InsertionMode::InsertOrDiscard,
                        )
                        .unwrap();
                }
                for i in 0..32_i16 {
                    circuit
                        .add_wire_segment(
                            OrderedLine::new(Point::new(i * 2, 0), Point::new(i * 2, 62)),
                            InsertionMode::InsertOrDiscard,
                        )
                        .unwrap();
                }
                circuit
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut circuit = EditableCircuit::new(CircuitConfig::default());
    build_row(&mut circuit, 128);

    let mut group = c.benchmark_group("query");
    group.bench_function("has_element", |b| {
        b.iter(|| {
            let mut hits = 0_u32;
            for i in 0..128 {
                let point = kurbo::Point::new(f64::from(i) * 6.0 + 2.5, 0.5);
                hits += u32::from(circuit.has_element(black_box(point)));
            }
            hits
        });
    });
    group.bench_function("query_line_segments", |b| {
        b.iter(|| {
            let mut found = 0_usize;
            for i in 0..128_i16 {
                found += circuit
                    .index()
                    .query_line_segments(black_box(Point::new(i * 6, 0)))
                    .len();
            }
            found
        });
    });
    group.finish();
}

fn bench_undo_redo(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    group.bench_function("undo_redo_row_16", |b| {
        b.iter_batched(
            || {
                let mut circuit = EditableCircuit::new(CircuitConfig::default());
                build_row(&mut circuit, 16);
                circuit.finish_undo_group();
                circuit
            },
            |mut circuit| {
                circuit.undo();
                circuit.redo();
                circuit
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insertions, bench_queries, bench_undo_redo);
criterion_main!(benches);
