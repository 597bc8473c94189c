//! Benchmarks for typing through the action layer.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use penmark::editor::{Editor, Grammar};

fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("    let value_{i} = compute({i}, \"text\");  "))
        .collect()
}

fn bench_typing_burst(c: &mut Criterion) {
    let text = "the quick brown fox jumps over the lazy dog ".repeat(8);
    c.bench_function("typing_burst", |b| {
        b.iter(|| {
            let mut editor = Editor::new(sample_lines(50));
            editor.cursor_move_to(25, 4);
            for ch in black_box(&text).chars() {
                editor.insert_printable(ch);
            }
            editor
        });
    });
}

fn bench_carriage_returns(c: &mut Criterion) {
    c.bench_function("carriage_returns", |b| {
        b.iter(|| {
            let mut editor =
                Editor::new(sample_lines(50)).with_grammar(Grammar::with_indent("rust", "    "));
            for row in 0..black_box(40) {
                editor.cursor_move_to(row * 2, 12);
                editor.carriage_return();
            }
            editor
        });
    });
}

fn bench_strip_trailing_whitespace(c: &mut Criterion) {
    c.bench_function("strip_trailing_whitespace", |b| {
        b.iter(|| {
            let mut editor = Editor::new(sample_lines(black_box(500)));
            editor.strip_trailing_whitespace();
            editor
        });
    });
}

criterion_group!(
    benches,
    bench_typing_burst,
    bench_carriage_returns,
    bench_strip_trailing_whitespace
);
criterion_main!(benches);
