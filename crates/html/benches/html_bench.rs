use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html::perf_fixtures::{make_blocks, make_nested};
use html::{
    RenderConfig, TokenStream, TreeBuilder, flatten_text, parse, render_to_string, tokenize,
};
use std::convert::identity;

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;
const NESTED_DEPTH: usize = 5_000;

fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri");
        body.push('<');
        body.push_str("pt");
    }
    body.push_str("</script>");
    body
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tree_build_large(c: &mut Criterion) {
    let tokens = tokenize(&make_blocks(LARGE_BLOCKS));
    c.bench_function("bench_tree_build_large", |b| {
        b.iter_batched(
            || TokenStream::new(tokens.clone()),
            |stream| {
                let nodes = TreeBuilder::new(stream).build_all(identity);
                black_box(nodes);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_parse_large_end_to_end(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_parse_large_end_to_end", |b| {
        b.iter(|| {
            let nodes = parse(black_box(&input));
            black_box(nodes);
        });
    });
}

fn bench_parse_deep_nesting(c: &mut Criterion) {
    let input = make_nested(NESTED_DEPTH);
    c.bench_function("bench_parse_deep_nesting", |b| {
        b.iter(|| {
            let nodes = parse(black_box(&input));
            black_box(nodes);
        });
    });
}

fn bench_render_large(c: &mut Criterion) {
    let nodes = parse(&make_blocks(LARGE_BLOCKS));
    let flat = RenderConfig::default();
    let indented = RenderConfig {
        indent: true,
        ..RenderConfig::default()
    };
    c.bench_function("bench_render_large", |b| {
        b.iter(|| black_box(render_to_string(&flat, black_box(&nodes)).len()));
    });
    c.bench_function("bench_render_large_indented", |b| {
        b.iter(|| black_box(render_to_string(&indented, black_box(&nodes)).len()));
    });
}

fn bench_flatten_large(c: &mut Criterion) {
    let nodes = parse(&make_blocks(LARGE_BLOCKS));
    c.bench_function("bench_flatten_large", |b| {
        b.iter(|| black_box(flatten_text(black_box(&nodes)).len()));
    });
}

fn bench_tokenize_rawtext_adversarial(c: &mut Criterion) {
    let input = make_rawtext_adversarial(512 * 1024);
    c.bench_function("bench_tokenize_rawtext_adversarial", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tree_build_large,
    bench_parse_large_end_to_end,
    bench_parse_deep_nesting,
    bench_render_large,
    bench_flatten_large,
    bench_tokenize_rawtext_adversarial
);
criterion_main!(benches);
