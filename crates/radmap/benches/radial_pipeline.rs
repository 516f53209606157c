use criterion::{Criterion, criterion_group, criterion_main};
use radmap::render::{RadialLayoutOptions, RecordingSurface, RenderOptions, layout, render};
use radmap::{GenerateRequest, TemplateGenerator, TreeSource};
use std::hint::black_box;

fn bench_radial_pipeline(c: &mut Criterion) {
    // 1 + 5 + 25 + 100 + 400 + 1600 nodes.
    let request = GenerateRequest {
        topic: "Benchmark".to_string(),
        depth: 5,
        branches: 8,
    };
    let doc = TemplateGenerator.generate(&request).expect("generate");
    let root = doc.root().expect("root");
    let options = RadialLayoutOptions::default();

    let mut group = c.benchmark_group("radial");
    group.sample_size(50);

    group.bench_function("layout_wide_tree", |b| {
        b.iter(|| {
            let out = layout(black_box(root), 1920.0, 1080.0, &options).expect("layout");
            black_box(out.len());
        });
    });

    group.bench_function("layout_and_record", |b| {
        b.iter(|| {
            let out = layout(black_box(root), 1920.0, 1080.0, &options).expect("layout");
            let mut surface = RecordingSurface::new();
            let scene = render(&mut surface, &out);
            black_box(scene.segment_count);
        });
    });

    let render_options = RenderOptions::default();
    group.bench_function("layout_and_svg", |b| {
        b.iter(|| {
            let svg = radmap::render::layout_and_render_svg(black_box(&doc), &render_options)
                .expect("svg");
            black_box(svg.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_radial_pipeline);
criterion_main!(benches);
