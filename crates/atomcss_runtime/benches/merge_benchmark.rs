use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use atomcss_compiler::{CompilationContext, CompilerConfig, Declaration};
use atomcss_runtime::{merge, CompiledStyleObject};

fn criterion_benchmark(c: &mut Criterion) {
  let context = CompilationContext::new(CompilerConfig::default()).unwrap();
  let button = context
    .compile(
      &Declaration::new()
        .property("color", "white")
        .property("backgroundColor", "#0052cc")
        .property("padding", 8)
        .property("borderRadius", 3)
        .scope(":hover", Declaration::new().property("backgroundColor", "#0065ff"))
        .scope(":focus-visible", Declaration::new().property("outline", "2px solid"))
        .scope(
          "@media (min-width: 600px)",
          Declaration::new().property("padding", 12),
        ),
    )
    .unwrap()
    .compiled;
  let danger = context
    .compile(
      &Declaration::new()
        .property("backgroundColor", "#de350b")
        .scope(":hover", Declaration::new().property("backgroundColor", "#ff5630")),
    )
    .unwrap()
    .compiled;
  let width = context
    .compile(&Declaration::new().dynamic("width", "props.width"))
    .unwrap()
    .compiled
    .bind([("props.width", 240)])
    .unwrap();

  c.bench_function("merge two styles", |b| {
    b.iter(|| merge![black_box(&button), black_box(&danger)].unwrap())
  });

  c.bench_function("merge with absent and dynamic inputs", |b| {
    b.iter(|| {
      merge![
        black_box(&button),
        black_box(None::<&CompiledStyleObject>),
        black_box(Some(&danger)),
        black_box(&width)
      ]
      .unwrap()
    })
  });

  let resolved = merge![&button, &danger].unwrap();
  c.bench_function("merge a resolved style", |b| {
    b.iter(|| merge![black_box(&resolved), black_box(&width)].unwrap())
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
