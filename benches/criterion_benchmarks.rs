use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxidiff::codec::{self, DiffOptions};
use oxidiff::index::SuffixIndex;
use oxidiff::{apply_patch, create_patch};
use std::fs;
use std::io::Cursor;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

fn mutate(base: &[u8], stride: usize) -> Vec<u8> {
    let mut out = base.to_vec();
    for i in (0..out.len()).step_by(stride.max(1)) {
        out[i] = out[i].wrapping_add(1);
    }
    out
}

fn create_at_level(old: &[u8], new: &[u8], level: u32) -> Vec<u8> {
    let mut patch = Cursor::new(Vec::new());
    codec::create(old, new, &mut patch, &DiffOptions { level }).unwrap();
    patch.into_inner()
}

fn write_ratio_snapshot() {
    let old = gen_data(2 * 1024 * 1024, 123);
    let new = mutate(&old, 4096);
    let mut csv = String::from("level,patch_bytes,new_bytes,ratio\n");
    for level in 1u32..=9 {
        let patch = create_at_level(&old, &new, level);
        let ratio = patch.len() as f64 / new.len() as f64;
        csv.push_str(&format!("{level},{},{},{}\n", patch.len(), new.len(), ratio));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn write_compare_snapshot() {
    let old = gen_data(1024 * 1024, 8);
    let new = mutate(&old, 1024);
    let ours = create_patch(&old, &new).unwrap();
    let mut theirs = Vec::new();
    qbsdiff::Bsdiff::new(&old, &new)
        .compare(Cursor::new(&mut theirs))
        .unwrap();
    let report = format!(
        "workload,old_bytes,new_bytes,oxidiff_patch_bytes,qbsdiff_patch_bytes\ncreate_compare,{},{},{},{}\n",
        old.len(),
        new.len(),
        ours.len(),
        theirs.len()
    );
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("qbsdiff_compare.csv"), report);
}

fn bench_suffix_sort(c: &mut Criterion) {
    let mut g = c.benchmark_group("suffix_sort");
    for size in [64 * 1024usize, 1024 * 1024, 4 * 1024 * 1024] {
        let old = gen_data(size, 11);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let index = SuffixIndex::new(black_box(&old));
                black_box(index.len());
            });
        });
    }
    g.finish();
}

fn bench_create_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("create_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let old = gen_data(size, 1);
        let new = mutate(&old, 1024);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let patch = create_patch(black_box(&old), black_box(&new)).unwrap();
                black_box(patch);
            });
        });
    }
    g.finish();
}

fn bench_apply_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("apply_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let old = gen_data(size, 2);
        let new = mutate(&old, 2048);
        let patch = create_patch(&old, &new).unwrap();
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = apply_patch(black_box(&old), black_box(&patch)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_ratio_vs_level(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("patch_ratio_vs_level");
    let old = gen_data(2 * 1024 * 1024, 3);
    let new = mutate(&old, 4096);
    for level in [1u32, 5, 9] {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| {
                let patch = create_at_level(&old, &new, *level);
                black_box(patch.len() as f64 / new.len() as f64);
            });
        });
    }
    g.finish();
}

fn bench_qbsdiff_compare(c: &mut Criterion) {
    write_compare_snapshot();
    let mut g = c.benchmark_group("oxidiff_vs_qbsdiff_create");
    let old = gen_data(1024 * 1024, 8);
    let new = mutate(&old, 1024);

    g.bench_function("oxidiff_create", |b| {
        b.iter(|| {
            let p = create_patch(black_box(&old), black_box(&new)).unwrap();
            black_box(p);
        });
    });

    g.bench_function("qbsdiff_create", |b| {
        b.iter(|| {
            let mut p = Vec::new();
            qbsdiff::Bsdiff::new(black_box(&old), black_box(&new))
                .compare(Cursor::new(&mut p))
                .unwrap();
            black_box(p);
        });
    });
    g.finish();
}

fn bench_real_world_scenarios(c: &mut Criterion) {
    let mut g = c.benchmark_group("real_world_scenarios");
    let scenarios = [
        ("software_update", 4 * 1024 * 1024usize, 1024usize),
        ("document_versioning", 512 * 1024usize, 256usize),
        ("database_snapshot", 8 * 1024 * 1024usize, 4096usize),
    ];

    for (name, size, stride) in scenarios {
        let old = gen_data(size, size as u64);
        let new = mutate(&old, stride);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_function(name, |b| {
            b.iter(|| {
                let patch = create_patch(&old, &new).unwrap();
                let out = apply_patch(&old, &patch).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_suffix_sort,
    bench_create_speed,
    bench_apply_speed,
    bench_ratio_vs_level,
    bench_qbsdiff_compare,
    bench_real_world_scenarios
);
criterion_main!(benches);
