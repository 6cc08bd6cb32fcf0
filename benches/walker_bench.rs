//! Benchmarks for par-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

fn make_tree(root: &Path, dirs: usize, files_per_dir: usize) {
    for d in 0..dirs {
        let dir = root.join(format!("dir{:03}", d)).join("nested");
        std::fs::create_dir_all(&dir).unwrap();
        for f in 0..files_per_dir {
            std::fs::write(dir.join(format!("file{:04}.dat", f)), b"x").unwrap();
        }
    }
}

fn benchmark_read_and_decode(c: &mut Criterion) {
    use par_walker::fs::{DirentBuf, RawDir};

    let dir = tempfile::tempdir().unwrap();
    for i in 0..2000 {
        std::fs::write(dir.path().join(format!("entry{:05}", i)), b"").unwrap();
    }

    c.bench_function("read_decode_2000_entries", |b| {
        let mut buf = DirentBuf::new(8 << 10);
        let mut names = Vec::with_capacity(2000);

        b.iter(|| {
            let mut raw = RawDir::open(dir.path()).unwrap();
            names.clear();
            while raw.read_batch(&mut buf).unwrap() > 0 {
                while !buf.is_drained() {
                    buf.decode(100, &mut names).unwrap();
                }
            }
            black_box(names.len());
        })
    });
}

fn benchmark_walk(c: &mut Criterion) {
    use par_walker::{Visit, WalkOptions, Walker};
    use std::sync::atomic::{AtomicU64, Ordering};

    let dir = tempfile::tempdir().unwrap();
    make_tree(dir.path(), 64, 50);

    for limit in [4, 16] {
        let walker = Walker::new(WalkOptions::new().with_limit(limit));
        c.bench_function(&format!("walk_64x50_limit_{}", limit), |b| {
            b.iter(|| {
                let count = AtomicU64::new(0);
                walker
                    .walk(dir.path(), |_, _| {
                        count.fetch_add(1, Ordering::Relaxed);
                        Ok(Visit::Continue)
                    })
                    .unwrap();
                black_box(count.into_inner());
            })
        });
    }
}

criterion_group!(benches, benchmark_read_and_decode, benchmark_walk);
criterion_main!(benches);
