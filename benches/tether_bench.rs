// benches/tether_bench.rs
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use tether::core::{
    DEFAULT_PATH_LENGTH_LIMIT, IgnoreSet, build_file_contents, classify_path,
    collect_all_files, render_file_tree, scan_root_to_node,
};

// ---------- Fixture: synthetic repo tree we reuse across benches ----------
static FS_FIXTURE: Lazy<Fixture> = Lazy::new(|| {
    let tmp = TempDir::new().expect("tmp");
    let root = tmp.path().to_path_buf();

    let dirs = &[
        "src", "src/codec", "src/ui", "tests", "docs", "vendor/dep1", "vendor/dep2",
        "assets/images", "scripts", "src/gen",
    ];
    for d in dirs {
        fs::create_dir_all(root.join(d)).unwrap();
    }

    let files = [
        ("src/lib.rs", "pub mod core;"),
        ("src/codec/frame.rs", "fn f() {}"),
        ("src/ui/app.rs", "mod ui;"),
        ("tests/core_tests.rs", "/* tests */"),
        ("docs/intro.md", "# intro"),
        ("scripts/build.sh", "#!/usr/bin/env bash\necho hi"),
        ("vendor/dep1/lib.c", "int main(){}"),
        ("vendor/dep2/lib.cpp", "int main(){}"),
        ("README.md", "# readme\n"),
    ];
    for (rel, body) in files {
        write_file(&root.join(rel), body);
    }

    // Generate many small files to stress scan/render
    for i in 0..1200 {
        write_file(&root.join(format!("src/gen/file_{i:04}.rs")), "fn f(){}\n");
    }

    let all_files: Vec<PathBuf> = WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    Fixture {
        _tmp: tmp,
        root,
        all_files,
    }
});

struct Fixture {
    _tmp: TempDir, // keep alive
    root: PathBuf,
    all_files: Vec<PathBuf>,
}

fn write_file(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn bench_classify(c: &mut Criterion) {
    let paths = [
        "ftp://mirror.example.org/pub/src",
        r"\\nas\projects\deep\tree",
        "/usr/share/doc",
        "/definitely/not/here",
    ];

    c.bench_function("classify_path_mixed", |b| {
        b.iter(|| {
            for p in paths {
                black_box(classify_path(black_box(p), DEFAULT_PATH_LENGTH_LIMIT));
            }
        });
    });
}

fn bench_ignore_matching(c: &mut Criterion) {
    let fx = &*FS_FIXTURE;
    let ignores = IgnoreSet::compile(&[
        "vendor".to_string(),
        "*.md".to_string(),
        "assets".to_string(),
        "build[0-9]".to_string(),
    ]);

    let rels: Vec<(String, String)> = fx
        .all_files
        .iter()
        .map(|p| {
            let rel = p.strip_prefix(&fx.root).unwrap();
            (
                rel.to_string_lossy().replace('\\', "/"),
                rel.file_name().unwrap().to_string_lossy().to_string(),
            )
        })
        .collect();

    let mut group = c.benchmark_group("ignore");
    group.throughput(Throughput::Elements(rels.len() as u64));
    group.bench_function("matches_all_files", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for (rel, base) in &rels {
                if ignores.matches(black_box(rel), black_box(base)) {
                    hits += 1;
                }
            }
            black_box(hits)
        });
    });
    group.finish();
}

fn bench_scan_and_render(c: &mut Criterion) {
    let fx = &*FS_FIXTURE;
    let ignores = IgnoreSet::compile(&["vendor".to_string(), "assets".to_string()]);

    c.bench_function("scan_root_to_node", |b| {
        b.iter(|| black_box(scan_root_to_node(&fx.root, &ignores)));
    });

    let node = scan_root_to_node(&fx.root, &ignores);
    let roots = vec![node];
    c.bench_function("render_file_tree", |b| {
        b.iter(|| black_box(render_file_tree(black_box(&roots))));
    });

    let files = collect_all_files(&roots);
    c.bench_function("build_file_contents", |b| {
        b.iter(|| black_box(build_file_contents(black_box(&files), false)));
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_ignore_matching,
    bench_scan_and_render
);
criterion_main!(benches);
