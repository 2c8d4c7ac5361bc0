use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use vicinity::{Euclidean, LinearIndex, NoProgress, Params, Tree, VicinityCache};

const K: usize = 10;
const SEED: u64 = 0;
const N: usize = 10000;
const QUERIES: usize = 1000;

fn benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("knn");
    group.sample_size(10);

    group.bench_function("Build", |b| b.iter(bench_build));

    let points = dataset(N, SEED);
    let queries = dataset(QUERIES, SEED + 1);
    let tree = Tree::build(points.clone(), Euclidean, &params(), &mut NoProgress).unwrap();
    let linear = LinearIndex::new(points, Euclidean);

    group.bench_function("Tree", |b| b.iter(|| bench_tree(&tree, &queries)));
    group.bench_function("Vicinity", |b| b.iter(|| bench_vicinity(&tree, &queries)));
    group.bench_function("Linear", |b| b.iter(|| bench_linear(&linear, &queries)));
    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);

fn params() -> Params {
    Params::new(5).with_seed(SEED)
}

fn bench_build() {
    Tree::build(dataset(N, SEED), Euclidean, &params(), &mut NoProgress).unwrap();
}

fn bench_tree(tree: &Tree<[f64; 2], Euclidean>, queries: &[[f64; 2]]) {
    let mut searcher = tree.searcher();
    for query in queries {
        searcher.query(query, K).unwrap();
    }
}

// Every point is asked for twice, the second time with a smaller k
fn bench_vicinity(tree: &Tree<[f64; 2], Euclidean>, queries: &[[f64; 2]]) {
    let mut cache = VicinityCache::new(tree).with_min_k(K);
    for query in queries {
        cache.query(query, K).unwrap();
        cache.query(query, K / 2).unwrap();
    }
}

fn bench_linear(linear: &LinearIndex<[f64; 2], Euclidean>, queries: &[[f64; 2]]) {
    for query in queries {
        linear.query(query, K).unwrap();
    }
}

fn dataset(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| [rng.gen(), rng.gen()]).collect()
}
