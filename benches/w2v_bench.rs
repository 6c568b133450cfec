use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId,
    Criterion,
};
use pprof::criterion::{Output, PProfProfiler};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;
use skipgram::{build_vocabulary, train_step, Embeddings, SkipGramBatcher, SkipGramParams, TrainParams};

fn set_default_benchmark_configs(benchmark: &mut BenchmarkGroup<WallTime>) {
    let sample_size: usize = 100;
    let measurement_time: Duration = Duration::new(10, 0);
    let confidence_level: f64 = 0.97;
    let warm_up_time: Duration = Duration::new(3, 0);
    let noise_threshold: f64 = 0.05;

    benchmark
        .sample_size(sample_size)
        .measurement_time(measurement_time)
        .confidence_level(confidence_level)
        .warm_up_time(warm_up_time)
        .noise_threshold(noise_threshold);
}

/// Zipf-ish synthetic corpus so the vocabulary cut actually bites.
fn get_corpus(len: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..len)
        .map(|_| {
            let rank = (1.0 / rng.gen_range(0.0001f64..1.0)) as usize;
            format!("w{rank}")
        })
        .collect()
}

fn bench(c: &mut Criterion) {
    let mut benchmark = c.benchmark_group("w2v");
    set_default_benchmark_configs(&mut benchmark);

    let words = get_corpus(200_000);
    let dataset = build_vocabulary(&words, 5_000).unwrap();

    benchmark.bench_function(BenchmarkId::new("Build vocabulary", "200k"), |bencher| {
        bencher.iter(|| build_vocabulary(black_box(words.as_slice()), 5_000).unwrap());
    });

    for (num_skips, skip_window) in [(2, 1), (4, 2)] {
        let params = SkipGramParams::new(128, num_skips, skip_window);
        let mut batcher =
            SkipGramBatcher::new(&dataset.encoded, params, StdRng::seed_from_u64(1)).unwrap();
        benchmark.bench_function(
            BenchmarkId::new("Generate batch", format!("skips-{num_skips}-window-{skip_window}")),
            |bencher| {
                bencher.iter(|| batcher.next_batch().unwrap());
            },
        );
    }

    let train_params = TrainParams::default()
        .set_embedding_size(128)
        .set_num_sampled(64);
    let mut rng = StdRng::seed_from_u64(2);
    let mut embeddings = Embeddings::new(dataset.vocab_len(), train_params.embedding_size(), &mut rng);
    let vocab_indices: Vec<u32> = (0..dataset.vocab_len() as u32).collect();
    let mut batcher =
        SkipGramBatcher::new(&dataset.encoded, SkipGramParams::default(), StdRng::seed_from_u64(3))
            .unwrap();
    benchmark.bench_function(BenchmarkId::new("Train step", "dim-128"), |bencher| {
        bencher.iter(|| {
            let batch = batcher.next_batch().unwrap();
            train_step(&mut embeddings, &batch, &train_params, &vocab_indices, &mut rng).unwrap()
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(500, Output::Flamegraph(None)));
    targets = bench
}

criterion_main!(benches);
