use rand::{rngs::StdRng, SeedableRng};
use skipgram::{
    build_vocabulary, clean_words, generate_batch, train, BatchState, Error, SkipGramBatcher,
    SkipGramParams, TrainParams,
};

const TEXT: &str = "Today we will be learning about the fundamentals of data science and statistics. Data Science and statistics are hot and growing fields with alternative names of machine learning, artificial intelligence, big data, etc. I'm really excited to talk to you about data science and statistics because data science and statistics have long been a passions of mine. I didn't used to be very good at data science and statistics but after studying data science and statistics for a long time, I got better and better at it until I became a data science and statistics expert. I'm really excited to talk to you about data science and statistics, thanks for listening to me talk about data science and statistics.";

#[test]
fn test_vocabulary_from_text() {
    let words = clean_words(TEXT, false);
    let dataset = build_vocabulary(&words, 10).unwrap();

    assert_eq!(dataset.encoded.len(), words.len());
    assert_eq!(dataset.vocab_len(), 10);
    assert_eq!(dataset.token_of(1), Some("and"));
    assert!(dataset.encoded.iter().all(|&id| id < 10));
    let unknown = dataset.encoded.iter().filter(|&&id| id == 0).count();
    assert_eq!(dataset.frequencies[0].1, unknown);
    let counts: Vec<usize> = dataset.frequencies[1..].iter().map(|(_, c)| *c).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_batches_cycle_through_corpus() {
    let words = clean_words(TEXT, true);
    let dataset = build_vocabulary(&words, 30).unwrap();
    let params = SkipGramParams::new(16, 4, 2);
    let mut batcher =
        SkipGramBatcher::new(&dataset.encoded, params, StdRng::seed_from_u64(8)).unwrap();

    // more windows than words, the cursor has to wrap
    let steps = dataset.encoded.len() / 4 + 3;
    for _ in 0..steps {
        let batch = batcher.next_batch().unwrap();
        assert_eq!(batch.len(), 16);
        for block in batch.inputs.chunks(4) {
            assert!(block.iter().all(|&i| i == block[0]));
        }
        assert!(batch.labels.iter().all(|&l| (l as usize) < dataset.vocab_len()));
    }
    assert!(batcher.state().cursor() < dataset.encoded.len());
}

#[test]
fn test_independent_streams() {
    let words = clean_words(TEXT, false);
    let dataset = build_vocabulary(&words, 50).unwrap();
    let params = SkipGramParams::new(8, 2, 1);

    let mut first = BatchState::new();
    let mut second = BatchState::new();
    let mut rng_a = StdRng::seed_from_u64(21);
    let mut rng_b = StdRng::seed_from_u64(21);

    let a = generate_batch(&dataset.encoded, &params, &mut first, &mut rng_a).unwrap();
    generate_batch(&dataset.encoded, &params, &mut first, &mut rng_a).unwrap();
    let b = generate_batch(&dataset.encoded, &params, &mut second, &mut rng_b).unwrap();
    assert_eq!(a, b);
    assert_ne!(first.cursor(), second.cursor());

    let invalid = SkipGramParams::new(8, 3, 2);
    let before = second.clone();
    let result = generate_batch(&dataset.encoded, &invalid, &mut second, &mut rng_b);
    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(second, before);
}

#[test]
fn test_train() {
    let words = clean_words(TEXT, true);
    let dataset = build_vocabulary(&words, 40).unwrap();
    let params = TrainParams::default()
        .set_embedding_size(3)
        .set_num_sampled(5)
        .set_steps(30)
        .set_log_every(10)
        .set_valid_every(10)
        .set_valid_size(4)
        .set_top_k(3);
    let mut rng = StdRng::seed_from_u64(2);

    let embeddings = train(&dataset, &SkipGramParams::new(16, 2, 1), &params, &mut rng).unwrap();

    let normalized = embeddings.normalized();
    let exported = embeddings.export(&dataset.reverse_vocab, &normalized);
    assert_eq!(exported.len(), dataset.vocab_len());
    assert_eq!(exported[0].word, "UNK");
    let json = serde_json::to_string(&exported).unwrap();
    assert!(json.contains("\"embedding\""));
}
