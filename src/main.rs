use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use skipgram::{
    build_vocabulary, clean_words, generate_batch, read_text, read_words, train, BatchState, Dataset,
    SkipGramParams, TrainParams, WordEmbedding,
};

/// Train skip-gram word embeddings on a whitespace separated text corpus.
#[derive(Parser, Debug)]
#[command(name = "skipgram", version)]
struct Cli {
    /// Text corpus, e.g. an unpacked text8
    #[arg(long)]
    corpus: PathBuf,

    /// Vocabulary cap, the unknown bucket included
    #[arg(long, default_value_t = 50_000)]
    vocabulary_size: usize,

    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// How many times to reuse an input to generate a label
    #[arg(long, default_value_t = 2)]
    num_skips: usize,

    /// How many words to consider left and right
    #[arg(long, default_value_t = 1)]
    skip_window: usize,

    #[arg(long, default_value_t = 128)]
    embedding_size: usize,

    /// Negative examples per pair
    #[arg(long, default_value_t = 64)]
    num_sampled: usize,

    #[arg(long, default_value_t = 0.025)]
    learning_rate: f32,

    #[arg(long, default_value_t = 100_001)]
    steps: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Lowercase and strip punctuation before splitting
    #[arg(long)]
    clean: bool,

    /// Drop English stop words, implies --clean
    #[arg(long)]
    drop_stop_words: bool,

    #[arg(long, default_value = "embeddings.json")]
    output: PathBuf,
}

impl Cli {
    fn words(&self) -> Result<Vec<String>> {
        if self.clean || self.drop_stop_words {
            let text = read_text(&self.corpus)
                .with_context(|| format!("reading {}", self.corpus.display()))?;
            Ok(clean_words(&text, self.drop_stop_words))
        } else {
            read_words(&self.corpus).with_context(|| format!("reading {}", self.corpus.display()))
        }
    }
}

fn save_changes(file_path: &Path, values: &[WordEmbedding<'_>]) -> Result<()> {
    let file = open_or_create_file(file_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, values)?;
    writer.flush()?;
    Ok(())
}

fn open_or_create_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .with_context(|| format!("creating {}", file_path.display()))
}

fn show_batches(dataset: &Dataset, rng: &mut StdRng) -> Result<()> {
    tracing::info!(data = ?dataset.decode(&dataset.encoded[..dataset.encoded.len().min(16)]));
    for (num_skips, skip_window) in [(2, 1), (4, 2)] {
        let params = SkipGramParams::new(8, num_skips, skip_window);
        let batch = generate_batch(&dataset.encoded, &params, &mut BatchState::new(), rng)?;
        tracing::info!(
            num_skips,
            skip_window,
            batch = ?dataset.decode(&batch.inputs),
            labels = ?dataset.decode(&batch.labels),
            "Sample batch"
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skipgram=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let words = cli.words()?;
    tracing::info!("Data size {}", words.len());

    let dataset = build_vocabulary(&words, cli.vocabulary_size)?;
    drop(words);
    tracing::info!(
        "Most common words (+UNK) {:?}",
        &dataset.frequencies[..dataset.frequencies.len().min(5)]
    );
    tracing::info!(sample = ?&dataset.encoded[..dataset.encoded.len().min(10)], "Sample data");
    show_batches(&dataset, &mut rng)?;

    let batch_params = SkipGramParams::new(cli.batch_size, cli.num_skips, cli.skip_window);
    let train_params = TrainParams::default()
        .set_embedding_size(cli.embedding_size)
        .set_num_sampled(cli.num_sampled)
        .set_learning_rate(cli.learning_rate)
        .set_steps(cli.steps);
    let embeddings = train(&dataset, &batch_params, &train_params, &mut rng)?;

    let normalized = embeddings.normalized();
    save_changes(&cli.output, &embeddings.export(&dataset.reverse_vocab, &normalized))?;
    tracing::info!(path = %cli.output.display(), "Saved embeddings");
    Ok(())
}
