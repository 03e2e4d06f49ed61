use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nearsim::{run, Method, NearsimConfig, SimilarityMode};
use tracing_subscriber::EnvFilter;

/// Find near-duplicate document pairs with MinHash + LSH or brute force.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    method: Option<Method>,

    /// Corpus file, one `<id>\t<text>` or JSON document per line
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Destination of the similar pairs CSV
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Destination of the signature table (lsh only)
    #[arg(long)]
    signatures_file: Option<PathBuf>,

    /// Reference pairs to evaluate against
    #[arg(long)]
    test_file: Option<PathBuf>,

    #[arg(long)]
    num_hashes: Option<usize>,

    #[arg(long)]
    num_bands: Option<usize>,

    #[arg(long)]
    num_buckets: Option<u64>,

    #[arg(long)]
    num_shingles: Option<u64>,

    #[arg(long)]
    shingle_length: Option<usize>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_documents: Option<usize>,

    /// Use the rayon pool for signatures, bands and brute-force rows
    #[arg(long)]
    parallel: bool,

    /// Score candidates by aligned signature positions
    #[arg(long)]
    positional: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn into_config(self) -> Result<NearsimConfig> {
        let from_file = self.config.is_some();
        let mut config = match &self.config {
            Some(path) => NearsimConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NearsimConfig::default(),
        };

        if let Some(method) = self.method {
            config.method = method;
        }
        if !from_file
            && config.method == Method::Lsh
            && (self.num_hashes.is_none() || self.num_bands.is_none())
        {
            bail!("--num-hashes and --num-bands are required for the lsh method");
        }
        if let Some(value) = self.data_file {
            config.corpus.data_file = value;
        }
        if let Some(value) = self.output_file {
            config.output.pairs_file = value;
        }
        if let Some(value) = self.signatures_file {
            config.output.signatures_file = Some(value);
        }
        if let Some(value) = self.test_file {
            config.output.test_file = Some(value);
        }
        if let Some(value) = self.num_hashes {
            config.search.num_hashes = value;
        }
        if let Some(value) = self.num_bands {
            config.search.num_bands = value;
        }
        if let Some(value) = self.num_buckets {
            config.search.num_buckets = value;
        }
        if let Some(value) = self.num_shingles {
            config.search.num_shingles = value;
        }
        if let Some(value) = self.shingle_length {
            config.corpus.shingle_length = value;
        }
        if let Some(value) = self.threshold {
            config.search.threshold = value;
        }
        if let Some(value) = self.seed {
            config.search.seed = value;
        }
        if self.max_documents.is_some() {
            config.search.max_documents = self.max_documents;
        }
        if self.parallel {
            config.search.use_parallel = true;
        }
        if self.positional {
            config.search.similarity = SimilarityMode::Positional;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = args.into_config()?;
    let report = run(&config).context("nearsim run failed")?;

    println!(
        "found {} similar pairs among {} documents in {:.3}s, saved to '{}'",
        report.pairs,
        report.documents,
        report.search_millis as f64 / 1000.0,
        config.output.pairs_file.display()
    );
    if let Some(eval) = report.evaluation {
        println!(
            "TP: {}, FP: {}, FN: {}, precision: {:.4}, recall: {:.4}, F1: {:.4}",
            eval.true_positives,
            eval.false_positives,
            eval.false_negatives,
            eval.precision,
            eval.recall,
            eval.f1
        );
    }
    Ok(())
}
