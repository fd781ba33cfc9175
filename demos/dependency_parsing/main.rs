use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rudep::corpus::{self, CorpusReader};
use rudep::evaluate::evaluate;
use rudep::pruning::{CandidateFilter, TagPairPruner};
use rudep::{FeatureTemplate, LabeledSentence, Model, Trainer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Features {
    Basic,
    Complex,
}

#[derive(Parser, Debug)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trains a model from a labeled corpus
    Train {
        /// Path to the labeled corpus
        #[clap(long, value_parser)]
        corpus: PathBuf,

        /// Path to the output model file
        #[clap(long, value_parser)]
        model: PathBuf,

        /// Number of epochs
        #[clap(long, default_value = "10")]
        epochs: usize,

        /// Feature template
        #[clap(long, value_enum, default_value = "basic")]
        features: Features,

        /// Drops candidate edges longer than this
        #[clap(long)]
        max_distance: Option<usize>,

        /// Prunes candidate edges with the English tag-pair rules
        #[clap(long)]
        prune: bool,

        /// Seed of the per-epoch shuffle
        #[clap(long, default_value = "0")]
        seed: u64,

        /// Number of threads for feature extraction
        #[clap(long, default_value = "1")]
        n_threads: usize,
    },

    /// Reports the unlabeled attachment score on a labeled corpus
    Eval {
        /// Path to the model file
        #[clap(long, value_parser)]
        model: PathBuf,

        /// Path to the labeled corpus
        #[clap(long, value_parser)]
        corpus: PathBuf,
    },

    /// Writes the corpus with predicted heads
    Predict {
        /// Path to the model file
        #[clap(long, value_parser)]
        model: PathBuf,

        /// Path to the input corpus
        #[clap(long, value_parser)]
        corpus: PathBuf,

        /// Path to the output file
        #[clap(long, value_parser)]
        output: PathBuf,
    },
}

fn read_labeled(path: &Path) -> Result<Vec<LabeledSentence>, Box<dyn std::error::Error>> {
    let f = BufReader::new(File::open(path)?);
    let mut sentences = vec![];
    for (i, sentence) in CorpusReader::labeled(f).enumerate() {
        match sentence {
            Ok(sentence) => sentences.push(sentence),
            Err(e) => log::warn!("skipped sentence {i}: {e}"),
        }
    }
    log::info!("# of sentences: {}", sentences.len());
    Ok(sentences)
}

fn load_model(path: &Path) -> Result<Model, Box<dyn std::error::Error>> {
    let mut f = zstd::Decoder::new(File::open(path)?)?;
    let model = bincode::decode_from_std_read(&mut f, bincode::config::standard())?;
    Ok(model)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Train {
            corpus,
            model,
            epochs,
            features,
            max_distance,
            prune,
            seed,
            n_threads,
        } => {
            let sentences = read_labeled(&corpus)?;
            let mut filter = CandidateFilter::new();
            if let Some(max_distance) = max_distance {
                filter = filter.max_distance(max_distance)?;
            }
            if prune {
                filter = filter.tag_pairs(TagPairPruner::english());
            }
            let template = match features {
                Features::Basic => FeatureTemplate::Basic,
                Features::Complex => FeatureTemplate::complex(),
            };
            let trainer = Trainer::new()
                .epochs(epochs)?
                .seed(seed)
                .features(template)
                .filter(filter)
                .n_threads(n_threads)?;
            let trained = trainer.train(&sentences)?;

            let score = evaluate(&trained, &sentences)?;
            log::info!(
                "training accuracy: {:.4} ({}/{})",
                score.accuracy(),
                score.correct,
                score.total
            );

            let mut f = zstd::Encoder::new(File::create(model)?, 19)?;
            bincode::encode_into_std_write(&trained, &mut f, bincode::config::standard())?;
            f.finish()?;
        }
        Command::Eval { model, corpus } => {
            let model = load_model(&model)?;
            let sentences = read_labeled(&corpus)?;
            let score = evaluate(&model, &sentences)?;
            println!(
                "accuracy: {:.4} ({}/{})",
                score.accuracy(),
                score.correct,
                score.total
            );
        }
        Command::Predict {
            model,
            corpus: corpus_path,
            output,
        } => {
            let model = load_model(&model)?;
            let f = BufReader::new(File::open(&corpus_path)?);
            let mut trees = vec![];
            for (i, sentence) in CorpusReader::unlabeled(f).enumerate() {
                let tree = sentence.and_then(|s| model.parse(&s));
                match tree {
                    Ok(tree) => trees.push(Some(tree)),
                    Err(e) => {
                        log::warn!("sentence {i} keeps its original heads: {e}");
                        trees.push(None);
                    }
                }
            }
            let input = BufReader::new(File::open(&corpus_path)?);
            let out = BufWriter::new(File::create(output)?);
            corpus::write_predictions(input, &trees, out)?;
        }
    }
    Ok(())
}
