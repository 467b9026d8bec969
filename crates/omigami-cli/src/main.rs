use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use omigami_cli::input::RunConfig;
use omigami_cli::run::{run_permutation, run_selection};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("OMIGAMI_LOG", "error,omigami=info"))
        .init();

    let matches = Command::new("omigami")
        .version(clap::crate_version!())
        .about("Omigami - feature selection by recursive elimination in double cross-validation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            selection_args(Command::new("select"))
                .about("Select the minimal, mid and maximal informative feature sets"),
        )
        .subcommand(
            selection_args(Command::new("permute"))
                .about("Test the selection against label-permuted copies of the data")
                .arg(
                    Arg::new("permutations")
                        .short('p')
                        .long("permutations")
                        .help("Number of label permutations (at least 2)")
                        .required(true)
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("select", sub_m)) => handle_select(sub_m),
        Some(("permute", sub_m)) => handle_permute(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn selection_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("data")
                .help("Path to the dataset (*.csv or *.tsv) with a header row")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("config")
                .help("Path to a JSON selection configuration file")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Name of the column holding the class labels")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("group")
                .short('g')
                .long("group")
                .help("Column of sample groups that must stay on one side of every split")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("id")
                .long("id")
                .help("Sample identifier column, excluded from the features")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .help("Model to rank features with. Overrides the configuration file.")
                .value_parser([
                    "rfc",
                    "random_forest",
                    "logreg",
                    "logistic",
                    "scaled_logreg",
                    "pipeline",
                    "plsc",
                    "pls",
                ]),
        )
        .arg(
            Arg::new("metric")
                .long("metric")
                .help("Scoring metric. Overrides the configuration file.")
                .value_parser([
                    "MISS",
                    "accuracy",
                    "balanced_accuracy",
                    "precision",
                    "recall",
                    "f1",
                    "precision_macro",
                    "recall_macro",
                    "f1_macro",
                    "matthews_corrcoef",
                ]),
        )
        .arg(
            Arg::new("n_outer")
                .long("n-outer")
                .help("Number of outer folds")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("n_inner")
                .long("n-inner")
                .help("Number of inner folds per outer fold")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("repetitions")
                .short('r')
                .long("repetitions")
                .help("Number of repetitions with fresh splits")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("dropout_rate")
                .long("dropout-rate")
                .help("Fraction of features dropped per elimination step")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("robust_minimum")
                .long("robust-minimum")
                .help("p-value above which a feature count counts as good as the best")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .help("Worker threads for outer folds; 1 runs them sequentially")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Random seed for splits, models and padding")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output")
                .help("Path of the JSON results file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Also write an HTML report to this path")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
}

fn handle_select(matches: &ArgMatches) -> Result<()> {
    let config = RunConfig::from_arguments(matches)?;
    log::info!("[omigami::select] Selecting features in {:?}", config.data);

    match run_selection(&config) {
        Ok(results) => {
            eprintln!(
                "[omigami::select] Selected {} / {} / {} of {} features (min / mid / max).",
                results.selected_features.min.len(),
                results.selected_features.mid.len(),
                results.selected_features.max.len(),
                results.n_features
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Feature selection failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_permute(matches: &ArgMatches) -> Result<()> {
    let config = RunConfig::from_arguments(matches)?;
    let n_permutations = matches
        .get_one::<usize>("permutations")
        .copied()
        .unwrap_or_default();
    log::info!(
        "[omigami::permute] {} permutations of {:?}",
        n_permutations,
        config.data
    );

    match run_permutation(&config, n_permutations) {
        Ok(results) => {
            eprintln!(
                "[omigami::permute] p-values: min {:.4}, mid {:.4}, max {:.4}",
                results.p_values.min, results.p_values.mid, results.p_values.max
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Permutation test failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
