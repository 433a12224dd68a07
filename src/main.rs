//! NBA game prediction CLI
//!
//! Builds historical features from game results and predicts home wins.

use clap::{Parser, Subcommand};
use hoops::{Config, Result, SeasonId};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NBA game outcome prediction from game history", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Normalize raw game rows and write the featurized dataset
    Features {
        /// Raw provider CSV (defaults to the configured games file)
        #[arg(long)]
        input: Option<String>,
        /// First season id to keep, e.g. 22008
        #[arg(long)]
        first: SeasonId,
        /// Last season id to keep
        #[arg(long)]
        last: SeasonId,
        /// Output CSV
        #[arg(long)]
        output: String,
    },
    /// Train on the configured seasons and predict the prediction season
    Predict {
        /// Skip hyperparameter search and use the configured learning rate/epochs
        #[arg(long)]
        no_tune: bool,
    },
    /// Per-date team win percentages from a dataset file, as JSON
    Chart {
        /// Dataset CSV (actual or predicted)
        input: String,
        /// Use each team's last N games instead of the whole season
        #[arg(long)]
        window: Option<usize>,
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Features {
            input,
            first,
            last,
            output,
        } => commands::features(&config, input, first, last, &output),
        Commands::Predict { no_tune } => commands::predict(&config, no_tune),
        Commands::Chart {
            input,
            window,
            output,
        } => commands::chart(&config, &input, window, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};
    use hoops::data::export;
    use hoops::data::rankings::load_rank_dir;
    use hoops::data::raw::read_raw_rows;
    use hoops::data::{SeasonWindow, TeamRegistry};
    use hoops::features::WinPercentageTimeline;
    use hoops::predict::Pipeline;
    use hoops::training::{GridSearch, LogisticClassifier, LogisticParams};
    use std::path::Path;

    type Backend = Autodiff<NdArray<f32>>;

    /// Built-in registry plus any aliases from config
    fn registry(config: &Config) -> Result<TeamRegistry> {
        let mut registry = TeamRegistry::nba();
        for (alias, canonical) in &config.teams.aliases {
            registry.add_alias(alias, canonical)?;
        }
        Ok(registry)
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.rankings_dir)?;
        std::fs::create_dir_all(&config.data.output_dir)?;
        println!(
            "Created {} and {} directories",
            config.data.rankings_dir, config.data.output_dir
        );

        println!("\nNext steps:");
        println!("  1. Export provider game rows to {}", config.data.games_path);
        println!("  2. Put <year>.csv standings files in {}", config.data.rankings_dir);
        println!("  3. Run 'hoops predict' to train and predict");
        println!("  4. Run 'hoops chart {}/predicted.csv' for win percentages", config.data.output_dir);

        Ok(())
    }

    pub fn features(
        config: &Config,
        input: Option<String>,
        first: SeasonId,
        last: SeasonId,
        output: &str,
    ) -> Result<()> {
        let registry = registry(config)?;
        let ranks = load_rank_dir(&config.data.rankings_dir, &registry)?;
        let input = input.unwrap_or_else(|| config.data.games_path.clone());

        let rows = read_raw_rows(&input)?;
        let window = SeasonWindow {
            first,
            last,
            regular_only: config.seasons.regular_season_only,
        };
        let pass = Pipeline::new(&registry, &ranks).featurize(rows, Some(window))?;

        export::write_games(output, &pass.games, &registry)?;
        println!(
            "Wrote {} games ({} tied-score anomalies) to {}",
            pass.len(),
            pass.anomalies.len(),
            output
        );
        Ok(())
    }

    pub fn predict(config: &Config, no_tune: bool) -> Result<()> {
        let registry = registry(config)?;
        let ranks = load_rank_dir(&config.data.rankings_dir, &registry)?;
        let rows = read_raw_rows(&config.data.games_path)?;

        let seasons = &config.seasons;
        let training_window = SeasonWindow {
            first: seasons.first_training,
            last: seasons.last_training,
            regular_only: seasons.regular_season_only,
        };
        let prediction_window = SeasonWindow {
            first: seasons.prediction,
            last: seasons.prediction,
            regular_only: seasons.regular_season_only,
        };

        let pipeline = Pipeline::new(&registry, &ranks);
        println!("Building training features ({} to {})...", seasons.first_training, seasons.last_training);
        let training = pipeline.featurize(rows.clone(), Some(training_window))?;
        println!("Building prediction features ({})...", seasons.prediction);
        let evaluation = pipeline.featurize(rows, Some(prediction_window))?;

        let model = &config.model;
        let device = NdArrayDevice::default();
        let mut classifier = if no_tune || model.grid_learning_rates.is_empty() || model.grid_epochs.is_empty() {
            LogisticClassifier::<Backend>::new(
                device,
                LogisticParams {
                    learning_rate: model.learning_rate,
                    epochs: model.epochs,
                    seed: model.seed,
                },
            )
        } else {
            let (_, x_train, _) = pipeline.assemble(&training, &evaluation)?;
            let grid: Vec<LogisticParams> = model
                .grid_learning_rates
                .iter()
                .flat_map(|&learning_rate| {
                    model.grid_epochs.iter().map(move |&epochs| LogisticParams {
                        learning_rate,
                        epochs,
                        seed: model.seed,
                    })
                })
                .collect();

            println!("Searching {} candidates with {}-fold cross validation...", grid.len(), model.folds);
            let search = GridSearch::new(model.folds, model.seed);
            let tuned = search.run(&x_train, &grid, |p| {
                LogisticClassifier::<Backend>::new(device.clone(), p.clone())
            })?;
            println!(
                "Best: lr={} epochs={} (mean F1 {:.3})",
                tuned.best.params.learning_rate, tuned.best.params.epochs, tuned.best.mean_f1
            );
            tuned.model
        };

        let outcome = pipeline.fit_and_predict(training, evaluation, &mut classifier)?;

        let out = Path::new(&config.data.output_dir);
        export::write_games(out.join("training.csv"), &outcome.training.games, &registry)?;
        export::write_games(out.join("actual.csv"), &outcome.evaluation.games, &registry)?;
        export::write_predictions(
            out.join("predicted.csv"),
            &outcome.evaluation.games,
            &outcome.predicted,
            &registry,
        )?;

        println!("\nPrediction season {}: {} games", seasons.prediction, outcome.evaluation.len());
        println!("  Model:    {}", outcome.report);
        println!("  Baseline: {}", outcome.baseline);
        println!("Wrote training.csv, actual.csv and predicted.csv to {}", out.display());

        Ok(())
    }

    pub fn chart(
        config: &Config,
        input: &str,
        window: Option<usize>,
        output: Option<String>,
    ) -> Result<()> {
        let registry = registry(config)?;
        let games = export::read_games(input)?
            .iter()
            .map(|row| row.labelled(&registry))
            .collect::<Result<Vec<_>>>()?;

        let timeline = WinPercentageTimeline::from_games(&games, window);
        let json = serde_json::to_string_pretty(&timeline.by_name(&registry))?;

        match output {
            Some(path) => {
                std::fs::write(&path, json)?;
                println!("Wrote {} daily snapshots to {}", timeline.len(), path);
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
