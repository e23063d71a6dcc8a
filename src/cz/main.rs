// Copyright 2024 the connect-zero authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connect-zero: a Connect-Four engine driven by a neural-network
//! guided Monte Carlo Tree Search.
//!
//! ## Usage
//!
//! - `connect_zero play` - play against the engine
//! - `connect_zero self-play` - generate training records
//! - `connect_zero sanity-check` - random-vs-random smoke run

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cpu_time::ProcessTime;
use rand::{thread_rng, Rng};

use cz_game::{Board, Color, GameConfig, Position};
use cz_mcts::policy::{HumanPolicy, MctsPolicy, Policy, RandomPolicy};
use cz_mcts::self_play::play_games;
use cz_mcts::{Error, SearchMode, SearchOptions};
use cz_nn::{CachedEvaluator, Evaluation, Evaluator, EvaluatorError, RandomEvaluator, UniformEvaluator};

#[derive(Parser)]
#[command(name = "connect_zero")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of board rows (must be less than 10)
    #[arg(long, default_value_t = *cz_utils::config::ROWS)]
    rows: usize,

    /// Number of board columns (must be less than 10)
    #[arg(long, default_value_t = *cz_utils::config::COLUMNS)]
    columns: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine on the terminal
    Play {
        /// Which color the human plays; picked at random when omitted
        #[arg(long, value_enum)]
        human: Option<Side>,

        /// Simulations per move
        #[arg(long)]
        iterations: Option<usize>,

        /// Use the multi-threaded search
        #[arg(long)]
        parallel: bool,

        /// Dump the top root candidates after every search
        #[arg(long)]
        debug: bool,

        #[arg(long, value_enum, default_value = "uniform")]
        evaluator: EvaluatorKind,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate self-play training records
    SelfPlay {
        #[arg(long, default_value_t = 10)]
        games: usize,

        /// Simulations per move
        #[arg(long)]
        iterations: Option<usize>,

        /// Inject root noise and sample the opening moves
        #[arg(long)]
        explore: bool,

        /// Abort games that repeat the opening of an earlier game
        #[arg(long)]
        avoid_dup: bool,

        /// File the training records are appended to; stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use the multi-threaded search
        #[arg(long)]
        parallel: bool,

        #[arg(long, value_enum, default_value = "uniform")]
        evaluator: EvaluatorKind,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Let two random policies play against each other
    SanityCheck {
        #[arg(long, default_value_t = 1)]
        games: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    B,
    W,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EvaluatorKind {
    /// Uniform priors, no value opinion
    Uniform,

    /// Seeded noise priors
    Random,
}

/// The evaluator chosen on the command line. Would also be the place a
/// trained network plugs in.
enum AnyEvaluator {
    Uniform(UniformEvaluator),
    Random(RandomEvaluator),
}

impl Evaluator for AnyEvaluator {
    fn evaluate(&self, features: &[f32], batch_size: usize) -> std::result::Result<Vec<Evaluation>, EvaluatorError> {
        match self {
            AnyEvaluator::Uniform(inner) => inner.evaluate(features, batch_size),
            AnyEvaluator::Random(inner) => inner.evaluate(features, batch_size),
        }
    }
}

/// Reports the process CPU time spent inside every search of the
/// wrapped policy.
struct TimedPolicy<P> {
    inner: P,
}

impl<P: Policy> Policy for TimedPolicy<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn next_position(&mut self, board: &Board) -> std::result::Result<Position, Error> {
        let start = ProcessTime::now();
        let position = self.inner.next_position(board)?;

        eprintln!("[sys] {} took {:.2?} of cpu time", self.inner.name(), start.elapsed());
        Ok(position)
    }
}

fn search_options(iterations: Option<usize>, parallel: bool) -> SearchOptions {
    let mut options = SearchOptions::default();

    if let Some(iterations) = iterations {
        options.iterations = iterations;
    }
    options.mode = if parallel { SearchMode::Parallel } else { SearchMode::Sequential };

    options
}

fn make_evaluator(kind: EvaluatorKind, seed: u64) -> Arc<CachedEvaluator<AnyEvaluator>> {
    let inner = match kind {
        EvaluatorKind::Uniform => AnyEvaluator::Uniform(UniformEvaluator::new()),
        EvaluatorKind::Random => AnyEvaluator::Random(RandomEvaluator::new(seed)),
    };

    Arc::new(CachedEvaluator::new(inner))
}

fn play(
    config: GameConfig,
    human: Option<Side>,
    iterations: Option<usize>,
    parallel: bool,
    debug: bool,
    evaluator: EvaluatorKind,
    seed: Option<u64>,
) -> Result<()> {
    let seed = seed.unwrap_or_else(|| thread_rng().gen());
    let evaluator = make_evaluator(evaluator, seed);
    let options = search_options(iterations, parallel);

    let human_color = match human {
        Some(Side::B) => Color::Black,
        Some(Side::W) => Color::White,
        None if thread_rng().gen::<bool>() => Color::Black,
        None => Color::White,
    };
    println!("[sys] you play {}", human_color);

    play_games(
        config,
        move || {
            let engine_color = human_color.reverse();
            let engine = TimedPolicy {
                inner: MctsPolicy::new(engine_color, evaluator.clone(), options.clone(), seed)
                    .with_debug(debug),
            };
            let human = HumanPolicy::new(human_color);

            if human_color == Color::Black {
                (Box::new(human) as Box<dyn Policy>, Box::new(engine) as Box<dyn Policy>)
            } else {
                (Box::new(engine) as Box<dyn Policy>, Box::new(human) as Box<dyn Policy>)
            }
        },
        1,
        None,
        false,
        true,
    )?;

    Ok(())
}

fn self_play(
    config: GameConfig,
    games: usize,
    iterations: Option<usize>,
    explore: bool,
    avoid_dup: bool,
    output: Option<PathBuf>,
    parallel: bool,
    evaluator: EvaluatorKind,
    seed: Option<u64>,
) -> Result<()> {
    let seed = seed.unwrap_or_else(|| thread_rng().gen());
    let evaluator = make_evaluator(evaluator, seed);
    let options = search_options(iterations, parallel);

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)
                .with_context(|| format!("could not open {:?}", path))?;

            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };

    let start = ProcessTime::now();
    let mut game_index = 0u64;
    let history = play_games(
        config,
        || {
            game_index += 1;

            let black = MctsPolicy::new(
                Color::Black,
                evaluator.clone(),
                options.clone(),
                seed.wrapping_add(2 * game_index),
            ).with_explore(explore);
            let white = MctsPolicy::new(
                Color::White,
                evaluator.clone(),
                options.clone(),
                seed.wrapping_add(2 * game_index + 1),
            ).with_explore(explore);

            (Box::new(black) as Box<dyn Policy>, Box::new(white) as Box<dyn Policy>)
        },
        games,
        Some(writer.as_mut()),
        avoid_dup,
        false,
    )?;
    writer.flush()?;

    eprintln!(
        "[sys] {} games in {:.2?} of cpu time: B ({}) - W ({}) - Tie ({})",
        games,
        start.elapsed(),
        history.num_black_wins,
        history.num_white_wins,
        history.num_ties
    );
    Ok(())
}

fn sanity_check(config: GameConfig, games: usize) -> Result<()> {
    let mut seed = 0;
    let history = play_games(
        config,
        || {
            seed += 2;
            (
                Box::new(RandomPolicy::new(Color::Black, seed)) as Box<dyn Policy>,
                Box::new(RandomPolicy::new(Color::White, seed + 1)) as Box<dyn Policy>,
            )
        },
        games,
        None,
        false,
        true,
    )?;

    println!(
        "[sys] B ({}) - W ({}) - Tie ({})",
        history.num_black_wins, history.num_white_wins, history.num_ties
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    anyhow::ensure!(cli.rows < 10 && cli.rows > 0, "rows must be between 1 and 9");
    anyhow::ensure!(cli.columns < 10 && cli.columns > 0, "columns must be between 1 and 9");

    let config = GameConfig::new(cli.rows, cli.columns);
    println!("[sys] {}", config);

    match cli.command {
        Commands::Play { human, iterations, parallel, debug, evaluator, seed } => {
            play(config, human, iterations, parallel, debug, evaluator, seed)
        }
        Commands::SelfPlay { games, iterations, explore, avoid_dup, output, parallel, evaluator, seed } => {
            self_play(config, games, iterations, explore, avoid_dup, output, parallel, evaluator, seed)
        }
        Commands::SanityCheck { games } => sanity_check(config, games),
    }
}
