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

extern crate crossbeam_channel;
extern crate crossbeam_utils;
extern crate ordered_float;
extern crate rand;

/* -------- Modules -------- */

mod dup_detector;
mod error;
mod noise;
pub mod options;
pub mod parallel;
pub mod policy;
pub mod self_play;
pub mod tree;

/* -------- Exports -------- */

pub use self::dup_detector::DupDetector;
pub use self::error::Error;
pub use self::options::{SearchMode, SearchOptions};

/* -------- Code -------- */

use cz_game::{Board, Color, Features};
use cz_nn::{Evaluation, Evaluator, EvaluatorError};

use self::tree::{Node, ProbeResult};

/// Builds the node for the position on `board` from a single evaluator
/// response.
///
/// # Arguments
///
/// * `board` - the position the node stands for
/// * `to_move` -
/// * `response` -
///
fn node_from_response(board: &Board, to_move: Color, response: Evaluation) -> Result<Node, Error> {
    let config = board.config();

    if response.policy.len() != config.num_cells() {
        return Err(Error::Evaluator(EvaluatorError::new(format!(
            "policy has {} entries, expected {}",
            response.policy.len(),
            config.num_cells()
        ))));
    }

    let legal = board.legal_positions();
    if legal.is_empty() {
        return Err(Error::BoardFull);
    }

    let prior = legal.iter().map(|&p| response.policy[config.index(p)]).collect();

    Ok(Node::new(to_move, response.value, legal, prior))
}

/// Builds the node for the position on `board`, calling the evaluator
/// once. Signals `BoardFull` if there are no legal positions left, the
/// caller should have detected the terminal position already.
///
/// # Arguments
///
/// * `board` -
/// * `to_move` -
/// * `evaluator` -
///
pub fn expand<E: Evaluator + ?Sized>(board: &Board, to_move: Color, evaluator: &E) -> Result<Node, Error> {
    if board.legal_positions().is_empty() {
        return Err(Error::BoardFull);
    }

    let features = board.get_features(to_move);
    let mut responses = evaluator.evaluate(&features, 1)?;
    let response = responses.pop()
        .ok_or_else(|| Error::Evaluator(EvaluatorError::new("empty response batch")))?;

    node_from_response(board, to_move, response)
}

/// Runs one simulation from `root`: select until a terminal move or an
/// unexpanded edge, then back the outcome (or the new leaf's predicted
/// value) up along the selected path.
fn simulate_once<E: Evaluator + ?Sized>(
    root: &Node,
    board: &Board,
    evaluator: &E,
    options: &SearchOptions
) -> Result<(), Error> {
    let mut scratch = board.clone();

    match tree::probe(root, &mut scratch, options)? {
        ProbeResult::Terminal(trace, reward) => {
            tree::backup(&trace, reward);
            Ok(())
        },
        ProbeResult::Leaf(trace) => {
            let &(parent, edge) = trace.last().expect("empty trace");
            let to_move = parent.to_move().reverse();

            match expand(&scratch, to_move, evaluator) {
                Ok(child) => {
                    tree::insert(&trace, child);
                    Ok(())
                },
                Err(err) => {
                    parent.unclaim(edge);
                    tree::revert(&trace);
                    Err(err)
                }
            }
        },
        ProbeResult::Conflict => {
            unreachable!("conflicting expansion in sequential search");
        }
    }
}

/// Runs `options.iterations` simulations from `root` on the calling
/// thread. Deterministic for a fixed evaluator, no randomness is drawn
/// during simulation.
///
/// # Arguments
///
/// * `root` - the (already expanded) root of the tree
/// * `board` - the position `root` stands for
/// * `evaluator` -
/// * `options` -
///
pub fn run_simulations<E: Evaluator + ?Sized>(
    root: &Node,
    board: &Board,
    evaluator: &E,
    options: &SearchOptions
) -> Result<(), Error> {
    for _ in 0..options.iterations {
        simulate_once(root, board, evaluator, options)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cz_game::{GameConfig, Move, Position};
    use cz_nn::{RandomEvaluator, UniformEvaluator};

    fn options(iterations: usize) -> SearchOptions {
        SearchOptions { iterations, ..SearchOptions::default() }
    }

    fn apply_all(board: &mut Board, moves: &[&str]) {
        for s in moves {
            board.apply(Move::parse(s).unwrap()).unwrap();
        }
    }

    #[test]
    fn expand_full_board_fails() {
        let mut board = GameConfig::new(2, 2).new_board();
        apply_all(&mut board, &["b(1,0)", "w(1,1)", "b(0,0)", "w(0,1)"]);

        assert!(matches!(
            expand(&board, Color::Black, &UniformEvaluator::new()),
            Err(Error::BoardFull)
        ));
    }

    #[test]
    fn expand_maps_priors_onto_legal_positions() {
        let board = GameConfig::new(6, 7).new_board();
        let root = expand(&board, Color::Black, &UniformEvaluator::new()).unwrap();

        assert_eq!(root.num_edges(), 7);
        assert_eq!(root.to_move(), Color::Black);
        for edge in 0..root.num_edges() {
            assert_eq!(root.prior(edge), 1.0 / 42.0);
        }
    }

    #[test]
    fn root_counts_add_up_to_iterations() {
        let board = GameConfig::new(6, 7).new_board();
        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();

        run_simulations(&root, &board, &evaluator, &options(100)).unwrap();

        assert_eq!(root.counts().iter().sum::<u32>(), 100);
        assert_eq!(root.total_count(), 100);
        assert_eq!(root.vtotal_count(), 0);
    }

    #[test]
    fn search_finds_the_immediate_win() {
        // black has three in column 0 and may complete them; everything
        // else loses to white's three in column 6
        let mut board = GameConfig::new(6, 7).new_board();
        apply_all(&mut board, &[
            "b(5,0)", "w(5,6)", "b(4,0)", "w(4,6)", "b(3,0)", "w(3,6)"
        ]);

        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();
        run_simulations(&root, &board, &evaluator, &options(200)).unwrap();

        assert_eq!(root.position_of(root.best()), Position::new(2, 0));
    }

    #[test]
    fn search_is_deterministic_for_a_fixed_evaluator() {
        let board = GameConfig::new(6, 7).new_board();

        let counts = (0..2)
            .map(|_| {
                // the evaluator is re-seeded, so both runs see the very
                // same responses
                let evaluator = RandomEvaluator::new(12345);
                let root = expand(&board, Color::Black, &evaluator).unwrap();
                run_simulations(&root, &board, &evaluator, &options(400)).unwrap();

                root.counts()
            })
            .collect::<Vec<_>>();

        assert_eq!(counts[0], counts[1]);
        assert_eq!(counts[0].iter().sum::<u32>(), 400);
    }

    #[test]
    fn evaluator_failure_keeps_earlier_backups() {
        struct FailingEvaluator {
            remaining: ::std::sync::atomic::AtomicUsize
        }

        impl Evaluator for FailingEvaluator {
            fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError> {
                use ::std::sync::atomic::Ordering;

                if self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_err() {
                    return Err(EvaluatorError::new("weights went away"));
                }

                UniformEvaluator::new().evaluate(features, batch_size)
            }
        }

        let board = GameConfig::new(6, 7).new_board();
        let evaluator = FailingEvaluator { remaining: ::std::sync::atomic::AtomicUsize::new(11) };
        let root = expand(&board, Color::Black, &evaluator).unwrap();

        let result = run_simulations(&root, &board, &evaluator, &options(100));

        assert!(matches!(result, Err(Error::Evaluator(_))));
        // ten expansions succeeded before the failing simulation
        assert_eq!(root.counts().iter().sum::<u32>(), 10);
        assert_eq!(root.vtotal_count(), 0);
    }
}
