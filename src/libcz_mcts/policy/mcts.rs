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

use std::cmp::Reverse;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use cz_game::{Board, Color, Position};
use cz_nn::Evaluator;

use crate::error::Error;
use crate::options::{SearchMode, SearchOptions};
use crate::policy::Policy;
use crate::tree::Node;
use crate::{expand, parallel, run_simulations};

/// The move picker described by the AlphaGo Zero paper: run simulations
/// guided by the evaluator, then play the root move with the highest
/// visit count.
///
/// The tree is kept between plies. When the opponent's reply was
/// already expanded during the previous search its subtree is promoted
/// to root, inheriting all accumulated statistics.
pub struct MctsPolicy<E: Evaluator> {
    name: String,
    color: Color,
    evaluator: Arc<E>,
    options: SearchOptions,
    explore: bool,
    debug: bool,
    rng: SmallRng,
    root: Option<Node>
}

impl<E: Evaluator> MctsPolicy<E> {
    pub fn new(color: Color, evaluator: Arc<E>, options: SearchOptions, seed: u64) -> Self {
        Self {
            name: format!("mcts_{}", color),
            color,
            evaluator,
            options,
            explore: false,
            debug: false,
            rng: SmallRng::seed_from_u64(seed),
            root: None
        }
    }

    /// Inject root noise and sample the early root moves by visit
    /// count instead of greedily. Used when generating training data.
    pub fn with_explore(mut self, explore: bool) -> Self {
        self.explore = explore;
        self
    }

    /// Dump the top root candidates to stderr after every search.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The current root of the search tree, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    fn new_root(&mut self, board: &Board) -> Result<Node, Error> {
        let mut root = expand(board, self.color, self.evaluator.as_ref())?;

        if self.explore {
            root.inject_noise(&mut self.rng, self.options.noise_weight, self.options.noise_epsilon);
        }

        Ok(root)
    }

    /// Makes `self.root` stand for the current board: builds a root on
    /// the first query of a game, and afterwards promotes the subtree
    /// of the opponent's reply when it is a live child, rebuilding
    /// otherwise.
    fn ensure_root(&mut self, board: &Board) -> Result<(), Error> {
        let root = match self.root.take() {
            None => {
                let expected = if self.color == Color::Black { 0 } else { 1 };
                assert_eq!(
                    board.count(), expected,
                    "the first query must come at the policy's first ply"
                );

                self.new_root(board)?
            },
            Some(root) => {
                let last = board.moves().last()
                    .expect("a cached tree implies at least one played move");

                match root.promote(last.position) {
                    Some(child) => child,
                    None => {
                        // the opponent played a move this tree never
                        // considered
                        self.new_root(board)?
                    }
                }
            }
        };

        self.root = Some(root);
        Ok(())
    }

    fn dump_candidates(&self, root: &Node) {
        let mut candidates = root.candidates();
        candidates.sort_by_key(|&(_, count, _, _)| Reverse(count));

        eprintln!();
        for (i, (position, count, prior, q)) in candidates.into_iter().take(5).enumerate() {
            eprintln!(
                "  Candidate {}: {}:  -> n ({:4}) p ({:.6}) w ({:.6})",
                i, position, count, prior, q
            );
        }
        eprintln!();
    }
}

impl<E: Evaluator> Policy for MctsPolicy<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_position(&mut self, board: &Board) -> Result<Position, Error> {
        self.ensure_root(board)?;

        let root = self.root.as_ref().expect("root was just ensured");
        match self.options.mode {
            SearchMode::Sequential => {
                run_simulations(root, board, self.evaluator.as_ref(), &self.options)?
            },
            SearchMode::Parallel => {
                parallel::run_simulations(root, board, self.evaluator.as_ref(), &self.options)?
            }
        }

        if self.debug {
            self.dump_candidates(root);
        }

        let edge = if self.explore && board.count() < self.options.explore_plies {
            root.sample(&mut self.rng)
        } else {
            root.best()
        };
        let position = root.position_of(edge);

        // promote the chosen subtree; a terminal slot means this move
        // ends the game and there is no tree left to keep
        let root = self.root.take().expect("root was just ensured");
        self.root = root.promote(position);

        Ok(position)
    }
}
