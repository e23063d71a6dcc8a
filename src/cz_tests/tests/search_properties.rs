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

use cz_game::{Color, GameConfig, Move};
use cz_mcts::{expand, parallel, run_simulations, SearchOptions};
use cz_nn::{CachedEvaluator, RandomEvaluator, UniformEvaluator};

fn options(iterations: usize) -> SearchOptions {
    SearchOptions { iterations, ..SearchOptions::default() }
}

/// Sequential search is a pure function of the evaluator: rebuilding
/// the tree and searching again yields the exact same visit counts.
#[test]
fn sequential_visit_counts_are_reproducible() {
    let board = GameConfig::new(6, 7).new_board();

    let runs = (0..2)
        .map(|_| {
            let evaluator = RandomEvaluator::new(5);
            let root = expand(&board, Color::Black, &evaluator).unwrap();
            run_simulations(&root, &board, &evaluator, &options(300)).unwrap();

            root.counts()
        })
        .collect::<Vec<_>>();

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].iter().sum::<u32>(), 300);
}

/// The parallel search completes exactly as many backups as requested,
/// drains every virtual loss, and plays a legal move.
#[test]
fn parallel_search_drains_and_stays_legal() {
    let board = GameConfig::new(6, 7).new_board();
    let evaluator = UniformEvaluator::new();
    let root = expand(&board, Color::Black, &evaluator).unwrap();

    let options = SearchOptions { num_workers: 4, ..options(512) };
    parallel::run_simulations(&root, &board, &evaluator, &options).unwrap();

    assert_eq!(root.counts().iter().sum::<u32>(), 512);
    assert_eq!(root.total_count(), 512);
    assert_eq!(root.vtotal_count(), 0);
    assert!(board.legal_positions().contains(&root.position_of(root.best())));
}

/// Sequential and parallel mode agree on a forced win.
#[test]
fn both_modes_find_the_forced_win() {
    let mut board = GameConfig::new(6, 7).new_board();
    for s in ["b(5,2)", "w(5,6)", "b(5,3)", "w(4,6)", "b(5,4)", "w(3,6)"] {
        board.apply(Move::parse(s).unwrap()).unwrap();
    }

    // black completes the horizontal run at either end, (5,1) or (5,5)
    let winning = [Move::parse("b(5,1)").unwrap().position, Move::parse("b(5,5)").unwrap().position];
    let evaluator = UniformEvaluator::new();

    let sequential_root = expand(&board, Color::Black, &evaluator).unwrap();
    run_simulations(&sequential_root, &board, &evaluator, &options(400)).unwrap();
    assert!(winning.contains(&sequential_root.position_of(sequential_root.best())));

    let parallel_root = expand(&board, Color::Black, &evaluator).unwrap();
    let parallel_options = SearchOptions { num_workers: 4, ..options(400) };
    parallel::run_simulations(&parallel_root, &board, &evaluator, &parallel_options).unwrap();
    assert!(winning.contains(&parallel_root.position_of(parallel_root.best())));
}

/// For a pure evaluator the cache is transparent: search results with
/// and without it are identical.
#[test]
fn cached_evaluator_is_transparent() {
    let board = GameConfig::new(5, 5).new_board();

    let plain = {
        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();
        run_simulations(&root, &board, &evaluator, &options(200)).unwrap();
        root.counts()
    };

    let cached = {
        let evaluator = CachedEvaluator::new(UniformEvaluator::new());
        let root = expand(&board, Color::Black, &evaluator).unwrap();
        run_simulations(&root, &board, &evaluator, &options(200)).unwrap();

        assert!(evaluator.len() > 0, "nothing was cached");
        root.counts()
    };

    assert_eq!(plain, cached);
}
