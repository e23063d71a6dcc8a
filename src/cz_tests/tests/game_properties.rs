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

use cz_game::{Color, GameConfig, Move, Winner};
use cz_tests::has_four_in_a_row;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Random legal rollouts: the incremental winner detection must agree
/// with a brute-force scan of the whole board, and must never declare a
/// winner before four in a row exists.
#[test]
fn winner_is_never_declared_early() {
    let config = GameConfig::new(6, 7);
    let mut rng = SmallRng::seed_from_u64(42);

    for _ in 0..200 {
        let mut board = config.new_board();
        let mut color = Color::Black;

        loop {
            let legal = board.legal_positions();
            let position = match legal.choose(&mut rng) {
                Some(&position) => position,
                None => break
            };

            board.apply(Move::new(position, color)).unwrap();

            match board.winner_after_last_move() {
                Some(Winner::Won(winner)) => {
                    assert_eq!(winner, color);
                    assert!(has_four_in_a_row(&board, winner));
                    break;
                },
                Some(Winner::Tie) => {
                    assert!(board.is_full());
                    assert!(!has_four_in_a_row(&board, Color::Black));
                    assert!(!has_four_in_a_row(&board, Color::White));
                    break;
                },
                None => {
                    assert!(!has_four_in_a_row(&board, color));
                    color = color.reverse();
                }
            }
        }
    }
}

/// The same rollouts on a tiny board, where ties are the common case.
#[test]
fn small_board_rollouts_end_in_ties_or_wins() {
    let config = GameConfig::new(3, 3);
    let mut rng = SmallRng::seed_from_u64(7);
    let mut num_ties = 0;

    for _ in 0..50 {
        let mut board = config.new_board();
        let mut color = Color::Black;

        let winner = loop {
            let legal = board.legal_positions();
            let position = *legal.choose(&mut rng).expect("game should have ended");

            board.apply(Move::new(position, color)).unwrap();
            if let Some(winner) = board.winner_after_last_move() {
                break winner;
            }

            color = color.reverse();
        };

        // a 3x3 board cannot hold four in a row
        assert_eq!(winner, Winner::Tie);
        num_ties += 1;
    }

    assert_eq!(num_ties, 50);
}
