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

//! Cross-crate integration tests for the connect-zero workspace live in
//! `tests/`.

use cz_game::{Board, Color, Position};

/// Returns true if `color` holds four in a row anywhere on the board.
/// Brute force on purpose, the tests use it as an independent oracle
/// for the incremental winner detection.
pub fn has_four_in_a_row(board: &Board, color: Color) -> bool {
    let rows = board.config().rows() as isize;
    let columns = board.config().columns() as isize;
    let directions = [(0isize, 1isize), (1, 0), (1, 1), (1, -1)];

    for x in 0..rows {
        for y in 0..columns {
            for &(dx, dy) in &directions {
                let run = (0..4).all(|i| {
                    let (cx, cy) = (x + i * dx, y + i * dy);

                    cx >= 0 && cx < rows && cy >= 0 && cy < columns &&
                        board.at(Position::new(cx as usize, cy as usize)) == Some(color)
                });

                if run {
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use cz_game::{GameConfig, Move};

    #[test]
    fn oracle_sees_a_horizontal_run() {
        let mut board = GameConfig::new(6, 7).new_board();
        for s in ["b(5,0)", "b(5,1)", "b(5,2)", "b(5,3)"] {
            board.apply(Move::parse(s).unwrap()).unwrap();
        }

        assert!(has_four_in_a_row(&board, Color::Black));
        assert!(!has_four_in_a_row(&board, Color::White));
    }
}
