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

use std::fmt;

use crate::board::Board;
use crate::position::Position;

/// The dimensions of a game. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    rows: usize,
    columns: usize
}

impl GameConfig {
    /// Returns a new configuration with the given dimensions. Both must
    /// be less than 10, since the textual formats encode coordinates as
    /// a single digit.
    ///
    /// # Arguments
    ///
    /// * `rows` -
    /// * `columns` -
    ///
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows < 10, "rows should be less than 10");
        assert!(columns < 10, "columns should be less than 10");

        Self { rows, columns }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The number of cells on the board, which is also the length of the
    /// policy head output.
    pub fn num_cells(&self) -> usize {
        self.rows * self.columns
    }

    /// The length of the feature tensor, three planes of `rows × columns`.
    pub fn feature_len(&self) -> usize {
        3 * self.num_cells()
    }

    /// The row-major index of `position` into the policy head output.
    pub fn index(&self, position: Position) -> usize {
        position.x * self.columns + position.y
    }

    pub fn new_board(&self) -> Board {
        Board::new(*self)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(*cz_utils::config::ROWS, *cz_utils::config::COLUMNS)
    }
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "connect four ({}x{})", self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_row_major() {
        let config = GameConfig::new(6, 7);

        assert_eq!(config.index(Position::new(0, 0)), 0);
        assert_eq!(config.index(Position::new(0, 6)), 6);
        assert_eq!(config.index(Position::new(1, 0)), 7);
        assert_eq!(config.index(Position::new(5, 6)), 41);
    }

    #[test]
    #[should_panic]
    fn too_many_rows() {
        GameConfig::new(10, 7);
    }
}
