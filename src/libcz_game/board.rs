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

use crate::color::{Color, Winner};
use crate::config::GameConfig;
use crate::error::Error;
use crate::position::{Move, Position};
use crate::snapshot::Snapshot;

/// The state of a single game. Single owner, cloned along every
/// simulation path of the search.
#[derive(Clone, Debug)]
pub struct Board {
    config: GameConfig,
    cells: Vec<Option<Color>>,
    moves: Vec<Move>
}

impl Board {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            cells: vec![None; config.num_cells()],
            moves: Vec::with_capacity(config.num_cells())
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// The moves applied so far, in order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// The number of moves applied so far.
    pub fn count(&self) -> usize {
        self.moves.len()
    }

    pub fn is_full(&self) -> bool {
        self.moves.len() == self.config.num_cells()
    }

    /// Returns the color at `position`, or `None` if the cell is empty
    /// or outside of the board.
    pub fn at(&self, position: Position) -> Option<Color> {
        if position.x >= self.config.rows() || position.y >= self.config.columns() {
            None
        } else {
            self.cells[self.config.index(position)]
        }
    }

    /// Returns the lowest empty row of `column`, or `None` if the column
    /// is full (or does not exist).
    ///
    /// # Arguments
    ///
    /// * `column` -
    ///
    pub fn next_available_row(&self, column: usize) -> Option<usize> {
        if column >= self.config.columns() {
            return None;
        }

        (0..self.config.rows()).rev()
            .find(|&x| self.cells[self.config.index(Position::new(x, column))].is_none())
    }

    /// Returns the positions a stone may be dropped into, one per
    /// non-full column. The list is empty iff the board is full.
    pub fn legal_positions(&self) -> Vec<Position> {
        (0..self.config.columns())
            .filter_map(|y| self.next_available_row(y).map(|x| Position::new(x, y)))
            .collect()
    }

    /// Returns true if `mv` targets an empty on-board cell that either
    /// sits on the bottom row or rests on an occupied cell.
    fn is_legal(&self, mv: Move) -> bool {
        let Position { x, y } = mv.position;

        if x >= self.config.rows() || y >= self.config.columns() {
            return false;
        }
        if self.cells[self.config.index(mv.position)].is_some() {
            return false;
        }

        x == self.config.rows() - 1 ||
            self.cells[self.config.index(Position::new(x + 1, y))].is_some()
    }

    /// Applies `mv` to this board, appending it to the history.
    ///
    /// # Arguments
    ///
    /// * `mv` -
    ///
    pub fn apply(&mut self, mv: Move) -> Result<(), Error> {
        if !self.is_legal(mv) {
            return Err(Error::IllegalMove(mv));
        }

        let index = self.config.index(mv.position);
        self.cells[index] = Some(mv.color);
        self.moves.push(mv);

        Ok(())
    }

    /// Walks from the last move's cell in the direction `(dx, dy)` and
    /// returns the number of consecutive cells holding `color`.
    fn count_same_color(&self, start: Position, color: Color, dx: isize, dy: isize) -> usize {
        let rows = self.config.rows() as isize;
        let columns = self.config.columns() as isize;
        let (mut x, mut y) = (start.x as isize, start.y as isize);
        let mut num = 0;

        loop {
            x += dx;
            y += dy;

            if x < 0 || x >= rows || y < 0 || y >= columns {
                return num;
            }
            if self.cells[(x * columns + y) as usize] != Some(color) {
                return num;
            }

            num += 1;
        }
    }

    /// Returns the winner produced by the last move, assuming the
    /// position before it had no winner:
    ///
    /// * `Some(Winner::Won(color))` if the last move completes a run of
    ///   at least four in any of the four axes,
    /// * `Some(Winner::Tie)` if the board is full without a winner,
    /// * `None` otherwise (including the empty board).
    ///
    pub fn winner_after_last_move(&self) -> Option<Winner> {
        let last = *self.moves.last()?;
        let (start, color) = (last.position, last.color);

        let left = self.count_same_color(start, color, 0, -1);
        let right = self.count_same_color(start, color, 0, 1);
        if left + right + 1 >= 4 {
            return Some(Winner::Won(color));
        }

        // only downwards, the cell above the last move is empty by gravity
        let down = self.count_same_color(start, color, 1, 0);
        if down + 1 >= 4 {
            return Some(Winner::Won(color));
        }

        let down_left = self.count_same_color(start, color, 1, -1);
        let up_right = self.count_same_color(start, color, -1, 1);
        if down_left + up_right + 1 >= 4 {
            return Some(Winner::Won(color));
        }

        let up_left = self.count_same_color(start, color, -1, -1);
        let down_right = self.count_same_color(start, color, 1, 1);
        if up_left + down_right + 1 >= 4 {
            return Some(Winner::Won(color));
        }

        if self.is_full() {
            return Some(Winner::Tie);
        }

        None
    }

    /// Returns an immutable view of this board sufficient for feature
    /// encoding and serialization.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.config, self.moves.clone())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "    ")?;
        for y in 0..self.config.columns() {
            write!(f, "{} ", y)?;
        }
        writeln!(f)?;

        for x in 0..self.config.rows() {
            write!(f, "{:2}: ", x)?;
            for y in 0..self.config.columns() {
                match self.cells[self.config.index(Position::new(x, y))] {
                    None => write!(f, "  ")?,
                    Some(Color::White) => write!(f, "o ")?,
                    Some(Color::Black) => write!(f, "x ")?
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
