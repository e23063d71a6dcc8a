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

use crate::color::Color;
use crate::config::GameConfig;
use crate::error::Error;
use crate::position::{Move, Position};

/// An immutable view of a board, sufficient for feature encoding and
/// serialization. Stones are kept in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    config: GameConfig,
    moves: Vec<Move>
}

impl Snapshot {
    pub(crate) fn new(config: GameConfig, moves: Vec<Move>) -> Self {
        Self { config, moves }
    }

    /// Parse the textual form of a snapshot, moves joined by `^`. The
    /// empty string is the empty snapshot.
    ///
    /// # Arguments
    ///
    /// * `config` -
    /// * `s` -
    ///
    pub fn parse(config: GameConfig, s: &str) -> Result<Snapshot, Error> {
        if s.is_empty() {
            return Ok(Snapshot::new(config, vec![]));
        }

        let moves = s.split('^')
            .map(Move::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidStateString(s.to_string()))?;

        Ok(Snapshot::new(config, moves))
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns the color at `position`, or `None` if no stone sits there.
    pub fn get(&self, position: Position) -> Option<Color> {
        self.moves.iter()
            .find(|mv| mv.position == position)
            .map(|mv| mv.color)
    }

    /// Returns a compact drawing of the position, one line per row.
    pub fn board_view(&self) -> String {
        let mut out = String::new();

        for x in 0..self.config.rows() {
            out += &format!("{:2}: ", x);
            for y in 0..self.config.columns() {
                out += match self.get(Position::new(x, y)) {
                    None => "  ",
                    Some(Color::White) => "o ",
                    Some(Color::Black) => "x "
                };
            }
            out += "\n";
        }

        out
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";

        for mv in &self.moves {
            write!(f, "{}{}", sep, mv)?;
            sep = "^";
        }

        Ok(())
    }
}
