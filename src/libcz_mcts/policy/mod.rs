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

mod human;
mod mcts;
mod random;

pub use self::human::HumanPolicy;
pub use self::mcts::MctsPolicy;
pub use self::random::RandomPolicy;

use cz_game::{Board, Position};

use crate::error::Error;

/// Something that can pick the next move of a game. The driver holds
/// one policy per player and does not care whether moves come from a
/// human, a random number generator, or a tree search.
///
/// The board handed to `next_position` must not be terminal, and its
/// last move (if any) must belong to the opponent.
pub trait Policy {
    fn name(&self) -> &str;

    fn next_position(&mut self, board: &Board) -> Result<Position, Error>;
}
