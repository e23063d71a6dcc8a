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

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use cz_game::{Board, Color, Position};

use crate::error::Error;
use crate::policy::Policy;

/// Picks a uniformly random legal position. A good baseline, and good
/// enough to bootstrap the very first generation of training data.
pub struct RandomPolicy {
    name: String,
    rng: SmallRng
}

impl RandomPolicy {
    pub fn new(color: Color, seed: u64) -> Self {
        Self {
            name: format!("random_{}", color),
            rng: SmallRng::seed_from_u64(seed)
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_position(&mut self, board: &Board) -> Result<Position, Error> {
        board.legal_positions()
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::BoardFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cz_game::{GameConfig, Move};

    #[test]
    fn picks_a_legal_position() {
        let board = GameConfig::new(6, 7).new_board();
        let mut policy = RandomPolicy::new(Color::Black, 1);

        let position = policy.next_position(&board).unwrap();
        assert_eq!(position.x, 5);
        assert!(position.y < 7);
    }

    #[test]
    fn full_board_is_an_error() {
        let mut board = GameConfig::new(2, 2).new_board();
        for s in ["b(1,0)", "w(1,1)", "b(0,0)", "w(0,1)"] {
            board.apply(Move::parse(s).unwrap()).unwrap();
        }

        let mut policy = RandomPolicy::new(Color::Black, 1);
        assert!(matches!(policy.next_position(&board), Err(Error::BoardFull)));
    }
}
