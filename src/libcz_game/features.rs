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

use crate::board::Board;
use crate::color::Color;
use crate::snapshot::Snapshot;

/// The number of feature planes.
pub const NUM_FEATURES: usize = 3;

pub trait Features {
    /// Returns the features of the current position in channels-first
    /// layout, shape `(1, 3, rows, columns)`:
    ///
    ///  1. Black stones
    ///  2. White stones
    ///  3. A constant plane filled with ones if black is to move
    ///
    /// # Arguments
    ///
    /// * `to_move` - the color of the player to move next
    ///
    fn get_features(&self, to_move: Color) -> Vec<f32>;
}

impl Features for Snapshot {
    fn get_features(&self, to_move: Color) -> Vec<f32> {
        let num_cells = self.config().num_cells();
        let mut features = vec![0.0f32; self.config().feature_len()];

        for mv in self.moves() {
            let plane = match mv.color {
                Color::Black => 0,
                Color::White => 1
            };

            features[plane * num_cells + self.config().index(mv.position)] = 1.0;
        }

        if to_move == Color::Black {
            for value in &mut features[2 * num_cells..] {
                *value = 1.0;
            }
        }

        features
    }
}

impl Features for Board {
    fn get_features(&self, to_move: Color) -> Vec<f32> {
        self.snapshot().get_features(to_move)
    }
}
