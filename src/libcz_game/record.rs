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
use crate::snapshot::Snapshot;

/// One line of self-play training data: the position that was reached,
/// the move that was played there, and the final outcome of the game in
/// the mover's frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingRecord {
    /// The position the stone was dropped into.
    pub position: Position,

    /// The color that was to move.
    pub color: Color,

    /// The final reward of the game for `color`, one of `1`, `-1`, `0`.
    pub reward: f32,

    /// The board before the move was applied.
    pub snapshot: Snapshot
}

impl TrainingRecord {
    /// Parse the textual form `<move>_<reward>_<snapshot>`, where the
    /// snapshot field is omitted entirely when the board was empty.
    ///
    /// # Arguments
    ///
    /// * `config` -
    /// * `s` -
    ///
    pub fn parse(config: GameConfig, s: &str) -> Result<TrainingRecord, Error> {
        let fields = s.splitn(3, '_').collect::<Vec<_>>();
        let (move_str, reward_str, snapshot_str) = match fields[..] {
            [m, r, sn] => (m, r, sn),
            [m, r] => (m, r, ""),
            _ => return Err(Error::InvalidRecordString(s.to_string()))
        };

        let mv = Move::parse(move_str)?;
        let reward = reward_str.trim().parse::<f32>()
            .map_err(|_| Error::InvalidRecordString(s.to_string()))?;
        let snapshot = Snapshot::parse(config, snapshot_str)?;

        Ok(TrainingRecord {
            position: mv.position,
            color: mv.color,
            reward,
            snapshot
        })
    }
}

impl fmt::Display for TrainingRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mv = Move::new(self.position, self.color);

        if self.snapshot.is_empty() {
            write!(f, "{}_{}", mv, self.reward)
        } else {
            write!(f, "{}_{}_{}", mv, self.reward, self.snapshot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::new(6, 7)
    }

    #[test]
    fn round_trip() {
        let s = "w(4,3)_-1_b(5,3)^w(5,4)^b(4,4)";
        let record = TrainingRecord::parse(config(), s).unwrap();

        assert_eq!(record.position, Position::new(4, 3));
        assert_eq!(record.color, Color::White);
        assert_eq!(record.reward, -1.0);
        assert_eq!(format!("{}", record), s);
    }

    #[test]
    fn round_trip_empty_snapshot() {
        let s = "b(5,3)_1";
        let record = TrainingRecord::parse(config(), s).unwrap();

        assert!(record.snapshot.is_empty());
        assert_eq!(record.reward, 1.0);
        assert_eq!(format!("{}", record), s);
    }

    #[test]
    fn parse_accepts_padded_reward() {
        let record = TrainingRecord::parse(config(), "b(5,3)_ 1_w(5,4)").unwrap();

        assert_eq!(record.reward, 1.0);
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert_eq!(
            TrainingRecord::parse(config(), "b(5,3)"),
            Err(Error::InvalidRecordString("b(5,3)".to_string()))
        );
        assert_eq!(
            TrainingRecord::parse(config(), "b(5,3)_x_"),
            Err(Error::InvalidRecordString("b(5,3)_x_".to_string()))
        );
    }
}
