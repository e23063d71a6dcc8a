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

use cz_utils::config;

/// Whether simulations run on the calling thread or on a worker pool.
/// The sequential mode is deterministic under a fixed seed, the parallel
/// mode is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    Sequential,
    Parallel
}

/// The tunables of a single search.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// The number of simulations to run for each move.
    pub iterations: usize,

    /// The exploration constant of the selection rule.
    pub c_puct: f32,

    /// The weight of the original prior when mixing in root noise.
    pub noise_weight: f32,

    /// The weight of the noise when mixing in root noise.
    pub noise_epsilon: f32,

    /// Sample the root move by visit count (instead of greedily) for
    /// the first `explore_plies` plies of an exploration game.
    pub explore_plies: usize,

    /// The pessimistic bias applied along a path while its evaluation
    /// is pending.
    pub virtual_loss: u32,

    /// The maximum number of leaves per evaluator invocation.
    pub batch_size: usize,

    /// The number of worker threads of the parallel mode.
    pub num_workers: usize,

    pub mode: SearchMode
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            iterations: *config::NUM_ROLLOUT,
            c_puct: 1.0,
            noise_weight: 0.8,
            noise_epsilon: 0.2,
            explore_plies: 10,
            virtual_loss: 1,
            batch_size: *config::BATCH_SIZE,
            num_workers: *config::NUM_THREADS,
            mode: SearchMode::Sequential
        }
    }
}
