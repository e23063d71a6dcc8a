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

use std::env;
use std::str::FromStr;
use std::thread;

/// Returns the value of the environment variable `name` parsed as a `T`,
/// or `default` if the variable is unset or does not parse.
///
/// # Arguments
///
/// * `name` -
/// * `default` -
///
fn env_or_default<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

/// Returns the number of worker threads to use by default, the number of
/// hardware threads capped at 32.
fn default_num_threads() -> usize {
    let available = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    ::std::cmp::min(available, 32)
}

lazy_static! {
    /// The number of rows on the board.
    pub static ref ROWS: usize = env_or_default("CZ_ROWS", 6);

    /// The number of columns on the board.
    pub static ref COLUMNS: usize = env_or_default("CZ_COLUMNS", 7);

    /// The number of simulations to run for each move.
    pub static ref NUM_ROLLOUT: usize = env_or_default("CZ_NUM_ROLLOUT", 1600);

    /// The number of worker threads for the parallel search.
    pub static ref NUM_THREADS: usize = env_or_default("CZ_NUM_THREADS", default_num_threads());

    /// The maximum number of leaves per evaluator invocation.
    pub static ref BATCH_SIZE: usize = env_or_default("CZ_BATCH_SIZE", 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert!(*ROWS < 10);
        assert!(*COLUMNS < 10);
        assert!(*NUM_ROLLOUT > 0);
        assert!(*NUM_THREADS >= 1);
        assert!(*BATCH_SIZE >= 1);
    }

    #[test]
    fn unset_variable_falls_back() {
        assert_eq!(env_or_default("CZ_DOES_NOT_EXIST", 42usize), 42);
    }
}
