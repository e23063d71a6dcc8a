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

use std::error;
use std::fmt;
use std::sync::Mutex;

use cz_game::features::NUM_FEATURES;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The output of the evaluator for a single position: a prior over all
/// board cells in row-major order, and the expected outcome in `[-1, 1]`
/// from the perspective of the side to move.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: f32,
    pub policy: Vec<f32>
}

impl Evaluation {
    pub fn new(value: f32, policy: Vec<f32>) -> Self {
        debug_assert!((-1.0..=1.0).contains(&value));

        Self { value, policy }
    }
}

/// An error propagated from the evaluator. Never swallowed by the
/// engine, a failing evaluation aborts the current search.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatorError {
    message: String
}

impl EvaluatorError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "evaluator failure: {}", self.message)
    }
}

impl error::Error for EvaluatorError {}

/// A policy and value estimator for encoded board positions. The
/// implementation must be safe for concurrent invocation, the search
/// workers share a single evaluator.
pub trait Evaluator: Send + Sync {
    /// Evaluate a batch of `batch_size` feature tensors, laid out
    /// back-to-back in `features`, and return one `Evaluation` per
    /// tensor in the same order.
    ///
    /// # Arguments
    ///
    /// * `features` -
    /// * `batch_size` -
    ///
    fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError>;
}

/// Returns the number of cells on the board that produced a batch of
/// `batch_size` feature tensors.
fn num_cells_of(features: &[f32], batch_size: usize) -> usize {
    debug_assert!(batch_size > 0);
    debug_assert_eq!(features.len() % (NUM_FEATURES * batch_size), 0);

    features.len() / (NUM_FEATURES * batch_size)
}

/// An evaluator with uniform priors and no opinion on the outcome. Lets
/// the visit statistics be driven purely by the game tree, useful for
/// bootstrapping and for deterministic tests.
#[derive(Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError> {
        let num_cells = num_cells_of(features, batch_size);
        let prior = (num_cells as f32).recip();

        Ok((0..batch_size)
            .map(|_| Evaluation::new(0.0, vec![prior; num_cells]))
            .collect())
    }
}

/// An evaluator that returns seeded noise. It plays terribly, but it
/// exercises every search path an actual network would.
pub struct RandomEvaluator {
    rng: Mutex<SmallRng>
}

impl RandomEvaluator {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(SmallRng::seed_from_u64(seed)) }
    }
}

impl Evaluator for RandomEvaluator {
    fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError> {
        let num_cells = num_cells_of(features, batch_size);
        let mut rng = self.rng.lock().expect("could not acquire rng lock");

        Ok((0..batch_size)
            .map(|_| {
                let policy = (0..num_cells).map(|_| rng.gen::<f32>()).collect();

                Evaluation::new(rng.gen_range(-1.0..1.0), policy)
            })
            .collect())
    }
}
