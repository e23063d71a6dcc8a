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

use dashmap::DashMap;

use crate::evaluate::{Evaluation, Evaluator, EvaluatorError};

/// A transparent evaluation cache. Positions recur a lot between
/// simulations of adjacent plies, and the wrapped evaluator is only
/// asked about feature tensors it has not seen before.
pub struct CachedEvaluator<E: Evaluator> {
    inner: E,
    cache: DashMap<Vec<u32>, Evaluation>
}

impl<E: Evaluator> CachedEvaluator<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, cache: DashMap::new() }
    }

    /// The number of distinct positions evaluated so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// The cache key of a single feature tensor. The planes only hold exact
/// zeroes and ones, so the bit pattern is a stable identity.
fn key_of(features: &[f32]) -> Vec<u32> {
    features.iter().map(|value| value.to_bits()).collect()
}

impl<E: Evaluator> Evaluator for CachedEvaluator<E> {
    fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError> {
        let stride = features.len() / batch_size;
        let mut responses: Vec<Option<Evaluation>> = Vec::with_capacity(batch_size);
        let mut miss_features = Vec::new();
        let mut miss_indices = Vec::new();

        for (i, tensor) in features.chunks_exact(stride).enumerate() {
            match self.cache.get(&key_of(tensor)) {
                Some(hit) => responses.push(Some(hit.value().clone())),
                None => {
                    responses.push(None);
                    miss_features.extend_from_slice(tensor);
                    miss_indices.push(i);
                }
            }
        }

        if !miss_indices.is_empty() {
            let fresh = self.inner.evaluate(&miss_features, miss_indices.len())?;

            for (i, response) in miss_indices.into_iter().zip(fresh.into_iter()) {
                let tensor = &features[i * stride..(i + 1) * stride];

                self.cache.insert(key_of(tensor), response.clone());
                responses[i] = Some(response);
            }
        }

        Ok(responses.into_iter().map(|r| r.expect("every slot is filled")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many tensors the inner evaluator has been asked about.
    struct CountingEvaluator {
        num_evaluated: AtomicUsize
    }

    impl CountingEvaluator {
        fn new() -> Self {
            Self { num_evaluated: AtomicUsize::new(0) }
        }
    }

    impl Evaluator for CountingEvaluator {
        fn evaluate(&self, features: &[f32], batch_size: usize) -> Result<Vec<Evaluation>, EvaluatorError> {
            self.num_evaluated.fetch_add(batch_size, Ordering::SeqCst);

            let num_cells = features.len() / (3 * batch_size);
            Ok((0..batch_size).map(|_| Evaluation::new(0.0, vec![1.0; num_cells])).collect())
        }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cached = CachedEvaluator::new(CountingEvaluator::new());
        let features = vec![1.0f32; 3 * 4];

        let first = cached.evaluate(&features, 1).unwrap();
        let second = cached.evaluate(&features, 1).unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.num_evaluated.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn mixed_batch_only_forwards_misses() {
        let cached = CachedEvaluator::new(CountingEvaluator::new());
        let seen = vec![1.0f32; 3 * 4];
        let unseen = vec![0.0f32; 3 * 4];

        cached.evaluate(&seen, 1).unwrap();

        let mut batch = seen.clone();
        batch.extend_from_slice(&unseen);
        let responses = cached.evaluate(&batch, 2).unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(cached.inner.num_evaluated.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }
}
