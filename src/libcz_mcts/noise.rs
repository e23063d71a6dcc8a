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

use rand::Rng;

/// Mixes a normalized uniform noise vector into `prior` in place, to
/// increase the entropy of the search at the root:
///
/// ```text
/// prior[i] = weight * prior[i] + epsilon * eta[i]
/// ```
///
/// where `eta` is drawn uniformly from `[0, 1)` and normalized to sum
/// to one.
///
/// # Arguments
///
/// * `prior` -
/// * `rng` -
/// * `weight` -
/// * `epsilon` -
///
pub fn add<R: Rng>(prior: &mut [f32], rng: &mut R, weight: f32, epsilon: f32) {
    let eta = (0..prior.len()).map(|_| rng.gen::<f32>()).collect::<Vec<f32>>();
    let eta_sum = eta.iter().sum::<f32>();

    if eta_sum < 1e-6 {  // do not divide by zero
        return;
    }

    for (p, e) in prior.iter_mut().zip(eta.into_iter()) {
        *p = weight * *p + epsilon * (e / eta_sum);
    }
}
