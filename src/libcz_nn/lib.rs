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

extern crate dashmap;
extern crate rand;

mod cache;
mod evaluate;

pub use self::cache::CachedEvaluator;
pub use self::evaluate::{Evaluation, Evaluator, EvaluatorError, RandomEvaluator, UniformEvaluator};
