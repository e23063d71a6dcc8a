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

#[macro_use] extern crate lazy_static;
extern crate regex;

mod board;
mod color;
mod config;
mod error;
pub mod features;
mod position;
mod record;
mod snapshot;

pub use self::board::Board;
pub use self::color::{Color, Winner};
pub use self::config::GameConfig;
pub use self::error::Error;
pub use self::features::Features;
pub use self::position::{Move, Position};
pub use self::record::TrainingRecord;
pub use self::snapshot::Snapshot;
