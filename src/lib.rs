// Copyright 2016 Google Inc. All rights reserved.
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

//! A persistent, immutable double-ended queue, built from bounded edge
//! buffers around a recursively shallower middle spine (the common
//! "2-3 finger tree" shape). All operations return a new `Deque` and
//! leave the original untouched; structure is shared between versions
//! via `Rc`, so branching off an old version is cheap and never mutates
//! what other code might still be holding.
//!
//! ```
//! use xi_deque::Deque;
//!
//! let d = Deque::from_sequence(vec![1, 2, 3]);
//! let d2 = d.clone().push_back(4);
//! assert_eq!(d.to_vec(), vec![1, 2, 3]);
//! assert_eq!(d2.to_vec(), vec![1, 2, 3, 4]);
//! ```

pub mod buffer;
pub mod deque;

pub use crate::buffer::Buffer;
pub use crate::deque::{range, Deque};
