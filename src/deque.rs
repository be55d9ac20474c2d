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

//! A persistent, amortized-O(1) double-ended queue.
//!
//! The spine is `Empty`, a `Single` element, or a `Node` holding a `prefix`
//! and `suffix` edge buffer plus a `middle` spine one level deeper, whose
//! own elements are themselves buffers. Pushing an element that would
//! overflow an edge buffer migrates a chunk of it into the middle;
//! popping the last element of an edge buffer borrows a chunk back out.
//! Because the middle only ever grows when an edge buffer is full and only
//! ever shrinks to refill an edge buffer, the spine has depth O(log n) and
//! every end operation touches only a bounded number of spine levels.
//!
//! Rust has no native way to write the literal type of this idea — a
//! `Deque<T>` whose `Node` holds a `Deque<Buffer<T>>` — because that would
//! force the compiler to monomorphize `Deque<T>`, `Deque<Buffer<T>>`,
//! `Deque<Buffer<Buffer<T>>>`, and so on without end. Instead, every
//! `middle` is uniformly typed `Rc<Deque<Elem>>`, where `Elem` is a
//! type-erased handle (`Rc<dyn Any>`). Crossing from depth *k* into depth
//! *k+1* means wrapping a migrating `Buffer` as an `Elem` on the way down
//! and downcasting it back on the way up; the same generic method
//! (`push_front`, `pop_front`, `append`, …) is reused at every depth by
//! simply being called again at `T = Elem`, which is what makes the
//! recursion regular instead of unbounded. See `SPEC_FULL.md` §2 and
//! `DESIGN.md` for the full rationale.

use crate::buffer::Buffer;
use std::any::Any;
use std::fmt;
use std::iter::FromIterator;
use std::rc::Rc;

/// A type-erased handle to one value at some depth of the spine: either a
/// genuine leaf (depth 0) or a migrated `Buffer` of whatever lived one
/// level up (depth ≥ 1).
type Elem = Rc<dyn Any>;

fn wrap<T: 'static>(x: T) -> Elem {
    Rc::new(x)
}

fn unwrap_ref<T: 'static>(e: &Elem) -> &T {
    e.downcast_ref::<T>()
        .expect("type-erased deque element did not hold the expected concrete type")
}

/// Takes ownership of the value an `Elem` wraps, cloning it only if the
/// handle is still shared with another logical deque.
fn unwrap_owned<T: Clone + 'static>(e: Elem) -> T {
    match e.downcast::<T>() {
        Ok(rc) => Rc::try_unwrap(rc).unwrap_or_else(|rc| (*rc).clone()),
        Err(_) => panic!("type-erased deque element did not hold the expected concrete type"),
    }
}

/// A persistent double-ended queue.
///
/// Invariant (checked by construction, never at runtime): a `Node` whose
/// `prefix` and `suffix` are both `Buffer::One` never has an empty
/// `middle` — such a value is represented as the equivalent smaller `Node`
/// or `Single` instead. `len` always equals the exact element count.
pub enum Deque<T> {
    Empty,
    Single(T),
    Node {
        len: usize,
        prefix: Buffer<T>,
        middle: Rc<Deque<Elem>>,
        suffix: Buffer<T>,
    },
}

impl<T: Clone> Clone for Deque<T> {
    fn clone(&self) -> Self {
        match self {
            Deque::Empty => Deque::Empty,
            Deque::Single(a) => Deque::Single(a.clone()),
            Deque::Node { len, prefix, middle, suffix } => Deque::Node {
                len: *len,
                prefix: prefix.clone(),
                middle: Rc::clone(middle),
                suffix: suffix.clone(),
            },
        }
    }
}

impl<T: Clone + 'static> Default for Deque<T> {
    fn default() -> Self {
        Deque::Empty
    }
}

/// Takes ownership of the spine behind an `Rc`, cloning only if it is
/// shared. Mirrors the copy-on-write discipline `xi-rope`'s `Node` docs
/// describe: cheap sharing by default, cloning only when uniqueness can't
/// be proven by the reference count.
fn take_middle(m: Rc<Deque<Elem>>) -> Deque<Elem> {
    Rc::try_unwrap(m).unwrap_or_else(|rc| (*rc).clone())
}

fn split_full_front<T>(full: Buffer<T>, x: T) -> (Buffer<T>, Buffer<T>) {
    match full {
        Buffer::Seven(a, b, c, d, e, f, g) => (Buffer::Four(x, a, b, c), Buffer::Four(d, e, f, g)),
        _ => unreachable!("a buffer only overflows push_front when already holding seven elements"),
    }
}

fn split_full_back<T>(full: Buffer<T>, x: T) -> (Buffer<T>, Buffer<T>) {
    match full {
        Buffer::Seven(a, b, c, d, e, f, g) => (Buffer::Four(a, b, c, d), Buffer::Four(e, f, g, x)),
        _ => unreachable!("a buffer only overflows push_back when already holding seven elements"),
    }
}

/// Rebuilds a whole deque out of what used to be a `suffix`, after the
/// `prefix` has been whittled down to its last element and `middle` was
/// empty. The canonical shapes from `spec.md` §4.2; `len` is simply the
/// suffix's own length, since that's every element left.
fn collapse_after_front_pop<T>(suffix: Buffer<T>) -> Deque<T> {
    match suffix {
        Buffer::One(s) => Deque::Single(s),
        Buffer::Two(s1, s2) => node2(Buffer::One(s1), Buffer::One(s2)),
        Buffer::Three(s1, s2, s3) => node2(Buffer::One(s1), Buffer::Two(s2, s3)),
        Buffer::Four(s1, s2, s3, s4) => node2(Buffer::Two(s1, s2), Buffer::Two(s3, s4)),
        Buffer::Five(s1, s2, s3, s4, s5) => node2(Buffer::One(s1), Buffer::Four(s2, s3, s4, s5)),
        Buffer::Six(s1, s2, s3, s4, s5, s6) => node2(Buffer::One(s1), Buffer::Five(s2, s3, s4, s5, s6)),
        Buffer::Seven(s1, s2, s3, s4, s5, s6, s7) => {
            node2(Buffer::One(s1), Buffer::Six(s2, s3, s4, s5, s6, s7))
        }
    }
}

/// Mirror of `collapse_after_front_pop`, rebuilding out of what used to be
/// a `prefix` after `suffix` has been whittled down to its last element.
fn collapse_after_back_pop<T>(prefix: Buffer<T>) -> Deque<T> {
    match prefix {
        Buffer::One(p) => Deque::Single(p),
        Buffer::Two(p1, p2) => node2(Buffer::One(p1), Buffer::One(p2)),
        Buffer::Three(p1, p2, p3) => node2(Buffer::Two(p1, p2), Buffer::One(p3)),
        Buffer::Four(p1, p2, p3, p4) => node2(Buffer::Two(p1, p2), Buffer::Two(p3, p4)),
        Buffer::Five(p1, p2, p3, p4, p5) => node2(Buffer::Four(p1, p2, p3, p4), Buffer::One(p5)),
        Buffer::Six(p1, p2, p3, p4, p5, p6) => node2(Buffer::Five(p1, p2, p3, p4, p5), Buffer::One(p6)),
        Buffer::Seven(p1, p2, p3, p4, p5, p6, p7) => {
            node2(Buffer::Six(p1, p2, p3, p4, p5, p6), Buffer::One(p7))
        }
    }
}

/// Builds a `Node` with an empty middle out of just a prefix and suffix,
/// computing `len` from their sizes.
fn node2<T>(prefix: Buffer<T>, suffix: Buffer<T>) -> Deque<T> {
    let len = prefix.len() + suffix.len();
    Deque::Node { len, prefix, middle: Rc::new(Deque::Empty), suffix }
}

/// Folds over an erased, depth ≥ 1 spine left to right. `f` is erased
/// (`dyn`) so that lifting it one level deeper for the recursive call does
/// not create a new, ever-growing closure type per level — this is what
/// keeps the recursion in one single compiled function regardless of how
/// deep the real spine goes.
fn fold_raw<B>(d: &Deque<Elem>, seed: B, f: &mut dyn FnMut(B, &Elem) -> B) -> B {
    match d {
        Deque::Empty => seed,
        Deque::Single(e) => f(seed, e),
        Deque::Node { prefix, middle, suffix, .. } => {
            let mut acc = seed;
            for e in prefix.iter() {
                acc = f(acc, e);
            }
            acc = fold_raw(middle, acc, &mut |acc, e: &Elem| {
                let buf = unwrap_ref::<Buffer<Elem>>(e);
                let mut acc = acc;
                for x in buf.iter() {
                    acc = f(acc, x);
                }
                acc
            });
            for e in suffix.iter() {
                acc = f(acc, e);
            }
            acc
        }
    }
}

/// Mirror of `fold_raw`, right to left.
fn fold_raw_rev<B>(d: &Deque<Elem>, seed: B, f: &mut dyn FnMut(&Elem, B) -> B) -> B {
    match d {
        Deque::Empty => seed,
        Deque::Single(e) => f(e, seed),
        Deque::Node { prefix, middle, suffix, .. } => {
            let mut acc = seed;
            for e in suffix.iter().rev() {
                acc = f(e, acc);
            }
            acc = fold_raw_rev(middle, acc, &mut |e: &Elem, acc| {
                let buf = unwrap_ref::<Buffer<Elem>>(e);
                let mut acc = acc;
                for x in buf.iter().rev() {
                    acc = f(x, acc);
                }
                acc
            });
            for e in prefix.iter().rev() {
                acc = f(e, acc);
            }
            acc
        }
    }
}

/// Maps every `Elem` in an erased, depth ≥ 1 spine, recursing the same
/// way `fold_raw` does and for the same reason: `f` is erased so only one
/// compiled function handles every depth.
fn map_raw(d: Deque<Elem>, f: &mut dyn FnMut(Elem) -> Elem) -> Deque<Elem> {
    match d {
        Deque::Empty => Deque::Empty,
        Deque::Single(e) => Deque::Single(f(e)),
        Deque::Node { len, prefix, middle, suffix } => {
            let new_prefix = prefix.map(|e| f(e));
            let new_middle = map_raw(take_middle(middle), &mut |e: Elem| {
                let buf = unwrap_owned::<Buffer<Elem>>(e);
                wrap(buf.map(|x| f(x)))
            });
            let new_suffix = suffix.map(|e| f(e));
            Deque::Node { len, prefix: new_prefix, middle: Rc::new(new_middle), suffix: new_suffix }
        }
    }
}

/// Inserts a freshly grouped chunk of 1 to 4 elements into an already
/// well-shaped deque, maintaining the shape invariants. Used by
/// `from_sequence`; this is the "insertBuffer" routine from `spec.md` §4.3.
fn insert_buffer<T: Clone + 'static>(d: Deque<T>, buf: Buffer<T>) -> Deque<T> {
    match d {
        Deque::Empty => match buf {
            Buffer::One(a) => Deque::Single(a),
            Buffer::Two(a, b) => node2(Buffer::One(a), Buffer::One(b)),
            Buffer::Three(a, b, c) => node2(Buffer::Two(a, b), Buffer::One(c)),
            Buffer::Four(a, b, c, d) => node2(Buffer::Two(a, b), Buffer::Two(c, d)),
            _ => unreachable!("from_sequence chunks are built with 1..=4 elements"),
        },
        Deque::Single(a) => {
            let len = 1 + buf.len();
            Deque::Node { len, prefix: Buffer::One(a), middle: Rc::new(Deque::Empty), suffix: buf }
        }
        Deque::Node { len, prefix, middle, suffix } => {
            let new_len = len + buf.len();
            let new_middle = take_middle(middle).push_back(wrap(suffix));
            Deque::Node { len: new_len, prefix, middle: Rc::new(new_middle), suffix: buf }
        }
    }
}

fn buffer_from_vec<T>(mut v: Vec<T>) -> Buffer<T> {
    match v.len() {
        1 => Buffer::One(v.pop().unwrap()),
        2 => {
            let b = v.pop().unwrap();
            let a = v.pop().unwrap();
            Buffer::Two(a, b)
        }
        3 => {
            let c = v.pop().unwrap();
            let b = v.pop().unwrap();
            let a = v.pop().unwrap();
            Buffer::Three(a, b, c)
        }
        4 => {
            let d = v.pop().unwrap();
            let c = v.pop().unwrap();
            let b = v.pop().unwrap();
            let a = v.pop().unwrap();
            Buffer::Four(a, b, c, d)
        }
        n => unreachable!("chunk size {} out of range", n),
    }
}

impl<T: Clone + 'static> Deque<T> {
    /// The empty deque.
    pub fn empty() -> Deque<T> {
        Deque::Empty
    }

    /// A deque holding exactly `x`.
    pub fn singleton(x: T) -> Deque<T> {
        Deque::Single(x)
    }

    /// `true` iff this deque holds no elements.
    pub fn is_empty(&self) -> bool {
        matches!(self, Deque::Empty)
    }

    /// The number of elements, in O(1).
    pub fn len(&self) -> usize {
        match self {
            Deque::Empty => 0,
            Deque::Single(_) => 1,
            Deque::Node { len, .. } => *len,
        }
    }

    /// A reference to the first element, or `None` if empty.
    pub fn first(&self) -> Option<&T> {
        match self {
            Deque::Empty => None,
            Deque::Single(a) => Some(a),
            Deque::Node { prefix, .. } => Some(prefix.first()),
        }
    }

    /// A reference to the last element, or `None` if empty.
    pub fn last(&self) -> Option<&T> {
        match self {
            Deque::Empty => None,
            Deque::Single(a) => Some(a),
            Deque::Node { suffix, .. } => Some(suffix.last()),
        }
    }

    /// Prepends `x`, in amortized O(1).
    pub fn push_front(self, x: T) -> Deque<T> {
        match self {
            Deque::Empty => Deque::Single(x),
            Deque::Single(a) => node2(Buffer::One(x), Buffer::One(a)),
            Deque::Node { len, prefix, middle, suffix } => match prefix.push_front(x) {
                Ok(prefix) => Deque::Node { len: len + 1, prefix, middle, suffix },
                Err((full, x)) => {
                    let (new_prefix, migrating) = split_full_front(full, x);
                    let new_middle = take_middle(middle).push_front(wrap(migrating));
                    Deque::Node { len: len + 1, prefix: new_prefix, middle: Rc::new(new_middle), suffix }
                }
            },
        }
    }

    /// Appends `x`. Symmetric to `push_front`.
    pub fn push_back(self, x: T) -> Deque<T> {
        match self {
            Deque::Empty => Deque::Single(x),
            Deque::Single(a) => node2(Buffer::One(a), Buffer::One(x)),
            Deque::Node { len, prefix, middle, suffix } => match suffix.push_back(x) {
                Ok(suffix) => Deque::Node { len: len + 1, prefix, middle, suffix },
                Err((full, x)) => {
                    let (migrating, new_suffix) = split_full_back(full, x);
                    let new_middle = take_middle(middle).push_back(wrap(migrating));
                    Deque::Node { len: len + 1, prefix, middle: Rc::new(new_middle), suffix: new_suffix }
                }
            },
        }
    }

    /// Removes the first element, in amortized O(1). Returns `None` (and
    /// the deque unchanged as `Empty`) if it was already empty.
    pub fn pop_front(self) -> (Option<T>, Deque<T>) {
        match self {
            Deque::Empty => (None, Deque::Empty),
            Deque::Single(a) => (Some(a), Deque::Empty),
            Deque::Node { len, prefix, middle, suffix } => {
                if prefix.len() >= 2 {
                    let (head, rest) = prefix.pop_front();
                    let rest = rest.expect("prefix of length >= 2 always yields a remainder");
                    (Some(head), Deque::Node { len: len - 1, prefix: rest, middle, suffix })
                } else {
                    let (head, _) = prefix.pop_front();
                    let middle_owned = take_middle(middle);
                    if middle_owned.is_empty() {
                        (Some(head), collapse_after_front_pop(suffix))
                    } else {
                        let (next, new_middle) = middle_owned.pop_front();
                        match next {
                            Some(e) => {
                                let new_prefix = unwrap_owned::<Buffer<T>>(e);
                                (Some(head), Deque::Node { len: len - 1, prefix: new_prefix, middle: Rc::new(new_middle), suffix })
                            }
                            None => {
                                // A non-empty middle always yields an element; this
                                // branch is seriously wrong and unreachable for a
                                // well-formed deque. Collapse from the surviving
                                // edge rather than panic.
                                (Some(head), collapse_after_front_pop(suffix))
                            }
                        }
                    }
                }
            }
        }
    }

    /// Removes the last element. Symmetric to `pop_front`.
    pub fn pop_back(self) -> (Option<T>, Deque<T>) {
        match self {
            Deque::Empty => (None, Deque::Empty),
            Deque::Single(a) => (Some(a), Deque::Empty),
            Deque::Node { len, prefix, middle, suffix } => {
                if suffix.len() >= 2 {
                    let (tail, rest) = suffix.pop_back();
                    let rest = rest.expect("suffix of length >= 2 always yields a remainder");
                    (Some(tail), Deque::Node { len: len - 1, prefix, middle, suffix: rest })
                } else {
                    let (tail, _) = suffix.pop_back();
                    let middle_owned = take_middle(middle);
                    if middle_owned.is_empty() {
                        (Some(tail), collapse_after_back_pop(prefix))
                    } else {
                        let (next, new_middle) = middle_owned.pop_back();
                        match next {
                            Some(e) => {
                                let new_suffix = unwrap_owned::<Buffer<T>>(e);
                                (Some(tail), Deque::Node { len: len - 1, prefix, middle: Rc::new(new_middle), suffix: new_suffix })
                            }
                            None => (Some(tail), collapse_after_back_pop(prefix)),
                        }
                    }
                }
            }
        }
    }

    /// Concatenates `self` followed by `other`, in amortized O(log n).
    pub fn append(self, other: Deque<T>) -> Deque<T> {
        match (self, other) {
            (Deque::Empty, b) => b,
            (a, Deque::Empty) => a,
            (Deque::Single(x), b) => b.push_front(x),
            (a, Deque::Single(x)) => a.push_back(x),
            (
                Deque::Node { len: la, prefix: pa, middle: ma, suffix: sa },
                Deque::Node { len: lb, prefix: pb, middle: mb, suffix: sb },
            ) => {
                let left_middle = take_middle(ma).push_back(wrap(sa));
                let right_middle = take_middle(mb).push_front(wrap(pb));
                let new_middle = left_middle.append(right_middle);
                Deque::Node { len: la + lb, prefix: pa, middle: Rc::new(new_middle), suffix: sb }
            }
        }
    }

    /// Builds a deque from an iterator, in O(n) amortized, without
    /// materializing the input or recursing once per element (each loop
    /// iteration folds in one 1-to-4-element chunk).
    pub fn from_sequence<I: IntoIterator<Item = T>>(xs: I) -> Deque<T> {
        let mut d = Deque::Empty;
        let mut chunk: Vec<T> = Vec::with_capacity(4);
        for x in xs {
            chunk.push(x);
            if chunk.len() == 4 {
                let buf = buffer_from_vec(std::mem::replace(&mut chunk, Vec::with_capacity(4)));
                d = insert_buffer(d, buf);
            }
        }
        if !chunk.is_empty() {
            d = insert_buffer(d, buffer_from_vec(chunk));
        }
        d
    }

    /// Builds a deque of `n` elements where element `i` is `f(i)`, without
    /// materializing an intermediate sequence. `n <= 0` yields `Empty`.
    pub fn initialize<F: FnMut(i64) -> T>(n: i64, mut f: F) -> Deque<T> {
        if n <= 0 {
            return Deque::Empty;
        }
        Deque::from_sequence((0..n).map(&mut f))
    }

    /// `n` copies of `v`.
    pub fn repeat(n: i64, v: T) -> Deque<T> {
        Deque::initialize(n, |_| v.clone())
    }

    /// Materializes every element into a `Vec`, front to back.
    pub fn to_vec(&self) -> Vec<T> {
        self.foldl(Vec::with_capacity(self.len()), |mut acc, x| {
            acc.push(x.clone());
            acc
        })
    }

    /// Visits every element, front to back.
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        self.foldl((), |(), x| f(x));
    }

    /// Left fold, front to back: `f(f(f(seed, a), b), c)`.
    pub fn foldl<B, F: FnMut(B, &T) -> B>(&self, seed: B, mut f: F) -> B {
        match self {
            Deque::Empty => seed,
            Deque::Single(a) => f(seed, a),
            Deque::Node { prefix, middle, suffix, .. } => {
                let mut acc = seed;
                for x in prefix.iter() {
                    acc = f(acc, x);
                }
                acc = fold_raw(middle, acc, &mut |acc, e: &Elem| {
                    let buf = unwrap_ref::<Buffer<T>>(e);
                    let mut acc = acc;
                    for x in buf.iter() {
                        acc = f(acc, x);
                    }
                    acc
                });
                for x in suffix.iter() {
                    acc = f(acc, x);
                }
                acc
            }
        }
    }

    /// Right fold, back to front: `f(a, f(b, f(c, seed)))`.
    pub fn foldr<B, F: FnMut(&T, B) -> B>(&self, seed: B, mut f: F) -> B {
        match self {
            Deque::Empty => seed,
            Deque::Single(a) => f(a, seed),
            Deque::Node { prefix, middle, suffix, .. } => {
                let mut acc = seed;
                for x in suffix.iter().rev() {
                    acc = f(x, acc);
                }
                acc = fold_raw_rev(middle, acc, &mut |e: &Elem, acc| {
                    let buf = unwrap_ref::<Buffer<T>>(e);
                    let mut acc = acc;
                    for x in buf.iter().rev() {
                        acc = f(x, acc);
                    }
                    acc
                });
                for x in prefix.iter().rev() {
                    acc = f(x, acc);
                }
                acc
            }
        }
    }

    /// Structure-preserving map: every edge buffer and the middle are
    /// mapped in place of the spine shape, which is otherwise untouched.
    pub fn map<U: Clone + 'static, F: FnMut(T) -> U>(self, mut f: F) -> Deque<U> {
        match self {
            Deque::Empty => Deque::Empty,
            Deque::Single(a) => Deque::Single(f(a)),
            Deque::Node { len, prefix, middle, suffix } => {
                let new_prefix = prefix.map(&mut f);
                let new_middle = map_raw(take_middle(middle), &mut |e: Elem| {
                    let buf = unwrap_owned::<Buffer<T>>(e);
                    wrap(buf.map(&mut f))
                });
                let new_suffix = suffix.map(&mut f);
                Deque::Node { len, prefix: new_prefix, middle: Rc::new(new_middle), suffix: new_suffix }
            }
        }
    }

    /// Keeps only elements for which `p` holds, via a left fold that
    /// pushes surviving elements onto a fresh accumulator.
    pub fn filter<P: FnMut(&T) -> bool>(&self, mut p: P) -> Deque<T> {
        let mut acc = Deque::Empty;
        self.for_each(|x| {
            if p(x) {
                let taken = std::mem::replace(&mut acc, Deque::Empty);
                acc = taken.push_back(x.clone());
            }
        });
        acc
    }

    /// Maps and filters in one pass: keeps `f(x)` for every `x` where `f`
    /// returns `Some`.
    pub fn filter_map<U: Clone + 'static, F: FnMut(&T) -> Option<U>>(&self, mut f: F) -> Deque<U> {
        let mut acc = Deque::Empty;
        self.for_each(|x| {
            if let Some(y) = f(x) {
                let taken = std::mem::replace(&mut acc, Deque::Empty);
                acc = taken.push_back(y);
            }
        });
        acc
    }

    /// Splits into `(elements where p holds, elements where it doesn't)`,
    /// each in original relative order.
    pub fn partition<P: FnMut(&T) -> bool>(&self, mut p: P) -> (Deque<T>, Deque<T>) {
        let mut yes = Deque::Empty;
        let mut no = Deque::Empty;
        self.for_each(|x| {
            if p(x) {
                let taken = std::mem::replace(&mut yes, Deque::Empty);
                yes = taken.push_back(x.clone());
            } else {
                let taken = std::mem::replace(&mut no, Deque::Empty);
                no = taken.push_back(x.clone());
            }
        });
        (yes, no)
    }

    /// `true` iff `x` appears anywhere in the deque. Scans front to back
    /// via repeated `pop_front`, short-circuiting on the first match; the
    /// scan is an iterative loop so it is stack-safe regardless of length.
    pub fn member(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        let mut cur = self.clone();
        loop {
            let (head, rest) = cur.pop_front();
            match head {
                Some(y) => {
                    if &y == x {
                        return true;
                    }
                    cur = rest;
                }
                None => return false,
            }
        }
    }

    /// Sequence equality: never compares spine shape, only contents (two
    /// sequences with equal contents may be laid out differently).
    pub fn equals(&self, other: &Deque<T>) -> bool
    where
        T: PartialEq,
    {
        self.len() == other.len() && self.to_vec() == other.to_vec()
    }

    /// Keeps the last `k` elements (the suffix of length `k`). `k <= 0`
    /// yields `Empty`; `k >= len` yields `self` unchanged.
    pub fn right(self, k: i64) -> Deque<T> {
        if k <= 0 {
            return Deque::Empty;
        }
        let len = self.len() as i64;
        if k >= len {
            self
        } else {
            self.drop_left(len - k)
        }
    }

    /// Keeps the first `k` elements. Symmetric to `right`.
    pub fn left(self, k: i64) -> Deque<T> {
        if k <= 0 {
            return Deque::Empty;
        }
        let len = self.len() as i64;
        if k >= len {
            self
        } else {
            self.drop_right(len - k)
        }
    }

    /// Removes the first `n` elements. `n <= 0` leaves the deque
    /// unchanged; `n >= len` yields `Empty`. Runs in O(log n) amortized by
    /// chasing buffers out of the middle instead of popping one element
    /// at a time, falling back to at most a handful of single-element pops
    /// once the residue fits in one edge buffer.
    pub fn drop_left(self, n: i64) -> Deque<T> {
        if n <= 0 {
            return self;
        }
        let total = self.len() as i64;
        if n >= total {
            return Deque::Empty;
        }
        let mut remaining = n as usize;
        let mut cur = self;
        loop {
            match cur {
                Deque::Node { len, prefix, middle, suffix } if remaining >= prefix.len() => {
                    remaining -= prefix.len();
                    let new_len = len - prefix.len();
                    let middle_owned = take_middle(middle);
                    cur = if middle_owned.is_empty() {
                        collapse_after_front_pop(suffix)
                    } else {
                        let (head, new_middle) = middle_owned.pop_front();
                        match head {
                            Some(e) => {
                                let new_prefix = unwrap_owned::<Buffer<T>>(e);
                                Deque::Node { len: new_len, prefix: new_prefix, middle: Rc::new(new_middle), suffix }
                            }
                            None => collapse_after_front_pop(suffix),
                        }
                    };
                }
                other => {
                    cur = other;
                    break;
                }
            }
        }
        for _ in 0..remaining {
            let (_, rest) = cur.pop_front();
            cur = rest;
        }
        cur
    }

    /// Removes the last `n` elements. Symmetric to `drop_left`.
    pub fn drop_right(self, n: i64) -> Deque<T> {
        if n <= 0 {
            return self;
        }
        let total = self.len() as i64;
        if n >= total {
            return Deque::Empty;
        }
        let mut remaining = n as usize;
        let mut cur = self;
        loop {
            match cur {
                Deque::Node { len, prefix, middle, suffix } if remaining >= suffix.len() => {
                    remaining -= suffix.len();
                    let new_len = len - suffix.len();
                    let middle_owned = take_middle(middle);
                    cur = if middle_owned.is_empty() {
                        collapse_after_back_pop(prefix)
                    } else {
                        let (tail, new_middle) = middle_owned.pop_back();
                        match tail {
                            Some(e) => {
                                let new_suffix = unwrap_owned::<Buffer<T>>(e);
                                Deque::Node { len: new_len, prefix, middle: Rc::new(new_middle), suffix: new_suffix }
                            }
                            None => collapse_after_back_pop(prefix),
                        }
                    };
                }
                other => {
                    cur = other;
                    break;
                }
            }
        }
        for _ in 0..remaining {
            let (_, rest) = cur.pop_back();
            cur = rest;
        }
        cur
    }
}

/// `range(lo, hi)` doesn't depend on a caller-chosen element type, so it
/// lives outside the generic impl, mirroring how `spec.md` types it as
/// `(Int, Int) -> Deque<Int>` rather than a generic operation.
pub fn range(lo: i64, hi: i64) -> Deque<i64> {
    if hi < lo {
        Deque::Empty
    } else {
        Deque::initialize(hi - lo + 1, |i| lo + i)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Deque::from_sequence(iter)
    }
}

impl<T: Clone + 'static> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let old = std::mem::replace(self, Deque::Empty);
        *self = old.append(Deque::from_sequence(iter));
    }
}

/// Consuming iterator over a `Deque`, built on repeated `pop_front`. Each
/// step is amortized O(1); nothing is materialized up front.
pub struct IntoIter<T: Clone + 'static>(Deque<T>);

impl<T: Clone + 'static> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let d = std::mem::replace(&mut self.0, Deque::Empty);
        let (x, rest) = d.pop_front();
        self.0 = rest;
        x
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.len();
        (n, Some(n))
    }
}

impl<T: Clone + 'static> ExactSizeIterator for IntoIter<T> {}

impl<T: Clone + 'static> IntoIterator for Deque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

/// Borrowing iteration is implemented via `to_vec`, since a lazy cursor
/// over this representation would need its own explicit traversal stack;
/// `into_iter()` (by value, via repeated `pop_front`) is the lazy path.
impl<'a, T: Clone + 'static> IntoIterator for &'a Deque<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: i64) -> Deque<i64> {
        range(1, n)
    }

    #[test]
    fn empty_basics() {
        let d: Deque<i32> = Deque::empty();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
        assert_eq!(d.first(), None);
        assert_eq!(d.last(), None);
        assert_eq!(d.to_vec(), Vec::<i32>::new());
    }

    #[test]
    fn singleton_equals_push_front_on_empty() {
        let a = Deque::singleton(1);
        let b = Deque::<i32>::empty().push_front(1);
        assert!(a.equals(&b));
    }

    #[test]
    fn range_basics() {
        assert_eq!(range(3, 6).to_vec(), vec![3, 4, 5, 6]);
        assert_eq!(range(3, 3).to_vec(), vec![3]);
        assert_eq!(range(6, 3).to_vec(), Vec::<i64>::new());
    }

    #[test]
    fn repeat_basics() {
        let d = Deque::repeat(3, (0, 0));
        assert_eq!(d.to_vec(), vec![(0, 0), (0, 0), (0, 0)]);
    }

    #[test]
    fn from_sequence_round_trip() {
        let xs: Vec<i64> = (1..=100).collect();
        let d = Deque::from_sequence(xs.clone());
        assert_eq!(d.to_vec(), xs);
        assert_eq!(d.len(), 100);
    }

    #[test]
    fn empty_from_sequence() {
        let d: Deque<i32> = Deque::from_sequence(Vec::new());
        assert!(d.is_empty());
        assert_eq!(d.to_vec(), Vec::new());
    }

    #[test]
    fn push_front_is_cons() {
        let xs: Vec<i64> = (1..=50).collect();
        let d = xs.iter().fold(Deque::empty(), |d, &x| d.push_front(x));
        let mut expected = xs.clone();
        expected.reverse();
        assert_eq!(d.to_vec(), expected);
    }

    #[test]
    fn push_back_is_snoc() {
        let xs: Vec<i64> = (1..=50).collect();
        let d = xs.iter().fold(Deque::empty(), |d, &x| d.push_back(x));
        assert_eq!(d.to_vec(), xs);
    }

    #[test]
    fn pop_front_and_back_invert_push_and_exhaust_to_empty() {
        let d = seq(30);
        let mut cur = d;
        let mut popped = Vec::new();
        loop {
            let (x, rest) = cur.pop_front();
            match x {
                Some(x) => {
                    popped.push(x);
                    cur = rest;
                }
                None => {
                    assert!(rest.is_empty());
                    break;
                }
            }
        }
        assert_eq!(popped, (1..=30).collect::<Vec<_>>());

        let d = seq(30);
        let mut cur = d;
        let mut popped = Vec::new();
        loop {
            let (x, rest) = cur.pop_back();
            match x {
                Some(x) => {
                    popped.push(x);
                    cur = rest;
                }
                None => {
                    assert!(rest.is_empty());
                    break;
                }
            }
        }
        assert_eq!(popped, (1..=30).rev().collect::<Vec<_>>());
    }

    #[test]
    fn spine_independence_across_construction_orders() {
        let xs: Vec<i64> = (1..=40).collect();
        let a = Deque::from_sequence(xs.clone());
        let b = xs.iter().rev().fold(Deque::empty(), |d, &x| d.push_front(x));
        assert!(a.equals(&b));

        // Pop both down to exhaustion in lockstep; every intermediate
        // result must agree even though the two spines were built
        // differently.
        let (mut a, mut b) = (a, b);
        loop {
            let (xa, ra) = a.pop_front();
            let (xb, rb) = b.pop_front();
            assert_eq!(xa, xb);
            if xa.is_none() {
                break;
            }
            a = ra;
            b = rb;
        }
    }

    #[test]
    fn length_agreement() {
        for n in 0..20 {
            let xs: Vec<i64> = (0..n).collect();
            assert_eq!(Deque::from_sequence(xs).len(), n as usize);
        }
    }

    #[test]
    fn equality_agrees_with_sequence_equality() {
        let a = Deque::from_sequence(vec![1, 2, 3]);
        let b = Deque::from_sequence(vec![1, 2, 3]);
        let c = Deque::from_sequence(vec![1, 2, 4]);
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn slice_laws() {
        let xs: Vec<i64> = (0..37).collect();
        let d = Deque::from_sequence(xs.clone());
        for k in 0..40i64 {
            assert_eq!(d.clone().left(k).to_vec(), xs.iter().take(k.max(0) as usize).cloned().collect::<Vec<_>>());
            assert_eq!(d.clone().drop_left(k).to_vec(), xs.iter().skip(k.max(0) as usize).cloned().collect::<Vec<_>>());
            let mut rights: Vec<i64> = xs.iter().rev().take(k.max(0) as usize).cloned().collect();
            rights.reverse();
            assert_eq!(d.clone().right(k).to_vec(), rights);
            let mut drop_rights: Vec<i64> = xs.iter().rev().skip(k.max(0) as usize).cloned().collect();
            drop_rights.reverse();
            assert_eq!(d.clone().drop_right(k).to_vec(), drop_rights);
        }
    }

    #[test]
    fn append_basics() {
        let xs: Vec<i64> = (1..=100).collect();
        let ys: Vec<i64> = (1..=100).collect();
        let d = Deque::from_sequence(xs.clone());
        let both = d.clone().append(Deque::from_sequence(ys.clone()));
        let mut expected = xs.clone();
        expected.extend(ys.clone());
        assert_eq!(both.to_vec(), expected);

        let trimmed = d.clone().append(Deque::from_sequence(ys)).drop_right(13);
        let mut full = xs;
        full.extend(1..=100);
        let mut rev = full.clone();
        rev.reverse();
        let expected_trim: Vec<i64> = {
            let mut r = rev;
            r.truncate(r.len() - 13);
            r.reverse();
            r
        };
        assert_eq!(trimmed.to_vec(), expected_trim);
    }

    #[test]
    fn fold_laws_match_sequence_folds() {
        let xs: Vec<i64> = (1..=25).collect();
        let d = Deque::from_sequence(xs.clone());
        let l = d.foldl(0i64, |acc, x| acc + x);
        let r = d.foldr(0i64, |x, acc| acc + x);
        assert_eq!(l, xs.iter().sum::<i64>());
        assert_eq!(r, xs.iter().sum::<i64>());

        let dl: Vec<i64> = d.foldl(Vec::new(), |mut acc, x| {
            acc.push(*x);
            acc
        });
        assert_eq!(dl, xs);
        let dr: Vec<i64> = d.foldr(Vec::new(), |x, mut acc| {
            acc.insert(0, *x);
            acc
        });
        assert_eq!(dr, xs);
    }

    #[test]
    fn functor_law() {
        let xs: Vec<i64> = (1..=25).collect();
        let d = Deque::from_sequence(xs.clone());
        let mapped = d.map(|x| x * 2);
        let expected = Deque::from_sequence(xs.iter().map(|x| x * 2).collect::<Vec<_>>());
        assert!(mapped.equals(&expected));
    }

    #[test]
    fn filter_filter_map_partition_member() {
        let d = Deque::from_sequence(vec![0, 1, 2, 3, 4]);
        let evens = d.filter(|x| x % 2 == 0);
        assert_eq!(evens.to_vec(), vec![0, 2, 4]);

        let (yes, no) = d.partition(|x| x % 2 == 0);
        assert_eq!(yes.to_vec(), vec![0, 2, 4]);
        assert_eq!(no.to_vec(), vec![1, 3]);

        let fm = d.filter_map(|x| if *x % 2 == 1 { Some(x * 10) } else { None });
        assert_eq!(fm.to_vec(), vec![10, 30]);

        assert!(d.member(&3));
        assert!(!d.member(&99));
    }

    #[test]
    fn deep_nesting_exercises_multiple_spine_levels() {
        // 2000 elements forces several levels of middle-of-middle nesting
        // (each level holds up to 7*7 = 49 elements' worth of buffering
        // before deepening further), so this walks the erasure machinery
        // through more than one crossing.
        let xs: Vec<i64> = (0..2000).collect();
        let d = Deque::from_sequence(xs.clone());
        assert_eq!(d.len(), 2000);
        assert_eq!(d.to_vec(), xs);
        let mapped = d.map(|x| x + 1);
        assert_eq!(mapped.to_vec(), xs.iter().map(|x| x + 1).collect::<Vec<_>>());
    }

    #[test]
    fn stack_safety_at_ten_thousand_elements() {
        let n = 10_000i64;
        let d = Deque::from_sequence(0..n);
        assert_eq!(d.len(), n as usize);

        let sum = d.foldl(0i64, |acc, x| acc + x);
        assert_eq!(sum, (0..n).sum::<i64>());

        let doubled = d.clone().map(|x| x * 2);
        assert_eq!(doubled.len(), n as usize);

        let mut cur = d;
        let mut count = 0;
        loop {
            let (x, rest) = cur.pop_front();
            if x.is_none() {
                break;
            }
            count += 1;
            cur = rest;
        }
        assert_eq!(count, n);

        let mut cur = Deque::from_sequence(0..n);
        let mut count = 0;
        loop {
            let (x, rest) = cur.pop_back();
            if x.is_none() {
                break;
            }
            count += 1;
            cur = rest;
        }
        assert_eq!(count, n);
    }

    #[test]
    fn shared_structure_is_unaffected_by_later_updates() {
        let base = Deque::from_sequence(vec![1, 2, 3]);
        let extended = base.clone().push_back(4);
        assert_eq!(base.to_vec(), vec![1, 2, 3]);
        assert_eq!(extended.to_vec(), vec![1, 2, 3, 4]);
    }
}
