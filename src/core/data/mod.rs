use std::{fmt, hash::Hash};

pub mod map;

/// Values that can be interned by an `Encoder` or used as map keys.
pub trait Data: PartialEq + Eq + Hash + Clone + fmt::Debug {}

impl<T: PartialEq + Eq + Hash + Clone + fmt::Debug> Data for T {}
