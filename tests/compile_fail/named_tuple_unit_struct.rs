//! Test that deriving NamedTuple on a unit struct produces a compile error.

#![allow(dead_code)]

use nestmap_derive::NamedTuple;

#[derive(NamedTuple)]
struct Marker;

fn main() {}
