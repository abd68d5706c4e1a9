//! Test that deriving NamedTuple on a tuple struct produces a compile error.

#![allow(dead_code)]

use nestmap_derive::NamedTuple;

#[derive(NamedTuple)]
struct Point(i64, i64);

fn main() {}
