//! Test that deriving NamedTuple on an enum produces a compile error.

#![allow(dead_code)]

use nestmap_derive::NamedTuple;

#[derive(NamedTuple)]
enum Shape {
    Circle(f64),
    Square(f64),
}

fn main() {}
