//! Points on the plane and grid geometry.
use std::fmt;
use std::ops::Add;

/// A point in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn from_polar(radius: f64, theta: f64) -> Point {
        Point::new(radius * theta.cos(), radius * theta.sin())
    }

    /// Center of the unit cell with index `cell` on a grid `width` cells
    /// wide, numbered row by row.
    pub fn from_cell(cell: usize, width: usize) -> Point {
        let width = width.max(1);
        Point::new((cell % width) as f64, (cell / width) as f64)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Maps cell indices of a `width`-wide grid to their points.
pub fn cell_to_point(width: usize) -> impl Fn(&usize) -> Point + Send + Sync + Clone + 'static {
    move |cell: &usize| Point::from_cell(*cell, width)
}
