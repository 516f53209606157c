#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Angle = euclid::Angle<f64>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Point at `length` along `angle` (radians, y axis pointing down) from `origin`.
pub fn polar(origin: Point, angle: f64, length: f64) -> Point {
    origin + Vector::from_angle_and_length(Angle::radians(angle), length)
}

/// Length and orientation of the segment `from -> to`, as `(length, atan2(dy, dx))`.
pub fn segment_polar(from: Point, to: Point) -> (f64, f64) {
    let d = to - from;
    (d.length(), d.y.atan2(d.x))
}
