//! Clock face rendering.
//!
//! Turns a wall-clock time into a 48x48 RGBA image: an outer ring, a short
//! thick hour hand, a long thin minute hand and a centre dot, all opaque
//! white on a transparent background. Edges are anti-aliased by computing
//! per-pixel coverage from the signed distance to each shape.

use std::f64::consts::PI;
use std::fmt;

use chrono::Timelike;
use image::{Rgba, RgbaImage};

/// Width and height of the rendered icon in pixels.
pub const ICON_SIZE: u32 = 48;

const CENTER: f32 = 24.0;
const RING_RADIUS: f32 = 24.0;
const RING_WIDTH: f32 = 1.0;
const HOUR_HAND_LENGTH: f64 = 15.0;
const HOUR_HAND_WIDTH: f32 = 5.0;
const MINUTE_HAND_LENGTH: f64 = 24.0;
const MINUTE_HAND_WIDTH: f32 = 3.0;
const DOT_RADIUS: f32 = 5.0;

/// Hour-of-day and minute-of-hour observed at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Returns `None` unless `hour < 24` and `minute < 60`.
    #[cfg(test)]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Current local wall-clock time.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn now() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

/// Zero-padded 24-hour `HH:mm`, the tray tooltip text.
impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Offset of a hand's tip from the centre in whole pixels, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandVector {
    pub dx: i32,
    pub dy: i32,
}

impl HandVector {
    fn from_polar(angle: f64, length: f64) -> Self {
        // Offsets are truncated toward zero before drawing.
        Self {
            dx: (angle.sin() * length) as i32,
            dy: -((angle.cos() * length) as i32),
        }
    }
}

/// Hour hand tip; a full turn every 12 hours.
pub fn hour_hand(time: ClockTime) -> HandVector {
    let hour = (time.hour % 12) as f64;
    HandVector::from_polar(hour * PI / 6.0, HOUR_HAND_LENGTH)
}

/// Minute hand tip; a full turn every 60 minutes, reaching the outer ring.
pub fn minute_hand(time: ClockTime) -> HandVector {
    let minute = (time.minute % 60) as f64;
    HandVector::from_polar(minute * PI / 30.0, MINUTE_HAND_LENGTH)
}

/// A rendered clock face. Immutable; replaced on every tick.
#[derive(Debug, Clone)]
pub struct ClockIcon {
    image: RgbaImage,
}

#[cfg_attr(not(windows), allow(dead_code))]
impl ClockIcon {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[cfg(test)]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[3]
    }
}

/// Render the clock face for `time`.
///
/// Pure and deterministic: the same time always yields the same pixels.
pub fn render(time: ClockTime) -> ClockIcon {
    let center = Point::new(CENTER, CENTER);
    let shapes = [
        Shape::Ring {
            center,
            radius: RING_RADIUS,
            width: RING_WIDTH,
        },
        Shape::Segment {
            from: center,
            to: center.offset(hour_hand(time)),
            width: HOUR_HAND_WIDTH,
        },
        Shape::Segment {
            from: center,
            to: center.offset(minute_hand(time)),
            width: MINUTE_HAND_WIDTH,
        },
        Shape::Disc {
            center,
            radius: DOT_RADIUS,
        },
    ];

    let image = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let sample = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        let coverage = shapes
            .iter()
            .map(|shape| shape.coverage(sample))
            .fold(0.0_f32, f32::max);
        Rgba([255, 255, 255, (coverage * 255.0).round() as u8])
    });

    ClockIcon { image }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f32,
    y: f32,
}

impl Point {
    fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn offset(self, v: HandVector) -> Self {
        Self::new(self.x + v.dx as f32, self.y + v.dy as f32)
    }

    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

enum Shape {
    Ring { center: Point, radius: f32, width: f32 },
    /// Straight stroke with flat caps.
    Segment { from: Point, to: Point, width: f32 },
    Disc { center: Point, radius: f32 },
}

impl Shape {
    /// Fraction of a one-pixel box around `p` covered by the shape.
    fn coverage(&self, p: Point) -> f32 {
        (0.5 - self.signed_distance(p)).clamp(0.0, 1.0)
    }

    /// Negative inside, positive outside.
    fn signed_distance(&self, p: Point) -> f32 {
        match *self {
            Shape::Ring {
                center,
                radius,
                width,
            } => (p.distance(center) - radius).abs() - width / 2.0,
            Shape::Disc { center, radius } => p.distance(center) - radius,
            Shape::Segment { from, to, width } => {
                let len = from.distance(to);
                if len <= f32::EPSILON {
                    return f32::INFINITY;
                }
                let (ux, uy) = ((to.x - from.x) / len, (to.y - from.y) / len);
                let (px, py) = (p.x - from.x, p.y - from.y);
                let along = px * ux + py * uy;
                let across = (px * uy - py * ux).abs();

                // Box distance in the stroke's own frame.
                let qx = (along - len / 2.0).abs() - len / 2.0;
                let qy = across - width / 2.0;
                let outside = qx.max(0.0).hypot(qy.max(0.0));
                let inside = qx.max(qy).min(0.0);
                outside + inside
            }
        }
    }
}
