//! Axis-aligned bounding rectangles in degree space.
//!
//! The X axis carries latitude and the Y axis carries longitude. Every
//! rectangle the index builds follows that convention.

use nearjobs_types::GeoPoint;

/// A minimum bounding rectangle.
///
/// `min_x <= max_x` and `min_y <= max_y` always hold. Zero-area rectangles are
/// legal but never overlap anything, not even themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build a rectangle from its bounds, swapping any inverted pair.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: max_x.max(min_x),
            min_y: min_y.min(max_y),
            max_y: max_y.max(min_y),
        }
    }

    /// The rectangle around `point` padded by `pad` degrees in every direction.
    pub fn around(point: GeoPoint, pad: f64) -> Self {
        Self {
            min_x: point.latitude - pad,
            max_x: point.latitude + pad,
            min_y: point.longitude - pad,
            max_y: point.longitude + pad,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        (self.height() * self.width()).abs()
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn expand_to_accommodate(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Separating-axis overlap test. Touching edges count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.area() == 0.0 || other.area() == 0.0 {
            return false;
        }

        if self.min_x > other.max_x || other.min_x > self.max_x {
            return false;
        }

        if self.min_y > other.max_y || other.min_y > self.max_y {
            return false;
        }

        true
    }

    /// True when `other` sits strictly inside `self`, so inserting it would not
    /// grow `self`.
    pub fn contains_without_expansion(&self, other: &Rect) -> bool {
        if self.area() < other.area() {
            return false;
        }

        let fits_x = self.min_x < other.min_x && other.max_x < self.max_x;
        let fits_y = self.min_y < other.min_y && other.max_y < self.max_y;
        fits_x && fits_y
    }

    /// Area of `self` grown to cover `other`, as a percentage of the area of
    /// `self`. 100 means no growth is needed.
    ///
    /// A zero-area `self` needs infinite growth, unless `other` has zero area too.
    pub fn percent_expansion_needed(&self, other: &Rect) -> f64 {
        let area = self.area();
        if area == 0.0 {
            return if other.area() == 0.0 { 0.0 } else { f64::INFINITY };
        }

        (self.expand_to_accommodate(other).area() * 100.0) / area
    }

    /// Lower and upper bound along one axis.
    #[inline]
    pub(crate) fn bounds(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
        }
    }

    /// Union of an iterator of rectangles, `None` when it is empty.
    pub fn union_all<'a, I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, rect| match acc {
                Some(union) => Some(union.expand_to_accommodate(rect)),
                None => Some(*rect),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}
