use crate::Pos;

/// Axis aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Pos,
    pub max: Pos,
}

impl BoundingBox {
    pub fn new(min: Pos, max: Pos) -> Self {
        Self { min, max }
    }

    /// Bounds of a set of points, or None if there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Pos>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;

        let mut bounds = Self::new(first, first);
        points.for_each(|x| bounds.expand_point(x));
        Some(bounds)
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) / 2.0
    }

    pub fn extent(&self) -> Pos {
        (self.max - self.min).abs()
    }

    pub fn longest_axis(&self) -> usize {
        let lengths = self.extent();

        if lengths.x >= lengths.y && lengths.x >= lengths.z {
            return 0;
        }

        if lengths.y >= lengths.z {
            return 1;
        }

        2
    }

    pub fn expand_point(&mut self, point: &Pos) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}
