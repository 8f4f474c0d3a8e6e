//! Drawing primitives, GeoJSON geometry, and coordinate normalization.
//!
//! The drawing surface reports primitives in screen units. The
//! [`CoordinateNormalizer`] divides every value by a fixed scale factor to
//! produce the coordinates written to disk and to the export archive. Save
//! and export both go through the same normalizer so the two paths never
//! disagree.

use serde::{Deserialize, Serialize};

/// Divisor applied to screen units when no other scale is configured.
pub const DEFAULT_SCALE: f64 = 100_000.0;

/// An `[x, y]` coordinate pair.
pub type Position = [f64; 2];

/// A polygon as a list of linear rings; the first ring is the outer boundary.
pub type PolygonCoords = Vec<Vec<Position>>;

/// An ordered list of positions.
pub type LineCoords = Vec<Position>;

/// Edge length of the fallback polygon emitted for undrawn units.
const FALLBACK_EXTENT: f64 = 0.0001;

/// Edge length of the fixed building/level footprint.
const FOOTPRINT_EXTENT: f64 = 0.001;

/// GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: LineCoords },
    Polygon { coordinates: PolygonCoords },
}

impl Geometry {
    pub fn point(coordinates: Position) -> Self {
        Self::Point { coordinates }
    }

    pub fn as_point(&self) -> Option<Position> {
        match self {
            Self::Point { coordinates } => Some(*coordinates),
            _ => None,
        }
    }
}

/// Caller-declared geometry type for fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Point,
    LineString,
}

/// Coordinates of unknown shape, as found in loosely typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Point(Position),
    Line(LineCoords),
    Polygon(PolygonCoords),
}

/// An axis-aligned rectangle on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Horizontal stretch applied by the surface after creation.
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    /// Vertical stretch applied by the surface after creation.
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

impl RectPrimitive {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Rendered width.
    pub fn effective_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Rendered height.
    pub fn effective_height(&self) -> f64 {
        self.height * self.scale_y
    }
}

/// A circle placed by its top-left anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePrimitive {
    pub left: f64,
    pub top: f64,
    pub radius: f64,
}

/// A straight segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A visual primitive as reported by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Rect(RectPrimitive),
    Circle(CirclePrimitive),
    Line(LinePrimitive),
}

impl Primitive {
    pub fn as_rect(&self) -> Option<&RectPrimitive> {
        match self {
            Self::Rect(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<&CirclePrimitive> {
        match self {
            Self::Circle(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LinePrimitive> {
        match self {
            Self::Line(l) => Some(l),
            _ => None,
        }
    }
}

/// Result of normalizing a single primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedGeometry {
    Polygon {
        rings: PolygonCoords,
        display_point: Position,
    },
    Point(Position),
    Line(LineCoords),
}

/// Converts screen-space primitives into export coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateNormalizer {
    scale: f64,
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

impl CoordinateNormalizer {
    /// Create a normalizer with the given divisor. Non-positive or non-finite
    /// values fall back to [`DEFAULT_SCALE`].
    pub fn new(scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            Self { scale }
        } else {
            Self::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen point to export position.
    pub fn position(&self, x: f64, y: f64) -> Position {
        [x / self.scale, y / self.scale]
    }

    /// Export position back to screen units.
    pub fn denormalize(&self, position: Position) -> (f64, f64) {
        (position[0] * self.scale, position[1] * self.scale)
    }

    /// Closed 5-point ring: top-left, bottom-left, bottom-right, top-right,
    /// top-left.
    pub fn rect_polygon(&self, rect: Option<&RectPrimitive>) -> PolygonCoords {
        let Some(rect) = rect else {
            return fallback_polygon();
        };

        let left = rect.left / self.scale;
        let top = rect.top / self.scale;
        let width = rect.effective_width() / self.scale;
        let height = rect.effective_height() / self.scale;

        vec![vec![
            [left, top],
            [left, top + height],
            [left + width, top + height],
            [left + width, top],
            [left, top],
        ]]
    }

    /// Rectangle center, scaled.
    pub fn rect_display_point(&self, rect: Option<&RectPrimitive>) -> Position {
        match rect {
            Some(rect) => self.position(
                rect.left + rect.effective_width() / 2.0,
                rect.top + rect.effective_height() / 2.0,
            ),
            None => [0.0, 0.0],
        }
    }

    /// Placement anchor of a circle. The radius is not applied.
    pub fn circle_point(&self, circle: Option<&CirclePrimitive>) -> Position {
        match circle {
            Some(c) => self.position(c.left, c.top),
            None => [0.0, 0.0],
        }
    }

    /// Both endpoints of a line, scaled independently.
    pub fn line(&self, line: Option<&LinePrimitive>) -> LineCoords {
        match line {
            Some(l) => vec![self.position(l.x1, l.y1), self.position(l.x2, l.y2)],
            None => fallback_line(),
        }
    }

    pub fn normalize(&self, primitive: &Primitive) -> NormalizedGeometry {
        match primitive {
            Primitive::Rect(r) => NormalizedGeometry::Polygon {
                rings: self.rect_polygon(Some(r)),
                display_point: self.rect_display_point(Some(r)),
            },
            Primitive::Circle(c) => NormalizedGeometry::Point(self.circle_point(Some(c))),
            Primitive::Line(l) => NormalizedGeometry::Line(self.line(Some(l))),
        }
    }

    /// Rebuild a rectangle from the bounding box of a polygon's outer ring.
    pub fn rect_from_polygon(&self, polygon: &PolygonCoords) -> Option<RectPrimitive> {
        let ring = polygon.first()?;
        let (min, max) = bounding_box(ring)?;
        let (left, top) = self.denormalize(min);
        let (right, bottom) = self.denormalize(max);
        Some(RectPrimitive::new(left, top, right - left, bottom - top))
    }

    /// Rebuild a circle anchored at a stored point.
    pub fn circle_from_point(&self, point: Position, radius: f64) -> CirclePrimitive {
        let (left, top) = self.denormalize(point);
        CirclePrimitive { left, top, radius }
    }

    /// Rebuild a line from its first two stored points.
    pub fn line_from_coords(&self, coords: &[Position]) -> Option<LinePrimitive> {
        match coords {
            [a, b, ..] => {
                let (x1, y1) = self.denormalize(*a);
                let (x2, y2) = self.denormalize(*b);
                Some(LinePrimitive { x1, y1, x2, y2 })
            }
            _ => None,
        }
    }
}

/// Minimal polygon emitted when no rectangle is attached.
pub fn fallback_polygon() -> PolygonCoords {
    square(FALLBACK_EXTENT)
}

/// Minimal line emitted when no line is attached.
pub fn fallback_line() -> LineCoords {
    vec![[0.0, 0.0], [0.0, FALLBACK_EXTENT]]
}

/// Fixed footprint used for buildings and levels, which are not drawn.
pub fn default_footprint() -> PolygonCoords {
    square(FOOTPRINT_EXTENT)
}

/// Unit square anchored at the origin, used when a feature has no polygon.
pub fn unit_square() -> PolygonCoords {
    square(1.0)
}

fn square(extent: f64) -> PolygonCoords {
    vec![vec![
        [0.0, 0.0],
        [0.0, extent],
        [extent, extent],
        [extent, 0.0],
        [0.0, 0.0],
    ]]
}

/// Whether a ring is closed and long enough to be a valid linear ring.
pub fn ring_is_closed(ring: &[Position]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last()
}

/// `(min, max)` corners of a ring. `None` for an empty ring.
pub fn bounding_box(ring: &[Position]) -> Option<(Position, Position)> {
    let first = *ring.first()?;
    Some(ring.iter().fold((first, first), |(min, max), p| {
        (
            [min[0].min(p[0]), min[1].min(p[1])],
            [max[0].max(p[0]), max[1].max(p[1])],
        )
    }))
}

/// Center of a polygon's outer-ring bounding box.
pub fn polygon_center(polygon: &PolygonCoords) -> Option<Position> {
    let (min, max) = bounding_box(polygon.first()?)?;
    Some([(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0])
}

/// Parse user-typed `"x, y"` text. Anything other than exactly two numbers
/// yields `[0, 0]`.
pub fn parse_coordinates(text: &str) -> Position {
    let parts: Vec<f64> = text
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .unwrap_or_default();
    match parts.as_slice() {
        [x, y] => [*x, *y],
        _ => [0.0, 0.0],
    }
}

fn unit_scale() -> f64 {
    1.0
}
