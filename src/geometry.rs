//! Canvas geometry.
//!
//! All coordinates are canvas pixels (points). The origin is the top-left
//! corner of the page; y grows downward. Pointer positions may fall outside
//! the page, so points are signed.

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by `dx`, `dy`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// A width/height pair in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale `self` down (never up) so it fits inside `bounds`, keeping the
    /// aspect ratio. Both dimensions stay at least 1.
    #[must_use]
    pub fn fit_within(self, bounds: Self) -> Self {
        if self.width == 0 || self.height == 0 {
            return Self::new(1, 1);
        }
        if self.width <= bounds.width && self.height <= bounds.height {
            return self;
        }
        let sx = f64::from(bounds.width) / f64::from(self.width);
        let sy = f64::from(bounds.height) / f64::from(self.height);
        let scale = sx.min(sy);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
        Self::new(scaled(self.width), scaled(self.height))
    }
}

/// An axis-aligned rectangle. `x + width` / `y + height` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Build a rect spanning `top_left` to `bottom_right`.
    ///
    /// A corner dragged above or left of the origin collapses the rect to
    /// the 1×1 minimum instead of flipping it.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        let width = i64::from(bottom_right.x) - i64::from(top_left.x);
        let height = i64::from(bottom_right.y) - i64::from(top_left.y);
        Self::new(
            top_left.x,
            top_left.y,
            clamp_extent(width),
            clamp_extent(height),
        )
    }

    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The exclusive bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    pub fn bottom(&self) -> i32 {
        self.y
            .saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// The nearest point to `point` on or inside the rect's edges.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.x, self.right().max(self.x)),
            point.y.clamp(self.y, self.bottom().max(self.y)),
        )
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

fn clamp_extent(extent: i64) -> u32 {
    u32::try_from(extent.max(1)).unwrap_or(u32::MAX)
}

/// Standard paper sizes used for the canvas, in points.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A0,
    A3,
    A4,
    Letter,
}

impl PageSize {
    pub const fn size(self) -> Size {
        match self {
            Self::A0 => Size::new(2384, 3370),
            Self::A3 => Size::new(842, 1191),
            Self::A4 => Size::new(595, 842),
            Self::Letter => Size::new(612, 792),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A0 => "a0",
            Self::A3 => "a3",
            Self::A4 => "a4",
            Self::Letter => "letter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a0" => Some(Self::A0),
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "letter" => Some(Self::Letter),
            _ => None,
        }
    }
}
