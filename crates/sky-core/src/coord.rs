//! Integer grid coordinates.
//!
//! The world is a regular voxel grid.  `x` and `z` span the ground plane and
//! `y` is altitude; [`Coordinate2D`] is therefore a ground footprint point
//! `(x, z)`.  [`Coordinate4D`] adds the discrete time axis `t`.
//!
//! All components are `i64` so query windows that reach past the world edge
//! (`x - radius`, …) never underflow.  Distances are spatial only: the
//! "inter-temporal" helpers on `Coordinate4D` ignore `t`.

use std::fmt;
use std::ops::{Add, Sub};

// ── Coordinate2D ──────────────────────────────────────────────────────────────

/// A ground-plane point `(x, z)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate2D {
    pub x: i64,
    pub z: i64,
}

impl Coordinate2D {
    #[inline]
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Lift to 3-D at altitude `y`.
    #[inline]
    pub fn at_height(self, y: i64) -> Coordinate3D {
        Coordinate3D::new(self.x, y, self.z)
    }
}

// ── Coordinate3D ──────────────────────────────────────────────────────────────

/// A voxel position without a time component.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate3D {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coordinate3D {
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_2d(self) -> Coordinate2D {
        Coordinate2D::new(self.x, self.z)
    }

    /// Manhattan distance.
    #[inline]
    pub fn distance_l1(self, other: Coordinate3D) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance_l2(self, other: Coordinate3D) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Euclidean distance to the closed box `[min, max]`; zero when inside.
    pub fn distance_to_box(self, min: Coordinate3D, max: Coordinate3D) -> f64 {
        let clamped = Coordinate3D::new(
            self.x.clamp(min.x, max.x),
            self.y.clamp(min.y, max.y),
            self.z.clamp(min.z, max.z),
        );
        self.distance_l2(clamped)
    }

    /// Product of the components.
    #[inline]
    pub fn volume(self) -> i64 {
        self.x * self.y * self.z
    }
}

impl Add for Coordinate3D {
    type Output = Coordinate3D;
    #[inline]
    fn add(self, rhs: Coordinate3D) -> Coordinate3D {
        Coordinate3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coordinate3D {
    type Output = Coordinate3D;
    #[inline]
    fn sub(self, rhs: Coordinate3D) -> Coordinate3D {
        Coordinate3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Coordinate3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ── Coordinate4D ──────────────────────────────────────────────────────────────

/// A voxel position at a discrete tick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate4D {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub t: i64,
}

impl Coordinate4D {
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64, t: i64) -> Self {
        Self { x, y, z, t }
    }

    #[inline]
    pub fn from_3d(c: Coordinate3D, t: i64) -> Self {
        Self::new(c.x, c.y, c.z, t)
    }

    #[inline]
    pub fn to_3d(self) -> Coordinate3D {
        Coordinate3D::new(self.x, self.y, self.z)
    }

    /// Same cell, any time.
    #[inline]
    pub fn inter_temporal_eq(self, other: Coordinate4D) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }

    /// Spatial Manhattan distance (ignores `t`).
    #[inline]
    pub fn distance_l1(self, other: Coordinate4D) -> i64 {
        self.to_3d().distance_l1(other.to_3d())
    }

    /// Spatial Euclidean distance (ignores `t`).
    #[inline]
    pub fn distance_l2(self, other: Coordinate4D) -> f64 {
        self.to_3d().distance_l2(other.to_3d())
    }

    /// The same cell at tick `t`.
    #[inline]
    pub fn with_t(self, t: i64) -> Self {
        Self { t, ..self }
    }

    /// `[x, y, z, t]`, the layout used by the 4-D index.
    #[inline]
    pub fn to_array(self) -> [i64; 4] {
        [self.x, self.y, self.z, self.t]
    }
}

impl Add for Coordinate4D {
    type Output = Coordinate4D;
    #[inline]
    fn add(self, rhs: Coordinate4D) -> Coordinate4D {
        Coordinate4D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.t + rhs.t)
    }
}

/// Spatial offset; `t` is unchanged.
impl Add<Coordinate3D> for Coordinate4D {
    type Output = Coordinate4D;
    #[inline]
    fn add(self, rhs: Coordinate3D) -> Coordinate4D {
        Coordinate4D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.t)
    }
}

impl Sub for Coordinate4D {
    type Output = Coordinate4D;
    #[inline]
    fn sub(self, rhs: Coordinate4D) -> Coordinate4D {
        Coordinate4D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.t - rhs.t)
    }
}

impl fmt::Display for Coordinate4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.t)
    }
}
