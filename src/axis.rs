//! Axis addressing for per-axis calibration and tracking state.

use crate::{Error, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Tracked 3D alignment vector
pub type AlignmentVector = Vector3<f64>;

/// One of the three tracked axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in vector order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Position of this axis in an [`AlignmentVector`]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Lowercase axis name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            other => Err(Error::InvalidInput(format!("Unknown axis: {other}"))),
        }
    }
}

/// Fixed three-slot storage indexed by [`Axis`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "AxisFields<T>", into = "AxisFields<T>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct AxisMap<T> {
    values: [T; 3],
}

impl<T> AxisMap<T> {
    /// Build from x, y and z values
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { values: [x, y, z] }
    }

    /// Build by evaluating `f` for every axis
    pub fn from_fn(mut f: impl FnMut(Axis) -> T) -> Self {
        Self::new(f(Axis::X), f(Axis::Y), f(Axis::Z))
    }

    /// Transform every slot
    pub fn map<U>(&self, mut f: impl FnMut(Axis, &T) -> U) -> AxisMap<U> {
        AxisMap::from_fn(|axis| f(axis, &self[axis]))
    }

    /// Iterate `(axis, value)` pairs in vector order
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T: Clone> AxisMap<T> {
    /// Same value on every axis
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value.clone(), value)
    }
}

impl<T> Index<Axis> for AxisMap<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        &self.values[axis.index()]
    }
}

impl<T> IndexMut<Axis> for AxisMap<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.values[axis.index()]
    }
}

/// Serialized shape of an [`AxisMap`]: `{x, y, z}`
#[derive(Serialize, Deserialize)]
struct AxisFields<T> {
    x: T,
    y: T,
    z: T,
}

impl<T> From<AxisFields<T>> for AxisMap<T> {
    fn from(fields: AxisFields<T>) -> Self {
        Self::new(fields.x, fields.y, fields.z)
    }
}

impl<T> From<AxisMap<T>> for AxisFields<T> {
    fn from(map: AxisMap<T>) -> Self {
        let [x, y, z] = map.values;
        Self { x, y, z }
    }
}
