//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
//! NgsVXL
//! ======
//!
//! Crate used to inspect and manipulate voxel maps stored in the Voxlap VXL
//! format, as used by the Ace of Spades family of voxel engines.
//!
//! A [`Map`] keeps a dense solidity bitmap alongside sparse per-column color
//! storage for surface voxels, and keeps both mutually consistent under
//! every mutation. The [`io`] module provides the VXL span codec (bulk and
//! streaming) and a KV6 exporter.
#[macro_use]
extern crate arrayref;
extern crate byteorder;
pub extern crate cgmath;

use cgmath::Vector3;

pub mod io;

mod chunk;
mod geometry;
mod key;
mod map;

pub use self::map::*;

/// Specifies a face of cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Every cube face, ordered to match the KV6 face flag bits
    /// (`1 << index`).
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Get the offset of the neighboring voxel behind the face.
    pub fn delta(&self) -> Vector3<i32> {
        match *self {
            CubeFace::PositiveX => Vector3::new(1, 0, 0),
            CubeFace::NegativeX => Vector3::new(-1, 0, 0),
            CubeFace::PositiveY => Vector3::new(0, 1, 0),
            CubeFace::NegativeY => Vector3::new(0, -1, 0),
            CubeFace::PositiveZ => Vector3::new(0, 0, 1),
            CubeFace::NegativeZ => Vector3::new(0, 0, -1),
        }
    }
}
