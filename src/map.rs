//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
use cgmath::{Vector2, Vector3};

use chunk::{Chunk, CHUNK_SIZE};
use geometry::Geometry;
use key;
use CubeFace;

/// An editable cuboid voxel map.
///
/// The map maintains two views of the same volume that are kept mutually
/// consistent under every mutation:
///
///  - a dense bitmap recording which voxels are solid, and
///  - per-tile sorted arrays of *block entries* storing the color of every
///    surface voxel (a solid voxel with at least one exposed face).
///
/// Interior solid voxels carry no entry; when queried, their color is
/// regenerated deterministically by [`default_color`].
///
/// The Z axis grows downward: `z = 0` is the top of the world. Coordinates
/// outside the map count as solid on the four lateral sides and below the
/// floor, and as air above the sky (`z < 0`).
#[derive(Debug, Clone)]
pub struct Map {
    size: Vector3<usize>,
    geometry: Geometry,
    chunks: Vec<Chunk>,
    chunks_x: usize,
}

/// Reason for a [`Map::validate`] failure.
pub type ValidationError = &'static str;

/// Generate the color a solid voxel exposes when no stored color exists
/// for it.
///
/// The color is derived from the position alone, so a voxel buried and
/// later re-exposed always comes back with the same color.
pub fn default_color(pos: Vector3<usize>) -> u32 {
    let mut c = pos.x as u32 ^ ((pos.y as u32) << 8) ^ ((pos.z as u32) << 16);

    // randomize
    c ^= c << 13;
    c ^= c >> 17;
    c ^= c << 5;
    c ^= c << 13;
    c ^= c >> 17;
    c ^= c << 5;

    0x7F000000 | (c & 0xFFFFFF)
}

impl Map {
    /// Construct a `Map` holding a flat floor at `z = size.z - 1`.
    ///
    /// - `size.x` and `size.y` must be in the range `[1, 4096]`.
    /// - `size.z` must be in the range `[1, 256]`.
    pub fn new(size: Vector3<usize>) -> Self {
        let mut map = Map::with_geometry(Geometry::empty(size), size);
        for y in 0..size.y {
            for x in 0..size.x {
                let pos = Vector3::new(x, y, size.z - 1);
                map.set(
                    Vector3::new(x as i32, y as i32, (size.z - 1) as i32),
                    default_color(pos),
                );
            }
        }
        map
    }

    /// Construct a `Map` with every voxel solid and no entries.
    ///
    /// This is the decoder's starting point; the decoder is responsible for
    /// carving the air runs and appending the surface colors.
    pub(crate) fn all_solid(size: Vector3<usize>) -> Self {
        Map::with_geometry(Geometry::solid(size), size)
    }

    fn with_geometry(geometry: Geometry, size: Vector3<usize>) -> Self {
        assert!(size.x >= 1 && size.x <= 4096, "size.x out of range");
        assert!(size.y >= 1 && size.y <= 4096, "size.y out of range");
        assert!(size.z >= 1 && size.z <= 256, "size.z out of range");

        let chunks_x = (size.x + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let chunks_y = (size.y + CHUNK_SIZE - 1) / CHUNK_SIZE;
        Map {
            size,
            geometry,
            chunks: (0..chunks_x * chunks_y).map(|_| Chunk::new()).collect(),
            chunks_x,
        }
    }

    /// Get the dimensions of the map.
    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    /// Check whether a position lies inside the map bounds.
    pub fn is_inside(&self, pos: Vector3<i32>) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.z >= 0 && pos.x < self.size.x as i32
            && pos.y < self.size.y as i32 && pos.z < self.size.z as i32
    }

    /// Check whether the voxel at a position is solid.
    ///
    /// Out-of-bounds positions count as solid, except above the sky
    /// (`z < 0`) which counts as air.
    pub fn is_solid(&self, pos: Vector3<i32>) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.size.x as i32
            || pos.y >= self.size.y as i32 || pos.z >= self.size.z as i32
        {
            return true;
        }
        if pos.z < 0 {
            return false;
        }
        self.geometry
            .get(pos.x as usize, pos.y as usize, pos.z as usize)
    }

    /// Check whether the voxel at a position has at least one non-solid
    /// neighbor.
    pub fn on_surface(&self, pos: Vector3<i32>) -> bool {
        CubeFace::ALL
            .iter()
            .any(|face| !self.is_solid(pos + face.delta()))
    }

    /// Get the color of the voxel at a position.
    ///
    /// Returns zero if the position is out of bounds or the voxel is air.
    /// Solid voxels without a stored color (buried interiors) yield
    /// [`default_color`].
    pub fn get(&self, pos: Vector3<i32>) -> u32 {
        if !self.is_inside(pos) {
            return 0;
        }
        let (x, y, z) = (pos.x as usize, pos.y as usize, pos.z as usize);
        if !self.geometry.get(x, y, z) {
            return 0;
        }
        match self.chunk(x, y).find(key::pack(x, y, z)) {
            Some(block) => block.color,
            None => default_color(Vector3::new(x, y, z)),
        }
    }

    /// Find the topmost solid voxel of the column at `pos`.
    ///
    /// Returns the voxel's color and Z coordinate. `None` is returned for a
    /// position outside the lateral bounds; an all-air column yields
    /// `(0, depth)`.
    pub fn top(&self, pos: Vector2<i32>) -> Option<(u32, usize)> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.size.x as i32
            || pos.y >= self.size.y as i32
        {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        let z = (0..self.size.z)
            .find(|&z| self.geometry.get(x, y, z))
            .unwrap_or(self.size.z);
        Some((self.get(Vector3::new(pos.x, pos.y, z as i32)), z))
    }

    /// Make the voxel at a position solid, with the given color.
    ///
    /// A neighbor whose last exposed face this voxel covers loses its
    /// stored color; it stays solid. Out-of-bounds positions are ignored.
    pub fn set(&mut self, pos: Vector3<i32>, color: u32) {
        if !self.is_inside(pos) {
            return;
        }
        self.store_color(pos, color);
        self.geometry
            .set(pos.x as usize, pos.y as usize, pos.z as usize, true);

        for face in CubeFace::ALL.iter() {
            let n = pos + face.delta();
            if self.is_solid(n) && !self.on_surface(n) {
                self.forget_color(n);
            }
        }
    }

    /// Make the voxel at a position air.
    ///
    /// A buried neighbor that the removal exposes materializes an entry
    /// carrying its [`default_color`]. Out-of-bounds positions are ignored.
    pub fn set_air(&mut self, pos: Vector3<i32>) {
        if !self.is_inside(pos) {
            return;
        }

        // A neighbor receives a new entry only if it was buried before the
        // removal and is exposed after it.
        let mut buried = [false; 6];
        for (face, slot) in CubeFace::ALL.iter().zip(buried.iter_mut()) {
            let n = pos + face.delta();
            *slot = self.is_solid(n) && !self.on_surface(n);
        }

        self.forget_color(pos);
        self.geometry
            .set(pos.x as usize, pos.y as usize, pos.z as usize, false);

        for (face, &was_buried) in CubeFace::ALL.iter().zip(buried.iter()) {
            let n = pos + face.delta();
            if was_buried && self.is_inside(n) && self.on_surface(n) {
                let p = Vector3::new(n.x as usize, n.y as usize, n.z as usize);
                self.store_color(n, default_color(p));
            }
        }
    }

    /// Store a color entry for a voxel, unless the voxel is solid with no
    /// exposed face (a buried voxel has nowhere to keep a color).
    fn store_color(&mut self, pos: Vector3<i32>, color: u32) {
        if !self.is_inside(pos) {
            return;
        }
        let (x, y, z) = (pos.x as usize, pos.y as usize, pos.z as usize);
        if self.geometry.get(x, y, z) && !self.on_surface(pos) {
            return;
        }
        self.chunk_mut(x, y).insert(key::pack(x, y, z), color);
    }

    /// Drop the color entry of a voxel, leaving its solidity untouched.
    fn forget_color(&mut self, pos: Vector3<i32>) {
        if !self.is_inside(pos) {
            return;
        }
        let (x, y, z) = (pos.x as usize, pos.y as usize, pos.z as usize);
        if !self.geometry.get(x, y, z) {
            return;
        }
        self.chunk_mut(x, y).remove(key::pack(x, y, z));
    }

    /// Validate the mutual consistency of the solidity bitmap and the
    /// block entries.
    ///
    /// Checks that entries are strictly ordered within their chunk, that
    /// every entry denotes a solid surface voxel of the chunk's own tile,
    /// and that every solid surface voxel owns an entry.
    pub fn validate(&self) -> Result<(), (Vector3<usize>, ValidationError)> {
        for (index, chunk) in self.chunks.iter().enumerate() {
            let mut last = None;
            for block in chunk.blocks() {
                let pos = Vector3::new(
                    key::x(block.position),
                    key::y(block.position),
                    key::z(block.position),
                );
                if last.map_or(false, |last| block.position <= last) {
                    return Err((pos, "entries out of order"));
                }
                last = Some(block.position);
                if pos.x >= self.size.x || pos.y >= self.size.y || pos.z >= self.size.z {
                    return Err((pos, "entry out of bounds"));
                }
                if self.chunk_index(pos.x, pos.y) != index {
                    return Err((pos, "entry in the wrong chunk"));
                }
                if !self.geometry.get(pos.x, pos.y, pos.z) {
                    return Err((pos, "entry for an air voxel"));
                }
                let ipos = Vector3::new(pos.x as i32, pos.y as i32, pos.z as i32);
                if !self.on_surface(ipos) {
                    return Err((pos, "entry for a buried voxel"));
                }
            }
        }

        for y in 0..self.size.y {
            for x in 0..self.size.x {
                for z in 0..self.size.z {
                    if !self.geometry.get(x, y, z) {
                        continue;
                    }
                    let ipos = Vector3::new(x as i32, y as i32, z as i32);
                    if self.on_surface(ipos)
                        && self.chunk(x, y).find(key::pack(x, y, z)).is_none()
                    {
                        return Err((Vector3::new(x, y, z), "surface voxel has no entry"));
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn chunk_index(&self, x: usize, y: usize) -> usize {
        x / CHUNK_SIZE + y / CHUNK_SIZE * self.chunks_x
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Append a block entry, bypassing the surface bookkeeping.
    ///
    /// Only the decoder uses this; it feeds keys in strictly increasing
    /// order per chunk.
    pub(crate) fn push_block(&mut self, x: usize, y: usize, z: usize, color: u32) {
        let index = self.chunk_index(x, y);
        self.chunks[index].push(key::pack(x, y, z), color);
    }

    /// Get the total number of block entries.
    pub(crate) fn num_blocks(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.len()).sum()
    }

    #[inline]
    fn chunk(&self, x: usize, y: usize) -> &Chunk {
        &self.chunks[self.chunk_index(x, y)]
    }

    #[inline]
    fn chunk_mut(&mut self, x: usize, y: usize) -> &mut Chunk {
        let index = self.chunk_index(x, y);
        &mut self.chunks[index]
    }
}
