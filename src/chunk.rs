//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
//! Sorted block entry storage for a tile of columns.

/// The side length of the square tile of columns covered by one `Chunk`.
pub const CHUNK_SIZE: usize = 16;

/// The number of block entries a chunk's storage grows or shrinks by at a
/// time.
const CHUNK_GROWTH: usize = 512;

/// A surface voxel together with its color.
///
/// `position` is a packed key (see the `key` module) and `color` holds the
/// voxel color in the `0xAARRGGBB` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub position: u32,
    pub color: u32,
}

/// The block entries of one 16×16 tile of columns, sorted ascending by
/// position key.
#[derive(Debug, Clone)]
pub struct Chunk {
    blocks: Vec<Block>,
}

impl Chunk {
    /// Construct an empty `Chunk` with room for two fully populated layers.
    pub fn new() -> Self {
        Chunk {
            blocks: Vec::with_capacity(CHUNK_SIZE * CHUNK_SIZE * 2),
        }
    }

    /// Get the entries, sorted ascending by position key.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    fn reserve_growth(&mut self) {
        if self.blocks.len() == self.blocks.capacity() {
            self.blocks.reserve_exact(CHUNK_GROWTH);
        }
    }

    /// Append an entry, assuming its key sorts after every stored entry.
    ///
    /// The decoder feeds positions in strictly increasing key order, which
    /// keeps the array sorted without a search.
    pub fn push(&mut self, position: u32, color: u32) {
        debug_assert!(self.blocks.last().map_or(true, |b| b.position < position));
        self.reserve_growth();
        self.blocks.push(Block { position, color });
    }

    /// Insert an entry at its sorted location, overwriting the color if the
    /// key is already present.
    pub fn insert(&mut self, position: u32, color: u32) {
        match self.blocks.binary_search_by_key(&position, |b| b.position) {
            Ok(at) => self.blocks[at].color = color,
            Err(at) => {
                self.reserve_growth();
                self.blocks.insert(at, Block { position, color });
            }
        }
    }

    /// Look up the entry with the given key.
    pub fn find(&self, position: u32) -> Option<&Block> {
        self.blocks
            .binary_search_by_key(&position, |b| b.position)
            .ok()
            .map(|at| &self.blocks[at])
    }

    /// Remove the entry with the given key, if present.
    pub fn remove(&mut self, position: u32) {
        if let Ok(at) = self.blocks.binary_search_by_key(&position, |b| b.position) {
            self.blocks.remove(at);
            if self.blocks.capacity() - self.blocks.len() >= CHUNK_GROWTH * 2 {
                let target = self.blocks.capacity() - CHUNK_GROWTH;
                self.blocks.shrink_to(target);
            }
        }
    }
}
