//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
//! The KV6 point-sprite exporter.
//!
//! KV6 stores one record per surface voxel, followed by per-X and
//! per-column record counts:
//!
//! ```text
//! <kv6> ::= "Kvxl" <width> <height> <depth> <pivot-x> <pivot-y> <pivot-z>
//!           <num-blocks> { <block> } { <x-count> } { <xy-count> }
//!
//! <block> ::= U32 U16 U8 U8    ; color, z, visible faces, normal
//! ```
//!
//! Dimensions and counts are little-endian `U32`s, the pivot is three
//! little-endian `F32`s (half the dimensions), and the per-column counts
//! are little-endian `I16`s. A block's face flag `1 << i` is set iff the
//! neighbor behind `CubeFace::ALL[i]` is solid. The normal index is
//! unused and written as zero.
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use cgmath::Vector3;

use key;
use CubeFace;
use Map;

/// Export the map's surface voxels to a writer in the KV6 format.
pub fn to_writer<W: Write>(map: &Map, writer: &mut W) -> io::Result<()> {
    let size = map.size();

    writer.write_all(b"Kvxl")?;
    writer.write_u32::<LittleEndian>(size.x as u32)?;
    writer.write_u32::<LittleEndian>(size.y as u32)?;
    writer.write_u32::<LittleEndian>(size.z as u32)?;
    writer.write_f32::<LittleEndian>(size.x as f32 / 2.0)?;
    writer.write_f32::<LittleEndian>(size.y as f32 / 2.0)?;
    writer.write_f32::<LittleEndian>(size.z as f32 / 2.0)?;
    writer.write_u32::<LittleEndian>(map.num_blocks() as u32)?;

    let mut x_counts = vec![0u32; size.x];
    let mut xy_counts = vec![0i16; size.x * size.y];
    let mut cursors = vec![0; map.chunks().len()];

    for y in 0..size.y {
        for x in 0..size.x {
            let co = map.chunk_index(x, y);
            let blocks = map.chunks()[co].blocks();
            let column = key::pack(x, y, 0);

            while cursors[co] < blocks.len()
                && key::column(blocks[cursors[co]].position) == column
            {
                let block = &blocks[cursors[co]];
                cursors[co] += 1;
                let z = key::z(block.position);

                let mut visfaces = 0u8;
                for (index, face) in CubeFace::ALL.iter().enumerate() {
                    let n = Vector3::new(x as i32, y as i32, z as i32) + face.delta();
                    if map.is_solid(n) {
                        visfaces |= 1 << index;
                    }
                }

                writer.write_u32::<LittleEndian>(block.color & 0xFFFFFF)?;
                writer.write_u16::<LittleEndian>(z as u16)?;
                writer.write_u8(visfaces)?;
                writer.write_u8(0)?;

                x_counts[x] += 1;
                xy_counts[x + y * size.x] += 1;
            }
        }
    }

    for &count in x_counts.iter() {
        writer.write_u32::<LittleEndian>(count)?;
    }
    for &count in xy_counts.iter() {
        writer.write_i16::<LittleEndian>(count)?;
    }
    Ok(())
}

/// Export the map to a KV6 file.
pub fn to_file<P: AsRef<Path>>(map: &Map, path: P) -> io::Result<()> {
    to_writer(map, &mut File::create(path)?)
}
