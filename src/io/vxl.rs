//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
//! The [Voxlap] VXL column codec.
//!
//! [Voxlap](http://advsys.net/ken/voxlap.htm)
//!
//! # VXL Data Specification
//!
//! A VXL stream is a concatenation of columns in Y-major, X-minor order.
//! Each column is a nonempty sequence of spans:
//!
//! ```text
//! <column> ::= { <span> } <terminator-span>
//!
//! <span> ::= <header> { <top-color> } { <bottom-color> }
//!
//! <header> ::= U8 U8 U8 U8    ; length, color_start, color_end, air_start
//! ```
//!
//! A span describes, from top to bottom: an air run covering the Z range
//! `[air_start, color_start)`, a colored top run covering
//! `[color_start, color_end]`, and an uncolored interior run below it. The
//! bottom colors carried by a span belong to the *next* span: they cover
//! `[next.air_start - K, next.air_start)`, where
//! `K = length - 1 - (color_end - color_start + 1)`.
//!
//! `length` is the total number of 4-byte units occupied by the span. A
//! span with `length = 0` terminates its column; it occupies
//! `color_end - color_start + 2` units and carries no bottom colors.
//!
//! Colors are little-endian `0xAARRGGBB` words. The encoder emits `0x7F`
//! for the alpha component of every pixel; the decoder keeps the stored
//! word as is.
use std::cmp;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cgmath::{Vector2, Vector3};

use key;
use Map;

/// The frame size used by [`to_file`].
const FILE_FRAME_SIZE: usize = 1024;

// assert without panicking, instead returns an error.
fn check(cond: bool) -> io::Result<()> {
    if cond {
        Ok(())
    } else {
        Err(io::ErrorKind::InvalidData.into())
    }
}

/// Load a `Map` from VXL-encoded data.
///
/// Reads exactly `size.x × size.y` encoded columns. Fails with
/// `ErrorKind::UnexpectedEof` if the stream ends before every column is
/// terminated, or with `ErrorKind::InvalidData` if a span is structurally
/// inconsistent.
pub fn from_reader<T: Read>(size: Vector3<usize>, reader: &mut T) -> io::Result<Map> {
    let mut map = Map::all_solid(size);
    let depth = size.z;
    let mut bottom = Vec::with_capacity(depth);

    for y in 0..size.y {
        for x in 0..size.x {
            bottom.clear();

            loop {
                let mut header = [0; 4];
                reader.read_exact(&mut header)?;
                let length = header[0] as usize;
                let color_start = header[1] as usize;
                let color_end = header[2] as usize;
                let air_start = header[3] as usize;

                // The bottom colors read with the previous span sit
                // directly above this span's air run.
                check(air_start <= depth)?;
                let mut z = air_start
                    .checked_sub(bottom.len())
                    .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;
                for &color in bottom.iter() {
                    map.push_block(x, y, z, color);
                    z += 1;
                }

                for z in air_start..color_start {
                    map.geometry_mut().set(x, y, z, false);
                }

                let top_len = if color_start <= color_end {
                    check(color_end < depth)?;
                    for z in color_start..color_end + 1 {
                        map.push_block(x, y, z, reader.read_u32::<LittleEndian>()?);
                    }
                    color_end - color_start + 1
                } else {
                    0
                };

                if length == 0 {
                    break;
                }

                let bottom_len = length
                    .checked_sub(1 + top_len)
                    .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;
                bottom.clear();
                for _ in 0..bottom_len {
                    bottom.push(reader.read_u32::<LittleEndian>()?);
                }
            }
        }
    }
    Ok(map)
}

/// Determine the dimensions of a VXL stream without decoding it.
///
/// Returns the side length of the square column grid, derived from the
/// number of column terminators, and the observed depth, derived from the
/// deepest colored run. Scanning stops at a header that makes no forward
/// progress.
pub fn probe_size(data: &[u8]) -> (usize, usize) {
    let mut offset = 0;
    let mut columns = 0;
    let mut depth = 0;

    while offset + 4 <= data.len() {
        let header = array_ref![data, offset, 4];
        let length = header[0] as usize;
        let color_start = header[1] as usize;
        let color_end = header[2] as usize;

        if color_end + 1 > depth {
            depth = color_end + 1;
        }

        let words = if length == 0 {
            columns += 1;
            (color_end + 2).saturating_sub(color_start)
        } else {
            length
        };
        if words == 0 {
            break;
        }
        offset += words * 4;
    }

    ((columns as f64).sqrt() as usize, depth)
}

/// Append the span encoding of the column at `(x, y)` to `out`.
///
/// `cursors` tracks, for every chunk, the next block entry to consume; a
/// column's entries are consumed in Z order as their colors are emitted.
fn encode_column(map: &Map, cursors: &mut [usize], x: usize, y: usize, out: &mut Vec<u8>) {
    let depth = map.size().z;
    let co = map.chunk_index(x, y);
    let blocks = map.chunks()[co].blocks();

    let solid = |z: usize| map.geometry().get(x, y, z);
    let surface = |z: usize| map.on_surface(Vector3::new(x as i32, y as i32, z as i32));

    let mut z = 0;
    loop {
        let mut top_start = z;
        while top_start < depth && !solid(top_start) {
            top_start += 1;
        }
        let mut top_end = top_start;
        while top_end < depth && solid(top_end) && surface(top_end) {
            top_end += 1;
        }

        let mut bottom_start = top_end;
        while bottom_start < depth && solid(bottom_start) && !surface(bottom_start) {
            bottom_start += 1;
        }
        let mut bottom_end = bottom_start;
        while bottom_end < depth && solid(bottom_end) && surface(bottom_end) {
            bottom_end += 1;
        }

        let top_len = top_end - top_start;
        let length = if bottom_start == depth {
            // the last span of the column
            0
        } else if bottom_end < depth {
            1 + top_len + (bottom_end - bottom_start)
        } else {
            // the tail was reached without another surface run; the bottom
            // colors become the next span's top run instead
            1 + top_len
        };

        out.push(length as u8);
        out.push(top_start as u8);
        out.push((top_end - 1) as u8);
        out.push(z as u8);

        for k in top_start..top_end {
            let block = &blocks[cursors[co]];
            debug_assert_eq!(block.position, key::pack(x, y, k));
            cursors[co] += 1;
            out.write_u32::<LittleEndian>(0x7F000000 | (block.color & 0xFFFFFF))
                .unwrap();
        }

        if bottom_start == depth {
            break;
        }
        if bottom_end < depth {
            for k in bottom_start..bottom_end {
                let block = &blocks[cursors[co]];
                debug_assert_eq!(block.position, key::pack(x, y, k));
                cursors[co] += 1;
                out.write_u32::<LittleEndian>(0x7F000000 | (block.color & 0xFFFFFF))
                    .unwrap();
            }
            z = bottom_end;
        } else {
            z = bottom_start;
        }
    }
}

/// Encode the whole map into a byte vector.
pub fn to_vec(map: &Map) -> Vec<u8> {
    let size = map.size();
    let mut cursors = vec![0; map.chunks().len()];
    let mut out = Vec::new();
    for y in 0..size.y {
        for x in 0..size.x {
            encode_column(map, &mut cursors, x, y, &mut out);
        }
    }
    out
}

/// Encode the whole map into a writer.
///
/// Returns the number of bytes written.
pub fn to_writer<W: Write>(map: &Map, writer: &mut W) -> io::Result<usize> {
    let encoded = to_vec(map);
    writer.write_all(&encoded)?;
    Ok(encoded.len())
}

/// An incremental encoder producing fixed-size frames.
///
/// The stream borrows the map, so the map cannot change while frames
/// remain to be read and the per-chunk cursors stay valid for the whole
/// streaming session.
#[derive(Debug)]
pub struct Stream<'a> {
    map: &'a Map,
    cursors: Vec<usize>,
    buffer: Vec<u8>,
    frame_size: usize,
    column: Vector2<usize>,
}

impl<'a> Stream<'a> {
    /// Construct a `Stream` emitting frames of `frame_size` bytes.
    ///
    /// `frame_size` must be nonzero.
    pub fn new(map: &'a Map, frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame_size out of range");
        Stream {
            map,
            cursors: vec![0; map.chunks().len()],
            buffer: Vec::with_capacity(frame_size * 2),
            frame_size,
            column: Vector2::new(0, 0),
        }
    }

    /// Get the frame size of the stream.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Fill `out` with the next frame.
    ///
    /// Encodes whole columns into an internal buffer until a frame's worth
    /// of bytes is available, then writes at most `frame_size` bytes into
    /// `out` and returns the number written. Zero signals the end of the
    /// stream. `out` must hold at least `frame_size` bytes.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        assert!(out.len() >= self.frame_size, "frame buffer too small");
        let size = self.map.size();

        while self.buffer.len() < self.frame_size && self.column.y < size.y {
            encode_column(
                self.map,
                &mut self.cursors,
                self.column.x,
                self.column.y,
                &mut self.buffer,
            );
            self.column.x += 1;
            if self.column.x == size.x {
                self.column.x = 0;
                self.column.y += 1;
            }
        }

        let emitted = cmp::min(self.buffer.len(), self.frame_size);
        out[..emitted].copy_from_slice(&self.buffer[..emitted]);
        self.buffer.drain(..emitted);
        emitted
    }
}

/// Encode the map into a file through a [`Stream`] with 1024-byte frames.
///
/// Returns the number of bytes written.
pub fn to_file<P: AsRef<Path>>(map: &Map, path: P) -> io::Result<usize> {
    let mut file = File::create(path)?;
    let mut stream = Stream::new(map, FILE_FRAME_SIZE);
    let mut frame = [0; FILE_FRAME_SIZE];
    let mut total = 0;
    loop {
        let emitted = stream.read(&mut frame);
        if emitted == 0 {
            break;
        }
        file.write_all(&frame[..emitted])?;
        total += emitted;
    }
    Ok(total)
}
