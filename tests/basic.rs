//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
extern crate ngsvxl;

use ngsvxl::*;
use cgmath::{Vector2, Vector3};

#[test]
fn create_flat_floor() {
    let map = Map::new(Vector3::new(4, 4, 4));
    map.validate().unwrap();

    for y in 0..4 {
        for x in 0..4 {
            assert!(map.is_solid(Vector3::new(x, y, 3)));
            for z in 0..3 {
                assert!(!map.is_solid(Vector3::new(x, y, z)));
                assert_eq!(map.get(Vector3::new(x, y, z)), 0);
            }
            let expected = default_color(Vector3::new(x as usize, y as usize, 3));
            assert_eq!(map.get(Vector3::new(x, y, 3)), expected);
            assert_eq!(map.top(Vector2::new(x, y)), Some((expected, 3)));
        }
    }
}

#[test]
fn solidity_boundary_convention() {
    let map = Map::new(Vector3::new(4, 4, 4));

    // the four lateral sides and the floor form a solid shell
    assert!(map.is_solid(Vector3::new(-1, 0, 0)));
    assert!(map.is_solid(Vector3::new(4, 0, 0)));
    assert!(map.is_solid(Vector3::new(0, -1, 0)));
    assert!(map.is_solid(Vector3::new(0, 4, 0)));
    assert!(map.is_solid(Vector3::new(0, 0, 4)));

    // the sky is open
    assert!(!map.is_solid(Vector3::new(0, 0, -1)));

    assert!(map.is_inside(Vector3::new(0, 0, 0)));
    assert!(map.is_inside(Vector3::new(3, 3, 3)));
    assert!(!map.is_inside(Vector3::new(0, 0, -1)));
    assert!(!map.is_inside(Vector3::new(4, 0, 0)));
}

#[test]
fn stack_column() {
    let mut map = Map::new(Vector3::new(4, 4, 4));

    map.set(Vector3::new(0, 0, 2), 0xFF0000);
    map.validate().unwrap();
    assert_eq!(map.get(Vector3::new(0, 0, 2)), 0xFF0000);

    // the floor voxel below lost its last exposed face; it stays solid but
    // reports the regenerated color from now on
    assert!(map.is_solid(Vector3::new(0, 0, 3)));
    assert!(!map.on_surface(Vector3::new(0, 0, 3)));
    assert_eq!(
        map.get(Vector3::new(0, 0, 3)),
        default_color(Vector3::new(0, 0, 3))
    );

    map.set(Vector3::new(0, 0, 1), 0x00FF00);
    map.set(Vector3::new(0, 0, 0), 0x0000FF);
    map.validate().unwrap();
    assert_eq!(map.get(Vector3::new(0, 0, 1)), 0x00FF00);
    assert_eq!(map.get(Vector3::new(0, 0, 0)), 0x0000FF);
    assert_eq!(map.top(Vector2::new(0, 0)), Some((0x0000FF, 0)));

    map.set_air(Vector3::new(0, 0, 0));
    map.validate().unwrap();
    assert!(!map.is_solid(Vector3::new(0, 0, 0)));
    assert_eq!(map.get(Vector3::new(0, 0, 0)), 0);

    // the voxel below keeps its color; it was exposed all along
    assert_eq!(map.get(Vector3::new(0, 0, 1)), 0x00FF00);
    assert_eq!(map.top(Vector2::new(0, 0)), Some((0x00FF00, 1)));
}

#[test]
fn expose_buried_interior() {
    let mut map = Map::new(Vector3::new(4, 4, 4));
    for z in 0..3 {
        for y in 1..4 {
            for x in 1..4 {
                map.set(Vector3::new(x, y, z), 0x802010);
            }
        }
    }
    map.validate().unwrap();

    // the cube center is solid on all six sides and carries no entry
    assert!(map.is_solid(Vector3::new(2, 2, 1)));
    assert!(!map.on_surface(Vector3::new(2, 2, 1)));
    assert_eq!(
        map.get(Vector3::new(2, 2, 1)),
        default_color(Vector3::new(2, 2, 1))
    );

    // face voxels keep the color they were placed with
    assert_eq!(map.get(Vector3::new(1, 2, 1)), 0x802010);

    map.set_air(Vector3::new(2, 2, 0));
    map.validate().unwrap();

    // the removal exposed the center from above
    assert!(map.on_surface(Vector3::new(2, 2, 1)));
    assert_eq!(
        map.get(Vector3::new(2, 2, 1)),
        default_color(Vector3::new(2, 2, 1))
    );
}

#[test]
fn mutations_are_idempotent() {
    let mut map = Map::new(Vector3::new(8, 8, 8));

    map.set(Vector3::new(3, 4, 5), 0x123456);
    let once = io::vxl::to_vec(&map);
    map.set(Vector3::new(3, 4, 5), 0x123456);
    map.validate().unwrap();
    assert_eq!(io::vxl::to_vec(&map), once);

    map.set_air(Vector3::new(3, 4, 5));
    let cleared = io::vxl::to_vec(&map);
    map.set_air(Vector3::new(3, 4, 5));
    map.validate().unwrap();
    assert_eq!(io::vxl::to_vec(&map), cleared);
}

#[test]
fn set_then_clear_restores_the_floor() {
    let mut map = Map::new(Vector3::new(8, 8, 8));
    let pristine = io::vxl::to_vec(&map);

    // placing the voxel buries the floor voxel below; removing it again
    // re-materializes the floor entry with its deterministic color
    map.set(Vector3::new(2, 2, 6), 0xAABBCC);
    assert_ne!(io::vxl::to_vec(&map), pristine);
    map.set_air(Vector3::new(2, 2, 6));
    map.validate().unwrap();
    assert_eq!(io::vxl::to_vec(&map), pristine);
}

#[test]
fn out_of_bounds_is_ignored() {
    let mut map = Map::new(Vector3::new(4, 4, 4));
    let pristine = io::vxl::to_vec(&map);

    map.set(Vector3::new(-1, 0, 0), 0xFFFFFF);
    map.set(Vector3::new(0, 4, 0), 0xFFFFFF);
    map.set(Vector3::new(0, 0, 255), 0xFFFFFF);
    map.set_air(Vector3::new(4, 4, 4));
    map.set_air(Vector3::new(0, 0, -1));

    assert_eq!(map.get(Vector3::new(-1, 0, 0)), 0);
    assert_eq!(map.get(Vector3::new(0, 0, 4)), 0);
    assert_eq!(map.top(Vector2::new(-1, 0)), None);
    assert_eq!(map.top(Vector2::new(0, 4)), None);

    map.validate().unwrap();
    assert_eq!(io::vxl::to_vec(&map), pristine);
}

#[test]
fn top_of_emptied_column() {
    let mut map = Map::new(Vector3::new(4, 4, 4));
    map.set_air(Vector3::new(1, 1, 3));
    map.validate().unwrap();
    assert_eq!(map.top(Vector2::new(1, 1)), Some((0, 4)));
}
