use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use crate::aabb::Aabb;
use crate::alignment::{dock_alignment, port_anchor, port_outward};
use crate::angle;
use crate::pose::Pose;
use crate::shape::Shape;

fn assert_vec_close(a: Vec2, b: Vec2) {
    assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
}

// ---- Aabb ----

#[test]
fn test_aabb_edge_contact_is_not_intersection() {
    let a = Aabb::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
    let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
    assert!(!a.intersects(&b));
    assert!(a.touches(&b));
    let c = Aabb::new(Vec2::new(0.5, 0.5), Vec2::new(2.0, 2.0));
    assert!(a.intersects(&c));
}

#[test]
fn test_aabb_union_and_enlarge() {
    let a = Aabb::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
    let b = Aabb::new(Vec2::new(3.0, -1.0), Vec2::new(4.0, 0.0));
    let u = a.union(&b);
    assert_eq!(u, Aabb::new(Vec2::new(0.0, -1.0), Vec2::new(4.0, 1.0)));

    let big = a.enlarged(2.0);
    assert_eq!(big.size(), Vec2::new(5.0, 5.0));
    assert_eq!(big.center(), a.center());

    // Over-shrinking collapses onto the center instead of inverting.
    let tiny = a.enlarged(-5.0);
    assert_eq!(tiny.size(), Vec2::ZERO);
    assert_eq!(tiny.center(), a.center());
}

#[test]
fn test_aabb_transformed_by_quarter_turn() {
    let rect = Aabb::new(Vec2::ZERO, Vec2::new(4.0, 2.0));
    let pose = Pose::new(Vec2::new(10.0, 0.0), FRAC_PI_2);
    let out = rect.transformed(&pose.matrix());
    assert!(out.approx_eq(&Aabb::new(Vec2::new(8.0, 0.0), Vec2::new(10.0, 4.0)), 3));
}

#[test]
fn test_aabb_rounded_equality_ignores_float_noise() {
    let a = Aabb::new(Vec2::new(1.0000001, -3.0), Vec2::new(4.0, 0.0000002));
    let b = Aabb::new(Vec2::new(1.0, -3.0000004), Vec2::new(3.9999998, -0.0000001));
    assert!(a.approx_eq(&b, 2));
    assert!(!a.approx_eq(&b.translated(Vec2::new(0.1, 0.0)), 2));
}

// ---- Angles ----

#[test]
fn test_angle_reduce_and_normalize() {
    assert!(angle::approx_eq(angle::reduce(3.0 * PI), PI, 4));
    assert!(angle::reduce(3.0 * PI).abs() <= PI);
    assert!((angle::reduce(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
    assert!((angle::normalize(-FRAC_PI_2) - 1.5 * PI).abs() < 1e-5);
    assert!(angle::approx_eq(0.0, 2.0 * PI - 1e-6, 2));
    assert!(!angle::approx_eq(0.0, 0.1, 2));
}

// ---- Pose ----

#[test]
fn test_pose_compose_and_inverse() {
    let parent = Pose::new(Vec2::new(5.0, 5.0), FRAC_PI_2);
    let child = Pose::new(Vec2::new(1.0, 0.0), FRAC_PI_2);
    let world = parent.compose(&child);
    assert_vec_close(world.position, Vec2::new(5.0, 6.0));
    assert!(angle::approx_eq(world.rotation, PI, 4));

    let back = parent.inverse().compose(&world);
    assert_vec_close(back.position, child.position);
    assert!(angle::approx_eq(back.rotation, child.rotation, 4));

    let p = Vec2::new(2.0, -1.0);
    assert_vec_close(parent.inverse_transform_point(parent.transform_point(p)), p);
}

// ---- Shapes ----

#[test]
fn test_circle_aabb_follows_pose() {
    let circle = Shape::Circle {
        center: Vec2::new(0.0, -0.5),
        radius: 0.2,
    };
    let aabb = circle.compute_aabb(&Pose::new(Vec2::new(2.5, 0.5), 0.0));
    assert!(aabb.approx_eq(&Aabb::new(Vec2::new(2.3, -0.2), Vec2::new(2.7, 0.2)), 4));
}

// ---- Port alignment ----

#[test]
fn test_port_outward_directions() {
    assert_vec_close(port_outward(0.0), Vec2::new(0.0, -1.0));
    assert_vec_close(port_outward(PI), Vec2::new(0.0, 1.0));
    assert_vec_close(port_outward(FRAC_PI_2), Vec2::new(1.0, 0.0));
    assert_vec_close(port_outward(-FRAC_PI_2), Vec2::new(-1.0, 0.0));
}

#[test]
fn test_dock_alignment_north_port_onto_south_port() {
    // Station port on the bottom row facing south; shuttle port on the top
    // row facing north. The shuttle ends up directly below the station.
    let station_port = Pose::new(Vec2::new(2.5, 0.5), 0.0);
    let shuttle_port = Pose::new(Vec2::new(1.5, 2.5), PI);
    let rel = dock_alignment(&shuttle_port, &station_port);

    assert!(angle::approx_eq(rel.rotation, 0.0, 3));
    assert_vec_close(rel.position, Vec2::new(1.0, -3.0));

    // Anchors coincide and outward directions oppose.
    let docked_port = rel.compose(&shuttle_port);
    assert_vec_close(port_anchor(&docked_port), port_anchor(&station_port));
    let dot = port_outward(docked_port.rotation).dot(port_outward(station_port.rotation));
    assert!((dot + 1.0).abs() < 1e-5);
}

#[test]
fn test_dock_alignment_same_facing_ports_flip_shuttle() {
    // Both ports face south: the shuttle must turn half a circle.
    let station_port = Pose::new(Vec2::new(0.5, 0.5), 0.0);
    let shuttle_port = Pose::new(Vec2::new(0.5, 0.5), 0.0);
    let rel = dock_alignment(&shuttle_port, &station_port);
    assert!(angle::approx_eq(rel.rotation, PI, 3));
    let docked_port = rel.compose(&shuttle_port);
    assert_vec_close(port_anchor(&docked_port), port_anchor(&station_port));
}
