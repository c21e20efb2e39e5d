//! Collision detection and response for oriented barriers
//!
//! Barriers are rotated rectangles. A fish (a circle) is tested in the
//! barrier's local frame, then reflected about the barrier normal and pushed
//! clear of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BARRIER_CLEARANCE;

/// A rectangle rotated about its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Vec2,
    /// Half width (local x) and half thickness (local y)
    pub half_extents: Vec2,
    /// Rotation of the local x axis (radians)
    pub rotation: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, width: f32, thickness: f32, rotation: f32) -> Self {
        Self {
            center,
            half_extents: Vec2::new(width / 2.0, thickness / 2.0),
            rotation,
        }
    }

    /// Unit vector along the long side
    #[inline]
    pub fn tangent(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Unit normal of the long faces (local y axis)
    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.tangent().perp()
    }

    /// Transform a world point into the rectangle's local frame
    #[inline]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(point - self.center)
    }

    /// Transform a local-frame point back to world space
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + self.tangent() * local.x + self.normal() * local.y
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the rectangle surface (if hit)
    pub point: Vec2,
    /// Barrier normal, pointing toward the side the circle is on
    pub normal: Vec2,
    /// Penetration depth along the normal
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an oriented rectangle.
///
/// Overlap is tested per local axis: the circle's local offset must lie
/// within the half-extents grown by the radius on both axes.
pub fn circle_rect_collision(pos: Vec2, radius: f32, rect: &OrientedRect) -> CollisionResult {
    let local = rect.to_local(pos);
    let reach = rect.half_extents + Vec2::splat(radius);

    if local.x.abs() > reach.x || local.y.abs() > reach.y {
        return CollisionResult::miss();
    }

    let side = if local.y >= 0.0 { 1.0 } else { -1.0 };
    let surface = Vec2::new(
        local.x.clamp(-rect.half_extents.x, rect.half_extents.x),
        rect.half_extents.y * side,
    );
    CollisionResult {
        hit: true,
        point: rect.to_world(surface),
        normal: rect.normal() * side,
        penetration: reach.y - local.y.abs(),
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce a circle off a rectangle it overlaps.
///
/// The normal-axis velocity component is reflected and `jitter` added; the
/// circle keeps its offset along the barrier but is moved to
/// `radius + half_thickness + clearance` from the center line on the side
/// it was on. Returns the new `(position, velocity)`.
pub fn bounce_off_rect(
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    rect: &OrientedRect,
    jitter: Vec2,
) -> (Vec2, Vec2) {
    let normal = rect.normal();
    let local = rect.to_local(pos);

    let side = if local.y > 0.0 {
        1.0
    } else if local.y < 0.0 {
        -1.0
    } else if vel.dot(normal) > 0.0 {
        // Dead center: send it back the way it came
        -1.0
    } else {
        1.0
    };

    let new_vel = reflect_velocity(vel, normal) + jitter;
    let push = radius + rect.half_extents.y + BARRIER_CLEARANCE;
    let new_pos = rect.to_world(Vec2::new(local.x, push * side));
    (new_pos, new_vel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    /// Barrier 60 ahead of a caster at the origin facing +x
    fn wall_ahead() -> OrientedRect {
        OrientedRect::new(Vec2::new(60.0, 0.0), 120.0, 20.0, FRAC_PI_2)
    }

    #[test]
    fn test_normal_points_along_caster_facing() {
        let rect = wall_ahead();
        assert!(rect.normal().y.abs() < 1e-6);
        assert!((rect.normal().x.abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_round_trip() {
        let rect = OrientedRect::new(Vec2::new(10.0, -4.0), 50.0, 8.0, 0.7);
        let p = Vec2::new(33.0, 12.0);
        assert!((rect.to_world(rect.to_local(p)) - p).length() < 1e-4);
    }

    #[test]
    fn test_circle_rect_hit_and_miss() {
        let rect = wall_ahead();
        // Thickness spans x in [50, 70], width spans y in [-60, 60]
        assert!(circle_rect_collision(Vec2::new(75.0, 0.0), 8.0, &rect).hit);
        assert!(circle_rect_collision(Vec2::new(60.0, 65.0), 8.0, &rect).hit);
        assert!(!circle_rect_collision(Vec2::new(80.0, 0.0), 8.0, &rect).hit);
        assert!(!circle_rect_collision(Vec2::new(60.0, 70.0), 8.0, &rect).hit);
    }

    #[test]
    fn test_collision_normal_faces_circle() {
        let rect = wall_ahead();
        let result = circle_rect_collision(Vec2::new(75.0, 10.0), 8.0, &rect);
        assert!(result.hit);
        assert!(result.normal.x > 0.99);
        assert!((result.penetration - 3.0).abs() < 1e-3);
        assert!((result.point - Vec2::new(70.0, 10.0)).length() < 1e-3);
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_head_on_bounce() {
        // Fish coming at the caster from beyond the wall
        let rect = wall_ahead();
        let (pos, vel) = bounce_off_rect(
            Vec2::new(72.0, 5.0),
            Vec2::new(-80.0, 10.0),
            8.0,
            &rect,
            Vec2::ZERO,
        );
        assert!((vel - Vec2::new(80.0, 10.0)).length() < 1e-3);
        // Pushed to 8 + 10 + 5 beyond the center line, same lateral offset
        assert!((pos - Vec2::new(83.0, 5.0)).length() < 1e-3);
        assert!(!circle_rect_collision(pos, 8.0, &rect).hit);
    }

    #[test]
    fn test_bounce_from_caster_side() {
        let rect = wall_ahead();
        let (pos, vel) =
            bounce_off_rect(Vec2::new(52.0, 0.0), Vec2::new(50.0, 0.0), 6.0, &rect, Vec2::ZERO);
        assert!(vel.x < 0.0);
        assert!((pos.x - (60.0 - 21.0)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_bounce_clears_and_flips(
            lx in -60.0f32..60.0,
            ly in -15.0f32..15.0,
            vx in -150.0f32..150.0,
            vy in -150.0f32..150.0,
            rotation in -3.0f32..3.0,
            radius in 4.0f32..30.0,
            jx in -20.0f32..20.0,
            jy in -20.0f32..20.0,
        ) {
            let rect = OrientedRect::new(Vec2::new(500.0, 500.0), 120.0, 20.0, rotation);
            let pos = rect.to_world(Vec2::new(lx, ly));
            let vel = Vec2::new(vx, vy);
            let (new_pos, new_vel) = bounce_off_rect(pos, vel, radius, &rect, Vec2::new(jx, jy));

            let n = rect.normal();
            let along = (new_pos - rect.center).dot(n).abs();
            prop_assert!(along >= radius + rect.half_extents.y - 1e-3);

            // Normal component flips (within the jitter bound)
            let jitter_bound = 20.0 * std::f32::consts::SQRT_2 + 1e-3;
            prop_assert!((new_vel.dot(n) + vel.dot(n)).abs() <= jitter_bound);
        }
    }
}
