//! Narrow-phase collision tests and MTV computation
//!
//! `collide` dispatches on the pair of shape variants. Polygon/polygon uses
//! the Separating Axis Theorem; circle/polygon walks the polygon's edges for
//! the closest contact point. Bounding-box prechecks reject fast before the
//! expensive tests. Pairs involving points or lines never produce an MTV and
//! write a zero vector into a provided output so callers can read it
//! unconditionally.

use glam::Vec2;

use super::hitbox::{Aabb, Hitbox};

/// Tests two hitboxes for overlap.
///
/// If `trans` is provided and the pair produces a minimum translation vector,
/// it is written there; adding it to the first hitbox's position separates
/// the two. The direction always pushes the first argument away from the
/// second, so `collide(a, b)` and `collide(b, a)` agree on the boolean and
/// yield negated vectors.
pub fn collide(a: &Hitbox, b: &Hitbox, trans: Option<&mut Vec2>) -> bool {
    use Hitbox::*;
    match (a, b) {
        (Point { pos: p1 }, Point { pos: p2 }) => {
            write_mtv(trans, Vec2::ZERO);
            points_equal(*p1, *p2)
        }
        (Point { pos }, Circle { pos: c, radius_sq, .. })
        | (Circle { pos: c, radius_sq, .. }, Point { pos }) => {
            write_mtv(trans, Vec2::ZERO);
            point_in_circle(*pos, *c, *radius_sq)
        }
        (Point { pos }, Polygon { world, .. }) | (Polygon { world, .. }, Point { pos }) => {
            write_mtv(trans, Vec2::ZERO);
            point_in_polygon(*pos, world)
        }
        (Point { pos }, Line { start, end }) | (Line { start, end }, Point { pos }) => {
            write_mtv(trans, Vec2::ZERO);
            point_on_line(*pos, *start, *end)
        }
        (
            Circle { pos: p1, radius: r1, .. },
            Circle { pos: p2, radius: r2, .. },
        ) => circle_circle(*p1, *r1, *p2, *r2, trans),
        (
            Circle { pos, radius, bbox: cb, .. },
            Polygon { world, bbox: pb, .. },
        ) => circle_polygon(*pos, *radius, cb, world, pb, false, trans),
        (
            Polygon { world, bbox: pb, .. },
            Circle { pos, radius, bbox: cb, .. },
        ) => circle_polygon(*pos, *radius, cb, world, pb, true, trans),
        (Circle { pos, radius, .. }, Line { start, end })
        | (Line { start, end }, Circle { pos, radius, .. }) => {
            write_mtv(trans, Vec2::ZERO);
            segment_circle(*start, *end, *pos, *radius).is_some()
        }
        (
            Polygon { world: w1, bbox: b1, .. },
            Polygon { world: w2, bbox: b2, .. },
        ) => polygon_polygon(w1, b1, w2, b2, trans),
        (Polygon { world, .. }, Line { start, end })
        | (Line { start, end }, Polygon { world, .. }) => {
            write_mtv(trans, Vec2::ZERO);
            line_polygon(*start, *end, world)
        }
        (Line { start: s1, end: e1 }, Line { start: s2, end: e2 }) => {
            write_mtv(trans, Vec2::ZERO);
            segments_intersect(*s1, *e1, *s2, *e2)
        }
    }
}

fn write_mtv(out: Option<&mut Vec2>, v: Vec2) {
    if let Some(out) = out {
        *out = v;
    }
}

/// Separating Axis Theorem with MTV tracking.
///
/// Projects both polygons onto the normal of every edge of both; a gap on
/// any axis proves separation (early exit). The axis with the smallest
/// overlap, oriented to push the first polygon away from the second, becomes
/// the MTV.
fn polygon_polygon(
    w1: &[Vec2],
    b1: &Aabb,
    w2: &[Vec2],
    b2: &Aabb,
    trans: Option<&mut Vec2>,
) -> bool {
    // SAT is fast relative to other narrow-phase tests, but the box check is
    // much faster still and rules out most pairs.
    if !b1.intersects(b2) {
        return false;
    }

    let mut mtv_len = f32::INFINITY;
    let mut mtv_axis = Vec2::ZERO;

    for edge in edge_vectors(w1).chain(edge_vectors(w2)) {
        let len = edge.length();
        if len <= f32::EPSILON {
            // Zero-length edge, no usable normal
            continue;
        }
        let axis = Vec2::new(-edge.y / len, edge.x / len);

        let proj1 = project(w1, axis);
        let proj2 = project(w2, axis);

        // Polygons overlap only if every projection pair overlaps, so a
        // single gap lets us bail out immediately.
        let overlap = interval_distance(proj1, proj2);
        if overlap > 0.0 {
            return false;
        }
        if overlap.abs() < mtv_len {
            mtv_len = overlap.abs();
            mtv_axis = if proj1.0 < proj2.0 { -axis } else { axis };
        }
    }

    if mtv_len.is_finite() {
        write_mtv(trans, mtv_axis * mtv_len);
    } else {
        write_mtv(trans, Vec2::ZERO);
    }
    true
}

/// Circle against polygon via per-edge closest points.
///
/// `invert` flips the MTV so the same routine serves both argument orders:
/// false pushes the circle out of the polygon, true pushes the polygon out
/// of the circle.
fn circle_polygon(
    center: Vec2,
    radius: f32,
    cbox: &Aabb,
    world: &[Vec2],
    pbox: &Aabb,
    invert: bool,
    trans: Option<&mut Vec2>,
) -> bool {
    if !cbox.intersects(pbox) {
        return false;
    }

    // Find the closest contact point across all edges that reach the circle.
    let mut closest = Vec2::ZERO;
    let mut closest_dist = f32::INFINITY;
    let mut j = world.len() - 1;
    for i in 0..world.len() {
        if let Some(p) = segment_circle(world[i], world[j], center, radius) {
            let d = (p - center).length();
            if d < closest_dist {
                closest_dist = d;
                closest = p;
            }
        }
        j = i;
    }

    if !closest_dist.is_finite() {
        return false;
    }

    if let Some(out) = trans {
        let delta = closest - center;
        let push = radius - delta.length();
        let delta = delta.normalize_or_zero() * -push;

        // If the naive push direction lands the circle's center inside the
        // polygon, it was pointing the wrong way.
        let invert = invert != point_in_polygon(center + delta, world);
        *out = if invert { -delta } else { delta };
    }
    true
}

fn circle_circle(p1: Vec2, r1: f32, p2: Vec2, r2: f32, trans: Option<&mut Vec2>) -> bool {
    let dv = p1 - p2;
    let rsum = r1 + r2;
    if dv.length_squared() < rsum * rsum {
        // Rescale the center delta to the combined radius and subtract the
        // raw delta: what's left moves circle 1 fully outside circle 2.
        write_mtv(trans, dv.normalize_or_zero() * rsum - dv);
        true
    } else {
        false
    }
}

/// Ray-casting parity test: a conceptual +x ray from the point crosses an
/// odd number of polygon edges iff the point is inside.
fn point_in_polygon(p: Vec2, world: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = world.len() - 1;
    for i in 0..world.len() {
        let (pi, pj) = (world[i], world[j]);
        if ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_in_circle(p: Vec2, center: Vec2, radius_sq: f32) -> bool {
    (p - center).length_squared() < radius_sq
}

// Deliberately coarse: points are "equal" when their truncated integer
// coordinates match.
fn points_equal(p1: Vec2, p2: Vec2) -> bool {
    p1.x as i32 == p2.x as i32 && p1.y as i32 == p2.y as i32
}

// Exact floating-point equality of distance sums. Points that are
// mathematically on the segment can miss due to rounding; kept as-is because
// gameplay never relies on this pair.
fn point_on_line(p: Vec2, start: Vec2, end: Vec2) -> bool {
    p.distance(start) + p.distance(end) == start.distance(end)
}

/// Closest point on segment `a..b` to the circle's center, if it lies within
/// the circle. Boundary inclusive: a segment exactly tangent to the circle
/// counts as touching, for the circle-polygon caller too (where the resulting
/// translation vector is zero-length).
fn segment_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<Vec2> {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    ((closest - center).length_squared() <= radius * radius).then_some(closest)
}

fn line_polygon(start: Vec2, end: Vec2, world: &[Vec2]) -> bool {
    let mut j = world.len() - 1;
    for i in 0..world.len() {
        if segments_intersect(world[i], world[j], start, end) {
            return true;
        }
        j = i;
    }
    false
}

/// Parametric segment intersection. Parallel and degenerate segments are
/// never reported as intersecting.
fn segments_intersect(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> bool {
    let d1 = p1 - p0;
    let d2 = p3 - p2;

    let denom = -d2.x * d1.y + d1.x * d2.y;
    if denom == 0.0 {
        return false;
    }

    let s = (-d1.y * (p0.x - p2.x) + d1.x * (p0.y - p2.y)) / denom;
    let t = (d2.x * (p0.y - p2.y) - d2.y * (p0.x - p2.x)) / denom;

    (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t)
}

/// Edge vectors of a polygon, wrapping from the last vertex to the first.
fn edge_vectors(world: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    (0..world.len()).map(move |i| {
        let j = if i == 0 { world.len() - 1 } else { i - 1 };
        world[i] - world[j]
    })
}

/// Squashes the polygon onto an axis and returns the (min, max) interval it
/// covers there.
fn project(world: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for p in world {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Gap between two intervals; negative means they overlap by that much.
fn interval_distance(i1: (f32, f32), i2: (f32, f32)) -> f32 {
    if i1.0 < i2.0 { i2.0 - i1.1 } else { i1.0 - i2.1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn square(pos: Vec2, side: f32) -> Hitbox {
        Hitbox::rect(pos, side, side)
    }

    fn world_points(h: &Hitbox) -> Vec<Vec2> {
        match h {
            Hitbox::Polygon { world, .. } => world.clone(),
            _ => panic!("not a polygon"),
        }
    }

    #[test]
    fn test_circle_circle_overlap_and_mtv() {
        let c1 = Hitbox::circle(Vec2::new(0.0, 0.0), 5.0);
        let c2 = Hitbox::circle(Vec2::new(7.0, 0.0), 5.0);
        let mut mtv = Vec2::ZERO;
        assert!(collide(&c1, &c2, Some(&mut mtv)));
        // Pushes c1 along -x, away from c2, by the 3-unit overlap.
        assert_relative_eq!(mtv.x, -3.0, epsilon = 1e-4);
        assert_relative_eq!(mtv.y, 0.0, epsilon = 1e-4);

        // Applying the MTV separates them (tangency allowed).
        let moved = Hitbox::circle(Vec2::new(0.0, 0.0) + mtv, 5.0);
        let Hitbox::Circle { pos, .. } = moved else { unreachable!() };
        assert!(pos.distance(Vec2::new(7.0, 0.0)) >= 10.0 - 1e-3);
    }

    #[test]
    fn test_circle_circle_disjoint() {
        let c1 = Hitbox::circle(Vec2::ZERO, 3.0);
        let c2 = Hitbox::circle(Vec2::new(10.0, 0.0), 3.0);
        assert!(!collide(&c1, &c2, None));
    }

    #[test]
    fn test_circle_circle_concentric_degrades_to_zero_mtv() {
        let c1 = Hitbox::circle(Vec2::new(1.0, 1.0), 2.0);
        let c2 = Hitbox::circle(Vec2::new(1.0, 1.0), 3.0);
        let mut mtv = Vec2::splat(99.0);
        assert!(collide(&c1, &c2, Some(&mut mtv)));
        assert_eq!(mtv, Vec2::ZERO);
    }

    #[test]
    fn test_sat_overlapping_squares() {
        let a = square(Vec2::new(0.0, 0.0), 10.0);
        let b = square(Vec2::new(8.0, 0.0), 10.0);
        let mut mtv = Vec2::ZERO;
        assert!(collide(&a, &b, Some(&mut mtv)));
        // Smallest escape is 2 units along -x.
        assert_relative_eq!(mtv.x, -2.0, epsilon = 1e-4);
        assert_relative_eq!(mtv.y, 0.0, epsilon = 1e-4);

        // After resolution the residual overlap is (near) zero.
        let mut resolved = a.clone();
        resolved.translate(mtv);
        let mut second = Vec2::ZERO;
        if collide(&resolved, &b, Some(&mut second)) {
            assert!(second.length() < 1e-3);
        }
    }

    #[test]
    fn test_sat_disjoint_squares() {
        let a = square(Vec2::ZERO, 10.0);
        let b = square(Vec2::new(30.0, 30.0), 10.0);
        assert!(!collide(&a, &b, None));
    }

    #[test]
    fn test_sat_overlapping_boxes_but_separated_diagonals() {
        // Two triangles whose AABBs overlap but which a diagonal axis
        // separates: the box precheck must not be the final answer.
        let a = Hitbox::polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ])
        .unwrap();
        let b = Hitbox::polygon(&[
            Vec2::new(9.0, 9.0),
            Vec2::new(18.0, 9.0),
            Vec2::new(18.0, 18.0),
        ])
        .unwrap();
        let (ab, bb) = (a.aabb().unwrap(), b.aabb().unwrap());
        assert!(ab.intersects(&bb));
        assert!(!collide(&a, &b, None));
    }

    #[test]
    fn test_mtv_symmetry_across_pair_kinds() {
        let cases: Vec<(Hitbox, Hitbox)> = vec![
            (square(Vec2::ZERO, 10.0), square(Vec2::new(7.0, 4.0), 10.0)),
            (
                Hitbox::circle(Vec2::new(2.0, 1.0), 5.0),
                Hitbox::circle(Vec2::new(6.0, 1.0), 4.0),
            ),
            (
                Hitbox::circle(Vec2::new(15.0, 5.0), 6.0),
                square(Vec2::ZERO, 10.0),
            ),
        ];
        for (a, b) in &cases {
            let mut m1 = Vec2::ZERO;
            let mut m2 = Vec2::ZERO;
            let r1 = collide(a, b, Some(&mut m1));
            let r2 = collide(b, a, Some(&mut m2));
            assert_eq!(r1, r2);
            assert!(r1, "test cases are all overlapping pairs");
            assert_relative_eq!(m1.x, -m2.x, epsilon = 1e-4);
            assert_relative_eq!(m1.y, -m2.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_circle_vs_square_scenario() {
        // Square (0,0)..(10,10), circle at (15,5) r=6: nearest edge point is
        // (10,5) at distance 5, so they overlap and the circle is pushed +x
        // by the 1-unit penetration.
        let poly = square(Vec2::ZERO, 10.0);
        let circle = Hitbox::circle(Vec2::new(15.0, 5.0), 6.0);
        let mut mtv = Vec2::ZERO;
        assert!(collide(&circle, &poly, Some(&mut mtv)));
        assert_relative_eq!(mtv.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(mtv.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_circle_polygon_pushes_outward_from_inside_overlap() {
        // Circle center just inside the right edge: the corrected MTV must
        // still move it outside, not deeper in.
        let poly = square(Vec2::ZERO, 10.0);
        let circle = Hitbox::circle(Vec2::new(9.0, 5.0), 3.0);
        let mut mtv = Vec2::ZERO;
        assert!(collide(&circle, &poly, Some(&mut mtv)));
        let moved = Vec2::new(9.0, 5.0) + mtv;
        assert!(!point_in_polygon(moved, &world_points(&poly)));
    }

    #[test]
    fn test_circle_polygon_tangent_contact_counts_with_zero_mtv() {
        // The circle's boundary passes exactly through the vertex (10,5): a
        // 3-4-5 offset keeps the distance exact in floats and the bounding
        // boxes properly overlapping. Boundary-inclusive contact with a
        // degenerate zero-length push.
        let tri = Hitbox::polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(0.0, 10.0),
        ])
        .unwrap();
        let circle = Hitbox::circle(Vec2::new(13.0, 9.0), 5.0);
        let mut mtv = Vec2::new(7.0, 7.0);
        assert!(collide(&circle, &tri, Some(&mut mtv)));
        assert_eq!(mtv, Vec2::ZERO);

        // Same inclusivity for a segment tangent to the circle.
        let edge = Hitbox::line(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(collide(&edge, &Hitbox::circle(Vec2::new(13.0, 5.0), 3.0), None));
    }

    #[test]
    fn test_point_in_polygon_parity() {
        let poly = square(Vec2::new(-5.0, -5.0), 10.0);
        assert!(collide(&Hitbox::point(Vec2::ZERO), &poly, None));
        assert!(!collide(&Hitbox::point(Vec2::new(50.0, 50.0)), &poly, None));

        // Edge points are ambiguous; only consistency across argument order
        // is guaranteed.
        let edge = Hitbox::point(Vec2::new(5.0, 0.0));
        assert_eq!(collide(&edge, &poly, None), collide(&poly, &edge, None));
    }

    #[test]
    fn test_point_circle_uses_squared_radius() {
        let circle = Hitbox::circle(Vec2::ZERO, 5.0);
        assert!(collide(&Hitbox::point(Vec2::new(3.0, 3.0)), &circle, None));
        assert!(!collide(&Hitbox::point(Vec2::new(4.0, 4.0)), &circle, None));
        // Boundary is exclusive.
        assert!(!collide(&Hitbox::point(Vec2::new(5.0, 0.0)), &circle, None));
    }

    #[test]
    fn test_point_equality_truncates() {
        let a = Hitbox::point(Vec2::new(1.7, 2.2));
        let b = Hitbox::point(Vec2::new(1.2, 2.9));
        let c = Hitbox::point(Vec2::new(2.1, 2.2));
        assert!(collide(&a, &b, None));
        assert!(!collide(&a, &c, None));
    }

    #[test]
    fn test_point_on_line_distance_sum() {
        let line = Hitbox::line(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(collide(&Hitbox::point(Vec2::new(5.0, 5.0)), &line, None));
        assert!(collide(&Hitbox::point(Vec2::ZERO), &line, None));
        assert!(!collide(&Hitbox::point(Vec2::new(6.0, 5.0)), &line, None));
    }

    #[test]
    fn test_line_line_crossing_and_parallel() {
        let a = Hitbox::line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Hitbox::line(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0));
        assert!(collide(&a, &b, None));

        let c = Hitbox::line(Vec2::new(0.0, 1.0), Vec2::new(10.0, 11.0));
        assert!(!collide(&a, &c, None));

        // Too short to reach
        let d = Hitbox::line(Vec2::new(0.0, 10.0), Vec2::new(2.0, 8.0));
        assert!(!collide(&a, &d, None));
    }

    #[test]
    fn test_line_circle_closest_point() {
        let line = Hitbox::line(Vec2::new(0.0, -10.0), Vec2::new(0.0, 10.0));
        let near = Hitbox::circle(Vec2::new(3.0, 0.0), 4.0);
        let far = Hitbox::circle(Vec2::new(3.0, 0.0), 2.0);
        assert!(collide(&line, &near, None));
        assert!(!collide(&line, &far, None));
    }

    #[test]
    fn test_line_polygon_edge_intersection() {
        let poly = square(Vec2::ZERO, 10.0);
        let crossing = Hitbox::line(Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0));
        let outside = Hitbox::line(Vec2::new(-5.0, 20.0), Vec2::new(15.0, 20.0));
        assert!(collide(&crossing, &poly, None));
        assert!(!collide(&outside, &poly, None));
        // A segment fully inside crosses no edge and reports no overlap.
        let inside = Hitbox::line(Vec2::new(2.0, 5.0), Vec2::new(8.0, 5.0));
        assert!(!collide(&inside, &poly, None));
    }

    #[test]
    fn test_no_mtv_pairs_write_zero_vector() {
        let point = Hitbox::point(Vec2::new(1.0, 1.0));
        let line = Hitbox::line(Vec2::ZERO, Vec2::new(5.0, 5.0));
        let circle = Hitbox::circle(Vec2::new(1.0, 1.0), 3.0);

        let mut mtv = Vec2::splat(42.0);
        collide(&point, &circle, Some(&mut mtv));
        assert_eq!(mtv, Vec2::ZERO);

        mtv = Vec2::splat(42.0);
        collide(&line, &circle, Some(&mut mtv));
        assert_eq!(mtv, Vec2::ZERO);

        mtv = Vec2::splat(42.0);
        collide(&line, &point, Some(&mut mtv));
        assert_eq!(mtv, Vec2::ZERO);
    }

    /// Random convex polygon: points on a circle at sorted angles.
    fn random_convex(rng: &mut Pcg32) -> Hitbox {
        let center = Vec2::new(rng.random_range(-40.0..40.0), rng.random_range(-40.0..40.0));
        let radius: f32 = rng.random_range(5.0..20.0);
        let n = rng.random_range(3..9);
        let mut angles: Vec<f32> = (0..n)
            .map(|_| rng.random_range(0.0..std::f32::consts::TAU))
            .collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        angles.dedup();
        if angles.len() < 3 {
            return random_convex(rng);
        }
        let points: Vec<Vec2> = angles
            .iter()
            .map(|a| center + Vec2::new(a.cos(), a.sin()) * radius)
            .collect();
        Hitbox::polygon(&points).unwrap()
    }

    /// Brute-force overlap: any vertex containment either way, or any pair
    /// of edges intersecting.
    fn brute_force_overlap(w1: &[Vec2], w2: &[Vec2]) -> bool {
        if w1.iter().any(|p| point_in_polygon(*p, w2)) {
            return true;
        }
        if w2.iter().any(|p| point_in_polygon(*p, w1)) {
            return true;
        }
        for i in 0..w1.len() {
            let i2 = (i + 1) % w1.len();
            for j in 0..w2.len() {
                let j2 = (j + 1) % w2.len();
                if segments_intersect(w1[i], w1[i2], w2[j], w2[j2]) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn test_sat_matches_brute_force_on_random_corpus() {
        let mut rng = Pcg32::seed_from_u64(0xC0111DE);
        for _ in 0..300 {
            let a = random_convex(&mut rng);
            let b = random_convex(&mut rng);
            let expected = brute_force_overlap(&world_points(&a), &world_points(&b));
            assert_eq!(
                collide(&a, &b, None),
                expected,
                "SAT disagrees with brute force for {a:?} vs {b:?}"
            );
        }
    }
}
