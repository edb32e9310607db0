//! Predicates on great circle arcs. An arc is given by its two endpoints,
//! which must neither coincide nor be antipodal.

use utility::geo::{Vector3, COINCIDENCE_RADIANS};

/// Whether `x`, assumed to lie on the great circle through `a` and `b`, lies
/// on the shorter arc between them.
fn within(a: &Vector3, b: &Vector3, x: &Vector3) -> bool {
    let normal = a.cross(b);
    a.cross(x).dot(&normal) >= 0.0
        && x.cross(b).dot(&normal) >= 0.0
        && x.dot(&(*a + *b)) > 0.0
}

/// Whether `p` lies on the arc from `a` to `b`, within the coincidence
/// tolerance.
pub fn contains_point(a: &Vector3, b: &Vector3, p: &Vector3) -> bool {
    if p.coincides_with(a) || p.coincides_with(b) {
        return true;
    }
    let Some(normal) = a.cross(b).normalized() else {
        return false;
    };
    let offset = p.dot(&normal);
    if offset.abs() >= COINCIDENCE_RADIANS {
        return false;
    }
    // project onto the great circle before checking the extent
    match (*p - normal * offset).normalized() {
        Some(projected) => within(a, b, &projected),
        None => false,
    }
}

/// Whether the arcs `a`–`b` and `c`–`d` share at least one point. Touching
/// counts.
pub fn intersects(a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3) -> bool {
    if contains_point(a, b, c)
        || contains_point(a, b, d)
        || contains_point(c, d, a)
        || contains_point(c, d, b)
    {
        return true;
    }
    // arcs on the same great circle only overlap if an endpoint of one lies
    // on the other, which was checked above
    let Some(crossing) = a.cross(b).cross(&c.cross(d)).normalized() else {
        return false;
    };
    [crossing, -crossing]
        .iter()
        .any(|x| within(a, b, x) && within(c, d, x))
}

/// Angular distance in radians from `p` to the nearest point of the arc.
pub fn distance(a: &Vector3, b: &Vector3, p: &Vector3) -> f64 {
    let endpoints = p.angle_to(a).min(p.angle_to(b));
    let Some(normal) = a.cross(b).normalized() else {
        return endpoints;
    };
    let offset = p.dot(&normal);
    match (*p - normal * offset).normalized() {
        Some(projected) if within(a, b, &projected) => offset.abs().min(1.0).asin(),
        _ => endpoints,
    }
}

/// Whether the arc `q`–`r` crosses the arc `a`–`b`. An endpoint of `a`–`b`
/// lying exactly on the great circle through `q` and `r` counts as being on
/// its positive side, so walking over a vertex shared by two edges counts
/// once, and touching a vertex counts zero or two times.
pub fn crosses(q: &Vector3, r: &Vector3, a: &Vector3, b: &Vector3) -> bool {
    let normal = q.cross(r);
    let (side_a, side_b) = (a.dot(&normal), b.dot(&normal));
    if (side_a > 0.0) == (side_b > 0.0) {
        return false;
    }
    // the point of a–b on the great circle through q and r
    let crossing = (*b * side_a - *a * side_b) * (side_a - side_b).signum();
    match crossing.normalized() {
        Some(crossing) => within(q, r, &crossing),
        None => false,
    }
}

/// Signed angle at `at` from the direction towards `a` to the direction
/// towards `b`, in radians. Positive means counterclockwise when looking at
/// the sphere from outside.
pub fn subtended_angle(at: &Vector3, a: &Vector3, b: &Vector3) -> f64 {
    let sin = at.dot(&a.cross(b));
    let cos = a.dot(b) - a.dot(at) * b.dot(at);
    sin.atan2(cos)
}

/// Signed change of direction when walking `a` → `b` → `c`. Positive for left
/// turns.
pub fn turn_angle(a: &Vector3, b: &Vector3, c: &Vector3) -> f64 {
    let sin = -b.dot(&a.cross(c));
    let cos = -a.dot(c) + a.dot(b) * c.dot(b);
    sin.atan2(cos)
}

/// The points of the arc with the highest and lowest latitude, if they lie
/// between the endpoints. Endpoints themselves are not reported.
pub fn latitude_extremes(a: &Vector3, b: &Vector3) -> (Option<Vector3>, Option<Vector3>) {
    let Some(normal) = a.cross(b).normalized() else {
        return (None, None);
    };
    let up = Vector3::NORTH_POLE;
    let Some(top) = (up - normal * up.dot(&normal)).normalized() else {
        // the arc lies on the equator
        return (None, None);
    };
    let highest = within(a, b, &top).then_some(top);
    let lowest = within(a, b, &-top).then_some(-top);
    (highest, lowest)
}
