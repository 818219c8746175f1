//! Corridor reduction with the simple stupid funnel algorithm
//!
//! The functions here only see geometry: a start point, an end point and the
//! portals crossed in between, each oriented left/right for the direction of
//! travel.

use navmesh_common::{intersect_segment_edge_2d, tri_area_2d, v_equal_2d, Vec3};

/// Shared edge between two consecutive corridor polygons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Endpoint on the traveller's left
    pub left: Vec3,
    /// Endpoint on the traveller's right
    pub right: Vec3,
}

impl Portal {
    pub fn new(left: Vec3, right: Vec3) -> Self {
        Self { left, right }
    }

    /// Degenerate portal used for the corridor endpoints
    pub fn point(p: Vec3) -> Self {
        Self { left: p, right: p }
    }
}

/// Waypoint committed by the funnel, tagged with the portal it came from.
///
/// Portal indices count the start as `0`, the real portals as `1..=n` and the
/// end as `n + 1`.
#[derive(Debug, Clone, Copy)]
struct Corner {
    pos: Vec3,
    portal: usize,
}

fn portal_at(start: Vec3, end: Vec3, portals: &[Portal], i: usize) -> Portal {
    if i == 0 {
        Portal::point(start)
    } else if i <= portals.len() {
        portals[i - 1]
    } else {
        Portal::point(end)
    }
}

fn commit(corners: &mut Vec<Corner>, pos: Vec3, portal: usize) {
    match corners.last() {
        Some(last) if v_equal_2d(&last.pos, &pos) => {}
        _ => corners.push(Corner { pos, portal }),
    }
}

fn pull_corners(start: Vec3, end: Vec3, portals: &[Portal]) -> Vec<Corner> {
    let count = portals.len() + 2;
    let mut corners = vec![Corner {
        pos: start,
        portal: 0,
    }];

    let mut portal_apex = start;
    let mut portal_left = start;
    let mut portal_right = start;
    let mut left_index = 0;
    let mut right_index = 0;

    let mut i = 1;
    while i < count {
        let Portal { left, right } = portal_at(start, end, portals, i);

        // Right vertex
        if tri_area_2d(&portal_apex, &portal_right, &right) <= 0.0 {
            if v_equal_2d(&portal_apex, &portal_right)
                || tri_area_2d(&portal_apex, &portal_left, &right) > 0.0
            {
                portal_right = right;
                right_index = i;
            } else {
                // Left crossed over right, the left vertex becomes the new apex
                commit(&mut corners, portal_left, left_index);

                portal_apex = portal_left;
                let apex_index = left_index;
                portal_right = portal_apex;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        // Left vertex
        if tri_area_2d(&portal_apex, &portal_left, &left) >= 0.0 {
            if v_equal_2d(&portal_apex, &portal_left)
                || tri_area_2d(&portal_apex, &portal_right, &left) < 0.0
            {
                portal_left = left;
                left_index = i;
            } else {
                commit(&mut corners, portal_right, right_index);

                portal_apex = portal_right;
                let apex_index = right_index;
                portal_left = portal_apex;
                left_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        i += 1;
    }

    // The end keeps the caller's coordinates even when a corner landed on it
    let corner_count = corners.len();
    match corners.last_mut() {
        Some(last) if corner_count > 1 && v_equal_2d(&last.pos, &end) => {
            last.pos = end;
            last.portal = count - 1;
        }
        _ => corners.push(Corner {
            pos: end,
            portal: count - 1,
        }),
    }

    corners
}

/// Reduces a corridor to the shortest polyline through its portals.
///
/// Corners keep the height of the mesh vertex they sit on; the start and end
/// keep the caller's coordinates. An empty corridor yields `[start, end]`.
pub fn string_pull(start: Vec3, end: Vec3, portals: &[Portal]) -> Vec<Vec3> {
    let mut out = Vec::new();
    string_pull_into(start, end, portals, &mut out);
    out
}

/// Like [`string_pull`] but also emits the point where each straight segment
/// crosses a portal, with its height interpolated along that portal.
pub fn string_pull_with_height(start: Vec3, end: Vec3, portals: &[Portal]) -> Vec<Vec3> {
    let mut out = Vec::new();
    string_pull_with_height_into(start, end, portals, &mut out);
    out
}

pub(crate) fn string_pull_into(start: Vec3, end: Vec3, portals: &[Portal], out: &mut Vec<Vec3>) {
    out.clear();
    out.extend(pull_corners(start, end, portals).into_iter().map(|c| c.pos));
}

pub(crate) fn string_pull_with_height_into(
    start: Vec3,
    end: Vec3,
    portals: &[Portal],
    out: &mut Vec<Vec3>,
) {
    out.clear();
    let corners = pull_corners(start, end, portals);
    out.push(corners[0].pos);

    for pair in corners.windows(2) {
        let (a, b) = (pair[0], pair[1]);

        for k in (a.portal + 1)..b.portal {
            let portal = portal_at(start, end, portals, k);
            let Some(t) = intersect_segment_edge_2d(&a.pos, &b.pos, &portal.left, &portal.right)
            else {
                continue;
            };

            let crossing = portal.left.lerp(portal.right, t);
            let duplicate = out.last().is_some_and(|last| v_equal_2d(last, &crossing))
                || v_equal_2d(&crossing, &b.pos);
            if !duplicate {
                out.push(crossing);
            }
        }

        out.push(b.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn test_empty_corridor() {
        let start = v(0.2, 1.0, 0.3);
        let end = v(0.8, 2.0, 0.6);

        assert_eq!(string_pull(start, end, &[]), vec![start, end]);
        assert_eq!(string_pull_with_height(start, end, &[]), vec![start, end]);
    }

    #[test]
    fn test_straight_corridor_has_no_corners() {
        let portals = [
            Portal::new(v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)),
            Portal::new(v(2.0, 0.0, 1.0), v(2.0, 0.0, 0.0)),
        ];
        let start = v(0.5, 0.0, 0.5);
        let end = v(2.5, 0.0, 0.5);

        assert_eq!(string_pull(start, end, &portals), vec![start, end]);
    }

    #[test]
    fn test_corner_is_taken_around_the_inside_vertex() {
        // [0,1]x[0,1] -> [1,2]x[0,1] -> [1,2]x[1,2]
        let portals = [
            Portal::new(v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)),
            Portal::new(v(1.0, 0.0, 1.0), v(2.0, 0.0, 1.0)),
        ];
        let start = v(0.5, 0.0, 0.5);
        let end = v(1.5, 0.0, 1.9);

        let path = string_pull(start, end, &portals);
        assert_eq!(path, vec![start, v(1.0, 0.0, 1.0), end]);
    }

    #[test]
    fn test_u_turn_restarts_from_each_corner() {
        // [0,1]x[0,1] -> [1,2]x[0,1] -> [1,2]x[1,2] -> [1,2]x[2,3] -> [0,1]x[2,3]
        let portals = [
            Portal::new(v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)),
            Portal::new(v(1.0, 0.0, 1.0), v(2.0, 0.0, 1.0)),
            Portal::new(v(1.0, 0.0, 2.0), v(2.0, 0.0, 2.0)),
            Portal::new(v(1.0, 0.0, 2.0), v(1.0, 0.0, 3.0)),
        ];
        let start = v(0.5, 0.0, 0.5);
        let end = v(0.5, 0.0, 2.5);

        let path = string_pull(start, end, &portals);
        assert_eq!(path, vec![start, v(1.0, 0.0, 1.0), v(1.0, 0.0, 2.0), end]);
    }

    #[test]
    fn test_right_turn_commits_right_vertex() {
        // Mirror image of the left-hand corner: the corridor turns towards -Z
        let portals = [
            Portal::new(v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)),
            Portal::new(v(2.0, 0.0, 0.0), v(1.0, 0.0, 0.0)),
        ];
        let start = v(0.5, 0.0, 0.5);
        let end = v(1.5, 0.0, -0.9);

        let path = string_pull(start, end, &portals);
        assert_eq!(path, vec![start, v(1.0, 0.0, 0.0), end]);
    }

    #[test]
    fn test_corner_keeps_vertex_height() {
        let portals = [
            Portal::new(v(1.0, 3.0, 1.0), v(1.0, 3.0, 0.0)),
            Portal::new(v(1.0, 3.0, 1.0), v(2.0, 3.0, 1.0)),
        ];
        let path = string_pull(v(0.5, 9.0, 0.5), v(1.5, 7.0, 1.9), &portals);

        assert_eq!(path[0].y, 9.0);
        assert_eq!(path[1].y, 3.0);
        assert_eq!(path[2].y, 7.0);
    }

    #[test]
    fn test_height_mode_inserts_portal_crossings() {
        // Flat floor, ramp climbing 0 -> 4 over x in [2,6], upper floor
        let portals = [
            Portal::new(v(2.0, 0.0, 2.0), v(2.0, 0.0, 0.0)),
            Portal::new(v(6.0, 4.0, 2.0), v(6.0, 4.0, 0.0)),
        ];
        let start = v(1.0, 0.0, 1.0);
        let end = v(7.0, 4.0, 1.0);

        let flat = string_pull(start, end, &portals);
        assert_eq!(flat, vec![start, end]);

        let path = string_pull_with_height(start, end, &portals);
        assert_eq!(path.len(), 4);
        assert!(path[1].distance(v(2.0, 0.0, 1.0)) < 1e-5);
        assert!(path[2].distance(v(6.0, 4.0, 1.0)) < 1e-5);
        for pair in path.windows(2) {
            assert!(pair[1].y >= pair[0].y);
        }
    }

    #[test]
    fn test_height_mode_interpolates_sloped_portal() {
        // Portal whose endpoints sit at different heights
        let portals = [Portal::new(v(1.0, 2.0, 2.0), v(1.0, 0.0, 0.0))];
        let path = string_pull_with_height(v(0.0, 0.0, 1.5), v(2.0, 0.0, 1.5), &portals);

        assert_eq!(path.len(), 3);
        assert!((path[1].y - 1.5).abs() < 1e-5);
        assert!((path[1].z - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_end_on_corner_is_not_duplicated() {
        let portals = [
            Portal::new(v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)),
            Portal::new(v(1.0, 0.0, 1.0), v(2.0, 0.0, 1.0)),
        ];
        let start = v(0.5, 0.0, 0.5);
        let end = v(1.0, 5.0, 1.0);

        let path = string_pull(start, end, &portals);
        assert_eq!(path, vec![start, end]);
    }
}
