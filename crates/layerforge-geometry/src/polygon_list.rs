//! Ordered collections of polygons.
//!
//! Besides bookkeeping, a list knows how to:
//! - turn nested loops into one CSG expression (`resolve_insides`)
//! - reorder itself to shorten travel (`near_ends`)
//! - assemble loops from an unordered edge soup (`from_edges`)
//! - render itself as SVG for inspection

use crate::bbox::BoundingBox;
use crate::csg::{CsgArena, CsgId};
use crate::point::Point2D;
use crate::polygon::{Polygon, SOLID_FLAG};
use std::fmt::Write;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonList {
    polygons: Vec<Polygon>,
    bounds: BoundingBox,
}

impl PolygonList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, polygon: Polygon) {
        self.bounds = self.bounds.union(&polygon.bounds());
        self.polygons.push(polygon);
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Polygon> {
        self.polygons.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Union of every member's bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Total number of points across all members.
    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }

    pub fn simplify(&self, d: f64) -> PolygonList {
        self.iter().filter_map(|p| p.simplify(d)).collect()
    }

    pub fn filter_shorts(&self, tiny: f64) -> PolygonList {
        self.iter().filter_map(|p| p.filter_shorts(tiny)).collect()
    }

    /// Greedy reordering: after each polygon, take the remaining one whose
    /// start (or end, reversing it) is closest to where the last one ended.
    pub fn near_ends(&self) -> PolygonList {
        let mut remaining: Vec<Polygon> = self.polygons.clone();
        let mut out = PolygonList::new();
        if remaining.is_empty() {
            return out;
        }

        let mut current = remaining.remove(0);
        loop {
            let end = current.last();
            out.add(current);
            let Some(end) = end else {
                if remaining.is_empty() {
                    break;
                }
                current = remaining.remove(0);
                continue;
            };

            let best = remaining
                .iter()
                .enumerate()
                .flat_map(|(i, p)| {
                    let forward = p.first().map(|s| (i, false, s.distance_squared_to(&end)));
                    let backward = p.last().map(|s| (i, true, s.distance_squared_to(&end)));
                    forward.into_iter().chain(backward)
                })
                .min_by(|a, b| a.2.total_cmp(&b.2));

            match best {
                Some((i, reverse, _)) => {
                    let next = remaining.remove(i);
                    current = if reverse { next.reversed() } else { next };
                }
                None => {
                    if remaining.is_empty() {
                        break;
                    }
                    current = remaining.remove(0);
                }
            }
        }
        out
    }

    /// CSG expression of each member, in order.
    pub fn to_csg(&self, arena: &mut CsgArena) -> Vec<CsgId> {
        self.iter().map(|p| p.to_csg(arena)).collect()
    }

    /// One expression for a set of possibly nested loops. A loop contained
    /// by an odd number of others is a hole in its innermost container; the
    /// result is the union of the even-depth loops with their holes removed.
    pub fn resolve_insides(&self, arena: &mut CsgArena) -> CsgId {
        let mut csgs = self.to_csg(arena);
        let n = csgs.len();

        let view: &CsgArena = arena;
        let contains: Vec<Vec<bool>> = (0..n)
            .map(|outer| {
                (0..n)
                    .map(|inner| outer != inner && self.loop_inside(view, csgs[outer], inner))
                    .collect()
            })
            .collect();
        let depth: Vec<usize> = (0..n)
            .map(|inner| (0..n).filter(|&outer| contains[outer][inner]).count())
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| depth[i]);

        for &hole in order.iter().filter(|&&i| depth[i] % 2 == 1) {
            let parent = (0..n).find(|&outer| contains[outer][hole] && depth[outer] + 1 == depth[hole]);
            match parent {
                Some(parent) => {
                    csgs[parent] = arena.difference(csgs[parent], csgs[hole]);
                }
                None => error!("loop {} has no direct container at depth {}", hole, depth[hole]),
            }
        }

        let solids: Vec<CsgId> = (0..n)
            .filter(|&i| depth[i] % 2 == 0)
            .map(|i| csgs[i])
            .collect();
        debug!(
            "resolved {} loops into {} solids",
            n,
            solids.len()
        );
        arena.union_all(solids)
    }

    /// Whether loop `inner` lies inside the region `outer`: its first vertex
    /// and the midpoint of its first edge must agree. On disagreement the
    /// vertex wins.
    fn loop_inside(&self, arena: &CsgArena, outer: CsgId, inner: usize) -> bool {
        let polygon = &self.polygons[inner];
        let Some(vertex) = polygon.first() else {
            return false;
        };
        let by_vertex = arena.contains(outer, vertex);
        if polygon.len() < 2 {
            return by_vertex;
        }
        let midpoint = polygon.point(0).midpoint(polygon.point(1));
        let by_midpoint = arena.contains(outer, midpoint);
        if by_vertex != by_midpoint {
            error!(
                "ambiguous containment of loop {} (vertex says {}, edge midpoint says {})",
                inner, by_vertex, by_midpoint
            );
        }
        by_vertex
    }

    /// Chain unordered segments into closed loops, matching endpoints within
    /// `tolerance`. Segments may arrive in either direction. Chains that do
    /// not close are logged and dropped.
    pub fn from_edges(edges: &[(Point2D, Point2D)], tolerance: f64) -> PolygonList {
        let mut used = vec![false; edges.len()];
        let mut out = PolygonList::new();

        for start in 0..edges.len() {
            if used[start] {
                continue;
            }
            used[start] = true;
            let (origin, mut end) = edges[start];
            let mut points = vec![origin];

            let closed = loop {
                if end.distance_to(&origin) <= tolerance && points.len() > 1 {
                    break true;
                }
                let next = (0..edges.len())
                    .filter(|&i| !used[i])
                    .find_map(|i| {
                        let (a, b) = edges[i];
                        if a.distance_to(&end) <= tolerance {
                            Some((i, b))
                        } else if b.distance_to(&end) <= tolerance {
                            Some((i, a))
                        } else {
                            None
                        }
                    });
                match next {
                    Some((i, far)) => {
                        used[i] = true;
                        points.push(end);
                        end = far;
                    }
                    None => break false,
                }
            };

            if closed && points.len() >= 3 {
                out.add(Polygon::from_points(points, SOLID_FLAG));
            } else {
                warn!(
                    "dropping open chain of {} edges starting at {}",
                    points.len(),
                    origin
                );
            }
        }
        out
    }

    /// SVG document with one `<polygon>` per member, stroke only.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let b = self.bounds;
        let (x, y, w, h) = if b.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            (b.x.low, b.y.low, b.width(), b.height())
        };
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            fmt_coord(x),
            fmt_coord(y),
            fmt_coord(w),
            fmt_coord(h)
        );
        for polygon in &self.polygons {
            let points: Vec<String> = polygon
                .points()
                .iter()
                .map(|p| format!("{},{}", fmt_coord(p.x), fmt_coord(p.y)))
                .collect();
            let _ = writeln!(
                svg,
                r#"  <polygon points="{}" fill="none" stroke="black" stroke-width="0.1"/>"#,
                points.join(" ")
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

/// Three decimals, trailing zeros trimmed, no negative zero.
fn fmt_coord(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

impl FromIterator<Polygon> for PolygonList {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        let mut list = PolygonList::new();
        for p in iter {
            list.add(p);
        }
        list
    }
}

impl Extend<Polygon> for PolygonList {
    fn extend<I: IntoIterator<Item = Polygon>>(&mut self, iter: I) {
        for p in iter {
            self.add(p);
        }
    }
}

impl IntoIterator for PolygonList {
    type Item = Polygon;
    type IntoIter = std::vec::IntoIter<Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.into_iter()
    }
}

impl<'a> IntoIterator for &'a PolygonList {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}
