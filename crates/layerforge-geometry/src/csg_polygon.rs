//! CSG back to polygons: quad-tree subdivision, hatching and border tracing.
//!
//! `divide` splits the region's box into quadrants until every cell's pruned
//! expression involves at most two half-planes (or the cell reaches the
//! resolution floor). Hatching sweeps parallel lines through the cells and
//! repairs the crossings against the whole expression; border tracing finds,
//! cell by cell, the stretches of each half-plane's line that bound the
//! region and chains them into loops.

use crate::bbox::BoundingBox;
use crate::csg::{CsgArena, CsgId, CsgOp, PlaneId};
use crate::half_plane::HalfPlane;
use crate::interval::Interval;
use crate::line::Line;
use crate::point::Point2D;
use crate::polygon::Polygon;
use crate::polygon_list::PolygonList;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

/// Subdivision stops at this depth whatever the cell size.
const MAX_DEPTH: usize = 24;

/// Border spans from different planes join when their ends are this many
/// point resolutions apart or closer.
const JOIN_FACTOR: f64 = 10.0;

/// What a quad-tree cell holds.
#[derive(Debug, Clone, PartialEq)]
pub enum QuadContents {
    /// Entirely outside the region
    Void,
    /// Entirely inside the region
    Solid,
    /// One or two half-planes decide the cell
    Edges(SmallVec<[PlaneId; 2]>),
    /// Too many half-planes for a cell this small; evaluate the whole
    /// expression instead
    Crowded,
}

#[derive(Debug, Clone)]
pub struct CsgPolygon {
    csg: CsgId,
    bounds: BoundingBox,
    valid: BoundingBox,
    quads: Option<Box<[CsgPolygon; 4]>>,
    contents: QuadContents,
}

impl CsgPolygon {
    /// A region valid within `bounds`, not yet subdivided.
    pub fn new(csg: CsgId, bounds: BoundingBox) -> Self {
        let contents = match csg {
            CsgId::UNIVERSE => QuadContents::Solid,
            CsgId::NULL => QuadContents::Void,
            _ => QuadContents::Crowded,
        };
        Self {
            csg,
            bounds,
            valid: bounds,
            quads: None,
            contents,
        }
    }

    pub fn csg(&self) -> CsgId {
        self.csg
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The slightly over-grown box the cell's expression was pruned against.
    pub fn valid_box(&self) -> BoundingBox {
        self.valid
    }

    pub fn contents(&self) -> &QuadContents {
        &self.contents
    }

    pub fn is_divided(&self) -> bool {
        self.quads.is_some()
    }

    /// The region grown (positive `d`) or shrunk (negative `d`), undivided.
    pub fn offset(&self, arena: &mut CsgArena, d: f64) -> CsgPolygon {
        let csg = arena.offset(self.csg, d);
        let bounds = if d > 0.0 {
            self.bounds.grown(d)
        } else {
            self.bounds
        };
        CsgPolygon::new(csg, bounds)
    }

    /// Subdivide until each cell holds at most two half-planes or its area
    /// drops below `resolution_squared`. Cell expressions are pruned against
    /// their box scaled by `swell`.
    pub fn divide(&mut self, arena: &mut CsgArena, resolution_squared: f64, swell: f64) {
        self.divide_to(arena, resolution_squared, swell, 0);
        trace!("divided into {} leaf cells", self.leaves().len());
    }

    fn divide_to(&mut self, arena: &mut CsgArena, resolution_squared: f64, swell: f64, depth: usize) {
        self.valid = self.bounds.swollen(swell);
        self.csg = arena.prune(self.csg, &self.valid);
        self.contents = classify(arena, self.csg);
        self.quads = None;

        let splittable = self.contents == QuadContents::Crowded
            && self.bounds.area() >= resolution_squared
            && depth < MAX_DEPTH;
        if !splittable {
            if self.contents == QuadContents::Crowded {
                debug!(
                    "cell at depth {} keeps {} half-planes",
                    depth,
                    arena.complexity(self.csg)
                );
            }
            return;
        }

        let csg = self.csg;
        let children = self.bounds.quadrants().map(|b| {
            let mut child = CsgPolygon::new(csg, b);
            child.divide_to(arena, resolution_squared, swell, depth + 1);
            child
        });
        self.quads = Some(Box::new(children));
    }

    /// Leaf cells of the quad tree, or this polygon itself when undivided.
    pub fn leaves(&self) -> Vec<&CsgPolygon> {
        match &self.quads {
            None => vec![self],
            Some(quads) => quads.iter().flat_map(|q| q.leaves()).collect(),
        }
    }

    /// Parallel infill lines `spacing` apart running along `direction`.
    /// Inside each printed stretch the start point carries `solid_flag` and
    /// the end point `gap_flag`. Stretches are linked alternately left to
    /// right and right to left into one chain while the travel between them
    /// stays within two spacings.
    pub fn hatch(
        &self,
        arena: &CsgArena,
        direction: Point2D,
        spacing: f64,
        solid_flag: i32,
        gap_flag: i32,
    ) -> PolygonList {
        let mut out = PolygonList::new();
        let tol = *arena.tolerances();

        let Some(along) = direction.normalized() else {
            warn!("hatch direction {} has no length", direction);
            return out;
        };
        if !(spacing.is_finite() && spacing > tol.point_resolution) {
            warn!("hatch spacing {} is not usable", spacing);
            return out;
        }
        if self.bounds.is_empty() || self.csg == CsgId::NULL {
            return out;
        }

        let across = along.orthogonal();
        let projected = self
            .bounds
            .corners()
            .iter()
            .fold(Interval::EMPTY, |acc, c| acc.expand_to(c.dot(across)));
        let first = (projected.low / spacing).ceil() as i64;
        let last = (projected.high / spacing).floor() as i64;

        let leaves = self.leaves();
        let mut chain = Polygon::new();
        let mut forward = true;
        let mut zero_length = 0usize;

        for k in first..=last {
            let origin = across * (k as f64 * spacing);
            let Some(mut sweep) = HalfPlane::from_line(&Line::new(origin, along)) else {
                continue;
            };
            let range = self.valid.wipe(sweep.line(), Interval::ALL);
            if range.is_empty() {
                continue;
            }

            for leaf in leaves.iter().filter(|l| l.has_edges()) {
                sweep.maybe_add(arena, leaf.csg, &leaf.valid, range);
            }
            sweep.solid_set(arena, self.csg, range);

            let mut stretches: Vec<(Point2D, Point2D)> = sweep
                .solid_spans()
                .into_iter()
                .filter(|(a, b)| {
                    let keep = b - a > tol.point_resolution;
                    if !keep {
                        zero_length += 1;
                    }
                    keep
                })
                .map(|(a, b)| (sweep.point_at(a), sweep.point_at(b)))
                .collect();
            if stretches.is_empty() {
                continue;
            }
            if !forward {
                stretches.reverse();
                for s in stretches.iter_mut() {
                    *s = (s.1, s.0);
                }
            }
            forward = !forward;

            for (a, b) in stretches {
                let linked = chain
                    .last()
                    .is_some_and(|end| end.distance_to(&a) <= 2.0 * spacing);
                if !linked && !chain.is_empty() {
                    out.add(std::mem::take(&mut chain));
                }
                chain.add(a, solid_flag);
                chain.add(b, gap_flag);
            }
        }
        if !chain.is_empty() {
            out.add(chain);
        }

        if zero_length > 0 {
            debug!("skipped {} zero-length hatch stretches", zero_length);
        }
        out
    }

    /// Outline loops of the region, every edge flagged `flag`. Loops run
    /// counter-clockwise around solid and clockwise around holes.
    pub fn border(&self, arena: &CsgArena, flag: i32) -> PolygonList {
        let tol = *arena.tolerances();
        let probe = tol.point_resolution * 1.0e-3;

        let mut representatives: Vec<PlaneId> = Vec::new();
        let mut spans: Vec<(usize, f64, f64)> = Vec::new();

        for leaf in self.leaves().into_iter().filter(|l| l.has_edges()) {
            let planes = arena.planes_of(leaf.csg);
            for &p in &planes {
                let plane = arena.plane(p);
                let range = leaf.bounds.wipe(plane.line(), Interval::ALL);
                if range.is_empty() || range.length() <= tol.tiny {
                    continue;
                }

                let mut cuts: Vec<f64> = planes
                    .iter()
                    .filter(|&&q| q != p)
                    .filter_map(|&q| plane.crossing_t(arena.plane(q)))
                    .filter(|t| range.contains(*t))
                    .collect();
                cuts.push(range.low);
                cuts.push(range.high);
                cuts.sort_by(f64::total_cmp);

                // Planes on the same boundary need not share a line origin,
                // so spans are stored as parameters along the representative.
                let rep = representative(arena, &mut representatives, p);
                let rep_line = *arena.plane(representatives[rep]).line();
                for w in cuts.windows(2) {
                    let (t0, t1) = (w[0], w[1]);
                    if t1 - t0 <= tol.tiny {
                        continue;
                    }
                    let mid = plane.line().point(0.5 * (t0 + t1));
                    let n = plane.normal();
                    let inner = arena.value(leaf.csg, mid - n * probe) <= 0.0;
                    let outer = arena.value(leaf.csg, mid + n * probe) > 0.0;
                    if inner && outer {
                        let r0 = rep_line.nearest_t(plane.line().point(t0));
                        let r1 = rep_line.nearest_t(plane.line().point(t1));
                        spans.push((rep, r0.min(r1), r0.max(r1)));
                    }
                }
            }
        }

        let segments = merge_spans(arena, &representatives, spans, tol.point_resolution);
        let loops = chain_segments(segments, JOIN_FACTOR * tol.point_resolution);

        let mut out = PolygonList::new();
        for points in loops {
            let polygon = Polygon::from_points(points, flag);
            match polygon.simplify(tol.point_resolution * 0.1) {
                Some(p) if p.len() >= 3 => out.add(p),
                _ => trace!("dropped a degenerate border loop"),
            }
        }
        out
    }

    fn has_edges(&self) -> bool {
        matches!(
            self.contents,
            QuadContents::Edges(_) | QuadContents::Crowded
        )
    }
}

fn classify(arena: &CsgArena, csg: CsgId) -> QuadContents {
    match arena.op(csg) {
        CsgOp::Universe => QuadContents::Solid,
        CsgOp::Null => QuadContents::Void,
        _ if arena.complexity(csg) <= 2 => QuadContents::Edges(arena.planes_of(csg).into_iter().collect()),
        _ => QuadContents::Crowded,
    }
}

/// Index of the first plane seen on the same boundary as `p`, adding `p` if
/// it is new.
fn representative(arena: &CsgArena, seen: &mut Vec<PlaneId>, p: PlaneId) -> usize {
    let tol = arena.tolerances();
    if let Some(i) = seen
        .iter()
        .position(|&q| q == p || arena.plane(q).same(arena.plane(p), tol))
    {
        return i;
    }
    seen.push(p);
    seen.len() - 1
}

/// Merge overlapping and touching spans per plane into directed segments.
/// Span parameters are along the representative plane's line.
fn merge_spans(
    arena: &CsgArena,
    representatives: &[PlaneId],
    mut spans: Vec<(usize, f64, f64)>,
    join: f64,
) -> Vec<(Point2D, Point2D)> {
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut merged: Vec<(usize, f64, f64)> = Vec::new();
    for (rep, t0, t1) in spans {
        match merged.last_mut() {
            Some(last) if last.0 == rep && t0 <= last.2 + join => {
                last.2 = last.2.max(t1);
            }
            _ => merged.push((rep, t0, t1)),
        }
    }

    merged
        .into_iter()
        .map(|(rep, t0, t1)| {
            let line = arena.plane(representatives[rep]).line();
            (line.point(t0), line.point(t1))
        })
        .collect()
}

/// Follow each segment's end to the nearest unused segment start.
fn chain_segments(segments: Vec<(Point2D, Point2D)>, join: f64) -> Vec<Vec<Point2D>> {
    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let origin = segments[start].0;
        let mut points = vec![origin];
        let mut end = segments[start].1;

        loop {
            let next = (0..segments.len())
                .filter(|&i| !used[i])
                .map(|i| (i, segments[i].0.distance_to(&end)))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let closes = end.distance_to(&origin);

            match next {
                Some((i, d)) if d <= join && d < closes => {
                    used[i] = true;
                    points.push(segments[i].0);
                    end = segments[i].1;
                }
                _ => {
                    if closes > join {
                        warn!(
                            "border chain of {} points did not close ({} apart)",
                            points.len(),
                            closes
                        );
                    }
                    break;
                }
            }
        }
        loops.push(points);
    }
    loops
}
