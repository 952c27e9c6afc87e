//! Crossing lists: where a sweep line enters and leaves a CSG region.
//!
//! A half-plane used as a sweep line accumulates `LineIntersection` records
//! from every quad-tree cell its line passes through (`maybe_add`), then
//! `solid_set` sorts and repairs them into a strictly alternating
//! enter/leave sequence. The list is a per-query workspace; callers clear
//! it between sweeps.
//!
//! Repair policy: the full expression is the only authority. A section
//! between recorded crossings whose inside/outside state is not constant
//! gets a bisected crossing inserted, a dangling inside state at either end
//! is closed by searching outward, and finally only crossings whose two
//! sides genuinely differ are kept. Crossings are never dropped by any
//! other rule.

use crate::bbox::BoundingBox;
use crate::csg::{CsgArena, CsgId, CsgOp, PlaneId};
use crate::half_plane::HalfPlane;
use crate::interval::Interval;
use crate::point::Point2D;
use tracing::{debug, trace, warn};

/// Bisection steps allowed in `binary_chop`.
pub const MAX_CHOP_ITERATIONS: usize = 20;

/// Upper bound on doubling steps in the outward search.
const MAX_SEARCH_STEPS: usize = 48;

/// One place where a sweep line meets a region boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIntersection {
    /// Parameter along the sweep line
    pub t: f64,
    /// The (sub-)expression in which the crossing was found
    pub quad: CsgId,
    /// The half-plane whose boundary is crossed
    pub plane: PlaneId,
}

impl HalfPlane {
    pub fn crossings(&self) -> &[LineIntersection] {
        &self.crossings
    }

    pub fn clear_crossings(&mut self) {
        self.crossings.clear();
    }

    /// Inside/outside state just within an end of a range. When the end
    /// lies on the boundary the sign of the controlling plane's gradient
    /// along the line, looking into the range, decides.
    fn end_is_solid(&self, arena: &CsgArena, quad: CsgId, t: f64, low_end: bool) -> bool {
        let tol = arena.tolerances();
        let p = self.line().point(t);
        let value = arena.value(quad, p);
        if value.abs() > tol.point_resolution {
            return value < 0.0;
        }
        let leaf = arena.leaf_at(quad, p);
        match arena.leaf_plane(leaf) {
            Some(plane) => {
                let gradient = arena.plane(plane).normal().dot(self.line().direction());
                if gradient.abs() <= tol.tiny {
                    value <= 0.0
                } else if low_end {
                    gradient < 0.0
                } else {
                    gradient > 0.0
                }
            }
            None => value <= 0.0,
        }
    }

    /// Bisect `range` for the place where `quad` changes between inside and
    /// outside. Returns `None` when both ends agree.
    pub fn binary_chop(
        &self,
        arena: &CsgArena,
        quad: CsgId,
        range: Interval,
    ) -> Option<LineIntersection> {
        if range.is_empty() || !range.low.is_finite() || !range.high.is_finite() {
            return None;
        }
        let low_solid = self.end_is_solid(arena, quad, range.low, true);
        let high_solid = self.end_is_solid(arena, quad, range.high, false);
        if low_solid == high_solid {
            return None;
        }
        self.chop_between(arena, quad, range, low_solid)
    }

    /// Bisect `range` whose low end is known to be `low_solid` and whose high
    /// end is known to be the opposite.
    fn chop_between(
        &self,
        arena: &CsgArena,
        quad: CsgId,
        range: Interval,
        low_solid: bool,
    ) -> Option<LineIntersection> {
        let tol = arena.tolerances().point_resolution;
        let (mut a, mut b) = (range.low, range.high);
        for _ in 0..MAX_CHOP_ITERATIONS {
            if b - a <= tol {
                break;
            }
            let m = 0.5 * (a + b);
            if arena.contains(quad, self.line().point(m)) == low_solid {
                a = m;
            } else {
                b = m;
            }
        }

        let mut t = 0.5 * (a + b);
        let leaf = arena.leaf_at(quad, self.line().point(t));
        let plane = arena.leaf_plane(leaf)?;

        if let Some(exact) = self.crossing_t(arena.plane(plane)) {
            if exact >= a - tol && exact <= b + tol {
                t = exact;
            }
        }

        let residual = arena.plane(plane).value(self.line().point(t));
        if residual.abs() > 4.0 * tol {
            debug!(
                "binary chop settled {:.6} away from its plane at t = {:.6}",
                residual, t
            );
        }

        Some(LineIntersection { t, quad, plane })
    }

    fn add_chop(&mut self, arena: &CsgArena, quad: CsgId, range: Interval) -> bool {
        match self.binary_chop(arena, quad, range) {
            Some(crossing) => {
                self.crossings.push(crossing);
                true
            }
            None => false,
        }
    }

    /// Record where this line crosses the boundary of the quad-tree cell
    /// expression `quad` inside `quad_box`, restricted to `range`. Returns
    /// whether anything was added.
    pub fn maybe_add(
        &mut self,
        arena: &CsgArena,
        quad: CsgId,
        quad_box: &BoundingBox,
        range: Interval,
    ) -> bool {
        let range = quad_box.wipe(self.line(), range);
        if range.is_empty() {
            return false;
        }

        match arena.op(quad) {
            CsgOp::Universe | CsgOp::Null => false,
            CsgOp::Leaf(_) => self.add_chop(arena, quad, range),
            CsgOp::Union(a, b) | CsgOp::Intersection(a, b) => {
                match (arena.leaf_plane(a), arena.leaf_plane(b)) {
                    (Some(pa), Some(pb)) => self.add_pair(arena, quad, pa, pb, range),
                    _ => {
                        debug!(
                            "maybe_add skipped a cell of complexity {}",
                            arena.complexity(quad)
                        );
                        false
                    }
                }
            }
        }
    }

    fn add_pair(
        &mut self,
        arena: &CsgArena,
        quad: CsgId,
        pa: PlaneId,
        pb: PlaneId,
        range: Interval,
    ) -> bool {
        let tol = *arena.tolerances();

        // This line runs along one of the cell's own boundaries: the only
        // crossing is with the other one.
        for (own, other) in [(pa, pb), (pb, pa)] {
            let own_plane = arena.plane(own);
            if self.same(own_plane, &tol) || self.same(&own_plane.negated(), &tol) {
                return match self.crossing_t(arena.plane(other)) {
                    Some(t) if range.contains(t) => {
                        self.crossings.push(LineIntersection {
                            t,
                            quad,
                            plane: other,
                        });
                        true
                    }
                    _ => false,
                };
            }
        }

        let mut candidates: Vec<f64> = [pa, pb]
            .iter()
            .filter_map(|p| self.crossing_t(arena.plane(*p)))
            .filter(|t| range.contains(*t))
            .collect();
        candidates.sort_by(f64::total_cmp);

        match *candidates.as_slice() {
            [] => false,
            [_] => self.add_chop(arena, quad, range),
            [t1, t2] if t2 - t1 <= tol.point_resolution => {
                // Both boundaries meet (nearly) where the line passes. Keep
                // one crossing, at the candidate where the expression is
                // closest to zero.
                match self.binary_chop(arena, quad, range) {
                    Some(mut crossing) => {
                        let v1 = arena.value(quad, self.line().point(t1)).abs();
                        let v2 = arena.value(quad, self.line().point(t2)).abs();
                        crossing.t = if v1 <= v2 { t1 } else { t2 };
                        self.crossings.push(crossing);
                        true
                    }
                    None => false,
                }
            }
            [t1, t2] => {
                let mid = 0.5 * (t1 + t2);
                let first = self.add_chop(arena, quad, Interval::new(range.low, mid));
                let second = self.add_chop(arena, quad, Interval::new(mid, range.high));
                first || second
            }
            _ => false,
        }
    }

    /// Sort by parameter and drop repeats of the same plane within `tol`.
    pub fn sort_crossings(&mut self, tol: f64) {
        self.crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
        self.crossings
            .dedup_by(|next, prev| next.plane == prev.plane && (next.t - prev.t).abs() <= tol);
    }

    /// Repair the accumulated crossings against the full expression `region`
    /// over `range`, leaving an even-length list of enter/leave pairs.
    pub fn solid_set(&mut self, arena: &CsgArena, region: CsgId, range: Interval) {
        if range.is_empty() || !range.low.is_finite() || !range.high.is_finite() {
            self.crossings.clear();
            return;
        }
        let tol = arena.tolerances().point_resolution;

        self.crossings
            .retain(|c| c.t >= range.low - tol && c.t <= range.high + tol);
        self.sort_crossings(tol);

        self.fix_sections(arena, region, range);
        self.sort_crossings(tol);

        self.close_open_ends(arena, region, range);
        self.sort_crossings(tol);

        self.keep_transitions(arena, region, range);
    }

    /// Insert crossings inside any section whose state is not constant.
    fn fix_sections(&mut self, arena: &CsgArena, region: CsgId, range: Interval) {
        let tol = arena.tolerances().point_resolution;
        let delta = 2.0 * tol;

        let mut bounds = Vec::with_capacity(self.crossings.len() + 2);
        bounds.push(range.low);
        bounds.extend(self.crossings.iter().map(|c| c.t));
        bounds.push(range.high);

        let mut inserted = Vec::new();
        for w in bounds.windows(2) {
            let (s, e) = (w[0], w[1]);
            if e - s <= 2.0 * delta {
                continue;
            }
            let mid = 0.5 * (s + e);
            let near_start = arena.contains(region, self.line().point(s + delta));
            let middle = arena.contains(region, self.line().point(mid));
            let near_end = arena.contains(region, self.line().point(e - delta));

            // The samples are authoritative: near a recorded crossing the
            // value sits inside the tolerance band, where the end-state
            // fallback of `binary_chop` cannot tell the sides apart.
            if near_start != middle {
                let section = Interval::new(s + delta, mid);
                inserted.extend(self.chop_between(arena, region, section, near_start));
            }
            if middle != near_end {
                let section = Interval::new(mid, e - delta);
                inserted.extend(self.chop_between(arena, region, section, middle));
            }
        }

        if !inserted.is_empty() {
            trace!("fix_sections inserted {} crossings", inserted.len());
            self.crossings.extend(inserted);
        }
    }

    /// Close an inside state left dangling at either end of the range.
    fn close_open_ends(&mut self, arena: &CsgArena, region: CsgId, range: Interval) {
        let tol = arena.tolerances().point_resolution;
        let delta = 2.0 * tol;
        let limit = range.length().max(1.0);

        for forward in [true, false] {
            let edge = if forward { range.high } else { range.low };
            let probe = if forward { edge - delta } else { edge + delta };
            if !arena.contains(region, self.line().point(probe)) {
                continue;
            }
            let already_closed = self
                .crossings
                .iter()
                .any(|c| if forward { c.t >= probe } else { c.t <= probe });
            if already_closed {
                continue;
            }
            match self.other_end(arena, region, probe, forward, limit) {
                Some(crossing) => self.crossings.push(crossing),
                None => match self.synthetic_crossing(arena, region, edge) {
                    Some(crossing) => self.crossings.push(crossing),
                    None => warn!("unbounded region along sweep line at t = {}", edge),
                },
            }
        }
    }

    /// Search outward from `from` with doubling steps until the state of
    /// `region` changes, then bisect the last step.
    fn other_end(
        &self,
        arena: &CsgArena,
        region: CsgId,
        from: f64,
        forward: bool,
        limit: f64,
    ) -> Option<LineIntersection> {
        let tol = arena.tolerances().point_resolution;
        let start = arena.contains(region, self.line().point(from));
        let sign = if forward { 1.0 } else { -1.0 };

        let mut last = from;
        let mut step = tol;
        for _ in 0..MAX_SEARCH_STEPS {
            if step > limit {
                break;
            }
            let probe = from + sign * step;
            if arena.contains(region, self.line().point(probe)) != start {
                let (low, high) = if forward { (last, probe) } else { (probe, last) };
                let low_solid = if forward { start } else { !start };
                return self.chop_between(arena, region, Interval::new(low, high), low_solid);
            }
            last = probe;
            step *= 2.0;
        }
        None
    }

    /// A crossing pinned at `t`, attributed to whichever plane controls the
    /// region there.
    fn synthetic_crossing(
        &self,
        arena: &CsgArena,
        region: CsgId,
        t: f64,
    ) -> Option<LineIntersection> {
        let leaf = arena.leaf_at(region, self.line().point(t));
        arena.leaf_plane(leaf).map(|plane| LineIntersection {
            t,
            quad: region,
            plane,
        })
    }

    /// Keep only crossings whose two sides differ, so the list alternates
    /// and starts by entering the region. Beyond `range` counts as outside,
    /// which keeps the crossings that close the region at the range ends.
    fn keep_transitions(&mut self, arena: &CsgArena, region: CsgId, range: Interval) {
        if self.crossings.is_empty() {
            return;
        }
        let delta = 2.0 * arena.tolerances().point_resolution;
        let state = |t: f64| range.contains(t) && arena.contains(region, self.line().point(t));

        let n = self.crossings.len();
        let mut sides = Vec::with_capacity(n + 1);
        sides.push(state(self.crossings[0].t - delta));
        for w in self.crossings.windows(2) {
            sides.push(state(0.5 * (w[0].t + w[1].t)));
        }
        sides.push(state(self.crossings[n - 1].t + delta));

        let mut kept: Vec<LineIntersection> = self
            .crossings
            .iter()
            .enumerate()
            .filter(|(i, _)| sides[*i] != sides[i + 1])
            .map(|(_, c)| *c)
            .collect();

        // Solid before the first crossing can only happen at the range edge;
        // the first kept crossing is then a leave with no matching enter.
        if sides[0] && !kept.is_empty() {
            warn!("sweep line starts inside the region; dropping unmatched crossing");
            kept.remove(0);
        }
        if kept.len() % 2 == 1 {
            warn!("sweep line ends inside the region; dropping unmatched crossing");
            kept.pop();
        }

        self.crossings = kept;
    }

    /// Enter/leave parameter pairs after `solid_set`.
    pub fn solid_spans(&self) -> Vec<(f64, f64)> {
        self.crossings
            .chunks_exact(2)
            .map(|pair| (pair[0].t, pair[1].t))
            .collect()
    }

    /// Point on this plane's line.
    pub fn point_at(&self, t: f64) -> Point2D {
        self.line().point(t)
    }
}
