//! Boolean expressions over half-planes.
//!
//! Expressions live in a `CsgArena` and are referred to by `CsgId` handles.
//! Nodes are immutable once built: every boolean operation, offset or
//! simplification produces new nodes (or returns an existing handle when an
//! identity law applies). The only state written after construction is the
//! complement cache, which links a node and its complement both ways.
//!
//! `CsgId::UNIVERSE` and `CsgId::NULL` occupy the first two slots of every
//! arena, so the two constants mean the same thing in all of them and are
//! never rewritten.

use crate::bbox::BoundingBox;
use crate::half_plane::HalfPlane;
use crate::interval::Interval;
use crate::point::Point2D;
use layerforge_core::Tolerances;
use tracing::trace;

/// Handle to a node in a `CsgArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CsgId(u32);

impl CsgId {
    /// Everything is inside.
    pub const UNIVERSE: CsgId = CsgId(0);
    /// Nothing is inside.
    pub const NULL: CsgId = CsgId(1);

    fn index(self) -> usize {
        self.0 as usize
    }

    fn is_reserved(self) -> bool {
        self.0 < 2
    }
}

impl std::fmt::Display for CsgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            CsgId::UNIVERSE => write!(f, "UNIVERSE"),
            CsgId::NULL => write!(f, "NULL"),
            CsgId(i) => write!(f, "csg#{}", i),
        }
    }
}

/// Handle to a half-plane in a `CsgArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(u32);

impl PlaneId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The operator of a CSG node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOp {
    Universe,
    Null,
    Leaf(PlaneId),
    /// Children ordered by ascending complexity
    Union(CsgId, CsgId),
    /// Children ordered by ascending complexity
    Intersection(CsgId, CsgId),
}

#[derive(Debug, Clone)]
struct CsgNode {
    op: CsgOp,
    complexity: usize,
    complement: Option<CsgId>,
}

#[derive(Debug, Clone)]
struct PlaneSlot {
    plane: HalfPlane,
    complement: Option<PlaneId>,
}

/// Owner of all half-planes and CSG nodes for one slicing pass.
#[derive(Debug, Clone)]
pub struct CsgArena {
    tolerances: Tolerances,
    planes: Vec<PlaneSlot>,
    nodes: Vec<CsgNode>,
}

impl CsgArena {
    pub fn new(tolerances: Tolerances) -> Self {
        let nodes = vec![
            CsgNode {
                op: CsgOp::Universe,
                complexity: 0,
                complement: Some(CsgId::NULL),
            },
            CsgNode {
                op: CsgOp::Null,
                complexity: 0,
                complement: Some(CsgId::UNIVERSE),
            },
        ];
        Self {
            tolerances,
            planes: Vec::new(),
            nodes,
        }
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn op(&self, id: CsgId) -> CsgOp {
        self.nodes[id.index()].op
    }

    /// Number of leaves below `id`.
    pub fn complexity(&self, id: CsgId) -> usize {
        self.nodes[id.index()].complexity
    }

    pub fn plane(&self, id: PlaneId) -> &HalfPlane {
        &self.planes[id.index()].plane
    }

    /// The half-plane of a leaf node.
    pub fn leaf_plane(&self, id: CsgId) -> Option<PlaneId> {
        match self.op(id) {
            CsgOp::Leaf(p) => Some(p),
            _ => None,
        }
    }

    pub fn add_plane(&mut self, mut plane: HalfPlane) -> PlaneId {
        plane.crossings.clear();
        let id = PlaneId(self.planes.len() as u32);
        self.planes.push(PlaneSlot {
            plane,
            complement: None,
        });
        id
    }

    /// New leaf node for a half-plane.
    pub fn leaf(&mut self, plane: HalfPlane) -> CsgId {
        let p = self.add_plane(plane);
        self.leaf_for(p)
    }

    /// New leaf node for a plane already in the arena.
    pub fn leaf_for(&mut self, plane: PlaneId) -> CsgId {
        self.push(CsgOp::Leaf(plane), 1)
    }

    fn push(&mut self, op: CsgOp, complexity: usize) -> CsgId {
        let id = CsgId(self.nodes.len() as u32);
        self.nodes.push(CsgNode {
            op,
            complexity,
            complement: None,
        });
        id
    }

    fn combine(&mut self, union: bool, a: CsgId, b: CsgId) -> CsgId {
        let (first, second) = if self.complexity(b) < self.complexity(a) {
            (b, a)
        } else {
            (a, b)
        };
        let complexity = self.complexity(a) + self.complexity(b);
        let op = if union {
            CsgOp::Union(first, second)
        } else {
            CsgOp::Intersection(first, second)
        };
        self.push(op, complexity)
    }

    pub fn union(&mut self, a: CsgId, b: CsgId) -> CsgId {
        if a == CsgId::NULL {
            return b;
        }
        if b == CsgId::NULL {
            return a;
        }
        if a == CsgId::UNIVERSE || b == CsgId::UNIVERSE {
            return CsgId::UNIVERSE;
        }
        if self.equivalent(a, b) {
            return a;
        }
        if self.are_complements(a, b) {
            return CsgId::UNIVERSE;
        }
        self.combine(true, a, b)
    }

    pub fn intersection(&mut self, a: CsgId, b: CsgId) -> CsgId {
        if a == CsgId::UNIVERSE {
            return b;
        }
        if b == CsgId::UNIVERSE {
            return a;
        }
        if a == CsgId::NULL || b == CsgId::NULL {
            return CsgId::NULL;
        }
        if self.equivalent(a, b) {
            return a;
        }
        if self.are_complements(a, b) {
            return CsgId::NULL;
        }
        self.combine(false, a, b)
    }

    /// `a` with `b` removed.
    pub fn difference(&mut self, a: CsgId, b: CsgId) -> CsgId {
        let not_b = self.complement(b);
        self.intersection(a, not_b)
    }

    /// Union of many expressions, combined as a balanced tree.
    pub fn union_all(&mut self, items: Vec<CsgId>) -> CsgId {
        self.reduce_balanced(items, true)
    }

    /// Intersection of many expressions, combined as a balanced tree.
    pub fn intersection_all(&mut self, items: Vec<CsgId>) -> CsgId {
        self.reduce_balanced(items, false)
    }

    fn reduce_balanced(&mut self, mut items: Vec<CsgId>, union: bool) -> CsgId {
        if items.is_empty() {
            return if union { CsgId::NULL } else { CsgId::UNIVERSE };
        }
        while items.len() > 1 {
            let mut next = Vec::with_capacity(items.len().div_ceil(2));
            for pair in items.chunks(2) {
                next.push(match (pair.len(), union) {
                    (2, true) => self.union(pair[0], pair[1]),
                    (2, false) => self.intersection(pair[0], pair[1]),
                    _ => pair[0],
                });
            }
            items = next;
        }
        items[0]
    }

    /// Structural equality, treating leaves on the same boundary as equal.
    pub fn equivalent(&self, a: CsgId, b: CsgId) -> bool {
        if a == b {
            return true;
        }
        if self.complexity(a) != self.complexity(b) {
            return false;
        }
        match (self.op(a), self.op(b)) {
            (CsgOp::Leaf(p), CsgOp::Leaf(q)) => {
                p == q || self.plane(p).same(self.plane(q), &self.tolerances)
            }
            (CsgOp::Union(a1, a2), CsgOp::Union(b1, b2))
            | (CsgOp::Intersection(a1, a2), CsgOp::Intersection(b1, b2)) => {
                (self.equivalent(a1, b1) && self.equivalent(a2, b2))
                    || (self.equivalent(a1, b2) && self.equivalent(a2, b1))
            }
            _ => false,
        }
    }

    /// True when `b` is known to be the complement of `a`.
    pub fn are_complements(&self, a: CsgId, b: CsgId) -> bool {
        if self.nodes[a.index()].complement == Some(b) {
            return true;
        }
        match (self.op(a), self.op(b)) {
            (CsgOp::Leaf(p), CsgOp::Leaf(q)) => self
                .plane(p)
                .negated()
                .same(self.plane(q), &self.tolerances),
            _ => false,
        }
    }

    /// The complement of a plane, created on first use and cached both ways.
    pub fn complement_plane(&mut self, p: PlaneId) -> PlaneId {
        if let Some(c) = self.planes[p.index()].complement {
            return c;
        }
        let negated = self.plane(p).negated();
        let c = self.add_plane(negated);
        self.planes[p.index()].complement = Some(c);
        self.planes[c.index()].complement = Some(p);
        c
    }

    /// Boolean complement by De Morgan's laws, cached per node.
    pub fn complement(&mut self, a: CsgId) -> CsgId {
        if let Some(c) = self.nodes[a.index()].complement {
            return c;
        }
        let c = match self.op(a) {
            CsgOp::Universe => CsgId::NULL,
            CsgOp::Null => CsgId::UNIVERSE,
            CsgOp::Leaf(p) => {
                let q = self.complement_plane(p);
                self.leaf_for(q)
            }
            CsgOp::Union(l, r) => {
                let cl = self.complement(l);
                let cr = self.complement(r);
                self.intersection(cl, cr)
            }
            CsgOp::Intersection(l, r) => {
                let cl = self.complement(l);
                let cr = self.complement(r);
                self.union(cl, cr)
            }
        };
        self.link_complements(a, c);
        c
    }

    fn link_complements(&mut self, a: CsgId, c: CsgId) {
        if a.is_reserved() || c.is_reserved() {
            return;
        }
        self.cache_complement(a, c);
        self.cache_complement(c, a);
    }

    fn cache_complement(&mut self, id: CsgId, c: CsgId) {
        debug_assert!(!id.is_reserved(), "UNIVERSE and NULL are never rewritten");
        let slot = &mut self.nodes[id.index()].complement;
        if slot.is_none() {
            *slot = Some(c);
        }
    }

    /// Every leaf moved `d` along its normal; negative `d` shrinks.
    pub fn offset(&mut self, a: CsgId, d: f64) -> CsgId {
        match self.op(a) {
            CsgOp::Universe | CsgOp::Null => a,
            CsgOp::Leaf(p) => {
                let shifted = self.plane(p).offset(d);
                self.leaf(shifted)
            }
            CsgOp::Union(l, r) => {
                let l2 = self.offset(l, d);
                let r2 = self.offset(r, d);
                self.union(l2, r2)
            }
            CsgOp::Intersection(l, r) => {
                let l2 = self.offset(l, d);
                let r2 = self.offset(r, d);
                self.intersection(l2, r2)
            }
        }
    }

    /// Value at `p`: negative inside, positive outside.
    pub fn value(&self, a: CsgId, p: Point2D) -> f64 {
        self.eval(a, p).0
    }

    /// Inside or on the boundary.
    pub fn contains(&self, a: CsgId, p: Point2D) -> bool {
        self.value(a, p) <= 0.0
    }

    /// The leaf whose half-plane controls the value at `p`: the most
    /// negative child at each union, the most positive at each intersection.
    /// `UNIVERSE` and `NULL` are their own controlling leaves.
    pub fn leaf_at(&self, a: CsgId, p: Point2D) -> CsgId {
        self.eval(a, p).1
    }

    fn eval(&self, a: CsgId, p: Point2D) -> (f64, CsgId) {
        match self.op(a) {
            CsgOp::Universe => (f64::NEG_INFINITY, a),
            CsgOp::Null => (f64::INFINITY, a),
            CsgOp::Leaf(plane) => (self.plane(plane).value(p), a),
            CsgOp::Union(l, r) => {
                let lv = self.eval(l, p);
                let rv = self.eval(r, p);
                if rv.0 < lv.0 {
                    rv
                } else {
                    lv
                }
            }
            CsgOp::Intersection(l, r) => {
                let lv = self.eval(l, p);
                let rv = self.eval(r, p);
                if rv.0 > lv.0 {
                    rv
                } else {
                    lv
                }
            }
        }
    }

    /// Conservative bounds of the value over a box.
    pub fn value_box(&self, a: CsgId, b: &BoundingBox) -> Interval {
        match self.op(a) {
            CsgOp::Universe => Interval::point(f64::NEG_INFINITY),
            CsgOp::Null => Interval::point(f64::INFINITY),
            CsgOp::Leaf(p) => self.plane(p).value_box(b),
            CsgOp::Union(l, r) => self.value_box(l, b).min(&self.value_box(r, b)),
            CsgOp::Intersection(l, r) => self.value_box(l, b).max(&self.value_box(r, b)),
        }
    }

    /// The expression restricted to a box: leaves that are wholly inside or
    /// wholly outside over the box collapse to `UNIVERSE` or `NULL`.
    pub fn prune(&mut self, a: CsgId, b: &BoundingBox) -> CsgId {
        match self.op(a) {
            CsgOp::Universe | CsgOp::Null => a,
            CsgOp::Leaf(p) => {
                let v = self.plane(p).value_box(b);
                if v.is_negative() {
                    CsgId::UNIVERSE
                } else if v.is_positive() {
                    CsgId::NULL
                } else {
                    a
                }
            }
            CsgOp::Union(l, r) => {
                let l2 = self.prune(l, b);
                let r2 = self.prune(r, b);
                if l2 == l && r2 == r {
                    a
                } else {
                    self.union(l2, r2)
                }
            }
            CsgOp::Intersection(l, r) => {
                let l2 = self.prune(l, b);
                let r2 = self.prune(r, b);
                if l2 == l && r2 == r {
                    a
                } else {
                    self.intersection(l2, r2)
                }
            }
        }
    }

    /// Distinct planes referenced by the leaves below `a`, in first-seen order.
    pub fn planes_of(&self, a: CsgId) -> Vec<PlaneId> {
        let mut out = Vec::new();
        let mut stack = vec![a];
        while let Some(id) = stack.pop() {
            match self.op(id) {
                CsgOp::Leaf(p) => {
                    if !out.contains(&p) {
                        out.push(p);
                    }
                }
                CsgOp::Union(l, r) | CsgOp::Intersection(l, r) => {
                    stack.push(r);
                    stack.push(l);
                }
                CsgOp::Universe | CsgOp::Null => {}
            }
        }
        out
    }

    /// Rebuild bottom-up, applying the identity laws and `regularise` at
    /// every node. Best effort: the result is equivalent, not canonical.
    pub fn simplify(&mut self, a: CsgId) -> CsgId {
        let rebuilt = match self.op(a) {
            CsgOp::Union(l, r) => {
                let l2 = self.simplify(l);
                let r2 = self.simplify(r);
                if l2 == l && r2 == r {
                    a
                } else {
                    self.union(l2, r2)
                }
            }
            CsgOp::Intersection(l, r) => {
                let l2 = self.simplify(l);
                let r2 = self.simplify(r);
                if l2 == l && r2 == r {
                    a
                } else {
                    self.intersection(l2, r2)
                }
            }
            _ => return a,
        };
        let result = self.regularise(rebuilt);
        if result != a {
            trace!(
                "simplified {} (complexity {}) to {} (complexity {})",
                a,
                self.complexity(a),
                result,
                self.complexity(result)
            );
        }
        result
    }

    /// Local rewrites of a node against its children:
    /// absorption (`p | (p & q) = p`), idempotence across a level
    /// (`p | (p | q) = p | q`) and complements (`p | (!p | q) = UNIVERSE`),
    /// with their duals.
    pub fn regularise(&mut self, a: CsgId) -> CsgId {
        let (union, x, y) = match self.op(a) {
            CsgOp::Union(x, y) => (true, x, y),
            CsgOp::Intersection(x, y) => (false, x, y),
            _ => return a,
        };
        for (p, q) in [(x, y), (y, x)] {
            match (union, self.op(q)) {
                (true, CsgOp::Intersection(q1, q2)) | (false, CsgOp::Union(q1, q2)) => {
                    if self.equivalent(p, q1) || self.equivalent(p, q2) {
                        return p;
                    }
                }
                (true, CsgOp::Union(q1, q2)) | (false, CsgOp::Intersection(q1, q2)) => {
                    if self.equivalent(p, q1) || self.equivalent(p, q2) {
                        return q;
                    }
                    if self.are_complements(p, q1) || self.are_complements(p, q2) {
                        return if union { CsgId::UNIVERSE } else { CsgId::NULL };
                    }
                }
                _ => {}
            }
        }
        a
    }

    /// Human-readable form, for logs.
    pub fn describe(&self, a: CsgId) -> String {
        match self.op(a) {
            CsgOp::Universe => "U".to_string(),
            CsgOp::Null => "0".to_string(),
            CsgOp::Leaf(p) => {
                let h = self.plane(p);
                format!(
                    "[{:.3}x{:+.3}y{:+.3}]",
                    h.normal().x,
                    h.normal().y,
                    h.constant()
                )
            }
            CsgOp::Union(l, r) => format!("({} | {})", self.describe(l), self.describe(r)),
            CsgOp::Intersection(l, r) => {
                format!("({} & {})", self.describe(l), self.describe(r))
            }
        }
    }
}
