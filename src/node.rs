use std::fmt;

/// Leaf or fork payload of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// Indices of the points held by the leaf.
    Leaf(Vec<usize>),
    /// Slot ids of the child nodes.
    Fork(Vec<usize>),
}

/// A node of the tree. Points and nodes are referred to by index: `center` is a
/// point index, `parent` and the fork children are slot ids in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub slot_id: usize,
    /// Only used to splice a split leaf into its parent, `usize::MAX` at the root.
    pub parent: usize,
    pub center: usize,
    pub radius: f64,
    pub weight: f64,
    pub size: usize,
    /// Every member is at least as close to `center` as to the center of any sibling.
    pub exclusive: bool,
    pub kind: Kind,
}

impl Node {
    #[must_use]
    pub fn leaf(center: usize, points: Vec<usize>, radius: f64, weight: f64) -> Node {
        let weight = if points.len() <= 1 { 0.0 } else { weight };
        Node {
            slot_id: usize::MAX,
            parent: usize::MAX,
            center,
            radius,
            weight,
            size: points.len(),
            exclusive: true,
            kind: Kind::Leaf(points),
        }
    }

    /// Turns a leaf into the fork that replaces it. The fork keeps the leaf's
    /// center, radius, weight, size and position.
    #[must_use]
    pub fn fork(leaf: &Node, children: Vec<usize>) -> Node {
        Node {
            slot_id: usize::MAX,
            parent: leaf.parent,
            center: leaf.center,
            radius: leaf.radius,
            weight: leaf.weight,
            size: leaf.size,
            exclusive: leaf.exclusive,
            kind: Kind::Fork(children),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf(_))
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.slot_id == usize::MAX
    }

    /// Points of a leaf, empty for a fork.
    #[must_use]
    pub fn points(&self) -> &[usize] {
        match &self.kind {
            Kind::Leaf(points) => points,
            Kind::Fork(_) => &[],
        }
    }

    /// Children of a fork, empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        match &self.kind {
            Kind::Leaf(_) => &[],
            Kind::Fork(children) => children,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node {
            slot_id: usize::MAX,
            parent: usize::MAX,
            center: usize::MAX,
            radius: 0.0,
            weight: 0.0,
            size: 0,
            exclusive: true,
            kind: Kind::Leaf(Vec::new()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_leaf() { "leaf" } else { "fork" };
        writeln!(
            f,
            "{},{},{},{},{},{},{}",
            self.slot_id, kind, self.center, self.radius, self.weight, self.size, self.exclusive
        )
    }
}
