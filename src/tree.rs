use crate::{
    builder::{build_index, Params},
    distance::Metric,
    error::Result,
    index::Index,
    linear::Neighbour,
    node::Node,
    progress::Progress,
    search::Searcher,
    stats::BuildStats,
};

/// A read-only index over a fixed set of points.
///
/// The tree owns the points and the metric. Leaves hold point indices, forks
/// hold child slot ids. Once built, any number of [`Searcher`]s can query it
/// concurrently.
pub struct Tree<P, M> {
    points: Vec<P>,
    metric: M,
    index: Index,
    root: usize,
    stats: BuildStats,
}

/// Builds a tree with default [`Params`] and the given leaf ratio.
///
/// # Errors
/// See [`Tree::build`].
pub fn build<P: PartialOrd, M: Metric<P>>(
    points: Vec<P>,
    metric: M,
    ratio: usize,
    progress: &mut dyn Progress,
) -> Result<Tree<P, M>> {
    Tree::build(points, metric, &Params::new(ratio), progress)
}

impl<P, M: Metric<P>> Tree<P, M> {
    /// Clusters `points` into a tree of about `points.len() / params.ratio` leaves.
    ///
    /// # Errors
    /// `InvalidInput` for an empty collection or invalid parameters,
    /// `Cancelled` when `progress` stops the build.
    pub fn build(
        points: Vec<P>,
        metric: M,
        params: &Params,
        progress: &mut dyn Progress,
    ) -> Result<Self>
    where
        P: PartialOrd,
    {
        let built = build_index(&points, &metric, params, progress)?;
        Ok(Tree {
            points,
            metric,
            index: built.index,
            root: built.root,
            stats: built.stats,
        })
    }

    /// Tie-inclusive `k` nearest neighbors of `point`, closest first.
    ///
    /// # Errors
    /// `InvalidInput` when `k` is zero.
    pub fn query(&self, point: &P, k: usize) -> Result<Vec<Neighbour>> {
        self.searcher().query(point, k)
    }

    /// A searcher with its own scratch buffers and statistics.
    #[must_use]
    pub fn searcher(&self) -> Searcher<'_, P, M> {
        Searcher::new(self)
    }
}

impl<P, M> Tree<P, M> {
    #[must_use]
    pub fn root(&self) -> &Node {
        self.index.get(self.root)
    }

    #[must_use]
    pub fn node(&self, slot_id: usize) -> &Node {
        self.index.get(slot_id)
    }

    #[must_use]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    #[must_use]
    pub fn point(&self, index: usize) -> &P {
        &self.points[index]
    }

    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// 0 for a leaf, one more than the highest child for a fork.
    #[must_use]
    pub fn height_of(&self, slot_id: usize) -> usize {
        let mut height = 0;
        let mut stack = vec![(slot_id, 0)];
        while let Some((slot_id, depth)) = stack.pop() {
            height = height.max(depth);
            for &child in self.node(slot_id).children() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Slot ids of all leaves, in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(slot_id) = stack.pop() {
            let node = self.node(slot_id);
            if node.is_leaf() {
                leaves.push(slot_id);
            }
            stack.extend(node.children().iter().rev());
        }
        leaves
    }

    /// Indices of every point below `slot_id`.
    #[must_use]
    pub fn members(&self, slot_id: usize) -> Vec<usize> {
        let mut members = Vec::new();
        let mut stack = vec![slot_id];
        while let Some(slot_id) = stack.pop() {
            let node = self.node(slot_id);
            members.extend_from_slice(node.points());
            stack.extend_from_slice(node.children());
        }
        members
    }

    /// One row per node, depth first, prefixed with the node's depth.
    #[must_use]
    pub fn nodes_to_string_rows(&self) -> Vec<String> {
        let mut rows = Vec::new();
        let mut stack = vec![(self.root, 0)];
        while let Some((slot_id, depth)) = stack.pop() {
            let node = self.node(slot_id);
            rows.push(format!("{depth},{node}"));
            for &child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        rows
    }
}
