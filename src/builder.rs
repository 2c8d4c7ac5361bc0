use std::{cmp::Ordering, collections::BinaryHeap};

use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    cluster::Clusterer,
    distance::Metric,
    error::{Error, Result},
    index::Index,
    node::Node,
    progress::Progress,
    stats::{as_f64, BuildStats},
};

/// Construction parameters of a [`crate::Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Target number of points per leaf, the tree grows `ceil(n / ratio)` leaves.
    pub ratio: usize,
    /// Number of children of a split leaf.
    pub branching: usize,
    /// Bound on the Lloyd iterations of a single split.
    pub max_iterations: usize,
    /// Seed of the sampling generator, `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            ratio: 5,
            branching: 3,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl Params {
    #[must_use]
    pub fn new(ratio: usize) -> Self {
        Params {
            ratio,
            ..Params::default()
        }
    }

    #[must_use]
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.ratio == 0 {
            return Err(Error::invalid("ratio must be positive"));
        }
        if self.branching < 2 {
            return Err(Error::invalid("branching must be at least 2"));
        }
        if self.max_iterations == 0 {
            return Err(Error::invalid("max_iterations must be positive"));
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

// A leaf waiting to be split. The heap pops the leaf with the largest weight,
// then radius, then size, then center.
struct Candidate<'a, P> {
    weight: OrderedFloat<f64>,
    radius: OrderedFloat<f64>,
    size: usize,
    center: &'a P,
    slot_id: usize,
}

impl<'a, P> Candidate<'a, P> {
    fn new(node: &Node, points: &'a [P]) -> Self {
        Candidate {
            weight: OrderedFloat(node.weight),
            radius: OrderedFloat(node.radius),
            size: node.size,
            center: &points[node.center],
            slot_id: node.slot_id,
        }
    }
}

impl<P: PartialOrd> Ord for Candidate<'_, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.radius.cmp(&other.radius))
            .then(self.size.cmp(&other.size))
            .then_with(|| {
                self.center
                    .partial_cmp(other.center)
                    .unwrap_or(Ordering::Equal)
            })
            .then(other.slot_id.cmp(&self.slot_id))
    }
}

impl<P: PartialOrd> PartialOrd for Candidate<'_, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: PartialOrd> PartialEq for Candidate<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: PartialOrd> Eq for Candidate<'_, P> {}

pub(crate) struct Built {
    pub index: Index,
    pub root: usize,
    pub stats: BuildStats,
}

// ceil(n / ratio), without overflowing for large ratios.
fn leaf_target(n: usize, ratio: usize) -> usize {
    n / ratio + usize::from(n % ratio != 0)
}

// Whole percent steps reached after growing `leaves` of `target` leaves, on a log scale.
fn reached(step: usize, leaves: usize, target: usize) -> bool {
    if target <= 1 || leaves >= target {
        return true;
    }
    as_f64(step) * as_f64(target).ln() <= 100.0 * as_f64(leaves).ln()
}

/// Grows the tree top-down: starting from one leaf with every point, the
/// heaviest leaf is split until there are `ceil(n / ratio)` leaves or the
/// heaviest leaf has zero weight.
pub(crate) fn build_index<P: PartialOrd, M: Metric<P>>(
    points: &[P],
    metric: &M,
    params: &Params,
    progress: &mut dyn Progress,
) -> Result<Built> {
    params.validate()?;
    if points.is_empty() {
        return Err(Error::invalid("cannot index an empty collection"));
    }

    let mut clusterer = Clusterer::new(params.branching, params.max_iterations, params.rng());
    let members = (0..points.len()).collect::<Vec<_>>();
    let center = clusterer.medoid(points, metric, &members, 0);
    let whole = clusterer.enclose(points, metric, members, center);

    let mut index = Index::new();
    let mut root = index.insert(Node::leaf(
        whole.center,
        whole.members,
        whole.radius,
        whole.weight,
    ));

    let target = leaf_target(points.len(), params.ratio);
    let mut leaves = 1;
    let mut heap = BinaryHeap::new();
    heap.push(Candidate::new(index.get(root), points));

    progress.begin("Indexing", 100);
    let mut step = 0;
    while leaves < target {
        if progress.is_cancelled() {
            tracing::debug!(leaves, target, "index construction cancelled");
            return Err(Error::Cancelled);
        }
        let top = match heap.pop() {
            Some(top) => top,
            None => break,
        };
        if top.weight.0 == 0.0 {
            tracing::debug!(leaves, target, "heaviest leaf has zero weight");
            break;
        }

        let leaf = index.get(top.slot_id);
        let members = leaf.points().to_vec();
        let clusters = clusterer.split(points, metric, &members, leaf.center);
        if clusters.len() < 2 {
            continue;
        }

        let children = clusters
            .into_iter()
            .map(|cluster| {
                let mut child = Node::leaf(
                    cluster.center,
                    cluster.members,
                    cluster.radius,
                    cluster.weight,
                );
                child.exclusive = cluster.exclusive;
                index.insert(child)
            })
            .collect::<Vec<_>>();
        let fork = Node::fork(index.get(top.slot_id), children.clone());
        let (fork, new_root) = index.replace(top.slot_id, fork, root);
        root = new_root;
        leaves += children.len() - 1;
        for &child in &children {
            heap.push(Candidate::new(index.get(child), points));
        }
        tracing::trace!(fork, children = children.len(), leaves, "split leaf");

        while step < 100 && reached(step + 1, leaves, target) {
            progress.advance()?;
            step += 1;
        }
    }
    while step < 100 {
        progress.advance()?;
        step += 1;
    }

    let stats = clusterer.stats();
    tracing::debug!(
        points = points.len(),
        leaves,
        target,
        splits = stats.splits,
        average_iterations = stats.average_iterations(),
        max_iterations = stats.max_iterations,
        "index built"
    );
    Ok(Built { index, root, stats })
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::{leaf_target, reached, Candidate, Params};
    use crate::{error::Error, node::Node};

    #[test]
    fn params() {
        let params = Params::new(10).with_branching(4).with_seed(7);
        assert_eq!(params.ratio, 10);
        assert_eq!(params.branching, 4);
        assert_eq!(params.max_iterations, 1000);
        assert_eq!(params.seed, Some(7));

        assert!(params.validate().is_ok());
        assert!(matches!(
            Params::new(0).validate(),
            Err(Error::InvalidInput(_))
        ));
        assert!(Params::new(3).with_branching(1).validate().is_err());
        assert!(Params::new(3).with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn heaviest_first() {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]];
        let mut nodes = [
            Node::leaf(0, vec![0, 1], 1.0, 1.0),
            Node::leaf(1, vec![0, 1], 1.0, 3.0),
            Node::leaf(2, vec![0, 1], 2.0, 3.0),
            Node::leaf(3, vec![0, 1, 2], 2.0, 3.0),
            Node::leaf(0, vec![0, 1, 2], 2.0, 3.0),
        ];
        for (slot_id, node) in nodes.iter_mut().enumerate() {
            node.slot_id = slot_id;
        }

        let mut heap = nodes
            .iter()
            .map(|node| Candidate::new(node, &points))
            .collect::<BinaryHeap<_>>();
        let order = std::iter::from_fn(|| heap.pop().map(|top| top.slot_id)).collect::<Vec<_>>();
        // Weight, then radius, then size, then the center coordinates
        assert_eq!(order, vec![3, 4, 2, 1, 0]);
    }

    #[test]
    fn leaf_targets() {
        assert_eq!(leaf_target(6, 3), 2);
        assert_eq!(leaf_target(7, 3), 3);
        assert_eq!(leaf_target(1, 5), 1);
        assert_eq!(leaf_target(600, 7), 86);
        assert_eq!(leaf_target(3, usize::MAX), 1);
        assert_eq!(leaf_target(usize::MAX, usize::MAX), 1);
        assert_eq!(leaf_target(usize::MAX, 1), usize::MAX);
    }

    #[test]
    fn log_scale() {
        assert!(reached(100, 1, 1));
        assert!(reached(0, 1, 100));
        assert!(!reached(1, 1, 100));
        // 10 of 100 leaves is half way on a log scale
        assert!(reached(49, 10, 100));
        assert!(!reached(51, 10, 100));
        assert!(reached(100, 100, 100));
    }
}
