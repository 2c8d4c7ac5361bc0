use ordered_float::OrderedFloat;

use crate::{
    distance::Metric,
    error::{Error, Result},
    linear::{merge, Neighbour},
    node::Kind,
    stats::Moments,
    tree::Tree,
};

#[derive(Clone, Copy, Debug)]
struct Frame {
    slot_id: usize,
    /// Distance from the query to the node's center.
    distance: f64,
    /// Distance from the query to the closest center of a sibling.
    sibling: f64,
}

/// Branch-and-bound k nearest neighbor search over a [`Tree`].
///
/// A searcher keeps its stack and scratch buffers between calls, so one
/// instance serves one thread. The tree itself can be shared by many.
pub struct Searcher<'t, P, M> {
    tree: &'t Tree<P, M>,
    stack: Vec<Frame>,
    children: Vec<Frame>,
    batch: Vec<Neighbour>,
    stats: Moments,
    last_evaluations: usize,
}

impl<'t, P, M: Metric<P>> Searcher<'t, P, M> {
    #[must_use]
    pub fn new(tree: &'t Tree<P, M>) -> Self {
        Searcher {
            tree,
            stack: Vec::new(),
            children: Vec::new(),
            batch: Vec::new(),
            stats: Moments::new(),
            last_evaluations: 0,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &'t Tree<P, M> {
        self.tree
    }

    /// Distance evaluations per query over all calls.
    #[must_use]
    pub fn stats(&self) -> &Moments {
        &self.stats
    }

    /// Distance evaluations of the most recent query.
    #[must_use]
    pub fn last_evaluations(&self) -> usize {
        self.last_evaluations
    }

    /// Tie-inclusive `k` nearest neighbors of `point`, closest first. Asking
    /// for more points than the tree holds returns all of them.
    ///
    /// A node is skipped once `k` neighbors are known with worst distance `D`
    /// and either its ball cannot hold anything within `D`, or a sibling's
    /// center is closer to the query than its own by more than `2 * D`.
    ///
    /// # Errors
    /// `InvalidInput` when `k` is zero.
    pub fn query(&mut self, point: &P, k: usize) -> Result<Vec<Neighbour>> {
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        let tree = self.tree;
        let metric = tree.metric();
        let points = tree.points();

        let mut result: Vec<Neighbour> = Vec::new();
        let mut seq = 0;
        let root = tree.root();
        let mut evaluations = 1;
        self.stack.clear();
        self.stack.push(Frame {
            slot_id: root.slot_id,
            distance: metric.distance(point, &points[root.center]),
            sibling: f64::INFINITY,
        });

        while let Some(frame) = self.stack.pop() {
            let node = tree.node(frame.slot_id);
            if result.len() >= k {
                let worst = result.last().map_or(f64::INFINITY, |n| n.distance);
                if frame.distance > node.radius + worst {
                    continue;
                }
                if node.exclusive && frame.distance - worst > frame.sibling + worst {
                    continue;
                }
            }

            match &node.kind {
                Kind::Leaf(members) => {
                    self.batch.clear();
                    for &member in members {
                        let distance = metric.distance(point, &points[member]);
                        self.batch.push(Neighbour::new(member, distance, seq));
                        seq += 1;
                    }
                    evaluations += members.len();
                    merge(&mut result, self.batch.drain(..), k);
                }
                Kind::Fork(children) => {
                    self.children.clear();
                    for &child in children {
                        let center = &points[tree.node(child).center];
                        self.children.push(Frame {
                            slot_id: child,
                            distance: metric.distance(point, center),
                            sibling: f64::INFINITY,
                        });
                    }
                    evaluations += children.len();
                    set_siblings(&mut self.children);

                    // Farthest first, so the closest child is explored next.
                    self.children
                        .sort_by_key(|frame| std::cmp::Reverse(OrderedFloat(frame.distance)));
                    self.stack.append(&mut self.children);
                }
            }
        }

        self.stats.record(evaluations);
        self.last_evaluations = evaluations;
        Ok(result)
    }
}

// Stores in every frame the smallest distance among the other frames.
fn set_siblings(frames: &mut [Frame]) {
    let mut closest = (usize::MAX, f64::INFINITY);
    let mut second = f64::INFINITY;
    for (i, frame) in frames.iter().enumerate() {
        if frame.distance < closest.1 {
            second = closest.1;
            closest = (i, frame.distance);
        } else if frame.distance < second {
            second = frame.distance;
        }
    }
    for (i, frame) in frames.iter_mut().enumerate() {
        frame.sibling = if i == closest.0 { second } else { closest.1 };
    }
}
