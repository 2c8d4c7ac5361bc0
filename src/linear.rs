use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::{
    distance::Metric,
    error::{Error, Result},
};

/// One entry of a nearest neighbor result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Position of the point in the indexed collection.
    pub index: usize,
    pub distance: f64,
    /// Order in which the point was examined, breaks ties between equal distances.
    pub seq: u64,
}

impl Neighbour {
    #[must_use]
    pub fn new(index: usize, distance: f64, seq: u64) -> Self {
        Neighbour {
            index,
            distance,
            seq,
        }
    }

    fn cmp_by_distance(&self, other: &Self) -> Ordering {
        OrderedFloat(self.distance)
            .cmp(&OrderedFloat(other.distance))
            .then(self.seq.cmp(&other.seq))
    }
}

/// Length of the shortest prefix of a sorted result that holds `k` entries and
/// every entry tied with the last of them.
#[must_use]
pub fn cutoff(sorted: &[Neighbour], k: usize) -> usize {
    if k == 0 {
        return 0;
    }
    if k >= sorted.len() {
        return sorted.len();
    }
    let kth = OrderedFloat(sorted[k - 1].distance);
    k + sorted[k..]
        .iter()
        .take_while(|neighbour| OrderedFloat(neighbour.distance) <= kth)
        .count()
}

/// The `k` closest candidates plus every candidate tied with the `k`-th
/// distance, sorted by distance and then by `seq`.
#[must_use]
pub fn nearest(mut candidates: Vec<Neighbour>, k: usize) -> Vec<Neighbour> {
    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        let (_, kth, rest) = candidates.select_nth_unstable_by(k - 1, Neighbour::cmp_by_distance);
        let kth = OrderedFloat(kth.distance);
        let mut ties = rest
            .iter()
            .filter(|neighbour| OrderedFloat(neighbour.distance) == kth)
            .copied()
            .collect::<Vec<_>>();
        candidates.truncate(k);
        candidates.append(&mut ties);
    }
    candidates.sort_by(Neighbour::cmp_by_distance);
    candidates
}

/// Merges a batch of candidates into a sorted running result of size `k`.
/// Entries tied with the `k`-th distance are all kept.
pub fn merge<I>(result: &mut Vec<Neighbour>, batch: I, k: usize)
where
    I: IntoIterator<Item = Neighbour>,
{
    let worst = if result.len() >= k {
        result
            .last()
            .map_or(f64::INFINITY, |neighbour| neighbour.distance)
    } else {
        f64::INFINITY
    };
    let before = result.len();
    result.extend(
        batch
            .into_iter()
            .filter(|candidate| OrderedFloat(candidate.distance) <= OrderedFloat(worst)),
    );
    if result.len() == before {
        return;
    }
    result.sort_by(Neighbour::cmp_by_distance);
    let end = cutoff(result, k);
    result.truncate(end);
}

/// Exhaustive nearest neighbor search over a flat collection.
pub struct LinearIndex<P, M> {
    points: Vec<P>,
    metric: M,
}

impl<P, M: Metric<P>> LinearIndex<P, M> {
    #[must_use]
    pub fn new(points: Vec<P>, metric: M) -> Self {
        Self { points, metric }
    }

    #[must_use]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Tie-inclusive `k` nearest neighbors of `point`, closest first.
    ///
    /// # Errors
    /// `InvalidInput` when `k` is zero.
    pub fn query(&self, point: &P, k: usize) -> Result<Vec<Neighbour>> {
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        let candidates = self
            .points
            .iter()
            .zip(0_u64..)
            .enumerate()
            .map(|(index, (other, seq))| {
                Neighbour::new(index, self.metric.distance(point, other), seq)
            })
            .collect();
        Ok(nearest(candidates, k))
    }
}
