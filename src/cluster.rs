use rand::{rngs::StdRng, seq::SliceRandom};

use crate::{distance::Metric, seeds::SeedSelector, stats::BuildStats};

/// One group produced by [`Clusterer::split`].
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub center: usize,
    pub members: Vec<usize>,
    pub radius: f64,
    pub weight: f64,
    /// No member was moved here from a strictly closer center.
    pub exclusive: bool,
}

/// Splits a set of points into groups around medoids with a bounded Lloyd iteration.
pub struct Clusterer {
    branching: usize,
    max_iterations: usize,
    rng: StdRng,
    seeds: SeedSelector,
    stats: BuildStats,
}

// Smallest m with m * m >= n, at least 3.
fn sample_size(n: usize) -> usize {
    let mut m = 0;
    while m * m < n {
        m += 1;
    }
    m.max(3)
}

impl Clusterer {
    #[must_use]
    pub fn new(branching: usize, max_iterations: usize, rng: StdRng) -> Self {
        Clusterer {
            branching,
            max_iterations,
            rng,
            seeds: SeedSelector::new(),
            stats: BuildStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> BuildStats {
        BuildStats {
            seed_evaluations: self.seeds.evaluations(),
            ..self.stats
        }
    }

    /// Approximate medoid of `members`: among a random sample of about
    /// `sqrt(n)` members plus `previous`, the point with the smallest sum of
    /// squared distances to the rest of the sample. Ties keep `previous`.
    pub fn medoid<P, M: Metric<P>>(
        &mut self,
        points: &[P],
        metric: &M,
        members: &[usize],
        previous: usize,
    ) -> usize {
        let others = members
            .iter()
            .copied()
            .filter(|&member| member != previous)
            .collect::<Vec<_>>();
        let size = sample_size(members.len());

        let mut sample = vec![previous];
        if others.len() < size {
            sample.extend(others);
        } else {
            sample.extend(others.choose_multiple(&mut self.rng, size - 1).copied());
        }
        if sample.len() == 1 {
            return previous;
        }

        let mut costs = vec![0.0; sample.len()];
        for i in 0..sample.len() {
            for j in i + 1..sample.len() {
                let distance = metric.distance(&points[sample[i]], &points[sample[j]]);
                costs[i] += distance * distance;
                costs[j] += distance * distance;
            }
        }
        self.stats.cluster_evaluations += sample.len() * (sample.len() - 1) / 2;

        let mut best = 0;
        for (i, cost) in costs.iter().enumerate() {
            if *cost < costs[best] {
                best = i;
            }
        }
        sample[best]
    }

    /// Wraps `members` around `center`, measuring radius and weight.
    pub fn enclose<P, M: Metric<P>>(
        &mut self,
        points: &[P],
        metric: &M,
        members: Vec<usize>,
        center: usize,
    ) -> Cluster {
        let group = members
            .into_iter()
            .map(|member| (member, metric.distance(&points[center], &points[member])))
            .collect::<Vec<_>>();
        self.stats.cluster_evaluations += group.len();
        Cluster::new(center, group, true)
    }

    /// Splits `members` into at most `branching` non-empty groups. Seeds come
    /// from farthest-point sampling around `center`.
    ///
    /// Each group carries the center it was assigned against, which is the
    /// center of the round before the last medoid update.
    pub fn split<P, M: Metric<P>>(
        &mut self,
        points: &[P],
        metric: &M,
        members: &[usize],
        center: usize,
    ) -> Vec<Cluster> {
        let mut centers =
            self.seeds
                .select(points, metric, members, &points[center], self.branching);
        let k = centers.len();

        let mut iterations = 0;
        loop {
            iterations += 1;

            // Assign every member to its closest center, the first one on ties.
            let mut groups: Vec<Vec<(usize, f64)>> = vec![Vec::new(); k];
            for &member in members {
                let mut best = 0;
                let mut best_distance = f64::INFINITY;
                for (j, &c) in centers.iter().enumerate() {
                    let distance = metric.distance(&points[c], &points[member]);
                    if distance < best_distance {
                        best_distance = distance;
                        best = j;
                    }
                }
                groups[best].push((member, best_distance));
            }
            self.stats.cluster_evaluations += members.len() * k;

            let exclusive = self.repair(points, metric, &centers, &mut groups);

            let next = (0..k)
                .map(|j| {
                    let group = groups[j].iter().map(|&(m, _)| m).collect::<Vec<_>>();
                    self.medoid(points, metric, &group, centers[j])
                })
                .collect::<Vec<_>>();

            let mut converged = true;
            for (&old, &new) in centers.iter().zip(next.iter()) {
                if old != new {
                    self.stats.cluster_evaluations += 1;
                    if metric.distance(&points[old], &points[new]) != 0.0 {
                        converged = false;
                        break;
                    }
                }
            }

            if converged || iterations >= self.max_iterations {
                self.stats.record_split(iterations);
                return groups
                    .into_iter()
                    .zip(centers)
                    .zip(exclusive)
                    .filter(|((group, _), _)| !group.is_empty())
                    .map(|((group, center), exclusive)| Cluster::new(center, group, exclusive))
                    .collect();
            }
            centers = next;
        }
    }

    // Moves into every empty group the member closest to its center, taken
    // from a group with more than one member. A group is no longer exclusive
    // once it receives a member that was strictly closer to its old center.
    fn repair<P, M: Metric<P>>(
        &mut self,
        points: &[P],
        metric: &M,
        centers: &[usize],
        groups: &mut [Vec<(usize, f64)>],
    ) -> Vec<bool> {
        let mut exclusive = vec![true; groups.len()];
        for j in 0..groups.len() {
            if !groups[j].is_empty() {
                continue;
            }
            let mut donor = None;
            let mut donor_distance = f64::INFINITY;
            for (g, group) in groups.iter().enumerate() {
                if group.len() <= 1 {
                    continue;
                }
                for (position, &(member, _)) in group.iter().enumerate() {
                    let distance = metric.distance(&points[centers[j]], &points[member]);
                    self.stats.cluster_evaluations += 1;
                    if distance < donor_distance {
                        donor_distance = distance;
                        donor = Some((g, position));
                    }
                }
            }
            if let Some((g, position)) = donor {
                let (member, assigned) = groups[g].remove(position);
                if donor_distance > assigned {
                    exclusive[j] = false;
                }
                groups[j].push((member, donor_distance));
            }
        }
        exclusive
    }
}

impl Cluster {
    fn new(center: usize, group: Vec<(usize, f64)>, exclusive: bool) -> Cluster {
        let radius = group.iter().fold(0.0_f64, |max, &(_, d)| max.max(d));
        let weight = if group.len() <= 1 {
            0.0
        } else {
            group.iter().map(|&(_, d)| d).sum()
        };
        Cluster {
            center,
            members: group.into_iter().map(|(member, _)| member).collect(),
            radius,
            weight,
            exclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::{sample_size, Clusterer};
    use crate::distance::{AbsDiff, Euclidean, Metric};

    fn clusterer(branching: usize) -> Clusterer {
        Clusterer::new(branching, 1000, StdRng::seed_from_u64(0))
    }

    #[test]
    fn sample_sizes() {
        assert_eq!(sample_size(0), 3);
        assert_eq!(sample_size(4), 3);
        assert_eq!(sample_size(9), 3);
        assert_eq!(sample_size(10), 4);
        assert_eq!(sample_size(100), 10);
        assert_eq!(sample_size(101), 11);
    }

    #[test]
    fn medoid_of_small_group() {
        let points = [0.0, 1.0, 2.0];
        let mut clusterer = clusterer(3);
        // The whole group is sampled, 1 minimizes the squared distances
        assert_eq!(clusterer.medoid(&points, &AbsDiff, &[0, 1, 2], 0), 1);
        assert_eq!(clusterer.medoid(&points, &AbsDiff, &[0, 1, 2], 1), 1);
        // A single member keeps its center
        assert_eq!(clusterer.medoid(&points, &AbsDiff, &[2], 2), 2);
        assert_eq!(clusterer.stats().cluster_evaluations, 6);
    }

    #[test]
    fn enclose_measures_spread() {
        let points = [0.0, 1.0, 4.0];
        let mut clusterer = clusterer(3);
        let cluster = clusterer.enclose(&points, &AbsDiff, vec![0, 1, 2], 1);
        assert_eq!(cluster.center, 1);
        assert_eq!(cluster.radius, 3.0);
        assert_eq!(cluster.weight, 4.0);
        assert_eq!(cluster.members, vec![0, 1, 2]);
    }

    #[test]
    fn separated_groups() {
        let points = [0.0, 1.0, 2.0, 50.0, 51.0, 52.0, 100.0, 101.0, 102.0];
        let members = (0..points.len()).collect::<Vec<_>>();
        let mut clusterer = clusterer(3);
        let mut clusters = clusterer.split(&points, &AbsDiff, &members, 4);
        clusters.sort_by_key(|cluster| cluster.members[0]);

        assert_eq!(clusters.len(), 3);
        let mut groups = clusters
            .iter()
            .map(|cluster| {
                let mut members = cluster.members.clone();
                members.sort_unstable();
                members
            })
            .collect::<Vec<_>>();
        groups.sort();
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]);

        for cluster in &clusters {
            assert!(cluster.members.contains(&cluster.center));
            assert!(cluster.radius <= 2.0);
            assert!(cluster.exclusive);
        }
        let stats = clusterer.stats();
        assert_eq!(stats.splits, 1);
        assert!(stats.max_iterations >= 1);
        assert!(stats.seed_evaluations > 0);
    }

    #[test]
    fn duplicates_fill_every_group() {
        let points = [5.0, 9.0, 9.0];
        let mut clusterer = clusterer(3);
        let clusters = clusterer.split(&points, &AbsDiff, &[0, 1, 2], 1);
        assert_eq!(clusters.len(), 3);
        for cluster in &clusters {
            assert_eq!(cluster.members.len(), 1);
            assert_eq!(cluster.weight, 0.0);
            assert_eq!(cluster.radius, 0.0);
        }
    }

    #[test]
    fn repair_marks_overlap() {
        let points = [0.0, 1.0, 10.0];
        let mut clusterer = clusterer(2);
        // The group around 10 is empty, 1 is moved in from the closer center 0
        let mut groups = vec![vec![(0, 0.0), (1, 1.0)], Vec::new()];
        let exclusive = clusterer.repair(&points, &AbsDiff, &[0, 2], &mut groups);
        assert_eq!(exclusive, vec![true, false]);
        assert_eq!(groups, vec![vec![(0, 0.0)], vec![(1, 9.0)]]);

        // A copy of the empty group's center moves in without overlap
        let points = [5.0, 5.0];
        let mut groups = vec![vec![(0, 0.0), (1, 0.0)], Vec::new()];
        let exclusive = clusterer.repair(&points, &AbsDiff, &[0, 1], &mut groups);
        assert_eq!(exclusive, vec![true, true]);
        assert_eq!(groups, vec![vec![(1, 0.0)], vec![(0, 0.0)]]);
    }

    #[test]
    fn members_are_preserved() {
        let mut rng = StdRng::seed_from_u64(0);
        let points = (0..300)
            .map(|_| [rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)])
            .collect::<Vec<[f64; 2]>>();
        let members = (0..points.len()).collect::<Vec<_>>();
        let mut clusterer = clusterer(4);
        let clusters = clusterer.split(&points, &Euclidean, &members, 0);
        assert!(!clusters.is_empty() && clusters.len() <= 4);

        let mut all = clusters
            .iter()
            .flat_map(|cluster| cluster.members.iter().copied())
            .collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, members);

        for cluster in &clusters {
            let center = &points[cluster.center];
            let radius = cluster
                .members
                .iter()
                .map(|&m| Euclidean.distance(center, &points[m]))
                .fold(0.0_f64, f64::max);
            assert!((radius - cluster.radius).abs() < 1e-9);
            // Exclusive members are no farther from their center than from any other
            if cluster.exclusive {
                for other in &clusters {
                    for &m in &cluster.members {
                        let own = Euclidean.distance(center, &points[m]);
                        let theirs = Euclidean.distance(&points[other.center], &points[m]);
                        assert!(own <= theirs + 1e-9);
                    }
                }
            }
        }
    }
}
