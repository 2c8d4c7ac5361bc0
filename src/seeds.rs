use crate::distance::Metric;

/// Farthest-point sampling of well separated seeds.
#[derive(Clone, Debug, Default)]
pub struct SeedSelector {
    evaluations: usize,
}

impl SeedSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance evaluations spent by all calls so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Picks `k` members: first the one farthest from `mean`, then repeatedly
    /// the one whose distance to its closest chosen seed is largest. Returns
    /// `members` unchanged when `k` covers all of them.
    pub fn select<P, M: Metric<P>>(
        &mut self,
        points: &[P],
        metric: &M,
        members: &[usize],
        mean: &P,
        k: usize,
    ) -> Vec<usize> {
        if k >= members.len() {
            return members.to_vec();
        }
        let mut seeds = Vec::with_capacity(k);
        if k == 0 {
            return seeds;
        }

        let mut first = 0;
        let mut farthest = f64::NEG_INFINITY;
        for (i, &member) in members.iter().enumerate() {
            let distance = metric.distance(mean, &points[member]);
            if distance > farthest {
                farthest = distance;
                first = i;
            }
        }
        self.evaluations += members.len();

        // Distance from each member to its closest seed so far.
        let mut closest = vec![f64::INFINITY; members.len()];
        let mut chosen = vec![false; members.len()];
        let mut next = first;
        while seeds.len() < k {
            chosen[next] = true;
            let seed = members[next];
            seeds.push(seed);
            if seeds.len() == k {
                break;
            }

            let mut best = usize::MAX;
            let mut best_distance = f64::NEG_INFINITY;
            for (i, &member) in members.iter().enumerate() {
                if chosen[i] {
                    continue;
                }
                let distance = metric.distance(&points[seed], &points[member]);
                self.evaluations += 1;
                closest[i] = closest[i].min(distance);
                if closest[i] > best_distance {
                    best_distance = closest[i];
                    best = i;
                }
            }
            next = best;
        }
        seeds
    }
}
