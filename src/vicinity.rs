use crate::{
    distance::Metric,
    error::{Error, Result},
    linear::{cutoff, Neighbour},
    search::Searcher,
    stats::Moments,
    tree::Tree,
};

/// Remembers the neighbors of the last queried point.
///
/// Points are recognized by address, not by value: asking again for the same
/// `&P` with a `k` no larger than before is answered from the cache. A miss
/// searches for at least `min_k` neighbors so that later, larger requests for
/// the same point still hit.
pub struct VicinityCache<'t, 'q, P, M> {
    searcher: Searcher<'t, P, M>,
    min_k: usize,
    point: Option<&'q P>,
    k: usize,
    vicinity: Vec<Neighbour>,
    hits: usize,
    misses: usize,
}

impl<'t, 'q, P, M: Metric<P>> VicinityCache<'t, 'q, P, M> {
    #[must_use]
    pub fn new(tree: &'t Tree<P, M>) -> Self {
        VicinityCache {
            searcher: tree.searcher(),
            min_k: 1,
            point: None,
            k: 0,
            vicinity: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    #[must_use]
    pub fn with_min_k(mut self, min_k: usize) -> Self {
        self.min_k = min_k.max(1);
        self
    }

    #[must_use]
    pub fn min_k(&self) -> usize {
        self.min_k
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Distance evaluations of the searches behind every miss.
    #[must_use]
    pub fn stats(&self) -> &Moments {
        self.searcher.stats()
    }

    pub fn clear(&mut self) {
        self.point = None;
        self.k = 0;
        self.vicinity.clear();
    }

    /// Tie-inclusive `k` nearest neighbors of `point`, closest first.
    ///
    /// # Errors
    /// `InvalidInput` when `k` is zero.
    pub fn query(&mut self, point: &'q P, k: usize) -> Result<&[Neighbour]> {
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        let cached = match self.point {
            Some(previous) => std::ptr::eq(previous, point) && k <= self.k,
            None => false,
        };
        if cached {
            self.hits += 1;
            tracing::trace!(k, cached = self.k, "vicinity hit");
        } else {
            self.misses += 1;
            let wanted = k.max(self.min_k);
            self.vicinity = self.searcher.query(point, wanted)?;
            self.point = Some(point);
            self.k = wanted;
        }
        let end = cutoff(&self.vicinity, k);
        Ok(&self.vicinity[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::VicinityCache;
    use crate::{builder::Params, distance::AbsDiff, progress::NoProgress, tree::Tree};

    fn line() -> Tree<f64, AbsDiff> {
        let values = (0..40).map(f64::from).collect::<Vec<_>>();
        let params = Params::new(4).with_seed(0);
        Tree::build(values, AbsDiff, &params, &mut NoProgress).expect("valid input")
    }

    #[test]
    fn hits_by_address() {
        let tree = line();
        let queries = [10.0, 10.0];
        let mut cache = VicinityCache::new(&tree).with_min_k(5);

        let first = cache.query(&queries[0], 2).expect("k is positive").to_vec();
        assert_eq!(first.len(), 3);
        assert_eq!(cache.misses(), 1);

        // Same address, smaller k
        let again = cache.query(&queries[0], 1).expect("k is positive");
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].index, 10);
        assert_eq!(cache.hits(), 1);

        // Within the floor
        let wider = cache.query(&queries[0], 5).expect("k is positive");
        assert_eq!(wider.len(), 5);
        assert_eq!(cache.hits(), 2);

        // Equal value at another address is a miss
        cache.query(&queries[1], 1).expect("k is positive");
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.stats().count(), 2);
    }

    #[test]
    fn grows_past_floor() {
        let tree = line();
        let point = 20.5;
        let mut cache = VicinityCache::new(&tree);
        assert_eq!(cache.min_k(), 1);

        assert_eq!(cache.query(&point, 1).expect("k is positive").len(), 2);
        let result = cache.query(&point, 4).expect("k is positive");
        assert_eq!(result.len(), 4);
        assert_eq!(cache.misses(), 2);

        cache.clear();
        cache.query(&point, 1).expect("k is positive");
        assert_eq!(cache.misses(), 3);
        assert!(cache.query(&point, 0).is_err());
    }
}
