/// Distance between two points of a metric space.
///
/// Implementations must be deterministic, non-negative, symmetric and satisfy
/// the triangle inequality. None of this is checked: the pruning bounds of the
/// search are only exact when it holds. A distance that returns NaN or an
/// infinity is a contract violation, the resulting tree shape and neighbor
/// lists are unspecified (NaN orders after every finite distance).
pub trait Metric<P: ?Sized> {
    fn distance(&self, a: &P, b: &P) -> f64;
}

impl<P: ?Sized, F> Metric<P> for F
where
    F: Fn(&P, &P) -> f64,
{
    fn distance(&self, a: &P, b: &P) -> f64 {
        self(a, b)
    }
}

pub fn euclidean<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        sum += (x - y).powi(2);
    }
    sum.sqrt()
}

/// L2 distance over fixed-size arrays and vectors of equal length.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl<const D: usize> Metric<[f64; D]> for Euclidean {
    fn distance(&self, a: &[f64; D], b: &[f64; D]) -> f64 {
        euclidean(a, b)
    }
}

impl Metric<Vec<f64>> for Euclidean {
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Absolute difference on the real line.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsDiff;

impl Metric<f64> for AbsDiff {
    fn distance(&self, a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::{euclidean, AbsDiff, Euclidean, Metric};

    #[test]
    fn metrics() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(Euclidean.distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(Euclidean.distance(&vec![0.0, 3.0], &vec![4.0, 0.0]), 5.0);
        assert_eq!(AbsDiff.distance(&2.5, &-1.5), 4.0);

        let hamming = |a: &&str, b: &&str| {
            let count = a.chars().zip(b.chars()).filter(|(x, y)| x != y).count();
            count as f64
        };
        assert_eq!(hamming.distance(&"karolin", &"kathrin"), 3.0);
    }
}
