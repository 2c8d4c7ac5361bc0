//! Exact k nearest neighbor search in arbitrary metric spaces.
//!
//! Points are clustered top-down around approximate medoids into a tree of
//! balls. Queries walk the tree with branch-and-bound pruning and return the
//! `k` closest points together with every point tied with the `k`-th distance.
//!
//! ```
//! use vicinity::{build, AbsDiff, NoProgress};
//!
//! let tree = build(vec![0.0, 1.0, 2.0, 5.0, 9.0, 9.0], AbsDiff, 3, &mut NoProgress).unwrap();
//! let nearest = tree.query(&9.0, 1).unwrap();
//! assert_eq!(nearest.len(), 2);
//! ```

mod builder;
mod cluster;
mod distance;
mod error;
mod index;
#[allow(clippy::module_name_repetitions)]
pub mod linear;
mod node;
mod progress;
mod search;
mod seeds;
mod stats;
mod tree;
mod vicinity;

pub use builder::Params;
pub use cluster::{Cluster, Clusterer};
pub use distance::{euclidean, AbsDiff, Euclidean, Metric};
pub use error::{Error, Result};
pub use index::Index;
pub use linear::{LinearIndex, Neighbour};
pub use node::{Kind, Node};
pub use progress::{CancelToken, LogProgress, NoProgress, Progress};
pub use search::Searcher;
pub use seeds::SeedSelector;
pub use stats::{BuildStats, Moments};
pub use tree::{build, Tree};
pub use vicinity::VicinityCache;
