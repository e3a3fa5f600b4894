//! Gap-based clustering of positioned items (C10, spec.md §4.10). Used to
//! collapse adjacent undercovered regions and adjacent variable loci into
//! single report rows.

/// Anything that can report its own genomic position for clustering
/// purposes.
pub trait Positioned {
    fn position(&self) -> usize;
}

/// A run of items whose positions are each within `gap` of the previous
/// item fed into the same cluster.
pub struct Cluster<T> {
    pub members: Vec<T>,
}

impl<T: Positioned> Cluster<T> {
    /// Midpoint between the first and last member's positions.
    pub fn midpoint(&self) -> usize {
        let first = self.members.first().map(|m| m.position()).unwrap_or(0);
        let last = self.members.last().map(|m| m.position()).unwrap_or(0);
        (first + last) / 2
    }
}

/// Groups a stream of positioned items such that consecutive items within
/// `gap` positions join the same cluster.
pub struct Clusterer<T> {
    gap: usize,
    pub clusters: Vec<Cluster<T>>,
}

impl<T: Positioned> Clusterer<T> {
    pub fn new(gap: usize) -> Self {
        Clusterer {
            gap,
            clusters: Vec::new(),
        }
    }

    /// Feeds one item. Items must be fed in non-decreasing position order.
    pub fn feed(&mut self, item: T) {
        let starts_new = match self.clusters.last() {
            None => true,
            Some(cluster) => {
                let last_pos = cluster.members.last().unwrap().position();
                item.position().saturating_sub(last_pos) > self.gap
            }
        };

        if starts_new {
            self.clusters.push(Cluster {
                members: vec![item],
            });
        } else {
            self.clusters.last_mut().unwrap().members.push(item);
        }
    }
}
