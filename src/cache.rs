//! Per-layer hit cache
//!
//! Partitions one event's hits into per-layer buckets and sorts each bucket
//! by composite detector order (ladder, sensor, local u). Built once per
//! event in O(n log n); every later lookup is a slice of the sorted bucket,
//! with ladder sub-ranges found by binary search.
//!
//! The cache holds indices into the caller-owned hit collection, never the
//! hits themselves. After [`HitCache::build`] it is immutable and may be
//! shared across any number of concurrent per-seed searches.

use crate::measurement::Hit;

/// Entry of a layer bucket: a hit index plus the ladder it sits on.
///
/// The ladder is duplicated from the hit so that range queries work without
/// access to the hit collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedHit {
    /// Index into the hit collection the cache was built from
    pub index: usize,
    /// Ladder number of the hit's sensor
    pub ladder: usize,
}

/// Sorted per-layer partition of an event's hits.
#[derive(Debug, Clone, Default)]
pub struct HitCache {
    layers: Vec<Vec<CachedHit>>,
}

impl HitCache {
    /// Build the cache for one event.
    ///
    /// Hits on layers outside `1..=n_layers` are left out of the cache; they
    /// can never be candidates of a search bounded to `n_layers`.
    pub fn build(hits: &[Hit], n_layers: usize) -> Self {
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); n_layers];
        for (index, hit) in hits.iter().enumerate() {
            let layer = hit.id.layer;
            if (1..=n_layers).contains(&layer) {
                layers[layer - 1].push(index);
            }
        }

        let layers = layers
            .into_iter()
            .map(|mut bucket| {
                bucket.sort_by(|&a, &b| {
                    let ha = &hits[a];
                    let hb = &hits[b];
                    (ha.id.ladder, ha.id.sensor)
                        .cmp(&(hb.id.ladder, hb.id.sensor))
                        .then(ha.model.local_u().total_cmp(&hb.model.local_u()))
                });
                bucket
                    .into_iter()
                    .map(|index| CachedHit {
                        index,
                        ladder: hits[index].id.ladder,
                    })
                    .collect()
            })
            .collect();

        Self { layers }
    }

    /// Number of layers the cache was built for
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of cached hits across all layers
    pub fn len(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }

    /// Whether the cache holds no hits at all
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.is_empty())
    }

    /// All hits of a layer in composite detector order.
    ///
    /// A layer without hits (or outside the built range) yields an empty
    /// slice; callers never special-case missing layers.
    pub fn layer(&self, layer: usize) -> &[CachedHit] {
        match layer.checked_sub(1).and_then(|i| self.layers.get(i)) {
            Some(bucket) => bucket.as_slice(),
            None => &[],
        }
    }

    /// The sub-range of a layer's bucket on one ladder.
    ///
    /// O(log n) via binary search on the sorted bucket.
    pub fn layer_ladder(&self, layer: usize, ladder: usize) -> &[CachedHit] {
        let bucket = self.layer(layer);
        let start = bucket.partition_point(|entry| entry.ladder < ladder);
        let end = bucket.partition_point(|entry| entry.ladder <= ladder);
        &bucket[start..end]
    }
}
