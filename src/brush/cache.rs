//! Brush mask cache
//!
//! Masks are pure functions of the (pressure-adjusted) settings for every
//! deterministic brush family, so identical dabs within a stroke can share
//! one synthesized mask. Keys bucket the float parameters at 1/1000.
//!
//! Randomized families and textured stamps are never cached: reusing a grain
//! pattern would change the output, and textures are caller-owned.

use super::mask::BrushMask;
use super::settings::normalize_degrees;
use super::{BrushSettings, BrushType};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Bucket resolution for float parameters
const BUCKETS_PER_UNIT: f32 = 1000.0;

/// Cache key: brush family, effective size and bucketed shape parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskKey {
    pub brush_type: BrushType,
    pub size: u32,
    pub hardness: i32,
    pub angle: i32,
    pub roundness: i32,
    pub calligraphy_angle: i32,
    pub calligraphy_width: i32,
}

impl MaskKey {
    /// Key for `settings` (with `size` already pressure-adjusted), or `None`
    /// when the mask must be synthesized for every dab
    pub fn for_settings(settings: &BrushSettings) -> Option<Self> {
        if settings.brush_type.is_randomized() {
            return None;
        }
        if settings.brush_type == BrushType::Stamp && settings.stamp_texture.is_some() {
            return None;
        }

        Some(Self {
            brush_type: settings.brush_type,
            size: settings.size,
            hardness: bucket(settings.hardness),
            angle: bucket(normalize_degrees(settings.angle)),
            roundness: bucket(settings.roundness),
            calligraphy_angle: bucket(normalize_degrees(settings.calligraphy_angle)),
            calligraphy_width: bucket(settings.calligraphy_width),
        })
    }
}

#[inline]
fn bucket(value: f32) -> i32 {
    (value * BUCKETS_PER_UNIT).round() as i32
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded mask cache shared by reference (parking_lot::RwLock doesn't poison)
#[derive(Debug)]
pub struct MaskCache {
    masks: RwLock<HashMap<MaskKey, Arc<BrushMask>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MaskCache {
    /// Create an empty cache holding at most `capacity` masks
    pub fn new(capacity: usize) -> Self {
        Self {
            masks: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a mask, recording a hit or miss
    pub fn get(&self, key: &MaskKey) -> Option<Arc<BrushMask>> {
        let found = self.masks.read().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a mask; a full cache is emptied first
    pub fn insert(&self, key: MaskKey, mask: Arc<BrushMask>) {
        let mut masks = self.masks.write();
        if masks.len() >= self.capacity && !masks.contains_key(&key) {
            tracing::debug!("Mask cache full ({} entries), clearing", masks.len());
            masks.clear();
        }
        masks.insert(key, mask);
    }

    /// Cached mask for `key`, synthesizing it with `generate` on a miss
    pub fn get_or_insert_with<F>(&self, key: MaskKey, generate: F) -> Arc<BrushMask>
    where
        F: FnOnce() -> BrushMask,
    {
        if let Some(mask) = self.get(&key) {
            return mask;
        }

        let mask = Arc::new(generate());
        self.insert(key, Arc::clone(&mask));
        mask
    }

    pub fn contains(&self, key: &MaskKey) -> bool {
        self.masks.read().contains_key(key)
    }

    /// Clear all cached masks and counters
    pub fn clear(&self) {
        self.masks.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.masks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.read().is_empty()
    }

    pub fn stats(&self) -> MaskCacheStats {
        MaskCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for MaskCache {
    fn default() -> Self {
        Self::new(256)
    }
}
