//! Bounded, TTL'd store for forecast results.
//!
//! Keyed by model, symbol, horizon, confidence, and a cheap data
//! fingerprint. The fingerprint is the bar count plus the last five closes
//! at two decimals, so two series sharing that tail collide and serve each
//! other's entries; that is an accepted trade-off for never hashing the
//! full series. No global instance exists: the orchestration layer
//! constructs one cache and passes a handle into the pipeline.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{ForecastModel, ForecastResult, OhlcvBar};

/// Entries held before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 4;

const DEFAULT_TTL_MINUTES: i64 = 5;

/// How many trailing closes go into the fingerprint.
const FINGERPRINT_CLOSES: usize = 5;

/// Time source for TTL checks; swap in a manual clock for deterministic
/// expiry tests.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cheap content signature for a bar series: count plus trailing closes.
pub fn fingerprint(bars: &[OhlcvBar]) -> String {
    if bars.is_empty() {
        return "empty".to_string();
    }
    let start = bars.len().saturating_sub(FINGERPRINT_CLOSES);
    let closes: Vec<String> = bars[start..]
        .iter()
        .map(|b| format!("{:.2}", b.close))
        .collect();
    format!("{}:{}", bars.len(), closes.join(","))
}

/// Fully typed cache key.
///
/// The confidence level is stored in basis points so the key stays
/// `Eq + Hash` without comparing floats.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub model: ForecastModel,
    pub symbol: String,
    pub forecast_period: usize,
    pub confidence_bps: u32,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(
        model: ForecastModel,
        symbol: &str,
        forecast_period: usize,
        confidence_level: f64,
        bars: &[OhlcvBar],
    ) -> Self {
        CacheKey {
            model,
            symbol: symbol.to_string(),
            forecast_period,
            confidence_bps: (confidence_level * 10_000.0).round() as u32,
            fingerprint: fingerprint(bars),
        }
    }
}

struct CacheEntry {
    result: ForecastResult,
    inserted_at: DateTime<Utc>,
}

/// Bounded forecast store with per-entry TTL.
///
/// Lookups and insertions scan a small vec; at the default capacity of 4
/// that beats hashing the key. Re-inserting an existing key overwrites the
/// stored result and refreshes its timestamp.
pub struct ForecastCache {
    entries: Vec<(CacheKey, CacheEntry)>,
    capacity: usize,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl ForecastCache {
    /// Capacity 4, TTL 5 minutes, wall clock.
    pub fn new() -> Self {
        Self::with_settings(
            DEFAULT_CAPACITY,
            Duration::minutes(DEFAULT_TTL_MINUTES),
            SystemClock,
        )
    }

    pub fn with_settings(capacity: usize, ttl: Duration, clock: impl Clock + 'static) -> Self {
        ForecastCache {
            entries: Vec::new(),
            capacity,
            ttl,
            clock: Box::new(clock),
        }
    }

    /// Look up a forecast; an entry past its TTL is removed and misses.
    pub fn get(&mut self, key: &CacheKey) -> Option<ForecastResult> {
        let position = match self.entries.iter().position(|(k, _)| k == key) {
            Some(position) => position,
            None => {
                debug!(model = %key.model, symbol = key.symbol.as_str(), "forecast cache miss");
                return None;
            }
        };

        let age = self.clock.now() - self.entries[position].1.inserted_at;
        if age > self.ttl {
            self.entries.remove(position);
            debug!(model = %key.model, symbol = key.symbol.as_str(), "forecast cache entry expired");
            return None;
        }

        debug!(model = %key.model, symbol = key.symbol.as_str(), "forecast cache hit");
        Some(self.entries[position].1.result.clone())
    }

    /// Store a forecast, evicting the oldest entry when at capacity.
    pub fn insert(&mut self, key: CacheKey, result: ForecastResult) {
        if self.capacity == 0 {
            return;
        }
        let now = self.clock.now();

        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = CacheEntry {
                result,
                inserted_at: now,
            };
            return;
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, entry))| entry.inserted_at)
                .map(|(i, _)| i);
            if let Some(index) = oldest {
                let (evicted, _) = self.entries.remove(index);
                debug!(
                    model = %evicted.model,
                    symbol = evicted.symbol.as_str(),
                    "evicted oldest forecast cache entry"
                );
            }
        }

        self.entries.push((
            key,
            CacheEntry {
                result,
                inserted_at: now,
            },
        ));
    }

    /// Drop every entry for `symbol`, exact match on the typed key field.
    pub fn evict_symbol(&mut self, symbol: &str) {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k.symbol != symbol);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(symbol, dropped, "evicted symbol from forecast cache");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}
