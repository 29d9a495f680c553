// Human-readable byte formatting, with an explicit bounded memo owned by the caller.

use std::num::NonZeroUsize;

use lru::LruCache;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// `1536.0` -> `"1.50 KB"`. Base 1024; non-finite input formats as `"-"`.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() {
        return "-".to_string();
    }
    let sign = if bytes < 0.0 { "-" } else { "" };
    let mut value = bytes.abs();
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{} {}", sign, value.round(), UNITS[0])
    } else {
        format!("{}{:.2} {}", sign, value, UNITS[unit])
    }
}

/// Bounded LRU memo for [`format_bytes`]. Keyed on the exact bit pattern of the input.
pub struct FormatCache {
    entries: LruCache<u64, String>,
}

impl FormatCache {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn format_bytes(&mut self, bytes: f64) -> String {
        self.entries
            .get_or_insert(bytes.to_bits(), || format_bytes(bytes))
            .clone()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
