use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// ContentKey – identity of an immutable input
// ---------------------------------------------------------------------------

/// SHA-256 digest identifying a source file or a derived table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentKey(hasher.finalize().into())
    }

    /// Fingerprint of a table's schema and cells.
    ///
    /// Every field is tagged and length-prefixed so that different tables
    /// cannot serialize to the same byte stream.
    pub fn of_table(table: &Table) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((table.column_names().len() as u64).to_le_bytes());
        for name in table.column_names() {
            hash_str(&mut hasher, name);
        }
        hasher.update((table.len() as u64).to_le_bytes());
        for row in table.rows() {
            for cell in row {
                match cell {
                    CellValue::Text(s) => {
                        hasher.update([b'T']);
                        hash_str(&mut hasher, s);
                    }
                    CellValue::Integer(i) => {
                        hasher.update([b'I']);
                        hasher.update(i.to_le_bytes());
                    }
                    CellValue::Float(f) => {
                        hasher.update([b'F']);
                        hasher.update(f.to_bits().to_le_bytes());
                    }
                    CellValue::Bool(b) => hasher.update([b'B', *b as u8]),
                    CellValue::Null => hasher.update([b'N']),
                }
            }
        }
        ContentKey(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for log lines.
        write!(f, "{}", &self.to_hex()[..12])
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

// ---------------------------------------------------------------------------
// MemoCache – compute once per key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// In-process memo cache keyed by content identity.
///
/// Inputs are immutable once supplied, so entries never expire. Owned by
/// whoever needs it (loader, exporter) and passed in explicitly.
#[derive(Debug)]
pub struct MemoCache<V> {
    entries: HashMap<ContentKey, Arc<V>>,
    stats: CacheStats,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<V> MemoCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value for `key`, or compute and store it.
    /// Failed computations are not cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: ContentKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(v) = self.entries.get(&key) {
            self.stats.hits += 1;
            log::debug!("cache hit {key}");
            return Ok(Arc::clone(v));
        }
        self.stats.misses += 1;
        let value = Arc::new(compute()?);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn contains(&self, key: &ContentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
