use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for element ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Process-wide counter behind generated ids.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque, immutable element identifier. Doubles as the markup `id`
/// attribute, so generated ids are always valid CSS identifiers.
///
/// Interned: 4 bytes, `Copy`, O(1) equality and hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern an existing id string (e.g. one read back from storage).
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh id with a kind prefix (e.g. `block_3`, `image_7`).
    ///
    /// The counter never repeats within a process, but ids restored from
    /// storage may already occupy a candidate; `taken` lets the caller skip
    /// those.
    pub fn fresh(prefix: &str, taken: impl Fn(ElementId) -> bool) -> Self {
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let id = Self::intern(&format!("{prefix}_{n}"));
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}
