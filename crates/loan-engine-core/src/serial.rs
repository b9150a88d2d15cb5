//! Per-image serial numbers.
//!
//! Every record carries a serial number unique within its image number.
//! Handing out "current max + 1" is a read-modify-write, so the counters sit
//! behind one lock and the increment happens while it is held.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Source of the next serial number for an image group. A database-backed
/// implementation must perform the increment atomically (a single
/// `UPDATE ... RETURNING` or a serializable transaction).
pub trait SerialSource {
    fn next_serial(&self, image_number: &str) -> u64;
}

/// In-process counters keyed by image number.
#[derive(Debug, Default)]
pub struct SerialRegistry {
    counters: Mutex<HashMap<String, u64>>,
}

impl SerialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing `(image number, highest serial)` pairs.
    pub fn seeded<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut counters = HashMap::new();
        for (image, max) in existing {
            let entry = counters.entry(key(image.as_ref())).or_insert(0);
            *entry = (*entry).max(max);
        }
        SerialRegistry {
            counters: Mutex::new(counters),
        }
    }

    /// Highest serial handed out so far for an image group (0 if none).
    pub fn current(&self, image_number: &str) -> u64 {
        self.lock().get(&key(image_number)).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        // Counters stay consistent even if a holder panicked: the only
        // mutation is a single increment.
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SerialSource for SerialRegistry {
    fn next_serial(&self, image_number: &str) -> u64 {
        let mut counters = self.lock();
        let counter = counters.entry(key(image_number)).or_insert(0);
        *counter += 1;
        *counter
    }
}

fn key(image_number: &str) -> String {
    image_number.trim().to_string()
}
