use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::allocator::AtomicClassEntry;
use crate::errors::{CompileError, CompileResult};

/// The run-wide set of atomic classes, in registration order.
///
/// Registration is an idempotent upsert keyed by class name. It is shared
/// between threads compiling different call sites.
#[derive(Debug, Default)]
pub struct ClassRegistry {
  entries: Mutex<IndexMap<String, AtomicClassEntry>>,
}

impl ClassRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `true` when the entry was not registered before.
  pub fn register(&self, entry: &AtomicClassEntry) -> CompileResult<bool> {
    Ok(self.register_all(std::slice::from_ref(entry))? == 1)
  }

  /// Register every entry of one call site, or none of them.
  ///
  /// Returns how many entries were new. A name already claimed by a
  /// different rule fails the whole batch.
  pub fn register_all(&self, entries: &[AtomicClassEntry]) -> CompileResult<usize> {
    let mut registered = self.entries.lock();
    let mut pending: IndexMap<&str, &AtomicClassEntry> = IndexMap::new();

    for entry in entries {
      let existing = registered
        .get(&entry.class_name)
        .or_else(|| pending.get(entry.class_name.as_str()).copied());

      match existing {
        Some(existing) if existing.same_rule(entry) => {}
        Some(existing) => {
          tracing::error!(
            class_name = %entry.class_name,
            existing = %existing.describe(),
            incoming = %entry.describe(),
            "class name collision"
          );
          return Err(CompileError::ClassNameCollision {
            class_name: entry.class_name.clone(),
            existing: existing.describe(),
            incoming: entry.describe(),
          });
        }
        None => {
          pending.insert(entry.class_name.as_str(), entry);
        }
      }
    }

    let added = pending.len();
    for (class_name, entry) in pending {
      tracing::debug!(class_name, css = %entry.css_text, "registered atomic class");
      registered.insert(class_name.to_string(), entry.clone());
    }

    Ok(added)
  }

  pub fn contains(&self, class_name: &str) -> bool {
    self.entries.lock().contains_key(class_name)
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Consume the registry, yielding entries in registration order.
  pub fn into_entries(self) -> Vec<AtomicClassEntry> {
    self.entries.into_inner().into_values().collect()
  }
}
