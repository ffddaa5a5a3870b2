//! Local flag cache with snapshot-swap updates.
//!
//! Readers take a read lock only long enough to clone the current `Arc`,
//! so high-frequency evaluation is never serialized behind update
//! application, and a reader always sees either the pre- or post-update
//! map — never a torn state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use compact_str::CompactString;

use crate::objects::flag::FlagSnapshot;
use crate::objects::stream::StreamFrame;

type FlagMap = HashMap<CompactString, FlagSnapshot>;

/// Shared, copy-on-write flag cache keyed by flag title.
#[derive(Debug, Default)]
pub struct FlagCache {
    inner: RwLock<Arc<FlagMap>>,
}

impl FlagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current immutable snapshot of all cached flags.
    pub fn snapshot(&self) -> Arc<FlagMap> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            // A writer can only poison the lock by panicking mid-swap; the
            // stored Arc is still a coherent pre- or post-update map.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the whole cache with a freshly fetched flag set.
    pub fn replace_all(&self, flags: Vec<FlagSnapshot>) {
        let map: FlagMap = flags
            .into_iter()
            .map(|flag| (flag.title.clone(), flag))
            .collect();
        self.swap(Arc::new(map));
    }

    /// Apply one change event to the cache.
    ///
    /// CREATE and UPDATE replace the cached definition, DELETE removes it,
    /// SWITCH toggles the active bit. Connection acknowledgements are
    /// ignored.
    pub fn apply(&self, frame: &StreamFrame) {
        match frame {
            StreamFrame::Connected { .. } => {}
            StreamFrame::Create { payload, .. } | StreamFrame::Update { payload, .. } => {
                let mut map = (*self.snapshot()).clone();
                map.insert(payload.title.clone(), payload.clone());
                self.swap(Arc::new(map));
            }
            StreamFrame::Switch { payload, .. } => {
                let mut map = (*self.snapshot()).clone();
                if let Some(flag) = map.get_mut(&payload.title) {
                    flag.active = payload.active;
                }
                self.swap(Arc::new(map));
            }
            StreamFrame::Delete { payload, .. } => {
                let mut map = (*self.snapshot()).clone();
                map.remove(&payload.title);
                self.swap(Arc::new(map));
            }
        }
    }

    fn swap(&self, map: Arc<FlagMap>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = map,
            Err(poisoned) => *poisoned.into_inner() = map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_client_key;
    use crate::objects::flag::{FlagType, Variation};
    use crate::objects::stream::{DeletePayload, SwitchPayload};
    use uuid::Uuid;

    fn snapshot(title: &str, active: bool) -> FlagSnapshot {
        FlagSnapshot {
            flag_id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            flag_type: FlagType::Boolean,
            default_value: "TRUE".to_owned(),
            default_portion: 100,
            default_description: String::new(),
            variations: vec![Variation::new("FALSE", 0)],
            keywords: vec![],
            active,
        }
    }

    #[test]
    fn create_and_update_replace_the_definition() {
        let cache = FlagCache::new();
        let key = derive_client_key("k");

        cache.apply(&StreamFrame::Create {
            client_key: key.clone(),
            payload: snapshot("beta", true),
        });
        assert!(cache.snapshot().get("beta").unwrap().active);

        let mut updated = snapshot("beta", true);
        updated.default_value = "FALSE".to_owned();
        cache.apply(&StreamFrame::Update {
            client_key: key,
            payload: updated,
        });
        assert_eq!(cache.snapshot().get("beta").unwrap().default_value, "FALSE");
    }

    #[test]
    fn switch_toggles_only_the_active_bit() {
        let cache = FlagCache::new();
        cache.replace_all(vec![snapshot("beta", true)]);

        cache.apply(&StreamFrame::Switch {
            client_key: derive_client_key("k"),
            payload: SwitchPayload {
                title: "beta".into(),
                active: false,
            },
        });

        let map = cache.snapshot();
        let flag = map.get("beta").unwrap();
        assert!(!flag.active);
        assert_eq!(flag.default_value, "TRUE");
    }

    #[test]
    fn delete_removes_the_flag() {
        let cache = FlagCache::new();
        cache.replace_all(vec![snapshot("beta", true), snapshot("gamma", true)]);

        cache.apply(&StreamFrame::Delete {
            client_key: derive_client_key("k"),
            payload: DeletePayload {
                title: "beta".into(),
            },
        });

        let map = cache.snapshot();
        assert!(!map.contains_key("beta"));
        assert!(map.contains_key("gamma"));
    }

    #[test]
    fn old_snapshots_survive_a_swap() {
        let cache = FlagCache::new();
        cache.replace_all(vec![snapshot("beta", true)]);

        let before = cache.snapshot();
        cache.replace_all(vec![]);

        assert!(before.contains_key("beta"));
        assert!(cache.snapshot().is_empty());
    }
}
