use std::{collections::HashMap, hash::Hash};

use parking_lot::Mutex;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("the {cache} cache has been disposed")]
    Disposed { cache: &'static str },
    #[error("the {cache} cache could not create a resource: {detail}")]
    CreationFailed { cache: &'static str, detail: String },
}

struct State<K, H> {
    entries: HashMap<K, H>,
    disposed: bool,
}

/// A deduplicating store of native drawing handles.
///
/// Each distinct key maps to exactly one handle, created on first request and
/// shared by every later request. Callers never release individual handles;
/// the cache releases all of them at once in [`dispose`](Self::dispose), after
/// which every lookup fails.
///
/// The lock is held only for the lookup-or-insert, never while the caller
/// draws with the returned handle.
pub struct ResourceCache<K, H> {
    name: &'static str,
    state: Mutex<State<K, H>>,
}

impl<K: Eq + Hash, H: Copy> ResourceCache<K, H> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State {
                entries: HashMap::new(),
                disposed: false,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the handle for `key`, calling `create` to make it if this is
    /// the first request. `create` returns `None` if the platform refused to
    /// create the resource.
    pub fn get_or_create(
        &self,
        key: K,
        create: impl FnOnce(&K) -> Option<H>,
    ) -> Result<H, ResourceError> {
        let mut state = self.state.lock();

        if state.disposed {
            return Err(ResourceError::Disposed { cache: self.name });
        }

        if let Some(handle) = state.entries.get(&key) {
            return Ok(*handle);
        }

        let handle = create(&key).ok_or_else(|| ResourceError::CreationFailed {
            cache: self.name,
            detail: "the platform returned a null handle".to_owned(),
        })?;

        log::trace!("{} cache: created entry {}", self.name, state.entries.len());
        state.entries.insert(key, handle);
        Ok(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Passes every cached handle to `release` and marks the cache as
    /// disposed. Returns the number of handles released; a second call
    /// releases nothing.
    pub fn dispose(&self, mut release: impl FnMut(H)) -> usize {
        let mut state = self.state.lock();
        if state.disposed {
            return 0;
        }
        state.disposed = true;

        let count = state.entries.len();
        for (_, handle) in state.entries.drain() {
            release(handle);
        }

        log::debug!("{} cache: disposed {} handles", self.name, count);
        count
    }
}

impl<K, H> std::fmt::Debug for ResourceCache<K, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourceCache")
            .field("name", &self.name)
            .field("entries", &state.entries.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Color, Font};

    fn font_cache() -> (ResourceCache<Font, usize>, impl Fn(&Font) -> Option<usize>) {
        let next = std::cell::Cell::new(100);
        let create = move |_: &Font| {
            let handle = next.get();
            next.set(handle + 1);
            Some(handle)
        };
        (ResourceCache::new("font"), create)
    }

    #[test]
    fn same_key_same_handle() {
        let (cache, create) = font_cache();

        let a = cache.get_or_create(Font::new("Arial", 16), &create).unwrap();
        let b = cache.get_or_create(Font::new("Arial", 16), &create).unwrap();
        let c = cache.get_or_create(Font::new("Arial", 12), &create).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn lookup_after_dispose_fails() {
        let (cache, create) = font_cache();
        cache.get_or_create(Font::new("Arial", 16), &create).unwrap();

        let mut released = Vec::new();
        assert_eq!(cache.dispose(|h| released.push(h)), 1);
        assert_eq!(released, vec![100]);
        assert!(cache.is_disposed());

        assert_eq!(
            cache.get_or_create(Font::new("Arial", 16), &create),
            Err(ResourceError::Disposed { cache: "font" })
        );

        // Disposing twice is a no-op.
        assert_eq!(cache.dispose(|_| panic!("released twice")), 0);
    }

    #[test]
    fn failed_creation_is_not_cached() {
        let cache = ResourceCache::<Color, u32>::new("brush");

        let err = cache.get_or_create(Color::RED, |_| None).unwrap_err();
        assert!(matches!(err, ResourceError::CreationFailed { cache: "brush", .. }));
        assert!(cache.is_empty());

        assert_eq!(cache.get_or_create(Color::RED, |_| Some(7)), Ok(7));
    }

    #[test]
    fn shared_between_threads() {
        let cache = Arc::new(ResourceCache::<Color, u32>::new("brush"));

        let threads: Vec<_> = (0..4)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    cache
                        .get_or_create(Color::BLUE, |_| Some(i))
                        .unwrap()
                })
            })
            .collect();

        let handles: Vec<u32> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        assert!(handles.iter().all(|h| *h == handles[0]));
        assert_eq!(cache.len(), 1);
    }
}
