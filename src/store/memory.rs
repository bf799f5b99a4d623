use super::PersonStore;
use crate::error::AppError;
use crate::model::Person;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug)]
struct Inner {
    rows: BTreeMap<i64, Person>,
    /// `None` once an id at `i64::MAX` has been handed out or stored.
    next_id: Option<i64>,
}

/// Process-local store. Ids start at 1; the whole map sits behind one lock so every
/// call sees a consistent snapshot.
#[derive(Debug)]
pub struct MemoryPersonStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryPersonStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPersonStore {
    pub fn new() -> Self {
        MemoryPersonStore {
            inner: Mutex::new(Inner {
                rows: BTreeMap::new(),
                next_id: Some(1),
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.inner.lock().map_err(poisoned)?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Store("memory store lock poisoned".into())
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Person>, AppError> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn save(&self, person: Person) -> Result<Person, AppError> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        let id = match person.id {
            Some(id) => {
                // Keep generated ids clear of explicitly chosen ones.
                if inner.next_id.is_some_and(|next| id >= next) {
                    inner.next_id = id.checked_add(1);
                }
                id
            }
            None => {
                let id = inner
                    .next_id
                    .ok_or_else(|| AppError::Store("id space exhausted".into()))?;
                inner.next_id = id.checked_add(1);
                id
            }
        };
        let saved = Person { id: Some(id), ..person };
        tracing::debug!(id, "memory store save");
        inner.rows.insert(id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_sequential_ids_from_one() {
        let store = MemoryPersonStore::new();
        let a = store.save(Person::new("Alice", "alice@example.com")).await.unwrap();
        let b = store.save(Person::new("Bob", "bob@example.com")).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn explicit_id_overwrites_in_place() {
        let store = MemoryPersonStore::new();
        let a = store.save(Person::new("Alice", "alice@example.com")).await.unwrap();
        let renamed = Person::new("Alicia", "alicia@example.com").with_id(a.id.unwrap());
        store.save(renamed.clone()).await.unwrap();
        assert_eq!(store.find_by_id(1).await.unwrap(), Some(renamed));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn explicit_id_moves_counter_past_it() {
        let store = MemoryPersonStore::new();
        store.save(Person::new("Zed", "z@x").with_id(10)).await.unwrap();
        let next = store.save(Person::new("Amy", "a@x")).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn missing_id_is_none() {
        let store = MemoryPersonStore::new();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.find_by_id(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn returned_record_is_a_snapshot() {
        let store = MemoryPersonStore::new();
        let mut copy = store.save(Person::new("Alice", "alice@example.com")).await.unwrap();
        copy.name = Some("Mallory".into());
        let stored = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn max_explicit_id_is_stored_and_only_generation_fails() {
        let store = MemoryPersonStore::new();
        let top = store.save(Person::new("Top", "t@x").with_id(i64::MAX)).await.unwrap();
        assert_eq!(top.id, Some(i64::MAX));
        assert_eq!(store.find_by_id(i64::MAX).await.unwrap(), Some(top.clone()));

        // Overwriting at the top id and upserting lower ids keep working.
        let renamed = Person::new("Top2", "t2@x").with_id(i64::MAX);
        assert_eq!(store.save(renamed.clone()).await.unwrap(), renamed);
        store.save(Person::new("Low", "l@x").with_id(5)).await.unwrap();

        let err = store.save(Person::new("Next", "n@x")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn poisoned_lock_is_a_store_error() {
        let store = std::sync::Arc::new(MemoryPersonStore::new());
        let clone = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.inner.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(matches!(store.len(), Err(AppError::Store(_))));
        assert!(matches!(store.find_by_id(1).await, Err(AppError::Store(_))));
    }
}
