use reminder_scheduler_domain::Entity;
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    // A panicking test must not poison the store for the remaining assertions
    collection.lock().unwrap_or_else(|e| e.into_inner())
}

/// Inserts the value or replaces the stored value with the same id
pub fn upsert<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    match collection.iter().position(|item| item.id() == val.id()) {
        Some(i) => collection[i] = val.clone(),
        None => collection.push(val.clone()),
    }
}

pub fn find<T: Clone + Entity>(val_id: &str, collection: &Mutex<Vec<T>>) -> Option<T> {
    lock(collection)
        .iter()
        .find(|item| item.id() == val_id)
        .cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    lock(collection)
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

/// Applies `update` to the first item matching `compare` and returns what
/// `update` returned, or `None` when nothing matched
pub fn update_one<T, R, F: Fn(&T) -> bool, U: FnOnce(&mut T) -> R>(
    collection: &Mutex<Vec<T>>,
    compare: F,
    update: U,
) -> Option<R> {
    let mut collection = lock(collection);
    collection.iter_mut().find(|item| compare(item)).map(update)
}

