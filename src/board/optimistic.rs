//! Optimistic Mutations
//!
//! Snapshot, apply, run the remote effect, restore the snapshot on failure.
//! Works over any [`StateCell`]: a Leptos signal in the UI, a `RefCell` in tests.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;

/// Shared, replaceable state
///
/// Method names avoid clashing with the Leptos signal traits.
pub trait StateCell<T> {
    fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    fn replace(&self, value: T);

    fn modify(&self, f: impl FnOnce(&mut T));

    fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.with_state(T::clone)
    }
}

impl<T: Clone> StateCell<T> for Rc<RefCell<T>> {
    fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.borrow())
    }

    fn replace(&self, value: T) {
        *self.borrow_mut() = value;
    }

    fn modify(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.borrow_mut());
    }
}

impl<T: Send + Sync + 'static> StateCell<T> for RwSignal<T> {
    fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.with_untracked(f)
    }

    fn replace(&self, value: T) {
        self.set(value);
    }

    fn modify(&self, f: impl FnOnce(&mut T)) {
        self.update(f);
    }
}

/// One field of a larger state cell
pub struct Focus<'a, C, S, T> {
    cell: &'a C,
    read: fn(&S) -> &T,
    write: fn(&mut S) -> &mut T,
}

impl<'a, C, S, T> Focus<'a, C, S, T> {
    pub fn new(cell: &'a C, read: fn(&S) -> &T, write: fn(&mut S) -> &mut T) -> Self {
        Self { cell, read, write }
    }
}

impl<C: StateCell<S>, S, T> StateCell<T> for Focus<'_, C, S, T> {
    fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with_state(|state| f((self.read)(state)))
    }

    fn replace(&self, value: T) {
        self.cell.modify(|state| *(self.write)(state) = value);
    }

    fn modify(&self, f: impl FnOnce(&mut T)) {
        self.cell.modify(|state| f((self.write)(state)));
    }
}

/// State as it was before an optimistic mutation
#[derive(Debug)]
#[must_use = "an optimistic mutation must be settled, committed or rolled back"]
pub struct Optimistic<T> {
    snapshot: T,
}

impl<T: Clone> Optimistic<T> {
    /// Apply `mutate` to a copy and publish it when it returns `Some`
    ///
    /// Nothing is published when `mutate` returns `None`.
    pub fn begin<C, R>(cell: &C, mutate: impl FnOnce(&mut T) -> Option<R>) -> Option<(Self, R)>
    where
        C: StateCell<T>,
    {
        let snapshot = cell.snapshot();
        let mut next = snapshot.clone();
        let output = mutate(&mut next)?;
        cell.replace(next);
        Some((Self { snapshot }, output))
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Keep the optimistic state
    pub fn commit(self) {}

    /// Put the snapshot back, discarding everything published since
    pub fn rollback<C: StateCell<T>>(self, cell: &C) {
        cell.replace(self.snapshot);
    }

    /// Await the remote effect; roll back when it fails
    pub async fn settle<C, V, E>(self, cell: &C, effect: impl Future<Output = Result<V, E>>) -> Result<V, E>
    where
        C: StateCell<T>,
    {
        match effect.await {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(err) => {
                self.rollback(cell);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        value: i32,
        note: String,
    }

    #[test]
    fn test_begin_publishes_only_on_some() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        assert!(Optimistic::begin(&cell, |c: &mut Counter| {
            c.value = 9;
            None::<()>
        })
        .is_none());
        assert_eq!(cell.borrow().value, 0);

        let (txn, out) = Optimistic::begin(&cell, |c: &mut Counter| {
            c.value += 1;
            Some(c.value)
        })
        .unwrap();
        assert_eq!(out, 1);
        assert_eq!(cell.borrow().value, 1);
        assert_eq!(txn.snapshot().value, 0);
        txn.commit();
    }

    #[tokio::test]
    async fn test_settle_rolls_back_on_error() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        let (txn, _) = Optimistic::begin(&cell, |c: &mut Counter| {
            c.value = 5;
            Some(())
        })
        .unwrap();
        let result: Result<(), &str> = txn.settle(&cell, async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(*cell.borrow(), Counter::default());
    }

    #[tokio::test]
    async fn test_settle_keeps_state_on_success() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        let (txn, _) = Optimistic::begin(&cell, |c: &mut Counter| {
            c.value = 5;
            Some(())
        })
        .unwrap();
        let result: Result<u8, ()> = txn.settle(&cell, async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(cell.borrow().value, 5);
    }

    fn value(c: &Counter) -> &i32 {
        &c.value
    }

    fn value_mut(c: &mut Counter) -> &mut i32 {
        &mut c.value
    }

    #[test]
    fn test_focus_rolls_back_one_field() {
        let cell = Rc::new(RefCell::new(Counter::default()));
        let focus = Focus::new(&cell, value, value_mut);

        let (txn, _) = Optimistic::begin(&focus, |v: &mut i32| {
            *v = 3;
            Some(())
        })
        .unwrap();
        cell.borrow_mut().note = "kept".to_string();
        txn.rollback(&focus);

        assert_eq!(cell.borrow().value, 0);
        assert_eq!(cell.borrow().note, "kept");
    }
}
