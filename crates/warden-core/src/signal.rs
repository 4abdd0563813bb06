use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A copyable value written by one party and read by any number of others.
///
/// Agents publish per-frame facts (target visible, last seen time, arrived at
/// post) through signals so that transition guards can stay zero-argument
/// closures. Clones share the same slot.
pub struct Signal<T: Copy> {
    slot: Rc<Cell<T>>,
}

impl<T: Copy> Signal<T> {
    /// Creates a new signal holding `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The initial value.
    ///
    /// # Returns
    ///
    /// A new [`Signal`] instance.
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(Cell::new(value)),
        }
    }

    /// Reads the current value.
    pub fn get(&self) -> T {
        self.slot.get()
    }

    /// Overwrites the current value.
    pub fn set(&self, value: T) {
        self.slot.set(value);
    }
}

impl<T: Copy + Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&self.get()).finish()
    }
}
