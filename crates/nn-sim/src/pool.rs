//! Reusable object pool.

use std::collections::VecDeque;

/// Keeps inactive objects around for reuse and caps how many are out at once.
pub struct Pool<T> {
    idle: VecDeque<T>,
    live: usize,
    max_live: usize,
    make: Box<dyn FnMut() -> T>,
}

impl<T> Pool<T> {
    /// Preallocate `initial` idle objects.
    pub fn new(initial: usize, max_live: usize, mut make: impl FnMut() -> T + 'static) -> Self {
        let idle = (0..initial).map(|_| make()).collect();
        Self {
            idle,
            live: 0,
            max_live,
            make: Box::new(make),
        }
    }

    /// Reuse an idle object or make a new one. `None` once `max_live` are out.
    pub fn take(&mut self) -> Option<T> {
        if self.live >= self.max_live {
            return None;
        }

        let object = self.idle.pop_front().unwrap_or_else(|| (self.make)());
        self.live += 1;
        Some(object)
    }

    /// Hand an object back for reuse.
    pub fn give(&mut self, object: T) {
        self.live = self.live.saturating_sub(1);
        self.idle.push_back(object);
    }

    /// Objects currently handed out.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Objects waiting for reuse.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_preallocates_and_reuses() {
        let made = Rc::new(Cell::new(0));
        let counter = Rc::clone(&made);
        let mut pool = Pool::new(2, 10, move || {
            counter.set(counter.get() + 1);
            counter.get()
        });

        assert_eq!(made.get(), 2);
        assert_eq!(pool.idle(), 2);

        let a = pool.take().unwrap();
        let b = pool.take().unwrap();
        let c = pool.take().unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(made.get(), 3);

        pool.give(b);
        assert_eq!(pool.take(), Some(2));
        assert_eq!(made.get(), 3);
    }

    #[test]
    fn test_caps_live_objects() {
        let mut pool = Pool::new(0, 2, || ());

        assert!(pool.take().is_some());
        assert!(pool.take().is_some());
        assert!(pool.take().is_none());
        assert_eq!(pool.live(), 2);

        pool.give(());
        assert!(pool.take().is_some());
    }
}
