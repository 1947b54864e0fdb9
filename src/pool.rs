use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Something that can live in an [`ObjectPool`].
///
/// `clear` must drop every cross reference the instance holds, so that a
/// later `borrow` never observes state left over from a previous user.
pub trait Poolable: Default + 'static {
    fn clear(&mut self);
}

/// Type-keyed free lists of reusable instances.
///
/// The pool has no upper bound; callers release what they borrow.
#[derive(Default)]
pub struct ObjectPool {
    free: HashMap<TypeId, Vec<Box<dyn Any>>>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrow<T: Poolable>(&mut self) -> T {
        self.free
            .get_mut(&TypeId::of::<T>())
            .and_then(|list| list.pop())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
            .unwrap_or_default()
    }

    pub fn release<T: Poolable>(&mut self, mut value: T) {
        value.clear();
        self.free
            .entry(TypeId::of::<T>())
            .or_insert_with(Vec::new)
            .push(Box::new(value));
    }

    /// Releases a shared record if this was its last owner; otherwise the
    /// reference is simply dropped and the remaining owners keep it alive.
    pub fn release_shared<T: Poolable>(&mut self, value: Rc<T>) -> bool {
        match Rc::try_unwrap(value) {
            Ok(value) => {
                self.release(value);
                true
            }
            Err(_) => false,
        }
    }

    pub fn free_count<T: Poolable>(&self) -> usize {
        self.free.get(&TypeId::of::<T>()).map_or(0, |list| list.len())
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        name: String,
        hits: u32,
    }

    impl Poolable for Probe {
        fn clear(&mut self) {
            self.name.clear();
            self.hits = 0;
        }
    }

    #[test]
    fn test_borrow_constructs_when_empty() {
        let mut pool = ObjectPool::new();
        let probe: Probe = pool.borrow();
        assert!(probe.name.is_empty());
        assert_eq!(pool.free_count::<Probe>(), 0);
    }

    #[test]
    fn test_released_instance_is_reused_clean() {
        let mut pool = ObjectPool::new();
        let mut probe: Probe = pool.borrow();
        probe.name.push_str("stale");
        probe.hits = 7;
        pool.release(probe);
        assert_eq!(pool.free_count::<Probe>(), 1);

        let probe: Probe = pool.borrow();
        assert!(probe.name.is_empty());
        assert_eq!(probe.hits, 0);
        assert_eq!(pool.free_count::<Probe>(), 0);
    }

    #[test]
    fn test_shared_release_waits_for_last_owner() {
        let mut pool = ObjectPool::new();
        let shared = Rc::new(Probe::default());
        let other = shared.clone();
        assert!(!pool.release_shared(shared));
        assert_eq!(pool.free_count::<Probe>(), 0);
        assert!(pool.release_shared(other));
        assert_eq!(pool.free_count::<Probe>(), 1);
    }
}
