/// Generational handle: `(index, generation)`.
///
/// Slots are reused with a bumped generation, so a stale handle never aliases
/// whatever later occupies the same index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

/// Monotonic handle source for opaque ids that are never recycled.
#[derive(Debug, Default, Clone)]
pub struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Handle {
        let h = Handle::new(self.next, 0);
        self.next = self.next.wrapping_add(1);
        h
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, HandleAllocator};

    #[test]
    fn allocator_is_monotonic() {
        let mut a = HandleAllocator::new();
        assert_eq!(a.allocate(), Handle::new(0, 0));
        assert_eq!(a.allocate(), Handle::new(1, 0));
    }

    #[test]
    fn generation_distinguishes_handles() {
        assert_ne!(Handle::new(3, 0), Handle::new(3, 1));
        assert_eq!(Handle::new(3, 1).index(), 3);
        assert_eq!(Handle::new(3, 1).generation(), 1);
    }
}
