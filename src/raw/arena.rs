use core::num::NonZero;

use alloc::vec::Vec;

#[cfg(test)]
type SlotNumber = u16;
#[cfg(not(test))]
type SlotNumber = u32;

/// Position of an occupied slot, stored one-based so that `Option<Handle>`
/// (an absent child) costs nothing extra.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<SlotNumber>);

impl Handle {
    /// Number of slots a handle can address.
    pub(crate) const SLOTS: usize = SlotNumber::MAX as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    const fn new(slot: usize) -> Self {
        assert!(slot < Self::SLOTS, "`Handle::new()` - `slot` >= `Handle::SLOTS`!");
        match NonZero::new((slot + 1) as SlotNumber) {
            Some(number) => Self(number),
            None => unreachable!(),
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        self.0.get() as usize - 1
    }
}

enum Slot<T> {
    Occupied(T),
    // Vacant slots form an intrusive free list.
    Vacant(Option<Handle>),
}

/// Slot storage addressed by [`Handle`]s that stay valid until freed.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    next_free: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_free: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_free: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        self.len += 1;
        if let Some(handle) = self.next_free {
            let slot = &mut self.slots[handle.slot()];
            let Slot::Vacant(next) = *slot else {
                panic!("`Arena::alloc()` - free list points at an occupied slot!");
            };
            self.next_free = next;
            *slot = Slot::Occupied(element);
            handle
        } else {
            assert!(
                self.slots.len() < Handle::SLOTS,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::SLOTS
            );
            self.slots.push(Slot::Occupied(element));
            Handle::new(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.slot()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.slot()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = core::mem::replace(&mut self.slots[handle.slot()], Slot::Vacant(self.next_free));
        match slot {
            Slot::Occupied(element) => {
                self.next_free = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant(next) => {
                // Put the free-list link back before reporting the misuse.
                self.slots[handle.slot()] = Slot::Vacant(next);
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.next_free = None;
        self.len = 0;
    }
}
