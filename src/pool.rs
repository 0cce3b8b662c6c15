//! Object Pool - batch-growing slab allocator with index handles.
//!
//! Slots are reserved in batches and recycled through a LIFO free list,
//! so steady-state order flow never touches the global allocator.
//! Handles are 32-bit indices instead of pointers, which keeps the
//! intrusive links inside pooled nodes small and always valid.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::PoolError;

/// Sentinel value representing a null/invalid index (like nullptr)
pub const NULL_INDEX: u32 = u32::MAX;

/// Handle to a pooled slot - our "compressed pointer".
pub type PoolIndex = u32;

/// Number of slots reserved each time the free list runs dry.
pub const BATCH_SIZE: usize = 128;

/// Largest slot size (exclusive) a pool will manage.
pub const SLOT_CEILING: usize = 4096;

/// Round `v` up to the next multiple of `multiple`.
#[inline]
const fn round_to_mult(v: usize, multiple: usize) -> usize {
    v.div_ceil(multiple) * multiple
}

/// Compile-time slot size check, evaluated once per pooled type.
struct SlotLayout<T>(PhantomData<T>);

impl<T> SlotLayout<T> {
    const ALIGN: usize = if std::mem::align_of::<T>() > std::mem::size_of::<i32>() {
        std::mem::align_of::<T>()
    } else {
        std::mem::size_of::<i32>()
    };

    const SIZE: usize = round_to_mult(std::mem::size_of::<T>(), Self::ALIGN);

    const FITS: () = assert!(Self::SIZE < SLOT_CEILING, "Object too large for ObjectPool");
}

/// Pre-allocated pool of `T` slots with O(1) acquire and release.
pub struct ObjectPool<T> {
    /// Backing storage; `None` marks a free slot
    slots: Vec<Option<T>>,

    /// Free slot indices, reused last-in first-out
    free: Vec<PoolIndex>,
}

impl<T> ObjectPool<T> {
    /// Padded storage size of one slot.
    pub const SLOT_SIZE: usize = SlotLayout::<T>::SIZE;

    /// Create an empty pool. No storage is reserved until first use.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = SlotLayout::<T>::FITS;

        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Create a pool with at least `n` free slots ready.
    pub fn with_reserve(n: usize) -> Result<Self, PoolError> {
        let mut pool = Self::new();
        pool.reserve(n)?;
        Ok(pool)
    }

    /// Reserve `count` more empty slots and push them onto the free list.
    fn grow(&mut self, count: usize) -> Result<(), PoolError> {
        let start = self.slots.len();
        let end = start + count;
        if end > NULL_INDEX as usize {
            return Err(PoolError::AllocationFailed { requested: count });
        }

        self.slots
            .try_reserve_exact(count)
            .map_err(|_| PoolError::AllocationFailed { requested: count })?;
        self.free
            .try_reserve(count)
            .map_err(|_| PoolError::AllocationFailed { requested: count })?;

        self.slots.resize_with(end, || None);
        // Lowest index ends up on top so fresh batches hand out slots in order
        self.free.extend((start..end).rev().map(|i| i as PoolIndex));

        debug!(count, total = end, slot_size = Self::SLOT_SIZE, "object pool grew");
        Ok(())
    }

    /// Ensure at least `n` free slots exist without constructing objects.
    ///
    /// Growth is rounded up to a multiple of [`BATCH_SIZE`].
    pub fn reserve(&mut self, n: usize) -> Result<(), PoolError> {
        let available = self.free.len();
        if n <= available {
            return Ok(());
        }
        self.grow(round_to_mult(n - available, BATCH_SIZE))
    }

    /// Move `value` into a free slot and return its handle.
    ///
    /// # Complexity
    /// O(1) amortized - a batch is reserved only when the free list is empty
    #[inline]
    pub fn acquire(&mut self, value: T) -> Result<PoolIndex, PoolError> {
        if self.free.is_empty() {
            self.grow(BATCH_SIZE)?;
        }

        let Some(index) = self.free.pop() else {
            return Err(PoolError::AllocationFailed { requested: BATCH_SIZE });
        };
        self.slots[index as usize] = Some(value);
        Ok(index)
    }

    /// Take the object out of its slot and return the slot to the free list.
    ///
    /// # Panics
    /// Panics if `index` is not currently acquired.
    #[inline]
    pub fn release(&mut self, index: PoolIndex) -> T {
        match self.slots[index as usize].take() {
            Some(value) => {
                self.free.push(index);
                value
            }
            None => panic!("release of free pool slot {index}"),
        }
    }

    /// Get an immutable reference to an acquired object.
    ///
    /// # Panics
    /// Panics if the slot is free.
    #[inline]
    pub fn get(&self, index: PoolIndex) -> &T {
        match &self.slots[index as usize] {
            Some(value) => value,
            None => panic!("access to free pool slot {index}"),
        }
    }

    /// Get a mutable reference to an acquired object.
    ///
    /// # Panics
    /// Panics if the slot is free.
    #[inline]
    pub fn get_mut(&mut self, index: PoolIndex) -> &mut T {
        match &mut self.slots[index as usize] {
            Some(value) => value,
            None => panic!("access to free pool slot {index}"),
        }
    }

    /// Returns true if `index` refers to an acquired slot.
    #[inline]
    pub fn is_acquired(&self, index: PoolIndex) -> bool {
        matches!(self.slots.get(index as usize), Some(Some(_)))
    }

    /// Number of slots ever reserved.
    #[inline]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots ready to be acquired without growing.
    #[inline]
    pub fn free_size(&self) -> usize {
        self.free.len()
    }

    /// Number of slots currently holding an object.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("slot_size", &Self::SLOT_SIZE)
            .field("size", &self.size())
            .field("free", &self.free_size())
            .finish()
    }
}
