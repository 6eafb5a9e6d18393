//! Fixed-capacity particle pool.
//!
//! The pool allocates every slot once in [`ParticlePool::init`] and never
//! allocates again. Particles are spawned into inactive slots and expire in
//! place, so the per-frame cost and the memory footprint are bounded by the
//! capacity chosen at startup.
//!
//! # Slot search
//!
//! Small pools find a free slot with a linear scan from the front. Pools of
//! [`FREE_LIST_THRESHOLD`] slots or more keep an explicit stack of free
//! indices instead, which makes `spawn` O(1).
//!
//! # Exhaustion
//!
//! Spawning into a full pool is a silent no-op: [`ParticlePool::spawn`]
//! returns `false` and nothing else happens.
//!
//! ```ignore
//! let mut pool = ParticlePool::with_capacity(4);
//! pool.spawn(|p| {
//!     p.set_life(1.0);
//!     p.velocity = Vec3::Y;
//! });
//! pool.advance(0.5);
//! ```

use crate::particle::Particle;

/// Capacity from which [`ParticlePool::with_capacity`] switches to a free list.
pub const FREE_LIST_THRESHOLD: usize = 1024;

/// How the pool finds an inactive slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSearch {
    /// Scan from index 0 for the first inactive slot.
    LinearScan,
    /// Pop from a stack of free indices.
    FreeList,
}

impl SlotSearch {
    /// Strategy used for a pool of the given capacity.
    pub fn for_capacity(capacity: usize) -> Self {
        if capacity >= FREE_LIST_THRESHOLD {
            SlotSearch::FreeList
        } else {
            SlotSearch::LinearScan
        }
    }
}

/// Fixed-size array of reusable particle slots.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    search: SlotSearch,
    /// Free slot indices, only maintained for [`SlotSearch::FreeList`].
    /// The next slot to hand out is at the end.
    free: Vec<usize>,
    active: usize,
    initialized: bool,
}

impl ParticlePool {
    /// Create an uninitialised pool with no slots.
    ///
    /// Every spawn fails until [`init`](Self::init) is called.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            search: SlotSearch::LinearScan,
            free: Vec::new(),
            active: 0,
            initialized: false,
        }
    }

    /// Create and initialise a pool, picking the slot search by capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_search(capacity, SlotSearch::for_capacity(capacity))
    }

    /// Create and initialise a pool with an explicit slot search.
    pub fn with_search(capacity: usize, search: SlotSearch) -> Self {
        let mut pool = Self::new();
        pool.search = search;
        pool.init(capacity);
        pool
    }

    /// Allocate `capacity` inactive slots.
    ///
    /// Only the first call allocates. Later calls leave the pool untouched and
    /// return `false`.
    pub fn init(&mut self, capacity: usize) -> bool {
        if self.initialized {
            return false;
        }
        self.slots = vec![Particle::INACTIVE; capacity];
        if self.search == SlotSearch::FreeList {
            // Reversed so the lowest index is handed out first.
            self.free = (0..capacity).rev().collect();
        }
        self.active = 0;
        self.initialized = true;
        true
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active particles.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.active == self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    #[inline]
    pub fn search(&self) -> SlotSearch {
        self.search
    }

    /// Advance every active particle by `dt` seconds.
    ///
    /// Life is decremented, position integrated by velocity, and particles
    /// whose life reaches zero are deactivated. Negative or non-finite `dt`
    /// is treated as zero. Returns the number of particles that expired.
    pub fn advance(&mut self, dt: f32) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut expired = 0;
        for (index, p) in self.slots.iter_mut().enumerate() {
            if !p.is_active() {
                continue;
            }
            p.life -= dt;
            p.position += p.velocity * dt;
            if !p.is_active() {
                p.deactivate();
                if self.search == SlotSearch::FreeList {
                    self.free.push(index);
                }
                expired += 1;
            }
        }
        self.active -= expired;
        expired
    }

    /// Spawn a particle into the first free slot.
    ///
    /// The slot is reset to [`Particle::INACTIVE`] and handed to `init`, which
    /// sets position, velocity, life and visual parameters. Returns `false`
    /// without calling `init` when the pool is full.
    pub fn spawn<F>(&mut self, init: F) -> bool
    where
        F: FnOnce(&mut Particle),
    {
        let Some(index) = self.take_free_slot() else {
            return false;
        };
        let slot = &mut self.slots[index];
        *slot = Particle::INACTIVE;
        init(slot);
        slot.sanitize_spawned();
        self.active += 1;
        true
    }

    fn take_free_slot(&mut self) -> Option<usize> {
        match self.search {
            SlotSearch::LinearScan => self.slots.iter().position(|p| !p.is_active()),
            SlotSearch::FreeList => self.free.pop(),
        }
    }

    /// Deactivate the particle at `index`.
    ///
    /// Used for terminal events other than expiry, such as a meteor hitting
    /// the ground. Returns `false` if the slot was already inactive or out
    /// of range.
    pub fn kill(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(p) if p.is_active() => {
                p.deactivate();
                self.release(index);
                true
            }
            _ => false,
        }
    }

    /// Deactivate every active particle matching `pred`.
    ///
    /// Returns the number of particles killed.
    pub fn retire_where<P>(&mut self, mut pred: P) -> usize
    where
        P: FnMut(&Particle) -> bool,
    {
        let mut killed = 0;
        for (index, p) in self.slots.iter_mut().enumerate() {
            if p.is_active() && pred(p) {
                p.deactivate();
                if self.search == SlotSearch::FreeList {
                    self.free.push(index);
                }
                killed += 1;
            }
        }
        self.active -= killed;
        killed
    }

    /// Mutate every active particle in place.
    ///
    /// A particle whose life the closure drives to zero or below becomes
    /// inactive.
    pub fn for_each_active_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Particle),
    {
        let mut killed = 0;
        for (index, p) in self.slots.iter_mut().enumerate() {
            if !p.is_active() {
                continue;
            }
            f(p);
            if !p.is_active() {
                p.deactivate();
                if self.search == SlotSearch::FreeList {
                    self.free.push(index);
                }
                killed += 1;
            }
        }
        self.active -= killed;
    }

    /// Iterate over active particles.
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.slots.iter().filter(|p| p.is_active())
    }

    /// Iterate over active particles with their slot index.
    pub fn iter_active_indexed(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.slots.iter().enumerate().filter(|(_, p)| p.is_active())
    }

    /// Deactivate every particle, keeping the allocation.
    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.deactivate();
        }
        if self.search == SlotSearch::FreeList {
            self.free.clear();
            self.free.extend((0..self.slots.len()).rev());
        }
        self.active = 0;
    }

    fn release(&mut self, index: usize) {
        self.active -= 1;
        if self.search == SlotSearch::FreeList {
            self.free.push(index);
        }
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}
