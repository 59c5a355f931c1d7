//! Domain storage
//!
//! A [`Space`] owns one [`Domain`] per locality. Each domain keeps its bodies'
//! kinematic rows as parallel, contiguous arrays indexed by slot:
//! - positions and velocities as `3 x capacity` matrices, so a drift step is a
//!   single matrix update over the whole domain
//! - headings and spins as `Vec<Quat>`
//!
//! Slots are minted only by [`Space::allocate_slot`]. Arrays grow by doubling
//! and never shrink; freed slots are zeroed and handed out again, lowest
//! index first. Out-of-range ids are allocator misuse and panic.

use nalgebra::Matrix3xX;

use super::rotation::increment_heading;
use super::states::{DomainId, FrameState, NVec3, Quat, Slot};

/// Slots reserved when a domain is created
pub const INITIAL_SLOTS: usize = 10;

/// Parallel per-slot arrays for one locality
#[derive(Debug, Clone)]
pub struct Domain {
    position: Matrix3xX<f64>,
    velocity: Matrix3xX<f64>,
    heading: Vec<Quat>,
    spin: Vec<Quat>,
    occupied: Vec<bool>,
}

impl Domain {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            position: Matrix3xX::zeros(capacity),
            velocity: Matrix3xX::zeros(capacity),
            heading: vec![Quat::identity(); capacity],
            spin: vec![Quat::identity(); capacity],
            occupied: vec![false; capacity],
        }
    }

    /// Number of slots the arrays currently hold
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.occupied.iter().filter(|o| **o).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.occupied.iter().any(|o| *o)
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.occupied.get(index).copied().unwrap_or(false)
    }

    /// Double the slot axis until it can hold `index`. Existing columns keep
    /// their indices and contents.
    fn grow_to_fit(&mut self, index: usize) {
        let mut capacity = self.capacity().max(1);
        while capacity <= index {
            capacity *= 2;
        }
        if capacity == self.capacity() {
            return;
        }

        let position = std::mem::replace(&mut self.position, Matrix3xX::zeros(0));
        self.position = position.resize_horizontally(capacity, 0.0);
        let velocity = std::mem::replace(&mut self.velocity, Matrix3xX::zeros(0));
        self.velocity = velocity.resize_horizontally(capacity, 0.0);

        self.heading.resize(capacity, Quat::identity());
        self.spin.resize(capacity, Quat::identity());
        self.occupied.resize(capacity, false);
    }

    fn clear_slot(&mut self, index: usize) {
        self.position.set_column(index, &NVec3::zeros());
        self.velocity.set_column(index, &NVec3::zeros());
        self.heading[index] = Quat::identity();
        self.spin[index] = Quat::identity();
    }

    fn advance_positions(&mut self, dt: f64) {
        // free slots are zeroed, so drifting them is a no-op
        self.position += &self.velocity * dt;
    }

    fn advance_headings(&mut self, dt: f64) {
        for ((heading, spin), occupied) in self
            .heading
            .iter_mut()
            .zip(self.spin.iter())
            .zip(self.occupied.iter())
        {
            if *occupied {
                *heading = increment_heading(heading, spin, dt);
            }
        }
    }
}

/// Storage for every domain of one simulation session
#[derive(Debug, Clone, Default)]
pub struct Space {
    domains: Vec<Domain>,
}

impl Space {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty domain and return its id
    pub fn add_domain(&mut self) -> DomainId {
        self.domains.push(Domain::with_capacity(INITIAL_SLOTS));
        DomainId(self.domains.len() - 1)
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn domain_ids(&self) -> impl Iterator<Item = DomainId> {
        (0..self.domains.len()).map(DomainId)
    }

    pub fn contains_domain(&self, id: DomainId) -> bool {
        id.0 < self.domains.len()
    }

    /// # Panics
    /// If `id` was not minted by this space.
    pub fn domain(&self, id: DomainId) -> &Domain {
        match self.domains.get(id.0) {
            Some(domain) => domain,
            None => panic!("domain {} out of range ({} allocated)", id.0, self.domains.len()),
        }
    }

    fn domain_mut(&mut self, id: DomainId) -> &mut Domain {
        let count = self.domains.len();
        match self.domains.get_mut(id.0) {
            Some(domain) => domain,
            None => panic!("domain {} out of range ({count} allocated)", id.0),
        }
    }

    /// Resolve a slot to its domain, checking it is occupied
    fn occupied_mut(&mut self, slot: Slot) -> &mut Domain {
        let domain = self.domain_mut(slot.domain);
        assert!(
            domain.is_occupied(slot.index),
            "slot {} of domain {} is not allocated",
            slot.index,
            slot.domain.0
        );
        domain
    }

    fn occupied(&self, slot: Slot) -> &Domain {
        let domain = self.domain(slot.domain);
        assert!(
            domain.is_occupied(slot.index),
            "slot {} of domain {} is not allocated",
            slot.index,
            slot.domain.0
        );
        domain
    }

    /// Reserve the lowest free slot of `domain`, growing its arrays if full.
    /// The new row starts at rest at the origin.
    pub fn allocate_slot(&mut self, domain: DomainId) -> Slot {
        let d = self.domain_mut(domain);
        let index = match d.occupied.iter().position(|o| !*o) {
            Some(free) => free,
            None => {
                let next = d.capacity();
                d.grow_to_fit(next);
                next
            }
        };
        d.occupied[index] = true;
        d.clear_slot(index);
        Slot { domain, index }
    }

    /// Release `slot` for reuse. Its row is zeroed.
    ///
    /// # Panics
    /// If the slot is out of range or already free.
    pub fn free_slot(&mut self, slot: Slot) {
        let d = self.occupied_mut(slot);
        d.clear_slot(slot.index);
        d.occupied[slot.index] = false;
    }

    /// Occupied slots of `domain`, in index order
    pub fn slots(&self, domain: DomainId) -> impl Iterator<Item = Slot> + '_ {
        self.domain(domain)
            .occupied
            .iter()
            .enumerate()
            .filter(|(_, o)| **o)
            .map(move |(index, _)| Slot { domain, index })
    }

    pub fn read(&self, slot: Slot) -> FrameState {
        let d = self.occupied(slot);
        FrameState {
            position: d.position.column(slot.index).into_owned(),
            velocity: d.velocity.column(slot.index).into_owned(),
            heading: d.heading[slot.index],
            spin: d.spin[slot.index],
        }
    }

    pub fn write(&mut self, slot: Slot, state: &FrameState) {
        let d = self.occupied_mut(slot);
        d.position.set_column(slot.index, &state.position);
        d.velocity.set_column(slot.index, &state.velocity);
        d.heading[slot.index] = state.heading;
        d.spin[slot.index] = state.spin;
    }

    pub fn position(&self, slot: Slot) -> NVec3 {
        self.occupied(slot).position.column(slot.index).into_owned()
    }

    pub fn velocity(&self, slot: Slot) -> NVec3 {
        self.occupied(slot).velocity.column(slot.index).into_owned()
    }

    pub fn set_position(&mut self, slot: Slot, position: &NVec3) {
        self.occupied_mut(slot).position.set_column(slot.index, position);
    }

    pub fn set_velocity(&mut self, slot: Slot, velocity: &NVec3) {
        self.occupied_mut(slot).velocity.set_column(slot.index, velocity);
    }

    pub fn add_velocity(&mut self, slot: Slot, dv: &NVec3) {
        let mut column = self.occupied_mut(slot).velocity.column_mut(slot.index);
        column += dv;
    }

    pub fn set_heading(&mut self, slot: Slot, heading: Quat) {
        self.occupied_mut(slot).heading[slot.index] = heading;
    }

    pub fn set_spin(&mut self, slot: Slot, spin: Quat) {
        self.occupied_mut(slot).spin[slot.index] = spin;
    }

    /// Drift every body in every domain: `position += velocity * dt`
    pub fn advance_positions(&mut self, dt: f64) {
        for domain in self.domains.iter_mut() {
            domain.advance_positions(dt);
        }
    }

    /// Turn every occupied heading by `dt` seconds of its spin
    pub fn advance_headings(&mut self, dt: f64) {
        for domain in self.domains.iter_mut() {
            domain.advance_headings(dt);
        }
    }

    /// Drift and turn everything by `dt`
    pub fn advance(&mut self, dt: f64) {
        self.advance_positions(dt);
        self.advance_headings(dt);
    }
}
