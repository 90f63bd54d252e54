//! Resource inventory: per-kind instance counts and the `busy[kind][i]`
//! occupancy table. A free instance is `None` in `Vec<Option<usize>>`;
//! `Some(block_id)` records who currently holds it.

use crate::types::AcceleratorKind;

fn kind_index(kind: AcceleratorKind) -> usize {
    match kind {
        AcceleratorKind::Cpu => 0,
        AcceleratorKind::FftHw => 1,
        AcceleratorKind::VitHw => 2,
    }
}

pub(crate) struct Inventory {
    count: [usize; 3],
    busy: [Vec<Option<usize>>; 3],
}

impl Inventory {
    pub fn new(cpu_count: usize, fft_hw_count: usize, vit_hw_count: usize) -> Self {
        Inventory {
            count: [cpu_count, fft_hw_count, vit_hw_count],
            busy: [
                vec![None; cpu_count],
                vec![None; fft_hw_count],
                vec![None; vit_hw_count],
            ],
        }
    }

    pub fn count(&self, kind: AcceleratorKind) -> usize {
        self.count[kind_index(kind)]
    }

    /// First free instance index of `kind`, or `None` if every instance is
    /// occupied (or the kind has zero instances).
    pub fn scan_free(&self, kind: AcceleratorKind) -> Option<usize> {
        self.busy[kind_index(kind)].iter().position(|b| b.is_none())
    }

    /// Claim instance `id` of `kind` for `block_id`. Panics (invariant
    /// violation) if it was already claimed by someone else.
    pub fn claim(&mut self, kind: AcceleratorKind, id: usize, block_id: usize) {
        let slot = &mut self.busy[kind_index(kind)][id];
        if let Some(owner) = *slot {
            tracing::error!(
                ?kind,
                id,
                owner,
                attempted_by = block_id,
                "double-claim of busy accelerator instance"
            );
            panic!("double-claim of busy accelerator {kind:?}#{id}: already held by block {owner}");
        }
        *slot = Some(block_id);
    }

    /// Release instance `id` of `kind`, but only if it is currently held by
    /// `block_id`. A mismatch is non-fatal and is reported back to the
    /// caller to log.
    pub fn release(&mut self, kind: AcceleratorKind, id: usize, block_id: usize) -> bool {
        let slot = &mut self.busy[kind_index(kind)][id];
        if *slot == Some(block_id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn owner(&self, kind: AcceleratorKind, id: usize) -> Option<usize> {
        self.busy[kind_index(kind)][id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_free_finds_first_free_index() {
        let mut inv = Inventory::new(2, 0, 0);
        inv.claim(AcceleratorKind::Cpu, 0, 42);
        assert_eq!(inv.scan_free(AcceleratorKind::Cpu), Some(1));
    }

    #[test]
    fn scan_free_on_zero_count_kind_is_none() {
        let inv = Inventory::new(2, 0, 0);
        assert_eq!(inv.scan_free(AcceleratorKind::FftHw), None);
    }

    #[test]
    #[should_panic(expected = "double-claim")]
    fn double_claim_panics() {
        let mut inv = Inventory::new(1, 0, 0);
        inv.claim(AcceleratorKind::Cpu, 0, 1);
        inv.claim(AcceleratorKind::Cpu, 0, 2);
    }

    #[test]
    fn release_mismatch_is_non_fatal_and_leaves_table_unchanged() {
        let mut inv = Inventory::new(1, 0, 0);
        inv.claim(AcceleratorKind::Cpu, 0, 1);
        assert!(!inv.release(AcceleratorKind::Cpu, 0, 99));
        assert_eq!(inv.owner(AcceleratorKind::Cpu, 0), Some(1));
        assert!(inv.release(AcceleratorKind::Cpu, 0, 1));
        assert_eq!(inv.owner(AcceleratorKind::Cpu, 0), None);
    }

    #[test]
    fn repeated_release_after_success_is_a_mismatch_noop() {
        let mut inv = Inventory::new(1, 0, 0);
        inv.claim(AcceleratorKind::Cpu, 0, 1);
        assert!(inv.release(AcceleratorKind::Cpu, 0, 1));
        assert!(!inv.release(AcceleratorKind::Cpu, 0, 1));
    }
}
