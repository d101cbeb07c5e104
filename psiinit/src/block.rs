use num_traits::Zero;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};
use types::c64;

/// Coefficients of one k-point, column-major: rows are plane waves in basis
/// order, columns are bands.
///
/// The first `nfilled` columns hold projected (or random) data; the rest are
/// zero until someone fills them.
#[derive(Debug, Clone, PartialEq)]
pub struct WfcBlock {
    nrow: usize,
    ncol: usize,
    nfilled: usize,
    data: Vec<c64>,
}

impl WfcBlock {
    pub fn new(nrow: usize, ncol: usize) -> WfcBlock {
        WfcBlock {
            nrow,
            ncol,
            nfilled: 0,
            data: vec![c64::zero(); nrow * ncol],
        }
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn nfilled(&self) -> usize {
        self.nfilled
    }

    /// Clamped to the number of columns.
    pub fn set_nfilled(&mut self, n: usize) {
        self.nfilled = n.min(self.ncol);
    }

    pub fn column(&self, j: usize) -> &[c64] {
        &self.data[j * self.nrow..(j + 1) * self.nrow]
    }

    pub fn column_mut(&mut self, j: usize) -> &mut [c64] {
        &mut self.data[j * self.nrow..(j + 1) * self.nrow]
    }

    pub fn as_slice(&self) -> &[c64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [c64] {
        &mut self.data
    }

    /// sum over rows of |c|^2
    pub fn column_norm2(&self, j: usize) -> f64 {
        self.column(j).iter().map(|z| z.norm_sqr()).sum()
    }
}

impl Index<[usize; 2]> for WfcBlock {
    type Output = c64;

    fn index(&self, idx: [usize; 2]) -> &c64 {
        assert!(idx[0] < self.nrow && idx[1] < self.ncol);

        &self.data[idx[0] + idx[1] * self.nrow]
    }
}

impl IndexMut<[usize; 2]> for WfcBlock {
    fn index_mut(&mut self, idx: [usize; 2]) -> &mut c64 {
        assert!(idx[0] < self.nrow && idx[1] < self.ncol);

        &mut self.data[idx[0] + idx[1] * self.nrow]
    }
}

/// Blocks of the k-points owned by this rank, keyed by global k index.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WfcStore {
    blocks: BTreeMap<usize, WfcBlock>,
}

impl WfcStore {
    pub fn new() -> WfcStore {
        WfcStore::default()
    }

    pub fn insert(&mut self, ik: usize, block: WfcBlock) {
        self.blocks.insert(ik, block);
    }

    pub fn get(&self, ik: usize) -> Option<&WfcBlock> {
        self.blocks.get(&ik)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn k_indices(&self) -> Vec<usize> {
        self.blocks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &WfcBlock)> {
        self.blocks.iter()
    }

    /// Moves every block of `other` in, replacing blocks with the same k.
    pub fn append(&mut self, mut other: WfcStore) {
        self.blocks.append(&mut other.blocks);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
