use std::ops::Range;

/// Contiguous blocks of global k-point indices, one block per rank.
///
/// Block sizes differ by at most one, lower ranks take the extra k-points.
/// Ranks beyond the number of k-points own an empty block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KPartition {
    nkpt: usize,
    chunks: Vec<Range<usize>>,
}

fn get_chunks(nkpt: usize, nrank: usize) -> Vec<Range<usize>> {
    let mut vchunks_size = vec![0; nrank];

    for ik in 0..nkpt {
        vchunks_size[ik % nrank] += 1;
    }

    let mut vchunks = Vec::with_capacity(nrank);

    let mut n = 0;
    for size in vchunks_size {
        vchunks.push(n..n + size);
        n += size;
    }

    vchunks
}

impl KPartition {
    pub fn new(nkpt: usize, nrank: usize) -> KPartition {
        assert!(nrank > 0, "k-point partition needs at least one rank");

        KPartition {
            nkpt,
            chunks: get_chunks(nkpt, nrank),
        }
    }

    /// Everything on one rank.
    pub fn single(nkpt: usize) -> KPartition {
        KPartition::new(nkpt, 1)
    }

    pub fn get_n_kpoints(&self) -> usize {
        self.nkpt
    }

    pub fn get_n_ranks(&self) -> usize {
        self.chunks.len()
    }

    /// Global k indices owned by `rank`; empty for unknown ranks.
    pub fn get_k_range(&self, rank: usize) -> Range<usize> {
        self.chunks.get(rank).cloned().unwrap_or(0..0)
    }

    pub fn get_k_first(&self, rank: usize) -> Option<usize> {
        let r = self.get_k_range(rank);

        if r.is_empty() {
            None
        } else {
            Some(r.start)
        }
    }

    pub fn get_k_last(&self, rank: usize) -> Option<usize> {
        let r = self.get_k_range(rank);

        if r.is_empty() {
            None
        } else {
            Some(r.end - 1)
        }
    }

    pub fn get_k_total(&self, rank: usize) -> usize {
        self.get_k_range(rank).len()
    }

    pub fn get_owner(&self, ik: usize) -> Option<usize> {
        self.chunks.iter().position(|r| r.contains(&ik))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpts_distribution() {
        let nrank = 5;
        let nkpt = 31;

        let part = KPartition::new(nkpt, nrank);

        let mut next = 0;
        for rank in 0..nrank {
            let r = part.get_k_range(rank);
            assert_eq!(r.start, next);
            next = r.end;
        }
        assert_eq!(next, nkpt);

        assert_eq!(part.get_k_total(0), 7);
        assert_eq!(part.get_k_total(4), 6);
        assert_eq!(part.get_k_first(1), Some(7));
        assert_eq!(part.get_k_last(4), Some(30));
        assert_eq!(part.get_owner(13), Some(1));
        assert_eq!(part.get_owner(31), None);
    }

    #[test]
    fn test_more_ranks_than_kpoints() {
        let part = KPartition::new(2, 4);

        assert_eq!(part.get_k_range(0), 0..1);
        assert_eq!(part.get_k_range(1), 1..2);
        assert_eq!(part.get_k_total(2), 0);
        assert_eq!(part.get_k_first(3), None);
        assert_eq!(part.get_k_range(9), 0..0);
    }
}
