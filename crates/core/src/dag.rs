//! The DAG graph (C1): block storage, tip tracking, ancestor/descendant/
//! anticone queries, and GHOSTDAG blue/red coloring.

use std::collections::{HashMap, HashSet};

use bdnode_types::{Block, BlockColor, Hash};
use itertools::Itertools;

use crate::error::DagError;

/// Result of [`DagGraph::add_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBlockOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DagStats {
    pub block_count: usize,
    pub tip_count: usize,
    pub max_depth: u64,
    pub blue_count: usize,
    pub red_count: usize,
}

/// Single-writer DAG of blocks. Every mutating call is expected to be
/// serialized by the orchestrator; readers may freely run concurrently with
/// each other but never with a write.
pub struct DagGraph {
    k: u64,
    genesis_hash: Hash,
    blocks: HashMap<Hash, Block>,
    children: HashMap<Hash, HashSet<Hash>>,
    tips: HashSet<Hash>,
}

impl DagGraph {
    /// Constructs a DAG seeded with `genesis`, which must already have
    /// `dag_depth == 0` and `color == Blue`.
    pub fn new(k: u64, genesis: Block) -> Self {
        let genesis_hash = genesis.hash;
        let mut blocks = HashMap::new();
        blocks.insert(genesis_hash, genesis);
        let mut tips = HashSet::new();
        tips.insert(genesis_hash);
        Self {
            k,
            genesis_hash,
            blocks,
            children: HashMap::new(),
            tips,
        }
    }

    /// Accepts `block` iff every parent resolves and its hash is novel.
    /// Recomputes `dag_depth`, updates tips, and reruns the coloring pass.
    pub fn add_block(&mut self, mut block: Block) -> Result<AddBlockOutcome, DagError> {
        if self.blocks.contains_key(&block.hash) {
            return Ok(AddBlockOutcome::AlreadyPresent);
        }
        let mut max_parent_depth: Option<u64> = None;
        for parent in &block.parent_hashes {
            let parent_block = self
                .blocks
                .get(parent)
                .ok_or(DagError::MissingParent(*parent))?;
            max_parent_depth = Some(match max_parent_depth {
                Some(d) => d.max(parent_block.dag_depth),
                None => parent_block.dag_depth,
            });
        }
        block.dag_depth = match max_parent_depth {
            Some(d) => d + 1,
            None => 0,
        };
        block.color = BlockColor::Pending;

        let hash = block.hash;
        for parent in &block.parent_hashes {
            self.children.entry(*parent).or_default().insert(hash);
            self.tips.remove(parent);
        }
        self.tips.insert(hash);
        self.blocks.insert(hash, block);

        self.recolor();
        Ok(AddBlockOutcome::Added)
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    pub fn get_all_blocks(&self) -> Vec<&Block> {
        self.blocks.values().collect()
    }

    pub fn get_children(&self, hash: &Hash) -> HashSet<Hash> {
        self.children.get(hash).cloned().unwrap_or_default()
    }

    pub fn get_tips(&self) -> Vec<Hash> {
        self.tips.iter().copied().collect()
    }

    pub fn get_genesis_hash(&self) -> Hash {
        self.genesis_hash
    }

    pub fn get_max_depth(&self) -> u64 {
        self.blocks.values().map(|b| b.dag_depth).max().unwrap_or(0)
    }

    pub fn get_block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The lowest-hash block at `depth`, standing in for Ethereum's
    /// block-number lookup where a DAG depth may hold several blocks.
    pub fn get_block_at_depth(&self, depth: u64) -> Option<&Block> {
        self.blocks
            .values()
            .filter(|b| b.dag_depth == depth)
            .min_by_key(|b| b.hash)
    }

    /// The past cone of `hash`, excluding `hash` itself.
    pub fn ancestors(&self, hash: &Hash) -> HashSet<Hash> {
        let mut seen = HashSet::new();
        let mut stack = match self.blocks.get(hash) {
            Some(b) => b.parent_hashes.clone(),
            None => return seen,
        };
        while let Some(h) = stack.pop() {
            if seen.insert(h) {
                if let Some(b) = self.blocks.get(&h) {
                    stack.extend(b.parent_hashes.iter().copied());
                }
            }
        }
        seen
    }

    /// The future cone of `hash`, excluding `hash` itself.
    pub fn descendants(&self, hash: &Hash) -> HashSet<Hash> {
        let mut seen = HashSet::new();
        let mut stack: Vec<Hash> = self.get_children(hash).into_iter().collect();
        while let Some(h) = stack.pop() {
            if seen.insert(h) {
                stack.extend(self.get_children(&h));
            }
        }
        seen
    }

    /// `all_blocks \ ({hash} ∪ ancestors(hash) ∪ descendants(hash))`.
    pub fn anticone(&self, hash: &Hash) -> HashSet<Hash> {
        let ancestors = self.ancestors(hash);
        let descendants = self.descendants(hash);
        self.blocks
            .keys()
            .copied()
            .filter(|h| h != hash && !ancestors.contains(h) && !descendants.contains(h))
            .collect()
    }

    pub fn is_blue(&self, hash: &Hash) -> Option<bool> {
        self.blocks.get(hash).map(|b| b.color == BlockColor::Blue)
    }

    pub fn get_blue_blocks(&self) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.color == BlockColor::Blue)
            .collect()
    }

    pub fn get_red_blocks(&self) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.color == BlockColor::Red)
            .collect()
    }

    pub fn get_stats(&self) -> DagStats {
        DagStats {
            block_count: self.blocks.len(),
            tip_count: self.tips.len(),
            max_depth: self.get_max_depth(),
            blue_count: self.get_blue_blocks().len(),
            red_count: self.get_red_blocks().len(),
        }
    }

    /// Recomputes blue/red coloring and blue scores from scratch: genesis
    /// is blue, then every other block visited in non-decreasing
    /// `dag_depth` (ties broken by hash) is promoted blue iff its
    /// anticone, measured against the blue set accumulated so far, has
    /// size at most `k`.
    fn recolor(&mut self) {
        let order: Vec<Hash> = self
            .blocks
            .keys()
            .copied()
            .filter(|h| *h != self.genesis_hash)
            .sorted_by_key(|h| (self.blocks[h].dag_depth, *h))
            .collect();

        let mut blue: HashSet<Hash> = HashSet::new();
        blue.insert(self.genesis_hash);
        for hash in &order {
            let ancestors = self.ancestors(hash);
            let descendants = self.descendants(hash);
            let anticone_size = blue
                .iter()
                .filter(|b| **b != *hash && !ancestors.contains(*b) && !descendants.contains(*b))
                .count();
            if anticone_size as u64 <= self.k {
                blue.insert(*hash);
            }
        }

        for (hash, block) in self.blocks.iter_mut() {
            block.color = if blue.contains(hash) {
                BlockColor::Blue
            } else {
                BlockColor::Red
            };
        }

        let blue_scores: HashMap<Hash, u64> = self
            .blocks
            .keys()
            .copied()
            .map(|h| {
                let score = self
                    .ancestors(&h)
                    .iter()
                    .filter(|a| blue.contains(*a))
                    .count() as u64;
                (h, score)
            })
            .collect();
        for (hash, block) in self.blocks.iter_mut() {
            block.blue_score = *blue_scores.get(hash).unwrap_or(&0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn genesis() -> Block {
        Block::genesis(Address::ZERO, Hash::ZERO, 0)
    }

    fn child(parents: Vec<Hash>, nonce: u64) -> Block {
        let mut b = Block {
            hash: Hash::ZERO,
            parent_hashes: parents,
            timestamp: 1,
            miner: Address::ZERO,
            difficulty: 0,
            state_root: Hash::ZERO,
            transactions_root: bdnode_types::Block::genesis(Address::ZERO, Hash::ZERO, 0)
                .transactions_root,
            nonce,
            transactions: vec![],
            color: BlockColor::Pending,
            dag_depth: 0,
            blue_score: 0,
        };
        b.hash = b.compute_hash();
        b
    }

    #[test]
    fn genesis_is_only_tip_at_construction() {
        let dag = DagGraph::new(18, genesis());
        assert_eq!(dag.get_tips(), vec![dag.get_genesis_hash()]);
        assert_eq!(dag.get_max_depth(), 0);
    }

    #[test]
    fn rejects_missing_parent() {
        let mut dag = DagGraph::new(18, genesis());
        let orphan = child(vec![Hash::repeat_byte(9)], 1);
        assert_eq!(
            dag.add_block(orphan),
            Err(DagError::MissingParent(Hash::repeat_byte(9)))
        );
    }

    #[test]
    fn duplicate_add_is_idempotent() {
        let mut dag = DagGraph::new(18, genesis());
        let g = dag.get_genesis_hash();
        let b1 = child(vec![g], 1);
        let hash = b1.hash;
        assert_eq!(dag.add_block(b1.clone()).unwrap(), AddBlockOutcome::Added);
        assert_eq!(
            dag.add_block(b1).unwrap(),
            AddBlockOutcome::AlreadyPresent
        );
        assert_eq!(dag.get_block_count(), 2);
        assert!(dag.get_block(&hash).is_some());
    }

    #[test]
    fn parallel_fan_out_depths_and_tips() {
        let mut dag = DagGraph::new(18, genesis());
        let g = dag.get_genesis_hash();
        let b1 = child(vec![g], 1);
        let b2 = child(vec![g], 2);
        let b3 = child(vec![g], 3);
        dag.add_block(b1.clone()).unwrap();
        dag.add_block(b2.clone()).unwrap();
        dag.add_block(b3.clone()).unwrap();

        assert_eq!(dag.get_block_count(), 4);
        assert_eq!(dag.get_max_depth(), 1);
        let tips: HashSet<_> = dag.get_tips().into_iter().collect();
        assert_eq!(tips, HashSet::from([b1.hash, b2.hash, b3.hash]));
        assert!(dag.is_blue(&g).unwrap());
    }

    #[test]
    fn anticone_of_parallel_blocks_matches_literal_example() {
        let mut dag = DagGraph::new(18, genesis());
        let g = dag.get_genesis_hash();
        let b1 = child(vec![g], 1);
        let b2 = child(vec![g], 2);
        let b3 = child(vec![g], 3);
        dag.add_block(b1.clone()).unwrap();
        dag.add_block(b2.clone()).unwrap();
        dag.add_block(b3.clone()).unwrap();

        let b4 = child(vec![b1.hash, b2.hash], 4);
        dag.add_block(b4.clone()).unwrap();
        let b5 = child(vec![b3.hash], 5);
        dag.add_block(b5.clone()).unwrap();
        let b6 = child(vec![b4.hash, b5.hash], 6);
        dag.add_block(b6.clone()).unwrap();

        let anticone_b1 = dag.anticone(&b1.hash);
        assert_eq!(anticone_b1.len(), 3);
        assert_eq!(anticone_b1, HashSet::from([b2.hash, b3.hash, b5.hash]));

        let anticone_b2 = dag.anticone(&b2.hash);
        assert_eq!(anticone_b2.len(), 3);
        assert_eq!(anticone_b2, HashSet::from([b1.hash, b3.hash, b5.hash]));

        assert_eq!(dag.anticone(&b6.hash).len(), 0);
        assert_eq!(dag.ancestors(&b6.hash).len(), 6);
        assert_eq!(dag.descendants(&g).len(), 6);

        let desc_b1 = dag.descendants(&b1.hash);
        assert_eq!(desc_b1.len(), 2);
        assert_eq!(desc_b1, HashSet::from([b4.hash, b6.hash]));
    }

    #[test]
    fn coloring_is_idempotent() {
        let mut dag = DagGraph::new(2, genesis());
        let g = dag.get_genesis_hash();
        for i in 1..=6u64 {
            let b = child(vec![g], i);
            dag.add_block(b).unwrap();
        }
        let before: Vec<(Hash, BlockColor)> = dag
            .get_all_blocks()
            .iter()
            .map(|b| (b.hash, b.color))
            .collect();
        dag.recolor();
        let after: Vec<(Hash, BlockColor)> = dag
            .get_all_blocks()
            .iter()
            .map(|b| (b.hash, b.color))
            .collect();
        let before_set: HashSet<_> = before.into_iter().collect();
        let after_set: HashSet<_> = after.into_iter().collect();
        assert_eq!(before_set, after_set);
    }

    #[test]
    fn get_block_at_depth_picks_lowest_hash_among_ties() {
        let mut dag = DagGraph::new(18, genesis());
        let g = dag.get_genesis_hash();

        let b1 = child(vec![g], 1);
        let b2 = child(vec![g], 2);
        dag.add_block(b1.clone()).unwrap();
        dag.add_block(b2.clone()).unwrap();

        let expected = [&b1, &b2].into_iter().min_by_key(|b| b.hash).unwrap();
        assert_eq!(dag.get_block_at_depth(1).unwrap().hash, expected.hash);
        assert!(dag.get_block_at_depth(99).is_none());
    }

    proptest::proptest! {
        #[test]
        fn random_growth_preserves_universal_invariants(
            parent_picks in proptest::collection::vec(0usize..5, 1..16)
        ) {
            let mut dag = DagGraph::new(3, genesis());
            let mut hashes = vec![dag.get_genesis_hash()];
            for (i, pick) in parent_picks.into_iter().enumerate() {
                let parent = hashes[pick % hashes.len()];
                let block = child(vec![parent], (i + 1) as u64);
                if dag.add_block(block.clone()).is_ok() {
                    hashes.push(block.hash);
                }
            }

            for b in dag.get_all_blocks() {
                if b.hash == dag.get_genesis_hash() {
                    proptest::prop_assert_eq!(b.dag_depth, 0);
                } else {
                    let expected = b
                        .parent_hashes
                        .iter()
                        .map(|p| dag.get_block(p).unwrap().dag_depth)
                        .max()
                        .unwrap()
                        + 1;
                    proptest::prop_assert_eq!(b.dag_depth, expected);
                }
            }

            let tips: HashSet<Hash> = dag.get_tips().into_iter().collect();
            for b in dag.get_all_blocks() {
                let has_children = !dag.get_children(&b.hash).is_empty();
                proptest::prop_assert_eq!(tips.contains(&b.hash), !has_children);
            }

            for b in dag.get_all_blocks() {
                let ancestors = dag.ancestors(&b.hash);
                let descendants = dag.descendants(&b.hash);
                let anticone = dag.anticone(&b.hash);
                proptest::prop_assert!(anticone.is_disjoint(&ancestors));
                proptest::prop_assert!(anticone.is_disjoint(&descendants));
                proptest::prop_assert!(ancestors.is_disjoint(&descendants));
            }
        }
    }
}
