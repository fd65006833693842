//! A trie of type vectors supporting domination queries.
//!
//! Type vector `f` is dominated by `τ` when, at every position, `f` is either
//! zero or equal to `τ`. The tree traversal uses this to drop solutions whose
//! support strictly contains the support of one already found.

/// Arena-backed trie over type vectors with entries in `0..N`.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::enumerate::tree::type_trie::TypeTrie;
///
/// let mut trie = TypeTrie::<4>::new();
/// trie.insert(&[1, 0, 0]);
/// assert!(trie.dominates(&[1, 2, 0]));
/// assert!(!trie.dominates(&[2, 2, 0]));
/// ```
#[derive(Clone, Debug)]
pub struct TypeTrie<const N: usize> {
    nodes: Vec<TrieNode<N>>,
}

#[derive(Clone, Copy, Debug)]
struct TrieNode<const N: usize> {
    /// Child index per type value; `0` means absent (the root is never a child).
    children: [usize; N],
    terminal: bool,
}

impl<const N: usize> TrieNode<N> {
    const EMPTY: Self = Self {
        children: [0; N],
        terminal: false,
    };
}

impl<const N: usize> Default for TypeTrie<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TypeTrie<N> {
    /// An empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::EMPTY],
        }
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.nodes[0].terminal && self.nodes.len() == 1
    }

    /// Records a type vector. Entries must lie in `0..N`.
    ///
    /// # Panics
    ///
    /// Panics if an entry is `N` or larger.
    pub fn insert(&mut self, types: &[u8]) {
        let mut node = 0_usize;
        for &t in types {
            let child = self.nodes[node].children[usize::from(t)];
            node = if child == 0 {
                let next = self.nodes.len();
                self.nodes.push(TrieNode::EMPTY);
                self.nodes[node].children[usize::from(t)] = next;
                next
            } else {
                child
            };
        }
        self.nodes[node].terminal = true;
    }

    /// Returns `true` if some stored vector `f` satisfies `f_i ∈ {0, τ_i}`
    /// for every position `i`.
    #[must_use]
    pub fn dominates(&self, types: &[u8]) -> bool {
        self.dominates_from(0, types)
    }

    fn dominates_from(&self, node: usize, rest: &[u8]) -> bool {
        let Some((&t, tail)) = rest.split_first() else {
            return self.nodes[node].terminal;
        };
        let zero = self.nodes[node].children[0];
        if zero != 0 && self.dominates_from(zero, tail) {
            return true;
        }
        if t != 0 {
            let same = self.nodes[node].children[usize::from(t)];
            if same != 0 && self.dominates_from(same, tail) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domination() {
        let mut trie = TypeTrie::<7>::new();
        assert!(trie.is_empty());
        assert!(!trie.dominates(&[0, 0, 0]));

        trie.insert(&[0, 3, 0]);
        trie.insert(&[4, 0, 1]);
        assert!(!trie.is_empty());

        assert!(trie.dominates(&[0, 3, 0]));
        assert!(trie.dominates(&[2, 3, 1]));
        assert!(trie.dominates(&[4, 2, 1]));
        assert!(!trie.dominates(&[4, 2, 2]));
        assert!(!trie.dominates(&[0, 2, 0]));
    }

    #[test]
    fn test_shared_prefixes_reuse_nodes() {
        let mut trie = TypeTrie::<4>::new();
        trie.insert(&[1, 2]);
        trie.insert(&[1, 3]);
        assert_eq!(trie.node_count(), 4);
    }
}
