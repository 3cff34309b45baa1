use std::cmp;

use crate::util::Random;

const MAX_HEIGHT: usize = 12;
const BRANCHING: u32 = 4;
const HEAD: usize = 0;

/// Total order over the keys stored in a [`SkipList`].
pub trait KeyComparator<Key> {
    fn compare(&self, a: &Key, b: &Key) -> cmp::Ordering;
}

/// Stable handle to a node. Nodes are never removed, so a position stays
/// valid for the lifetime of the list even across later inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(usize);

struct Node<Key> {
    key: Key,
    next: Vec<Option<usize>>,
}

impl<Key> Node<Key> {
    fn new(key: Key, height: usize) -> Self {
        Self {
            key,
            next: vec![None; height],
        }
    }
}

pub struct SkipList<Key, C: KeyComparator<Key>> {
    pub(super) comparator: C,
    nodes: Vec<Node<Key>>,
    max_height: usize,
    rnd: Random,
}

impl<Key, C: KeyComparator<Key>> SkipList<Key, C> {
    /// The head node carries `dummy` and is never compared.
    pub fn new(comparator: C, dummy: Key) -> Self {
        Self {
            comparator,
            nodes: vec![Node::new(dummy, MAX_HEIGHT)],
            max_height: 1,
            rnd: Random::new(0xdeadbeef),
        }
    }

    /// Requires nothing that compares equal to `key` is already in the list.
    pub fn insert(&mut self, key: Key) -> Position {
        let mut prev = [HEAD; MAX_HEIGHT];
        let _ = self.find_greater_or_equal(&key, Some(&mut prev));
        let height = self.random_height();

        if height > self.max_height {
            // prev already holds HEAD for the new levels
            self.max_height = height;
        }

        let id = self.nodes.len();
        let mut node = Node::new(key, height);
        for (level, &prev_id) in prev.iter().enumerate().take(height) {
            node.next[level] = self.nodes[prev_id].next[level];
        }
        self.nodes.push(node);
        for (level, &prev_id) in prev.iter().enumerate().take(height) {
            self.nodes[prev_id].next[level] = Some(id);
        }
        Position(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn key(&self, position: Position) -> &Key {
        &self.nodes[position.0].key
    }

    pub fn first(&self) -> Option<Position> {
        self.nodes[HEAD].next[0].map(Position)
    }

    pub fn next(&self, position: Position) -> Option<Position> {
        self.nodes[position.0].next[0].map(Position)
    }

    /// Return the earliest node at or after `target`.
    pub fn seek(&self, target: &Key) -> Option<Position> {
        self.find_greater_or_equal(target, None).map(Position)
    }

    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_HEIGHT && self.rnd.one_in(BRANCHING) {
            height += 1;
        }
        height
    }

    fn find_greater_or_equal(
        &self,
        key: &Key,
        mut prev: Option<&mut [usize; MAX_HEIGHT]>,
    ) -> Option<usize> {
        let mut current = HEAD;
        let mut level = self.max_height - 1;
        loop {
            let next = self.nodes[current].next[level];
            match next {
                Some(next)
                    if self.comparator.compare(&self.nodes[next].key, key)
                        == cmp::Ordering::Less =>
                {
                    current = next;
                }
                _ => {
                    if let Some(ref mut prev) = prev {
                        prev[level] = current;
                    }
                    if level == 0 {
                        break next;
                    }
                    level -= 1;
                }
            }
        }
    }

    #[cfg(test)]
    pub fn contains(&self, key: &Key) -> bool {
        self.find_greater_or_equal(key, None).is_some_and(|found| {
            self.comparator.compare(&self.nodes[found].key, key) == cmp::Ordering::Equal
        })
    }
}
