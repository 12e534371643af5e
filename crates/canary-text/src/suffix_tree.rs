//! Substring occurrence counting over a single text.
//!
//! The tree is built naively by inserting every suffix into an edge-labelled
//! trie, which is quadratic in the text length. Log templates are short, so
//! this is rarely a concern.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Node {
    /// Edge label leading into this node, as a range of the text.
    label_start: usize,
    label_end: usize,
    /// Children keyed by the first character of their edge label.
    children: BTreeMap<char, usize>,
    /// Start offset of the suffix ending here, if one does.
    suffix_start: Option<usize>,
    /// Number of suffixes ending in this subtree.
    count: usize,
}

impl Node {
    fn label_len(&self) -> usize {
        self.label_end - self.label_start
    }

    fn is_terminal(&self) -> bool {
        self.suffix_start.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SuffixTree {
    text: Vec<char>,
    nodes: Vec<Node>,
}

const ROOT: usize = 0;

impl SuffixTree {
    /// Build the tree from every suffix of `s` and compute subtree counts.
    pub fn build_naive(s: &str) -> Self {
        let mut tree = SuffixTree {
            text: s.chars().collect(),
            nodes: vec![Node::default()],
        };
        for start in 0..tree.text.len() {
            tree.insert_suffix(start);
        }
        tree.preprocess();
        tree
    }

    /// Number of characters (and suffixes) of the indexed text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn insert_suffix(&mut self, start: usize) {
        let n = self.text.len();
        let mut node = ROOT;
        let mut pos = start;

        loop {
            if pos == n {
                self.nodes[node].suffix_start = Some(start);
                return;
            }
            let first = self.text[pos];
            let child = match self.nodes[node].children.get(&first).copied() {
                Some(child) => child,
                None => {
                    let leaf = self.nodes.len();
                    self.nodes.push(Node {
                        label_start: pos,
                        label_end: n,
                        suffix_start: Some(start),
                        ..Node::default()
                    });
                    self.nodes[node].children.insert(first, leaf);
                    return;
                }
            };

            let (label_start, label_len) = {
                let c = &self.nodes[child];
                (c.label_start, c.label_len())
            };
            let mut k = 0;
            while k < label_len && pos + k < n && self.text[label_start + k] == self.text[pos + k] {
                k += 1;
            }

            if k == label_len {
                node = child;
                pos += k;
                continue;
            }

            // Split the edge after the common prefix.
            let split = self.nodes.len();
            let mut split_node = Node {
                label_start,
                label_end: label_start + k,
                ..Node::default()
            };
            split_node.children.insert(self.text[label_start + k], child);
            self.nodes.push(split_node);
            self.nodes[child].label_start = label_start + k;
            self.nodes[node].children.insert(first, split);

            node = split;
            pos += k;
        }
    }

    /// Recompute the number of suffixes below every node.
    pub fn preprocess(&mut self) {
        let mut stack = vec![(ROOT, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                let below: usize = self.nodes[id]
                    .children
                    .values()
                    .map(|&c| self.nodes[c].count)
                    .sum();
                self.nodes[id].count = below + usize::from(self.nodes[id].is_terminal());
            } else {
                stack.push((id, true));
                stack.extend(self.nodes[id].children.values().map(|&c| (c, false)));
            }
        }
    }

    /// Node whose subtree holds every suffix starting with `query`, if any.
    fn locate(&self, query: &str) -> Option<usize> {
        let query: Vec<char> = query.chars().collect();
        let mut node = ROOT;
        let mut i = 0;
        while i < query.len() {
            let child = *self.nodes[node].children.get(&query[i])?;
            let c = &self.nodes[child];
            for &ch in &self.text[c.label_start..c.label_end] {
                if i == query.len() {
                    break;
                }
                if ch != query[i] {
                    return None;
                }
                i += 1;
            }
            node = child;
        }
        Some(node)
    }

    /// Number of occurrences of `query` in the text. The empty query occurs
    /// once per suffix.
    pub fn get_counts(&self, query: &str) -> usize {
        self.locate(query).map_or(0, |node| self.nodes[node].count)
    }

    /// Sorted start offsets (in characters) of every occurrence of `query`.
    pub fn find_all(&self, query: &str) -> Vec<usize> {
        let Some(top) = self.locate(query) else {
            return Vec::new();
        };
        let mut starts = Vec::with_capacity(self.nodes[top].count);
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(start) = node.suffix_start {
                starts.push(start);
            }
            stack.extend(node.children.values().copied());
        }
        starts.sort_unstable();
        starts
    }
}
