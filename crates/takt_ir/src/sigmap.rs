//! Signal canonicalisation over a module's connection relation.
//!
//! Two bits carry the same net when the module's explicit connections
//! declare them equal, transitively. [`SigMap`] resolves that equivalence
//! relation to one representative bit per class.
//!
//! The map is frozen at construction: it is built from the connection list
//! as it stands, and wires or connections added to the module afterwards do
//! not perturb it. Bits outside the relation (including every wire created
//! later) map to themselves. Passes that rewrite a module build the map
//! first, mutate the graph, and keep querying the original nets — the
//! answers stay stable.

use crate::module::Module;
use crate::sig::{SigBit, SigSpec};
use std::collections::HashMap;

/// A frozen canonicaliser: maps each signal bit to the deterministic
/// representative of its connected-bits equivalence class.
///
/// The representative is the minimum bit of the class under [`SigBit`]'s
/// ordering, so constants win over wire bits and lower-numbered wires win
/// over higher-numbered ones — the same input always canonicalises the
/// same way across runs.
pub struct SigMap {
    canonical: HashMap<SigBit, SigBit>,
}

impl SigMap {
    /// Builds the canonicaliser from the module's current connections.
    pub fn new(module: &Module) -> Self {
        let mut nodes: Vec<SigBit> = Vec::new();
        let mut index: HashMap<SigBit, usize> = HashMap::new();
        let mut parent: Vec<usize> = Vec::new();

        fn node_of(
            bit: SigBit,
            nodes: &mut Vec<SigBit>,
            index: &mut HashMap<SigBit, usize>,
            parent: &mut Vec<usize>,
        ) -> usize {
            *index.entry(bit).or_insert_with(|| {
                let id = nodes.len();
                nodes.push(bit);
                parent.push(id);
                id
            })
        }

        fn find(parent: &mut [usize], mut node: usize) -> usize {
            while parent[node] != node {
                parent[node] = parent[parent[node]];
                node = parent[node];
            }
            node
        }

        for (lhs, rhs) in &module.connections {
            let width = lhs.width().min(rhs.width());
            for i in 0..width {
                let a = node_of(lhs.bit(i), &mut nodes, &mut index, &mut parent);
                let b = node_of(rhs.bit(i), &mut nodes, &mut index, &mut parent);
                let ra = find(&mut parent, a);
                let rb = find(&mut parent, b);
                if ra != rb {
                    parent[ra] = rb;
                }
            }
        }

        // Resolve each class to its minimum member.
        let mut class_min: HashMap<usize, SigBit> = HashMap::new();
        for node in 0..nodes.len() {
            let root = find(&mut parent, node);
            let bit = nodes[node];
            class_min
                .entry(root)
                .and_modify(|current| {
                    if bit < *current {
                        *current = bit;
                    }
                })
                .or_insert(bit);
        }

        let mut canonical = HashMap::with_capacity(nodes.len());
        for node in 0..nodes.len() {
            let root = find(&mut parent, node);
            canonical.insert(nodes[node], class_min[&root]);
        }

        Self { canonical }
    }

    /// Returns the canonical representative of `bit`.
    pub fn map(&self, bit: SigBit) -> SigBit {
        self.canonical.get(&bit).copied().unwrap_or(bit)
    }

    /// Canonicalises every bit of a signal.
    pub fn map_spec(&self, sig: &SigSpec) -> SigSpec {
        sig.bits().iter().map(|&bit| self.map(bit)).collect()
    }
}
