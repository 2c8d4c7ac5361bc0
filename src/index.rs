use crate::node::{Kind, Node};

/// Arena of tree nodes addressed by slot id.
#[derive(Clone, Debug, Default)]
pub struct Index {
    deleted_slots: Vec<usize>,
    pub nodes: Vec<Node>,
}

impl Index {
    #[must_use]
    pub fn new() -> Self {
        Index {
            deleted_slots: Vec::new(),
            nodes: Vec::new(),
        }
    }

    // Allocate or reuse a slot of the index.
    pub fn insert(&mut self, mut node: Node) -> usize {
        if let Some(slot_id) = self.deleted_slots.pop() {
            node.slot_id = slot_id;
            self.nodes[slot_id] = node;
            slot_id
        } else {
            let slot_id = self.nodes.len();
            node.slot_id = slot_id;
            self.nodes.push(node);
            slot_id
        }
    }

    // Delete a slot from the index.
    pub fn delete(&mut self, slot_id: usize) {
        self.nodes[slot_id] = Node::default();
        self.deleted_slots.push(slot_id);
    }

    /// Puts `replacement` where `slot_id` was: the parent's child entry (or the
    /// root) points to the replacement, the old slot is freed. Returns the new
    /// slot id and the new root.
    pub fn replace(&mut self, slot_id: usize, replacement: Node, root: usize) -> (usize, usize) {
        let parent = self.nodes[slot_id].parent;
        let new_slot = self.insert(replacement);
        self.nodes[new_slot].parent = parent;
        for child in self.nodes[new_slot].children().to_vec() {
            self.nodes[child].parent = new_slot;
        }

        let mut new_root = root;
        if parent == usize::MAX {
            new_root = new_slot;
        } else if let Kind::Fork(children) = &mut self.nodes[parent].kind {
            for child in children.iter_mut().filter(|child| **child == slot_id) {
                *child = new_slot;
            }
        }
        self.delete(slot_id);
        (new_slot, new_root)
    }

    #[must_use]
    pub fn get(&self, slot_id: usize) -> &Node {
        &self.nodes[slot_id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.deleted_slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
