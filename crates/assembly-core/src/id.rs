use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node in a production tree. Stable across insertions and
    /// removals of other nodes in the same arena.
    pub struct NodeId;
}
