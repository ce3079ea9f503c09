//! Drill-down tree for the geography hierarchy (region -> state ->
//! wholesaler).
//!
//! The tree is an arena of nodes addressed by index; fetch I/O stays outside.
//! `toggle` returns a command telling the caller what to fetch, tagged with
//! the node's epoch; results arriving with a stale epoch are ignored, which
//! is how a collapse cancels the in-flight fetches of its subtree.

use contracts::kpi::GroupBy;

use super::kpi::filter_state::{FilterDimension, FilterState};
use super::kpi::normalize::KpiCell;

/// Levels of the drill hierarchy, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillLevel {
    Region,
    State,
    Wholesaler,
}

impl DrillLevel {
    /// Next level down; `None` for the leaf level.
    pub fn child(&self) -> Option<DrillLevel> {
        match self {
            DrillLevel::Region => Some(DrillLevel::State),
            DrillLevel::State => Some(DrillLevel::Wholesaler),
            DrillLevel::Wholesaler => None,
        }
    }

    /// Grouping dimension used to fetch rows of this level.
    pub fn group_by(&self) -> GroupBy {
        match self {
            DrillLevel::Region => GroupBy::Region,
            DrillLevel::State => GroupBy::State,
            DrillLevel::Wholesaler => GroupBy::Wholesaler,
        }
    }

    /// Filter dimension that scopes children to a row of this level.
    pub fn dimension(&self) -> FilterDimension {
        match self {
            DrillLevel::Region => FilterDimension::Region,
            DrillLevel::State => FilterDimension::State,
            DrillLevel::Wholesaler => FilterDimension::Wholesaler,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            DrillLevel::Region => 0,
            DrillLevel::State => 1,
            DrillLevel::Wholesaler => 2,
        }
    }
}

/// Expansion state of one drillable row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowState {
    Collapsed,
    Loading,
    Expanded,
    Error(String),
}

pub type NodeId = usize;

/// One row of the drill matrix.
#[derive(Debug, Clone)]
pub struct DrillNode {
    pub level: DrillLevel,
    pub key: String,
    pub display_name: String,
    /// One cell per visible metric column.
    pub cells: Vec<KpiCell>,
    pub state: RowState,
    /// Bumped on every collapse/cancel; fetches carry the epoch they were
    /// issued under and are discarded on mismatch.
    pub epoch: u64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    alive: bool,
}

/// Identifies one fetch issued for one node at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub node: NodeId,
    pub epoch: u64,
}

/// What the caller should do after a toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillCommand {
    /// Fetch the node's children at `child_level`, scoped by the node's key,
    /// and report back with the ticket.
    Fetch {
        ticket: FetchTicket,
        child_level: DrillLevel,
    },
    /// Nothing to fetch: the toggle collapsed the row, cancelled a load, or
    /// hit a leaf.
    Nothing,
}

/// Row data used to populate a level: (key, display name, metric cells).
pub type RowSeed = (String, String, Vec<KpiCell>);

#[derive(Debug, Default)]
pub struct DrillTree {
    nodes: Vec<DrillNode>,
    roots: Vec<NodeId>,
    free: Vec<NodeId>,
}

impl DrillTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole tree with fresh root rows. Used when the dashboard
    /// filters change: every expansion belongs to the old slice and is
    /// dropped.
    pub fn set_roots(&mut self, level: DrillLevel, rows: Vec<RowSeed>) {
        self.nodes.clear();
        self.roots.clear();
        self.free.clear();
        for (key, display_name, cells) in rows {
            let id = self.alloc(DrillNode {
                level,
                key,
                display_name,
                cells,
                state: RowState::Collapsed,
                epoch: 0,
                parent: None,
                children: Vec::new(),
                alive: true,
            });
            self.roots.push(id);
        }
    }

    fn alloc(&mut self, node: DrillNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&DrillNode> {
        self.nodes.get(id).filter(|n| n.alive)
    }

    /// Number of live nodes, roots included.
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    /// Rows in render order: depth-first, children under their parent.
    pub fn visible(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        fn walk(tree: &DrillTree, id: NodeId, out: &mut Vec<NodeId>) {
            out.push(id);
            if let Some(node) = tree.node(id) {
                if node.state == RowState::Expanded {
                    for child in &node.children {
                        walk(tree, *child, out);
                    }
                }
            }
        }
        for root in &self.roots {
            walk(self, *root, &mut out);
        }
        out
    }

    /// User clicked a row. Drives the state machine and tells the caller
    /// whether a child fetch is needed.
    pub fn toggle(&mut self, id: NodeId) -> DrillCommand {
        let Some(node) = self.nodes.get_mut(id).filter(|n| n.alive) else {
            return DrillCommand::Nothing;
        };
        let Some(child_level) = node.level.child() else {
            return DrillCommand::Nothing;
        };

        match node.state {
            RowState::Collapsed | RowState::Error(_) => {
                node.state = RowState::Loading;
                node.epoch += 1;
                DrillCommand::Fetch {
                    ticket: FetchTicket {
                        node: id,
                        epoch: node.epoch,
                    },
                    child_level,
                }
            }
            RowState::Loading => {
                // Cancel: the in-flight fetch's ticket is now stale.
                node.state = RowState::Collapsed;
                node.epoch += 1;
                DrillCommand::Nothing
            }
            RowState::Expanded => {
                self.collapse(id);
                DrillCommand::Nothing
            }
        }
    }

    /// Collapse a row: children are discarded, not cached. A later expand
    /// re-fetches.
    fn collapse(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.discard(child);
        }
        let node = &mut self.nodes[id];
        node.state = RowState::Collapsed;
        node.epoch += 1;
    }

    fn discard(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.discard(child);
        }
        self.nodes[id].alive = false;
        self.free.push(id);
    }

    /// Attach fetched children. Returns `false` (and changes nothing) when
    /// the ticket is stale: the row was collapsed or re-toggled since the
    /// fetch was issued.
    pub fn apply_children(&mut self, ticket: FetchTicket, rows: Vec<RowSeed>) -> bool {
        let Some(node) = self.nodes.get(ticket.node).filter(|n| n.alive) else {
            return false;
        };
        if node.epoch != ticket.epoch || node.state != RowState::Loading {
            log::debug!(
                "discarding stale drill result for '{}' (epoch {} != {})",
                node.key,
                ticket.epoch,
                node.epoch
            );
            return false;
        }
        let child_level = match node.level.child() {
            Some(level) => level,
            None => return false,
        };

        let mut child_ids = Vec::with_capacity(rows.len());
        for (key, display_name, cells) in rows {
            let child = self.alloc(DrillNode {
                level: child_level,
                key,
                display_name,
                cells,
                state: RowState::Collapsed,
                epoch: 0,
                parent: Some(ticket.node),
                children: Vec::new(),
                alive: true,
            });
            child_ids.push(child);
        }
        let node = &mut self.nodes[ticket.node];
        node.children = child_ids;
        node.state = RowState::Expanded;
        true
    }

    /// Record a failed child fetch. Recoverable: toggling again retries.
    pub fn apply_error(&mut self, ticket: FetchTicket, message: String) -> bool {
        let Some(node) = self.nodes.get_mut(ticket.node).filter(|n| n.alive) else {
            return false;
        };
        if node.epoch != ticket.epoch || node.state != RowState::Loading {
            return false;
        }
        node.state = RowState::Error(message);
        true
    }

    /// Filters for fetching children of `id`: the dashboard filters narrowed
    /// by this node's key and every ancestor's key. Only ever narrows.
    pub fn scoped_filters(&self, id: NodeId, base: &FilterState) -> FilterState {
        let mut filters = base.clone();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else { break };
            filters = filters.scoped(node.level.dimension(), &node.key);
            cursor = node.parent;
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(key: &str) -> RowSeed {
        (key.to_string(), key.to_string(), vec![KpiCell::default()])
    }

    fn tree_with_regions() -> DrillTree {
        let mut tree = DrillTree::new();
        tree.set_roots(DrillLevel::Region, vec![seed("NE"), seed("MW")]);
        tree
    }

    fn expand(tree: &mut DrillTree, id: NodeId, rows: Vec<RowSeed>) -> FetchTicket {
        let DrillCommand::Fetch { ticket, .. } = tree.toggle(id) else {
            panic!("expected fetch command");
        };
        assert!(tree.apply_children(ticket, rows));
        ticket
    }

    #[test]
    fn test_expand_flow() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];

        let DrillCommand::Fetch {
            ticket,
            child_level,
        } = tree.toggle(ne)
        else {
            panic!("expected fetch command");
        };
        assert_eq!(child_level, DrillLevel::State);
        assert_eq!(tree.node(ne).unwrap().state, RowState::Loading);

        assert!(tree.apply_children(ticket, vec![seed("NY"), seed("MA")]));
        let node = tree.node(ne).unwrap();
        assert_eq!(node.state, RowState::Expanded);
        assert_eq!(node.children.len(), 2);
        assert_eq!(tree.visible().len(), 4);
    }

    #[test]
    fn test_collapse_discards_children_and_refetches() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];
        expand(&mut tree, ne, vec![seed("NY")]);
        assert_eq!(tree.live_count(), 3);

        // Collapse: children discarded, not cached.
        assert_eq!(tree.toggle(ne), DrillCommand::Nothing);
        assert_eq!(tree.node(ne).unwrap().state, RowState::Collapsed);
        assert_eq!(tree.live_count(), 2);

        // Re-expand issues a fresh fetch.
        assert!(matches!(tree.toggle(ne), DrillCommand::Fetch { .. }));
    }

    #[test]
    fn test_stale_ticket_ignored_after_cancel() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];

        let DrillCommand::Fetch { ticket: old, .. } = tree.toggle(ne) else {
            panic!("expected fetch command");
        };
        // User collapses while the fetch is in flight, then expands again.
        tree.toggle(ne);
        let DrillCommand::Fetch { ticket: new, .. } = tree.toggle(ne) else {
            panic!("expected fetch command");
        };

        // The slow old fetch resolves last; it must not win the slot.
        assert!(!tree.apply_children(old, vec![seed("STALE")]));
        assert!(tree.apply_children(new, vec![seed("NY")]));
        let children = &tree.node(ne).unwrap().children;
        assert_eq!(tree.node(children[0]).unwrap().key, "NY");
    }

    #[test]
    fn test_error_then_retry() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];
        let DrillCommand::Fetch { ticket, .. } = tree.toggle(ne) else {
            panic!("expected fetch command");
        };
        assert!(tree.apply_error(ticket, "boom".to_string()));
        assert_eq!(
            tree.node(ne).unwrap().state,
            RowState::Error("boom".to_string())
        );

        // Toggling an errored row retries.
        assert!(matches!(tree.toggle(ne), DrillCommand::Fetch { .. }));
        assert_eq!(tree.node(ne).unwrap().state, RowState::Loading);
    }

    #[test]
    fn test_leaf_does_not_fetch() {
        let mut tree = DrillTree::new();
        tree.set_roots(DrillLevel::Wholesaler, vec![seed("12345")]);
        let leaf = tree.roots()[0];
        assert_eq!(tree.toggle(leaf), DrillCommand::Nothing);
        assert_eq!(tree.node(leaf).unwrap().state, RowState::Collapsed);
    }

    #[test]
    fn test_sibling_subtrees_independent() {
        let mut tree = tree_with_regions();
        let (ne, mw) = (tree.roots()[0], tree.roots()[1]);
        expand(&mut tree, ne, vec![seed("NY")]);
        let mw_ticket = match tree.toggle(mw) {
            DrillCommand::Fetch { ticket, .. } => ticket,
            other => panic!("expected fetch, got {:?}", other),
        };

        // Collapsing NE does not disturb MW's in-flight fetch.
        tree.toggle(ne);
        assert!(tree.apply_children(mw_ticket, vec![seed("IL")]));
        assert_eq!(tree.node(mw).unwrap().state, RowState::Expanded);
    }

    #[test]
    fn test_arena_slots_reused() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];
        expand(&mut tree, ne, vec![seed("NY"), seed("MA")]);
        let before = tree.live_count();
        tree.toggle(ne); // collapse frees two slots

        expand(&mut tree, ne, vec![seed("NY"), seed("MA")]);
        assert_eq!(tree.live_count(), before);
    }

    #[test]
    fn test_scoped_filters_narrow_down_the_path() {
        let mut tree = tree_with_regions();
        let ne = tree.roots()[0];
        expand(&mut tree, ne, vec![seed("NY")]);
        let ny = tree.node(ne).unwrap().children[0];

        let base = FilterState::default();
        let scoped = tree.scoped_filters(ny, &base);
        assert_eq!(scoped.region, vec!["NE"]);
        assert_eq!(scoped.state, vec!["NY"]);
        assert!(scoped.wholesaler.is_empty());
    }
}
