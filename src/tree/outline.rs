use super::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub node: Node,
    pub depth: usize,
    pub expanded: bool,
}

/// A tree flattened into visible rows, with one selected row.
#[derive(Debug, Default)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
    selected: usize,
    pub loading: bool,
}

impl Outline {
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&OutlineEntry> {
        self.entries.get(self.selected)
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected().map(|e| &e.node)
    }

    /// Replace everything. The selection stays on the same row when possible.
    pub fn set_roots(&mut self, nodes: Vec<Node>) {
        self.entries = nodes
            .into_iter()
            .map(|node| OutlineEntry {
                node,
                depth: 0,
                expanded: false,
            })
            .collect();
        self.clamp();
        self.loading = false;
    }

    /// Show `children` under the selected row.
    pub fn expand_selected(&mut self, children: Vec<Node>) {
        let index = self.selected;
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        if entry.expanded {
            return;
        }
        entry.expanded = true;
        let depth = entry.depth + 1;
        let rows = children.into_iter().map(|node| OutlineEntry {
            node,
            depth,
            expanded: false,
        });
        self.entries.splice(index + 1..index + 1, rows);
    }

    /// Hide the selected row's descendants. On a collapsed row, jump to its parent.
    pub fn collapse_selected(&mut self) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        let depth = entry.depth;
        if !entry.expanded {
            if let Some(parent) = self.entries[..self.selected]
                .iter()
                .rposition(|e| e.depth < depth)
            {
                self.selected = parent;
            }
            return;
        }

        let start = self.selected + 1;
        let end = self.entries[start..]
            .iter()
            .position(|e| e.depth <= depth)
            .map_or(self.entries.len(), |offset| start + offset);
        self.entries.drain(start..end);
        self.entries[self.selected].expanded = false;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp(&mut self) {
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
    }
}
