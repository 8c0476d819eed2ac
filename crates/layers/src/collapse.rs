use std::collections::BTreeSet;

/// Collapsed/expanded flag per group box.
///
/// A group gets its default the first time it is observed: overlay groups
/// start collapsed, base groups expanded. Later observations keep whatever
/// the user chose.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollapseState {
    collapsed: BTreeSet<String>,
    seen: BTreeSet<String>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, group: &str, overlay: bool) {
        if self.seen.insert(group.to_string()) && overlay {
            self.collapsed.insert(group.to_string());
        }
    }

    pub fn is_collapsed(&self, group: &str) -> bool {
        self.collapsed.contains(group)
    }

    /// Returns whether the flag changed.
    pub fn set(&mut self, group: &str, collapsed: bool) -> bool {
        self.seen.insert(group.to_string());
        if collapsed {
            self.collapsed.insert(group.to_string())
        } else {
            self.collapsed.remove(group)
        }
    }

    /// Flips the flag; returns the new value.
    pub fn toggle(&mut self, group: &str) -> bool {
        let collapsed = !self.is_collapsed(group);
        self.set(group, collapsed);
        collapsed
    }
}
