use foundation::handles::Handle;

/// Opaque map layer handle. The map owns the layer; the control only refers
/// to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(pub Handle);

impl std::fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0.index())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Empty for ungrouped base layers.
    pub name: String,
    /// Stable index in first-seen order.
    pub id: u32,
    pub exclusive: bool,
}

/// Radio button set a layer's input belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RadioGroup {
    /// Members of an exclusive overlay group.
    Exclusive(u32),
    /// Base layers sharing a named group.
    Base(u32),
    /// Ungrouped base layers.
    GlobalBase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub handle: LayerHandle,
    pub name: String,
    pub group: GroupInfo,
    pub overlay: bool,
    /// Insertion sequence; final sort tie-breaker.
    pub order: u64,
}

impl LayerRecord {
    /// `None` for checkbox inputs.
    pub fn radio_group(&self) -> Option<RadioGroup> {
        if self.overlay {
            self.group
                .exclusive
                .then_some(RadioGroup::Exclusive(self.group.id))
        } else if self.group.name.is_empty() {
            Some(RadioGroup::GlobalBase)
        } else {
            Some(RadioGroup::Base(self.group.id))
        }
    }

    pub fn is_radio(&self) -> bool {
        self.radio_group().is_some()
    }

    /// Whether the record renders inside a named group box. Ungrouped base
    /// layers sit directly in the base section.
    pub fn in_group_box(&self) -> bool {
        self.overlay || !self.group.name.is_empty()
    }
}

/// Group checkbox state summarizing its members.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GroupCheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl GroupCheckState {
    pub fn from_counts(checked: usize, total: usize) -> Self {
        if checked == total {
            GroupCheckState::Checked
        } else if checked == 0 {
            GroupCheckState::Unchecked
        } else {
            GroupCheckState::Indeterminate
        }
    }
}
