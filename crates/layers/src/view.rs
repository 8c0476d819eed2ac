//! Render model of the control, free of any DOM.

use crate::collapse::CollapseState;
use crate::host::LayerHost;
use crate::layer::{GroupCheckState, LayerHandle, LayerRecord, RadioGroup};
use crate::options::ControlOptions;
use crate::registry::LayerRegistry;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    Radio(RadioGroup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub layer: LayerHandle,
    pub name: String,
    pub input: InputKind,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub name: String,
    pub id: u32,
    /// Present only when the group shows a checkbox.
    pub check: Option<GroupCheckState>,
    pub collapsable: bool,
    pub collapsed: bool,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEntry {
    Item(ItemView),
    Group(GroupView),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlView {
    pub base: Vec<SectionEntry>,
    pub overlays: Vec<SectionEntry>,
    pub base_visible: bool,
    pub separator_visible: bool,
}

/// Whether `record`'s group box carries a tri-state checkbox.
pub fn has_group_checkbox(record: &LayerRecord, options: &ControlOptions) -> bool {
    options.group_checkboxes
        && record.overlay
        && !record.group.exclusive
        && !record.group.name.is_empty()
}

/// Tri-state of every checkbox group, in registry order.
pub fn group_check_states(
    registry: &LayerRegistry,
    host: &dyn LayerHost,
    options: &ControlOptions,
) -> Vec<(String, GroupCheckState)> {
    registry
        .groups_of()
        .into_iter()
        .filter(|g| g.records.first().is_some_and(|r| has_group_checkbox(r, options)))
        .map(|g| {
            let checked = g.records.iter().filter(|r| host.has_layer(r.handle)).count();
            (
                g.info.name.clone(),
                GroupCheckState::from_counts(checked, g.records.len()),
            )
        })
        .collect()
}

pub fn build(
    registry: &LayerRegistry,
    host: &dyn LayerHost,
    collapse: &CollapseState,
    options: &ControlOptions,
) -> ControlView {
    let mut view = ControlView::default();
    let mut base_count = 0;
    let checks = group_check_states(registry, host, options);

    for record in registry.records() {
        if !record.overlay {
            base_count += 1;
        }
        let item = ItemView {
            layer: record.handle,
            name: record.name.clone(),
            input: match record.radio_group() {
                Some(radio) => InputKind::Radio(radio),
                None => InputKind::Checkbox,
            },
            checked: host.has_layer(record.handle),
        };
        let section = if record.overlay {
            &mut view.overlays
        } else {
            &mut view.base
        };
        if !record.in_group_box() {
            section.push(SectionEntry::Item(item));
            continue;
        }
        let existing = section
            .iter()
            .position(|e| matches!(e, SectionEntry::Group(g) if g.id == record.group.id));
        match existing {
            Some(i) => {
                if let SectionEntry::Group(group) = &mut section[i] {
                    group.items.push(item);
                }
            }
            None => section.push(SectionEntry::Group(GroupView {
                name: record.group.name.clone(),
                id: record.group.id,
                check: checks
                    .iter()
                    .find(|(name, _)| *name == record.group.name)
                    .filter(|_| has_group_checkbox(record, options))
                    .map(|(_, state)| *state),
                collapsable: options.groups_collapsable,
                collapsed: options.groups_collapsable && collapse.is_collapsed(&record.group.name),
                items: vec![item],
            })),
        }
    }

    let overlays_present = !view.overlays.is_empty();
    view.base_visible = base_count > 0 && !(options.hide_single_base && base_count == 1);
    view.separator_visible = overlays_present && view.base_visible;
    view
}
