use std::cmp::Ordering;

use tracing::debug;

use crate::layer::{GroupInfo, LayerHandle, LayerRecord};
use crate::options::{ControlOptions, SortFunction};

/// One derived group: records sharing a group name, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub info: &'a GroupInfo,
    pub records: Vec<&'a LayerRecord>,
}

/// Flat list of layer records, kept sorted.
///
/// Ordering contract (recomputed on every insert, stable):
/// - group name through the sort function when `sort_groups`, otherwise
///   group first-seen order;
/// - base layers before overlays;
/// - layer name through the sort function for overlays when `sort_layers`
///   and for base layers when `sort_base_layers`;
/// - insertion order.
///
/// The registry does not enforce exclusivity; that is the controller's job.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    records: Vec<LayerRecord>,
    group_list: Vec<String>,
    next_order: u64,
    exclusive_groups: Vec<String>,
    sort_layers: bool,
    sort_groups: bool,
    sort_base_layers: bool,
    sort_function: SortFunction,
}

impl LayerRegistry {
    pub fn new(options: &ControlOptions) -> Self {
        Self {
            records: Vec::new(),
            group_list: Vec::new(),
            next_order: 0,
            exclusive_groups: options.exclusive_groups.clone(),
            sort_layers: options.sort_layers,
            sort_groups: options.sort_groups,
            sort_base_layers: options.sort_base_layers,
            sort_function: options.sort_function,
        }
    }

    /// Registers `handle`. Re-adding a known handle replaces its record.
    pub fn add_layer(&mut self, handle: LayerHandle, name: &str, group: &str, overlay: bool) {
        if self.remove_layer(handle).is_some() {
            debug!(%handle, name, "layer re-registered");
        }
        let id = match self.group_list.iter().position(|g| g == group) {
            Some(id) => id as u32,
            None => {
                self.group_list.push(group.to_string());
                (self.group_list.len() - 1) as u32
            }
        };
        let exclusive = self.exclusive_groups.iter().any(|g| g == group);
        self.records.push(LayerRecord {
            handle,
            name: name.to_string(),
            group: GroupInfo {
                name: group.to_string(),
                id,
                exclusive,
            },
            overlay,
            order: self.next_order,
        });
        self.next_order += 1;
        self.sort();
    }

    pub fn remove_layer(&mut self, handle: LayerHandle) -> Option<LayerRecord> {
        let pos = self.records.iter().position(|r| r.handle == handle)?;
        Some(self.records.remove(pos))
    }

    pub fn find(&self, handle: LayerHandle) -> Option<&LayerRecord> {
        self.records.iter().find(|r| r.handle == handle)
    }

    /// First record (in registry order) with `name` in the given section.
    pub fn find_by_name(&self, name: &str, overlay: bool) -> Option<&LayerRecord> {
        self.records
            .iter()
            .find(|r| r.overlay == overlay && r.name == name)
    }

    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a LayerRecord> + 'a {
        self.records.iter().filter(move |r| r.group.name == group)
    }

    /// Handles sharing `record`'s radio group, `record` excluded.
    pub fn radio_siblings(&self, record: &LayerRecord) -> Vec<LayerHandle> {
        let Some(radio) = record.radio_group() else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|r| r.handle != record.handle && r.radio_group() == Some(radio))
            .map(|r| r.handle)
            .collect()
    }

    /// Groups in order of their first record.
    pub fn groups_of(&self) -> Vec<Group<'_>> {
        let mut groups: Vec<Group<'_>> = Vec::new();
        for record in &self.records {
            match groups.iter_mut().find(|g| g.info.id == record.group.id) {
                Some(group) => group.records.push(record),
                None => groups.push(Group {
                    info: &record.group,
                    records: vec![record],
                }),
            }
        }
        groups
    }

    fn sort(&mut self) {
        let by = self.sort_function;
        let (sort_groups, sort_layers, sort_base) =
            (self.sort_groups, self.sort_layers, self.sort_base_layers);
        self.records.sort_by(|a, b| {
            let group = if sort_groups {
                by(&a.group.name, &b.group.name)
            } else {
                a.group.id.cmp(&b.group.id)
            };
            group
                .then_with(|| a.overlay.cmp(&b.overlay))
                .then_with(|| {
                    let by_name = if a.overlay { sort_layers } else { sort_base };
                    if by_name { by(&a.name, &b.name) } else { Ordering::Equal }
                })
                .then(a.order.cmp(&b.order))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::LayerRegistry;
    use crate::layer::{LayerHandle, RadioGroup};
    use crate::options::ControlOptions;
    use foundation::handles::Handle;
    use pretty_assertions::assert_eq;

    fn h(i: u32) -> LayerHandle {
        LayerHandle(Handle::new(i, 0))
    }

    fn names(r: &LayerRegistry) -> Vec<&str> {
        r.records().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn composite_sort_order() {
        let mut r = LayerRegistry::new(&ControlOptions::default());
        r.add_layer(h(0), "Surface", "", false);
        r.add_layer(h(1), "Shrines", "Locations", true);
        r.add_layer(h(2), "Sky", "", false);
        r.add_layer(h(3), "Caves", "Locations", true);
        r.add_layer(h(4), "Koroks", "Collectibles", true);
        // Bases keep insertion order; overlays sort by name within group.
        assert_eq!(names(&r), vec!["Surface", "Sky", "Koroks", "Caves", "Shrines"]);
    }

    #[test]
    fn equal_names_keep_insertion_order() {
        let mut r = LayerRegistry::new(&ControlOptions::default());
        r.add_layer(h(7), "Same", "G", true);
        r.add_layer(h(3), "Same", "G", true);
        r.add_layer(h(5), "Same", "G", true);
        let handles: Vec<_> = r.records().iter().map(|r| r.handle).collect();
        assert_eq!(handles, vec![h(7), h(3), h(5)]);
    }

    #[test]
    fn unsorted_groups_follow_first_sight() {
        let opts = ControlOptions {
            sort_groups: false,
            sort_layers: false,
            ..ControlOptions::default()
        };
        let mut r = LayerRegistry::new(&opts);
        r.add_layer(h(0), "b", "Zeta", true);
        r.add_layer(h(1), "a", "Alpha", true);
        r.add_layer(h(2), "c", "Zeta", true);
        assert_eq!(names(&r), vec!["b", "c", "a"]);
        assert_eq!(r.find(h(1)).map(|r| r.group.id), Some(1));
    }

    #[test]
    fn remove_and_find() {
        let mut r = LayerRegistry::new(&ControlOptions::default());
        r.add_layer(h(0), "A", "G", true);
        r.add_layer(h(1), "B", "G", true);
        assert_eq!(r.remove_layer(h(0)).map(|r| r.name), Some("A".to_string()));
        assert!(r.find(h(0)).is_none());
        assert!(r.remove_layer(h(0)).is_none());
        assert_eq!(r.find_by_name("B", true).map(|r| r.handle), Some(h(1)));
        assert!(r.find_by_name("B", false).is_none());
    }

    #[test]
    fn radio_groups_and_siblings() {
        let opts = ControlOptions {
            exclusive_groups: vec!["Regions".to_string()],
            ..ControlOptions::default()
        };
        let mut r = LayerRegistry::new(&opts);
        r.add_layer(h(0), "Sky", "", false);
        r.add_layer(h(1), "Surface", "", false);
        r.add_layer(h(2), "North", "Regions", true);
        r.add_layer(h(3), "South", "Regions", true);
        r.add_layer(h(4), "Shrines", "Locations", true);

        let sky = r.find(h(0)).unwrap();
        assert_eq!(sky.radio_group(), Some(RadioGroup::GlobalBase));
        assert_eq!(r.radio_siblings(sky), vec![h(1)]);
        let north = r.find(h(2)).unwrap();
        assert!(north.group.exclusive);
        assert_eq!(r.radio_siblings(north), vec![h(3)]);
        let shrines = r.find(h(4)).unwrap();
        assert!(!shrines.is_radio());
        assert!(r.radio_siblings(shrines).is_empty());
    }

    #[test]
    fn groups_derived_in_registry_order() {
        let mut r = LayerRegistry::new(&ControlOptions::default());
        r.add_layer(h(0), "Shrines", "Locations", true);
        r.add_layer(h(1), "Koroks", "Collectibles", true);
        r.add_layer(h(2), "Caves", "Locations", true);
        let groups = r.groups_of();
        let summary: Vec<(&str, usize)> = groups
            .iter()
            .map(|g| (g.info.name.as_str(), g.records.len()))
            .collect();
        assert_eq!(summary, vec![("Collectibles", 1), ("Locations", 2)]);
        assert_eq!(groups[1].records[0].name, "Caves");
    }
}
