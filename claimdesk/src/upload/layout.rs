//! Fixed slot layout of the upload wizard.
//!
//! Documents are positional: the slot at index `i` carries
//! `document_type_id = i + 1`. Media photos are split into three groups with
//! disjoint `section_id` sets; a slot's position in its group is the position
//! of its section id in the group's list.

use serde::Serialize;

use super::slot::UploadSlot;

/// Document slots in `document_type_id` order.
pub const DOCUMENT_TYPES: [&str; 6] = [
    "Claim Form",
    "Driving License",
    "Registration Certificate",
    "Insurance Policy",
    "Repair Estimate",
    "Police Report",
];

/// Leading document slots the customer must fill when the gate is enabled.
pub const REQUIRED_DOCUMENTS: usize = 3;

const TOP_SECTIONS: [(u32, &str); 4] = [
    (1, "Front View"),
    (2, "Rear View"),
    (3, "Left Side View"),
    (4, "Right Side View"),
];

const LEFT_SECTIONS: [(u32, &str); 4] = [
    (5, "Odometer"),
    (6, "Chassis Number"),
    (7, "Engine Compartment"),
    (8, "Dashboard"),
];

const RIGHT_SECTIONS: [(u32, &str); 4] = [
    (9, "Damage Close-up"),
    (10, "Damage Wide Angle"),
    (11, "Underbody"),
    (12, "Interior"),
];

// =============================================================================
// Media Groups
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaGroup {
    Top,
    Left,
    Right,
}

impl MediaGroup {
    pub const ALL: [MediaGroup; 3] = [MediaGroup::Top, MediaGroup::Left, MediaGroup::Right];

    fn sections(&self) -> &'static [(u32, &'static str)] {
        match self {
            MediaGroup::Top => &TOP_SECTIONS,
            MediaGroup::Left => &LEFT_SECTIONS,
            MediaGroup::Right => &RIGHT_SECTIONS,
        }
    }

    pub fn section_ids(&self) -> impl Iterator<Item = u32> {
        self.sections().iter().map(|(id, _)| *id)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.sections().iter().map(|(_, label)| *label)
    }

    /// `section_id` of the slot at `index` in this group.
    pub fn section_at(&self, index: usize) -> Option<u32> {
        self.sections().get(index).map(|(id, _)| *id)
    }

    /// Group and in-group index holding `section_id`.
    pub fn for_section(section_id: u32) -> Option<(MediaGroup, usize)> {
        Self::ALL.into_iter().find_map(|group| {
            group
                .section_ids()
                .position(|id| id == section_id)
                .map(|index| (group, index))
        })
    }
}

/// Address of one slot in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    /// By `document_type_id` (1-based).
    Document(u32),
    /// By `section_id`.
    Media(u32),
}

// =============================================================================
// Layout
// =============================================================================

/// Every slot of the upload wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadLayout {
    pub documents: Vec<UploadSlot>,
    pub top: Vec<UploadSlot>,
    pub left: Vec<UploadSlot>,
    pub right: Vec<UploadSlot>,
}

impl Default for UploadLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadLayout {
    pub fn new() -> Self {
        let documents = DOCUMENT_TYPES
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let slot = UploadSlot::new(*label);
                if i < REQUIRED_DOCUMENTS {
                    slot.required()
                } else {
                    slot
                }
            })
            .collect();

        let group = |g: MediaGroup| -> Vec<UploadSlot> { g.labels().map(UploadSlot::new).collect() };

        Self {
            documents,
            top: group(MediaGroup::Top),
            left: group(MediaGroup::Left),
            right: group(MediaGroup::Right),
        }
    }

    pub fn group(&self, group: MediaGroup) -> &[UploadSlot] {
        match group {
            MediaGroup::Top => &self.top,
            MediaGroup::Left => &self.left,
            MediaGroup::Right => &self.right,
        }
    }

    pub fn group_mut(&mut self, group: MediaGroup) -> &mut Vec<UploadSlot> {
        match group {
            MediaGroup::Top => &mut self.top,
            MediaGroup::Left => &mut self.left,
            MediaGroup::Right => &mut self.right,
        }
    }

    pub fn slot(&self, id: SlotId) -> Option<&UploadSlot> {
        match id {
            SlotId::Document(type_id) => {
                let index = (type_id as usize).checked_sub(1)?;
                self.documents.get(index)
            }
            SlotId::Media(section_id) => {
                let (group, index) = MediaGroup::for_section(section_id)?;
                self.group(group).get(index)
            }
        }
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut UploadSlot> {
        match id {
            SlotId::Document(type_id) => {
                let index = (type_id as usize).checked_sub(1)?;
                self.documents.get_mut(index)
            }
            SlotId::Media(section_id) => {
                let (group, index) = MediaGroup::for_section(section_id)?;
                self.group_mut(group).get_mut(index)
            }
        }
    }

    /// Required document slots that are still empty.
    pub fn missing_required(&self) -> impl Iterator<Item = &UploadSlot> {
        self.documents.iter().filter(|s| s.required && s.is_empty())
    }

    /// Number of items across every slot.
    pub fn item_count(&self) -> usize {
        self.slots().map(|s| s.items().len()).sum()
    }

    pub fn slots(&self) -> impl Iterator<Item = &UploadSlot> {
        self.documents
            .iter()
            .chain(self.top.iter())
            .chain(self.left.iter())
            .chain(self.right.iter())
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut UploadSlot> {
        self.documents
            .iter_mut()
            .chain(self.top.iter_mut())
            .chain(self.left.iter_mut())
            .chain(self.right.iter_mut())
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots_mut().for_each(UploadSlot::clear);
    }

    /// Remove every server-side file, keeping files picked locally.
    pub fn drop_remote(&mut self) {
        self.slots_mut().for_each(UploadSlot::drop_remote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::slot::LocalFile;

    #[test]
    fn test_groups_are_disjoint() {
        let mut seen = Vec::new();
        for group in MediaGroup::ALL {
            for id in group.section_ids() {
                assert!(!seen.contains(&id), "section {id} in two groups");
                seen.push(id);
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_for_section() {
        assert_eq!(MediaGroup::for_section(1), Some((MediaGroup::Top, 0)));
        assert_eq!(MediaGroup::for_section(7), Some((MediaGroup::Left, 2)));
        assert_eq!(MediaGroup::for_section(12), Some((MediaGroup::Right, 3)));
        assert_eq!(MediaGroup::for_section(0), None);
        assert_eq!(MediaGroup::for_section(13), None);
    }

    #[test]
    fn test_document_slot_by_type_id() {
        let layout = UploadLayout::new();
        assert_eq!(layout.slot(SlotId::Document(3)).unwrap().label, "Registration Certificate");
        assert!(layout.slot(SlotId::Document(0)).is_none());
        assert!(layout.slot(SlotId::Document(7)).is_none());
    }

    #[test]
    fn test_required_documents() {
        let mut layout = UploadLayout::new();
        assert_eq!(layout.missing_required().count(), 3);

        let slot = layout.slot_mut(SlotId::Document(1)).unwrap();
        slot.add(LocalFile::new("form.pdf", "application/pdf", vec![1])).unwrap();
        let missing: Vec<_> = layout.missing_required().map(|s| s.label.as_str()).collect();
        assert_eq!(missing, vec!["Driving License", "Registration Certificate"]);
    }

    #[test]
    fn test_clear() {
        let mut layout = UploadLayout::new();
        layout
            .slot_mut(SlotId::Media(9))
            .unwrap()
            .add(LocalFile::new("dent.jpg", "image/jpeg", vec![1]))
            .unwrap();
        assert_eq!(layout.item_count(), 1);

        layout.clear();
        assert_eq!(layout.item_count(), 0);
    }
}
