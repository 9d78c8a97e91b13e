//! Map a server uploads response onto the slot layout.

use serde::Serialize;

use crate::api::logs::log_warning;
use crate::api::types::UploadsData;

use super::layout::{MediaGroup, SlotId, UploadLayout};
use super::slot::RemoteFile;

/// Which kind of record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum DroppedUpload {
    /// `document_type_id` outside `1..=6`.
    Document(u32),
    /// `section_id` in none of the media groups.
    Media(u32),
}

/// Outcome of one hydration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationReport {
    pub documents_placed: usize,
    pub media_placed: usize,
    /// Documents ignored because their slot was already populated.
    pub skipped_occupied: usize,
    pub dropped: Vec<DroppedUpload>,
}

/// Place fetched uploads into `layout`.
///
/// Server-side files from an earlier pass are replaced; local files stay.
/// A document lands in slot `document_type_id - 1` unless that slot already
/// holds something (first write wins). A media item is appended to the slot
/// of its `section_id`. Records with unknown keys are reported, not placed.
pub fn map_uploads_to_state(layout: &mut UploadLayout, data: &UploadsData) -> HydrationReport {
    let mut report = HydrationReport::default();
    layout.drop_remote();

    for doc in &data.documents {
        let Some(slot) = layout.slot_mut(SlotId::Document(doc.document_type_id)) else {
            report.dropped.push(DroppedUpload::Document(doc.document_type_id));
            continue;
        };
        if !slot.is_empty() {
            report.skipped_occupied += 1;
            continue;
        }
        slot.attach_remote(RemoteFile::from_url(&doc.file_url, doc.file_name.as_deref()));
        report.documents_placed += 1;
    }

    for media in &data.media {
        if MediaGroup::for_section(media.section_id).is_none() {
            report.dropped.push(DroppedUpload::Media(media.section_id));
            continue;
        }
        if let Some(slot) = layout.slot_mut(SlotId::Media(media.section_id)) {
            slot.attach_remote(RemoteFile::from_url(&media.file_url, media.file_name.as_deref()));
            report.media_placed += 1;
        }
    }

    for dropped in &report.dropped {
        match dropped {
            DroppedUpload::Document(id) => {
                log_warning(format!("Ignoring document with unknown document_type_id {}", id))
            }
            DroppedUpload::Media(id) => log_warning(format!("Ignoring media with unknown section_id {}", id)),
        }
    }

    report
}
