//! Partition new files into the documents and media upload batches.

use serde::{Deserialize, Serialize};

use super::layout::{MediaGroup, UploadLayout};
use super::slot::LocalFile;

/// Per-file metadata sent in the multipart `meta` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadMeta {
    Document { document_type_id: u32 },
    Media { section_id: u32 },
}

/// Files of one POST with their metadata, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    pub files: Vec<LocalFile>,
    pub meta: Vec<UploadMeta>,
}

impl UploadBatch {
    pub fn push(&mut self, file: LocalFile, meta: UploadMeta) {
        self.files.push(file);
        self.meta.push(meta);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// JSON array for the `meta` form field.
    pub fn meta_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.meta)
    }
}

/// The two POSTs of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub documents: UploadBatch,
    pub media: UploadBatch,
}

impl SubmissionPlan {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.media.is_empty()
    }
}

/// Collect every new local file. Server-side files are never re-sent.
pub fn plan_submission(layout: &UploadLayout) -> SubmissionPlan {
    let mut plan = SubmissionPlan::default();

    for (index, slot) in layout.documents.iter().enumerate() {
        let document_type_id = index as u32 + 1;
        for file in slot.new_files() {
            plan.documents.push(file.clone(), UploadMeta::Document { document_type_id });
        }
    }

    for group in MediaGroup::ALL {
        for (index, slot) in layout.group(group).iter().enumerate() {
            let Some(section_id) = group.section_at(index) else {
                continue;
            };
            for file in slot.new_files() {
                plan.media.push(file.clone(), UploadMeta::Media { section_id });
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::layout::SlotId;
    use crate::upload::slot::RemoteFile;

    fn jpeg(name: &str) -> LocalFile {
        LocalFile::new(name, "image/jpeg", vec![1, 2, 3])
    }

    #[test]
    fn test_plan_assigns_keys_by_position() {
        let mut layout = UploadLayout::new();
        layout.slot_mut(SlotId::Document(2)).unwrap().add(jpeg("licence.jpg")).unwrap();
        layout.slot_mut(SlotId::Media(10)).unwrap().add(jpeg("wide.jpg")).unwrap();
        layout.slot_mut(SlotId::Media(1)).unwrap().add(jpeg("front.jpg")).unwrap();

        let plan = plan_submission(&layout);
        assert_eq!(plan.documents.meta, vec![UploadMeta::Document { document_type_id: 2 }]);
        assert_eq!(
            plan.media.meta,
            vec![UploadMeta::Media { section_id: 1 }, UploadMeta::Media { section_id: 10 }]
        );
        assert_eq!(plan.media.files[1].name, "wide.jpg");
    }

    #[test]
    fn test_remote_files_excluded() {
        let mut layout = UploadLayout::new();
        let slot = layout.slot_mut(SlotId::Document(1)).unwrap();
        slot.attach_remote(RemoteFile::from_url("https://x/form.pdf", None));
        slot.add(jpeg("form-page2.jpg")).unwrap();

        let plan = plan_submission(&layout);
        assert_eq!(plan.documents.len(), 1);
        assert_eq!(plan.documents.files[0].name, "form-page2.jpg");
    }

    #[test]
    fn test_meta_json_shape() {
        let mut batch = UploadBatch::default();
        batch.push(jpeg("a.jpg"), UploadMeta::Document { document_type_id: 4 });
        batch.push(jpeg("b.jpg"), UploadMeta::Media { section_id: 7 });

        let json = batch.meta_json().unwrap();
        assert_eq!(json, r#"[{"document_type_id":4},{"section_id":7}]"#);
    }

    #[test]
    fn test_empty_layout_empty_plan() {
        assert!(plan_submission(&UploadLayout::new()).is_empty());
    }
}
