//! Selection manager: the chosen image and its preview.

use crate::model::ImageFile;
use crate::preview::{Preview, PreviewStore};
use crate::session::AnalysisSession;

/// The file and the preview derived from it. They exist together or not at all.
#[derive(Debug, Clone)]
pub struct SelectedInput {
    pub file: ImageFile,
    pub preview: Preview,
}

#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Option<SelectedInput>,
    previews: PreviewStore,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current file. The old preview is revoked and any previous
    /// verdict or error is dropped; analysis is not started.
    ///
    /// The file is taken as-is; type and size checks belong to the caller
    /// (see [`ImageFile::load`]).
    pub fn select_file(&mut self, file: ImageFile, session: &mut AnalysisSession) {
        self.release_preview();
        let preview = self.previews.create(&file);
        tracing::info!(
            file = file.name(),
            media_type = file.media_type().as_mime(),
            size = file.size(),
            preview = %preview.uri,
            "image selected"
        );
        self.selected = Some(SelectedInput { file, preview });
        session.reset();
    }

    /// Clear the selection and return the session to `Idle`. Idempotent.
    pub fn reset(&mut self, session: &mut AnalysisSession) {
        self.release_preview();
        self.selected = None;
        session.reset();
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.selected.as_ref().map(|s| &s.file)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.selected.as_ref().map(|s| &s.preview)
    }

    #[cfg(test)]
    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    fn release_preview(&mut self) {
        if let Some(current) = self.selected.as_ref() {
            self.previews.revoke(&current.preview.uri);
        }
    }
}
