use image::RgbaImage;

use crate::components::layers::{DesignLayers, DesignTransform, Size};
use crate::components::tools::InteractionController;
use crate::error::GenerationError;
use crate::ops::composite::MockupStyle;
use crate::ops::generate::{GenerationOutcome, GenerationRequest};

/// Where the user is in the upload → edit → generate → result flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Upload,
    Edit,
    Generating,
    Result,
}

/// One mockup being built: the product photo, the design images and the
/// editor that places them.
#[derive(Debug, Default)]
pub struct MockupProject {
    stage: Stage,
    background: Option<RgbaImage>,
    designs: Vec<RgbaImage>,
    editor: InteractionController,

    /// Transforms, container and style of the last generation request, so
    /// "adjust placement" and "regenerate" pick up where it left off.
    last_committed: Option<Vec<DesignTransform>>,
    last_container: Option<Size>,
    last_style: MockupStyle,

    result: Option<GenerationOutcome>,
    /// User-facing message from the last failed generation.
    error: Option<String>,
    needs_credentials: bool,
}

impl MockupProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    pub fn designs(&self) -> &[RgbaImage] {
        &self.designs
    }

    pub fn editor(&self) -> &InteractionController {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut InteractionController {
        &mut self.editor
    }

    pub fn result(&self) -> Option<&GenerationOutcome> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn needs_credentials(&self) -> bool {
        self.needs_credentials
    }

    pub fn acknowledge_credentials(&mut self) {
        self.needs_credentials = false;
    }

    pub fn last_style(&self) -> MockupStyle {
        self.last_style
    }

    fn accepts_uploads(&self) -> bool {
        matches!(self.stage, Stage::Upload | Stage::Edit)
    }

    pub fn set_background(&mut self, image: RgbaImage) {
        if self.accepts_uploads() {
            self.background = Some(image);
        }
    }

    pub fn clear_background(&mut self) {
        if self.stage == Stage::Upload {
            self.background = None;
        }
    }

    /// Append design images; each gets a default cascaded placement.
    pub fn add_designs(&mut self, images: Vec<RgbaImage>) {
        if !self.accepts_uploads() || images.is_empty() {
            return;
        }
        self.editor.add_layers(images.len());
        self.designs.extend(images);
    }

    /// Remove the design image and its transform together.
    pub fn remove_design(&mut self, index: usize) {
        if !self.accepts_uploads() || index >= self.designs.len() {
            return;
        }
        self.designs.remove(index);
        self.editor.remove_layer(index);
        if let Some(last) = self.last_committed.as_mut()
            && index < last.len()
        {
            last.remove(index);
        }
        if self.designs.is_empty() && self.stage == Stage::Edit {
            self.stage = Stage::Upload;
        }
    }

    pub fn can_edit(&self) -> bool {
        self.background.is_some() && !self.designs.is_empty()
    }

    /// Open the editor once a background and at least one design exist.
    pub fn enter_editor(&mut self) -> bool {
        if self.stage != Stage::Upload || !self.can_edit() {
            return false;
        }
        let layers = DesignLayers::initialize(self.designs.len(), Some(self.editor.transforms()));
        self.editor.reset(layers);
        self.stage = Stage::Edit;
        true
    }

    fn request(&self, transforms: Vec<DesignTransform>, container: Size, style: MockupStyle) -> Option<GenerationRequest> {
        Some(GenerationRequest {
            background: self.background.clone()?,
            designs: self.designs.clone(),
            transforms,
            container,
            style,
            api_key: None,
        })
    }

    /// Commit the current placement and freeze the editor. `None` when there
    /// is nothing to generate from.
    pub fn begin_generation(&mut self, container: Size, style: MockupStyle) -> Option<GenerationRequest> {
        if self.stage != Stage::Edit || !self.can_edit() {
            return None;
        }
        let transforms = self.editor.transforms().to_vec();
        let request = self.request(transforms.clone(), container, style)?;
        self.editor.freeze();
        self.last_committed = Some(transforms);
        self.last_container = Some(container);
        self.last_style = style;
        self.error = None;
        self.stage = Stage::Generating;
        Some(request)
    }

    /// Record the generation result. Failures return to the editor with the
    /// placement untouched.
    pub fn finish_generation(&mut self, outcome: Result<GenerationOutcome, GenerationError>) {
        if self.stage != Stage::Generating {
            return;
        }
        match outcome {
            Ok(outcome) => {
                self.result = Some(outcome);
                self.stage = Stage::Result;
            }
            Err(e) => {
                crate::log_err!("Mockup generation failed: {}", e);
                self.error = Some(e.user_message().to_string());
                self.needs_credentials = e.is_credential();
                self.editor.thaw();
                self.stage = Stage::Edit;
            }
        }
    }

    /// Back to the editor with the last committed placement.
    pub fn adjust_placement(&mut self) {
        if self.stage != Stage::Result {
            return;
        }
        let layers = DesignLayers::initialize(self.designs.len(), self.last_committed.as_deref());
        self.editor.reset(layers);
        self.stage = Stage::Edit;
    }

    /// Run again with the last committed placement, container and style.
    pub fn regenerate(&mut self) -> Option<GenerationRequest> {
        if self.stage != Stage::Result {
            return None;
        }
        let transforms = self.last_committed.clone()?;
        let container = self.last_container?;
        let request = self.request(transforms, container, self.last_style)?;
        self.stage = Stage::Generating;
        Some(request)
    }

    /// Start over with nothing uploaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
