// ============================================================================
// MOCKUP GENERATION — remote service hand-off with a local simulation fallback
// ============================================================================
//
// With a generation service registered and an API key set, the final
// composite (designs drawn plainly over the background) is sent to it
// together with the style. Otherwise the local simulation is the result.
//
// The request owns copies of everything it needs, so it can run on a worker
// thread while the editor stays frozen.

use image::RgbaImage;

use crate::components::layers::{DesignTransform, Size};
use crate::error::GenerationError;
use crate::ops::composite::{MockupStyle, RenderMode, compose};

/// A remote generator turning a flattened composite into a finished mockup.
pub trait GenerationService: Send + Sync {
    fn generate(&self, composite: &RgbaImage, style: MockupStyle, api_key: &str) -> Result<RgbaImage, GenerationError>;
}

/// Everything a generation round needs, detached from the editor.
#[derive(Clone)]
pub struct GenerationRequest {
    pub background: RgbaImage,
    pub designs: Vec<RgbaImage>,
    pub transforms: Vec<DesignTransform>,
    pub container: Size,
    pub style: MockupStyle,
    /// Service key. Blank or missing keeps the request local.
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    pub image: RgbaImage,
    /// True when produced by the local simulation rather than a service.
    pub is_simulation: bool,
}

pub fn run_generation(
    request: &GenerationRequest,
    service: Option<&dyn GenerationService>,
) -> Result<GenerationOutcome, GenerationError> {
    let key = request.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let (Some(service), Some(key)) = (service, key) else {
        crate::log_info!(
            "No generation service configured; rendering local {} simulation",
            request.style.key()
        );
        let image = compose(
            &request.background,
            &request.designs,
            &request.transforms,
            request.container,
            RenderMode::Simulation(request.style),
        )?;
        return Ok(GenerationOutcome { image, is_simulation: true });
    };

    let composite = compose(
        &request.background,
        &request.designs,
        &request.transforms,
        request.container,
        RenderMode::Final,
    )?;
    crate::log_info!(
        "Sending {}x{} composite to generation service ({})",
        composite.width(),
        composite.height(),
        request.style.key()
    );
    let image = service.generate(&composite, request.style, key)?;
    Ok(GenerationOutcome { image, is_simulation: false })
}
