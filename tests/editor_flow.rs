use image::{Rgba, RgbaImage};
use mockupfe::components::handles::LayerBox;
use mockupfe::components::layers::{DesignTransform, Point, Size};
use mockupfe::components::tools::{Handle, Modifiers};
use mockupfe::ops::composite::MockupStyle;
use mockupfe::error::GenerationError;
use mockupfe::ops::generate::{GenerationService, run_generation};
use mockupfe::project::{MockupProject, Stage};
use mockupfe::settings::AppSettings;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn white(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
}

fn project_with_one_design() -> MockupProject {
    let mut p = MockupProject::new();
    p.set_background(white(400, 300));
    p.add_designs(vec![RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]))]);
    assert!(p.enter_editor());
    p
}

fn handle_position(t: &DesignTransform, handle: Handle) -> Point {
    let layer = LayerBox::new(0, t, true);
    let hotspot = layer
        .hotspots()
        .into_iter()
        .find(|h| h.handle == handle)
        .unwrap();
    layer.local_to_container(hotspot.local_center)
}

#[test]
fn move_scale_rotate_then_generate() {
    let mut p = project_with_one_design();
    let editor = p.editor_mut();

    // Move: drag the body 30 right, 10 down.
    assert_eq!(editor.pointer_down(Point::new(100.0, 100.0)), Some((0, Handle::Body)));
    editor.pointer_move(Point::new(130.0, 110.0), Modifiers::default());
    let (_, moved) = editor.pointer_up().unwrap();
    assert_eq!(moved.position, Point::new(80.0, 60.0));

    // Corner: halve the distance to the center.
    let corner = handle_position(&moved, Handle::SouthEast);
    assert_eq!(editor.pointer_down(corner), Some((0, Handle::SouthEast)));
    editor.pointer_move(Point::new(192.5, 172.5), Modifiers::default());
    let (_, scaled) = editor.pointer_up().unwrap();
    assert!(approx(scaled.size.width, 75.0) && approx(scaled.size.height, 75.0));
    assert!(approx(scaled.center().x, 155.0) && approx(scaled.center().y, 135.0));

    // Rotate with snapping: pointer swung from straight below to roughly right.
    let knob = handle_position(&scaled, Handle::Rotate);
    assert_eq!(editor.pointer_down(knob), Some((0, Handle::Rotate)));
    editor.pointer_move(Point::new(205.0, 138.0), Modifiers { snap: true });
    let (_, rotated) = editor.pointer_up().unwrap();
    assert!(approx(rotated.rotation, -90.0));
    assert_eq!(rotated.size, scaled.size);

    // Generate at native scale with the local simulation.
    let request = p
        .begin_generation(Size::new(400.0, 300.0), MockupStyle::Print)
        .unwrap();
    assert_eq!(p.stage(), Stage::Generating);
    assert!(p.editor().is_frozen());
    assert!(p.editor_mut().pointer_down(Point::new(155.0, 135.0)).is_none());

    let outcome = run_generation(&request, None);
    p.finish_generation(outcome);
    assert_eq!(p.stage(), Stage::Result);
    let result = p.result().unwrap();
    assert!(result.is_simulation);
    assert_eq!(result.image.dimensions(), (400, 300));
    assert_eq!(result.image.get_pixel(155, 135)[0], 26);
    assert_eq!(result.image.get_pixel(20, 20)[0], 255);

    // Adjust placement brings the same transform back.
    p.adjust_placement();
    assert_eq!(p.stage(), Stage::Edit);
    assert_eq!(p.editor().transforms(), &[rotated]);
}

#[test]
fn display_space_transforms_scale_to_native_pixels() {
    let mut p = project_with_one_design();
    // Editor shows the 400x300 photo at 200x150; the default box (50,50 150x150)
    // covers native (100,100)-(400,400), clipped at the bottom.
    let request = p
        .begin_generation(Size::new(200.0, 150.0), MockupStyle::Print)
        .unwrap();
    let image = run_generation(&request, None).unwrap().image;
    assert_eq!(image.dimensions(), (400, 300));
    assert_eq!(image.get_pixel(110, 110)[0], 26);
    assert_eq!(image.get_pixel(90, 110)[0], 255);
    assert_eq!(image.get_pixel(390, 290)[0], 26);
}

#[test]
fn pressing_empty_background_clears_selection() {
    let mut p = project_with_one_design();
    let editor = p.editor_mut();
    assert_eq!(editor.layers().selected(), Some(0));
    assert!(editor.pointer_down(Point::new(350.0, 20.0)).is_none());
    assert_eq!(editor.layers().selected(), None);
    assert!(!editor.is_active());
}

/// Stand-in for a remote generator that only accepts one key.
struct KeyedService {
    accepted: &'static str,
}

impl GenerationService for KeyedService {
    fn generate(&self, composite: &RgbaImage, _style: MockupStyle, api_key: &str) -> Result<RgbaImage, GenerationError> {
        if api_key == self.accepted {
            Ok(RgbaImage::from_pixel(composite.width(), composite.height(), Rgba([9, 9, 9, 255])))
        } else {
            Err(GenerationError::classify("API key not valid. Please pass a valid API key."))
        }
    }
}

#[test]
fn configured_key_routes_to_service() {
    let service = KeyedService { accepted: "good" };
    let settings = AppSettings::from_config("api_key= good \n");

    let mut p = project_with_one_design();
    let mut request = p
        .begin_generation(Size::new(400.0, 300.0), MockupStyle::Engrave)
        .unwrap();
    request.api_key = settings.service_key();
    p.finish_generation(run_generation(&request, Some(&service)));

    assert_eq!(p.stage(), Stage::Result);
    let result = p.result().unwrap();
    assert!(!result.is_simulation);
    assert_eq!(result.image.get_pixel(0, 0)[0], 9);
}

#[test]
fn rejected_key_asks_for_credentials_and_keeps_placement() {
    let service = KeyedService { accepted: "good" };
    let settings = AppSettings::from_config("api_key=stale\n");

    let mut p = project_with_one_design();
    let before = p.editor().transforms().to_vec();
    let mut request = p
        .begin_generation(Size::new(400.0, 300.0), MockupStyle::Engrave)
        .unwrap();
    request.api_key = settings.service_key();
    p.finish_generation(run_generation(&request, Some(&service)));

    assert_eq!(p.stage(), Stage::Edit);
    assert!(p.needs_credentials());
    assert!(!p.editor().is_frozen());
    assert_eq!(p.editor().transforms(), before.as_slice());
}
