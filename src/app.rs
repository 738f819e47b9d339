use crate::components::handles::{HANDLE_RADIUS, LayerBox, ROTATE_HANDLE_OFFSET, hit_test_layers, layer_boxes};
use crate::components::layers::{Point, Size};
use crate::components::tools::{Handle, InteractionController, Modifiers};
use crate::error::GenerationError;
use crate::io::{SaveFormat, encode_and_write, load_rgba};
use crate::ops::composite::MockupStyle;
use crate::ops::generate::{GenerationOutcome, GenerationRequest, GenerationService, run_generation};
use crate::project::{MockupProject, Stage};
use crate::settings::AppSettings;
use eframe::egui;
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];
const ACCENT: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);

// ============================================================================
// ASYNC JOB PIPELINE — background decode / generate / save
// ============================================================================

/// Result delivered from a background job.
pub enum JobResult {
    BackgroundLoaded { image: RgbaImage, path: PathBuf },
    DesignsLoaded(Vec<RgbaImage>),
    LoadFailed(String),
    Generated(Result<GenerationOutcome, GenerationError>),
    SaveComplete(PathBuf),
    SaveFailed(String),
}

pub struct MockupApp {
    project: MockupProject,
    settings: AppSettings,
    style: MockupStyle,
    /// Remote generator. Used only while an API key is configured.
    backend: Option<Arc<dyn GenerationService>>,

    job_sender: mpsc::Sender<JobResult>,
    job_receiver: mpsc::Receiver<JobResult>,
    /// When > 0, a background job is in progress; keep polling.
    pending_jobs: usize,

    background_tex: Option<egui::TextureHandle>,
    /// One texture per design, same order as the project's designs.
    design_tex: Vec<egui::TextureHandle>,
    result_tex: Option<egui::TextureHandle>,

    /// Last non-fatal message (load/save failures, save confirmations).
    status: Option<String>,
    api_key_input: String,
}

impl MockupApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_service(cc, None)
    }

    pub fn with_service(_cc: &eframe::CreationContext<'_>, backend: Option<Arc<dyn GenerationService>>) -> Self {
        let settings = AppSettings::load();
        let (job_sender, job_receiver) = mpsc::channel();
        crate::log_info!(
            "Settings loaded: style={}, display_width={}",
            settings.default_style.key(),
            settings.display_width
        );
        Self {
            project: MockupProject::new(),
            style: settings.default_style,
            api_key_input: settings.api_key.clone(),
            settings,
            backend,
            job_sender,
            job_receiver,
            pending_jobs: 0,
            background_tex: None,
            design_tex: Vec::new(),
            result_tex: None,
            status: None,
        }
    }

    /// Display size of the background in the editor. Layer transforms live
    /// in this space.
    fn container_size(&self) -> Option<Size> {
        let bg = self.project.background()?;
        let width = self.settings.display_width as f64;
        let height = width * bg.height() as f64 / bg.width().max(1) as f64;
        Some(Size::new(width, height))
    }

    // ========================================================================
    // Background jobs
    // ========================================================================

    fn pick_background(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        let sender = self.job_sender.clone();
        self.pending_jobs += 1;
        rayon::spawn(move || match load_rgba(&path) {
            Ok(image) => {
                let _ = sender.send(JobResult::BackgroundLoaded { image, path });
            }
            Err(e) => {
                let _ = sender.send(JobResult::LoadFailed(e.to_string()));
            }
        });
    }

    fn pick_designs(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Image", IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return;
        };
        let sender = self.job_sender.clone();
        self.pending_jobs += 1;
        rayon::spawn(move || {
            let loaded: Result<Vec<_>, _> = paths.iter().map(|p| load_rgba(p)).collect();
            let _ = match loaded {
                Ok(images) => sender.send(JobResult::DesignsLoaded(images)),
                Err(e) => sender.send(JobResult::LoadFailed(e.to_string())),
            };
        });
    }

    fn spawn_generation(&mut self, mut request: GenerationRequest) {
        request.api_key = self.settings.service_key();
        let backend = self.backend.clone();
        let sender = self.job_sender.clone();
        self.pending_jobs += 1;
        rayon::spawn(move || {
            let outcome = run_generation(&request, backend.as_deref());
            let _ = sender.send(JobResult::Generated(outcome));
        });
    }

    fn download_result(&mut self) {
        let Some(outcome) = self.project.result() else { return };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(format!("mockup-{}.png", self.project.last_style().key()))
            .save_file()
        else {
            return;
        };
        let image = outcome.image.clone();
        let quality = self.settings.jpeg_quality;
        let sender = self.job_sender.clone();
        self.pending_jobs += 1;
        rayon::spawn(move || {
            let format = SaveFormat::from_path(&path);
            let _ = match encode_and_write(&image, &path, format, quality) {
                Ok(()) => sender.send(JobResult::SaveComplete(path)),
                Err(e) => sender.send(JobResult::SaveFailed(e.to_string())),
            };
        });
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.job_receiver.try_recv() {
            self.pending_jobs = self.pending_jobs.saturating_sub(1);
            let accepts_uploads = matches!(self.project.stage(), Stage::Upload | Stage::Edit);
            match result {
                JobResult::BackgroundLoaded { image, path } => {
                    if !accepts_uploads {
                        continue;
                    }
                    crate::log_info!(
                        "Background {} loaded ({}x{})",
                        path.display(),
                        image.width(),
                        image.height()
                    );
                    self.background_tex = Some(to_texture(ctx, "background", &image));
                    self.project.set_background(image);
                }
                JobResult::DesignsLoaded(images) => {
                    if !accepts_uploads {
                        continue;
                    }
                    for image in &images {
                        let name = format!("design-{}", self.design_tex.len());
                        self.design_tex.push(to_texture(ctx, &name, image));
                    }
                    crate::log_info!("{} design(s) added", images.len());
                    self.project.add_designs(images);
                }
                JobResult::LoadFailed(msg) => {
                    crate::log_err!("Failed to open image: {}", msg);
                    self.status = Some(msg);
                }
                JobResult::Generated(outcome) => {
                    self.project.finish_generation(outcome);
                    if self.project.stage() == Stage::Result
                        && let Some(outcome) = self.project.result()
                    {
                        self.result_tex = Some(to_texture(ctx, "result", &outcome.image));
                    }
                }
                JobResult::SaveComplete(path) => {
                    self.status = Some(format!("Saved {}", path.display()));
                }
                JobResult::SaveFailed(msg) => {
                    crate::log_err!("Failed to save: {}", msg);
                    self.status = Some(msg);
                }
            }
        }
    }

    fn remove_design(&mut self, index: usize) {
        let before = self.project.designs().len();
        self.project.remove_design(index);
        if self.project.designs().len() < before && index < self.design_tex.len() {
            self.design_tex.remove(index);
        }
    }

    fn start_over(&mut self) {
        self.project.reset();
        self.background_tex = None;
        self.design_tex.clear();
        self.result_tex = None;
        self.status = None;
        self.style = self.settings.default_style;
    }

    fn set_style(&mut self, style: MockupStyle) {
        if style != self.style {
            self.style = style;
            self.settings.default_style = style;
            self.settings.save();
        }
    }

    // ========================================================================
    // Panels
    // ========================================================================

    fn show_upload(&mut self, ui: &mut egui::Ui) {
        ui.heading("Create a product mockup");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Choose product photo…").clicked() {
                self.pick_background();
            }
            if self.project.background().is_some() && ui.button("Clear").clicked() {
                self.project.clear_background();
                self.background_tex = None;
            }
        });
        if let Some(tex) = &self.background_tex {
            ui.add_space(4.0);
            paint_thumbnail(ui, tex, 240.0);
        }

        ui.add_space(12.0);
        if ui.button("Add designs…").clicked() {
            self.pick_designs();
        }
        self.design_list(ui);

        ui.add_space(12.0);
        if ui
            .add_enabled(self.project.can_edit(), egui::Button::new("Place designs →"))
            .clicked()
        {
            self.project.enter_editor();
        }
    }

    fn design_list(&mut self, ui: &mut egui::Ui) {
        let selected = self.project.editor().layers().selected();
        let selectable = self.project.stage() == Stage::Edit;
        let mut remove = None;
        let mut select = None;
        for (i, tex) in self.design_tex.iter().enumerate() {
            ui.horizontal(|ui| {
                paint_thumbnail(ui, tex, 40.0);
                let label = format!("Design {}", i + 1);
                if ui.selectable_label(selected == Some(i), label).clicked() && selectable {
                    select = Some(i);
                }
                if ui.small_button("✕").on_hover_text("Remove design").clicked() {
                    remove = Some(i);
                }
            });
        }
        if let Some(i) = select {
            self.project.editor_mut().select(Some(i));
        }
        if let Some(i) = remove {
            self.remove_design(i);
        }
    }

    fn show_edit_sidebar(&mut self, ui: &mut egui::Ui) {
        let generating = self.project.stage() == Stage::Generating;
        ui.heading("Designs");
        ui.add_enabled_ui(!generating, |ui| {
            if ui.button("Add designs…").clicked() {
                self.pick_designs();
            }
            self.design_list(ui);
        });

        ui.separator();
        ui.label("Style");
        let mut style = self.style;
        ui.add_enabled_ui(!generating, |ui| {
            egui::ComboBox::from_id_source("mockup_style")
                .selected_text(style.name())
                .show_ui(ui, |ui| {
                    for s in MockupStyle::all() {
                        ui.selectable_value(&mut style, *s, s.name());
                    }
                });
        });
        self.set_style(style);

        ui.add_space(8.0);
        if generating {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Generating…");
            });
        } else if ui.button("Generate mockup").clicked()
            && let Some(container) = self.container_size()
            && let Some(request) = self.project.begin_generation(container, self.style)
        {
            self.spawn_generation(request);
        }
        ui.label(
            egui::RichText::new("Drag to move, handles to resize, ⟳ to rotate (Shift snaps 15°).")
                .small()
                .weak(),
        );
        if let Some(err) = self.project.error() {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), err);
        }
    }

    fn show_editor_canvas(&mut self, ui: &mut egui::Ui) {
        let Some(container) = self.container_size() else { return };
        let (response, painter) = ui.allocate_painter(
            egui::vec2(container.width as f32, container.height as f32),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        // Handles may sit just outside the photo, but never past the panel.
        let reach = rect
            .expand((ROTATE_HANDLE_OFFSET + HANDLE_RADIUS) as f32)
            .intersect(ui.clip_rect());
        self.handle_pointer(ui.ctx(), rect, reach, painter.layer_id());

        if let Some(tex) = &self.background_tex {
            painter.image(tex.id(), rect, full_uv(), egui::Color32::WHITE);
        }
        let editor = self.project.editor();
        let show_handles = !editor.is_frozen();
        for layer in layer_boxes(editor.layers()) {
            paint_layer_box(&painter, rect.min, &layer, self.design_tex.get(layer.index), show_handles);
        }
    }

    /// Feed this frame's pointer state into the interaction controller.
    fn handle_pointer(&mut self, ctx: &egui::Context, rect: egui::Rect, reach: egui::Rect, layer: egui::LayerId) {
        let (pos, pressed, down, shift) = ctx.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.modifiers.shift,
            )
        });
        let to_point = |p: egui::Pos2| Point::new((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);
        // Popups and windows above the canvas keep their clicks.
        let on_canvas = |p: egui::Pos2| reach.contains(p) && ctx.layer_id_at(p) == Some(layer);
        let editor = self.project.editor_mut();
        let input = PointerFrame {
            pos: pos.map(to_point),
            pressed_on_canvas: pressed && pos.is_some_and(on_canvas),
            down,
            snap: shift,
        };

        if drive_editor(editor, input) {
            ctx.request_repaint();
        }

        if let Some(session) = editor.session() {
            ctx.set_cursor_icon(cursor_for(session.handle));
        } else if let Some(p) = pos
            && on_canvas(p)
            && let Some((_, handle)) = hit_test_layers(editor.layers(), to_point(p))
        {
            ctx.set_cursor_icon(cursor_for(handle));
        }
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        let is_simulation = self.project.result().is_some_and(|r| r.is_simulation);
        ui.horizontal(|ui| {
            ui.heading(format!("{} mockup", self.project.last_style().name()));
            if is_simulation {
                ui.label(egui::RichText::new("local preview").weak());
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Download").clicked() {
                self.download_result();
            }
            if ui.button("Regenerate").clicked()
                && let Some(request) = self.project.regenerate()
            {
                self.spawn_generation(request);
            }
            if ui.button("Adjust placement").clicked() {
                self.project.adjust_placement();
            }
            if ui.button("Create another").clicked() {
                self.start_over();
            }
        });
        ui.add_space(8.0);
        if let Some(tex) = &self.result_tex {
            egui::ScrollArea::both().show(ui, |ui| {
                paint_thumbnail(ui, tex, self.settings.display_width);
            });
        }
    }

    fn show_credentials_prompt(&mut self, ctx: &egui::Context) {
        if !self.project.needs_credentials() {
            return;
        }
        egui::Window::new("Generation service key")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("The generation service rejected the key. Enter a valid one:");
                ui.add(egui::TextEdit::singleline(&mut self.api_key_input).password(true));
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.settings.api_key = self.api_key_input.trim().to_string();
                        self.settings.save();
                        self.project.acknowledge_credentials();
                    }
                    if ui.button("Cancel").clicked() {
                        self.project.acknowledge_credentials();
                    }
                });
            });
    }
}

impl eframe::App for MockupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_jobs(ctx);
        if self.pending_jobs > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("MockupFE");
                ui.separator();
                ui.label(match self.project.stage() {
                    Stage::Upload => "1. Upload",
                    Stage::Edit => "2. Place designs",
                    Stage::Generating => "3. Generating",
                    Stage::Result => "4. Result",
                });
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(egui::RichText::new(status).weak());
                }
            });
        });

        match self.project.stage() {
            Stage::Upload => {
                egui::CentralPanel::default().show(ctx, |ui| self.show_upload(ui));
            }
            Stage::Edit | Stage::Generating => {
                egui::SidePanel::left("designs_panel")
                    .resizable(false)
                    .default_width(220.0)
                    .show(ctx, |ui| self.show_edit_sidebar(ui));
                egui::CentralPanel::default().show(ctx, |ui| {
                    egui::ScrollArea::both().show(ui, |ui| self.show_editor_canvas(ui));
                });
            }
            Stage::Result => {
                egui::CentralPanel::default().show(ctx, |ui| self.show_result(ui));
            }
        }

        self.show_credentials_prompt(ctx);
    }
}

// ============================================================================
// Painting helpers
// ============================================================================

/// Pointer state for one frame, in container coordinates.
#[derive(Clone, Copy, Debug, Default)]
struct PointerFrame {
    pos: Option<Point>,
    /// Primary button went down this frame over the canvas layer.
    pressed_on_canvas: bool,
    down: bool,
    snap: bool,
}

/// Feed one frame of pointer input to the editor. Returns true when a
/// transform changed.
///
/// A gesture ends only on release. Losing the pointer position while the
/// button is held (dragged outside the window) keeps the session alive.
fn drive_editor(editor: &mut InteractionController, input: PointerFrame) -> bool {
    if input.pressed_on_canvas
        && let Some(p) = input.pos
    {
        editor.pointer_down(p);
    }
    if !editor.is_active() {
        return false;
    }
    if !input.down {
        editor.pointer_up();
        return false;
    }
    match input.pos {
        Some(p) => editor.pointer_move(p, Modifiers { snap: input.snap }),
        None => false,
    }
}

fn to_texture(ctx: &egui::Context, name: &str, image: &RgbaImage) -> egui::TextureHandle {
    let size = [image.width() as usize, image.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    ctx.load_texture(name, color, egui::TextureOptions::LINEAR)
}

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

fn paint_thumbnail(ui: &mut egui::Ui, tex: &egui::TextureHandle, max_width: f32) {
    let [w, h] = tex.size();
    let scale = (max_width / w.max(1) as f32).min(1.0);
    let size = egui::vec2(w as f32 * scale, h as f32 * scale);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().image(tex.id(), rect, full_uv(), egui::Color32::WHITE);
}

fn to_pos(origin: egui::Pos2, p: Point) -> egui::Pos2 {
    origin + egui::vec2(p.x as f32, p.y as f32)
}

/// Draw one layer: the design stretched over its rotated box, the outline,
/// and handles when selected.
fn paint_layer_box(
    painter: &egui::Painter,
    origin: egui::Pos2,
    layer: &LayerBox,
    texture: Option<&egui::TextureHandle>,
    show_handles: bool,
) {
    let (w, h) = (layer.size.width, layer.size.height);
    let corners: Vec<egui::Pos2> = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .into_iter()
        .map(|(x, y)| to_pos(origin, layer.local_to_container(Point::new(x, y))))
        .collect();

    if let Some(tex) = texture {
        let uvs = [
            egui::pos2(0.0, 0.0),
            egui::pos2(1.0, 0.0),
            egui::pos2(1.0, 1.0),
            egui::pos2(0.0, 1.0),
        ];
        let mut mesh = egui::Mesh::with_texture(tex.id());
        for (pos, uv) in corners.iter().zip(uvs) {
            mesh.vertices.push(egui::epaint::Vertex {
                pos: *pos,
                uv,
                color: egui::Color32::WHITE,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        painter.add(egui::Shape::mesh(mesh));
    }

    let outline = if layer.selected {
        egui::Stroke::new(1.5, ACCENT)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_white_alpha(110))
    };
    painter.add(egui::Shape::closed_line(corners, outline));

    if !(layer.selected && show_handles) {
        return;
    }
    let bottom_center = to_pos(origin, layer.local_to_container(Point::new(w / 2.0, h)));
    for hotspot in layer.hotspots() {
        let center = to_pos(origin, layer.local_to_container(hotspot.local_center));
        if hotspot.handle == Handle::Rotate {
            painter.line_segment([bottom_center, center], egui::Stroke::new(1.0, ACCENT));
            painter.circle(center, 6.0, ACCENT, egui::Stroke::new(1.5, egui::Color32::WHITE));
        } else {
            painter.circle(center, 4.5, egui::Color32::WHITE, egui::Stroke::new(1.5, ACCENT));
        }
    }
}

fn cursor_for(handle: Handle) -> egui::CursorIcon {
    match handle {
        Handle::Body => egui::CursorIcon::Move,
        Handle::North | Handle::South => egui::CursorIcon::ResizeVertical,
        Handle::East | Handle::West => egui::CursorIcon::ResizeHorizontal,
        Handle::NorthWest | Handle::SouthEast => egui::CursorIcon::ResizeNwSe,
        Handle::NorthEast | Handle::SouthWest => egui::CursorIcon::ResizeNeSw,
        Handle::Rotate => egui::CursorIcon::Grab,
    }
}
