// src/main.rs
use nannou::image::DynamicImage;
use nannou::prelude::*;
use rand::rngs::ThreadRng;

use paraph::{
    config::Config,
    controllers::{CaptureEvent, CapturePad, OscController, SignatureCommand},
    models::{SignatureMode, SignatureState, SignatureStyle, TemplateBank},
    render::Canvas,
    services::{signature_service, ExportFormat, ExportJob, ExportService},
};

struct Model {
    // Core components:
    bank: TemplateBank,
    style: SignatureStyle,
    canvas: Canvas,
    capture: CapturePad,
    state: SignatureState,
    holder_name: String,

    // Comms components:
    osc_controller: OscController,

    // Rendering components:
    texture: wgpu::Texture,
    random: ThreadRng,

    // Export:
    export: ExportService,
    exit_requested: bool,
}

fn main() {
    nannou::app(model).update(update).run();
}

fn model(app: &App) -> Model {
    // Load config
    let config = Config::load().expect("Failed to load config file");

    // Load the letterform bank; a broken override falls back to the
    // embedded bank instead of aborting.
    let bank = match config.resolve_letterform_path() {
        Some(path) => TemplateBank::load(&path).unwrap_or_else(|err| {
            eprintln!(
                "Failed to load letterform bank {:?}: {}; using the embedded bank",
                path, err
            );
            TemplateBank::embedded()
        }),
        None => TemplateBank::embedded(),
    };
    println!("Loaded {} letterform templates", bank.template_count());

    let style = SignatureStyle::from_config(&config.style).expect("Invalid style configuration");

    // Create OSC controller
    let osc_controller =
        OscController::new(config.osc.rx_port).expect("Failed to create OSC Controller");

    // Create the export worker
    let export = ExportService::new(&config.resolve_output_dir_as_str())
        .expect("Failed to create export service");

    // Create window
    app.new_window()
        .title("paraph 0.1.0")
        .size(config.window.width, config.window.height)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_moved(mouse_moved)
        .mouse_released(mouse_released)
        .mouse_exited(mouse_exited)
        .touch(touch)
        .build()
        .unwrap();

    let mut canvas = Canvas::new(config.canvas.width, config.canvas.height);
    let capture = CapturePad::new(style.capture_line_width, style.ink);
    let state = SignatureState::new(SignatureMode::Auto);
    let holder_name = config.card.holder_name.clone();
    let mut random = rand::thread_rng();

    // First render
    signature_service::display_signature(
        &mut canvas,
        &bank,
        &style,
        &state,
        &holder_name,
        &mut random,
    );

    let texture = upload_canvas(app, &mut canvas);

    Model {
        bank,
        style,
        canvas,
        capture,
        state,
        holder_name,

        osc_controller,

        texture,
        random,

        export,
        exit_requested: false,
    }
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    match key {
        // re-render the synthetic signature
        Key::G => regenerate(model),
        // wipe the pad
        Key::C => model.capture.clear(&mut model.canvas),
        // flip between synthetic and hand-drawn
        Key::M => {
            let next = match model.state.mode() {
                SignatureMode::Auto => SignatureMode::Manual,
                SignatureMode::Manual => SignatureMode::Auto,
            };
            set_mode(model, next);
        }
        Key::E => queue_export(model, ExportFormat::Png),
        Key::P => queue_export(model, ExportFormat::Pdf),
        // Graceful quit that waits for queued exports
        Key::Q => {
            if model.export.has_pending_jobs() {
                println!("Waiting for export jobs to finish...");
            }
            model.export.request_shutdown();
            model.exit_requested = true;
        }
        _ => (),
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    // Process OSC messages
    model.osc_controller.process_messages();
    launch_commands(model);

    // The pad translates device coordinates against the canvas
    // placement, which follows the window size.
    model
        .capture
        .set_surface_origin(canvas_origin(app, &model.canvas));

    // Capture output feeds the stored manual raster
    for event in model.capture.take_events() {
        match event {
            CaptureEvent::Signature(data) => {
                if model.state.mode() == SignatureMode::Manual {
                    println!("Captured manual signature ({} bytes)", data.len());
                    model.state.store_manual(data);
                }
            }
            CaptureEvent::Cleared => model.state.clear_manual(),
        }
    }

    if model.exit_requested && !model.export.has_pending_jobs() {
        app.quit();
        return;
    }

    // Upload the raster when it changed
    if model.canvas.take_dirty() {
        model.texture = upload_canvas(app, &mut model.canvas);
    }
}

// Draw the state of Model into the given Frame
fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(rgb(0.12, 0.12, 0.15));

    let canvas_w = model.canvas.width() as f32;
    let canvas_h = model.canvas.height() as f32;

    // Card backdrop behind the signature area
    draw.rect()
        .x_y(0.0, 0.0)
        .w_h(canvas_w + 16.0, canvas_h + 16.0)
        .color(rgb(0.2, 0.2, 0.24));
    draw.texture(&model.texture).x_y(0.0, 0.0).w_h(canvas_w, canvas_h);

    let mode = match model.state.mode() {
        SignatureMode::Auto => "auto",
        SignatureMode::Manual => "manual",
    };
    draw.text(&format!("{}  [{}]", model.holder_name, mode))
        .x_y(0.0, -(canvas_h / 2.0) - 30.0)
        .color(WHITE);
    draw.text("G generate | C clear | M mode | E png | P pdf | Q quit")
        .x_y(0.0, -(canvas_h / 2.0) - 55.0)
        .color(GRAY);

    draw.to_frame(app, &frame).unwrap();
}

// ******************************* Pointer input *******************************

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.state.mode() != SignatureMode::Manual {
        return;
    }
    let device = to_device(app, app.mouse.position());
    model.capture.pointer_down(&model.canvas, device);
}

fn mouse_moved(app: &App, model: &mut Model, position: Point2) {
    if model.state.mode() != SignatureMode::Manual {
        return;
    }
    let device = to_device(app, position);
    model
        .capture
        .pointer_move(&mut model.canvas, &mut model.random, device);
}

fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }
    model.capture.pointer_up(&model.canvas);
}

fn mouse_exited(_app: &App, model: &mut Model) {
    model.capture.pointer_up(&model.canvas);
}

fn touch(app: &App, model: &mut Model, event: TouchEvent) {
    if model.state.mode() != SignatureMode::Manual {
        return;
    }
    let device = to_device(app, event.position);
    model
        .capture
        .touch(&mut model.canvas, &mut model.random, event.id, event.phase, device);
}

// ******************************* OSC Launcher *******************************

fn launch_commands(model: &mut Model) {
    for command in model.osc_controller.take_commands() {
        match command {
            SignatureCommand::SetName { name } => {
                println!("Card holder: {}", name);
                model.holder_name = name;
                if model.state.mode() == SignatureMode::Auto {
                    regenerate(model);
                }
            }
            SignatureCommand::SetMode { mode } => set_mode(model, mode),
            SignatureCommand::Generate => regenerate(model),
            SignatureCommand::Clear => model.capture.clear(&mut model.canvas),
            SignatureCommand::Export { format } => queue_export(model, format),
        }
    }
}

// ******************************* Helpers *******************************

fn regenerate(model: &mut Model) {
    signature_service::display_signature(
        &mut model.canvas,
        &model.bank,
        &model.style,
        &model.state,
        &model.holder_name,
        &mut model.random,
    );
}

fn set_mode(model: &mut Model, mode: SignatureMode) {
    if !model.state.set_mode(mode) {
        return;
    }
    println!("Signature mode: {:?}", mode);

    // Fully clear the other mode's strokes before this one draws.
    match mode {
        SignatureMode::Manual => model.capture.clear(&mut model.canvas),
        SignatureMode::Auto => regenerate(model),
    }
}

fn queue_export(model: &Model, format: ExportFormat) {
    model.export.export(ExportJob {
        pixels: model.canvas.pixels().to_vec(),
        width: model.canvas.width(),
        height: model.canvas.height(),
        format,
        stem: export_stem(&model.holder_name),
    });
}

fn export_stem(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    if slug.is_empty() {
        "signature".to_string()
    } else {
        format!("signature_{}", slug)
    }
}

fn upload_canvas(app: &App, canvas: &mut Canvas) -> wgpu::Texture {
    let image = canvas
        .to_image()
        .expect("canvas raster buffer is well-formed");
    canvas.take_dirty();
    wgpu::Texture::from_image(app, &DynamicImage::ImageRgba8(image))
}

/// Canvas top-left in device coordinates (window top-left origin, y
/// down). The canvas is drawn centered in the window.
fn canvas_origin(app: &App, canvas: &Canvas) -> Vec2 {
    let win = app.window_rect();
    vec2(
        (win.w() - canvas.width() as f32) / 2.0,
        (win.h() - canvas.height() as f32) / 2.0,
    )
}

/// Window coordinates (center origin, y up) to device coordinates.
fn to_device(app: &App, position: Point2) -> Point2 {
    let win = app.window_rect();
    pt2(position.x + win.w() / 2.0, win.h() / 2.0 - position.y)
}
