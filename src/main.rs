// Interactive demo:
// • A synthetic face (it sways and blinks) stands in for the live tracker.
// • Keys 1–5 toggle lips / eyeliner / eyebrow / blush / eyeshadow.
// • D overlays landmark markers. ESC quits.
// • Optional args: a backdrop photo and a preset JSON file.

use std::env;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{info, warn};

use makeup_mirror::Error;
use makeup_mirror::color::GammaLut;
use makeup_mirror::landmark::LandmarkSource;
use makeup_mirror::pipeline::{DRAW_ORDER, FrameOrchestrator};
use makeup_mirror::raster::blend_over_frame;
use makeup_mirror::state::{self, MakeupState};
use makeup_mirror::synth::SyntheticFace;
use makeup_mirror::types::{FrameBuffer, Surface};
use makeup_mirror::window::{Drawer, draw_marker, draw_text_5x7};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Number-row key order: 1 lips, 2 liner, 3 brow, 4 blush, 5 shadow.
const KEY_FEATURES: [makeup_mirror::Feature; 5] = [
    makeup_mirror::Feature::Lips,
    makeup_mirror::Feature::Eyeliner,
    makeup_mirror::Feature::Eyebrow,
    makeup_mirror::Feature::Blush,
    makeup_mirror::Feature::Eyeshadow,
];

fn main() -> Result<(), Error> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let backdrop_path = args.next();
    let preset_path = args.next();

    /* --- Window + base image --- */
    let mut drawer = Drawer::new("Makeup Mirror", WIDTH, HEIGHT)?;
    let backdrop = match backdrop_path.as_deref() {
        Some(path) => load_backdrop(path)?,
        None => studio_backdrop(WIDTH, HEIGHT),
    };

    /* --- Pipeline state --- */
    let mut state = MakeupState::new();
    for feature in DRAW_ORDER {
        state.set_active(feature, true);
    }
    if let Some(path) = preset_path.as_deref() {
        match state::load_presets(Path::new(path)) {
            Ok(presets) => {
                info!("applying {} presets from {path}", presets.len());
                for preset in &presets {
                    state.apply_preset(preset);
                }
            }
            Err(e) => warn!("presets not applied: {e}"),
        }
    }
    let mut orchestrator = FrameOrchestrator::new(state);

    /* --- Frame-local rasters (allocated once, reused) --- */
    let mut screen = FrameBuffer::new(WIDTH, HEIGHT);
    let mut overlay = Surface::new(WIDTH, HEIGHT);
    let lut = GammaLut::new();
    let mut source = SyntheticFace::new();

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");
    let mut last_frame_time = Instant::now();
    let mut show_markers = false;

    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame_time).as_secs_f32();
        last_frame_time = now;
        source.advance(dt);

        /* 1) Inputs: feature toggles + marker overlay */
        if let Some(slot) = drawer.feature_key_pressed() {
            orchestrator.state_mut().toggle(KEY_FEATURES[slot]);
        }
        if drawer.d_pressed_once() {
            show_markers = !show_markers;
        }

        /* 2) One frame of landmarks; idle (keep backdrop) when no face */
        screen.pixels.copy_from_slice(&backdrop.pixels);
        if let Some(face) = source.poll() {
            /* 3) Compose the makeup overlay and merge it down */
            orchestrator.render_frame(&face, &mut overlay);
            blend_over_frame(&mut screen, &overlay, &lut)?;

            if show_markers {
                for idx in 0..478 {
                    if let Some(p) = face.point_px(idx, WIDTH, HEIGHT) {
                        draw_marker(&mut screen, p.x as i32, p.y as i32, 0x0033_FF88);
                    }
                }
            }
        }

        /* 4) HUD: active features + FPS */
        let mut hud = String::new();
        for feature in DRAW_ORDER {
            let tag = if orchestrator.state().is_active(feature) { '*' } else { ' ' };
            hud.push_str(&format!("{}{}{} ", feature_slot(feature) + 1, tag, hud_name(feature)));
        }
        hud.push_str(&format!("| {hud_fps_text}"));
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00FF_FFFF);

        /* 5) Present */
        drawer.present(&screen)?;

        /* 6) FPS counter, once per second */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}

/// Key slot (0-based) for each feature: 1 lips, 2 liner, 3 brow, 4 blush,
/// 5 shadow.
fn feature_slot(feature: makeup_mirror::Feature) -> usize {
    use makeup_mirror::Feature::*;
    match feature {
        Lips => 0,
        Eyeliner => 1,
        Eyebrow => 2,
        Blush => 3,
        Eyeshadow => 4,
    }
}

fn hud_name(feature: makeup_mirror::Feature) -> &'static str {
    use makeup_mirror::Feature::*;
    match feature {
        Lips => "LIPS",
        Eyeliner => "LINER",
        Eyebrow => "BROW",
        Blush => "BLUSH",
        Eyeshadow => "SHADOW",
    }
}

/// Decode a photo and letterbox-resize it to the window raster.
fn load_backdrop(path: &str) -> Result<FrameBuffer, Error> {
    let img = image::open(path).map_err(|e| Error::Window(format!("backdrop: {e}")))?;
    let img = img.resize_to_fill(
        WIDTH as u32,
        HEIGHT as u32,
        image::imageops::FilterType::Triangle,
    );
    let rgb = img.to_rgb8();
    let mut fb = FrameBuffer::new(WIDTH, HEIGHT);
    for (x, y, px) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        if x < WIDTH && y < HEIGHT {
            fb.pixels[y * WIDTH + x] =
                ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32;
        }
    }
    Ok(fb)
}

/// Flat studio backdrop: a soft vertical falloff so the overlay reads
/// against something other than black.
fn studio_backdrop(width: usize, height: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    for y in 0..height {
        let t = y as f32 / height as f32;
        let r = (225.0 - 45.0 * t) as u32;
        let g = (205.0 - 50.0 * t) as u32;
        let b = (190.0 - 55.0 * t) as u32;
        let px = (r << 16) | (g << 8) | b;
        for x in 0..width {
            fb.pixels[y * width + x] = px;
        }
    }
    fb
}
