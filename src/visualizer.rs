use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use image::{Rgb, RgbImage};
use minifb::{Key, Window, WindowOptions};
use tracing::{info, warn};

use crate::catalog::Module;
use crate::error::LabResult;
use crate::session::Session;
use crate::spiral::{CanvasSize, Point, generate_spiral};
use crate::state::SimulationState;
use crate::stats::{Stats, format_grouped};

pub const WIDTH: usize = 600;
pub const HEIGHT: usize = 600;

const BACKGROUND: u32 = 0x020617;
const GRID: u32 = 0x0b1324;
const GRID_SPACING: usize = 40;
const TEXT: u32 = 0x64748b;

pub fn canvas() -> CanvasSize {
    CanvasSize::new(WIDTH as f64, HEIGHT as f64)
}

// Simple 3x5 pixel font
fn glyph(ch: char) -> [u8; 5] {
    match ch.to_ascii_lowercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '*' => [0b000, 0b101, 0b010, 0b101, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '^' => [0b010, 0b101, 0b000, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'n' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'o' | 'ω' | 'Ω' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'w' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        _ => [0; 5],
    }
}

fn put(buffer: &mut [u32], x: i64, y: i64, color: u32) {
    if x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT {
        buffer[y as usize * WIDTH + x as usize] = color;
    }
}

fn draw_char(buffer: &mut [u32], x: usize, y: usize, ch: char, color: u32) {
    for (dy, &row) in glyph(ch).iter().enumerate() {
        for dx in 0..3 {
            if row & (1 << (2 - dx)) != 0 {
                put(buffer, (x + dx) as i64, (y + dy) as i64, color);
            }
        }
    }
}

fn draw_text(buffer: &mut [u32], x: usize, y: usize, text: &str, color: u32) {
    let mut offset_x = x;
    for ch in text.chars() {
        if offset_x + 4 >= WIDTH {
            break;
        }
        draw_char(buffer, offset_x, y, ch, color);
        offset_x += 4;
    }
}

fn draw_grid(buffer: &mut [u32]) {
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if x % GRID_SPACING == 0 || y % GRID_SPACING == 0 {
                buffer[y * WIDTH + x] = GRID;
            }
        }
    }
}

/// Bresenham segment; pixels outside the canvas are dropped.
fn draw_line(buffer: &mut [u32], from: Point, to: Point, color: u32) {
    let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
    let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(buffer, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_disc(buffer: &mut [u32], center: Point, radius: i64, color: u32) {
    let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(buffer, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Build one frame: grid, spiral polyline, center dot, overlay text.
/// `pulse` sizes the center dot so the window can animate it.
pub fn rasterize(state: &SimulationState, module: &Module, pulse: u32) -> Vec<u32> {
    let mut buffer = vec![BACKGROUND; WIDTH * HEIGHT];
    draw_grid(&mut buffer);

    let points = generate_spiral(state, module, canvas());
    for pair in points.windows(2) {
        draw_line(&mut buffer, pair[0], pair[1], module.color);
    }

    draw_disc(&mut buffer, canvas().center(), 3 + (pulse % 3) as i64, module.color);

    let stats = Stats::derive(state, module);
    draw_text(&mut buffer, 10, 10, module.name(), module.color);
    draw_text(&mut buffer, 10, 25, &format!("pn: {}", format_grouped(stats.perfect_number)), TEXT);
    draw_text(&mut buffer, 10, 40, &format!("mersenne p: 2^{}-1", stats.mersenne_exponent), TEXT);
    draw_text(&mut buffer, 10, 55, &format!("entropy: {:.3}", stats.entropy), TEXT);
    draw_text(&mut buffer, 10, 70, &format!("resonance: {:.1} hz", stats.resonance_hz), TEXT);
    draw_text(&mut buffer, 440, 575, "r = phi * theta * (1 + 0.1 sin(s))", TEXT);
    draw_text(&mut buffer, 440, 585, &format!("p_num: {}", stats.perfect_number), TEXT);

    buffer
}

/// Write the frame for the session's current state as a PNG.
pub fn save_snapshot<P: AsRef<Path>>(session: &Session, path: P) -> LabResult<()> {
    let frame = rasterize(session.state(), session.active_module(), 0);
    let img = RgbImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
        let px = frame[y as usize * WIDTH + x as usize];
        Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
    });
    img.save(path.as_ref())?;
    info!(path = %path.as_ref().display(), "snapshot written");
    Ok(())
}

pub fn spawn_visualizer(session: Arc<Mutex<Session>>) {
    thread::spawn(move || {
        let mut window = match Window::new(
            "SymbiΩn Multiverse Lab - Fractal Spiral",
            WIDTH,
            HEIGHT,
            WindowOptions::default(),
        ) {
            Ok(window) => window,
            Err(err) => {
                warn!(error = %err, "could not open spiral window");
                return;
            }
        };

        window.set_target_fps(30);
        let mut frame_count: u32 = 0;

        while window.is_open() && !window.is_key_down(Key::Escape) {
            let (state, module) = {
                let Ok(session) = session.lock() else { break };
                (session.state().clone(), session.active_module())
            };

            frame_count = frame_count.wrapping_add(1);
            let buffer = rasterize(&state, module, frame_count / 8);

            if let Err(err) = window.update_with_buffer(&buffer, WIDTH, HEIGHT) {
                warn!(error = %err, "spiral window update failed");
                break;
            }
        }
    });
}
