//! Bar chart of a trend snapshot, rendered to PNG.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::app::Result;
use crate::domain::TrendEntry;
use crate::typeface::Typeface;

pub const TITLE: &str = "Top Meme Trends";
pub const X_LABEL: &str = "Words";
pub const Y_LABEL: &str = "Frequency";

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 500;

const LEFT: u32 = 80;
const RIGHT: u32 = 30;
const TOP: u32 = 60;
const BOTTOM: u32 = 80;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BAR: Rgba<u8> = Rgba([31, 119, 180, 255]);

const MAX_TICKS: usize = 5;

struct Plot {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl Plot {
    fn bottom(&self) -> u32 {
        self.top + self.height
    }

    fn y_for(&self, value: usize, max: usize) -> i32 {
        let filled = (value as f32 / max as f32 * self.height as f32).round() as u32;
        (self.bottom() - filled.min(self.height)) as i32
    }
}

/// Render one bar per entry, in the given order.
pub fn render(trends: &[TrendEntry], typeface: &Typeface) -> Result<Bytes> {
    let mut canvas = RgbaImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let plot = Plot {
        left: LEFT,
        top: TOP,
        width: WIDTH - LEFT - RIGHT,
        height: HEIGHT - TOP - BOTTOM,
    };
    let max = trends.iter().map(|t| t.count).max().unwrap_or(0).max(1);

    draw_centered(&mut canvas, typeface, TITLE, 24.0, WIDTH / 2, 20);
    draw_axes(&mut canvas, &plot);
    draw_ticks(&mut canvas, typeface, &plot, max);
    draw_bars(&mut canvas, typeface, &plot, trends, max);
    let x_label_center = plot.left + plot.width / 2;
    draw_centered(&mut canvas, typeface, X_LABEL, 16.0, x_label_center, HEIGHT - 30);
    typeface.draw(&mut canvas, INK, 10, (TOP - 25) as i32, 16.0, Y_LABEL);

    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(Bytes::from(buf))
}

fn draw_centered(
    canvas: &mut RgbaImage,
    typeface: &Typeface,
    text: &str,
    px: f32,
    center_x: u32,
    y: u32,
) {
    let (w, _) = typeface.measure(text, px);
    let x = center_x as i32 - (w / 2) as i32;
    typeface.draw(canvas, INK, x, y as i32, px, text);
}

fn draw_axes(canvas: &mut RgbaImage, plot: &Plot) {
    let left = plot.left as f32;
    let bottom = plot.bottom() as f32;
    draw_line_segment_mut(canvas, (left, plot.top as f32), (left, bottom), INK);
    let right = (plot.left + plot.width) as f32;
    draw_line_segment_mut(canvas, (left, bottom), (right, bottom), INK);
}

fn draw_ticks(canvas: &mut RgbaImage, typeface: &Typeface, plot: &Plot, max: usize) {
    let step = max.div_ceil(MAX_TICKS).max(1);
    for value in (0..=max).step_by(step) {
        let y = plot.y_for(value, max);
        let left = plot.left as f32;
        draw_line_segment_mut(canvas, (left - 5.0, y as f32), (left, y as f32), INK);

        let label = value.to_string();
        let (w, h) = typeface.measure(&label, 12.0);
        let x = plot.left as i32 - 10 - w as i32;
        typeface.draw(canvas, INK, x, y - (h / 2) as i32, 12.0, &label);
    }
}

fn draw_bars(
    canvas: &mut RgbaImage,
    typeface: &Typeface,
    plot: &Plot,
    trends: &[TrendEntry],
    max: usize,
) {
    // At least one pixel column per bar; entries past that are not drawn.
    let shown = &trends[..trends.len().min(plot.width as usize)];
    if shown.is_empty() {
        return;
    }

    let slot = plot.width / shown.len() as u32;
    let bar_width = (slot * 3 / 5).clamp(1, slot);

    for (i, trend) in shown.iter().enumerate() {
        let x = plot.left + i as u32 * slot + (slot - bar_width) / 2;
        let top = plot.y_for(trend.count, max);
        let height = plot.bottom() as i32 - top;
        if height > 0 {
            let bar = Rect::at(x as i32, top).of_size(bar_width, height as u32);
            draw_filled_rect_mut(canvas, bar, BAR);
        }

        let center = x + bar_width / 2;
        draw_centered(canvas, typeface, &trend.term, 14.0, center, plot.bottom() + 10);
    }
}
