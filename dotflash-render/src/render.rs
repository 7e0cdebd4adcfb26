use anyhow::{Result, anyhow};
use dotflash_core::{FrameView, SignalIndicator};
use dotflash_timing::Timer;
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

pub const DOT_RADIUS: f32 = 3.5;
/// Half-length of each fixation cross arm.
pub const CROSS_ARM: f32 = 10.0;
/// Gap between the indicator boxes and the right edge.
pub const SIGNAL_RIGHT_MARGIN: f32 = 50.0;
/// Indicator box side as a fraction of the window height.
pub const SIGNAL_SIZE_FRACTION: f32 = 0.05;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const INK: [u8; 4] = [0, 0, 0, 255];
const FLASH: [u8; 4] = [255, 0, 0, 255];

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
enum SpriteIndex {
    Dot = 0,
    FlashDot = 1,
    FixationCross = 2,
}

impl SpriteIndex {
    const COUNT: usize = 3;
}

#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Software renderer for the moving-dots screen.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    sprites: Vec<Pixmap>,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;

        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            sprites: Vec::with_capacity(SpriteIndex::COUNT),
            canvas,
        };
        renderer.init_sprites()?;
        Ok(renderer)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width, new_height)
            .ok_or_else(|| anyhow!("cannot allocate {new_width}x{new_height} canvas"))?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    fn init_sprites(&mut self) -> Result<()> {
        self.sprites.clear();
        self.sprites.push(dot_sprite(INK)?);
        self.sprites.push(dot_sprite(FLASH)?);
        self.sprites.push(cross_sprite()?);
        Ok(())
    }

    /// Draws `view` and copies the result into an RGBA `frame_buffer` of the
    /// same size.
    pub fn render_frame<T: Timer>(
        &mut self,
        view: &FrameView<'_>,
        frame_buffer: &mut [u8],
        timer: &T,
    ) -> Result<RenderStats> {
        let t_clear = {
            let t = timer.now();
            fill_rgba(self.canvas.data_mut(), BACKGROUND);
            timer.elapsed(t)
        };

        let t_draw = {
            let t = timer.now();
            self.blit(SpriteIndex::FixationCross, self.center);
            for (index, dot) in view.dots.iter().enumerate() {
                let sprite = if view.is_highlighted(index) {
                    SpriteIndex::FlashDot
                } else {
                    SpriteIndex::Dot
                };
                self.blit(sprite, (dot.x as f32, dot.y as f32));
            }
            self.draw_signals(view);
            timer.elapsed(t)
        };

        let t_copy = {
            let t = timer.now();
            let src = self.canvas.data();
            if frame_buffer.len() != src.len() {
                return Err(anyhow!(
                    "frame buffer is {} bytes, canvas is {}",
                    frame_buffer.len(),
                    src.len()
                ));
            }
            frame_buffer.copy_from_slice(src);
            timer.elapsed(t)
        };

        Ok(RenderStats {
            clear: t_clear,
            draw: t_draw,
            copy: t_copy,
            total: t_clear + t_draw + t_copy,
        })
    }

    /// Screen rectangle of one indicator box.
    pub fn signal_rect(&self, height_offset: i32) -> Option<Rect> {
        let size = (self.height as f32 * SIGNAL_SIZE_FRACTION).round().max(1.0);
        let x = self.width as f32 - SIGNAL_RIGHT_MARGIN - size;
        let y = self.height as f32 - height_offset as f32 - size;
        Rect::from_xywh(x, y, size, size)
    }

    fn draw_signals(&mut self, view: &FrameView<'_>) {
        for indicator in SignalIndicator::ALL {
            let Some(rect) = self.signal_rect(view.diode_heights[indicator.index()]) else {
                continue;
            };
            let color = if view.signals.is_active(indicator) {
                [255, 255, 255, 255]
            } else {
                INK
            };
            let mut paint = Paint::default();
            paint.anti_alias = false;
            paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
            self.canvas
                .fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    /// Premultiplied "over" blit of a cached sprite centered at `pos`.
    fn blit(&mut self, index: SpriteIndex, pos: (f32, f32)) {
        let sprite = &self.sprites[index as usize];
        let w = sprite.width() as i32;
        let h = sprite.height() as i32;

        let x0 = (pos.0 - w as f32 * 0.5).floor() as i32;
        let y0 = (pos.1 - h as f32 * 0.5).floor() as i32;

        let canvas_w = self.canvas.width() as i32;
        let canvas_h = self.canvas.height() as i32;
        if x0 >= canvas_w || y0 >= canvas_h || x0 + w <= 0 || y0 + h <= 0 {
            return;
        }

        let src_data = sprite.data();
        let dst_data = self.canvas.data_mut();

        for sy in 0..h {
            let dy = y0 + sy;
            if dy < 0 || dy >= canvas_h {
                continue;
            }
            for sx in 0..w {
                let dx = x0 + sx;
                if dx < 0 || dx >= canvas_w {
                    continue;
                }
                let src_idx = ((sy * w + sx) * 4) as usize;
                let dst_idx = ((dy * canvas_w + dx) * 4) as usize;

                let sa = src_data[src_idx + 3] as u32;
                if sa == 0 {
                    continue;
                }
                let inv_a = 255 - sa;
                for c in 0..4 {
                    let s = src_data[src_idx + c] as u32;
                    let d = dst_data[dst_idx + c] as u32;
                    dst_data[dst_idx + c] = (s + (d * inv_a + 127) / 255) as u8;
                }
            }
        }
    }
}

/// Fills an RGBA byte buffer with one color, a word at a time when aligned.
fn fill_rgba(data: &mut [u8], rgba: [u8; 4]) {
    match bytemuck::try_cast_slice_mut::<u8, u32>(data) {
        Ok(words) => words.fill(u32::from_ne_bytes(rgba)),
        Err(_) => {
            for px in data.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }
}

fn dot_sprite(color: [u8; 4]) -> Result<Pixmap> {
    let size = (DOT_RADIUS * 2.0).ceil() as u32 + 1;
    let mut pixmap = Pixmap::new(size, size).ok_or_else(|| anyhow!("dot sprite"))?;

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));

    let c = size as f32 / 2.0;
    let mut pb = PathBuilder::new();
    pb.push_circle(c, c, DOT_RADIUS);
    let path = pb.finish().ok_or_else(|| anyhow!("dot path"))?;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    Ok(pixmap)
}

fn cross_sprite() -> Result<Pixmap> {
    let size = (CROSS_ARM * 2.0) as u32;
    let mut pm = Pixmap::new(size, size).ok_or_else(|| anyhow!("cross sprite"))?;

    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::from_rgba8(INK[0], INK[1], INK[2], INK[3]));

    let extent = size as f32;
    let h = Rect::from_xywh(0.0, (extent - 2.0) * 0.5, extent, 2.0)
        .ok_or_else(|| anyhow!("cross bar"))?;
    pm.fill_rect(h, &paint, Transform::identity(), None);
    let v = Rect::from_xywh((extent - 2.0) * 0.5, 0.0, 2.0, extent)
        .ok_or_else(|| anyhow!("cross bar"))?;
    pm.fill_rect(v, &paint, Transform::identity(), None);
    Ok(pm)
}
