use std::path::Path;

use crowd_placement::prelude::*;
use geo::{Contains, Intersects, Point};
use glam::DVec2;
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Output image layout and palette.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World rectangle mapped onto the image.
    pub world_min: DVec2,
    pub world_max: DVec2,
    pub background: [u8; 3],
    pub domain: [u8; 3],
    pub obstacle: [u8; 3],
    pub target: [u8; 3],
    pub torso: [u8; 3],
    pub shoulder: [u8; 3],
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), world_min: DVec2, world_max: DVec2) -> Self {
        Self {
            image_size,
            world_min,
            world_max,
            background: [40, 40, 48],
            domain: [235, 235, 240],
            obstacle: [90, 90, 100],
            target: [120, 200, 140],
            torso: [30, 90, 200],
            shoulder: [80, 140, 230],
        }
    }

    pub fn with_background(mut self, color: [u8; 3]) -> Self {
        self.background = color;
        self
    }

    fn pixel_to_world(&self, x: u32, y: u32) -> DVec2 {
        let (w, h) = self.image_size;
        let extent = self.world_max - self.world_min;
        let u = (x as f64 + 0.5) / w as f64;
        let v = 1.0 - (y as f64 + 0.5) / h as f64;
        self.world_min + DVec2::new(u * extent.x, v * extent.y)
    }

    fn world_to_pixel(&self, p: DVec2) -> (f64, f64) {
        let (w, h) = self.image_size;
        let extent = self.world_max - self.world_min;
        let rel = (p - self.world_min) / extent;
        (rel.x * w as f64, (1.0 - rel.y) * h as f64)
    }

    fn pixels_per_unit(&self) -> f64 {
        self.image_size.0 as f64 / (self.world_max.x - self.world_min.x)
    }
}

/// Render the field and every active agent of `cfg` to a PNG at `path`.
pub fn render_configuration_to_png<P: ParameterSource>(
    cfg: &Configuration<P>,
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        rc.image_size.0 > 0 && rc.image_size.1 > 0,
        "image size must be non-zero"
    );
    let (w, h) = rc.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(rc.background));
    let field = cfg.field();

    for y in 0..h {
        for x in 0..w {
            let p = rc.pixel_to_world(x, y);
            let point = Point::new(p.x, p.y);
            let color = if field.obstacles().intersects(&point) {
                rc.obstacle
            } else if field.targets().intersects(&point) {
                rc.target
            } else if field.domain().is_some_and(|d| d.contains(&point)) {
                rc.domain
            } else {
                continue;
            };
            img.put_pixel(x, y, Rgb(color));
        }
    }

    for body in cfg.agents().active_geometries() {
        for (i, circle) in body.circles().iter().enumerate() {
            let color = if i == 0 { rc.torso } else { rc.shoulder };
            fill_disk(&mut img, rc, circle, color);
        }
    }

    img.save(path.as_ref())?;
    info!(
        "Wrote {} agents to {}.",
        cfg.agents().len(),
        path.as_ref().display()
    );
    Ok(())
}

fn fill_disk(img: &mut RgbImage, rc: &RenderConfig, circle: &Circle, color: [u8; 3]) {
    let (cx, cy) = rc.world_to_pixel(circle.center);
    let r = (circle.radius * rc.pixels_per_unit()).max(1.0);
    let (w, h) = (img.width() as i64, img.height() as i64);

    let x0 = ((cx - r).floor() as i64).max(0);
    let x1 = ((cx + r).ceil() as i64).min(w - 1);
    let y0 = ((cy - r).floor() as i64).max(0);
    let y1 = ((cy + r).ceil() as i64).min(h - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}
