// =============================================================================
// GEOMETRY.RS: Stage/screen coordinate math for sprites
//
// Pure functions only; same inputs always give the same outputs.
// - Fencing (keeping sprites on or near the visible stage)
// - Stage space <-> screen space conversion
// - Rotation of costume images about their rotation centre
// =============================================================================

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::config::Screen;

/// Sprites whose bounding box is at most this many pixels on an axis are kept
/// fully on-screen on that axis.
pub const SMALL_SPRITE_EXTENT: u32 = 32;

/// How far a larger sprite may hang off the edge of the stage, in pixels.
pub const EDGE_OVERHANG: f32 = 16.0;

/// Axis-aligned screen rectangle. Origin is the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

// =============================================================================
// FENCING
// =============================================================================

/// Clamp one coordinate so a sprite of `extent` pixels stays on the stage.
///
/// Small sprites are confined to `±half_screen`. Larger ones are pinned at
/// `±(half_screen + extent/2 - 16)`, so at most 16px of them leaves the stage.
#[inline]
pub fn fence_axis(coord: f32, screen_extent: u32, extent: u32) -> f32 {
    let half_screen = screen_extent as f32 / 2.0;
    let limit = if extent <= SMALL_SPRITE_EXTENT {
        half_screen
    } else {
        half_screen + extent as f32 / 2.0 - EDGE_OVERHANG
    };
    coord.clamp(-limit, limit)
}

/// Apply fencing to a stage position for a sprite whose rendered bounding box
/// is `width × height`. Returns the input unchanged when fencing is off.
pub fn fence(x: f32, y: f32, screen: &Screen, width: u32, height: u32) -> (f32, f32) {
    if !screen.fencing {
        return (x, y);
    }
    (
        fence_axis(x, screen.width, width),
        fence_axis(y, screen.height, height),
    )
}

// =============================================================================
// STAGE <-> SCREEN
// =============================================================================

/// Top-left screen origin of a sprite's rendered rect.
///
/// `pivot` is the costume rotation centre in costume pixels, `sprite` the
/// unrotated costume size, `rect` the rotated image size and `angle` the
/// counter-clockwise image rotation in degrees (`90 - direction`).
///
/// The pivot is placed at the stage position and the image is arranged around
/// it so the pivot does not move as the image rotates. With `angle == 0` this
/// reduces to
/// `x + W/2 - pivot.x + (sprite.w - rect.w)/2`, `H/2 - y - pivot.y + (sprite.h - rect.h)/2`.
pub fn screen_origin(
    x: f32,
    y: f32,
    screen: &Screen,
    pivot: Vec2,
    sprite: (u32, u32),
    rect: (u32, u32),
    angle: f32,
) -> (f32, f32) {
    let pivot = pivot.round();
    let sprite_center = Vec2::new(sprite.0 as f32 / 2.0, sprite.1 as f32 / 2.0);
    let offset = rotate_screen_vec(pivot - sprite_center, angle);

    let pivot_on_screen = Vec2::new(
        x + screen.half_width() as f32,
        screen.half_height() as f32 - y,
    );
    let center = pivot_on_screen - offset;
    (
        center.x - rect.0 as f32 / 2.0,
        center.y - rect.1 as f32 / 2.0,
    )
}

/// Convert a pointer position in screen pixels to stage coordinates.
pub fn screen_to_stage(px: f32, py: f32, screen: &Screen) -> (i32, i32) {
    (
        px as i32 - screen.half_width(),
        screen.half_height() - py as i32,
    )
}

/// Inclusive stage bounds `(min_x, max_x, min_y, max_y)`.
pub fn stage_bounds(screen: &Screen) -> (i32, i32, i32, i32) {
    let hw = screen.half_width();
    let hh = screen.half_height();
    (-hw, hw, -hh, hh)
}

// =============================================================================
// ROTATION
// =============================================================================

/// Counter-clockwise image rotation, in degrees, for a Scratch direction
/// (0 = up, 90 = right, clockwise).
#[inline]
pub fn image_angle(direction: f32) -> f32 {
    90.0 - direction
}

/// Rotate a screen-space vector (+Y down) visually counter-clockwise.
pub fn rotate_screen_vec(v: Vec2, angle: f32) -> Vec2 {
    let up = Vec2::new(v.x, -v.y);
    let r = Vec2::from_angle(angle.to_radians()).rotate(up);
    Vec2::new(r.x, -r.y)
}

/// Size of the bounding box of a `width × height` image rotated by `angle`.
pub fn rotated_size(width: u32, height: u32, angle: f32) -> (u32, u32) {
    if angle.rem_euclid(180.0) == 0.0 {
        return (width, height);
    }
    if angle.rem_euclid(180.0) == 90.0 {
        return (height, width);
    }
    let (s, c) = angle.to_radians().sin_cos();
    let (w, h) = (width as f32, height as f32);
    let rw = w * c.abs() + h * s.abs();
    let rh = w * s.abs() + h * c.abs();
    ((rw - 1e-3).ceil().max(1.0) as u32, (rh - 1e-3).ceil().max(1.0) as u32)
}

/// Rotate an image counter-clockwise by `angle` degrees, growing the canvas to
/// fit. Uncovered pixels are transparent; sampling is nearest-neighbour.
pub fn rotate_image(src: &RgbaImage, angle: f32) -> RgbaImage {
    if angle.rem_euclid(360.0) == 0.0 {
        return src.clone();
    }
    let (sw, sh) = src.dimensions();
    let (dw, dh) = rotated_size(sw, sh, angle);
    let src_center = Vec2::new(sw as f32 / 2.0, sh as f32 / 2.0);
    let dst_center = Vec2::new(dw as f32 / 2.0, dh as f32 / 2.0);

    let mut out = RgbaImage::from_pixel(dw, dh, Rgba([0, 0, 0, 0]));
    for dy in 0..dh {
        for dx in 0..dw {
            let d = Vec2::new(dx as f32 + 0.5, dy as f32 + 0.5) - dst_center;
            let s = rotate_screen_vec(d, -angle) + src_center;
            if s.x < 0.0 || s.y < 0.0 {
                continue;
            }
            let (sx, sy) = (s.x as u32, s.y as u32);
            if sx < sw && sy < sh {
                out.put_pixel(dx, dy, *src.get_pixel(sx, sy));
            }
        }
    }
    out
}
