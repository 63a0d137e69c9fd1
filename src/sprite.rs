use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::blocks::BlockGraph;
use crate::config::Screen;
use crate::costume::CostumeDecoder;
use crate::error::{RuntimeError, RuntimeResult};
use crate::geometry::{self, Rect};
use crate::i18n::Catalog;
use crate::target::Target;

/// A target plus its derived visual state.
///
/// Every mutation re-derives the rendered image and screen rect before it
/// returns, so the rect always matches position, direction, costume and
/// screen size.
pub struct Sprite {
    target: Target,
    name: String,
    decoder: Arc<dyn CostumeDecoder + Send + Sync>,
    catalog: Catalog,
    /// Emit `debug!` events for state changes.
    debug_messages: bool,
    x: f32,
    y: f32,
    direction: f32,
    /// Current costume, unrotated.
    costume_image: RgbaImage,
    /// Costume as rendered, rotated to `direction`.
    image: RgbaImage,
    rect: Rect,
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sprite")
            .field("name", &self.name)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("direction", &self.direction)
            .field("costume", &self.target.current_costume)
            .field("rect", &self.rect)
            .finish()
    }
}

impl Sprite {
    /// Decode the target's current costume and place it at the target's
    /// starting position and direction.
    pub fn new(
        mut target: Target,
        decoder: Arc<dyn CostumeDecoder + Send + Sync>,
        screen: &Screen,
        catalog: &Catalog,
    ) -> RuntimeResult<Self> {
        if target.costumes.is_empty() {
            return Err(RuntimeError::NoCostumes(target.name.clone()));
        }
        target.current_costume %= target.costumes.len();
        let costume_image = decoder.decode(&target.costumes[target.current_costume])?;

        let name = if target.is_stage || target.name == "Stage" {
            catalog.text("stage", &[])
        } else {
            target.name.clone()
        };
        let (w, h) = costume_image.dimensions();
        let (x, y, direction) = (target.x, target.y, target.direction);

        let mut sprite = Self {
            image: costume_image.clone(),
            costume_image,
            rect: Rect::new(0.0, 0.0, w, h),
            target,
            name,
            decoder,
            catalog: catalog.clone(),
            debug_messages: true,
            x,
            y,
            direction,
        };
        sprite.set_position(x, y, screen);
        sprite.set_rotation(direction, screen);
        Ok(sprite)
    }

    /// Turn the per-change debug events on or off.
    pub fn set_debug_messages(&mut self, enabled: bool) {
        self.debug_messages = enabled;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn blocks(&self) -> &BlockGraph {
        &self.target.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockGraph {
        &mut self.target.blocks
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn costume_index(&self) -> usize {
        self.target.current_costume
    }

    /// The image as it should be blitted at `rect()`.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    // ── Position ─────────────────────────────────────────────────────────────

    /// Move to `(x, y)`, fenced to the screen when fencing is on.
    pub fn set_position(&mut self, x: f32, y: f32, screen: &Screen) {
        let (x, y) = geometry::fence(x, y, screen, self.rect.width, self.rect.height);
        self.x = x;
        self.y = y;
        self.target.x = x;
        self.target.y = y;
        if self.debug_messages {
            debug!(
                sprite = %self.name,
                x,
                y,
                "{}",
                self.catalog.text("new-sprite-position", &[("name", &self.name), ("x", &x), ("y", &y)])
            );
        }
        self.place(screen);
    }

    pub fn set_position_delta(&mut self, dx: f32, dy: f32, screen: &Screen) {
        self.set_position(self.x + dx, self.y + dy, screen);
    }

    // ── Rotation ─────────────────────────────────────────────────────────────

    /// Point in `direction` (Scratch degrees), wrapped into `(-180, 180]`.
    pub fn set_rotation(&mut self, direction: f32, screen: &Screen) {
        let direction = wrap_direction(direction);
        self.direction = direction;
        self.target.direction = direction;
        if self.debug_messages {
            debug!(
                sprite = %self.name,
                direction,
                "{}",
                self.catalog.text("new-sprite-rotation", &[("name", &self.name), ("rot", &direction)])
            );
        }

        self.image = geometry::rotate_image(&self.costume_image, geometry::image_angle(direction));
        let (w, h) = self.image.dimensions();
        self.rect.width = w;
        self.rect.height = h;
        // The rotated bounding box changes the fence limits.
        self.set_position(self.x, self.y, screen);
    }

    pub fn set_rotation_delta(&mut self, delta: f32, screen: &Screen) {
        self.set_rotation(self.direction + delta, screen);
    }

    // ── Costume ──────────────────────────────────────────────────────────────

    /// Switch to costume `index`, wrapping modulo the costume count.
    ///
    /// A costume that fails to decode leaves the sprite unchanged.
    pub fn set_costume(&mut self, index: i64, screen: &Screen) -> RuntimeResult<()> {
        let count = self.target.costumes.len() as i64;
        let index = index.rem_euclid(count) as usize;
        let decoded = self.decoder.decode(&self.target.costumes[index])?;

        self.target.current_costume = index;
        self.costume_image = decoded;
        if self.debug_messages {
            let costume = &self.target.costumes[index].name;
            debug!(
                sprite = %self.name,
                costume = index,
                "{}",
                self.catalog.text("new-sprite-costume", &[("name", &self.name), ("costume", costume)])
            );
        }
        self.set_rotation(self.direction, screen);
        Ok(())
    }

    /// Recompute the rect origin from the current state.
    fn place(&mut self, screen: &Screen) {
        let costume = &self.target.costumes[self.target.current_costume];
        let (ox, oy) = geometry::screen_origin(
            self.x,
            self.y,
            screen,
            costume.rotation_center,
            self.costume_image.dimensions(),
            self.image.dimensions(),
            geometry::image_angle(self.direction),
        );
        self.rect.x = ox;
        self.rect.y = oy;
    }
}

/// Wrap a heading into Scratch's `(-180, 180]` range.
pub fn wrap_direction(direction: f32) -> f32 {
    let wrapped = (direction + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}
