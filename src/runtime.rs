use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::blocks::{BlockId, Opcode};
use crate::config::RuntimeConfig;
use crate::costume::CostumeDecoder;
use crate::error::RuntimeResult;
use crate::i18n::Catalog;
use crate::input::{InputState, lookup_key};
use crate::interpreter::Interpreter;
use crate::sprite::Sprite;
use crate::target::Target;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trigger {
    /// Runs once per `start`.
    GreenFlag,
    /// Re-polls its hat every frame it is idle.
    KeyPressed,
}

/// One script: the hat it starts from and the block it is sitting on.
#[derive(Clone, Debug)]
struct Thread {
    sprite: usize,
    hat: BlockId,
    cursor: Option<BlockId>,
    trigger: Trigger,
}

/// Minimal frame driver: steps every live script once per tick.
///
/// Failures are contained per target. A step error ends only that script;
/// a broken graph or undecodable costume stops every script of the target
/// and leaves the others running.
pub struct Runtime {
    interpreter: Interpreter,
    sprites: Vec<Sprite>,
    halted: Vec<bool>,
    threads: Vec<Thread>,
    redraw: bool,
}

impl Runtime {
    /// Build sprites for `targets` and register their scripts.
    pub fn new(
        targets: Vec<Target>,
        decoder: Arc<dyn CostumeDecoder + Send + Sync>,
        config: &RuntimeConfig,
        catalog: Catalog,
    ) -> RuntimeResult<Self> {
        let screen = config.screen();
        let sprites = targets
            .into_iter()
            .map(|t| Sprite::new(t, decoder.clone(), &screen, &catalog))
            .collect::<RuntimeResult<Vec<_>>>()?;
        Ok(Self::from_sprites(sprites, config, catalog))
    }

    pub fn from_sprites(mut sprites: Vec<Sprite>, config: &RuntimeConfig, catalog: Catalog) -> Self {
        for sprite in &mut sprites {
            sprite.set_debug_messages(config.enable_debug_messages);
        }
        let mut halted = vec![false; sprites.len()];
        let mut threads = Vec::new();

        for (index, sprite) in sprites.iter().enumerate() {
            if let Err(e) = sprite.blocks().validate() {
                error!(sprite = %sprite.name(), error = %e, "{}", catalog.text("target-halted", &[("name", &sprite.name()), ("error", &e)]));
                halted[index] = true;
                continue;
            }
            for hat in sprite.blocks().hats() {
                let trigger = match hat.opcode {
                    Opcode::EventWhenFlagClicked => Trigger::GreenFlag,
                    Opcode::EventWhenKeyPressed => {
                        // Key names are checked here so the interpreter never sees an unknown one.
                        let key = hat.field("KEY_OPTION").unwrap_or_default();
                        if key != "any" {
                            if let Err(e) = lookup_key(key) {
                                warn!(sprite = %sprite.name(), hat = %hat.id, error = %e, "skipping key handler");
                                continue;
                            }
                        }
                        Trigger::KeyPressed
                    }
                    _ => continue,
                };
                let cursor = (trigger == Trigger::KeyPressed).then(|| hat.id.clone());
                threads.push(Thread { sprite: index, hat: hat.id.clone(), cursor, trigger });
            }
        }

        Self {
            interpreter: Interpreter::new(config, catalog),
            sprites,
            halted,
            threads,
            redraw: true,
        }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.target().name == name)
    }

    pub fn is_halted(&self, name: &str) -> bool {
        self.sprites
            .iter()
            .position(|s| s.target().name == name)
            .is_some_and(|i| self.halted[i])
    }

    /// Scripts currently sitting on a block.
    pub fn active_threads(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.cursor.is_some() && !self.halted[t.sprite])
            .count()
    }

    /// Whether a block stepped during the last tick asked for a redraw.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Green flag: (re)start every flag script at its hat, re-arming any
    /// wait it was in the middle of.
    pub fn start(&mut self) {
        for thread in &mut self.threads {
            if thread.trigger == Trigger::GreenFlag && !self.halted[thread.sprite] {
                thread.cursor = Some(thread.hat.clone());
                let sprite = &mut self.sprites[thread.sprite];
                let script = sprite.blocks().reachable(&thread.hat);
                sprite.blocks_mut().reset_run_state(&script);
            }
        }
    }

    /// Resync screen size and logging flags from `config` and re-place every
    /// sprite in the new screen.
    pub fn refresh_screen_dimensions(&mut self, config: &RuntimeConfig) {
        self.interpreter.refresh_screen_dimensions(config);
        let screen = self.interpreter.screen();
        for sprite in &mut self.sprites {
            sprite.set_debug_messages(config.enable_debug_messages);
            sprite.set_position(sprite.x(), sprite.y(), &screen);
        }
        self.redraw = true;
    }

    /// Advance wait timers by `dt`, then step every live script once.
    pub fn tick(&mut self, dt: Duration, input: &InputState) {
        let ms = dt.as_millis() as u64;
        for (sprite, halted) in self.sprites.iter_mut().zip(&self.halted) {
            if !halted {
                sprite.blocks_mut().advance_timers(ms);
            }
        }

        let Self { interpreter, sprites, halted, threads, redraw } = self;
        *redraw = false;

        for thread in threads.iter_mut() {
            if halted[thread.sprite] {
                continue;
            }
            if thread.cursor.is_none() && thread.trigger == Trigger::KeyPressed {
                thread.cursor = Some(thread.hat.clone());
            }
            let Some(current) = thread.cursor.clone() else {
                continue;
            };

            let sprite = &mut sprites[thread.sprite];
            match interpreter.step(sprite, &current, input) {
                Ok(next) => {
                    *redraw |= sprite
                        .blocks()
                        .get(&current)
                        .is_some_and(|b| b.screen_refresh);
                    thread.cursor = next;
                }
                Err(e) if e.is_fatal_for_target() => {
                    error!(
                        sprite = %sprite.name(),
                        block = %current,
                        error = %e,
                        "{}",
                        interpreter.catalog().text("target-halted", &[("name", &sprite.name()), ("error", &e)])
                    );
                    halted[thread.sprite] = true;
                }
                Err(e) => {
                    warn!(
                        sprite = %sprite.name(),
                        block = %current,
                        error = %e,
                        "{}",
                        interpreter.catalog().text("script-aborted", &[("name", &sprite.name()), ("error", &e)])
                    );
                    thread.cursor = None;
                }
            }
        }
    }
}
