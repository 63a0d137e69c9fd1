//! One-block-at-a-time execution of a target's program graph.
//!
//! The scheduler owns the frame loop: it calls [`Interpreter::step`] with the
//! block a script is sitting on and gets back the block to run next. A block
//! that must be polled again (a running wait, a spinning `forever`) returns
//! itself.

use tracing::{debug, error, info, warn};

use crate::blocks::{Block, BlockId, LoopClose, Opcode, parse_number};
use crate::config::{RuntimeConfig, Screen};
use crate::error::{RuntimeError, RuntimeResult};
use crate::geometry;
use crate::i18n::Catalog;
use crate::input::{InputState, lookup_key};
use crate::sprite::Sprite;

/// Scratch Addons debugging blocks, matched by exact signature
/// (the names are wrapped in zero-width spaces).
pub const LOG_PROCCODE: &str = "\u{200b}\u{200b}log\u{200b}\u{200b} %s";
pub const WARN_PROCCODE: &str = "\u{200b}\u{200b}warn\u{200b}\u{200b} %s";
pub const ERROR_PROCCODE: &str = "\u{200b}\u{200b}error\u{200b}\u{200b} %s";

/// What a handler decided about control flow.
enum Flow {
    /// Mark the block as ran and continue at its `next`.
    FallThrough,
    /// Continue at the given block, or stop the script with `None`.
    Jump(Option<BlockId>),
}

type Handler = fn(&mut Interpreter, &mut Sprite, &str, &InputState) -> RuntimeResult<Flow>;

/// Handler table keyed by opcode. Tags without an entry go to `unknown`.
fn handler(opcode: &Opcode) -> Handler {
    match opcode {
        Opcode::MotionGoToXY => go_to_xy,
        Opcode::MotionGoTo => go_to,
        Opcode::MotionGoToMenu => go_to_menu,
        Opcode::MotionSetX => set_x,
        Opcode::MotionSetY => set_y,
        Opcode::MotionChangeXBy => change_x_by,
        Opcode::MotionChangeYBy => change_y_by,
        Opcode::MotionTurnRight => turn_right,
        Opcode::MotionTurnLeft => turn_left,
        Opcode::MotionPointInDirection => point_in_direction,
        Opcode::LooksSwitchCostumeTo => switch_costume_to,
        Opcode::LooksNextCostume => next_costume,
        Opcode::LooksCostume | Opcode::EventWhenFlagClicked => no_op,
        Opcode::ControlWait => wait,
        Opcode::ControlForever => forever,
        Opcode::EventWhenKeyPressed => when_key_pressed,
        Opcode::ProceduresCall => procedures_call,
        Opcode::Unknown(_) => unknown,
    }
}

pub struct Interpreter {
    screen: Screen,
    catalog: Catalog,
    show_project_logs: bool,
    debug_messages: bool,
    rng: u64,
}

impl Interpreter {
    pub fn new(config: &RuntimeConfig, catalog: Catalog) -> Self {
        Self {
            screen: config.screen(),
            catalog,
            show_project_logs: config.show_project_logs,
            debug_messages: config.enable_debug_messages,
            rng: config.random_seed,
        }
    }

    /// Screen the interpreter is currently working with.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resync the cached screen size, fencing policy and logging flags after
    /// the configuration changed.
    pub fn refresh_screen_dimensions(&mut self, config: &RuntimeConfig) {
        self.screen = config.screen();
        self.show_project_logs = config.show_project_logs;
        self.debug_messages = config.enable_debug_messages;
    }

    /// Execute block `id` of `sprite` and return the block to run next.
    ///
    /// `None` ends the script. Errors leave the graph in a consistent state;
    /// the caller decides whether to drop the script or the whole target.
    pub fn step(
        &mut self,
        sprite: &mut Sprite,
        id: &str,
        input: &InputState,
    ) -> RuntimeResult<Option<BlockId>> {
        let run = handler(&block(sprite, id)?.opcode);
        let next = match run(self, sprite, id, input)? {
            Flow::Jump(next) => next,
            Flow::FallThrough => {
                let this = sprite.blocks_mut().resolve_mut(id, id)?;
                this.ran = true;
                this.next.clone()
            }
        };
        if let Some(next) = &next {
            sprite.blocks().resolve(id, next)?;
        }
        Ok(next)
    }

    /// Uniform integer in `min..=max` from the seeded generator.
    fn random_range(&mut self, min: i32, max: i32) -> i32 {
        self.rng = self
            .rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let span = (max as i64 - min as i64 + 1).max(1) as u64;
        (min as i64 + ((self.rng >> 33) % span) as i64) as i32
    }
}

fn block<'a>(sprite: &'a Sprite, id: &str) -> RuntimeResult<&'a Block> {
    sprite.blocks().resolve(id, id)
}

fn integer_input(sprite: &Sprite, id: &str, name: &str) -> RuntimeResult<f32> {
    let b = block(sprite, id)?;
    Ok(sprite.blocks().input_integer(b, name)? as f32)
}

fn number_input(sprite: &Sprite, id: &str, name: &str) -> RuntimeResult<f32> {
    let b = block(sprite, id)?;
    Ok(sprite.blocks().input_number(b, name)? as f32)
}

// ── Motion ───────────────────────────────────────────────────────────────────

fn go_to_xy(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let x = integer_input(sprite, id, "X")?;
    let y = integer_input(sprite, id, "Y")?;
    sprite.set_position(x, y, &it.screen);
    Ok(Flow::FallThrough)
}

/// `go to (menu)`: hand control to the menu block, which does the moving.
fn go_to(_: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let menu = block(sprite, id)?
        .input_block("TO")
        .ok_or_else(|| RuntimeError::missing_input(id, "TO"))?;
    Ok(Flow::Jump(Some(menu.to_string())))
}

/// Menu of `go to`. Moves the sprite, then continues after the owning
/// `go to` block since the menu itself has no successor.
fn go_to_menu(it: &mut Interpreter, sprite: &mut Sprite, id: &str, input: &InputState) -> RuntimeResult<Flow> {
    let b = block(sprite, id)?;
    let to = b
        .field("TO")
        .ok_or_else(|| RuntimeError::missing_input(id, "TO"))?
        .to_string();
    let parent = b.parent.clone();

    match to.as_str() {
        "_mouse_" => {
            let [px, py] = input.mouse_pos;
            let (x, y) = geometry::screen_to_stage(px, py, &it.screen);
            sprite.set_position(x as f32, y as f32, &it.screen);
        }
        "_random_" => {
            let (min_x, max_x, min_y, max_y) = geometry::stage_bounds(&it.screen);
            let x = it.random_range(min_x, max_x);
            let y = it.random_range(min_y, max_y);
            sprite.set_position(x as f32, y as f32, &it.screen);
        }
        other => {
            warn!(
                sprite = %sprite.name(),
                "{}",
                it.catalog.text("unknown-goto-target", &[("to", &other), ("name", &sprite.name())])
            );
        }
    }

    match parent {
        Some(parent) => Ok(Flow::Jump(sprite.blocks().resolve(id, &parent)?.next.clone())),
        None => Ok(Flow::FallThrough),
    }
}

fn set_x(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let x = integer_input(sprite, id, "X")?;
    sprite.set_position(x, sprite.y(), &it.screen);
    Ok(Flow::FallThrough)
}

fn set_y(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let y = integer_input(sprite, id, "Y")?;
    sprite.set_position(sprite.x(), y, &it.screen);
    Ok(Flow::FallThrough)
}

fn change_x_by(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let dx = integer_input(sprite, id, "DX")?;
    sprite.set_position_delta(dx, 0.0, &it.screen);
    Ok(Flow::FallThrough)
}

fn change_y_by(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let dy = integer_input(sprite, id, "DY")?;
    sprite.set_position_delta(0.0, dy, &it.screen);
    Ok(Flow::FallThrough)
}

fn turn_right(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let degrees = number_input(sprite, id, "DEGREES")?;
    sprite.set_rotation_delta(degrees, &it.screen);
    Ok(Flow::FallThrough)
}

fn turn_left(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let degrees = number_input(sprite, id, "DEGREES")?;
    sprite.set_rotation_delta(-degrees, &it.screen);
    Ok(Flow::FallThrough)
}

fn point_in_direction(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let direction = number_input(sprite, id, "DIRECTION")?;
    sprite.set_rotation(direction, &it.screen);
    Ok(Flow::FallThrough)
}

// ── Looks ────────────────────────────────────────────────────────────────────

/// Switch by costume name (through the `looks_costume` menu) or by 1-based number.
fn switch_costume_to(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let b = block(sprite, id)?;
    let input = b
        .inputs
        .get("COSTUME")
        .ok_or_else(|| RuntimeError::missing_input(id, "COSTUME"))?;
    let choice = match &input.block {
        Some(menu) => sprite.blocks().resolve(id, menu)?.field("COSTUME").map(str::to_string),
        None => input.literal.clone(),
    };

    let index = choice.and_then(|c| {
        sprite
            .target()
            .costume_index(&c)
            .map(|i| i as i64)
            .or_else(|| parse_number(&c).map(|n| n.round() as i64 - 1))
    });
    match index {
        Some(index) => sprite.set_costume(index, &it.screen)?,
        None if it.debug_messages => debug!(sprite = %sprite.name(), block = id, "no such costume"),
        None => {}
    }
    Ok(Flow::FallThrough)
}

fn next_costume(it: &mut Interpreter, sprite: &mut Sprite, _: &str, _: &InputState) -> RuntimeResult<Flow> {
    sprite.set_costume(sprite.costume_index() as i64 + 1, &it.screen)?;
    Ok(Flow::FallThrough)
}

// ── Control ──────────────────────────────────────────────────────────────────

/// `wait (n) seconds`. The duration is read once, on entry; the scheduler
/// accumulates elapsed time into the block until it reaches the delay.
fn wait(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let b = block(sprite, id)?;
    let (waiting, elapsed, delay) = (b.waiting, b.execution_time, b.time_delay);

    if !waiting {
        let seconds = sprite.blocks().input_number(b, "DURATION")?;
        let delay = (seconds * 1000.0).round().max(0.0) as u64;
        let b = sprite.blocks_mut().resolve_mut(id, id)?;
        b.screen_refresh = true;
        b.time_delay = delay;
        b.waiting = true;
        b.execution_time = 0;
        if it.debug_messages {
            debug!(block = id, delay_ms = delay, "{}", it.catalog.text("waiting", &[("ms", &delay)]));
        }
        return Ok(Flow::Jump(Some(id.to_string())));
    }

    if elapsed < delay {
        return Ok(Flow::Jump(Some(id.to_string())));
    }
    sprite.blocks_mut().resolve_mut(id, id)?.waiting = false;
    Ok(Flow::FallThrough)
}

/// `forever { .. }`. Never completes: each pass resets the body and links its
/// tail back here, then enters the body again.
fn forever(_: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let blocks = sprite.blocks_mut();
    let b = blocks.resolve_mut(id, id)?;
    b.ran = false;
    b.screen_refresh = true;

    let Some(first) = b.input_block("SUBSTACK").map(str::to_string) else {
        return Ok(Flow::Jump(Some(id.to_string())));
    };
    let previous = b.body.clone();
    blocks.clear_ran(&previous);
    let visited = blocks.splice_loop(id, &first, LoopClose::Always, true)?;
    blocks.resolve_mut(id, id)?.body.extend(visited);
    Ok(Flow::Jump(Some(first)))
}

// ── Events ───────────────────────────────────────────────────────────────────

/// `when [key] pressed`. Fires while the key is held: re-arms the handler's
/// body, closes it back onto the handler and enters it. Halts otherwise.
fn when_key_pressed(it: &mut Interpreter, sprite: &mut Sprite, id: &str, input: &InputState) -> RuntimeResult<Flow> {
    let b = block(sprite, id)?;
    let key = b
        .field("KEY_OPTION")
        .ok_or_else(|| RuntimeError::missing_input(id, "KEY_OPTION"))?
        .to_string();
    let next = b.next.clone();

    let pressed = if key == "any" {
        input.any_key_held()
    } else {
        input.is_key_held(lookup_key(&key)?)
    };
    if !pressed || next.is_none() {
        return Ok(Flow::Jump(None));
    }
    if it.debug_messages {
        debug!(sprite = %sprite.name(), "{}", it.catalog.text("handling-key", &[("key", &key)]));
    }

    let blocks = sprite.blocks_mut();
    let previous = blocks.resolve(id, id)?.body.clone();
    blocks.clear_ran(&previous);
    let visited = blocks.splice_loop(id, id, LoopClose::IfOpen, false)?;
    blocks.resolve_mut(id, id)?.body.extend(visited);
    Ok(Flow::Jump(next))
}

fn no_op(_: &mut Interpreter, _: &mut Sprite, _: &str, _: &InputState) -> RuntimeResult<Flow> {
    Ok(Flow::FallThrough)
}

// ── Procedures ───────────────────────────────────────────────────────────────

/// Custom block calls. Only the log/warn/error debugging blocks do anything.
fn procedures_call(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    if !it.show_project_logs {
        return Ok(Flow::FallThrough);
    }
    let b = block(sprite, id)?;
    let key = match b.proccode.as_deref() {
        Some(LOG_PROCCODE) => "project-log",
        Some(WARN_PROCCODE) => "project-warn",
        Some(ERROR_PROCCODE) => "project-error",
        _ => return Ok(Flow::FallThrough),
    };
    let message = match b.argument_ids.first() {
        Some(arg) => sprite.blocks().input_text(b, arg).unwrap_or_default(),
        None => String::new(),
    };
    let text = it.catalog.text(key, &[("message", &message)]);
    match key {
        "project-log" => info!(target: "project", sprite = %sprite.name(), "{text}"),
        "project-warn" => warn!(target: "project", sprite = %sprite.name(), "{text}"),
        _ => error!(target: "project", sprite = %sprite.name(), "{text}"),
    }
    Ok(Flow::FallThrough)
}

fn unknown(it: &mut Interpreter, sprite: &mut Sprite, id: &str, _: &InputState) -> RuntimeResult<Flow> {
    let name = block(sprite, id)?.opcode.name().to_string();
    let err = RuntimeError::UnknownOpcode(name.clone());
    warn!(
        sprite = %sprite.name(),
        block = id,
        error = %err,
        "{}",
        it.catalog.text("unknown-opcode", &[("opcode", &name)])
    );
    Ok(Flow::FallThrough)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_range_is_inclusive_and_bounded() {
        let mut it = Interpreter::new(&RuntimeConfig::default(), Catalog::english());
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = it.random_range(-2, 2);
            assert!((-2..=2).contains(&v));
            seen_min |= v == -2;
            seen_max |= v == 2;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let cfg = RuntimeConfig { random_seed: 42, ..RuntimeConfig::default() };
        let mut a = Interpreter::new(&cfg, Catalog::english());
        let mut b = Interpreter::new(&cfg, Catalog::english());
        for _ in 0..10 {
            assert_eq!(a.random_range(-240, 240), b.random_range(-240, 240));
        }
    }
}
