use std::collections::{BTreeMap, BTreeSet};

use crate::error::{RuntimeError, RuntimeResult};

mod opcode;

pub use opcode::Opcode;

/// Stable block identifier, unique within a target.
pub type BlockId = String;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One named input slot of a block.
///
/// A slot holds a literal (typed directly into the block, or the shadow behind
/// a dropped-in reporter), a reference to another block (a reporter, a menu
/// or a substack), or both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub block: Option<BlockId>,
    pub literal: Option<String>,
}

impl Input {
    pub fn literal(value: impl Into<String>) -> Self {
        Self { block: None, literal: Some(value.into()) }
    }

    pub fn block(id: impl Into<String>) -> Self {
        Self { block: Some(id.into()), literal: None }
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none() && self.literal.is_none()
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A node of a target's program graph.
///
/// Structure (`opcode`, `inputs`, `fields`) is fixed after load. Only the link
/// fields and the per-run flags below `shadow` change while running.
#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    pub opcode: Opcode,
    pub inputs: BTreeMap<String, Input>,
    pub fields: BTreeMap<String, String>,
    pub next: Option<BlockId>,
    pub parent: Option<BlockId>,
    /// Literal-only menu/number block rather than a reporter.
    pub shadow: bool,
    pub top_level: bool,
    /// Signature of a custom block call (`procedures_call`).
    pub proccode: Option<String>,
    /// Input names of a custom block call, in argument order.
    pub argument_ids: Vec<String>,

    pub waiting: bool,
    /// Milliseconds a `control_wait` has to wait.
    pub time_delay: u64,
    /// Milliseconds accumulated since the wait started.
    pub execution_time: u64,
    /// Completed in the current pass.
    pub ran: bool,
    /// Asks the scheduler to redraw before the next step.
    pub screen_refresh: bool,
    /// Ids spliced into this block's loop or event body.
    pub body: BTreeSet<BlockId>,
}

impl Block {
    pub fn new(id: impl Into<String>, opcode: &str) -> Self {
        Self {
            id: id.into(),
            opcode: Opcode::from_name(opcode),
            inputs: BTreeMap::new(),
            fields: BTreeMap::new(),
            next: None,
            parent: None,
            shadow: false,
            top_level: false,
            proccode: None,
            argument_ids: Vec::new(),
            waiting: false,
            time_delay: 0,
            execution_time: 0,
            ran: false,
            screen_refresh: false,
            body: BTreeSet::new(),
        }
    }

    pub fn with_input(mut self, name: &str, input: Input) -> Self {
        self.inputs.insert(name.to_string(), input);
        self
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_next(mut self, next: &str) -> Self {
        self.next = Some(next.to_string());
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn as_shadow(mut self) -> Self {
        self.shadow = true;
        self
    }

    pub fn as_top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    pub fn with_proccode(mut self, proccode: &str, argument_ids: &[&str]) -> Self {
        self.proccode = Some(proccode.to_string());
        self.argument_ids = argument_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Block referenced by an input (menu, reporter or substack), if any.
    pub fn input_block(&self, name: &str) -> Option<&str> {
        self.inputs.get(name).and_then(|i| i.block.as_deref())
    }

    fn reset_timer(&mut self) {
        self.time_delay = 0;
        self.execution_time = 0;
    }
}

// ---------------------------------------------------------------------------
// Loop splicing
// ---------------------------------------------------------------------------

/// How the tail of a spliced body is linked back to its head.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopClose {
    /// Only a tail with no successor is linked back (event bodies).
    IfOpen,
    /// The tail is always linked back, replacing whatever it pointed at (loop bodies).
    Always,
}

// ---------------------------------------------------------------------------
// BlockGraph: arena of blocks addressed by id
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct BlockGraph {
    blocks: BTreeMap<BlockId, Block>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.id.clone(), block);
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Look up `to`, reporting a broken link from `from` when it is missing.
    pub fn resolve(&self, from: &str, to: &str) -> RuntimeResult<&Block> {
        self.blocks
            .get(to)
            .ok_or_else(|| RuntimeError::broken_link(from, to))
    }

    pub fn resolve_mut(&mut self, from: &str, to: &str) -> RuntimeResult<&mut Block> {
        self.blocks
            .get_mut(to)
            .ok_or_else(|| RuntimeError::broken_link(from, to))
    }

    /// Top-level hat blocks, in id order.
    pub fn hats(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values().filter(|b| b.top_level && b.opcode.is_hat())
    }

    /// Check that every next, parent and input reference names a block in this graph.
    pub fn validate(&self) -> RuntimeResult<()> {
        for block in self.blocks.values() {
            let links = block
                .next
                .iter()
                .chain(block.parent.iter())
                .chain(block.inputs.values().filter_map(|i| i.block.as_ref()));
            for to in links {
                if !self.blocks.contains_key(to) {
                    return Err(RuntimeError::broken_link(&block.id, to));
                }
            }
        }
        Ok(())
    }

    /// Follow next-links from `start`, stopping before the first repeated block.
    ///
    /// Intended for inspection; execution itself follows cycles on purpose.
    pub fn chain(&self, start: &str) -> Vec<BlockId> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut cur = Some(start.to_string());
        while let Some(id) = cur {
            if !seen.insert(id.clone()) {
                break;
            }
            cur = self.blocks.get(&id).and_then(|b| b.next.clone());
            out.push(id);
        }
        out
    }

    /// Every block reachable from `start` through next-links and input
    /// references (substacks, menus, reporters), each listed once.
    pub fn reachable(&self, start: &str) -> Vec<BlockId> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut pending = vec![start.to_string()];
        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(block) = self.blocks.get(&id) else {
                continue;
            };
            pending.extend(block.next.iter().cloned());
            pending.extend(block.inputs.values().filter_map(|i| i.block.clone()));
            out.push(id);
        }
        out
    }

    /// Put every listed block back in its never-entered state: not ran, not
    /// waiting, timers cleared.
    pub fn reset_run_state<'a>(&mut self, ids: impl IntoIterator<Item = &'a BlockId>) {
        for id in ids {
            if let Some(block) = self.blocks.get_mut(id) {
                block.ran = false;
                block.waiting = false;
                block.reset_timer();
            }
        }
    }

    /// Add `ms` to the elapsed time of every block currently waiting.
    pub fn advance_timers(&mut self, ms: u64) {
        for block in self.blocks.values_mut().filter(|b| b.waiting) {
            block.execution_time = block.execution_time.saturating_add(ms);
        }
    }

    /// Clear the "ran" flag on every listed block that exists.
    pub fn clear_ran<'a>(&mut self, ids: impl IntoIterator<Item = &'a BlockId>) {
        for id in ids {
            if let Some(block) = self.blocks.get_mut(id) {
                block.ran = false;
            }
        }
    }

    /// Walk the chain starting at `first`, resetting each block's run state, and
    /// link its tail back to `head` so the body repeats.
    ///
    /// Walking stops at `head`, at a block with no successor, or at the first
    /// block already visited. Returns the visited ids in walk order.
    pub fn splice_loop(
        &mut self,
        head: &str,
        first: &str,
        close: LoopClose,
        clear_waiting: bool,
    ) -> RuntimeResult<Vec<BlockId>> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut cur = first.to_string();
        self.resolve(head, &cur)?;
        seen.insert(cur.clone());
        order.push(cur.clone());

        loop {
            let block = self.resolve_mut(head, &cur)?;
            block.ran = false;
            block.reset_timer();
            if clear_waiting {
                block.waiting = false;
            }
            match block.next.clone() {
                Some(next) if next == head || seen.contains(&next) => break,
                Some(next) => {
                    self.resolve(&cur, &next)?;
                    seen.insert(next.clone());
                    order.push(next.clone());
                    cur = next;
                }
                None => break,
            }
        }

        if cur != head {
            let tail = self.resolve_mut(head, &cur)?;
            if close == LoopClose::Always || tail.next.is_none() {
                tail.next = Some(head.to_string());
            }
        }
        Ok(order)
    }

    /// Text behind an input: its literal, or the single field of a referenced
    /// shadow block such as `math_number`.
    pub fn input_text(&self, block: &Block, name: &str) -> RuntimeResult<String> {
        let input = block
            .inputs
            .get(name)
            .ok_or_else(|| RuntimeError::missing_input(&block.id, name))?;
        if let Some(literal) = &input.literal {
            return Ok(literal.clone());
        }
        if let Some(id) = &input.block {
            let referenced = self.resolve(&block.id, id)?;
            if let Some(value) = referenced.fields.values().next() {
                return Ok(value.clone());
            }
            return Err(RuntimeError::invalid_number(&block.id, name, referenced.opcode.name()));
        }
        Err(RuntimeError::missing_input(&block.id, name))
    }

    /// Numeric value of an input.
    pub fn input_number(&self, block: &Block, name: &str) -> RuntimeResult<f64> {
        let text = self.input_text(block, name)?;
        parse_number(&text).ok_or_else(|| RuntimeError::invalid_number(&block.id, name, text))
    }

    /// Numeric value of an input truncated toward zero.
    pub fn input_integer(&self, block: &Block, name: &str) -> RuntimeResult<i64> {
        Ok(self.input_number(block, name)?.trunc() as i64)
    }
}

/// Parse Scratch number text. Non-finite and empty values are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ids: &[&str]) -> BlockGraph {
        let mut g = BlockGraph::new();
        for (i, id) in ids.iter().enumerate() {
            let mut b = Block::new(*id, "motion_changexby");
            b.next = ids.get(i + 1).map(|s| s.to_string());
            g.insert(b);
        }
        g
    }

    #[test]
    fn parse_number_accepts_padded_decimals() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("-10"), Some(-10.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn splice_links_open_tail_back_to_head() {
        let mut g = line(&["head", "a", "b"]);
        let order = g.splice_loop("head", "a", LoopClose::IfOpen, false).unwrap();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(g.get("b").unwrap().next.as_deref(), Some("head"));
    }

    #[test]
    fn splice_guards_against_inner_cycles() {
        let mut g = line(&["head", "a", "b"]);
        g.get_mut("b").unwrap().next = Some("a".into());
        let order = g.splice_loop("head", "a", LoopClose::Always, true).unwrap();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(g.get("b").unwrap().next.as_deref(), Some("head"));
    }

    #[test]
    fn splice_reports_missing_successor() {
        let mut g = line(&["head", "a"]);
        g.get_mut("a").unwrap().next = Some("ghost".into());
        let err = g.splice_loop("head", "a", LoopClose::IfOpen, false).unwrap_err();
        assert!(matches!(err, RuntimeError::BrokenLink { ref to, .. } if to == "ghost"));
    }

    #[test]
    fn reset_run_state_rearms_waits_in_substacks() {
        let mut g = line(&["hat", "loop"]);
        let mut body = Block::new("w", "control_wait");
        body.waiting = true;
        body.time_delay = 1000;
        body.execution_time = 700;
        body.ran = true;
        g.insert(body);
        g.get_mut("loop").unwrap().inputs.insert("SUBSTACK".into(), Input::block("w"));

        let ids = g.reachable("hat");
        assert_eq!(ids.len(), 3);
        g.reset_run_state(&ids);
        let w = g.get("w").unwrap();
        assert!(!w.waiting && !w.ran);
        assert_eq!((w.time_delay, w.execution_time), (0, 0));
    }

    #[test]
    fn reachable_survives_cycles_and_dangling_links() {
        let mut g = line(&["a", "b"]);
        g.get_mut("b").unwrap().next = Some("a".into());
        g.get_mut("a").unwrap().inputs.insert("X".into(), Input::block("ghost"));
        let mut ids = g.reachable("a");
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn chain_stops_at_first_repeat() {
        let mut g = line(&["a", "b", "c"]);
        g.get_mut("c").unwrap().next = Some("a".into());
        assert_eq!(g.chain("a"), vec!["a", "b", "c"]);
    }
}
