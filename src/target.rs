use crate::blocks::{Block, BlockGraph};
use crate::costume::Costume;

/// A sprite or the stage, as loaded from a project.
///
/// Owns the program graph and the costume list. Position, direction and the
/// current costume are the values the target started with; once wrapped in a
/// [`crate::sprite::Sprite`] they are kept in sync by the sprite operations.
#[derive(Clone, Debug)]
pub struct Target {
    pub name: String,
    pub is_stage: bool,
    pub blocks: BlockGraph,
    pub costumes: Vec<Costume>,
    pub current_costume: usize,
    pub x: f32,
    pub y: f32,
    /// Scratch heading: 0 = up, 90 = right, clockwise.
    pub direction: f32,
    /// Percent of the costume's natural size.
    pub size: f32,
}

impl Target {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_stage: false,
            blocks: BlockGraph::new(),
            costumes: Vec::new(),
            current_costume: 0,
            x: 0.0,
            y: 0.0,
            direction: 90.0,
            size: 100.0,
        }
    }

    pub fn stage() -> Self {
        Self { is_stage: true, ..Self::new("Stage") }
    }

    pub fn with_costume(mut self, costume: Costume) -> Self {
        self.costumes.push(costume);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(block);
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn facing(mut self, direction: f32) -> Self {
        self.direction = direction;
        self
    }

    /// Index of the costume called `name`.
    pub fn costume_index(&self, name: &str) -> Option<usize> {
        self.costumes.iter().position(|c| c.name == name)
    }
}
