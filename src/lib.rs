pub mod blocks;
pub mod config;
pub mod costume;
pub mod error;
pub mod geometry;
pub mod i18n;
pub mod input;
pub mod interpreter;
pub mod project;
pub mod runtime;
pub mod sprite;
pub mod target;

pub use error::{RuntimeError, RuntimeResult};

/// Everything an embedding scheduler usually needs.
pub mod prelude {
    pub use crate::blocks::{Block, BlockGraph, BlockId, Input, Opcode};
    pub use crate::config::{RuntimeConfig, Screen};
    pub use crate::costume::{Costume, CostumeDecoder, DataFormat, ImageDecoder};
    pub use crate::error::{RuntimeError, RuntimeResult};
    pub use crate::i18n::Catalog;
    pub use crate::input::{InputState, KeyCode, lookup_key};
    pub use crate::interpreter::Interpreter;
    pub use crate::project::load_targets;
    pub use crate::runtime::Runtime;
    pub use crate::sprite::Sprite;
    pub use crate::target::Target;
}
