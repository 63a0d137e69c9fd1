/// Convenience result type used across the runtime.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Everything that can go wrong while loading or stepping a block program.
///
/// Step-level failures (`InvalidNumericInput`, `MissingInput`, `UnknownKey`)
/// abort only the script that hit them. `BrokenLink` means the graph itself is
/// damaged and the owning target cannot continue.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    /// A block needed a number and got something else.
    #[error("block '{block}': input '{input}' is not a number: {value:?}")]
    InvalidNumericInput {
        block: String,
        input: String,
        value: String,
    },

    /// A block is missing an input or field it cannot run without.
    #[error("block '{block}': missing input '{input}'")]
    MissingInput { block: String, input: String },

    /// Key name with no entry in the key table.
    #[error("unknown key name: {0:?}")]
    UnknownKey(String),

    /// Opcode with no handler. Reported, never fatal.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),

    /// A next/parent/substack reference to a block id that does not exist.
    #[error("block '{from}' links to missing block '{to}'")]
    BrokenLink { from: String, to: String },

    /// Target has no costume to display.
    #[error("target '{0}' has no costumes")]
    NoCostumes(String),

    /// Costume image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed project document.
    #[error("project error: {0}")]
    Project(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RuntimeError {
    pub fn invalid_number(block: &str, input: &str, value: impl Into<String>) -> Self {
        Self::InvalidNumericInput {
            block: block.to_string(),
            input: input.to_string(),
            value: value.into(),
        }
    }

    pub fn missing_input(block: &str, input: &str) -> Self {
        Self::MissingInput {
            block: block.to_string(),
            input: input.to_string(),
        }
    }

    pub fn broken_link(from: &str, to: &str) -> Self {
        Self::BrokenLink {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project(msg.into())
    }

    /// True when the target that raised this error must stop running entirely.
    pub fn is_fatal_for_target(&self) -> bool {
        matches!(self, Self::BrokenLink { .. } | Self::NoCostumes(_) | Self::Decode(_))
    }
}
