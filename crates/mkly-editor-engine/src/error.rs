#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Block type '{0}' is reserved and cannot be styled")]
    ReservedBlockType(String),
    #[error("Style edit is missing a {0}")]
    EmptyName(&'static str),
    #[error("No block at line {0}")]
    NoBlockAtLine(usize),
}
