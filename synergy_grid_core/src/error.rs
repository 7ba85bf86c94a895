/// Errors raised by the grid world, its agent and the observation encoder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions must be positive, got {rows} rows x {cols} cols")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("Action value {0} is not one of LEFT(0), DOWN(1), RIGHT(2), UP(3)")]
    InvalidAction(i64),

    #[error("Observation shape mismatch: expected {expected} fields, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Observation bound at index {index} is not ordered: low {low} >= high {high}")]
    BoundsOrder { index: usize, low: f32, high: f32 },

    #[error("No free cell left to spawn a resource ({active} resources active)")]
    SpawnStarvation { active: usize },

    #[error(
        "max_active_resources ({requested}) must be between 1 and {limit} for a {rows}x{cols} grid"
    )]
    TooManyActiveResources {
        requested: usize,
        limit: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
