use thiserror::Error;

/// Rejected or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("`{name}` is {value}, above the limit of {max}")]
    TooLarge {
        name: &'static str,
        value: f64,
        max: usize,
    },

    #[error("a cubic spline needs at least {required} control points, got {got}")]
    TooFewControlPoints { required: usize, got: usize },

    #[error(
        "spline window is degenerate: floor({factor1} * {segments}) - {segments} - 1 = \
         {steps} time steps; raise `factor1` above {min_factor1}"
    )]
    DegenerateTimeWindow {
        factor1: f32,
        segments: usize,
        steps: i64,
        min_factor1: f32,
    },

    #[error("leg offset must be at least 1 so every leg has a previous spine point")]
    LegOffset,

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub(crate) fn non_positive(name: &'static str, value: impl Into<f64>) -> Self {
        Self::NonPositive {
            name,
            value: value.into(),
        }
    }
}

/// Failures of the surface lifecycle.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("container still had no size after {attempts} attempts")]
    ContainerNeverSized { attempts: u32 },

    #[error("canvas operation failed: {0}")]
    Canvas(Box<dyn std::error::Error + Send + Sync>),

    #[error("re-seed failed: {0}")]
    Reseed(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type CoreResult<T> = Result<T, CoreError>;
