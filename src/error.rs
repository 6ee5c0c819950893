use thiserror::Error;

/// Main error type for glucolog
#[derive(Error, Debug)]
pub enum GlucoseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glucose value: {0}. Expected an integer in mg/dl")]
    InvalidGlucose(String),

    #[error("Invalid HbA1c value: {0}. Expected a decimal percentage")]
    InvalidHba1c(String),

    #[error("Invalid mode: {0}. Expected 1, 2 or 3")]
    InvalidMode(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, GlucoseError>;

impl GlucoseError {
    /// Create a plot error from anything printable, e.g. plotters drawing errors
    pub fn plot(msg: impl std::fmt::Display) -> Self {
        Self::Plot(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_glucose_display() {
        let err = GlucoseError::InvalidGlucose("12.5".to_string());
        assert!(err.to_string().contains("12.5"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GlucoseError = io.into();
        assert!(matches!(err, GlucoseError::Io(_)));
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_plot_constructor() {
        let err = GlucoseError::plot("backend failed");
        assert!(matches!(err, GlucoseError::Plot(_)));
        assert_eq!(err.to_string(), "Plot error: backend failed");
    }
}
