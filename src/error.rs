use crate::domain::Chamber;

/// Top-level error carrying the process exit code.
///
/// Exit codes:
/// - `2`: usage, configuration, or I/O problems
/// - `3`: data validation (nothing usable to analyze, classifier faults)
/// - `4`: computation or export failures
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A fault detected while classifying a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The control definition needs a chamber the record does not carry.
    #[error("year {year}: control definition requires the {chamber} but the record has no {chamber} seat data")]
    MissingChamber { year: i32, chamber: Chamber },

    /// Party seat counts do not add up to the chamber total.
    #[error(
        "year {year}: {chamber} seats do not sum to total (dem={dem} + rep={rep} + other={other} != total={total})"
    )]
    SeatSumMismatch {
        year: i32,
        chamber: Chamber,
        dem: u32,
        rep: u32,
        other: u32,
        total: u32,
    },

    /// A field needed for classification is absent.
    #[error("year {year}: missing required field `{field}`")]
    MissingField { year: i32, field: &'static str },

    /// `start_year` lies after `end_year`.
    #[error("invalid year window: start {start} is after end {end}")]
    InvalidWindow { start: i32, end: i32 },
}

impl ValidationError {
    /// Year of the offending record, if the fault is record-scoped.
    pub fn year(&self) -> Option<i32> {
        match self {
            ValidationError::MissingChamber { year, .. }
            | ValidationError::SeatSumMismatch { year, .. }
            | ValidationError::MissingField { year, .. } => Some(*year),
            ValidationError::InvalidWindow { .. } => None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let exit_code = match err {
            ValidationError::InvalidWindow { .. } => 2,
            _ => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}
