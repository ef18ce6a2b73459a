use crate::config::ConfigError;
use crate::connections::ConnectionError;
use crate::deck::DeckError;
use crate::fieldprops::FieldPropsError;
use crate::grid::{GridError, MapAxesError};
use crate::io::eclfile::EclFileError;
use crate::io::fortio::FortioError;
use crate::tables::TableError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EclResult<T> = Result<T, EclError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InputValidation,
    IoSystem,
    Computation,
    Internal,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidation => 2,
            Self::IoSystem => 3,
            Self::Computation => 4,
            Self::Internal => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidation => "InputValidationError",
            Self::IoSystem => "IoSystemError",
            Self::Computation => "ComputationError",
            Self::Internal => "InternalError",
        }
    }
}

/// Categorised error surfaced at the crate boundary.
///
/// Module errors keep their own typed variants; this wrapper adds a stable
/// placeholder code (for example `IO.INVALID_RECORD`) and the exit code the
/// command line front-end reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EclError {
    category: ErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl EclError {
    pub fn new(
        category: ErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InputValidation, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::IoSystem, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Computation, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Internal, placeholder, message)
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}

impl Display for EclError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for EclError {}

impl From<FortioError> for EclError {
    fn from(error: FortioError) -> Self {
        let message = error.to_string();
        match error {
            FortioError::Read { .. } => Self::io_system("IO.RECORD_READ", message),
            FortioError::Write { .. } => Self::io_system("IO.RECORD_WRITE", message),
            FortioError::Seek { .. } => Self::io_system("IO.RECORD_SEEK", message),
            FortioError::InvalidRecord { .. } => {
                Self::input_validation("INPUT.INVALID_RECORD", message)
            }
            FortioError::InvalidArgument(_) => Self::internal("SYS.RECORD_ARGUMENT", message),
        }
    }
}

impl From<EclFileError> for EclError {
    fn from(error: EclFileError) -> Self {
        match error {
            EclFileError::Record(inner) => inner.into(),
            EclFileError::Open { .. } => Self::io_system("IO.ECLFILE_OPEN", error.to_string()),
            other => Self::input_validation("INPUT.ECLFILE", other.to_string()),
        }
    }
}

impl From<TableError> for EclError {
    fn from(error: TableError) -> Self {
        Self::input_validation("INPUT.TABLE", error.to_string())
    }
}

impl From<FieldPropsError> for EclError {
    fn from(error: FieldPropsError) -> Self {
        let message = error.to_string();
        match error {
            FieldPropsError::UnsupportedKeyword(_) => {
                Self::internal("SYS.UNSUPPORTED_KEYWORD", message)
            }
            FieldPropsError::NotFound(_) => Self::input_validation("INPUT.MISSING_KEYWORD", message),
            FieldPropsError::Incomplete(_) => {
                Self::input_validation("INPUT.INCOMPLETE_KEYWORD", message)
            }
            _ => Self::input_validation("INPUT.FIELD_PROPS", message),
        }
    }
}

impl From<GridError> for EclError {
    fn from(error: GridError) -> Self {
        let message = error.to_string();
        match error {
            GridError::IndexOutOfRange { .. } | GridError::InactiveCell(_) => {
                Self::computation("RUN.GRID_INDEX", message)
            }
            GridError::EclFile(inner) => inner.into(),
            _ => Self::input_validation("INPUT.GRID_SPEC", message),
        }
    }
}

impl From<MapAxesError> for EclError {
    fn from(error: MapAxesError) -> Self {
        Self::input_validation("INPUT.MAPAXES", error.to_string())
    }
}

impl From<ConnectionError> for EclError {
    fn from(error: ConnectionError) -> Self {
        Self::computation("RUN.CONNECTIONS", error.to_string())
    }
}

impl From<DeckError> for EclError {
    fn from(error: DeckError) -> Self {
        match error {
            DeckError::Read { .. } => Self::io_system("IO.DECK_READ", error.to_string()),
            other => Self::input_validation("INPUT.DECK", other.to_string()),
        }
    }
}

impl From<ConfigError> for EclError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Read { .. } => Self::io_system("IO.CONFIG_READ", error.to_string()),
            ConfigError::Parse { .. } => Self::input_validation("INPUT.CONFIG", error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EclError, ErrorCategory};
    use crate::fieldprops::FieldPropsError;
    use crate::io::fortio::FortioError;

    #[test]
    fn exit_codes_are_stable() {
        let cases = [
            (ErrorCategory::InputValidation, 2, "InputValidationError"),
            (ErrorCategory::IoSystem, 3, "IoSystemError"),
            (ErrorCategory::Computation, 4, "ComputationError"),
            (ErrorCategory::Internal, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn record_errors_keep_their_category() {
        let error: EclError = FortioError::InvalidRecord {
            offset: 16,
            reason: "tail 8 does not match head 12".to_string(),
        }
        .into();

        assert_eq!(error.category(), ErrorCategory::InputValidation);
        assert_eq!(error.placeholder(), "INPUT.INVALID_RECORD");
        assert!(error.message().contains("offset 16"));
    }

    #[test]
    fn unsupported_keyword_is_a_programming_error() {
        let error: EclError = FieldPropsError::UnsupportedKeyword("NOSUCH".to_string()).into();
        assert_eq!(error.category(), ErrorCategory::Internal);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [SYS.UNSUPPORTED_KEYWORD] keyword 'NOSUCH' is not a supported field property"
        );
    }
}
