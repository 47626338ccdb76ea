//! Conversion error and outcome classification types.

use thiserror::Error;

/// Errors that abort the conversion of a single value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// Text could not be interpreted as a value of the target type.
    #[error("invalid character value for cast specification")]
    InvalidCharacterValue,

    /// The value does not fit the target width or precision.
    #[error("numeric value out of range")]
    NumericValueOutOfRange,

    /// A temporal field is out of range, or non-zero where the target forbids it.
    #[error("invalid datetime format: {detail}")]
    InvalidDatetimeFormat {
        /// Which field or rule was violated.
        detail: String,
    },

    /// Temporal text could not be split into its fields.
    #[error("datetime field overflow: {detail}")]
    DatetimeFieldOverflow {
        /// Which field could not be read.
        detail: String,
    },

    /// The source type cannot be converted to the target type at all.
    #[error("restricted data type attribute violation: {from} to {to}")]
    RestrictedDataType {
        /// Source type name.
        from: &'static str,
        /// Target type name.
        to: &'static str,
    },

    /// The target buffer does not match the requested client type.
    #[error("invalid application buffer type: {0}")]
    InvalidTypeForConversion(String),

    /// A buffer could not be grown.
    #[error("memory allocation failure")]
    OutOfMemory,
}

impl ConversionError {
    /// The SQLSTATE reported for this error.
    #[must_use]
    pub fn sqlstate(&self) -> &'static str {
        match self {
            Self::InvalidCharacterValue => "22018",
            Self::NumericValueOutOfRange => "22003",
            Self::InvalidDatetimeFormat { .. } => "22007",
            Self::DatetimeFieldOverflow { .. } => "22008",
            Self::RestrictedDataType { .. } => "07006",
            Self::InvalidTypeForConversion(_) => "HY003",
            Self::OutOfMemory => "HY001",
        }
    }

    /// The per-value classification corresponding to this error, if any.
    #[must_use]
    pub fn classification(&self) -> Classification {
        match self {
            Self::InvalidCharacterValue => Classification::InvalidCharacterValue,
            Self::NumericValueOutOfRange => Classification::NumericValueOutOfRange,
            Self::InvalidDatetimeFormat { .. } => Classification::InvalidDatetimeFormat,
            Self::DatetimeFieldOverflow { .. } => Classification::DatetimeFieldOverflow,
            Self::RestrictedDataType { .. }
            | Self::InvalidTypeForConversion(_)
            | Self::OutOfMemory => Classification::Failed,
        }
    }

    pub(crate) fn datetime_format(detail: &str) -> Self {
        Self::InvalidDatetimeFormat {
            detail: detail.to_string(),
        }
    }

    pub(crate) fn field_overflow(detail: &str) -> Self {
        Self::DatetimeFieldOverflow {
            detail: detail.to_string(),
        }
    }
}

/// How bad an outcome is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Converted exactly.
    Success,
    /// Converted with loss; the value was still produced.
    Warning,
    /// Not converted.
    Error,
}

/// Outcome of converting one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Classification {
    /// Converted exactly.
    #[default]
    Success,
    /// Text or binary data did not fit the target buffer (01004).
    StringDataTruncated,
    /// Fractional digits or time fields were dropped (01S07).
    FractionalTruncation,
    /// Non-numeric content where a number was expected (22018).
    InvalidCharacterValue,
    /// Value outside the target range (22003).
    NumericValueOutOfRange,
    /// Temporal field invalid for the target (22007).
    InvalidDatetimeFormat,
    /// Temporal text malformed (22008).
    DatetimeFieldOverflow,
    /// Conversion failed for a reason with no value-level SQLSTATE.
    Failed,
}

impl Classification {
    /// Severity of this outcome.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::Success => Severity::Success,
            Self::StringDataTruncated | Self::FractionalTruncation => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The SQLSTATE for this outcome, `None` on success.
    #[must_use]
    pub fn sqlstate(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::StringDataTruncated => Some("01004"),
            Self::FractionalTruncation => Some("01S07"),
            Self::InvalidCharacterValue => Some("22018"),
            Self::NumericValueOutOfRange => Some("22003"),
            Self::InvalidDatetimeFormat => Some("22007"),
            Self::DatetimeFieldOverflow => Some("22008"),
            Self::Failed => Some("HY000"),
        }
    }

    /// Whether this is a warning-class outcome.
    #[must_use]
    pub fn is_warning(self) -> bool {
        self.severity() == Severity::Warning
    }

    /// Whether this is an error-class outcome.
    #[must_use]
    pub fn is_error(self) -> bool {
        self.severity() == Severity::Error
    }

    /// The worse of two outcomes; the earlier one wins ties.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() { other } else { self }
    }
}
