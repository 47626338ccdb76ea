//! Parameter marshalling and outcome aggregation.
//!
//! Indicator values are handled here before a value reaches the conversion
//! engine: NULL and column-default markers never need converting, and
//! data-at-execution parameters are held back until their data arrives.

use odbc_types::{
    Charset, Classification, ConversionContext, ConversionError, NativeBinding, ParamTarget, Severity,
    convert_parameter,
};

use crate::descriptor::{BoundValue, Indicator, ParameterDescriptor};
use crate::error::Error;
use crate::interpolate::render_literal;

/// Aggregate outcome of converting several values.
///
/// The aggregate classification is the worst single outcome; among equally
/// severe outcomes the first one is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Worst classification seen.
    pub classification: Classification,
    /// Number of values converted with a warning.
    pub warnings: usize,
    /// Number of values that could not be converted.
    pub errors: usize,
}

impl BatchOutcome {
    /// Fold one value's outcome into the aggregate.
    pub fn record(&mut self, classification: Classification) {
        match classification.severity() {
            Severity::Success => {}
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
        self.classification = self.classification.worst(classification);
    }

    /// Combine with another aggregate.
    pub fn merge(&mut self, other: &BatchOutcome) {
        self.classification = self.classification.worst(other.classification);
        self.warnings += other.warnings;
        self.errors += other.errors;
    }

    /// Whether every value converted exactly.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.classification == Classification::Success
    }
}

/// One converted parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marshalled<'a> {
    /// What to send.
    pub binding: NativeBinding<'a>,
    /// How the conversion went.
    pub classification: Classification,
    /// Deferred data, for data-at-execution parameters.
    pub long_data: Option<&'a [u8]>,
}

impl Marshalled<'_> {
    /// Append the value as a SQL literal, escaped for `charset`.
    ///
    /// # Errors
    ///
    /// See [`render_literal`].
    pub fn render(&self, charset: &Charset, out: &mut Vec<u8>) -> Result<(), ConversionError> {
        render_literal(&self.binding, self.long_data, charset, out)
    }
}

/// Convert parameter `index`'s value for parameter-set `row`.
///
/// # Errors
///
/// [`Error::NeedData`] for a data-at-execution value with no data yet,
/// [`Error::InvalidDescriptorIndex`] when the parameter has no value for
/// `row`, and the conversion's own error otherwise.
pub fn marshal_parameter<'a>(
    index: usize,
    param: &'a mut ParameterDescriptor,
    row: usize,
    ctx: &ConversionContext,
    rebind: bool,
) -> Result<Marshalled<'a>, Error> {
    let ParameterDescriptor {
        c_type,
        target,
        default_value,
        rows,
        long_data,
        scratch,
    } = param;
    let rows: &'a [BoundValue] = rows;
    let default_value: &'a Option<String> = default_value;
    let target: &ParamTarget = target;
    let long_data: &'a Option<Vec<u8>> = long_data;

    let bound = rows.get(row).ok_or(Error::InvalidDescriptorIndex { index })?;
    let binding = match (bound.indicator, &bound.value) {
        (Indicator::DataAtExec, _) => {
            if long_data.is_none() {
                return Err(Error::NeedData { index });
            }
            NativeBinding::long_data(*c_type)
        }
        (Indicator::ColumnIgnore, _) => match default_value {
            Some(default) => NativeBinding::text(default.as_bytes()),
            None => NativeBinding::null(),
        },
        (Indicator::NullData, _) | (_, None) => NativeBinding::null(),
        (_, Some(value)) => {
            let converted = convert_parameter(value, target, ctx, scratch, rebind).map_err(|e| match e {
                ConversionError::OutOfMemory => Error::OutOfMemory,
                other => Error::Conversion(other),
            })?;
            return Ok(Marshalled {
                binding: converted.binding,
                classification: converted.classification,
                long_data: None,
            });
        }
    };

    tracing::trace!(
        index,
        row,
        indicator = ?bound.indicator,
        native_type = ?binding.native_type,
        "bound special parameter value"
    );
    Ok(Marshalled {
        binding,
        classification: Classification::Success,
        long_data: long_data.as_deref(),
    })
}

/// Converted parameters of one parameter-set row.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalledRow<'a> {
    /// One entry per parameter; `None` where conversion failed.
    pub bindings: Vec<Option<Marshalled<'a>>>,
    /// Conversion failures by parameter index.
    pub errors: Vec<(usize, ConversionError)>,
    /// Aggregate outcome.
    pub outcome: BatchOutcome,
}

impl MarshalledRow<'_> {
    /// Whether every parameter produced a binding.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// SQL literals for every parameter, in marker order.
    ///
    /// `None` if the row is incomplete.
    ///
    /// # Errors
    ///
    /// The index of the first parameter without a literal form, with the
    /// error from [`render_literal`].
    pub fn literals(&self, charset: &Charset) -> Result<Option<Vec<Vec<u8>>>, (usize, ConversionError)> {
        let mut literals = Vec::with_capacity(self.bindings.len());
        for (index, marshalled) in self.bindings.iter().enumerate() {
            let Some(marshalled) = marshalled else {
                return Ok(None);
            };
            let mut out = Vec::new();
            marshalled.render(charset, &mut out).map_err(|e| (index, e))?;
            literals.push(out);
        }
        Ok(Some(literals))
    }
}

/// Convert every parameter for parameter-set `row`.
///
/// Conversion failures of single values do not stop the row: the remaining
/// parameters are still converted and the failures reported in
/// [`MarshalledRow::errors`].
///
/// # Errors
///
/// Statement-level conditions abort: [`Error::NeedData`],
/// [`Error::InvalidDescriptorIndex`] and [`Error::OutOfMemory`].
pub fn marshal_row<'a, I>(
    params: I,
    row: usize,
    ctx: &ConversionContext,
    rebind: bool,
) -> Result<MarshalledRow<'a>, Error>
where
    I: IntoIterator<Item = &'a mut ParameterDescriptor>,
{
    let mut bindings = Vec::new();
    let mut errors = Vec::new();
    let mut outcome = BatchOutcome::default();

    for (index, param) in params.into_iter().enumerate() {
        match marshal_parameter(index, param, row, ctx, rebind) {
            Ok(converted) => {
                if converted.classification.is_warning() {
                    tracing::warn!(
                        index,
                        row,
                        sqlstate = converted.classification.sqlstate(),
                        "parameter converted with warning"
                    );
                }
                outcome.record(converted.classification);
                bindings.push(Some(converted));
            }
            Err(Error::Conversion(e)) => {
                tracing::warn!(index, row, sqlstate = e.sqlstate(), error = %e, "parameter conversion failed");
                outcome.record(e.classification());
                errors.push((index, e));
                bindings.push(None);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(MarshalledRow {
        bindings,
        errors,
        outcome,
    })
}
