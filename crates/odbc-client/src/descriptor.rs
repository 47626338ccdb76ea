//! Parameter and column descriptors.
//!
//! A parameter descriptor holds what the application bound for one `?`
//! marker: the value for each row of the parameter set, its length/indicator
//! and the driver-owned scratch buffer conversions render into.

use odbc_types::{ClientType, ClientValue, FetchRequest, ParamTarget, ScratchBuffer, SqlType};

/// ODBC `SQL_NTS`.
pub const NTS: i64 = -3;
/// ODBC `SQL_NULL_DATA`.
pub const NULL_DATA: i64 = -1;
/// ODBC `SQL_DATA_AT_EXEC`.
pub const DATA_AT_EXEC: i64 = -2;
/// ODBC `SQL_COLUMN_IGNORE`.
pub const COLUMN_IGNORE: i64 = -6;
/// Lengths at or below this mark data at execution (`SQL_LEN_DATA_AT_EXEC`).
pub const LEN_DATA_AT_EXEC_OFFSET: i64 = -100;

/// How the length/indicator slot of a bound value is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// The value is this many octets long.
    Length(usize),
    /// The value ends at its first terminator.
    Nts,
    /// The value is SQL NULL.
    NullData,
    /// Use the column default.
    ColumnIgnore,
    /// The value is supplied after execution starts.
    DataAtExec,
}

impl Indicator {
    /// Interpret a raw length/indicator value.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            NTS => Some(Self::Nts),
            NULL_DATA => Some(Self::NullData),
            COLUMN_IGNORE => Some(Self::ColumnIgnore),
            DATA_AT_EXEC => Some(Self::DataAtExec),
            r if r <= LEN_DATA_AT_EXEC_OFFSET => Some(Self::DataAtExec),
            r => usize::try_from(r).ok().map(Self::Length),
        }
    }
}

/// One row's bound value for a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// The value, with the indicator's length already applied.
    pub value: Option<ClientValue>,
    /// The indicator it was bound with.
    pub indicator: Indicator,
}

fn shorten(value: ClientValue, octets: usize) -> ClientValue {
    match value {
        ClientValue::Char(mut b) => {
            b.truncate(octets);
            ClientValue::Char(b)
        }
        ClientValue::Binary(mut b) => {
            b.truncate(octets);
            ClientValue::Binary(b)
        }
        ClientValue::WChar(mut w) => {
            w.truncate(octets / 2);
            ClientValue::WChar(w)
        }
        other => other,
    }
}

impl BoundValue {
    /// Bind `value` with `indicator`.
    ///
    /// For text and binary values an explicit length shortens the value and
    /// [`Indicator::Nts`] cuts it at the first terminator. Fixed-size values
    /// ignore the length.
    #[must_use]
    pub fn new(value: ClientValue, indicator: Indicator) -> Self {
        let value = match indicator {
            Indicator::Length(n) => shorten(value, n),
            Indicator::Nts => {
                let n = value.terminated_length();
                shorten(value, n)
            }
            _ => value,
        };
        Self {
            value: Some(value),
            indicator,
        }
    }

    /// A NULL value.
    #[must_use]
    pub fn null() -> Self {
        Self {
            value: None,
            indicator: Indicator::NullData,
        }
    }

    /// A value using the column default.
    #[must_use]
    pub fn ignore() -> Self {
        Self {
            value: None,
            indicator: Indicator::ColumnIgnore,
        }
    }

    /// A value supplied later with `put_data`.
    #[must_use]
    pub fn data_at_exec() -> Self {
        Self {
            value: None,
            indicator: Indicator::DataAtExec,
        }
    }
}

/// Application binding of one parameter marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Client type of the bound values.
    pub c_type: ClientType,
    /// Declared SQL type, precision and scale.
    pub target: ParamTarget,
    /// Column default, sent for [`Indicator::ColumnIgnore`].
    pub default_value: Option<String>,
    pub(crate) rows: Vec<BoundValue>,
    pub(crate) long_data: Option<Vec<u8>>,
    pub(crate) scratch: ScratchBuffer,
}

impl ParameterDescriptor {
    /// A parameter of client type `c_type` bound to a column of `sql_type`.
    #[must_use]
    pub fn new(c_type: ClientType, sql_type: SqlType) -> Self {
        Self {
            c_type,
            target: ParamTarget::new(sql_type),
            default_value: None,
            rows: Vec::new(),
            long_data: None,
            scratch: ScratchBuffer::new(),
        }
    }

    /// Set the declared precision and scale.
    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: i8) -> Self {
        self.target = self.target.with_precision(precision, scale);
        self
    }

    /// Set the column default.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Bind a single value.
    #[must_use]
    pub fn value(mut self, value: BoundValue) -> Self {
        self.rows = vec![value];
        self
    }

    /// Bind one value per row of a parameter array.
    #[must_use]
    pub fn values(mut self, values: Vec<BoundValue>) -> Self {
        self.rows = values;
        self
    }

    /// The bound value of `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&BoundValue> {
        self.rows.get(row)
    }

    /// Number of bound rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether any row is waiting for data at execution.
    #[must_use]
    pub fn is_data_at_exec(&self) -> bool {
        self.rows.iter().any(|r| r.indicator == Indicator::DataAtExec)
    }

    /// Deferred data supplied so far.
    #[must_use]
    pub fn long_data(&self) -> Option<&[u8]> {
        self.long_data.as_deref()
    }

    pub(crate) fn append_long_data(&mut self, chunk: &[u8]) -> Result<(), crate::Error> {
        let buf = self.long_data.get_or_insert_with(Vec::new);
        buf.try_reserve(chunk.len()).map_err(|_| crate::Error::OutOfMemory)?;
        buf.extend_from_slice(chunk);
        Ok(())
    }

    pub(crate) fn clear_long_data(&mut self) {
        self.long_data = None;
    }
}

/// Application binding of one result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBinding {
    /// Client type to convert into.
    pub c_type: ClientType,
    /// Precision for NUMERIC targets.
    pub precision: u8,
    /// Scale for NUMERIC targets.
    pub scale: i8,
}

impl ColumnBinding {
    /// Bind a column as `c_type`.
    #[must_use]
    pub fn new(c_type: ClientType) -> Self {
        Self {
            c_type,
            precision: 0,
            scale: 0,
        }
    }

    /// Set precision and scale for NUMERIC targets.
    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: i8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub(crate) fn request(&self, offset: usize) -> FetchRequest {
        FetchRequest::new(self.c_type)
            .with_precision(self.precision, self.scale)
            .at_offset(offset)
    }
}
