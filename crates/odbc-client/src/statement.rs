//! Statement lifecycle.
//!
//! A [`Statement`] ties the pieces together: preparing text through the
//! query rewriter, binding and marshalling parameters, interpolating them
//! into executable text, and converting result values into application
//! buffers.
//!
//! ```text
//! Allocated --prepare--> Prepared --execute--> Executed
//!                           ^   \                 |
//!                           |    +--> NeedData ---+ (put_data, execute)
//!                           +------ close --------+
//! ```
//!
//! The statement does no network I/O. Execution produces the text to send
//! for every parameter-set row, and result rows are loaded into the
//! statement by whoever owns the connection.

use bytes::Bytes;
use odbc_query::{ParseOptions, Query};
use odbc_types::{
    Classification, ColumnBuffer, ConversionContext, ConversionError, FetchOutcome, FieldMetadata, fetch_value,
};

use crate::config::Config;
use crate::descriptor::{ColumnBinding, ParameterDescriptor};
use crate::error::{Error, Result};
use crate::interpolate::interpolate;
use crate::marshal::{BatchOutcome, marshal_row};

/// Where a statement is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementState {
    /// No text prepared.
    Allocated,
    /// Text prepared, not executed.
    Prepared,
    /// Execution is waiting for data-at-execution parameters.
    NeedData,
    /// Executed.
    Executed,
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Executable text per parameter-set row; `None` for rows whose
    /// parameters could not all be converted.
    pub statements: Vec<Option<Bytes>>,
    /// Conversion failures as `(row, parameter, error)`.
    pub errors: Vec<(usize, usize, ConversionError)>,
    /// Aggregate outcome over every row.
    pub outcome: BatchOutcome,
}

impl Execution {
    /// Text of the rows that can be sent.
    pub fn executable(&self) -> impl Iterator<Item = &[u8]> {
        self.statements.iter().flatten().map(Bytes::as_ref)
    }
}

/// One column's fetched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnData {
    /// The value is SQL NULL; nothing was written.
    Null,
    /// The value was converted into the buffer.
    Value(FetchOutcome),
}

/// Result of fetching the bound columns of the current row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFetch {
    /// Per-column results, in the order the buffers were given.
    pub columns: Vec<(usize, std::result::Result<ColumnData, ConversionError>)>,
    /// Aggregate outcome.
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadProgress {
    Fresh,
    At(usize),
    Done,
}

/// A prepared statement and its bindings.
#[derive(Debug)]
pub struct Statement {
    parse_options: ParseOptions,
    ctx: ConversionContext,
    state: StatementState,
    query: Option<Query>,
    params: Vec<Option<ParameterDescriptor>>,
    rebind: bool,
    fields: Vec<FieldMetadata>,
    columns: Vec<Option<ColumnBinding>>,
    row: Option<Vec<Option<Vec<u8>>>>,
    progress: Vec<ReadProgress>,
}

impl Statement {
    /// Allocate a statement under `config`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the configured character set is unknown.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_context(config.parse_options(), config.conversion_context()?))
    }

    /// Allocate a statement with explicit parse and conversion settings.
    #[must_use]
    pub fn with_context(parse_options: ParseOptions, ctx: ConversionContext) -> Self {
        Self {
            parse_options,
            ctx,
            state: StatementState::Allocated,
            query: None,
            params: Vec::new(),
            rebind: true,
            fields: Vec::new(),
            columns: Vec::new(),
            row: None,
            progress: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StatementState {
        self.state
    }

    /// The prepared query, if any.
    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Conversion settings in use.
    #[must_use]
    pub fn context(&self) -> &ConversionContext {
        &self.ctx
    }

    /// Prepare `sql`, replacing any previously prepared text.
    ///
    /// Bound parameters survive a re-prepare; bindings past the new marker
    /// count are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for malformed escapes and [`Error::NoQuery`] for
    /// text with nothing to execute. The statement is left unprepared.
    pub fn prepare(&mut self, sql: &str) -> Result<()> {
        let reprepare = self.query.is_some();
        if reprepare {
            self.reset();
        }

        let query = Query::prepare(sql, self.parse_options)?;
        if query.is_empty() {
            return Err(Error::NoQuery);
        }

        tracing::debug!(
            raw_len = sql.len(),
            refined_len = query.refined_bytes().len(),
            tokens = query.token_count(),
            statements = query.sub_statements().len().max(1),
            params = query.param_count(),
            batch = query.batch_allowed(),
            reprepare,
            "prepared statement"
        );

        self.params.resize_with(query.param_count(), || None);
        self.query = Some(query);
        self.rebind = true;
        self.state = StatementState::Prepared;
        Ok(())
    }

    /// Bind parameter `index` (zero-based).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptorIndex`] if a query is prepared and has no
    /// marker `index`.
    pub fn bind_parameter(&mut self, index: usize, descriptor: ParameterDescriptor) -> Result<()> {
        if let Some(query) = &self.query {
            if index >= query.param_count() {
                return Err(Error::InvalidDescriptorIndex { index });
            }
        }
        if self.params.len() <= index {
            self.params.resize_with(index + 1, || None);
        }
        self.params[index] = Some(descriptor);
        self.rebind = true;
        Ok(())
    }

    /// The binding of parameter `index`.
    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<&ParameterDescriptor> {
        self.params.get(index).and_then(Option::as_ref)
    }

    /// Drop every parameter binding.
    pub fn reset_parameters(&mut self) {
        for slot in &mut self.params {
            *slot = None;
        }
        self.rebind = true;
    }

    /// The first data-at-execution parameter still waiting for data.
    #[must_use]
    pub fn pending_data(&self) -> Option<usize> {
        self.params.iter().position(|p| {
            p.as_ref()
                .is_some_and(|p| p.is_data_at_exec() && p.long_data().is_none())
        })
    }

    /// Supply a chunk of deferred data for parameter `index`.
    ///
    /// Chunks accumulate until the next execution.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptorIndex`] unless parameter `index` is bound
    /// as data-at-execution; [`Error::OutOfMemory`] if the data cannot be
    /// buffered.
    pub fn put_data(&mut self, index: usize, chunk: &[u8]) -> Result<()> {
        let param = self
            .params
            .get_mut(index)
            .and_then(Option::as_mut)
            .filter(|p| p.is_data_at_exec())
            .ok_or(Error::InvalidDescriptorIndex { index })?;
        param.append_long_data(chunk)?;
        tracing::trace!(index, chunk_len = chunk.len(), "buffered parameter data");
        Ok(())
    }

    /// Execute the prepared statement.
    ///
    /// Every parameter-set row is marshalled and interpolated. A row with a
    /// conversion failure yields no text but does not stop the other rows.
    ///
    /// # Errors
    ///
    /// [`Error::NoQuery`] if nothing is prepared,
    /// [`Error::ParameterCountMismatch`] if a marker is unbound, and
    /// [`Error::NeedData`] when a data-at-execution parameter still needs
    /// data; supply it with [`Statement::put_data`] and execute again.
    pub fn execute(&mut self) -> Result<Execution> {
        let query = self.query.as_ref().ok_or(Error::NoQuery)?;
        let expected = query.param_count();
        let bound = self.params.iter().take(expected).filter(|p| p.is_some()).count();
        if bound < expected {
            return Err(Error::ParameterCountMismatch { expected, bound });
        }

        let rows = self
            .params
            .iter()
            .flatten()
            .map(ParameterDescriptor::row_count)
            .max()
            .unwrap_or(1)
            .max(1);

        let mut statements = Vec::with_capacity(rows);
        let mut errors = Vec::new();
        let mut outcome = BatchOutcome::default();

        for row in 0..rows {
            let marshalled = match marshal_row(self.params.iter_mut().flatten(), row, &self.ctx, self.rebind) {
                Ok(m) => m,
                Err(e @ Error::NeedData { index }) => {
                    tracing::debug!(index, row, "execution waiting for parameter data");
                    self.state = StatementState::NeedData;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            outcome.merge(&marshalled.outcome);
            errors.extend(marshalled.errors.iter().map(|(index, e)| (row, *index, e.clone())));

            let sql = match marshalled.literals(&self.ctx.charset) {
                Ok(Some(literals)) => Some(interpolate(query, &literals)?),
                Ok(None) => None,
                Err((index, e)) => {
                    tracing::warn!(index, row, error = %e, "parameter has no literal form");
                    outcome.record(e.classification());
                    errors.push((row, index, e));
                    None
                }
            };
            statements.push(sql);
        }

        for param in self.params.iter_mut().flatten() {
            param.clear_long_data();
        }
        self.rebind = false;
        self.close();
        self.state = StatementState::Executed;

        tracing::debug!(
            rows,
            failed_rows = statements.iter().filter(|s| s.is_none()).count(),
            classification = ?outcome.classification,
            "executed statement"
        );

        Ok(Execution {
            statements,
            errors,
            outcome,
        })
    }

    /// Describe the result set produced by the last execution.
    pub fn set_result(&mut self, fields: Vec<FieldMetadata>) {
        self.progress = vec![ReadProgress::Fresh; fields.len()];
        if self.columns.len() < fields.len() {
            self.columns.resize(fields.len(), None);
        }
        self.fields = fields;
        self.row = None;
    }

    /// Result column metadata.
    #[must_use]
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Load the next row's raw values, `None` for NULL.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptorIndex`] if the row does not have one value
    /// per result column.
    pub fn load_row(&mut self, values: Vec<Option<Vec<u8>>>) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::InvalidDescriptorIndex { index: values.len() });
        }
        self.progress.fill(ReadProgress::Fresh);
        self.row = Some(values);
        Ok(())
    }

    /// Bind result column `column` (zero-based).
    pub fn bind_column(&mut self, column: usize, binding: ColumnBinding) {
        if self.columns.len() <= column {
            self.columns.resize(column + 1, None);
        }
        self.columns[column] = Some(binding);
    }

    /// Drop every column binding.
    pub fn unbind_columns(&mut self) {
        self.columns.clear();
    }

    /// Convert the current row's bound columns into `buffers`.
    ///
    /// # Errors
    ///
    /// [`Error::NoQuery`] without a loaded row and
    /// [`Error::InvalidDescriptorIndex`] for a column that is not bound.
    /// Conversion failures are reported per column.
    pub fn fetch<'b, I>(&self, buffers: I) -> Result<RowFetch>
    where
        I: IntoIterator<Item = (usize, ColumnBuffer<'b>)>,
    {
        let row = self.row.as_ref().ok_or(Error::NoQuery)?;
        let mut columns = Vec::new();
        let mut outcome = BatchOutcome::default();

        for (column, buffer) in buffers {
            let binding = self
                .columns
                .get(column)
                .copied()
                .flatten()
                .ok_or(Error::InvalidDescriptorIndex { index: column })?;
            let value = row.get(column).ok_or(Error::InvalidDescriptorIndex { index: column })?;
            let result = self.convert(column, value, &binding, 0, buffer);
            match &result {
                Ok(ColumnData::Value(fetched)) => outcome.record(fetched.classification),
                Ok(ColumnData::Null) => outcome.record(Classification::Success),
                Err(e) => {
                    tracing::warn!(column, sqlstate = e.sqlstate(), error = %e, "column conversion failed");
                    outcome.record(e.classification());
                }
            }
            columns.push((column, result));
        }

        Ok(RowFetch { columns, outcome })
    }

    /// Read column `column` of the current row piecewise.
    ///
    /// Successive calls continue where the previous one stopped while the
    /// value was truncated; once the whole value has been delivered the
    /// next call returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`Error::NoQuery`] without a loaded row,
    /// [`Error::InvalidDescriptorIndex`] for a column out of range, and
    /// [`Error::Conversion`] when the value cannot be converted.
    pub fn get_data(
        &mut self,
        column: usize,
        binding: ColumnBinding,
        buffer: ColumnBuffer<'_>,
    ) -> Result<Option<ColumnData>> {
        let row = self.row.as_ref().ok_or(Error::NoQuery)?;
        let value = row.get(column).ok_or(Error::InvalidDescriptorIndex { index: column })?;
        let offset = match self.progress[column] {
            ReadProgress::Done => return Ok(None),
            ReadProgress::Fresh => 0,
            ReadProgress::At(offset) => offset,
        };

        let data = self.convert(column, value, &binding, offset, buffer)?;
        self.progress[column] = match data {
            ColumnData::Value(fetched) if fetched.classification == Classification::StringDataTruncated => {
                ReadProgress::At(offset + fetched.written)
            }
            _ => ReadProgress::Done,
        };
        Ok(Some(data))
    }

    fn convert(
        &self,
        column: usize,
        value: &Option<Vec<u8>>,
        binding: &ColumnBinding,
        offset: usize,
        buffer: ColumnBuffer<'_>,
    ) -> std::result::Result<ColumnData, ConversionError> {
        let Some(value) = value else {
            return Ok(ColumnData::Null);
        };
        let field = &self.fields[column];
        fetch_value(field, value, &binding.request(offset), &self.ctx.charset, buffer).map(ColumnData::Value)
    }

    /// Close the open result, keeping the prepared text and all bindings.
    pub fn close(&mut self) {
        self.fields.clear();
        self.progress.clear();
        self.row = None;
        if self.query.is_some() {
            self.state = StatementState::Prepared;
        }
    }

    /// Return to the allocated state, dropping the prepared text, any open
    /// result and buffered deferred data. Bindings are kept.
    pub fn reset(&mut self) {
        self.close();
        for param in self.params.iter_mut().flatten() {
            param.clear_long_data();
        }
        self.query = None;
        self.rebind = true;
        self.state = StatementState::Allocated;
    }
}
