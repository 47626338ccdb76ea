//! Connection configuration.

use bitflags::bitflags;
use odbc_query::{DEFAULT_MAX_DEPTH, ParseOptions};
use odbc_types::{Charset, ConversionContext};

use crate::error::Error;

bitflags! {
    /// Bits of the numeric `OPTION` connection-string attribute.
    ///
    /// Only [`DsnOptions::MULTI_STATEMENTS`] changes statement handling here;
    /// the other bits are kept so a round-tripped mask is not lossy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DsnOptions: u32 {
        /// Report matched rather than changed rows.
        const FOUND_ROWS = 1 << 1;
        /// Never prompt for missing connection attributes.
        const NO_PROMPT = 1 << 4;
        /// Disable the result-set cache.
        const NO_CACHE = 1 << 20;
        /// Force forward-only cursors.
        const FORWARD_CURSOR = 1 << 21;
        /// Reconnect automatically after a lost connection.
        const AUTO_RECONNECT = 1 << 22;
        /// Allow `;`-separated statement batches.
        const MULTI_STATEMENTS = 1 << 26;
    }
}

/// Driver settings that affect statement preparation and value conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether multi-statement batches are sent as one request.
    pub multi_statements: bool,

    /// Connection character set name.
    pub charset: String,

    /// Maximum escape-clause nesting depth.
    pub max_escape_depth: usize,

    /// Whether escape clauses are left as written.
    pub no_escape_processing: bool,

    /// Raw `OPTION` bits.
    pub options: DsnOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            multi_statements: false,
            charset: "utf8mb4".to_string(),
            max_escape_depth: DEFAULT_MAX_DEPTH,
            no_escape_processing: false,
            options: DsnOptions::empty(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::Config(format!("invalid boolean for {key}: {value}"))),
    }
}

impl Config {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an ODBC-style connection string.
    ///
    /// ```text
    /// DSN=test;CHARSET=latin1;OPTION=67108864;NO_ESCAPE=0
    /// ```
    ///
    /// Keys are case-insensitive. Unknown keys are ignored.
    pub fn from_connection_string(conn_str: &str) -> Result<Self, Error> {
        let mut config = Self::default();

        for part in conn_str.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("invalid key-value: {part}")))?;

            let key = key.trim().to_ascii_uppercase();
            let value = value.trim();

            match key.as_str() {
                "MULTI_STATEMENTS" => {
                    config.multi_statements = parse_bool(&key, value)?;
                }
                "OPTION" | "OPTIONS" => {
                    let bits: u32 = value
                        .parse()
                        .map_err(|_| Error::Config(format!("invalid option mask: {value}")))?;
                    config.options = DsnOptions::from_bits_retain(bits);
                    if config.options.contains(DsnOptions::MULTI_STATEMENTS) {
                        config.multi_statements = true;
                    }
                }
                "CHARSET" => {
                    if Charset::for_name(value).is_none() {
                        return Err(Error::Config(format!("unknown character set: {value}")));
                    }
                    config.charset = value.to_string();
                }
                "MAX_ESCAPE_DEPTH" => {
                    config.max_escape_depth = value
                        .parse()
                        .map_err(|_| Error::Config(format!("invalid escape depth: {value}")))?;
                }
                "NO_ESCAPE" | "NO_ESCAPE_PROCESSING" => {
                    config.no_escape_processing = parse_bool(&key, value)?;
                }
                _ => {
                    tracing::debug!(
                        key = key.as_str(),
                        value = value,
                        "ignoring unknown connection string option"
                    );
                }
            }
        }

        Ok(config)
    }

    /// Allow or forbid multi-statement batches.
    #[must_use]
    pub fn multi_statements(mut self, enabled: bool) -> Self {
        self.multi_statements = enabled;
        self
    }

    /// Set the connection character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the maximum escape-clause nesting depth.
    #[must_use]
    pub fn max_escape_depth(mut self, depth: usize) -> Self {
        self.max_escape_depth = depth;
        self
    }

    /// Disable escape-clause rewriting.
    #[must_use]
    pub fn no_escape_processing(mut self, disabled: bool) -> Self {
        self.no_escape_processing = disabled;
        self
    }

    /// Options for preparing statements under this configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .batch_allowed(self.multi_statements)
            .escape_processing(!self.no_escape_processing)
            .max_escape_depth(self.max_escape_depth)
    }

    /// Conversion settings for this configuration.
    pub fn conversion_context(&self) -> Result<ConversionContext, Error> {
        let charset = Charset::for_name(&self.charset)
            .ok_or_else(|| Error::Config(format!("unknown character set: {}", self.charset)))?;
        Ok(ConversionContext::new(charset))
    }
}
