//! Connection character set handling for wide-character values.
//!
//! With the `encoding` feature any WHATWG label (plus the engine's own
//! `utf8mb4`/`latin1` style names) is accepted. Without it only UTF-8 is
//! available.

use crate::error::ConversionError;

#[cfg(feature = "encoding")]
use encoding_rs::Encoding;

/// The character set narrow text is exchanged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    name: String,
    #[cfg(feature = "encoding")]
    encoding: &'static Encoding,
}

fn is_utf8_name(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "utf8" | "utf8mb3" | "utf8mb4" | "utf-8"
    )
}

impl Charset {
    /// UTF-8.
    #[must_use]
    pub fn utf8() -> Self {
        Self {
            name: "utf8mb4".to_string(),
            #[cfg(feature = "encoding")]
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Resolve a character set by name; `None` if it is unknown.
    #[must_use]
    pub fn for_name(name: &str) -> Option<Self> {
        if is_utf8_name(name) {
            return Some(Self {
                name: name.to_string(),
                ..Self::utf8()
            });
        }
        Self::lookup(name)
    }

    #[cfg(feature = "encoding")]
    fn lookup(name: &str) -> Option<Self> {
        let encoding = match name.to_ascii_lowercase().as_str() {
            "latin1" | "ascii" => encoding_rs::WINDOWS_1252,
            "sjis" | "cp932" => encoding_rs::SHIFT_JIS,
            "ujis" | "eucjpms" => encoding_rs::EUC_JP,
            "euckr" => encoding_rs::EUC_KR,
            "gbk" | "gb2312" => encoding_rs::GBK,
            "gb18030" => encoding_rs::GB18030,
            "big5" => encoding_rs::BIG5,
            "koi8r" => encoding_rs::KOI8_R,
            "koi8u" => encoding_rs::KOI8_U,
            "cp1250" => encoding_rs::WINDOWS_1250,
            "cp1251" => encoding_rs::WINDOWS_1251,
            "cp1256" => encoding_rs::WINDOWS_1256,
            "cp1257" => encoding_rs::WINDOWS_1257,
            "latin2" => encoding_rs::ISO_8859_2,
            "greek" => encoding_rs::ISO_8859_7,
            "hebrew" => encoding_rs::ISO_8859_8,
            "latin5" => encoding_rs::WINDOWS_1254,
            other => Encoding::for_label(other.as_bytes())?,
        };
        Some(Self {
            name: name.to_string(),
            encoding,
        })
    }

    #[cfg(not(feature = "encoding"))]
    fn lookup(_name: &str) -> Option<Self> {
        None
    }

    /// The name the character set was resolved from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether narrow text is UTF-8.
    #[must_use]
    pub fn is_utf8(&self) -> bool {
        #[cfg(feature = "encoding")]
        {
            self.encoding == encoding_rs::UTF_8
        }
        #[cfg(not(feature = "encoding"))]
        {
            true
        }
    }

    /// Length of the character starting at `bytes[0]` in a character set
    /// whose trail bytes can fall in the ASCII range.
    ///
    /// Returns 1 for single-byte characters, for malformed or truncated
    /// sequences, and for every byte of a character set where no trail byte
    /// can be mistaken for a quote or backslash. Literal escaping must copy a
    /// longer character verbatim.
    #[must_use]
    pub fn ascii_trail_len(&self, bytes: &[u8]) -> usize {
        #[cfg(feature = "encoding")]
        {
            let (Some(&lead), Some(&trail)) = (bytes.first(), bytes.get(1)) else {
                return 1;
            };
            let enc = self.encoding;
            if enc == encoding_rs::SHIFT_JIS {
                let lead_ok = matches!(lead, 0x81..=0x9F | 0xE0..=0xFC);
                let trail_ok = matches!(trail, 0x40..=0x7E | 0x80..=0xFC);
                if lead_ok && trail_ok {
                    return 2;
                }
            } else if enc == encoding_rs::GBK || enc == encoding_rs::GB18030 {
                if !(0x81..=0xFE).contains(&lead) {
                    return 1;
                }
                if matches!(trail, 0x40..=0x7E | 0x80..=0xFE) {
                    return 2;
                }
                if enc == encoding_rs::GB18030
                    && trail.is_ascii_digit()
                    && matches!(bytes.get(2), Some(0x81..=0xFE))
                    && bytes.get(3).is_some_and(u8::is_ascii_digit)
                {
                    return 4;
                }
            } else if enc == encoding_rs::BIG5 {
                let lead_ok = (0x81..=0xFE).contains(&lead);
                let trail_ok = matches!(trail, 0x40..=0x7E | 0xA1..=0xFE);
                if lead_ok && trail_ok {
                    return 2;
                }
            }
            1
        }
        #[cfg(not(feature = "encoding"))]
        {
            let _ = bytes;
            1
        }
    }

    /// Transcode UTF-16 code units to narrow text.
    ///
    /// Unpaired surrogates become U+FFFD; characters the target set cannot
    /// represent become numeric character references.
    ///
    /// # Errors
    ///
    /// [`ConversionError::OutOfMemory`] if the output buffer cannot be grown.
    pub fn encode_utf16(&self, units: &[u16]) -> Result<Vec<u8>, ConversionError> {
        let mut text = String::new();
        text.try_reserve(units.len())
            .map_err(|_| ConversionError::OutOfMemory)?;
        text.extend(char::decode_utf16(units.iter().copied()).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));

        #[cfg(feature = "encoding")]
        {
            let (bytes, _, _) = self.encoding.encode(&text);
            Ok(bytes.into_owned())
        }
        #[cfg(not(feature = "encoding"))]
        {
            Ok(text.into_bytes())
        }
    }

    /// Transcode narrow text to UTF-16 code units, replacing malformed input with U+FFFD.
    #[must_use]
    pub fn decode_to_utf16(&self, bytes: &[u8]) -> Vec<u16> {
        #[cfg(feature = "encoding")]
        {
            let (text, _) = self.encoding.decode_without_bom_handling(bytes);
            text.encode_utf16().collect()
        }
        #[cfg(not(feature = "encoding"))]
        {
            String::from_utf8_lossy(bytes).encode_utf16().collect()
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}
