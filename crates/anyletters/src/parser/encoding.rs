//! Character encodings declared by the `SET` directive.

use super::error::ParseError;

/// Code points that ISO 8859-15 places where ISO 8859-1 has other symbols.
const LATIN9_OVERRIDES: [(u8, char); 8] = [
    (0xA4, '€'),
    (0xA6, 'Š'),
    (0xA8, 'š'),
    (0xB4, 'Ž'),
    (0xB8, 'ž'),
    (0xBC, 'Œ'),
    (0xBD, 'œ'),
    (0xBE, 'Ÿ'),
];

/// Text encoding of a dictionary pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Utf8,
    Iso8859_1,
    Iso8859_15,
}

impl Encoding {
    /// Resolve a `SET` argument.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            "ISO8859-1" | "ISO-8859-1" | "LATIN1" => Ok(Encoding::Iso8859_1),
            "ISO8859-15" | "ISO-8859-15" | "LATIN9" => Ok(Encoding::Iso8859_15),
            _ => Err(ParseError::UnsupportedEncoding {
                name: name.trim().to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Iso8859_1 => "ISO8859-1",
            Encoding::Iso8859_15 => "ISO8859-15",
        }
    }

    /// Decode `bytes`, dropping a leading byte-order mark.
    pub fn decode(self, bytes: &[u8]) -> Result<String, ParseError> {
        let text = match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| {
                ParseError::InvalidEncoding {
                    encoding: self.name(),
                }
            })?,
            Encoding::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Iso8859_15 => bytes.iter().map(|&b| latin9_char(b)).collect(),
        };
        Ok(match text.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }

    /// Find the `SET` directive in raw `.aff` bytes.
    ///
    /// Directive names are ASCII in every supported encoding, so the scan
    /// works before the file is decoded.
    pub fn sniff(aff: &[u8]) -> Result<Option<Self>, ParseError> {
        for line in aff.split(|&b| b == b'\n') {
            let line = line.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(line);
            let Some(rest) = line.strip_prefix(b"SET") else {
                continue;
            };
            if !rest.first().is_some_and(u8::is_ascii_whitespace) {
                continue;
            }
            let name = String::from_utf8_lossy(rest);
            return Encoding::from_name(&name).map(Some);
        }
        Ok(None)
    }

    /// Decode a file that carries no `SET` directive: UTF-8 when valid,
    /// ISO 8859-1 otherwise.
    pub fn decode_guess(bytes: &[u8]) -> (Self, String) {
        match Encoding::Utf8.decode(bytes) {
            Ok(text) => (Encoding::Utf8, text),
            Err(_) => {
                let text = bytes.iter().map(|&b| char::from(b)).collect();
                (Encoding::Iso8859_1, text)
            }
        }
    }
}

fn latin9_char(byte: u8) -> char {
    LATIN9_OVERRIDES
        .iter()
        .find(|(b, _)| *b == byte)
        .map_or_else(|| char::from(byte), |(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        let text = Encoding::Iso8859_1.decode(b"gr\xfc\xdfe").unwrap();
        assert_eq!(text, "grüße");
    }

    #[test]
    fn latin9_differs_from_latin1_in_euro_sign() {
        assert_eq!(Encoding::Iso8859_15.decode(b"\xa4").unwrap(), "€");
        assert_eq!(Encoding::Iso8859_1.decode(b"\xa4").unwrap(), "¤");
    }

    #[test]
    fn utf8_rejects_latin1_bytes() {
        let err = Encoding::Utf8.decode(b"gr\xfc\xdfe").unwrap_err();
        assert_eq!(err, ParseError::InvalidEncoding { encoding: "UTF-8" });
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let text = Encoding::Utf8.decode(b"\xEF\xBB\xBFSET UTF-8").unwrap();
        assert_eq!(text, "SET UTF-8");
    }

    #[test]
    fn sniff_finds_set_directive() {
        let aff = b"# comment\nSET ISO8859-15\r\nTRY abc\n";
        assert_eq!(Encoding::sniff(aff).unwrap(), Some(Encoding::Iso8859_15));
    }

    #[test]
    fn sniff_without_set_returns_none() {
        assert_eq!(Encoding::sniff(b"TRY abc\nSETTING x\n").unwrap(), None);
    }

    #[test]
    fn sniff_rejects_unknown_encoding() {
        let err = Encoding::sniff(b"SET KOI8-R\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedEncoding {
                name: "KOI8-R".to_string()
            }
        );
    }

    #[test]
    fn guess_falls_back_to_latin1() {
        let (encoding, text) = Encoding::decode_guess(b"caf\xe9");
        assert_eq!(encoding, Encoding::Iso8859_1);
        assert_eq!(text, "café");
    }
}
