use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use xhtmlchardet::detect;

use crate::error::Error;

fn encoding(data: &[u8]) -> &'static Encoding {
    let mut cursor = std::io::Cursor::new(data);
    let charsets = detect(&mut cursor, None).unwrap_or_default();
    // nothing detected means UTF-8, as for any XML without a declaration
    charsets
        .first()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode raw document bytes into text.
///
/// A byte order mark wins over the encoding named in the XML declaration.
/// Bytes that are invalid in the detected encoding are an error rather
/// than being replaced.
pub(crate) fn decode(data: &[u8]) -> Result<Cow<str>, Error> {
    let encoding = encoding(data);
    let (text, used, had_errors) = encoding.decode(data);
    if had_errors {
        return Err(Error::Encoding(used.name()));
    }
    log::debug!("decoded input as {}", used.name());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_without_declaration() {
        assert_eq!(encoding(b"<a/>").name(), "UTF-8");
        assert_eq!(decode("<a>é</a>".as_bytes()).unwrap(), "<a>é</a>");
    }

    #[test]
    fn test_iso8859_1() {
        let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a>\xe9</a>";
        // windows-1252 is a superset of 8859-1
        assert_eq!(encoding(data).name(), "windows-1252");
        assert!(decode(data).unwrap().ends_with("<a>é</a>"));
    }

    #[test]
    fn test_bom_stripped() {
        let data = b"\xef\xbb\xbf<a/>";
        assert_eq!(decode(data).unwrap(), "<a/>");
    }

    #[test]
    fn test_invalid_utf8() {
        let data = b"<a>\xff\xfe\xfd</a>";
        assert!(matches!(decode(data), Err(Error::Encoding(_))));
    }
}
