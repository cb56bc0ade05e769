use std::path::PathBuf;

/// Errors that can occur while turning XML into a [`DocumentMap`](crate::DocumentMap).
///
/// Building the map itself never fails; every error is raised at the
/// boundary, either while reading the input or while tokenizing it. When an
/// error is returned, any partially built map is discarded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// The input was empty, or contained only whitespace.
    #[error("empty input: nothing to parse")]
    EmptyInput,
    /// An entity reference was not terminated with `;`.
    #[error("unclosed entity: &{0}")]
    UnclosedEntity(String),
    /// An entity reference that is neither predefined nor a valid character
    /// reference.
    #[error("invalid entity: &{0};")]
    InvalidEntity(String),
    /// A namespace prefix was used without being declared.
    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),
    /// A close tag does not match the element that is open.
    #[error("invalid close tag: expected </{0}>, found </{1}>")]
    InvalidCloseTag(String, String),
    /// A close tag without any open element.
    #[error("close tag </{0}> without open element")]
    UnexpectedCloseTag(String),
    /// The input ended while elements were still open.
    #[error("unclosed tag: <{0}>")]
    UnclosedTag(String),
    /// There is no element at the top level of the document.
    #[error("no element at top level")]
    NoElementAtTopLevel,
    /// More than one element at the top level of the document.
    #[error("multiple elements at top level: <{0}>")]
    MultipleTopLevelElements(String),
    /// The bytes could not be decoded in the detected encoding.
    #[error("cannot decode input as {0}")]
    Encoding(&'static str),
    /// Syntax error reported by the tokenizer.
    #[error("XML syntax error: {0}")]
    Parser(#[from] xmlparser::Error),
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the XML itself is malformed, as opposed to
    /// missing or empty input or an I/O failure.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            Error::FileNotFound(_) | Error::EmptyInput | Error::Io(_)
        )
    }
}
