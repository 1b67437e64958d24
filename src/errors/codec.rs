use thiserror::Error;

/// Delimiter between the source prefix and the public code
pub const PREFIX_DELIMITER: &str = ": ";

/// Separator between the public code and the human message
pub const CODE_SEPARATOR: char = ',';

/// Reasons an error string does not follow the `"<prefix>: <code>, <message>"` convention.
///
/// A decode failure means the code that produced the error string is buggy. It is
/// never the caller's fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Text does not start with `"<prefix>: "`
    #[error("encoded error does not start with prefix '{prefix}: '")]
    PrefixMismatch { prefix: String },

    /// No comma after the prefix
    #[error("encoded error has no ',' after prefix '{prefix}: '")]
    MissingComma { prefix: String },

    /// The comma directly follows the delimiter
    #[error("encoded error has an empty code after prefix '{prefix}: '")]
    EmptyCode { prefix: String },
}

/// Encode a public code and message as `"<prefix>: <code>, <message>"`.
///
/// `code` must not contain a comma and `prefix` must not contain `": "`.
pub fn encode(prefix: &str, code: &str, message: &str) -> String {
    debug_assert!(
        !prefix.contains(PREFIX_DELIMITER),
        "error prefix {prefix:?} contains the delimiter {PREFIX_DELIMITER:?}"
    );
    debug_assert!(
        !code.is_empty() && !code.contains(CODE_SEPARATOR),
        "error code {code:?} is empty or contains {CODE_SEPARATOR:?}"
    );

    format!("{prefix}{PREFIX_DELIMITER}{code}{CODE_SEPARATOR} {message}")
}

/// Extract the public code from an encoded error string.
pub fn decode<'a>(prefix: &str, encoded: &'a str) -> Result<&'a str, DecodeError> {
    let rest = encoded
        .strip_prefix(prefix)
        .and_then(|s| s.strip_prefix(PREFIX_DELIMITER))
        .ok_or_else(|| DecodeError::PrefixMismatch {
            prefix: prefix.to_string(),
        })?;

    let end = rest
        .find(CODE_SEPARATOR)
        .ok_or_else(|| DecodeError::MissingComma {
            prefix: prefix.to_string(),
        })?;

    if end == 0 {
        return Err(DecodeError::EmptyCode {
            prefix: prefix.to_string(),
        });
    }

    Ok(&rest[..end])
}

/// Split an encoded error string into its code and human message.
///
/// The message is everything after the first comma, with one leading space removed.
pub fn split<'a>(prefix: &str, encoded: &'a str) -> Result<(&'a str, &'a str), DecodeError> {
    let code = decode(prefix, encoded)?;
    let offset = prefix.len() + PREFIX_DELIMITER.len() + code.len() + CODE_SEPARATOR.len_utf8();
    let tail = &encoded[offset..];
    Ok((code, tail.strip_prefix(' ').unwrap_or(tail)))
}
