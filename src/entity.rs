use std::borrow::Cow;

use crate::error::Error;

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "quot" => Some('"'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Resolve predefined entities and character references.
///
/// The input is returned as is when it contains no references.
pub(crate) fn parse_entities(content: &str) -> Result<Cow<str>, Error> {
    if !content.contains('&') {
        return Ok(Cow::Borrowed(content));
    }
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '&' {
            let mut entity = String::new();
            let mut is_complete = false;
            for c in chars.by_ref() {
                if c == ';' {
                    is_complete = true;
                    break;
                }
                entity.push(c);
            }
            if !is_complete {
                return Err(Error::UnclosedEntity(entity));
            }
            match resolve_entity(&entity) {
                Some(c) => result.push(c),
                None => return Err(Error::InvalidEntity(entity)),
            }
        } else {
            result.push(c);
        }
    }
    Ok(Cow::Owned(result))
}

#[cfg(any(test, feature = "proptest"))]
pub(crate) fn serialize_entities(content: &str) -> Cow<str> {
    if !content.contains(|c| matches!(c, '&' | '\'' | '>' | '<' | '"')) {
        return Cow::Borrowed(content);
    }
    let mut result = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&apos;"),
            '>' => result.push_str("&gt;"),
            '<' => result.push_str("&lt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
