use std::fmt;

use crate::core::error::{ModError, ModResult};

/// Which file of a mod a reference asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModSelector {
    /// Newest file allowed by the release channel.
    Latest,
    /// `identifier:fileId`
    File(u64),
    /// `identifier@partial`, matched case-insensitively.
    Partial(String),
}

/// A parsed mod reference.
///
/// Supported formats:
///   `identifier`
///   `identifier:fileId`
///   `identifier@partial`
///
/// `identifier` is a numeric mod id or a slug that needs a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModReference {
    /// The token exactly as supplied.
    pub raw: String,
    pub identifier: String,
    pub selector: ModSelector,
    pub is_slug: bool,
}

impl ModReference {
    pub fn parse(raw: &str) -> ModResult<Self> {
        let token = raw.trim();

        // ':' binds first, so `a@b:1` is identifier `a@b` (rejected below).
        let (identifier, selector) = if let Some((id, file)) = token.split_once(':') {
            if file.is_empty() || !file.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ModError::invalid_reference(
                    token,
                    "file id must be numeric",
                ));
            }
            let file_id = file
                .parse::<u64>()
                .map_err(|_| ModError::invalid_reference(token, "file id out of range"))?;
            (id, ModSelector::File(file_id))
        } else if let Some((id, partial)) = token.split_once('@') {
            (id, ModSelector::Partial(partial.to_string()))
        } else {
            (token, ModSelector::Latest)
        };

        if identifier.is_empty() {
            return Err(ModError::invalid_reference(token, "missing mod identifier"));
        }
        if identifier
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '@' | ':' | '#'))
        {
            return Err(ModError::invalid_reference(
                token,
                "unexpected character in mod identifier",
            ));
        }

        let is_slug = identifier.parse::<u64>().is_err();

        Ok(Self {
            raw: token.to_string(),
            identifier: identifier.to_string(),
            selector,
            is_slug,
        })
    }

    /// Numeric mod id, when the identifier is not a slug.
    pub fn mod_id(&self) -> Option<u64> {
        if self.is_slug {
            None
        } else {
            self.identifier.parse().ok()
        }
    }

    pub fn file_id(&self) -> Option<u64> {
        match self.selector {
            ModSelector::File(id) => Some(id),
            _ => None,
        }
    }

    pub fn partial(&self) -> Option<&str> {
        match &self.selector {
            ModSelector::Partial(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ModReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
