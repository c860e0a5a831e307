//! Alias expansion for request and export strings.
//!
//! A [`ShortcutTable`] maps aliases to replacement text. An alias is only
//! replaced where it stands alone: preceded by a boundary character or the
//! start of the text, and followed by a boundary character or the end.
//! Replacement text is expanded again, so aliases may refer to each other.

use core_types::{LoaderError, LoaderResult};
use std::fmt::Write as _;

/// Boundary characters for request strings.
pub const QUERY_BOUNDARIES: &str = ",.:;/!} ";

/// Boundary characters for export strings.
pub const EXPORT_BOUNDARIES: &str = ",.:; ";

/// Maximum nesting of substitutions before expansion is treated as a cycle.
pub const MAX_DEPTH: usize = 50;

/// An alias table.
///
/// Aliases are case-sensitive: `CLS` and `cls` are different aliases. When
/// several aliases match at the same position the longest one wins. A braced
/// reference `{alias}` is replaced together with its braces, regardless of
/// the characters around it.
///
/// # Examples
///
/// ```
/// use resource_loader::ShortcutTable;
///
/// let mut table = ShortcutTable::for_queries();
/// table.add([("jQuery", "libs/jquery"), ("$", "jQuery")]);
///
/// assert_eq!(table.replace_in("$; app").unwrap(), "libs/jquery; app");
/// assert_eq!(table.replace_in("my$").unwrap(), "my$");
/// ```
#[derive(Debug, Clone)]
pub struct ShortcutTable {
    entries: Vec<(String, String)>,
    boundaries: String,
}

impl ShortcutTable {
    /// Creates an empty table with the given boundary characters.
    pub fn new(boundaries: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            boundaries: boundaries.into(),
        }
    }

    /// Creates an empty table for request strings.
    pub fn for_queries() -> Self {
        Self::new(QUERY_BOUNDARIES)
    }

    /// Creates an empty table for export strings.
    pub fn for_exports() -> Self {
        Self::new(EXPORT_BOUNDARIES)
    }

    /// Merges aliases into the table. An alias already present is replaced.
    pub fn add<I, K, V>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (alias, text) in mapping {
            let (alias, text) = (alias.into(), text.into());
            if alias.is_empty() {
                continue;
            }
            match self.entries.iter_mut().find(|(known, _)| *known == alias) {
                Some(entry) => *entry = (alias, text),
                None => self.entries.push((alias, text)),
            }
        }
    }

    /// Returns the replacement text of `alias`.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(known, _)| known == alias)
            .map(|(_, text)| text.as_str())
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no aliases.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(alias, replacement)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    /// Removes every alias.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces every standalone alias in `text` with its full expansion.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::ShortcutRecursion`] when substitutions nest
    /// deeper than [`MAX_DEPTH`].
    pub fn replace_in(&self, text: &str) -> LoaderResult<String> {
        if self.entries.is_empty() {
            return Ok(text.to_string());
        }
        let mut trail = Vec::new();
        self.expand(text, &mut trail)
    }

    fn expand(&self, text: &str, trail: &mut Vec<String>) -> LoaderResult<String> {
        let mut result = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < text.len() {
            if let Some((alias, replacement, consumed)) = self.match_at(text, pos) {
                trail.push(format!("{}: {}", text, alias));
                if trail.len() > MAX_DEPTH {
                    return Err(self.recursion_error(trail));
                }
                tracing::trace!(alias = %alias, depth = trail.len(), "expanding shortcut");

                result.push_str(&self.expand(replacement, trail)?);
                trail.pop();
                pos += consumed;
                continue;
            }

            let Some(ch) = text[pos..].chars().next() else {
                break;
            };
            result.push(ch);
            pos += ch.len_utf8();
        }

        Ok(result)
    }

    /// Finds an alias occurrence starting at byte offset `pos`.
    ///
    /// Returns the matched alias, its replacement and the number of bytes it
    /// covers in `text`.
    fn match_at(&self, text: &str, pos: usize) -> Option<(&str, &str, usize)> {
        let rest = &text[pos..];

        if let Some(inner) = rest.strip_prefix('{') {
            if let Some(close) = inner.find('}') {
                let name = &inner[..close];
                if let Some((alias, replacement)) =
                    self.entries.iter().find(|(known, _)| known == name)
                {
                    return Some((alias.as_str(), replacement.as_str(), close + 2));
                }
            }
        }

        let starts_clean = text[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| self.is_boundary(c));
        if !starts_clean {
            return None;
        }

        self.entries
            .iter()
            .filter(|(alias, _)| {
                rest.starts_with(alias.as_str())
                    && rest[alias.len()..]
                        .chars()
                        .next()
                        .map_or(true, |c| self.is_boundary(c))
            })
            .max_by_key(|(alias, _)| alias.len())
            .map(|(alias, replacement)| (alias.as_str(), replacement.as_str(), alias.len()))
    }

    fn is_boundary(&self, c: char) -> bool {
        self.boundaries.contains(c)
    }

    fn recursion_error(&self, trail: &[String]) -> LoaderError {
        let mut dump = String::from("shortcuts:\n");
        for (alias, text) in &self.entries {
            let _ = writeln!(dump, "  {} => {}", alias, text);
        }
        dump.push_str("trail:\n");
        for crumb in trail {
            let _ = writeln!(dump, "  {}", crumb);
        }
        LoaderError::ShortcutRecursion {
            trail: trail.to_vec(),
            dump,
        }
    }
}
