//! Shard functions for the flat-file store.
//!
//! A shard function maps a key name to the directory it lives under,
//! keeping any single directory from growing unbounded. The textual
//! form is `v1/<function>/<width>`, optionally prefixed by
//! `/repo/flatfs/shard`; the full form is what gets persisted in the
//! store's `SHARDING` marker file.

use std::fmt;

const SHARD_PREFIX: &str = "/repo/flatfs/shard";

/// Errors from parsing a shard function string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShardError {
    #[error("invalid shard function '{input}': expected v1/<function>/<width>")]
    InvalidFormat { input: String },

    #[error("unknown shard function name '{name}'")]
    UnknownFunction { name: String },

    #[error("invalid shard width '{value}': must be a positive integer")]
    InvalidWidth { value: String },
}

/// A parsed shard function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardFunc {
    /// First `width` characters of the name.
    Prefix(usize),
    /// Last `width` characters of the name.
    Suffix(usize),
    /// `width` characters preceding the last character.
    NextToLast(usize),
}

impl ShardFunc {
    /// Parse a shard function string.
    ///
    /// Accepts `v1/next-to-last/2` and the persisted long form
    /// `/repo/flatfs/shard/v1/next-to-last/2`.
    pub fn parse(input: &str) -> Result<Self, ShardError> {
        let trimmed = input
            .strip_prefix(SHARD_PREFIX)
            .unwrap_or(input)
            .trim_matches('/');

        let parts: Vec<&str> = trimmed.split('/').collect();
        let [version, name, width] = parts.as_slice() else {
            return Err(ShardError::InvalidFormat {
                input: input.to_string(),
            });
        };
        if *version != "v1" {
            return Err(ShardError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let width: usize = width.parse().map_err(|_| ShardError::InvalidWidth {
            value: (*width).to_string(),
        })?;
        if width == 0 {
            return Err(ShardError::InvalidWidth {
                value: "0".to_string(),
            });
        }

        match *name {
            "prefix" => Ok(ShardFunc::Prefix(width)),
            "suffix" => Ok(ShardFunc::Suffix(width)),
            "next-to-last" => Ok(ShardFunc::NextToLast(width)),
            other => Err(ShardError::UnknownFunction {
                name: other.to_string(),
            }),
        }
    }

    /// The shard directory for a key name. Names shorter than the
    /// shard width are padded with `_`.
    pub fn shard(&self, name: &str) -> String {
        let chars: Vec<char> = name.chars().collect();
        match *self {
            ShardFunc::Prefix(width) => {
                let mut out: String = chars.iter().take(width).collect();
                while out.chars().count() < width {
                    out.push('_');
                }
                out
            }
            ShardFunc::Suffix(width) => take_last(&chars, width),
            ShardFunc::NextToLast(width) => {
                let trimmed = &chars[..chars.len().saturating_sub(1)];
                take_last(trimmed, width)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ShardFunc::Prefix(_) => "prefix",
            ShardFunc::Suffix(_) => "suffix",
            ShardFunc::NextToLast(_) => "next-to-last",
        }
    }

    fn width(&self) -> usize {
        match *self {
            ShardFunc::Prefix(w) | ShardFunc::Suffix(w) | ShardFunc::NextToLast(w) => w,
        }
    }
}

/// Last `width` characters, left-padded with `_` when too short.
fn take_last(chars: &[char], width: usize) -> String {
    let mut out = String::new();
    for _ in chars.len()..width {
        out.push('_');
    }
    let start = chars.len().saturating_sub(width);
    out.extend(&chars[start..]);
    out
}

impl fmt::Display for ShardFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/v1/{}/{}", SHARD_PREFIX, self.name(), self.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_forms() {
        assert_eq!(
            ShardFunc::parse("v1/next-to-last/2").unwrap(),
            ShardFunc::NextToLast(2)
        );
        assert_eq!(
            ShardFunc::parse("/repo/flatfs/shard/v1/prefix/3").unwrap(),
            ShardFunc::Prefix(3)
        );
        assert_eq!(
            ShardFunc::parse("v1/suffix/4").unwrap(),
            ShardFunc::Suffix(4)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            ShardFunc::parse("invalid-name"),
            Err(ShardError::InvalidFormat { .. })
        ));
        assert!(matches!(
            ShardFunc::parse("v2/prefix/2"),
            Err(ShardError::InvalidFormat { .. })
        ));
        assert!(matches!(
            ShardFunc::parse("v1/bogus/2"),
            Err(ShardError::UnknownFunction { .. })
        ));
        assert!(matches!(
            ShardFunc::parse("v1/prefix/zero"),
            Err(ShardError::InvalidWidth { .. })
        ));
        assert!(matches!(
            ShardFunc::parse("v1/prefix/0"),
            Err(ShardError::InvalidWidth { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        for input in ["v1/prefix/2", "v1/suffix/3", "v1/next-to-last/2"] {
            let parsed = ShardFunc::parse(input).unwrap();
            let reparsed = ShardFunc::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed);
        }
        assert_eq!(
            ShardFunc::NextToLast(2).to_string(),
            "/repo/flatfs/shard/v1/next-to-last/2"
        );
    }

    #[test]
    fn shard_selection() {
        assert_eq!(ShardFunc::Prefix(2).shard("abcdef"), "ab");
        assert_eq!(ShardFunc::Suffix(2).shard("abcdef"), "ef");
        assert_eq!(ShardFunc::NextToLast(2).shard("abcdef"), "de");
    }

    #[test]
    fn short_names_are_padded() {
        assert_eq!(ShardFunc::Prefix(4).shard("ab"), "ab__");
        assert_eq!(ShardFunc::Suffix(4).shard("ab"), "__ab");
        assert_eq!(ShardFunc::NextToLast(2).shard("a"), "__");
        assert_eq!(ShardFunc::NextToLast(2).shard("ab"), "_a");
    }
}
