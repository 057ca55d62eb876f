//! Per-tile write decisions for resumable bulk generation.

use std::fmt;
use std::str::FromStr;

use mosaic_common::MosaicError;
use serde::{Deserialize, Serialize};

use crate::reader::TileInput;

/// Sample value of pixels that carry no data.
pub const FILL_VALUE: i32 = 0;

/// Whether tiles are written, and which ones are skipped.
///
/// | Policy                | overwrite | include empty |
/// |-----------------------|-----------|---------------|
/// | `Overwrite`           | yes       | yes           |
/// | `WriteNewsOnly`       | no        | yes           |
/// | `WriteNewsNonempty`   | no        | no            |
/// | `NoWrite`             | no        | no            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileWritingPolicy {
    /// Write every tile, replacing existing files.
    Overwrite,
    /// Write only tiles whose file does not exist yet.
    WriteNewsOnly,
    /// Like `WriteNewsOnly`, also skipping tiles with only fill values.
    WriteNewsNonempty,
    /// Never write. Useful for a dry run.
    NoWrite,
}

/// Outcome of a write policy for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDecision {
    Write,
    SkipExisting,
    SkipEmpty,
    Disabled,
}

impl WriteDecision {
    pub fn proceeds(&self) -> bool {
        matches!(self, WriteDecision::Write)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteDecision::Write => "write",
            WriteDecision::SkipExisting => "skip_existing",
            WriteDecision::SkipEmpty => "skip_empty",
            WriteDecision::Disabled => "disabled",
        }
    }
}

impl fmt::Display for WriteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TileWritingPolicy {
    pub const ALL: [TileWritingPolicy; 4] = [
        TileWritingPolicy::Overwrite,
        TileWritingPolicy::WriteNewsOnly,
        TileWritingPolicy::WriteNewsNonempty,
        TileWritingPolicy::NoWrite,
    ];

    /// Whether existing outputs are replaced.
    pub fn overwrite(&self) -> bool {
        matches!(self, TileWritingPolicy::Overwrite)
    }

    /// Whether tiles with only fill values are written.
    pub fn include_empty(&self) -> bool {
        matches!(
            self,
            TileWritingPolicy::Overwrite | TileWritingPolicy::WriteNewsOnly
        )
    }

    /// Decide for a tile whose output existence and emptiness are known.
    pub fn decide(&self, exists: bool, empty: bool) -> WriteDecision {
        if *self == TileWritingPolicy::NoWrite {
            WriteDecision::Disabled
        } else if exists && !self.overwrite() {
            WriteDecision::SkipExisting
        } else if empty && !self.include_empty() {
            WriteDecision::SkipEmpty
        } else {
            WriteDecision::Write
        }
    }

    /// Shorthand for `decide(exists, empty).proceeds()`.
    pub fn should_write(&self, exists: bool, empty: bool) -> bool {
        self.decide(exists, empty).proceeds()
    }

    /// Decision taken before opening `output`, emptiness still unknown.
    ///
    /// Only file outputs can be checked for existence; every other kind of
    /// output is assumed new.
    pub fn check_output(&self, output: &TileInput) -> WriteDecision {
        let exists = !self.overwrite()
            && output.as_path().map(|path| path.is_file()).unwrap_or(false);
        self.decide(exists, false)
    }

    /// Whether `output` still has to be produced.
    pub fn needs_write(&self, output: &TileInput) -> bool {
        self.check_output(output).proceeds()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileWritingPolicy::Overwrite => "OVERWRITE",
            TileWritingPolicy::WriteNewsOnly => "WRITE_NEWS_ONLY",
            TileWritingPolicy::WriteNewsNonempty => "WRITE_NEWS_NONEMPTY",
            TileWritingPolicy::NoWrite => "NO_WRITE",
        }
    }
}

impl Default for TileWritingPolicy {
    fn default() -> Self {
        TileWritingPolicy::WriteNewsOnly
    }
}

impl fmt::Display for TileWritingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileWritingPolicy {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        TileWritingPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| MosaicError::invalid_config(format!("unknown tile writing policy '{}'", s)))
    }
}

/// True when every sample equals `fill`. An empty slice counts as empty.
pub fn is_empty<T: PartialEq>(samples: &[T], fill: T) -> bool {
    samples.iter().all(|sample| *sample == fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        use TileWritingPolicy::*;
        assert!(Overwrite.overwrite() && Overwrite.include_empty());
        assert!(!WriteNewsOnly.overwrite() && WriteNewsOnly.include_empty());
        assert!(!WriteNewsNonempty.overwrite() && !WriteNewsNonempty.include_empty());
        assert!(!NoWrite.overwrite() && !NoWrite.include_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "write-news-nonempty".parse::<TileWritingPolicy>().unwrap(),
            TileWritingPolicy::WriteNewsNonempty
        );
        assert_eq!(
            " OVERWRITE ".parse::<TileWritingPolicy>().unwrap(),
            TileWritingPolicy::Overwrite
        );
        assert!("sometimes".parse::<TileWritingPolicy>().is_err());
        for policy in TileWritingPolicy::ALL {
            assert_eq!(policy.to_string().parse::<TileWritingPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TileWritingPolicy::WriteNewsOnly).unwrap();
        assert_eq!(json, "\"WRITE_NEWS_ONLY\"");
    }

    #[test]
    fn test_non_file_outputs_are_new() {
        let output = TileInput::url("https://example.org/t.png");
        assert!(TileWritingPolicy::WriteNewsOnly.needs_write(&output));
        assert!(!TileWritingPolicy::NoWrite.needs_write(&output));
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&[0u8, 0, 0], 0));
        assert!(!is_empty(&[0u8, 1, 0], 0));
        assert!(is_empty(&[-9999i32; 4], -9999));
        assert!(is_empty::<u16>(&[], 0));
    }
}
