//! Tile input name templates.

use std::fmt;

use mosaic_common::{MosaicError, MosaicResult};
use serde::{Deserialize, Serialize};

use crate::reader::TileInput;

/// What kind of input a pattern expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    File,
    Url,
}

/// Widest zero padding a placeholder may ask for.
pub const MAX_PLACEHOLDER_WIDTH: usize = 32;

/// Template naming the tile at a grid cell of a level.
///
/// Supported placeholders are `{level}`, `{x}` (alias `{col}`) and `{y}` (alias
/// `{row}`). A placeholder may carry a zero-padded width such as `{x:03}`, up
/// to `MAX_PLACEHOLDER_WIDTH`. The template is parsed once on construction;
/// a bad template is still accepted and shows up as a per-tile lookup failure.
///
/// ```text
/// tiles/L{level}_{y:03}_{x:03}.png  ->  tiles/L2_004_017.png
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPattern", into = "RawPattern")]
pub struct TilePattern {
    kind: PatternKind,
    template: String,
    pieces: Result<Vec<Piece>, String>,
}

#[derive(Serialize, Deserialize)]
struct RawPattern {
    kind: PatternKind,
    template: String,
}

impl From<RawPattern> for TilePattern {
    fn from(raw: RawPattern) -> Self {
        TilePattern::new(raw.kind, raw.template)
    }
}

impl From<TilePattern> for RawPattern {
    fn from(pattern: TilePattern) -> Self {
        RawPattern {
            kind: pattern.kind,
            template: pattern.template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Level,
    Column,
    Row,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder { field: Field, width: usize },
}

impl TilePattern {
    pub fn new(kind: PatternKind, template: impl Into<String>) -> Self {
        let template = template.into();
        let pieces = parse(&template);
        Self {
            kind,
            template,
            pieces,
        }
    }

    pub fn file(template: impl Into<String>) -> Self {
        Self::new(PatternKind::File, template)
    }

    pub fn url(template: impl Into<String>) -> Self {
        Self::new(PatternKind::Url, template)
    }

    /// Pick the kind from the template: anything with `://` is a URL.
    pub fn infer(template: impl Into<String>) -> Self {
        let template = template.into();
        if template.contains("://") {
            Self::url(template)
        } else {
            Self::file(template)
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Check the template without expanding it.
    pub fn validate(&self) -> MosaicResult<()> {
        self.pieces()?;
        if self.kind == PatternKind::Url {
            check_scheme(&self.template)?;
        }
        Ok(())
    }

    /// Expand the template for one grid cell.
    pub fn format(&self, level: u32, column: u32, row: u32) -> MosaicResult<TileInput> {
        let mut out = String::with_capacity(self.template.len() + 8);
        for piece in self.pieces()? {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder { field, width } => {
                    let value = match field {
                        Field::Level => level,
                        Field::Column => column,
                        Field::Row => row,
                    };
                    out.push_str(&format!("{:0width$}", value, width = *width));
                }
            }
        }
        match self.kind {
            PatternKind::File => Ok(TileInput::file(out)),
            PatternKind::Url => {
                check_scheme(&out)?;
                Ok(TileInput::url(out))
            }
        }
    }

    fn pieces(&self) -> MosaicResult<&[Piece]> {
        self.pieces
            .as_deref()
            .map_err(|message| MosaicError::malformed(message.clone()))
    }
}

fn parse(template: &str) -> Result<Vec<Piece>, String> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            pieces.push(Piece::Literal(rest[..open].to_string()));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| format!("unterminated placeholder in '{}'", template))?;
        pieces.push(placeholder(template, &after[..close])?);
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest.to_string()));
    }
    Ok(pieces)
}

fn placeholder(template: &str, body: &str) -> Result<Piece, String> {
    let (name, width) = match body.split_once(':') {
        Some((name, spec)) => {
            let width = spec
                .strip_prefix('0')
                .unwrap_or(spec)
                .parse::<usize>()
                .ok()
                .filter(|width| *width <= MAX_PLACEHOLDER_WIDTH)
                .ok_or_else(|| {
                    format!(
                        "bad width '{}' in placeholder '{{{}}}', expected at most {}",
                        spec, body, MAX_PLACEHOLDER_WIDTH
                    )
                })?;
            (name, width)
        }
        None => (body, 0),
    };
    let field = match name {
        "level" => Field::Level,
        "x" | "col" => Field::Column,
        "y" | "row" => Field::Row,
        other => {
            return Err(format!(
                "unknown placeholder '{{{}}}' in '{}'",
                other, template
            ))
        }
    };
    Ok(Piece::Placeholder { field, width })
}

fn check_scheme(url: &str) -> MosaicResult<()> {
    match url.split_once("://") {
        Some((scheme, _))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            Ok(())
        }
        _ => Err(MosaicError::malformed(format!(
            "tile URL has no scheme: '{}'",
            url
        ))),
    }
}

impl fmt::Display for TilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
