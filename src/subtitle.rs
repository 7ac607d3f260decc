use std::borrow::Cow;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};

use crate::error::{Error, Result};

static TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})",
    )
    .expect("timing regex is valid")
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("tag regex is valid"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")
        .expect("entity regex is valid")
});

/// One cue of an `.srt` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub index: Option<usize>,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Raw text, lines joined with `\n`, markup still present.
    pub text: String,
}

impl Subtitle {
    /// The cue text with inline markup removed.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.text)
    }
}

/// Reads and parses an `.srt` file. The file must be UTF-8; a BOM is skipped.
pub fn read_srt(path: &Path) -> Result<Vec<Subtitle>> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|_| Error::NotUnicode {
        path: path.to_path_buf(),
    })?;
    parse_srt(content.strip_prefix('\u{feff}').unwrap_or(&content)).map_err(|(line, reason)| {
        Error::InvalidSubtitle {
            path: path.to_path_buf(),
            line,
            reason,
        }
    })
}

///Parses `.srt` content. Blocks without a timing line are skipped with a warning.
///Fails only when there is non-blank content but not a single valid cue; the error
///carries the 1-based line number and reason of the first skipped block.
pub fn parse_srt(content: &str) -> std::result::Result<Vec<Subtitle>, (usize, String)> {
    let mut subs = Vec::new();
    let mut first_skipped = None;
    let mut block: Vec<(usize, &str)> = Vec::new();

    let mut flush = |block: &mut Vec<(usize, &str)>| {
        if block.is_empty() {
            return;
        }
        match parse_block(block) {
            Ok(sub) => subs.push(sub),
            Err((line, reason)) => {
                log::warn!("skipping subtitle block at line {line}: {reason}");
                if first_skipped.is_none() {
                    first_skipped = Some((line, reason));
                }
            }
        }
        block.clear();
    };

    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            flush(&mut block);
        } else {
            block.push((n + 1, line));
        }
    }
    flush(&mut block);

    match first_skipped {
        Some(err) if subs.is_empty() => Err(err),
        _ => Ok(subs),
    }
}

fn parse_block(block: &[(usize, &str)]) -> std::result::Result<Subtitle, (usize, String)> {
    let mut lines = block.iter().peekable();
    let mut index = None;
    if let Some((_, first)) = lines.peek() {
        if let Ok(n) = first.trim().parse::<usize>() {
            index = Some(n);
            lines.next();
        }
    }

    let (line_no, timing) = match lines.next() {
        Some(&(n, l)) => (n, l),
        None => {
            let (n, _) = block[0];
            return Err((n, "subtitle index without timing line".to_string()));
        }
    };
    let (start_ms, end_ms) = parse_timing(timing.trim())
        .ok_or_else(|| (line_no, format!("expected timing line, found '{}'", timing.trim())))?;

    let text = lines
        .map(|(_, l)| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Subtitle {
        index,
        start_ms,
        end_ms,
        text,
    })
}

fn parse_timing(line: &str) -> Option<(u64, u64)> {
    let caps = TIMING.captures(line)?;
    let field = |i: usize| -> Option<u64> { caps.get(i)?.as_str().parse().ok() };
    let to_ms = |h: u64, m: u64, s: u64, ms: u64| ((h * 60 + m) * 60 + s) * 1000 + ms;
    Some((
        to_ms(field(1)?, field(2)?, field(3)?, field(4)?),
        to_ms(field(5)?, field(6)?, field(7)?, field(8)?),
    ))
}

///Removes inline tags such as `<i>` or `<font color="red">` and decodes character references.
///Entities are decoded one at a time (HTML5 names included); unknown ones are kept as written.
/// # Example
/// ```
/// use srt_freqs::strip_markup;
/// assert_eq!(strip_markup("<i>Tom &amp; Jerry</i>"), "Tom & Jerry");
/// assert_eq!(strip_markup("Caf&eacute; &amp; bar"), "Café & bar");
/// ```
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG.replace_all(text, "");
    ENTITY
        .replace_all(&without_tags, |caps: &Captures| {
            unescape_with(&caps[0], resolve_html5_entity)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
