//! Parsing of the path forms the exporter accepts (§4.1): a raw CID byte
//! string, an already-parsed CID, or a text path of the form
//! `[/ipfs/]<cid>[/<seg>[/<seg>...]]`.

use bytes::Bytes;
use cid::Cid;

use crate::errors::ExporterError;

/// The result of parsing one of the accepted input forms: a root CID plus
/// whatever path segments remain to be resolved under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub cid: Cid,
    pub segments: Vec<String>,
}

/// Anything [`parse`] accepts. Bytes and an already-parsed `Cid` are taken
/// verbatim with an empty remainder (§4.1 rule 1); a `String`/`&str` is
/// tokenized (rules 2-3).
pub enum PathInput {
    Cid(Cid),
    Bytes(Bytes),
    Text(String),
}

impl From<Cid> for PathInput {
    fn from(cid: Cid) -> Self {
        PathInput::Cid(cid)
    }
}

impl From<Bytes> for PathInput {
    fn from(bytes: Bytes) -> Self {
        PathInput::Bytes(bytes)
    }
}

impl From<String> for PathInput {
    fn from(text: String) -> Self {
        PathInput::Text(text)
    }
}

impl From<&str> for PathInput {
    fn from(text: &str) -> Self {
        PathInput::Text(text.to_string())
    }
}

/// Parse one of the accepted input forms into a [`ParsedPath`].
pub fn parse(input: impl Into<PathInput>) -> Result<ParsedPath, ExporterError> {
    match input.into() {
        PathInput::Cid(cid) => Ok(ParsedPath {
            cid,
            segments: Vec::new(),
        }),
        PathInput::Bytes(bytes) => {
            let cid = Cid::try_from(bytes.as_ref())
                .map_err(|e| ExporterError::input(format!("invalid CID bytes: {e}")))?;
            Ok(ParsedPath {
                cid,
                segments: Vec::new(),
            })
        }
        PathInput::Text(text) => parse_text(&text),
    }
}

fn parse_text(input: &str) -> Result<ParsedPath, ExporterError> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if let Ok(cid) = Cid::try_from(stripped.as_str()) {
        return Ok(ParsedPath {
            cid,
            segments: Vec::new(),
        });
    }

    let rest = stripped.strip_prefix("/ipfs/").unwrap_or(&stripped);
    let mut components = split_unescaped(rest).into_iter();

    let head = components
        .next()
        .ok_or_else(|| ExporterError::input("empty path"))?;
    let cid = Cid::try_from(head.as_str())
        .map_err(|e| ExporterError::input(format!("invalid CID '{head}': {e}")))?;

    Ok(ParsedPath {
        cid,
        segments: components.collect(),
    })
}

/// Split on unescaped `/`, treating `\/` as a literal slash inside a
/// segment and dropping empty components.
fn split_unescaped(input: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'/') {
            current.push('/');
            chars.next();
        } else if c == '/' {
            if !current.is_empty() {
                components.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        components.push(current);
    }

    components
}
