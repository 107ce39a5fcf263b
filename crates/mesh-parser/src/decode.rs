// Binary STL layout
// bytes range | description
// ------------|---------------------------------------------
// 0-79        | header (free text, may start with "solid")
// 80-83       | u32 LE triangle count
// 84-end      | 50 bytes per triangle: normal, 3 vertices, u16 attribute

use std::borrow::Cow;
use std::io::Cursor;

use print_types::{GeometryError, MeshGeometry};
use tracing::{debug, instrument};

use crate::errors::ParseError;

pub const HEADER_LEN: usize = 80;
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
pub const RECORD_LEN: usize = 50;

const ASCII_KEYWORD: &[u8] = b"solid";
const PLACEHOLDER_NAME: &[u8] = b" mesh";

/// Which STL flavour a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlEncoding {
    Binary,
    Ascii,
}

/// Classify a buffer without decoding it.
///
/// A buffer whose size matches its declared triangle count exactly is binary
/// even when the header happens to start with `solid`. Otherwise a UTF-8
/// buffer opening with `solid` is ASCII; anything else must be binary.
pub fn detect_encoding(bytes: &[u8]) -> Result<StlEncoding, ParseError> {
    if let Some(declared) = declared_triangles(bytes) {
        if binary_len(declared) == Some(bytes.len()) {
            return Ok(StlEncoding::Binary);
        }
    }

    let text = trim_leading_whitespace(bytes);
    if text.starts_with(ASCII_KEYWORD) && std::str::from_utf8(text).is_ok() {
        return Ok(StlEncoding::Ascii);
    }

    let declared = declared_triangles(bytes).ok_or(ParseError::MalformedHeader {
        len: bytes.len(),
    })?;
    match binary_len(declared) {
        Some(expected) if bytes.len() >= expected => Ok(StlEncoding::Binary),
        _ => Err(ParseError::Truncated {
            declared,
            available: (bytes.len() - PREAMBLE_LEN) / RECORD_LEN,
        }),
    }
}

/// Decode a binary or ASCII STL buffer into a flat triangle list.
///
/// Triangles keep file order. Normals are discarded; nothing about
/// manifoldness or winding is checked.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse_stl(bytes: &[u8]) -> Result<MeshGeometry, ParseError> {
    let encoding = detect_encoding(bytes)?;
    debug!(?encoding, "detected STL encoding");

    let input: Cow<'_, [u8]> = match encoding {
        StlEncoding::Binary => {
            if declared_triangles(bytes) == Some(0) {
                return Err(ParseError::Empty);
            }
            mask_ascii_keyword(bytes)
        }
        StlEncoding::Ascii => name_bare_solid(trim_leading_whitespace(bytes)),
    };

    let mut cursor = Cursor::new(input.as_ref());
    let indexed =
        stl_io::read_stl(&mut cursor).map_err(|e| ParseError::Decode(e.to_string()))?;

    if indexed.faces.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut positions = Vec::with_capacity(indexed.faces.len() * 9);
    for (triangle, face) in indexed.faces.iter().enumerate() {
        for &vertex_index in &face.vertices {
            let vertex = indexed
                .vertices
                .get(vertex_index)
                .ok_or_else(|| {
                    ParseError::Decode(format!("vertex index {vertex_index} out of range"))
                })?
                .0;
            if vertex.iter().any(|c| !c.is_finite()) {
                return Err(ParseError::NonFiniteCoordinate { triangle });
            }
            positions.extend_from_slice(&vertex);
        }
    }

    let mesh = MeshGeometry::from_positions(positions).map_err(|e| match e {
        GeometryError::Empty => ParseError::Empty,
        other => ParseError::Geometry(other),
    })?;
    debug!(triangles = mesh.triangle_count(), "decoded STL");
    Ok(mesh)
}

fn declared_triangles(bytes: &[u8]) -> Option<u32> {
    let count = bytes.get(HEADER_LEN..PREAMBLE_LEN)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
}

fn binary_len(triangles: u32) -> Option<usize> {
    (triangles as usize)
        .checked_mul(RECORD_LEN)?
        .checked_add(PREAMBLE_LEN)
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// `stl_io` probes for ASCII by the `solid` prefix, so a binary header that
/// starts with it is blanked in a copy. Header text carries no geometry.
fn mask_ascii_keyword(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !trim_leading_whitespace(&bytes[..HEADER_LEN]).starts_with(ASCII_KEYWORD) {
        return Cow::Borrowed(bytes);
    }
    let mut owned = bytes.to_vec();
    owned[..HEADER_LEN].fill(0);
    Cow::Owned(owned)
}

/// The solid name is optional, but `stl_io` only probes `solid <name>` as
/// ASCII. A bare `solid` first line gets a placeholder name in a copy.
fn name_bare_solid(text: &[u8]) -> Cow<'_, [u8]> {
    let line_end = text.iter().position(|&b| b == b'\n').unwrap_or(text.len());
    if text[..line_end].trim_ascii_end() != ASCII_KEYWORD {
        return Cow::Borrowed(text);
    }
    let mut owned = Vec::with_capacity(text.len() + PLACEHOLDER_NAME.len());
    owned.extend_from_slice(ASCII_KEYWORD);
    owned.extend_from_slice(PLACEHOLDER_NAME);
    owned.extend_from_slice(&text[line_end..]);
    Cow::Owned(owned)
}
