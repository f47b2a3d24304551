use crate::boxes::{BoxBody, BoxFlags, BoxHeader, BoxSize, FourCC, FullBoxHeader, HeifBox};
use crate::cursor::{ByteCursor, Endian};
use crate::error::{ParseError, Result};
use crate::registry::Registry;
use log::{debug, trace};

/// Nesting limit for container boxes. Real files stay well under ten levels.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub endian: Endian,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            endian: Endian::Big,
        }
    }
}

/// What a box decoder gets to see besides the cursor.
pub struct DecodeContext<'r> {
    pub header: &'r BoxHeader,
    /// Absolute end of this box.
    pub end: u64,
    pub depth: usize,
    pub registry: &'r Registry,
    pub options: &'r ParseOptions,
}

impl DecodeContext<'_> {
    pub fn typ(&self) -> FourCC {
        self.header.typ
    }

    /// Bytes left in this box from the cursor's position.
    pub fn remaining(&self, cur: &ByteCursor<'_>) -> u64 {
        self.end.saturating_sub(cur.position())
    }

    pub fn box_len(&self) -> u64 {
        self.end - self.header.start
    }

    pub fn skip_rest(&self, cur: &mut ByteCursor<'_>) -> Result<u64> {
        let n = self.remaining(cur);
        cur.skip(n)?;
        Ok(n)
    }

    pub fn invalid(&self, field: &'static str, value: u64) -> ParseError {
        ParseError::InvalidField {
            typ: self.typ(),
            field,
            value,
        }
    }

    pub fn read_cstring(&self, cur: &mut ByteCursor<'_>) -> Result<String> {
        cur.read_cstring(self.end)
    }

    /// Parse this box's remaining payload as a sequence of child boxes.
    pub fn children(&self, cur: &mut ByteCursor<'_>) -> Result<Vec<HeifBox>> {
        parse_children(cur, self)
    }
}

pub fn read_box_header(cur: &mut ByteCursor<'_>) -> Result<BoxHeader> {
    let start = cur.position();
    let size32 = cur.read_u32()?;
    let typ = cur.read_fourcc()?;

    let size = match size32 {
        1 => BoxSize::Extended(cur.read_u64()?),
        0 => BoxSize::ToEnd,
        n => BoxSize::Normal(n),
    };

    let uuid = if typ == FourCC::UUID {
        Some(cur.read_array::<16>()?)
    } else {
        None
    };

    Ok(BoxHeader {
        start,
        size,
        typ,
        uuid,
        header_size: cur.position() - start,
        endian: cur.endian(),
    })
}

pub fn read_full_box_header(cur: &mut ByteCursor<'_>) -> Result<FullBoxHeader> {
    let version = cur.read_u8()?;
    let flags = BoxFlags::from_bits(cur.read_u24()?);
    Ok(FullBoxHeader { version, flags })
}

/// Type of the box starting at the cursor, without consuming anything.
pub fn peek_box_type(cur: &mut ByteCursor<'_>) -> Result<FourCC> {
    cur.mark();
    let typ = cur.skip(4).and_then(|_| cur.read_fourcc());
    cur.reset();
    typ
}

/// Decode one box through the registry.
pub fn parse_box(
    cur: &mut ByteCursor<'_>,
    registry: &Registry,
    parent_end: u64,
    depth: usize,
    options: &ParseOptions,
) -> Result<HeifBox> {
    parse_box_with(
        cur,
        registry,
        parent_end,
        depth,
        options,
        &mut |cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>| ctx.registry.decode(cur, ctx),
    )
}

/// Decode one box with a caller-supplied payload decoder.
///
/// The decoder must leave the cursor exactly at the box's end; anything else
/// is a size mismatch.
pub fn parse_box_with(
    cur: &mut ByteCursor<'_>,
    registry: &Registry,
    parent_end: u64,
    depth: usize,
    options: &ParseOptions,
    decode: &mut dyn FnMut(&mut ByteCursor<'_>, &DecodeContext<'_>) -> Result<BoxBody>,
) -> Result<HeifBox> {
    let header = read_box_header(cur)?;
    let start = header.start;

    let end = match header.declared_size() {
        Some(size) => {
            if size < header.header_size {
                return Err(ParseError::InvalidSize {
                    typ: header.typ,
                    offset: start,
                    size,
                    header_len: header.header_size,
                });
            }
            start.checked_add(size).ok_or(ParseError::InvalidSize {
                typ: header.typ,
                offset: start,
                size,
                header_len: header.header_size,
            })?
        }
        None => parent_end,
    };
    if end > parent_end {
        return Err(ParseError::SizeMismatch {
            typ: header.typ,
            offset: start,
            expected: parent_end.saturating_sub(start),
            actual: end - start,
        });
    }
    trace!(
        "box {} at {:#x}: size {} ({:?}), depth {}",
        header.typ,
        start,
        end - start,
        header.size,
        depth
    );

    let ctx = DecodeContext {
        header: &header,
        end,
        depth,
        registry,
        options,
    };
    let body = decode(cur, &ctx)?;

    let used = cur.position() - start;
    if cur.position() != end {
        return Err(ParseError::SizeMismatch {
            typ: header.typ,
            offset: start,
            expected: end - start,
            actual: used,
        });
    }

    Ok(HeifBox { header, used, body })
}

/// Read child boxes until exactly `ctx.end` is reached.
pub fn parse_children(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<Vec<HeifBox>> {
    parse_children_with(
        cur,
        ctx,
        &mut |cur: &mut ByteCursor<'_>, child: &DecodeContext<'_>| child.registry.decode(cur, child),
    )
}

/// Like [`parse_children`], but every child goes through `decode` instead of
/// the registry. Used where the child type code is data (e.g. `iref`).
pub fn parse_children_with(
    cur: &mut ByteCursor<'_>,
    ctx: &DecodeContext<'_>,
    decode: &mut dyn FnMut(&mut ByteCursor<'_>, &DecodeContext<'_>) -> Result<BoxBody>,
) -> Result<Vec<HeifBox>> {
    let mut kids = Vec::new();
    while cur.position() < ctx.end {
        let left = ctx.end - cur.position();
        if left < 8 {
            // trailing bytes too short to hold a child header
            return Err(ParseError::SizeMismatch {
                typ: ctx.typ(),
                offset: ctx.header.start,
                expected: ctx.box_len(),
                actual: cur.position() - ctx.header.start,
            });
        }

        let typ = peek_box_type(cur)?;
        if ctx.depth + 1 > ctx.options.max_depth {
            return Err(ParseError::TooDeep {
                typ,
                depth: ctx.depth + 1,
            });
        }
        kids.push(parse_box_with(
            cur,
            ctx.registry,
            ctx.end,
            ctx.depth + 1,
            ctx.options,
            decode,
        )?);
    }
    debug!("{} at {:#x}: {} children", ctx.typ(), ctx.header.start, kids.len());
    Ok(kids)
}

/// Decode every top-level box in `buf` with the shared registry.
pub fn parse_boxes(buf: &[u8]) -> Result<Vec<HeifBox>> {
    parse_boxes_with(buf, Registry::shared(), &ParseOptions::default())
}

pub fn parse_boxes_with(
    buf: &[u8],
    registry: &Registry,
    options: &ParseOptions,
) -> Result<Vec<HeifBox>> {
    let mut cur = ByteCursor::new(buf, options.endian);
    let end = cur.len();
    let mut boxes = Vec::new();
    while cur.position() < end {
        boxes.push(parse_box(&mut cur, registry, end, 0, options)?);
    }
    Ok(boxes)
}
