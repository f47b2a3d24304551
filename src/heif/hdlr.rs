use crate::boxes::{BoxBody, FourCC, FullBoxHeader};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// `hdlr`: declares what the enclosing `meta` box holds (`pict` for images).
#[derive(Debug, Clone, Serialize)]
pub struct HandlerBox {
    pub full: FullBoxHeader,
    pub handler_type: FourCC,
    pub name: String,
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;

    // pre_defined (4 bytes) + handler_type (4 bytes)
    let _pre_defined = cur.read_u32()?;
    let handler_type = cur.read_fourcc()?;

    // reserved (3 * 4 bytes)
    cur.skip(12)?;

    // name: null-terminated, but some writers pad the rest of the box
    let raw = cur.read_bytes(ctx.remaining(cur))?;
    let name_bytes = match raw.iter().position(|&b| b == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    let name = String::from_utf8_lossy(name_bytes).to_string();

    Ok(BoxBody::Handler(HandlerBox {
        full,
        handler_type,
        name,
    }))
}
