use crate::boxes::{BoxBody, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// `pitm`: id of the primary item.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PrimaryItemBox {
    pub full: FullBoxHeader,
    pub item_id: u32,
}

/// `idat`: item data stored inside `meta`. Only the payload range is kept;
/// the bytes stay in the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDataBox {
    pub data_offset: u64,
    pub data_len: u64,
}

/// `ipro`: protection scheme boxes (`sinf`), indexed by `infe`'s
/// protection index.
#[derive(Debug, Clone, Serialize)]
pub struct ItemProtectionBox {
    pub full: FullBoxHeader,
    pub protection_count: u16,
    #[serde(skip)]
    pub schemes: Vec<HeifBox>,
}

pub fn decode_pitm(cur: &mut ByteCursor<'_>, _ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let item_id = if full.version == 0 {
        cur.read_u16()? as u32
    } else {
        cur.read_u32()?
    };
    Ok(BoxBody::PrimaryItem(PrimaryItemBox { full, item_id }))
}

pub fn decode_idat(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let data_offset = cur.position();
    let data_len = ctx.skip_rest(cur)?;
    Ok(BoxBody::ItemData(ItemDataBox {
        data_offset,
        data_len,
    }))
}

pub fn decode_ipro(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let protection_count = cur.read_u16()?;
    let schemes = ctx.children(cur)?;
    if schemes.len() != protection_count as usize {
        log::warn!(
            "ipro at {:#x}: protection_count says {}, found {} boxes",
            ctx.header.start,
            protection_count,
            schemes.len()
        );
    }
    Ok(BoxBody::ItemProtection(ItemProtectionBox {
        full,
        protection_count,
        schemes,
    }))
}
