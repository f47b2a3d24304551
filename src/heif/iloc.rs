use crate::boxes::{BoxBody, FullBoxHeader};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// Where an item's extent offsets point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstructionMethod {
    /// Absolute offsets in the file (or the referenced data entry).
    File,
    /// Offsets into the `idat` payload of the same `meta` box.
    Idat,
    /// Offsets into another item's data.
    Item,
}

impl ConstructionMethod {
    fn from_raw(v: u8) -> Option<Self> {
        match v {
            0 => Some(ConstructionMethod::File),
            1 => Some(ConstructionMethod::Idat),
            2 => Some(ConstructionMethod::Item),
            _ => None,
        }
    }
}

/// `iloc`: per-item extent lists with per-box field widths.
#[derive(Debug, Clone, Serialize)]
pub struct ItemLocationBox {
    pub full: FullBoxHeader,
    pub offset_size: u8,
    pub length_size: u8,
    pub base_offset_size: u8,
    pub index_size: u8,
    pub items: Vec<ItemLocation>,
}

impl ItemLocationBox {
    pub fn find_item(&self, item_id: u32) -> Option<&ItemLocation> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    /// Every extent of every item, in file order.
    pub fn extents(&self) -> impl Iterator<Item = &ExtentData> {
        self.items.iter().flat_map(|i| i.extents.iter())
    }

    pub fn extents_for(&self, item_id: u32) -> &[ExtentData] {
        self.find_item(item_id)
            .map(|i| i.extents.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemLocation {
    pub item_id: u32,
    pub construction_method: ConstructionMethod,
    pub data_reference_index: u16,
    pub base_offset: u64,
    pub extents: Vec<ExtentData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtentData {
    pub item_id: u32,
    /// Number of extents the owning item has.
    pub extent_count: u16,
    /// Only present in versions 1 and 2 with a non-zero index size.
    pub extent_index: u64,
    /// `base_offset + extent_offset`.
    pub offset: u64,
    pub length: u64,
    pub construction_method: ConstructionMethod,
    pub data_reference_index: u16,
}

/// Read a field whose width was declared in the box header.
fn read_sized(
    cur: &mut ByteCursor<'_>,
    ctx: &DecodeContext<'_>,
    width: u8,
    field: &'static str,
) -> Result<u64> {
    match width {
        0 => Ok(0),
        4 => Ok(cur.read_u32()? as u64),
        8 => cur.read_u64(),
        other => Err(ctx.invalid(field, other as u64)),
    }
}

fn check_width(ctx: &DecodeContext<'_>, width: u8, field: &'static str) -> Result<u8> {
    match width {
        0 | 4 | 8 => Ok(width),
        other => Err(ctx.invalid(field, other as u64)),
    }
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let version = full.version;
    if version > 3 {
        return Err(ctx.invalid("version", version as u64));
    }
    // version 3 widens ids like version 2 but drops the method and index fields
    let has_index = version == 1 || version == 2;

    let sizes = cur.read_u8()?;
    let offset_size = check_width(ctx, sizes >> 4, "offset_size")?;
    let length_size = check_width(ctx, sizes & 0x0f, "length_size")?;

    let sizes = cur.read_u8()?;
    let base_offset_size = check_width(ctx, sizes >> 4, "base_offset_size")?;
    let index_size = if has_index {
        check_width(ctx, sizes & 0x0f, "index_size")?
    } else {
        0 // reserved nibble in versions 0 and 3
    };

    let item_count = if version < 2 {
        cur.read_u16()? as u32
    } else {
        cur.read_u32()?
    };

    // each item needs at least 6 bytes; don't trust the count for the allocation
    let mut items = Vec::with_capacity((item_count as u64).min(ctx.remaining(cur) / 6) as usize);
    for _ in 0..item_count {
        let item_id = if version < 2 {
            cur.read_u16()? as u32
        } else {
            cur.read_u32()?
        };

        let construction_method = if has_index {
            let raw = cur.read_u16()? & 0x000f;
            ConstructionMethod::from_raw(raw as u8)
                .ok_or_else(|| ctx.invalid("construction_method", raw as u64))?
        } else {
            ConstructionMethod::File
        };

        let data_reference_index = cur.read_u16()?;
        let base_offset = read_sized(cur, ctx, base_offset_size, "base_offset_size")?;
        let extent_count = cur.read_u16()?;

        let mut extents = Vec::with_capacity(extent_count as usize);
        for _ in 0..extent_count {
            let extent_index = if has_index && index_size > 0 {
                read_sized(cur, ctx, index_size, "index_size")?
            } else {
                0
            };
            let extent_offset = read_sized(cur, ctx, offset_size, "offset_size")?;
            let length = read_sized(cur, ctx, length_size, "length_size")?;
            let offset = base_offset
                .checked_add(extent_offset)
                .ok_or_else(|| ctx.invalid("extent_offset", extent_offset))?;

            extents.push(ExtentData {
                item_id,
                extent_count,
                extent_index,
                offset,
                length,
                construction_method,
                data_reference_index,
            });
        }

        items.push(ItemLocation {
            item_id,
            construction_method,
            data_reference_index,
            base_offset,
            extents,
        });
    }

    Ok(BoxBody::ItemLocation(ItemLocationBox {
        full,
        offset_size,
        length_size,
        base_offset_size,
        index_size,
        items,
    }))
}
