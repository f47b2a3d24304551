use crate::boxes::{BoxBody, FourCC, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::{DecodeContext, parse_children_with, read_full_box_header};
use serde::Serialize;

/// `iref`: typed references between items. The children's type codes are
/// the reference types (`thmb`, `cdsc`, `auxl`, `dimg`, ...).
#[derive(Debug, Clone, Serialize)]
pub struct ItemReferenceBox {
    pub full: FullBoxHeader,
    #[serde(skip)]
    pub references: Vec<HeifBox>,
}

impl ItemReferenceBox {
    pub fn references(&self) -> impl Iterator<Item = &SingleItemTypeReferenceBox> {
        self.references.iter().filter_map(|c| match &c.body {
            BoxBody::SingleItemReference(r) => Some(r),
            _ => None,
        })
    }

    pub fn references_from(&self, item_id: u32) -> impl Iterator<Item = &SingleItemTypeReferenceBox> {
        self.references().filter(move |r| r.from_item_id == item_id)
    }

    /// References of type `reference_type` pointing at `item_id`.
    pub fn references_to(
        &self,
        item_id: u32,
        reference_type: FourCC,
    ) -> impl Iterator<Item = &SingleItemTypeReferenceBox> {
        self.references()
            .filter(move |r| r.reference_type == reference_type && r.to_item_ids.contains(&item_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleItemTypeReferenceBox {
    pub reference_type: FourCC,
    pub from_item_id: u32,
    pub to_item_ids: Vec<u32>,
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let wide_ids = full.version != 0;

    let references = parse_children_with(
        cur,
        ctx,
        &mut |cur: &mut ByteCursor<'_>, child: &DecodeContext<'_>| {
            decode_reference(cur, child, wide_ids)
        },
    )?;

    Ok(BoxBody::ItemReference(ItemReferenceBox { full, references }))
}

fn decode_reference(
    cur: &mut ByteCursor<'_>,
    ctx: &DecodeContext<'_>,
    wide_ids: bool,
) -> Result<BoxBody> {
    let from_item_id = read_id(cur, wide_ids)?;
    let count = cur.read_u16()?;
    let mut to_item_ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        to_item_ids.push(read_id(cur, wide_ids)?);
    }

    Ok(BoxBody::SingleItemReference(SingleItemTypeReferenceBox {
        reference_type: ctx.typ(),
        from_item_id,
        to_item_ids,
    }))
}

fn read_id(cur: &mut ByteCursor<'_>, wide: bool) -> Result<u32> {
    if wide {
        cur.read_u32()
    } else {
        Ok(cur.read_u16()? as u32)
    }
}
