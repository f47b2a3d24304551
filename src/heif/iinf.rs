use crate::boxes::{BoxBody, FourCC, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// `iinf`: entry count plus one `infe` child per item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemInfoBox {
    pub full: FullBoxHeader,
    pub entry_count: u32,
    #[serde(skip)]
    pub children: Vec<HeifBox>,
}

impl ItemInfoBox {
    /// Entries in file order; position is the entry's index.
    pub fn entries(&self) -> impl Iterator<Item = &ItemInfoEntry> {
        self.children.iter().filter_map(|c| match &c.body {
            BoxBody::ItemInfoEntry(e) => Some(e),
            _ => None,
        })
    }

    pub fn entry(&self, index: usize) -> Option<&ItemInfoEntry> {
        self.entries().nth(index)
    }

    pub fn find_entry(&self, item_id: u32) -> Option<&ItemInfoEntry> {
        self.entries().find(|e| e.item_id == item_id)
    }

    pub fn contains_exif(&self) -> bool {
        self.entries().any(ItemInfoEntry::is_exif)
    }

    pub fn find_exif_item_id(&self) -> Option<u32> {
        self.entries().find(|e| e.is_exif()).map(|e| e.item_id)
    }
}

/// Type-dependent trailing fields of an `infe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ItemContent {
    None,
    Mime {
        content_type: String,
        content_encoding: Option<String>,
    },
    Uri {
        uri_type: String,
    },
}

/// `infe`: one item's id, type and name.
#[derive(Debug, Clone, Serialize)]
pub struct ItemInfoEntry {
    pub full: FullBoxHeader,
    pub item_id: u32,
    pub protection_index: u16,
    /// Absent in the version 0/1 layout.
    pub item_type: Option<FourCC>,
    pub item_name: String,
    pub content: ItemContent,
    /// Version 1 only.
    pub extension_type: Option<FourCC>,
}

impl ItemInfoEntry {
    pub fn is_exif(&self) -> bool {
        self.item_type == Some(FourCC::EXIF)
    }

    pub fn is_protected(&self) -> bool {
        self.protection_index != 0
    }
}

pub fn decode_iinf(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let entry_count = if full.version == 0 {
        cur.read_u16()? as u32
    } else {
        cur.read_u32()?
    };

    let children = ctx.children(cur)?;
    if children.len() as u64 != entry_count as u64 {
        log::warn!(
            "iinf at {:#x}: entry_count says {}, found {} entries",
            ctx.header.start,
            entry_count,
            children.len()
        );
    }

    Ok(BoxBody::ItemInfo(ItemInfoBox {
        full,
        entry_count,
        children,
    }))
}

pub fn decode_infe(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let entry = if full.version < 2 {
        decode_compact(cur, ctx, full)?
    } else {
        decode_typed(cur, ctx, full)?
    };
    Ok(BoxBody::ItemInfoEntry(entry))
}

// versions 0 and 1
fn decode_compact(
    cur: &mut ByteCursor<'_>,
    ctx: &DecodeContext<'_>,
    full: FullBoxHeader,
) -> Result<ItemInfoEntry> {
    let item_id = cur.read_u16()? as u32;
    let protection_index = cur.read_u16()?;
    let item_name = ctx.read_cstring(cur)?;
    let content_type = ctx.read_cstring(cur)?;
    let content_encoding = if ctx.remaining(cur) > 0 {
        Some(ctx.read_cstring(cur)?)
    } else {
        None
    };

    let mut extension_type = None;
    if full.version == 1 && ctx.remaining(cur) >= 4 {
        extension_type = Some(cur.read_fourcc()?);
        // ItemInfoExtension payload is not interpreted
        ctx.skip_rest(cur)?;
    }

    let content = if content_type.is_empty() && content_encoding.is_none() {
        ItemContent::None
    } else {
        ItemContent::Mime {
            content_type,
            content_encoding,
        }
    };

    Ok(ItemInfoEntry {
        full,
        item_id,
        protection_index,
        item_type: None,
        item_name,
        content,
        extension_type,
    })
}

// versions 2 and up
fn decode_typed(
    cur: &mut ByteCursor<'_>,
    ctx: &DecodeContext<'_>,
    full: FullBoxHeader,
) -> Result<ItemInfoEntry> {
    let item_id = if full.version == 2 {
        cur.read_u16()? as u32
    } else {
        cur.read_u32()?
    };
    let protection_index = cur.read_u16()?;
    let item_type = cur.read_fourcc()?;
    let item_name = ctx.read_cstring(cur)?;

    let content = if item_type == FourCC::MIME {
        let content_type = ctx.read_cstring(cur)?;
        let content_encoding = if ctx.remaining(cur) > 0 {
            Some(ctx.read_cstring(cur)?)
        } else {
            None
        };
        ItemContent::Mime {
            content_type,
            content_encoding,
        }
    } else if item_type == FourCC::URI {
        ItemContent::Uri {
            uri_type: ctx.read_cstring(cur)?,
        }
    } else {
        ItemContent::None
    };

    Ok(ItemInfoEntry {
        full,
        item_id,
        protection_index,
        item_type: Some(item_type),
        item_name,
        content,
        extension_type: None,
    })
}
