use crate::boxes::{BoxBody, FourCC, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::heif::find_body;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// Flag on `url `/`urn ` entries: data lives in this file, no strings follow.
pub const SELF_CONTAINED: u8 = 0;

/// `dinf`: plain container around `dref`.
#[derive(Debug, Clone, Serialize)]
pub struct DataInformationBox {
    #[serde(skip)]
    pub children: Vec<HeifBox>,
}

impl DataInformationBox {
    pub fn data_reference(&self) -> Option<&DataReferenceBox> {
        find_body!(self.children, BoxBody::DataReference)
    }
}

/// `dref`: FullBox with an entry count followed by `url `/`urn ` boxes.
#[derive(Debug, Clone, Serialize)]
pub struct DataReferenceBox {
    pub full: FullBoxHeader,
    pub entry_count: u32,
    #[serde(skip)]
    pub entries: Vec<HeifBox>,
}

impl DataReferenceBox {
    /// Entry by 1-based data reference index, as used in `iloc`.
    pub fn entry(&self, index: u16) -> Option<&DataEntryBox> {
        let b = self.entries.get((index as usize).checked_sub(1)?)?;
        match &b.body {
            BoxBody::DataEntry(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataEntryKind {
    Url,
    Urn,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataEntryBox {
    pub full: FullBoxHeader,
    pub kind: DataEntryKind,
    /// `urn ` only.
    pub name: Option<String>,
    pub location: Option<String>,
}

impl DataEntryBox {
    pub fn is_self_contained(&self) -> bool {
        self.full.flags.is_set(SELF_CONTAINED)
    }
}

pub fn decode_dinf(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let children = ctx.children(cur)?;
    Ok(BoxBody::DataInformation(DataInformationBox { children }))
}

pub fn decode_dref(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let entry_count = cur.read_u32()?;
    let entries = ctx.children(cur)?;
    if entries.len() as u64 != entry_count as u64 {
        log::warn!(
            "dref at {:#x}: entry_count says {}, found {} entries",
            ctx.header.start,
            entry_count,
            entries.len()
        );
    }
    Ok(BoxBody::DataReference(DataReferenceBox {
        full,
        entry_count,
        entries,
    }))
}

/// Decoder for both `url ` and `urn `; the type code picks the layout.
pub fn decode_entry(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let kind = if ctx.typ() == FourCC::URN {
        DataEntryKind::Urn
    } else {
        DataEntryKind::Url
    };

    let (mut name, mut location) = (None, None);
    if !full.flags.is_set(SELF_CONTAINED) {
        match kind {
            DataEntryKind::Urn => {
                name = Some(ctx.read_cstring(cur)?);
                if ctx.remaining(cur) > 0 {
                    location = Some(ctx.read_cstring(cur)?);
                }
            }
            DataEntryKind::Url => location = Some(ctx.read_cstring(cur)?),
        }
    }

    Ok(BoxBody::DataEntry(DataEntryBox {
        full,
        kind,
        name,
        location,
    }))
}
