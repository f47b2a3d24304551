use crate::boxes::{BoxBody, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::heif::find_body;
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// `iprp`: one `ipco` plus one or more `ipma`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPropertiesBox {
    #[serde(skip)]
    pub children: Vec<HeifBox>,
}

impl ItemPropertiesBox {
    pub fn property_container(&self) -> Option<&ItemPropertyContainerBox> {
        find_body!(self.children, BoxBody::PropertyContainer)
    }

    pub fn associations(&self) -> impl Iterator<Item = &ItemPropertyAssociationBox> {
        self.children.iter().filter_map(|c| match &c.body {
            BoxBody::PropertyAssociation(a) => Some(a),
            _ => None,
        })
    }

    /// Properties associated with `item_id`, in association order, paired
    /// with their essential flag. Index 0 ("no property") is dropped.
    pub fn properties_for(&self, item_id: u32) -> Vec<(bool, &HeifBox)> {
        let Some(ipco) = self.property_container() else {
            return Vec::new();
        };
        self.associations()
            .filter_map(|a| a.find(item_id))
            .flat_map(|e| e.associations.iter())
            .filter_map(|p| ipco.get(p.property_index).map(|b| (p.essential, b)))
            .collect()
    }
}

/// `ipco`: the property boxes, addressed 1-based by `ipma`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPropertyContainerBox {
    #[serde(skip)]
    pub properties: Vec<HeifBox>,
}

impl ItemPropertyContainerBox {
    pub fn get(&self, property_index: u16) -> Option<&HeifBox> {
        self.properties.get((property_index as usize).checked_sub(1)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertyAssociation {
    pub essential: bool,
    pub property_index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationEntry {
    pub item_id: u32,
    pub associations: Vec<PropertyAssociation>,
}

/// `ipma`: per item, the list of (essential, property index) pairs.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPropertyAssociationBox {
    pub full: FullBoxHeader,
    pub entries: Vec<AssociationEntry>,
}

impl ItemPropertyAssociationBox {
    pub fn find(&self, item_id: u32) -> Option<&AssociationEntry> {
        self.entries.iter().find(|e| e.item_id == item_id)
    }
}

/// `pixi`: bit depth of each channel.
#[derive(Debug, Clone, Serialize)]
pub struct PixelInformationBox {
    pub full: FullBoxHeader,
    pub bits_per_channel: Vec<u8>,
}

impl PixelInformationBox {
    pub fn num_channels(&self) -> usize {
        self.bits_per_channel.len()
    }
}

/// `irot`: anti-clockwise rotation in degrees (0, 90, 180 or 270).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRotationBox {
    pub angle: u16,
}

/// `ispe`: image width and height in pixels.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImageSpatialExtentsBox {
    pub full: FullBoxHeader,
    pub width: u32,
    pub height: u32,
}

pub fn decode_iprp(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let children = ctx.children(cur)?;
    Ok(BoxBody::ItemProperties(ItemPropertiesBox { children }))
}

pub fn decode_ipco(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let properties = ctx.children(cur)?;
    Ok(BoxBody::PropertyContainer(ItemPropertyContainerBox {
        properties,
    }))
}

pub fn decode_ipma(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let wide = full.flags.is_set(0);

    let entry_count = cur.read_u32()?;
    // smallest entry is a 16-bit id plus a zero count
    let mut entries = Vec::with_capacity((entry_count as u64).min(ctx.remaining(cur) / 3) as usize);
    for _ in 0..entry_count {
        let item_id = if full.version < 1 {
            cur.read_u16()? as u32
        } else {
            cur.read_u32()?
        };

        let count = cur.read_u8()?;
        let mut associations = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let assoc = if wide {
                let v = cur.read_u16()?;
                PropertyAssociation {
                    essential: v & 0x8000 != 0,
                    property_index: v & 0x7fff,
                }
            } else {
                let v = cur.read_u8()?;
                PropertyAssociation {
                    essential: v & 0x80 != 0,
                    property_index: (v & 0x7f) as u16,
                }
            };
            associations.push(assoc);
        }

        entries.push(AssociationEntry {
            item_id,
            associations,
        });
    }

    Ok(BoxBody::PropertyAssociation(ItemPropertyAssociationBox {
        full,
        entries,
    }))
}

pub fn decode_pixi(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let num_channels = cur.read_u8()?;
    if num_channels == 0 {
        return Err(ctx.invalid("num_channels", 0));
    }
    let bits_per_channel = cur.read_bytes(num_channels as u64)?.to_vec();
    Ok(BoxBody::PixelInformation(PixelInformationBox {
        full,
        bits_per_channel,
    }))
}

pub fn decode_irot(cur: &mut ByteCursor<'_>, _ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    // upper six bits reserved
    let angle = (cur.read_u8()? & 0x03) as u16 * 90;
    Ok(BoxBody::ImageRotation(ImageRotationBox { angle }))
}

pub fn decode_ispe(cur: &mut ByteCursor<'_>, _ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let width = cur.read_u32()?;
    let height = cur.read_u32()?;
    Ok(BoxBody::ImageSpatialExtents(ImageSpatialExtentsBox {
        full,
        width,
        height,
    }))
}
