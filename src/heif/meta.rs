use crate::boxes::{BoxBody, FullBoxHeader, HeifBox};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::heif::{
    dinf::DataInformationBox,
    find_body,
    hdlr::HandlerBox,
    iinf::ItemInfoBox,
    iloc::ItemLocationBox,
    iprp::ItemPropertiesBox,
    iref::ItemReferenceBox,
    item::{ItemDataBox, ItemProtectionBox, PrimaryItemBox},
};
use crate::parser::{DecodeContext, read_full_box_header};
use serde::Serialize;

/// `meta`: the FullBox container holding all item-level metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MetaBox {
    pub full: FullBoxHeader,
    #[serde(skip)]
    pub children: Vec<HeifBox>,
}

impl MetaBox {
    pub fn handler(&self) -> Option<&HandlerBox> {
        find_body!(self.children, BoxBody::Handler)
    }

    pub fn primary_item(&self) -> Option<&PrimaryItemBox> {
        find_body!(self.children, BoxBody::PrimaryItem)
    }

    pub fn data_information(&self) -> Option<&DataInformationBox> {
        find_body!(self.children, BoxBody::DataInformation)
    }

    pub fn item_info(&self) -> Option<&ItemInfoBox> {
        find_body!(self.children, BoxBody::ItemInfo)
    }

    pub fn item_location(&self) -> Option<&ItemLocationBox> {
        find_body!(self.children, BoxBody::ItemLocation)
    }

    pub fn item_properties(&self) -> Option<&ItemPropertiesBox> {
        find_body!(self.children, BoxBody::ItemProperties)
    }

    pub fn item_reference(&self) -> Option<&ItemReferenceBox> {
        find_body!(self.children, BoxBody::ItemReference)
    }

    pub fn item_protection(&self) -> Option<&ItemProtectionBox> {
        find_body!(self.children, BoxBody::ItemProtection)
    }

    /// Payload range of `idat`, the base for construction method 1 extents.
    pub fn item_data(&self) -> Option<&ItemDataBox> {
        find_body!(self.children, BoxBody::ItemData)
    }
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let full = read_full_box_header(cur)?;
    let children = ctx.children(cur)?;
    Ok(BoxBody::Meta(MetaBox { full, children }))
}
