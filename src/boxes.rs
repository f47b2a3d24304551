use crate::cursor::Endian;
use crate::error::{ParseError, Result};
use crate::heif::{
    colr::ColourInformationBox,
    dinf::{DataEntryBox, DataInformationBox, DataReferenceBox},
    ftyp::FileTypeBox,
    hdlr::HandlerBox,
    iinf::{ItemInfoBox, ItemInfoEntry},
    iloc::ItemLocationBox,
    iprp::{
        ImageRotationBox, ImageSpatialExtentsBox, ItemPropertiesBox, ItemPropertyAssociationBox,
        ItemPropertyContainerBox, PixelInformationBox,
    },
    iref::{ItemReferenceBox, SingleItemTypeReferenceBox},
    item::{ItemDataBox, ItemProtectionBox, PrimaryItemBox},
    meta::MetaBox,
};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const META: Self = Self(*b"meta");
    pub const HDLR: Self = Self(*b"hdlr");
    pub const DINF: Self = Self(*b"dinf");
    pub const DREF: Self = Self(*b"dref");
    pub const URL: Self = Self(*b"url ");
    pub const URN: Self = Self(*b"urn ");
    pub const IINF: Self = Self(*b"iinf");
    pub const INFE: Self = Self(*b"infe");
    pub const ILOC: Self = Self(*b"iloc");
    pub const IPRP: Self = Self(*b"iprp");
    pub const IPCO: Self = Self(*b"ipco");
    pub const IPMA: Self = Self(*b"ipma");
    pub const IREF: Self = Self(*b"iref");
    pub const IDAT: Self = Self(*b"idat");
    pub const PITM: Self = Self(*b"pitm");
    pub const PIXI: Self = Self(*b"pixi");
    pub const COLR: Self = Self(*b"colr");
    pub const IROT: Self = Self(*b"irot");
    pub const ISPE: Self = Self(*b"ispe");
    pub const IPRO: Self = Self(*b"ipro");
    pub const UUID: Self = Self(*b"uuid");
    pub const EXIF: Self = Self(*b"Exif");
    pub const MIME: Self = Self(*b"mime");
    pub const URI: Self = Self(*b"uri ");

    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}

impl FromStr for FourCC {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        let b: [u8; 4] = s.as_bytes().try_into().map_err(|_| ())?;
        Ok(FourCC(b))
    }
}

impl PartialEq<&str> for FourCC {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}
impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Registry key: a plain 4CC, or the extended type of a `uuid` box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoxKey {
    FourCC(FourCC),
    Uuid([u8; 16]),
}

/// The three encodings of a box's size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoxSize {
    /// 32-bit size field.
    Normal(u32),
    /// size field was 1; the real size follows as 64 bits.
    Extended(u64),
    /// size field was 0; the box runs to the end of its enclosing range.
    ToEnd,
}

impl BoxSize {
    pub fn declared(&self) -> Option<u64> {
        match *self {
            BoxSize::Normal(n) => Some(n as u64),
            BoxSize::Extended(n) => Some(n),
            BoxSize::ToEnd => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxHeader {
    pub start: u64,       // offset of the header's first byte
    pub size: BoxSize,    // total size including header
    pub typ: FourCC,
    pub uuid: Option<[u8; 16]>,
    pub header_size: u64, // 8, 16, 24 or 32
    pub endian: Endian,
}

impl BoxHeader {
    pub fn declared_size(&self) -> Option<u64> {
        self.size.declared()
    }

    /// Payload bytes after the header.
    ///
    /// Fails for boxes that run to the end of the stream, since their length
    /// depends on the enclosing range.
    pub fn available(&self) -> Result<u64> {
        let size = self.declared_size().ok_or(ParseError::UnboundedSize)?;
        size
            .checked_sub(self.header_size)
            .ok_or(ParseError::InvalidSize {
                typ: self.typ,
                offset: self.start,
                size,
                header_len: self.header_size,
            })
    }

    pub fn payload_start(&self) -> u64 {
        self.start + self.header_size
    }

    pub fn key(&self) -> BoxKey {
        match self.uuid {
            Some(u) if self.typ == FourCC::UUID => BoxKey::Uuid(u),
            _ => BoxKey::FourCC(self.typ),
        }
    }
}

/// The 24-bit flag word of a FullBox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoxFlags(u32);

impl BoxFlags {
    pub fn from_bits(bits: u32) -> Self {
        BoxFlags(bits & 0x00ff_ffff)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let b = self.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }

    /// Bit 0 is the least significant bit.
    pub fn is_set(&self, bit: u8) -> bool {
        bit < 24 && self.0 & (1 << bit) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FullBoxHeader {
    pub version: u8,
    pub flags: BoxFlags,
}

/// A decoded box: its header, the bytes it consumed, and its typed body.
#[derive(Debug, Clone)]
pub struct HeifBox {
    pub header: BoxHeader,
    pub used: u64,
    pub body: BoxBody,
}

impl HeifBox {
    pub fn typ(&self) -> FourCC {
        self.header.typ
    }

    /// Size of the box. For `ToEnd` boxes this is the resolved size.
    pub fn size(&self) -> u64 {
        self.header.declared_size().unwrap_or(self.used)
    }

    pub fn children(&self) -> &[HeifBox] {
        self.body.children()
    }

    /// First direct child with the given type.
    pub fn child(&self, typ: FourCC) -> Option<&HeifBox> {
        self.children().iter().find(|c| c.typ() == typ)
    }

    /// Depth-first walk over this box and everything below it.
    pub fn walk(&self, f: &mut dyn FnMut(&HeifBox, usize)) {
        fn go(b: &HeifBox, depth: usize, f: &mut dyn FnMut(&HeifBox, usize)) {
            f(b, depth);
            for c in b.children() {
                go(c, depth + 1, f);
            }
        }
        go(self, 0, f)
    }
}

/// Every box kind this crate understands, plus `Opaque` for the rest.
#[derive(Debug, Clone, Serialize)]
pub enum BoxBody {
    FileType(FileTypeBox),
    Handler(HandlerBox),
    Meta(MetaBox),
    DataInformation(DataInformationBox),
    DataReference(DataReferenceBox),
    DataEntry(DataEntryBox),
    ItemInfo(ItemInfoBox),
    ItemInfoEntry(ItemInfoEntry),
    ItemLocation(ItemLocationBox),
    ItemProperties(ItemPropertiesBox),
    PropertyContainer(ItemPropertyContainerBox),
    PropertyAssociation(ItemPropertyAssociationBox),
    ItemReference(ItemReferenceBox),
    SingleItemReference(SingleItemTypeReferenceBox),
    ItemData(ItemDataBox),
    PrimaryItem(PrimaryItemBox),
    PixelInformation(PixelInformationBox),
    ColourInformation(ColourInformationBox),
    ImageRotation(ImageRotationBox),
    ImageSpatialExtents(ImageSpatialExtentsBox),
    ItemProtection(ItemProtectionBox),
    /// Skipped by byte count, never interpreted.
    Opaque { data_offset: u64, data_len: u64 },
}

impl BoxBody {
    pub fn children(&self) -> &[HeifBox] {
        match self {
            BoxBody::Meta(b) => &b.children,
            BoxBody::DataInformation(b) => &b.children,
            BoxBody::DataReference(b) => &b.entries,
            BoxBody::ItemInfo(b) => &b.children,
            BoxBody::ItemProperties(b) => &b.children,
            BoxBody::PropertyContainer(b) => &b.properties,
            BoxBody::ItemReference(b) => &b.references,
            BoxBody::ItemProtection(b) => &b.schemes,
            _ => &[],
        }
    }

    pub fn full_header(&self) -> Option<&FullBoxHeader> {
        match self {
            BoxBody::Handler(b) => Some(&b.full),
            BoxBody::Meta(b) => Some(&b.full),
            BoxBody::DataReference(b) => Some(&b.full),
            BoxBody::DataEntry(b) => Some(&b.full),
            BoxBody::ItemInfo(b) => Some(&b.full),
            BoxBody::ItemInfoEntry(b) => Some(&b.full),
            BoxBody::ItemLocation(b) => Some(&b.full),
            BoxBody::PropertyAssociation(b) => Some(&b.full),
            BoxBody::ItemReference(b) => Some(&b.full),
            BoxBody::PrimaryItem(b) => Some(&b.full),
            BoxBody::PixelInformation(b) => Some(&b.full),
            BoxBody::ImageSpatialExtents(b) => Some(&b.full),
            BoxBody::ItemProtection(b) => Some(&b.full),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, BoxBody::Opaque { .. })
    }
}
