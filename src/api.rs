use crate::{
    boxes::{BoxBody, HeifBox},
    cursor::ByteCursor,
    error::{ParseError, Result},
    heif::{
        find_body,
        ftyp::FileTypeBox,
        iinf::ItemInfoEntry,
        iloc::{ConstructionMethod, ItemLocation},
        iref::SingleItemTypeReferenceBox,
        meta::MetaBox,
    },
    parser::{ParseOptions, parse_boxes_with},
    registry::Registry,
    util::read_slice,
};
use serde::Serialize;
use std::borrow::Cow;

// "heic", "heix", "avif" etc. all carry one of these among the compatible
// brands [ISO23008-12 B.4].
const HEIF_BRANDS: &[&str] = &["mif1", "msf1"];

/// A resolved byte range in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

impl ByteRange {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// A decoded HEIF file: the box tree plus item lookups over it.
///
/// The input buffer is not kept; methods that return item bytes take it
/// again and must be given the same buffer.
///
/// # Example
/// ```no_run
/// use heifbox::HeifFile;
///
/// let buf = std::fs::read("photo.heic")?;
/// let file = HeifFile::parse(&buf)?;
/// if let Some(tiff) = file.exif_tiff_data(&buf)? {
///     println!("{} bytes of TIFF/EXIF", tiff.len());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct HeifFile {
    boxes: Vec<HeifBox>,
    len: u64,
}

impl HeifFile {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        Self::parse_with(buf, Registry::shared(), &ParseOptions::default())
    }

    pub fn parse_with(buf: &[u8], registry: &Registry, options: &ParseOptions) -> Result<Self> {
        let boxes = parse_boxes_with(buf, registry, options)?;
        Ok(Self {
            boxes,
            len: buf.len() as u64,
        })
    }

    pub fn boxes(&self) -> &[HeifBox] {
        &self.boxes
    }

    pub fn file_type(&self) -> Option<&FileTypeBox> {
        find_body!(self.boxes, BoxBody::FileType)
    }

    pub fn meta(&self) -> Option<&MetaBox> {
        find_body!(self.boxes, BoxBody::Meta)
    }

    pub fn is_heif(&self) -> bool {
        self.file_type()
            .is_some_and(|f| HEIF_BRANDS.iter().any(|b| f.has_brand(b)))
    }

    pub fn primary_item_id(&self) -> Option<u32> {
        self.meta()?.primary_item().map(|p| p.item_id)
    }

    pub fn item_infos(&self) -> impl Iterator<Item = &ItemInfoEntry> {
        self.meta()
            .and_then(MetaBox::item_info)
            .into_iter()
            .flat_map(|i| i.entries())
    }

    pub fn item_location(&self, item_id: u32) -> Option<&ItemLocation> {
        self.meta()?.item_location()?.find_item(item_id)
    }

    pub fn properties_for(&self, item_id: u32) -> Vec<(bool, &HeifBox)> {
        self.meta()
            .and_then(MetaBox::item_properties)
            .map(|p| p.properties_for(item_id))
            .unwrap_or_default()
    }

    pub fn references_from(&self, item_id: u32) -> Vec<&SingleItemTypeReferenceBox> {
        self.meta()
            .and_then(MetaBox::item_reference)
            .map(|r| r.references_from(item_id).collect())
            .unwrap_or_default()
    }

    pub fn exif_item_id(&self) -> Option<u32> {
        self.meta()?.item_info()?.find_exif_item_id()
    }

    /// Resolve every extent of `item_id` to a range of the input buffer.
    pub fn item_ranges(&self, item_id: u32) -> Result<Vec<ByteRange>> {
        let item_err = |reason| ParseError::Item { item_id, reason };
        let meta = self.meta().ok_or_else(|| item_err("no meta box"))?;
        let loc = self
            .item_location(item_id)
            .ok_or_else(|| item_err("no entry in iloc"))?;

        if loc.data_reference_index != 0 {
            let entry = meta
                .data_information()
                .and_then(|d| d.data_reference())
                .and_then(|r| r.entry(loc.data_reference_index));
            if !entry.is_some_and(|e| e.is_self_contained()) {
                return Err(ParseError::Unsupported("item data in an external file"));
            }
        }

        let (base, bound) = match loc.construction_method {
            ConstructionMethod::File => (0, self.len),
            ConstructionMethod::Idat => {
                let idat = meta
                    .item_data()
                    .ok_or_else(|| item_err("construction method 1 without an idat box"))?;
                (idat.data_offset, idat.data_len)
            }
            ConstructionMethod::Item => {
                return Err(ParseError::Unsupported("construction method 2 (item offsets)"));
            }
        };

        loc.extents
            .iter()
            .map(|e| {
                if e.offset > bound {
                    return Err(item_err("extent starts outside its data"));
                }
                // zero length means "everything that follows"
                let length = if e.length == 0 { bound - e.offset } else { e.length };
                if length > bound - e.offset {
                    return Err(item_err("extent runs past the end of its data"));
                }
                Ok(ByteRange {
                    offset: base + e.offset,
                    length,
                })
            })
            .collect()
    }

    /// Range of the EXIF item, if the file has one.
    ///
    /// Adjacent extents are merged; an EXIF item scattered over disjoint
    /// ranges is reported as unsupported.
    pub fn exif_location(&self) -> Result<Option<ByteRange>> {
        let Some(item_id) = self.exif_item_id() else {
            return Ok(None);
        };
        let mut ranges = self.item_ranges(item_id)?.into_iter();
        let Some(mut merged) = ranges.next() else {
            return Err(ParseError::Item {
                item_id,
                reason: "Exif item has no extents",
            });
        };
        for r in ranges {
            if r.offset != merged.end() {
                return Err(ParseError::Unsupported("Exif item split over disjoint extents"));
            }
            merged.length += r.length;
        }
        log::debug!(
            "Exif item {} at {:#x}, {} bytes",
            item_id,
            merged.offset,
            merged.length
        );
        Ok(Some(merged))
    }

    /// Bytes of `item_id`, borrowed when the item is a single extent.
    pub fn item_data<'b>(&self, buf: &'b [u8], item_id: u32) -> Result<Cow<'b, [u8]>> {
        let ranges = self.item_ranges(item_id)?;
        if let [only] = ranges.as_slice() {
            return Ok(Cow::Borrowed(read_slice(buf, only.offset, only.length)?));
        }
        let mut out = Vec::new();
        for r in &ranges {
            out.extend_from_slice(read_slice(buf, r.offset, r.length)?);
        }
        Ok(Cow::Owned(out))
    }

    /// The raw EXIF item (TIFF header offset prefix included).
    pub fn exif_data<'b>(&self, buf: &'b [u8]) -> Result<Option<Cow<'b, [u8]>>> {
        match self.exif_item_id() {
            Some(id) => self.item_data(buf, id).map(Some),
            None => Ok(None),
        }
    }

    /// The TIFF stream inside the EXIF item, ready for a TIFF/EXIF decoder.
    ///
    /// The item starts with a 32-bit offset from the end of that field to
    /// the TIFF header [ISO23008-12 A.2.1].
    pub fn exif_tiff_data<'b>(&self, buf: &'b [u8]) -> Result<Option<Cow<'b, [u8]>>> {
        let Some(data) = self.exif_data(buf)? else {
            return Ok(None);
        };
        let item_id = self.exif_item_id().unwrap_or_default();
        let bad = |reason| ParseError::Item { item_id, reason };

        let offset = ByteCursor::big_endian(&data)
            .read_u32()
            .map_err(|_| bad("Exif item too small"))? as usize;
        let start = offset
            .checked_add(4)
            .filter(|&s| s <= data.len())
            .ok_or_else(|| bad("invalid Exif header offset"))?;

        Ok(Some(match data {
            Cow::Borrowed(b) => Cow::Borrowed(&b[start..]),
            Cow::Owned(v) => Cow::Owned(v[start..].to_vec()),
        }))
    }
}
