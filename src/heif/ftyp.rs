use crate::boxes::{BoxBody, FourCC};
use crate::cursor::ByteCursor;
use crate::error::{ParseError, Result};
use crate::parser::DecodeContext;
use serde::Serialize;

/// `ftyp`: major brand, minor version and compatible brands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTypeBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    /// In file order, duplicates kept.
    pub compatible_brands: Vec<FourCC>,
}

impl FileTypeBox {
    pub fn major_brand(&self) -> FourCC {
        self.major_brand
    }

    pub fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub fn compatible_brands(&self) -> &[FourCC] {
        &self.compatible_brands
    }

    /// True when `brand` is among the compatible brands.
    pub fn has_brand(&self, brand: &str) -> bool {
        self.compatible_brands.iter().any(|b| *b == brand)
    }
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let major_brand = cur.read_fourcc()?;
    let minor_version = cur.read_u32()?;

    let rest = ctx.remaining(cur);
    if rest % 4 != 0 {
        return Err(ParseError::SizeMismatch {
            typ: ctx.typ(),
            offset: ctx.header.start,
            expected: ctx.box_len(),
            actual: ctx.box_len() - rest % 4,
        });
    }

    let mut compatible_brands = Vec::with_capacity((rest / 4) as usize);
    for _ in 0..rest / 4 {
        compatible_brands.push(cur.read_fourcc()?);
    }

    Ok(BoxBody::FileType(FileTypeBox {
        major_brand,
        minor_version,
        compatible_brands,
    }))
}
