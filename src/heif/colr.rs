use crate::boxes::{BoxBody, FourCC};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::parser::DecodeContext;
use serde::Serialize;

const NCLX: FourCC = FourCC(*b"nclx");
const RICC: FourCC = FourCC(*b"rICC");
const PROF: FourCC = FourCC(*b"prof");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColourInformation {
    /// CICP code points (ISO/IEC 23091-2).
    Nclx {
        colour_primaries: u16,
        transfer_characteristics: u16,
        matrix_coefficients: u16,
        full_range: bool,
    },
    /// `rICC` (restricted) or `prof` (unrestricted) ICC profile, kept as is.
    Icc { restricted: bool, profile: Vec<u8> },
    /// Colour type this crate doesn't know; its bytes were skipped.
    Unknown { skipped: u64 },
}

/// `colr`: colour type code plus one of the payload shapes above.
#[derive(Debug, Clone, Serialize)]
pub struct ColourInformationBox {
    pub colour_type: FourCC,
    pub info: ColourInformation,
}

pub fn decode(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let colour_type = cur.read_fourcc()?;

    let info = match colour_type {
        NCLX => {
            let colour_primaries = cur.read_u16()?;
            let transfer_characteristics = cur.read_u16()?;
            let matrix_coefficients = cur.read_u16()?;
            // full_range_flag (1 bit) + reserved (7 bits)
            let full_range = cur.read_u8()? & 0x80 != 0;
            ColourInformation::Nclx {
                colour_primaries,
                transfer_characteristics,
                matrix_coefficients,
                full_range,
            }
        }
        RICC | PROF => ColourInformation::Icc {
            restricted: colour_type == RICC,
            profile: cur.read_bytes(ctx.remaining(cur))?.to_vec(),
        },
        other => {
            let skipped = ctx.skip_rest(cur)?;
            log::warn!(
                "colr at {:#x}: unknown colour type '{}', skipped {} bytes",
                ctx.header.start,
                other,
                skipped
            );
            ColourInformation::Unknown { skipped }
        }
    };

    Ok(BoxBody::ColourInformation(ColourInformationBox { colour_type, info }))
}
