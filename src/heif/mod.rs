//! Payload decoders and records for the HEIF item-metadata box set
//! (ISO/IEC 14496-12 and 23008-12).

pub mod colr;
pub mod dinf;
pub mod ftyp;
pub mod hdlr;
pub mod iinf;
pub mod iloc;
pub mod iprp;
pub mod iref;
pub mod item;
pub mod meta;

/// Find the first child box whose body matches `$variant` and borrow its
/// record.
macro_rules! find_body {
    ($children:expr, $variant:path) => {
        $children.iter().find_map(|c| match &c.body {
            $variant(inner) => Some(inner),
            _ => None,
        })
    };
}

pub(crate) use find_body;
