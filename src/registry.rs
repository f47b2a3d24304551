use crate::boxes::{BoxBody, BoxKey, FourCC};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::heif::{colr, dinf, ftyp, hdlr, iinf, iloc, iprp, iref, item, meta};
use crate::parser::DecodeContext;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Trait for box payload decoders.
///
/// A decoder is called with the cursor just past the box header and must
/// consume exactly the rest of the box (`ctx.end`), recursing through
/// `ctx.children` for container payloads.
pub trait BoxDecoder: Send + Sync {
    fn decode(&self, cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody>;
}

impl<F> BoxDecoder for F
where
    F: Fn(&mut ByteCursor<'_>, &DecodeContext<'_>) -> Result<BoxBody> + Send + Sync,
{
    fn decode(&self, cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
        self(cur, ctx)
    }
}

/// Registry of decoders keyed by `BoxKey` (4CC or UUID).
///
/// The registry is immutable once constructed; use [`Registry::with_decoder`]
/// to build it fluently. Keys without a decoder fall back to [`decode_opaque`].
pub struct Registry {
    map: HashMap<BoxKey, BoxDecoderEntry>,
}

struct BoxDecoderEntry {
    inner: Box<dyn BoxDecoder>,
    name: String,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and used only for debugging / logging.
    pub fn with_decoder(mut self, key: BoxKey, name: &str, dec: Box<dyn BoxDecoder>) -> Self {
        self.map.insert(
            key,
            BoxDecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
        self
    }

    /// The process-wide default registry, built on first use.
    pub fn shared() -> &'static Registry {
        static SHARED: OnceLock<Registry> = OnceLock::new();
        SHARED.get_or_init(default_registry)
    }

    pub fn contains(&self, key: &BoxKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn decoder_name(&self, key: &BoxKey) -> Option<&str> {
        self.map.get(key).map(|d| d.name.as_str())
    }

    /// Decode the payload of `ctx.header`, using the opaque decoder for
    /// unregistered keys.
    pub fn decode(&self, cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
        match self.map.get(&ctx.header.key()) {
            Some(d) => d.inner.decode(cur, ctx),
            None => decode_opaque(cur, ctx),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Skip the payload by byte count.
pub fn decode_opaque(cur: &mut ByteCursor<'_>, ctx: &DecodeContext<'_>) -> Result<BoxBody> {
    let data_offset = cur.position();
    let data_len = ctx.skip_rest(cur)?;
    log::trace!("{}: skipped {} opaque bytes", ctx.typ(), data_len);
    Ok(BoxBody::Opaque {
        data_offset,
        data_len,
    })
}

// ---------- Default registry ----------
pub fn default_registry() -> Registry {
    let key = |cc: FourCC| BoxKey::FourCC(cc);

    Registry::new()
        .with_decoder(key(FourCC::FTYP), "ftyp", Box::new(ftyp::decode))
        .with_decoder(key(FourCC::META), "meta", Box::new(meta::decode))
        .with_decoder(key(FourCC::HDLR), "hdlr", Box::new(hdlr::decode))
        .with_decoder(key(FourCC::DINF), "dinf", Box::new(dinf::decode_dinf))
        .with_decoder(key(FourCC::DREF), "dref", Box::new(dinf::decode_dref))
        .with_decoder(key(FourCC::URL), "url ", Box::new(dinf::decode_entry))
        .with_decoder(key(FourCC::URN), "urn ", Box::new(dinf::decode_entry))
        .with_decoder(key(FourCC::IINF), "iinf", Box::new(iinf::decode_iinf))
        .with_decoder(key(FourCC::INFE), "infe", Box::new(iinf::decode_infe))
        .with_decoder(key(FourCC::ILOC), "iloc", Box::new(iloc::decode))
        .with_decoder(key(FourCC::IPRP), "iprp", Box::new(iprp::decode_iprp))
        .with_decoder(key(FourCC::IPCO), "ipco", Box::new(iprp::decode_ipco))
        .with_decoder(key(FourCC::IPMA), "ipma", Box::new(iprp::decode_ipma))
        .with_decoder(key(FourCC::PIXI), "pixi", Box::new(iprp::decode_pixi))
        .with_decoder(key(FourCC::IROT), "irot", Box::new(iprp::decode_irot))
        .with_decoder(key(FourCC::ISPE), "ispe", Box::new(iprp::decode_ispe))
        .with_decoder(key(FourCC::COLR), "colr", Box::new(colr::decode))
        .with_decoder(key(FourCC::IREF), "iref", Box::new(iref::decode))
        .with_decoder(key(FourCC::IDAT), "idat", Box::new(item::decode_idat))
        .with_decoder(key(FourCC::PITM), "pitm", Box::new(item::decode_pitm))
        .with_decoder(key(FourCC::IPRO), "ipro", Box::new(item::decode_ipro))
}
