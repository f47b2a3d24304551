#![allow(dead_code)]

// Byte builders for synthetic box streams.

/// Plain box: 32-bit size + type + payload.
pub fn bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8 + payload.len());
    v.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// Box with a 64-bit size: size field 1, then the real size after the type.
pub fn large_bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(16 + payload.len());
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&(16 + payload.len() as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// `uuid` box, optionally with a 64-bit size (32- or 24-byte header).
pub fn uuid_bx(ext: [u8; 16], large: bool, payload: &[u8]) -> Vec<u8> {
    let mut p = ext.to_vec();
    p.extend_from_slice(payload);
    if large {
        large_bx(b"uuid", &p)
    } else {
        bx(b"uuid", &p)
    }
}

/// Box with size field 0: it runs to the end of whatever encloses it.
pub fn to_end_bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = 0u32.to_be_bytes().to_vec();
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// FullBox: version + 24-bit flags in front of `payload`.
pub fn full_bx(typ: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut p = Vec::with_capacity(4 + payload.len());
    p.push(version);
    p.extend_from_slice(&flags.to_be_bytes()[1..]);
    p.extend_from_slice(payload);
    bx(typ, &p)
}

pub fn cstr(s: &str) -> Vec<u8> {
    let mut v = s.as_bytes().to_vec();
    v.push(0);
    v
}

pub fn ftyp(major: &[u8; 4], minor: u32, compatible: &[&[u8; 4]]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(major);
    p.extend_from_slice(&minor.to_be_bytes());
    for b in compatible {
        p.extend_from_slice(*b);
    }
    bx(b"ftyp", &p)
}

pub fn hdlr(handler: &[u8; 4], name: &str) -> Vec<u8> {
    let mut p = vec![0u8; 4]; // pre_defined
    p.extend_from_slice(handler);
    p.extend_from_slice(&[0u8; 12]);
    p.extend_from_slice(&cstr(name));
    full_bx(b"hdlr", 0, 0, &p)
}

pub fn pitm(item_id: u16) -> Vec<u8> {
    full_bx(b"pitm", 0, 0, &item_id.to_be_bytes())
}

/// `infe` version 2: 16-bit id, protection index 0, type and name.
pub fn infe_v2(item_id: u16, item_type: &[u8; 4], name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&item_id.to_be_bytes());
    p.extend_from_slice(&0u16.to_be_bytes());
    p.extend_from_slice(item_type);
    p.extend_from_slice(&cstr(name));
    full_bx(b"infe", 2, 0, &p)
}

/// `iinf` version 0 around already-built entries.
pub fn iinf_v0(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut p = (entries.len() as u16).to_be_bytes().to_vec();
    for e in entries {
        p.extend_from_slice(e);
    }
    full_bx(b"iinf", 0, 0, &p)
}

/// `iloc` version 0 with 4-byte offsets and lengths, no base offset.
/// Each item is `(item_id, data_reference_index, [(offset, length)])`.
pub fn iloc_v0(items: &[(u16, u16, &[(u32, u32)])]) -> Vec<u8> {
    let mut p = vec![0x44, 0x00];
    p.extend_from_slice(&(items.len() as u16).to_be_bytes());
    for (id, dref, extents) in items {
        p.extend_from_slice(&id.to_be_bytes());
        p.extend_from_slice(&dref.to_be_bytes());
        p.extend_from_slice(&(extents.len() as u16).to_be_bytes());
        for (off, len) in extents.iter() {
            p.extend_from_slice(&off.to_be_bytes());
            p.extend_from_slice(&len.to_be_bytes());
        }
    }
    full_bx(b"iloc", 0, 0, &p)
}

/// `iloc` version 1 with 4-byte offsets and lengths and one extent per item.
/// Each item is `(item_id, construction_method, offset, length)`.
pub fn iloc_v1(items: &[(u16, u16, u32, u32)]) -> Vec<u8> {
    let mut p = vec![0x44, 0x00];
    p.extend_from_slice(&(items.len() as u16).to_be_bytes());
    for (id, method, off, len) in items {
        p.extend_from_slice(&id.to_be_bytes());
        p.extend_from_slice(&method.to_be_bytes());
        p.extend_from_slice(&0u16.to_be_bytes()); // data_reference_index
        p.extend_from_slice(&1u16.to_be_bytes()); // extent_count
        p.extend_from_slice(&off.to_be_bytes());
        p.extend_from_slice(&len.to_be_bytes());
    }
    full_bx(b"iloc", 1, 0, &p)
}

pub fn ispe(width: u32, height: u32) -> Vec<u8> {
    let mut p = width.to_be_bytes().to_vec();
    p.extend_from_slice(&height.to_be_bytes());
    full_bx(b"ispe", 0, 0, &p)
}

/// `ipma` version 0, narrow indices. Each entry is `(item_id, [raw byte])`.
pub fn ipma_v0(entries: &[(u16, &[u8])]) -> Vec<u8> {
    let mut p = (entries.len() as u32).to_be_bytes().to_vec();
    for (id, assoc) in entries {
        p.extend_from_slice(&id.to_be_bytes());
        p.push(assoc.len() as u8);
        p.extend_from_slice(assoc);
    }
    full_bx(b"ipma", 0, 0, &p)
}

pub fn meta(children: &[Vec<u8>]) -> Vec<u8> {
    full_bx(b"meta", 0, 0, &children.concat())
}

/// Exif item payload: TIFF header offset, the `Exif\0\0` marker, then a
/// big-endian TIFF header.
pub fn exif_payload() -> Vec<u8> {
    let mut v = 6u32.to_be_bytes().to_vec();
    v.extend_from_slice(b"Exif\0\0");
    v.extend_from_slice(b"MM\0\x2a");
    v.extend_from_slice(&8u32.to_be_bytes());
    v.extend_from_slice(&[0u8; 6]);
    v
}

/// A complete still-image file: an `hvc1` primary item (id 1) and an
/// `Exif` item (id 2), both stored in `mdat`.
///
/// Returns the file plus the absolute offsets of the two items' data.
pub fn heic_with_exif(image: &[u8], exif: &[u8]) -> (Vec<u8>, u64, u64) {
    let build = |image_off: u32, exif_off: u32| {
        let ipco = bx(b"ipco", &ispe(640, 480));
        let iprp = bx(b"iprp", &[ipco, ipma_v0(&[(1, &[0x81])])].concat());
        meta(&[
            hdlr(b"pict", ""),
            pitm(1),
            iinf_v0(&[infe_v2(1, b"hvc1", "image"), infe_v2(2, b"Exif", "")]),
            iloc_v0(&[
                (1, 0, &[(image_off, image.len() as u32)]),
                (2, 0, &[(exif_off, exif.len() as u32)]),
            ]),
            iprp,
        ])
    };

    let head = ftyp(b"heic", 0, &[b"mif1", b"heic"]);
    // field widths are fixed, so the layout doesn't depend on the offsets
    let mdat_payload = (head.len() + build(0, 0).len() + 8) as u32;
    let image_off = mdat_payload;
    let exif_off = mdat_payload + image.len() as u32;

    let mut file = head;
    file.extend_from_slice(&build(image_off, exif_off));
    file.extend_from_slice(&bx(b"mdat", &[image, exif].concat()));
    (file, image_off as u64, exif_off as u64)
}
