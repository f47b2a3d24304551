mod common;

use common::{
    bx, exif_payload, ftyp, full_bx, hdlr, heic_with_exif, iinf_v0, iloc_v0, iloc_v1, infe_v2,
    meta, pitm,
};
use heifbox::{BoxBody, ByteRange, FourCC, HeifFile, ParseError};
use std::borrow::Cow;

#[test]
fn exif_location_in_mdat() {
    let exif = exif_payload();
    let (buf, image_off, exif_off) = heic_with_exif(&[0xee; 10], &exif);
    let file = HeifFile::parse(&buf).unwrap();

    assert!(file.is_heif());
    assert_eq!(file.file_type().unwrap().major_brand(), "heic");
    assert_eq!(file.primary_item_id(), Some(1));
    assert_eq!(file.exif_item_id(), Some(2));
    assert_eq!(file.item_infos().count(), 2);

    assert_eq!(
        file.exif_location().unwrap(),
        Some(ByteRange {
            offset: exif_off,
            length: exif.len() as u64,
        })
    );
    assert_eq!(
        file.item_ranges(1).unwrap(),
        vec![ByteRange {
            offset: image_off,
            length: 10
        }]
    );
}

#[test]
fn exif_bytes_are_borrowed_from_the_buffer() {
    let exif = exif_payload();
    let (buf, _, _) = heic_with_exif(b"image-data", &exif);
    let file = HeifFile::parse(&buf).unwrap();

    let raw = file.exif_data(&buf).unwrap().unwrap();
    assert!(matches!(raw, Cow::Borrowed(_)));
    assert_eq!(&*raw, exif.as_slice());

    let tiff = file.exif_tiff_data(&buf).unwrap().unwrap();
    assert!(tiff.starts_with(b"MM\0\x2a"));
    assert_eq!(tiff.len(), exif.len() - 10);

    assert_eq!(&*file.item_data(&buf, 1).unwrap(), b"image-data");
}

#[test]
fn primary_item_properties() {
    let (buf, _, _) = heic_with_exif(&[0; 4], &exif_payload());
    let file = HeifFile::parse(&buf).unwrap();

    let props = file.properties_for(1);
    assert_eq!(props.len(), 1);
    let (essential, prop) = props[0];
    assert!(essential);
    match &prop.body {
        BoxBody::ImageSpatialExtents(s) => assert_eq!((s.width, s.height), (640, 480)),
        other => panic!("expected ispe, got {other:?}"),
    }
    assert!(file.properties_for(2).is_empty());
    assert!(file.references_from(1).is_empty());
}

#[test]
fn file_without_exif() {
    let data = [
        ftyp(b"avif", 0, &[b"mif1", b"avif"]),
        meta(&[hdlr(b"pict", ""), pitm(1), iinf_v0(&[infe_v2(1, b"av01", "")])]),
    ]
    .concat();
    let file = HeifFile::parse(&data).unwrap();
    assert_eq!(file.exif_item_id(), None);
    assert_eq!(file.exif_location().unwrap(), None);
    assert!(file.exif_tiff_data(&data).unwrap().is_none());
}

#[test]
fn not_heif_without_mif1() {
    let data = ftyp(b"isom", 512, &[b"isom", b"mp41"]);
    let file = HeifFile::parse(&data).unwrap();
    assert!(!file.is_heif());
    assert!(file.meta().is_none());
    assert_eq!(file.primary_item_id(), None);
}

#[test]
fn exif_in_idat() {
    let exif = exif_payload();
    let data = [
        ftyp(b"heic", 0, &[b"mif1"]),
        meta(&[
            hdlr(b"pict", ""),
            iinf_v0(&[infe_v2(1, b"Exif", "")]),
            iloc_v1(&[(1, 1, 3, exif.len() as u32)]),
            bx(b"idat", &[&[0xffu8; 3][..], &exif[..]].concat()),
        ]),
    ]
    .concat();
    let file = HeifFile::parse(&data).unwrap();

    let idat = file.meta().unwrap().item_data().unwrap();
    let loc = file.exif_location().unwrap().unwrap();
    assert_eq!(loc.offset, idat.data_offset + 3);
    assert_eq!(loc.length, exif.len() as u64);
    assert!(file.exif_tiff_data(&data).unwrap().unwrap().starts_with(b"MM"));
}

#[test]
fn idat_extent_past_its_end_fails() {
    let data = meta(&[
        iinf_v0(&[infe_v2(1, b"Exif", "")]),
        iloc_v1(&[(1, 1, 2, 10)]),
        bx(b"idat", &[0; 8]),
    ]);
    let file = HeifFile::parse(&data).unwrap();
    assert!(matches!(
        file.exif_location(),
        Err(ParseError::Item { item_id: 1, .. })
    ));
}

#[test]
fn item_offset_construction_is_unsupported() {
    let data = meta(&[
        iinf_v0(&[infe_v2(1, b"Exif", "")]),
        iloc_v1(&[(1, 2, 0, 4)]),
    ]);
    let file = HeifFile::parse(&data).unwrap();
    assert!(matches!(
        file.exif_location(),
        Err(ParseError::Unsupported(_))
    ));
}

#[test]
fn adjacent_extents_are_merged() {
    let payload = exif_payload();
    let (a, b) = payload.split_at(6);
    let head = ftyp(b"heic", 0, &[b"mif1"]);
    let build = |off: u32| {
        meta(&[
            iinf_v0(&[infe_v2(1, b"Exif", "")]),
            iloc_v0(&[(1, 0, &[(off, a.len() as u32), (off + 6, b.len() as u32)])]),
        ])
    };
    let off = (head.len() + build(0).len() + 8) as u32;
    let data = [head, build(off), bx(b"mdat", &payload)].concat();

    let file = HeifFile::parse(&data).unwrap();
    assert_eq!(
        file.exif_location().unwrap(),
        Some(ByteRange {
            offset: off as u64,
            length: payload.len() as u64,
        })
    );
    assert_eq!(&*file.exif_data(&data).unwrap().unwrap(), payload.as_slice());
}

#[test]
fn disjoint_extents_are_unsupported_for_exif() {
    let data = [
        meta(&[
            iinf_v0(&[infe_v2(1, b"Exif", "")]),
            iloc_v0(&[(1, 0, &[(0, 4), (8, 4)])]),
        ]),
        bx(b"mdat", &[0; 16]),
    ]
    .concat();
    let file = HeifFile::parse(&data).unwrap();
    assert!(matches!(
        file.exif_location(),
        Err(ParseError::Unsupported(_))
    ));

    // the bytes are still reachable, concatenated
    let joined = file.exif_data(&data).unwrap().unwrap();
    assert!(matches!(joined, Cow::Owned(_)));
    assert_eq!(joined.len(), 8);
}

#[test]
fn extent_past_end_of_file_fails() {
    let data = meta(&[
        iinf_v0(&[infe_v2(1, b"Exif", "")]),
        iloc_v0(&[(1, 0, &[(0, 4096)])]),
    ]);
    let file = HeifFile::parse(&data).unwrap();
    assert!(matches!(
        file.item_ranges(1),
        Err(ParseError::Item { item_id: 1, .. })
    ));
}

#[test]
fn zero_length_extent_runs_to_end() {
    let data = [
        meta(&[
            iinf_v0(&[infe_v2(1, b"Exif", "")]),
            iloc_v0(&[(1, 0, &[(0, 0)])]),
        ]),
        bx(b"mdat", &[0; 4]),
    ]
    .concat();
    let file = HeifFile::parse(&data).unwrap();
    let r = file.exif_location().unwrap().unwrap();
    assert_eq!(r.offset, 0);
    assert_eq!(r.length, data.len() as u64);
}

#[test]
fn external_data_reference_is_unsupported() {
    let mut dref = 1u32.to_be_bytes().to_vec();
    dref.extend_from_slice(&full_bx(b"url ", 0, 0, b"http://example.com/x\0"));
    let data = meta(&[
        bx(b"dinf", &full_bx(b"dref", 0, 0, &dref)),
        iinf_v0(&[infe_v2(1, b"Exif", "")]),
        iloc_v0(&[(1, 1, &[(0, 4)])]),
    ]);
    let file = HeifFile::parse(&data).unwrap();
    assert!(matches!(
        file.exif_location(),
        Err(ParseError::Unsupported(_))
    ));
}

#[test]
fn self_contained_data_reference_resolves_locally() {
    let mut dref = 1u32.to_be_bytes().to_vec();
    dref.extend_from_slice(&full_bx(b"url ", 0, 1, &[]));
    let data = [
        meta(&[
            bx(b"dinf", &full_bx(b"dref", 0, 0, &dref)),
            iinf_v0(&[infe_v2(1, b"Exif", "")]),
            iloc_v0(&[(1, 1, &[(0, 4)])]),
        ]),
        bx(b"mdat", &[0; 4]),
    ]
    .concat();
    let file = HeifFile::parse(&data).unwrap();
    assert_eq!(
        file.exif_location().unwrap(),
        Some(ByteRange {
            offset: 0,
            length: 4
        })
    );
}

#[test]
fn boxes_are_exposed_in_file_order() {
    let (buf, _, _) = heic_with_exif(&[1], &exif_payload());
    let file = HeifFile::parse(&buf).unwrap();
    let types: Vec<FourCC> = file.boxes().iter().map(|b| b.typ()).collect();
    assert_eq!(types, [FourCC::FTYP, FourCC::META, FourCC(*b"mdat")]);
}
