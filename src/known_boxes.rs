use crate::boxes::FourCC;

// One row per box type: variant, type code, display name, then whether it
// holds child boxes and whether it starts with a version/flags word.
macro_rules! known_boxes {
    ($( $variant:ident => $code:literal, $name:literal, $container:literal, $full:literal; )*) => {
        /// Typed view over the box types found in HEIF files.
        ///
        /// Codes outside the table map to `KnownBox::Unknown(fourcc)`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownBox {
            $( $variant, )*
            Unknown(FourCC),
        }

        impl From<FourCC> for KnownBox {
            fn from(cc: FourCC) -> Self {
                match &cc.0 {
                    $( $code => KnownBox::$variant, )*
                    _ => KnownBox::Unknown(cc),
                }
            }
        }

        impl KnownBox {
            /// Human-readable name, as used in dumps.
            pub fn full_name(&self) -> &'static str {
                match self {
                    $( KnownBox::$variant => $name, )*
                    KnownBox::Unknown(_) => "Unknown Box",
                }
            }

            /// Holds a sequence of child boxes in its payload.
            pub fn is_container(&self) -> bool {
                match self {
                    $( KnownBox::$variant => $container, )*
                    KnownBox::Unknown(_) => false,
                }
            }

            /// Payload starts with the FullBox version and flags.
            pub fn is_full_box(&self) -> bool {
                match self {
                    $( KnownBox::$variant => $full, )*
                    KnownBox::Unknown(_) => false,
                }
            }
        }
    };
}

known_boxes! {
    Ftyp => b"ftyp", "File Type Box", false, false;
    Meta => b"meta", "Meta Box", true, true;
    Mdat => b"mdat", "Media Data Box", false, false;
    Free => b"free", "Free Space Box", false, false;
    Skip => b"skip", "Free Space Box", false, false;
    Moov => b"moov", "Movie Box", true, false;

    Hdlr => b"hdlr", "Handler Reference Box", false, true;
    Pitm => b"pitm", "Primary Item Box", false, true;
    Dinf => b"dinf", "Data Information Box", true, false;
    Dref => b"dref", "Data Reference Box", true, true;
    Url => b"url ", "Data Entry URL Box", false, true;
    Urn => b"urn ", "Data Entry URN Box", false, true;
    Iinf => b"iinf", "Item Information Box", true, true;
    Infe => b"infe", "Item Info Entry", false, true;
    Iloc => b"iloc", "Item Location Box", false, true;
    Iref => b"iref", "Item Reference Box", true, true;
    Idat => b"idat", "Item Data Box", false, false;
    Ipro => b"ipro", "Item Protection Box", true, true;
    Sinf => b"sinf", "Protection Scheme Info Box", true, false;

    Iprp => b"iprp", "Item Properties Box", true, false;
    Ipco => b"ipco", "Item Property Container Box", true, false;
    Ipma => b"ipma", "Item Property Association Box", false, true;
    Ispe => b"ispe", "Image Spatial Extents Property", false, true;
    Pixi => b"pixi", "Pixel Information Property", false, true;
    Colr => b"colr", "Colour Information Box", false, false;
    Irot => b"irot", "Image Rotation Property", false, false;
    Imir => b"imir", "Image Mirror Property", false, false;
    Clap => b"clap", "Clean Aperture Box", false, false;
    AuxC => b"auxC", "Auxiliary Type Property", false, true;
    Hvcc => b"hvcC", "HEVC Configuration Box", false, false;
    Av1c => b"av1C", "AV1 Configuration Box", false, false;

    Uuid => b"uuid", "User Extension Box", false, false;
}
