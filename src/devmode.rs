//! DEVMODE binary codec
//!
//! Encodes and decodes the public part of the little-endian `DEVMODEW`
//! structure: a 220-byte header followed by `dmDriverExtra` opaque driver
//! bytes. A header larger than 220 bytes (newer structure revisions) is
//! kept verbatim so a decode/encode cycle reproduces the input.

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::schema::enums::PageMediaSizeName;

/// Size of the public `DEVMODEW` header in bytes
pub const HEADER_SIZE: usize = 220;

/// UTF-16 units in the device and form name fields
pub const NAME_UNITS: usize = 32;

/// `dmSpecVersion` written by [`DevMode::new`]
pub const SPEC_VERSION: u16 = 0x0401;

bitflags! {
    /// `dmFields`: which members of the structure are initialized
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DevModeFields: u32 {
        const ORIENTATION = 0x0000_0001;
        const PAPER_SIZE = 0x0000_0002;
        const PAPER_LENGTH = 0x0000_0004;
        const PAPER_WIDTH = 0x0000_0008;
        const SCALE = 0x0000_0010;
        const POSITION = 0x0000_0020;
        const NUP = 0x0000_0040;
        const DISPLAY_ORIENTATION = 0x0000_0080;
        const COPIES = 0x0000_0100;
        const DEFAULT_SOURCE = 0x0000_0200;
        const PRINT_QUALITY = 0x0000_0400;
        const COLOR = 0x0000_0800;
        const DUPLEX = 0x0000_1000;
        const Y_RESOLUTION = 0x0000_2000;
        const TT_OPTION = 0x0000_4000;
        const COLLATE = 0x0000_8000;
        const FORM_NAME = 0x0001_0000;
        const LOG_PIXELS = 0x0002_0000;
        const BITS_PER_PEL = 0x0004_0000;
        const PELS_WIDTH = 0x0008_0000;
        const PELS_HEIGHT = 0x0010_0000;
        const DISPLAY_FLAGS = 0x0020_0000;
        const DISPLAY_FREQUENCY = 0x0040_0000;
        const ICM_METHOD = 0x0080_0000;
        const ICM_INTENT = 0x0100_0000;
        const MEDIA_TYPE = 0x0200_0000;
    }
}

/// Well-known member values
pub mod consts {
    /// `DMORIENT_PORTRAIT`
    pub const ORIENT_PORTRAIT: i16 = 1;
    /// `DMORIENT_LANDSCAPE`
    pub const ORIENT_LANDSCAPE: i16 = 2;

    /// `DMCOLOR_MONOCHROME`
    pub const COLOR_MONOCHROME: i16 = 1;
    /// `DMCOLOR_COLOR`
    pub const COLOR_COLOR: i16 = 2;

    /// `DMDUP_SIMPLEX`
    pub const DUPLEX_SIMPLEX: i16 = 1;
    /// `DMDUP_VERTICAL`, flip on the long edge
    pub const DUPLEX_VERTICAL: i16 = 2;
    /// `DMDUP_HORIZONTAL`, flip on the short edge
    pub const DUPLEX_HORIZONTAL: i16 = 3;

    /// `DMCOLLATE_FALSE`
    pub const COLLATE_FALSE: i16 = 0;
    /// `DMCOLLATE_TRUE`
    pub const COLLATE_TRUE: i16 = 1;

    /// `DMRES_DRAFT`
    pub const RES_DRAFT: i16 = -1;
    /// `DMRES_LOW`
    pub const RES_LOW: i16 = -2;
    /// `DMRES_MEDIUM`
    pub const RES_MEDIUM: i16 = -3;
    /// `DMRES_HIGH`
    pub const RES_HIGH: i16 = -4;

    /// `DMPAPER_USER`, size given by paper length and width
    pub const PAPER_USER: i16 = 256;

    /// `DMMEDIA_STANDARD`
    pub const MEDIA_STANDARD: u32 = 1;
    /// `DMMEDIA_TRANSPARENCY`
    pub const MEDIA_TRANSPARENCY: u32 = 2;
    /// `DMMEDIA_GLOSSY`
    pub const MEDIA_GLOSSY: u32 = 3;
}

/// Errors raised while decoding or encoding a DEVMODE buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevModeError {
    /// Buffer cannot hold the fixed header
    #[error("buffer of {0} bytes is shorter than the 220-byte header")]
    TooShort(usize),
    /// `dmSize` declares a header smaller than the public one
    #[error("dmSize {0} is smaller than the 220-byte header")]
    HeaderTooSmall(u16),
    /// Buffer length disagrees with the declared sizes
    #[error("buffer length {actual} does not match dmSize + dmDriverExtra = {expected}")]
    LengthMismatch {
        /// `dmSize + dmDriverExtra`
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },
    /// A name or payload is too large to encode
    #[error("{0} does not fit its 16-bit size field")]
    Oversized(&'static str),
}

/// Decoded DEVMODE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevMode {
    /// `dmDeviceName`
    pub device_name: String,
    /// `dmSpecVersion`
    pub spec_version: u16,
    /// `dmDriverVersion`
    pub driver_version: u16,
    /// `dmFields`
    pub fields: DevModeFields,
    /// `dmOrientation`, one of the `ORIENT_*` constants
    pub orientation: i16,
    /// `dmPaperSize`, a `DMPAPER_*` code
    pub paper_size: i16,
    /// Tenths of a millimeter
    pub paper_length: i16,
    /// Tenths of a millimeter
    pub paper_width: i16,
    /// Percent
    pub scale: i16,
    /// `dmCopies`
    pub copies: i16,
    /// `dmDefaultSource`
    pub default_source: i16,
    /// Positive DPI or one of the `RES_*` constants
    pub print_quality: i16,
    /// `dmColor`
    pub color: i16,
    /// `dmDuplex`
    pub duplex: i16,
    /// `dmYResolution` in DPI
    pub y_resolution: i16,
    /// `dmTTOption`
    pub tt_option: i16,
    /// `dmCollate`
    pub collate: i16,
    /// `dmFormName`
    pub form_name: String,
    /// `dmLogPixels`
    pub log_pixels: u16,
    /// `dmBitsPerPel`
    pub bits_per_pel: u32,
    /// `dmPelsWidth`
    pub pels_width: u32,
    /// `dmPelsHeight`
    pub pels_height: u32,
    /// `dmNup`
    pub nup: u32,
    /// `dmDisplayFrequency`
    pub display_frequency: u32,
    /// `dmICMMethod`
    pub icm_method: u32,
    /// `dmICMIntent`
    pub icm_intent: u32,
    /// `dmMediaType`, one of the `MEDIA_*` constants
    pub media_type: u32,
    /// `dmDitherType`
    pub dither_type: u32,
    /// `dmReserved1`
    pub reserved1: u32,
    /// `dmReserved2`
    pub reserved2: u32,
    /// `dmPanningWidth`
    pub panning_width: u32,
    /// `dmPanningHeight`
    pub panning_height: u32,
    /// Header bytes past the public 220, kept verbatim
    pub header_tail: Bytes,
    /// Opaque driver-private bytes
    pub driver_extra: Bytes,
}

impl Default for DevMode {
    fn default() -> Self {
        Self::new("")
    }
}

fn get_name(cursor: &mut &[u8]) -> String {
    let mut units = [0u16; NAME_UNITS];
    for unit in units.iter_mut() {
        *unit = cursor.get_u16_le();
    }
    let end = units.iter().position(|u| *u == 0).unwrap_or(NAME_UNITS);
    String::from_utf16_lossy(&units[..end])
}

/// Write a NUL-terminated name, truncated to 31 UTF-16 units
fn put_name(buf: &mut BytesMut, name: &str) {
    let mut written = 0;
    for unit in name.encode_utf16().take(NAME_UNITS - 1) {
        buf.put_u16_le(unit);
        written += 1;
    }
    for _ in written..NAME_UNITS {
        buf.put_u16_le(0);
    }
}

impl DevMode {
    /// Empty DEVMODE for a device, no fields initialized
    pub fn new(device_name: &str) -> Self {
        Self {
            device_name: device_name.to_string(),
            spec_version: SPEC_VERSION,
            driver_version: 0,
            fields: DevModeFields::empty(),
            orientation: 0,
            paper_size: 0,
            paper_length: 0,
            paper_width: 0,
            scale: 0,
            copies: 0,
            default_source: 0,
            print_quality: 0,
            color: 0,
            duplex: 0,
            y_resolution: 0,
            tt_option: 0,
            collate: 0,
            form_name: String::new(),
            log_pixels: 0,
            bits_per_pel: 0,
            pels_width: 0,
            pels_height: 0,
            nup: 0,
            display_frequency: 0,
            icm_method: 0,
            icm_intent: 0,
            media_type: 0,
            dither_type: 0,
            reserved1: 0,
            reserved2: 0,
            panning_width: 0,
            panning_height: 0,
            header_tail: Bytes::new(),
            driver_extra: Bytes::new(),
        }
    }

    /// Whether `field` is marked initialized
    pub fn has(&self, field: DevModeFields) -> bool {
        self.fields.contains(field)
    }

    /// Decode a DEVMODE buffer
    pub fn decode(buf: &[u8]) -> Result<Self, DevModeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DevModeError::TooShort(buf.len()));
        }
        let mut cursor = buf;
        let device_name = get_name(&mut cursor);
        let spec_version = cursor.get_u16_le();
        let driver_version = cursor.get_u16_le();
        let size = cursor.get_u16_le();
        let extra = cursor.get_u16_le();

        if (size as usize) < HEADER_SIZE {
            return Err(DevModeError::HeaderTooSmall(size));
        }
        let expected = size as usize + extra as usize;
        if buf.len() != expected {
            return Err(DevModeError::LengthMismatch {
                expected,
                actual: buf.len(),
            });
        }

        let fields = DevModeFields::from_bits_retain(cursor.get_u32_le());
        let orientation = cursor.get_i16_le();
        let paper_size = cursor.get_i16_le();
        let paper_length = cursor.get_i16_le();
        let paper_width = cursor.get_i16_le();
        let scale = cursor.get_i16_le();
        let copies = cursor.get_i16_le();
        let default_source = cursor.get_i16_le();
        let print_quality = cursor.get_i16_le();
        let color = cursor.get_i16_le();
        let duplex = cursor.get_i16_le();
        let y_resolution = cursor.get_i16_le();
        let tt_option = cursor.get_i16_le();
        let collate = cursor.get_i16_le();
        let form_name = get_name(&mut cursor);
        let log_pixels = cursor.get_u16_le();
        let bits_per_pel = cursor.get_u32_le();
        let pels_width = cursor.get_u32_le();
        let pels_height = cursor.get_u32_le();
        let nup = cursor.get_u32_le();
        let display_frequency = cursor.get_u32_le();
        let icm_method = cursor.get_u32_le();
        let icm_intent = cursor.get_u32_le();
        let media_type = cursor.get_u32_le();
        let dither_type = cursor.get_u32_le();
        let reserved1 = cursor.get_u32_le();
        let reserved2 = cursor.get_u32_le();
        let panning_width = cursor.get_u32_le();
        let panning_height = cursor.get_u32_le();
        debug_assert_eq!(buf.len() - cursor.remaining(), HEADER_SIZE);

        let header_tail = cursor.copy_to_bytes(size as usize - HEADER_SIZE);
        let driver_extra = cursor.copy_to_bytes(extra as usize);

        Ok(Self {
            device_name,
            spec_version,
            driver_version,
            fields,
            orientation,
            paper_size,
            paper_length,
            paper_width,
            scale,
            copies,
            default_source,
            print_quality,
            color,
            duplex,
            y_resolution,
            tt_option,
            collate,
            form_name,
            log_pixels,
            bits_per_pel,
            pels_width,
            pels_height,
            nup,
            display_frequency,
            icm_method,
            icm_intent,
            media_type,
            dither_type,
            reserved1,
            reserved2,
            panning_width,
            panning_height,
            header_tail,
            driver_extra,
        })
    }

    /// Encode to the on-the-wire representation
    pub fn encode(&self) -> Result<Bytes, DevModeError> {
        let size = u16::try_from(HEADER_SIZE + self.header_tail.len())
            .map_err(|_| DevModeError::Oversized("dmSize"))?;
        let extra = u16::try_from(self.driver_extra.len())
            .map_err(|_| DevModeError::Oversized("dmDriverExtra"))?;

        let mut buf = BytesMut::with_capacity(size as usize + extra as usize);
        put_name(&mut buf, &self.device_name);
        buf.put_u16_le(self.spec_version);
        buf.put_u16_le(self.driver_version);
        buf.put_u16_le(size);
        buf.put_u16_le(extra);
        buf.put_u32_le(self.fields.bits());
        buf.put_i16_le(self.orientation);
        buf.put_i16_le(self.paper_size);
        buf.put_i16_le(self.paper_length);
        buf.put_i16_le(self.paper_width);
        buf.put_i16_le(self.scale);
        buf.put_i16_le(self.copies);
        buf.put_i16_le(self.default_source);
        buf.put_i16_le(self.print_quality);
        buf.put_i16_le(self.color);
        buf.put_i16_le(self.duplex);
        buf.put_i16_le(self.y_resolution);
        buf.put_i16_le(self.tt_option);
        buf.put_i16_le(self.collate);
        put_name(&mut buf, &self.form_name);
        buf.put_u16_le(self.log_pixels);
        buf.put_u32_le(self.bits_per_pel);
        buf.put_u32_le(self.pels_width);
        buf.put_u32_le(self.pels_height);
        buf.put_u32_le(self.nup);
        buf.put_u32_le(self.display_frequency);
        buf.put_u32_le(self.icm_method);
        buf.put_u32_le(self.icm_intent);
        buf.put_u32_le(self.media_type);
        buf.put_u32_le(self.dither_type);
        buf.put_u32_le(self.reserved1);
        buf.put_u32_le(self.reserved2);
        buf.put_u32_le(self.panning_width);
        buf.put_u32_le(self.panning_height);
        debug_assert_eq!(buf.len(), HEADER_SIZE);
        buf.extend_from_slice(&self.header_tail);
        buf.extend_from_slice(&self.driver_extra);
        Ok(buf.freeze())
    }
}

/// Standard paper: `DMPAPER_*` code, media size keyword, size in microns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paper {
    /// `DMPAPER_*` code
    pub code: i16,
    /// Media size keyword
    pub media: PageMediaSizeName,
    /// Width in microns
    pub width: i32,
    /// Height in microns
    pub height: i32,
}

/// Paper codes with a media size keyword
pub const PAPERS: &[Paper] = &[
    Paper { code: 1, media: PageMediaSizeName::NorthAmericaLetter, width: 215_900, height: 279_400 },
    Paper { code: 3, media: PageMediaSizeName::NorthAmericaTabloid, width: 279_400, height: 431_800 },
    Paper { code: 5, media: PageMediaSizeName::NorthAmericaLegal, width: 215_900, height: 355_600 },
    Paper { code: 7, media: PageMediaSizeName::NorthAmericaExecutive, width: 184_150, height: 266_700 },
    Paper { code: 8, media: PageMediaSizeName::IsoA3, width: 297_000, height: 420_000 },
    Paper { code: 9, media: PageMediaSizeName::IsoA4, width: 210_000, height: 297_000 },
    Paper { code: 11, media: PageMediaSizeName::IsoA5, width: 148_000, height: 210_000 },
    Paper { code: 12, media: PageMediaSizeName::JisB4, width: 257_000, height: 364_000 },
    Paper { code: 13, media: PageMediaSizeName::JisB5, width: 182_000, height: 257_000 },
    Paper { code: 20, media: PageMediaSizeName::NorthAmericaNumber10Envelope, width: 104_775, height: 241_300 },
    Paper { code: 27, media: PageMediaSizeName::IsoDlEnvelope, width: 110_000, height: 220_000 },
    Paper { code: 70, media: PageMediaSizeName::IsoA6, width: 105_000, height: 148_000 },
];

/// Paper for a `DMPAPER_*` code
pub fn paper_by_code(code: i16) -> Option<&'static Paper> {
    PAPERS.iter().find(|p| p.code == code)
}

/// Paper for a media size keyword
pub fn paper_by_media(media: PageMediaSizeName) -> Option<&'static Paper> {
    PAPERS.iter().find(|p| p.media == media)
}

/// Tenths of a millimeter to microns
pub fn tenth_mm_to_micron(value: i16) -> i32 {
    i32::from(value) * 100
}

/// Microns to tenths of a millimeter, saturating at the field range
pub fn micron_to_tenth_mm(value: i32) -> i16 {
    let tenths = value.saturating_add(50) / 100;
    tenths.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DevMode {
        let mut dm = DevMode::new("Contoso LaserJet");
        dm.driver_version = 0x0600;
        dm.fields = DevModeFields::ORIENTATION
            | DevModeFields::PAPER_SIZE
            | DevModeFields::COPIES
            | DevModeFields::DUPLEX
            | DevModeFields::COLLATE;
        dm.orientation = consts::ORIENT_LANDSCAPE;
        dm.paper_size = 9;
        dm.copies = 3;
        dm.duplex = consts::DUPLEX_VERTICAL;
        dm.collate = consts::COLLATE_TRUE;
        dm.print_quality = consts::RES_HIGH;
        dm.form_name = "A4".to_string();
        dm.media_type = consts::MEDIA_GLOSSY;
        dm.panning_height = 0xDEAD_BEEF;
        dm.driver_extra = Bytes::from_static(&[1, 2, 3, 4, 5]);
        dm
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 5);
        assert_eq!(&bytes[0..4], &[b'C', 0, b'o', 0]);
        assert_eq!(u16::from_le_bytes([bytes[68], bytes[69]]), 220);
        assert_eq!(u16::from_le_bytes([bytes[70], bytes[71]]), 5);
        assert_eq!(i16::from_le_bytes([bytes[76], bytes[77]]), consts::ORIENT_LANDSCAPE);
        assert_eq!(i16::from_le_bytes([bytes[86], bytes[87]]), 3);
        assert_eq!(&bytes[102..106], &[b'A', 0, b'4', 0]);
        assert_eq!(
            u32::from_le_bytes([bytes[216], bytes[217], bytes[218], bytes[219]]),
            0xDEAD_BEEF
        );
    }

    #[test]
    fn test_decode_encode_preserves_everything() {
        let dm = sample();
        let decoded = DevMode::decode(&dm.encode().unwrap()).unwrap();
        assert_eq!(decoded, dm);
        assert!(decoded.has(DevModeFields::DUPLEX));
        assert!(!decoded.has(DevModeFields::SCALE));
    }

    #[test]
    fn test_unknown_header_tail_is_kept() {
        let mut dm = sample();
        dm.header_tail = Bytes::from_static(&[9, 9, 9, 9]);
        dm.fields |= DevModeFields::from_bits_retain(0x8000_0000);
        let bytes = dm.encode().unwrap();
        assert_eq!(u16::from_le_bytes([bytes[68], bytes[69]]), 224);
        let decoded = DevMode::decode(&bytes).unwrap();
        assert_eq!(decoded.header_tail.as_ref(), &[9, 9, 9, 9]);
        assert_eq!(decoded.driver_extra.as_ref(), &[1, 2, 3, 4, 5]);
        assert_eq!(decoded.fields.bits() & 0x8000_0000, 0x8000_0000);
    }

    #[test]
    fn test_decode_rejects_bad_buffers() {
        assert_eq!(
            DevMode::decode(&[0u8; 10]).unwrap_err(),
            DevModeError::TooShort(10)
        );

        let mut bytes = sample().encode().unwrap().to_vec();
        bytes[68..70].copy_from_slice(&100u16.to_le_bytes());
        assert_eq!(
            DevMode::decode(&bytes).unwrap_err(),
            DevModeError::HeaderTooSmall(100)
        );

        let mut bytes = sample().encode().unwrap().to_vec();
        bytes.pop();
        assert_eq!(
            DevMode::decode(&bytes).unwrap_err(),
            DevModeError::LengthMismatch {
                expected: HEADER_SIZE + 5,
                actual: HEADER_SIZE + 4
            }
        );
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut dm = DevMode::new(&"x".repeat(40));
        dm.form_name = "y".repeat(32);
        let decoded = DevMode::decode(&dm.encode().unwrap()).unwrap();
        assert_eq!(decoded.device_name.len(), NAME_UNITS - 1);
        assert_eq!(decoded.form_name.len(), NAME_UNITS - 1);
    }

    #[test]
    fn test_paper_table() {
        let a4 = paper_by_code(9).unwrap();
        assert_eq!(a4.media, PageMediaSizeName::IsoA4);
        assert_eq!(paper_by_media(PageMediaSizeName::NorthAmericaLetter).unwrap().code, 1);
        assert!(paper_by_code(256).is_none());
        assert!(paper_by_media(PageMediaSizeName::CustomMediaSize).is_none());
        assert_eq!(tenth_mm_to_micron(2100), 210_000);
        assert_eq!(micron_to_tenth_mm(215_900), 2159);
        assert_eq!(micron_to_tenth_mm(10_000_000), i16::MAX);
        assert_eq!(micron_to_tenth_mm(i32::MAX), i16::MAX);
        assert_eq!(micron_to_tenth_mm(i32::MIN), i16::MIN);
    }
}
