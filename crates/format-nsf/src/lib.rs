//! NES Sound Format (NSF) container parser.
//!
//! An NSF file is a fixed 128-byte header followed by a raw 6502 program
//! image. The header names the load, init and play entry points, the song
//! count and the play-call rate; the image is copied into the address space
//! at the load address and driven by a player.
//!
//! ```text
//! $00  5  "NESM" $1A
//! $05  1  version
//! $06  1  song count
//! $07  1  starting song (1-based)
//! $08  2  load address (LE)
//! $0A  2  init address (LE)
//! $0C  2  play address (LE)
//! $0E 32  title (NUL-terminated)
//! $2E 32  artist
//! $4E 32  copyright
//! $6E  2  NTSC play period, microseconds (LE)
//! $70  8  bankswitch init values
//! $78  2  PAL play period, microseconds (LE)
//! $7A  1  region flags
//! $7B  1  expansion chip flags
//! $7C  4  reserved
//! ```

use std::fmt;
use std::io::{self, Read};

use bitflags::bitflags;
use log::debug;

pub const MAGIC: &[u8; 5] = b"NESM\x1A";
pub const HEADER_LEN: usize = 0x80;

const VERSION: usize = 0x05;
const SONG_COUNT: usize = 0x06;
const STARTING_SONG: usize = 0x07;
const LOAD_ADDRESS: usize = 0x08;
const INIT_ADDRESS: usize = 0x0A;
const PLAY_ADDRESS: usize = 0x0C;
const TITLE: usize = 0x0E;
const ARTIST: usize = 0x2E;
const COPYRIGHT: usize = 0x4E;
const NTSC_SPEED: usize = 0x6E;
const BANKSWITCH: usize = 0x70;
const PAL_SPEED: usize = 0x78;
const REGION: usize = 0x7A;
const EXPANSION: usize = 0x7B;

const TEXT_FIELD_LEN: usize = 32;

#[derive(Debug)]
pub enum NsfError {
    /// Fewer bytes than a complete header.
    Truncated(usize),
    /// The first five bytes are not `NESM\x1A`.
    BadMagic([u8; 5]),
    /// The source ran dry before the declared length.
    ShortRead { expected: usize, actual: usize },
    Io(io::Error),
}

impl NsfError {
    /// Whether this error means the bytes are not a valid NSF container, as
    /// opposed to a failure to obtain the bytes.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Truncated(_) | Self::BadMagic(_))
    }
}

impl fmt::Display for NsfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated(size) => write!(
                f,
                "NSF too short: {size} bytes (header is {HEADER_LEN} bytes)"
            ),
            Self::BadMagic(magic) => write!(f, "not an NSF file: magic {magic:02X?}"),
            Self::ShortRead { expected, actual } => write!(
                f,
                "NSF source ended early: expected {expected} bytes, got {actual}"
            ),
            Self::Io(e) => write!(f, "NSF read failed: {e}"),
        }
    }
}

impl std::error::Error for NsfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NsfError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

bitflags! {
    /// Expansion audio chips the tune expects (header byte `$7B`).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ExpansionChips: u8 {
        const VRC6 = 0x01;
        const VRC7 = 0x02;
        const FDS = 0x04;
        const MMC5 = 0x08;
        const NAMCO_163 = 0x10;
        const SUNSOFT_5B = 0x20;
    }
}

/// Parsed NSF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsfHeader {
    pub version: u8,
    pub song_count: u8,
    /// 1-based.
    pub starting_song: u8,
    pub load_address: u16,
    pub init_address: u16,
    pub play_address: u16,
    pub title: String,
    pub artist: String,
    pub copyright: String,
    /// NTSC play-call period in microseconds.
    pub ntsc_speed: u16,
    pub bankswitch: [u8; 8],
    /// PAL play-call period in microseconds.
    pub pal_speed: u16,
    /// Raw region byte: bit 0 PAL, bit 1 dual PAL/NTSC.
    pub region: u8,
    pub expansion: ExpansionChips,
}

impl NsfHeader {
    /// Parse the header from the first [`HEADER_LEN`] bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, NsfError> {
        if data.len() < HEADER_LEN {
            return Err(NsfError::Truncated(data.len()));
        }
        if &data[..MAGIC.len()] != MAGIC {
            let mut magic = [0; 5];
            magic.copy_from_slice(&data[..MAGIC.len()]);
            return Err(NsfError::BadMagic(magic));
        }

        let mut bankswitch = [0; 8];
        bankswitch.copy_from_slice(&data[BANKSWITCH..BANKSWITCH + 8]);

        Ok(Self {
            version: data[VERSION],
            song_count: data[SONG_COUNT],
            starting_song: data[STARTING_SONG],
            load_address: read_u16(data, LOAD_ADDRESS),
            init_address: read_u16(data, INIT_ADDRESS),
            play_address: read_u16(data, PLAY_ADDRESS),
            title: read_text(data, TITLE),
            artist: read_text(data, ARTIST),
            copyright: read_text(data, COPYRIGHT),
            ntsc_speed: read_u16(data, NTSC_SPEED),
            bankswitch,
            pal_speed: read_u16(data, PAL_SPEED),
            region: data[REGION],
            expansion: ExpansionChips::from_bits_retain(data[EXPANSION]),
        })
    }

    #[must_use]
    pub fn is_pal(&self) -> bool {
        self.region & 0x01 != 0
    }

    #[must_use]
    pub fn is_dual_region(&self) -> bool {
        self.region & 0x02 != 0
    }

    /// Any non-zero bankswitch init value means the tune expects banking.
    #[must_use]
    pub fn is_bank_switched(&self) -> bool {
        self.bankswitch.iter().any(|&bank| bank != 0)
    }

    /// File offset of the program image.
    #[must_use]
    pub fn program_offset(&self) -> usize {
        HEADER_LEN
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Fixed-width text field, cut at the first NUL.
fn read_text(data: &[u8], offset: usize) -> String {
    let field = &data[offset..offset + TEXT_FIELD_LEN];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// A parsed NSF file: header plus program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsfFile {
    header: NsfHeader,
    program: Vec<u8>,
}

impl NsfFile {
    pub fn parse(data: &[u8]) -> Result<Self, NsfError> {
        let header = NsfHeader::parse(data)?;
        let program = data[header.program_offset()..].to_vec();
        debug!(
            "NSF v{} \"{}\" by \"{}\": {} songs (start {}), load ${:04X} init ${:04X} play ${:04X}, {} us/play, {} program bytes",
            header.version,
            header.title,
            header.artist,
            header.song_count,
            header.starting_song,
            header.load_address,
            header.init_address,
            header.play_address,
            header.ntsc_speed,
            program.len(),
        );
        if !header.expansion.is_empty() {
            debug!("NSF expects expansion audio {:?}, ignored", header.expansion);
        }
        Ok(Self { header, program })
    }

    /// Read the whole source and parse it.
    pub fn read_from(mut reader: impl Read) -> Result<Self, NsfError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data)
    }

    /// Read exactly `len` bytes (the length the source declared) and parse
    /// them. Running out early is a [`NsfError::ShortRead`].
    pub fn read_sized(reader: impl Read, len: usize) -> Result<Self, NsfError> {
        // A full 64 KiB image plus header; anything longer grows on demand.
        let mut data = Vec::with_capacity(len.min(HEADER_LEN + 0x1_0000));
        reader
            .take(u64::try_from(len).unwrap_or(u64::MAX))
            .read_to_end(&mut data)?;
        if data.len() < len {
            return Err(NsfError::ShortRead {
                expected: len,
                actual: data.len(),
            });
        }
        Self::parse(&data)
    }

    #[must_use]
    pub fn header(&self) -> &NsfHeader {
        &self.header
    }

    /// Raw program image, loaded at the header's load address.
    #[must_use]
    pub fn program(&self) -> &[u8] {
        &self.program
    }
}

/// Magic sniffing for format registries.
#[must_use]
pub fn is_nsf(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}
