//! Selectable pixel formats and their packing strategies.
//!
//! [`PackedFormat`] is chosen once at startup. Everything that depends on the
//! format (channel widths, texel size, how to encode and decode a texel)
//! is looked up in a static [`FormatSpec`] table instead of being branched
//! on at each call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::error::ReproError;
use crate::pack;

/// Reduced-precision formats the repro can compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackedFormat {
    /// 8-8-8-8 passthrough, the control case.
    Rgba8,
    /// 3-3-2 in one byte, no alpha.
    R3g3b2,
    /// 2-2-2-2 in one byte.
    Rgba2,
    /// 4-4-4-4 in one 16-bit word.
    Rgba4,
    /// 5-5-5-1 in one 16-bit word.
    Rgb5a1,
}

/// Static description of one packed format.
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub format: PackedFormat,
    /// Canonical lowercase name, also the serialized form.
    pub name: &'static str,
    /// Digit form of the layout, e.g. `"332"`.
    pub layout: &'static str,
    /// Bits kept per channel in r, g, b, a order. Zero means the channel
    /// is not stored.
    pub channel_bits: [u32; 4],
    /// Size of one packed texel in bytes.
    pub bytes_per_texel: usize,
    /// Packs a color into the low `bytes_per_texel` bytes of a word.
    pub encode: fn(Rgba8) -> u32,
    /// Expands a packed word back to 8 bits per channel.
    pub decode: fn(u32) -> Rgba8,
}

fn encode_rgba8(c: Rgba8) -> u32 {
    u32::from_ne_bytes(c.to_array())
}

fn decode_rgba8(v: u32) -> Rgba8 {
    Rgba8::from_array(v.to_ne_bytes())
}

static FORMAT_TABLE: [FormatSpec; 5] = [
    FormatSpec {
        format: PackedFormat::Rgba8,
        name: "rgba8",
        layout: "8888",
        channel_bits: [8, 8, 8, 8],
        bytes_per_texel: 4,
        encode: encode_rgba8,
        decode: decode_rgba8,
    },
    FormatSpec {
        format: PackedFormat::R3g3b2,
        name: "r3g3b2",
        layout: "332",
        channel_bits: [3, 3, 2, 0],
        bytes_per_texel: 1,
        encode: |c| pack::pack_r3g3b2(c) as u32,
        decode: |v| pack::unpack_r3g3b2(v as u8),
    },
    FormatSpec {
        format: PackedFormat::Rgba2,
        name: "rgba2",
        layout: "2222",
        channel_bits: [2, 2, 2, 2],
        bytes_per_texel: 1,
        encode: |c| pack::pack_rgba2222(c) as u32,
        decode: |v| pack::unpack_rgba2222(v as u8),
    },
    FormatSpec {
        format: PackedFormat::Rgba4,
        name: "rgba4",
        layout: "4444",
        channel_bits: [4, 4, 4, 4],
        bytes_per_texel: 2,
        encode: |c| pack::pack_rgba4444(c) as u32,
        decode: |v| pack::unpack_rgba4444(v as u16),
    },
    FormatSpec {
        format: PackedFormat::Rgb5a1,
        name: "rgb5a1",
        layout: "5551",
        channel_bits: [5, 5, 5, 1],
        bytes_per_texel: 2,
        encode: |c| pack::pack_rgb5a1(c) as u32,
        decode: |v| pack::unpack_rgb5a1(v as u16),
    },
];

impl PackedFormat {
    pub const ALL: [PackedFormat; 5] = [
        PackedFormat::Rgba8,
        PackedFormat::R3g3b2,
        PackedFormat::Rgba2,
        PackedFormat::Rgba4,
        PackedFormat::Rgb5a1,
    ];

    /// Looks up this format's strategy entry.
    pub fn spec(self) -> &'static FormatSpec {
        let index = match self {
            PackedFormat::Rgba8 => 0,
            PackedFormat::R3g3b2 => 1,
            PackedFormat::Rgba2 => 2,
            PackedFormat::Rgba4 => 3,
            PackedFormat::Rgb5a1 => 4,
        };
        &FORMAT_TABLE[index]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Packs one color. Only the low `bytes_per_texel` bytes are used.
    pub fn encode(self, c: Rgba8) -> u32 {
        (self.spec().encode)(c)
    }

    /// Expands one packed texel by bit replication.
    pub fn decode(self, texel: u32) -> Rgba8 {
        (self.spec().decode)(texel)
    }

    /// Whether the layout stores an alpha channel.
    pub fn has_alpha(self) -> bool {
        self.spec().channel_bits[3] > 0
    }

    /// Lists canonical names of every format.
    pub fn list_names() -> Vec<&'static str> {
        FORMAT_TABLE.iter().map(|s| s.name).collect()
    }
}

impl fmt::Display for PackedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackedFormat {
    type Err = ReproError;

    /// Accepts the canonical name or the digit layout, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FORMAT_TABLE
            .iter()
            .find(|spec| spec.name == wanted || spec.layout == wanted)
            .map(|spec| spec.format)
            .ok_or_else(|| ReproError::UnknownFormat(s.to_string()))
    }
}
