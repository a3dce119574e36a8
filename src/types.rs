//! Ethereum RPC types.

use serde::{
    de::{self, Deserializer},
    ser::Serializer,
    Deserialize, Serialize,
};
use std::{
    fmt::{self, Display, Formatter},
    num::IntErrorKind,
    str::FromStr,
};
use thiserror::Error;

pub use ethprim::Digest;

/// Empty JSON RPC parameters.
pub struct Empty;

impl Serialize for Empty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [(); 0].serialize(serializer)
    }
}

/// A block height.
///
/// Block numbers are encoded as `0x` prefixed hexadecimal quantities on the
/// wire. Values that do not fit in 64 bits are rejected when decoding.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    /// Returns the block number as a native integer.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for BlockNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl From<BlockNumber> for u64 {
    fn from(number: BlockNumber) -> Self {
        number.0
    }
}

impl Display for BlockNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for BlockNumber {
    type Err = ParseBlockNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .ok_or(ParseBlockNumberError::MissingPrefix)?;
        // `from_str_radix` accepts a leading `+`, which is not a valid
        // quantity encoding.
        if hex.starts_with('+') {
            return Err(ParseBlockNumberError::InvalidDigit);
        }
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|err| match err.kind() {
                IntErrorKind::Empty => ParseBlockNumberError::Empty,
                IntErrorKind::PosOverflow => ParseBlockNumberError::Overflow,
                _ => ParseBlockNumberError::InvalidDigit,
            })
    }
}

impl Serialize for BlockNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format!("{:#x}", self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = std::borrow::Cow::<str>::deserialize(deserializer)?;
        hex.parse().map_err(de::Error::custom)
    }
}

/// An error parsing a hexadecimal block number.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ParseBlockNumberError {
    #[error("block number missing '0x' prefix")]
    MissingPrefix,
    #[error("block number has no digits")]
    Empty,
    #[error("invalid hex digit in block number")]
    InvalidDigit,
    #[error("block number does not fit in 64 bits")]
    Overflow,
}

/// Block number or tag.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(untagged)]
pub enum BlockSpec {
    /// Block by number.
    Number(BlockNumber),
    /// Block by tag.
    Tag(BlockTag),
}

impl Default for BlockSpec {
    fn default() -> Self {
        Self::Tag(Default::default())
    }
}

impl From<BlockNumber> for BlockSpec {
    fn from(number: BlockNumber) -> Self {
        Self::Number(number)
    }
}

impl From<u64> for BlockSpec {
    fn from(number: u64) -> Self {
        BlockNumber(number).into()
    }
}

impl From<BlockTag> for BlockSpec {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

/// Block tag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// The lowest numbered block the client has available.
    Earliest,
    /// The most recent crypto-economically secure block, cannot be re-orged
    /// outside of manual intervention driven by community coordination.
    Finalized,
    /// The most recent block that is safe from re-orgs under honest majority
    /// and certain synchronicity assumptions.
    Safe,
    /// The most recent block in the canonical chain observed by the client,
    /// this block may be re-orged out of the canonical chain even under
    /// healthy/normal conditions.
    #[default]
    Latest,
    /// A sample next block built by the client on top of [`BlockTag::Latest`]
    /// and containing the set of transactions usually taken from local mempool.
    Pending,
}

/// Whether block transactions should be hydrated.
#[derive(Clone, Copy, Debug, Default)]
pub enum Hydrated {
    /// Only fetch transaction hashes for blocks.
    #[default]
    No,
    /// Fetch full transaction data for blocks.
    Yes,
}

impl Hydrated {
    fn as_bool(&self) -> bool {
        match self {
            Self::No => false,
            Self::Yes => true,
        }
    }
}

impl Serialize for Hydrated {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_bool().serialize(serializer)
    }
}

/// The identifying header fields of an Ethereum block.
///
/// Only the fields needed to place a block in the chain are decoded; all
/// other block fields in the RPC response are ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    /// The block height.
    pub number: BlockNumber,
    /// The block hash, `None` for pending blocks.
    pub hash: Option<Digest>,
    /// The parent block hash.
    pub parent_hash: Digest,
}

impl Display for BlockSummary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "number      | {}", self.number)?;
        match &self.hash {
            Some(hash) => writeln!(f, "hash        | {hash}")?,
            None => writeln!(f, "hash        | <pending>")?,
        }
        write!(f, "parent_hash | {}", self.parent_hash)
    }
}
