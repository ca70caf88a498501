use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::shard::{ProjectMetadata, Shard, ShardSet};

/// Position header: `<index:5>/<total:5>-` = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// First byte of the shard 0 metadata segment.
pub const META_TAG: u8 = b'M';

/// Metadata prefix: tag (1) + length (4) + ':' (1).
const META_PREFIX_SIZE: usize = 6;

/// Largest shard count a five-digit header can number.
pub const MAX_SHARDS: usize = 99_999;

/// Largest metadata segment a four-digit length can describe.
pub const MAX_METADATA_LEN: usize = 9_999;

const INDEX_DIGITS: usize = 5;
const META_LEN_DIGITS: usize = 4;

/// A shard in its rendered wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedShard {
    pub index: u32,
    pub total: u32,
    /// Header, optional metadata and body, exactly as handed to the renderer.
    pub payload: Bytes,
}

impl FramedShard {
    /// The total wire size of this shard.
    pub fn wire_size(&self) -> usize {
        self.payload.len()
    }
}

/// A shard recovered from its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnframedShard {
    pub shard: Shard,
    /// Present only on shard 0.
    pub metadata: Option<ProjectMetadata>,
}

/// Encode one shard into the wire format.
///
/// Wire format:
/// ```text
/// shard 0 only:
/// ┌─────┬──────────────┬─────┬───────────────────────────────┐
/// │ 'M' │ Length (4 d) │ ':' │ <app>/<author>/<license>/     │
/// └─────┴──────────────┴─────┴───────────────────────────────┘
/// every shard:
/// ┌───────────────┬─────┬───────────────┬─────┬──────────────┐
/// │ Index (5 d)   │ '/' │ Total (5 d)   │ '-' │ Body         │
/// └───────────────┴─────┴───────────────┴─────┴──────────────┘
/// ```
pub fn encode_shard(
    shard: &Shard,
    metadata: Option<&ProjectMetadata>,
    dst: &mut BytesMut,
) -> Result<()> {
    if shard.total as usize > MAX_SHARDS {
        return Err(FrameError::TooManyShards {
            total: shard.total as usize,
            max: MAX_SHARDS,
        });
    }
    if shard.index >= shard.total {
        return Err(FrameError::IndexOutOfRange {
            index: shard.index,
            total: shard.total,
        });
    }

    let segment = match metadata {
        Some(_) if shard.index != 0 => {
            return Err(FrameError::UnexpectedMetadata { index: shard.index })
        }
        Some(meta) => {
            meta.validate()?;
            let segment = meta.segment();
            if segment.len() > MAX_METADATA_LEN {
                return Err(FrameError::InvalidMetadata {
                    field: "segment",
                    reason: format!(
                        "{} bytes exceeds max {MAX_METADATA_LEN}",
                        segment.len()
                    ),
                });
            }
            Some(segment)
        }
        None => None,
    };

    let meta_len = segment.as_ref().map_or(0, |s| META_PREFIX_SIZE + s.len());
    dst.reserve(meta_len + HEADER_SIZE + shard.body.len());

    if let Some(segment) = &segment {
        dst.put_u8(META_TAG);
        dst.put_slice(format!("{:0width$}", segment.len(), width = META_LEN_DIGITS).as_bytes());
        dst.put_u8(b':');
        dst.put_slice(segment.as_bytes());
    }
    dst.put_slice(
        format!(
            "{:0width$}/{:0width$}-",
            shard.index,
            shard.total,
            width = INDEX_DIGITS
        )
        .as_bytes(),
    );
    dst.put_slice(shard.body.as_bytes());
    Ok(())
}

/// Frame every shard of a set; metadata goes on shard 0 only.
pub fn frame(set: &ShardSet, metadata: &ProjectMetadata) -> Result<Vec<FramedShard>> {
    let mut framed = Vec::with_capacity(set.len());
    let mut buf = BytesMut::new();

    for shard in set {
        let meta = (shard.index == 0).then_some(metadata);
        encode_shard(shard, meta, &mut buf)?;
        framed.push(FramedShard {
            index: shard.index,
            total: shard.total,
            payload: buf.split().freeze(),
        });
    }

    tracing::debug!(shards = framed.len(), "framed shard set");
    Ok(framed)
}

/// Decode one shard from its wire form.
pub fn unframe(src: &[u8]) -> Result<UnframedShard> {
    let (metadata, rest) = if src.first() == Some(&META_TAG) {
        let (meta, rest) = decode_metadata(src)?;
        (Some(meta), rest)
    } else {
        (None, src)
    };

    if rest.len() < HEADER_SIZE {
        return Err(FrameError::InvalidHeader(format!(
            "truncated header ({} bytes, need {HEADER_SIZE})",
            rest.len()
        )));
    }

    let index = parse_digits(&rest[..INDEX_DIGITS], "index")?;
    expect_byte(rest, INDEX_DIGITS, b'/')?;
    let total = parse_digits(&rest[INDEX_DIGITS + 1..2 * INDEX_DIGITS + 1], "total")?;
    expect_byte(rest, 2 * INDEX_DIGITS + 1, b'-')?;

    if index >= total {
        return Err(FrameError::IndexOutOfRange { index, total });
    }
    if metadata.is_some() && index != 0 {
        return Err(FrameError::UnexpectedMetadata { index });
    }

    let body = std::str::from_utf8(&rest[HEADER_SIZE..])?;
    Ok(UnframedShard {
        shard: Shard::new(index, total, body),
        metadata,
    })
}

/// Reject a framed shard larger than the renderer's maximum payload.
pub fn check_capacity(framed: &FramedShard, max: usize) -> Result<()> {
    if framed.wire_size() > max {
        return Err(FrameError::PayloadTooLarge {
            index: framed.index,
            size: framed.wire_size(),
            max,
        });
    }
    Ok(())
}

fn decode_metadata(src: &[u8]) -> Result<(ProjectMetadata, &[u8])> {
    if src.len() < META_PREFIX_SIZE {
        return Err(FrameError::InvalidHeader(
            "truncated metadata prefix".to_string(),
        ));
    }
    let len = parse_digits(&src[1..1 + META_LEN_DIGITS], "metadata length")? as usize;
    expect_byte(src, 1 + META_LEN_DIGITS, b':')?;

    let end = META_PREFIX_SIZE + len;
    if src.len() < end {
        return Err(FrameError::InvalidHeader(format!(
            "metadata segment truncated ({} of {len} bytes)",
            src.len() - META_PREFIX_SIZE
        )));
    }
    let segment = std::str::from_utf8(&src[META_PREFIX_SIZE..end])?;
    Ok((ProjectMetadata::parse_segment(segment)?, &src[end..]))
}

fn parse_digits(digits: &[u8], field: &str) -> Result<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidHeader(format!(
            "{field} is not a decimal number: {:?}",
            String::from_utf8_lossy(digits)
        )));
    }
    Ok(digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0')))
}

fn expect_byte(src: &[u8], pos: usize, expected: u8) -> Result<()> {
    match src.get(pos) {
        Some(found) if *found == expected => Ok(()),
        found => Err(FrameError::InvalidHeader(format!(
            "expected {:?} at offset {pos}, found {:?}",
            expected as char,
            found.map(|b| *b as char)
        ))),
    }
}
