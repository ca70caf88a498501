use crate::codec::MAX_SHARDS;
use crate::error::{FrameError, Result};
use crate::shard::{Shard, ShardSet};

/// Split `stream` into shards of at most `capacity` characters.
///
/// `total = ceil(chars / capacity)`. Only the last shard may be shorter than
/// `capacity`, and no shard is ever empty. An empty stream yields an empty
/// set.
pub fn split(stream: &str, capacity: usize) -> Result<ShardSet> {
    if capacity == 0 {
        return Err(FrameError::InvalidCapacity);
    }

    let mut bodies = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;
    for (offset, _) in stream.char_indices() {
        if count == capacity {
            bodies.push(&stream[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        bodies.push(&stream[start..]);
    }

    if bodies.len() > MAX_SHARDS {
        return Err(FrameError::TooManyShards {
            total: bodies.len(),
            max: MAX_SHARDS,
        });
    }

    let total = bodies.len() as u32;
    let shards = bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| Shard::new(index as u32, total, body))
        .collect();

    tracing::debug!(
        stream_len = stream.len(),
        capacity,
        total,
        "split stream into shards"
    );
    Ok(ShardSet::from_ordered(shards))
}

/// Reassemble a stream from shards discovered in any order.
///
/// See [`ShardSet::from_unordered`] for the completeness rules.
pub fn join(shards: Vec<Shard>) -> Result<String> {
    Ok(ShardSet::from_unordered(shards)?.concat())
}
