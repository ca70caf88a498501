use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// One fixed-capacity slice of a compressed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    /// Zero-based position in the set.
    pub index: u32,
    /// Number of shards in the set.
    pub total: u32,
    /// The slice of the stream.
    pub body: String,
}

impl Shard {
    pub fn new(index: u32, total: u32, body: impl Into<String>) -> Self {
        Self {
            index,
            total,
            body: body.into(),
        }
    }
}

/// Project metadata carried by shard 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub app_name: String,
    pub author: String,
    pub license: String,
}

impl ProjectMetadata {
    pub fn new(
        app_name: impl Into<String>,
        author: impl Into<String>,
        license: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            author: author.into(),
            license: license.into(),
        }
    }

    /// Check that the triple can be split back apart.
    ///
    /// `app_name` and `author` must not contain `/`. The license is the last
    /// field, so it may.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("app_name", &self.app_name), ("author", &self.author)] {
            if value.contains('/') {
                return Err(FrameError::InvalidMetadata {
                    field,
                    reason: format!("{value:?} must not contain '/'"),
                });
            }
        }
        Ok(())
    }

    /// The `<app_name>/<author>/<license>/` segment.
    pub fn segment(&self) -> String {
        format!("{}/{}/{}/", self.app_name, self.author, self.license)
    }

    /// Parse a segment produced by [`ProjectMetadata::segment`].
    pub fn parse_segment(segment: &str) -> Result<Self> {
        let inner = segment.strip_suffix('/').ok_or_else(|| {
            FrameError::InvalidHeader("metadata segment must end with '/'".to_string())
        })?;
        let mut parts = inner.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(app_name), Some(author), Some(license)) => {
                Ok(Self::new(app_name, author, license))
            }
            _ => Err(FrameError::InvalidHeader(format!(
                "metadata segment is not an app/author/license triple: {segment:?}"
            ))),
        }
    }
}

/// Shards ordered by index, covering a whole stream with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardSet {
    shards: Vec<Shard>,
}

impl ShardSet {
    /// Wrap shards already known to be complete and ordered.
    pub(crate) fn from_ordered(shards: Vec<Shard>) -> Self {
        Self { shards }
    }

    /// Validate and order shards discovered in any order.
    ///
    /// All shards must agree on `total`, every index must be below it, no
    /// index may repeat, and every index in `[0, total)` must be present.
    pub fn from_unordered(mut shards: Vec<Shard>) -> Result<Self> {
        let total = match shards.first() {
            Some(first) => first.total,
            None => {
                return Err(FrameError::MissingShards {
                    total: 0,
                    missing: Vec::new(),
                })
            }
        };

        if let Some(bad) = shards.iter().find(|s| s.total != total) {
            return Err(FrameError::InconsistentTotal {
                index: bad.index,
                expected: total,
                found: bad.total,
            });
        }
        if let Some(bad) = shards.iter().find(|s| s.index >= total) {
            return Err(FrameError::IndexOutOfRange {
                index: bad.index,
                total,
            });
        }

        shards.sort_by_key(|s| s.index);

        let mut duplicates: Vec<u32> = shards
            .windows(2)
            .filter(|pair| pair[0].index == pair[1].index)
            .map(|pair| pair[0].index)
            .collect();
        duplicates.dedup();
        if !duplicates.is_empty() {
            return Err(FrameError::DuplicateShards {
                indices: duplicates,
            });
        }

        if shards.len() != total as usize {
            let mut seen = vec![false; total as usize];
            for shard in &shards {
                seen[shard.index as usize] = true;
            }
            let missing = (0..total).filter(|i| !seen[*i as usize]).collect();
            return Err(FrameError::MissingShards { total, missing });
        }

        Ok(Self { shards })
    }

    /// Number of shards in the set.
    pub fn total(&self) -> u32 {
        self.shards.len() as u32
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Shard> {
        self.shards.get(index as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shard> {
        self.shards.iter()
    }

    /// Concatenate bodies in index order.
    pub fn concat(&self) -> String {
        let len = self.shards.iter().map(|s| s.body.len()).sum();
        let mut out = String::with_capacity(len);
        for shard in &self.shards {
            out.push_str(&shard.body);
        }
        out
    }

    pub fn into_shards(self) -> Vec<Shard> {
        self.shards
    }
}

impl<'a> IntoIterator for &'a ShardSet {
    type Item = &'a Shard;
    type IntoIter = std::slice::Iter<'a, Shard>;

    fn into_iter(self) -> Self::IntoIter {
        self.shards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(indices: &[u32], total: u32) -> Vec<Shard> {
        indices
            .iter()
            .map(|i| Shard::new(*i, total, format!("<{i}>")))
            .collect()
    }

    #[test]
    fn unordered_shards_are_sorted() {
        let set = ShardSet::from_unordered(set_of(&[2, 0, 1], 3)).unwrap();
        assert_eq!(set.concat(), "<0><1><2>");
        assert_eq!(set.total(), 3);
        assert_eq!(set.get(1).map(|s| s.body.as_str()), Some("<1>"));
    }

    #[test]
    fn missing_index_is_named() {
        let err = ShardSet::from_unordered(set_of(&[0, 2, 4], 5)).unwrap_err();
        match err {
            FrameError::MissingShards { total, missing } => {
                assert_eq!(total, 5);
                assert_eq!(missing, vec![1, 3]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_index_is_named() {
        let err = ShardSet::from_unordered(set_of(&[0, 1, 1, 1, 2], 3)).unwrap_err();
        match err {
            FrameError::DuplicateShards { indices } => assert_eq!(indices, vec![1]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn inconsistent_total_is_rejected() {
        let mut shards = set_of(&[0, 1], 2);
        shards.push(Shard::new(2, 3, "x"));
        let err = ShardSet::from_unordered(shards).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InconsistentTotal {
                index: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn index_beyond_total_is_rejected() {
        let err = ShardSet::from_unordered(set_of(&[0, 7], 2)).unwrap_err();
        assert!(matches!(
            err,
            FrameError::IndexOutOfRange { index: 7, total: 2 }
        ));
    }

    #[test]
    fn empty_input_is_missing_everything() {
        let err = ShardSet::from_unordered(Vec::new()).unwrap_err();
        assert!(matches!(err, FrameError::MissingShards { total: 0, .. }));
    }

    #[test]
    fn metadata_segment_roundtrip() {
        let meta = ProjectMetadata::new("site", "ana", "CC-BY/4.0");
        assert_eq!(meta.segment(), "site/ana/CC-BY/4.0/");
        assert_eq!(ProjectMetadata::parse_segment(&meta.segment()).unwrap(), meta);
        meta.validate().unwrap();
    }

    #[test]
    fn metadata_rejects_slash_in_leading_fields() {
        let err = ProjectMetadata::new("a/b", "ana", "MIT")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidMetadata {
                field: "app_name",
                ..
            }
        ));
        assert!(ProjectMetadata::new("a", "b/c", "MIT").validate().is_err());
    }

    #[test]
    fn metadata_segment_requires_triple() {
        assert!(ProjectMetadata::parse_segment("only/two/").is_err());
        assert!(ProjectMetadata::parse_segment("no/trailing/slash").is_err());
        assert_eq!(
            ProjectMetadata::parse_segment("///").unwrap(),
            ProjectMetadata::default()
        );
    }
}
