//! AS path segments and the collapsed path view used by filters.
use crate::models::Asn;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// A single AS path segment: an ordered sequence or an unordered set.
///
/// Set members keep their wire order; collapsing appends them as-is.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub enum AsPathSegment {
    AsSequence(Vec<Asn>),
    AsSet(Vec<Asn>),
}

impl AsPathSegment {
    pub fn sequence<I: IntoIterator<Item = u32>>(asns: I) -> Self {
        AsPathSegment::AsSequence(asns.into_iter().map(Asn::new_32bit).collect())
    }

    pub fn set<I: IntoIterator<Item = u32>>(asns: I) -> Self {
        AsPathSegment::AsSet(asns.into_iter().map(Asn::new_32bit).collect())
    }

    pub fn asns(&self) -> &[Asn] {
        match self {
            AsPathSegment::AsSequence(asns) | AsPathSegment::AsSet(asns) => asns,
        }
    }
}

/// AS path: an ordered list of segments accumulated from the AS_PATH and
/// AS4_PATH attributes of a single update.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

impl AsPath {
    pub fn new() -> AsPath {
        AsPath::default()
    }

    pub fn from_segments(segments: Vec<AsPathSegment>) -> AsPath {
        AsPath { segments }
    }

    pub fn append_segment(&mut self, segment: AsPathSegment) {
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Collapse the path into a flat list of ASNs: for each segment, append
    /// its members in wire order. By convention the last element is the
    /// origin AS and the first is the collector-adjacent hop.
    pub fn collapsed(&self) -> Vec<u32> {
        self.segments
            .iter()
            .flat_map(|segment| segment.asns().iter().map(|asn| asn.asn))
            .collect()
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match segment {
                AsPathSegment::AsSequence(asns) => {
                    write!(f, "{}", asns.iter().join(" "))?;
                }
                AsPathSegment::AsSet(asns) => {
                    write!(f, "{{{}}}", asns.iter().join(","))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_sequence() {
        let path = AsPath::from_segments(vec![AsPathSegment::sequence([1, 2, 3])]);
        assert_eq!(path.collapsed(), vec![1, 2, 3]);
    }

    #[test]
    fn test_collapse_mixed_segments() {
        let path = AsPath::from_segments(vec![
            AsPathSegment::sequence([1, 2]),
            AsPathSegment::set([3, 4]),
        ]);
        assert_eq!(path.collapsed(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_collapse_empty() {
        assert!(AsPath::new().collapsed().is_empty());
    }

    #[test]
    fn test_display() {
        let path = AsPath::from_segments(vec![
            AsPathSegment::sequence([701, 7018]),
            AsPathSegment::set([64512, 64513]),
        ]);
        assert_eq!(path.to_string(), "701 7018 {64512,64513}");
    }
}
