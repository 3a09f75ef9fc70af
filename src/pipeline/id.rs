//! Identity types for pipeline stages.
//!
//! A `StageId` is the stage's position in the chain, counted from the source.
//! Position 0 is the source itself; every intermediate operation takes the
//! next position and the terminal operation takes the one after the last stage.

use std::fmt;

/// Position of a stage in its pipeline chain.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StageId(pub u32);

impl StageId {
    pub const SOURCE: StageId = StageId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The id handed to the stage appended after this one.
    #[inline]
    pub fn next(self) -> StageId {
        StageId(self.0.saturating_add(1))
    }

    #[inline]
    pub fn is_source(self) -> bool {
        self == Self::SOURCE
    }
}

impl fmt::Debug for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_source() {
            write!(f, "StageId(source)")
        } else {
            write!(f, "StageId({})", self.0)
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of operation a stage performs. Used for error context and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Filter,
    Map,
    Reduce,
    GroupBy,
    Partition,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            StageKind::Filter => "filter",
            StageKind::Map => "map",
            StageKind::Reduce => "reduce",
            StageKind::GroupBy => "group_by",
            StageKind::Partition => "partition_by",
        }
    }

    /// Terminal kinds consume the pipeline; the rest are intermediate.
    pub fn is_terminal(self) -> bool {
        !matches!(self, StageKind::Filter | StageKind::Map)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_id_next() {
        let id = StageId::SOURCE;
        assert!(id.is_source());
        assert_eq!(id.next(), StageId(1));
        assert_eq!(id.next().next().index(), 2);
    }

    #[test]
    fn test_stage_id_formatting() {
        assert_eq!(format!("{:?}", StageId::SOURCE), "StageId(source)");
        assert_eq!(format!("{:?}", StageId(3)), "StageId(3)");
        assert_eq!(StageId(3).to_string(), "#3");
    }

    #[test]
    fn test_stage_kind_terminal() {
        assert!(!StageKind::Filter.is_terminal());
        assert!(!StageKind::Map.is_terminal());
        assert!(StageKind::Reduce.is_terminal());
        assert!(StageKind::GroupBy.is_terminal());
        assert_eq!(StageKind::Partition.to_string(), "partition_by");
    }
}
