use serde::{Deserialize, Serialize};

/// A validated `[lower, upper)` tick interval with `lower < upper`.
///
/// Serialized as a two-element array to match the result artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
pub struct TickRange {
    lower: i32,
    upper: i32,
}

impl TickRange {
    pub fn new(lower: i32, upper: i32) -> Option<Self> {
        (lower < upper).then_some(Self { lower, upper })
    }

    pub fn lower(&self) -> i32 {
        self.lower
    }

    pub fn upper(&self) -> i32 {
        self.upper
    }

    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }

    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.lower && tick < self.upper
    }
}

impl TryFrom<[i32; 2]> for TickRange {
    type Error = String;

    fn try_from(value: [i32; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
            .ok_or_else(|| format!("degenerate tick range [{}, {}]", value[0], value[1]))
    }
}

impl From<TickRange> for [i32; 2] {
    fn from(range: TickRange) -> Self {
        [range.lower, range.upper]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate() {
        assert!(TickRange::new(60, 60).is_none());
        assert!(TickRange::new(120, 60).is_none());
        let range = TickRange::new(-60, 60).unwrap();
        assert_eq!(range.width(), 120);
        assert!(range.contains(0));
        assert!(!range.contains(60));
    }

    #[test]
    fn test_serializes_as_pair() {
        let range = TickRange::new(-120, 180).unwrap();
        assert_eq!(serde_json::to_string(&range).unwrap(), "[-120,180]");
        assert!(serde_json::from_str::<TickRange>("[5,5]").is_err());
    }
}
