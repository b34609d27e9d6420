use core::fmt;
use std::sync::Arc;

/// Stable unique identifier of a symbolic variable.
///
/// Identity is the string content: two `VarId`s built from the same text denote
/// the same numeric slot once a system is assembled, no matter which block
/// declared them. Cloning is cheap (shared `Arc<str>`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(Arc<str>);

impl VarId {
    /// Create an id from explicit text (reproducible across runs).
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Generate a fresh, globally unique id (UUID v4, simple form).
    pub fn fresh() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VarId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VarId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VarId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VarId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(VarId::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_text_same_identity() {
        let a = VarId::new("bus1.vm");
        let b = VarId::from("bus1.vm".to_string());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let ids: HashSet<VarId> = (0..100).map(|_| VarId::fresh()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn display_is_raw_text() {
        assert_eq!(VarId::new("gen1.delta").to_string(), "gen1.delta");
    }
}
