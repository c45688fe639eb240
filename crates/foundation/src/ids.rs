use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of an address as issued by the address backend.
///
/// Optimistically inserted addresses carry a locally minted id prefixed with
/// [`AddressId::PENDING_PREFIX`] until the backend confirms them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AddressId(pub String);

impl AddressId {
    pub const PENDING_PREFIX: &'static str = "pending-";

    pub fn new(id: impl Into<String>) -> Self {
        AddressId(id.into())
    }

    pub fn pending(seq: u64) -> Self {
        AddressId(format!("{}{seq}", Self::PENDING_PREFIX))
    }

    pub fn is_pending(&self) -> bool {
        self.0.starts_with(Self::PENDING_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accepts both string and integer ids; some backends issue numeric keys.
impl<'de> Deserialize<'de> for AddressId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => AddressId(s),
            RawId::Int(n) => AddressId(n.to_string()),
        })
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-collection render id. Dense `0..n` and only meaningful until the next merge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderId(pub u32);

impl RenderId {
    pub fn index(&self) -> u32 {
        self.0
    }
}
