//! Channel type identifiers and the subtype relation between them.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned name of a value type carried on links.
///
/// Channel types are compared by name; the core never inspects the values
/// themselves. Build one from any string-ish value:
///
/// ```
/// use flowscheme::registry::ChannelTypeId;
///
/// let ty: ChannelTypeId = "Data".into();
/// assert_eq!(ty.as_str(), "Data");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelTypeId(String);

impl ChannelTypeId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelTypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelTypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ChannelTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of channel types and their declared subtype edges.
///
/// The registry is populated once during application setup and consulted
/// (never mutated) by the workflow graph on every link mutation. A type is
/// always compatible with itself; beyond that, compatibility follows the
/// transitive closure of [`register_subtype`](Self::register_subtype) edges.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Direct supertypes per registered type.
    supertypes: FxHashMap<ChannelTypeId, FxHashSet<ChannelTypeId>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with no declared supertypes.
    ///
    /// Registration is idempotent; types referenced by
    /// [`register_subtype`](Self::register_subtype) are registered implicitly.
    pub fn register_type(&mut self, ty: impl Into<ChannelTypeId>) {
        self.supertypes.entry(ty.into()).or_default();
    }

    /// Declare `sub` to be a subtype of `sup`.
    ///
    /// Both types are registered if they were not already known. The relation
    /// is transitive: `A <: B` and `B <: C` makes `A` acceptable wherever `C`
    /// is.
    pub fn register_subtype(
        &mut self,
        sub: impl Into<ChannelTypeId>,
        sup: impl Into<ChannelTypeId>,
    ) {
        let sup = sup.into();
        self.supertypes.entry(sup.clone()).or_default();
        self.supertypes.entry(sub.into()).or_default().insert(sup);
    }

    /// True iff `sub` equals `sup` or is a registered (transitive) subtype.
    #[must_use]
    pub fn is_subtype(&self, sub: &ChannelTypeId, sup: &ChannelTypeId) -> bool {
        if sub == sup {
            return true;
        }
        let mut seen: FxHashSet<&ChannelTypeId> = FxHashSet::default();
        let mut stack: Vec<&ChannelTypeId> = vec![sub];
        while let Some(ty) = stack.pop() {
            if !seen.insert(ty) {
                continue;
            }
            if let Some(sups) = self.supertypes.get(ty) {
                for s in sups {
                    if s == sup {
                        return true;
                    }
                    stack.push(s);
                }
            }
        }
        false
    }

    /// True iff `source` is acceptable to a sink declaring `accepted` types:
    /// it must equal or be a subtype of at least one member of the set.
    #[must_use]
    pub fn compatible(&self, source: &ChannelTypeId, accepted: &[ChannelTypeId]) -> bool {
        accepted.iter().any(|ty| self.is_subtype(source, ty))
    }
}
