//! Attribute identifiers and registry lookup.
//!
//! Provides the `AttributeId` handle, an interned namespaced identifier
//! (`minecraft:generic.attack_damage`), and the `AttributeRegistry` seam
//! used to resolve the textual identifiers that scaling rules carry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Namespace used for identifiers written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Canonical id of the attack damage attribute.
pub const ATTACK_DAMAGE: &str = "minecraft:generic.attack_damage";

/// Canonical id of the attack speed attribute.
pub const ATTACK_SPEED: &str = "minecraft:generic.attack_speed";

const VANILLA_ATTRIBUTES: &[&str] = &[
    "generic.max_health",
    "generic.follow_range",
    "generic.knockback_resistance",
    "generic.movement_speed",
    "generic.flying_speed",
    "generic.attack_damage",
    "generic.attack_knockback",
    "generic.attack_speed",
    "generic.armor",
    "generic.armor_toughness",
    "generic.luck",
];

/// Interned handle for a numeric attribute kind.
///
/// Always stored in canonical `namespace:path` form, so two handles compare
/// equal exactly when they name the same attribute.
///
/// # Examples
///
/// ```rust
/// use itemscale::AttributeId;
///
/// let damage = AttributeId::parse("generic.attack_damage");
/// assert_eq!(damage.as_str(), "minecraft:generic.attack_damage");
/// assert_eq!(damage, AttributeId::attack_damage());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttributeId(Arc<str>);

impl Serialize for AttributeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AttributeId::parse(&s))
    }
}

impl AttributeId {
    /// Parse an identifier, defaulting the namespace to `minecraft`.
    pub fn parse(s: &str) -> Self {
        Self::parse_in(s, DEFAULT_NAMESPACE)
    }

    /// Parse an identifier, defaulting the namespace to `namespace`.
    ///
    /// ```rust
    /// use itemscale::AttributeId;
    ///
    /// let id = AttributeId::parse_in("mana", "mymod");
    /// assert_eq!(id.as_str(), "mymod:mana");
    /// assert_eq!(AttributeId::parse_in("other:mana", "mymod").as_str(), "other:mana");
    /// ```
    pub fn parse_in(s: &str, namespace: &str) -> Self {
        let s = s.trim();
        if s.contains(':') {
            Self(Arc::from(s))
        } else {
            Self(Arc::from(format!("{namespace}:{s}")))
        }
    }

    pub fn attack_damage() -> Self {
        Self(Arc::from(ATTACK_DAMAGE))
    }

    pub fn attack_speed() -> Self {
        Self(Arc::from(ATTACK_SPEED))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or("", |(ns, _)| ns)
    }

    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(&*self.0, |(_, path)| path)
    }
}

impl From<&str> for AttributeId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for AttributeId {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves textual attribute identifiers to handles.
///
/// Implementations must be read-only during scaling; one registry is shared
/// by every thread that scales items.
pub trait AttributeRegistry: Send + Sync {
    /// Resolve `identifier`, or `None` when the attribute is unknown.
    fn resolve(&self, identifier: &str) -> Option<AttributeId>;
}

/// A fixed set of known attributes.
///
/// # Examples
///
/// ```rust
/// use itemscale::{AttributeRegistry, AttributeTable};
///
/// let table = AttributeTable::vanilla().with_attribute("mymod:generic.mana");
/// assert!(table.resolve("generic.attack_speed").is_some());
/// assert!(table.resolve("mymod:generic.mana").is_some());
/// assert!(table.resolve("generic.mana").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct AttributeTable {
    namespace: String,
    known: HashSet<AttributeId>,
}

impl AttributeTable {
    /// An empty table resolving bare identifiers under `minecraft`.
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    /// An empty table resolving bare identifiers under `namespace`.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            known: HashSet::new(),
        }
    }

    /// The host's generic attributes.
    pub fn vanilla() -> Self {
        let mut table = Self::new();
        for attribute in VANILLA_ATTRIBUTES {
            table.insert(attribute);
        }
        table
    }

    /// A process-wide vanilla table, built on first use.
    pub fn shared_vanilla() -> &'static AttributeTable {
        static VANILLA: OnceLock<AttributeTable> = OnceLock::new();
        VANILLA.get_or_init(AttributeTable::vanilla)
    }

    /// Register an attribute, returning its canonical handle.
    pub fn insert(&mut self, identifier: &str) -> AttributeId {
        let id = AttributeId::parse_in(identifier, &self.namespace);
        self.known.insert(id.clone());
        id
    }

    pub fn with_attribute(mut self, identifier: &str) -> Self {
        self.insert(identifier);
        self
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl Default for AttributeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeRegistry for AttributeTable {
    fn resolve(&self, identifier: &str) -> Option<AttributeId> {
        let id = AttributeId::parse_in(identifier, &self.namespace);
        self.known.get(&id).cloned()
    }
}

impl<R: AttributeRegistry + ?Sized> AttributeRegistry for &R {
    fn resolve(&self, identifier: &str) -> Option<AttributeId> {
        (**self).resolve(identifier)
    }
}
