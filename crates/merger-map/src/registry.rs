//! The user-editable synonym dictionary: standard name -> aliases.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Built-in mapping used when no registry document is present or it is
/// malformed.
const DEFAULT_MAPPINGS: &[(&str, &[&str])] = &[
    (
        "商品条码",
        &["条形码", "条码", "国条码", "barcode", "UPC", "商品编码"],
    ),
    ("商品名称", &["名称", "品名", "产品名称", "product name"]),
    ("品牌", &["品牌名称", "brand", "Brand Name"]),
    ("产品型号", &["型号", "产品规格", "规格", "model", "sku"]),
    (
        "含税销售额",
        &["最终销售金额(销售金额+优惠券金额)", "销售金额", "金额"],
    ),
    ("数量", &["销售数量", "qty", "quantity"]),
    ("日期", &["订单日期", "date", "订单时间"]),
    ("单价", &["价格", "单位价格", "unit price"]),
    ("供应商", &["供应商名称", "supplier"]),
    ("客户", &["客户名称", "customer"]),
];

/// Prefix marking comment keys in a registry document.
pub const COMMENT_KEY_PREFIX: char = '_';

/// One standard name with its aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub standard: String,
    pub aliases: Vec<String>,
}

/// Ordered mapping of standard name to alias list.
///
/// Iteration order is insertion order; replacing the aliases of an existing
/// standard name keeps its position. Nothing derived from a registry (such as
/// a [`ReverseAliasIndex`](crate::ReverseAliasIndex)) is updated implicitly
/// when it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    entries: Vec<AliasEntry>,
}

impl AliasRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in default mapping.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (standard, aliases) in DEFAULT_MAPPINGS {
            registry.add(*standard, aliases.iter().map(|a| (*a).to_string()).collect());
        }
        registry
    }

    /// Inserts or replaces the alias list for `standard`.
    pub fn add(&mut self, standard: impl Into<String>, aliases: Vec<String>) {
        let standard = standard.into();
        match self.entries.iter_mut().find(|e| e.standard == standard) {
            Some(entry) => entry.aliases = aliases,
            None => self.entries.push(AliasEntry { standard, aliases }),
        }
    }

    /// Removes `standard`; returns whether it was present.
    pub fn remove(&mut self, standard: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.standard != standard);
        self.entries.len() != before
    }

    /// Restores the built-in default mapping in memory.
    pub fn reset_to_default(&mut self) {
        *self = Self::builtin();
    }

    pub fn get(&self, standard: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.standard == standard)
            .map(|e| e.aliases.as_slice())
    }

    pub fn contains(&self, standard: &str) -> bool {
        self.get(standard).is_some()
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn standard_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.standard.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every alias of every entry, flattened in registry order.
    pub fn all_aliases(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.aliases.iter().map(String::as_str))
            .collect()
    }

    /// Case-insensitive exact lookup of a raw label against standard names
    /// and aliases. The label is trimmed; no other normalization applies.
    /// When several entries claim the label, the last one wins, as in the
    /// reverse index. Returns the label unchanged when nothing matches.
    pub fn find_standard_name<'a>(&'a self, label: &'a str) -> &'a str {
        let wanted = label.trim().to_lowercase();
        for entry in self.entries.iter().rev() {
            if entry.standard.to_lowercase() == wanted
                || entry.aliases.iter().any(|a| a.to_lowercase() == wanted)
            {
                return &entry.standard;
            }
        }
        label
    }
}

impl Serialize for AliasRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.standard, &entry.aliases)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AliasRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RegistryVisitor)
    }
}

struct RegistryVisitor;

impl<'de> Visitor<'de> for RegistryVisitor {
    type Value = AliasRegistry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of standard name to a list of aliases")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut registry = AliasRegistry::new();
        while let Some(key) = access.next_key::<String>()? {
            if key.starts_with(COMMENT_KEY_PREFIX) {
                access.next_value::<IgnoredAny>()?;
                continue;
            }
            let aliases: Vec<String> = access.next_value()?;
            registry.add(key, aliases);
        }
        Ok(registry)
    }
}
