//! Column-name reconciliation.
//!
//! - [`normalize_text`] turns a raw label into a comparison key.
//! - [`AliasRegistry`] is the user-editable synonym dictionary, persisted by
//!   [`RegistryStore`].
//! - [`build_index`] derives a [`ReverseAliasIndex`] from a registry snapshot.
//! - [`resolve_columns`] / [`ColumnResolver`] map labels to standard names and
//!   keep the resulting names unique.

pub mod error;
pub mod index;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod store;

pub use error::{MapError, Result};
pub use index::{MIN_FUZZY_KEY_LEN, ReverseAliasIndex, build_index};
pub use normalize::{NormalizedKey, normalize_optional, normalize_text};
pub use registry::{AliasEntry, AliasRegistry, COMMENT_KEY_PREFIX};
pub use resolver::{
    ColumnResolver, MappingEntry, MappingReport, MatchKind, Resolution, ResolvedColumn,
    ensure_unique_columns, resolve_columns,
};
pub use store::{REGISTRY_FILENAME, RegistryLoad, RegistryOrigin, RegistryStore, export_template};
