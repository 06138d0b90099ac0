// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Instance tag sets
//!
//! A tag set selects deployment targets by their tags. It holds up to
//! [`MAX_TAG_GROUPS`] groups of filters; each filter matches on a key, a value,
//! or both. Tag sets are validated when built and serialized into the
//! `Type`-discriminated records the deployment group document expects.

mod filter;
mod set;

pub use filter::{FilterKind, TagFilter, TagFilterRecord};
pub use set::{InstanceTagSet, TagFilterGroup};

/// Maximum number of tag groups in one instance tag set
pub const MAX_TAG_GROUPS: usize = 3;

/// One tag group as written by the user: tag key to accepted values.
///
/// The empty key stands for "any key". Insertion order is kept so the
/// serialized filters come out in the order they were declared.
pub type TagGroupSpec = indexmap::IndexMap<String, Vec<String>>;

/// Build a [`TagGroupSpec`] from `key => [values]` pairs.
///
/// ```
/// use deploysynth::tag_group;
///
/// let group = tag_group! {
///     "some-key" => ["some-value"],
///     "other-key" => [],
/// };
/// assert_eq!(group.len(), 2);
/// ```
#[macro_export]
macro_rules! tag_group {
    () => {
        $crate::tags::TagGroupSpec::new()
    };
    ($($key:expr => [$($value:expr),* $(,)?]),+ $(,)?) => {{
        let mut group = $crate::tags::TagGroupSpec::new();
        $(
            group.insert(
                ::std::string::String::from($key),
                ::std::vec![$(::std::string::String::from($value)),*],
            );
        )+
        group
    }};
}
