// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Tag filter groups and the validated instance tag set

use tracing::debug;

use super::{TagFilter, TagFilterRecord, TagGroupSpec, MAX_TAG_GROUPS};
use crate::errors::{SynthError, SynthResult};

/// Ordered filters built from one [`TagGroupSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilterGroup {
    filters: Vec<TagFilter>,
}

impl TagFilterGroup {
    /// Expand a spec into filters; `index` is only used for error reporting
    pub fn from_spec(index: usize, spec: &TagGroupSpec) -> SynthResult<Self> {
        let mut filters = Vec::new();

        for (key, values) in spec {
            match (key.is_empty(), values.is_empty()) {
                (true, true) => return Err(SynthError::KeylessValuelessFilter { group: index }),
                (true, false) => {
                    filters.extend(values.iter().map(|v| TagFilter::value_only(v.as_str())));
                }
                (false, true) => filters.push(TagFilter::key_only(key.as_str())),
                (false, false) => {
                    filters.extend(
                        values
                            .iter()
                            .map(|v| TagFilter::key_and_value(key.as_str(), v.as_str())),
                    );
                }
            }
        }

        Ok(Self { filters })
    }

    pub fn filters(&self) -> &[TagFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Serialize every filter, keeping declaration order
    pub fn to_records(&self) -> SynthResult<Vec<TagFilterRecord>> {
        self.filters.iter().map(TagFilter::to_record).collect()
    }
}

/// Validated, immutable set of up to [`MAX_TAG_GROUPS`] tag filter groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceTagSet {
    groups: Vec<TagFilterGroup>,
}

impl InstanceTagSet {
    /// Build a tag set with one group per spec, in the order given.
    ///
    /// Fails when more than [`MAX_TAG_GROUPS`] specs are supplied, or when
    /// any spec maps the empty key to an empty value list.
    pub fn new<I>(specs: I) -> SynthResult<Self>
    where
        I: IntoIterator<Item = TagGroupSpec>,
    {
        let specs: Vec<TagGroupSpec> = specs.into_iter().collect();

        if specs.len() > MAX_TAG_GROUPS {
            return Err(SynthError::too_many_tag_groups(specs.len()));
        }

        let groups = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| TagFilterGroup::from_spec(index + 1, spec))
            .collect::<SynthResult<Vec<_>>>()?;

        debug!(
            groups = groups.len(),
            filters = groups.iter().map(TagFilterGroup::len).sum::<usize>(),
            "built instance tag set"
        );

        Ok(Self { groups })
    }

    #[cfg(test)]
    pub(crate) fn from_groups_unchecked(groups: Vec<Vec<TagFilter>>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|filters| TagFilterGroup { filters })
                .collect(),
        }
    }

    pub fn groups(&self) -> &[TagFilterGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Serialize into one record list per group.
    ///
    /// Group order and filter order match construction order exactly.
    pub fn to_records(&self) -> SynthResult<Vec<Vec<TagFilterRecord>>> {
        self.groups.iter().map(TagFilterGroup::to_records).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_group;
    use crate::tags::FilterKind;
    use serde_json::json;

    #[test]
    fn test_key_and_value_then_key_only() {
        let set = InstanceTagSet::new([tag_group! {
            "some-key" => ["some-value"],
            "other-key" => [],
        }])
        .unwrap();

        assert_eq!(set.len(), 1);
        let records = set.to_records().unwrap();
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([[
                {"Type": "KEY_AND_VALUE", "Key": "some-key", "Value": "some-value"},
                {"Type": "KEY_ONLY", "Key": "other-key"},
            ]])
        );
    }

    #[test]
    fn test_multiple_values_and_keyless_group() {
        let set = InstanceTagSet::new([
            tag_group! { "some-key" => ["some-value", "another-value"] },
            tag_group! { "" => ["keyless-value"] },
        ])
        .unwrap();

        assert_eq!(set.len(), 2);
        let first = set.groups()[0].filters();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|f| f.kind() == Some(FilterKind::KeyAndValue)));
        assert_eq!(first[0].value(), Some("some-value"));
        assert_eq!(first[1].value(), Some("another-value"));

        let second = set.groups()[1].filters();
        assert_eq!(second, &[TagFilter::value_only("keyless-value")]);
        assert_eq!(second[0].key(), None);
    }

    #[test]
    fn test_keyless_valueless_rejected() {
        let err = InstanceTagSet::new([tag_group! { "" => [] }]).unwrap_err();
        assert!(matches!(err, SynthError::KeylessValuelessFilter { group: 1 }));
    }

    #[test]
    fn test_keyless_valueless_rejected_among_valid_entries() {
        let err = InstanceTagSet::new([
            tag_group! { "a" => ["b"] },
            tag_group! { "c" => [], "" => [], "d" => ["e"] },
        ])
        .unwrap_err();
        assert!(matches!(err, SynthError::KeylessValuelessFilter { group: 2 }));
    }

    #[test]
    fn test_four_groups_rejected() {
        let err = InstanceTagSet::new(vec![tag_group!(); 4]).unwrap_err();
        assert!(matches!(err, SynthError::TooManyTagGroups { count: 4, max: 3 }));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_zero_to_three_groups_accepted() {
        for n in 0..=MAX_TAG_GROUPS {
            let set = InstanceTagSet::new(vec![tag_group! { "k" => ["v"] }; n]).unwrap();
            assert_eq!(set.len(), n);
            assert!(set.groups().iter().all(|g| g.len() == 1));
        }
    }

    #[test]
    fn test_empty_group_has_no_filters() {
        let set = InstanceTagSet::new([tag_group!()]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.groups()[0].is_empty());
        assert_eq!(set.to_records().unwrap(), vec![Vec::new()]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set = InstanceTagSet::new([tag_group! {
            "zeta" => [],
            "alpha" => ["2", "1"],
            "" => ["x"],
        }])
        .unwrap();

        let records = set.to_records().unwrap();
        let kinds: Vec<_> = records[0].iter().map(TagFilterRecord::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FilterKind::KeyOnly,
                FilterKind::KeyAndValue,
                FilterKind::KeyAndValue,
                FilterKind::ValueOnly,
            ]
        );
        assert_eq!(
            records[0][1],
            TagFilterRecord::KeyAndValue {
                key: "alpha".into(),
                value: "2".into()
            }
        );
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let set = InstanceTagSet::new([
            tag_group! { "a" => ["1", "2"], "b" => [] },
            tag_group! { "" => ["c"] },
        ])
        .unwrap();

        assert_eq!(set.to_records().unwrap(), set.to_records().unwrap());
    }

    #[test]
    fn test_invalid_filter_fails_serialization() {
        let set = InstanceTagSet::from_groups_unchecked(vec![vec![
            TagFilter::key_only("k"),
            TagFilter::unchecked(None, None),
        ]]);
        assert!(matches!(
            set.to_records().unwrap_err(),
            SynthError::Internal { .. }
        ));
    }
}
