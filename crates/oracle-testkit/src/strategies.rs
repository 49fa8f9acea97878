//! Proptest strategies for well-formed payload contents

use crate::builders::ExtraDataBuilder;
use oracle_reports::codec::ExtraDataItemType;
use proptest::collection::{btree_map, btree_set};
use proptest::prelude::*;

/// Strictly ascending `(module, operator, validator_index)` triples
pub fn sorted_exit_keys(max_len: usize) -> impl Strategy<Value = Vec<(u32, u64, u64)>> {
    btree_set((1u32..=4, 0u64..8, 0u64..10_000), 0..=max_len)
        .prop_map(|keys| keys.into_iter().collect())
}

/// One extra-data item: type, module and ascending `(operator, count)` pairs
pub type ItemSpec = (ExtraDataItemType, u32, Vec<(u64, u128)>);

fn item_type() -> impl Strategy<Value = ExtraDataItemType> {
    prop_oneof![
        Just(ExtraDataItemType::StuckValidators),
        Just(ExtraDataItemType::ExitedValidators),
    ]
}

/// Items already in sorting-key order, at most one per `(type, module)`
pub fn sorted_extra_items(max_items: usize) -> impl Strategy<Value = Vec<ItemSpec>> {
    btree_map(
        (item_type(), 1u32..=6),
        btree_map(0u64..64, 0u128..1_000, 1..=4),
        1..=max_items,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|((kind, module), counts)| (kind, module, counts.into_iter().collect()))
            .collect()
    })
}

/// Feed item specs into a builder
pub fn extra_data_from(items: &[ItemSpec], items_per_chunk: usize) -> ExtraDataBuilder {
    items
        .iter()
        .fold(
            ExtraDataBuilder::new().items_per_chunk(items_per_chunk),
            |builder, (kind, module, counts)| match kind {
                ExtraDataItemType::StuckValidators => builder.stuck(*module, counts),
                ExtraDataItemType::ExitedValidators => builder.exited(*module, counts),
            },
        )
}
