//! The structs
//!
use std::collections::BTreeMap;
/// The name of a type as reported by a census, for example `growthz::leak::Leaker`.
pub type TypeName = String;
/// Live instance count per type at the moment of sampling.
///
/// A `BTreeMap` is used so iteration order is ascending by type name.
/// That order is what decides the position of entries with equal growth in a [GrowthReport].
pub type Census = BTreeMap<TypeName, u64>;
/// The highest count ever seen per type by a single observer.
pub type PeakTable = BTreeMap<TypeName, u64>;
/// A type whose count grew beyond the observer's recorded peak.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GrowthEntry {
    pub type_name: TypeName,
    /// Always larger than zero.
    pub delta: u64,
}
/// Growth entries, biggest growth first.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct GrowthReport {
    pub entries: Vec<GrowthEntry>,
}
