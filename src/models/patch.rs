//! Partial-update fields that tell `null` apart from a missing key
//!
//! Use with `#[serde(default, deserialize_with = "patch::nullable")]` on an
//! `Option<Option<T>>`: a missing key stays `None`, `null` becomes
//! `Some(None)` and clears the column.

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
