pub mod product;
pub mod transaction;
pub mod user;

pub use product::*;
pub use transaction::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` as the type's default. Nullable columns come back
/// as `null` rather than being omitted.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
