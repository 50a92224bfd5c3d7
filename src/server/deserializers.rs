use serde::{Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_number_from_string;

// clients send ids and difficulties both as numbers and as "4"
pub fn deserialize_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_number_from_string(deserializer)
}

// `null` must not be confused with an empty list
pub fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "deserialize_int")] i64);

    let ids = Vec::<Id>::deserialize(deserializer)?;
    Ok(ids.into_iter().map(|id| id.0).collect())
}
