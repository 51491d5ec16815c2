use serde::{Deserialize, Deserializer, Serialize};

/// A registered user, keyed by `email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Epoch milliseconds of the last write.
    #[serde(default, deserialize_with = "epoch_millis")]
    pub timestamp: i64,
}

/// Body of `POST /users`. A missing email is registered as `null`.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// Older documents hold the timestamp as a double.
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
    }

    Ok(match Millis::deserialize(deserializer)? {
        Millis::Int(millis) => millis,
        Millis::Float(millis) => millis as i64,
    })
}
