use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Opaque product identifier
///
/// The catalog uses string ids while the similarity service may answer with
/// numeric ones, so both JSON shapes deserialize into the same key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawProductId", into = "String")]
pub struct ProductId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(u64),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Text(id) => ProductId(id),
            RawProductId::Number(id) => ProductId(id.to_string()),
        }
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sellable product, either from the catalog or returned by the similarity service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: Vec::new(),
            size: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image.push(image.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// First image reference, if the product has any
    pub fn primary_image(&self) -> Option<&str> {
        self.image.first().map(String::as_str)
    }

    /// Path of the product detail page
    pub fn detail_path(&self) -> String {
        format!("/product/{}", self.id)
    }

    /// Checks the data-model constraints that serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!(
                "product {} has invalid price {}",
                self.id, self.price
            ));
        }
        Ok(())
    }
}

/// Accepts either a single image reference or a list of them
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Missing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(image) if image.is_empty() => Vec::new(),
        OneOrMany::One(image) => vec![image],
        OneOrMany::Many(images) => images,
        OneOrMany::Missing(()) => Vec::new(),
    })
}
