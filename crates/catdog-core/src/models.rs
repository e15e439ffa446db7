//! Resource models decoded from provider responses.
//!
//! Upstream responses populate these structs sparsely, so every field beyond
//! the identifier is optional and reads as `None` when the provider omitted
//! it. Keys this crate does not know about are preserved in each model's
//! `extra` map rather than dropped, so newer response fields remain
//! reachable without a crate update.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use validator::Validate;

use crate::error::{Error, Result};
use crate::query::QueryParams;

/// Breed identifier; numeric for the dog provider, short string for cat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreedId {
    /// Numeric identifier
    Int(i64),
    /// String identifier
    Str(String),
}

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for BreedId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for BreedId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending by creation time
    #[serde(rename = "ASC")]
    Asc,
    /// Descending by creation time
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Wire representation expected by the providers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Lenient parse: anything other than a case-insensitive `ASC` or
    /// `DESC` yields the default order, `Desc`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ASC" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image file types accepted by the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeType {
    /// Animated GIF
    Gif,
    /// JPEG
    Jpg,
    /// PNG
    Png,
}

impl MimeType {
    /// Wire representation of the file type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// Parse a list of file-type strings, silently dropping any entry that
    /// is not a recognised type.
    #[must_use]
    pub fn parse_list<S: AsRef<str>>(values: &[S]) -> Vec<Self> {
        values
            .iter()
            .filter_map(|v| v.as_ref().parse().ok())
            .collect()
    }
}

impl FromStr for MimeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            _ => Err(Error::InvalidArgument(format!("unknown file type: {s}"))),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pet image as returned by the search, list, and get endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image identifier.
    pub id: String,
    /// Source URL of the image file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// MIME type reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Uploader-chosen owner identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    /// Original file name of an uploaded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Breeds depicted in the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeds: Option<Vec<Breed>>,
    /// Categories the image belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    /// Animals detected in the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals: Option<Vec<Animal>>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Image {
    /// Identifiers of the breeds attached to this image.
    #[must_use]
    pub fn breed_ids(&self) -> Vec<BreedId> {
        self.breeds
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|breed| breed.id.clone())
            .collect()
    }

    /// File name for saving this image locally, derived from the last path
    /// segment of the source URL and falling back to the image id. Query
    /// strings and fragments never leak into the name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| format!("{}.jpg", self.id))
    }
}

/// A breed as returned by the breed endpoints or attached to an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breed {
    /// Breed identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BreedId>,
    /// Breed name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Temperament description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    /// Country or region of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Typical life span, as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_span: Option<String>,
    /// Link to the breed's Wikipedia page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// An image category (cat provider only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier.
    pub id: i64,
    /// Category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// An animal detected in an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Animal identifier.
    pub id: i64,
    /// Animal name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A favourite record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favourite {
    /// Favourite identifier.
    pub id: i64,
    /// Identifier of the favourited image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Owner identifier supplied when the favourite was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    /// Account identifier assigned by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// The favourited image, when the provider expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A vote record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Vote identifier.
    pub id: i64,
    /// Identifier of the voted image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Owner identifier supplied when the vote was cast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    /// Vote value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    /// Country code recorded by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Acknowledgement payload returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Outcome message, typically `SUCCESS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Identifier of the created record, when one was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Response keys not covered by the fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Parameters for the image search endpoint.
#[derive(Debug, Default, Clone, PartialEq, Validate)]
pub struct SearchParams {
    /// Restrict results to these breeds.
    pub breed_ids: Vec<BreedId>,
    /// Restrict results to these categories.
    pub category_ids: Vec<i64>,
    /// Restrict results to these file types.
    pub mime_types: Vec<MimeType>,
    /// Only return images with breed data attached.
    pub has_breeds: Option<bool>,
    /// Maximum number of results.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    /// Page number.
    pub page: Option<u32>,
    /// Sort order.
    pub order: Option<SortOrder>,
}

impl SearchParams {
    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_list("breed_ids", &self.breed_ids);
        params.push_list("category_ids", &self.category_ids);
        params.push_list("mime_types", &self.mime_types);
        params.push_opt("has_breeds", self.has_breeds.map(u8::from));
        params.push_opt("limit", self.limit);
        params.push_opt("page", self.page);
        params.push_opt("order", self.order);
        params.into_pairs()
    }
}

/// Parameters for the authenticated image list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Validate)]
pub struct ImageListParams {
    /// Maximum number of results.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    /// Page number.
    pub page: Option<u32>,
    /// Sort order; list requests always carry one, defaulting to `DESC`.
    pub order: Option<SortOrder>,
    /// Only list images uploaded under this owner identifier.
    pub sub_id: Option<String>,
}

impl ImageListParams {
    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("limit", self.limit);
        params.push_opt("page", self.page);
        params.push("order", self.order.unwrap_or_default());
        params.push_opt("sub_id", self.sub_id.as_deref());
        params.into_pairs()
    }
}

/// Parameters for the breed list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Validate)]
pub struct BreedListParams {
    /// Maximum number of results.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    /// Page number.
    pub page: Option<u32>,
}

impl BreedListParams {
    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("limit", self.limit);
        params.push_opt("page", self.page);
        params.into_pairs()
    }
}

/// Plain limit/page parameters for simple list endpoints.
pub type PageParams = BreedListParams;

/// Parameters for the favourite and vote list endpoints.
#[derive(Debug, Default, Clone, PartialEq, Validate)]
pub struct UserListParams {
    /// Only list records created under this owner identifier.
    pub sub_id: Option<String>,
    /// Maximum number of results.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    /// Page number.
    pub page: Option<u32>,
}

impl UserListParams {
    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("sub_id", self.sub_id.as_deref());
        params.push_opt("limit", self.limit);
        params.push_opt("page", self.page);
        params.into_pairs()
    }
}

/// Request body for casting a vote.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct VoteRequest {
    /// Identifier of the image being voted on.
    #[validate(length(min = 1))]
    pub image_id: String,
    /// Vote value; the providers accept 0 (down) through 10 (up).
    #[validate(range(min = 0, max = 10))]
    pub value: i32,
    /// Optional owner identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
}

impl VoteRequest {
    /// Create a vote request for an image.
    pub fn new(image_id: impl Into<String>, value: i32) -> Self {
        Self {
            image_id: image_id.into(),
            value,
            sub_id: None,
        }
    }

    /// Attach an owner identifier.
    #[must_use]
    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }
}

/// Request body for creating a favourite.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct FavouriteRequest {
    /// Identifier of the image being favourited.
    #[validate(length(min = 1))]
    pub image_id: String,
    /// Optional owner identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
}

impl FavouriteRequest {
    /// Create a favourite request for an image.
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            sub_id: None,
        }
    }

    /// Attach an owner identifier.
    #[must_use]
    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }
}

/// Request body for attaching a breed to an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddBreedRequest {
    /// Identifier of the breed to attach.
    pub breed_id: BreedId,
}

/// Description of a local image to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Path to the image file on the local file system.
    pub file: PathBuf,
    /// Optional owner identifier stored alongside the image.
    pub sub_id: Option<String>,
    /// Breeds depicted in the image.
    pub breed_ids: Vec<BreedId>,
}

impl ImageUpload {
    /// Describe an upload of the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: path.into(),
            sub_id: None,
            breed_ids: Vec::new(),
        }
    }

    /// Attach an owner identifier.
    #[must_use]
    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    /// Declare the breeds depicted in the image.
    #[must_use]
    pub fn with_breed_ids(mut self, breed_ids: Vec<BreedId>) -> Self {
        self.breed_ids = breed_ids;
        self
    }
}
