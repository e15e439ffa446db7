//! Asynchronous client for TheDogAPI.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use validator::Validate;

use catdog_core::client::{ApiClient, ApiClientBuilder, ClientConfig};
use catdog_core::models::{
    ActionResponse, AddBreedRequest, Breed, BreedId, BreedListParams, Favourite,
    FavouriteRequest, Image, ImageListParams, ImageUpload, SearchParams, UserListParams, Vote,
    VoteRequest,
};
use catdog_core::storage;
use catdog_core::{Error, Provider, Result};

const USER_AGENT: &str = concat!("catdog-dog/", env!("CARGO_PKG_VERSION"));

/// Builder for [`DogClient`].
#[derive(Debug, Clone)]
pub struct DogClientBuilder {
    inner: ApiClientBuilder,
}

impl DogClientBuilder {
    /// Create a builder; the API key is read from `DOG_API_KEY` unless one
    /// is supplied explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ApiClientBuilder::new(Provider::Dog).with_user_agent(USER_AGENT),
        }
    }

    /// Supply the API key explicitly.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.inner = self.inner.with_api_key(api_key);
        self
    }

    /// Build a keyless client; operations that need a credential fail with
    /// [`Error::MissingApiKey`].
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.inner = self.inner.anonymous();
        self
    }

    /// Override the base URL, mainly useful for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner = self.inner.with_base_url(base_url);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_config(config);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DogClient> {
        let inner = self.inner.build()?;
        Ok(DogClient { inner })
    }
}

impl Default for DogClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous client for TheDogAPI.
#[derive(Debug, Clone)]
pub struct DogClient {
    inner: ApiClient,
}

impl DogClient {
    /// Construct a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        DogClientBuilder::new().with_api_key(api_key).build()
    }

    /// Construct a client with the key from `DOG_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        DogClientBuilder::new().build()
    }

    /// Start building a customized client.
    #[must_use]
    pub fn builder() -> DogClientBuilder {
        DogClientBuilder::new()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &url::Url {
        self.inner.base_url()
    }

    // ---- images ----

    /// Search public dog images by breed and file type.
    pub async fn search_images(&self, params: &SearchParams) -> Result<Vec<Image>> {
        params.validate()?;
        self.inner.get_json("images/search", &params.to_pairs()).await
    }

    /// Fetch a single image by id.
    pub async fn get_image(&self, image_id: &str) -> Result<Image> {
        let image_id = non_blank(image_id, "image_id")?;
        self.inner
            .get_json(&format!("images/{image_id}"), &[])
            .await
    }

    /// List images uploaded with this API key.
    pub async fn get_images(&self, params: &ImageListParams) -> Result<Vec<Image>> {
        self.inner.require_api_key()?;
        params.validate()?;
        self.inner.get_json("images", &params.to_pairs()).await
    }

    /// Upload a local image.
    ///
    /// The path must point at an existing regular file; missing files,
    /// directories, and symlinks are rejected with
    /// [`Error::InvalidImageFile`] before any request is sent.
    pub async fn upload_image(&self, upload: &ImageUpload) -> Result<Image> {
        self.inner.require_api_key()?;
        let form = upload_form(upload).await?;
        self.inner.post_multipart("images/upload", form).await
    }

    /// Delete an uploaded image.
    pub async fn delete_image(&self, image_id: &str) -> Result<()> {
        self.inner.require_api_key()?;
        let image_id = non_blank(image_id, "image_id")?;
        self.inner
            .execute(Method::DELETE, &format!("images/{image_id}"), &[], |r| r)
            .await
            .map(|_| ())
    }

    // ---- breeds on images ----

    /// List the breeds attached to an image.
    pub async fn get_image_breeds(&self, image_id: &str) -> Result<Vec<Breed>> {
        let image_id = non_blank(image_id, "image_id")?;
        self.inner
            .get_json(&format!("images/{image_id}/breeds"), &[])
            .await
    }

    /// Attach a breed to an uploaded image.
    pub async fn add_image_breed(
        &self,
        image_id: &str,
        breed_id: BreedId,
    ) -> Result<ActionResponse> {
        self.inner.require_api_key()?;
        let image_id = non_blank(image_id, "image_id")?;
        let body = AddBreedRequest { breed_id };
        self.inner
            .send_json(
                Method::POST,
                &format!("images/{image_id}/breeds"),
                Some(&body),
                &[],
            )
            .await
    }

    /// Detach a breed from an uploaded image.
    pub async fn delete_image_breed(&self, image_id: &str, breed_id: &BreedId) -> Result<()> {
        self.inner.require_api_key()?;
        let image_id = non_blank(image_id, "image_id")?;
        self.inner
            .execute(
                Method::DELETE,
                &format!("images/{image_id}/breeds/{breed_id}"),
                &[],
                |r| r,
            )
            .await
            .map(|_| ())
    }

    // ---- breeds ----

    /// List dog breeds.
    pub async fn list_breeds(&self, params: &BreedListParams) -> Result<Vec<Breed>> {
        params.validate()?;
        self.inner.get_json("breeds", &params.to_pairs()).await
    }

    /// Search breeds by name fragment.
    pub async fn search_breeds(&self, q: &str) -> Result<Vec<Breed>> {
        let q = non_blank(q, "q")?;
        self.inner
            .get_json("breeds/search", &[("q", q.to_string())])
            .await
    }

    /// Fetch a single breed by id.
    pub async fn get_breed(&self, breed_id: &BreedId) -> Result<Breed> {
        self.inner.get_json(&format!("breeds/{breed_id}"), &[]).await
    }

    // ---- favourites ----

    /// List favourites created with this API key.
    pub async fn list_favourites(&self, params: &UserListParams) -> Result<Vec<Favourite>> {
        self.inner.require_api_key()?;
        params.validate()?;
        self.inner.get_json("favourites", &params.to_pairs()).await
    }

    /// Fetch a single favourite by id.
    pub async fn get_favourite(&self, favourite_id: i64) -> Result<Favourite> {
        self.inner.require_api_key()?;
        self.inner
            .get_json(&format!("favourites/{favourite_id}"), &[])
            .await
    }

    /// Favourite an image.
    pub async fn add_favourite(&self, request: &FavouriteRequest) -> Result<ActionResponse> {
        self.inner.require_api_key()?;
        request.validate()?;
        self.inner
            .send_json(Method::POST, "favourites", Some(request), &[])
            .await
    }

    /// Remove a favourite.
    pub async fn delete_favourite(&self, favourite_id: i64) -> Result<ActionResponse> {
        self.inner.require_api_key()?;
        self.inner
            .send_json::<(), ActionResponse>(
                Method::DELETE,
                &format!("favourites/{favourite_id}"),
                None,
                &[],
            )
            .await
    }

    // ---- votes ----

    /// List votes cast with this API key.
    pub async fn list_votes(&self, params: &UserListParams) -> Result<Vec<Vote>> {
        self.inner.require_api_key()?;
        params.validate()?;
        self.inner.get_json("votes", &params.to_pairs()).await
    }

    /// Fetch a single vote by id.
    pub async fn get_vote(&self, vote_id: i64) -> Result<Vote> {
        self.inner.require_api_key()?;
        self.inner.get_json(&format!("votes/{vote_id}"), &[]).await
    }

    /// Cast a vote on an image.
    pub async fn cast_vote(&self, request: &VoteRequest) -> Result<ActionResponse> {
        self.inner.require_api_key()?;
        request.validate()?;
        self.inner
            .send_json(Method::POST, "votes", Some(request), &[])
            .await
    }

    /// Remove a vote.
    pub async fn delete_vote(&self, vote_id: i64) -> Result<ActionResponse> {
        self.inner.require_api_key()?;
        self.inner
            .send_json::<(), ActionResponse>(Method::DELETE, &format!("votes/{vote_id}"), None, &[])
            .await
    }

    // ---- storage ----

    /// Download an image's source file and save it under `dir`.
    ///
    /// The file name is derived from the image's source URL.
    pub async fn download_image(&self, image: &Image, dir: &Path) -> Result<PathBuf> {
        let url = image
            .url
            .as_deref()
            .ok_or_else(|| Error::InvalidArgument("image has no source URL".to_string()))?;
        let bytes = self.inner.fetch_bytes(url).await?;
        storage::save_bytes(dir, &image.file_name(), &bytes).await
    }
}

/// Reject blank string arguments before they reach the wire.
fn non_blank<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::InvalidArgument(format!("{name} must not be blank")))
    } else {
        Ok(value)
    }
}

/// Validate the upload path and assemble the multipart payload.
async fn upload_form(upload: &ImageUpload) -> Result<Form> {
    let metadata = tokio::fs::symlink_metadata(&upload.file)
        .await
        .map_err(|_| Error::InvalidImageFile(upload.file.clone()))?;
    if metadata.is_symlink() || !metadata.is_file() {
        return Err(Error::InvalidImageFile(upload.file.clone()));
    }

    let bytes = tokio::fs::read(&upload.file).await?;
    let file_name = upload
        .file
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("upload")
        .to_string();

    let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
    if let Some(sub_id) = &upload.sub_id {
        form = form.text("sub_id", sub_id.clone());
    }
    if !upload.breed_ids.is_empty() {
        let joined = upload
            .breed_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        form = form.text("breed_ids", joined);
    }
    Ok(form)
}
