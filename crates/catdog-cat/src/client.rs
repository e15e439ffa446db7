//! Asynchronous client for TheCatAPI.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use validator::Validate;

use catdog_core::client::{ApiClient, ApiClientBuilder, ClientConfig};
use catdog_core::models::{
    ActionResponse, AddBreedRequest, Breed, BreedId, BreedListParams, Category, Favourite,
    FavouriteRequest, Image, ImageListParams, ImageUpload, PageParams, SearchParams,
    UserListParams, Vote, VoteRequest,
};
use catdog_core::storage;
use catdog_core::{Error, Provider, Result};

const USER_AGENT: &str = concat!("catdog-cat/", env!("CARGO_PKG_VERSION"));

/// Builder for [`CatClient`].
#[derive(Debug, Clone)]
pub struct CatClientBuilder {
    inner: ApiClientBuilder,
}

impl CatClientBuilder {
    /// Create a builder; the API key is read from `CAT_API_KEY` unless one
    /// is supplied explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ApiClientBuilder::new(Provider::Cat).with_user_agent(USER_AGENT),
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
    pub fn build(self) -> Result<CatClient> {
        let inner = self.inner.build()?;
        Ok(CatClient { inner })
    }
}

impl Default for CatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous client for TheCatAPI.
#[derive(Debug, Clone)]
pub struct CatClient {
    inner: ApiClient,
}

impl CatClient {
    /// Construct a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        CatClientBuilder::new().with_api_key(api_key).build()
    }

    /// Construct a client with the key from `CAT_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        CatClientBuilder::new().build()
    }

    /// Start building a customized client.
    #[must_use]
    pub fn builder() -> CatClientBuilder {
        CatClientBuilder::new()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &url::Url {
        self.inner.base_url()
    }

    // ---- images ----

    /// Search public cat images by breed, category, and file type.
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

    /// List cat breeds.
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

    // ---- categories ----

    /// List image categories.
    pub async fn list_categories(&self, params: &PageParams) -> Result<Vec<Category>> {
        params.validate()?;
        self.inner.get_json("categories", &params.to_pairs()).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use catdog_core::models::{MimeType, SortOrder};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> CatClient {
        CatClient::builder()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn search_images_respects_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/search"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "O3btzLlsO", "url": "https://cdn2.thecatapi.com/images/O3btzLlsO.png"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let params = SearchParams {
            limit: Some(1),
            ..SearchParams::default()
        };
        let images = client.search_images(&params).await.unwrap();
        assert!(images.len() <= 1);
        assert!(!images[0].id.is_empty());
    }

    #[tokio::test]
    async fn search_images_drops_invalid_mime_types() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/search"))
            .and(query_param("mime_types", "gif"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let params = SearchParams {
            mime_types: MimeType::parse_list(&["gif", "bmp", "tiff"]),
            ..SearchParams::default()
        };
        client.search_images(&params).await.unwrap();
    }

    #[tokio::test]
    async fn search_images_rejects_oversized_limit() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let params = SearchParams {
            limit: Some(500),
            ..SearchParams::default()
        };
        let err = client.search_images(&params).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn get_image_rejects_blank_id() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let err = client.get_image("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn get_image_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_image("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn get_images_sends_desc_for_invalid_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images"))
            .and(query_param("order", "DESC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let params = ImageListParams {
            order: Some(SortOrder::parse("INVALID")),
            ..ImageListParams::default()
        };
        let images = client.get_images(&params).await.unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn get_images_requires_api_key() {
        let server = MockServer::start().await;
        let client = CatClient::builder()
            .anonymous()
            .with_base_url(server.uri())
            .build()
            .unwrap();

        let err = client
            .get_images(&ImageListParams::default())
            .await
            .unwrap_err();
        assert_eq!(err, Error::MissingApiKey);
    }

    #[tokio::test]
    async fn upload_image_rejects_missing_file() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let upload = ImageUpload::new("/nonexistent/cat.jpg");
        let err = client.upload_image(&upload).await.unwrap_err();
        assert_eq!(
            err,
            Error::InvalidImageFile(PathBuf::from("/nonexistent/cat.jpg"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn upload_image_rejects_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cat.jpg");
        std::fs::write(&target, b"image").unwrap();
        let link = dir.path().join("link.jpg");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let server = MockServer::start().await;
        let client = test_client(&server);
        let err = client
            .upload_image(&ImageUpload::new(&link))
            .await
            .unwrap_err();
        assert_eq!(err, Error::InvalidImageFile(link));
    }

    #[tokio::test]
    async fn upload_image_sends_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cat.jpg");
        std::fs::write(&file, b"image-bytes").unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/upload"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "new-image",
                "url": "https://cdn2.thecatapi.com/images/new-image.jpg",
                "sub_id": "user-1",
                "pending": 0,
                "approved": 1
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let upload = ImageUpload::new(&file)
            .with_sub_id("user-1")
            .with_breed_ids(vec![BreedId::from("beng")]);
        let image = client.upload_image(&upload).await.unwrap();
        assert_eq!(image.id, "new-image");
        assert_eq!(image.sub_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn delete_image_succeeds_on_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/images/abc"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.delete_image("abc").await.unwrap();
    }

    #[tokio::test]
    async fn get_breed_by_string_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/beng"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "beng",
                "name": "Bengal",
                "wikipedia_url": "https://en.wikipedia.org/wiki/Bengal_(cat)"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let breed = client.get_breed(&BreedId::from("beng")).await.unwrap();
        assert_eq!(breed.name.as_deref(), Some("Bengal"));
    }

    #[tokio::test]
    async fn list_categories_returns_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 5, "name": "boxes"},
                {"id": 15, "name": "clothes"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let categories = client.list_categories(&PageParams::default()).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name.as_deref(), Some("boxes"));
    }

    #[tokio::test]
    async fn add_favourite_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/favourites"))
            .and(body_json(json!({"image_id": "abc", "sub_id": "user-1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "SUCCESS", "id": 451})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ack = client
            .add_favourite(&FavouriteRequest::new("abc").with_sub_id("user-1"))
            .await
            .unwrap();
        assert_eq!(ack.id, Some(451));
    }

    #[tokio::test]
    async fn delete_favourite_returns_ack() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/favourites/451"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "SUCCESS"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ack = client.delete_favourite(451).await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("SUCCESS"));
    }

    #[tokio::test]
    async fn cast_vote_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/votes"))
            .and(body_json(json!({"image_id": "abc", "value": 1})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"message": "SUCCESS", "id": 98})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ack = client.cast_vote(&VoteRequest::new("abc", 1)).await.unwrap();
        assert_eq!(ack.id, Some(98));
    }

    #[tokio::test]
    async fn download_image_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdn/abc.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let image = Image {
            id: "abc".to_string(),
            url: Some(format!("{}/cdn/abc.png", server.uri())),
            ..Image::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let written = client.download_image(&image, dir.path()).await.unwrap();
        assert_eq!(written, dir.path().join("abc.png"));
        assert_eq!(std::fs::read(&written).unwrap(), b"png-bytes");
    }
}
