//! Application orchestration for the two-step branding edit.

use crate::ai::{ImageEditService, OpenAiImageEditClient};
use crate::image::{ImagePreparer, PreparedImage};
use crate::models::{Config, UploadRequest};
use crate::uploads::UploadStore;
use crate::{prompts, Error, Result};
use tracing::{info, warn};
use uuid::Uuid;

/// Runs background removal followed by the branding composite.
pub struct App {
    editor: Box<dyn ImageEditService>,
    preparer: ImagePreparer,
    uploads: UploadStore,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub editor: Box<dyn ImageEditService>,
    pub preparer: ImagePreparer,
    pub uploads: UploadStore,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            editor: services.editor,
            preparer: services.preparer,
            uploads: services.uploads,
        }
    }

    /// Construct an app backed by the OpenAI edit API.
    pub fn new(config: &Config) -> Result<Self> {
        let uploads = UploadStore::new(&config.upload_dir)?;
        info!("Persisting uploads under {}", uploads.dir().display());

        info!(
            "Image edit provider: OpenAI (model: {}, size: {})",
            config.edit_model, config.edit_size
        );
        let editor = OpenAiImageEditClient::new(
            config.openai_api_key.clone(),
            config.edit_model.clone(),
            config.edit_size.clone(),
            config.request_timeout,
        )
        .with_base_url(config.openai_base_url.clone());

        Ok(Self::with_services(AppServices {
            editor: Box::new(editor),
            preparer: ImagePreparer::new(config.max_image_side),
            uploads,
        }))
    }

    /// Run both edits for one upload and return the final image URL.
    ///
    /// Any failure of the first edit (or of downloading its result) aborts
    /// before the branding edit is attempted.
    pub async fn process(&self, request: UploadRequest) -> Result<String> {
        let request_id = Uuid::new_v4();
        info!(
            %request_id,
            bytes = request.image.len(),
            file_name = ?request.file_name,
            brand_background = %request.brand_background,
            brand_color = %request.brand_color,
            "Processing upload"
        );

        let upload = self
            .uploads
            .persist(request.file_name.as_deref(), &request.image)
            .await?;
        info!(%request_id, path = %upload.path().display(), "Saved upload");

        let original = self.preparer.prepare(&request.image).await?;

        let without_background = self
            .remove_background(&original)
            .await
            .map_err(|e| {
                warn!(%request_id, "Background removal failed: {}", e);
                Error::BackgroundRemoval(e.to_string())
            })?;
        info!(%request_id, "Background removed");

        let branded_url = self
            .apply_branding(&without_background, &request.brand_background, &request.brand_color)
            .await
            .map_err(|e| {
                warn!(%request_id, "Branding application failed: {}", e);
                Error::BrandingApplication(e.to_string())
            })?;
        info!(%request_id, "Branding applied");

        Ok(branded_url)
    }

    /// First edit: isolate the subject, then pull the result back down so it
    /// can feed the second edit.
    async fn remove_background(&self, original: &PreparedImage) -> Result<Vec<u8>> {
        let edited = self
            .editor
            .edit_image(original, &prompts::background_removal())
            .await?;
        self.editor.fetch_image(&edited.url).await
    }

    async fn apply_branding(
        &self,
        image: &[u8],
        brand_background: &str,
        brand_color: &str,
    ) -> Result<String> {
        let prepared = self.preparer.prepare(image).await?;
        let prompt = prompts::branding(brand_background, brand_color);
        let edited = self.editor.edit_image(&prepared, &prompt).await?;
        Ok(edited.url)
    }
}
