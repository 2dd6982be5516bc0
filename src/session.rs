//! One user's generation session: the ingredient list, the current pipeline
//! phase, and the status line that reports every transition.
//!
//! A run moves through two stages, recipe then image. Each stage is started
//! and completed through explicit methods so a caller can drive them one at
//! a time; [`RecipeSession::generate`] simply chains both.

use crate::archive::RecipeArchive;
use crate::builder::SessionBuilder;
use crate::error::{GenerationError, SessionError};
use crate::ingredients::IngredientSet;
use crate::model::{GeneratedImage, RecipeDraft, SavedRecipe};
use crate::notify::{NotificationCenter, StatusKind, StatusMessage};
use crate::providers::GenerationClient;
use crate::retry::RetryPolicy;
use log::{debug, error, info};
use std::sync::Arc;

/// Where the session currently stands. Exactly one phase holds at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    FetchingRecipe,
    /// The recipe is known and can be shown while its picture is requested
    FetchingImage { draft: RecipeDraft },
    /// `image` is `None` when the image step failed; the recipe still stands
    Ready {
        draft: RecipeDraft,
        image: Option<GeneratedImage>,
    },
    Failed { reason: String },
}

impl PipelineState {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::FetchingRecipe | PipelineState::FetchingImage { .. }
        )
    }

    /// The recipe on display, if any
    pub fn draft(&self) -> Option<&RecipeDraft> {
        match self {
            PipelineState::FetchingImage { draft } | PipelineState::Ready { draft, .. } => {
                Some(draft)
            }
            _ => None,
        }
    }
}

/// Work order for the recipe stage of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRequest {
    pub generation: u64,
    pub ingredients: Vec<String>,
}

/// Work order for the image stage of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub generation: u64,
    pub recipe_name: String,
}

pub struct RecipeSession {
    client: Arc<dyn GenerationClient>,
    retry: RetryPolicy,
    ingredients: IngredientSet,
    state: PipelineState,
    notifications: NotificationCenter,
    /// Bumped by every run and every selection; completions carrying an
    /// older number are dropped
    generation: u64,
}

impl RecipeSession {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            ingredients: IngredientSet::new(),
            state: PipelineState::Idle,
            notifications: NotificationCenter::default(),
            generation: 0,
        }
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationCenter) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn ingredients(&self) -> &IngredientSet {
        &self.ingredients
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// The status message currently visible, if it has not expired
    pub fn status(&self) -> Option<&StatusMessage> {
        self.notifications.current()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn add_ingredient(&mut self, text: &str) -> Result<(), SessionError> {
        self.ingredients.add(text).inspect_err(|_| {
            self.notifications
                .show("Ingredient already added!", StatusKind::Error);
        })
    }

    pub fn remove_ingredient(&mut self, value: &str) {
        self.ingredients.remove(value);
    }

    /// Run both stages to completion.
    ///
    /// Only precondition failures are returned as errors; generation
    /// failures end up in [`PipelineState::Failed`] (recipe) or as a
    /// `Ready` state without an image.
    pub async fn generate(&mut self) -> Result<(), SessionError> {
        let request = self.begin_generation()?;

        let handle = Arc::clone(&self.client);
        let client: &dyn GenerationClient = handle.as_ref();
        let retry = self.retry;

        let ingredients = request.ingredients.as_slice();
        let recipe = retry
            .invoke("recipe request", move || client.fetch_recipe(ingredients))
            .await;

        let Some(image_request) = self.complete_recipe(&request, recipe) else {
            return Ok(());
        };

        let recipe_name = image_request.recipe_name.as_str();
        let image = retry
            .invoke("image request", move || client.fetch_image(recipe_name))
            .await;
        self.complete_image(&image_request, image);

        Ok(())
    }

    /// Validate input and enter `FetchingRecipe`.
    ///
    /// Refused while a run is already in flight; the caller's request is
    /// dropped rather than queued.
    pub fn begin_generation(&mut self) -> Result<RecipeRequest, SessionError> {
        if self.ingredients.is_empty() {
            self.notifications.show(
                SessionError::EmptyIngredients.to_string(),
                StatusKind::Error,
            );
            return Err(SessionError::EmptyIngredients);
        }
        if self.state.is_busy() {
            self.notifications
                .show("A recipe is already being generated.", StatusKind::Info);
            return Err(SessionError::Busy);
        }

        self.generation += 1;
        self.notifications.dismiss();
        self.state = PipelineState::FetchingRecipe;
        info!(
            "Generation {} started with {} ingredients",
            self.generation,
            self.ingredients.len()
        );

        Ok(RecipeRequest {
            generation: self.generation,
            ingredients: self.ingredients.as_slice().to_vec(),
        })
    }

    /// Apply the outcome of the recipe stage. Returns the image work order
    /// when the run should continue.
    pub fn complete_recipe(
        &mut self,
        request: &RecipeRequest,
        result: Result<RecipeDraft, GenerationError>,
    ) -> Option<ImageRequest> {
        if !self.is_current(request.generation, |s| {
            matches!(s, PipelineState::FetchingRecipe)
        }) {
            return None;
        }

        match result {
            Ok(draft) => {
                info!("Recipe generated: {} ({})", draft.recipe_name, draft.era);
                self.notifications.show(
                    "Recipe generated! Now creating an image...",
                    StatusKind::Success,
                );
                let image_request = ImageRequest {
                    generation: request.generation,
                    recipe_name: draft.recipe_name.clone(),
                };
                self.state = PipelineState::FetchingImage { draft };
                Some(image_request)
            }
            Err(e) => {
                error!("Failed to generate recipe: {}", e);
                let text = match e {
                    GenerationError::Decode(_) => "Could not generate a recipe. Please try again.",
                    _ => "Failed to connect to the server. Please try again.",
                };
                self.notifications.show(text, StatusKind::Error);
                self.state = PipelineState::Failed {
                    reason: e.to_string(),
                };
                None
            }
        }
    }

    /// Apply the outcome of the image stage. The session ends `Ready`
    /// either way; a failed image only leaves the picture empty.
    pub fn complete_image(
        &mut self,
        request: &ImageRequest,
        result: Result<GeneratedImage, GenerationError>,
    ) {
        if !self.is_current(request.generation, |s| {
            matches!(s, PipelineState::FetchingImage { .. })
        }) {
            return;
        }
        let PipelineState::FetchingImage { draft } = std::mem::take(&mut self.state) else {
            return;
        };

        let image = match result {
            Ok(image) => {
                self.notifications.show("Image generated!", StatusKind::Success);
                Some(image)
            }
            Err(e) => {
                error!("Failed to generate image for {}: {}", draft.recipe_name, e);
                let text = match e {
                    GenerationError::Decode(_) => {
                        "Could not generate an image. Check console for details."
                    }
                    _ => "Failed to generate image.",
                };
                self.notifications.show(text, StatusKind::Error);
                None
            }
        };
        self.state = PipelineState::Ready { draft, image };
    }

    /// Keep the recipe on display in `archive`
    pub fn save(&mut self, archive: &mut RecipeArchive) -> Result<SavedRecipe, SessionError> {
        let PipelineState::Ready { draft, image } = &self.state else {
            self.notifications.show("Nothing to save!", StatusKind::Error);
            return Err(SessionError::NothingToSave);
        };

        let saved = archive.save(draft.clone(), image.clone());
        info!("Saved recipe {} as {}", saved.draft.recipe_name, saved.id);
        self.notifications.show("Recipe saved!", StatusKind::Success);
        Ok(saved)
    }

    /// Show a saved recipe without calling the generator. Any run still in
    /// flight is superseded and its result will be ignored.
    pub fn select(&mut self, archive: &RecipeArchive, id: i64) -> Result<(), SessionError> {
        let Some(saved) = archive.select(id) else {
            self.notifications.show("Recipe not found!", StatusKind::Error);
            return Err(SessionError::UnknownRecipe(id));
        };

        self.generation += 1;
        self.state = PipelineState::Ready {
            draft: saved.draft.clone(),
            image: saved.image.clone(),
        };
        self.notifications.show("Recipe loaded!", StatusKind::Success);
        Ok(())
    }

    fn is_current(&self, generation: u64, expected: impl Fn(&PipelineState) -> bool) -> bool {
        if generation != self.generation || !expected(&self.state) {
            debug!(
                "Discarding result of generation {} (current is {})",
                generation, self.generation
            );
            return false;
        }
        true
    }
}
