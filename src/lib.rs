//! Turn a handful of ingredients into a generated historical recipe and a
//! matching picture, and keep the ones worth keeping.
//!
//! The pipeline asks a generative API for a structured recipe, then for an
//! image of the dish. Each call is wrapped in an exponential backoff
//! [`RetryPolicy`]; the [`RecipeSession`] state machine tracks where a run
//! stands and reports every outcome through a self-expiring status line.
//!
//! # Example
//! ```no_run
//! # use culinary_time_machine::{RecipeArchive, RecipeSession};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = RecipeSession::builder().api_key("your-api-key").build()?;
//! let mut archive = RecipeArchive::open("culinary_recipes.json");
//!
//! session.add_ingredient("flour")?;
//! session.add_ingredient("sugar")?;
//! session.generate().await?;
//! session.save(&mut archive)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
pub mod config;
pub mod error;
pub mod ingredients;
pub mod model;
pub mod notify;
pub mod providers;
pub mod retry;
pub mod session;

pub use archive::{FileStore, MemoryStore, RecipeArchive, RecipeStore};
pub use builder::SessionBuilder;
pub use config::{load_config, AppConfig};
pub use error::{AppError, GenerationError, SessionError, StorageError};
pub use ingredients::IngredientSet;
pub use model::{GeneratedImage, RecipeDraft, SavedRecipe};
pub use notify::{NotificationCenter, StatusKind, StatusMessage};
pub use providers::{FakeClient, GeminiClient, GenerationClient};
pub use retry::{RetryPolicy, Retryable};
pub use session::{ImageRequest, PipelineState, RecipeRequest, RecipeSession};
