//! Scripted generation client for tests.
//!
//! Responses are queued per step and handed out in order, so a test can
//! describe "fail twice, then succeed" without a network.

use crate::error::GenerationError;
use crate::model::{GeneratedImage, RecipeDraft};
use crate::providers::GenerationClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeClient {
    recipes: Mutex<VecDeque<Result<RecipeDraft, GenerationError>>>,
    images: Mutex<VecDeque<Result<GeneratedImage, GenerationError>>>,
    recipe_calls: AtomicUsize,
    image_calls: AtomicUsize,
    last_ingredients: Mutex<Vec<String>>,
    last_recipe_name: Mutex<Option<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next recipe response
    pub fn push_recipe(self, response: Result<RecipeDraft, GenerationError>) -> Self {
        lock(&self.recipes).push_back(response);
        self
    }

    /// Queue the next image response
    pub fn push_image(self, response: Result<GeneratedImage, GenerationError>) -> Self {
        lock(&self.images).push_back(response);
        self
    }

    pub fn recipe_calls(&self) -> usize {
        self.recipe_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn last_ingredients(&self) -> Vec<String> {
        lock(&self.last_ingredients).clone()
    }

    pub fn last_recipe_name(&self) -> Option<String> {
        lock(&self.last_recipe_name).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn exhausted() -> GenerationError {
    GenerationError::transport(None, "FakeClient: no response queued")
}

#[async_trait]
impl GenerationClient for FakeClient {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn fetch_recipe(&self, ingredients: &[String]) -> Result<RecipeDraft, GenerationError> {
        self.recipe_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_ingredients) = ingredients.to_vec();
        lock(&self.recipes).pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn fetch_image(&self, recipe_name: &str) -> Result<GeneratedImage, GenerationError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_recipe_name) = Some(recipe_name.to_string());
        lock(&self.images).pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}
