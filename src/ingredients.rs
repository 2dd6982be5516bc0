use crate::error::SessionError;

/// The user's ingredients, in the order they were added.
///
/// Entries are trimmed and lowercased on the way in, so no two entries can
/// compare equal after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSet {
    items: Vec<String>,
}

impl IngredientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ingredient. Blank input is ignored.
    pub fn add(&mut self, text: &str) -> Result<(), SessionError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Ok(());
        }
        if self.contains(&normalized) {
            return Err(SessionError::Duplicate(normalized));
        }
        self.items.push(normalized);
        Ok(())
    }

    /// Remove an ingredient; unknown values are a no-op
    pub fn remove(&mut self, value: &str) {
        let normalized = normalize(value);
        if let Some(pos) = self.items.iter().position(|item| *item == normalized) {
            self.items.remove(pos);
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        let normalized = normalize(value);
        self.items.iter().any(|item| *item == normalized)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes() {
        let mut set = IngredientSet::new();
        set.add("  Flour ").unwrap();
        assert_eq!(set.as_slice(), ["flour"]);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut set = IngredientSet::new();
        for item in ["sugar", "flour", "eggs"] {
            set.add(item).unwrap();
        }
        assert_eq!(set.as_slice(), ["sugar", "flour", "eggs"]);
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut set = IngredientSet::new();
        assert!(set.add("").is_ok());
        assert!(set.add("   ").is_ok());
        assert!(set.is_empty());
    }

    #[test]
    fn test_duplicate_is_rejected_case_insensitively() {
        let mut set = IngredientSet::new();
        set.add("Butter").unwrap();
        let err = set.add("  BUTTER ").unwrap_err();
        assert_eq!(err, SessionError::Duplicate("butter".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_never_holds_normalized_duplicates() {
        let mut set = IngredientSet::new();
        let inputs = ["Salt", "salt ", "SALT", "pepper", " Pepper", "thyme", ""];
        for input in inputs {
            let _ = set.add(input);
        }
        let mut seen = std::collections::HashSet::new();
        for item in set.iter() {
            assert!(seen.insert(item.trim().to_lowercase()));
        }
        assert_eq!(set.as_slice(), ["salt", "pepper", "thyme"]);
    }

    #[test]
    fn test_remove() {
        let mut set = IngredientSet::new();
        set.add("flour").unwrap();
        set.add("sugar").unwrap();

        set.remove("flour");
        assert_eq!(set.as_slice(), ["sugar"]);

        set.remove("saffron");
        assert_eq!(set.as_slice(), ["sugar"]);
    }
}
