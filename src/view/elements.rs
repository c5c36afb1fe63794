//! View elements shared between the CLI and the orchestrators

use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// A text-valued input (query box, file picker)
#[derive(Debug, Clone, Default)]
pub struct InputField {
    value: Arc<RwLock<String>>,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: impl Into<String>) {
        *write(&self.value) = value.into();
    }

    pub fn value(&self) -> String {
        read(&self.value).clone()
    }

    pub fn clear(&self) {
        write(&self.value).clear();
    }

    pub fn is_empty(&self) -> bool {
        read(&self.value).is_empty()
    }
}

/// One element of the rendered gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderInstruction {
    /// "{count} search results for {query}"
    Summary { count: usize, query: String },
    Image { url: String },
}

impl RenderInstruction {
    pub fn summary_text(&self) -> Option<String> {
        match self {
            RenderInstruction::Summary { count, query } => {
                Some(format!("{} search results for {}", count, query))
            }
            RenderInstruction::Image { .. } => None,
        }
    }
}

/// Image gallery container
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    elements: Arc<RwLock<Vec<RenderInstruction>>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with `instructions`
    pub fn replace(&self, instructions: Vec<RenderInstruction>) {
        *write(&self.elements) = instructions;
    }

    pub fn clear(&self) {
        write(&self.elements).clear();
    }

    pub fn elements(&self) -> Vec<RenderInstruction> {
        read(&self.elements).clone()
    }

    pub fn image_count(&self) -> usize {
        read(&self.elements)
            .iter()
            .filter(|e| matches!(e, RenderInstruction::Image { .. }))
            .count()
    }

    pub fn image_urls(&self) -> Vec<String> {
        read(&self.elements)
            .iter()
            .filter_map(|e| match e {
                RenderInstruction::Image { url } => Some(url.clone()),
                RenderInstruction::Summary { .. } => None,
            })
            .collect()
    }

    pub fn summary(&self) -> Option<String> {
        read(&self.elements)
            .iter()
            .find_map(RenderInstruction::summary_text)
    }
}

/// Transient status line
#[derive(Debug, Clone, Default)]
pub struct StatusMessage {
    text: Arc<RwLock<Option<String>>>,
}

impl StatusMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, text: impl Into<String>) {
        *write(&self.text) = Some(text.into());
    }

    pub fn text(&self) -> Option<String> {
        read(&self.text).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_field_shared_between_clones() {
        let input = InputField::new();
        let handle = input.clone();
        input.set("cat");
        assert_eq!(handle.value(), "cat");
        handle.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_gallery_queries() {
        let gallery = Gallery::new();
        gallery.replace(vec![
            RenderInstruction::Summary {
                count: 2,
                query: "cat".to_string(),
            },
            RenderInstruction::Image {
                url: "a.png".to_string(),
            },
            RenderInstruction::Image {
                url: "b.png".to_string(),
            },
        ]);
        assert_eq!(gallery.image_count(), 2);
        assert_eq!(gallery.image_urls(), vec!["a.png", "b.png"]);
        assert_eq!(gallery.summary().unwrap(), "2 search results for cat");

        gallery.clear();
        assert!(gallery.elements().is_empty());
        assert!(gallery.summary().is_none());
    }

    #[test]
    fn test_status_message() {
        let status = StatusMessage::new();
        assert!(status.text().is_none());
        status.show("Uploading 1 image(s)");
        assert_eq!(status.text().as_deref(), Some("Uploading 1 image(s)"));
        status.show("Uploading 2 image(s)");
        assert_eq!(status.text().as_deref(), Some("Uploading 2 image(s)"));
    }
}
