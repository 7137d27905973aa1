pub mod types;
pub mod config;
pub mod error;
pub mod color;
pub mod objects;
pub mod document;
pub mod scene;
pub mod render;
pub mod history;
pub mod persist;
pub mod selection;
pub mod clipboard;
pub mod viewport;
pub mod editor;
pub mod shapes;
pub mod styling;
pub mod arrange;
pub mod image_ops;
pub mod export;
pub mod shortcuts;
pub mod engine;
pub mod commands;

pub use config::{EditorConfig, StyleDefaults};
pub use document::{Document, SavePayload};
pub use editor::{Editor, LivenessToken, UiSignal};
pub use engine::DesignEngine;
pub use error::{ExportError, ImageError, LoadError, PersistError};
pub use image_ops::{DataUriFetcher, ImageFetcher, ImageRequest, PendingImage};
pub use objects::{SceneObject, Shape};
pub use persist::PersistSink;
pub use shortcuts::{Focus, Modifiers, Shortcut};
pub use styling::StyleChange;
pub use types::*;
