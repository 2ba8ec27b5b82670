//! Preview module - logo preview handles and the poster projection.

pub mod handle;
pub mod poster;

pub use handle::{PreviewError, PreviewHandle, PreviewManager, PreviewStore, TempDirPreviewStore};
pub use poster::PosterPreview;
