pub mod cancel;
pub mod color;
pub mod geometry;
pub mod ids;
pub mod record;
pub mod seed;

pub use cancel::CancellationToken;
pub use color::Color;
pub use geometry::Size;
pub use ids::DocumentId;
pub use record::{records_from_value, ContentRecord, HeaderInfo, RecordError, ViewMode};
pub use seed::{seed_from_str, seeded_shuffle};
