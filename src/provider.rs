#[path = "provider/types.rs"]
mod types;

#[path = "provider/traits.rs"]
mod traits;

#[path = "provider/resilient.rs"]
mod resilient;

pub use resilient::ResilientProvider;
pub use traits::GenerativeProvider;
pub use types::{GeneratedImage, ImageRequest, VideoJob, VideoRequest};
