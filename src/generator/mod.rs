pub mod request;
pub mod surface;

pub use request::{generate_image, NEGATIVE_PROMPT_FIELD, PROMPT_FIELD};
pub use surface::{FormFields, GeneratedImage};
