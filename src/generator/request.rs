use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::debug;

use super::surface::{DisplaySurface, FormFields, GENERATED_IMAGE_ELEMENT, GENERATED_IMAGE_SIZE};

pub const PROMPT_FIELD: &str = "prompt";
pub const NEGATIVE_PROMPT_FIELD: &str = "negative_prompt";

// URI component set: everything outside ALPHA / DIGIT / "-_.!~*'()" is
// escaped, including the query delimiters '&', '=' and '?'.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("element '{0}' does not exist")]
    MissingElement(String),
}

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Builds `prompt=<p>[&negative_prompt=<n>]`.
///
/// The negative prompt is left out entirely when it is empty. It is not
/// trimmed, so a whitespace-only value is still sent.
pub fn build_query(prompt: &str, negative_prompt: &str) -> String {
    let mut query = format!("{PROMPT_FIELD}={}", encode_component(prompt));
    if !negative_prompt.is_empty() {
        query.push('&');
        query.push_str(NEGATIVE_PROMPT_FIELD);
        query.push('=');
        query.push_str(&encode_component(negative_prompt));
    }
    query
}

pub fn build_image_source(endpoint_base: &str, prompt: &str, negative_prompt: &str) -> String {
    format!("{endpoint_base}/?{}", build_query(prompt, negative_prompt))
}

/// Points `surface` at the generated image for the given prompts and pins its
/// rendered size to 512x512, whatever it was before.
pub fn render_image<S>(endpoint_base: &str, prompt: &str, negative_prompt: &str, surface: &mut S)
where
    S: DisplaySurface + ?Sized,
{
    let source = build_image_source(endpoint_base, prompt, negative_prompt);
    debug!(
        element = GENERATED_IMAGE_ELEMENT,
        source = %source,
        "Assigning generated image source"
    );
    surface.set_source(source);
    surface.set_height(GENERATED_IMAGE_SIZE);
    surface.set_width(GENERATED_IMAGE_SIZE);
}

/// Reads the `prompt` and `negative_prompt` fields and renders the result
/// into `surface`. A missing field aborts before the surface is written.
pub fn generate_image<F, S>(
    endpoint_base: &str,
    fields: &F,
    surface: &mut S,
) -> Result<(), GeneratorError>
where
    F: FormFields + ?Sized,
    S: DisplaySurface + ?Sized,
{
    let prompt = read_field(fields, PROMPT_FIELD)?;
    let negative_prompt = read_field(fields, NEGATIVE_PROMPT_FIELD)?;
    render_image(endpoint_base, &prompt, &negative_prompt, surface);
    Ok(())
}

fn read_field<F>(fields: &F, name: &str) -> Result<String, GeneratorError>
where
    F: FormFields + ?Sized,
{
    fields
        .field_value(name)
        .ok_or_else(|| GeneratorError::MissingElement(name.to_string()))
}
