use std::collections::HashMap;
use std::io::Write;

use anyhow::{anyhow, Result};

use crate::generator::{generate_image, GeneratedImage, NEGATIVE_PROMPT_FIELD, PROMPT_FIELD};
use crate::utils::logging::ConsoleTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildUrlArgs {
    pub prompt: String,
    pub negative_prompt: String,
    pub json: bool,
}

pub fn build_url_usage() -> &'static str {
    "Usage: cargo run -- build-url --prompt <text> [--negative-prompt <text>] [--json]"
}

pub fn parse_build_url_args(args: &[String]) -> Result<Option<BuildUrlArgs>> {
    if args.get(1).map(|value| value.as_str()) != Some("build-url") {
        return Ok(None);
    }

    let mut prompt: Option<String> = None;
    let mut negative_prompt = String::new();
    let mut json = false;

    let mut index = 2;
    while index < args.len() {
        match args[index].as_str() {
            "--prompt" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --prompt"))?;
                prompt = Some(value.clone());
            }
            "--negative-prompt" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --negative-prompt"))?;
                negative_prompt = value.clone();
            }
            "--json" => {
                json = true;
            }
            "--help" | "-h" => {
                return Err(anyhow!(build_url_usage()));
            }
            other => {
                return Err(anyhow!(
                    "Unknown build-url argument: {other}\n{}",
                    build_url_usage()
                ));
            }
        }
        index += 1;
    }

    let prompt = prompt.ok_or_else(|| anyhow!("--prompt is required\n{}", build_url_usage()))?;

    Ok(Some(BuildUrlArgs {
        prompt,
        negative_prompt,
        json,
    }))
}

/// Renders the prompts into a fresh `GeneratedImage` and formats the result
/// for stdout: the bare source URL, or the whole surface as JSON.
pub fn run_build_url(endpoint_base: &str, args: BuildUrlArgs) -> Result<String> {
    let fields = HashMap::from([
        (PROMPT_FIELD.to_string(), args.prompt),
        (NEGATIVE_PROMPT_FIELD.to_string(), args.negative_prompt),
    ]);

    let mut image = GeneratedImage::new();
    generate_image(endpoint_base, &fields, &mut image)?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&image)?);
    }
    image
        .source
        .ok_or_else(|| anyhow!("generated image has no source"))
}

/// Stdout belongs to the `build-url` result; the bot logs to stdout.
pub fn console_target(build_args: Option<&BuildUrlArgs>) -> ConsoleTarget {
    if build_args.is_some() {
        ConsoleTarget::Stderr
    } else {
        ConsoleTarget::Stdout
    }
}

pub fn write_output<W: Write>(writer: &mut W, output: &str) -> Result<()> {
    writeln!(writer, "{output}")?;
    writer.flush()?;
    Ok(())
}
