use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, ReplyParameters};
use tracing::{info, warn};
use url::Url;

use crate::config::CONFIG;
use crate::generator::{generate_image, GeneratedImage};
use crate::handlers::form::CommandForm;

const IMAGE_CAPTION_LIMIT: usize = 1000;
const IMAGE_CAPTION_PROMPT_PREVIEW: usize = 400;
const IMG_USAGE: &str = "Please provide a prompt, e.g. /img a red fox | blurry";

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    let mut iter = text.chars();
    let truncated: String = iter.by_ref().take(max_chars).collect();
    let was_truncated = iter.next().is_some();
    (truncated, was_truncated)
}

fn prompt_preview(text: &str) -> String {
    let (preview, was_truncated) = truncate_chars(text, IMAGE_CAPTION_PROMPT_PREVIEW);
    if was_truncated {
        format!("{}...", preview)
    } else {
        preview
    }
}

fn build_image_caption(form: &CommandForm, image: &GeneratedImage) -> String {
    let size_line = format!("{}×{}", image.width, image.height);
    let mut caption = format!(
        "<b>Prompt:</b>\n<pre>{}</pre>",
        escape_html(&prompt_preview(form.prompt()))
    );
    if !form.negative_prompt().is_empty() {
        caption.push_str(&format!(
            "\n<b>Negative prompt:</b>\n<pre>{}</pre>",
            escape_html(&prompt_preview(form.negative_prompt()))
        ));
    }
    caption.push_str(&format!("\n<i>{}</i>", size_line));

    if caption.chars().count() <= IMAGE_CAPTION_LIMIT {
        caption
    } else {
        size_line
    }
}

fn photo_input(image: &GeneratedImage) -> Result<InputFile> {
    let source = image
        .source
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("generated image has no source"))?;
    Ok(InputFile::url(Url::parse(source)?))
}

pub async fn img_handler(bot: Bot, message: Message, arg: Option<String>) -> Result<()> {
    let form = CommandForm::parse(arg.as_deref().unwrap_or_default());
    if form.prompt().is_empty() {
        bot.send_message(message.chat.id, IMG_USAGE)
            .reply_parameters(ReplyParameters::new(message.id))
            .await?;
        return Ok(());
    }

    let mut image = GeneratedImage::new();
    generate_image(&CONFIG.api_endpoint_name, &form, &mut image)?;
    let input = photo_input(&image)?;
    let caption = build_image_caption(&form, &image);

    let send_result = bot
        .send_photo(message.chat.id, input)
        .caption(caption)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(message.id))
        .await;

    match send_result {
        Ok(_) => {
            info!(
                chat_id = message.chat.id.0,
                region = CONFIG.aws_region.as_str(),
                "Sent generated image"
            );
        }
        Err(err) => {
            warn!(
                source = image.source.as_deref().unwrap_or_default(),
                "Telegram could not load the generated image: {err}"
            );
            bot.send_message(
                message.chat.id,
                "Sorry, the generated image could not be loaded.",
            )
            .reply_parameters(ReplyParameters::new(message.id))
            .await?;
        }
    }

    Ok(())
}

#[allow(deprecated)]
pub async fn help_handler(bot: Bot, message: Message) -> Result<()> {
    let help_text = "
*GeneratedImageBot Commands*

/img - Generate an image from a prompt
Usage: `/img [prompt]`
Or: `/img [prompt] | [negative prompt]` to describe what the image should avoid
The prompt is trimmed. The negative prompt is sent as typed after `| `, spaces included.

/help - Show this help message
";

    bot.send_message(message.chat.id, help_text)
        .reply_parameters(ReplyParameters::new(message.id))
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

pub async fn start_handler(bot: Bot, message: Message) -> Result<()> {
    bot.send_message(
        message.chat.id,
        "Hello! I am GeneratedImageBot. Use /help to see commands.",
    )
    .reply_parameters(ReplyParameters::new(message.id))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::request::render_image;

    fn rendered(form: &CommandForm) -> GeneratedImage {
        let mut image = GeneratedImage::new();
        render_image(
            "https://images.example.com",
            form.prompt(),
            form.negative_prompt(),
            &mut image,
        );
        image
    }

    #[test]
    fn caption_escapes_prompt_and_shows_size() {
        let form = CommandForm::parse("<b>cats</b> & dogs");
        let caption = build_image_caption(&form, &rendered(&form));
        assert!(caption.contains("&lt;b&gt;cats&lt;/b&gt; &amp; dogs"));
        assert!(caption.ends_with("<i>512×512</i>"));
        assert!(!caption.contains("Negative prompt"));
    }

    #[test]
    fn caption_includes_negative_prompt_when_present() {
        let form = CommandForm::parse("sunset | blurry");
        let caption = build_image_caption(&form, &rendered(&form));
        assert!(caption.contains("<b>Negative prompt:</b>\n<pre>blurry</pre>"));
    }

    #[test]
    fn whitespace_negative_prompt_reaches_the_source() {
        let form = CommandForm::parse("cat |   ");
        assert_eq!(
            rendered(&form).source.as_deref(),
            Some("https://images.example.com/?prompt=cat&negative_prompt=%20%20")
        );
    }

    #[test]
    fn long_prompts_are_previewed() {
        let form = CommandForm::parse(&"a".repeat(2000));
        let caption = build_image_caption(&form, &rendered(&form));
        assert!(caption.chars().count() <= IMAGE_CAPTION_LIMIT);
        assert!(caption.contains("..."));
    }

    #[test]
    fn photo_input_requires_source() {
        assert!(photo_input(&GeneratedImage::new()).is_err());
        let form = CommandForm::parse("sunset");
        assert!(photo_input(&rendered(&form)).is_ok());
    }
}
