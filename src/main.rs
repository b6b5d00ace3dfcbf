use std::error::Error;

use dotenvy::dotenv;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

mod cli;
mod config;
mod generator;
mod handlers;
mod utils;

use cli::{console_target, parse_build_url_args, run_build_url, write_output};
use config::CONFIG;
use handlers::commands;
use utils::logging::init_logging;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    Help,
    Img(String),
}

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    let args: Vec<String> = std::env::args().collect();
    let build_args = parse_build_url_args(&args)?;

    let _guards = init_logging(console_target(build_args.as_ref()));
    info!(
        region = CONFIG.aws_region.as_str(),
        endpoint = CONFIG.api_endpoint_name.as_str(),
        "Configuration loaded"
    );

    if let Some(build_args) = build_args {
        let output = run_build_url(&CONFIG.api_endpoint_name, build_args)?;
        write_output(&mut std::io::stdout().lock(), &output)?;
        return Ok(());
    }

    if CONFIG.bot_token.trim().is_empty() {
        return Err("BOT_TOKEN is required unless running build-url".into());
    }

    let bot = Bot::new(CONFIG.bot_token.clone());
    info!("Starting GeneratedImageBot");

    let command_handler = dptree::entry()
        .filter_command::<Command>()
        .endpoint(handle_command);

    let handler = Update::filter_message()
        .branch(command_handler)
        .endpoint(ignore_message);

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(bot: Bot, message: Message, command: Command) -> HandlerResult {
    fn optional_arg(arg: String) -> Option<String> {
        if arg.trim().is_empty() {
            None
        } else {
            Some(arg)
        }
    }

    match command {
        Command::Start => commands::start_handler(bot, message).await?,
        Command::Help => commands::help_handler(bot, message).await?,
        Command::Img(arg) => {
            let arg = optional_arg(arg);
            tokio::spawn(async move {
                if let Err(err) = commands::img_handler(bot, message, arg).await {
                    error!("img handler failed: {err}");
                }
            });
        }
    }
    Ok(())
}

async fn ignore_message(_message: Message) -> HandlerResult {
    Ok(())
}
