//! Console front end for the liora gateway.
//!
//! A thin subscriber/trigger around the orchestrator: reads queries from
//! stdin, renders state snapshots to stdout, and never touches the core
//! logic itself.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use liora::{
    Config, HttpDispatcher, ImageGenerator, ImageRequest, ModeRegistry, OrchestrationState,
    QueryOrchestrator, RequestOutcome,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting liora console...");

    let registry = ModeRegistry::new(config.modes());
    let orchestrator = Arc::new(QueryOrchestrator::new(
        registry,
        Arc::new(HttpDispatcher::new()),
        config.ms_per_char,
    ));
    orchestrator.subscribe(render_snapshot());

    let image_generator = config
        .together_api_key
        .as_deref()
        .map(|key| ImageGenerator::new(&config.image_url, key));

    println!("liora - multi-mode AI query gateway");
    print_modes(&orchestrator);
    println!("Commands: /modes, /mode <n>, /image <prompt>, /quit. Anything else is a query.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::ListModes => print_modes(&orchestrator),
            Command::SetMode(Some(index)) => {
                if let Err(e) = orchestrator.set_mode(index) {
                    println!("{e}");
                } else {
                    println!("Active mode: {}", orchestrator.active_mode().label);
                }
            }
            Command::SetMode(None) => println!("Usage: /mode <index>"),
            Command::Image(prompt_text) => {
                generate_images(&image_generator, &config, prompt_text).await;
            }
            Command::Query(text) => {
                if let Err(e) = orchestrator.submit(text).await {
                    println!("{e}");
                }
            }
        }
        prompt();
    }

    info!("Console session ended");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    Quit,
    ListModes,
    SetMode(Option<usize>),
    Image(&'a str),
    Query(&'a str),
}

/// Route an input line by its first word, so a bare `/mode` or `/image`
/// gets a usage message instead of being submitted as a query.
fn parse_command(line: &str) -> Command<'_> {
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    match word {
        "" => Command::Empty,
        "/quit" => Command::Quit,
        "/modes" => Command::ListModes,
        "/mode" => Command::SetMode(rest.trim().parse().ok()),
        "/image" => Command::Image(rest),
        _ => Command::Query(line),
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_modes(orchestrator: &Arc<QueryOrchestrator>) {
    let active = orchestrator.active_mode();
    for (index, mode) in orchestrator.modes().iter().enumerate() {
        let marker = if mode.id == active.id { "*" } else { " " };
        println!("{marker} [{index}] {}", mode.label);
    }
}

async fn generate_images(
    generator: &Option<ImageGenerator>,
    config: &Config,
    prompt_text: &str,
) {
    let Some(generator) = generator else {
        println!("Image generation requires TOGETHER_API_KEY to be set.");
        return;
    };
    let prompt_text = prompt_text.trim();
    if prompt_text.is_empty() {
        println!("Usage: /image <prompt>");
        return;
    }

    let request = ImageRequest {
        model: config.image_model.clone(),
        width: config.image_width,
        height: config.image_height,
        steps: config.image_steps,
        count: config.image_count,
        ..ImageRequest::new(prompt_text)
    };
    println!("Generating {} images...", request.count);
    match generator.generate(&request).await {
        Ok(images) => {
            for (index, image) in images.iter().enumerate() {
                let url = image.data_url();
                let preview: String = url.chars().take(48).collect();
                println!(
                    "{}: {preview}... ({} bytes)",
                    liora::GeneratedImage::suggested_file_name(index),
                    url.len()
                );
            }
        }
        Err(e) => println!("{}", e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_mode_asks_for_an_index_instead_of_querying() {
        assert_eq!(parse_command("/mode"), Command::SetMode(None));
        assert_eq!(parse_command("/mode two"), Command::SetMode(None));
    }

    #[test]
    fn mode_with_an_index_switches() {
        assert_eq!(parse_command("/mode 2"), Command::SetMode(Some(2)));
        assert_eq!(parse_command("/mode  1"), Command::SetMode(Some(1)));
    }

    #[test]
    fn bare_image_routes_to_the_image_command() {
        assert_eq!(parse_command("/image"), Command::Image(""));
        assert_eq!(
            parse_command("/image a red fox"),
            Command::Image("a red fox")
        );
    }

    #[test]
    fn anything_else_is_a_query() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/modes"), Command::ListModes);
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(
            parse_command("capital of France"),
            Command::Query("capital of France")
        );
        assert_eq!(parse_command("/unknown"), Command::Query("/unknown"));
    }
}

/// Build the stdout subscriber. Tracks how much of the current render has
/// already been written so each snapshot only appends the fresh characters.
fn render_snapshot() -> impl Fn(&OrchestrationState) + Send + Sync + 'static {
    let written = Mutex::new(0usize);
    move |state| {
        let mut out = std::io::stdout().lock();
        match state {
            OrchestrationState::Idle => {
                let _ = writeln!(out, "[idle]");
            }
            OrchestrationState::Pending {
                elapsed_seconds, ..
            } => {
                *written.lock().unwrap_or_else(|e| e.into_inner()) = 0;
                let _ = write!(out, "\rSearching... {elapsed_seconds}s");
                let _ = out.flush();
            }
            OrchestrationState::Rendering {
                full_text,
                revealed_prefix_len,
            } => {
                let mut written = written.lock().unwrap_or_else(|e| e.into_inner());
                if *written == 0 {
                    let _ = writeln!(out);
                }
                let fresh: String = full_text
                    .chars()
                    .skip(*written)
                    .take(revealed_prefix_len.saturating_sub(*written))
                    .collect();
                let _ = write!(out, "{fresh}");
                let _ = out.flush();
                *written = *revealed_prefix_len;
            }
            OrchestrationState::Done { outcome } => match outcome {
                RequestOutcome::Success {
                    duration_seconds, ..
                } => {
                    let _ = writeln!(out, "\n✅ Responded in {duration_seconds:.2}s");
                }
                RequestOutcome::Failure(failure) => {
                    let _ = writeln!(out, "\n❌ {}", failure.user_message());
                }
            },
        }
    }
}
