use anyhow::{Context, Result};
use clap::Parser;
use songbook_generator::app::App;
use songbook_generator::models::StoryRequest;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "songbook-generator")]
#[command(about = "Turn song lyrics into an illustrated storybook")]
struct CliArgs {
    /// File containing the lyrics. Read from stdin when omitted.
    #[arg(long, value_name = "PATH")]
    lyrics_file: Option<PathBuf>,

    /// Optional song title.
    #[arg(long)]
    title: Option<String>,

    /// Write the storybook JSON here instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn read_lyrics(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lyrics from {}", path.display())),
        None => {
            let mut lyrics = String::new();
            std::io::stdin()
                .read_to_string(&mut lyrics)
                .context("Failed to read lyrics from stdin")?;
            Ok(lyrics)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songbook_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting songbook-generator");

    let args = CliArgs::parse();
    let lyrics = read_lyrics(args.lyrics_file.as_ref())?;
    let request = StoryRequest::new(lyrics, args.title);

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match app.run(request, args.output.as_deref()).await {
        Ok(story) => {
            if args.output.is_none() {
                println!("{}", serde_json::to_string_pretty(&story)?);
            }
            info!("Generation completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_with_title_and_output() {
        let args = CliArgs::parse_from([
            "songbook-generator",
            "--lyrics-file",
            "song.txt",
            "--title",
            "Sunrise",
            "-o",
            "book.json",
        ]);
        assert_eq!(args.lyrics_file, Some(PathBuf::from("song.txt")));
        assert_eq!(args.title.as_deref(), Some("Sunrise"));
        assert_eq!(args.output, Some(PathBuf::from("book.json")));
    }

    #[test]
    fn test_read_lyrics_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.txt");
        std::fs::write(&path, "Shine on, shine on").unwrap();

        assert_eq!(read_lyrics(Some(&path)).unwrap(), "Shine on, shine on");
    }

    #[test]
    fn test_read_lyrics_missing_file_errors() {
        let err = read_lyrics(Some(&PathBuf::from("/nonexistent/song.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read lyrics"));
    }
}
