//! Command handlers for the docent binary.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::output::Output;
use super::{Cli, Commands};
use crate::rag::{RagPipeline, TextChunker};
use crate::study::{Preferences, StudyAssistant};
use crate::types::{AppError, Result, RetrievedChunk};
use crate::utils::toml_config::{ConfigError, DocentConfig};

/// Execute the parsed command against an already loaded configuration.
pub async fn run(cli: Cli, config: DocentConfig) -> Result<()> {
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Chunk { file, size } => chunk(&output, &config, &file, size).await,
        Commands::Ask {
            file,
            question,
            top_k,
            show_context,
        } => ask(&output, config, &file, &question, top_k, show_context).await,
        Commands::Chat { file } => chat(&output, &config, &file).await,
        Commands::Notes {
            file,
            format,
            style,
        } => {
            let preferences = Preferences {
                content_format: format,
                assessment_style: style,
            };
            notes(&output, &config, &file, &preferences).await
        }
        Commands::Config { validate } => show_config(&output, &config, &cli.config, validate),
    }
}

async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

async fn load_pipeline(config: &DocentConfig, file: &Path) -> Result<RagPipeline> {
    let document = read_document(file).await?;
    let pipeline = RagPipeline::from_config(config)?;
    let added = pipeline.ingest(&document).await?;
    debug!(chunks = added, file = %file.display(), "Document ingested");
    Ok(pipeline)
}

async fn chunk(output: &Output, config: &DocentConfig, file: &Path, size: Option<usize>) -> Result<()> {
    let document = read_document(file).await?;
    let chunker = TextChunker::new(size.unwrap_or(config.rag.chunk_size))?;

    let chunks = chunker.chunk(&document);
    for (i, text) in chunks.iter().enumerate() {
        output.chunk(i + 1, text);
    }
    output.newline();
    output.info(&format!(
        "{} chunk(s) at size limit {}",
        chunks.len(),
        chunker.max_size()
    ));
    Ok(())
}

/// Stream one answer to stdout and return the context it used.
async fn stream_answer(
    output: &Output,
    pipeline: &RagPipeline,
    question: &str,
) -> Result<Vec<RetrievedChunk>> {
    let (context, mut stream) = pipeline.answer_stream(question).await?;
    while let Some(fragment) = stream.next().await {
        output.token(&fragment?);
    }
    output.newline();
    Ok(context)
}

async fn ask(
    output: &Output,
    mut config: DocentConfig,
    file: &Path,
    question: &str,
    top_k: Option<usize>,
    show_context: bool,
) -> Result<()> {
    if let Some(k) = top_k {
        config.rag.top_k = k;
    }
    let pipeline = load_pipeline(&config, file).await?;

    let context = stream_answer(output, &pipeline, question).await?;

    if show_context {
        output.header("Context");
        for hit in &context {
            output.context(hit.position, hit.distance, &hit.text);
        }
    }
    Ok(())
}

async fn chat(output: &Output, config: &DocentConfig, file: &Path) -> Result<()> {
    let pipeline = load_pipeline(config, file).await?;
    output.success(&format!(
        "Loaded {} chunk(s) from {}",
        pipeline.corpus().len().await,
        file.display()
    ));
    output.hint("Type a question and press enter; 'exit' or end of input quits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            break;
        }

        // A failed question does not end the session
        if let Err(e) = stream_answer(output, &pipeline, question).await {
            output.error(&e.to_string());
        }
    }
    Ok(())
}

async fn notes(
    output: &Output,
    config: &DocentConfig,
    file: &Path,
    preferences: &Preferences,
) -> Result<()> {
    let pipeline = load_pipeline(config, file).await?;
    let assistant = StudyAssistant::new(Arc::new(pipeline));

    let notes = assistant.generate_notes(preferences).await?;
    output.header("Course Notes");
    println!("{}", notes);
    Ok(())
}

fn show_config(output: &Output, config: &DocentConfig, path: &Path, validate: bool) -> Result<()> {
    if path.exists() {
        output.success(&format!("{} is valid", path.display()));
    } else {
        output.warning(&format!(
            "{} not found, using built-in defaults",
            path.display()
        ));
    }

    match config.embedding_provider() {
        Ok(provider) => output.kv("embedding", &format!("{} ({})", provider.name(), provider.model())),
        Err(ConfigError::MissingEnvVar(name)) => {
            output.warning(&format!("embedding API key variable {} is not set", name))
        }
        Err(e) => return Err(e.into()),
    }
    match config.llm_provider() {
        Ok(provider) => output.kv("generator", &format!("{} ({})", provider.name(), provider.model())),
        Err(ConfigError::MissingEnvVar(name)) => {
            output.warning(&format!("generator API key variable {} is not set", name))
        }
        Err(e) => return Err(e.into()),
    }

    if !validate {
        output.header("Effective configuration");
        println!("{}", config.to_toml_string()?);
    }
    Ok(())
}
