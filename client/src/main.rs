//! `selfmap` command-line front end.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use selfmap_client::config::ClientSettings;
use selfmap_client::domain::ports::{AccountApi, SessionTokenSource, SharedSessionToken};
use selfmap_client::domain::{
    AnalysisView, AnalysisViewState, AnswerSubmission, ChatRole, ChatSession, Credentials,
    EpisodeEditor, QuestionnaireForm, UserFacingError, sign_in,
};
use selfmap_client::outbound::http::HttpApiClient;

/// `selfmap` command arguments.
#[derive(Debug, Parser)]
#[command(name = "selfmap", about = "Talk to the selfmap self-analysis API", version)]
struct CliArgs {
    /// Bearer token; overrides `SELFMAP_TOKEN`.
    #[arg(long, global = true, value_name = "token")]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report backend health.
    Health,
    /// Sign in and print the issued token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List questionnaire questions.
    Questions,
    /// Submit answers from a JSON file shaped like `{"answers": [...]}`.
    Submit {
        #[arg(value_name = "file")]
        file: PathBuf,
    },
    /// Wait for the analysis and print it.
    Analysis,
    /// Ask the AI counselor a question.
    Chat {
        #[arg(value_name = "text")]
        text: String,
    },
    /// Show the saved episode for a question.
    Episode {
        #[arg(value_name = "question_id")]
        question_id: Uuid,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = ClientSettings::load_from_iter([OsString::from("selfmap")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let session = SharedSessionToken::default();
    if let Some(token) = args.token.as_deref().or(settings.token()) {
        session.sign_in(token);
    }
    let client = Arc::new(
        HttpApiClient::new(settings.http_client_config()?, Arc::new(session.clone()))
            .wrap_err("failed to build HTTP client")?,
    );

    match args.command {
        Command::Health => {
            let status = client.health().await.map_err(|error| {
                UserFacingError::report_api("health", &error)
            })?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password)?;
            let account = sign_in(client.as_ref(), &session, &credentials).await?;
            println!("signed in as {} <{}>", account.name, account.email);
            if let Some(token) = session.bearer_token() {
                println!("token={token}");
            }
        }
        Command::Questions => {
            let form = QuestionnaireForm::load(client.as_ref()).await?;
            for question in form.questions() {
                println!(
                    "{order:>3}  {id}  [{category}] {text}",
                    order = question.display_order,
                    id = question.id,
                    category = question.category,
                    text = question.question_text,
                );
            }
        }
        Command::Submit { file } => submit(client.as_ref(), &file).await?,
        Command::Analysis => {
            let view = AnalysisView::mount(client, settings.poll_config()?);
            let state = watch_analysis(&view).await;
            print_analysis(state)?;
        }
        Command::Chat { text } => {
            let chat = ChatSession::new(client);
            chat.send(&text).await?;
            for message in chat
                .snapshot()
                .messages
                .iter()
                .filter(|message| message.role == ChatRole::Ai)
            {
                if let Some(reasoning) = &message.reasoning {
                    println!("reasoning: {reasoning}");
                }
                println!("{}", message.content);
            }
        }
        Command::Episode { question_id } => {
            let editor = EpisodeEditor::load(client.as_ref(), client.as_ref(), question_id).await?;
            println!("question: {}", editor.question().question_text);
            println!("answer: {}", editor.original_answer());
            match editor.stored() {
                Some(record) => {
                    println!("updated_at={}", record.updated_at.to_rfc3339());
                    println!("{}", serde_json::to_string_pretty(&record.detail)?);
                }
                None => println!("no episode saved yet"),
            }
        }
    }
    Ok(())
}

async fn submit(client: &HttpApiClient, file: &Path) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let submission: AnswerSubmission = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse answers in {}", file.display()))?;

    let mut form = QuestionnaireForm::load(client).await?;
    for (question_id, text) in submission.by_question() {
        form.set_answer(question_id, text);
    }
    match form.submit(client).await {
        Ok(ack) => {
            println!("{}", serde_json::to_string_pretty(&ack)?);
            Ok(())
        }
        Err(error) => {
            for question in form.questions() {
                if let Some(message) = form.error(question.id) {
                    println!("{}: {message}", question.id);
                }
            }
            Err(error.into())
        }
    }
}

async fn watch_analysis(view: &AnalysisView) -> AnalysisViewState {
    let mut updates = view.subscribe();
    loop {
        let state = updates.borrow_and_update().clone();
        if let Some(progress) = state.progress() {
            println!("analysis not ready yet ({progress})");
        }
        if !state.loading {
            return state;
        }
        if updates.changed().await.is_err() {
            return view.state();
        }
    }
}

fn print_analysis(state: AnalysisViewState) -> Result<()> {
    if let Some(error) = state.error {
        return Err(error.into());
    }
    let analysis = state
        .analysis
        .ok_or_else(|| eyre!("analysis session ended without a result"))?;
    println!("summary: {}", analysis.summary);
    println!("keywords: {}", analysis.keywords.join(", "));
    println!("values: {}", analysis.values.join(", "));
    for strength in analysis.strengths_by_confidence() {
        println!(
            "strength: {} ({:.0}%) - {}",
            strength.strength,
            strength.confidence * 100.0,
            strength.evidence
        );
    }
    Ok(())
}
