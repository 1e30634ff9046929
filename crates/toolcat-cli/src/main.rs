use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use toolcat_client::{ApiClient, Catalog, ClientConfig, ExtractedListing};
use toolcat_core::ToolRecord;
use toolcat_form::{FieldErrors, SubmitError, ToolForm};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "toolcat")]
#[command(about = "AI tool catalog admin")]
struct Cli {
    /// Catalog API base URL; overrides the settings file and TOOLCAT_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// YAML settings file (api_url, http_timeout_secs, user_agent).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and print every tool.
    List,
    /// Fetch tools and keep those matching title, description or creator.
    Search { query: String },
    Delete { id: String },
    /// Extract a draft from a website and print it; optionally submit it.
    Extract {
        url: String,
        #[arg(long)]
        submit: bool,
    },
    /// Submit a tool JSON file. Updates when the file or --id carries an id.
    Submit {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    /// Clean and validate a tool JSON file without sending it.
    Validate { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }

    match cli.command {
        Commands::List => {
            let client = ApiClient::new(&config)?;
            let mut catalog = Catalog::default();
            catalog.refresh(&client).await?;
            print!("{}", render_tools(catalog.tools().iter()));
        }
        Commands::Search { query } => {
            let client = ApiClient::new(&config)?;
            let mut catalog = Catalog::default();
            catalog.refresh(&client).await?;
            print!("{}", render_tools(catalog.search(&query).into_iter()));
        }
        Commands::Delete { id } => {
            let client = ApiClient::new(&config)?;
            client.delete_tool(&id).await?;
            println!("deleted {id}");
        }
        Commands::Extract { url, submit } => {
            let client = ApiClient::new(&config)?;
            let mut form = ToolForm::new();
            form.extract_from(&client, &url).await?;
            println!("{}", serde_json::to_string_pretty(&form.submission().payload)?);
            if submit {
                submit_form(&mut form, &client).await?;
            }
        }
        Commands::Submit { file, id } => {
            let client = ApiClient::new(&config)?;
            let mut form = form_from_file(&file, id)?;
            submit_form(&mut form, &client).await?;
        }
        Commands::Validate { file } => {
            let form = form_from_file(&file, None)?;
            match form.check() {
                Ok(()) => println!("ok"),
                Err(errors) => bail!("invalid tool:\n{}", render_errors(&errors)),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_listing(path: &Path) -> Result<ExtractedListing> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn form_from_file(path: &Path, id: Option<String>) -> Result<ToolForm> {
    let ExtractedListing { mut tool, company } = load_listing(path)?;
    if id.is_some() {
        tool.id = id;
    }
    let mut form = ToolForm::edit(&tool);
    if let Some(company) = company {
        *form.attach_company() = company;
    }
    Ok(form)
}

async fn submit_form(form: &mut ToolForm, client: &ApiClient) -> Result<()> {
    let action = if form.record_id().is_some() { "updated" } else { "created" };
    match form.submit(client).await {
        Ok(()) => {
            println!("{action} {}", form.draft().title);
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => bail!("invalid tool:\n{}", render_errors(&errors)),
        Err(err) => Err(err).context("submitting tool"),
    }
}

fn render_tools<'a>(tools: impl Iterator<Item = &'a ToolRecord>) -> String {
    let mut out = String::new();
    for tool in tools {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            tool.id.as_deref().unwrap_or("-"),
            tool.title,
            tool.pricing_type,
            tool.categories.join(", ")
        ));
    }
    out
}

fn render_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(path, message)| format!("  {path}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use toolcat_core::PricingType;

    #[test]
    fn cli_parses_submit_with_id() {
        let cli = Cli::parse_from(["toolcat", "--api-url", "http://x", "submit", "tool.json", "--id", "7"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        match cli.command {
            Commands::Submit { file, id } => {
                assert_eq!(file, PathBuf::from("tool.json"));
                assert_eq!(id.as_deref(), Some("7"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn tools_render_one_line_each() {
        let tools = [ToolRecord {
            id: Some("t1".into()),
            title: "ChatGPT".into(),
            pricing_type: PricingType::Freemium,
            categories: vec!["Chatbot".into(), "Writing".into()],
            ..ToolRecord::default()
        }];
        assert_eq!(render_tools(tools.iter()), "t1\tChatGPT\tFreemium\tChatbot, Writing\n");
    }

    #[test]
    fn form_from_file_reads_company_and_id_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool.json");
        std::fs::write(
            &path,
            r#"{"title":"Claude","categories":["Assistant"],"company":{"name":"Anthropic"}}"#,
        )
        .unwrap();

        let form = form_from_file(&path, Some("abc".into())).unwrap();
        assert_eq!(form.record_id(), Some("abc"));
        assert_eq!(form.draft().title, "Claude");
        assert_eq!(form.company().unwrap().name, "Anthropic");
        assert!(form.check().is_ok());
    }

    #[test]
    fn invalid_file_reports_field_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool.json");
        std::fs::write(&path, r#"{"website":"not-a-url"}"#).unwrap();

        let errors = form_from_file(&path, None).unwrap().check().unwrap_err();
        let text = render_errors(&errors);
        assert!(text.contains("  categories: At least one category is required"));
        assert!(text.contains("  website: Must be a valid URL"));
    }
}
