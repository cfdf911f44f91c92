use clap::{Parser, Subcommand};
use visilens_core::InputType;

#[derive(Debug, Parser)]
#[command(name = "visilens")]
#[command(about = "AI search visibility analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a URL or brand name and print the report as JSON.
    Analyze {
        /// URL or brand name to analyze.
        #[arg(long)]
        input: String,

        /// Input kind: "url" or "brand".
        #[arg(long, default_value = "url")]
        input_type: String,

        /// Comma-separated rater ids. Defaults to the full built-in set.
        #[arg(long)]
        raters: Option<String>,

        /// Pretty-print the report JSON.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so stdout stays valid JSON for piping.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            input_type,
            raters,
            pretty,
        } => run_analyze(&input, &input_type, raters.as_deref(), pretty).await,
    }
}

async fn run_analyze(
    input: &str,
    input_type: &str,
    raters: Option<&str>,
    pretty: bool,
) -> anyhow::Result<()> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("--input must not be empty");
    }
    let Some(input_type) = InputType::from_name(input_type) else {
        anyhow::bail!("--input-type must be 'url' or 'brand', got '{input_type}'");
    };

    let config = visilens_core::load_app_config()?;
    let lexicons = match &config.lexicons_path {
        Some(path) => visilens_core::load_lexicons(path)?,
        None => visilens_core::Lexicons::default(),
    };
    let rater_ids = parse_rater_ids(raters);

    let content = match input_type {
        InputType::Url => {
            let scraper = visilens_scraper::ScrapeClient::new(
                config.scraper_timeout_secs,
                &config.scraper_user_agent,
            )?;
            scraper.fetch_url(input).await?
        }
        InputType::Brand => visilens_scraper::brand_document(input),
    };

    let client = visilens_rater::RaterClient::new(
        &config.openrouter_api_key,
        config.rater_timeout_secs,
    )?;
    let opinions = visilens_rater::query_raters(&client, &content, &rater_ids).await;

    let brand_name = match input_type {
        InputType::Brand => input.to_string(),
        InputType::Url => content.title.clone(),
    };
    let result = visilens_analysis::consolidate(&opinions, &content, &brand_name, &lexicons);
    let report = visilens_analysis::assemble_report(&result, input, input_type, &lexicons);

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn parse_rater_ids(raters: Option<&str>) -> Vec<String> {
    let ids: Vec<String> = raters
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if ids.is_empty() {
        visilens_rater::default_raters()
    } else {
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rater_ids_splits_and_trims() {
        assert_eq!(
            parse_rater_ids(Some(" chatgpt-4o , gemini-2.5 ")),
            vec!["chatgpt-4o", "gemini-2.5"]
        );
    }

    #[test]
    fn parse_rater_ids_defaults_when_omitted_or_blank() {
        assert_eq!(parse_rater_ids(None), visilens_rater::default_raters());
        assert_eq!(parse_rater_ids(Some(" , ,")), visilens_rater::default_raters());
    }
}
