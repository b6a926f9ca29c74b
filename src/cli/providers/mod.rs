//! Providers command - prints the provider registry built from configuration

use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::{ProviderProfile, ProviderRegistry};

#[derive(Args, Clone, Debug)]
pub struct ProvidersArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Secret-free view of a provider profile
#[derive(Debug, Serialize)]
struct ProviderSummary<'a> {
    id: &'a str,
    base_url: &'a str,
    chat_model: &'a str,
    secret_env: &'a str,
    secret_configured: bool,
    default: bool,
}

impl<'a> ProviderSummary<'a> {
    fn new(profile: &'a ProviderProfile, registry: &ProviderRegistry) -> Self {
        Self {
            id: profile.id().as_str(),
            base_url: profile.base_url(),
            chat_model: profile.chat_model(),
            secret_env: profile.id().secret_env(),
            secret_configured: profile.has_secret(),
            default: registry.default_provider() == profile.id(),
        }
    }
}

pub async fn run(args: ProvidersArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let registry = config.providers.build_registry();

    let output = if args.json {
        render_json(&registry)?
    } else {
        render_table(&registry)
    };

    println!("{}", output);
    Ok(())
}

fn summaries(registry: &ProviderRegistry) -> Vec<ProviderSummary<'_>> {
    registry
        .profiles()
        .map(|profile| ProviderSummary::new(profile, registry))
        .collect()
}

fn render_json(registry: &ProviderRegistry) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&summaries(registry))?)
}

fn render_table(registry: &ProviderRegistry) -> String {
    let mut lines = vec![format!(
        "{:<12} {:<32} {:<22} {}",
        "PROVIDER", "BASE URL", "MODEL", "SECRET"
    )];

    for summary in summaries(registry) {
        let marker = if summary.default { "*" } else { " " };
        let secret = if summary.secret_configured {
            "set".to_string()
        } else {
            format!("missing ({})", summary.secret_env)
        };

        lines.push(format!(
            "{:<12} {:<32} {:<22} {}",
            format!("{}{}", summary.id, marker),
            summary.base_url,
            summary.chat_model,
            secret
        ));
    }

    lines.join("\n")
}
