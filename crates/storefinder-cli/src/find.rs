//! `find`: runs the store search pipeline from the terminal.

use clap::Args;
use storefinder_core::AppConfig;
use storefinder_locator::{resolve, Locator, Outcome, RawParams};

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct FindArgs {
    /// Store finder path, e.g. `retail/trail-mix/salted`
    #[arg(default_value = "")]
    pub path: String,
    /// Free-text location to search around
    #[arg(long)]
    pub location: Option<String>,
    /// Search radius in kilometres
    #[arg(long)]
    pub radius: Option<String>,
    /// Roadshow month, as `YYYY-MM-DD`
    #[arg(long)]
    pub date: Option<String>,
    /// Roadshow locality id
    #[arg(long)]
    pub locality: Option<String>,
    /// Slash-separated `facet:value` filters
    #[arg(long)]
    pub filters: Option<String>,
    /// Print the full-page context instead of the interactive payload
    #[arg(long)]
    pub page: bool,
}

impl FindArgs {
    #[must_use]
    pub fn raw_params(&self) -> RawParams {
        RawParams {
            location: self.location.clone(),
            radius: self.radius.clone(),
            date: self.date.clone(),
            locality: self.locality.clone(),
            filters: self.filters.clone(),
        }
    }
}

/// # Errors
///
/// Returns an error if the locator cannot be built, the search fails, or the
/// result cannot be serialized.
pub(crate) async fn run_find(
    pool: sqlx::PgPool,
    config: &AppConfig,
    args: &FindArgs,
) -> anyhow::Result<()> {
    let locator = Locator::from_pool(pool, config)?;
    let path = args.path.trim_start_matches('/');

    match resolve(&locator, &args.raw_params(), path, !args.page).await? {
        Outcome::Interactive(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Outcome::Page(context) => {
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        Outcome::Redirect(redirect) => {
            println!("redirect: {}", redirect.location());
        }
    }
    Ok(())
}
