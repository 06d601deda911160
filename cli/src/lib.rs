//! Command-line front-end for the ABN Lookup client.
//!
//! Each subcommand maps onto one client search. Flags mirror the service's
//! parameters (kebab-case, with the service's camelCase names accepted as
//! aliases). Records are printed one pretty JSON document at a time. Multi-result
//! searches are cut off after `--limit` records.

use std::io::Write;

use abn_lookup::{
    AbnLookupClient, AdvancedNameSearch, ApiError, ClientConfig, EventWindow, FilterCriteria,
    NameSearch, Records, State, Transport, YesNo, DEFAULT_BASE_URL,
};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "abn-lookup", version, about = "Search the Australian Business Register")]
pub struct Cli {
    /// Authentication GUID issued by the ABR
    #[arg(long, env = "ABN_LOOKUP_GUID", hide_env_values = true)]
    pub guid: String,

    /// Base URL of the XML search service
    #[arg(long, env = "ABN_LOOKUP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log requests and responses to stderr
    #[arg(
        long,
        env = "ABN_LOOKUP_DEBUG",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub debug: bool,

    /// Print at most this many records. Exact ABN and ASIC lookups ignore it.
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Exact lookup by ABN
    Abn {
        #[arg(long)]
        abn: String,
        #[arg(long, alias = "includeHistoricalDetails", value_enum, default_value_t = YesNo::No)]
        include_historical_details: YesNo,
    },

    /// Exact lookup by ASIC number (ACN, ARBN, ARSN, ARFN)
    Asic {
        #[arg(long)]
        asic: String,
        #[arg(long, alias = "includeHistoricalDetails", value_enum, default_value_t = YesNo::No)]
        include_historical_details: YesNo,
    },

    /// Search by name (simple protocol)
    Name(NameArgs),

    /// Search by name with scoring and width controls
    NameAdvanced(AdvancedNameArgs),

    /// Search by postcode
    Postcode {
        #[arg(long)]
        postcode: String,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search by ABN status
    AbnStatus {
        #[arg(long, alias = "entityStatusCode")]
        entity_status_code: String,
        #[arg(long)]
        postcode: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search for charities
    Charity {
        #[arg(long)]
        postcode: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search by registration event
    RegistrationEvent(EventArgs),

    /// Search by update event
    UpdateEvent(EventArgs),

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Single-entity lookups, which always print their one document.
    fn is_exact_lookup(&self) -> bool {
        matches!(self, Command::Abn { .. } | Command::Asic { .. })
    }
}

/// Optional criteria shared by the filter searches.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// State or territory to filter by
    #[arg(long, value_enum)]
    pub state: Option<State>,
    #[arg(long, alias = "activeABNsOnly", value_enum)]
    pub active_abns_only: Option<YesNo>,
    #[arg(long, alias = "currentGSTRegistrationOnly", value_enum)]
    pub current_gst_registration_only: Option<YesNo>,
    #[arg(long, alias = "entityTypeCode")]
    pub entity_type_code: Option<String>,
    #[arg(long, alias = "concessionTypeCode")]
    pub concession_type_code: Option<String>,
}

impl FilterArgs {
    fn into_criteria(self, postcode: Option<String>) -> FilterCriteria {
        FilterCriteria {
            postcode: postcode.unwrap_or_default(),
            state: self.state,
            active_abns_only: self.active_abns_only,
            current_gst_registration_only: self.current_gst_registration_only,
            entity_type_code: self.entity_type_code.unwrap_or_default(),
            concession_type_code: self.concession_type_code.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Args)]
pub struct NameArgs {
    /// Name to search for
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub postcode: Option<String>,
    #[arg(long, alias = "legalName", value_enum)]
    pub legal_name: Option<YesNo>,
    #[arg(long, alias = "businessName", value_enum)]
    pub business_name: Option<YesNo>,
    #[arg(long, alias = "tradingName", value_enum)]
    pub trading_name: Option<YesNo>,
    /// Restrict results to one state or territory
    #[arg(long, value_enum)]
    pub state: Option<State>,
}

impl NameArgs {
    fn into_search(self) -> NameSearch {
        NameSearch {
            name: self.name,
            postcode: self.postcode.unwrap_or_default(),
            legal_name: self.legal_name,
            business_name: self.business_name,
            trading_name: self.trading_name,
            state: self.state,
        }
    }
}

#[derive(Debug, Args)]
pub struct AdvancedNameArgs {
    #[command(flatten)]
    pub base: NameArgs,
    #[arg(long, alias = "searchWidth")]
    pub search_width: Option<String>,
    /// Lowest match score to return, 0 to 100
    #[arg(long, alias = "minimumScore", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub minimum_score: Option<u32>,
    #[arg(long, alias = "maxSearchResults", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_search_results: Option<u32>,
    #[arg(long, alias = "activeABNsOnly", value_enum)]
    pub active_abns_only: Option<YesNo>,
}

impl AdvancedNameArgs {
    fn into_search(self) -> AdvancedNameSearch {
        AdvancedNameSearch {
            base: self.base.into_search(),
            search_width: self.search_width.unwrap_or_default(),
            minimum_score: self.minimum_score,
            max_search_results: self.max_search_results,
            active_abns_only: self.active_abns_only,
        }
    }
}

#[derive(Debug, Args)]
pub struct EventArgs {
    #[arg(long, alias = "eventType")]
    pub event_type: String,
    /// First day of the window (YYYY-MM-DD)
    #[arg(long, alias = "fromDate")]
    pub from_date: NaiveDate,
    /// Last day of the window (YYYY-MM-DD)
    #[arg(long, alias = "toDate")]
    pub to_date: NaiveDate,
    #[arg(long)]
    pub postcode: Option<String>,
    #[command(flatten)]
    pub filters: FilterArgs,
}

impl EventArgs {
    fn split(self) -> anyhow::Result<(EventWindow, FilterCriteria)> {
        if self.from_date > self.to_date {
            bail!(
                "--from-date {} is after --to-date {}",
                self.from_date,
                self.to_date
            );
        }
        let window = EventWindow {
            event_type: self.event_type,
            from_date: self.from_date,
            to_date: self.to_date,
        };
        Ok((window, self.filters.into_criteria(self.postcode)))
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        "abn_lookup=debug,abn_lookup_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

/// Run the selected search and print its records to `out`.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    let Cli {
        guid,
        base_url,
        debug,
        limit,
        command,
    } = cli;

    if let Command::Unknown(args) = &command {
        let verb = args.first().map(String::as_str).unwrap_or_default();
        writeln!(out, "Unknown command: {verb}")?;
        return Ok(());
    }

    let config = ClientConfig::new(guid)
        .with_base_url(base_url)
        .with_debug(debug);
    let client = AbnLookupClient::new(config)?;
    let limit = if command.is_exact_lookup() { None } else { limit };
    let records = dispatch(&client, command)?;

    let mut printed = 0usize;
    for record in records.take(limit.unwrap_or(usize::MAX)) {
        let text = serde_json::to_string_pretty(&record).context("rendering record")?;
        writeln!(out, "{text}")?;
        printed += 1;
    }
    debug!(printed, "done");
    Ok(())
}

fn dispatch<T: Transport>(client: &AbnLookupClient<T>, command: Command) -> anyhow::Result<Records> {
    let records: Result<Records, ApiError> = match command {
        Command::Abn {
            abn,
            include_historical_details,
        } => client.search_by_abn(&abn, include_historical_details),
        Command::Asic {
            asic,
            include_historical_details,
        } => client.search_by_asic(&asic, include_historical_details),
        Command::Name(args) => client.search_by_name(&args.into_search()),
        Command::NameAdvanced(args) => client.search_by_name_advanced(&args.into_search()),
        Command::Postcode { postcode, filters } => {
            client.search_by_postcode(&postcode, &filters.into_criteria(None))
        }
        Command::AbnStatus {
            entity_status_code,
            postcode,
            filters,
        } => client.search_by_abn_status(&entity_status_code, &filters.into_criteria(postcode)),
        Command::Charity { postcode, filters } => {
            client.search_by_charity(&filters.into_criteria(postcode))
        }
        Command::RegistrationEvent(args) => {
            let (window, filters) = args.split()?;
            client.search_by_registration_event(&window, &filters)
        }
        Command::UpdateEvent(args) => {
            let (window, filters) = args.split()?;
            client.search_by_update_event(&window, &filters)
        }
        Command::Unknown(_) => Ok(Records::empty()),
    };
    Ok(records?)
}
