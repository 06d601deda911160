//! Typed search inputs.
//!
//! # Design
//! Each struct groups the optional parameters of one endpoint family and
//! knows how to render itself into `QueryParams`. Optional strings default
//! to empty, optional toggles to `None`; both render as empty parameters.
//! The structs derive `Deserialize` so test vectors can describe inputs as
//! JSON.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::params::QueryParams;

/// Australian state and territory codes understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    #[cfg_attr(feature = "clap", value(name = "NSW"))]
    Nsw,
    #[cfg_attr(feature = "clap", value(name = "ACT"))]
    Act,
    #[cfg_attr(feature = "clap", value(name = "VIC"))]
    Vic,
    #[cfg_attr(feature = "clap", value(name = "QLD"))]
    Qld,
    #[cfg_attr(feature = "clap", value(name = "SA"))]
    Sa,
    #[cfg_attr(feature = "clap", value(name = "WA"))]
    Wa,
    #[cfg_attr(feature = "clap", value(name = "TAS"))]
    Tas,
    #[cfg_attr(feature = "clap", value(name = "NT"))]
    Nt,
}

impl State {
    pub const ALL: [State; 8] = [
        State::Nsw,
        State::Act,
        State::Vic,
        State::Qld,
        State::Sa,
        State::Wa,
        State::Tas,
        State::Nt,
    ];

    pub fn code(self) -> &'static str {
        match self {
            State::Nsw => "NSW",
            State::Act => "ACT",
            State::Vic => "VIC",
            State::Qld => "QLD",
            State::Sa => "SA",
            State::Wa => "WA",
            State::Tas => "TAS",
            State::Nt => "NT",
        }
    }
}

/// A `Y`/`N` toggle as the service spells it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum YesNo {
    #[serde(rename = "Y")]
    #[cfg_attr(feature = "clap", value(name = "Y"))]
    Yes,
    #[default]
    #[serde(rename = "N")]
    #[cfg_attr(feature = "clap", value(name = "N"))]
    No,
}

impl YesNo {
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Y",
            YesNo::No => "N",
        }
    }
}

fn toggle(value: Option<YesNo>) -> &'static str {
    value.map(YesNo::as_str).unwrap_or("")
}

fn state_code(value: Option<State>) -> &'static str {
    value.map(State::code).unwrap_or("")
}

fn count(value: Option<u32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// Shared criteria of the filter-style searches (postcode, ABN status,
/// charity, registration event, update event).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub postcode: String,
    /// Sent as a plain `state=<code>` parameter, not as per-state flags.
    pub state: Option<State>,
    pub active_abns_only: Option<YesNo>,
    pub current_gst_registration_only: Option<YesNo>,
    pub entity_type_code: String,
    pub concession_type_code: String,
}

impl FilterCriteria {
    pub(crate) fn append_to(&self, params: QueryParams) -> QueryParams {
        params
            .with("postcode", self.postcode.as_str())
            .with("state", state_code(self.state))
            .with("activeABNsOnly", toggle(self.active_abns_only))
            .with(
                "currentGSTRegistrationOnly",
                toggle(self.current_gst_registration_only),
            )
            .with("entityTypeCode", self.entity_type_code.as_str())
            .with("concessionTypeCode", self.concession_type_code.as_str())
    }
}

/// Date window and event type for registration/update event searches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventWindow {
    pub event_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl EventWindow {
    pub(crate) fn append_to(&self, params: QueryParams) -> QueryParams {
        params
            .with("eventType", self.event_type.as_str())
            .with("fromDate", self.from_date.format("%Y-%m-%d").to_string())
            .with("toDate", self.to_date.format("%Y-%m-%d").to_string())
    }
}

/// Inputs of the simple-protocol name search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NameSearch {
    pub name: String,
    pub postcode: String,
    pub legal_name: Option<YesNo>,
    pub business_name: Option<YesNo>,
    pub trading_name: Option<YesNo>,
    /// Expanded into one `Y`/`N` flag per state.
    pub state: Option<State>,
}

impl NameSearch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn append_names(&self, params: QueryParams) -> QueryParams {
        params
            .with("name", self.name.as_str())
            .with("postcode", self.postcode.as_str())
            .with("legalName", toggle(self.legal_name))
            .with("businessName", toggle(self.business_name))
            .with("tradingName", toggle(self.trading_name))
    }

    pub(crate) fn to_params(&self) -> QueryParams {
        self.append_names(QueryParams::new())
            .with_state_flags(self.state)
    }
}

/// Inputs of the advanced name search: the simple set plus scoring and
/// width controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdvancedNameSearch {
    #[serde(flatten)]
    pub base: NameSearch,
    pub search_width: String,
    /// 0..=100; unset sends an empty parameter.
    pub minimum_score: Option<u32>,
    pub max_search_results: Option<u32>,
    pub active_abns_only: Option<YesNo>,
}

impl AdvancedNameSearch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: NameSearch::new(name),
            ..Self::default()
        }
    }

    pub(crate) fn to_params(&self) -> QueryParams {
        self.base
            .append_names(QueryParams::new())
            .with("searchWidth", self.search_width.as_str())
            .with("minimumScore", count(self.minimum_score))
            .with("maxSearchResults", count(self.max_search_results))
            .with("activeABNsOnly", toggle(self.active_abns_only))
            .with_state_flags(self.base.state)
    }
}
