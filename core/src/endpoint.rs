//! The nine remote methods and where each one keeps its records.

use std::fmt;

/// Production base URL of the XML search service.
pub const DEFAULT_BASE_URL: &str = "https://abr.business.gov.au/abrxmlsearchRPC/AbrXmlSearch.asmx";

/// Root element of every search response.
pub const PAYLOAD_KEY: &str = "ABRPayloadSearchResults";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SearchByAbn,
    SearchByAsic,
    SearchByName,
    SearchByNameAdvanced,
    SearchByPostcode,
    SearchByAbnStatus,
    SearchByCharity,
    SearchByRegistrationEvent,
    SearchByUpdateEvent,
}

/// How records are laid out inside a decoded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Exact lookups: the whole decoded document is the one record.
    SingleEntity,
    /// Multi-result searches: records sit at
    /// `payload / response / list_key / record_key`.
    List {
        list_key: &'static str,
        record_key: &'static str,
    },
}

const SEARCH_RESULTS: ResultShape = ResultShape::List {
    list_key: "searchResultsList",
    record_key: "searchResultsRecord",
};

const ABN_LIST: ResultShape = ResultShape::List {
    list_key: "abnList",
    record_key: "abn",
};

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::SearchByAbn,
        Endpoint::SearchByAsic,
        Endpoint::SearchByName,
        Endpoint::SearchByNameAdvanced,
        Endpoint::SearchByPostcode,
        Endpoint::SearchByAbnStatus,
        Endpoint::SearchByCharity,
        Endpoint::SearchByRegistrationEvent,
        Endpoint::SearchByUpdateEvent,
    ];

    /// Method name appended to the base URL.
    pub fn method(self) -> &'static str {
        match self {
            Endpoint::SearchByAbn => "ABRSearchByABN",
            Endpoint::SearchByAsic => "ABRSearchByASIC",
            Endpoint::SearchByName => "ABRSearchByNameSimpleProtocol",
            Endpoint::SearchByNameAdvanced => "ABRSearchByNameAdvancedSimpleProtocol",
            Endpoint::SearchByPostcode => "ABRSearchByPostcode",
            Endpoint::SearchByAbnStatus => "ABRSearchByABNStatus",
            Endpoint::SearchByCharity => "ABRSearchByCharity",
            Endpoint::SearchByRegistrationEvent => "ABRSearchByRegistrationEvent",
            Endpoint::SearchByUpdateEvent => "ABRSearchByUpdateEvent",
        }
    }

    pub fn from_method(method: &str) -> Option<Endpoint> {
        Endpoint::ALL.into_iter().find(|e| e.method() == method)
    }

    pub fn shape(self) -> ResultShape {
        match self {
            Endpoint::SearchByAbn | Endpoint::SearchByAsic => ResultShape::SingleEntity,
            Endpoint::SearchByName | Endpoint::SearchByNameAdvanced => SEARCH_RESULTS,
            Endpoint::SearchByPostcode
            | Endpoint::SearchByAbnStatus
            | Endpoint::SearchByCharity
            | Endpoint::SearchByRegistrationEvent
            | Endpoint::SearchByUpdateEvent => ABN_LIST,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}
