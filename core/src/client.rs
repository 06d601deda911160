//! Request builder, response parser and blocking facade for the search API.
//!
//! # Design
//! `AbnLookupClient` holds the base URL, the authentication GUID and the
//! debug flag, none of which change after construction. Each search is
//! split into a `build_*` method that produces an `HttpRequest` and the
//! shared `parse` method that turns an `HttpResponse` into `Records`. The
//! `search_*` methods glue the two together through a `Transport`, one round
//! trip per call.

use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::QueryParams;
use crate::records::{records_for, Records};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AdvancedNameSearch, EventWindow, FilterCriteria, NameSearch, YesNo};
use crate::xml;

const AUTH_PARAM: &str = "authenticationGuid";

/// Synchronous client for the ABN Lookup XML search service.
#[derive(Clone)]
pub struct AbnLookupClient<T = UreqTransport> {
    base: Url,
    authentication_guid: String,
    debug: bool,
    transport: T,
}

impl AbnLookupClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> AbnLookupClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let mut base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url));
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            authentication_guid: config.authentication_guid,
            debug: config.debug,
            transport,
        })
    }

    /// Attach the GUID and lay the parameters onto the endpoint URL.
    fn request(&self, endpoint: Endpoint, mut params: QueryParams) -> HttpRequest {
        params.set(AUTH_PARAM, self.authentication_guid.as_str());

        let mut url = self.base.clone();
        let path = format!("{}/{}", self.base.path().trim_end_matches('/'), endpoint.method());
        url.set_path(&path);
        url.query_pairs_mut().extend_pairs(params.iter());

        HttpRequest {
            url: url.into(),
            headers: vec![("accept".to_string(), "text/xml".to_string())],
        }
    }

    // -- exact lookups -------------------------------------------------------

    pub fn build_search_by_abn(&self, abn: &str, include_historical_details: YesNo) -> HttpRequest {
        let params = QueryParams::new()
            .with("searchString", abn)
            .with("includeHistoricalDetails", include_historical_details.as_str());
        self.request(Endpoint::SearchByAbn, params)
    }

    /// `asic` is an ACN, ARBN, ARSN or ARFN.
    pub fn build_search_by_asic(&self, asic: &str, include_historical_details: YesNo) -> HttpRequest {
        let params = QueryParams::new()
            .with("searchString", asic)
            .with("includeHistoricalDetails", include_historical_details.as_str());
        self.request(Endpoint::SearchByAsic, params)
    }

    // -- name searches -------------------------------------------------------

    pub fn build_search_by_name(&self, search: &NameSearch) -> HttpRequest {
        self.request(Endpoint::SearchByName, search.to_params())
    }

    pub fn build_search_by_name_advanced(&self, search: &AdvancedNameSearch) -> HttpRequest {
        self.request(Endpoint::SearchByNameAdvanced, search.to_params())
    }

    // -- filter searches -----------------------------------------------------

    /// `postcode` replaces whatever `filters.postcode` holds.
    pub fn build_search_by_postcode(&self, postcode: &str, filters: &FilterCriteria) -> HttpRequest {
        let mut params = filters.append_to(QueryParams::new());
        params.set("postcode", postcode);
        self.request(Endpoint::SearchByPostcode, params)
    }

    pub fn build_search_by_abn_status(
        &self,
        entity_status_code: &str,
        filters: &FilterCriteria,
    ) -> HttpRequest {
        let params = QueryParams::new().with("entityStatusCode", entity_status_code);
        self.request(Endpoint::SearchByAbnStatus, filters.append_to(params))
    }

    pub fn build_search_by_charity(&self, filters: &FilterCriteria) -> HttpRequest {
        self.request(Endpoint::SearchByCharity, filters.append_to(QueryParams::new()))
    }

    pub fn build_search_by_registration_event(
        &self,
        window: &EventWindow,
        filters: &FilterCriteria,
    ) -> HttpRequest {
        let params = filters.append_to(window.append_to(QueryParams::new()));
        self.request(Endpoint::SearchByRegistrationEvent, params)
    }

    pub fn build_search_by_update_event(
        &self,
        window: &EventWindow,
        filters: &FilterCriteria,
    ) -> HttpRequest {
        let params = filters.append_to(window.append_to(QueryParams::new()));
        self.request(Endpoint::SearchByUpdateEvent, params)
    }

    // -- responses -----------------------------------------------------------

    /// Check the status, decode the body and locate the endpoint's records.
    pub fn parse(&self, endpoint: Endpoint, response: HttpResponse) -> Result<Records, ApiError> {
        check_status(&response)?;
        let document = xml::decode(&response.body)?;
        Ok(records_for(endpoint.shape(), document))
    }

    fn send(&self, endpoint: Endpoint, request: HttpRequest) -> Result<Records, ApiError> {
        if self.debug {
            debug!(%endpoint, url = %redacted(&request.url), "sending request");
        }
        let response = self.transport.execute(&request)?;
        if self.debug {
            debug!(
                %endpoint,
                status = response.status,
                bytes = response.body.len(),
                "received response"
            );
        }
        self.parse(endpoint, response)
    }

    // -- round trips ---------------------------------------------------------

    /// Exact lookup by ABN. Yields the whole decoded document as one record.
    pub fn search_by_abn(&self, abn: &str, include_historical_details: YesNo) -> Result<Records, ApiError> {
        let request = self.build_search_by_abn(abn, include_historical_details);
        self.send(Endpoint::SearchByAbn, request)
    }

    /// Exact lookup by ASIC number. Yields the whole decoded document as one
    /// record.
    pub fn search_by_asic(&self, asic: &str, include_historical_details: YesNo) -> Result<Records, ApiError> {
        let request = self.build_search_by_asic(asic, include_historical_details);
        self.send(Endpoint::SearchByAsic, request)
    }

    pub fn search_by_name(&self, search: &NameSearch) -> Result<Records, ApiError> {
        self.send(Endpoint::SearchByName, self.build_search_by_name(search))
    }

    pub fn search_by_name_advanced(&self, search: &AdvancedNameSearch) -> Result<Records, ApiError> {
        self.send(
            Endpoint::SearchByNameAdvanced,
            self.build_search_by_name_advanced(search),
        )
    }

    pub fn search_by_postcode(&self, postcode: &str, filters: &FilterCriteria) -> Result<Records, ApiError> {
        self.send(
            Endpoint::SearchByPostcode,
            self.build_search_by_postcode(postcode, filters),
        )
    }

    pub fn search_by_abn_status(
        &self,
        entity_status_code: &str,
        filters: &FilterCriteria,
    ) -> Result<Records, ApiError> {
        self.send(
            Endpoint::SearchByAbnStatus,
            self.build_search_by_abn_status(entity_status_code, filters),
        )
    }

    pub fn search_by_charity(&self, filters: &FilterCriteria) -> Result<Records, ApiError> {
        self.send(Endpoint::SearchByCharity, self.build_search_by_charity(filters))
    }

    pub fn search_by_registration_event(
        &self,
        window: &EventWindow,
        filters: &FilterCriteria,
    ) -> Result<Records, ApiError> {
        self.send(
            Endpoint::SearchByRegistrationEvent,
            self.build_search_by_registration_event(window, filters),
        )
    }

    pub fn search_by_update_event(
        &self,
        window: &EventWindow,
        filters: &FilterCriteria,
    ) -> Result<Records, ApiError> {
        self.send(
            Endpoint::SearchByUpdateEvent,
            self.build_search_by_update_event(window, filters),
        )
    }
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

/// The request URL with the GUID masked, for logs.
fn redacted(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == AUTH_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.into()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::types::State;

    const GUID: &str = "test-guid-12345";

    /// Serves one canned response and remembers every request.
    struct FakeTransport {
        status: u16,
        body: String,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last_url(&self) -> String {
            self.seen.borrow().last().map(|r| r.url.clone()).unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    fn client_with(transport: &FakeTransport) -> AbnLookupClient<&FakeTransport> {
        AbnLookupClient::with_transport(
            ClientConfig::new(GUID).with_base_url("http://localhost:3000/asmx"),
            transport,
        )
        .unwrap()
    }

    fn client() -> AbnLookupClient<UreqTransport> {
        AbnLookupClient::new(ClientConfig::new(GUID).with_base_url("http://localhost:3000/asmx")).unwrap()
    }

    fn query(request: &HttpRequest) -> Vec<(String, String)> {
        Url::parse(&request.url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn window() -> EventWindow {
        EventWindow {
            event_type: "GST".to_string(),
            from_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        }
    }

    fn two_records_xml() -> String {
        xml::encode(&json!({
            "ABRPayloadSearchResults": {
                "response": {
                    "searchResultsList": {
                        "searchResultsRecord": [
                            {"ABN": "51824753556", "name": "Test Company 1"},
                            {"ABN": "12345678901", "name": "Test Company 2"}
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn every_request_carries_the_guid_last() {
        let c = client();
        let filters = FilterCriteria::default();
        let requests = [
            c.build_search_by_abn("51824753556", YesNo::No),
            c.build_search_by_asic("123456789", YesNo::No),
            c.build_search_by_name(&NameSearch::new("Acme")),
            c.build_search_by_name_advanced(&AdvancedNameSearch::new("Acme")),
            c.build_search_by_postcode("2000", &filters),
            c.build_search_by_abn_status("ACT", &filters),
            c.build_search_by_charity(&filters),
            c.build_search_by_registration_event(&window(), &filters),
            c.build_search_by_update_event(&window(), &filters),
        ];
        for request in &requests {
            assert!(
                request.url.contains("authenticationGuid=test-guid-12345"),
                "{}",
                request.url
            );
            let pairs = query(request);
            assert_eq!(pairs.last().unwrap().0, "authenticationGuid");
        }
    }

    #[test]
    fn endpoint_method_is_appended_to_base_path() {
        let req = client().build_search_by_abn("51824753556", YesNo::Yes);
        assert!(req
            .url
            .starts_with("http://localhost:3000/asmx/ABRSearchByABN?searchString=51824753556"));
        assert!(req.url.contains("includeHistoricalDetails=Y"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = AbnLookupClient::new(ClientConfig::new(GUID).with_base_url("http://localhost:3000/asmx/")).unwrap();
        let req = c.build_search_by_charity(&FilterCriteria::default());
        assert!(req.url.starts_with("http://localhost:3000/asmx/ABRSearchByCharity?"));
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let err = AbnLookupClient::new(ClientConfig::new(GUID).with_base_url("not a url")).err();
        assert!(matches!(err, Some(ApiError::InvalidBaseUrl(_))));
        let err = AbnLookupClient::new(ClientConfig::new(GUID).with_base_url("mailto:x@y")).err();
        assert!(matches!(err, Some(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn name_search_expands_state_flags() {
        let search = NameSearch {
            state: Some(State::Vic),
            ..NameSearch::new("Test Company")
        };
        let req = client().build_search_by_name(&search);
        assert!(req.url.contains("name=Test+Company"));
        assert!(req.url.contains("VIC=Y"));
        for other in ["NSW", "ACT", "QLD", "SA", "WA", "TAS", "NT"] {
            assert!(req.url.contains(&format!("{other}=N")), "{other}");
        }
    }

    #[test]
    fn name_search_without_state_sends_all_no() {
        let req = client().build_search_by_name(&NameSearch::new("Acme"));
        let pairs = query(&req);
        for state in State::ALL {
            assert!(pairs.contains(&(state.code().to_string(), "N".to_string())));
        }
    }

    #[test]
    fn empty_optional_parameters_are_sent() {
        let req = client().build_search_by_charity(&FilterCriteria {
            state: Some(State::Nsw),
            ..FilterCriteria::default()
        });
        assert!(req.url.contains("postcode=&"));
        assert!(req.url.contains("state=NSW"));
    }

    #[test]
    fn postcode_argument_overrides_filter_postcode() {
        let filters = FilterCriteria {
            postcode: "3000".to_string(),
            ..FilterCriteria::default()
        };
        let pairs = query(&client().build_search_by_postcode("2000", &filters));
        let postcodes: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k == "postcode")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(postcodes, ["2000"]);
    }

    #[test]
    fn event_search_sends_window_then_filters() {
        let req = client().build_search_by_registration_event(&window(), &FilterCriteria::default());
        let keys: Vec<String> = query(&req).into_iter().map(|(k, _)| k).collect();
        assert_eq!(&keys[..4], ["eventType", "fromDate", "toDate", "postcode"]);
        assert!(req.url.contains("fromDate=2020-01-01"));
    }

    #[test]
    fn name_search_round_trip_yields_records_in_order() {
        let transport = FakeTransport::new(200, two_records_xml());
        let search = NameSearch {
            state: Some(State::Nsw),
            ..NameSearch::new("Test Company")
        };
        let records: Vec<_> = client_with(&transport).search_by_name(&search).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["ABN"], "51824753556");
        assert_eq!(records[1]["ABN"], "12345678901");
        assert!(transport.last_url().contains("NSW=Y"));
    }

    #[test]
    fn abn_lookup_yields_whole_document() {
        let body = r#"<ABRPayloadSearchResults><response><businessEntity><ABN><identifierValue>51824753556</identifierValue></ABN></businessEntity></response></ABRPayloadSearchResults>"#;
        let transport = FakeTransport::new(200, body);
        let records: Vec<_> = client_with(&transport)
            .search_by_abn("51824753556", YesNo::No)
            .unwrap()
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0]["ABRPayloadSearchResults"]["response"]["businessEntity"]["ABN"]["identifierValue"],
            "51824753556"
        );
    }

    #[test]
    fn non_success_status_is_an_error() {
        let transport = FakeTransport::new(404, "Not Found");
        let err = client_with(&transport)
            .search_by_charity(&FilterCriteria::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 404, ref body } if body == "Not Found"));
    }

    #[test]
    fn malformed_body_is_an_error() {
        let transport = FakeTransport::new(200, "<ABRPayloadSearchResults><response>");
        let err = client_with(&transport)
            .search_by_postcode("2000", &FilterCriteria::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Xml(_)));
    }

    #[test]
    fn parse_accepts_any_2xx() {
        let response = HttpResponse {
            status: 203,
            headers: Vec::new(),
            body: "<ABRPayloadSearchResults/>".to_string(),
        };
        let records = client().parse(Endpoint::SearchByCharity, response).unwrap();
        assert_eq!(records.count(), 0);
    }

    #[test]
    fn redaction_masks_only_the_guid() {
        let req = client().build_search_by_abn("51824753556", YesNo::No);
        let masked = redacted(&req.url);
        assert!(!masked.contains(GUID));
        assert!(masked.contains("authenticationGuid=***") || masked.contains("authenticationGuid=%2A%2A%2A"));
        assert!(masked.contains("searchString=51824753556"));
    }
}
