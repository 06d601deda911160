use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, MockAbr, ABN_LIST_XML, SEARCH_RESULTS_XML};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- canned responses ---

#[tokio::test]
async fn canned_body_is_served_as_xml() {
    let mock = MockAbr::with_fixtures();
    let resp = app(mock)
        .oneshot(get(
            "/abrxmlsearchRPC/AbrXmlSearch.asmx/ABRSearchByCharity?postcode=2000&authenticationGuid=g",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml; charset=utf-8"
    );
    let body = body_bytes(resp).await;
    assert_eq!(body, ABN_LIST_XML.as_bytes());
}

#[tokio::test]
async fn canned_status_is_served() {
    let mock = MockAbr::new();
    mock.respond("ABRSearchByABNStatus", 500, "boom");
    let resp = app(mock)
        .oneshot(get("/abrxmlsearchRPC/AbrXmlSearch.asmx/ABRSearchByABNStatus"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await, "boom".as_bytes());
}

#[tokio::test]
async fn unknown_method_returns_404() {
    let resp = app(MockAbr::with_fixtures())
        .oneshot(get("/abrxmlsearchRPC/AbrXmlSearch.asmx/SearchByNothing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn path_outside_service_returns_404() {
    let resp = app(MockAbr::with_fixtures())
        .oneshot(get("/ABRSearchByABN"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- request log ---

#[tokio::test]
async fn requests_are_recorded_with_query() {
    let mock = MockAbr::with_fixtures();
    let router = app(mock.clone());

    let resp = router
        .clone()
        .oneshot(get(
            "/abrxmlsearchRPC/AbrXmlSearch.asmx/ABRSearchByNameSimpleProtocol?name=Test+Company&NSW=Y",
        ))
        .await
        .unwrap();
    assert_eq!(body_bytes(resp).await, SEARCH_RESULTS_XML.as_bytes());

    router
        .oneshot(get("/abrxmlsearchRPC/AbrXmlSearch.asmx/Missing?x=1"))
        .await
        .unwrap();

    assert_eq!(
        mock.requests(),
        vec![
            "/abrxmlsearchRPC/AbrXmlSearch.asmx/ABRSearchByNameSimpleProtocol?name=Test+Company&NSW=Y"
                .to_string(),
            "/abrxmlsearchRPC/AbrXmlSearch.asmx/Missing?x=1".to_string(),
        ]
    );
    assert_eq!(
        mock.last_request().as_deref(),
        Some("/abrxmlsearchRPC/AbrXmlSearch.asmx/Missing?x=1")
    );
}

#[tokio::test]
async fn fresh_mock_has_no_requests() {
    let mock = MockAbr::new();
    assert!(mock.requests().is_empty());
    assert!(mock.last_request().is_none());
}
