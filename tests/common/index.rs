//! Mock package index

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A file served by the mock index
pub struct IndexFile {
    pub filename: &'static str,
    pub packagetype: &'static str,
    pub body: Vec<u8>,
}

/// Serve metadata for `package` (latest when `version` is None) and its files
///
/// Metadata expects exactly `hits` requests; each file is served at most once.
pub async fn mount_release(
    server: &MockServer,
    package: &str,
    version: Option<&str>,
    files: Vec<IndexFile>,
    hits: u64,
) {
    let urls: Vec<serde_json::Value> = files
        .iter()
        .map(|f| {
            serde_json::json!({
                "filename": f.filename,
                "packagetype": f.packagetype,
                "url": format!("{}/files/{}", server.uri(), f.filename),
            })
        })
        .collect();
    let body = serde_json::json!({
        "info": {"name": package, "version": version.unwrap_or("latest")},
        "urls": urls,
    });

    let route = match version {
        Some(version) => format!("/pypi/{package}/{version}/json"),
        None => format!("/pypi/{package}/json"),
    };
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(hits)
        .mount(server)
        .await;

    for file in files {
        Mock::given(method("GET"))
            .and(path(format!("/files/{}", file.filename)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(file.body))
            .expect(..=1)
            .mount(server)
            .await;
    }
}

/// Base URL of the mock index
pub fn index_url(server: &MockServer) -> String {
    format!("{}/pypi", server.uri())
}
