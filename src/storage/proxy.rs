//! HTTP proxy support for the S3 client

use crate::error::{Result, TaxiError};
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use hyper::client::HttpConnector;
use hyper_proxy::{Intercept, Proxy, ProxyConnector};

/// Parse a proxy URL into a URI the connector accepts
pub fn parse_proxy_uri(url: &str) -> Result<hyper::Uri> {
    let uri: hyper::Uri = url
        .trim()
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| TaxiError::proxy(url, e.to_string()))?;

    if uri.host().is_none() {
        return Err(TaxiError::proxy(url, "missing host"));
    }

    Ok(uri)
}

/// Build an SDK HTTP client that routes every request through the proxy
pub fn proxied_http_client(url: &str) -> Result<SharedHttpClient> {
    let uri = parse_proxy_uri(url)?;
    let proxy = Proxy::new(Intercept::All, uri);
    let connector = ProxyConnector::from_proxy(HttpConnector::new(), proxy)
        .map_err(|e| TaxiError::proxy(url, e.to_string()))?;

    tracing::debug!("Routing S3 requests through proxy {}", url);
    Ok(HyperClientBuilder::new().build(connector))
}
