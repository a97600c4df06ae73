//! IP geolocation providers.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use netwatch_core::{GeoFragment, SourceAdapter, SourceError, SourceResult};
use serde::Deserialize;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{as_label, present};
use crate::config::ProviderConfig;
use crate::transport::{endpoint, HttpTransport};

const IP_API_FIELDS: &str = "status,message,country,city,lat,lon,isp,org,as,asname";

/// ip-api.com, the preferred geolocation source.
///
/// The free tier allows 45 requests per minute; once the local quota is
/// spent the adapter reports `Unavailable` without calling out.
pub struct IpApi {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl IpApi {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        let per_minute = NonZeroU32::new(config.ip_api_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            transport,
            base_url: config.endpoints.ip_api.clone(),
            timeout: config.timeouts.geo(),
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    country: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    as_label: Option<String>,
}

#[async_trait]
impl SourceAdapter<Ipv4Addr> for IpApi {
    type Fragment = GeoFragment;

    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    #[instrument(skip(self), fields(provider = "ip-api.com"))]
    async fn fetch(&self, ip: &Ipv4Addr) -> SourceResult<GeoFragment> {
        if self.limiter.check().is_err() {
            debug!("ip-api.com quota exhausted");
            return Err(SourceError::unavailable(self.name(), "rate limit exhausted"));
        }

        let url = endpoint(self.name(), &self.base_url, &["json", ip.to_string().as_str()])?;
        let request = self.transport.get(url).query(&[("fields", IP_API_FIELDS)]);
        let data: IpApiResponse = self.transport.json(self.name(), request, self.timeout).await?;

        if data.status == "fail" {
            return Err(SourceError::unavailable(
                self.name(),
                data.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        Ok(GeoFragment {
            city: present(data.city),
            country: present(data.country),
            latitude: data.lat,
            longitude: data.lon,
            isp: present(data.isp),
            org: present(data.org),
            asn: present(data.as_label),
            source: self.name(),
        })
    }
}

/// ipapi.co, first geolocation fallback
pub struct IpApiCo {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl IpApiCo {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.ipapi_co.clone(),
            timeout: config.timeouts.geo(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiCoResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    city: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    org: Option<String>,
    #[serde(default)]
    asn: Value,
}

#[async_trait]
impl SourceAdapter<Ipv4Addr> for IpApiCo {
    type Fragment = GeoFragment;

    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    #[instrument(skip(self), fields(provider = "ipapi.co"))]
    async fn fetch(&self, ip: &Ipv4Addr) -> SourceResult<GeoFragment> {
        let url = endpoint(self.name(), &self.base_url, &[ip.to_string().as_str(), "json", ""])?;
        let data: IpApiCoResponse = self
            .transport
            .json(self.name(), self.transport.get(url), self.timeout)
            .await?;

        if data.error {
            return Err(SourceError::unavailable(
                self.name(),
                data.reason.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        let org = present(data.org);
        Ok(GeoFragment {
            city: present(data.city),
            country: present(data.country_name),
            latitude: data.latitude,
            longitude: data.longitude,
            isp: org.clone(),
            asn: as_label(&data.asn, org.as_deref()),
            org,
            source: self.name(),
        })
    }
}

/// ipwhois.app, last geolocation fallback
pub struct IpWhois {
    transport: HttpTransport,
    base_url: String,
    timeout: Duration,
}

impl IpWhois {
    pub fn new(transport: HttpTransport, config: &ProviderConfig) -> Self {
        Self {
            transport,
            base_url: config.endpoints.ipwhois.clone(),
            timeout: config.timeouts.geo(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpWhoisResponse {
    #[serde(default)]
    success: bool,
    city: Option<String>,
    country: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(default)]
    asn: Value,
}

#[async_trait]
impl SourceAdapter<Ipv4Addr> for IpWhois {
    type Fragment = GeoFragment;

    fn name(&self) -> &'static str {
        "ipwhois.app"
    }

    #[instrument(skip(self), fields(provider = "ipwhois.app"))]
    async fn fetch(&self, ip: &Ipv4Addr) -> SourceResult<GeoFragment> {
        let url = endpoint(self.name(), &self.base_url, &["json", ip.to_string().as_str()])?;
        let data: IpWhoisResponse = self
            .transport
            .json(self.name(), self.transport.get(url), self.timeout)
            .await?;

        if !data.success {
            return Err(SourceError::unavailable(self.name(), "lookup failed"));
        }

        let org = present(data.org);
        Ok(GeoFragment {
            city: present(data.city),
            country: present(data.country),
            latitude: data.latitude,
            longitude: data.longitude,
            isp: present(data.isp),
            asn: as_label(&data.asn, org.as_deref()),
            org,
            source: self.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GOOGLE_DNS: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    fn config_for(server: &MockServer) -> ProviderConfig {
        let mut config = ProviderConfig::default();
        config.endpoints.ip_api = server.uri();
        config.endpoints.ipapi_co = server.uri();
        config.endpoints.ipwhois = server.uri();
        config
    }

    fn transport() -> HttpTransport {
        HttpTransport::new("netwatch-test").unwrap()
    }

    #[tokio::test]
    async fn ip_api_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/8.8.8.8"))
            .and(query_param("fields", IP_API_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "country": "United States",
                "city": "Mountain View",
                "lat": 37.4056,
                "lon": -122.0775,
                "isp": "Google LLC",
                "org": "Google Public DNS",
                "as": "AS15169 Google LLC"
            })))
            .mount(&server)
            .await;

        let adapter = IpApi::new(transport(), &config_for(&server));
        let geo = adapter.fetch(&GOOGLE_DNS).await.unwrap();
        assert_eq!(geo.city.as_deref(), Some("Mountain View"));
        assert_eq!(geo.asn.as_deref(), Some("AS15169 Google LLC"));
        assert_eq!(geo.coordinates(), Some((37.4056, -122.0775)));
        assert_eq!(geo.source, "ip-api.com");
    }

    #[tokio::test]
    async fn ip_api_fail_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "fail",
                "message": "reserved range"
            })))
            .mount(&server)
            .await;

        let adapter = IpApi::new(transport(), &config_for(&server));
        let err = adapter.fetch(&GOOGLE_DNS).await.unwrap_err();
        assert_eq!(err, SourceError::unavailable("ip-api.com", "reserved range"));
    }

    #[tokio::test]
    async fn ip_api_quota_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.ip_api_per_minute = 1;
        let adapter = IpApi::new(transport(), &config);

        assert!(adapter.fetch(&GOOGLE_DNS).await.is_ok());
        let err = adapter.fetch(&GOOGLE_DNS).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn ipapi_co_builds_as_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": "Sydney",
                "country_name": "Australia",
                "latitude": -33.86,
                "longitude": 151.2,
                "org": "Cloudflare, Inc.",
                "asn": "AS13335"
            })))
            .mount(&server)
            .await;

        let adapter = IpApiCo::new(transport(), &config_for(&server));
        let geo = adapter.fetch(&Ipv4Addr::new(1, 1, 1, 1)).await.unwrap();
        assert_eq!(geo.asn.as_deref(), Some("AS13335 Cloudflare, Inc."));
        assert_eq!(geo.isp.as_deref(), Some("Cloudflare, Inc."));
        assert_eq!(geo.country.as_deref(), Some("Australia"));
    }

    #[tokio::test]
    async fn ipapi_co_error_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .mount(&server)
            .await;

        let adapter = IpApiCo::new(transport(), &config_for(&server));
        let err = adapter.fetch(&GOOGLE_DNS).await.unwrap_err();
        assert_eq!(err, SourceError::unavailable("ipapi.co", "RateLimited"));
    }

    #[tokio::test]
    async fn ipwhois_sparse_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/8.8.8.8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "country": "United States",
                "isp": ""
            })))
            .mount(&server)
            .await;

        let adapter = IpWhois::new(transport(), &config_for(&server));
        let geo = adapter.fetch(&GOOGLE_DNS).await.unwrap();
        assert_eq!(geo.country.as_deref(), Some("United States"));
        assert_eq!(geo.city, None);
        assert_eq!(geo.isp, None);
        assert_eq!(geo.asn, None);
    }

    #[tokio::test]
    async fn ipwhois_missing_success_flag_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "invalid"})))
            .mount(&server)
            .await;

        let adapter = IpWhois::new(transport(), &config_for(&server));
        assert!(adapter.fetch(&GOOGLE_DNS).await.unwrap_err().is_unavailable());
    }
}
