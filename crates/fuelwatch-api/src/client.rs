//! Async HTTP client for the fuel price reporting API.

use std::time::Duration;

use fuelwatch_core::record::{Brand, Dataset, FuelType, PriceRecord, Site};
use reqwest::{
  Client,
  header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::info;

use crate::{Error, Result, wire};

/// Where to fetch from, and which region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub subscriber_url: String,
  pub price_url:      String,
  pub country_id:     i64,
  pub region_level:   i64,
  pub region_id:      i64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      subscriber_url: "https://fppdirectapi-prod.fuelpricesqld.com.au/Subscriber".into(),
      price_url:      "https://fppdirectapi-prod.fuelpricesqld.com.au/Price".into(),
      country_id:     21,
      region_level:   2,
      region_id:      16,
    }
  }
}

/// Client for one region of the fuel price API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct FuelApiClient {
  client: Client,
  config: ApiConfig,
  auth:   String,
}

impl FuelApiClient {
  pub fn new(config: ApiConfig, token: &str) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      config,
      auth: format!("FPDAPI SubscriberToken={token}"),
    })
  }

  fn region_query(&self) -> [(&'static str, i64); 3] {
    [
      ("countryId", self.config.country_id),
      ("geoRegionLevel", self.config.region_level),
      ("geoRegionId", self.config.region_id),
    ]
  }

  async fn get<T: DeserializeOwned>(
    &self,
    base: &str,
    endpoint: &'static str,
    query: &[(&'static str, i64)],
  ) -> Result<T> {
    let url = format!("{}/{endpoint}", base.trim_end_matches('/'));
    let resp = self
      .client
      .get(url)
      .header(AUTHORIZATION, &self.auth)
      .header(CONTENT_TYPE, "application/json")
      .query(query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { endpoint, status });
    }
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }

  // ── Dimensions ────────────────────────────────────────────────────────────

  /// `GET {subscriber}/GetCountryBrands?countryId=…`
  pub async fn fetch_brands(&self) -> Result<Vec<Brand>> {
    let resp = self
      .get(
        &self.config.subscriber_url,
        "GetCountryBrands",
        &[("countryId", self.config.country_id)],
      )
      .await?;
    Ok(wire::brands(resp))
  }

  /// `GET {subscriber}/GetCountryFuelTypes?countryId=…`
  pub async fn fetch_fuel_types(&self) -> Result<Vec<FuelType>> {
    let resp = self
      .get(
        &self.config.subscriber_url,
        "GetCountryFuelTypes",
        &[("countryId", self.config.country_id)],
      )
      .await?;
    Ok(wire::fuel_types(resp))
  }

  /// `GET {subscriber}/GetFullSiteDetails` for the configured region.
  pub async fn fetch_sites(&self) -> Result<Vec<Site>> {
    let resp = self
      .get(
        &self.config.subscriber_url,
        "GetFullSiteDetails",
        &self.region_query(),
      )
      .await?;
    Ok(wire::sites(resp))
  }

  // ── Prices ────────────────────────────────────────────────────────────────

  /// `GET {price}/GetSitesPrices` for the configured region.
  pub async fn fetch_prices(&self) -> Result<Vec<PriceRecord>> {
    let resp = self
      .get(&self.config.price_url, "GetSitesPrices", &self.region_query())
      .await?;
    Ok(wire::prices(resp))
  }

  /// Fetch all four result sets, one request after another.
  pub async fn fetch_all(&self) -> Result<Dataset> {
    let dataset = Dataset {
      brands:     self.fetch_brands().await?,
      fuel_types: self.fetch_fuel_types().await?,
      sites:      self.fetch_sites().await?,
      prices:     self.fetch_prices().await?,
    };
    info!(counts = %dataset.counts(), "fetched from fuel price API");
    Ok(dataset)
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server, ServerGuard};
  use serde_json::json;

  use super::*;

  const AUTH: &str = "FPDAPI SubscriberToken=test_token";

  fn client_for(server: &ServerGuard) -> FuelApiClient {
    let config = ApiConfig {
      subscriber_url: format!("{}/Subscriber", server.url()),
      price_url: format!("{}/Price", server.url()),
      ..ApiConfig::default()
    };
    FuelApiClient::new(config, "test_token").unwrap()
  }

  fn region() -> Matcher {
    Matcher::AllOf(vec![
      Matcher::UrlEncoded("countryId".into(), "21".into()),
      Matcher::UrlEncoded("geoRegionLevel".into(), "2".into()),
      Matcher::UrlEncoded("geoRegionId".into(), "16".into()),
    ])
  }

  #[tokio::test]
  async fn test_fetch_prices() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/Price/GetSitesPrices")
      .match_header("authorization", AUTH)
      .match_query(region())
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        json!({
          "SitePrices": [
            { "SiteId": 10, "FuelId": 2, "CollectionMethod": "T",
              "TransactionDateUtc": "2024-01-01T00:00:00", "Price": 1500.0 }
          ]
        })
        .to_string(),
      )
      .create_async()
      .await;

    let prices = client_for(&server).fetch_prices().await.unwrap();

    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].price, 1.5);
    assert_eq!(
      prices[0].transaction_date.to_rfc3339(),
      "2024-01-01T10:00:00+10:00"
    );
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_fetch_brands_sends_country_only() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/Subscriber/GetCountryBrands")
      .match_header("authorization", AUTH)
      .match_query(Matcher::UrlEncoded("countryId".into(), "21".into()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(json!({ "Brands": [{ "BrandId": 5, "Name": "Caltex" }] }).to_string())
      .create_async()
      .await;

    let brands = client_for(&server).fetch_brands().await.unwrap();

    assert_eq!(brands, vec![Brand { brand_id: 5, name: Some("Caltex".into()) }]);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_non_success_status_fails() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/Subscriber/GetFullSiteDetails")
      .match_query(region())
      .with_status(401)
      .create_async()
      .await;

    let err = client_for(&server).fetch_sites().await.unwrap_err();

    assert!(matches!(
      err,
      Error::Status { endpoint: "GetFullSiteDetails", status } if status.as_u16() == 401
    ));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_missing_envelope_is_json_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/Subscriber/GetCountryFuelTypes")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(json!({ "Brands": [] }).to_string())
      .create_async()
      .await;

    let err = client_for(&server).fetch_fuel_types().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
  }

  #[tokio::test]
  async fn test_fetch_all() {
    let mut server = Server::new_async().await;
    let brands = server
      .mock("GET", "/Subscriber/GetCountryBrands")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(json!({ "Brands": [{ "BrandId": 1, "Name": "Shell" }] }).to_string())
      .create_async()
      .await;
    let fuels = server
      .mock("GET", "/Subscriber/GetCountryFuelTypes")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(
        json!({ "Fuels": [{ "FuelId": 2, "Name": "Unleaded" }, { "FuelId": 3, "Name": "Diesel" }] })
          .to_string(),
      )
      .create_async()
      .await;
    let sites = server
      .mock("GET", "/Subscriber/GetFullSiteDetails")
      .match_query(region())
      .with_status(200)
      .with_body(json!({ "S": [{ "S": 10, "B": 1, "N": "Cairns North" }] }).to_string())
      .create_async()
      .await;
    let prices = server
      .mock("GET", "/Price/GetSitesPrices")
      .match_query(region())
      .with_status(200)
      .with_body(
        json!({ "SitePrices": [
          { "SiteId": 10, "FuelId": 2, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1859 },
          { "SiteId": 10, "FuelId": 3, "TransactionDateUtc": "2024-01-01T00:00:00Z", "Price": 1999 }
        ]})
        .to_string(),
      )
      .create_async()
      .await;

    let dataset = client_for(&server).fetch_all().await.unwrap();

    assert_eq!(dataset.counts().to_string(), "brands=1 fuels=2 sites=1 prices=2");
    for mock in [brands, fuels, sites, prices] {
      mock.assert_async().await;
    }
  }
}
