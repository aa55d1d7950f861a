use anyhow::anyhow;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::CoreError;

pub mod models;

use models::{RiotMatch, RiotSummoner};

/// Describes the API the system uses to pull match results from the game.
///
/// While we are using this for the Riot match endpoints, the statistics
/// import path only depends on this trait, so any provider that can produce
/// a match payload works.
#[allow(async_fn_in_trait)]
pub trait GameApi {
    /// The error type that the API can return. You can usually just use CoreError.
    type Error;

    /// Creates a new instance of the API with the given token.
    fn new(token: &str) -> Self;

    /// Retrieves a finished match with all participant statistics.
    async fn get_match(&self, match_id: &str) -> Result<ApiResult<RiotMatch>, Self::Error>;

    /// Resolves a summoner name to the id of their most recent match.
    async fn get_latest_match_id(
        &self,
        summoner_name: &str,
    ) -> Result<ApiResult<String>, Self::Error>;
}

/// Wrapper for the result of an API call.
pub enum ApiResult<M> {
    Ok(M),
    NotFound,
    Maintenance,
}

impl<M> ApiResult<M>
where
    M: DeserializeOwned,
{
    /// Create an API result from a response.
    ///
    /// A 200 becomes `Ok` with the deserialized body; 404 and 503 map to the
    /// `NotFound` and `Maintenance` variants the import path knows how to
    /// handle. Anything else is an error.
    pub async fn from_response(response: Response) -> Result<Self, CoreError> {
        match response.status() {
            StatusCode::OK => Ok(ApiResult::Ok(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(ApiResult::NotFound),
            StatusCode::SERVICE_UNAVAILABLE => Ok(ApiResult::Maintenance),
            _ => Err(anyhow!(
                "Request failed with status code: {}\n\nResponse details: {:#?}",
                response.status(),
                response
            )),
        }
    }
}

/// The API endpoint to retrieve resources from.
#[derive(Debug)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    fn new(url: String) -> Self {
        Self { url }
    }

    /// Append a path to retrieve a specific resource from the endpoint, e.g.
    /// pass in format!("lol/match/v5/matches/{}", match_id) to get a
    /// specific match. Refer to the API documentation for the exact path.
    fn append_path(&self, path: &str) -> String {
        let mut full_url = self.url.clone();

        full_url.push_str(path);

        full_url
    }
}

/// The Riot Games API.
#[derive(Debug)]
pub struct RiotApi {
    /// The API token used to authenticate with the Riot API. You can get
    /// your own from the [Riot developer portal](https://developer.riotgames.com/).
    token: String,
    /// The reqwest client used to make HTTP requests to the Riot API.
    client: Client,
    /// The region-scoped API endpoint to request resources from.
    endpoint: Endpoint,
}

impl RiotApi {
    /// Builds a client from `RIOT_API_TOKEN` and the optional `RIOT_REGION`
    /// environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        #[cfg(debug_assertions)]
        dotenv::dotenv().ok();

        let token = std::env::var("RIOT_API_TOKEN")
            .map_err(|_| anyhow!("RIOT_API_TOKEN environment variable not found"))?;

        Ok(Self::new(&token))
    }

    async fn get(&self, path: &str) -> Result<Response, CoreError> {
        let response = self
            .client
            .get(self.endpoint.append_path(path))
            .header("X-Riot-Token", &self.token)
            .send()
            .await?;

        Ok(response)
    }
}

impl GameApi for RiotApi {
    type Error = CoreError;

    /// Create a new API client.
    fn new(token: &str) -> Self {
        let region = std::env::var("RIOT_REGION").unwrap_or_else(|_| "la2".to_string());

        Self {
            token: token.to_string(),
            client: Client::new(),
            endpoint: Endpoint::new(format!("https://{region}.api.riotgames.com/")),
        }
    }

    /// Get the full participant statistics of a finished match.
    async fn get_match(&self, match_id: &str) -> Result<ApiResult<RiotMatch>, Self::Error> {
        let response = self
            .get(&format!("lol/match/v5/matches/{match_id}"))
            .await?;

        ApiResult::from_response(response).await
    }

    /// Look up a summoner's most recent match id. Summoners without any
    /// recent matches come back as `NotFound`.
    async fn get_latest_match_id(
        &self,
        summoner_name: &str,
    ) -> Result<ApiResult<String>, Self::Error> {
        let response = self
            .get(&format!(
                "lol/summoner/v4/summoners/by-name/{}",
                urlencoding::encode(summoner_name)
            ))
            .await?;

        let summoner = match ApiResult::<RiotSummoner>::from_response(response).await? {
            ApiResult::Ok(summoner) => summoner,
            ApiResult::NotFound => return Ok(ApiResult::NotFound),
            ApiResult::Maintenance => return Ok(ApiResult::Maintenance),
        };

        let response = self
            .get(&format!(
                "lol/match/v5/matches/by-puuid/{}/ids?start=0&count=20",
                summoner.puuid
            ))
            .await?;

        match ApiResult::<Vec<String>>::from_response(response).await? {
            ApiResult::Ok(ids) => match ids.into_iter().next() {
                Some(id) => Ok(ApiResult::Ok(id)),
                None => Ok(ApiResult::NotFound),
            },
            ApiResult::NotFound => Ok(ApiResult::NotFound),
            ApiResult::Maintenance => Ok(ApiResult::Maintenance),
        }
    }
}
