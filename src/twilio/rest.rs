use crate::phone::mask_phone_number;
use crate::twilio::{Account, AccountResource, NewCall, NewMessage, Resource, TwilioApi};
use crate::{Error, LIB_LOG_TARGET};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Base URL of the public Twilio REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
const API_VERSION: &str = "2010-04-01";

/// [`TwilioApi`] implementation over the Twilio REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl RestClient {
    /// Create a new `RestClient` talking to [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new `RestClient` talking to another host, such as a test server.
    pub fn with_base_url<S: AsRef<str>>(base_url: S) -> Result<Self, Error> {
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Return the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn account_url(&self, account: &Account, resource: &str) -> String {
        format!("{}/{}/Accounts/{}{}", self.base_url, API_VERSION, account.sid(), resource)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        account: &Account,
        url: String,
        form: &[(&str, &str)],
    ) -> Result<T, Error> {
        let response = self
            .client
            .post(url)
            .basic_auth(account.sid(), Some(account.auth_token()))
            .form(form)
            .send()
            .await?;
        read_response(response).await
    }
}

#[async_trait]
impl TwilioApi for RestClient {
    async fn create_message(&self, account: &Account, message: &NewMessage) -> Result<Resource, Error> {
        debug!(target: LIB_LOG_TARGET, "Creating Twilio message to {}", mask_phone_number(message.to()));
        let form = [("To", message.to()), ("From", message.from()), ("Body", message.body())];
        self.post_form(account, self.account_url(account, "/Messages.json"), &form).await
    }

    async fn create_call(&self, account: &Account, call: &NewCall) -> Result<Resource, Error> {
        debug!(target: LIB_LOG_TARGET, "Creating Twilio call to {}", mask_phone_number(call.to()));
        let form = [("To", call.to()), ("From", call.from()), ("Url", call.url())];
        self.post_form(account, self.account_url(account, "/Calls.json"), &form).await
    }

    async fn fetch_account(&self, account: &Account) -> Result<AccountResource, Error> {
        let response = self
            .client
            .get(self.account_url(account, ".json"))
            .basic_auth(account.sid(), Some(account.auth_token()))
            .send()
            .await?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    debug!(target: LIB_LOG_TARGET, "Twilio Response - status: {} url: {}", status, response.url());
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    let error = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => Error::TwilioApi { status: status.as_u16(), code: body.code, message: body.message },
        Err(_) => Error::TwilioApi { status: status.as_u16(), code: None, message: text },
    };
    warn!(target: LIB_LOG_TARGET, "{}", error);
    Err(error)
}
