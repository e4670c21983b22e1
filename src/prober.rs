use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::EnumError;

/// HTTP liveness check for a name that already resolved.
pub trait Probe {
    fn probe(&self, name: &str) -> impl Future<Output = Option<u16>> + Send;
}

/// Plaintext `GET http://{name}/`, reporting the final status code.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, EnumError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()?;
        Ok(Self { client })
    }
}

fn probe_url(name: &str) -> String {
    format!("http://{}/", name)
}

impl Probe for HttpProber {
    async fn probe(&self, name: &str) -> Option<u16> {
        match self.client.get(probe_url(name)).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                debug!("HTTP probe of {} failed: {}", name, e);
                None
            }
        }
    }
}
