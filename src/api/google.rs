//! Implements the `Sheet` trait with plain HTTP calls to Google Sheets and Google Forms.

use crate::api::{FormTarget, Sheet};
use crate::{Config, Result};
use anyhow::Context;
use tracing::trace;
use url::Url;

#[derive(Debug)]
pub(super) struct GoogleSheet {
    client: reqwest::Client,
    csv_url: Url,
    form_url: String,
    log_form_url: String,
}

impl GoogleSheet {
    pub(super) fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            csv_url: config.csv_url().clone(),
            form_url: config.form_url().to_string(),
            log_form_url: config.log_form_url().to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get_csv(&mut self) -> Result<String> {
        trace!("GET {}", self.csv_url);
        let response = self
            .client
            .get(self.csv_url.clone())
            .send()
            .await
            .context("Failed to send the request for the expense sheet")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Downloading the expense sheet failed with status {status}: {body}");
        }

        response
            .text()
            .await
            .context("Failed to read the expense sheet response")
    }

    async fn post_form(&mut self, target: FormTarget, fields: &[(String, String)]) -> Result<u16> {
        let url = match target {
            FormTarget::Expense => &self.form_url,
            FormTarget::Log => &self.log_form_url,
        };
        trace!("POST {url} ({target} form, {} fields)", fields.len());
        let response = self
            .client
            .post(url.as_str())
            .form(fields)
            .send()
            .await
            .with_context(|| format!("Failed to send the {target} form"))?;
        Ok(response.status().as_u16())
    }
}
