//! In-memory fakes for the completion and page-fetch boundaries.

use async_trait::async_trait;
use persona_chat_ai::{LlmBackend, LlmError, LlmProvider, LlmRequest, LlmResponse};
use persona_chat_core::Result;
use persona_chat_listing::{FetchError, ListingRecord, PageFetcher};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays scripted results and records every request.
pub struct FakeBackend {
    script: Mutex<VecDeque<std::result::Result<String, LlmError>>>,
    fallback: std::result::Result<String, LlmError>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::scripted(Vec::new(), Ok(text.to_string()))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Self::scripted(Vec::new(), Err(error))
    }

    pub fn scripted(
        script: Vec<std::result::Result<String, LlmError>>,
        fallback: std::result::Result<String, LlmError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl LlmBackend for FakeBackend {
    async fn generate(
        &self,
        request: &LlmRequest,
    ) -> std::result::Result<LlmResponse, LlmError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let next = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        next.map(|content| LlmResponse::text(&request.model, content))
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAiCompatible
    }
}

/// Serves one fixed record, or fails, and counts calls.
pub struct FakeFetcher {
    record: Option<ListingRecord>,
    calls: Mutex<usize>,
}

impl FakeFetcher {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            record: None,
            calls: Mutex::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::empty()
    }

    pub fn with(record: ListingRecord) -> Arc<Self> {
        Arc::new(Self {
            record: Some(record),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls lock")
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<ListingRecord, FetchError> {
        *self.calls.lock().expect("calls lock") += 1;
        match &self.record {
            Some(record) => Ok(record.clone()),
            None => Err(FetchError::Timeout {
                url: url.to_string(),
            }
            .into()),
        }
    }
}
