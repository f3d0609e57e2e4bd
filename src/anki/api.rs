use std::collections::HashMap;

use log::{
    debug,
    warn,
};
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub value: String,
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: u64,
    #[serde(default)]
    pub fields: HashMap<String, Field>,
}

impl Note {
    /// Value of the first listed field that exists on this note and is not blank.
    pub fn first_field<'a>(&'a self, names: &[String]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|name| self.fields.get(name))
            .map(|field| field.value.as_str())
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn unwrap_result(self) -> Option<T> {
        if let Some(error) = &self.error {
            warn!("AnkiConnect error: {}", error);
        }
        self.result
    }
}

/// Thin AnkiConnect client. Every call is a single JSON POST against `url`.
#[derive(Debug, Clone)]
pub struct AnkiConnect {
    client: Client,
    url: String,
}

impl AnkiConnect {
    pub fn new(url: &str) -> Self {
        AnkiConnect { client: Client::new(), url: url.to_string() }
    }

    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<ApiResponse<T>, reqwest::Error> {
        let body = request_body(action, params);
        let response: ApiResponse<T> =
            self.client.post(&self.url).json(&body).send().await?.json().await?;
        Ok(response)
    }

    //Only used to check if AnkiConnect is online
    pub async fn get_version(&self) -> Result<u32, reqwest::Error> {
        let response: ApiResponse<u32> = self.make_request("version", None).await?;
        Ok(response.unwrap_result().unwrap_or_default())
    }

    pub async fn get_note_ids(&self, query: &str) -> Result<Vec<u64>, reqwest::Error> {
        let params = serde_json::json!({ "query": query });
        let response: ApiResponse<Vec<u64>> = self.make_request("findNotes", Some(params)).await?;
        Ok(response.unwrap_result().unwrap_or_default())
    }

    pub async fn get_notes(&self, note_ids: &[u64]) -> Result<Vec<Note>, reqwest::Error> {
        let params = serde_json::json!({ "notes": note_ids });
        let response: ApiResponse<Vec<Note>> = self.make_request("notesInfo", Some(params)).await?;
        Ok(response.unwrap_result().unwrap_or_default())
    }

    /// `notesInfo` in chunks of `batch_size`; a failed chunk is skipped.
    pub async fn get_notes_batched(
        &self,
        note_ids: &[u64],
        batch_size: usize,
    ) -> Result<Vec<Note>, reqwest::Error> {
        let batch_size = batch_size.max(1);
        let total_batches = note_ids.len().div_ceil(batch_size);
        let mut notes = Vec::with_capacity(note_ids.len());

        for (index, batch) in note_ids.chunks(batch_size).enumerate() {
            match self.get_notes(batch).await {
                Ok(batch_notes) => {
                    debug!(
                        "notesInfo batch {}/{}: {} notes",
                        index + 1,
                        total_batches,
                        batch_notes.len()
                    );
                    notes.extend(batch_notes);
                }
                // the first batch failing means the connection is gone
                Err(e) if index == 0 => return Err(e),
                Err(e) => warn!("Skipping notesInfo batch {}/{}: {}", index + 1, total_batches, e),
            }
        }

        Ok(notes)
    }
}

fn request_body(action: &str, params: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
    body.insert("version".to_string(), serde_json::Value::Number((6).into()));

    if let Some(params) = params {
        body.insert("params".to_string(), params);
    }
    serde_json::Value::Object(body)
}
