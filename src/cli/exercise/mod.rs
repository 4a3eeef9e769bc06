//! Exercise command - walks a running server through create, list, get,
//! update and delete, printing every response

use anyhow::Context;
use clap::Args;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/users";

/// Arguments for the exercise command
#[derive(Args, Clone, Debug)]
pub struct ExerciseArgs {
    /// Users collection URL of the server to exercise
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

/// Status and decoded body of one call
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub body: Value,
}

/// Outcome of a full exercise run
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseReport {
    /// Id returned by the create call, if any
    pub created_id: Option<String>,
    /// Id used for get/update/delete
    pub resolved_id: Option<String>,
    pub delete_status: Option<u16>,
    /// Users listed after the delete
    pub remaining: usize,
}

/// Thin HTTP client for the users collection
#[derive(Debug, Clone)]
pub struct UserClient {
    client: Client,
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn create(&self, user: &Value) -> anyhow::Result<ClientResponse> {
        self.send(Method::POST, &self.base_url, Some(user)).await
    }

    pub async fn list(&self) -> anyhow::Result<ClientResponse> {
        self.send(Method::GET, &self.base_url, None).await
    }

    pub async fn get(&self, id: &str) -> anyhow::Result<ClientResponse> {
        self.send(Method::GET, &self.item_url(id), None).await
    }

    pub async fn update(&self, id: &str, changes: &Value) -> anyhow::Result<ClientResponse> {
        self.send(Method::PUT, &self.item_url(id), Some(changes)).await
    }

    pub async fn delete(&self, id: &str) -> anyhow::Result<ClientResponse> {
        self.send(Method::DELETE, &self.item_url(id), None).await
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> anyhow::Result<ClientResponse> {
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.client.request(method.clone(), url);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body of {} {}", method, url))?;

        Ok(ClientResponse {
            status,
            body: decode_body(&text),
        })
    }
}

fn decode_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Pick the id to exercise: the created user's, else the last listed user's
fn resolve_user_id(created: &Value, listed: &Value) -> Option<String> {
    created["id"].as_str().map(String::from).or_else(|| {
        listed
            .as_array()
            .and_then(|users| users.last())
            .and_then(|user| user["id"].as_str())
            .map(String::from)
    })
}

fn print_response(title: &str, response: &ClientResponse) {
    println!("--- {} ---", title);
    println!("Status: {}", response.status);

    if response.body.is_null() {
        return;
    }

    if let Ok(body) = serde_json::to_string_pretty(&response.body) {
        println!("{}", body);
    }
}

/// Run the fixed create/list/get/update/delete sequence against `client`
pub async fn run_exercise(client: &UserClient) -> anyhow::Result<ExerciseReport> {
    let created = client
        .create(&json!({
            "name": "Charlie",
            "age": 30,
            "email": "charlie@example.com"
        }))
        .await?;
    print_response("Create User", &created);

    let listed = client.list().await?;
    print_response("Get All Users", &listed);

    let created_id = created.body["id"].as_str().map(String::from);
    let resolved_id = resolve_user_id(&created.body, &listed.body);

    let delete_status = match &resolved_id {
        Some(id) => {
            let single = client.get(id).await?;
            print_response("Get User By ID", &single);

            let updated = client
                .update(id, &json!({ "name": "Charlie Updated" }))
                .await?;
            print_response("Update User", &updated);

            let deleted = client.delete(id).await?;
            println!("--- Delete User ---");
            println!("Delete status: {}", deleted.status);

            Some(deleted.status)
        }
        None => {
            warn!("No user id available, skipping get, update and delete");
            None
        }
    };

    let after = client.list().await?;
    print_response("Get All Users After Delete", &after);

    let remaining = after.body.as_array().map(Vec::len).unwrap_or(0);

    Ok(ExerciseReport {
        created_id,
        resolved_id,
        delete_status,
        remaining,
    })
}

/// Run the exercise command
pub async fn run(args: ExerciseArgs) -> anyhow::Result<()> {
    let client = UserClient::new(args.base_url);
    let report = run_exercise(&client).await?;

    debug!(?report, "Exercise finished");

    Ok(())
}
