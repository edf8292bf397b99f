//! Mock provider registry: an in-memory stand-in for a cloud API.
//!
//! Resources are keyed by region, then by name. Names are unique per
//! (service, region); nothing is ever deleted within a session.
//! Identifiers are string templates over the region, the fixed mock
//! account id and the resource name. Random suffixes come from the
//! injected `RandomSource` and are not checked for collisions.

use crate::{
    error::{GameError, GameResult},
    rng::RandomSource,
    types::RegionId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    pub name:          String,
    pub region:        RegionId,
    pub created_at:    DateTime<Utc>,
    pub arn:           String,
    pub subscriptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRecord {
    pub name:       String,
    pub region:     RegionId,
    pub created_at: DateTime<Utc>,
    pub url:        String,
    pub arn:        String,
    pub messages:   Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResource {
    pub id:        String,
    pub path:      String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRecord {
    pub id:           String,
    pub name:         String,
    pub api_type:     String,
    pub region:       RegionId,
    pub created_at:   DateTime<Utc>,
    pub endpoint_url: String,
    pub resources:    Vec<ApiResource>,
    pub deployments:  Vec<String>,
}

/// Result of a publish to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub topic_name: String,
    pub message_id: String,
}

const MESSAGE_ID_LEN: usize = 13;
const API_ID_LEN: usize = 8;

pub struct MockProvider {
    account_id:     String,
    current_region: RegionId,
    topics:         HashMap<RegionId, Vec<TopicRecord>>,
    queues:         HashMap<RegionId, Vec<QueueRecord>>,
    apis:           HashMap<RegionId, Vec<ApiRecord>>,
    rng:            Box<dyn RandomSource>,
}

impl MockProvider {
    pub fn new(account_id: &str, default_region: &str, rng: Box<dyn RandomSource>) -> Self {
        Self {
            account_id: account_id.to_string(),
            current_region: default_region.to_string(),
            topics: HashMap::new(),
            queues: HashMap::new(),
            apis: HashMap::new(),
            rng,
        }
    }

    pub fn current_region(&self) -> &str {
        &self.current_region
    }

    pub fn set_current_region(&mut self, region: &str) {
        self.current_region = region.to_string();
    }

    pub fn topic_arn(&self, region: &str, name: &str) -> String {
        format!("arn:aws:sns:{region}:{}:{name}", self.account_id)
    }

    pub fn queue_url(&self, region: &str, name: &str) -> String {
        format!("https://sqs.{region}.amazonaws.com/{}/{name}", self.account_id)
    }

    pub fn queue_arn(&self, region: &str, name: &str) -> String {
        format!("arn:aws:sqs:{region}:{}:{name}", self.account_id)
    }

    // ── Topics ─────────────────────────────────────────────────

    /// Create a topic and return its ARN.
    pub fn create_topic(&mut self, region: Option<&str>, name: Option<&str>) -> GameResult<String> {
        let region = self.resolve_region(region);
        let name = required(name, "topicName")?;
        if self.topics.get(&region).is_some_and(|t| t.iter().any(|r| r.name == name)) {
            return Err(GameError::DuplicateResource { kind: "SNS topic", name: name.into() });
        }

        let arn = self.topic_arn(&region, name);
        self.topics.entry(region.clone()).or_default().push(TopicRecord {
            name: name.to_string(),
            region: region.clone(),
            created_at: Utc::now(),
            arn: arn.clone(),
            subscriptions: Vec::new(),
        });
        log::debug!("registry: topic {name} created in {region}");
        Ok(arn)
    }

    pub fn list_topics(&self, region: Option<&str>) -> &[TopicRecord] {
        let region = self.resolve_region(region);
        self.topics.get(&region).map(Vec::as_slice).unwrap_or_default()
    }

    /// Validate a publish and hand back a fresh message id.
    /// The topic is not looked up and nothing is stored.
    pub fn publish(
        &mut self,
        topic_arn: Option<&str>,
        message: Option<&str>,
    ) -> GameResult<PublishReceipt> {
        let (topic_arn, _message) = match (non_empty(topic_arn), non_empty(message)) {
            (Some(arn), Some(msg)) => (arn, msg),
            (None, _) => return Err(missing("topicArn")),
            (_, None) => return Err(missing("message")),
        };
        let topic_name = topic_arn.rsplit(':').next().unwrap_or(topic_arn).to_string();
        Ok(PublishReceipt { topic_name, message_id: self.generate_id() })
    }

    // ── Queues ─────────────────────────────────────────────────

    /// Create a queue and return its URL.
    pub fn create_queue(&mut self, region: Option<&str>, name: Option<&str>) -> GameResult<String> {
        let region = self.resolve_region(region);
        let name = required(name, "queueName")?;
        if self.queues.get(&region).is_some_and(|q| q.iter().any(|r| r.name == name)) {
            return Err(GameError::DuplicateResource { kind: "SQS queue", name: name.into() });
        }

        let url = self.queue_url(&region, name);
        let arn = self.queue_arn(&region, name);
        self.queues.entry(region.clone()).or_default().push(QueueRecord {
            name: name.to_string(),
            region: region.clone(),
            created_at: Utc::now(),
            url: url.clone(),
            arn,
            messages: Vec::new(),
        });
        log::debug!("registry: queue {name} created in {region}");
        Ok(url)
    }

    pub fn list_queues(&self, region: Option<&str>) -> Vec<String> {
        let region = self.resolve_region(region);
        self.queues
            .get(&region)
            .map(|queues| queues.iter().map(|q| q.url.clone()).collect())
            .unwrap_or_default()
    }

    /// Validate a send and hand back a fresh message id.
    pub fn send_message(&mut self, queue_url: Option<&str>, body: Option<&str>) -> GameResult<String> {
        if non_empty(queue_url).is_none() {
            return Err(missing("queueUrl"));
        }
        if non_empty(body).is_none() {
            return Err(missing("messageBody"));
        }
        Ok(self.generate_id())
    }

    // ── REST APIs ──────────────────────────────────────────────

    pub fn create_api(
        &mut self,
        region: Option<&str>,
        name: Option<&str>,
        api_type: Option<&str>,
    ) -> GameResult<ApiRecord> {
        let region = self.resolve_region(region);
        let name = required(name, "apiName")?;
        if self.apis.get(&region).is_some_and(|a| a.iter().any(|r| r.name == name)) {
            return Err(GameError::DuplicateResource { kind: "API", name: name.into() });
        }

        let id = format!("api-{}", self.rng.base36(API_ID_LEN));
        let record = ApiRecord {
            endpoint_url: format!("https://{id}.execute-api.{region}.amazonaws.com"),
            id,
            name: name.to_string(),
            api_type: api_type.unwrap_or("REST").to_string(),
            region: region.clone(),
            created_at: Utc::now(),
            resources: vec![ApiResource {
                id: "resource-root".into(),
                path: "/".into(),
                parent_id: None,
            }],
            deployments: Vec::new(),
        };
        self.apis.entry(region.clone()).or_default().push(record.clone());
        log::debug!("registry: api {name} ({}) created in {region}", record.id);
        Ok(record)
    }

    pub fn list_apis(&self, region: Option<&str>) -> &[ApiRecord] {
        let region = self.resolve_region(region);
        self.apis.get(&region).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total resources across every service and region.
    pub fn resource_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum::<usize>()
            + self.queues.values().map(Vec::len).sum::<usize>()
            + self.apis.values().map(Vec::len).sum::<usize>()
    }

    fn resolve_region(&self, region: Option<&str>) -> RegionId {
        non_empty(region).unwrap_or(self.current_region.as_str()).to_string()
    }

    fn generate_id(&mut self) -> String {
        self.rng.base36(MESSAGE_ID_LEN)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: Option<&'a str>, name: &str) -> GameResult<&'a str> {
    non_empty(value).ok_or_else(|| missing(name))
}

fn missing(name: &str) -> GameError {
    GameError::MissingParameter { name: name.to_string() }
}
