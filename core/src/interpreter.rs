//! CLI-style sublanguage: `aws <service> <command> [--flag value]...`
//!
//! The interpreter owns no state. It parses a line, routes it to a
//! per-service handler, calls the mock provider and writes feedback
//! to the transcript. Every failure leaves the provider untouched.

use crate::{
    error::GameError,
    registry::{ApiRecord, MockProvider, PublishReceipt},
    transcript::Transcript,
};
use std::collections::HashMap;

pub const COMMAND_PREFIX: &str = "aws";

/// A parsed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A flag with no value, or a bare positional token.
    Present,
    Value(String),
}

/// Options parsed from the tokens after `<service> <command>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    entries:     HashMap<String, OptionValue>,
    /// Bare tokens in the order they were typed.
    positionals: Vec<String>,
}

impl CliOptions {
    /// Parse `--flag value` pairs. A flag followed by another flag (or
    /// by nothing) is present without a value. A token that is not a
    /// flag and does not follow one is recorded as present under its
    /// own literal text.
    pub fn parse(args: &[&str]) -> Self {
        let mut entries = HashMap::new();
        let mut positionals = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i];
            if arg.starts_with("--") {
                match args.get(i + 1) {
                    Some(next) if !next.starts_with("--") => {
                        entries.insert(arg.to_string(), OptionValue::Value(next.to_string()));
                        i += 1;
                    }
                    _ => {
                        entries.insert(arg.to_string(), OptionValue::Present);
                    }
                }
            } else {
                entries.insert(arg.to_string(), OptionValue::Present);
                positionals.push(arg.to_string());
            }
            i += 1;
        }
        Self { entries, positionals }
    }

    /// The value of `key`, if it was given one.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(OptionValue::Value(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Positional tokens, in input order.
    pub fn positionals(&self) -> impl Iterator<Item = &str> {
        self.positionals.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a successfully handled command produced.
#[derive(Debug, Clone)]
pub enum CliReply {
    TopicCreated { arn: String },
    Topics { arns: Vec<String> },
    Published(PublishReceipt),
    QueueCreated { url: String },
    Queues { urls: Vec<String> },
    MessageSent { message_id: String },
    ApiCreated(ApiRecord),
    Apis { apis: Vec<ApiRecord> },
    /// A canned EC2/S3/Lambda response with no provider state.
    Stub { service: &'static str, command: String },
}

#[derive(Debug)]
pub enum CliOutcome {
    /// The line is not an `aws` command.
    NotHandled,
    Failed(GameError),
    Completed(CliReply),
}

impl CliOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CliInterpreter;

impl CliInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// True if `line` starts with the `aws` token.
    pub fn recognizes(line: &str) -> bool {
        line.split_whitespace().next() == Some(COMMAND_PREFIX)
    }

    pub fn process(&self, line: &str, aws: &mut MockProvider, out: &mut Transcript) -> CliOutcome {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&COMMAND_PREFIX) {
            return CliOutcome::NotHandled;
        }
        if parts.len() < 3 {
            out.say("AWS CLI command format: aws <service> <command> [options]");
            return CliOutcome::Failed(GameError::MissingParameter { name: "<command>".into() });
        }

        let service = parts[1].to_ascii_lowercase();
        let command = parts[2].to_ascii_lowercase();
        let options = CliOptions::parse(&parts[3..]);
        log::debug!("cli: service={service} command={command} options={}", options.len());

        let result = match service.as_str() {
            "sns" => self.handle_sns(&command, &options, aws, out),
            "sqs" => self.handle_sqs(&command, &options, aws, out),
            "apigateway" => self.handle_apigateway(&command, &options, aws, out),
            "ec2" => self.handle_ec2(&command, &options, out),
            "s3" => self.handle_s3(&command, &options, out),
            "lambda" => self.handle_lambda(&command, &options, out),
            _ => {
                let what = format!("AWS service '{service}'");
                out.say(format!("{what} not implemented yet."));
                Err(GameError::NotImplemented { what })
            }
        };

        match result {
            Ok(reply) => CliOutcome::Completed(reply),
            Err(err) => CliOutcome::Failed(err),
        }
    }

    fn handle_sns(
        &self,
        command: &str,
        options: &CliOptions,
        aws: &mut MockProvider,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "create-topic" => {
                let name = require(options, "--name", out)?;
                let arn = report(aws.create_topic(None, Some(name)), out)?;
                out.say(format!("Successfully created SNS topic: {name}"));
                out.say(format!("Topic ARN: {arn}"));
                Ok(CliReply::TopicCreated { arn })
            }
            "list-topics" => {
                let region = aws.current_region().to_string();
                let arns: Vec<String> =
                    aws.list_topics(None).iter().map(|t| t.arn.clone()).collect();
                out.say(format!("Listing SNS topics in {region}:"));
                if arns.is_empty() {
                    out.say("No SNS topics found.");
                }
                for arn in &arns {
                    out.say(format!("Topic ARN: {arn}"));
                }
                Ok(CliReply::Topics { arns })
            }
            "publish" => {
                let (arn, message) = require_pair(options, "--topic-arn", "--message", out)?;
                let receipt = report(aws.publish(Some(arn), Some(message)), out)?;
                out.say(format!("Successfully published message to topic {}", receipt.topic_name));
                out.say(format!("Message ID: {}", receipt.message_id));
                Ok(CliReply::Published(receipt))
            }
            _ => not_implemented("SNS", command, out),
        }
    }

    fn handle_sqs(
        &self,
        command: &str,
        options: &CliOptions,
        aws: &mut MockProvider,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "create-queue" => {
                let name = require(options, "--queue-name", out)?;
                let url = report(aws.create_queue(None, Some(name)), out)?;
                out.say(format!("Successfully created SQS queue: {name}"));
                out.say(format!("Queue URL: {url}"));
                Ok(CliReply::QueueCreated { url })
            }
            "list-queues" => {
                let urls = aws.list_queues(None);
                out.say(format!("Listing SQS queues in {}:", aws.current_region()));
                if urls.is_empty() {
                    out.say("No SQS queues found.");
                }
                for url in &urls {
                    out.say(url.clone());
                }
                Ok(CliReply::Queues { urls })
            }
            "send-message" => {
                let (url, body) = require_pair(options, "--queue-url", "--message-body", out)?;
                let message_id = report(aws.send_message(Some(url), Some(body)), out)?;
                out.say("Successfully sent message to queue");
                out.say(format!("Message ID: {message_id}"));
                Ok(CliReply::MessageSent { message_id })
            }
            _ => not_implemented("SQS", command, out),
        }
    }

    fn handle_apigateway(
        &self,
        command: &str,
        options: &CliOptions,
        aws: &mut MockProvider,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "create-rest-api" => {
                let name = require(options, "--name", out)?;
                let api = report(aws.create_api(None, Some(name), None), out)?;
                out.say(format!("Successfully created API Gateway API: {name}"));
                out.say(format!("API ID: {}", api.id));
                out.say(format!("Endpoint URL: {}", api.endpoint_url));
                Ok(CliReply::ApiCreated(api))
            }
            "get-rest-apis" => {
                let apis = aws.list_apis(None).to_vec();
                out.say(format!("Listing API Gateway APIs in {}:", aws.current_region()));
                if apis.is_empty() {
                    out.say("No APIs found.");
                }
                for api in &apis {
                    out.say(format!(
                        "API ID: {}, Name: {}, Endpoint: {}",
                        api.id, api.name, api.endpoint_url
                    ));
                }
                Ok(CliReply::Apis { apis })
            }
            _ => not_implemented("API Gateway", command, out),
        }
    }

    fn handle_ec2(
        &self,
        command: &str,
        options: &CliOptions,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "describe-instances" => {
                out.say("Listing EC2 instances...");
                out.say("No instances found in current region.");
            }
            "run-instances" => {
                let image_id = options.value("--image-id").unwrap_or("ami-12345678");
                let instance_type = options.value("--instance-type").unwrap_or("t2.micro");
                out.say(format!("Launching EC2 instance: {instance_type} with AMI {image_id}"));
                out.say("Instance launched successfully.");
            }
            _ => return not_implemented("EC2", command, out),
        }
        Ok(CliReply::Stub { service: "ec2", command: command.to_string() })
    }

    fn handle_s3(
        &self,
        command: &str,
        options: &CliOptions,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "ls" => {
                out.say("Listing S3 buckets...");
                out.say("No buckets found.");
            }
            "mb" => {
                let bucket = options
                    .value("--bucket")
                    .or_else(|| options.positionals().next());
                let Some(bucket) = bucket else {
                    out.say("Error: Missing bucket name");
                    return Err(GameError::MissingParameter { name: "bucket".into() });
                };
                out.say(format!("Creating S3 bucket: {bucket}"));
                out.say("Bucket created successfully.");
            }
            _ => return not_implemented("S3", command, out),
        }
        Ok(CliReply::Stub { service: "s3", command: command.to_string() })
    }

    fn handle_lambda(
        &self,
        command: &str,
        options: &CliOptions,
        out: &mut Transcript,
    ) -> Result<CliReply, GameError> {
        match command {
            "list-functions" => {
                out.say("Listing Lambda functions...");
                out.say("No functions found in current region.");
            }
            "create-function" => {
                let name = require(options, "--function-name", out)?;
                out.say(format!("Creating Lambda function: {name}"));
                out.say("Function created successfully.");
            }
            _ => return not_implemented("Lambda", command, out),
        }
        Ok(CliReply::Stub { service: "lambda", command: command.to_string() })
    }
}

fn require<'a>(options: &'a CliOptions, flag: &str, out: &mut Transcript) -> Result<&'a str, GameError> {
    options.value(flag).ok_or_else(|| {
        out.say(format!("Error: Missing required parameter {flag}"));
        GameError::MissingParameter { name: flag.to_string() }
    })
}

fn require_pair<'a>(
    options: &'a CliOptions,
    first: &str,
    second: &str,
    out: &mut Transcript,
) -> Result<(&'a str, &'a str), GameError> {
    match (options.value(first), options.value(second)) {
        (Some(a), Some(b)) => Ok((a, b)),
        (a, _) => {
            out.say(format!("Error: Missing required parameters {first} and {second}"));
            let name = if a.is_none() { first } else { second };
            Err(GameError::MissingParameter { name: name.to_string() })
        }
    }
}

/// Echo a provider failure to the transcript before passing it on.
fn report<T>(result: Result<T, GameError>, out: &mut Transcript) -> Result<T, GameError> {
    result.inspect_err(|err| out.say(format!("Error: {err}")))
}

fn not_implemented(service: &str, command: &str, out: &mut Transcript) -> Result<CliReply, GameError> {
    let what = format!("{service} command '{command}'");
    out.say(format!("{what} not implemented yet."));
    Err(GameError::NotImplemented { what })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_value_pairs() {
        let opts = CliOptions::parse(&["--name", "alerts", "--region", "eu-west-1"]);
        assert_eq!(opts.value("--name"), Some("alerts"));
        assert_eq!(opts.value("--region"), Some("eu-west-1"));
        assert_eq!(opts.len(), 2);
    }

    #[test]
    fn flag_followed_by_flag_is_boolean() {
        let opts = CliOptions::parse(&["--dry-run", "--name", "x"]);
        assert!(opts.has("--dry-run"));
        assert_eq!(opts.value("--dry-run"), None);
        assert_eq!(opts.value("--name"), Some("x"));
    }

    #[test]
    fn trailing_flag_is_boolean() {
        let opts = CliOptions::parse(&["--force"]);
        assert!(opts.has("--force"));
        assert_eq!(opts.value("--force"), None);
    }

    #[test]
    fn bare_tokens_are_positional() {
        let opts = CliOptions::parse(&["my-bucket", "--acl", "private"]);
        assert!(opts.has("my-bucket"));
        assert_eq!(opts.positionals().collect::<Vec<_>>(), vec!["my-bucket"]);
        assert!(!opts.has("private"), "a flag's value is not positional");
    }

    fn run(line: &str) -> (CliOutcome, MockProvider, Transcript) {
        let mut aws = MockProvider::new(
            "123456789012",
            "us-east-1",
            Box::new(crate::rng::ScriptedRng::constant(0.5)),
        );
        let mut out = Transcript::new();
        let outcome = CliInterpreter::new().process(line, &mut aws, &mut out);
        (outcome, aws, out)
    }

    #[test]
    fn short_line_prints_usage() {
        let (outcome, _, out) = run("aws sns");
        assert!(matches!(outcome, CliOutcome::Failed(GameError::MissingParameter { .. })));
        assert_eq!(out.last(), Some("AWS CLI command format: aws <service> <command> [options]"));
    }

    #[test]
    fn service_and_command_are_case_insensitive() {
        let (outcome, aws, _) = run("aws SNS Create-Topic --name alerts");
        assert!(outcome.is_success());
        assert_eq!(aws.resource_count(), 1);
    }

    #[test]
    fn unknown_subcommand_names_the_service() {
        let (outcome, _, out) = run("aws sqs purge-queue --queue-url x");
        assert!(matches!(outcome, CliOutcome::Failed(GameError::NotImplemented { .. })));
        assert_eq!(out.last(), Some("SQS command 'purge-queue' not implemented yet."));
    }

    #[test]
    fn missing_flag_is_reported() {
        let (outcome, _, out) = run("aws sns publish --topic-arn arn:aws:sns:us-east-1:1:t");
        assert!(outcome.is_handled() && !outcome.is_success());
        assert_eq!(
            out.last(),
            Some("Error: Missing required parameters --topic-arn and --message")
        );
    }

    #[test]
    fn bucket_name_may_be_positional() {
        let (outcome, _, out) = run("aws s3 mb my-bucket");
        assert!(outcome.is_success());
        assert!(out.contains("Creating S3 bucket: my-bucket"));

        let (_, _, out) = run("aws s3 mb first-bucket second-bucket third-bucket");
        assert!(out.contains("Creating S3 bucket: first-bucket"), "first bare token wins");

        let (outcome, _, out) = run("aws s3 mb");
        assert!(!outcome.is_success());
        assert_eq!(out.last(), Some("Error: Missing bucket name"));
    }

    #[test]
    fn run_instances_uses_defaults() {
        let (_, _, out) = run("aws ec2 run-instances");
        assert!(out.contains("Launching EC2 instance: t2.micro with AMI ami-12345678"));
    }

    #[test]
    fn non_aws_line_is_not_handled() {
        let (outcome, _, out) = run("deploy s3");
        assert!(!outcome.is_handled());
        assert!(out.is_empty());
    }

    #[test]
    fn positionals_keep_input_order() {
        let opts = CliOptions::parse(&["zeta", "--acl", "private", "alpha", "mid"]);
        assert_eq!(opts.positionals().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn prefix_detection() {
        assert!(CliInterpreter::recognizes("aws sns list-topics"));
        assert!(!CliInterpreter::recognizes("awsome"));
        assert!(!CliInterpreter::recognizes("deploy s3"));
    }
}
