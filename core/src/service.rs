//! The catalog of deployable cloud services.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Ec2,
    S3,
    Lambda,
    Rds,
    CloudFront,
    DynamoDb,
    Sns,
    Sqs,
    ApiGateway,
}

impl Service {
    /// Every service, in the order icons are offered in a round.
    pub const ALL: [Service; 9] = [
        Service::Ec2,
        Service::S3,
        Service::Lambda,
        Service::Rds,
        Service::CloudFront,
        Service::DynamoDb,
        Service::Sns,
        Service::Sqs,
        Service::ApiGateway,
    ];

    /// Services that must all be deployed to finish the mission.
    pub const REQUIRED: [Service; 6] = [
        Service::Ec2,
        Service::S3,
        Service::Lambda,
        Service::Sns,
        Service::Sqs,
        Service::ApiGateway,
    ];

    /// Services a region scan can detect.
    pub const SCANNABLE: [Service; 7] = [
        Service::Ec2,
        Service::S3,
        Service::Lambda,
        Service::Rds,
        Service::Sns,
        Service::Sqs,
        Service::ApiGateway,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ec2 => "EC2",
            Self::S3 => "S3",
            Self::Lambda => "Lambda",
            Self::Rds => "RDS",
            Self::CloudFront => "CloudFront",
            Self::DynamoDb => "DynamoDB",
            Self::Sns => "SNS",
            Self::Sqs => "SQS",
            Self::ApiGateway => "API Gateway",
        }
    }

    /// Lowercase console key, e.g. `apigateway`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ec2 => "ec2",
            Self::S3 => "s3",
            Self::Lambda => "lambda",
            Self::Rds => "rds",
            Self::CloudFront => "cloudfront",
            Self::DynamoDb => "dynamodb",
            Self::Sns => "sns",
            Self::Sqs => "sqs",
            Self::ApiGateway => "apigateway",
        }
    }

    /// Deployment cost in credits.
    pub fn cost(&self) -> u32 {
        match self {
            Self::Ec2 => 100,
            Self::S3 => 50,
            Self::Lambda => 150,
            Self::Rds => 200,
            Self::CloudFront => 175,
            Self::DynamoDb => 180,
            Self::Sns => 60,
            Self::Sqs => 75,
            Self::ApiGateway => 120,
        }
    }

    /// Icon name the front end renders for this service's targets.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Ec2 => "fa-server",
            Self::S3 => "fa-database",
            Self::Lambda => "fa-bolt",
            Self::Rds => "fa-table",
            Self::CloudFront => "fa-network-wired",
            Self::DynamoDb => "fa-list-alt",
            Self::Sns => "fa-bell",
            Self::Sqs => "fa-inbox",
            Self::ApiGateway => "fa-gateway",
        }
    }

    /// Resolve a console key, alias or display name, case-insensitively.
    pub fn parse(input: &str) -> Option<Service> {
        let wanted = input.trim().to_ascii_lowercase();
        let compact: String = wanted.chars().filter(|c| !matches!(c, ' ' | '-' | '_')).collect();
        Self::ALL.into_iter().find(|s| {
            s.key() == compact || s.name().to_ascii_lowercase() == wanted
        })
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
