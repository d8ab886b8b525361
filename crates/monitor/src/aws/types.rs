use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// CloudWatch alarm comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThanOrEqualToThreshold,
    GreaterThanThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
    LessThanLowerOrGreaterThanUpperThreshold,
    LessThanLowerThreshold,
    GreaterThanUpperThreshold,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThanOrEqualToThreshold => "GreaterThanOrEqualToThreshold",
            Self::GreaterThanThreshold => "GreaterThanThreshold",
            Self::LessThanThreshold => "LessThanThreshold",
            Self::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
            Self::LessThanLowerOrGreaterThanUpperThreshold => {
                "LessThanLowerOrGreaterThanUpperThreshold"
            }
            Self::LessThanLowerThreshold => "LessThanLowerThreshold",
            Self::GreaterThanUpperThreshold => "GreaterThanUpperThreshold",
        }
    }
}

impl Default for ComparisonOperator {
    fn default() -> Self {
        ComparisonOperator::GreaterThanThreshold
    }
}

impl FromStr for ComparisonOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GreaterThanOrEqualToThreshold" => Ok(Self::GreaterThanOrEqualToThreshold),
            "GreaterThanThreshold" => Ok(Self::GreaterThanThreshold),
            "LessThanThreshold" => Ok(Self::LessThanThreshold),
            "LessThanOrEqualToThreshold" => Ok(Self::LessThanOrEqualToThreshold),
            "LessThanLowerOrGreaterThanUpperThreshold" => {
                Ok(Self::LessThanLowerOrGreaterThanUpperThreshold)
            }
            "LessThanLowerThreshold" => Ok(Self::LessThanLowerThreshold),
            "GreaterThanUpperThreshold" => Ok(Self::GreaterThanUpperThreshold),
            other => Err(Error::Validation(format!(
                "Unknown comparison operator: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    SampleCount,
    Average,
    Sum,
    Minimum,
    Maximum,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::SampleCount => "SampleCount",
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
        }
    }
}

/// Alarm state as reported by `DescribeAlarms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
}

impl AlarmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmState::Ok => "OK",
            AlarmState::Alarm => "ALARM",
            AlarmState::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl FromStr for AlarmState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OK" => Ok(AlarmState::Ok),
            "ALARM" => Ok(AlarmState::Alarm),
            "INSUFFICIENT_DATA" => Ok(AlarmState::InsufficientData),
            other => Err(Error::Validation(format!("Unknown alarm state: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything a single `PutMetricAlarm` call carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSpec {
    pub name: String,
    pub metric_name: String,
    pub namespace: String,
    pub comparison_operator: ComparisonOperator,
    pub threshold: f64,
    pub evaluation_periods: i32,
    /// Seconds per evaluation period.
    pub period: i32,
    pub statistic: Statistic,
    pub dimensions: Vec<Dimension>,
    /// Notification targets (SNS topic ARNs). May be empty.
    pub alarm_actions: Vec<String>,
    pub actions_enabled: bool,
    pub description: String,
}

/// Summary of an existing alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub name: String,
    pub state: String,
    pub metric_name: Option<String>,
    pub threshold: Option<f64>,
}

impl AlarmRecord {
    pub fn is_ok(&self) -> bool {
        self.state == AlarmState::Ok.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub topic_arn: String,
    pub protocol: String,
    pub endpoint: String,
}

impl SubscriptionSpec {
    pub fn email(topic_arn: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            protocol: "email".to_string(),
            endpoint: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEntry {
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_operator_default_is_greater_than() {
        assert_eq!(
            ComparisonOperator::default(),
            ComparisonOperator::GreaterThanThreshold
        );
    }

    #[test]
    fn comparison_operator_parses_known_names() {
        let op: ComparisonOperator = "LessThanOrEqualToThreshold".parse().unwrap();
        assert_eq!(op, ComparisonOperator::LessThanOrEqualToThreshold);
        assert_eq!(op.to_string(), "LessThanOrEqualToThreshold");
        assert!("BiggerThan".parse::<ComparisonOperator>().is_err());
    }

    #[test]
    fn alarm_state_parse_is_case_insensitive() {
        assert_eq!("alarm".parse::<AlarmState>().unwrap(), AlarmState::Alarm);
        assert_eq!(
            "insufficient_data".parse::<AlarmState>().unwrap().as_str(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn email_subscription_uses_email_protocol() {
        let sub = SubscriptionSpec::email("arn:aws:sns:us-east-1:123:MonitoringAlerts", "ops@example.com");
        assert_eq!(sub.protocol, "email");
        assert_eq!(sub.endpoint, "ops@example.com");
    }
}
