use crate::course::Report;

/// Host channel a reply goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Message,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    pub text: String,
}

impl Delivery {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            channel: Channel::Message,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            channel: Channel::Error,
            text: text.into(),
        }
    }
}

impl From<Report> for Delivery {
    fn from(report: Report) -> Self {
        if report.is_failure {
            Self::error(report.text)
        } else {
            Self::message(report.text)
        }
    }
}

pub trait DeliverySink {
    fn deliver(&mut self, delivery: Delivery);
}

impl DeliverySink for Vec<Delivery> {
    fn deliver(&mut self, delivery: Delivery) {
        self.push(delivery);
    }
}
