use serde::{Deserialize, Serialize};

/// A message sent from the site's contact page.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ContactInquiry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub inquiry_type: String,
    #[serde(default)]
    pub message: String,
}
