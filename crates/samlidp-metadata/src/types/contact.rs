//! Technical contact published in IdP metadata.

use serde::{Deserialize, Serialize};

use super::non_blank;

/// Contact details for the `ContactPerson` element.
///
/// Every field is optional; blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    /// Company name.
    pub company: Option<String>,
    /// Given name.
    pub given_name: Option<String>,
    /// Surname.
    pub sur_name: Option<String>,
    /// Email address, without the `mailto:` scheme.
    pub email_address: Option<String>,
    /// Telephone number.
    pub telephone: Option<String>,
}

impl ContactInfo {
    /// Creates an empty contact.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the given name.
    #[must_use]
    pub fn with_given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    /// Sets the surname.
    #[must_use]
    pub fn with_sur_name(mut self, sur_name: impl Into<String>) -> Self {
        self.sur_name = Some(sur_name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = Some(email_address.into());
        self
    }

    /// Sets the telephone number.
    #[must_use]
    pub fn with_telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }

    /// Returns the email address as a `mailto:` URI, if one is set.
    #[must_use]
    pub fn mail_to_string(&self) -> Option<String> {
        non_blank(self.email_address.as_deref()).map(|email| format!("mailto:{email}"))
    }
}
