//! DRM licensor metadata.
//!
//! The licensor identifies the rights-management entity an entry's content is
//! bound to. It is recorded for the fulfillment layer and never acted upon
//! here.

use url::Url;

/// Rights-management entity associated with an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrmLicensor {
    /// Vendor identifier
    pub vendor: String,
    /// Short-lived client token issued by the vendor
    pub client_token: String,
    /// Endpoint for refreshing the client token
    pub client_token_url: Option<Url>,
    /// Device-management endpoint
    pub device_manager: Option<Url>,
}

impl DrmLicensor {
    /// Create a licensor without optional endpoints.
    #[must_use]
    pub fn new(vendor: impl Into<String>, client_token: impl Into<String>) -> Self {
        DrmLicensor {
            vendor: vendor.into(),
            client_token: client_token.into(),
            client_token_url: None,
            device_manager: None,
        }
    }
}
