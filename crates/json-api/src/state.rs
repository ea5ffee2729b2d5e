//! State

use std::sync::Arc;

use taper_app::context::AppContext;

use crate::auth::AdminKey;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    /// `None` disables the admin surface.
    pub(crate) admin_key: Option<AdminKey>,
    pub(crate) public_base_url: Option<String>,
    pub(crate) max_upload_bytes: usize,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, max_upload_bytes: usize) -> Self {
        Self {
            app,
            admin_key: None,
            public_base_url: None,
            max_upload_bytes,
        }
    }

    #[must_use]
    pub(crate) fn with_admin_key(mut self, admin_key: Option<AdminKey>) -> Self {
        self.admin_key = admin_key;
        self
    }

    #[must_use]
    pub(crate) fn with_public_base_url(mut self, public_base_url: Option<String>) -> Self {
        self.public_base_url = public_base_url
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());
        self
    }

    #[must_use]
    pub(crate) fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
