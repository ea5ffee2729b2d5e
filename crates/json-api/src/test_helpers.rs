//! Test helpers.

use std::{path::Path, sync::Arc};

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use taper_app::{
    clock::ManualClock,
    context::{AppContext, SigningSettings},
    domain::{
        ledger::{InMemoryLedgerService, MockLedgerService},
        otps::{InMemoryOtpsService, MockOtpsService},
        signing::MockSigningService,
        tokens::SigningTokenSecret,
    },
    storage::MockDocumentStorage,
};

use crate::{auth::AdminKey, config::signing::DEFAULT_MAX_UPLOAD_BYTES, router, state::State};

pub(crate) const TEST_ADMIN_KEY: &str = "test-admin-key";
pub(crate) const TEST_PUBLIC_BASE_URL: &str = "https://sign.example.com";
const TEST_TOKEN_SECRET: &str = "test-token-secret";
const MULTIPART_BOUNDARY: &str = "taper-test-boundary";

pub(crate) fn test_start() -> Timestamp {
    Timestamp::from_second(1_750_000_000).expect("timestamp in range")
}

fn strict_otps_mock() -> MockOtpsService {
    let mut otps = MockOtpsService::new();

    otps.expect_create_otp().never();
    otps.expect_verify_otp().never();
    otps.expect_find_otp().never();
    otps.expect_consume_otp().never();
    otps.expect_release_otp().never();
    otps.expect_purge_expired().never();

    otps
}

fn strict_ledger_mock() -> MockLedgerService {
    let mut ledger = MockLedgerService::new();

    ledger.expect_record().never();
    ledger.expect_list_documents().never();
    ledger.expect_get_document().never();

    ledger
}

fn strict_storage_mock() -> MockDocumentStorage {
    let mut storage = MockDocumentStorage::new();

    storage.expect_store().never();
    storage.expect_load().never();
    storage.expect_remove().never();

    storage
}

fn strict_signing_mock() -> MockSigningService {
    let mut signing = MockSigningService::new();

    signing.expect_exchange_otp().never();
    signing.expect_authorize().never();
    signing.expect_sign().never();

    signing
}

/// Application context built from mocks; unexpected calls panic.
pub(crate) struct MockApp {
    pub(crate) otps: MockOtpsService,
    pub(crate) ledger: MockLedgerService,
    pub(crate) storage: MockDocumentStorage,
    pub(crate) signing: MockSigningService,
}

impl Default for MockApp {
    fn default() -> Self {
        Self {
            otps: strict_otps_mock(),
            ledger: strict_ledger_mock(),
            storage: strict_storage_mock(),
            signing: strict_signing_mock(),
        }
    }
}

impl MockApp {
    pub(crate) fn into_state(self) -> State {
        let app = AppContext {
            otps: Arc::new(self.otps),
            ledger: Arc::new(self.ledger),
            storage: Arc::new(self.storage),
            signing: Arc::new(self.signing),
            clock: Arc::new(ManualClock::new(test_start())),
        };

        State::new(app, DEFAULT_MAX_UPLOAD_BYTES)
            .with_admin_key(AdminKey::new(TEST_ADMIN_KEY))
            .with_public_base_url(Some(TEST_PUBLIC_BASE_URL.to_string()))
    }
}

/// State whose collaborators reject every call.
pub(crate) fn strict_state() -> State {
    MockApp::default().into_state()
}

pub(crate) fn state_with_signing(signing: MockSigningService) -> Arc<State> {
    MockApp {
        signing,
        ..MockApp::default()
    }
    .into_state()
    .into_shared()
}

/// A fully wired in-memory application whose files land in `upload_dir`.
pub(crate) fn in_memory_state(upload_dir: &Path, clock: Arc<ManualClock>) -> State {
    let settings = SigningSettings {
        token_secret: SigningTokenSecret::new(TEST_TOKEN_SECRET).expect("secret is not empty"),
        upload_dir: upload_dir.to_path_buf(),
        single_use_otp: false,
    };

    let app = AppContext::from_parts(
        Arc::new(InMemoryOtpsService::new()),
        Arc::new(InMemoryLedgerService::new()),
        settings,
        clock,
    );

    State::new(app, DEFAULT_MAX_UPLOAD_BYTES)
        .with_admin_key(AdminKey::new(TEST_ADMIN_KEY))
        .with_public_base_url(Some(TEST_PUBLIC_BASE_URL.to_string()))
}

/// The complete route tree over `state`.
pub(crate) fn app_service(state: Arc<State>) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(router::app_router()))
}

/// Hand-assembled `multipart/form-data` body.
#[derive(Debug, Default)]
pub(crate) struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub(crate) fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub(crate) fn content_type() -> String {
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
